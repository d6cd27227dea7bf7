use scenebus_lib::config::EXIT_STARTUP_FAILURE;

fn main() {
    if let Err(e) = scenebus_lib::run() {
        log::error!("[Server] {:#}", e);
        std::process::exit(EXIT_STARTUP_FAILURE);
    }
}
