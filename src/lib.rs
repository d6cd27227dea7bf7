//! scenebus: session-bus scene command server
//!
//! A simulation drives a 3D animation by calling scene commands over D-Bus
//! (`make_box`, `move_to`, `rotate`, ...). Each call is validated and handed
//! to a backend that either records it in an in-process scene or forwards it
//! to a native `proc3d_*` animation library. After `stop` the backend hands
//! the finished animation on for display.
//!
//! Architecture:
//! - The bus (or a replay script) runs on its own thread and forwards every
//!   call over a channel
//! - The calling thread owns the facade and the backend and answers calls one
//!   at a time
//! - The viewer, if any, runs on the same thread after the loop ends
//!
//! # Module Structure
//!
//! - `config`: constants and runtime settings
//! - `error`: backend and startup errors
//! - `api`: command catalog, validation and dispatch
//! - `backend`: host and native backends
//! - `scene`: in-process scene model and glTF import
//! - `bus_bridge`: D-Bus transport
//! - `replay`: JSON-lines transport
//! - `viewer`: Bevy preview of the host scene

pub mod api;
pub mod backend;
pub mod bus_bridge;
pub mod config;
pub mod error;
pub mod replay;
pub mod scene;
pub mod viewer;

use std::ffi::{c_double, c_uint};
use std::thread::JoinHandle;

use api::SceneFacade;
use backend::{HostScene, NativeBackend, SceneBackend};
use bus_bridge::{request_channel, RequestReceiver};
use config::{BackendKind, Config, TimeAbi};

/// Main entry point: serve until `stop`, then hand off
pub fn run() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();
    log::info!("[Server] Starting...");

    let config = Config::from_env()?;
    log::debug!("[Server] {:?}", config);

    match (config.backend, config.time_abi) {
        (BackendKind::Host, _) => serve(HostScene::new(), &config),
        (BackendKind::Native, TimeAbi::Frame) => {
            serve(NativeBackend::<c_uint>::load(&config)?, &config)
        }
        (BackendKind::Native, TimeAbi::Time) => {
            serve(NativeBackend::<c_double>::load(&config)?, &config)
        }
    }
}

/// Where calls come from
enum Transport {
    Bus(zbus::blocking::Connection),
    Replay(JoinHandle<()>),
}

impl Transport {
    fn close(self) {
        match self {
            Self::Bus(connection) => {
                drop(connection);
                log::info!("[Bus] Released bus name");
            }
            Self::Replay(player) => {
                if player.join().is_err() {
                    log::error!("[Replay] Player thread panicked");
                }
            }
        }
    }
}

/// Run one transport against `backend` and hand the result off
fn serve<B: SceneBackend>(backend: B, config: &Config) -> anyhow::Result<()> {
    log::info!("[Server] Using {} backend", backend.label());
    let (sender, receiver) = request_channel();
    let mut facade = SceneFacade::new(backend);

    let transport = match &config.replay {
        Some(path) => Transport::Replay(replay::spawn(path, sender)?),
        None => Transport::Bus(bus_bridge::serve(config, sender)?),
    };
    dispatch(&mut facade, receiver);

    // the bus stays up during hand-off so late callers get an answer
    log::info!("[Server] Dispatch finished, handing off");
    let handed_off = facade.into_backend().hand_off(config);
    transport.close();
    handed_off?;
    Ok(())
}

/// Answer requests one at a time until `stop` or until every sender is gone
pub fn dispatch<B: SceneBackend>(facade: &mut SceneFacade<B>, requests: RequestReceiver) {
    while let Ok(request) = requests.0.recv() {
        let reply = facade
            .dispatch(request.command, &request.params)
            .map_err(|e| e.to_string());
        if request.reply.send(reply).is_err() {
            log::warn!("[Server] Caller of {} went away", request.command.name());
        }
        if facade.is_stopped() {
            return;
        }
    }
    log::warn!("[Server] All transports closed without stop");
}

#[cfg(test)]
mod tests {
    use super::*;
    use api::{Command, Outcome, ParamValue, Params};
    use bus_bridge::shared_state::STOPPED;

    #[test]
    fn test_dispatch_until_stop() {
        let (sender, receiver) = request_channel();
        let caller = std::thread::spawn(move || {
            let params = Params::new().with("reference", ParamValue::Str("g".into()));
            let made = sender.call(Command::MakeGroup, params.clone());
            let again = sender.call(Command::MakeGroup, params.clone());
            let stopped = sender.call(Command::Stop, Params::new());
            let late = sender.call(Command::MakeGroup, params);
            (made, again, stopped, late)
        });

        let mut facade = SceneFacade::new(HostScene::new());
        dispatch(&mut facade, receiver);
        let (made, again, stopped, late) = caller.join().unwrap();

        assert_eq!(made, Ok(Outcome::accepted("g")));
        assert_eq!(again, Ok(Outcome::rejected("g is already in use.")));
        assert_eq!(stopped, Ok(Outcome::accepted("stopped")));
        assert_eq!(late, Err(STOPPED.to_string()));
        assert!(facade.is_stopped());
        assert_eq!(facade.backend().scene().objects.len(), 1);
    }

    #[test]
    fn test_dispatch_ends_when_senders_drop() {
        let (sender, receiver) = request_channel();
        drop(sender);
        let mut facade = SceneFacade::new(HostScene::new());
        dispatch(&mut facade, receiver);
        assert!(!facade.is_stopped());
    }
}
