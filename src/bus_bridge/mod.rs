//! Bridge between the session bus and the dispatch thread
//!
//! - `shared_state`: request channel handed across threads
//! - `commands`: the served bus interface
//! - `protocol`: variant and reply conversions

pub mod commands;
pub mod protocol;
pub mod shared_state;

pub use shared_state::{request_channel, BusRequest, Reply, RequestReceiver, RequestSender};

use zbus::blocking::connection;

use crate::config::Config;
use crate::error::StartupError;
use commands::SceneInterface;

/// Claim the bus name and serve the scene interface.
///
/// Calls are forwarded through `requests`; the returned connection must stay
/// alive for as long as calls should be answered.
pub fn serve(
    config: &Config,
    requests: RequestSender,
) -> Result<zbus::blocking::Connection, StartupError> {
    let connection = connection::Builder::session()?
        .name(config.bus_name.as_str())?
        .serve_at(config.object_path.as_str(), SceneInterface::new(requests))?
        .build()?;
    log::info!(
        "[Bus] Serving {} at {} as {}",
        crate::config::bus::INTERFACE,
        config.object_path,
        config.bus_name
    );
    Ok(connection)
}
