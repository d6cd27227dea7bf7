//! Request channel between transports and the dispatch thread
//!
//! Transports run on their own threads. Each call becomes a [`BusRequest`]
//! carrying a reply sender; the dispatch thread owns the facade and answers
//! requests one at a time.

use crossbeam_channel::{Receiver, Sender};

use crate::api::{Command, Outcome, Params};

/// What a transport gets back: the outcome, or the message of a failed call
pub type Reply = Result<Outcome, String>;

/// One call waiting for the dispatch thread
pub struct BusRequest {
    pub command: Command,
    pub params: Params,
    pub reply: Sender<Reply>,
}

/// Message for calls that arrive after `stop`
pub const STOPPED: &str = "server stopped";

/// Cloneable handle transports use to submit calls
#[derive(Clone)]
pub struct RequestSender(Sender<BusRequest>);

impl RequestSender {
    /// Submit a call and block until the dispatch thread answers
    pub fn call(&self, command: Command, params: Params) -> Reply {
        let (reply, answer) = crossbeam_channel::bounded(1);
        self.0
            .send(BusRequest {
                command,
                params,
                reply,
            })
            .map_err(|_| STOPPED.to_string())?;
        answer.recv().map_err(|_| STOPPED.to_string())?
    }
}

/// Receiving end, owned by the dispatch thread
pub struct RequestReceiver(pub Receiver<BusRequest>);

pub fn request_channel() -> (RequestSender, RequestReceiver) {
    let (tx, rx) = crossbeam_channel::unbounded();
    (RequestSender(tx), RequestReceiver(rx))
}
