use std::net::SocketAddr;

use shared_protocol::{COMMAND_FRAME_LEN, DecodeError, Frame, Mode, decode};
use tracing::{info, warn};

use crate::fsm::{Ack, SharedFsm};

/// What happened to one uplink datagram.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    Applied { seq: u16, cmd_id: u8, param: i32, ack: Ack, mode: Mode },
    TooShort { len: usize },
    Rejected(DecodeError),
    NotCommand { msgtype: u8 },
}

impl Dispatch {
    /// Log the outcome; rejected frames are dumped as hex.
    pub fn report(&self, datagram: &[u8], from: SocketAddr) {
        match self {
            Dispatch::Applied { seq, cmd_id, param, ack, mode } => info!(
                %from,
                seq,
                cmd_id,
                param,
                ack = %ack.code,
                msg = %ack.message,
                %mode,
                "uplink command"
            ),
            Dispatch::TooShort { len } => warn!(%from, len, "ignored uplink frame: too short"),
            Dispatch::Rejected(e) => {
                warn!(%from, error = %e, raw = %hex::encode(datagram), "bad uplink frame")
            }
            Dispatch::NotCommand { msgtype } => {
                warn!(%from, msgtype, "ignoring non-command uplink frame")
            }
        }
    }
}

/// Routes decoded uplink command frames into the mode FSM.
///
/// Acks are observed locally (logged); nothing is sent back to the sender.
#[derive(Clone)]
pub struct CommandDispatcher {
    fsm: SharedFsm,
}

impl CommandDispatcher {
    pub fn new(fsm: SharedFsm) -> Self {
        Self { fsm }
    }

    pub fn dispatch(&self, datagram: &[u8], from: SocketAddr) -> Dispatch {
        let outcome = self.route(datagram);
        outcome.report(datagram, from);
        outcome
    }

    fn route(&self, datagram: &[u8]) -> Dispatch {
        let len = datagram.len();
        if len < COMMAND_FRAME_LEN {
            return Dispatch::TooShort { len };
        }

        let frame = match decode(datagram) {
            Ok(f) => f,
            Err(e) => return Dispatch::Rejected(e),
        };

        let Frame::Command { header, payload } = frame else {
            return Dispatch::NotCommand { msgtype: frame.header().msgtype };
        };

        let mut fsm = self.fsm.lock();
        let ack = fsm.apply_command(payload.cmd_id, payload.param);
        Dispatch::Applied {
            seq: header.seq,
            cmd_id: payload.cmd_id,
            param: payload.param,
            ack,
            mode: fsm.mode(),
        }
    }
}
