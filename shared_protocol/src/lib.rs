// lib.rs: downlink/uplink framing shared by the satellite and the ground station

pub mod crc;
pub mod frame;
pub mod mode;
pub mod transport;

pub use crc::crc16_x25;
pub use frame::{
    COMMAND_FRAME_LEN, CommandPayload, DecodeError, Frame, FrameHeader, MIN_FRAME_LEN,
    TELEMETRY_FRAME_LEN, TelemetryPayload, decode, encode_command, encode_telemetry,
};
pub use mode::{AckCode, CommandId, Mode};
pub use transport::{Receiver, Sender, TransportError};

// =============================== Common =====================================

pub const DEFAULT_DOWNLINK_PORT: u16 = 5005;
pub const DEFAULT_UPLINK_PORT: u16 = 5006;
