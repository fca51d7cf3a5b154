// Fixed-layout little-endian frames:
//
//   telemetry (40B): AA55 | ver | 0x01 | seq | ts_ms | mode | batt_mv | temp_cdeg
//                    | press_pa | alt_cm | gyro xyz | acc xyz | light | comp_len | crc
//   command   (13B): AA55 | ver | 0x02 | seq | cmd_id | param | crc
//
// The CRC-16/X25 trailer covers everything between the preamble and itself.

use thiserror::Error;

use crate::crc::crc16_x25;
use crate::mode::{CommandId, Mode};

// =============================== Layout =====================================

pub const PREAMBLE: [u8; 2] = [0xAA, 0x55];
pub const VERSION: u8 = 0x01;

pub const MSGTYPE_TELEMETRY: u8 = 0x01;
pub const MSGTYPE_COMMAND: u8 = 0x02;

pub const HEADER_LEN: usize = 6; // preamble + version + msgtype + seq
pub const CRC_LEN: usize = 2;

pub const TELEMETRY_FRAME_LEN: usize = 40;
pub const COMMAND_FRAME_LEN: usize = 13;
pub const MIN_FRAME_LEN: usize = COMMAND_FRAME_LEN;

// =============================== Types ======================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    pub version: u8,
    pub msgtype: u8,
    pub seq: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TelemetryPayload {
    pub timestamp_ms: u32,
    pub mode: u8,
    pub batt_mv: u16,
    /// hundredths of a degree Celsius
    pub temp_centideg: i16,
    pub press_pa: u32,
    pub alt_cm: u32,
    pub gyro: [i16; 3],
    pub acc: [i16; 3],
    pub light: u16,
    pub comp_len: u8,
}

impl TelemetryPayload {
    pub fn temp_c(&self) -> f64 {
        self.temp_centideg as f64 / 100.0
    }

    /// `None` when the satellite reported a mode value this side doesn't know.
    pub fn mode(&self) -> Option<Mode> {
        Mode::from_u8(self.mode)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandPayload {
    pub cmd_id: u8,
    pub param: i32,
}

impl CommandPayload {
    pub fn command(&self) -> Option<CommandId> {
        CommandId::from_u8(self.cmd_id)
    }
}

/// A frame that passed length, preamble and CRC checks.
///
/// Frames with an unrecognized `msgtype` still decode, but only their header
/// is interpreted; match on the variant before touching payload fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frame {
    Telemetry {
        header: FrameHeader,
        payload: TelemetryPayload,
    },
    Command {
        header: FrameHeader,
        payload: CommandPayload,
    },
    Unknown {
        header: FrameHeader,
    },
}

impl Frame {
    pub fn header(&self) -> &FrameHeader {
        match self {
            Frame::Telemetry { header, .. }
            | Frame::Command { header, .. }
            | Frame::Unknown { header } => header,
        }
    }

    pub fn seq(&self) -> u16 {
        self.header().seq
    }
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    #[error("frame too short: {len} bytes, need {min}")]
    TooShort { len: usize, min: usize },
    #[error("bad preamble {found:02X?}")]
    BadPreamble { found: [u8; 2] },
    #[error("CRC mismatch: frame carries {expected:#06x}, computed {computed:#06x}")]
    ChecksumMismatch { expected: u16, computed: u16 },
}

// ============================== Encoding ====================================

struct Writer<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl<'a> Writer<'a> {
    fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn put(&mut self, bytes: &[u8]) -> &mut Self {
        self.buf[self.pos..self.pos + bytes.len()].copy_from_slice(bytes);
        self.pos += bytes.len();
        self
    }

    fn header(&mut self, msgtype: u8, seq: u16) -> &mut Self {
        self.put(&PREAMBLE)
            .put(&[VERSION, msgtype])
            .put(&seq.to_le_bytes())
    }

    /// Append the CRC over everything after the preamble.
    fn seal(&mut self) {
        let crc = crc16_x25(&self.buf[PREAMBLE.len()..self.pos]);
        self.put(&crc.to_le_bytes());
        debug_assert_eq!(self.pos, self.buf.len());
    }
}

pub fn encode_telemetry(seq: u16, payload: &TelemetryPayload) -> [u8; TELEMETRY_FRAME_LEN] {
    let mut out = [0u8; TELEMETRY_FRAME_LEN];
    let mut w = Writer::new(&mut out);
    w.header(MSGTYPE_TELEMETRY, seq)
        .put(&payload.timestamp_ms.to_le_bytes())
        .put(&[payload.mode])
        .put(&payload.batt_mv.to_le_bytes())
        .put(&payload.temp_centideg.to_le_bytes())
        .put(&payload.press_pa.to_le_bytes())
        .put(&payload.alt_cm.to_le_bytes());
    for g in payload.gyro {
        w.put(&g.to_le_bytes());
    }
    for a in payload.acc {
        w.put(&a.to_le_bytes());
    }
    w.put(&payload.light.to_le_bytes()).put(&[payload.comp_len]);
    w.seal();
    out
}

pub fn encode_command(seq: u16, cmd_id: u8, param: i32) -> [u8; COMMAND_FRAME_LEN] {
    let mut out = [0u8; COMMAND_FRAME_LEN];
    let mut w = Writer::new(&mut out);
    w.header(MSGTYPE_COMMAND, seq)
        .put(&[cmd_id])
        .put(&param.to_le_bytes());
    w.seal();
    out
}

// ============================== Decoding ====================================

// Callers check lengths first, so reads never run past the buffer.
struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn take<const N: usize>(&mut self) -> [u8; N] {
        let mut out = [0u8; N];
        out.copy_from_slice(&self.buf[self.pos..self.pos + N]);
        self.pos += N;
        out
    }

    fn u8(&mut self) -> u8 {
        self.take::<1>()[0]
    }
    fn u16(&mut self) -> u16 {
        u16::from_le_bytes(self.take())
    }
    fn i16(&mut self) -> i16 {
        i16::from_le_bytes(self.take())
    }
    fn u32(&mut self) -> u32 {
        u32::from_le_bytes(self.take())
    }
    fn i32(&mut self) -> i32 {
        i32::from_le_bytes(self.take())
    }
    fn i16x3(&mut self) -> [i16; 3] {
        [self.i16(), self.i16(), self.i16()]
    }
}

fn require_len(len: usize, min: usize) -> Result<(), DecodeError> {
    if len < min {
        return Err(DecodeError::TooShort { len, min });
    }
    Ok(())
}

/// Validate and parse one datagram.
///
/// Checks run in a fixed order: overall length, preamble, CRC, then the
/// per-msgtype length. Trailing bytes between the fixed payload and the CRC
/// are covered by the checksum but otherwise ignored.
pub fn decode(buf: &[u8]) -> Result<Frame, DecodeError> {
    require_len(buf.len(), MIN_FRAME_LEN)?;

    if buf[..2] != PREAMBLE {
        return Err(DecodeError::BadPreamble {
            found: [buf[0], buf[1]],
        });
    }

    let crc_at = buf.len() - CRC_LEN;
    let expected = u16::from_le_bytes([buf[crc_at], buf[crc_at + 1]]);
    let computed = crc16_x25(&buf[PREAMBLE.len()..crc_at]);
    if expected != computed {
        return Err(DecodeError::ChecksumMismatch { expected, computed });
    }

    let mut r = Reader::new(&buf[PREAMBLE.len()..crc_at]);
    let header = FrameHeader {
        version: r.u8(),
        msgtype: r.u8(),
        seq: r.u16(),
    };

    match header.msgtype {
        MSGTYPE_TELEMETRY => {
            require_len(buf.len(), TELEMETRY_FRAME_LEN)?;
            let payload = TelemetryPayload {
                timestamp_ms: r.u32(),
                mode: r.u8(),
                batt_mv: r.u16(),
                temp_centideg: r.i16(),
                press_pa: r.u32(),
                alt_cm: r.u32(),
                gyro: r.i16x3(),
                acc: r.i16x3(),
                light: r.u16(),
                comp_len: r.u8(),
            };
            Ok(Frame::Telemetry { header, payload })
        }
        MSGTYPE_COMMAND => {
            require_len(buf.len(), COMMAND_FRAME_LEN)?;
            let payload = CommandPayload {
                cmd_id: r.u8(),
                param: r.i32(),
            };
            Ok(Frame::Command { header, payload })
        }
        _ => Ok(Frame::Unknown { header }),
    }
}

// ================================ Tests =====================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TelemetryPayload {
        TelemetryPayload {
            timestamp_ms: 987_654_321,
            mode: 0,
            batt_mv: 4100,
            temp_centideg: 2534,
            press_pa: 101_325,
            alt_cm: 1000,
            gyro: [10, -10, 5],
            acc: [100, -50, 980],
            light: 512,
            comp_len: 0,
        }
    }

    #[test]
    fn telemetry_layout() {
        let frame = encode_telemetry(0x0102, &sample());
        assert_eq!(frame.len(), TELEMETRY_FRAME_LEN);
        assert_eq!(&frame[..2], &PREAMBLE);
        assert_eq!(frame[2], VERSION);
        assert_eq!(frame[3], MSGTYPE_TELEMETRY);
        assert_eq!(&frame[4..6], &[0x02, 0x01]);
        assert_eq!(&frame[6..10], &987_654_321u32.to_le_bytes());
        assert_eq!(frame[10], 0);
        assert_eq!(&frame[11..13], &4100u16.to_le_bytes());
        assert_eq!(&frame[13..15], &2534i16.to_le_bytes());
        assert_eq!(frame[37], 0, "comp_len");
        let crc = crc16_x25(&frame[2..38]);
        assert_eq!(&frame[38..], &crc.to_le_bytes());
    }

    #[test]
    fn command_layout() {
        let frame = encode_command(42, 1, -2);
        assert_eq!(frame.len(), COMMAND_FRAME_LEN);
        assert_eq!(&frame[..6], &[0xAA, 0x55, VERSION, MSGTYPE_COMMAND, 42, 0]);
        assert_eq!(frame[6], 1);
        assert_eq!(&frame[7..11], &(-2i32).to_le_bytes());
        let crc = crc16_x25(&frame[2..11]);
        assert_eq!(&frame[11..], &crc.to_le_bytes());
    }

    #[test]
    fn telemetry_roundtrip() {
        let payload = sample();
        let frame = encode_telemetry(123, &payload);
        match decode(&frame) {
            Ok(Frame::Telemetry { header, payload: back }) => {
                assert_eq!(header.seq, 123);
                assert_eq!(header.version, VERSION);
                assert_eq!(back, payload);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn command_roundtrip() {
        let frame = encode_command(42, 1, 2);
        let decoded = decode(&frame).unwrap();
        assert_eq!(decoded.seq(), 42);
        match decoded {
            Frame::Command { payload, .. } => {
                assert_eq!(payload.command(), Some(CommandId::SetMode));
                assert_eq!(payload.param, 2);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn too_short() {
        let frame = encode_command(0, 3, 0);
        assert_eq!(
            decode(&frame[..12]),
            Err(DecodeError::TooShort { len: 12, min: MIN_FRAME_LEN })
        );
        assert!(matches!(decode(&[]), Err(DecodeError::TooShort { .. })));
    }

    #[test]
    fn bad_preamble() {
        let mut frame = encode_command(0, 3, 0);
        frame[0] = 0x55;
        assert_eq!(
            decode(&frame),
            Err(DecodeError::BadPreamble { found: [0x55, 0x55] })
        );
    }

    #[test]
    fn corrupted_byte_is_checksum_mismatch() {
        // same corruption the satellite's debug knob applies
        let mut frame = encode_telemetry(7, &sample());
        frame[8] ^= 0xFF;
        assert!(matches!(
            decode(&frame),
            Err(DecodeError::ChecksumMismatch { .. })
        ));
    }

    #[test]
    fn telemetry_msgtype_with_command_length_is_too_short() {
        // valid CRC, but a telemetry header on a 13-byte frame
        let mut frame = encode_command(5, 0, 0);
        frame[3] = MSGTYPE_TELEMETRY;
        let crc = crc16_x25(&frame[2..11]);
        frame[11..].copy_from_slice(&crc.to_le_bytes());
        assert_eq!(
            decode(&frame),
            Err(DecodeError::TooShort { len: 13, min: TELEMETRY_FRAME_LEN })
        );
    }

    #[test]
    fn unknown_msgtype_keeps_header() {
        let mut frame = encode_command(9, 3, 0);
        frame[3] = 0x7F;
        let crc = crc16_x25(&frame[2..11]);
        frame[11..].copy_from_slice(&crc.to_le_bytes());
        assert_eq!(
            decode(&frame),
            Ok(Frame::Unknown {
                header: FrameHeader { version: VERSION, msgtype: 0x7F, seq: 9 }
            })
        );
    }

    #[test]
    fn decoded_temperature_and_mode() {
        let payload = TelemetryPayload {
            timestamp_ms: 123_456,
            mode: Mode::Safe.into(),
            batt_mv: 3950,
            temp_centideg: 2612,
            press_pa: 101_111,
            alt_cm: 999,
            gyro: [5, -2, 0],
            acc: [100, 0, 950],
            light: 700,
            comp_len: 0,
        };
        let Ok(Frame::Telemetry { header, payload }) = decode(&encode_telemetry(42, &payload)) else {
            panic!("expected telemetry");
        };
        assert_eq!(header.seq, 42);
        assert_eq!(payload.temp_centideg, 2612);
        assert_eq!(payload.mode(), Some(Mode::Safe));
        assert_eq!(payload.mode().map(|m| m.to_string()).as_deref(), Some("SAFE"));
        assert!((payload.temp_c() - 26.12).abs() < 1e-9);
    }
}
