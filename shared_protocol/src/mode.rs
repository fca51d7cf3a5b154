use std::fmt;

/// Satellite operating mode as carried in the telemetry `mode` byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Mode {
    Operational = 0,
    Safe = 1,
    Idle = 2,
}

impl Mode {
    pub fn from_u8(raw: u8) -> Option<Self> {
        match raw {
            0 => Some(Mode::Operational),
            1 => Some(Mode::Safe),
            2 => Some(Mode::Idle),
            _ => None,
        }
    }

    /// Short label used on the ground side (logs, console status).
    pub fn label(self) -> &'static str {
        match self {
            Mode::Operational => "OP",
            Mode::Safe => "SAFE",
            Mode::Idle => "IDLE",
        }
    }
}

impl From<Mode> for u8 {
    fn from(mode: Mode) -> u8 {
        mode as u8
    }
}

/// Command parameters are signed 32-bit; only 0..=2 name a mode.
impl TryFrom<i32> for Mode {
    type Error = i32;

    fn try_from(param: i32) -> Result<Self, Self::Error> {
        u8::try_from(param)
            .ok()
            .and_then(Mode::from_u8)
            .ok_or(param)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Known uplink command identifiers (`cmd_id` byte).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CommandId {
    SetMode = 1,
    ResetSeq = 2,
    Ping = 3,
}

impl CommandId {
    pub fn from_u8(raw: u8) -> Option<Self> {
        match raw {
            1 => Some(CommandId::SetMode),
            2 => Some(CommandId::ResetSeq),
            3 => Some(CommandId::Ping),
            _ => None,
        }
    }
}

impl From<CommandId> for u8 {
    fn from(id: CommandId) -> u8 {
        id as u8
    }
}

/// Local result of applying a command. Never transmitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum AckCode {
    Ok = 0,
    UnknownCmd = 1,
    BadParam = 2,
}

impl fmt::Display for AckCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AckCode::Ok => "OK",
            AckCode::UnknownCmd => "UNKNOWN_CMD",
            AckCode::BadParam => "BAD_PARAM",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_from_param() {
        assert_eq!(Mode::try_from(0), Ok(Mode::Operational));
        assert_eq!(Mode::try_from(1), Ok(Mode::Safe));
        assert_eq!(Mode::try_from(2), Ok(Mode::Idle));
        assert_eq!(Mode::try_from(9), Err(9));
        assert_eq!(Mode::try_from(-1), Err(-1));
        assert_eq!(Mode::try_from(256 + 1), Err(257));
    }

    #[test]
    fn labels() {
        assert_eq!(Mode::Safe.to_string(), "SAFE");
        assert_eq!(Mode::Operational.label(), "OP");
        assert_eq!(AckCode::BadParam.to_string(), "BAD_PARAM");
    }

    #[test]
    fn command_ids() {
        assert_eq!(CommandId::from_u8(1), Some(CommandId::SetMode));
        assert_eq!(CommandId::from_u8(3), Some(CommandId::Ping));
        assert_eq!(CommandId::from_u8(99), None);
        assert_eq!(u8::from(CommandId::ResetSeq), 2);
    }
}
