// Operating-mode state machine.
//
// Written from two places: the telemetry loop (`update`) and the uplink
// listener (`apply_command`). Share it as `SharedFsm` and take the lock for
// every read or write.

use std::sync::Arc;

use parking_lot::Mutex;
use shared_protocol::{AckCode, CommandId, Mode};
use tracing::info;

use crate::sensors::SensorSnapshot;

pub type SharedFsm = Arc<Mutex<ModeFsm>>;

/// Safe mode is left only once temperature drops this far below the limit.
pub const TEMP_HYSTERESIS_CENTIDEG: i32 = 200;
/// ... and battery recovers this far above its limit.
pub const BATT_HYSTERESIS_MV: i32 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FsmConfig {
    pub temp_high_centideg: i32,
    pub batt_low_mv: i32,
    /// When false (default) any non-SAFE mode, including a commanded IDLE,
    /// is forced back to OPERATIONAL on the next healthy update.
    pub hold_commanded_idle: bool,
}

impl Default for FsmConfig {
    fn default() -> Self {
        Self {
            temp_high_centideg: 4000,
            batt_low_mv: 3300,
            hold_commanded_idle: false,
        }
    }
}

/// Outcome of one uplink command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ack {
    pub code: AckCode,
    pub message: String,
}

impl Ack {
    fn new(code: AckCode, message: impl Into<String>) -> Self {
        Self { code, message: message.into() }
    }
}

#[derive(Debug)]
pub struct ModeFsm {
    mode: Mode,
    cfg: FsmConfig,
}

impl ModeFsm {
    pub fn new(cfg: FsmConfig) -> Self {
        Self { mode: Mode::Operational, cfg }
    }

    pub fn shared(cfg: FsmConfig) -> SharedFsm {
        Arc::new(Mutex::new(Self::new(cfg)))
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Re-evaluate the mode against a fresh sensor snapshot.
    ///
    /// Out-of-limits always forces SAFE. Leaving SAFE needs both readings
    /// back inside the hysteresis band. Otherwise the mode becomes
    /// OPERATIONAL, which also overwrites a commanded IDLE unless
    /// `hold_commanded_idle` is set.
    pub fn update(&mut self, snap: &SensorSnapshot) -> Mode {
        let temp = snap.temp_centideg as i32;
        let batt = snap.batt_mv as i32;
        let prev = self.mode;

        if temp > self.cfg.temp_high_centideg || batt < self.cfg.batt_low_mv {
            self.mode = Mode::Safe;
        } else if self.mode == Mode::Safe {
            let cool = temp < self.cfg.temp_high_centideg.saturating_sub(TEMP_HYSTERESIS_CENTIDEG);
            let charged = batt > self.cfg.batt_low_mv.saturating_add(BATT_HYSTERESIS_MV);
            if cool && charged {
                self.mode = Mode::Operational;
            }
        } else if !(self.cfg.hold_commanded_idle && self.mode == Mode::Idle) {
            self.mode = Mode::Operational;
        }

        if self.mode != prev {
            info!(from = %prev, to = %self.mode, temp, batt, "mode transition");
        }
        self.mode
    }

    /// Apply an uplink command. Errors come back as ack codes, never panics.
    pub fn apply_command(&mut self, cmd_id: u8, param: i32) -> Ack {
        match CommandId::from_u8(cmd_id) {
            Some(CommandId::SetMode) => match Mode::try_from(param) {
                Ok(mode) => {
                    self.mode = mode;
                    Ack::new(AckCode::Ok, format!("mode set to {mode}"))
                }
                Err(bad) => Ack::new(AckCode::BadParam, format!("invalid mode {bad}")),
            },
            // seq counters belong to the telemetry loop; nothing to reset here
            Some(CommandId::ResetSeq) => Ack::new(AckCode::Ok, "RESET_SEQ acknowledged"),
            Some(CommandId::Ping) => Ack::new(AckCode::Ok, "PONG"),
            None => Ack::new(AckCode::UnknownCmd, format!("unknown command {cmd_id}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn snap(temp_centideg: i16, batt_mv: u16) -> SensorSnapshot {
        SensorSnapshot {
            temp_centideg,
            batt_mv,
            ..SensorSnapshot::default()
        }
    }

    fn fsm() -> ModeFsm {
        ModeFsm::new(FsmConfig::default())
    }

    #[test]
    fn starts_operational() {
        assert_eq!(fsm().mode(), Mode::Operational);
    }

    #[test]
    fn overheat_enters_safe() {
        let mut f = fsm();
        assert_eq!(f.update(&snap(4500, 4000)), Mode::Safe);
    }

    #[test]
    fn low_battery_enters_safe() {
        let mut f = fsm();
        assert_eq!(f.update(&snap(2500, 3299)), Mode::Safe);
    }

    #[test]
    fn thresholds_are_exclusive() {
        let mut f = fsm();
        assert_eq!(f.update(&snap(4000, 3300)), Mode::Operational);
    }

    #[test]
    fn leaves_safe_once_back_inside_band() {
        let mut f = fsm();
        f.update(&snap(4500, 4000));
        assert_eq!(f.update(&snap(3000, 4000)), Mode::Operational);
    }

    #[test]
    fn stays_safe_inside_hysteresis_band() {
        let mut f = fsm();
        f.update(&snap(4500, 4000));
        assert_eq!(f.update(&snap(3850, 4000)), Mode::Safe);
        // battery just above the limit but inside its margin
        assert_eq!(f.update(&snap(3000, 3340)), Mode::Safe);
        assert_eq!(f.update(&snap(3000, 3351)), Mode::Operational);
    }

    #[test]
    fn healthy_update_overwrites_commanded_idle() {
        let mut f = fsm();
        assert_eq!(f.apply_command(1, 2).code, AckCode::Ok);
        assert_eq!(f.mode(), Mode::Idle);
        assert_eq!(f.update(&snap(2500, 4000)), Mode::Operational);
    }

    #[test]
    fn hold_commanded_idle_keeps_idle_until_limits_trip() {
        let mut f = ModeFsm::new(FsmConfig {
            hold_commanded_idle: true,
            ..FsmConfig::default()
        });
        f.apply_command(1, 2);
        assert_eq!(f.update(&snap(2500, 4000)), Mode::Idle);
        assert_eq!(f.update(&snap(4500, 4000)), Mode::Safe);
    }

    #[test]
    fn set_mode_safe() {
        let mut f = fsm();
        let ack = f.apply_command(1, 1);
        assert_eq!(ack.code, AckCode::Ok);
        assert_eq!(f.mode(), Mode::Safe);
    }

    #[test]
    fn set_mode_out_of_range_is_bad_param() {
        let mut f = fsm();
        let ack = f.apply_command(1, 9);
        assert_eq!(ack.code, AckCode::BadParam);
        assert_eq!(f.mode(), Mode::Operational, "mode untouched");
    }

    #[test]
    fn unknown_command() {
        let mut f = fsm();
        assert_eq!(f.apply_command(99, 0).code, AckCode::UnknownCmd);
    }

    #[test]
    fn ping_pongs() {
        let mut f = fsm();
        assert_eq!(f.apply_command(3, 0), Ack::new(AckCode::Ok, "PONG"));
    }

    #[test]
    fn reset_seq_is_ok_without_state_change() {
        let mut f = fsm();
        f.apply_command(1, 2);
        assert_eq!(f.apply_command(2, 0).code, AckCode::Ok);
        assert_eq!(f.mode(), Mode::Idle);
    }

    #[test]
    fn extreme_thresholds_do_not_overflow() {
        for (temp_high_centideg, batt_low_mv) in [
            (i32::MIN, i32::MAX),
            (i32::MAX, i32::MIN),
            (i32::MIN, i32::MIN),
            (i32::MAX, i32::MAX),
        ] {
            let mut f = ModeFsm::new(FsmConfig {
                temp_high_centideg,
                batt_low_mv,
                hold_commanded_idle: false,
            });
            f.apply_command(1, 1);
            for s in [snap(i16::MIN, 0), snap(i16::MAX, u16::MAX), snap(0, 3300)] {
                f.update(&s);
            }
        }
    }

    #[test]
    fn loose_thresholds_leave_safe() {
        let mut f = ModeFsm::new(FsmConfig {
            temp_high_centideg: i32::MAX,
            batt_low_mv: i32::MIN,
            hold_commanded_idle: false,
        });
        f.apply_command(1, 1);
        assert_eq!(f.update(&snap(i16::MAX, 0)), Mode::Operational);
    }

    proptest! {
        #[test]
        fn out_of_limits_always_safe(
            start in 0i32..3,
            temp in any::<i16>(),
            batt in any::<u16>(),
        ) {
            prop_assume!(temp as i32 > 4000 || (batt as i32) < 3300);
            let mut f = fsm();
            f.apply_command(1, start);
            prop_assert_eq!(f.update(&snap(temp, batt)), Mode::Safe);
        }
    }
}
