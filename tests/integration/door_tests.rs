//! Integration tests for central locking, hazard signalling and the siren.

use crate::mock_hw::Rig;

use remotestart::app::ports::{InputLine, Output};
use remotestart::door::hazard::HazardMode;

#[test]
fn lock_pulses_solenoid_then_reports_locked() {
    let mut rig = Rig::new();
    rig.send("lock");
    assert_eq!(rig.sink.take_tokens(), vec!["ACK:LOCK"]);
    assert!(rig.level(Output::Lock));
    assert!(!rig.ctl.door().is_locked(), "state commits on completion");

    rig.run_until(590);
    assert!(rig.level(Output::Lock));
    rig.run_until(600);
    assert!(!rig.level(Output::Lock));
    assert_eq!(rig.sink.take_tokens(), vec!["LOCKED"]);
    assert!(rig.ctl.door().is_locked());
}

#[test]
fn lock_hazard_pattern_is_two_flashes() {
    let mut rig = Rig::new();
    rig.send("lock");
    rig.run_until(600);
    assert_eq!(rig.ctl.door().hazard_mode(), HazardMode::LockPattern);
    assert!(rig.level(Output::Hazard));

    rig.run_until(990);
    assert!(rig.level(Output::Hazard));
    rig.run_until(1_000);
    assert!(!rig.level(Output::Hazard));
    rig.run_until(1_200);
    assert!(rig.level(Output::Hazard));
    rig.run_until(1_600);
    assert!(!rig.level(Output::Hazard));

    rig.run_until(3_000);
    assert_eq!(rig.hw.rising_edges(Output::Hazard), 2);
    assert_eq!(rig.ctl.door().hazard_mode(), HazardMode::Off);
}

#[test]
fn unlock_hazard_is_one_long_flash() {
    let mut rig = Rig::new();
    rig.send("lock");
    rig.run_until(2_000);
    rig.hw.clear_history();
    rig.sink.notices.clear();

    rig.send("unlock");
    let t0 = 2_010;
    assert!(rig.level(Output::Unlock));
    rig.run_until(t0 + 600);
    assert_eq!(rig.sink.take_tokens(), vec!["ACK:UNLOCK", "UNLOCKED"]);
    assert!(rig.level(Output::Hazard));
    rig.run_until(t0 + 1_590);
    assert!(rig.level(Output::Hazard));
    rig.run_until(t0 + 1_600);
    assert!(!rig.level(Output::Hazard));
    assert_eq!(rig.hw.rising_edges(Output::Hazard), 1);
}

#[test]
fn redundant_and_overlapping_requests_are_ignored() {
    let mut rig = Rig::new();
    rig.send("unlock");
    assert_eq!(rig.sink.take_tokens(), vec!["IGNORED:UNLOCK"]);

    rig.send("lock");
    rig.send("lock");
    assert_eq!(rig.sink.take_tokens(), vec!["ACK:LOCK", "IGNORED:LOCK"]);

    rig.run_until(1_000);
    rig.sink.notices.clear();
    rig.send("lock");
    assert_eq!(rig.sink.take_tokens(), vec!["IGNORED:LOCK"]);
}

#[test]
fn lock_and_unlock_coils_never_overlap() {
    let mut rig = Rig::new();
    rig.send("lock");
    rig.run_until(700);
    rig.send("unlock");
    rig.run_until(2_000);
    let mut lock = false;
    let mut unlock = false;
    for &(output, on) in &rig.hw.writes {
        match output {
            Output::Lock => lock = on,
            Output::Unlock => unlock = on,
            _ => {}
        }
        assert!(!(lock && unlock), "both coils energised");
    }
}

#[test]
fn locked_with_engine_off_arms_indicator() {
    let mut rig = Rig::new();
    assert!(!rig.ctl.door().is_indicator_blinking());
    rig.send("lock");
    rig.run_until(600);
    assert!(rig.ctl.door().is_indicator_blinking());
    assert!(rig.level(Output::Indicator));

    rig.send("starter_on");
    assert!(rig.ctl.engine_on());
    assert!(!rig.ctl.door().is_indicator_blinking());
    assert!(!rig.level(Output::Indicator));
}

#[test]
fn remote_a_and_b_lock_and_unlock() {
    let mut rig = Rig::new();
    rig.pulse_input(InputLine::RemoteLock, 50);
    rig.run_until(1_000);
    assert!(rig.ctl.door().is_locked());

    rig.pulse_input(InputLine::RemoteUnlock, 50);
    rig.run_until(2_000);
    assert!(!rig.ctl.door().is_locked());
    assert_eq!(
        rig.sink.take_tokens(),
        vec!["ACK:LOCK", "LOCKED", "ACK:UNLOCK", "UNLOCKED"]
    );
}

#[test]
fn alarm_toggles_siren_and_continuous_hazard() {
    let mut rig = Rig::new();
    rig.send("alarm_on");
    assert!(rig.ctl.door().is_alarm_on());
    assert_eq!(rig.ctl.door().hazard_mode(), HazardMode::AlarmContinuous);
    assert!(rig.level(Output::Alarm));

    rig.run_until(1_000);
    assert!(rig.hw.rising_edges(Output::Alarm) >= 2, "siren pulses");
    assert!(rig.hw.rising_edges(Output::Hazard) >= 2, "hazard flashes");

    rig.send("alarm_off");
    assert!(!rig.ctl.door().is_alarm_on());
    assert_eq!(rig.ctl.door().hazard_mode(), HazardMode::Off);
    assert!(!rig.level(Output::Alarm));
    assert!(!rig.level(Output::Hazard));
}

#[test]
fn remote_d_toggles_alarm() {
    let mut rig = Rig::new();
    rig.pulse_input(InputLine::RemoteAlarm, 50);
    assert!(rig.ctl.door().is_alarm_on());
    rig.pulse_input(InputLine::RemoteAlarm, 50);
    assert!(!rig.ctl.door().is_alarm_on());
    assert_eq!(
        rig.sink.take_tokens(),
        vec!["ACK:ALARM_ON", "ACK:ALARM_OFF"]
    );
}

#[test]
fn lock_pattern_preempts_alarm_hazard_but_siren_continues() {
    let mut rig = Rig::new();
    rig.send("alarm_on");
    rig.send("lock");
    rig.run_until(700);
    assert_eq!(rig.ctl.door().hazard_mode(), HazardMode::LockPattern);
    assert!(rig.ctl.door().is_alarm_on());

    rig.send("alarm_off");
    assert!(!rig.ctl.door().is_alarm_on());
    assert_eq!(
        rig.ctl.door().hazard_mode(),
        HazardMode::LockPattern,
        "turning the siren off leaves a lock pattern alone"
    );
}
