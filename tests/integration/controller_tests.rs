//! Integration tests for the command path and the start sequence.
//!
//! Commands enter as text through `Controller::tick`, exactly as the
//! firmware loop feeds them from the command channel.

use crate::mock_hw::{MockClock, MockConfigStore, Rig, datetime};

use remotestart::app::ports::{ConfigPort, InputLine, Output};
use remotestart::config::SystemConfig;
use remotestart::drivers::blink::Cadence;
use remotestart::engine::SequencerState;
use remotestart::engine::starter::StarterOwner;

// ── Start sequence ────────────────────────────────────────────

#[test]
fn start_the_car_walks_acc_ig_crank_countdown() {
    let mut rig = Rig::new();

    rig.send("start_the_car");
    assert_eq!(rig.sink.take_tokens(), vec!["ACK:START_THE_CAR"]);
    assert!(rig.level(Output::Acc));
    assert!(!rig.level(Output::Ignition));

    rig.run_until(990);
    assert!(!rig.level(Output::Ignition), "IG must wait a full stage");
    rig.run_until(1000);
    assert!(rig.level(Output::Ignition));

    rig.run_until(1990);
    assert!(!rig.level(Output::Starter));
    rig.run_until(2000);
    assert!(rig.level(Output::Starter));
    assert_eq!(rig.ctl.starter().holder(), Some(StarterOwner::Sequencer));
    assert_eq!(rig.ctl.sequencer().power_led_cadence(), Some(Cadence::FAST));

    rig.run_until(3000);
    assert!(!rig.level(Output::Starter), "crank lasts exactly one second");
    assert_eq!(rig.ctl.sequencer().state(), SequencerState::Countdown);

    rig.run_until(14_990);
    assert!(!rig.sink.contains("ENGINE:ON"));
    rig.run_until(15_000);
    assert_eq!(rig.sink.take_tokens(), vec!["ENGINE:ON"]);
    assert!(rig.ctl.engine_on());
    assert!(rig.level(Output::Acc) && rig.level(Output::Ignition));
    assert_eq!(rig.ctl.sequencer().power_led_cadence(), Some(Cadence::SLOW));
}

#[test]
fn start_is_refused_while_pending_or_running() {
    let mut rig = Rig::new();
    rig.send("start_the_car");
    rig.send("start_the_car");
    assert_eq!(
        rig.sink.take_tokens(),
        vec!["ACK:START_THE_CAR", "IGNORED:START_THE_CAR"]
    );

    rig.run_until(15_000);
    assert!(rig.ctl.engine_on());
    rig.sink.notices.clear();

    rig.send("start_the_car");
    assert_eq!(rig.sink.take_tokens(), vec!["IGNORED:START_THE_CAR"]);
}

#[test]
fn trigger_during_countdown_recranks_and_restarts_window() {
    let mut rig = Rig::new();
    rig.send("start_the_car");
    rig.run_until(4_990);
    assert_eq!(rig.ctl.sequencer().state(), SequencerState::Countdown);

    rig.send("start_the_car");
    assert!(rig.sink.contains("ACK:START_THE_CAR"));
    assert!(rig.level(Output::Starter));

    rig.run_until(6_000);
    assert!(!rig.level(Output::Starter));

    rig.run_until(19_990);
    assert!(!rig.ctl.engine_on(), "window restarted from the re-crank");
    rig.run_until(20_000);
    assert!(rig.ctl.engine_on());
}

#[test]
fn starter_pulse_is_exclusive_and_self_releasing() {
    let mut rig = Rig::new();
    rig.send("starter_on");
    assert_eq!(rig.sink.take_tokens(), vec!["ACK:STARTER_ON"]);
    assert!(rig.level(Output::Starter));
    assert!(rig.ctl.engine_on());

    rig.send("starter_on");
    assert_eq!(rig.sink.take_tokens(), vec!["IGNORED:STARTER_ON"]);

    rig.run_until(990);
    assert!(rig.level(Output::Starter));
    rig.run_until(1_000);
    assert!(!rig.level(Output::Starter));
    assert!(!rig.ctl.starter().is_busy());
}

#[test]
fn starter_pulse_refused_while_sequencer_cranks() {
    let mut rig = Rig::new();
    rig.send("start_the_car");
    rig.run_until(2_490);
    rig.sink.notices.clear();

    rig.send("starter_on");
    assert_eq!(rig.sink.take_tokens(), vec!["IGNORED:STARTER_ON"]);
    assert_eq!(rig.ctl.starter().holder(), Some(StarterOwner::Sequencer));
}

// ── Command responses ─────────────────────────────────────────

#[test]
fn every_plain_command_gets_exactly_one_ack() {
    let cases = [
        ("acc_on", "ACK:ACC_ON"),
        ("acc_off", "ACK:ACC_OFF"),
        ("IG_ON", "ACK:IG_ON"),
        ("ig_off", "ACK:IG_OFF"),
        ("lamp_on", "ACK:LAMP_ON"),
        ("lamp_off", "ACK:LAMP_OFF"),
        ("alarm_on", "ACK:ALARM_ON"),
        ("alarm_off", "ACK:ALARM_OFF"),
    ];
    let mut rig = Rig::new();
    for (command, token) in cases {
        rig.send(command);
        assert_eq!(rig.sink.take_tokens(), vec![token], "for {command}");
    }
}

#[test]
fn acc_and_lamp_drive_their_outputs() {
    let mut rig = Rig::new();
    rig.send("acc_on");
    rig.send("lamp_on");
    assert!(rig.level(Output::Acc) && rig.level(Output::Lamp));
    rig.send("acc_off");
    rig.send("lamp_off");
    assert!(!rig.level(Output::Acc) && !rig.level(Output::Lamp));
}

#[test]
fn unknown_text_is_echoed_trimmed() {
    let mut rig = Rig::new();
    rig.send("  Open Trunk ");
    assert_eq!(rig.sink.take_tokens(), vec!["UNKNOWN:Open Trunk"]);
}

#[test]
fn countdown_window_is_validated_and_persisted() {
    let mut rig = Rig::new();
    rig.send("btncd 3000");
    rig.send("btncd abc");
    rig.send("btncd");
    assert_eq!(
        rig.sink.take_tokens(),
        vec!["INVALID:BTNCD", "INVALID:BTNCD", "INVALID:BTNCD"]
    );
    assert!(!rig.ctl.is_config_dirty());

    rig.send("btncd5000");
    assert_eq!(rig.sink.take_tokens(), vec!["ACK:BTNCD"]);
    assert_eq!(rig.ctl.sequencer().countdown_window_ms(), 5_000);
    assert!(rig.ctl.is_config_dirty());

    let store = MockConfigStore::default();
    assert!(rig.ctl.save_config_if_dirty(&store));
    assert!(!rig.ctl.save_config_if_dirty(&store));
    assert_eq!(store.saves.get(), 1);
    assert_eq!(
        store.saved.borrow().as_ref().map(|c| c.countdown_window_ms),
        Some(5_000)
    );
}

#[test]
fn failed_save_keeps_config_dirty() {
    let mut rig = Rig::new();
    rig.send("btncd 20000");
    let store = MockConfigStore {
        fail: true,
        ..Default::default()
    };
    assert!(!rig.ctl.save_config_if_dirty(&store));
    assert!(rig.ctl.is_config_dirty());
}

#[test]
fn shorter_countdown_window_applies_to_next_start() {
    let mut rig = Rig::new();
    rig.send("btncd 5000");
    rig.sink.notices.clear();
    let t0 = rig.now.as_millis();
    rig.send("start_the_car");
    rig.run_until(t0 + 4_990);
    assert!(!rig.ctl.engine_on());
    rig.run_until(t0 + 5_000);
    assert!(rig.ctl.engine_on());
}

#[test]
fn warm_length_query_and_update() {
    let mut rig = Rig::new();
    rig.send("warmlen");
    rig.send("warmlen 61");
    rig.send("warmlen 0");
    rig.send("warmlen 20");
    rig.send("WARMLEN");
    assert_eq!(
        rig.sink.take_tokens(),
        vec![
            "WARMLEN:10",
            "INVALID:WARMLEN",
            "INVALID:WARMLEN",
            "ACK:WARMLEN",
            "WARMLEN:20"
        ]
    );
    assert_eq!(rig.ctl.current_config().warm_duration_minutes, 20);
    assert!(rig.ctl.is_config_dirty());
}

#[test]
fn warm_trigger_time_is_validated_persisted_and_applied() {
    let clock = MockClock::at(datetime(2025, 3, 14, 7, 5, 0));
    let mut rig = Rig::with(SystemConfig::default(), clock);
    rig.send("warmat");
    rig.send("warmat 24:00");
    rig.send("warmat 7");
    assert_eq!(
        rig.sink.take_tokens(),
        vec!["WARMAT:15:31", "INVALID:WARMAT", "INVALID:WARMAT"]
    );
    assert!(!rig.ctl.is_config_dirty());
    assert!(!rig.ctl.warm().is_active());

    rig.send("warmat 07:05");
    assert_eq!(rig.sink.take_tokens(), vec!["ACK:WARMAT"]);
    rig.run_for(10);
    assert_eq!(rig.sink.take_tokens(), vec!["WARM:ON"], "fires at the new minute");

    rig.send("WARMAT");
    assert_eq!(rig.sink.take_tokens(), vec!["WARMAT:07:05"]);

    let store = MockConfigStore::default();
    assert!(rig.ctl.save_config_if_dirty(&store));
    let saved = store.load().unwrap();
    assert_eq!((saved.warm_trigger_hour, saved.warm_trigger_minute), (7, 5));

    let mut rebooted = Rig::with(saved, MockClock::untrusted());
    rebooted.send("warmat");
    assert_eq!(rebooted.sink.take_tokens(), vec!["WARMAT:07:05"]);
}

// ── Clock ─────────────────────────────────────────────────────

#[test]
fn clock_set_and_query() {
    let mut rig = Rig::new();
    rig.send("rtc");
    rig.send("setrtc 2025-03-14 08:00:00");
    rig.send("rtc");
    rig.send("setrtc now");
    rig.send("setrtc 2025-02-30 00:00:00");
    rig.send("hosttime 2025-03-15 09:10:11");
    rig.send("rtc");
    assert_eq!(
        rig.sink.take_tokens(),
        vec![
            "RTC:2000-01-01 00:00:00",
            "ACK:SETRTC",
            "RTC:2025-03-14 08:00:00",
            "INVALID:SETRTC",
            "INVALID:SETRTC",
            "ACK:SETRTC",
            "RTC:2025-03-15 09:10:11",
        ]
    );
}

#[test]
fn missing_clock_chip_ignores_set() {
    let mut clock = MockClock::untrusted();
    clock.present = false;
    let mut rig = Rig::with(Default::default(), clock);
    rig.send("setrtc 2025-03-14 08:00:00");
    assert_eq!(rig.sink.take_tokens(), vec!["IGNORED:SETRTC"]);
}

#[test]
fn clock_broadcast_every_ten_seconds() {
    let mut rig = Rig::new();
    rig.run_until(9_990);
    assert!(rig.sink.notices.is_empty());
    rig.run_until(10_000);
    assert_eq!(rig.sink.take_tokens(), vec!["RTC:2000-01-01 00:00:00"]);
    rig.run_until(20_000);
    assert_eq!(rig.sink.take_tokens(), vec!["RTC:2000-01-01 00:00:00"]);
}

#[test]
fn trusted_clock_is_broadcast_verbatim() {
    let clock = MockClock::at(datetime(2025, 6, 2, 9, 4, 7));
    let mut rig = Rig::with(Default::default(), clock);
    rig.run_until(10_000);
    assert_eq!(rig.sink.take_tokens(), vec!["RTC:2025-06-02 09:04:07"]);
}

// ── Remote and button ─────────────────────────────────────────

#[test]
fn remote_c_starts_then_resets() {
    let mut rig = Rig::new();
    rig.pulse_input(InputLine::RemoteStart, 100);
    assert_eq!(rig.sink.take_tokens(), vec!["ACK:START_THE_CAR"]);

    rig.run_until(15_200);
    assert!(rig.ctl.engine_on());
    rig.sink.notices.clear();

    rig.pulse_input(InputLine::RemoteStart, 100);
    assert_eq!(rig.sink.take_tokens(), vec!["ACK:RESET_ALL"]);
    assert!(!rig.ctl.engine_on());
    assert!(!rig.level(Output::Ignition));
}

#[test]
fn held_remote_line_fires_once() {
    let mut rig = Rig::new();
    rig.pulse_input(InputLine::RemoteStart, 3_000);
    assert_eq!(rig.sink.count("ACK:START_THE_CAR"), 1);
    assert_eq!(rig.sink.count("IGNORED:START_THE_CAR"), 0);
}

#[test]
fn button_press_starts_and_hold_cranks_manually() {
    let mut rig = Rig::new();
    rig.hw.set_input(InputLine::Button, true);
    rig.run_until(40);
    assert!(!rig.level(Output::Acc), "debounce not yet satisfied");
    rig.run_until(50);
    assert!(rig.level(Output::Acc));
    rig.hw.set_input(InputLine::Button, false);

    rig.run_until(3_990);
    assert_eq!(rig.ctl.sequencer().state(), SequencerState::Countdown);
    assert!(!rig.level(Output::Starter));

    rig.hw.set_input(InputLine::Button, true);
    rig.run_until(4_050);
    assert!(rig.level(Output::Starter));
    assert_eq!(rig.ctl.starter().holder(), Some(StarterOwner::ManualHold));
    assert!(rig.ctl.sequencer().is_manual_hold_active());

    rig.run_until(6_000);
    assert!(rig.level(Output::Starter), "manual hold has no timeout");

    rig.hw.set_input(InputLine::Button, false);
    rig.run_until(6_100);
    assert!(!rig.level(Output::Starter));
    assert!(!rig.ctl.starter().is_busy());

    rig.run_until(19_040);
    assert!(!rig.ctl.engine_on(), "hold restarted the countdown");
    rig.run_until(19_060);
    assert!(rig.ctl.engine_on());
}

#[test]
fn button_press_with_engine_running_resets() {
    let mut rig = Rig::new();
    rig.send("start_the_car");
    rig.run_until(15_000);
    assert!(rig.ctl.engine_on());
    rig.sink.notices.clear();

    rig.pulse_input(InputLine::Button, 100);
    assert!(rig.sink.contains("ACK:RESET_ALL"));
    assert!(!rig.ctl.engine_on());
    assert!(!rig.level(Output::Ignition));
}

#[test]
fn button_bounce_shorter_than_debounce_is_ignored() {
    let mut rig = Rig::new();
    rig.pulse_input(InputLine::Button, 30);
    assert!(!rig.level(Output::Acc));
    assert_eq!(rig.ctl.sequencer().state(), SequencerState::Idle);
}
