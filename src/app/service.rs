//! Controller — the hexagonal core.
//!
//! [`Controller`] owns every state machine (start sequencer, starter latch,
//! door actuator, warm-up scheduler) and the input debouncers.  All I/O
//! flows through port traits injected at call sites, so the whole
//! controller runs against mock adapters on the host.
//!
//! ```text
//!   InputPort ──▶ ┌──────────────────────────────┐ ──▶ EventSink
//!   ClockPort ──▶ │          Controller          │
//!    commands ──▶ │ Sequencer · Latch · Door ·   │
//! ActuatorPort ◀──│ Warm-up · Reset              │
//!                 └──────────────────────────────┘
//! ```
//!
//! ## Tick phases (fixed order)
//!
//! 1. Input sampling (button + four receiver lines)
//! 2. Door actuator (pulse completion, hazard, siren, indicator)
//! 3. Warm-up scheduler
//! 4. Receiver edges, then queued text commands
//! 5. Button edges, then the start sequencer
//! 6. Periodic broadcast (clock or warm-up remaining)
//! 7. Timed starter pulse release
//! 8. Deferred reset completion (ACC, LAMP, hazard and siren off)
//!
//! Input is always applied before the sequencer advances, so a trigger
//! landing on the exact tick a stage deadline expires sees the old stage.

use log::{debug, info, warn};

use crate::config::SystemConfig;
use crate::door::{DoorActuator, DoorEvent};
use crate::drivers::input::{Edge, InputChannel};
use crate::engine::starter::{StarterLatch, StarterOwner, STARTER_PULSE_MS};
use crate::engine::{EngineSequencer, SequencerEvent, SequencerState, Trigger};
use crate::error::{CommandError, Rejection};
use crate::time::Instant;
use crate::warmup::{WarmEvent, WarmScheduler};

use super::commands::{self, Action, Command, ParseError};
use super::events::Notice;
use super::ports::{ActuatorPort, ClockPort, ConfigPort, EventSink, InputLine, InputPort, Output};

/// Grace period between the two halves of a full reset.
pub const RESET_GRACE_MS: u32 = 500;

const REMOTE_LINES: [InputLine; 4] = [
    InputLine::RemoteLock,
    InputLine::RemoteUnlock,
    InputLine::RemoteStart,
    InputLine::RemoteAlarm,
];

/// Successful command outcome.
enum Reply {
    Ack,
    Answer(Notice),
}

/// Failed command outcome.
enum Refusal {
    Ignored(Rejection),
    Invalid(CommandError),
}

impl From<Rejection> for Refusal {
    fn from(r: Rejection) -> Self {
        Self::Ignored(r)
    }
}

impl From<CommandError> for Refusal {
    fn from(e: CommandError) -> Self {
        Self::Invalid(e)
    }
}

// ───────────────────────────────────────────────────────────────
// Controller
// ───────────────────────────────────────────────────────────────

pub struct Controller {
    config: SystemConfig,
    sequencer: EngineSequencer,
    latch: StarterLatch,
    door: DoorActuator,
    warm: WarmScheduler,
    button: InputChannel,
    remotes: [InputChannel; 4],
    reset_at: Option<Instant>,
    last_broadcast: Instant,
    tick_count: u64,
    config_dirty: bool,
}

impl Controller {
    /// Construct the controller from configuration.
    ///
    /// Does **not** touch outputs — call [`start`](Self::start) next.
    pub fn new(config: SystemConfig) -> Self {
        let sequencer = EngineSequencer::new(config.countdown_window_ms);
        let warm = WarmScheduler::new(
            config.warm_duration_minutes,
            config.warm_trigger_hour,
            config.warm_trigger_minute,
        );
        Self {
            config,
            sequencer,
            latch: StarterLatch::new(),
            door: DoorActuator::new(),
            warm,
            button: InputChannel::button(),
            remotes: [
                InputChannel::remote(),
                InputChannel::remote(),
                InputChannel::remote(),
                InputChannel::remote(),
            ],
            reset_at: None,
            last_broadcast: Instant::ZERO,
            tick_count: 0,
            config_dirty: false,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Drive every output to its safe level and start the idle blink.
    pub fn start(&mut self, now: Instant, hw: &mut impl ActuatorPort) {
        hw.all_off();
        self.sequencer.begin(now, hw);
        self.last_broadcast = now;
        info!(
            "Controller started: countdown {} ms, warm {} min at {:02}:{:02}",
            self.config.countdown_window_ms,
            self.config.warm_duration_minutes,
            self.config.warm_trigger_hour,
            self.config.warm_trigger_minute
        );
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one cooperative tick.
    ///
    /// `commands` are text commands that arrived since the previous tick
    /// (wireless link, console); they are handled in the receiver phase.
    /// The `hw` parameter satisfies **both** [`InputPort`] and
    /// [`ActuatorPort`].
    pub fn tick<I>(
        &mut self,
        now: Instant,
        hw: &mut (impl InputPort + ActuatorPort),
        clock: &mut impl ClockPort,
        sink: &mut impl EventSink,
        commands: I,
    ) where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        self.tick_count += 1;

        // 1. Input sampling
        let button_edge = self.button.sample(hw.is_asserted(InputLine::Button), now);
        let mut remote_edges = [None; 4];
        for ((edge, channel), line) in remote_edges
            .iter_mut()
            .zip(self.remotes.iter_mut())
            .zip(REMOTE_LINES)
        {
            *edge = channel.sample(hw.is_asserted(line), now);
        }

        // 2. Door actuator
        match self.door.tick(now, hw) {
            Some(DoorEvent::Locked) => sink.emit(&Notice::Locked),
            Some(DoorEvent::Unlocked) => sink.emit(&Notice::Unlocked),
            None => {}
        }

        // 3. Warm-up scheduler
        let reading = clock.now();
        for event in self.warm.tick(now, &reading, &mut self.latch, hw) {
            match event {
                WarmEvent::Started => sink.emit(&Notice::WarmStarted),
                WarmEvent::StarterEngaged => {
                    self.set_engine_state(true, now, hw);
                    sink.emit(&Notice::StarterEngaged);
                }
                WarmEvent::Finished => {
                    // ACC and IG are gone: a ramp or hold cannot continue.
                    if self.sequencer.state() != SequencerState::Idle
                        || self.sequencer.is_manual_hold_active()
                    {
                        self.sequencer.abort(now, &mut self.latch, hw);
                    }
                    self.door.set_alarm(false, now, hw);
                    self.set_engine_state(false, now, hw);
                    sink.emit(&Notice::WarmDone);
                }
            }
        }

        // 4. Receiver edges, then queued commands
        for (line, edge) in REMOTE_LINES.into_iter().zip(remote_edges) {
            if edge == Some(Edge::Rising) {
                self.on_remote(line, now, hw, clock, sink);
            }
        }
        for text in commands {
            self.handle_text(text.as_ref(), now, hw, clock, sink);
        }

        // 5. Button, then sequencer
        match button_edge {
            Some(Edge::Rising) => self.on_button_press(now, hw, sink),
            Some(Edge::Falling) => {
                self.sequencer.release(&mut self.latch, hw);
            }
            None => {}
        }
        if let Some(SequencerEvent::EngineRunning) = self.sequencer.tick(now, &mut self.latch, hw) {
            self.set_engine_state(true, now, hw);
            sink.emit(&Notice::EngineRunning);
        }

        // 6. Periodic broadcast
        if now.millis_since(self.last_broadcast) >= self.config.broadcast_interval_ms {
            self.last_broadcast = now;
            if self.warm.is_active() {
                sink.emit(&Notice::WarmRemaining(self.warm.remaining_ms(now)));
            } else {
                sink.emit(&Notice::Clock(reading));
            }
        }

        // 7. Timed starter pulse release
        if let Some(owner) = self.latch.tick(now, hw) {
            debug!("Starter pulse for {:?} complete", owner);
        }

        // 8. Deferred reset completion
        if let Some(deadline) = self.reset_at {
            if now.has_reached(deadline) {
                self.reset_at = None;
                hw.set_output(Output::Acc, false);
                hw.set_output(Output::Lamp, false);
                self.door.silence(hw);
                info!("Reset complete: all outputs off");
                sink.emit(&Notice::AllOff);
            }
        }
    }

    // ── Command handling ──────────────────────────────────────

    /// Parse and execute one line of command text.
    pub fn handle_text(
        &mut self,
        text: &str,
        now: Instant,
        hw: &mut impl ActuatorPort,
        clock: &mut impl ClockPort,
        sink: &mut impl EventSink,
    ) {
        match commands::parse(text) {
            Ok(cmd) => self.handle_command(cmd, now, hw, clock, sink),
            Err(ParseError::Malformed { action, error }) => {
                warn!("Command {} rejected: {}", action, error);
                sink.emit(&Notice::Invalid(action));
            }
            Err(ParseError::Unknown) => {
                warn!("Unknown command {:?}", text.trim());
                sink.emit(&Notice::Unknown(text.trim().into()));
            }
        }
    }

    /// Execute a command and emit exactly one response notice.
    pub fn handle_command(
        &mut self,
        cmd: Command,
        now: Instant,
        hw: &mut impl ActuatorPort,
        clock: &mut impl ClockPort,
        sink: &mut impl EventSink,
    ) {
        let action = cmd.action();
        match self.apply(cmd, now, hw, clock) {
            Ok(Reply::Ack) => {
                info!("Action: {}", action);
                sink.emit(&Notice::Ack(action));
            }
            Ok(Reply::Answer(notice)) => sink.emit(&notice),
            Err(Refusal::Ignored(reason)) => {
                info!("Ignored {} ({})", action, reason);
                sink.emit(&Notice::Ignored(action));
            }
            Err(Refusal::Invalid(error)) => {
                warn!("Invalid {} ({})", action, error);
                sink.emit(&Notice::Invalid(action));
            }
        }
    }

    fn apply(
        &mut self,
        cmd: Command,
        now: Instant,
        hw: &mut impl ActuatorPort,
        clock: &mut impl ClockPort,
    ) -> Result<Reply, Refusal> {
        match cmd {
            Command::Acc(on) => hw.set_output(Output::Acc, on),
            Command::Ignition(on) => hw.set_output(Output::Ignition, on),
            Command::Lamp(on) => hw.set_output(Output::Lamp, on),
            Command::Alarm(on) => {
                self.door.set_alarm(on, now, hw);
            }
            Command::StartTheCar => self.start_the_car(now, hw)?,
            Command::StarterPulse => {
                self.latch
                    .try_engage(StarterOwner::Command, now, Some(STARTER_PULSE_MS), hw)?;
                self.set_engine_state(true, now, hw);
            }
            Command::Lock => self.door.lock_pulse(now, hw)?,
            Command::Unlock => self.door.unlock_pulse(now, hw)?,
            Command::ResetAll => self.full_reset(now, hw),
            Command::SetCountdownWindow(ms) => {
                let candidate = SystemConfig {
                    countdown_window_ms: ms,
                    ..self.config.clone()
                };
                candidate
                    .validate()
                    .map_err(|_| CommandError::OutOfRange)?;
                self.sequencer.set_countdown_window(ms);
                self.config = candidate;
                self.mark_config_dirty();
            }
            Command::SetClock(datetime) => {
                clock.set(datetime).map_err(Rejection::from)?;
                info!("Clock set to {}", clock.now());
            }
            Command::QueryClock => return Ok(Reply::Answer(Notice::Clock(clock.now()))),
            Command::ForceWarm => self.warm.force_start(now, hw)?,
            Command::SetWarmDuration(minutes) => {
                self.warm.set_duration_minutes(minutes)?;
                self.config.warm_duration_minutes = minutes;
                self.mark_config_dirty();
            }
            Command::QueryWarmDuration => {
                return Ok(Reply::Answer(Notice::WarmDuration(
                    self.warm.duration_minutes(),
                )));
            }
            Command::SetWarmTime { hour, minute } => {
                let candidate = SystemConfig {
                    warm_trigger_hour: hour,
                    warm_trigger_minute: minute,
                    ..self.config.clone()
                };
                candidate
                    .validate()
                    .map_err(|_| CommandError::OutOfRange)?;
                self.warm.set_trigger_time(hour, minute);
                self.config = candidate;
                self.mark_config_dirty();
            }
            Command::QueryWarmTime => {
                let (hour, minute) = self.warm.trigger_time();
                return Ok(Reply::Answer(Notice::WarmTime(hour, minute)));
            }
        }
        Ok(Reply::Ack)
    }

    fn start_the_car(&mut self, now: Instant, hw: &mut impl ActuatorPort) -> Result<(), Rejection> {
        if self.sequencer.engine_on() {
            return Err(Rejection::EngineRunning);
        }
        if self.latch.is_busy() {
            return Err(Rejection::StarterBusy);
        }
        if self.sequencer.is_start_pending() {
            return Err(Rejection::StartPending);
        }
        match self.sequencer.trigger(now, &mut self.latch, hw) {
            Trigger::Started => {
                self.set_engine_state(false, now, hw);
                Ok(())
            }
            Trigger::Restarted | Trigger::HoldEngaged => Ok(()),
            Trigger::ResetRequested => Err(Rejection::EngineRunning),
            Trigger::Ignored(reason) => Err(reason),
        }
    }

    // ── Input edges ───────────────────────────────────────────

    fn on_remote(
        &mut self,
        line: InputLine,
        now: Instant,
        hw: &mut impl ActuatorPort,
        clock: &mut impl ClockPort,
        sink: &mut impl EventSink,
    ) {
        debug!("Remote: {:?}", line);
        let cmd = match line {
            InputLine::RemoteLock => Command::Lock,
            InputLine::RemoteUnlock => Command::Unlock,
            InputLine::RemoteStart if self.sequencer.engine_on() => Command::ResetAll,
            InputLine::RemoteStart => Command::StartTheCar,
            InputLine::RemoteAlarm => Command::Alarm(!self.door.is_alarm_on()),
            InputLine::Button => return,
        };
        self.handle_command(cmd, now, hw, clock, sink);
    }

    fn on_button_press(&mut self, now: Instant, hw: &mut impl ActuatorPort, sink: &mut impl EventSink) {
        match self.sequencer.press(now, &mut self.latch, hw) {
            Trigger::Started => self.set_engine_state(false, now, hw),
            Trigger::ResetRequested => {
                self.full_reset(now, hw);
                sink.emit(&Notice::Ack(Action::ResetAll));
            }
            Trigger::Restarted | Trigger::HoldEngaged => {}
            Trigger::Ignored(reason) => debug!("Button press ignored ({})", reason),
        }
    }

    // ── Shared flows ──────────────────────────────────────────

    /// Propagate the engine flag to every component that depends on it.
    fn set_engine_state(&mut self, on: bool, now: Instant, hw: &mut impl ActuatorPort) {
        self.sequencer.set_engine_status(on);
        self.door.set_engine_state(on, now, hw);
    }

    /// First half of a full reset.  ACC, LAMP and hazard follow after
    /// [`RESET_GRACE_MS`] in tick phase 8.
    fn full_reset(&mut self, now: Instant, hw: &mut impl ActuatorPort) {
        hw.set_output(Output::Ignition, false);
        self.latch.force_off(hw);
        self.sequencer.abort(now, &mut self.latch, hw);
        self.warm.cancel();
        self.door.cancel_all(hw);
        self.set_engine_state(false, now, hw);
        self.reset_at = Some(now + RESET_GRACE_MS);
        info!("Reset: IG/starter/alarm off, ACC off in {} ms", RESET_GRACE_MS);
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn engine_on(&self) -> bool {
        self.sequencer.engine_on()
    }

    pub fn sequencer(&self) -> &EngineSequencer {
        &self.sequencer
    }

    pub fn starter(&self) -> &StarterLatch {
        &self.latch
    }

    pub fn door(&self) -> &DoorActuator {
        &self.door
    }

    pub fn warm(&self) -> &WarmScheduler {
        &self.warm
    }

    pub fn is_reset_pending(&self) -> bool {
        self.reset_at.is_some()
    }

    /// Total ticks executed since startup.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Clone of the live configuration.
    pub fn current_config(&self) -> SystemConfig {
        self.config.clone()
    }

    // ── Config dirty-flag management ──────────────────────────

    fn mark_config_dirty(&mut self) {
        self.config_dirty = true;
    }

    /// Persist the config if a command changed it.  Returns `true` if saved.
    pub fn save_config_if_dirty(&mut self, storage: &impl ConfigPort) -> bool {
        if !self.config_dirty {
            return false;
        }
        match storage.save(&self.config) {
            Ok(()) => {
                self.config_dirty = false;
                info!("Config saved to NVS");
                true
            }
            Err(e) => {
                warn!("Config save failed: {}", e);
                false
            }
        }
    }

    /// Whether the config has unsaved changes.
    pub fn is_config_dirty(&self) -> bool {
        self.config_dirty
    }
}
