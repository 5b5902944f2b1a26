//! RemoteStart Firmware — Main Entry Point
//!
//! Hexagonal architecture with a single cooperative control loop.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  GpioHardware      LogEventSink +    NvsAdapter   SoftRtc      │
//! │  (Actuator+Input)  ChunkedNotifier   (Config)     (ClockPort)  │
//! │                    (EventSink)                                 │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              Controller (pure logic)                   │    │
//! │  │  Sequencer · Starter latch · Door · Warm-up            │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  Console reader thread ──▶ COMMAND_CHANNEL ──▶ tick loop       │
//! └────────────────────────────────────────────────────────────────┘
//! ```

use std::io::BufRead;
use std::time::Duration;

use anyhow::Result;
use esp_idf_svc::hal::delay::FreeRtos;
use esp_idf_svc::hal::gpio::{AnyInputPin, AnyOutputPin, Input, Output as OutputMode, PinDriver};
use esp_idf_svc::sys::{esp, gpio_pull_mode_t_GPIO_PULLUP_ONLY, gpio_set_pull_mode};
use log::{info, warn};

use remotestart::adapters::hardware::GpioHardware;
use remotestart::adapters::log_sink::LogEventSink;
use remotestart::adapters::notify::{ChunkedNotifier, ConsoleTransport, Tee};
use remotestart::adapters::nvs::NvsAdapter;
use remotestart::adapters::rtc::SoftRtc;
use remotestart::adapters::time::MonotonicClock;
use remotestart::app::ports::ConfigPort;
use remotestart::app::service::Controller;
use remotestart::channels::{self, COMMAND_CHANNEL};
use remotestart::config::SystemConfig;
use remotestart::pins;

type OutPin = PinDriver<'static, AnyOutputPin, OutputMode>;
type InPin = PinDriver<'static, AnyInputPin, Input>;

/// Order matches `Output::ALL`.
const OUTPUT_GPIOS: [i32; 10] = [
    pins::ACC_GPIO,
    pins::IG_GPIO,
    pins::STARTER_GPIO,
    pins::LOCK_GPIO,
    pins::UNLOCK_GPIO,
    pins::HAZARD_GPIO,
    pins::INDICATOR_GPIO,
    pins::LAMP_GPIO,
    pins::ALARM_GPIO,
    pins::POWER_LED_GPIO,
];

/// Order matches `InputLine::ALL`.
const INPUT_GPIOS: [i32; 5] = [
    pins::BUTTON_GPIO,
    pins::REMOTE_A_GPIO,
    pins::REMOTE_B_GPIO,
    pins::REMOTE_C_GPIO,
    pins::REMOTE_D_GPIO,
];

fn output_pin(gpio: i32) -> Result<OutPin> {
    // SAFETY: each GPIO number in OUTPUT_GPIOS is claimed exactly once.
    let pin = unsafe { AnyOutputPin::new(gpio) };
    Ok(PinDriver::output(pin)?)
}

fn input_pin(gpio: i32) -> Result<InPin> {
    // SAFETY: each GPIO number in INPUT_GPIOS is claimed exactly once.
    let pin = unsafe { AnyInputPin::new(gpio) };
    Ok(PinDriver::input(pin)?)
}

fn init_gpio() -> Result<GpioHardware<OutPin, InPin>> {
    let mut outputs = Vec::with_capacity(OUTPUT_GPIOS.len());
    for gpio in OUTPUT_GPIOS {
        outputs.push(output_pin(gpio)?);
    }
    let mut inputs = Vec::with_capacity(INPUT_GPIOS.len());
    for gpio in INPUT_GPIOS {
        inputs.push(input_pin(gpio)?);
    }
    // Button is active-low; GPIO34-39 are input-only and have no pulls.
    esp!(unsafe { gpio_set_pull_mode(pins::BUTTON_GPIO, gpio_pull_mode_t_GPIO_PULLUP_ONLY) })?;

    let outputs = outputs
        .try_into()
        .map_err(|_| anyhow::anyhow!("output pin table size mismatch"))?;
    let inputs = inputs
        .try_into()
        .map_err(|_| anyhow::anyhow!("input pin table size mismatch"))?;
    Ok(GpioHardware::new(outputs, inputs))
}

/// Feed console lines into the command channel.
fn spawn_console_reader() -> Result<()> {
    std::thread::Builder::new()
        .name("console".into())
        .stack_size(4096)
        .spawn(|| {
            let stdin = std::io::stdin();
            loop {
                for line in stdin.lock().lines() {
                    match line {
                        Ok(text) if text.trim().is_empty() => {}
                        Ok(text) => {
                            if let Err(e) = channels::submit(&COMMAND_CHANNEL, &text) {
                                warn!("Console: {} ({:?})", e, text.trim());
                            }
                        }
                        Err(_) => break,
                    }
                }
                std::thread::sleep(Duration::from_millis(50));
            }
        })?;
    Ok(())
}

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  RemoteStart v{}                     ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Load config from NVS (or defaults) ─────────────────
    let nvs = match NvsAdapter::new() {
        Ok(n) => Some(n),
        Err(e) => {
            warn!("NVS init failed ({}), running with defaults and no persistence", e);
            None
        }
    };
    let config = match nvs.as_ref().map(ConfigPort::load) {
        Some(Ok(cfg)) => cfg,
        Some(Err(e)) => {
            warn!("NVS config load failed ({}), using defaults", e);
            SystemConfig::default()
        }
        None => SystemConfig::default(),
    };
    let tick_ms = config.tick_interval_ms;

    // ── 3. Construct adapters ─────────────────────────────────
    let mut hw = init_gpio()?;
    let ticks = MonotonicClock::new();
    let mut rtc = SoftRtc::new(MonotonicClock::new());
    let mut sink = Tee(LogEventSink::new(), ChunkedNotifier::new(ConsoleTransport));
    spawn_console_reader()?;

    // ── 4. Controller ─────────────────────────────────────────
    let mut controller = Controller::new(config);
    controller.start(ticks.now(), &mut hw);
    info!("Entering control loop ({} ms tick)", tick_ms);

    // ── 5. Control loop ───────────────────────────────────────
    loop {
        let commands = channels::drain(&COMMAND_CHANNEL);
        controller.tick(ticks.now(), &mut hw, &mut rtc, &mut sink, commands.iter());

        if let Some(nvs) = nvs.as_ref() {
            controller.save_config_if_dirty(nvs);
        }

        FreeRtos::delay_ms(tick_ms);
    }
}
