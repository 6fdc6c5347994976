use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use clap::{Parser, Subcommand};
use eyre::{Result, WrapErr};
use tracing_subscriber::EnvFilter;

use axle_core::angle::Angle;
use axle_core::event_loop::EventLoop;
use axle_core::hw_error::map_hw_error;
use axle_core::model::ObserverModel;
use axle_core::observer::{Actuation, Observer, ObserverSettings};
use axle_core::scheduler::Tickable;
use axle_core::task::{Task, TaskStatus};
use axle_hardware::{SimLink, SimMotor};
use axle_traits::{AngleSensor, Clock, MonotonicClock, MotorDriver};

const TICK_MS: u32 = 5;
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Motor-observer and task playground for the axle stack.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Drive the simulated motor and report the observer's estimates.
    Observe {
        /// Model and observer settings TOML; the built-in sample
        /// calibration is used when omitted.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Drive voltage in millivolts.
        #[arg(long, default_value_t = 6_000)]
        voltage: i32,

        /// How long to run, in milliseconds.
        #[arg(long, default_value_t = 2_000)]
        duration_ms: u32,

        /// Block the shaft at this time to provoke a stall.
        #[arg(long)]
        block_at_ms: Option<u32>,

        /// Emit the final summary as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Establish a simulated radio link as a cancellable task.
    Connect {
        /// Polls the handshake takes to finish.
        #[arg(long, default_value_t = 20)]
        handshake_polls: u32,

        /// Polls the disconnect teardown takes after a cancel.
        #[arg(long, default_value_t = 3)]
        teardown_polls: u32,

        /// Give up (cancel and drain) after this many milliseconds.
        #[arg(long)]
        timeout_ms: Option<u64>,

        /// Simulate a peer that never answers.
        #[arg(long)]
        unreachable: bool,

        /// Emit the result as JSON.
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    match Args::parse().command {
        Command::Observe {
            config,
            voltage,
            duration_ms,
            block_at_ms,
            json,
        } => observe(config, voltage, duration_ms, block_at_ms, json),
        Command::Connect {
            handshake_polls,
            teardown_polls,
            timeout_ms,
            unreachable,
            json,
        } => connect(handshake_polls, teardown_polls, timeout_ms, unreachable, json),
    }
}

fn load_model(config: Option<PathBuf>) -> Result<(ObserverModel, ObserverSettings)> {
    match config {
        Some(path) => {
            let cfg = axle_config::load_path(&path)
                .wrap_err_with(|| format!("failed to load {}", path.display()))?;
            let model = ObserverModel::from_config(&cfg.model)?;
            Ok((model, ObserverSettings::from(cfg.observer)))
        }
        None => Ok((
            ObserverModel::sample(),
            ObserverSettings {
                stall_speed_limit: 20_000,
                stall_time: 200,
                feedback_gain: 1_500,
            },
        )),
    }
}

/// Periodic liveness log line while the observe loop runs.
struct Heartbeat;

impl Tickable for Heartbeat {
    fn tick(&mut self, now: u32) -> u32 {
        tracing::debug!(now, "observer running");
        500
    }
}

fn observe(
    config: Option<PathBuf>,
    voltage: i32,
    duration_ms: u32,
    block_at_ms: Option<u32>,
    json: bool,
) -> Result<()> {
    let (model, settings) = load_model(config)?;

    let mut motor = SimMotor::new();
    motor
        .set_voltage(voltage)
        .map_err(|e| eyre::Report::new(map_hw_error(&*e)))?;
    let mut observer = Observer::new(Arc::new(model), settings, TICK_MS, Angle::default());

    let clock = MonotonicClock::new();
    let (mut ev, handle) = EventLoop::new();
    let interrupt = handle.clone();
    ctrlc::set_handler(move || interrupt.shutdown()).wrap_err("installing ctrl-c handler")?;
    ev.scheduler_mut().start(Box::new(Heartbeat), 0);

    let mut first_stall: Option<(u32, u32)> = None;
    let mut read_error = None;
    ev.run(&clock, Duration::from_millis(TICK_MS as u64), |_, now| {
        if let Some(at) = block_at_ms
            && now >= at
        {
            motor.set_blocked(true);
        }
        motor.tick(TICK_MS);

        let mdeg = match motor.read(POLL_INTERVAL) {
            Ok(v) => v,
            Err(e) => {
                read_error = Some(map_hw_error(&*e));
                return false;
            }
        };
        observer.update(now, Angle::from_mdeg(mdeg), Actuation::Voltage, voltage);

        if first_stall.is_none()
            && let Some(duration) = observer.is_stalled(now)
        {
            tracing::info!(now, duration, "stall detected");
            first_stall = Some((now, duration));
        }
        now < duration_ms
    });
    if let Some(e) = read_error {
        return Err(e.into());
    }

    let est = observer.estimated_state();
    if json {
        println!(
            "{}",
            serde_json::json!({
                "angle_mdeg": est.angle.to_mdeg(),
                "speed_mdeg_s": est.speed,
                "speed_numeric_mdeg_s": est.speed_numeric,
                "current_ma": observer.current(),
                "stalled": first_stall.is_some(),
                "stall_at_ms": first_stall.map(|(t, _)| t),
            })
        );
    } else {
        println!(
            "angle {:.3} deg, speed {:.1} deg/s (numeric {:.1}), current {} mA",
            est.angle.to_mdeg() as f64 / 1000.0,
            est.speed as f64 / 1000.0,
            est.speed_numeric as f64 / 1000.0,
            observer.current(),
        );
        match first_stall {
            Some((t, _)) => println!("stalled at {t} ms"),
            None => println!("no stall detected"),
        }
    }
    Ok(())
}

fn connect(
    handshake_polls: u32,
    teardown_polls: u32,
    timeout_ms: Option<u64>,
    unreachable: bool,
    json: bool,
) -> Result<()> {
    let link = if unreachable {
        SimLink::unreachable(handshake_polls)
    } else {
        SimLink::connecting(handshake_polls, teardown_polls)
    };
    let mut task = Task::start(link);

    let cancel_requested = Arc::new(AtomicBool::new(false));
    let flag = cancel_requested.clone();
    ctrlc::set_handler(move || flag.store(true, Ordering::SeqCst))
        .wrap_err("installing ctrl-c handler")?;

    let clock = MonotonicClock::new();
    let epoch = clock.now();
    loop {
        if cancel_requested.swap(false, Ordering::SeqCst) {
            tracing::info!("cancelling connection");
            task.cancel();
        }
        match task.poll() {
            TaskStatus::Running => {}
            TaskStatus::Success => {
                let elapsed = clock.ms_since(epoch);
                if json {
                    println!(
                        "{}",
                        serde_json::json!({ "connected": true, "elapsed_ms": elapsed })
                    );
                } else {
                    println!("connected after {elapsed} ms");
                }
                return Ok(());
            }
            TaskStatus::Cancelled => eyre::bail!("connection cancelled"),
            TaskStatus::Error(e) => {
                return Err(eyre::Report::new(e)).wrap_err("connection failed");
            }
        }
        if let Some(limit) = timeout_ms
            && clock.ms_since(epoch) >= limit
        {
            tracing::warn!(limit, "connect timed out, draining teardown");
            task.cancel();
            while !task.poll().is_terminal() {
                clock.sleep(POLL_INTERVAL);
            }
            eyre::bail!("connection timed out after {limit} ms");
        }
        clock.sleep(POLL_INTERVAL);
    }
}
