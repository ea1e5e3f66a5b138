use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::SyncSender;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use common::{DriverConfig, SharedControlLoop, TickTiming};
use log::error;

/// Calls `tick()` on a fixed period until `ticks` have run or shutdown is raised.
pub fn run_ticker_thread(
    config: DriverConfig,
    control: SharedControlLoop,
    sender: SyncSender<TickTiming>,
    shutdown_flag: Arc<AtomicBool>,
    start_time: Instant,
) {
    let period = Duration::from_millis(config.tick_period_ms);
    let mut next_tick = start_time;

    for tick_id in 0..config.ticks {
        if shutdown_flag.load(Ordering::Relaxed) {
            break;
        }

        let expected = next_tick;
        next_tick += period;

        let now = Instant::now();
        if now < expected {
            thread::sleep(expected - now);
        }

        let actual = Instant::now();
        let lateness_ns = actual.duration_since(expected).as_nanos() as i64;

        let tick_start = Instant::now();
        let out = match control.tick() {
            Ok(out) => out,
            Err(e) => {
                error!("ticker stopping: {}", e);
                break;
            }
        };
        let processing_time_ns = tick_start.elapsed().as_nanos() as u64;

        let timing = TickTiming {
            tick_id,
            mode: "threaded".into(),
            lateness_ns,
            processing_time_ns,
            deadline_met: actual.duration_since(expected) < period,
            output: out.output,
            error: out.error,
        };

        // Monitor hung up
        if sender.send(timing).is_err() {
            break;
        }
    }
}
