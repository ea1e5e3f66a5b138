use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::time::{interval_at, Duration, Instant, MissedTickBehavior};

use common::{DriverConfig, SharedControlLoop, TickTiming};
use log::{error, warn};

/// Steps the loop on a tokio interval. Timings are offered to the monitor with
/// `try_send`, so a slow monitor drops timings rather than delaying ticks.
/// Returns how many timings were dropped.
pub async fn run_ticker_task(
    config: DriverConfig,
    control: SharedControlLoop,
    sender: mpsc::Sender<TickTiming>,
    shutdown_flag: Arc<AtomicBool>,
    start_time: Instant,
) -> u64 {
    let period = Duration::from_millis(config.tick_period_ms);
    let mut ticker = interval_at(start_time, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut dropped = 0u64;

    for tick_id in 0..config.ticks {
        if shutdown_flag.load(Ordering::Relaxed) {
            break;
        }

        let scheduled = ticker.tick().await;
        let actual = Instant::now();
        let late_by = actual.duration_since(scheduled);

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
            mode: "async".into(),
            lateness_ns: late_by.as_nanos() as i64,
            processing_time_ns,
            deadline_met: late_by < period,
            output: out.output,
            error: out.error,
        };

        match sender.try_send(timing) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(_)) => {
                dropped += 1;
                warn!("[async] monitor channel full, dropped timing for tick #{}", tick_id);
            }
            Err(mpsc::error::TrySendError::Closed(_)) => break,
        }
    }

    dropped
}
