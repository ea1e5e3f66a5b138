use tokio::sync::mpsc;

use common::{TickRecorder, TickTiming};
use log::{info, warn};

/// Drains tick timings until the ticker hangs up. Returns the number of
/// ticks whose output sat at the clamp.
pub async fn run_monitor_task(
    mut receiver: mpsc::Receiver<TickTiming>,
    recorder: TickRecorder,
    max_output_rate: f64,
    log_every: u64,
) -> u64 {
    let mut saturated = 0u64;

    while let Some(timing) = receiver.recv().await {
        if timing.output.abs() >= max_output_rate {
            saturated += 1;
        }

        if log_every > 0 && timing.tick_id % log_every == 0 {
            info!(
                "[async] tick #{:<5} error {:>8.2}  output {:>7.2}",
                timing.tick_id, timing.error, timing.output
            );
        }

        if !timing.deadline_met {
            warn!(
                "[async] tick #{} late by {:.2}ms",
                timing.tick_id,
                timing.lateness_ns as f64 / 1_000_000.0
            );
        }

        recorder.record(timing);
    }

    saturated
}
