//! Periodic driver built on tokio: a ticker task on an interval and a
//! monitor task joined by a bounded channel.

mod monitor;
mod ticker;

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::time::Instant;

use common::{
    ControlError, ControlLoop, DriverConfig, SharedControlLoop, SimulationConfig,
    SimulationReport, TickRecorder,
};
use log::{error, info, warn};

pub use monitor::run_monitor_task;
pub use ticker::run_ticker_task;

const CHANNEL_CAPACITY: usize = 64;

/// Build a loop from `config` and drive it to completion.
pub async fn run_simulation(config: &SimulationConfig) -> Result<SimulationReport, ControlError> {
    let control = SharedControlLoop::new(ControlLoop::from_config(&config.controller)?);
    Ok(run_driver(&config.driver, control, Arc::new(AtomicBool::new(false))).await)
}

/// Drive an existing loop. Raising `shutdown` stops the ticker early.
pub async fn run_driver(
    driver: &DriverConfig,
    control: SharedControlLoop,
    shutdown: Arc<AtomicBool>,
) -> SimulationReport {
    let recorder = TickRecorder::new();
    let max_output_rate = control.with(|c| c.max_output_rate()).unwrap_or(f64::INFINITY);

    info!(
        "[async] starting: {} ticks every {}ms",
        driver.ticks, driver.tick_period_ms
    );

    let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
    let start_time = Instant::now();

    let ticker = tokio::spawn(run_ticker_task(
        driver.clone(),
        control.clone(),
        tx,
        shutdown,
        start_time,
    ));
    let monitor = tokio::spawn(run_monitor_task(
        rx,
        recorder.clone(),
        max_output_rate,
        driver.log_every,
    ));

    match ticker.await {
        Ok(dropped) if dropped > 0 => warn!("[async] {} timings dropped", dropped),
        Ok(_) => {}
        Err(e) => error!("[async] ticker task failed: {}", e),
    }
    let saturated_ticks = monitor.await.unwrap_or_else(|e| {
        error!("[async] monitor task failed: {}", e);
        0
    });

    info!(
        "[async] finished after {:.2}s, {} ticks recorded",
        start_time.elapsed().as_secs_f64(),
        recorder.len()
    );

    SimulationReport {
        control,
        timings: recorder,
        saturated_ticks,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_config(ticks: u64) -> SimulationConfig {
        let mut config = SimulationConfig::default();
        config.driver.tick_period_ms = 1;
        config.driver.ticks = ticks;
        config.driver.log_every = 0;
        config
    }

    #[tokio::test]
    async fn runs_configured_tick_count() {
        let report = run_simulation(&fast_config(20)).await.unwrap();
        assert_eq!(report.timings.len(), 20);
        let status = report.control.status().unwrap();
        assert_eq!(status.samples, 20);
        assert!((status.elapsed - 2.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn ticks_are_in_order() {
        let report = run_simulation(&fast_config(8)).await.unwrap();
        let ids: Vec<u64> = report.timings.get_results().iter().map(|t| t.tick_id).collect();
        assert_eq!(ids, (0..8).collect::<Vec<u64>>());
        assert!(report.saturated_ticks >= 1);
    }

    #[tokio::test]
    async fn shutdown_flag_stops_ticker() {
        let control = SharedControlLoop::default();
        let shutdown = Arc::new(AtomicBool::new(true));
        let config = fast_config(50);
        let report = run_driver(&config.driver, control, shutdown).await;
        assert!(report.timings.is_empty());
        assert!(report.control.history_snapshot().unwrap().is_empty());
    }

    #[tokio::test]
    async fn rejects_invalid_controller_config() {
        let mut config = fast_config(1);
        config.controller.kp = -2.0;
        assert!(run_simulation(&config).await.is_err());
    }
}
