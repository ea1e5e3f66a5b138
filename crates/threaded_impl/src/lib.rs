//! Periodic driver built on OS threads: a ticker thread steps the loop and
//! a monitor thread consumes the per-tick timings.

mod monitor;
mod ticker;

use std::sync::atomic::AtomicBool;
use std::sync::mpsc::sync_channel;
use std::sync::Arc;
use std::thread;
use std::time::Instant;

use common::{
    ControlError, ControlLoop, DriverConfig, SharedControlLoop, SimulationConfig,
    SimulationReport, TickRecorder,
};
use log::{error, info};

pub use monitor::run_monitor_thread;
pub use ticker::run_ticker_thread;

const CHANNEL_CAPACITY: usize = 64;

/// Build a loop from `config` and drive it to completion.
pub fn run_simulation(config: &SimulationConfig) -> Result<SimulationReport, ControlError> {
    let control = SharedControlLoop::new(ControlLoop::from_config(&config.controller)?);
    Ok(run_driver(
        &config.driver,
        control,
        Arc::new(AtomicBool::new(false)),
    ))
}

/// Drive an existing loop. Raising `shutdown` stops the ticker early.
pub fn run_driver(
    driver: &DriverConfig,
    control: SharedControlLoop,
    shutdown: Arc<AtomicBool>,
) -> SimulationReport {
    let recorder = TickRecorder::new();
    let max_output_rate = control.with(|c| c.max_output_rate()).unwrap_or(f64::INFINITY);

    info!(
        "[threaded] starting: {} ticks every {}ms",
        driver.ticks, driver.tick_period_ms
    );

    let (tx, rx) = sync_channel(CHANNEL_CAPACITY);
    let start_time = Instant::now();

    let ticker = {
        let driver = driver.clone();
        let control = control.clone();
        thread::spawn(move || run_ticker_thread(driver, control, tx, shutdown, start_time))
    };

    let monitor = {
        let recorder = recorder.clone();
        let log_every = driver.log_every;
        thread::spawn(move || run_monitor_thread(rx, recorder, max_output_rate, log_every))
    };

    if ticker.join().is_err() {
        error!("[threaded] ticker thread panicked");
    }
    let saturated_ticks = monitor.join().unwrap_or_else(|_| {
        error!("[threaded] monitor thread panicked");
        0
    });

    info!(
        "[threaded] finished after {:.2}s, {} ticks recorded",
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
    use std::sync::atomic::Ordering;

    fn fast_config(ticks: u64) -> SimulationConfig {
        let mut config = SimulationConfig::default();
        config.driver.tick_period_ms = 1;
        config.driver.ticks = ticks;
        config.driver.log_every = 0;
        config
    }

    #[test]
    fn runs_configured_tick_count() {
        let report = run_simulation(&fast_config(25)).unwrap();
        assert_eq!(report.timings.len(), 25);
        let status = report.control.status().unwrap();
        assert_eq!(status.samples, 25);
        assert!((status.elapsed - 2.5).abs() < 1e-9);
    }

    #[test]
    fn first_ticks_saturate_toward_default_setpoint() {
        let report = run_simulation(&fast_config(5)).unwrap();
        assert!(report.saturated_ticks >= 1);
        let ids: Vec<u64> = report.timings.get_results().iter().map(|t| t.tick_id).collect();
        assert_eq!(ids, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn shutdown_before_start_runs_nothing() {
        let shutdown = Arc::new(AtomicBool::new(true));
        let control = SharedControlLoop::default();
        let config = fast_config(100);
        let report = run_driver(&config.driver, control, shutdown.clone());
        assert!(report.timings.is_empty());
        assert!(shutdown.load(Ordering::Relaxed));
    }

    #[test]
    fn paused_loop_records_timings_but_no_history() {
        let control = SharedControlLoop::default();
        control.pause().unwrap();
        let config = fast_config(10);
        let report = run_driver(&config.driver, control, Arc::new(AtomicBool::new(false)));
        assert_eq!(report.timings.len(), 10);
        assert!(report.control.history_snapshot().unwrap().is_empty());
    }

    #[test]
    fn rejects_invalid_controller_config() {
        let mut config = fast_config(1);
        config.controller.dt = 0.0;
        assert!(run_simulation(&config).is_err());
    }
}
