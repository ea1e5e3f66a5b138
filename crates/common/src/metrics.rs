use std::sync::{Arc, Mutex};
use serde::Serialize;

use crate::history::ExportError;
use crate::shared::SharedControlLoop;

/// Wall-clock timing of one driver tick. Never feeds back into the control law.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct TickTiming {
    pub tick_id: u64,
    pub mode: String,
    pub lateness_ns: i64,
    pub processing_time_ns: u64,
    pub deadline_met: bool,
    pub output: f64,
    pub error: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimingSummary {
    pub ticks: usize,
    pub missed_deadlines: usize,
    pub compliance_pct: f64,
    pub max_lateness_ns: i64,
    pub avg_processing_ns: f64,
}

/// Thread-safe recorder with internal mutability.
/// Cloning is cheap (it clones the Arc, not the data).
#[derive(Clone, Default)]
pub struct TickRecorder {
    results: Arc<Mutex<Vec<TickTiming>>>,
}

impl TickRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, result: TickTiming) {
        if let Ok(mut data) = self.results.lock() {
            data.push(result);
        }
    }

    pub fn get_results(&self) -> Vec<TickTiming> {
        self.results.lock().map(|r| r.clone()).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.results.lock().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn summary(&self) -> TimingSummary {
        summarize(&self.get_results())
    }

    pub fn save_to_csv(&self, filename: &str) -> Result<(), ExportError> {
        let data = self.get_results();
        let mut wtr = csv::Writer::from_path(filename)?;
        for record in data.iter() {
            wtr.serialize(record)?;
        }
        wtr.flush()?;
        log::info!("Saved {} tick timings to {}", data.len(), filename);
        Ok(())
    }
}

/// What a driver hands back once its tick loop has stopped.
pub struct SimulationReport {
    pub control: SharedControlLoop,
    pub timings: TickRecorder,
    pub saturated_ticks: u64,
}

impl SimulationReport {
    pub fn summary(&self) -> TimingSummary {
        self.timings.summary()
    }
}

pub fn summarize(results: &[TickTiming]) -> TimingSummary {
    let ticks = results.len();
    let missed_deadlines = results.iter().filter(|r| !r.deadline_met).count();
    let compliance_pct = if ticks > 0 {
        (ticks - missed_deadlines) as f64 / ticks as f64 * 100.0
    } else {
        0.0
    };
    let max_lateness_ns = results.iter().map(|r| r.lateness_ns).max().unwrap_or(0);
    let avg_processing_ns = if ticks > 0 {
        results.iter().map(|r| r.processing_time_ns as f64).sum::<f64>() / ticks as f64
    } else {
        0.0
    };

    TimingSummary {
        ticks,
        missed_deadlines,
        compliance_pct,
        max_lateness_ns,
        avg_processing_ns,
    }
}
