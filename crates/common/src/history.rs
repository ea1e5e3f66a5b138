use std::collections::VecDeque;
use std::io::Write;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of samples kept before the oldest is evicted.
pub const HISTORY_CAPACITY: usize = 500;

/// One recorded control step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub t: f64,
    pub error: f64,
    pub output: f64,
    pub heading: f64,
    pub desired: f64,
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("cannot write history CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("cannot flush history CSV: {0}")]
    Io(#[from] std::io::Error),
}

/// Bounded trace of recent samples, oldest first.
#[derive(Debug, Clone)]
pub struct History {
    samples: VecDeque<Sample>,
    capacity: usize,
}

impl History {
    pub fn new() -> Self {
        Self::with_capacity(HISTORY_CAPACITY)
    }

    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, sample: Sample) {
        self.samples.push_back(sample);

        // Keep only the most recent data
        while self.samples.len() > self.capacity {
            self.samples.pop_front();
        }
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn latest(&self) -> Option<&Sample> {
        self.samples.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Sample> + '_ {
        self.samples.iter()
    }

    pub fn get_recent(&self, count: usize) -> Vec<Sample> {
        let start = self.samples.len().saturating_sub(count);
        self.samples.range(start..).copied().collect()
    }

    pub fn to_vec(&self) -> Vec<Sample> {
        self.samples.iter().copied().collect()
    }

    pub fn times(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.t).collect()
    }

    pub fn errors(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.error).collect()
    }

    pub fn outputs(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.output).collect()
    }

    pub fn headings(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.heading).collect()
    }

    pub fn desired(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.desired).collect()
    }

    /// Write every sample as a CSV row under a `t,error,output,heading,desired` header.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), ExportError> {
        let mut wtr = csv::Writer::from_writer(writer);
        if self.samples.is_empty() {
            wtr.write_record(["t", "error", "output", "heading", "desired"])?;
        }
        for sample in self.samples.iter() {
            wtr.serialize(sample)?;
        }
        wtr.flush()?;
        Ok(())
    }

    pub fn save_to_csv(&self, filename: &str) -> Result<(), ExportError> {
        let file = std::fs::File::create(filename)?;
        self.write_csv(file)?;
        log::info!("Saved {} samples to {}", self.samples.len(), filename);
        Ok(())
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}
