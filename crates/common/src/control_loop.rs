use log::{debug, trace, warn};
use serde::Serialize;

use crate::angle::{compute_error, normalize_heading};
use crate::config::{validate_limits, LoopConfig};
use crate::error::{check_finite, ControlError};
use crate::history::{History, Sample};
use crate::pid::{Gains, PidComponents, PidController};

pub const DEFAULT_DT: f64 = 0.1;
pub const DEFAULT_MAX_OUTPUT_RATE: f64 = 45.0;
pub const DEFAULT_DESIRED_HEADING: f64 = 90.0;

/// Result of one call to [`ControlLoop::tick`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TickOutput {
    pub output: f64,
    pub error: f64,
}

/// Snapshot of the live values a display shows next to its charts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LoopStatus {
    pub heading: f64,
    pub desired: f64,
    pub error: f64,
    pub output: f64,
    pub running: bool,
    pub samples: usize,
    pub elapsed: f64,
}

/// Heading-hold loop: a PID controller closed around a first-order heading
/// integrator, stepped on a fixed logical clock.
///
/// While paused, [`tick`](Self::tick) only reports what the controller would
/// do; heading, controller memory, clock and history stay frozen.
#[derive(Debug, Clone)]
pub struct ControlLoop {
    pid: PidController,
    current_heading: f64,
    desired_heading: f64,
    running: bool,
    steps: u64,
    history: History,
}

impl ControlLoop {
    pub fn new(dt: f64, max_output_rate: f64) -> Result<Self, ControlError> {
        validate_limits(dt, max_output_rate)?;
        Ok(Self {
            pid: PidController::new(Gains::default(), dt, max_output_rate),
            current_heading: 0.0,
            desired_heading: DEFAULT_DESIRED_HEADING,
            running: true,
            steps: 0,
            history: History::new(),
        })
    }

    pub fn from_config(config: &LoopConfig) -> Result<Self, ControlError> {
        config.validate()?;
        let mut control = Self::new(config.dt, config.max_output_rate)?;
        control.pid.set_gains(config.gains());
        control.desired_heading = config.desired_heading;
        Ok(control)
    }

    pub fn tick(&mut self) -> TickOutput {
        let error = compute_error(self.current_heading, self.desired_heading);

        if !self.running {
            return TickOutput { output: self.pid.preview(error), error };
        }

        let output = self.pid.compute(error);
        if output.abs() >= self.pid.max_output() {
            trace!("output saturated at {:.2} (error {:.2})", output, error);
        }

        let dt = self.pid.dt();
        self.current_heading = normalize_heading(self.current_heading + output * dt);
        self.steps += 1;

        self.history.push(Sample {
            t: self.elapsed(),
            error,
            output,
            heading: self.current_heading,
            desired: self.desired_heading,
        });

        TickOutput { output, error }
    }

    pub fn reset(&mut self) {
        self.current_heading = 0.0;
        self.pid.reset();
        self.steps = 0;
        self.history.clear();
        debug!("control loop reset");
    }

    pub fn set_parameters(
        &mut self,
        kp: f64,
        ki: f64,
        kd: f64,
        desired_heading: f64,
    ) -> Result<(), ControlError> {
        let gains = Gains::new(kp, ki, kd);
        if let Err(e) = gains
            .validate()
            .and_then(|_| check_finite("desired_heading", desired_heading))
        {
            warn!("rejected parameter update: {}", e);
            return Err(e);
        }

        self.pid.set_gains(gains);
        self.desired_heading = desired_heading;
        debug!(
            "parameters set: kp={} ki={} kd={} desired={}",
            kp, ki, kd, desired_heading
        );
        Ok(())
    }

    pub fn pause(&mut self) {
        self.running = false;
        debug!("control loop paused");
    }

    pub fn resume(&mut self) {
        self.running = true;
        debug!("control loop resumed");
    }

    pub fn toggle_running(&mut self) {
        if self.running {
            self.pause();
        } else {
            self.resume();
        }
    }

    pub fn current_heading(&self) -> f64 {
        self.current_heading
    }

    pub fn desired_heading(&self) -> f64 {
        self.desired_heading
    }

    pub fn gains(&self) -> Gains {
        self.pid.gains()
    }

    pub fn dt(&self) -> f64 {
        self.pid.dt()
    }

    pub fn max_output_rate(&self) -> f64 {
        self.pid.max_output()
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Simulated time since the last reset.
    pub fn elapsed(&self) -> f64 {
        self.steps as f64 * self.pid.dt()
    }

    pub fn integral(&self) -> f64 {
        self.pid.integral()
    }

    pub fn previous_error(&self) -> f64 {
        self.pid.prev_error()
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Per-term breakdown at the current heading and setpoint.
    pub fn pid_components(&self) -> PidComponents {
        self.pid.components(self.current_error())
    }

    pub fn current_error(&self) -> f64 {
        compute_error(self.current_heading, self.desired_heading)
    }

    pub fn status(&self) -> LoopStatus {
        let error = self.current_error();
        LoopStatus {
            heading: self.current_heading,
            desired: self.desired_heading,
            error,
            output: self.pid.preview(error),
            running: self.running,
            samples: self.history.len(),
            elapsed: self.elapsed(),
        }
    }
}

impl Default for ControlLoop {
    fn default() -> Self {
        Self {
            pid: PidController::new(Gains::default(), DEFAULT_DT, DEFAULT_MAX_OUTPUT_RATE),
            current_heading: 0.0,
            desired_heading: DEFAULT_DESIRED_HEADING,
            running: true,
            steps: 0,
            history: History::new(),
        }
    }
}
