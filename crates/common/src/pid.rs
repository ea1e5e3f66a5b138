use serde::{Deserialize, Serialize};

use crate::error::{check_gain, ControlError};

/// Proportional, integral and derivative gains.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Gains {
    pub kp: f64,
    pub ki: f64,
    pub kd: f64,
}

impl Gains {
    pub fn new(kp: f64, ki: f64, kd: f64) -> Self {
        Self { kp, ki, kd }
    }

    pub fn validate(&self) -> Result<(), ControlError> {
        check_gain("kp", self.kp)?;
        check_gain("ki", self.ki)?;
        check_gain("kd", self.kd)
    }
}

impl Default for Gains {
    fn default() -> Self {
        Self { kp: 1.0, ki: 0.0, kd: 0.1 }
    }
}

/// Per-term breakdown of the control law at one instant, before clamping.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PidComponents {
    pub proportional: f64,
    pub integral: f64,
    pub derivative: f64,
}

impl PidComponents {
    pub fn sum(&self) -> f64 {
        self.proportional + self.integral + self.derivative
    }
}

/// Fixed-step PID with a symmetric output clamp.
///
/// The integral is never clamped: it keeps accumulating while the output
/// sits at the limit.
#[derive(Debug, Clone)]
pub struct PidController {
    gains: Gains,
    dt: f64,
    max_output: f64,
    integral: f64,
    prev_error: f64,
}

impl PidController {
    /// `dt` must be positive; callers validate it at construction.
    pub fn new(gains: Gains, dt: f64, max_output: f64) -> Self {
        Self {
            gains,
            dt,
            max_output,
            integral: 0.0,
            prev_error: 0.0,
        }
    }

    pub fn reset(&mut self) {
        self.integral = 0.0;
        self.prev_error = 0.0;
    }

    /// Advance the controller by one step and return the clamped output.
    pub fn compute(&mut self, error: f64) -> f64 {
        self.integral += error * self.dt;
        let output = self.clamp(self.components(error).sum());
        self.prev_error = error;
        output
    }

    /// Output the controller would produce for `error` without stepping.
    pub fn preview(&self, error: f64) -> f64 {
        self.clamp(self.components(error).sum())
    }

    pub fn components(&self, error: f64) -> PidComponents {
        PidComponents {
            proportional: self.gains.kp * error,
            integral: self.gains.ki * self.integral,
            derivative: self.gains.kd * (error - self.prev_error) / self.dt,
        }
    }

    /// Infinite terms saturate by sign; opposing infinities sum to NaN,
    /// which is treated as no command.
    fn clamp(&self, raw: f64) -> f64 {
        if raw.is_nan() {
            return 0.0;
        }
        raw.clamp(-self.max_output, self.max_output)
    }

    pub fn set_gains(&mut self, gains: Gains) {
        self.gains = gains;
    }

    pub fn gains(&self) -> Gains {
        self.gains
    }

    pub fn dt(&self) -> f64 {
        self.dt
    }

    pub fn max_output(&self) -> f64 {
        self.max_output
    }

    pub fn integral(&self) -> f64 {
        self.integral
    }

    pub fn prev_error(&self) -> f64 {
        self.prev_error
    }
}
