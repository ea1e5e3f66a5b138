use std::sync::{Arc, Mutex, MutexGuard};

use crate::control_loop::{ControlLoop, LoopStatus, TickOutput};
use crate::error::ControlError;
use crate::history::Sample;
use crate::pid::PidComponents;

/// Thread-safe handle to a single [`ControlLoop`].
/// Cloning shares the same loop; every call takes the lock once.
#[derive(Clone)]
pub struct SharedControlLoop {
    inner: Arc<Mutex<ControlLoop>>,
}

impl SharedControlLoop {
    pub fn new(control: ControlLoop) -> Self {
        Self {
            inner: Arc::new(Mutex::new(control)),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, ControlLoop>, ControlError> {
        self.inner.lock().map_err(|_| ControlError::LockPoisoned)
    }

    /// Run `f` with exclusive access to the loop.
    pub fn with<R>(&self, f: impl FnOnce(&mut ControlLoop) -> R) -> Result<R, ControlError> {
        let mut guard = self.lock()?;
        Ok(f(&mut guard))
    }

    pub fn tick(&self) -> Result<TickOutput, ControlError> {
        self.with(|c| c.tick())
    }

    pub fn reset(&self) -> Result<(), ControlError> {
        self.with(|c| c.reset())
    }

    pub fn pause(&self) -> Result<(), ControlError> {
        self.with(|c| c.pause())
    }

    pub fn resume(&self) -> Result<(), ControlError> {
        self.with(|c| c.resume())
    }

    pub fn toggle_running(&self) -> Result<(), ControlError> {
        self.with(|c| c.toggle_running())
    }

    pub fn set_parameters(
        &self,
        kp: f64,
        ki: f64,
        kd: f64,
        desired_heading: f64,
    ) -> Result<(), ControlError> {
        self.lock()?.set_parameters(kp, ki, kd, desired_heading)
    }

    pub fn status(&self) -> Result<LoopStatus, ControlError> {
        self.with(|c| c.status())
    }

    pub fn pid_components(&self) -> Result<PidComponents, ControlError> {
        self.with(|c| c.pid_components())
    }

    pub fn history_snapshot(&self) -> Result<Vec<Sample>, ControlError> {
        self.with(|c| c.history().to_vec())
    }
}

impl Default for SharedControlLoop {
    fn default() -> Self {
        Self::new(ControlLoop::default())
    }
}
