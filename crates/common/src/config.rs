use serde::Deserialize;
use std::fs;
use thiserror::Error;

use crate::error::{check_finite, ControlError};
use crate::pid::Gains;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("cannot parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error(transparent)]
    Invalid(#[from] ControlError),

    #[error("invalid driver setting `{0}`: {1}")]
    Driver(&'static str, &'static str),
}

/// Controller construction parameters.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct LoopConfig {
    pub dt: f64,
    pub max_output_rate: f64,
    pub kp: f64,
    pub ki: f64,
    pub kd: f64,
    pub desired_heading: f64,
}

impl Default for LoopConfig {
    fn default() -> Self {
        let gains = Gains::default();
        Self {
            dt: 0.1,
            max_output_rate: 45.0,
            kp: gains.kp,
            ki: gains.ki,
            kd: gains.kd,
            desired_heading: 90.0,
        }
    }
}

impl LoopConfig {
    pub fn gains(&self) -> Gains {
        Gains::new(self.kp, self.ki, self.kd)
    }

    pub fn validate(&self) -> Result<(), ControlError> {
        validate_limits(self.dt, self.max_output_rate)?;
        self.gains().validate()?;
        check_finite("desired_heading", self.desired_heading)
    }
}

/// `dt` must be finite and positive; the clamp finite and non-negative.
pub(crate) fn validate_limits(dt: f64, max_output_rate: f64) -> Result<(), ControlError> {
    if !dt.is_finite() || dt <= 0.0 {
        return Err(ControlError::invalid("dt", dt, "must be finite and positive"));
    }
    if !max_output_rate.is_finite() || max_output_rate < 0.0 {
        return Err(ControlError::invalid(
            "max_output_rate",
            max_output_rate,
            "must be finite and non-negative",
        ));
    }
    Ok(())
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DriverMode {
    Threaded,
    Async,
}

/// How an external driver schedules ticks.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct DriverConfig {
    pub tick_period_ms: u64,
    pub ticks: u64,
    pub log_every: u64,
    pub mode: DriverMode,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            tick_period_ms: 100,
            ticks: 200,
            log_every: 10,
            mode: DriverMode::Threaded,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Default)]
#[serde(default)]
pub struct SimulationConfig {
    pub controller: LoopConfig,
    pub driver: DriverConfig,
}

impl SimulationConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.controller.validate()?;
        if self.driver.tick_period_ms == 0 {
            return Err(ConfigError::Driver("tick_period_ms", "must be positive"));
        }
        Ok(())
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let config: SimulationConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }
}

pub fn load_config(path: &str) -> Result<SimulationConfig, ConfigError> {
    SimulationConfig::from_file(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config = SimulationConfig::from_toml("").unwrap();
        assert_eq!(config, SimulationConfig::default());
        assert_eq!(config.controller.dt, 0.1);
        assert_eq!(config.controller.max_output_rate, 45.0);
        assert_eq!(config.controller.desired_heading, 90.0);
        assert_eq!(config.driver.mode, DriverMode::Threaded);
    }

    #[test]
    fn partial_tables_fill_in() {
        let config = SimulationConfig::from_toml(
            r#"
            [controller]
            kp = 2.5
            desired_heading = 270.0

            [driver]
            mode = "async"
            ticks = 50
            "#,
        )
        .unwrap();
        assert_eq!(config.controller.kp, 2.5);
        assert_eq!(config.controller.kd, 0.1);
        assert_eq!(config.controller.desired_heading, 270.0);
        assert_eq!(config.driver.mode, DriverMode::Async);
        assert_eq!(config.driver.ticks, 50);
        assert_eq!(config.driver.tick_period_ms, 100);
    }

    #[test]
    fn rejects_bad_values() {
        let negative_gain = SimulationConfig::from_toml("[controller]\nki = -1.0\n");
        assert!(matches!(negative_gain, Err(ConfigError::Invalid(_))));

        let zero_dt = SimulationConfig::from_toml("[controller]\ndt = 0.0\n");
        assert!(matches!(zero_dt, Err(ConfigError::Invalid(_))));

        let zero_period = SimulationConfig::from_toml("[driver]\ntick_period_ms = 0\n");
        assert!(matches!(zero_period, Err(ConfigError::Driver("tick_period_ms", _))));

        let bad_mode = SimulationConfig::from_toml("[driver]\nmode = \"fibers\"\n");
        assert!(matches!(bad_mode, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn missing_file_is_io_error() {
        let result = load_config("does/not/exist.toml");
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }
}
