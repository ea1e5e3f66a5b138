use thiserror::Error;

/// Errors raised at the control core's boundary.
///
/// Saturation is not an error; the loop clamps and carries on.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ControlError {
    #[error("invalid parameter `{name}` = {value}: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },

    #[error("control loop lock was poisoned by a panicking thread")]
    LockPoisoned,
}

impl ControlError {
    pub(crate) fn invalid(name: &'static str, value: f64, reason: &'static str) -> Self {
        ControlError::InvalidParameter { name, value, reason }
    }
}

/// Gains must be finite and non-negative.
pub(crate) fn check_gain(name: &'static str, value: f64) -> Result<(), ControlError> {
    if !value.is_finite() {
        return Err(ControlError::invalid(name, value, "must be finite"));
    }
    if value < 0.0 {
        return Err(ControlError::invalid(name, value, "must be non-negative"));
    }
    Ok(())
}

pub(crate) fn check_finite(name: &'static str, value: f64) -> Result<(), ControlError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ControlError::invalid(name, value, "must be finite"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gain_checks() {
        assert!(check_gain("kp", 0.0).is_ok());
        assert!(check_gain("kp", 2.5).is_ok());
        assert!(check_gain("kp", -0.1).is_err());
        assert!(check_gain("kp", f64::NAN).is_err());
        assert!(check_gain("kp", f64::INFINITY).is_err());
    }

    #[test]
    fn message_names_the_parameter() {
        let err = check_gain("ki", -1.0).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("ki"), "got: {}", msg);
        assert!(msg.contains("non-negative"), "got: {}", msg);
    }
}
