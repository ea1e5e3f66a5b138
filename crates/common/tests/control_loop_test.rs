//! Behavioural tests for the heading-hold loop

use common::{compute_error, ControlLoop, HISTORY_CAPACITY};

// ============================================================================
// WORKED SCENARIOS
// ============================================================================

#[test]
fn test_first_tick_from_rest() {
    let mut control = ControlLoop::new(0.1, 45.0).unwrap();
    control.set_parameters(1.0, 0.0, 0.0, 90.0).unwrap();

    let out = control.tick();

    assert_eq!(out.error, 90.0, "Error should be the full 90 degrees");
    assert_eq!(out.output, 45.0, "Raw output of 90 should clamp to 45");
    assert!((control.current_heading() - 4.5).abs() < 1e-12);
}

#[test]
fn test_shortest_path_across_north() {
    assert!((compute_error(350.0, 10.0) - 20.0).abs() < 1e-12);
}

#[test]
fn test_pause_freezes_state() {
    let mut control = ControlLoop::default();
    for _ in 0..15 {
        control.tick();
    }
    control.pause();

    let heading = control.current_heading();
    let integral = control.integral();
    let prev = control.previous_error();
    let len = control.history().len();

    let mut last = None;
    for _ in 0..40 {
        last = Some(control.tick());
    }

    assert_eq!(control.current_heading(), heading);
    assert_eq!(control.integral(), integral);
    assert_eq!(control.previous_error(), prev);
    assert_eq!(control.history().len(), len);

    let out = last.unwrap();
    assert_eq!(out.error, compute_error(heading, control.desired_heading()));
    assert!(out.output.abs() <= control.max_output_rate());
}

#[test]
fn test_integral_under_constant_error() {
    let mut control = ControlLoop::new(0.1, 45.0).unwrap();
    control.set_parameters(0.0, 1.0, 0.0, 10.0).unwrap();

    // Re-aim the setpoint each step so the error stays at 10
    let mut outputs = Vec::new();
    for _ in 0..5 {
        let target = control.current_heading() + 10.0;
        control.set_parameters(0.0, 1.0, 0.0, target).unwrap();
        let out = control.tick();
        assert!((out.error - 10.0).abs() < 1e-9);
        outputs.push(out.output);
    }

    assert!((control.integral() - 5.0).abs() < 1e-9, "integral was {}", control.integral());
    for (i, output) in outputs.iter().enumerate() {
        let expected = (i as f64 + 1.0) * 1.0;
        assert!((output - expected).abs() < 1e-9, "tick {} output {}", i, output);
    }
}

// ============================================================================
// INVARIANTS
// ============================================================================

#[test]
fn test_output_and_heading_bounds() {
    let gains = [(0.5, 0.0, 0.0), (4.0, 1.5, 0.8), (10.0, 2.0, 2.0), (0.1, 0.01, 0.0)];
    let setpoints = [0.0, 90.0, 179.0, 181.0, 359.9, -45.0, 1000.0];

    for &(kp, ki, kd) in &gains {
        for &desired in &setpoints {
            let mut control = ControlLoop::new(0.1, 45.0).unwrap();
            control.set_parameters(kp, ki, kd, desired).unwrap();
            for _ in 0..300 {
                let out = control.tick();
                assert!(out.output.abs() <= 45.0, "output {} over limit", out.output);
                assert!(out.error > -180.0 && out.error <= 180.0);
                let h = control.current_heading();
                assert!((0.0..360.0).contains(&h), "heading {} out of range", h);
            }
        }
    }
}

#[test]
fn test_huge_gains_keep_output_and_heading_defined() {
    let mut control = ControlLoop::new(0.1, 45.0).unwrap();
    control.set_parameters(0.0, 0.0, 0.0, 170.0).unwrap();
    control.tick();
    assert_eq!(control.previous_error(), 170.0);

    // P and D overflow with opposite signs on the next tick
    control.set_parameters(1e308, 0.0, 1e308, 10.0).unwrap();
    for _ in 0..20 {
        let out = control.tick();
        assert!(!out.output.is_nan(), "output went NaN");
        assert!(out.output.abs() <= 45.0);
        let h = control.current_heading();
        assert!((0.0..360.0).contains(&h), "heading {} out of range", h);
    }
}

#[test]
fn test_reset_then_paused_ticks() {
    let mut control = ControlLoop::default();
    for _ in 0..30 {
        control.tick();
    }
    control.reset();
    control.pause();
    for _ in 0..30 {
        control.tick();
    }
    assert_eq!(control.current_heading(), 0.0);
    assert!(control.history().is_empty());
    assert_eq!(control.elapsed(), 0.0);
}

#[test]
fn test_history_window_slides() {
    let mut control = ControlLoop::default();
    for _ in 0..HISTORY_CAPACITY {
        control.tick();
    }
    let before = control.history().to_vec();
    assert_eq!(before.len(), HISTORY_CAPACITY);

    control.tick();
    let after = control.history().to_vec();

    assert_eq!(after.len(), HISTORY_CAPACITY, "501st sample must evict the oldest");
    assert_eq!(&after[..HISTORY_CAPACITY - 1], &before[1..]);
    assert!(after.windows(2).all(|w| w[0].t < w[1].t));
}

#[test]
fn test_proportional_loop_settles() {
    let mut control = ControlLoop::default();
    control.set_parameters(2.0, 0.0, 0.1, 90.0).unwrap();
    for _ in 0..300 {
        control.tick();
    }
    assert!(
        compute_error(control.current_heading(), 90.0).abs() < 0.5,
        "heading settled at {}",
        control.current_heading()
    );
}

#[test]
fn test_parameter_change_does_not_rewrite_history() {
    let mut control = ControlLoop::default();
    for _ in 0..10 {
        control.tick();
    }
    let before = control.history().to_vec();
    control.set_parameters(3.0, 0.0, 0.0, 10.0).unwrap();
    assert_eq!(control.history().to_vec(), before);
    assert!(before.iter().all(|s| s.desired == 90.0));
}
