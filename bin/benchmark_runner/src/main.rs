use common::config::load_config;
use common::logger::logger_init;
use common::{ControlLoop, DriverMode, Sample, SimulationConfig, SimulationReport};
use criterion::{black_box, Criterion};
use log::{error, info, LevelFilter};
use std::env;

fn analyze_trace(samples: &[Sample], name: &str) {
    if samples.is_empty() {
        println!("{}: No samples to analyze", name);
        return;
    }

    let errors: Vec<f64> = samples.iter().map(|s| s.error.abs()).collect();
    let max_error = errors.iter().fold(0.0_f64, |a, &b| a.max(b));
    let mean_error = errors.iter().sum::<f64>() / errors.len() as f64;

    // First sample from which the error stays inside 2 degrees
    let settle_idx = errors.iter().rposition(|&e| e > 2.0).map_or(0, |i| i + 1);
    let settled_at = samples.get(settle_idx).map(|s| s.t);

    let peak_output = samples.iter().map(|s| s.output.abs()).fold(0.0_f64, f64::max);
    let last = &samples[samples.len() - 1];

    println!("\n=== {} Trace Analysis ===", name);
    println!("Samples: {}", samples.len());
    println!("|error| (deg): mean={:.2}, max={:.2}", mean_error, max_error);
    println!("Peak |output|: {:.2} deg/s", peak_output);
    match settled_at {
        Some(t) => println!("Settled within 2 deg at t={:.1}", t),
        None => println!("Did not settle within 2 deg"),
    }
    println!(
        "Final: heading={:.2}, desired={:.2}, error={:.2}",
        last.heading, last.desired, last.error
    );
}

fn analyze_report(report: &SimulationReport, name: &str) {
    let summary = report.summary();
    println!("\n=== {} Timing ===", name);
    println!("Ticks: {}", summary.ticks);
    println!(
        "Deadline compliance: {:.2}% ({} missed)",
        summary.compliance_pct, summary.missed_deadlines
    );
    println!("Max lateness: {} ns", summary.max_lateness_ns);
    println!("Avg tick processing: {:.0} ns", summary.avg_processing_ns);
    println!("Saturated ticks: {}", report.saturated_ticks);

    match report.control.history_snapshot() {
        Ok(samples) => analyze_trace(&samples, name),
        Err(e) => error!("{}", e),
    }
}

fn save_outputs(report: &SimulationReport, prefix: &str) {
    let history_path = format!("{}_history.csv", prefix);
    let timing_path = format!("{}_timings.csv", prefix);

    match report.control.with(|c| c.history().save_to_csv(&history_path)) {
        Ok(Ok(())) => {}
        Ok(Err(e)) => error!("{}", e),
        Err(e) => error!("{}", e),
    }
    if let Err(e) = report.timings.save_to_csv(&timing_path) {
        error!("{}", e);
    }
}

fn benchmark_tick(c: &mut Criterion, config: &SimulationConfig) {
    let control = match ControlLoop::from_config(&config.controller) {
        Ok(control) => control,
        Err(e) => {
            error!("{}", e);
            return;
        }
    };

    c.bench_function("control_loop_tick", |b| {
        let mut control = control.clone();
        b.iter(|| black_box(control.tick()));
    });

    c.bench_function("control_loop_tick_paused", |b| {
        let mut control = control.clone();
        control.pause();
        b.iter(|| black_box(control.tick()));
    });
}

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: benchmark_runner <config_file> [threaded|async|both] [--criterion]");
        eprintln!("Example: benchmark_runner configs/heading_baseline.toml both");
        eprintln!("Example: benchmark_runner configs/heading_baseline.toml both --criterion");
        std::process::exit(1);
    }

    let config_path = &args[1];
    let use_criterion = args.iter().any(|a| a == "--criterion");

    let mut config = match load_config(config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}: {}", config_path, e);
            std::process::exit(1);
        }
    };

    let default_mode = match config.driver.mode {
        DriverMode::Threaded => "threaded",
        DriverMode::Async => "async",
    };
    let mode = args
        .get(2)
        .map(|s| s.as_str())
        .filter(|s| !s.starts_with("--"))
        .unwrap_or(default_mode);

    // Keep the log quiet under criterion
    let level = if use_criterion { LevelFilter::Warn } else { LevelFilter::Info };
    if let Err(e) = logger_init(level) {
        eprintln!("{}", e);
    }
    if use_criterion {
        config.driver.log_every = 0;
    }

    println!("========================================");
    println!("Heading PID Benchmark");
    println!("========================================");
    println!("Config: {}", config_path);
    println!(
        "Gains: kp={} ki={} kd={}  desired={}",
        config.controller.kp, config.controller.ki, config.controller.kd,
        config.controller.desired_heading
    );
    println!("Ticks: {} every {} ms", config.driver.ticks, config.driver.tick_period_ms);
    println!("Mode: {}", mode);
    println!("========================================\n");

    if use_criterion {
        let mut criterion = Criterion::default()
            .sample_size(50)
            .measurement_time(std::time::Duration::from_secs(5));
        benchmark_tick(&mut criterion, &config);
        criterion.final_summary();
        println!("\nCheck the target/criterion directory for detailed HTML reports.");
        return;
    }

    if mode == "threaded" || mode == "both" {
        info!("Running THREADED driver...");
        match threaded_impl::run_simulation(&config) {
            Ok(report) => {
                analyze_report(&report, "THREADED");
                save_outputs(&report, "threaded");
            }
            Err(e) => error!("{}", e),
        }
    }

    if mode == "async" || mode == "both" {
        info!("Running ASYNC driver...");
        let result = tokio::runtime::Runtime::new()
            .map_err(|e| e.to_string())
            .and_then(|rt| {
                rt.block_on(async_impl::run_simulation(&config))
                    .map_err(|e| e.to_string())
            });
        match result {
            Ok(report) => {
                analyze_report(&report, "ASYNC");
                save_outputs(&report, "async");
            }
            Err(e) => error!("{}", e),
        }
    }

    println!("\n========================================");
    println!("Benchmark complete!");
    println!("========================================");
}
