mod menu;

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use common::config::ConfigError;
use common::logger::logger_init;
use common::metrics::TimingSummary;
use common::{load_config, ControlLoop, SharedControlLoop, SimulationConfig, SimulationReport};
use log::{error, warn, LevelFilter};

const CONFIG_PATH: &str = "configs/heading_baseline.toml";

fn main() {
    if let Err(e) = logger_init(LevelFilter::Info) {
        eprintln!("{}", e);
    }

    let config = match load_config(CONFIG_PATH) {
        Ok(config) => config,
        Err(ConfigError::Io(e)) => {
            warn!("{} not readable ({}), using defaults", CONFIG_PATH, e);
            SimulationConfig::default()
        }
        Err(e) => {
            error!("{}: {}", CONFIG_PATH, e);
            std::process::exit(1);
        }
    };

    let control = match ControlLoop::from_config(&config.controller) {
        Ok(c) => SharedControlLoop::new(c),
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };

    println!("===========================================");
    println!("Welcome to the Heading PID Simulator");
    println!("===========================================");

    loop {
        let running = control.status().map(|s| s.running).unwrap_or(false);
        menu::show_menu(running);

        let result = match menu::get_user_choice() {
            Ok(1) => run_threaded(&config, &control),
            Ok(2) => run_async(&config, &control),
            Ok(3) => step_ticks(&control),
            Ok(4) => set_parameters(&control),
            Ok(5) => control.toggle_running().map_err(|e| e.to_string()),
            Ok(6) => control.reset().map_err(|e| e.to_string()),
            Ok(7) => show_status(&control),
            Ok(8) => export_history(&control),
            Ok(9) => {
                println!("Goodbye!");
                break;
            }
            _ => {
                println!("Invalid choice. Please select 1-9.");
                Ok(())
            }
        };

        if let Err(e) = result {
            error!("{}", e);
        }
    }
}

fn run_threaded(config: &SimulationConfig, control: &SharedControlLoop) -> Result<(), String> {
    println!("\n=== Running Threaded Driver ===");
    println!(
        "{} ticks every {}ms",
        config.driver.ticks, config.driver.tick_period_ms
    );

    let report = threaded_impl::run_driver(
        &config.driver,
        control.clone(),
        Arc::new(AtomicBool::new(false)),
    );
    display_report(&report)?;

    menu::wait_for_enter();
    Ok(())
}

fn run_async(config: &SimulationConfig, control: &SharedControlLoop) -> Result<(), String> {
    println!("\n=== Running Async Driver ===");
    println!(
        "{} ticks every {}ms",
        config.driver.ticks, config.driver.tick_period_ms
    );

    let rt = tokio::runtime::Runtime::new().map_err(|e| e.to_string())?;
    let report = rt.block_on(async_impl::run_driver(
        &config.driver,
        control.clone(),
        Arc::new(AtomicBool::new(false)),
    ));
    display_report(&report)?;

    menu::wait_for_enter();
    Ok(())
}

fn step_ticks(control: &SharedControlLoop) -> Result<(), String> {
    let count = menu::prompt_count("Number of ticks", 1).map_err(|e| e.to_string())?;

    for _ in 0..count {
        let out = control.tick().map_err(|e| e.to_string())?;
        let heading = control.status().map_err(|e| e.to_string())?.heading;
        println!(
            "error {:>8.2}  output {:>7.2}  heading {:>7.2}",
            out.error, out.output, heading
        );
    }
    Ok(())
}

fn set_parameters(control: &SharedControlLoop) -> Result<(), String> {
    let (gains, desired) = control
        .with(|c| (c.gains(), c.desired_heading()))
        .map_err(|e| e.to_string())?;

    let parse = |e: std::num::ParseFloatError| e.to_string();
    let kp = menu::prompt_f64("Kp (Proportional)", gains.kp).map_err(parse)?;
    let ki = menu::prompt_f64("Ki (Integral)", gains.ki).map_err(parse)?;
    let kd = menu::prompt_f64("Kd (Derivative)", gains.kd).map_err(parse)?;
    let desired = menu::prompt_f64("Desired Heading (degrees)", desired).map_err(parse)?;

    control
        .set_parameters(kp, ki, kd, desired)
        .map_err(|e| e.to_string())
}

fn show_status(control: &SharedControlLoop) -> Result<(), String> {
    let status = control.status().map_err(|e| e.to_string())?;
    let parts = control.pid_components().map_err(|e| e.to_string())?;

    println!("\n=== Current Values ===");
    println!("Current Heading: {:.1}°", status.heading);
    println!("Desired Heading: {:.1}°", status.desired);
    println!("Error:           {:.1}°", status.error);
    println!("PID Output:      {:.1}°/s", status.output);
    println!("\n--- PID Components ---");
    println!("Proportional (P): {:.1}", parts.proportional);
    println!("Integral (I):     {:.1}", parts.integral);
    println!("Derivative (D):   {:.1}", parts.derivative);
    println!("\n--- Simulation Info ---");
    println!("Data Points:     {}", status.samples);
    println!("Simulation Time: {:.1}s", status.elapsed);
    println!("Status:          {}", if status.running { "Running" } else { "Paused" });

    menu::wait_for_enter();
    Ok(())
}

fn export_history(control: &SharedControlLoop) -> Result<(), String> {
    let path = menu::prompt_string("Output file", "heading_history.csv");
    control
        .with(|c| c.history().save_to_csv(&path))
        .map_err(|e| e.to_string())?
        .map_err(|e| e.to_string())
}

fn display_report(report: &SimulationReport) -> Result<(), String> {
    let summary: TimingSummary = report.summary();
    let status = report.control.status().map_err(|e| e.to_string())?;

    if summary.ticks == 0 {
        println!("No ticks were run.");
        return Ok(());
    }

    println!("\n=== Driver Results ===");
    println!("Ticks: {}", summary.ticks);
    println!(
        "Deadline Compliance: {:.2}% ({} missed)",
        summary.compliance_pct, summary.missed_deadlines
    );
    println!("Saturated ticks: {}", report.saturated_ticks);
    println!(
        "Final heading {:.2}° (desired {:.2}°, error {:.2}°)",
        status.heading, status.desired, status.error
    );
    Ok(())
}
