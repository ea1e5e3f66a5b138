use std::io::{self, Write};

pub fn show_menu(running: bool) {
    println!("\n===========================================");
    println!("Heading PID Simulator ({})", if running { "running" } else { "paused" });
    println!("===========================================");
    println!("Select an option:");
    println!("1. Run Threaded Driver");
    println!("2. Run Async Driver");
    println!("3. Step Ticks Manually");
    println!("4. Set PID Parameters");
    println!("5. Pause/Resume");
    println!("6. Reset");
    println!("7. Show Current Values");
    println!("8. Export History to CSV");
    println!("9. Exit");
    println!("===========================================");
    print!("Choice (1-9): ");
    let _ = io::stdout().flush();
}

fn read_line() -> String {
    let mut input = String::new();
    if io::stdin().read_line(&mut input).is_err() {
        input.clear();
    }
    input.trim().to_string()
}

pub fn get_user_choice() -> Result<u32, std::num::ParseIntError> {
    read_line().parse::<u32>()
}

/// Prompt for a number, keeping `current` when the input is blank.
pub fn prompt_f64(label: &str, current: f64) -> Result<f64, std::num::ParseFloatError> {
    print!("{} [{}]: ", label, current);
    let _ = io::stdout().flush();
    let input = read_line();
    if input.is_empty() {
        Ok(current)
    } else {
        input.parse::<f64>()
    }
}

/// Prompt for a whole count, keeping `current` when the input is blank.
pub fn prompt_count(label: &str, current: u64) -> Result<u64, std::num::ParseIntError> {
    print!("{} [{}]: ", label, current);
    let _ = io::stdout().flush();
    parse_count(&read_line(), current)
}

fn parse_count(input: &str, current: u64) -> Result<u64, std::num::ParseIntError> {
    if input.is_empty() {
        Ok(current)
    } else {
        input.parse::<u64>()
    }
}

pub fn prompt_string(label: &str, default: &str) -> String {
    print!("{} [{}]: ", label, default);
    let _ = io::stdout().flush();
    let input = read_line();
    if input.is_empty() {
        default.to_string()
    } else {
        input
    }
}

pub fn wait_for_enter() {
    println!("\nPress Enter to return to menu...");
    let _ = read_line();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn count_must_be_whole() {
        assert_eq!(parse_count("", 1), Ok(1));
        assert_eq!(parse_count("12", 1), Ok(12));
        assert!(parse_count("2.5", 1).is_err());
        assert!(parse_count("-3", 1).is_err());
    }
}
