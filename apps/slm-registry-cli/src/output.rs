//! Terminal output helpers for consistent CLI formatting

use slm_registry_client::reconciler::SetupReport;

/// Check if color output is enabled
fn use_color() -> bool {
    std::env::var("NO_COLOR").is_err()
}

/// Print a success message (green checkmark)
pub fn print_success(message: &str) {
    if use_color() {
        println!("\x1b[32m✓\x1b[0m {}", message);
    } else {
        println!("OK: {}", message);
    }
}

/// Print a warning message (yellow)
pub fn print_warning(message: &str) {
    if use_color() {
        eprintln!("\x1b[33mWarning:\x1b[0m {}", message);
    } else {
        eprintln!("Warning: {}", message);
    }
}

/// Print a header with decorative border
pub fn print_header(title: &str) {
    let border = "═".repeat(59);
    println!();
    println!("{}", border);
    println!("{:^59}", title);
    println!("{}", border);
    println!();
}

/// Print a key-value pair with consistent formatting
pub fn print_key_value(key: &str, value: &str) {
    if use_color() {
        println!("  \x1b[1m{}:\x1b[0m {}", key, value);
    } else {
        println!("  {}: {}", key, value);
    }
}

/// Pretty-print any serializable value as JSON on stdout
pub fn print_json<T: serde::Serialize>(value: &T) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Render one summary section: a title and its entries, one per line.
pub fn format_section(title: &str, entries: &[String]) -> String {
    let mut out = format!("{title} ({}):", entries.len());
    if entries.is_empty() {
        out.push_str(" none");
    }
    for entry in entries {
        out.push_str("\n    ");
        out.push_str(entry);
    }
    out
}

/// Print the end-of-run summary of a setup
pub fn print_setup_summary(report: &SetupReport) {
    print_header("Resource Registry Setup Summary");

    for (title, entries) in [
        ("Resources deleted", &report.deleted),
        ("Resources added", &report.added),
        ("Resources skipped (already registered)", &report.skipped),
        ("Capabilities added", &report.capabilities_added),
        ("Submodels added", &report.submodels_added),
    ] {
        println!("  {}", format_section(title, entries));
    }

    println!();
    print_key_value(
        "Registered after create",
        &report.registered_after_create.to_string(),
    );
    print_key_value("Took", &format!("{:.2}s", report.elapsed_secs));
    println!();

    if !report.has_failures() {
        print_success("Resource registry setup done");
    } else {
        for failure in &report.failures {
            print_warning(&format!(
                "{:?} failed for {}: {}",
                failure.stage, failure.resource_id, failure.message
            ));
        }
        print_warning(&format!(
            "Resource registry setup done with {} failure(s)",
            report.failures.len()
        ));
    }
}
