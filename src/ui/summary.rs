//! End-of-run summary for `architech new`

use std::path::Path;

use console::Style;

use crate::operations::generate::ExecutionResult;

use super::display::plural;

/// Warn before generating into a directory that already has content
pub fn display_existing_root(root: &Path) {
    println!(
        "  {} {} already exists and is not empty; existing files are kept unless a blueprint overwrites them",
        Style::new().yellow().bold().apply_to("warning:"),
        root.display(),
    );
}

/// Display the outcome of a generate run
pub fn display_result(result: &ExecutionResult, root: &Path) {
    println!();
    for warning in &result.warnings {
        println!("  {} {warning}", Style::new().yellow().bold().apply_to("warning:"));
    }

    if result.success {
        println!(
            "{} Generated {} ({} module{}, {} file{})",
            Style::new().green().bold().apply_to("✔"),
            Style::new().bold().apply_to(root.display()),
            result.modules_executed,
            plural(result.modules_executed),
            result.files.len(),
            plural(result.files.len()),
        );
        return;
    }

    println!(
        "{} Generation failed while {}",
        Style::new().red().bold().apply_to("✘"),
        describe_failure_point(result)
    );
    // The first error is reported by the caller
    for error in result.errors.iter().skip(1) {
        println!("  {} {error}", Style::new().red().bold().apply_to("also:"));
    }

    if !result.committed.is_empty() {
        println!();
        println!(
            "{} module{} already committed to {} and remain on disk:",
            result.committed.len(),
            plural(result.committed.len()),
            root.display()
        );
        for id in &result.committed {
            println!("    {}", Style::new().cyan().apply_to(id));
        }
        println!(
            "{}",
            Style::new()
                .dim()
                .apply_to("Changes are not rolled back; remove the directory before retrying from scratch.")
        );
    }
}

fn describe_failure_point(result: &ExecutionResult) -> String {
    match &result.plan {
        Some(plan) if result.modules_executed < plan.total_modules() => format!(
            "executing ({} of {} modules committed)",
            result.modules_executed,
            plan.total_modules()
        ),
        Some(_) => "installing dependencies".to_string(),
        None => "preparing the plan".to_string(),
    }
}
