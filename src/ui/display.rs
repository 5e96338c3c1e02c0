//! Display functions for plans, conflicts and modules

use console::Style;

use crate::domain::{Conflict, ExecutionPlan, Module, ModuleCategory};
use crate::resolver::Resolution;

/// Display the batches of an execution plan
pub fn display_plan(plan: &ExecutionPlan, resolution: &Resolution) {
    println!(
        "{} ({} module{} in {} batch{})",
        Style::new().bold().apply_to("Execution plan"),
        plan.total_modules(),
        plural(plan.total_modules()),
        plan.batches.len(),
        if plan.batches.len() == 1 { "" } else { "es" }
    );
    println!();

    for batch in &plan.batches {
        let mode = if batch.can_execute_in_parallel {
            Style::new().green().apply_to("parallel")
        } else {
            Style::new().yellow().apply_to("sequential")
        };
        print!("  {} {} [{}]", Style::new().bold().apply_to("Batch"), batch.number, mode);
        if batch.dependencies.is_empty() {
            println!();
        } else {
            let after: Vec<String> = batch.dependencies.iter().map(ToString::to_string).collect();
            println!(" {}", Style::new().dim().apply_to(format!("after {}", after.join(", "))));
        }

        for id in &batch.modules {
            match resolution.get(id) {
                Some(resolved) => println!(
                    "    {} {} {}",
                    Style::new().cyan().apply_to(id),
                    Style::new().dim().apply_to(format!("v{}", resolved.module.version)),
                    Style::new().dim().apply_to(format!("({})", resolved.resolution_path.join(" -> ")))
                ),
                None => println!("    {}", Style::new().cyan().apply_to(id)),
            }
        }
    }
}

/// Display resolution conflicts, errors first
pub fn display_conflicts(conflicts: &[Conflict]) {
    let (errors, warnings): (Vec<&Conflict>, Vec<&Conflict>) = conflicts.iter().partition(|c| c.is_error());
    for conflict in errors {
        println!("  {} {}", Style::new().red().bold().apply_to("error:"), conflict.describe());
    }
    for conflict in warnings {
        println!("  {} {}", Style::new().yellow().bold().apply_to("warning:"), conflict.describe());
    }
}

/// Display registry modules grouped by category
pub fn display_modules(modules: &[&Module]) {
    if modules.is_empty() {
        println!("No modules found.");
        return;
    }

    println!("Available modules ({}):", modules.len());
    for category in ModuleCategory::ALL {
        let group: Vec<&&Module> = modules.iter().filter(|m| m.category == category).collect();
        if group.is_empty() {
            continue;
        }
        println!();
        println!("  {}", Style::new().bold().apply_to(heading(category)));
        for module in group {
            print!(
                "    {} {}",
                Style::new().bold().yellow().apply_to(&module.id),
                Style::new().dim().apply_to(format!("v{}", module.version))
            );
            match &module.description {
                Some(description) => println!("  {description}"),
                None => println!(),
            }
            if !module.provides.is_empty() {
                let provides: Vec<&str> = module.provides.iter().map(String::as_str).collect();
                println!("      {} {}", Style::new().bold().apply_to("provides:"), provides.join(", "));
            }
        }
    }
}

fn heading(category: ModuleCategory) -> &'static str {
    match category {
        ModuleCategory::Framework => "Frameworks",
        ModuleCategory::Adapter => "Adapters",
        ModuleCategory::Integration => "Integrations",
        ModuleCategory::Feature => "Features",
    }
}

pub(crate) fn plural(count: usize) -> &'static str {
    if count == 1 { "" } else { "s" }
}
