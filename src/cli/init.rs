use crate::services::init_service;
use crate::{Colorize, Result};
use std::env;

pub fn run(name: Option<&str>, force: bool, json: bool) -> Result<()> {
    let project_root = env::current_dir()?;

    if !json {
        if force {
            println!("{}", "🔄 Reinitializing FORGE...".cyan());
        } else {
            println!("{}", "🔥 Initializing FORGE...".cyan());
        }
    }

    let report = init_service::init_project(&project_root, name, force)?;

    if json {
        return crate::cli::print_json(&report);
    }

    println!();
    println!("{}", "✅ FORGE initialized".green().bold());
    println!("   Project: {}", report.project);
    println!("   Path:    {}", report.path);
    println!();
    println!("{}", "Created:".cyan());
    for file in &report.created {
        println!("   • {}", file);
    }
    println!();
    println!("{}", "Next steps:".yellow().bold());
    println!("   1. {}", "forge new \"my-feature\"".cyan());
    println!("   2. {}", "forge status".cyan());

    Ok(())
}
