//! Learn commands - knowledge base add/list/retro

use crate::services::learn_service;
use crate::{Colorize, Result};
use clap::Subcommand;
use std::env;

#[derive(Subcommand)]
pub enum LearnCommands {
    /// Add a learning to the knowledge base
    Add {
        /// Category: success, failure, pattern, antipattern, tool, process
        category: String,

        /// Short title
        title: String,

        /// Detailed description
        description: String,

        /// When/where this applies
        #[arg(short, long)]
        context: Option<String>,
    },

    /// List learnings
    List {
        /// Filter by category
        #[arg(long)]
        category: Option<String>,
    },

    /// Summarize a cycle for a retrospective
    Retro {
        /// Cycle ID (optional when a single active cycle exists)
        cycle_id: Option<String>,
    },
}

pub fn run(cmd: LearnCommands, json: bool) -> Result<()> {
    let project_root = env::current_dir()?;

    match cmd {
        LearnCommands::Add {
            category,
            title,
            description,
            context,
        } => {
            let report = learn_service::add_learning(
                &category,
                &title,
                &description,
                context.as_deref(),
                &project_root,
            )?;
            if json {
                return crate::cli::print_json(&report);
            }
            println!(
                "{}",
                format!("📚 Learning added [{}]: {}", report.category, report.title).green()
            );
        }

        LearnCommands::List { category } => {
            let learnings = learn_service::list_learnings(category.as_deref(), &project_root)?;
            if json {
                return crate::cli::print_json(&learnings);
            }
            if learnings.is_empty() {
                println!("{}", "No learnings found.".yellow());
                println!(
                    "Add one with: {}",
                    "forge learn add <category> \"title\" \"description\"".cyan()
                );
                return Ok(());
            }
            println!(
                "{}",
                format!("📚 Learnings ({} total)", learnings.len()).cyan().bold()
            );
            println!();
            for learning in &learnings {
                println!(
                    "   [{}] {} {}",
                    learning.category.cyan(),
                    learning.title.bold(),
                    format!("({})", learning.date).bright_black()
                );
                let snippet: String = learning.description.chars().take(80).collect();
                println!("       {}", snippet);
            }
        }

        LearnCommands::Retro { cycle_id } => {
            let report = learn_service::retrospective(cycle_id.as_deref(), &project_root)?;
            if json {
                return crate::cli::print_json(&report);
            }
            println!();
            println!("{}", "═".repeat(50));
            println!("📊 RETROSPECTIVE: {}", report.feature.bold());
            println!("{}", "═".repeat(50));
            println!("Cycle:      {}", report.cycle_id);
            if let Some(created) = &report.created {
                println!("Started:    {}", created);
            }
            println!(
                "Completion: {}% ({}/{} tasks)",
                report.completion_rate, report.completed_tasks, report.total_tasks
            );
            println!();
            println!("Phase summary:");
            for (phase, (completed, total)) in &report.phases {
                let mark = if total > &0 && completed == total {
                    "✓".green()
                } else {
                    "○".normal()
                };
                println!("   {} {}: {}/{} tasks", mark, phase, completed, total);
            }
            println!();
            println!("Reflection prompts:");
            for prompt in &report.prompts {
                println!("   📝 {}", prompt);
            }
            println!();
        }
    }

    Ok(())
}
