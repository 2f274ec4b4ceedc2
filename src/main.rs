use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use colored::Colorize;
use forge::Result;
use std::io;

#[derive(Parser)]
#[command(name = "forge")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Phase-gated development cycle tracker", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize .forge/ in the current directory
    Init {
        /// Project name (defaults to directory name)
        #[arg(short, long)]
        name: Option<String>,

        /// Reinitialize if .forge/ exists
        #[arg(short, long)]
        force: bool,
    },

    /// Create a new development cycle
    New {
        /// Feature name
        feature: String,

        /// Cycle priority
        #[arg(short, long, default_value = "medium", value_parser = ["low", "medium", "high", "critical"])]
        priority: String,

        /// Feature description
        #[arg(short, long)]
        description: Option<String>,
    },

    /// List cycles
    List {
        /// Include completed cycles
        #[arg(short, long)]
        all: bool,
    },

    /// Show one cycle in full
    Show {
        /// Cycle ID
        cycle_id: String,
    },

    /// Show status of active cycles
    Status {
        /// Cycle ID (all active cycles when omitted)
        cycle_id: Option<String>,

        /// Include completed cycles
        #[arg(short, long)]
        all: bool,
    },

    /// Validate the current phase against its gate
    Validate {
        /// Cycle ID (optional when a single active cycle exists)
        cycle_id: Option<String>,
    },

    /// Advance to the next phase
    Advance {
        /// Cycle ID (optional when a single active cycle exists)
        cycle_id: Option<String>,

        /// Bypass validation issues
        #[arg(short, long)]
        force: bool,
    },

    /// Mark a task in the current phase as completed
    CompleteTask {
        /// Task ordinal, or a (partial) task description
        task: String,

        /// Cycle ID (optional when a single active cycle exists)
        #[arg(long)]
        cycle: Option<String>,
    },

    /// Add a task to a phase
    AddTask {
        /// Task description
        task: String,

        /// Cycle ID (optional when a single active cycle exists)
        #[arg(long)]
        cycle: Option<String>,

        /// Target phase (defaults to the current phase)
        #[arg(short, long)]
        phase: Option<String>,
    },

    /// Complete and archive a cycle
    Complete {
        /// Cycle ID
        cycle_id: String,

        /// Completion notes
        #[arg(short, long)]
        notes: Option<String>,

        /// Archive even if the Evaluate gate is not met
        #[arg(short, long)]
        force: bool,
    },

    /// Knowledge base operations
    #[command(subcommand)]
    Learn(forge::cli::learn::LearnCommands),

    /// Generate shell completions
    Completions {
        /// Shell type (bash, zsh, fish, powershell)
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn main() {
    let cli = Cli::parse();
    let json = cli.json;

    if let Err(e) = run(cli) {
        if json {
            eprintln!(
                "{}",
                serde_json::json!({ "success": false, "error": e.to_string() })
            );
        } else {
            eprintln!("{}", format!("Error: {}", e).red());
        }
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let json = cli.json;

    match cli.command {
        Commands::Init { name, force } => {
            forge::cli::init::run(name.as_deref(), force, json)?;
        }

        Commands::New {
            feature,
            priority,
            description,
        } => {
            forge::cli::cycle::run_new(&feature, &priority, description.as_deref(), json)?;
        }

        Commands::List { all } => {
            forge::cli::cycle::run_list(all, json)?;
        }

        Commands::Show { cycle_id } => {
            forge::cli::cycle::run_show(&cycle_id, json)?;
        }

        Commands::Status { cycle_id, all } => {
            forge::cli::status::run(cycle_id.as_deref(), all, json)?;
        }

        Commands::Validate { cycle_id } => {
            forge::cli::phase::run_validate(cycle_id.as_deref(), json)?;
        }

        Commands::Advance { cycle_id, force } => {
            forge::cli::phase::run_advance(cycle_id.as_deref(), force, json)?;
        }

        Commands::CompleteTask { task, cycle } => {
            forge::cli::phase::run_complete_task(cycle.as_deref(), &task, json)?;
        }

        Commands::AddTask { task, cycle, phase } => {
            forge::cli::phase::run_add_task(cycle.as_deref(), &task, phase.as_deref(), json)?;
        }

        Commands::Complete {
            cycle_id,
            notes,
            force,
        } => {
            forge::cli::cycle::run_complete(&cycle_id, notes.as_deref(), force, json)?;
        }

        Commands::Learn(cmd) => {
            forge::cli::learn::run(cmd, json)?;
        }

        Commands::Completions { shell } => {
            generate(shell, &mut Cli::command(), "forge", &mut io::stdout());
        }
    }

    Ok(())
}
