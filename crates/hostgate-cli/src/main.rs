use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "hostgate",
    about = "hostgate — task placement eligibility checks",
    version,
    propagate_version = true,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a job's constraints against candidate hosts.
    ///
    /// The scenario file (TOML, or JSON when it ends in .json) lists
    /// [[hosts]], the job's [[aggregate]] counts and its [[constraints]].
    Check {
        /// Path to the scenario file
        #[arg(short, long)]
        scenario: String,
        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: String,
    },
    /// Validate an ensemble configuration file
    Ensemble {
        /// Path to the TOML file containing an [ensemble] table
        #[arg(short, long)]
        config: String,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("hostgate=info".parse()?)
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Check { scenario, format } => commands::check::check(&scenario, &format),
        Commands::Ensemble { config } => commands::ensemble::ensemble(&config),
    }
}
