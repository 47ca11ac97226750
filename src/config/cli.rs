use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "timeliness-check")]
#[command(about = "Validate date and time attributes of JSON records against TOML rules")]
pub struct CliArgs {
    /// Path to TOML rules file
    #[arg(short, long, default_value = "timeliness.toml")]
    pub config: String,

    /// Path to a JSON file holding an array of records
    #[arg(short, long)]
    pub records: String,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Skip restrictions that cannot be evaluated instead of reporting them
    #[arg(long)]
    pub ignore_restriction_errors: bool,

    /// Print the validation report as JSON
    #[arg(long)]
    pub json: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub log_json: bool,
}
