use super::Parser;

/// Runs the banking API end-to-end suite against a live service and database.
#[derive(Parser, Debug)]
#[command(name = "bank-api-suite")]
pub struct Cli {
    /// Path to a settings file (TOML); defaults to `settings/dev.toml`.
    #[arg(long)]
    pub settings: Option<String>,

    /// Keep seeded rows after the run even when `suite.clear_after_run` is set.
    #[arg(long)]
    pub keep_data: bool,
}
