//! Suite configuration: a TOML file layered with `BANK_SUITE_*` environment
//! overrides, plus the command line.

mod cli;
pub use clap::Parser;
pub use cli::*;

mod settings;
pub use settings::*;
