// CLI module
// Command-line interface and argument parsing

mod args;

pub use args::{CliArgs, ServerType};

use clap::Parser;

/// Parse command-line arguments using clap
///
/// Every option also reads an environment variable, so container deployments
/// can configure the servers without flags. On invalid input clap prints the
/// error or help text and exits the process.
pub fn parse_args() -> CliArgs {
    CliArgs::parse()
}
