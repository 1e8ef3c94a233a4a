//! lvlmunge - Command-line munge and clean of ToolsFL content projects

use std::process::ExitCode;

use lvlmunge::cli;

fn main() -> ExitCode {
    cli::run()
}
