//! User-supplied commands run after a phase's built-in tools.

use super::{munge_process, run_process};
use crate::build::context::ToolContext;
use crate::build::host::LaunchError;
use crate::config::CustomCommand;
use std::path::{Path, PathBuf};

/// Replace the context placeholders in a command line.
pub fn substitute_placeholders(command_line: &str, context: &ToolContext) -> String {
    command_line
        .replace("{source}", &context.source_path.display().to_string())
        .replace("{output}", &context.output_path.display().to_string())
        .replace("{lvl_output}", &context.lvl_output_path.display().to_string())
        .replace("{project}", &context.project_path.display().to_string())
        .replace("{platform}", context.platform.as_str())
}

/// Run a custom command if its platform filter admits the context's platform.
pub fn execute_custom_command(command: &CustomCommand, context: &ToolContext) -> Result<(), LaunchError> {
    if !command.platform_filter.matches(context.platform) {
        tracing::debug!(command = %command.command_line, "custom command filtered out");
        return Ok(());
    }

    let command_line = substitute_placeholders(&command.command_line, context);
    let command_line = command_line.trim();
    let (program, arguments) = match command_line.split_once(char::is_whitespace) {
        Some((program, arguments)) => (program, arguments.trim_start()),
        None => (command_line, ""),
    };
    if program.is_empty() {
        return Ok(());
    }

    let executable = if Path::new(program).is_absolute() {
        PathBuf::from(program)
    } else {
        context.toolsfl_bin_path.join(program)
    };
    let desc = munge_process(executable, arguments.to_string(), &context.project_path);

    if command.detach {
        context.host.processes.spawn_detached(&desc)
    } else {
        run_process(context, desc, |feedback, stderr| {
            feedback.parse_error_string(stderr, &context.source_path)
        })
    }
}
