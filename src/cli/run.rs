//! Munge and clean command implementations

use clap::Args;
use std::path::PathBuf;
use std::process::ExitCode;

use super::console::Console;
use super::{EXIT_ERROR, EXIT_INVALID_ARGS, EXIT_SUCCESS};
use crate::build::{Host, Manager};
use crate::config::loader::{merge_cli_overrides, CliOverrides};
use crate::config::{Platform, Project};

/// Which job a run starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Job {
    Munge,
    Clean,
}

/// How categories and children are selected before applying the
/// per-category flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// Addme, common and sound with every child; no load or shell
    Default,
    /// Everything
    All,
    /// Nothing
    None,
    /// Whatever the project file says
    Config,
}

#[derive(Debug, Clone, Args)]
pub struct RunArgs {
    /// Project directory (default: current directory)
    #[arg(long, default_value = ".")]
    pub project: PathBuf,

    /// Path to ToolsFL\bin. Required if missing from munge.toml
    #[arg(long)]
    pub toolsfl_bin: Option<PathBuf>,

    /// Target platform
    #[arg(long, value_enum)]
    pub platform: Option<Platform>,

    /// Process everything
    #[arg(long, conflicts_with_all = ["none", "config"])]
    pub all: bool,

    /// Process nothing, turn individual items on using flags
    #[arg(long, conflicts_with = "config")]
    pub none: bool,

    /// Process using the selection saved in munge.toml
    #[arg(long)]
    pub config: bool,

    /// Process addme
    #[arg(long)]
    pub addme: bool,

    /// Process common
    #[arg(long)]
    pub common: bool,

    /// Process load
    #[arg(long)]
    pub load: bool,

    /// Process shell
    #[arg(long)]
    pub shell: bool,

    /// Process every side
    #[arg(long)]
    pub sides: bool,

    /// Process every world
    #[arg(long)]
    pub worlds: bool,

    /// Process sound and every sound world
    #[arg(long)]
    pub sounds: bool,

    /// Print the report as JSON instead of the console listing
    #[arg(long)]
    pub json: bool,
}

impl RunArgs {
    pub fn selection(&self) -> Selection {
        if self.all {
            Selection::All
        } else if self.none {
            Selection::None
        } else if self.config {
            Selection::Config
        } else {
            Selection::Default
        }
    }
}

fn set_active_children(project: &mut Project, active: bool) {
    project.sides.iter_mut().for_each(|side| side.active = active);
    project.worlds.iter_mut().for_each(|world| world.active = active);
    project.sound_worlds.iter_mut().for_each(|world| world.active = active);
}

/// Apply the selection mode and category flags of `args` to a project.
///
/// Deploying is always turned off.
pub fn apply_selection(project: &mut Project, args: &RunArgs) {
    match args.selection() {
        Selection::All | Selection::None => {
            let active = args.selection() == Selection::All;
            project.addme_active = active;
            project.common_active = active;
            project.load_active = active;
            project.shell_active = active;
            project.sound_active = active;
            set_active_children(project, active);
        }
        Selection::Config => {}
        Selection::Default => {
            project.addme_active = true;
            project.common_active = true;
            project.load_active = false;
            project.shell_active = false;
            project.sound_active = true;
            set_active_children(project, true);
        }
    }

    project.deploy = false;

    if args.addme {
        project.addme_active = true;
    }
    if args.common {
        project.common_active = true;
    }
    if args.load {
        project.load_active = true;
    }
    if args.shell {
        project.shell_active = true;
    }
    if args.sides {
        project.sides.iter_mut().for_each(|side| side.active = true);
    }
    if args.worlds {
        project.worlds.iter_mut().for_each(|world| world.active = true);
    }
    if args.sounds {
        project.sound_active = true;
        project.sound_worlds.iter_mut().for_each(|world| world.active = true);
    }
}

/// Check the ToolsFL bin directory a project will run tools from.
pub fn validate_toolsfl_bin(project: &Project) -> Result<(), String> {
    let toolsfl_bin = &project.config.toolsfl_bin;

    if toolsfl_bin.as_os_str().is_empty() {
        return Err("ToolsFL\\bin path is not set! Use --toolsfl-bin to set it.".to_string());
    }
    if !toolsfl_bin.exists() {
        return Err(format!("ToolsFL\\bin path does not exist: {}", toolsfl_bin.display()));
    }

    Ok(())
}

/// Execute the munge or clean command
pub fn run_job(args: &RunArgs, job: Job) -> ExitCode {
    let console = Console::new();

    let mut manager = match Manager::new(Project::new(&args.project), Host::system()) {
        Ok(manager) => manager,
        Err(e) => {
            eprintln!("Error: Failed to start worker thread: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    if let Err(e) = manager.open_project(&args.project) {
        eprintln!("Error: {}", e);
        return ExitCode::from(EXIT_ERROR);
    }
    if !args.json {
        console.line(&format!("Opened Project: {}", args.project.display()));
    }

    let overrides = CliOverrides { toolsfl_bin: args.toolsfl_bin.clone(), platform: args.platform };
    merge_cli_overrides(manager.project_mut(), &overrides);

    if let Err(message) = validate_toolsfl_bin(manager.project()) {
        eprintln!("Error: {}", message);
        return ExitCode::from(EXIT_INVALID_ARGS);
    }

    apply_selection(manager.project_mut(), args);

    if !args.json {
        console.line(&format!(
            "ToolsFL\\bin Path: {}",
            manager.project().config.toolsfl_bin.display()
        ));
        console.project(manager.project());
    }

    match job {
        Job::Munge => {
            if !args.json {
                console.line("Starting munge...");
            }
            manager.start_munge();
        }
        Job::Clean => {
            if !args.json {
                console.line("Starting clean...");
            }
            manager.start_clean();
        }
    }

    manager.wait_for_idle();
    let report = manager.get_munge_report().clone();

    if args.json {
        match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error: Failed to serialize report: {}", e);
                return ExitCode::from(EXIT_ERROR);
            }
        }
    } else {
        console.heading("Printing Standard Output");
        for line in manager.view_standard_output_lines().iter() {
            console.line(line);
        }

        console.heading("Printing Standard Error");
        for line in manager.view_standard_error_lines().iter() {
            console.error_line(line);
        }

        console.heading("Printing structured Warnings and Errors");
        console.report(&report);
    }

    if report.has_errors() {
        ExitCode::from(EXIT_ERROR)
    } else {
        ExitCode::from(EXIT_SUCCESS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use crate::config::{ProjectChild, SoundWorld};
    use clap::Parser;
    use tempfile::TempDir;

    fn parse(args: &[&str]) -> RunArgs {
        let mut argv = vec!["lvlmunge", "munge"];
        argv.extend_from_slice(args);
        match Cli::parse_from(argv).command {
            Commands::Munge(args) => args,
            _ => panic!("expected munge command"),
        }
    }

    fn project() -> Project {
        let mut project = Project::new("proj");
        project.sides = vec![ProjectChild { name: "ALL".into(), active: false }];
        project.worlds = vec![ProjectChild { name: "TST".into(), active: false }];
        project.sound_worlds = vec![SoundWorld { name: "tst".into(), active: false, localized: false }];
        project.load_active = true;
        project.shell_active = true;
        project
    }

    #[test]
    fn test_default_selection() {
        let mut project = project();
        apply_selection(&mut project, &parse(&[]));

        assert!(project.addme_active);
        assert!(project.common_active);
        assert!(!project.load_active);
        assert!(!project.shell_active);
        assert!(project.sound_active);
        assert!(project.sides[0].active);
        assert!(project.worlds[0].active);
        assert!(project.sound_worlds[0].active);
        assert!(!project.deploy);
    }

    #[test]
    fn test_all_selection() {
        let mut project = project();
        project.load_active = false;
        apply_selection(&mut project, &parse(&["--all"]));

        assert!(project.load_active);
        assert!(project.shell_active);
        assert!(project.sound_worlds[0].active);
    }

    #[test]
    fn test_none_with_flags() {
        let mut project = project();
        project.sides[0].active = true;
        apply_selection(&mut project, &parse(&["--none", "--load", "--worlds"]));

        assert!(!project.addme_active);
        assert!(!project.common_active);
        assert!(project.load_active);
        assert!(!project.shell_active);
        assert!(!project.sound_active);
        assert!(!project.sides[0].active);
        assert!(project.worlds[0].active);
        assert!(!project.sound_worlds[0].active);
    }

    #[test]
    fn test_config_keeps_project() {
        let mut project = project();
        project.addme_active = false;
        apply_selection(&mut project, &parse(&["--config", "--sounds"]));

        assert!(!project.addme_active);
        assert!(project.load_active);
        assert!(!project.worlds[0].active);
        assert!(project.sound_active);
        assert!(project.sound_worlds[0].active);
    }

    #[test]
    fn test_selection_modes_conflict() {
        let result = Cli::try_parse_from(["lvlmunge", "munge", "--all", "--none"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_run_args_defaults() {
        let args = parse(&["--platform", "ps2"]);
        assert_eq!(args.project, PathBuf::from("."));
        assert_eq!(args.platform, Some(Platform::Ps2));
        assert_eq!(args.selection(), Selection::Default);
        assert!(!args.json);
    }

    #[test]
    fn test_validate_toolsfl_bin() {
        let temp = TempDir::new().unwrap();
        let mut project = Project::new(temp.path());

        let missing = validate_toolsfl_bin(&project).unwrap_err();
        assert!(missing.contains("not set"));

        project.config.toolsfl_bin = temp.path().join("nope");
        let absent = validate_toolsfl_bin(&project).unwrap_err();
        assert!(absent.contains("does not exist"));

        project.config.toolsfl_bin = temp.path().to_path_buf();
        assert!(validate_toolsfl_bin(&project).is_ok());
    }
}
