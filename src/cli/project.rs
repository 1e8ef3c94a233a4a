//! Project file command implementations

use clap::Subcommand;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use super::{EXIT_ERROR, EXIT_SUCCESS};
use crate::build::{discovery, Host};
use crate::config::loader::{
    merge_cli_overrides, project_file_path, save_project, CliOverrides, ProjectFileError,
};
use crate::config::{Platform, Project};

#[derive(Debug, Clone, Subcommand)]
pub enum ProjectAction {
    /// Write a munge.toml for the sides, worlds and sounds found in a project
    Init {
        /// Project directory (default: current directory)
        #[arg(long, default_value = ".")]
        project: PathBuf,

        /// Path to ToolsFL\bin to store in the project file
        #[arg(long)]
        toolsfl_bin: Option<PathBuf>,

        /// Target platform to store in the project file
        #[arg(long, value_enum)]
        platform: Option<Platform>,

        /// Overwrite an existing munge.toml
        #[arg(long)]
        force: bool,
    },
    /// Print the project as it would be munged
    Show {
        /// Project directory (default: current directory)
        #[arg(long, default_value = ".")]
        project: PathBuf,

        /// Print as JSON instead of TOML
        #[arg(long)]
        json: bool,
    },
}

/// Execute the project command
pub fn run_project(action: ProjectAction) -> ExitCode {
    match action {
        ProjectAction::Init { project, toolsfl_bin, platform, force } => {
            run_init(&project, CliOverrides { toolsfl_bin, platform }, force)
        }
        ProjectAction::Show { project, json } => run_show(&project, json),
    }
}

/// Scan a project directory and write its project file.
///
/// Returns the path written.
pub fn init_project(
    host: &Host,
    directory: &Path,
    overrides: &CliOverrides,
    force: bool,
) -> Result<PathBuf, ProjectFileError> {
    let path = project_file_path(directory);
    if host.fs.exists(&path) && !force {
        return Err(ProjectFileError::AlreadyExists(path));
    }

    let mut project = discovery::scan_project(host, directory);
    merge_cli_overrides(&mut project, overrides);
    save_project(&project, &path)?;

    tracing::info!(path = %path.display(), "wrote project file");
    Ok(path)
}

fn run_init(directory: &Path, overrides: CliOverrides, force: bool) -> ExitCode {
    if !directory.is_dir() {
        eprintln!("Error: Project directory not found: {}", directory.display());
        return ExitCode::from(EXIT_ERROR);
    }

    match init_project(&Host::system(), directory, &overrides, force) {
        Ok(path) => {
            println!("Created {}", path.display());
            ExitCode::from(EXIT_SUCCESS)
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(EXIT_ERROR)
        }
    }
}

fn format_project(project: &Project, json: bool) -> Result<String, String> {
    if json {
        serde_json::to_string_pretty(project).map_err(|e| e.to_string())
    } else {
        toml::to_string_pretty(project).map_err(|e| e.to_string())
    }
}

fn run_show(directory: &Path, json: bool) -> ExitCode {
    let project = match discovery::open_project(&Host::system(), directory) {
        Ok(project) => project,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    match format_project(&project, json) {
        Ok(text) => {
            if !json {
                println!("# {}", directory.display());
            }
            println!("{}", text);
            ExitCode::from(EXIT_SUCCESS)
        }
        Err(e) => {
            eprintln!("Error: Failed to format project: {}", e);
            ExitCode::from(EXIT_ERROR)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::loader::load_project_file;
    use crate::config::ProjectChild;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_init_writes_scanned_project() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("Worlds").join("TST")).unwrap();

        let overrides =
            CliOverrides { toolsfl_bin: Some(PathBuf::from("tools")), platform: Some(Platform::Xbox) };
        let path = init_project(&Host::system(), temp.path(), &overrides, false).unwrap();

        let loaded = load_project_file(&path).unwrap();
        assert_eq!(loaded.worlds, vec![ProjectChild::new("TST")]);
        assert_eq!(loaded.config.platform, Platform::Xbox);
        assert_eq!(loaded.config.toolsfl_bin, PathBuf::from("tools"));
    }

    #[test]
    fn test_init_refuses_existing_file() {
        let temp = TempDir::new().unwrap();
        fs::write(project_file_path(temp.path()), "load_active = true\n").unwrap();

        let result = init_project(&Host::system(), temp.path(), &CliOverrides::default(), false);
        assert!(matches!(result, Err(ProjectFileError::AlreadyExists(_))));
        assert_eq!(
            fs::read_to_string(project_file_path(temp.path())).unwrap(),
            "load_active = true\n"
        );

        init_project(&Host::system(), temp.path(), &CliOverrides::default(), true).unwrap();
        let loaded = load_project_file(&project_file_path(temp.path())).unwrap();
        assert!(!loaded.load_active);
    }

    #[test]
    fn test_format_project() {
        let mut project = Project::new("proj");
        project.shell_active = true;

        let toml_text = format_project(&project, false).unwrap();
        assert!(toml_text.contains("shell_active = true"));

        let json_text = format_project(&project, true).unwrap();
        assert!(json_text.contains("\"shell_active\": true"));
    }
}
