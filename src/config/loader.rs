//! Loading, saving, and merging of `munge.toml` project files.

use super::schema::{Platform, Project};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name of the project file inside a project directory.
pub const PROJECT_FILE_NAME: &str = "munge.toml";

/// Project file error
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProjectFileError {
    /// File I/O error
    #[error("Failed to access project file: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error
    #[error("Failed to parse munge.toml: {0}")]
    Parse(#[from] toml::de::Error),
    /// TOML serialization error
    #[error("Failed to serialize munge.toml: {0}")]
    Serialize(#[from] toml::ser::Error),
    /// Project file already present
    #[error("{} already exists (use --force to overwrite)", .0.display())]
    AlreadyExists(PathBuf),
    /// Validation error
    #[error("Project validation failed:\n{}", .0.iter().map(|e| format!("  - {}", e)).collect::<Vec<_>>().join("\n"))]
    Validation(Vec<String>),
}

/// CLI arguments that can override project values
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    /// Override the ToolsFL bin directory
    pub toolsfl_bin: Option<PathBuf>,
    /// Override the target platform
    pub platform: Option<Platform>,
}

/// Path of the project file for a project directory.
pub fn project_file_path(directory: &Path) -> PathBuf {
    directory.join(PROJECT_FILE_NAME)
}

/// Load a project file.
///
/// The returned project's directory is the file's parent directory.
pub fn load_project_file(path: &Path) -> Result<Project, ProjectFileError> {
    let contents = fs::read_to_string(path)?;
    let mut project: Project = toml::from_str(&contents)?;

    let errors = project.validate();
    if !errors.is_empty() {
        return Err(ProjectFileError::Validation(errors.into_iter().map(|e| e.to_string()).collect()));
    }

    project.directory = path.parent().map(Path::to_path_buf).unwrap_or_default();
    Ok(project)
}

/// Save a project file.
pub fn save_project(project: &Project, path: &Path) -> Result<(), ProjectFileError> {
    let contents = toml::to_string_pretty(project)?;
    fs::write(path, contents)?;
    Ok(())
}

/// Merge a loaded project file into a scanned project.
///
/// Flags and configuration come from the file. Children keep the scanned
/// set, taking their flags from the file when a child of the same name is
/// listed there. Sound localizations come from the file.
pub fn merge_loaded_project(scanned: &mut Project, loaded: &Project) {
    scanned.deploy = loaded.deploy;
    scanned.addme_active = loaded.addme_active;
    scanned.common_active = loaded.common_active;
    scanned.load_active = loaded.load_active;
    scanned.shell_active = loaded.shell_active;
    scanned.sound_active = loaded.sound_active;
    scanned.sound_common_bank = loaded.sound_common_bank;
    scanned.config = loaded.config.clone();
    scanned.sound_localizations = loaded.sound_localizations.clone();

    for side in &mut scanned.sides {
        if let Some(saved) = loaded.sides.iter().find(|s| s.name.eq_ignore_ascii_case(&side.name)) {
            side.active = saved.active;
        }
    }
    for world in &mut scanned.worlds {
        if let Some(saved) = loaded.worlds.iter().find(|w| w.name.eq_ignore_ascii_case(&world.name))
        {
            world.active = saved.active;
        }
    }
    for shared in &mut scanned.sound_shared {
        if let Some(saved) =
            loaded.sound_shared.iter().find(|s| s.name.eq_ignore_ascii_case(&shared.name))
        {
            shared.localized = saved.localized;
        }
    }
    for world in &mut scanned.sound_worlds {
        if let Some(saved) =
            loaded.sound_worlds.iter().find(|w| w.name.eq_ignore_ascii_case(&world.name))
        {
            world.active = saved.active;
            world.localized = saved.localized;
        }
    }
}

/// Merge CLI overrides into a project.
pub fn merge_cli_overrides(project: &mut Project, overrides: &CliOverrides) {
    if let Some(ref toolsfl_bin) = overrides.toolsfl_bin {
        project.config.toolsfl_bin = toolsfl_bin.clone();
    }

    if let Some(platform) = overrides.platform {
        project.config.platform = platform;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::{ProjectChild, SoundLocalization, SoundShared};
    use tempfile::TempDir;

    #[test]
    fn test_save_and_load_project() {
        let temp = TempDir::new().unwrap();
        let mut project = Project::new(temp.path());
        project.load_active = true;
        project.worlds = vec![ProjectChild { name: "Tat".into(), active: false }];
        project.sound_localizations =
            vec![SoundLocalization { language: "fr".into(), output_directory: "FR".into() }];
        project.config.platform = Platform::Ps2;

        let path = project_file_path(temp.path());
        save_project(&project, &path).unwrap();

        let loaded = load_project_file(&path).unwrap();
        assert_eq!(loaded, project);
    }

    #[test]
    fn test_saved_file_omits_builtin_tools() {
        let temp = TempDir::new().unwrap();
        let project = Project::new(temp.path());

        let path = project_file_path(temp.path());
        save_project(&project, &path).unwrap();
        let contents = fs::read_to_string(path).unwrap();

        assert!(!contents.contains("tools"));
    }

    #[test]
    fn test_load_rejects_invalid_project() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(PROJECT_FILE_NAME);
        fs::write(&path, "[[sides]]\nname = \"\"\n").unwrap();

        let result = load_project_file(&path);
        assert!(matches!(result, Err(ProjectFileError::Validation(_))));
    }

    #[test]
    fn test_load_reports_parse_errors() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(PROJECT_FILE_NAME);
        fs::write(&path, "deploy = \"yes\"").unwrap();

        assert!(matches!(load_project_file(&path), Err(ProjectFileError::Parse(_))));
    }

    #[test]
    fn test_merge_keeps_scanned_children() {
        let mut scanned = Project::new("proj");
        scanned.worlds = vec![ProjectChild::new("Common"), ProjectChild::new("Tat")];
        scanned.sound_shared = vec![SoundShared::new("gcw")];

        let mut loaded = Project::new("proj");
        loaded.shell_active = true;
        loaded.worlds =
            vec![ProjectChild { name: "tat".into(), active: false }, ProjectChild::new("Gone")];
        loaded.sound_shared = vec![SoundShared { name: "gcw".into(), localized: true }];

        merge_loaded_project(&mut scanned, &loaded);

        assert!(scanned.shell_active);
        assert_eq!(scanned.worlds.len(), 2);
        assert!(scanned.worlds[0].active);
        assert!(!scanned.worlds[1].active);
        assert!(scanned.sound_shared[0].localized);
    }

    #[test]
    fn test_cli_overrides() {
        let mut project = Project::new("proj");
        let overrides = CliOverrides {
            toolsfl_bin: Some(PathBuf::from("/tools/bin")),
            platform: Some(Platform::Xbox),
        };

        merge_cli_overrides(&mut project, &overrides);

        assert_eq!(project.config.toolsfl_bin, PathBuf::from("/tools/bin"));
        assert_eq!(project.config.platform, Platform::Xbox);
    }
}
