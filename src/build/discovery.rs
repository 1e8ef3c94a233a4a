//! Project discovery.
//!
//! Sides, worlds, and sound directories are found by listing the project
//! directory; `munge.toml`, when present, supplies flags and configuration
//! for what was found.

use super::host::{DirEntry, Host};
use crate::config::loader::{load_project_file, merge_loaded_project, project_file_path, ProjectFileError};
use crate::config::{Project, ProjectChild, SoundShared, SoundWorld};
use std::path::Path;

/// Sound subdirectories that are not shared sound directories.
const SOUND_EXCLUDED: [&str; 2] = ["worlds", "International"];

fn child_directories(host: &Host, path: &Path) -> Vec<DirEntry> {
    host.list(path).into_iter().filter(|entry| entry.is_dir).collect()
}

/// Child names of a directory, sorted, with `Common` moved to the front.
fn child_names(host: &Host, path: &Path) -> Vec<String> {
    let mut names = Vec::new();

    for entry in child_directories(host, path) {
        let name = entry.name();
        if name.eq_ignore_ascii_case("Common") {
            names.insert(0, name);
        } else {
            names.push(name);
        }
    }

    names
}

/// Scan a project directory. Every child found is active.
pub fn scan_project(host: &Host, directory: &Path) -> Project {
    let mut project = Project::new(directory);

    project.worlds =
        child_names(host, &directory.join("Worlds")).into_iter().map(ProjectChild::new).collect();
    project.sides =
        child_names(host, &directory.join("Sides")).into_iter().map(ProjectChild::new).collect();

    let sound = directory.join("Sound");
    project.sound_shared = child_directories(host, &sound)
        .into_iter()
        .map(|entry| entry.name())
        .filter(|name| !SOUND_EXCLUDED.iter().any(|excluded| excluded.eq_ignore_ascii_case(name)))
        .map(SoundShared::new)
        .collect();
    project.sound_worlds = child_directories(host, &sound.join("worlds"))
        .into_iter()
        .map(|entry| SoundWorld::new(entry.name()))
        .collect();

    tracing::debug!(
        directory = %directory.display(),
        worlds = project.worlds.len(),
        sides = project.sides.len(),
        sound_shared = project.sound_shared.len(),
        sound_worlds = project.sound_worlds.len(),
        "scanned project"
    );

    project
}

/// Scan a project directory and apply its `munge.toml`, if any.
///
/// A missing project file is not an error.
pub fn open_project(host: &Host, directory: &Path) -> Result<Project, ProjectFileError> {
    let mut project = scan_project(host, directory);
    let path = project_file_path(directory);

    if host.fs.exists(&path) {
        let loaded = load_project_file(&path)?;
        merge_loaded_project(&mut project, &loaded);
    }

    Ok(project)
}
