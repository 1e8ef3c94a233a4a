//! Shared fakes for integration tests.
//!
//! Munge jobs are driven against the real filesystem inside a temporary
//! directory while process launches are recorded instead of executed.

#![allow(dead_code)]

use lvlmunge::build::{
    DirEntry, FileSystem, Host, LaunchError, ProcessDesc, ProcessHost, ProcessOutput,
    StdFileSystem,
};
use lvlmunge::config::Project;
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::SystemTime;

/// Records launches and answers each tool with scripted stderr.
#[derive(Debug, Default)]
pub struct ScriptedTools {
    launches: Mutex<Vec<ProcessDesc>>,
    stderr: Mutex<HashMap<String, String>>,
}

impl ScriptedTools {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Answer launches of `tool` (executable stem) with `stderr`.
    pub fn script(&self, tool: &str, stderr: &str) {
        self.stderr.lock().unwrap().insert(tool.to_string(), stderr.to_string());
    }

    pub fn launches(&self) -> Vec<ProcessDesc> {
        self.launches.lock().unwrap().clone()
    }

    pub fn tools(&self) -> Vec<String> {
        self.launches().iter().map(tool_name).collect()
    }

    /// Command lines of launches of `tool`.
    pub fn command_lines(&self, tool: &str) -> Vec<String> {
        self.launches()
            .into_iter()
            .filter(|desc| tool_name(desc) == tool)
            .map(|desc| desc.command_line)
            .collect()
    }
}

fn tool_name(desc: &ProcessDesc) -> String {
    desc.executable.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default()
}

impl ProcessHost for ScriptedTools {
    fn run(&self, desc: &ProcessDesc) -> Result<ProcessOutput, LaunchError> {
        self.launches.lock().unwrap().push(desc.clone());
        let stderr = self.stderr.lock().unwrap().get(&tool_name(desc)).cloned().unwrap_or_default();
        Ok(ProcessOutput { stdout: String::new(), stderr, exit_code: Some(0) })
    }

    fn spawn_detached(&self, desc: &ProcessDesc) -> Result<(), LaunchError> {
        self.launches.lock().unwrap().push(desc.clone());
        Ok(())
    }
}

/// Real filesystem that refuses to create anything below `denied`.
#[derive(Debug)]
pub struct DenyingFs {
    pub denied: PathBuf,
}

impl FileSystem for DenyingFs {
    fn create_directories(&self, path: &Path) -> io::Result<()> {
        if path.starts_with(&self.denied) {
            return Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied"));
        }
        StdFileSystem.create_directories(path)
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<DirEntry>> {
        StdFileSystem.read_dir(path)
    }

    fn walk_files(&self, path: &Path) -> io::Result<Vec<DirEntry>> {
        StdFileSystem.walk_files(path)
    }

    fn exists(&self, path: &Path) -> bool {
        StdFileSystem.exists(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        StdFileSystem.is_dir(path)
    }

    fn modified(&self, path: &Path) -> Option<SystemTime> {
        StdFileSystem.modified(path)
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        StdFileSystem.remove_file(path)
    }

    fn remove_dir(&self, path: &Path) -> io::Result<()> {
        StdFileSystem.remove_dir(path)
    }

    fn copy_file(&self, from: &Path, to: &Path) -> io::Result<()> {
        StdFileSystem.copy_file(from, to)
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        StdFileSystem.read_to_string(path)
    }

    fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        StdFileSystem.write(path, contents)
    }
}

/// Host recording launches against the real filesystem.
pub fn host(tools: &Arc<ScriptedTools>) -> Host {
    Host::new(tools.clone(), Arc::new(StdFileSystem))
}

/// Project in `directory` with every category off and no built-in tools.
pub fn bare_project(directory: &Path) -> Project {
    let mut project = Project::new(directory);
    project.addme_active = false;
    project.common_active = false;
    project.config.toolsfl_bin = PathBuf::from("bin");
    project.config.tools = project.config.tools.without_tools();
    project
}

/// Create each `/`-separated directory below `root`.
pub fn create_dirs(root: &Path, dirs: &[&str]) {
    for dir in dirs {
        std::fs::create_dir_all(root.join(dir)).unwrap();
    }
}
