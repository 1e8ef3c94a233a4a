//! Fakes for driving munge jobs without the ToolsFL executables.

use super::host::{
    DirEntry, FileSystem, Host, LaunchError, ProcessDesc, ProcessHost, ProcessOutput,
    StdFileSystem,
};
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::SystemTime;

/// Records every launch and answers with scripted stderr per tool.
#[derive(Debug, Default)]
pub(crate) struct RecordingHost {
    launches: Mutex<Vec<ProcessDesc>>,
    stderr: Mutex<HashMap<String, String>>,
}

impl RecordingHost {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Answer launches of `tool` (executable stem) with `stderr`.
    pub(crate) fn script_stderr(&self, tool: &str, stderr: &str) {
        self.stderr.lock().unwrap().insert(tool.to_string(), stderr.to_string());
    }

    pub(crate) fn launches(&self) -> Vec<ProcessDesc> {
        self.launches.lock().unwrap().clone()
    }

    pub(crate) fn launched_tools(&self) -> Vec<String> {
        self.launches().iter().map(tool_name).collect()
    }
}

fn tool_name(desc: &ProcessDesc) -> String {
    desc.executable.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default()
}

impl ProcessHost for RecordingHost {
    fn run(&self, desc: &ProcessDesc) -> Result<ProcessOutput, LaunchError> {
        self.launches.lock().unwrap().push(desc.clone());
        let stderr = self.stderr.lock().unwrap().get(&tool_name(desc)).cloned().unwrap_or_default();
        Ok(ProcessOutput { stdout: format!("{} done\n", tool_name(desc)), stderr, exit_code: Some(0) })
    }

    fn spawn_detached(&self, desc: &ProcessDesc) -> Result<(), LaunchError> {
        self.launches.lock().unwrap().push(desc.clone());
        Ok(())
    }
}

/// Real filesystem that refuses to create directories below given paths.
///
/// Writes below `fail_writes` leave an empty file behind and then fail.
#[derive(Debug, Default)]
pub(crate) struct FailingFs {
    fail_below: Vec<PathBuf>,
    fail_writes: Vec<PathBuf>,
}

impl FailingFs {
    pub(crate) fn new(fail_below: Vec<PathBuf>) -> Arc<Self> {
        Arc::new(Self { fail_below, fail_writes: vec![] })
    }

    pub(crate) fn failing_writes(fail_writes: Vec<PathBuf>) -> Arc<Self> {
        Arc::new(Self { fail_below: vec![], fail_writes })
    }
}

impl FileSystem for FailingFs {
    fn create_directories(&self, path: &Path) -> io::Result<()> {
        if self.fail_below.iter().any(|prefix| path.starts_with(prefix)) {
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
        if self.fail_writes.iter().any(|prefix| path.starts_with(prefix)) {
            StdFileSystem.write(path, &[])?;
            return Err(io::Error::new(io::ErrorKind::Other, "disk full"));
        }
        StdFileSystem.write(path, contents)
    }
}

/// Host recording launches against the real filesystem.
pub(crate) fn recording_host(processes: &Arc<RecordingHost>) -> Host {
    Host::new(processes.clone(), Arc::new(StdFileSystem))
}
