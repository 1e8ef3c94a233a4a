//! Process and filesystem access for munge jobs.
//!
//! Every external effect of a munge goes through [`ProcessHost`] or
//! [`FileSystem`], so the pipeline can be driven against fakes in tests.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::Arc;
use std::time::SystemTime;
use thiserror::Error;

/// Scheduling priority of a launched tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProcessPriority {
    #[default]
    Normal,
    BelowNormal,
}

/// Description of one tool invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessDesc {
    pub executable: PathBuf,
    /// Arguments, passed through verbatim on Windows
    pub command_line: String,
    pub working_directory: PathBuf,
    pub priority: ProcessPriority,
}

/// Captured result of a finished tool.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: Option<i32>,
}

/// A tool executable could not be started.
#[derive(Debug, Error)]
#[error("Failed to launch {}: {source}", .executable.display())]
pub struct LaunchError {
    pub executable: PathBuf,
    #[source]
    pub source: io::Error,
}

/// Launches tool processes.
pub trait ProcessHost: Send + Sync {
    /// Run a tool to completion, capturing stdout and stderr.
    fn run(&self, desc: &ProcessDesc) -> Result<ProcessOutput, LaunchError>;

    /// Start a tool without waiting for it or capturing its output.
    fn spawn_detached(&self, desc: &ProcessDesc) -> Result<(), LaunchError>;
}

/// [`ProcessHost`] backed by `std::process`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemProcessHost;

#[cfg(windows)]
fn apply_platform_options(command: &mut Command, desc: &ProcessDesc) {
    use std::os::windows::process::CommandExt;

    const BELOW_NORMAL_PRIORITY_CLASS: u32 = 0x0000_4000;
    const CREATE_NO_WINDOW: u32 = 0x0800_0000;

    command.raw_arg(&desc.command_line);
    let priority = match desc.priority {
        ProcessPriority::Normal => 0,
        ProcessPriority::BelowNormal => BELOW_NORMAL_PRIORITY_CLASS,
    };
    command.creation_flags(CREATE_NO_WINDOW | priority);
}

#[cfg(not(windows))]
fn apply_platform_options(command: &mut Command, desc: &ProcessDesc) {
    command.args(desc.command_line.split_whitespace());
}

fn build_command(desc: &ProcessDesc) -> Command {
    let mut command = Command::new(&desc.executable);
    if !desc.working_directory.as_os_str().is_empty() {
        command.current_dir(&desc.working_directory);
    }
    apply_platform_options(&mut command, desc);
    command
}

fn launch_error(desc: &ProcessDesc, source: io::Error) -> LaunchError {
    LaunchError { executable: desc.executable.clone(), source }
}

impl ProcessHost for SystemProcessHost {
    fn run(&self, desc: &ProcessDesc) -> Result<ProcessOutput, LaunchError> {
        tracing::debug!(
            executable = %desc.executable.display(),
            command_line = %desc.command_line,
            working_directory = %desc.working_directory.display(),
            "launching tool"
        );

        let output = build_command(desc)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| launch_error(desc, e))?;

        Ok(ProcessOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            exit_code: output.status.code(),
        })
    }

    fn spawn_detached(&self, desc: &ProcessDesc) -> Result<(), LaunchError> {
        tracing::debug!(executable = %desc.executable.display(), "launching detached tool");

        build_command(desc)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map(|_| ())
            .map_err(|e| launch_error(desc, e))
    }
}

/// One entry of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub path: PathBuf,
    pub is_dir: bool,
}

impl DirEntry {
    /// File name as UTF-8, lossily converted.
    pub fn name(&self) -> String {
        self.path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default()
    }

    /// File stem as UTF-8, lossily converted.
    pub fn stem(&self) -> String {
        self.path.file_stem().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default()
    }

    /// Check the extension case-insensitively. `extension` has no leading dot.
    pub fn has_extension(&self, extension: &str) -> bool {
        has_extension(&self.path, extension)
    }
}

/// Check the extension of `path` case-insensitively.
pub fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(extension))
}

/// Join a relative path that may use either `/` or `\` as separator.
pub fn join_relative(base: &Path, relative: &str) -> PathBuf {
    relative
        .split(['/', '\\'])
        .filter(|part| !part.is_empty())
        .fold(base.to_path_buf(), |path, part| path.join(part))
}

/// Filesystem operations used by munge jobs.
pub trait FileSystem: Send + Sync {
    /// Create a directory and all missing parents.
    fn create_directories(&self, path: &Path) -> io::Result<()>;

    /// List the direct entries of a directory, sorted by path.
    fn read_dir(&self, path: &Path) -> io::Result<Vec<DirEntry>>;

    /// Every file at any depth below a directory. A missing directory has none.
    fn walk_files(&self, path: &Path) -> io::Result<Vec<DirEntry>>;

    fn exists(&self, path: &Path) -> bool;

    fn is_dir(&self, path: &Path) -> bool;

    /// Last modification time, `None` if the file does not exist.
    fn modified(&self, path: &Path) -> Option<SystemTime>;

    fn remove_file(&self, path: &Path) -> io::Result<()>;

    /// Remove an empty directory.
    fn remove_dir(&self, path: &Path) -> io::Result<()>;

    /// Copy a file, carrying its modification time over to the copy.
    fn copy_file(&self, from: &Path, to: &Path) -> io::Result<()>;

    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()>;
}

/// [`FileSystem`] backed by `std::fs`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdFileSystem;

impl FileSystem for StdFileSystem {
    fn create_directories(&self, path: &Path) -> io::Result<()> {
        fs::create_dir_all(path)
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<DirEntry>> {
        let mut entries = fs::read_dir(path)?
            .map(|entry| {
                let entry = entry?;
                let is_dir = entry.file_type()?.is_dir();
                Ok(DirEntry { path: entry.path(), is_dir })
            })
            .collect::<io::Result<Vec<_>>>()?;
        entries.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(entries)
    }

    fn walk_files(&self, path: &Path) -> io::Result<Vec<DirEntry>> {
        let pattern = format!("{}/**/*", glob::Pattern::escape(&path.to_string_lossy()));
        let paths = glob::glob(&pattern)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

        let mut files = Vec::new();
        for entry in paths {
            let path = entry.map_err(glob::GlobError::into_error)?;
            if path.is_file() {
                files.push(DirEntry { path, is_dir: false });
            }
        }
        Ok(files)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn modified(&self, path: &Path) -> Option<SystemTime> {
        fs::metadata(path).and_then(|m| m.modified()).ok()
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        fs::remove_file(path)
    }

    fn remove_dir(&self, path: &Path) -> io::Result<()> {
        fs::remove_dir(path)
    }

    fn copy_file(&self, from: &Path, to: &Path) -> io::Result<()> {
        fs::copy(from, to)?;
        let modified = fs::metadata(from)?.modified()?;
        fs::File::options().write(true).open(to)?.set_modified(modified)
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        fs::read_to_string(path)
    }

    fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        fs::write(path, contents)
    }
}

/// The process host and filesystem a job runs against.
#[derive(Clone)]
pub struct Host {
    pub processes: Arc<dyn ProcessHost>,
    pub fs: Arc<dyn FileSystem>,
}

impl Host {
    pub fn new(processes: Arc<dyn ProcessHost>, fs: Arc<dyn FileSystem>) -> Self {
        Self { processes, fs }
    }

    /// Real processes and the real filesystem.
    pub fn system() -> Self {
        Self::new(Arc::new(SystemProcessHost), Arc::new(StdFileSystem))
    }

    /// List a directory, treating a missing or unreadable directory as empty.
    pub fn list(&self, path: &Path) -> Vec<DirEntry> {
        match self.fs.read_dir(path) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => vec![],
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to list directory");
                vec![]
            }
        }
    }

    /// Files in a directory with the given extension.
    pub fn list_files_with_extension(&self, path: &Path, extension: &str) -> Vec<DirEntry> {
        self.list(path)
            .into_iter()
            .filter(|entry| !entry.is_dir && entry.has_extension(extension))
            .collect()
    }

    /// Every file below a directory, treating an unreadable tree as empty.
    pub fn walk_files(&self, path: &Path) -> Vec<DirEntry> {
        self.fs.walk_files(path).unwrap_or_else(|e| {
            tracing::warn!(path = %path.display(), error = %e, "failed to walk directory");
            vec![]
        })
    }
}

impl Default for Host {
    fn default() -> Self {
        Self::system()
    }
}

impl fmt::Debug for Host {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Host").finish_non_exhaustive()
    }
}
