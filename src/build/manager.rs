//! Munge manager: owns the open project and runs one job at a time.

use super::discovery;
use super::feedback::Feedback;
use super::host::Host;
use super::message::Report;
use super::pipeline::{run_clean, run_munge, MungeError};
use super::task::{Task, TaskPool};
use crate::config::loader::ProjectFileError;
use crate::config::Project;
use crate::output::{LinesView, OutputBuffer};
use std::path::Path;
use std::sync::Arc;

/// Message of a job that could not launch a ToolsFL executable.
fn launch_failure_message(error: &MungeError) -> String {
    format!(
        "Failed to launch process!\n{}\nEnsure your ToolsFL\\bin directory is configured correctly.",
        error
    )
}

/// Message of a job that failed any other way.
fn unexpected_failure_message(error: &dyn std::fmt::Display) -> String {
    format!("Unexpected error occurred while munging!\n{}", error)
}

type Job = fn(&Project, &Feedback, &Host) -> Result<Report, MungeError>;

/// Runs munge and clean jobs for a project in the background.
///
/// At most one job runs at a time; starting a job while one is running does
/// nothing. Live tool output can be viewed while a job runs, and the job's
/// report is collected with [`Manager::get_munge_report`].
#[derive(Debug)]
pub struct Manager {
    project: Project,
    host: Arc<Host>,
    pool: TaskPool,
    standard_output: Arc<OutputBuffer>,
    standard_error: Arc<OutputBuffer>,
    task: Task<Report>,
    report: Report,
}

impl Manager {
    /// Create a manager for `project`.
    pub fn new(project: Project, host: Host) -> Result<Self, rayon::ThreadPoolBuildError> {
        Ok(Self {
            project,
            host: Arc::new(host),
            pool: TaskPool::new()?,
            standard_output: Arc::new(OutputBuffer::new()),
            standard_error: Arc::new(OutputBuffer::new()),
            task: Task::default(),
            report: Report::new(),
        })
    }

    /// Replace the project with the one found in `directory`.
    ///
    /// When the project file cannot be used the scanned project is kept and
    /// the error returned.
    pub fn open_project(&mut self, directory: &Path) -> Result<(), ProjectFileError> {
        match discovery::open_project(&self.host, directory) {
            Ok(project) => {
                self.project = project;
                Ok(())
            }
            Err(e) => {
                tracing::warn!(directory = %directory.display(), error = %e, "ignoring project file");
                self.project = discovery::scan_project(&self.host, directory);
                Err(e)
            }
        }
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    /// The live project. Changes apply to the next job started.
    pub fn project_mut(&mut self) -> &mut Project {
        &mut self.project
    }

    /// Start munging the project unless a job is running.
    pub fn start_munge(&mut self) {
        self.start(run_munge);
    }

    /// Start cleaning the project unless a job is running.
    pub fn start_clean(&mut self) {
        self.start(run_clean);
    }

    fn start(&mut self, job: Job) {
        if self.is_busy() {
            tracing::debug!("job already running");
            return;
        }

        self.standard_output.clear();
        self.standard_error.clear();
        self.report = Report::new();

        let project = self.project.clone();
        let host = Arc::clone(&self.host);
        let standard_output = Arc::clone(&self.standard_output);
        let standard_error = Arc::clone(&self.standard_error);

        self.task = self.pool.submit(move || {
            let feedback = Feedback::new(Arc::clone(&standard_output), standard_error);

            match job(&project, &feedback, &host) {
                Ok(report) => report,
                Err(e) => {
                    let message = match e {
                        MungeError::Launch(_) => launch_failure_message(&e),
                        MungeError::Io(_) => unexpected_failure_message(&e),
                    };
                    tracing::error!(error = %e, "munge job failed");
                    standard_output.write(&message);
                    Report::job_failure(message)
                }
            }
        });
    }

    /// Check if a job is running.
    pub fn is_busy(&self) -> bool {
        self.task.valid() && !self.task.ready()
    }

    /// The report of the last finished job.
    ///
    /// Collects the running job's report once it has finished; until then,
    /// and after collecting, the stored report is returned.
    pub fn get_munge_report(&mut self) -> &Report {
        if self.task.valid() && self.task.ready() {
            self.report = match self.task.take() {
                Some(Ok(report)) => report,
                Some(Err(panic)) => {
                    let message = unexpected_failure_message(&panic);
                    self.standard_output.write(&message);
                    Report::job_failure(message)
                }
                None => Report::new(),
            };
        }

        &self.report
    }

    /// Block until the running job, if any, has finished.
    pub fn wait_for_idle(&self) {
        self.task.wait();
    }

    pub fn view_standard_output_lines(&self) -> LinesView<'_> {
        self.standard_output.view_lines()
    }

    pub fn view_standard_error_lines(&self) -> LinesView<'_> {
        self.standard_error.view_lines()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::host::{LaunchError, ProcessDesc, ProcessHost, ProcessOutput, StdFileSystem};
    use crate::build::testing::{recording_host, RecordingHost};
    use std::io;
    use std::sync::mpsc::{channel, Receiver};
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Blocks every launch until released.
    struct GatedHost {
        gate: Mutex<Receiver<()>>,
        launches: Mutex<usize>,
    }

    impl ProcessHost for GatedHost {
        fn run(&self, _desc: &ProcessDesc) -> Result<ProcessOutput, LaunchError> {
            self.gate.lock().unwrap().recv().ok();
            *self.launches.lock().unwrap() += 1;
            Ok(ProcessOutput::default())
        }

        fn spawn_detached(&self, _desc: &ProcessDesc) -> Result<(), LaunchError> {
            Ok(())
        }
    }

    struct MissingTools;

    impl ProcessHost for MissingTools {
        fn run(&self, desc: &ProcessDesc) -> Result<ProcessOutput, LaunchError> {
            Err(LaunchError {
                executable: desc.executable.clone(),
                source: io::Error::new(io::ErrorKind::NotFound, "not found"),
            })
        }

        fn spawn_detached(&self, desc: &ProcessDesc) -> Result<(), LaunchError> {
            self.run(desc).map(|_| ())
        }
    }

    fn addme_project(temp: &TempDir) -> Project {
        let mut project = Project::new(temp.path());
        project.common_active = false;
        project
    }

    #[test]
    fn test_second_start_while_busy_is_ignored() {
        let temp = TempDir::new().unwrap();
        let (release, gate) = channel();
        let processes =
            Arc::new(GatedHost { gate: Mutex::new(gate), launches: Mutex::new(0) });
        let host = Host::new(processes.clone(), Arc::new(StdFileSystem));
        let mut manager = Manager::new(addme_project(&temp), host).unwrap();

        manager.start_munge();
        assert!(manager.is_busy());
        manager.start_munge();
        assert!(manager.is_busy());

        release.send(()).unwrap();
        release.send(()).unwrap();
        manager.wait_for_idle();

        assert!(manager.get_munge_report().is_empty());
        assert!(!manager.is_busy());
        assert_eq!(*processes.launches.lock().unwrap(), 1);
    }

    #[test]
    fn test_report_is_drained_once() {
        let temp = TempDir::new().unwrap();
        let processes = RecordingHost::new();
        processes.script_stderr("ScriptMunge", "luac.exe: a.lua:1: bad");
        let mut manager = Manager::new(addme_project(&temp), recording_host(&processes)).unwrap();

        manager.start_munge();
        manager.wait_for_idle();

        assert_eq!(manager.get_munge_report().errors.len(), 1);
        assert_eq!(manager.get_munge_report().errors.len(), 1);
        assert!(!manager.is_busy());
    }

    #[test]
    fn test_launch_failure_report() {
        let temp = TempDir::new().unwrap();
        let host = Host::new(Arc::new(MissingTools), Arc::new(StdFileSystem));
        let mut manager = Manager::new(addme_project(&temp), host).unwrap();

        manager.start_munge();
        manager.wait_for_idle();

        let report = manager.get_munge_report().clone();
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].tool, "Munge");
        assert!(report.errors[0].message.starts_with("Failed to launch process!"));
        assert!(report.errors[0].message.contains(r"ToolsFL\bin"));

        let lines = manager.view_standard_output_lines();
        assert_eq!(&*lines[0], "Failed to launch process!");
    }

    #[test]
    fn test_missing_project_directory_report() {
        let temp = TempDir::new().unwrap();
        let processes = RecordingHost::new();
        let project = Project::new(temp.path().join("missing"));
        let mut manager = Manager::new(project, recording_host(&processes)).unwrap();

        manager.start_clean();
        manager.wait_for_idle();

        let report = manager.get_munge_report();
        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].message.starts_with("Unexpected error occurred while munging!"));
    }

    #[test]
    fn test_start_clears_previous_output() {
        let temp = TempDir::new().unwrap();
        let processes = RecordingHost::new();
        let mut manager = Manager::new(addme_project(&temp), recording_host(&processes)).unwrap();

        manager.start_munge();
        manager.wait_for_idle();
        manager.get_munge_report();
        manager.start_clean();
        manager.wait_for_idle();

        let lines: Vec<String> =
            manager.view_standard_output_lines().iter().map(|l| l.to_string()).collect();
        assert!(lines.iter().all(|line| !line.contains("Munge Finished")));
        assert!(lines.iter().any(|line| line.contains("Clean Finished")));
    }

    #[test]
    fn test_project_mut_applies_to_next_job() {
        let temp = TempDir::new().unwrap();
        let processes = RecordingHost::new();
        let mut manager = Manager::new(addme_project(&temp), recording_host(&processes)).unwrap();

        manager.project_mut().addme_active = false;
        manager.start_munge();
        manager.wait_for_idle();

        assert!(processes.launches().is_empty());
        assert!(!manager.project().addme_active);
    }
}
