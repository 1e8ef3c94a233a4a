//! Sink for everything a munge job reports.
//!
//! Raw tool output goes to the shared output buffers so an observer can follow
//! along, while classified diagnostics accumulate in the job's report.

use super::diagnostics;
use super::message::{Message, Report};
use crate::output::OutputBuffer;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Output and diagnostics collector for one job.
#[derive(Debug)]
pub struct Feedback {
    standard_output: Arc<OutputBuffer>,
    standard_error: Arc<OutputBuffer>,
    report: Mutex<Report>,
}

impl Feedback {
    /// Create feedback writing into the given buffers.
    pub fn new(standard_output: Arc<OutputBuffer>, standard_error: Arc<OutputBuffer>) -> Self {
        Self { standard_output, standard_error, report: Mutex::new(Report::new()) }
    }

    /// Buffer receiving tool stdout and progress lines.
    pub fn standard_output(&self) -> &OutputBuffer {
        &self.standard_output
    }

    /// Buffer receiving raw tool stderr.
    pub fn standard_error(&self) -> &OutputBuffer {
        &self.standard_error
    }

    pub fn print_output(&self, text: impl AsRef<str>) {
        self.standard_output.write(text);
    }

    pub fn print_errors(&self, text: impl AsRef<str>) {
        self.standard_error.write(text);
    }

    pub fn add_warning(&self, message: Message) {
        self.report().warnings.push(message);
    }

    pub fn add_error(&self, message: Message) {
        self.report().errors.push(message);
    }

    pub fn parse_error_string(&self, error_output: &str, source_directory: &Path) {
        diagnostics::parse_error_string(&mut self.report(), error_output, source_directory);
    }

    pub fn parse_script_munge_error_string(&self, error_output: &str, source_directory: &Path) {
        diagnostics::parse_script_munge_error_string(
            &mut self.report(),
            error_output,
            source_directory,
        );
    }

    pub fn parse_sound_munge_error_string(&self, error_output: &str, source_directory: &Path) {
        diagnostics::parse_sound_munge_error_string(
            &mut self.report(),
            error_output,
            source_directory,
        );
    }

    pub fn parse_movie_munge_error_string(&self, error_output: &str, file: &Path) {
        diagnostics::parse_movie_munge_error_string(&mut self.report(), error_output, file);
    }

    pub fn parse_shader_munge_error_string(&self, error_output: &str, source_directory: &Path) {
        diagnostics::parse_shader_munge_error_string(
            &mut self.report(),
            error_output,
            source_directory,
        );
    }

    /// Take the collected report, leaving an empty one behind.
    pub fn take_report(&self) -> Report {
        std::mem::take(&mut *self.report())
    }

    fn report(&self) -> MutexGuard<'_, Report> {
        self.report.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for Feedback {
    fn default() -> Self {
        Self::new(Arc::new(OutputBuffer::new()), Arc::new(OutputBuffer::new()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_goes_to_shared_buffer() {
        let stdout = Arc::new(OutputBuffer::new());
        let feedback = Feedback::new(Arc::clone(&stdout), Arc::new(OutputBuffer::new()));

        feedback.print_output("Munging Common\n");

        assert_eq!(stdout.view_lines().len(), 1);
        assert_eq!(&*stdout.view_lines()[0], "Munging Common");
    }

    #[test]
    fn test_diagnostics_accumulate_and_take() {
        let feedback = Feedback::default();
        feedback.add_warning(Message::new("a", "Clean", "Failed to delete file."));
        feedback.parse_error_string("ERROR[OdfMunge x.odf]:bad", Path::new("src"));

        let report = feedback.take_report();
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.errors.len(), 1);
        assert!(feedback.take_report().is_empty());
    }
}
