//! Console printer for munge and clean runs.
//!
//! Plain lines go to stdout and error lines to stderr. Structured
//! diagnostics are printed as `WARNING[tool file]:message` and
//! `ERROR[tool file]:message`, colored when stdout is a terminal.

use crate::build::{Message, Report};
use crate::config::Project;
use std::io::Write;
use std::sync::Mutex;

const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";
const CYAN: &str = "\x1b[36m";
const BOLD: &str = "\x1b[1m";

/// Console printer with optional colors.
pub struct Console {
    use_colors: bool,
    output: Mutex<Box<dyn Write + Send>>,
    errors: Mutex<Box<dyn Write + Send>>,
}

impl std::fmt::Debug for Console {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Console").field("use_colors", &self.use_colors).finish()
    }
}

impl Default for Console {
    fn default() -> Self {
        Self::new()
    }
}

impl Console {
    /// Printer for stdout and stderr. Colors are on when stdout is a terminal.
    pub fn new() -> Self {
        Self {
            use_colors: atty::is(atty::Stream::Stdout),
            output: Mutex::new(Box::new(std::io::stdout())),
            errors: Mutex::new(Box::new(std::io::stderr())),
        }
    }

    /// Printer writing to custom outputs, without colors.
    pub fn with_output<O, E>(output: O, errors: E) -> Self
    where
        O: Write + Send + 'static,
        E: Write + Send + 'static,
    {
        Self {
            use_colors: false,
            output: Mutex::new(Box::new(output)),
            errors: Mutex::new(Box::new(errors)),
        }
    }

    pub fn with_colors(mut self, use_colors: bool) -> Self {
        self.use_colors = use_colors;
        self
    }

    fn color(&self, text: &str, color: &str) -> String {
        if self.use_colors {
            format!("{}{}\x1b[0m", color, text)
        } else {
            text.to_string()
        }
    }

    /// Print a line to stdout.
    pub fn line(&self, text: &str) {
        if let Ok(mut output) = self.output.lock() {
            let _ = writeln!(output, "{}", text);
        }
    }

    /// Print a line to stderr.
    pub fn error_line(&self, text: &str) {
        if let Ok(mut errors) = self.errors.lock() {
            let _ = writeln!(errors, "{}", text);
        }
    }

    /// Print a section heading.
    pub fn heading(&self, title: &str) {
        self.line("");
        self.line(&self.color(title, BOLD));
    }

    /// Print the categories and children a run will process.
    pub fn project(&self, project: &Project) {
        self.line(&self.color("Loaded Project", CYAN));
        self.line(&format!("Platform: {}", project.config.platform));
        self.line(&format!("Deploy: {}", project.deploy));
        self.line(&format!("Addme: {}", project.addme_active));
        self.line(&format!("Common: {}", project.common_active));
        self.line(&format!("Load: {}", project.load_active));
        self.line(&format!("Shell: {}", project.shell_active));

        let sides_active = project.sides.iter().any(|side| side.active);
        self.line(&format!("Sides: {}", sides_active));
        if sides_active {
            for side in &project.sides {
                self.line(&format!("\t{}: {}", side.name, side.active));
            }
        }

        let worlds_active = project.worlds.iter().any(|world| world.active);
        self.line(&format!("Worlds: {}", worlds_active));
        if worlds_active {
            for world in &project.worlds {
                self.line(&format!("\t{}: {}", world.name, world.active));
            }
        }

        self.line(&format!("Sound: {}", project.sound_active));
        if project.sound_active {
            for world in &project.sound_worlds {
                self.line(&format!("\t{}: {}", world.name, world.active));
            }
        }
    }

    pub fn warning(&self, message: &Message) {
        self.line(&format!("{}{}", self.color("WARNING", YELLOW), message));
    }

    pub fn error(&self, message: &Message) {
        self.error_line(&format!("{}{}", self.color("ERROR", RED), message));
    }

    /// Print every diagnostic of a report followed by its summary.
    pub fn report(&self, report: &Report) {
        for warning in &report.warnings {
            self.warning(warning);
        }
        for error in &report.errors {
            self.error(error);
        }

        let summary = report.summary();
        if report.has_errors() {
            self.line(&self.color(&summary, RED));
        } else {
            self.line(&self.color(&summary, GREEN));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProjectChild;
    use std::io;
    use std::sync::Arc;

    /// Test writer that captures output
    #[derive(Clone)]
    struct TestWriter(Arc<Mutex<Vec<u8>>>);

    impl Write for TestWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl TestWriter {
        fn new() -> Self {
            Self(Arc::new(Mutex::new(Vec::new())))
        }

        fn text(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    #[test]
    fn test_report_splits_streams() {
        let output = TestWriter::new();
        let errors = TestWriter::new();
        let console = Console::with_output(output.clone(), errors.clone());

        let report = Report {
            warnings: vec![Message::new("Common/a.odf", "OdfMunge", "unused")],
            errors: vec![Message::new("", "Munge", "boom")],
        };
        console.report(&report);

        let out = output.text();
        assert!(out.contains("WARNING[OdfMunge Common/a.odf]:unused"));
        assert!(out.contains("1 error(s), 1 warning(s)"));
        assert!(!out.contains("ERROR"));
        assert_eq!(errors.text(), "ERROR[Munge ]:boom\n");
    }

    #[test]
    fn test_colors_wrap_labels() {
        let output = TestWriter::new();
        let console = Console::with_output(output.clone(), io::sink()).with_colors(true);

        console.warning(&Message::new("a", "T", "m"));

        assert_eq!(output.text(), "\x1b[33mWARNING\x1b[0m[T a]:m\n");
    }

    #[test]
    fn test_project_lists_active_children() {
        let output = TestWriter::new();
        let console = Console::with_output(output.clone(), io::sink());

        let mut project = Project::new("proj");
        project.sides =
            vec![ProjectChild::new("ALL"), ProjectChild { name: "IMP".into(), active: false }];
        console.project(&project);

        let text = output.text();
        assert!(text.contains("Addme: true\n"));
        assert!(text.contains("Load: false\n"));
        assert!(text.contains("Sides: true\n\tALL: true\n\tIMP: false\n"));
        assert!(text.contains("Worlds: false\n"));
    }
}
