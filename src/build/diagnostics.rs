//! Classifiers that turn tool stderr into structured diagnostics.
//!
//! Each ToolsFL tool reports problems in its own dialect. The generic dialect
//! is shared by most tools:
//!
//! ```text
//! WARNING[OdfMunge tank.odf]:geometry name is missing
//!    extra context lines are folded into the previous message
//! ERROR[OdfMunge jeep.odf]:class label not found
//!    2 Errors    1 Warnings
//! ```
//!
//! A header line starts a new message, any other non-empty line continues
//! the most recent one, and lines seen before the first header are dropped.
//! The remaining classifiers extend this with the script, sound, movie, and
//! shader tool formats.

use super::message::{Message, Report};
use std::path::{Path, PathBuf};

const SCRIPT_MUNGE_TOOL: &str = "ScriptMunge";
const SOUND_MUNGE_TOOL: &str = "SoundFLMunge";
const MOVIE_MUNGE_TOOL: &str = "MovieMunge";
const SHADER_MUNGE_TOOL: &str = "ShaderMunge";

/// Which list the most recent message went to.
#[derive(Debug, Clone, Copy)]
enum Last {
    Warning(usize),
    Error(usize),
}

/// Appends messages to a report while tracking the continuation target.
struct Collector<'a> {
    report: &'a mut Report,
    last: Option<Last>,
}

impl<'a> Collector<'a> {
    fn new(report: &'a mut Report) -> Self {
        Self { report, last: None }
    }

    fn warning(&mut self, message: Message) {
        self.report.warnings.push(message);
        self.last = Some(Last::Warning(self.report.warnings.len() - 1));
    }

    fn error(&mut self, message: Message) {
        self.report.errors.push(message);
        self.last = Some(Last::Error(self.report.errors.len() - 1));
    }

    /// Fold a line into the most recent message. Dropped if there is none.
    fn continue_last(&mut self, line: &str) {
        let last = match self.last {
            Some(Last::Warning(index)) => self.report.warnings.get_mut(index),
            Some(Last::Error(index)) => self.report.errors.get_mut(index),
            None => None,
        };

        if let Some(message) = last {
            message.message.push('\n');
            message.message.push_str(line);
        }
    }

    /// Handle a `WARNING[tool file]:message` or `ERROR[...]` header.
    ///
    /// Returns false if the line is not a header.
    fn header(&mut self, line: &str, source_directory: &Path) -> bool {
        if let Some(rest) = line.strip_prefix("WARNING") {
            self.warning(parse_header(rest, source_directory));
            true
        } else if let Some(rest) = line.strip_prefix("ERROR") {
            self.error(parse_header(rest, source_directory));
            true
        } else {
            false
        }
    }
}

/// Parse `[tool file]:message` following a severity keyword.
fn parse_header(rest: &str, source_directory: &Path) -> Message {
    let (tool_file, message) = match rest.split_once("]:") {
        Some(split) => split,
        None => rest.split_once(':').unwrap_or((rest, "")),
    };

    let tool_file = tool_file.strip_prefix('[').unwrap_or(tool_file);
    let tool_file = tool_file.strip_suffix(']').unwrap_or(tool_file);
    let (tool, file) = tool_file.split_once(' ').unwrap_or((tool_file, ""));

    Message::new(attribute(source_directory, file), tool, message)
}

/// Prefix a tool-reported file with the source directory it ran against.
fn attribute(source_directory: &Path, file: &str) -> PathBuf {
    let file = file.trim();
    if file.is_empty() {
        source_directory.to_path_buf()
    } else {
        source_directory.join(file)
    }
}

/// The line a tool prints when it carries on past a failed file.
const CONTINUING_LINE: &str = " [continuing]";

/// The `   N Errors    M Warnings` totals line closing a tool's output.
fn is_totals_line(line: &str) -> bool {
    line.starts_with("   ") && line.ends_with("Warnings")
}

fn starts_with_ignore_case(text: &str, prefix: &str) -> bool {
    text.len() >= prefix.len()
        && text.as_bytes()[..prefix.len()].eq_ignore_ascii_case(prefix.as_bytes())
}

/// Classify output in the generic `WARNING[tool file]:message` dialect.
///
/// Parsing stops at the totals line or at a ` [continuing]` line.
pub fn parse_error_string(report: &mut Report, error_output: &str, source_directory: &Path) {
    let mut collector = Collector::new(report);

    for line in error_output.lines().filter(|line| !line.is_empty()) {
        if collector.header(line, source_directory) {
            continue;
        }
        if line == CONTINUING_LINE || is_totals_line(line) {
            break;
        }
        collector.continue_last(line);
    }
}

/// Classify script munge output.
///
/// In addition to the generic dialect, compiler errors of the form
/// `luac.exe: path/to/script.lua:12: message` are reported as errors
/// attributed to the script.
pub fn parse_script_munge_error_string(
    report: &mut Report,
    error_output: &str,
    source_directory: &Path,
) {
    const COMPILER_MARKER: &str = "luac.exe: ";

    let mut collector = Collector::new(report);

    for line in error_output.lines().filter(|line| !line.is_empty()) {
        if collector.header(line, source_directory) {
            continue;
        }
        if let Some(position) = line.find(COMPILER_MARKER) {
            let message = &line[position + COMPILER_MARKER.len()..];
            let file = message.find(".lua:").map(|end| &message[..end + 4]).unwrap_or("");

            collector.error(Message::new(
                attribute(source_directory, file),
                SCRIPT_MUNGE_TOOL,
                message,
            ));
            continue;
        }
        if is_totals_line(line) {
            break;
        }
        collector.continue_last(line);
    }
}

/// Classify sound munge output.
///
/// Sound tool lines look like
/// `soundflmunge.exe : Error : message while munging bank.sfx`, where the
/// category decides the list and the file follows `while munging`.
pub fn parse_sound_munge_error_string(
    report: &mut Report,
    error_output: &str,
    source_directory: &Path,
) {
    const TOOL_PREFIX: &str = "soundflmunge.exe";
    const FILE_MARKER: &str = "while munging ";

    let mut collector = Collector::new(report);

    for line in error_output.lines().filter(|line| !line.is_empty()) {
        if !starts_with_ignore_case(line, TOOL_PREFIX) {
            collector.continue_last(line);
            continue;
        }

        let (tool, rest) = line.split_once(" : ").unwrap_or((line, ""));
        let (category, message) = rest.split_once(" : ").unwrap_or((rest, ""));
        let file = message
            .find(FILE_MARKER)
            .map(|start| &message[start + FILE_MARKER.len()..])
            .unwrap_or("");

        let tool = if tool.trim().eq_ignore_ascii_case(TOOL_PREFIX) {
            SOUND_MUNGE_TOOL
        } else {
            tool.trim()
        };
        let entry = Message::new(attribute(source_directory, file), tool, message);

        if category.trim() == "Error" {
            collector.error(entry);
        } else {
            collector.warning(entry);
        }
    }
}

/// Classify movie munge output for a single movie list `file`.
pub fn parse_movie_munge_error_string(report: &mut Report, error_output: &str, file: &Path) {
    let mut collector = Collector::new(report);

    for line in error_output.lines().filter(|line| !line.is_empty()) {
        if let Some(message) = line.strip_prefix("Warning : ") {
            collector.warning(Message::new(file, MOVIE_MUNGE_TOOL, message));
        } else if let Some(message) = line.strip_prefix("Error : ") {
            collector.error(Message::new(file, MOVIE_MUNGE_TOOL, message));
        } else {
            collector.continue_last(line);
        }
    }
}

/// Classify shader munge output.
///
/// Besides the generic dialect, compiler diagnostics of the form
/// `shader.fx(12) : error X3000 : message` are recognised. Totals lines are
/// skipped rather than ending the parse, since every shader prints its own.
pub fn parse_shader_munge_error_string(
    report: &mut Report,
    error_output: &str,
    source_directory: &Path,
) {
    let mut collector = Collector::new(report);

    for line in error_output.lines().filter(|line| !line.is_empty()) {
        if collector.header(line, source_directory) {
            continue;
        }
        if let Some((location, message)) = line.split_once(" : ") {
            let file = location.rfind('(').map(|end| &location[..end]).unwrap_or(location);
            let entry = Message::new(attribute(source_directory, file), SHADER_MUNGE_TOOL, line);

            if starts_with_ignore_case(message.trim_start(), "error") {
                collector.error(entry);
            } else {
                collector.warning(entry);
            }
            continue;
        }
        if is_totals_line(line) {
            continue;
        }
        collector.continue_last(line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source() -> PathBuf {
        PathBuf::from("project").join("Common")
    }

    #[test]
    fn test_empty_input_leaves_report_untouched() {
        let mut report = Report::new();
        parse_error_string(&mut report, "", &source());
        assert!(report.is_empty());
    }

    #[test]
    fn test_generic_warning_header() {
        let mut report = Report::new();
        parse_error_string(&mut report, "WARNING[tool file]:text", &source());

        assert_eq!(report.warnings.len(), 1);
        assert!(report.errors.is_empty());
        let warning = &report.warnings[0];
        assert_eq!(warning.tool, "tool");
        assert_eq!(warning.file, source().join("file"));
        assert_eq!(warning.message, "text");
    }

    #[test]
    fn test_generic_continuation_and_order() {
        let text = "\
WARNING[OdfMunge a.odf]:first
   more about first
ERROR[OdfMunge b.odf]:second
WARNING[OdfMunge c.odf]:third
";
        let mut report = Report::new();
        parse_error_string(&mut report, text, &source());

        assert_eq!(report.warnings.len(), 2);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.warnings[0].message, "first\n   more about first");
        assert_eq!(report.warnings[1].message, "third");
        assert_eq!(report.errors[0].file, source().join("b.odf"));
    }

    #[test]
    fn test_generic_lines_before_header_are_dropped() {
        let mut report = Report::new();
        parse_error_string(&mut report, "noise\nmore noise\n", &source());
        assert!(report.is_empty());
    }

    #[test]
    fn test_generic_stops_at_totals_line() {
        let text = "\
ERROR[OdfMunge b.odf]:broken
   1 Errors    0 Warnings
WARNING[OdfMunge c.odf]:after totals
";
        let mut report = Report::new();
        parse_error_string(&mut report, text, &source());

        assert_eq!(report.errors.len(), 1);
        assert!(report.warnings.is_empty());
        assert_eq!(report.errors[0].message, "broken");
    }

    #[test]
    fn test_generic_stops_at_continuing_line() {
        let text = "\
ERROR[OdfMunge a.odf]:boom
 [continuing]
WARNING[OdfMunge b.odf]:late
";
        let mut report = Report::new();
        parse_error_string(&mut report, text, &source());

        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].message, "boom");
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_generic_n_headers_give_n_messages() {
        let text: String =
            (0..25).map(|n| format!("ERROR[pc_TextureMunge t{}.tga]:bad\n", n)).collect();
        let mut report = Report::new();
        parse_error_string(&mut report, &text, &source());

        assert_eq!(report.errors.len(), 25);
        for (n, error) in report.errors.iter().enumerate() {
            assert_eq!(error.file, source().join(format!("t{}.tga", n)));
        }
    }

    #[test]
    fn test_script_compiler_error() {
        let text = "luac.exe: Scripts/cp.lua:12: unexpected symbol near 'end'";
        let mut report = Report::new();
        parse_script_munge_error_string(&mut report, text, &source());

        assert_eq!(report.errors.len(), 1);
        let error = &report.errors[0];
        assert_eq!(error.tool, "ScriptMunge");
        assert_eq!(error.file, source().join("Scripts/cp.lua"));
        assert_eq!(error.message, "Scripts/cp.lua:12: unexpected symbol near 'end'");
    }

    #[test]
    fn test_script_still_understands_generic_headers() {
        let mut report = Report::new();
        parse_script_munge_error_string(&mut report, "WARNING[ScriptMunge x.lua]:odd", &source());
        assert_eq!(report.warnings.len(), 1);
    }

    #[test]
    fn test_sound_error_and_warning_categories() {
        let text = "\
SoundFLMunge.exe : Error : sample missing while munging effects.sfx
soundflmunge.exe : Warning : resampling while munging music.stm
";
        let mut report = Report::new();
        parse_sound_munge_error_string(&mut report, text, &source());

        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.errors[0].tool, "SoundFLMunge");
        assert_eq!(report.errors[0].file, source().join("effects.sfx"));
        assert_eq!(report.warnings[0].file, source().join("music.stm"));
    }

    #[test]
    fn test_movie_messages_use_given_file() {
        let file = PathBuf::from("movies/PC/intro.mlst");
        let text = "Warning : low bitrate\nError : missing frame\n   frame 12\n";
        let mut report = Report::new();
        parse_movie_munge_error_string(&mut report, text, &file);

        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].file, file);
        assert_eq!(report.errors[0].tool, "MovieMunge");
        assert_eq!(report.errors[0].message, "missing frame\n   frame 12");
    }

    #[test]
    fn test_shader_compiler_diagnostics() {
        let text = "\
normal.fx(12) : error X3004 : undeclared identifier
   0 Errors    0 Warnings
normal.fx(40) : warning X3206 : implicit truncation
";
        let mut report = Report::new();
        parse_shader_munge_error_string(&mut report, text, &source());

        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.errors[0].file, source().join("normal.fx"));
        assert_eq!(report.errors[0].message, "normal.fx(12) : error X3004 : undeclared identifier");
        assert_eq!(report.warnings[0].tool, "ShaderMunge");
    }
}
