//! Tools whose up-to-date checks happen here rather than in the ToolsFL
//! executable: movie munge, localize munge, and premunged file copies.

use super::{munge_process, run_process};
use crate::build::context::ToolContext;
use crate::build::host::{DirEntry, LaunchError};
use crate::build::message::Message;
use std::path::{Path, PathBuf};

const MOVIE_TOOL: &str = "MovieMunge";
const LOCALIZE_TOOL: &str = "LocalizeMunge";

/// Munge every `.mlst` movie list of the source directory into
/// `<lvl output>/Movies/<name>.mvs`.
pub fn execute_movie_munge(context: &ToolContext) -> Result<(), LaunchError> {
    let movies_path = context.lvl_output_path.join("Movies");

    if !context.host.fs.exists(&movies_path) {
        if let Err(e) = context.host.fs.create_directories(&movies_path) {
            tracing::warn!(path = %movies_path.display(), error = %e, "failed to create movie output");
            context.feedback.add_error(Message::new(
                &movies_path,
                MOVIE_TOOL,
                "Failed to create directory for output.",
            ));
            return Ok(());
        }
    }

    let working_directory = context.source_path.parent().map(PathBuf::from).unwrap_or_default();

    for entry in context.host.list_files_with_extension(&context.source_path, "mlst") {
        let output = movies_path.join(format!("{}.mvs", entry.stem()));
        let command_line =
            format!("-input {} -output {} -checkdate", entry.path.display(), output.display());

        run_process(
            context,
            munge_process(context.tool_path(MOVIE_TOOL), command_line, &working_directory),
            |feedback, stderr| feedback.parse_movie_munge_error_string(stderr, &entry.path),
        )?;
    }

    Ok(())
}

/// A localization file and its platform override.
struct Localization {
    base: DirEntry,
    platform_override: PathBuf,
}

/// Munge localization files.
///
/// Each `<name>.cfg` is merged with the platform override
/// `<platform>/<name>.cfg` (if any) into a temporary directory below the
/// output directory, and `LocalizeMunge` runs over the merged files. Nothing
/// runs unless some `<name>.loc` output is older than its inputs. The
/// temporary files and directory are removed afterwards.
pub fn execute_localize_munge(context: &ToolContext) -> Result<(), LaunchError> {
    let fs = &context.host.fs;
    let platform_path = context.source_path.join(context.platform.as_str());
    let merge_path = context.output_path.join("TempLocalize");

    let localizations: Vec<Localization> = context
        .host
        .list_files_with_extension(&context.source_path, "cfg")
        .into_iter()
        .filter(|entry| !entry.stem().eq_ignore_ascii_case("Comments"))
        .map(|base| {
            let platform_override = platform_path.join(base.name());
            Localization { base, platform_override }
        })
        .collect();

    let outdated = localizations.iter().any(|localization| {
        let output = context.output_path.join(format!("{}.loc", localization.base.stem()));
        let newest_input =
            fs.modified(&localization.base.path).max(fs.modified(&localization.platform_override));
        fs.modified(&output) < newest_input
    });

    if !outdated {
        tracing::debug!(source = %context.source_path.display(), "localization up to date");
        return Ok(());
    }

    if let Err(e) = fs.create_directories(&merge_path) {
        tracing::warn!(path = %merge_path.display(), error = %e, "failed to create merge directory");
        context.feedback.add_error(Message::new(
            &merge_path,
            LOCALIZE_TOOL,
            "Failed to create temporary directory for merging localization.",
        ));
        return Ok(());
    }

    let temp_files: Vec<PathBuf> = localizations
        .iter()
        .filter_map(|localization| merge_localization(context, localization, &merge_path))
        .collect();

    let result = if temp_files.is_empty() {
        Ok(())
    } else {
        let command_line = format!(
            "-inputfile *.cfg -platform {} -sourcedir {} -outputdir {}",
            context.platform,
            merge_path.display(),
            context.output_path.display()
        );

        run_process(
            context,
            munge_process(context.tool_path(LOCALIZE_TOOL), command_line, &context.toolsfl_bin_path),
            |feedback, stderr| feedback.parse_error_string(stderr, &merge_path),
        )
    };

    for temp_file in &temp_files {
        if fs.remove_file(temp_file).is_err() && fs.exists(temp_file) {
            context.feedback.add_warning(Message::new(
                temp_file,
                LOCALIZE_TOOL,
                "Failed to cleanup temporary file used for merging localization.",
            ));
        }
    }

    if fs.remove_dir(&merge_path).is_err() && fs.exists(&merge_path) {
        context.feedback.add_warning(Message::new(
            &merge_path,
            LOCALIZE_TOOL,
            "Failed to cleanup temporary directory used for merging localization.",
        ));
    }

    result
}

/// Write the merge of one localization; returns the merged file on success.
///
/// A missing platform override merges the base file alone.
fn merge_localization(
    context: &ToolContext,
    localization: &Localization,
    merge_path: &Path,
) -> Option<PathBuf> {
    let fs = &context.host.fs;

    let mut merged = match fs.read_to_string(&localization.base.path) {
        Ok(contents) => contents,
        Err(e) => {
            context.feedback.add_error(Message::new(
                &localization.base.path,
                LOCALIZE_TOOL,
                format!("Failed to open localization file for merging.\n   Reason: {}", e),
            ));
            return None;
        }
    };

    if fs.exists(&localization.platform_override) {
        match fs.read_to_string(&localization.platform_override) {
            Ok(contents) => merged.push_str(&contents),
            Err(e) => {
                context.feedback.add_error(Message::new(
                    &localization.platform_override,
                    LOCALIZE_TOOL,
                    format!("Failed to open platform localization file for merging.\n   Reason: {}", e),
                ));
                return None;
            }
        }
    }

    let merged_path = merge_path.join(localization.base.name());
    match fs.write(&merged_path, merged.as_bytes()) {
        Ok(()) => Some(merged_path),
        Err(e) => {
            context.feedback.add_error(Message::new(
                &merged_path,
                LOCALIZE_TOOL,
                format!("Failed to open temporary localization file for merging.\n   Reason: {}", e),
            ));
            if fs.exists(&merged_path) {
                if let Err(e) = fs.remove_file(&merged_path) {
                    tracing::warn!(
                        path = %merged_path.display(),
                        error = %e,
                        "failed to remove partial localization merge"
                    );
                }
            }
            None
        }
    }
}

/// Copy files from the source's `munged/` directory to the output
/// directory, skipping files whose copy carries the same modification time.
pub fn execute_copy_premunged(context: &ToolContext) {
    let fs = &context.host.fs;
    let premunged_path = context.source_path.join("munged");

    for entry in context.host.list(&premunged_path).into_iter().filter(|e| !e.is_dir) {
        let destination = context.output_path.join(entry.name());

        if fs.modified(&destination) == fs.modified(&entry.path) {
            continue;
        }

        if let Err(e) = fs.copy_file(&entry.path, &destination) {
            tracing::warn!(file = %entry.path.display(), error = %e, "failed to copy premunged file");
            context.feedback.add_error(Message::new(
                &entry.path,
                "Copy File",
                format!("Failed to copy file to {}.", destination.display()),
            ));
        }
    }
}
