//! Sound bank munging and packing.
//!
//! Sound directories hold bank lists (`.sfx`, `.asfx`), stream lists
//! (`.stm`), and on platforms other than PS2 four-channel stream lists
//! (`.st4`). A `.st4` list supersedes the `.stm` list of the same name.
//! Localized streams use `.stm_<language>` and `.st4_<language>`.

use super::munge::{execute_sound_config_munge, SOUND_CONFIGS};
use super::{directory_argument, munge_process, run_process};
use crate::build::context::ToolContext;
use crate::build::host::{has_extension, DirEntry, LaunchError};
use crate::build::tool::SoundMungeInputs;
use crate::config::{Platform, SoundLocalization};
use std::path::PathBuf;

const SOUND_TOOL: &str = "SoundFLMunge";
/// File name of the aggregate bank in the lvl output directory.
pub(crate) const COMMON_BANK_NAME: &str = "common.bnk";
/// Placeholder audio referenced by template banks when a common bank is built.
const COMMON_BANK_STUB: &str = r"C:\Windows\Media\chord.wav";

/// Munge the banks or streams of a directory.
pub fn execute_sound_munge(inputs: &SoundMungeInputs, context: &ToolContext) -> Result<(), LaunchError> {
    let extension = if inputs.additional_bank {
        "asfx"
    } else if inputs.stream {
        "stm"
    } else {
        "sfx"
    };

    let context = if inputs.sound_child_directory {
        context.with_source_child("Sound")
    } else {
        context.clone()
    };

    for entry in context.host.list_files_with_extension(&context.source_path, extension) {
        let command_line = format!(
            "-platform {} -banklistinput {} -bankoutput {} {} -checkdate -checkid -resample",
            context.platform.sound_token(),
            entry.path.display(),
            directory_argument(&context.output_path),
            if inputs.stream { "-stream" } else { "" }
        );
        let working_directory = entry.path.parent().map(PathBuf::from).unwrap_or_default();

        run_process(
            &context,
            munge_process(context.tool_path(SOUND_TOOL), command_line, &working_directory),
            |feedback, stderr| feedback.parse_sound_munge_error_string(stderr, &context.source_path),
        )?;
    }

    Ok(())
}

/// Inputs of a sound directory munge.
#[derive(Debug, Clone, Copy, Default)]
pub struct SoundDirectoryMunge<'p> {
    /// Leave banks to the aggregate common bank
    pub create_common_bank: bool,
    pub localizations: &'p [SoundLocalization],
}

/// Inputs of a sound directory pack.
#[derive(Debug, Clone, Copy)]
pub struct SoundDirectoryPack<'p> {
    /// Name of the directory; its own request is packed by the directory pack
    pub directory_name: &'p str,
    pub localizations: &'p [SoundLocalization],
    /// Output directories of the shared sound directories
    pub input_directories: &'p [PathBuf],
}

fn munge_bank(context: &ToolContext, entry: &DirEntry, extra_args: &str) -> Result<(), LaunchError> {
    let command_line = format!(
        "-platform {} -banklistinput {} -bankoutput {} -checkdate -resample -checkid noabort -relativepath{}",
        context.platform.sound_token(),
        entry.path.display(),
        directory_argument(&context.output_path),
        extra_args
    );

    run_process(
        context,
        munge_process(context.tool_path(SOUND_TOOL), command_line, &context.toolsfl_bin_path),
        |feedback, stderr| feedback.parse_sound_munge_error_string(stderr, &context.source_path),
    )
}

/// Munge the streams of `entries` with the given stream extensions.
///
/// `.stm`-style lists shadowed by a `.st4`-style sibling are skipped when
/// four-channel streams are munged.
fn munge_streams(
    context: &ToolContext,
    entries: &[DirEntry],
    stream_extension: &str,
    four_channel_extension: &str,
) -> Result<(), LaunchError> {
    let munge_four_channel = context.platform != Platform::Ps2;

    for entry in entries {
        if entry.has_extension(stream_extension) {
            let shadowed = munge_four_channel
                && entries.iter().any(|other| {
                    other.has_extension(four_channel_extension)
                        && other.stem().eq_ignore_ascii_case(&entry.stem())
                });
            if shadowed {
                continue;
            }
            munge_bank(context, entry, " -stream")?;
        } else if munge_four_channel && entry.has_extension(four_channel_extension) {
            munge_bank(context, entry, " -stream -substream 2")?;
        }
    }

    Ok(())
}

/// Munge a sound directory: configs, banks, streams, and localized streams.
pub fn execute_sound_directory_munge(
    munge: &SoundDirectoryMunge,
    context: &ToolContext,
) -> Result<(), LaunchError> {
    execute_sound_config_munge(SOUND_CONFIGS, context)?;

    let entries: Vec<DirEntry> =
        context.host.list(&context.source_path).into_iter().filter(|e| !e.is_dir).collect();

    if !munge.create_common_bank {
        for entry in entries.iter().filter(|e| e.has_extension("sfx") || e.has_extension("asfx")) {
            munge_bank(context, entry, "")?;
        }
    }

    munge_streams(context, &entries, "stm", "st4")?;

    for localization in munge.localizations {
        let mut localization_context = context.clone();
        localization_context.output_path = context.output_path.join(&localization.output_directory);
        localization_context.lvl_output_path =
            context.lvl_output_path.join(&localization.output_directory);

        if !localization_context.create_output_directories() {
            continue;
        }

        munge_streams(
            &localization_context,
            &entries,
            &format!("stm_{}", localization.language),
            &format!("st4_{}", localization.language),
        )?;
    }

    Ok(())
}

fn join_directories(directories: impl Iterator<Item = PathBuf>) -> String {
    directories.map(|d| d.display().to_string()).collect::<Vec<_>>().join(" ")
}

fn run_level_pack(context: &ToolContext, command_line: String) -> Result<(), LaunchError> {
    run_process(
        context,
        munge_process(context.tool_path("LevelPack"), command_line, &context.toolsfl_bin_path),
        |feedback, stderr| feedback.parse_error_string(stderr, &context.source_path),
    )
}

/// Pack every request of a sound directory except the directory's own into
/// child levels.
pub fn execute_sound_directory_children_pack(
    pack: &SoundDirectoryPack,
    context: &ToolContext,
) -> Result<(), LaunchError> {
    let requests: Vec<DirEntry> = context
        .host
        .list_files_with_extension(&context.source_path, "req")
        .into_iter()
        .filter(|entry| !entry.stem().eq_ignore_ascii_case(pack.directory_name))
        .collect();
    let shared_inputs = join_directories(pack.input_directories.iter().cloned());

    for request in &requests {
        let command_line = format!(
            "-inputfile {} -platform {} -sourcedir {} -inputdir {} {} -outputdir {}",
            request.path.display(),
            context.platform,
            context.source_path.display(),
            context.output_path.display(),
            shared_inputs,
            context.output_path.display()
        );
        run_level_pack(context, command_line)?;
    }

    for localization in pack.localizations {
        let localized_output = context.output_path.join(&localization.output_directory);
        let shared_localized_inputs = join_directories(
            pack.input_directories.iter().map(|d| d.join(&localization.output_directory)),
        );

        for request in &requests {
            let command_line = format!(
                "-inputfile {} -platform {} -sourcedir {} -inputdir {} {} {} {} -outputdir {}",
                request.path.display(),
                context.platform,
                context.source_path.display(),
                localized_output.display(),
                shared_localized_inputs,
                context.output_path.display(),
                shared_inputs,
                localized_output.display()
            );
            run_level_pack(context, command_line)?;
        }
    }

    Ok(())
}

/// Pack a sound directory's own request into its level.
///
/// Does nothing unless `<directory>/<directory_name>.req` exists.
pub fn execute_sound_directory_pack(
    pack: &SoundDirectoryPack,
    context: &ToolContext,
) -> Result<(), LaunchError> {
    let request = context.source_path.join(format!("{}.req", pack.directory_name));
    if !context.host.fs.exists(&request) {
        return Ok(());
    }

    let shared_inputs = join_directories(pack.input_directories.iter().cloned());

    let command_line = format!(
        "-inputfile {} -platform {} -sourcedir {} -inputdir {} {} -outputdir {}",
        request.display(),
        context.platform,
        context.source_path.display(),
        context.output_path.display(),
        shared_inputs,
        context.lvl_output_path.display()
    );
    run_level_pack(context, command_line)?;

    for localization in pack.localizations {
        let localized_output = context.output_path.join(&localization.output_directory);
        let localized_lvl_output = context.lvl_output_path.join(&localization.output_directory);
        let shared_localized_inputs = join_directories(
            pack.input_directories.iter().map(|d| d.join(&localization.output_directory)),
        );

        let command_line = format!(
            "-inputfile {} -platform {} -sourcedir {} -inputdir {} {} {} {} -outputdir {}",
            request.display(),
            context.platform,
            context.source_path.display(),
            localized_output.display(),
            shared_localized_inputs,
            context.output_path.display(),
            shared_inputs,
            localized_lvl_output.display()
        );
        run_level_pack(context, command_line)?;
    }

    Ok(())
}

/// Munge every bank below the source directory into one `common.bnk` in the
/// lvl output directory. The tool runs even when no bank lists are found.
pub fn execute_sound_common_bank_munge(context: &ToolContext) -> Result<(), LaunchError> {
    let banks: Vec<String> = context
        .host
        .walk_files(&context.source_path)
        .into_iter()
        .filter(|entry| has_extension(&entry.path, "sfx") || has_extension(&entry.path, "asfx"))
        .map(|entry| entry.path.display().to_string())
        .collect();

    let command_line = format!(
        "-platform {} -banklistinput {} -bankoutput {} -checkdate -resample -compact nowarning -checkid noabort -relativepath -template -stub {}",
        context.platform.sound_token(),
        banks.join(" "),
        context.lvl_output_path.join(COMMON_BANK_NAME).display(),
        COMMON_BANK_STUB
    );

    run_process(
        context,
        munge_process(context.tool_path(SOUND_TOOL), command_line, &context.toolsfl_bin_path),
        |feedback, stderr| feedback.parse_sound_munge_error_string(stderr, &context.source_path),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::feedback::Feedback;
    use crate::build::testing::{recording_host, RecordingHost};
    use crate::config::Project;
    use std::fs;
    use tempfile::TempDir;

    fn common_bank_command_lines(temp: &TempDir) -> Vec<String> {
        let processes = RecordingHost::new();
        let host = recording_host(&processes);
        let feedback = Feedback::default();
        let project = Project::new(temp.path());
        let context = ToolContext {
            source_path: temp.path().join("Sound"),
            lvl_output_path: temp.path().join("_LVL_PC").join("sound"),
            ..ToolContext::new(&project, Platform::Pc, &feedback, &host)
        };

        execute_sound_common_bank_munge(&context).unwrap();
        processes.launches().into_iter().map(|desc| desc.command_line).collect()
    }

    #[test]
    fn test_common_bank_collects_nested_banks() {
        let temp = TempDir::new().unwrap();
        let sound = temp.path().join("Sound");
        fs::create_dir_all(sound.join("worlds").join("tst")).unwrap();
        fs::write(sound.join("global.sfx"), "").unwrap();
        fs::write(sound.join("worlds").join("tst").join("tst.asfx"), "").unwrap();
        fs::write(sound.join("worlds").join("tst").join("tst.stm"), "").unwrap();

        let command_lines = common_bank_command_lines(&temp);

        assert_eq!(command_lines.len(), 1);
        let command_line = &command_lines[0];
        assert!(command_line.contains("global.sfx"));
        assert!(command_line.contains("tst.asfx"));
        assert!(!command_line.contains("tst.stm"));
        assert!(command_line.contains(&format!(
            "-bankoutput {}",
            temp.path().join("_LVL_PC").join("sound").join(COMMON_BANK_NAME).display()
        )));
        assert!(command_line.ends_with(&format!("-template -stub {}", COMMON_BANK_STUB)));
    }

    #[test]
    fn test_common_bank_runs_without_banks() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("Sound")).unwrap();

        let command_lines = common_bank_command_lines(&temp);

        assert_eq!(command_lines.len(), 1);
        assert!(command_lines[0].starts_with("-platform pc -banklistinput  -bankoutput"));
    }
}
