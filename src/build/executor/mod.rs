//! Tool execution.
//!
//! [`execute_tool`] maps each [`Tool`] onto the ToolsFL invocations it stands
//! for. Tools run one at a time and each invocation is waited for before the
//! next starts. Failure to launch an executable is returned to the caller;
//! everything else a tool reports ends up in the job's feedback.

mod custom;
mod incremental;
mod munge;
mod pack;
mod sound;

pub use custom::{execute_custom_command, substitute_placeholders};
pub use incremental::{execute_copy_premunged, execute_localize_munge, execute_movie_munge};
pub use munge::{
    execute_config_munge, execute_munge, execute_path_munge, execute_script_munge,
    execute_shader_munge, execute_sound_config_munge, ConfigMunge, Munge,
};
pub use pack::{execute_level_pack, execute_load_pack};
pub use sound::{
    execute_sound_common_bank_munge, execute_sound_directory_children_pack,
    execute_sound_directory_munge, execute_sound_directory_pack, execute_sound_munge,
    SoundDirectoryMunge, SoundDirectoryPack,
};
pub(crate) use sound::COMMON_BANK_NAME;

use super::context::ToolContext;
use super::feedback::Feedback;
use super::host::{LaunchError, ProcessDesc, ProcessPriority};
use super::tool::Tool;
use std::path::{Path, PathBuf};

/// Priority every munge tool runs at.
pub const MUNGE_PROCESS_PRIORITY: ProcessPriority = ProcessPriority::BelowNormal;

/// Run one tool against a context.
pub fn execute_tool(tool: &Tool, context: &ToolContext) -> Result<(), LaunchError> {
    match tool {
        Tool::BinPs2Munge => execute_munge(&munge::BIN_PS2, &context.with_source_child("ps2bin")),
        Tool::ConfigBoundaryMunge => execute_config_munge(&munge::BOUNDARY, context),
        Tool::ConfigComboMunge => execute_config_munge(&munge::COMBO, context),
        Tool::ConfigEffectsMunge(inputs) => {
            if inputs.effects_directory_only {
                execute_config_munge(&munge::EFFECTS, &context.with_source_child("Effects"))
            } else {
                execute_config_munge(&munge::EFFECTS, context)
            }
        }
        Tool::ConfigEnvEffectsMunge => execute_config_munge(&munge::ENV_EFFECTS, context),
        Tool::ConfigHudMunge => execute_config_munge(&munge::HUD, context),
        Tool::ConfigLightMunge => execute_config_munge(&munge::LIGHT, context),
        Tool::ConfigLoadMunge => execute_config_munge(&munge::LOAD, context),
        Tool::ConfigMovieMunge => execute_config_munge(&munge::MOVIE, context),
        Tool::ConfigPathMunge => execute_config_munge(&munge::PATH, context),
        Tool::ConfigPropMunge => execute_config_munge(&munge::PROP, context),
        Tool::ConfigPvsMunge => execute_config_munge(&munge::PVS, context),
        Tool::ConfigSkyMunge => execute_config_munge(&munge::SKY, context),
        Tool::ConfigSoldierAnimationMunge => {
            execute_config_munge(&munge::SOLDIER_ANIMATION, context)
        }
        Tool::ConfigSoundMunge => execute_sound_config_munge(munge::SOUND_CONFIGS, context),
        Tool::ConfigSoundCommonMunge => execute_sound_config_munge(
            munge::SOUND_COMMON_CONFIGS,
            &context.with_source_child("Sound"),
        ),
        Tool::ConfigSoundWorldMunge => execute_sound_config_munge(
            munge::SOUND_WORLD_CONFIGS,
            &context.with_source_child("Sound"),
        ),
        Tool::CopyPremunged => {
            execute_copy_premunged(context);
            Ok(())
        }
        Tool::FontMunge(inputs) => {
            if inputs.fonts_directory_only {
                execute_munge(&munge::FONT, &context.with_source_child("Fonts"))
            } else {
                execute_munge(&munge::FONT, context)
            }
        }
        Tool::LevelPack(inputs) => execute_level_pack(inputs, context),
        Tool::LoadPack => execute_load_pack(context),
        Tool::LocalizeMunge => execute_localize_munge(&context.with_source_child("Localize")),
        Tool::ModelMunge => execute_munge(&munge::MODEL, context),
        Tool::MovieMunge => {
            let platform = context.platform.as_str();
            execute_movie_munge(&context.with_source_child(&format!("movies/{}", platform)))
        }
        Tool::OdfMunge => execute_munge(&munge::ODF, context),
        Tool::PathMunge => execute_path_munge(context),
        Tool::PathPlanningMunge => execute_munge(&munge::PATH_PLANNING, context),
        Tool::ScriptMunge(inputs) => {
            if inputs.scripts_directory_only {
                execute_script_munge(&context.with_source_child("Scripts"))
            } else {
                execute_script_munge(context)
            }
        }
        Tool::ShaderMunge => execute_shader_munge(context),
        Tool::SoundMunge(inputs) => execute_sound_munge(inputs, context),
        Tool::TerrainMunge => execute_munge(&munge::TERRAIN, context),
        Tool::TextureMunge => execute_munge(&munge::TEXTURE, context),
        Tool::WorldMunge(inputs) => {
            if inputs.layers {
                execute_munge(&munge::LAYER, context)
            } else {
                execute_munge(&munge::WORLD, context)
            }
        }
    }
}

/// Describe a munge tool invocation.
pub(crate) fn munge_process(
    executable: PathBuf,
    command_line: String,
    working_directory: &Path,
) -> ProcessDesc {
    ProcessDesc {
        executable,
        command_line,
        working_directory: working_directory.to_path_buf(),
        priority: MUNGE_PROCESS_PRIORITY,
    }
}

/// Run a process to completion and route its output.
///
/// Stdout is printed, stderr is classified and then printed.
pub(crate) fn run_process(
    context: &ToolContext,
    desc: ProcessDesc,
    classify: impl FnOnce(&Feedback, &str),
) -> Result<(), LaunchError> {
    let output = context.host.processes.run(&desc)?;

    context.feedback.print_output(&output.stdout);
    classify(context.feedback, &output.stderr);
    context.feedback.print_errors(&output.stderr);

    Ok(())
}

/// `path` with a trailing separator, as the sound tools expect for a
/// directory argument.
pub(crate) fn directory_argument(path: &Path) -> String {
    format!("{}{}", path.display(), std::path::MAIN_SEPARATOR)
}
