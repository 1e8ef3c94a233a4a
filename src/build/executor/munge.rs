//! Batch munges: one ToolsFL invocation over every matching file.

use super::{munge_process, run_process};
use crate::build::context::ToolContext;
use crate::build::host::LaunchError;
use crate::build::message::Message;
use crate::config::Platform;

/// A batch munge tool and the extension it consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Munge {
    pub tool: &'static str,
    pub input: &'static str,
}

pub(super) const BIN_PS2: Munge = Munge { tool: "BinMunge", input: "ps2bin" };
pub(super) const FONT: Munge = Munge { tool: "FontMunge", input: "fff" };
pub(super) const MODEL: Munge = Munge { tool: "pc_ModelMunge", input: "msh" };
pub(super) const ODF: Munge = Munge { tool: "OdfMunge", input: "odf" };
pub(super) const PATH_PLANNING: Munge = Munge { tool: "PathPlanningMunge", input: "pln" };
pub(super) const TERRAIN: Munge = Munge { tool: "TerrainMunge", input: "ter" };
pub(super) const TEXTURE: Munge = Munge { tool: "pc_TextureMunge", input: "tga" };
pub(super) const WORLD: Munge = Munge { tool: "WorldMunge", input: "wld" };
pub(super) const LAYER: Munge = Munge { tool: "WorldMunge", input: "lyr" };

const SHADER: Munge = Munge { tool: "pc_ShaderMunge", input: "xml" };

/// A `ConfigMunge` run: input extension, output extension, chunk id, and
/// whether strings are hashed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigMunge {
    pub input: &'static str,
    pub output: &'static str,
    pub chunk: &'static str,
    pub hash_strings: bool,
}

impl ConfigMunge {
    const fn new(input: &'static str, output: &'static str, chunk: &'static str) -> Self {
        Self { input, output, chunk, hash_strings: false }
    }

    const fn hashed(input: &'static str, output: &'static str, chunk: &'static str) -> Self {
        Self { input, output, chunk, hash_strings: true }
    }
}

pub(super) const BOUNDARY: ConfigMunge = ConfigMunge::hashed("bnd", "boundary", "bnd");
pub(super) const COMBO: ConfigMunge = ConfigMunge::new("combo", "config", "comb");
pub(super) const EFFECTS: ConfigMunge = ConfigMunge::new("fx", "config", "fx");
pub(super) const ENV_EFFECTS: ConfigMunge = ConfigMunge::new("fx", "envfx", "fx");
pub(super) const HUD: ConfigMunge = ConfigMunge::new("hud", "config", "hud");
pub(super) const LIGHT: ConfigMunge = ConfigMunge::new("lgt", "light", "lght");
pub(super) const LOAD: ConfigMunge = ConfigMunge::new("cfg", "config", "load");
pub(super) const MOVIE: ConfigMunge = ConfigMunge::hashed("mcfg", "config", "mcfg");
pub(super) const PATH: ConfigMunge = ConfigMunge::new("pth", "path", "path");
pub(super) const PROP: ConfigMunge = ConfigMunge::hashed("prp", "prop", "prp");
pub(super) const PVS: ConfigMunge = ConfigMunge::new("pvs", "povs", "PORT");
pub(super) const SKY: ConfigMunge = ConfigMunge::new("sky", "config", "sky");
pub(super) const SOLDIER_ANIMATION: ConfigMunge = ConfigMunge::new("sanm", "config", "sanm");

pub(super) const SOUND_CONFIGS: &str = "*.snd *.mus *.ffx *.tsr";
pub(super) const SOUND_COMMON_CONFIGS: &str = "*.snd *.mus";
pub(super) const SOUND_WORLD_CONFIGS: &str = "*.snd *.mus *.tsr";

/// Run a batch munge over the context's source directory.
pub fn execute_munge(munge: &Munge, context: &ToolContext) -> Result<(), LaunchError> {
    let command_line = format!(
        "-inputfile $*.{} -checkdate -platform {} -sourcedir {} -outputdir {}",
        munge.input,
        context.platform,
        context.source_path.display(),
        context.output_path.display()
    );

    run_process(
        context,
        munge_process(context.tool_path(munge.tool), command_line, &context.toolsfl_bin_path),
        |feedback, stderr| feedback.parse_error_string(stderr, &context.source_path),
    )
}

/// Run `ConfigMunge` over the context's source directory.
pub fn execute_config_munge(config: &ConfigMunge, context: &ToolContext) -> Result<(), LaunchError> {
    let command_line = format!(
        "-inputfile $*.{} -checkdate -platform {} -sourcedir {} -outputdir {} -chunkid {} -ext {}{}",
        config.input,
        context.platform,
        context.source_path.display(),
        context.output_path.display(),
        config.chunk,
        config.output,
        if config.hash_strings { " -hashstrings" } else { "" }
    );

    run_process(
        context,
        munge_process(context.tool_path("ConfigMunge"), command_line, &context.toolsfl_bin_path),
        |feedback, stderr| feedback.parse_error_string(stderr, &context.source_path),
    )
}

/// Run `ConfigMunge` over sound configs, given as space-separated patterns.
pub fn execute_sound_config_munge(
    input_files: &str,
    context: &ToolContext,
) -> Result<(), LaunchError> {
    let command_line = format!(
        "-inputfile {} -checkdate -platform {} -sourcedir {} -outputdir {} -hashstrings",
        input_files,
        context.platform,
        context.source_path.display(),
        context.output_path.display()
    );

    run_process(
        context,
        munge_process(context.tool_path("ConfigMunge"), command_line, &context.toolsfl_bin_path),
        |feedback, stderr| feedback.parse_error_string(stderr, &context.source_path),
    )
}

/// Munge the `.lua` scripts of the source directory.
pub fn execute_script_munge(context: &ToolContext) -> Result<(), LaunchError> {
    let command_line = format!(
        "-inputfile $*.lua -checkdate -platform {} -sourcedir {} -outputdir {}",
        context.platform,
        context.source_path.display(),
        context.output_path.display()
    );

    run_process(
        context,
        munge_process(context.tool_path("ScriptMunge"), command_line, &context.toolsfl_bin_path),
        |feedback, stderr| feedback.parse_script_munge_error_string(stderr, &context.source_path),
    )
}

/// Munge shaders.
///
/// Only PC shaders can be munged. Xbox shaders are reported as unsupported
/// and PS2 has no shaders to munge.
pub fn execute_shader_munge(context: &ToolContext) -> Result<(), LaunchError> {
    match context.platform {
        Platform::Pc => {
            let context = context.with_source_child("shaders/PC");
            let command_line = format!(
                "-inputfile $*.{} -checkdate -platform {} -sourcedir {} -outputdir {} -I {}",
                SHADER.input,
                context.platform,
                context.source_path.display(),
                context.output_path.display(),
                context.source_path.display()
            );

            run_process(
                &context,
                munge_process(
                    context.tool_path(SHADER.tool),
                    command_line,
                    &context.toolsfl_bin_path,
                ),
                |feedback, stderr| {
                    feedback.parse_shader_munge_error_string(stderr, &context.source_path)
                },
            )
        }
        Platform::Xbox => {
            context.feedback.add_warning(Message::new(
                "",
                "xbox_ShaderMunge",
                "Munging Xbox shaders is currently unsupported.",
            ));
            Ok(())
        }
        Platform::Ps2 => Ok(()),
    }
}

/// Munge the `.pth` paths of every `World*` directory.
///
/// Paths are grouped per world: for each `.wld` file one `ConfigMunge` run
/// packs the paths named after it into a single output.
pub fn execute_path_munge(context: &ToolContext) -> Result<(), LaunchError> {
    let world_directories = context
        .host
        .list(&context.source_path)
        .into_iter()
        .filter(|entry| entry.is_dir && starts_with_world(&entry.stem()));

    for directory in world_directories {
        for world in context.host.list_files_with_extension(&directory.path, "wld") {
            let stem = world.stem();
            let command_line = format!(
                "-inputfile ${stem}*.pth -checkdate -platform {} -sourcedir {} -outputfile {stem} -outputdir {} -ext path -chunkid path",
                context.platform,
                context.source_path.display(),
                context.output_path.display(),
                stem = stem
            );

            run_process(
                context,
                munge_process(
                    context.tool_path("ConfigMunge"),
                    command_line,
                    &context.toolsfl_bin_path,
                ),
                |feedback, stderr| feedback.parse_error_string(stderr, &context.source_path),
            )?;
        }
    }

    Ok(())
}

/// Check for the `World` prefix of world subdirectories, ignoring case.
pub(crate) fn starts_with_world(name: &str) -> bool {
    name.len() >= 5 && name.as_bytes()[..5].eq_ignore_ascii_case(b"world")
}
