//! Munge tool descriptions.
//!
//! A [`Tool`] names one ToolsFL invocation (or small family of invocations)
//! together with the inputs that shape its command line. Tool lists are plain
//! data so they can be overridden from `munge.toml`:
//!
//! ```toml
//! [[config.tools.common_pack]]
//! type = "level_pack"
//! input_file = "core.req"
//! write_files = "core.files"
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// Inputs for the effects config munge.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigEffectsMungeInputs {
    /// Only munge the `Effects` subdirectory of the source directory
    pub effects_directory_only: bool,
}

/// Inputs for the font munge.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FontMungeInputs {
    /// Only munge the `Fonts` subdirectory of the source directory
    pub fonts_directory_only: bool,
}

/// Inputs for the script munge.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptMungeInputs {
    /// Only munge the `Scripts` subdirectory of the source directory
    pub scripts_directory_only: bool,
}

/// Inputs for the world munge.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldMungeInputs {
    /// Munge `.lyr` layer files instead of `.wld` worlds
    pub layers: bool,
}

/// Inputs for a sound bank munge.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SoundMungeInputs {
    /// Munge `.asfx` additional banks instead of `.sfx`
    pub additional_bank: bool,
    /// Munge `.stm` streams instead of banks
    pub stream: bool,
    /// Read from the `Sound` subdirectory of the source directory
    pub sound_child_directory: bool,
}

/// Inputs for a level pack.
///
/// Relative paths may use either `/` or `\` as separator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelPackInputs {
    /// Write packed levels to the output directory instead of the lvl directory
    pub child_levels: bool,
    /// Pack `*.mrq` requests instead of `*.req`
    pub mrq_input: bool,
    /// Pass `-onlyfiles` to the packer
    pub only_files: bool,
    /// Pack a single request file instead of every request in the directory
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_file: Option<String>,
    /// Record the packed files into this file, relative to the output directory
    #[serde(skip_serializing_if = "Option::is_none")]
    pub write_files: Option<String>,
    /// Source subdirectory holding the requests
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_directory: Option<String>,
    /// Extra input directories, relative to the project directory
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub extra_input_directories: Vec<String>,
    /// Extra common files, relative to the output directory
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub extra_common_files: Vec<String>,
}

impl LevelPackInputs {
    /// Pack a single request file.
    pub fn request(input_file: impl Into<String>) -> Self {
        Self { input_file: Some(input_file.into()), ..Default::default() }
    }

    /// Also record the packed files into `write_files`.
    pub fn with_write_files(mut self, write_files: impl Into<String>) -> Self {
        self.write_files = Some(write_files.into());
        self
    }
}

/// One entry of a tool list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Tool {
    BinPs2Munge,
    ConfigBoundaryMunge,
    ConfigComboMunge,
    ConfigEffectsMunge(ConfigEffectsMungeInputs),
    ConfigEnvEffectsMunge,
    ConfigHudMunge,
    ConfigLightMunge,
    ConfigLoadMunge,
    ConfigMovieMunge,
    ConfigPathMunge,
    ConfigPropMunge,
    ConfigPvsMunge,
    ConfigSkyMunge,
    ConfigSoldierAnimationMunge,
    ConfigSoundMunge,
    ConfigSoundCommonMunge,
    ConfigSoundWorldMunge,
    CopyPremunged,
    FontMunge(FontMungeInputs),
    LevelPack(LevelPackInputs),
    LoadPack,
    LocalizeMunge,
    ModelMunge,
    MovieMunge,
    OdfMunge,
    PathMunge,
    PathPlanningMunge,
    ScriptMunge(ScriptMungeInputs),
    ShaderMunge,
    SoundMunge(SoundMungeInputs),
    TerrainMunge,
    TextureMunge,
    WorldMunge(WorldMungeInputs),
}

impl Tool {
    /// Short kind name, matching the `type` key used in `munge.toml`.
    pub fn kind(&self) -> &'static str {
        match self {
            Tool::BinPs2Munge => "bin_ps2_munge",
            Tool::ConfigBoundaryMunge => "config_boundary_munge",
            Tool::ConfigComboMunge => "config_combo_munge",
            Tool::ConfigEffectsMunge(_) => "config_effects_munge",
            Tool::ConfigEnvEffectsMunge => "config_env_effects_munge",
            Tool::ConfigHudMunge => "config_hud_munge",
            Tool::ConfigLightMunge => "config_light_munge",
            Tool::ConfigLoadMunge => "config_load_munge",
            Tool::ConfigMovieMunge => "config_movie_munge",
            Tool::ConfigPathMunge => "config_path_munge",
            Tool::ConfigPropMunge => "config_prop_munge",
            Tool::ConfigPvsMunge => "config_pvs_munge",
            Tool::ConfigSkyMunge => "config_sky_munge",
            Tool::ConfigSoldierAnimationMunge => "config_soldier_animation_munge",
            Tool::ConfigSoundMunge => "config_sound_munge",
            Tool::ConfigSoundCommonMunge => "config_sound_common_munge",
            Tool::ConfigSoundWorldMunge => "config_sound_world_munge",
            Tool::CopyPremunged => "copy_premunged",
            Tool::FontMunge(_) => "font_munge",
            Tool::LevelPack(_) => "level_pack",
            Tool::LoadPack => "load_pack",
            Tool::LocalizeMunge => "localize_munge",
            Tool::ModelMunge => "model_munge",
            Tool::MovieMunge => "movie_munge",
            Tool::OdfMunge => "odf_munge",
            Tool::PathMunge => "path_munge",
            Tool::PathPlanningMunge => "path_planning_munge",
            Tool::ScriptMunge(_) => "script_munge",
            Tool::ShaderMunge => "shader_munge",
            Tool::SoundMunge(_) => "sound_munge",
            Tool::TerrainMunge => "terrain_munge",
            Tool::TextureMunge => "texture_munge",
            Tool::WorldMunge(_) => "world_munge",
        }
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind())
    }
}
