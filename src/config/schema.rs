//! Project schema types for `munge.toml`
//!
//! Defines the project model (categories, children, sound layout) and the
//! project configuration, together with the validation rules applied when a
//! project file is loaded.

use crate::build::tool_set::ToolSet;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Target platform of a munge.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    #[default]
    Pc,
    Ps2,
    Xbox,
}

impl Platform {
    /// Name as used in directory names and tool command lines.
    pub fn as_str(self) -> &'static str {
        match self {
            Platform::Pc => "PC",
            Platform::Ps2 => "PS2",
            Platform::Xbox => "XBOX",
        }
    }

    /// Lowercase token expected by the sound tools.
    pub fn sound_token(self) -> &'static str {
        match self {
            Platform::Pc => "pc",
            Platform::Ps2 => "ps2",
            Platform::Xbox => "xbox",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Platforms a custom command runs for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlatformFilter {
    #[default]
    All,
    Pc,
    Ps2,
    Xbox,
}

impl PlatformFilter {
    /// Check if a command with this filter runs for `platform`.
    pub fn matches(self, platform: Platform) -> bool {
        match self {
            PlatformFilter::All => true,
            PlatformFilter::Pc => platform == Platform::Pc,
            PlatformFilter::Ps2 => platform == Platform::Ps2,
            PlatformFilter::Xbox => platform == Platform::Xbox,
        }
    }
}

/// A user-supplied command run after a phase's built-in tools.
///
/// The first whitespace-separated token names the executable, resolved
/// against the ToolsFL bin directory when relative. The placeholders
/// `{source}`, `{output}`, `{lvl_output}`, `{project}` and `{platform}` are
/// substituted from the phase's context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomCommand {
    pub command_line: String,
    #[serde(default)]
    pub platform_filter: PlatformFilter,
    /// Launch without waiting for the command or capturing its output
    #[serde(default)]
    pub detach: bool,
}

impl CustomCommand {
    pub fn new(command_line: impl Into<String>) -> Self {
        Self { command_line: command_line.into(), platform_filter: PlatformFilter::All, detach: false }
    }
}

/// Custom commands per phase.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomCommands {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub common: Vec<CustomCommand>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub common_pack: Vec<CustomCommand>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub common_mission_child_pack: Vec<CustomCommand>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub common_mission_pack: Vec<CustomCommand>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub common_fpm_pack: Vec<CustomCommand>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub load: Vec<CustomCommand>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub load_pack: Vec<CustomCommand>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub shell: Vec<CustomCommand>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub shell_pack: Vec<CustomCommand>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub shell_ps2_pack: Vec<CustomCommand>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub side: Vec<CustomCommand>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub side_child_pack: Vec<CustomCommand>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub side_pack: Vec<CustomCommand>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub side_fpm_pack: Vec<CustomCommand>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub world: Vec<CustomCommand>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub world_pack: Vec<CustomCommand>,
}

/// Extra directories removed by a clean, relative to the project directory.
///
/// `side` and `world` entries may contain `{name}`, replaced by each active
/// child's name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomCleanDirectories {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub common: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub load: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub shell: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub side: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub world: Vec<String>,
}

/// Project-wide munge configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Directory holding the ToolsFL executables
    #[serde(default)]
    pub toolsfl_bin: PathBuf,
    #[serde(default)]
    pub platform: Platform,
    /// Run the built-in tool lists; custom commands always run
    #[serde(default = "default_true")]
    pub use_builtin_tools: bool,
    #[serde(default, skip_serializing_if = "is_default")]
    pub custom_commands: CustomCommands,
    #[serde(default, skip_serializing_if = "is_default")]
    pub custom_clean_directories: CustomCleanDirectories,
    #[serde(default, skip_serializing_if = "ToolSet::is_builtin")]
    pub tools: ToolSet,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            toolsfl_bin: PathBuf::new(),
            platform: Platform::default(),
            use_builtin_tools: true,
            custom_commands: CustomCommands::default(),
            custom_clean_directories: CustomCleanDirectories::default(),
            tools: ToolSet::default(),
        }
    }
}

fn default_true() -> bool {
    true
}

/// Current project file format version.
pub const PROJECT_FILE_VERSION: u32 = 1;

fn default_version() -> u32 {
    PROJECT_FILE_VERSION
}

fn is_default<T: Default + PartialEq>(value: &T) -> bool {
    *value == T::default()
}

/// A side or world directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectChild {
    pub name: String,
    #[serde(default = "default_true")]
    pub active: bool,
}

impl ProjectChild {
    /// Create an active child.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), active: true }
    }
}

/// A shared sound directory under `Sound/`.
///
/// Shared directories are always munged when sound is active, since world
/// sound packs read their output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoundShared {
    pub name: String,
    #[serde(default)]
    pub localized: bool,
}

impl SoundShared {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), localized: false }
    }
}

/// A per-world sound directory under `Sound/worlds/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoundWorld {
    pub name: String,
    #[serde(default = "default_true")]
    pub active: bool,
    #[serde(default)]
    pub localized: bool,
}

impl SoundWorld {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), active: true, localized: false }
    }
}

/// A sound localization and the directory its output is written to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoundLocalization {
    /// Language suffix, matched against `.stm_<language>` files
    pub language: String,
    /// Output subdirectory, relative to the output and lvl directories
    pub output_directory: PathBuf,
}

/// A content project and what to munge from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    /// Project directory; not stored in the project file
    #[serde(skip)]
    pub directory: PathBuf,
    /// Project file format version
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default = "default_true")]
    pub deploy: bool,
    #[serde(default = "default_true")]
    pub addme_active: bool,
    #[serde(default = "default_true")]
    pub common_active: bool,
    #[serde(default)]
    pub load_active: bool,
    #[serde(default)]
    pub shell_active: bool,
    #[serde(default)]
    pub sound_active: bool,
    #[serde(default)]
    pub sound_common_bank: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sides: Vec<ProjectChild>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub worlds: Vec<ProjectChild>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sound_shared: Vec<SoundShared>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sound_worlds: Vec<SoundWorld>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sound_localizations: Vec<SoundLocalization>,
    #[serde(default)]
    pub config: ProjectConfig,
}

impl Project {
    /// Create a project rooted at `directory` with default settings.
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            version: PROJECT_FILE_VERSION,
            deploy: true,
            addme_active: true,
            common_active: true,
            load_active: false,
            shell_active: false,
            sound_active: false,
            sound_common_bank: false,
            sides: vec![],
            worlds: vec![],
            sound_shared: vec![],
            sound_worlds: vec![],
            sound_localizations: vec![],
            config: ProjectConfig::default(),
        }
    }

    /// Validate the project and return any errors
    pub fn validate(&self) -> Vec<ProjectValidationError> {
        let mut errors = Vec::new();

        check_names(&mut errors, "sides", self.sides.iter().map(|c| c.name.as_str()));
        check_names(&mut errors, "worlds", self.worlds.iter().map(|c| c.name.as_str()));
        check_names(&mut errors, "sound_shared", self.sound_shared.iter().map(|c| c.name.as_str()));
        check_names(&mut errors, "sound_worlds", self.sound_worlds.iter().map(|c| c.name.as_str()));

        for (index, localization) in self.sound_localizations.iter().enumerate() {
            if localization.language.trim().is_empty() {
                errors.push(ProjectValidationError {
                    field: format!("sound_localizations[{}].language", index),
                    message: "must be a non-empty string".to_string(),
                });
            }
            if localization.output_directory.as_os_str().is_empty() {
                errors.push(ProjectValidationError {
                    field: format!("sound_localizations[{}].output_directory", index),
                    message: "must be a non-empty path".to_string(),
                });
            }
        }

        let commands = &self.config.custom_commands;
        let all_commands = [
            &commands.common,
            &commands.common_pack,
            &commands.common_mission_child_pack,
            &commands.common_mission_pack,
            &commands.common_fpm_pack,
            &commands.load,
            &commands.load_pack,
            &commands.shell,
            &commands.shell_pack,
            &commands.shell_ps2_pack,
            &commands.side,
            &commands.side_child_pack,
            &commands.side_pack,
            &commands.side_fpm_pack,
            &commands.world,
            &commands.world_pack,
        ];
        if all_commands.iter().flat_map(|list| list.iter()).any(|c| c.command_line.trim().is_empty())
        {
            errors.push(ProjectValidationError {
                field: "config.custom_commands".to_string(),
                message: "command lines must be non-empty".to_string(),
            });
        }

        errors
    }
}

fn check_names<'a>(
    errors: &mut Vec<ProjectValidationError>,
    field: &str,
    names: impl Iterator<Item = &'a str>,
) {
    let mut seen: Vec<String> = Vec::new();

    for name in names {
        if name.trim().is_empty() {
            errors.push(ProjectValidationError {
                field: field.to_string(),
                message: "names must be non-empty".to_string(),
            });
            continue;
        }

        let folded = name.to_ascii_lowercase();
        if seen.contains(&folded) {
            errors.push(ProjectValidationError {
                field: field.to_string(),
                message: format!("duplicate name '{}'", name),
            });
        } else {
            seen.push(folded);
        }
    }
}

/// Project validation error
#[derive(Debug, Clone)]
pub struct ProjectValidationError {
    /// Path to the invalid field (e.g., "sound_localizations[0].language")
    pub field: String,
    /// Error message
    pub message: String,
}

impl fmt::Display for ProjectValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "munge.toml: '{}' {}", self.field, self.message)
    }
}
