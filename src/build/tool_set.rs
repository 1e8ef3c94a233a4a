//! The catalogue of tool lists run by each munge phase.

use super::tool::{
    ConfigEffectsMungeInputs, FontMungeInputs, LevelPackInputs, ScriptMungeInputs,
    SoundMungeInputs, Tool, WorldMungeInputs,
};
use serde::{Deserialize, Serialize};

/// Ordered tool lists for every phase of a munge.
///
/// [`ToolSet::default`] is the built-in catalogue. Lists named in
/// `munge.toml` replace the built-in list of the same name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolSet {
    /// Manifests, relative to the common output directory, handed to every
    /// pack that may reference common content
    pub common_files: Vec<String>,
    pub addme: Vec<Tool>,
    pub common: Vec<Tool>,
    pub common_pack: Vec<Tool>,
    pub common_mission_child_pack: Vec<Tool>,
    pub common_mission_pack: Vec<Tool>,
    pub common_fpm_pack: Vec<Tool>,
    pub load: Vec<Tool>,
    pub load_pack: Vec<Tool>,
    pub shell: Vec<Tool>,
    pub shell_pack: Vec<Tool>,
    pub shell_ps2_pack: Vec<Tool>,
    pub side: Vec<Tool>,
    pub side_child_pack: Vec<Tool>,
    pub side_pack: Vec<Tool>,
    pub side_fpm_pack: Vec<Tool>,
    pub world: Vec<Tool>,
    pub world_pack: Vec<Tool>,
}

/// Manifest of the core pack, the only common manifest the load phase uses.
pub const CORE_FILES: &str = "core.files";
/// Manifest of in-game content, excluded from the shell phase.
pub const INGAME_FILES: &str = "ingame.files";

fn level_pack(inputs: LevelPackInputs) -> Tool {
    Tool::LevelPack(inputs)
}

fn effects(effects_directory_only: bool) -> Tool {
    Tool::ConfigEffectsMunge(ConfigEffectsMungeInputs { effects_directory_only })
}

fn script(scripts_directory_only: bool) -> Tool {
    Tool::ScriptMunge(ScriptMungeInputs { scripts_directory_only })
}

fn font(fonts_directory_only: bool) -> Tool {
    Tool::FontMunge(FontMungeInputs { fonts_directory_only })
}

fn world(layers: bool) -> Tool {
    Tool::WorldMunge(WorldMungeInputs { layers })
}

impl ToolSet {
    /// Check if this is exactly the built-in catalogue.
    pub fn is_builtin(&self) -> bool {
        *self == ToolSet::default()
    }

    /// The same common files with every tool list empty.
    pub fn without_tools(&self) -> ToolSet {
        ToolSet {
            common_files: self.common_files.clone(),
            addme: vec![],
            common: vec![],
            common_pack: vec![],
            common_mission_child_pack: vec![],
            common_mission_pack: vec![],
            common_fpm_pack: vec![],
            load: vec![],
            load_pack: vec![],
            shell: vec![],
            shell_pack: vec![],
            shell_ps2_pack: vec![],
            side: vec![],
            side_child_pack: vec![],
            side_pack: vec![],
            side_fpm_pack: vec![],
            world: vec![],
            world_pack: vec![],
        }
    }
}

impl Default for ToolSet {
    fn default() -> Self {
        let side_common_input = vec![r"_BUILD\Sides\Common\MUNGED".to_string()];
        let world_common_input = vec![r"_BUILD\Worlds\Common\MUNGED".to_string()];

        Self {
            common_files: vec![CORE_FILES.into(), "common.files".into(), INGAME_FILES.into()],

            addme: vec![script(false)],

            common: vec![
                Tool::CopyPremunged,
                Tool::OdfMunge,
                effects(false),
                Tool::ConfigComboMunge,
                script(false),
                Tool::ConfigMovieMunge,
                Tool::ConfigSoldierAnimationMunge,
                Tool::ConfigHudMunge,
                font(false),
                Tool::TextureMunge,
                Tool::ModelMunge,
                Tool::ShaderMunge,
                Tool::ConfigSoundCommonMunge,
                Tool::SoundMunge(SoundMungeInputs {
                    sound_child_directory: true,
                    ..Default::default()
                }),
                Tool::SoundMunge(SoundMungeInputs {
                    stream: true,
                    sound_child_directory: true,
                    ..Default::default()
                }),
                Tool::LocalizeMunge,
            ],

            common_pack: vec![
                level_pack(LevelPackInputs::request("core.req").with_write_files(CORE_FILES)),
                level_pack(LevelPackInputs::request("common.req").with_write_files("common.files")),
                level_pack(LevelPackInputs::request("ingame.req").with_write_files(INGAME_FILES)),
                level_pack(
                    LevelPackInputs::request("inshell.req").with_write_files("inshell.files"),
                ),
                level_pack(LevelPackInputs::request("MISSION.req")),
            ],

            common_mission_child_pack: vec![level_pack(LevelPackInputs {
                child_levels: true,
                source_directory: Some("MISSION".into()),
                ..Default::default()
            })],

            common_mission_pack: vec![level_pack(LevelPackInputs::request("MISSION.req"))],

            common_fpm_pack: vec![level_pack(LevelPackInputs {
                source_directory: Some(r"REQ\FPM".into()),
                ..Default::default()
            })],

            load: vec![Tool::ConfigLoadMunge, Tool::TextureMunge, Tool::ModelMunge],

            load_pack: vec![Tool::LoadPack, level_pack(LevelPackInputs::request(r"req\load.req"))],

            shell: vec![
                Tool::ConfigMovieMunge,
                Tool::MovieMunge,
                effects(true),
                script(true),
                font(true),
                Tool::TextureMunge,
                Tool::ModelMunge,
                Tool::BinPs2Munge,
            ],

            shell_pack: vec![level_pack(LevelPackInputs::request("shell.req"))],

            shell_ps2_pack: vec![level_pack(LevelPackInputs::request("shellps2.req"))],

            side: vec![
                Tool::CopyPremunged,
                Tool::OdfMunge,
                effects(true),
                Tool::ConfigComboMunge,
                Tool::ConfigHudMunge,
                Tool::ModelMunge,
                Tool::TextureMunge,
                Tool::ConfigSoundCommonMunge,
            ],

            side_child_pack: vec![level_pack(LevelPackInputs {
                child_levels: true,
                source_directory: Some("REQ".into()),
                extra_input_directories: side_common_input.clone(),
                ..Default::default()
            })],

            side_pack: vec![level_pack(LevelPackInputs {
                extra_input_directories: side_common_input,
                ..Default::default()
            })],

            side_fpm_pack: vec![level_pack(LevelPackInputs {
                source_directory: Some(r"REQ\FPM".into()),
                ..Default::default()
            })],

            world: vec![
                Tool::CopyPremunged,
                Tool::OdfMunge,
                Tool::ModelMunge,
                Tool::TextureMunge,
                Tool::TerrainMunge,
                world(false),
                world(true),
                Tool::PathMunge,
                Tool::PathPlanningMunge,
                effects(true),
                Tool::ConfigComboMunge,
                Tool::ConfigSkyMunge,
                Tool::ConfigEnvEffectsMunge,
                Tool::ConfigPropMunge,
                Tool::ConfigBoundaryMunge,
                Tool::ConfigSoundWorldMunge,
                Tool::ConfigLightMunge,
                Tool::ConfigPvsMunge,
            ],

            world_pack: vec![
                level_pack(LevelPackInputs {
                    only_files: true,
                    write_files: Some("MZ.files".into()),
                    extra_input_directories: world_common_input.clone(),
                    ..Default::default()
                }),
                level_pack(LevelPackInputs {
                    child_levels: true,
                    mrq_input: true,
                    extra_input_directories: world_common_input.clone(),
                    extra_common_files: vec!["MZ.files".into()],
                    ..Default::default()
                }),
                level_pack(LevelPackInputs {
                    extra_input_directories: world_common_input,
                    ..Default::default()
                }),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_common_files_default() {
        let tools = ToolSet::default();
        assert_eq!(tools.common_files, vec!["core.files", "common.files", "ingame.files"]);
    }

    #[test]
    fn test_common_pack_writes_manifests() {
        let tools = ToolSet::default();
        let written: Vec<_> = tools
            .common_pack
            .iter()
            .filter_map(|tool| match tool {
                Tool::LevelPack(inputs) => inputs.write_files.clone(),
                _ => None,
            })
            .collect();

        assert_eq!(written, vec!["core.files", "common.files", "ingame.files", "inshell.files"]);
    }

    #[test]
    fn test_world_pack_stages() {
        let tools = ToolSet::default();
        assert_eq!(tools.world_pack.len(), 3);
        match &tools.world_pack[1] {
            Tool::LevelPack(inputs) => {
                assert!(inputs.child_levels);
                assert!(inputs.mrq_input);
                assert_eq!(inputs.extra_common_files, vec!["MZ.files"]);
            }
            other => panic!("unexpected tool {}", other),
        }
    }

    #[test]
    fn test_partial_override_keeps_other_lists() {
        let text = r#"
[[load]]
type = "texture_munge"
"#;
        let tools: ToolSet = toml::from_str(text).unwrap();

        assert_eq!(tools.load, vec![Tool::TextureMunge]);
        assert_eq!(tools.common, ToolSet::default().common);
        assert!(!tools.is_builtin());
    }
}
