//! Integration tests for project discovery and `munge.toml`.

mod common;

use common::create_dirs;
use lvlmunge::build::{open_project, scan_project, Host};
use lvlmunge::cli::init_project;
use lvlmunge::config::loader::{load_project_file, project_file_path, CliOverrides};
use lvlmunge::config::{CustomCommand, Platform, PlatformFilter, SoundLocalization, SoundWorld};
use std::fs;
use tempfile::TempDir;

#[test]
fn test_init_then_open_keeps_edits() {
    let temp = TempDir::new().unwrap();
    create_dirs(temp.path(), &["Sides/Common", "Sides/REP", "Worlds/TST", "Sound/worlds/tst"]);
    let host = Host::system();

    let overrides = CliOverrides { toolsfl_bin: Some("C:/BF2_ModTools/ToolsFL/bin".into()), platform: None };
    let path = init_project(&host, temp.path(), &overrides, false).unwrap();
    assert_eq!(path, project_file_path(temp.path()));

    let mut edited = load_project_file(&path).unwrap();
    edited.sides[1].active = false;
    edited.sound_worlds = vec![SoundWorld { name: "TST".into(), active: true, localized: true }];
    edited.sound_localizations =
        vec![SoundLocalization { language: "fr".into(), output_directory: "FR".into() }];
    edited.config.platform = Platform::Ps2;
    let mut command = CustomCommand::new("Deploy.exe {platform}");
    command.platform_filter = PlatformFilter::Ps2;
    edited.config.custom_commands.world_pack = vec![command];
    fs::write(&path, toml::to_string_pretty(&edited).unwrap()).unwrap();

    let project = open_project(&host, temp.path()).unwrap();

    let sides: Vec<_> = project.sides.iter().map(|side| (side.name.as_str(), side.active)).collect();
    assert_eq!(sides, vec![("Common", true), ("REP", false)]);
    assert_eq!(project.sound_worlds, vec![SoundWorld { name: "tst".into(), active: true, localized: true }]);
    assert_eq!(project.sound_localizations.len(), 1);
    assert_eq!(project.config.platform, Platform::Ps2);
    assert_eq!(project.config.custom_commands.world_pack.len(), 1);
    assert_eq!(project.directory, temp.path());
}

#[test]
fn test_new_children_on_disk_are_active() {
    let temp = TempDir::new().unwrap();
    create_dirs(temp.path(), &["Worlds/TST"]);
    let host = Host::system();
    init_project(&host, temp.path(), &CliOverrides::default(), false).unwrap();

    create_dirs(temp.path(), &["Worlds/END"]);
    let project = open_project(&host, temp.path()).unwrap();

    assert_eq!(project.worlds.len(), 2);
    assert!(project.worlds.iter().all(|world| world.active));
}

#[test]
fn test_scan_without_project_file_uses_defaults() {
    let temp = TempDir::new().unwrap();
    create_dirs(temp.path(), &["Sound/global", "Sound/International"]);

    let project = scan_project(&Host::system(), temp.path());

    assert!(project.addme_active);
    assert!(project.common_active);
    assert!(!project.load_active);
    assert!(project.config.tools.is_builtin());
    assert_eq!(project.sound_shared.len(), 1);
    assert_eq!(project.sound_shared[0].name, "global");
}
