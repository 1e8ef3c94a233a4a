//! Munge and clean jobs.
//!
//! A munge walks the project's categories in a fixed order: addme, common,
//! load, shell, each side, each world, then sound. Every category derives
//! its directories from the project root, creates them, and runs its tool
//! lists in catalogue order followed by the matching custom commands. A
//! category whose directories cannot be created is recorded as one error and
//! skipped; later categories still run.
//!
//! A clean deletes the files of the same directories and the level files the
//! packs produced.

use super::context::ToolContext;
use super::executor::{
    execute_custom_command, execute_sound_common_bank_munge, execute_sound_directory_children_pack,
    execute_sound_directory_munge, execute_sound_directory_pack, execute_tool, SoundDirectoryMunge,
    SoundDirectoryPack, COMMON_BANK_NAME,
};
use super::feedback::Feedback;
use super::host::{has_extension, join_relative, Host, LaunchError};
use super::message::{Message, Report};
use super::tool::Tool;
use super::tool_set::{ToolSet, CORE_FILES, INGAME_FILES};
use crate::config::{CustomCommand, Platform, Project, SoundLocalization};
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;
use thiserror::Error;

/// Error escaping a munge or clean job.
///
/// Everything a tool reports is folded into the job's [`Report`]; only these
/// end a job early.
#[derive(Debug, Error)]
pub enum MungeError {
    /// A ToolsFL executable could not be started
    #[error(transparent)]
    Launch(#[from] LaunchError),
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

const CLEAN_TOOL: &str = "Clean";
const CLEAN_MESSAGE: &str = "Failed to delete file.";

fn project_directory_exists(project: &Project, host: &Host) -> Result<(), MungeError> {
    if host.fs.is_dir(&project.directory) {
        Ok(())
    } else {
        Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("project directory {} does not exist", project.directory.display()),
        )
        .into())
    }
}

/// Run a tool list and then the custom commands of the same phase.
fn run_tools(
    tools: &[Tool],
    commands: &[CustomCommand],
    context: &ToolContext,
) -> Result<(), LaunchError> {
    for tool in tools {
        tracing::debug!(tool = %tool, source = %context.source_path.display(), "running tool");
        execute_tool(tool, context)?;
    }

    for command in commands {
        execute_custom_command(command, context)?;
    }

    Ok(())
}

fn localizations_if(localized: bool, project: &Project) -> &[SoundLocalization] {
    if localized {
        &project.sound_localizations
    } else {
        &[]
    }
}

/// Directory templates of a munge, relative to the project.
struct Layout<'a> {
    project: &'a Path,
    platform: Platform,
}

impl Layout<'_> {
    fn path(&self, relative: &str) -> PathBuf {
        join_relative(self.project, relative)
    }

    fn build(&self, category: &str) -> PathBuf {
        self.path(&format!(r"_BUILD\{}\MUNGED\{}", category, self.platform))
    }

    fn lvl(&self, relative: &str) -> PathBuf {
        self.path(&format!(r"_LVL_{}\{}", self.platform, relative))
    }
}

/// Run a munge of `project` for its configured platform.
pub fn run_munge(project: &Project, feedback: &Feedback, host: &Host) -> Result<Report, MungeError> {
    let timer = Instant::now();
    project_directory_exists(project, host)?;

    let platform = project.config.platform;
    let layout = Layout { project: &project.directory, platform };
    let disabled;
    let tools = if project.config.use_builtin_tools {
        &project.config.tools
    } else {
        disabled = project.config.tools.without_tools();
        &disabled
    };

    tracing::info!(project = %project.directory.display(), %platform, "munge started");

    let mut root = ToolContext::new(project, platform, feedback, host);
    let common_output_path = layout.build("Common");
    root.common_files =
        tools.common_files.iter().map(|file| join_relative(&common_output_path, file)).collect();

    if project.addme_active {
        munge_addme(tools, &layout, &root)?;
    }
    if project.common_active {
        munge_common(project, tools, &layout, &root)?;
    }
    if project.load_active {
        munge_load(project, tools, &layout, &root)?;
    }
    if project.shell_active {
        munge_shell(project, tools, &layout, &root)?;
    }
    for side in project.sides.iter().filter(|side| side.active) {
        munge_side(project, tools, &layout, &root, &side.name)?;
    }
    for world in project.worlds.iter().filter(|world| world.active) {
        munge_world(project, tools, &layout, &root, &world.name)?;
    }
    if project.sound_active {
        munge_sound(project, &layout, &root)?;
    }

    let elapsed = timer.elapsed();
    feedback.print_output("Munge Finished");
    feedback.print_output(format!("Time Taken: {:.3}s", elapsed.as_secs_f64()));
    tracing::info!(elapsed = ?elapsed, "munge finished");

    Ok(feedback.take_report())
}

fn munge_addme(
    tools: &ToolSet,
    layout: &Layout,
    root: &ToolContext,
) -> Result<(), LaunchError> {
    let context = ToolContext {
        source_path: layout.path("addme"),
        output_path: layout.path(r"addme\munged"),
        ..root.clone()
    };

    if !context.create_directory(&context.output_path) {
        return Ok(());
    }

    run_tools(&tools.addme, &[], &context)
}

fn munge_common(
    project: &Project,
    tools: &ToolSet,
    layout: &Layout,
    root: &ToolContext,
) -> Result<(), LaunchError> {
    let commands = &project.config.custom_commands;
    let context = ToolContext {
        source_path: layout.path("Common"),
        output_path: layout.build("Common"),
        lvl_output_path: layout.path(&format!("_LVL_{}", layout.platform)),
        common_files: vec![],
        ..root.clone()
    };

    if !context.create_output_directories() {
        return Ok(());
    }

    run_tools(&tools.common, &commands.common, &context)?;
    run_tools(&tools.common_pack, &commands.common_pack, &context)?;

    let post_pack_context =
        ToolContext { common_files: root.common_files.clone(), ..context.clone() };
    run_tools(
        &tools.common_mission_child_pack,
        &commands.common_mission_child_pack,
        &post_pack_context,
    )?;
    run_tools(&tools.common_mission_pack, &commands.common_mission_pack, &context)?;

    let fpm_context = ToolContext {
        lvl_output_path: post_pack_context.lvl_output_path.join("FPM").join("COM"),
        ..post_pack_context
    };
    if !fpm_context.create_output_directories() {
        return Ok(());
    }
    run_tools(&tools.common_fpm_pack, &commands.common_fpm_pack, &fpm_context)
}

fn munge_load(
    project: &Project,
    tools: &ToolSet,
    layout: &Layout,
    root: &ToolContext,
) -> Result<(), LaunchError> {
    let commands = &project.config.custom_commands;
    let context = ToolContext {
        source_path: layout.path("Load"),
        output_path: layout.build("Load"),
        lvl_output_path: layout.lvl("load"),
        common_files: root
            .common_files
            .iter()
            .filter(|file| file_name_is(file, CORE_FILES))
            .cloned()
            .collect(),
        ..root.clone()
    };

    if !context.create_output_directories() {
        return Ok(());
    }

    run_tools(&tools.load, &commands.load, &context)?;
    run_tools(&tools.load_pack, &commands.load_pack, &context)
}

fn munge_shell(
    project: &Project,
    tools: &ToolSet,
    layout: &Layout,
    root: &ToolContext,
) -> Result<(), LaunchError> {
    let commands = &project.config.custom_commands;
    let context = ToolContext {
        source_path: layout.path("Shell"),
        output_path: layout.build("Shell"),
        lvl_output_path: layout.path(&format!("_LVL_{}", layout.platform)),
        common_files: root
            .common_files
            .iter()
            .filter(|file| !file_name_is(file, INGAME_FILES))
            .cloned()
            .collect(),
        ..root.clone()
    };

    if !context.create_output_directories() {
        return Ok(());
    }

    run_tools(&tools.shell, &commands.shell, &context)?;
    run_tools(&tools.shell_pack, &commands.shell_pack, &context)?;

    if context.platform == Platform::Ps2 {
        run_tools(&tools.shell_ps2_pack, &commands.shell_ps2_pack, &context)?;
    }

    Ok(())
}

fn munge_side(
    project: &Project,
    tools: &ToolSet,
    layout: &Layout,
    root: &ToolContext,
    name: &str,
) -> Result<(), LaunchError> {
    let commands = &project.config.custom_commands;
    let context = ToolContext {
        source_path: layout.path(&format!(r"Sides\{}", name)),
        output_path: layout.build(&format!(r"Sides\{}", name)),
        lvl_output_path: layout.lvl("side"),
        ..root.clone()
    };

    if !context.create_output_directories() {
        return Ok(());
    }

    run_tools(&tools.side, &commands.side, &context)?;
    run_tools(&tools.side_child_pack, &commands.side_child_pack, &context)?;

    if is_common(name) {
        return Ok(());
    }

    run_tools(&tools.side_pack, &commands.side_pack, &context)?;

    let fpm_context =
        ToolContext { lvl_output_path: layout.lvl(&format!(r"FPM\{}", name)), ..context };
    if !fpm_context.create_directory(&fpm_context.lvl_output_path) {
        return Ok(());
    }
    run_tools(&tools.side_fpm_pack, &commands.side_fpm_pack, &fpm_context)
}

fn munge_world(
    project: &Project,
    tools: &ToolSet,
    layout: &Layout,
    root: &ToolContext,
    name: &str,
) -> Result<(), LaunchError> {
    let commands = &project.config.custom_commands;
    let context = ToolContext {
        source_path: layout.path(&format!(r"Worlds\{}", name)),
        output_path: layout.build(&format!(r"Worlds\{}", name)),
        lvl_output_path: layout.lvl(name),
        ..root.clone()
    };

    if !context.create_output_directories() {
        return Ok(());
    }

    run_tools(&tools.world, &commands.world, &context)?;

    if is_common(name) {
        return Ok(());
    }

    let world_directories = context
        .host
        .list(&context.source_path)
        .into_iter()
        .filter(|entry| entry.is_dir && starts_with_ignore_case(&entry.stem(), "World"));

    for entry in world_directories {
        let child_context = context.with_source_path(entry.path);
        run_tools(&tools.world_pack, &commands.world_pack, &child_context)?;
    }

    Ok(())
}

/// A sound directory and the contexts it munges and packs with.
struct SoundDirectory<'p, 'a> {
    name: &'p str,
    localizations: &'p [SoundLocalization],
    context: ToolContext<'a>,
}

impl<'p> SoundDirectory<'p, '_> {
    fn pack(&self, input_directories: &'p [PathBuf]) -> SoundDirectoryPack<'p> {
        SoundDirectoryPack {
            directory_name: self.name,
            localizations: self.localizations,
            input_directories,
        }
    }
}

fn munge_sound(project: &Project, layout: &Layout, root: &ToolContext) -> Result<(), LaunchError> {
    let create_common_bank = root.platform == Platform::Pc && project.sound_common_bank;
    let sound_directory = |source: String, build: String| ToolContext {
        source_path: layout.path(&source),
        output_path: layout.build(&build),
        lvl_output_path: layout.lvl("sound"),
        ..root.clone()
    };

    let shared: Vec<SoundDirectory> = project
        .sound_shared
        .iter()
        .map(|shared| SoundDirectory {
            name: &shared.name,
            localizations: localizations_if(shared.localized, project),
            context: sound_directory(
                format!(r"Sound\{}", shared.name),
                format!(r"Sound\{}", shared.name),
            ),
        })
        .collect();

    let worlds: Vec<SoundDirectory> = project
        .sound_worlds
        .iter()
        .filter(|world| world.active)
        .map(|world| SoundDirectory {
            name: &world.name,
            localizations: localizations_if(world.localized, project),
            context: sound_directory(
                format!(r"Sound\worlds\{}", world.name),
                format!(r"Sound\worlds\{}", world.name),
            ),
        })
        .collect();

    let mut input_directories = Vec::with_capacity(shared.len());

    for directory in &shared {
        if !directory.context.create_output_directories() {
            continue;
        }
        let munge = SoundDirectoryMunge {
            create_common_bank,
            localizations: directory.localizations,
        };
        execute_sound_directory_munge(&munge, &directory.context)?;
        input_directories.push(directory.context.output_path.clone());
    }

    for directory in &worlds {
        if !directory.context.create_output_directories() {
            continue;
        }
        let munge = SoundDirectoryMunge {
            create_common_bank,
            localizations: directory.localizations,
        };
        execute_sound_directory_munge(&munge, &directory.context)?;
    }

    for directory in &shared {
        let pack = directory.pack(&input_directories);
        execute_sound_directory_children_pack(&pack, &directory.context)?;
    }
    for directory in &shared {
        execute_sound_directory_pack(&directory.pack(&input_directories), &directory.context)?;
    }
    for directory in &worlds {
        let pack = directory.pack(&input_directories);
        // World child levels are localized whether or not the world itself is.
        let children_pack =
            SoundDirectoryPack { localizations: &project.sound_localizations, ..pack };
        execute_sound_directory_children_pack(&children_pack, &directory.context)?;
        execute_sound_directory_pack(&pack, &directory.context)?;
    }

    if create_common_bank {
        let context = ToolContext {
            source_path: layout.path("Sound"),
            lvl_output_path: layout.lvl("sound"),
            ..root.clone()
        };
        execute_sound_common_bank_munge(&context)?;
    }

    Ok(())
}

fn is_common(name: &str) -> bool {
    name.eq_ignore_ascii_case("Common")
}

fn starts_with_ignore_case(text: &str, prefix: &str) -> bool {
    text.get(..prefix.len()).is_some_and(|start| start.eq_ignore_ascii_case(prefix))
}

fn file_name_is(path: &Path, name: &str) -> bool {
    path.file_name().and_then(|n| n.to_str()).is_some_and(|n| n.eq_ignore_ascii_case(name))
}

/// Deletes munge output, recording failures as warnings.
struct Cleaner<'a> {
    project: &'a Path,
    feedback: &'a Feedback,
    host: &'a Host,
}

impl Cleaner<'_> {
    /// Delete the regular files directly inside a project-relative directory.
    fn clean_directory(&self, relative: &str) {
        self.feedback.print_output(format!("Cleaning {}", relative));

        let directory = join_relative(self.project, relative);
        for entry in self.host.list(&directory).into_iter().filter(|entry| !entry.is_dir) {
            self.remove(&entry.path);
        }
    }

    fn remove(&self, path: &Path) {
        if self.host.fs.remove_file(path).is_err() && self.host.fs.exists(path) {
            self.feedback.add_warning(Message::new(path, CLEAN_TOOL, CLEAN_MESSAGE));
        }
    }

    /// Delete the level files of the `.req` level packs of a tool list.
    fn clean_pack_levels(&self, tools: &[Tool], platform: Platform) {
        let lvl_directory = join_relative(self.project, &format!("_LVL_{}", platform));

        for tool in tools {
            let Tool::LevelPack(inputs) = tool else { continue };
            let Some(input_file) = inputs.input_file.as_deref() else { continue };
            let input_file = join_relative(Path::new(""), input_file);
            if !has_extension(&input_file, "req") {
                continue;
            }
            let Some(stem) = input_file.file_stem().map(|s| s.to_string_lossy().into_owned()) else {
                continue;
            };

            self.feedback.print_output(format!(r"Cleaning _LVL_{}\{}.lvl", platform, stem));
            self.remove(&lvl_directory.join(format!("{}.lvl", stem)));
        }
    }
}

/// Delete the output of every active category of `project`.
pub fn run_clean(project: &Project, feedback: &Feedback, host: &Host) -> Result<Report, MungeError> {
    let timer = Instant::now();
    project_directory_exists(project, host)?;

    let platform = project.config.platform;
    let tools = &project.config.tools;
    let custom = &project.config.custom_clean_directories;
    let cleaner = Cleaner { project: &project.directory, feedback, host };
    let layout = Layout { project: &project.directory, platform };

    tracing::info!(project = %project.directory.display(), %platform, "clean started");

    if project.addme_active {
        cleaner.clean_directory(r"addme\munged");
    }

    if project.common_active {
        cleaner.clean_directory(&format!(r"_BUILD\Common\MUNGED\{}", platform));
        cleaner.clean_directory(&format!(r"_LVL_{}\FPM\COM", platform));
        cleaner.clean_pack_levels(&tools.common_pack, platform);
        custom.common.iter().for_each(|directory| cleaner.clean_directory(directory));
    }

    if project.load_active {
        cleaner.clean_directory(&format!(r"_BUILD\Load\MUNGED\{}", platform));
        cleaner.clean_directory(&format!(r"_LVL_{}\load", platform));
        custom.load.iter().for_each(|directory| cleaner.clean_directory(directory));
    }

    if project.shell_active {
        cleaner.clean_directory(&format!(r"_BUILD\Shell\MUNGED\{}", platform));
        cleaner.clean_directory(&format!(r"_LVL_{}\Movies", platform));
        cleaner.clean_pack_levels(&tools.shell_pack, platform);
        custom.shell.iter().for_each(|directory| cleaner.clean_directory(directory));
    }

    for world in project.worlds.iter().filter(|world| world.active) {
        cleaner.clean_directory(&format!(r"_BUILD\Worlds\{}\MUNGED\{}", world.name, platform));
        cleaner.clean_directory(&format!(r"_LVL_{}\{}", platform, world.name));
        for directory in &custom.world {
            cleaner.clean_directory(&directory.replace("{name}", &world.name));
        }
    }

    for side in project.sides.iter().filter(|side| side.active) {
        cleaner.clean_directory(&format!(r"_BUILD\Sides\{}\MUNGED\{}", side.name, platform));
        cleaner.clean_directory(&format!(r"_LVL_{}\FPM\{}", platform, side.name));

        let requests =
            host.list_files_with_extension(&layout.path(&format!(r"Sides\{}", side.name)), "req");
        for request in requests {
            feedback.print_output(format!(r"Cleaning _LVL_{}\side\{}.lvl", platform, request.stem()));
            cleaner.remove(&layout.lvl(&format!(r"side\{}.lvl", request.stem())));
        }

        for directory in &custom.side {
            cleaner.clean_directory(&directory.replace("{name}", &side.name));
        }
    }

    if project.sound_active {
        let shared = project.sound_shared.iter().map(|shared| (&shared.name, shared.localized));
        let worlds = project
            .sound_worlds
            .iter()
            .filter(|world| world.active)
            .map(|world| (&world.name, world.localized));

        for (name, localized) in shared {
            cleaner.clean_directory(&format!(r"_BUILD\Sound\{}\MUNGED\{}", name, platform));
            clean_sound_levels(&cleaner, &layout, project, name, localized);
        }
        for (name, localized) in worlds {
            cleaner.clean_directory(&format!(r"_BUILD\Sound\worlds\{}\MUNGED\{}", name, platform));
            clean_sound_levels(&cleaner, &layout, project, name, localized);
        }

        if project.sound_common_bank && platform == Platform::Pc {
            cleaner.remove(&layout.lvl("sound").join(COMMON_BANK_NAME));
        }
    }

    let elapsed = timer.elapsed();
    feedback.print_output("Clean Finished");
    feedback.print_output(format!("Time Taken: {:.3}s", elapsed.as_secs_f64()));
    tracing::info!(elapsed = ?elapsed, "clean finished");

    Ok(feedback.take_report())
}

fn clean_sound_levels(
    cleaner: &Cleaner,
    layout: &Layout,
    project: &Project,
    name: &str,
    localized: bool,
) {
    let sound_lvl = layout.lvl("sound");
    cleaner.remove(&sound_lvl.join(format!("{}.lvl", name)));

    for localization in localizations_if(localized, project) {
        cleaner.remove(
            &sound_lvl.join(&localization.output_directory).join(format!("{}.lvl", name)),
        );
    }
}
