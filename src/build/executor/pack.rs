//! Level packing.

use super::{munge_process, run_process};
use crate::build::context::ToolContext;
use crate::build::host::{join_relative, LaunchError};
use crate::build::message::Message;
use crate::build::tool::LevelPackInputs;

const LOAD_PACK_TOOL: &str = "LoadPack";

/// Build the `LevelPack` command line for a pack.
pub(crate) fn level_pack_command_line(inputs: &LevelPackInputs, context: &ToolContext) -> String {
    let common_files = if inputs.extra_common_files.is_empty() && context.common_files.is_empty() {
        String::new()
    } else {
        let mut common_files = String::from("-common");
        for file in &context.common_files {
            common_files.push_str(&format!(" {}", file.display()));
        }
        for file in &inputs.extra_common_files {
            common_files.push_str(&format!(" {}", join_relative(&context.output_path, file).display()));
        }
        common_files
    };

    let write_files = inputs
        .write_files
        .as_deref()
        .map(|file| format!("-writefiles {}", join_relative(&context.output_path, file).display()))
        .unwrap_or_default();

    let mut input_directories = format!("-inputdir {}", context.output_path.display());
    for directory in &inputs.extra_input_directories {
        let directory = join_relative(&context.project_path, directory).join(context.platform.as_str());
        input_directories.push_str(&format!(" {}", directory.display()));
    }

    let input_file = match (&inputs.input_file, inputs.mrq_input) {
        (Some(file), _) => file.clone(),
        (None, true) => "*.mrq".to_string(),
        (None, false) => "*.req".to_string(),
    };

    let only_files = if inputs.only_files { "-onlyfiles" } else { "" };

    let source_directory = match &inputs.source_directory {
        Some(directory) => join_relative(&context.source_path, directory),
        None => context.source_path.clone(),
    };

    let output_directory =
        if inputs.child_levels { &context.output_path } else { &context.lvl_output_path };

    format!(
        "-inputfile {} {} {} {} -platform {} -sourcedir {} {} -outputdir {}",
        input_file,
        common_files,
        only_files,
        write_files,
        context.platform,
        source_directory.display(),
        input_directories,
        output_directory.display()
    )
}

/// Pack levels from requests in the source directory.
pub fn execute_level_pack(inputs: &LevelPackInputs, context: &ToolContext) -> Result<(), LaunchError> {
    run_process(
        context,
        munge_process(
            context.tool_path("LevelPack"),
            level_pack_command_line(inputs, context),
            &context.toolsfl_bin_path,
        ),
        |feedback, stderr| feedback.parse_error_string(stderr, &context.source_path),
    )
}

fn texture_request(stem: &str) -> String {
    format!("ucft\n{{\n   REQN\n   {{\n      \"texture\"\n      \"{}\"\n   }}\n}}\n", stem)
}

fn level_request(textures: &[String]) -> String {
    let mut request = String::from("ucft\n{\n   REQN\n   {\n      \"lvl\"\n");
    for texture in textures {
        request.push_str(&format!("      \"{}\"\n", texture));
    }
    request.push_str("   }\n}\n");
    request
}

/// Pack load screen backdrops.
///
/// Every `backdrops/*.tga` is packed into its own child level, then every
/// `backdrops/<set>/` directory into a level containing that set's textures.
/// Requests are generated into a temporary `__TEMP__` directory that is
/// removed afterwards.
pub fn execute_load_pack(context: &ToolContext) -> Result<(), LaunchError> {
    let fs = &context.host.fs;
    let temp_path = context.source_path.join("__TEMP__");
    let backdrops_path = context.source_path.join("backdrops");

    if let Err(e) = fs.create_directories(&temp_path) {
        tracing::warn!(path = %temp_path.display(), error = %e, "failed to create load pack directory");
        context.feedback.add_error(Message::new(
            &temp_path,
            LOAD_PACK_TOOL,
            "Failed to create temporary directory.",
        ));
        return Ok(());
    }

    let pack_context = context.with_source_path(&temp_path);

    let write_request = |path: &std::path::Path, contents: String| -> bool {
        match fs.write(path, contents.as_bytes()) {
            Ok(()) => true,
            Err(e) => {
                context.feedback.add_error(Message::new(
                    path,
                    LOAD_PACK_TOOL,
                    format!("Failed to create .req file for packing.\n   Reason: {}", e),
                ));
                false
            }
        }
    };

    let mut requests = Vec::new();
    for texture in context.host.list_files_with_extension(&backdrops_path, "tga") {
        let request_path = temp_path.join(format!("{}.req", texture.stem()));
        if write_request(&request_path, texture_request(&texture.stem())) {
            requests.push(request_path);
        }
    }

    let child_pack = LevelPackInputs { child_levels: true, ..Default::default() };
    let result = execute_level_pack(&child_pack, &pack_context);
    remove_temporary_files(context, &requests);
    result?;

    let mut requests = Vec::new();
    for set in context.host.list(&backdrops_path).into_iter().filter(|entry| entry.is_dir) {
        let textures: Vec<String> = context
            .host
            .list_files_with_extension(&set.path, "tga")
            .iter()
            .map(|texture| texture.stem())
            .collect();

        let request_path = temp_path.join(format!("{}.req", set.name()));
        if write_request(&request_path, level_request(&textures)) {
            requests.push(request_path);
        }
    }

    let result = execute_level_pack(&LevelPackInputs::default(), &pack_context);
    remove_temporary_files(context, &requests);

    if fs.remove_dir(&temp_path).is_err() && fs.exists(&temp_path) {
        context.feedback.add_warning(Message::new(
            &temp_path,
            LOAD_PACK_TOOL,
            "Failed to remove temporary directory.",
        ));
    }

    result
}

fn remove_temporary_files(context: &ToolContext, files: &[std::path::PathBuf]) {
    for file in files {
        if context.host.fs.remove_file(file).is_err() && context.host.fs.exists(file) {
            context.feedback.add_warning(Message::new(
                file,
                LOAD_PACK_TOOL,
                "Failed to remove temporary file.",
            ));
        }
    }
}
