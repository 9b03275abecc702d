//! Resource staging stage.
//!
//! Flattens the per-type documentation tree into one staging directory and
//! prepares the shared resources every later stage reads.

use std::path::Path;

use walkdir::WalkDir;

use crate::build::paths::{IMAGES_DIR, SCRIPTS_DIR, STYLES_DIR, TEMPLATES_DIR};
use crate::build::pipeline::{BuildContext, BuildError, Stage};
use crate::build::runner::Invocation;
use crate::build::tokens::TokenValues;
use crate::util::{self, FsError};

/// Stage that rebuilds the staging directory from scratch.
///
/// After this stage the staging directory holds:
/// - `<name>.md` for every document of every type directory
/// - `images/` merged from every type's `images/` folder
/// - `scripts/` copied verbatim
/// - `styles/` with `.less` files compiled to `.css`
/// - `templates/` with the date and version tokens filled in
///
/// and `ctx.index` maps each document name to its type.
pub struct ResourceStage;

impl Stage for ResourceStage {
    fn name(&self) -> &'static str {
        "stage"
    }

    fn run(&self, ctx: &mut BuildContext) -> Result<(), BuildError> {
        let settings = ctx.settings;
        for dir in [
            &settings.docs_dir,
            &settings.scripts_dir,
            &settings.styles_dir,
            &settings.templates_dir,
        ] {
            if !dir.is_dir() {
                return Err(BuildError::MissingDirectory(dir.clone()));
            }
        }

        let staging = &settings.staging_dir;
        util::recreate_dir(staging)?;

        stage_documents(ctx)?;
        let scripts = util::copy_dir(&settings.scripts_dir, &staging.join(SCRIPTS_DIR))?;
        let styles = stage_styles(ctx)?;
        let templates = stage_templates(ctx)?;

        if ctx.index.is_empty() {
            tracing::warn!(docs = %settings.docs_dir.display(), "no documents found");
        }
        ctx.report.documents = ctx.index.len();
        tracing::info!(
            documents = ctx.index.len(),
            types = ?ctx.index.types().collect::<Vec<_>>(),
            scripts,
            styles,
            templates,
            "staged resources"
        );
        Ok(())
    }
}

/// Copy every type directory's Markdown files and images into staging.
fn stage_documents(ctx: &mut BuildContext) -> Result<(), BuildError> {
    let settings = ctx.settings;
    let staging = &settings.staging_dir;
    let images = staging.join(IMAGES_DIR);
    util::create_dir_all(&images)?;

    for entry in util::sorted_entries(&settings.docs_dir)? {
        let Some(dir_name) = entry.file_name().and_then(|n| n.to_str()) else {
            continue;
        };

        if !entry.is_dir() {
            tracing::debug!(path = %entry.display(), "ignoring file outside a type directory");
            continue;
        }
        if dir_name == IMAGES_DIR {
            util::copy_dir(&entry, &images)?;
            continue;
        }

        let doc_type = dir_name.to_string();
        ctx.index.add_type(&doc_type);
        if !settings.formats.contains_key(&doc_type) {
            tracing::warn!(
                doc_type = %doc_type,
                "document type has no entry in the format table, its documents will be skipped"
            );
        }

        for file in util::sorted_entries(&entry)? {
            if file.is_dir() {
                if file.file_name().is_some_and(|n| n == IMAGES_DIR) {
                    util::copy_dir(&file, &images)?;
                } else {
                    tracing::debug!(path = %file.display(), "ignoring nested directory");
                }
                continue;
            }
            if !util::has_extension(&file, "md") {
                continue;
            }
            let Some(name) = util::file_stem(&file) else {
                continue;
            };

            util::copy_file(&file, &staging.join(format!("{name}.md")))?;
            if let Some(previous) = ctx.index.insert(name, &doc_type) {
                tracing::warn!(
                    document = name,
                    previous = %previous,
                    doc_type = %doc_type,
                    "document name is used by more than one type, keeping the last"
                );
            }
        }
    }

    Ok(())
}

/// Copy plain stylesheets and compile `.less` files to `.css`.
fn stage_styles(ctx: &BuildContext) -> Result<usize, BuildError> {
    let settings = ctx.settings;
    let source = &settings.styles_dir;
    let target = settings.staging_dir.join(STYLES_DIR);
    util::create_dir_all(&target)?;

    let mut count = 0;
    for entry in WalkDir::new(source).min_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|e| FsError::Walk {
            path: source.to_path_buf(),
            source: e,
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(source) else {
            continue;
        };

        if util::has_extension(entry.path(), "less") {
            let output = target.join(relative).with_extension("css");
            util::create_dir_all(output.parent().unwrap_or(target.as_path()))?;
            compile_stylesheet(ctx, entry.path(), &output)?;
        } else {
            util::copy_file(entry.path(), &target.join(relative))?;
        }
        count += 1;
    }

    Ok(count)
}

/// Run the CSS preprocessor. Unlike the converters, a failure here is fatal.
fn compile_stylesheet(ctx: &BuildContext, input: &Path, output: &Path) -> Result<(), BuildError> {
    let invocation = Invocation::new(&ctx.settings.tools.css)
        .arg(input)
        .arg(output);

    let result = ctx
        .runner
        .run(&invocation)
        .map_err(|e| BuildError::Stylesheet {
            path: input.to_path_buf(),
            message: e.to_string(),
        })?;

    if !result.success {
        return Err(BuildError::Stylesheet {
            path: input.to_path_buf(),
            message: result.stderr.trim_end().to_string(),
        });
    }
    tracing::debug!(input = %input.display(), output = %output.display(), "compiled stylesheet");
    Ok(())
}

/// Copy templates, filling in the date and version tokens.
fn stage_templates(ctx: &BuildContext) -> Result<usize, BuildError> {
    let settings = ctx.settings;
    let source = &settings.templates_dir;
    let target = settings.staging_dir.join(TEMPLATES_DIR);
    util::create_dir_all(&target)?;

    let values = TokenValues {
        tokens: &settings.tokens,
        date: &settings.date,
        version: &settings.version,
    };

    let mut count = 0;
    for entry in WalkDir::new(source).min_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|e| FsError::Walk {
            path: source.to_path_buf(),
            source: e,
        })?;
        let Ok(relative) = entry.path().strip_prefix(source) else {
            continue;
        };
        let output = target.join(relative);

        if entry.file_type().is_dir() {
            util::create_dir_all(&output)?;
            continue;
        }

        let bytes =
            std::fs::read(entry.path()).map_err(FsError::io("failed to read", entry.path()))?;
        match String::from_utf8(bytes) {
            Ok(text) => std::fs::write(&output, values.substitute(&text))
                .map_err(FsError::io("failed to write", &output))?,
            // Binary assets next to templates are copied untouched
            Err(e) => std::fs::write(&output, e.into_bytes())
                .map_err(FsError::io("failed to write", &output))?,
        }
        count += 1;
    }

    Ok(count)
}
