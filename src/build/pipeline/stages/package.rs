//! Packaging stage.

use std::fs::File;
use std::io;
use std::path::Path;

use walkdir::WalkDir;
use zip::result::ZipError;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::build::paths::archive_entry_name;
use crate::build::pipeline::{BuildContext, BuildError, Stage};
use crate::util::{self, FsError};

/// Stage that archives the whole output directory into `<name>.zip`.
///
/// Runs last, after every generation stage. The archive lists every file and
/// directory under the output root and nothing else.
pub struct PackageStage;

impl Stage for PackageStage {
    fn name(&self) -> &'static str {
        "package"
    }

    fn run(&self, ctx: &mut BuildContext) -> Result<(), BuildError> {
        let settings = ctx.settings;
        let output = &settings.output_dir;
        let archive = &settings.archive_path;

        if util::normalize(archive).starts_with(util::normalize(output)) {
            return Err(BuildError::stage(
                "package",
                format!(
                    "archive {} must be written outside the output directory",
                    archive.display()
                ),
            ));
        }
        util::create_dir_all(output)?;
        if let Some(parent) = archive.parent() {
            util::create_dir_all(parent)?;
        }

        let entries = write_archive(output, archive).map_err(|source| BuildError::Archive {
            path: archive.clone(),
            source,
        })?;

        tracing::info!(archive = %archive.display(), entries, "packaged output");
        ctx.report.archive = Some(archive.clone());
        Ok(())
    }
}

/// Zip every entry under `root` into `archive`. Returns the entry count.
fn write_archive(root: &Path, archive: &Path) -> Result<usize, ZipError> {
    let file = File::create(archive)?;
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let mut count = 0;
    for entry in WalkDir::new(root).min_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|e| ZipError::Io(e.into()))?;
        let Ok(relative) = entry.path().strip_prefix(root) else {
            continue;
        };
        let is_dir = entry.file_type().is_dir();
        let name = archive_entry_name(relative, is_dir);

        if is_dir {
            zip.add_directory(name, options)?;
        } else {
            zip.start_file(name, options)?;
            let mut source = File::open(entry.path())?;
            io::copy(&mut source, &mut zip)?;
        }
        count += 1;
    }

    zip.finish()?;
    Ok(count)
}

/// Entry names of an archive, for callers that want to inspect a package.
#[cfg(test)]
pub(crate) fn archive_listing(archive: &Path) -> Result<Vec<String>, BuildError> {
    let file = File::open(archive).map_err(FsError::io("failed to open", archive))?;
    let zip = zip::ZipArchive::new(file).map_err(|source| BuildError::Archive {
        path: archive.to_path_buf(),
        source,
    })?;
    let mut names: Vec<String> = zip.file_names().map(str::to_string).collect();
    names.sort();
    Ok(names)
}
