//! E-book generation stage.

use crate::build::documents::selected;
use crate::build::paths;
use crate::build::pipeline::{BuildContext, BuildError, Stage};
use crate::build::runner::Invocation;
use crate::config::OutputFormat;
use crate::util;

use super::html::flag;

/// Stage that produces `<name>.epub` and `<name>.mobi` for every document
/// whose type requests `ebook`.
///
/// The Markdown converter runs from the staging directory so that relative
/// image paths inside the documents resolve. The e-reader conversion runs
/// regardless of whether the EPUB step succeeded; each failure is recorded
/// on its own.
pub struct EbookStage;

impl Stage for EbookStage {
    fn name(&self) -> &'static str {
        "ebook"
    }

    fn run(&self, ctx: &mut BuildContext) -> Result<(), BuildError> {
        let settings = ctx.settings;
        let staging = &settings.staging_dir;

        let documents: Vec<(String, String)> =
            selected(&ctx.index, &settings.formats, OutputFormat::Ebook)
                .map(|(name, doc_type)| (name.to_string(), doc_type.to_string()))
                .collect();
        if documents.is_empty() {
            tracing::info!("no documents request e-books");
            return Ok(());
        }

        util::create_dir_all(&paths::ebook_dir(&settings.output_dir))?;

        for (name, doc_type) in &documents {
            let input = paths::staged_markdown(staging, name);
            let epub = paths::epub_output(&settings.output_dir, name);
            let mobi = paths::mobi_output(&settings.output_dir, name);
            let template = paths::epub_template(staging, doc_type);

            let to_epub = Invocation::new(&settings.tools.markdown)
                .arg("--write=epub")
                .arg(flag("--template=", &template))
                .args(["--toc", "--toc-depth=4", "--section-divs"])
                .args(["--no-highlight", "--smart"])
                .arg(flag("--output=", &epub))
                .arg(format!("{name}.md"))
                .current_dir(staging);

            tracing::info!(document = %name, doc_type = %doc_type, "generating epub");
            ctx.convert(&to_epub, &input, &epub);

            let to_mobi = Invocation::new(&settings.tools.ebook).arg(&epub).arg(&mobi);

            tracing::info!(document = %name, "converting epub for e-readers");
            ctx.convert(&to_mobi, &epub, &mobi);
        }

        Ok(())
    }
}
