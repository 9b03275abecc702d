//! Output and staging path conventions.
//!
//! This module fixes where each stage reads and writes:
//! - Staging: `<staging>/<name>.md`, `<staging>/templates/<type>.html`
//! - Output: `<output>/html/<name>.html`, `<output>/ebook/<name>.epub|.mobi`,
//!   `<output>/pdf/<name>.pdf`

use std::path::{Path, PathBuf};

/// Staged asset directories shared by the HTML output.
pub const ASSET_DIRS: [&str; 3] = ["images", "scripts", "styles"];

pub const IMAGES_DIR: &str = "images";
pub const SCRIPTS_DIR: &str = "scripts";
pub const STYLES_DIR: &str = "styles";
pub const TEMPLATES_DIR: &str = "templates";

/// Staged Markdown source for a document.
pub fn staged_markdown(staging: &Path, name: &str) -> PathBuf {
    staging.join(format!("{name}.md"))
}

/// Staged template used for the HTML rendering of a document type.
pub fn html_template(staging: &Path, doc_type: &str) -> PathBuf {
    staging.join(TEMPLATES_DIR).join(format!("{doc_type}.html"))
}

/// Staged template used for the EPUB rendering of a document type.
pub fn epub_template(staging: &Path, doc_type: &str) -> PathBuf {
    staging.join(TEMPLATES_DIR).join(format!("{doc_type}.epub.html"))
}

pub fn html_dir(output: &Path) -> PathBuf {
    output.join("html")
}

pub fn ebook_dir(output: &Path) -> PathBuf {
    output.join("ebook")
}

pub fn pdf_dir(output: &Path) -> PathBuf {
    output.join("pdf")
}

/// `<output>/html/<name>.html`
pub fn html_output(output: &Path, name: &str) -> PathBuf {
    html_dir(output).join(format!("{name}.html"))
}

/// `<output>/ebook/<name>.epub`
pub fn epub_output(output: &Path, name: &str) -> PathBuf {
    ebook_dir(output).join(format!("{name}.epub"))
}

/// `<output>/ebook/<name>.mobi`
pub fn mobi_output(output: &Path, name: &str) -> PathBuf {
    ebook_dir(output).join(format!("{name}.mobi"))
}

/// `<output>/pdf/<name>.pdf`
pub fn pdf_output(output: &Path, name: &str) -> PathBuf {
    pdf_dir(output).join(format!("{name}.pdf"))
}

/// Archive entry name for a path relative to the archived root.
///
/// Always uses `/` separators; directories get a trailing slash.
pub fn archive_entry_name(relative: &Path, is_dir: bool) -> String {
    let mut name = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/");
    if is_dir {
        name.push('/');
    }
    name
}
