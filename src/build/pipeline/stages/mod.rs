//! Default pipeline stages.
//!
//! 1. **ResourceStage** - Flatten sources and resources into the staging directory
//! 2. **HtmlStage** - Convert staged Markdown to standalone HTML pages
//! 3. **EbookStage** - Convert staged Markdown to EPUB, then to MOBI
//! 4. **PdfStage** - Render the HTML pages to PDF through a local server
//! 5. **PackageStage** - Archive the output directory

mod ebook;
mod html;
mod package;
mod pdf;
mod resources;

pub use ebook::EbookStage;
pub use html::HtmlStage;
pub use package::PackageStage;
pub use pdf::PdfStage;
pub use resources::ResourceStage;

#[cfg(test)]
pub(crate) mod fixture;
