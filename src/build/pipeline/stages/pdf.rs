//! PDF generation stage.

use std::path::{Path, PathBuf};

use crate::build::documents::selected;
use crate::build::paths;
use crate::build::pipeline::{BuildContext, BuildError, Stage};
use crate::build::runner::Invocation;
use crate::build::scrub::SnippetScrubber;
use crate::config::OutputFormat;
use crate::server::{LocalServer, ServerOptions};
use crate::util::{self, FsError};

/// Layout flags passed to the renderer before the page URL.
const LAYOUT_ARGS: [&str; 12] = [
    "--dpi",
    "150",
    "--margin-top",
    "15mm",
    "--margin-bottom",
    "15mm",
    "--footer-font-size",
    "8",
    "--footer-spacing",
    "5",
    "--footer-center",
    "[page] / [topage]",
];

/// Stage that renders the generated HTML pages to PDF.
///
/// The HTML output is copied to a temporary directory, stripped of the
/// analytics snippet, and served over a local HTTP server; the renderer
/// reads each page from its URL. The server is stopped when the stage
/// returns, whether the conversions succeeded or not.
pub struct PdfStage;

impl Stage for PdfStage {
    fn name(&self) -> &'static str {
        "pdf"
    }

    fn run(&self, ctx: &mut BuildContext) -> Result<(), BuildError> {
        let settings = ctx.settings;
        let html_dir = paths::html_dir(&settings.output_dir);

        let wanted: Vec<String> = selected(&ctx.index, &settings.formats, OutputFormat::Pdf)
            .map(|(name, _)| name.to_string())
            .collect();
        if wanted.is_empty() {
            tracing::info!("no documents request pdf");
            return Ok(());
        }
        if !html_dir.is_dir() {
            return Err(BuildError::stage(
                "pdf",
                format!("HTML output not found at {}", html_dir.display()),
            ));
        }

        let served = tempfile::Builder::new()
            .prefix("docpress-pdf-")
            .tempdir()
            .map_err(FsError::io("failed to create", &std::env::temp_dir()))?;
        util::copy_dir(&html_dir, served.path())?;

        let scrubber = SnippetScrubber::new(&settings.pdf.strip_marker)?;
        let scrubbed = scrub_pages(&scrubber, served.path())?;
        tracing::debug!(scrubbed, "removed analytics snippets");

        let pages = pages_to_render(served.path(), &wanted);
        for name in &wanted {
            if !pages.iter().any(|(_, page)| page == name) {
                tracing::warn!(document = %name, "no html page to render, skipping pdf");
            }
        }
        if pages.is_empty() {
            return Ok(());
        }

        let pdf_dir = paths::pdf_dir(&settings.output_dir);
        util::create_dir_all(&pdf_dir)?;

        // Declared after `served`, so it is dropped (and stopped) first
        let server = LocalServer::start(served.path(), &ServerOptions::from_config(&settings.pdf))?;

        for (relative, name) in &pages {
            let url = server.url_for(relative);
            let output = paths::pdf_output(&settings.output_dir, name);
            let invocation = Invocation::new(&settings.tools.pdf)
                .args(LAYOUT_ARGS)
                .arg(&url)
                .arg(&output);

            tracing::info!(document = %name, %url, "rendering pdf");
            ctx.convert(&invocation, &html_dir.join(relative), &output);
        }

        server.stop();
        Ok(())
    }
}

/// Strip the analytics snippet from every HTML file under `root`.
///
/// Returns how many files changed.
fn scrub_pages(scrubber: &SnippetScrubber, root: &Path) -> Result<usize, BuildError> {
    let mut changed = 0;
    for file in util::files_with_extension(root, "html")? {
        let html = std::fs::read_to_string(&file).map_err(FsError::io("failed to read", &file))?;
        if let Some(clean) = scrubber.scrub(&html) {
            std::fs::write(&file, clean).map_err(FsError::io("failed to write", &file))?;
            changed += 1;
        }
    }
    Ok(changed)
}

/// Generated pages for the documents that request pdf, as (path relative to
/// root, name).
///
/// Only the top-level `<name>.html` of each document counts. HTML files among
/// the copied assets are never rendered.
fn pages_to_render(root: &Path, wanted: &[String]) -> Vec<(PathBuf, String)> {
    wanted
        .iter()
        .filter_map(|name| {
            let relative = PathBuf::from(format!("{name}.html"));
            root.join(&relative)
                .is_file()
                .then(|| (relative, name.clone()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::io::{Read, Write};
    use std::net::TcpStream;

    use super::*;
    use crate::build::pipeline::run_stage;
    use crate::build::pipeline::stages::fixture::{Project, read, write};
    use crate::build::pipeline::stages::{HtmlStage, ResourceStage};
    use crate::build::report::BuildReport;
    use crate::build::runner::fake::FakeRunner;
    use crate::build::runner::{RunError, ToolOutput, ToolRunner};

    fn run(project: &Project, runner: &dyn ToolRunner) -> BuildReport {
        let mut ctx = BuildContext::new(&project.settings, runner);
        run_stage(&ResourceStage, &mut ctx).unwrap();
        run_stage(&HtmlStage, &mut ctx).unwrap();
        run_stage(&PdfStage, &mut ctx).unwrap();
        ctx.into_report()
    }

    /// Renderer that fetches the page it is pointed at, proving the server
    /// is up during the stage, and writes the body as the "pdf".
    #[derive(Default)]
    struct FetchingRenderer {
        inner: FakeRunner,
        fetched: RefCell<Vec<String>>,
    }

    impl ToolRunner for FetchingRenderer {
        fn run(&self, invocation: &Invocation) -> Result<ToolOutput, RunError> {
            if invocation.program != "wkhtmltopdf" {
                return self.inner.run(invocation);
            }
            let args = invocation.args_lossy();
            let url = &args[args.len() - 2];
            let output = &args[args.len() - 1];

            let rest = url.strip_prefix("http://").unwrap();
            let (host, path) = rest.split_once('/').unwrap();
            let mut stream = TcpStream::connect(host).unwrap();
            write!(
                stream,
                "GET /{path} HTTP/1.1\r\nHost: {host}\r\nConnection: close\r\n\r\n"
            )
            .unwrap();
            let mut response = String::new();
            stream.read_to_string(&mut response).unwrap();

            self.fetched.borrow_mut().push(url.clone());
            std::fs::write(output, response).unwrap();
            Ok(ToolOutput::ok())
        }
    }

    #[test]
    fn test_renders_pdf_types_from_served_url() {
        let project = Project::new();
        let runner = FakeRunner::new();

        let report = run(&project, &runner);

        let pdf = paths::pdf_dir(&project.settings.output_dir);
        assert!(pdf.join("guide.pdf").is_file());
        assert!(pdf.join("intro.pdf").is_file());
        assert_eq!(report.produced_with_extension("pdf").count(), 2);

        let calls = runner.calls_to("wkhtmltopdf");
        assert_eq!(calls.len(), 2);
        for call in &calls {
            let args = call.args_lossy();
            assert_eq!(&args[..12], &LAYOUT_ARGS.map(String::from)[..]);
            assert!(args[12].starts_with("http://127.0.0.1:"));
        }
        assert!(calls[0].args_lossy()[12].ends_with("/guide.html"));
    }

    #[test]
    fn test_server_serves_scrubbed_pages() {
        let project = Project::new();
        // The fake converter writes a stub page, replace it with one carrying the snippet
        let runner = FetchingRenderer::default();
        let mut ctx = BuildContext::new(&project.settings, &runner);
        run_stage(&ResourceStage, &mut ctx).unwrap();
        run_stage(&HtmlStage, &mut ctx).unwrap();
        let html = paths::html_output(&project.settings.output_dir, "guide");
        write(
            html.parent().unwrap(),
            "guide.html",
            "<p>before</p><!-- Analytics -->\n<script>\ntrack();\n</script><p>after</p>",
        );

        run_stage(&PdfStage, &mut ctx).unwrap();

        assert_eq!(runner.fetched.borrow().len(), 2);
        let rendered = read(&paths::pdf_output(&project.settings.output_dir, "guide"));
        assert!(rendered.starts_with("HTTP/1.1 200"));
        assert!(rendered.contains("<p>before</p><p>after</p>"));
        assert!(!rendered.contains("track()"));

        // The original HTML output is untouched
        assert!(read(&html).contains("track();"));
    }

    #[test]
    fn test_server_stopped_after_stage() {
        let project = Project::new();
        let runner = FetchingRenderer::default();

        run(&project, &runner);

        let url = runner.fetched.borrow()[0].clone();
        let host = url
            .strip_prefix("http://")
            .and_then(|r| r.split_once('/'))
            .map(|(h, _)| h.to_string())
            .unwrap();
        assert!(TcpStream::connect(host).is_err());
    }

    #[test]
    fn test_renderer_failure_is_recorded() {
        let project = Project::new();
        let runner = FakeRunner::failing("wkhtmltopdf");

        let report = run(&project, &runner);

        assert_eq!(runner.calls_to("wkhtmltopdf").len(), 2);
        assert_eq!(report.failures.len(), 2);
        assert!(report.failures.iter().all(|f| f.stage == "pdf"));
    }

    #[test]
    fn test_pdf_without_html_is_skipped() {
        let mut project = Project::new();
        project
            .settings
            .formats
            .get_mut("articles")
            .unwrap()
            .remove(&OutputFormat::Html);
        let runner = FakeRunner::new();

        run(&project, &runner);

        let calls = runner.calls_to("wkhtmltopdf");
        assert_eq!(calls.len(), 1);
        assert!(calls[0].args_lossy()[12].ends_with("/guide.html"));
    }

    #[test]
    fn test_asset_pages_are_not_rendered() {
        let project = Project::new();
        write(project.root(), "scripts/guide.html", "<p>widget demo</p>");
        write(project.root(), "docs/images/intro.html", "<p>image map</p>");
        let runner = FakeRunner::new();

        let report = run(&project, &runner);

        let html = paths::html_dir(&project.settings.output_dir);
        assert!(html.join("scripts/guide.html").is_file());
        let urls: Vec<String> = runner
            .calls_to("wkhtmltopdf")
            .iter()
            .map(|c| c.args_lossy()[12].clone())
            .collect();
        assert_eq!(urls.len(), 2);
        assert!(urls[0].ends_with("/guide.html"));
        assert!(urls[1].ends_with("/intro.html"));
        assert!(urls.iter().all(|u| !u.contains("/scripts/") && !u.contains("/images/")));
        assert_eq!(report.produced_with_extension("pdf").count(), 2);
    }

    #[test]
    fn test_pages_to_render_uses_top_level_pages() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "guide.html", "page");
        write(dir.path(), "scripts/intro.html", "asset");
        let wanted = vec!["guide".to_string(), "intro".to_string()];

        let pages = pages_to_render(dir.path(), &wanted);

        assert_eq!(pages, vec![(PathBuf::from("guide.html"), "guide".to_string())]);
    }

    #[test]
    fn test_scrub_pages_counts_changes() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.html", "x<!-- analytics --><script></script>y");
        write(dir.path(), "b.html", "clean");
        let scrubber = SnippetScrubber::new("<!-- analytics -->").unwrap();

        assert_eq!(scrub_pages(&scrubber, dir.path()).unwrap(), 1);
        assert_eq!(read(&dir.path().join("a.html")), "xy");
        assert_eq!(read(&dir.path().join("b.html")), "clean");
    }
}
