//! HTML generation stage.

use std::ffi::OsString;

use crate::build::documents::selected;
use crate::build::paths::{self, ASSET_DIRS};
use crate::build::pipeline::{BuildContext, BuildError, Stage};
use crate::build::runner::Invocation;
use crate::config::OutputFormat;
use crate::util;

/// Stage that converts staged Markdown into standalone HTML pages.
///
/// Each document whose type requests `html` becomes
/// `<output>/html/<name>.html`, rendered with its type's template. The staged
/// images, scripts and styles are then copied next to the pages.
pub struct HtmlStage;

impl Stage for HtmlStage {
    fn name(&self) -> &'static str {
        "html"
    }

    fn run(&self, ctx: &mut BuildContext) -> Result<(), BuildError> {
        let settings = ctx.settings;
        let html_dir = paths::html_dir(&settings.output_dir);
        util::create_dir_all(&html_dir)?;

        let documents: Vec<(String, String)> =
            selected(&ctx.index, &settings.formats, OutputFormat::Html)
                .map(|(name, doc_type)| (name.to_string(), doc_type.to_string()))
                .collect();

        let mut converted = 0;
        for (name, doc_type) in &documents {
            let input = paths::staged_markdown(&settings.staging_dir, name);
            let output = paths::html_output(&settings.output_dir, name);
            let template = paths::html_template(&settings.staging_dir, doc_type);

            let invocation = Invocation::new(&settings.tools.markdown)
                .arg("--write=html5")
                .arg(flag("--template=", &template))
                .args(["--toc", "--toc-depth=4", "--section-divs"])
                .args(["--no-highlight", "--smart"])
                .arg(flag("--output=", &output))
                .arg(&input);

            tracing::info!(document = %name, doc_type = %doc_type, "generating html");
            if ctx.convert(&invocation, &input, &output) {
                converted += 1;
            }
        }

        for asset in ASSET_DIRS {
            let source = settings.staging_dir.join(asset);
            if source.is_dir() {
                util::copy_dir(&source, &html_dir.join(asset))?;
            }
        }

        tracing::info!(converted, requested = documents.len(), "html generation finished");
        Ok(())
    }
}

/// `--name=<path>` as a single argument, without lossy conversion.
pub(super) fn flag(prefix: &str, path: &std::path::Path) -> OsString {
    let mut arg = OsString::from(prefix);
    arg.push(path.as_os_str());
    arg
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::pipeline::run_stage;
    use crate::build::pipeline::stages::ResourceStage;
    use crate::build::pipeline::stages::fixture::Project;
    use crate::build::runner::fake::FakeRunner;

    fn run(project: &Project, runner: &FakeRunner) -> crate::build::report::BuildReport {
        let mut ctx = BuildContext::new(&project.settings, runner);
        run_stage(&ResourceStage, &mut ctx).unwrap();
        run_stage(&HtmlStage, &mut ctx).unwrap();
        ctx.into_report()
    }

    #[test]
    fn test_converts_configured_types_only() {
        let project = Project::new();
        let runner = FakeRunner::new();

        let report = run(&project, &runner);

        let html = paths::html_dir(&project.settings.output_dir);
        assert!(html.join("guide.html").is_file());
        assert!(html.join("intro.html").is_file());
        assert!(!html.join("scratch.html").exists());
        assert_eq!(report.produced_with_extension("html").count(), 2);
        assert_eq!(runner.calls_to("pandoc").len(), 2);
    }

    #[test]
    fn test_fixed_flag_set() {
        let project = Project::new();
        let runner = FakeRunner::new();

        run(&project, &runner);

        let staging = &project.settings.staging_dir;
        let out = &project.settings.output_dir;
        let calls = runner.calls_to("pandoc");
        let guide = calls
            .iter()
            .find(|c| c.args_lossy().last().unwrap().ends_with("guide.md"))
            .unwrap();

        assert_eq!(
            guide.args_lossy(),
            vec![
                "--write=html5".to_string(),
                format!("--template={}", staging.join("templates/manual.html").display()),
                "--toc".to_string(),
                "--toc-depth=4".to_string(),
                "--section-divs".to_string(),
                "--no-highlight".to_string(),
                "--smart".to_string(),
                format!("--output={}", out.join("html/guide.html").display()),
                staging.join("guide.md").display().to_string(),
            ]
        );
        assert_eq!(guide.cwd, None);
    }

    #[test]
    fn test_copies_shared_assets() {
        let project = Project::new();
        let runner = FakeRunner::new();

        run(&project, &runner);

        let html = paths::html_dir(&project.settings.output_dir);
        assert!(html.join("images/diagram.png").is_file());
        assert!(html.join("images/shared.png").is_file());
        assert!(html.join("scripts/app.js").is_file());
        assert!(html.join("styles/base.css").is_file());
        assert!(html.join("styles/theme.css").is_file());
    }

    #[test]
    fn test_failed_conversion_continues() {
        let project = Project::new();
        let runner = FakeRunner::failing("pandoc");

        let report = run(&project, &runner);

        assert_eq!(runner.calls_to("pandoc").len(), 2);
        assert_eq!(report.failures.len(), 2);
        assert!(report.failures.iter().all(|f| f.stage == "html"));
        assert!(
            paths::html_dir(&project.settings.output_dir)
                .join("scripts/app.js")
                .is_file()
        );
    }
}
