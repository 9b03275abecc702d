use super::pipeline::{BuildContext, BuildError, Pipeline};
use super::report::BuildReport;
use super::runner::ToolRunner;
use crate::config::Settings;

pub struct Builder<'a> {
    settings: &'a Settings,
    runner: &'a dyn ToolRunner,
    package: bool,
}

impl<'a> Builder<'a> {
    pub fn new(settings: &'a Settings, runner: &'a dyn ToolRunner) -> Self {
        Self {
            settings,
            runner,
            package: true,
        }
    }

    /// Skip writing the archive at the end of the run.
    pub fn with_packaging(mut self, package: bool) -> Self {
        self.package = package;
        self
    }

    pub fn build(&self) -> Result<BuildReport, BuildError> {
        let mut pipeline = Pipeline::default_pipeline();
        if !self.package {
            pipeline.without("package");
        }

        tracing::info!(
            stages = ?pipeline.stage_names(),
            version = %self.settings.version,
            date = %self.settings.date,
            "starting build"
        );

        let mut ctx = BuildContext::new(self.settings, self.runner);
        pipeline.run(&mut ctx)?;
        let report = ctx.into_report();

        tracing::info!(
            documents = report.documents,
            produced = report.produced.len(),
            failures = report.failures.len(),
            "build finished"
        );
        Ok(report)
    }
}
