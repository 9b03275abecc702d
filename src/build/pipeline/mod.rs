//! Build pipeline.
//!
//! A run moves through a fixed sequence of stages, each depending on the
//! directories the previous one wrote:
//! 1. Resource staging (flatten sources, compile styles, fill templates)
//! 2. HTML generation
//! 3. E-book generation
//! 4. PDF generation (through a local server)
//! 5. Packaging
//!
//! Stages run strictly one after another; there is no parallelism across
//! documents or formats.

mod context;
mod error;
mod stages;

pub use context::BuildContext;
pub use error::BuildError;

use stages::{EbookStage, HtmlStage, PackageStage, PdfStage, ResourceStage};

#[cfg(test)]
pub(crate) use stages::fixture;

/// A stage in the build pipeline.
pub trait Stage {
    /// Unique name for this stage (used in logs, reports and `without`).
    fn name(&self) -> &'static str;

    /// Run this stage against the shared context.
    fn run(&self, ctx: &mut BuildContext) -> Result<(), BuildError>;
}

/// The build pipeline.
///
/// The default pipeline is: stage → html → ebook → pdf → package.
pub struct Pipeline {
    stages: Vec<Box<dyn Stage>>,
}

impl Pipeline {
    /// Create an empty pipeline with no stages.
    pub fn new() -> Self {
        Self { stages: Vec::new() }
    }

    /// Create the default pipeline with all stages.
    pub fn default_pipeline() -> Self {
        let mut pipeline = Self::new();
        pipeline.add_stage(ResourceStage);
        pipeline.add_stage(HtmlStage);
        pipeline.add_stage(EbookStage);
        pipeline.add_stage(PdfStage);
        pipeline.add_stage(PackageStage);
        pipeline
    }

    /// Add a stage to the end of the pipeline.
    pub fn add_stage<S: Stage + 'static>(&mut self, stage: S) -> &mut Self {
        self.stages.push(Box::new(stage));
        self
    }

    /// Remove the named stage, if present.
    pub fn without(&mut self, name: &str) -> &mut Self {
        self.stages.retain(|s| s.name() != name);
        self
    }

    /// Run every stage in order. The first error aborts the run.
    pub fn run(&self, ctx: &mut BuildContext) -> Result<(), BuildError> {
        for stage in &self.stages {
            run_stage(stage.as_ref(), ctx)?;
        }
        Ok(())
    }

    /// Get the names of all stages in order.
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.name()).collect()
    }
}

/// Run a single stage with its name recorded on the context.
fn run_stage(stage: &dyn Stage, ctx: &mut BuildContext) -> Result<(), BuildError> {
    ctx.stage = stage.name();
    let _span = tracing::info_span!("stage", name = stage.name()).entered();
    tracing::info!("running stage");
    stage.run(ctx)
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::default_pipeline()
    }
}
