use crate::{
    BuildArgs,
    build::{Builder, SystemRunner},
    config::{Config, Overrides, Settings, base_path_from_config},
};

pub fn run(args: &BuildArgs) -> Result<(), anyhow::Error> {
    let (config, config_path) = Config::load_from_arg(args.config_file.as_deref())?;
    let base_path = base_path_from_config(&config_path);

    let overrides = Overrides {
        version: args.doc_version.clone(),
        date: args.date.clone(),
    };
    let settings = Settings::resolve(&config, &base_path, &overrides)?;

    println!(
        "Building {} {} ({})",
        config.project.name, settings.version, settings.date
    );

    let runner = SystemRunner;
    let report = Builder::new(&settings, &runner)
        .with_packaging(!args.no_package)
        .build()?;

    println!(
        "Built {} document(s): {} html, {} epub, {} mobi, {} pdf",
        report.documents,
        report.produced_with_extension("html").count(),
        report.produced_with_extension("epub").count(),
        report.produced_with_extension("mobi").count(),
        report.produced_with_extension("pdf").count(),
    );
    if let Some(archive) = &report.archive {
        println!("Packaged {}", archive.display());
    }

    if let Some(path) = &args.report {
        report.write_json(path)?;
        println!("Wrote build report to {}", path.display());
    }

    if !report.is_success() {
        for failure in &report.failures {
            eprintln!(
                "  {} failed on {} ({})",
                failure.tool,
                failure.input.display(),
                failure.stage
            );
        }
        anyhow::bail!("{} conversion(s) failed", report.failures.len());
    }

    Ok(())
}
