use std::path::Path;

use crate::{
    CleanArgs,
    config::{Config, Overrides, Settings, base_path_from_config},
};

pub fn run(args: &CleanArgs) -> Result<(), anyhow::Error> {
    let (config, config_path) = Config::load_from_arg(args.config_file.as_deref())?;
    let base_path = base_path_from_config(&config_path);

    // The date is irrelevant here, pin it so a bad date format cannot block cleaning
    let overrides = Overrides {
        date: Some(String::new()),
        ..Overrides::default()
    };
    let settings = Settings::resolve(&config, &base_path, &overrides)?;

    remove(&settings.staging_dir, args.dry_run)?;
    remove(&settings.output_dir, args.dry_run)?;
    remove(&settings.archive_path, args.dry_run)?;

    Ok(())
}

fn remove(path: &Path, dry_run: bool) -> Result<(), anyhow::Error> {
    if !path.exists() {
        return Ok(());
    }
    if dry_run {
        println!("Would delete {}", path.display());
        return Ok(());
    }

    if path.is_dir() {
        std::fs::remove_dir_all(path)?;
    } else {
        std::fs::remove_file(path)?;
    }
    println!("Deleted {}", path.display());
    Ok(())
}
