use std::path::Path;

use crate::{
    InitArgs,
    config::{Config, DEFAULT_CONFIG_FILE},
};

pub fn run(args: &InitArgs) -> Result<(), anyhow::Error> {
    let path = if args.path.is_relative() {
        std::env::current_dir()?.join(&args.path)
    } else {
        args.path.clone()
    };

    if !path.exists() {
        if args.create {
            std::fs::create_dir_all(&path)?;
            println!("Created directory {path}", path = path.display());
        } else {
            return Err(anyhow::anyhow!(
                "Directory does not exist: {path}",
                path = path.display()
            ));
        }
    }

    println!("Initializing project in {}", path.display());
    let config_file = scaffold(&path)?;

    println!(
        "Created config file {config_file}",
        config_file = config_file.display()
    );

    Ok(())
}

/// Write the starter config and the input directories it points at.
fn scaffold(path: &Path) -> Result<std::path::PathBuf, anyhow::Error> {
    let config_file = path.join(DEFAULT_CONFIG_FILE);
    if config_file.exists() {
        return Err(anyhow::anyhow!(
            "Config file already exists: {config_file}",
            config_file = config_file.display()
        ));
    }

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "docs".to_string());
    let config = Config::starter(&name);

    for dir in [
        &config.paths.docs,
        &config.paths.scripts,
        &config.paths.styles,
        &config.paths.templates,
    ] {
        std::fs::create_dir_all(path.join(dir))?;
    }
    for doc_type in config.formats.keys() {
        std::fs::create_dir_all(path.join(&config.paths.docs).join(doc_type))?;
    }

    let config_text = serde_yaml::to_string(&config)?;
    std::fs::write(&config_file, config_text)?;
    Ok(config_file)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scaffold_writes_loadable_config() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("handbook");
        std::fs::create_dir_all(&root).unwrap();

        let config_file = scaffold(&root).unwrap();

        let (config, _) = Config::load_from_arg(Some(config_file.as_path())).unwrap();
        assert_eq!(config.project.name, "handbook");
        assert_eq!(config.package.name, "handbook");
        assert!(root.join("docs/manual").is_dir());
        assert!(root.join("docs/articles").is_dir());
        assert!(root.join("templates").is_dir());
    }

    #[test]
    fn test_scaffold_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(DEFAULT_CONFIG_FILE), "keep").unwrap();

        assert!(scaffold(dir.path()).is_err());
        assert_eq!(
            std::fs::read_to_string(dir.path().join(DEFAULT_CONFIG_FILE)).unwrap(),
            "keep"
        );
    }
}
