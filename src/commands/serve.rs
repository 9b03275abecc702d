use crate::{
    ServeArgs,
    build::html_dir,
    config::{Config, Overrides, Settings, base_path_from_config},
    server::{LocalServer, ServerOptions},
};

pub fn run(args: &ServeArgs) -> Result<(), anyhow::Error> {
    let (config, config_path) = Config::load_from_arg(args.config_file.as_deref())?;
    let base_path = base_path_from_config(&config_path);
    let overrides = Overrides {
        date: Some(String::new()),
        ..Overrides::default()
    };
    let settings = Settings::resolve(&config, &base_path, &overrides)?;

    let html_dir = html_dir(&settings.output_dir);
    if !html_dir.is_dir() {
        return Err(anyhow::anyhow!(
            "No HTML output at {path}, run `docpress build` first",
            path = html_dir.display()
        ));
    }

    let options = ServerOptions {
        bind: args.bind.clone(),
        port: args.port,
        stop: ServerOptions::from_config(&settings.pdf).stop,
    };
    let server = LocalServer::start(&html_dir, &options)?;
    let url = server.base_url();

    println!("\nServing {} at {}", html_dir.display(), url);
    if let Some(control) = server.control_addr() {
        println!("Stop with GET http://{control}/stop/<key>");
    }
    println!("Press Ctrl+C to stop\n");

    if args.open
        && let Err(e) = open::that(&url)
    {
        eprintln!("Failed to open browser: {}", e);
    }

    server.wait();
    Ok(())
}
