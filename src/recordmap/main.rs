use clap::Parser;
use directories::ProjectDirs;
use recordmap::catalog::Catalog;
use recordmap::config::EngineConfig;
use recordmap::error::{Error, Result};
use recordmap::schema::Schema;
use recordmap::Model;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod args;
use args::{Cli, Commands};

const PROJECT_CONFIG_DIR: &str = ".recordmap";

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Resolve {
            catalog,
            type_name,
            input,
            key,
        } => handle_resolve(&config, &catalog, &type_name, input.as_deref(), key),
        Commands::Key { input } => handle_key(&config, input.as_deref()),
        Commands::Describe { catalog, type_name } => {
            handle_describe(&config, &catalog, type_name.as_deref())
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose { "debug" } else { "warn" };
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .without_time()
                .with_writer(std::io::stderr),
        )
        .try_init();
}

/// `--config`, else `./.recordmap`, else the user config directory.
fn load_config(explicit: Option<&Path>) -> Result<EngineConfig> {
    if let Some(dir) = explicit {
        return EngineConfig::load(dir);
    }

    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let project_dir = cwd.join(PROJECT_CONFIG_DIR);
    if project_dir.is_dir() {
        return EngineConfig::load(project_dir);
    }

    match ProjectDirs::from("com", "recordmap", "recordmap") {
        Some(dirs) => EngineConfig::load(dirs.config_dir()),
        None => Ok(EngineConfig::default()),
    }
}

fn read_input(path: Option<&Path>) -> Result<serde_json::Value> {
    let content = match path {
        Some(p) if p != Path::new("-") => std::fs::read_to_string(p).map_err(Error::Io)?,
        _ => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .map_err(Error::Io)?;
            buf
        }
    };
    Ok(serde_json::from_str(&content)?)
}

fn handle_resolve(
    config: &EngineConfig,
    catalog_path: &Path,
    type_name: &str,
    input: Option<&Path>,
    with_key: bool,
) -> Result<()> {
    let catalog = Catalog::load(catalog_path, config)?;
    let schema = catalog.schema(type_name)?;
    let model = Model::parse_new(schema, read_input(input)?)?;

    let mut resolved = model.to_resolved_json()?;
    if with_key {
        if let (serde_json::Value::Object(map), Some(key)) = (&mut resolved, model.cache_key()) {
            map.insert("_cache_key".to_string(), serde_json::Value::String(key));
        }
    }
    println!("{}", serde_json::to_string_pretty(&resolved)?);
    Ok(())
}

fn handle_key(config: &EngineConfig, input: Option<&Path>) -> Result<()> {
    let schema = Schema::builder("record").config(config.clone()).build()?;
    let model = Model::parse_new(&schema, read_input(input)?)?;
    println!("{}", model.cache_key().unwrap_or_default());
    Ok(())
}

fn handle_describe(
    config: &EngineConfig,
    catalog_path: &Path,
    type_name: Option<&str>,
) -> Result<()> {
    let catalog = Catalog::load(catalog_path, config)?;
    let schemas: Vec<_> = match type_name {
        Some(name) => vec![(name, catalog.schema(name)?)],
        None => catalog.iter().collect(),
    };

    for (name, schema) in schemas {
        println!("{}", name);
        let width = schema.aliases().map(str::len).max().unwrap_or(0);
        for descriptor in schema.registry().iter() {
            println!(
                "  {:<width$}  [{}]  {}, {}",
                descriptor.alias(),
                descriptor.source_keys().join(", "),
                descriptor.lookup(),
                descriptor.cast(),
                width = width
            );
        }
    }
    Ok(())
}
