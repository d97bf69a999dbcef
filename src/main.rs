//! Release Template CLI
//!
//! Usage:
//!   release-template [OPTIONS] [CONFIG]
//!
//! Options:
//!   -t, --template <FILE>    Template file (overrides the config's template)
//!   -V, --values <FILE>      JSON file of values merged over the config's values
//!   -s, --set <KEY=VALUE>    Bind a single token (repeatable)
//!   --lenient                Drop invalid replacers instead of failing
//!   --max-depth <N>          Maximum depth of nested templates
//!   -h, --help               Print help

use std::fs;
use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use release_template::{ConfigError, TemplateConfig};

#[derive(Parser)]
#[command(name = "release-template")]
#[command(about = "Render release notes from a template, values and replacers")]
struct Cli {
    /// Configuration file (TOML) with template, values and replacers
    config: Option<PathBuf>,

    /// Template file; reads stdin when neither this nor the config gives one
    #[arg(short, long)]
    template: Option<PathBuf>,

    /// JSON object of values merged over the configured values
    #[arg(short = 'V', long)]
    values: Option<PathBuf>,

    /// Bind a token to a text value, e.g. --set '$RELEASE_TAG=v1.2.0'
    #[arg(short, long = "set", value_name = "KEY=VALUE")]
    set: Vec<String>,

    /// Drop replacers that fail validation instead of aborting
    #[arg(long)]
    lenient: bool,

    /// Maximum depth of nested templates
    #[arg(long)]
    max_depth: Option<usize>,
}

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "release_template=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();

    // Load configuration
    let mut config = match &cli.config {
        Some(path) => match TemplateConfig::from_file(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error loading config '{}': {}", path.display(), e);
                process::exit(1);
            }
        },
        None => TemplateConfig::default(),
    };

    if let Some(path) = &cli.values {
        let merged = fs::read_to_string(path)
            .map_err(ConfigError::from)
            .and_then(|json| config.merge_values_json(&json));
        if let Err(e) = merged {
            eprintln!("Error loading values '{}': {}", path.display(), e);
            process::exit(1);
        }
    }

    for assignment in &cli.set {
        match assignment.split_once('=') {
            Some((token, value)) if !token.is_empty() => config.set_value(token, value),
            _ => {
                eprintln!("Error: invalid --set '{}', expected KEY=VALUE", assignment);
                process::exit(1);
            }
        }
    }

    if cli.max_depth.is_some() {
        config.max_depth = cli.max_depth;
    }

    let template = match read_template(&cli, &config) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Error reading template: {}", e);
            process::exit(1);
        }
    };

    match config.render_template(&template, cli.lenient) {
        Ok(output) => {
            println!("{}", output);
        }
        Err(ConfigError::Replacer(e)) => {
            let filename = cli
                .config
                .as_deref()
                .map(Path::display)
                .map(|d| d.to_string())
                .unwrap_or_else(|| "replacers".to_string());
            eprint!("{}", e.format(&filename));
            process::exit(1);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

/// Pick the template: `--template` file, then the config, then stdin
fn read_template(cli: &Cli, config: &TemplateConfig) -> io::Result<String> {
    if let Some(path) = &cli.template {
        return fs::read_to_string(path);
    }
    if let Some(template) = &config.template {
        return Ok(template.clone());
    }
    if io::stdin().is_terminal() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "no template given; pass --template, a config with `template`, or pipe one on stdin",
        ));
    }
    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer)?;
    Ok(buffer)
}
