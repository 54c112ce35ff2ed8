//! confgen CLI
//!
//! Usage:
//!   confgen [OPTIONS] [TEMPLATE]
//!
//! Options:
//!   -v, --values <FILE>   TOML file with variable values
//!       --variables       List the variables referenced by the template
//!       --keep-blank-lines  Keep blank lines in the rendered output

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};

use clap::Parser;
use serde::Deserialize;

use confgen::{ConfigGenerator, RenderOptions, HOSTNAME_VARIABLE};

#[derive(Parser)]
#[command(name = "confgen")]
#[command(about = "Render device configurations from variable templates")]
struct Cli {
    /// Template file (reads from stdin if not provided)
    template: Option<PathBuf>,

    /// TOML file with variable values
    #[arg(short, long)]
    values: Option<PathBuf>,

    /// List the variables referenced by the template and exit
    #[arg(long)]
    variables: bool,

    /// Keep blank lines in the rendered output
    #[arg(long)]
    keep_blank_lines: bool,
}

/// Variable values loaded from a TOML file
///
/// ```toml
/// hostname = "r1"
///
/// [variables]
/// port = "22"
/// ```
#[derive(Debug, Default, Deserialize)]
struct ValuesFile {
    /// Hostname of the device the configuration is rendered for
    hostname: Option<String>,

    /// Values substituted into the template
    #[serde(default)]
    variables: BTreeMap<String, String>,
}

impl ValuesFile {
    fn from_file(path: &Path) -> Result<Self, String> {
        let content = fs::read_to_string(path).map_err(|e| e.to_string())?;
        toml::from_str(&content).map_err(|e| e.to_string())
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    // If no template file and stdin is a terminal, there is nothing to do
    if cli.template.is_none() && io::stdin().is_terminal() {
        eprintln!("no template given; pass a file or pipe one to stdin (see --help)");
        std::process::exit(2);
    }

    // Read the template source
    let (source, filename) = match &cli.template {
        Some(path) => match fs::read_to_string(path) {
            Ok(content) => (content, path.display().to_string()),
            Err(e) => {
                eprintln!("Error reading template '{}': {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => {
            let mut buffer = String::new();
            match io::stdin().read_to_string(&mut buffer) {
                Ok(_) => (buffer, "<stdin>".to_string()),
                Err(e) => {
                    eprintln!("Error reading from stdin: {}", e);
                    std::process::exit(1);
                }
            }
        }
    };

    let mut generator = ConfigGenerator::new(source);

    if cli.variables {
        for name in generator.template_variables() {
            println!("{}", name);
        }
        return;
    }

    // Load values
    if let Some(path) = &cli.values {
        let values = match ValuesFile::from_file(path) {
            Ok(values) => values,
            Err(e) => {
                eprintln!("Error reading values '{}': {}", path.display(), e);
                std::process::exit(1);
            }
        };
        if let Some(hostname) = values.hostname {
            generator.set_variable_value(HOSTNAME_VARIABLE, hostname);
        }
        for (name, value) in values.variables {
            generator.set_variable_value(&name, value);
        }
    }

    let options = RenderOptions::default().with_strip_blank_lines(!cli.keep_blank_lines);
    match generator.render_with_options(&options) {
        Ok(output) => println!("{}", output),
        Err(err) => {
            eprintln!("{}", err.format(generator.template_string(), &filename));
            std::process::exit(1);
        }
    }
}
