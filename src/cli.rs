// src/cli.rs
use clap::Parser;
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::config::{ClientConfig, FormDefaults};
use crate::console::ConsoleForm;
use crate::errors::Result;

#[derive(Parser, Debug)]
#[command(name = "online-tester")]
#[command(version)]
#[command(about = "Run a template on a template execution service", long_about = None)]
pub struct Cli {
    /// Template file, or `-` to read it from stdin
    #[arg(long, short)]
    pub template: PathBuf,

    /// Data model file
    #[arg(long, short)]
    pub data_model: Option<PathBuf>,

    #[arg(long)]
    pub output_format: Option<String>,

    #[arg(long)]
    pub locale: Option<String>,

    #[arg(long)]
    pub time_zone: Option<String>,

    #[arg(long)]
    pub tag_syntax: Option<String>,

    #[arg(long)]
    pub interpolation_syntax: Option<String>,

    /// Base URL of the service, e.g. http://127.0.0.1:8080
    #[arg(long)]
    pub api_base: Option<String>,

    /// Config file (defaults to <config dir>/online-tester/config.toml)
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// Applies command line overrides on top of a loaded config.
    pub fn apply_to(&self, config: &mut ClientConfig) {
        if let Some(api_base) = &self.api_base {
            config.api_base = api_base.clone();
        }
    }

    /// Reads the template and data model files into form values.
    pub fn read_form(&self, defaults: &FormDefaults) -> Result<ConsoleForm> {
        let template = read_source(&self.template)?;
        let data_model = match &self.data_model {
            Some(path) => read_source(path)?,
            None => String::new(),
        };

        Ok(ConsoleForm {
            template,
            data_model,
            output_format: pick(&self.output_format, &defaults.output_format),
            locale: pick(&self.locale, &defaults.locale),
            time_zone: pick(&self.time_zone, &defaults.time_zone),
            tag_syntax: self.tag_syntax.clone(),
            interpolation_syntax: self.interpolation_syntax.clone(),
        })
    }
}

fn pick(flag: &Option<String>, default: &str) -> String {
    flag.clone().unwrap_or_else(|| default.to_string())
}

fn read_source(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        return Ok(buf);
    }
    Ok(std::fs::read_to_string(path)?)
}
