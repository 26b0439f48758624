//! Minimal CLI: load a blueprint → (types | encode)
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use blueprint_term::{Blueprint, HostValue, Namespace};
use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use serde_json::Value;
use tracing::debug;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// inspect a contract blueprint and encode typed arguments for its evaluator
#[derive(Parser, Debug)]
pub struct CommandLineInterface {
    /// debug-level logging (RUST_LOG overrides)
    #[arg(long, global = true, default_value_t = false)]
    pub verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// print parameters and the resolved type tree
    Types(TypesOut),
    /// type-check arguments against the parameters and print their wire terms
    Encode(EncodeOut),
}

#[derive(Args, Debug, Clone)]
struct BlueprintSettings {
    /// blueprint JSON: a single-validator export, or a project plutus.json together with --validator
    #[arg(long, short)]
    blueprint: PathBuf,

    /// validator title to select from a project plutus.json (e.g. hello.greet)
    #[arg(long)]
    validator: Option<String>,
}

#[derive(clap::Parser, Debug)]
struct TypesOut {
    #[command(flatten)]
    blueprint_settings: BlueprintSettings,
}

#[derive(clap::Parser, Debug)]
struct EncodeOut {
    #[command(flatten)]
    blueprint_settings: BlueprintSettings,

    /// JSON file holding an array with one entry per parameter, or '-' for stdin
    #[arg(long, conflicts_with = "arg")]
    args: Option<String>,

    /// one argument in JSON notation; repeat in parameter order
    #[arg(long)]
    arg: Vec<String>,

    /// wire rendering
    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// output file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    /// `(con data (...))` constants, one per line
    Text,
    /// detailed JSON array
    Json,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl BlueprintSettings {
    fn load(&self) -> Result<Blueprint> {
        let path_str = self.blueprint.to_string_lossy().to_string();
        let source = std::fs::read_to_string(&self.blueprint)
            .with_context(|| format!("failed to read blueprint file ({path_str})"))?;
        let blueprint = match self.validator.as_deref() {
            None => Blueprint::from_json_str(&source),
            Some(title) => Blueprint::from_plutus_json(&source, title),
        };
        blueprint.with_context(|| format!("failed to load blueprint ({path_str})"))
    }
}

impl EncodeOut {
    fn host_values(&self) -> Result<Vec<HostValue>> {
        let documents = match self.args.as_deref() {
            Some(source) => {
                let text = read_source(source)?;
                let json = serde_json::from_str::<Value>(&text)
                    .with_context(|| format!("failed to parse arguments ({source})"))?;
                let Value::Array(items) = json else {
                    bail!("arguments ({source}) must be a JSON array, one entry per parameter");
                };
                items
            }
            None => self
                .arg
                .iter()
                .map(|raw| {
                    serde_json::from_str::<Value>(raw)
                        .with_context(|| format!("failed to parse argument `{raw}`"))
                })
                .collect::<Result<Vec<_>>>()?,
        };
        documents
            .iter()
            .enumerate()
            .map(|(i, doc)| {
                HostValue::from_json(doc).with_context(|| format!("argument #{i} is not a valid host value"))
            })
            .collect()
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }
    pub fn run(&self) -> Result<()> {
        match &self.cmd {
            Command::Types(target) => {
                let blueprint = target.blueprint_settings.load()?;
                println!("{} {}", blueprint.name().bold(), format!("({})", blueprint.hash()).dimmed());
                for parameter in blueprint.parameters() {
                    println!("  {}: {}", parameter.name.green(), parameter.ty);
                }
                println!();
                print!("{}", Namespace::from_definitions(blueprint.definitions()).render());
                Ok(())
            }
            Command::Encode(target) => {
                let blueprint = target.blueprint_settings.load()?;
                let args = target.host_values()?;
                debug!(count = args.len(), "parsed arguments");
                let wire = blueprint
                    .encode_arguments(&args)
                    .with_context(|| format!("arguments do not match `{}`", blueprint.name()))?;
                let rendered = match target.format {
                    Format::Text => wire
                        .iter()
                        .map(|w| w.to_uplc_constant())
                        .collect::<Vec<_>>()
                        .join("\n"),
                    Format::Json => serde_json::to_string_pretty(&wire)?,
                };
                emit(target.out.as_deref(), &rendered)
            }
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn read_source(source: &str) -> Result<String> {
    if source == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("failed to read arguments from stdin")?;
        return Ok(text);
    }
    std::fs::read_to_string(source).with_context(|| format!("failed to read arguments file ({source})"))
}

fn emit(out: Option<&Path>, rendered: &str) -> Result<()> {
    match out {
        Some(out) => {
            if let Some(parent) = out.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
            std::fs::write(out, rendered).with_context(|| format!("failed to write {}", out.display()))
        }
        None => {
            println!("{rendered}");
            Ok(())
        }
    }
}
