//! buildspec CLI - parse, normalize, concretize, and print build specs.
//!
//! # Commands
//!
//! - `parse <spec>` - Parse spec text and print it back out
//! - `normalize <spec>` - Parse, then complete against recipe defaults
//! - `concretize <spec>` - Parse, normalize, and pin every attribute
//! - `tree <spec>` - Parse and print the dependency tree

use buildspec::concretizer;
use buildspec::config;
use buildspec::normalizer;
use buildspec::parser;
use buildspec::printer;
use buildspec::registry::{FixedHostArch, MockCompilerRegistry, MockRepo, Recipe};
use clap::{Parser, Subcommand};
use log::{debug, info, trace};
use std::path::PathBuf;
use std::process::ExitCode;

/// buildspec - spec grammar and constraint algebra demo.
#[derive(Parser)]
#[command(name = "buildspec")]
#[command(author, version)]
#[command(about = "Parse, normalize, and concretize build-spec text against a small built-in demo recipe set.")]
pub struct Cli {
    /// Verbosity: -v (info), -vv (debug), -vvv (trace)
    #[arg(short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file override
    #[arg(long = "cfg", global = true)]
    pub cfg: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Parse spec text and print the canonical string form.
    Parse { spec: String },
    /// Parse, then complete against recipe defaults.
    Normalize { spec: String },
    /// Parse, normalize, and pin every attribute.
    Concretize { spec: String },
    /// Parse and print the dependency tree.
    Tree { spec: String },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = match config::init(cli.cfg.clone()) {
        Ok(c) => c,
        Err(err) => {
            eprintln!("config error: {err}");
            return ExitCode::FAILURE;
        }
    };

    info!("buildspec v{} starting", buildspec::VERSION);
    trace!("known compilers: {:?}", config.known_compilers);

    let compilers = MockCompilerRegistry::from_names(config.known_compilers.clone());
    let repo = demo_repo();
    let host = FixedHostArch::new(config.default_architecture.clone());

    match run(&cli.command, &compilers, &repo, &host) {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(
    command: &Commands,
    compilers: &MockCompilerRegistry,
    repo: &MockRepo,
    host: &FixedHostArch,
) -> Result<String, buildspec::SpecError> {
    match command {
        Commands::Parse { spec } => {
            debug!("cmd: parse");
            let spec = parser::parse_one(spec, compilers)?;
            Ok(spec.to_string())
        }
        Commands::Normalize { spec } => {
            debug!("cmd: normalize");
            let mut spec = parser::parse_one(spec, compilers)?;
            normalizer::normalize(&mut spec, repo)?;
            Ok(spec.to_string())
        }
        Commands::Concretize { spec } => {
            debug!("cmd: concretize");
            let mut spec = parser::parse_one(spec, compilers)?;
            normalizer::normalize(&mut spec, repo)?;
            concretizer::concretize(&mut spec, repo, compilers, host)?;
            Ok(spec.to_string())
        }
        Commands::Tree { spec } => {
            debug!("cmd: tree");
            let mut spec = parser::parse_one(spec, compilers)?;
            normalizer::normalize(&mut spec, repo)?;
            Ok(printer::tree(&spec))
        }
    }
}

/// A small built-in package corpus so the CLI has something to normalize
/// and concretize against without a real package database behind it.
fn demo_repo() -> MockRepo {
    MockRepo::new()
        .with_recipe(
            Recipe::new("mpileaks", "2.3")
                .with_dependency(buildspec::Spec::new("openmpi"))
                .with_dependency(buildspec::Spec::new("zlib")),
        )
        .with_recipe(Recipe::new("openmpi", "4.1"))
        .with_recipe(Recipe::new("zlib", "1.2.11"))
}

fn init_logging(verbosity: u8) {
    use std::io::Write;

    let level = match verbosity {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(level)
        .format(|buf, record| {
            writeln!(buf, "[{} {}] {}", record.level(), record.target(), record.args())
        })
        .init();
}
