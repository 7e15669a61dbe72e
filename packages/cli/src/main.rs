mod commands;
mod config;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{
    compile, generate, init, parse, render, serve, CompileArgs, Context, GenerateArgs, InitArgs,
    ParseArgs, RenderArgs, ServeArgs,
};
use config::Config;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// JSX Lab CLI - parse, regenerate, compile and preview JSX components
#[derive(Parser, Debug)]
#[command(name = "jsxlab")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Config file (defaults to ./jsxlab.config.json)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Debug logging (overrides RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a starter config and example component
    Init(InitArgs),

    /// Print the element tree of a file
    Parse(ParseArgs),

    /// Regenerate source from the parsed tree
    Generate(GenerateArgs),

    /// Compile files to preview programs
    Compile(CompileArgs),

    /// Print the rendered preview of a file
    Render(RenderArgs),

    /// Serve the compile endpoint over HTTP
    Serve(ServeArgs),
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let cwd = std::env::current_dir()?;
    let context = |cwd: PathBuf| -> anyhow::Result<Context> {
        let config = Config::load(&cwd, cli.config.as_deref())?;
        Ok(Context { cwd, config })
    };

    match cli.command {
        Command::Init(args) => init(args, &cwd),
        Command::Parse(args) => parse(args, &context(cwd)?),
        Command::Generate(args) => generate(args, &context(cwd)?),
        Command::Compile(args) => compile(args, &context(cwd)?).await,
        Command::Render(args) => render(args, &context(cwd)?).await,
        Command::Serve(args) => serve(args, &context(cwd)?).await,
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(err) = run(cli).await {
        eprintln!();
        eprintln!("{} {:#}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
