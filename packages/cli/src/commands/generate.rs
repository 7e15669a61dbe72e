use super::{component_name, report_parse_error, Context};
use anyhow::{anyhow, Result};
use clap::Args;
use colored::Colorize;
use jsxlab_editor::{EditorDocument, EditorError};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct GenerateArgs {
    /// Source file to regenerate
    pub file: PathBuf,

    /// Emit a full module (imports, function body, export) instead of markup
    #[arg(short, long)]
    pub module: bool,

    /// Component name for --module (defaults to the file name)
    #[arg(short, long)]
    pub name: Option<String>,

    /// Overwrite the file instead of printing
    #[arg(short, long)]
    pub write: bool,
}

/// Parse then regenerate, normalizing formatting
pub fn generate(args: GenerateArgs, ctx: &Context) -> Result<()> {
    let (path, source) = ctx.read_source(&args.file)?;
    let name = args.name.unwrap_or_else(|| component_name(&path));

    let document = match EditorDocument::from_source(&name, &source, ctx.config.known_imports.clone()) {
        Ok(document) => document.with_options(ctx.config.generate_options()),
        Err(EditorError::Parse(err)) => {
            report_parse_error(&path, &source, &err);
            return Err(anyhow!("failed to parse {}", path.display()));
        }
        Err(err) => return Err(err.into()),
    };

    let output = if args.module {
        document.module_source(&name)
    } else {
        document.source()
    };

    if args.write {
        fs::write(&path, format!("{}\n", output))?;
        println!("  {} {}", "✓".green(), path.display());
    } else {
        println!("{}", output);
    }
    Ok(())
}
