use super::{report_parse_error, Context};
use anyhow::{anyhow, Result};
use clap::Args;
use jsxlab_parser::parse_with_imports;
use serde_json::json;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct ParseArgs {
    /// Source file to parse
    pub file: PathBuf,

    /// Single-line JSON
    #[arg(long)]
    pub compact: bool,
}

/// Print the element tree of a source file as JSON
pub fn parse(args: ParseArgs, ctx: &Context) -> Result<()> {
    let (path, source) = ctx.read_source(&args.file)?;

    let output = match parse_with_imports(&source, &ctx.config.known_imports) {
        Ok(output) => output,
        Err(err) => {
            report_parse_error(&path, &source, &err);
            return Err(anyhow!("failed to parse {}", path.display()));
        }
    };

    let value = json!({
        "root": output.root,
        "functionBody": output.function_body,
    });
    let text = if args.compact {
        serde_json::to_string(&value)?
    } else {
        serde_json::to_string_pretty(&value)?
    };
    println!("{}", text);
    Ok(())
}
