use super::{report_parse_error, Context};
use anyhow::{anyhow, Result};
use clap::Args;
use colored::Colorize;
use jsxlab_compiler::{CompileOutcome, Program};
use jsxlab_parser::parse_with_imports;
use jsxlab_renderer::{preload, render_tree, ComponentRegistry, LiveRenderer, VNode};
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct RenderArgs {
    /// Source file to preview
    pub file: PathBuf,

    /// Render the parsed tree directly, with animations resolved,
    /// instead of compiling
    #[arg(long)]
    pub tree: bool,
}

/// Print the preview node tree of a source file as JSON
pub async fn render(args: RenderArgs, ctx: &Context) -> Result<()> {
    let (path, source) = ctx.read_source(&args.file)?;
    let imports = &ctx.config.known_imports;
    let registry = ComponentRegistry::from_imports(imports);

    let node = if args.tree {
        let output = match parse_with_imports(&source, imports) {
            Ok(output) => output,
            Err(err) => {
                report_parse_error(&path, &source, &err);
                return Err(anyhow!("failed to parse {}", path.display()));
            }
        };
        let program = jsxlab_compiler::transpile(&source, imports)?;
        render_tree(&output.root, &preload(&program, &registry))?
    } else {
        let pipeline = ctx.pipeline()?;
        let code = match pipeline.compile(&source).await? {
            CompileOutcome::Compiled(code) => code,
            CompileOutcome::Superseded => return Err(anyhow!("compile superseded")),
        };
        let program = Program::from_code(&code)?;
        let bindings = preload(&program, &registry);

        let mut renderer = LiveRenderer::new();
        if let Err(err) = renderer.mount(&code, &bindings) {
            print_node(&renderer.view())?;
            eprintln!("  {} {}", "✗".red(), path.display());
            return Err(err.into());
        }
        renderer.view()
    };

    print_node(&node)
}

fn print_node(node: &VNode) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(node)?);
    Ok(())
}
