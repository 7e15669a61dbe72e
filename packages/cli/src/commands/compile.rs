use super::{is_source_file, Context};
use anyhow::{anyhow, Result};
use clap::Args;
use colored::Colorize;
use jsxlab_compiler::{CompileOutcome, CompilePipeline};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Extension of compiled program files
const PROGRAM_EXTENSION: &str = "program.json";

#[derive(Debug, Args)]
pub struct CompileArgs {
    /// File or directory to compile (defaults to current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Output to stdout instead of files
    #[arg(long)]
    pub stdout: bool,

    /// Output directory (defaults to next to each source file)
    #[arg(short, long)]
    pub out_dir: Option<PathBuf>,
}

pub async fn compile(args: CompileArgs, ctx: &Context) -> Result<()> {
    let root = ctx.resolve(&args.path);
    if !root.exists() {
        return Err(anyhow!("Path does not exist: {}", root.display()));
    }

    let files = find_source_files(&root);
    if files.is_empty() {
        println!("{}", "⚠️  No .jsx or .tsx files found".yellow());
        return Ok(());
    }

    if !args.stdout {
        println!("{}", "🔨 Compiling components...".bright_blue().bold());
        println!("Found {} files", files.len());
    }

    let pipeline = ctx.pipeline()?;
    let out_dir = args.out_dir.as_ref().map(|dir| ctx.resolve(dir));
    let base = if root.is_dir() {
        root.as_path()
    } else {
        root.parent().unwrap_or(root.as_path())
    };

    let mut success_count = 0;
    let mut error_count = 0;

    for file in &files {
        let relative = file.strip_prefix(base).unwrap_or(file);
        match compile_file(&pipeline, file, relative, &args, out_dir.as_deref()).await {
            Ok(Some(output)) => {
                success_count += 1;
                println!("  {} {} → {}", "✓".green(), relative.display(), output.display());
            }
            Ok(None) => success_count += 1,
            Err(e) => {
                error_count += 1;
                eprintln!("  {} {} - {}", "✗".red(), relative.display(), e.to_string().red());
            }
        }
    }

    if args.stdout {
        return finish(error_count);
    }

    let stats = pipeline.stats();
    println!();
    if error_count == 0 {
        println!("{} Compiled {} files successfully", "✅".green(), success_count);
    } else {
        println!(
            "{} Compiled {} files, {} errors",
            "⚠️".yellow(),
            success_count,
            error_count
        );
    }
    println!(
        "{}",
        format!(
            "   {} endpoint calls, {} memory cache hits",
            stats.endpoint_calls, stats.cache_hits
        )
        .dimmed()
    );

    finish(error_count)
}

fn finish(error_count: usize) -> Result<()> {
    match error_count {
        0 => Ok(()),
        n => Err(anyhow!("{} file(s) failed to compile", n)),
    }
}

pub fn find_source_files(root: &Path) -> Vec<PathBuf> {
    if root.is_file() {
        return vec![root.to_path_buf()];
    }

    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
        .map(|entry| entry.into_path())
        .filter(|path| path.is_file() && is_source_file(path))
        .collect();
    files.sort();
    files
}

/// Compile one file. Returns the written path, or `None` when printed.
async fn compile_file(
    pipeline: &CompilePipeline,
    file: &Path,
    relative: &Path,
    args: &CompileArgs,
    out_dir: Option<&Path>,
) -> Result<Option<PathBuf>> {
    let source = fs::read_to_string(file)?;

    let code = match pipeline.compile(&source).await? {
        CompileOutcome::Compiled(code) => code,
        CompileOutcome::Superseded => return Err(anyhow!("compile superseded")),
    };

    if args.stdout {
        println!("{}", code);
        return Ok(None);
    }

    let output = program_path(file, relative, out_dir);
    if let Some(parent) = output.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&output, code)?;
    Ok(Some(output))
}

/// `src/Hero.jsx` → `src/Hero.program.json`, or mirrored under `out_dir`
fn program_path(file: &Path, relative: &Path, out_dir: Option<&Path>) -> PathBuf {
    let target = match out_dir {
        Some(dir) => dir.join(relative),
        None => file.to_path_buf(),
    };
    target.with_extension(PROGRAM_EXTENSION)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_program_path() {
        assert_eq!(
            program_path(Path::new("/p/src/Hero.jsx"), Path::new("Hero.jsx"), None),
            PathBuf::from("/p/src/Hero.program.json")
        );
        assert_eq!(
            program_path(
                Path::new("/p/src/ui/Card.tsx"),
                Path::new("ui/Card.tsx"),
                Some(Path::new("/p/dist"))
            ),
            PathBuf::from("/p/dist/ui/Card.program.json")
        );
    }

    #[test]
    fn test_find_source_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("ui")).unwrap();
        fs::write(dir.path().join("Hero.jsx"), "<div />").unwrap();
        fs::write(dir.path().join("ui/Card.tsx"), "<div />").unwrap();
        fs::write(dir.path().join("notes.md"), "").unwrap();

        let files = find_source_files(dir.path());
        assert_eq!(files.len(), 2);
        assert!(files.iter().all(|file| is_source_file(file)));
    }
}
