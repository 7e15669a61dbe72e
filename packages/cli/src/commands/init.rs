use crate::config::{Config, DEFAULT_CONFIG_NAME};
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use jsxlab_parser::{ImportSpec, KnownImports};
use std::fs;
use std::path::Path;

const EXAMPLE_COMPONENT: &str = r#"function Hero() {
  const title = 'Build faster';
  return (
    <section className="hero">
      <h1 style={{ fontSize: 48 }}>{title}</h1>
      <Button variant="primary">Get started</Button>
    </section>
  );
}
"#;

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Source directory
    #[arg(short, long, default_value = "src")]
    pub src_dir: String,

    /// Force overwrite existing config
    #[arg(short, long)]
    pub force: bool,
}

pub fn init(args: InitArgs, cwd: &Path) -> Result<()> {
    let config_path = cwd.join(DEFAULT_CONFIG_NAME);

    if config_path.exists() && !args.force {
        println!(
            "{} {} already exists",
            "⚠️".yellow(),
            DEFAULT_CONFIG_NAME.bright_white()
        );
        println!("Use --force to overwrite");
        return Ok(());
    }

    println!("{}", "📝 Initializing JSX Lab project...".bright_blue().bold());

    let src_dir = cwd.join(&args.src_dir);
    if !src_dir.exists() {
        fs::create_dir_all(&src_dir)?;
        println!("  {} Created {}/", "✓".green(), args.src_dir);
    }

    let example_file = src_dir.join("Hero.jsx");
    if !example_file.exists() {
        fs::write(&example_file, EXAMPLE_COMPONENT)?;
        println!("  {} Created Hero.jsx", "✓".green());
    }

    let config = Config {
        known_imports: KnownImports::new()
            .with("Button", ImportSpec::named("@/components/ui/button")),
        cache_dir: Some(".jsxlab-cache".to_string()),
        ..Config::default()
    };
    fs::write(&config_path, serde_json::to_string_pretty(&config)?)?;

    println!("  {} Created {}", "✓".green(), DEFAULT_CONFIG_NAME);
    println!();
    println!("{}", "✅ Project initialized!".green().bold());
    println!();
    println!("Next steps:");
    println!("  1. Edit {}/Hero.jsx", args.src_dir);
    println!("  2. Run: jsxlab render {}/Hero.jsx", args.src_dir);
    println!("  3. Run: jsxlab compile {}", args.src_dir);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_writes_loadable_config() {
        let dir = tempfile::tempdir().unwrap();
        init(
            InitArgs {
                src_dir: "src".to_string(),
                force: false,
            },
            dir.path(),
        )
        .unwrap();

        let config = Config::load(dir.path(), None).unwrap();
        assert!(config.known_imports.contains("Button"));
        assert!(dir.path().join("src/Hero.jsx").exists());

        let source = fs::read_to_string(dir.path().join("src/Hero.jsx")).unwrap();
        assert!(jsxlab_parser::parse_with_imports(&source, &config.known_imports).is_ok());
    }
}
