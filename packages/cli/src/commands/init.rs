use crate::config::{Config, DEFAULT_CONFIG_NAME};
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::fs;
use std::path::PathBuf;
use syllabus_editor::EditorConfig;

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Directory for syllabus files
    #[arg(short, long, default_value = "syllabi")]
    pub data_dir: String,

    /// Force overwrite existing config
    #[arg(short, long)]
    pub force: bool,
}

pub fn init(args: InitArgs, cwd: &str) -> Result<()> {
    let config_path = PathBuf::from(cwd).join(DEFAULT_CONFIG_NAME);

    // Check if config already exists
    if config_path.exists() && !args.force {
        println!(
            "{} {} already exists",
            "⚠️".yellow(),
            DEFAULT_CONFIG_NAME.bright_white()
        );
        println!("Use --force to overwrite");
        return Ok(());
    }

    println!("{}", "📝 Initializing syllabus workspace...".bright_blue().bold());

    let data_dir = PathBuf::from(cwd).join(&args.data_dir);
    if !data_dir.exists() {
        fs::create_dir_all(&data_dir)?;
        println!("  {} Created {}/", "✓".green(), args.data_dir);
    }

    let config = Config {
        data_dir: args.data_dir.clone(),
        editor: EditorConfig::default(),
    };

    let config_json = serde_json::to_string_pretty(&config)?;
    fs::write(&config_path, config_json)?;

    println!("  {} Created {}", "✓".green(), DEFAULT_CONFIG_NAME);
    println!();
    println!("{}", "✅ Workspace initialized!".green().bold());
    println!();
    println!("Next steps:");
    println!("  1. Run: syllabus topic add \"Cell structure\" --hours 4");
    println!("  2. Run: syllabus show");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_writes_config_once() {
        let dir = tempfile::tempdir().unwrap();
        let cwd = dir.path().display().to_string();

        init(
            InitArgs {
                data_dir: "courses".to_string(),
                force: false,
            },
            &cwd,
        )
        .unwrap();

        assert!(dir.path().join("courses").is_dir());
        let config = Config::load(&cwd).unwrap();
        assert_eq!(config.data_dir, "courses");

        // Without --force an existing config is left alone
        init(
            InitArgs {
                data_dir: "other".to_string(),
                force: false,
            },
            &cwd,
        )
        .unwrap();
        assert_eq!(Config::load(&cwd).unwrap().data_dir, "courses");
    }
}
