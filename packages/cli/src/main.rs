mod commands;
mod config;
mod surface;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{
    assessment, init, progress, schedule, show, topic, unit, AssessmentCommand, Context, InitArgs,
    ScheduleCommand, TopicCommand, UnitCommand,
};
use tracing_subscriber::EnvFilter;

/// Syllabus CLI - plan and track course content from the terminal
#[derive(Parser, Debug)]
#[command(name = "syllabus")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Syllabus to edit
    #[arg(long, global = true, default_value = "default")]
    id: String,

    /// Answer yes to every confirmation
    #[arg(short, long, global = true)]
    yes: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Initialize a syllabus workspace
    Init(InitArgs),

    /// Print topics, units, schedule and assessment plan
    Show,

    /// Print completion progress
    Progress,

    /// Manage topics
    Topic {
        #[command(subcommand)]
        command: TopicCommand,
    },

    /// Manage units
    Unit {
        #[command(subcommand)]
        command: UnitCommand,
    },

    /// Manage the assessment plan
    Assessment {
        #[command(subcommand)]
        command: AssessmentCommand,
    },

    /// Manage the teaching schedule
    Schedule {
        #[command(subcommand)]
        command: ScheduleCommand,
    },
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let cwd = std::env::current_dir()
        .context("Cannot get current directory")?
        .display()
        .to_string();

    // init must work even when an existing config is broken
    let command = match cli.command {
        Command::Init(args) => return init(args, &cwd),
        command => command,
    };

    let ctx = Context::load(&cwd, cli.id, cli.yes)?;

    match command {
        Command::Init(_) => Ok(()),
        Command::Show => show(&ctx).await,
        Command::Progress => progress(&ctx).await,
        Command::Topic { command } => topic(&ctx, command).await,
        Command::Unit { command } => unit(&ctx, command).await,
        Command::Assessment { command } => assessment(&ctx, command).await,
        Command::Schedule { command } => schedule(&ctx, command).await,
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(err) = run(cli).await {
        eprintln!();
        eprintln!("{} {:#}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
