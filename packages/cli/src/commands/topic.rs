use super::{run_edit, Context};
use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;
use syllabus_editor::{Difficulty, RenderSurface, TopicPatch};

#[derive(Subcommand, Debug)]
pub enum TopicCommand {
    /// Add a topic at the end of the list
    Add {
        name: String,

        #[arg(short, long, default_value = "")]
        description: String,

        /// Planned duration in hours
        #[arg(long, default_value_t = 1.0)]
        hours: f64,

        /// easy, medium or hard
        #[arg(long, default_value = "medium")]
        difficulty: Difficulty,
    },

    /// Toggle a topic's completion
    Complete { index: usize },

    /// Delete a topic
    Delete { index: usize },

    /// Move a topic to another position
    Move { from: usize, to: usize },

    /// Change a topic's fields
    Edit {
        index: usize,

        #[arg(long)]
        name: Option<String>,

        #[arg(short, long)]
        description: Option<String>,

        #[arg(long)]
        hours: Option<f64>,

        #[arg(long)]
        difficulty: Option<Difficulty>,
    },
}

pub async fn topic(ctx: &Context, command: TopicCommand) -> Result<()> {
    run_edit(ctx, |editor, surface| {
        match command {
            TopicCommand::Add {
                name,
                description,
                hours,
                difficulty,
            } => {
                let topic = editor.add_topic(name, description, hours, difficulty)?;
                tracing::debug!(index = topic.index, "topic added");
            }

            TopicCommand::Complete { index } => editor.toggle_topic_completion(index)?,

            TopicCommand::Delete { index } => {
                if !surface.confirm("Are you sure you want to delete this topic?") {
                    println!("{}", "Cancelled".dimmed());
                    return Ok(());
                }
                editor.delete_topic(index)?;
            }

            TopicCommand::Move { from, to } => editor.reorder_topic(from, to)?,

            TopicCommand::Edit {
                index,
                name,
                description,
                hours,
                difficulty,
            } => editor.update_topic(
                index,
                TopicPatch {
                    name,
                    description,
                    duration_hours: hours,
                    difficulty,
                },
            )?,
        }
        Ok(())
    })
    .await
}
