use super::{run_edit, Context};
use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;
use syllabus_editor::{RenderSurface, UnitPatch};

#[derive(Subcommand, Debug)]
pub enum UnitCommand {
    /// Add an empty unit
    Add,

    /// Delete a unit (its topics are kept)
    Delete { index: usize },

    /// Add a topic to a unit
    Assign { unit: usize, topic: usize },

    /// Remove a topic from a unit
    Unassign { unit: usize, topic: usize },

    /// Change a unit's title or description
    Edit {
        index: usize,

        #[arg(short, long)]
        title: Option<String>,

        #[arg(short, long)]
        description: Option<String>,
    },
}

pub async fn unit(ctx: &Context, command: UnitCommand) -> Result<()> {
    run_edit(ctx, |editor, surface| {
        match command {
            UnitCommand::Add => {
                let unit = editor.add_unit()?;
                println!("{} Added unit {}", "✓".green(), unit.index);
            }

            UnitCommand::Delete { index } => {
                if !surface.confirm("Are you sure you want to delete this unit?") {
                    println!("{}", "Cancelled".dimmed());
                    return Ok(());
                }
                editor.delete_unit(index)?;
            }

            UnitCommand::Assign { unit, topic } => editor.assign_topic_to_unit(unit, topic)?,

            UnitCommand::Unassign { unit, topic } => editor.remove_topic_from_unit(unit, topic)?,

            UnitCommand::Edit {
                index,
                title,
                description,
            } => editor.update_unit(index, UnitPatch { title, description })?,
        }
        Ok(())
    })
    .await
}
