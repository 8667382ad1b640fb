use super::{run_edit, Context};
use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;
use syllabus_editor::{AssessmentMethodPatch, Frequency, RenderSurface};

#[derive(Subcommand, Debug)]
pub enum AssessmentCommand {
    /// Add an assessment method with default settings
    Add,

    /// Delete an assessment method
    Delete { index: usize },

    /// Change an assessment method
    Edit {
        index: usize,

        #[arg(long)]
        name: Option<String>,

        /// Weight in percent (0-100)
        #[arg(short, long)]
        weight: Option<f64>,

        /// daily, weekly, monthly or term-end
        #[arg(short, long)]
        frequency: Option<Frequency>,
    },
}

pub async fn assessment(ctx: &Context, command: AssessmentCommand) -> Result<()> {
    run_edit(ctx, |editor, surface| {
        match command {
            AssessmentCommand::Add => editor.add_assessment_method()?,

            AssessmentCommand::Delete { index } => {
                if !surface.confirm("Are you sure you want to delete this assessment method?") {
                    println!("{}", "Cancelled".dimmed());
                    return Ok(());
                }
                editor.delete_assessment_method(index)?;
            }

            AssessmentCommand::Edit {
                index,
                name,
                weight,
                frequency,
            } => editor.update_assessment_method(
                index,
                AssessmentMethodPatch {
                    name,
                    weight_percent: weight,
                    frequency,
                },
            )?,
        }
        Ok(())
    })
    .await
}
