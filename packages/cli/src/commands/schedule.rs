use super::{run_edit, Context};
use anyhow::Result;
use clap::Subcommand;

#[derive(Subcommand, Debug)]
pub enum ScheduleCommand {
    /// Change weekly hours or the number of weeks
    Set {
        #[arg(long)]
        weekly_hours: Option<f64>,

        #[arg(long)]
        weeks: Option<u32>,
    },
}

pub async fn schedule(ctx: &Context, command: ScheduleCommand) -> Result<()> {
    run_edit(ctx, |editor, _surface| {
        match command {
            ScheduleCommand::Set {
                weekly_hours,
                weeks,
            } => {
                // The monthly plan is carried over unchanged
                let mut schedule = editor.with_document(|doc| doc.schedule.clone());
                if let Some(hours) = weekly_hours {
                    schedule.weekly_hours_total = hours;
                }
                if let Some(weeks) = weeks {
                    schedule.total_weeks = weeks;
                }
                editor.set_schedule(schedule)?;
            }
        }
        Ok(())
    })
    .await
}
