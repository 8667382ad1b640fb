use super::Context;
use crate::surface::TerminalSurface;
use anyhow::Result;
use colored::Colorize;
use std::sync::Arc;
use syllabus_editor::ProgressStatus;

/// Print every view of the syllabus
pub async fn show(ctx: &Context) -> Result<()> {
    println!(
        "📚 {} {}",
        "Syllabus".green().bold(),
        ctx.document_id.bright_white()
    );
    println!();

    // Loading renders all views
    let editor = ctx
        .open_editor(Arc::new(TerminalSurface::new(ctx.assume_yes)))
        .await?;
    editor.close().await;
    Ok(())
}

pub async fn progress(ctx: &Context) -> Result<()> {
    let surface = Arc::new(TerminalSurface::new(ctx.assume_yes));
    surface.set_muted(true);
    let editor = ctx.open_editor(surface).await?;
    let progress = editor.progress();
    editor.close().await;

    let status = match progress.status {
        ProgressStatus::NotStarted => progress.status.label().dimmed(),
        ProgressStatus::InProgress => progress.status.label().yellow(),
        ProgressStatus::NearingCompletion => progress.status.label().blue(),
        ProgressStatus::Completed => progress.status.label().green(),
    };

    println!(
        "📊 {} {}",
        "Progress".green().bold(),
        ctx.document_id.bright_white()
    );
    println!(
        "   Topics:     {}/{} completed ({} remaining)",
        progress.completed_topics, progress.total_topics, progress.remaining_topics
    );
    println!("   Completion: {:.1}%", progress.completion_percentage);
    println!(
        "   Hours:      {}/{} taught",
        progress.completed_hours, progress.planned_hours
    );
    println!("   Assessment: {}% weighted", progress.assessment_weight_total);
    println!("   Status:     {}", status);

    Ok(())
}
