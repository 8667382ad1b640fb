//! Terminal rendering of the editor's views

use colored::Colorize;
use std::io::{BufRead, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use syllabus_editor::{AssessmentPlan, RenderSurface, Schedule, Severity, Topic, Unit};

pub struct TerminalSurface {
    assume_yes: bool,

    /// Suppress view output (notifications still print)
    muted: AtomicBool,
}

impl TerminalSurface {
    pub fn new(assume_yes: bool) -> Self {
        Self {
            assume_yes,
            muted: AtomicBool::new(false),
        }
    }

    pub fn set_muted(&self, muted: bool) {
        self.muted.store(muted, Ordering::SeqCst);
    }

    fn is_muted(&self) -> bool {
        self.muted.load(Ordering::SeqCst)
    }
}

impl RenderSurface for TerminalSurface {
    fn render_topics(&self, topics: &[Topic]) {
        if self.is_muted() {
            return;
        }
        println!("{}", "Topics".bright_blue().bold());
        if topics.is_empty() {
            println!("  {}", "No topics yet".dimmed());
        }
        for topic in topics {
            println!("  {}", format_topic(topic));
        }
        println!();
    }

    fn render_units(&self, units: &[Unit], topics: &[Topic]) {
        if self.is_muted() {
            return;
        }
        println!("{}", "Units".bright_blue().bold());
        if units.is_empty() {
            println!("  {}", "No units yet".dimmed());
        }
        for unit in units {
            let title = if unit.title.is_empty() {
                "(untitled)".dimmed().to_string()
            } else {
                unit.title.bright_white().to_string()
            };
            println!("  {}. {}", unit.index, title);
            if !unit.description.is_empty() {
                println!("     {}", unit.description.dimmed());
            }
            for &topic_ref in &unit.topic_refs {
                // Dangling references are skipped, not shown as errors
                if let Some(topic) = topics.get(topic_ref) {
                    println!("     - {}. {}", topic.index, topic.name);
                }
            }
        }
        println!();
    }

    fn render_schedule(&self, schedule: &Schedule) {
        if self.is_muted() {
            return;
        }
        println!("{}", "Teaching schedule".bright_blue().bold());
        println!(
            "  {}h per week over {} weeks",
            schedule.weekly_hours_total, schedule.total_weeks
        );
        for entry in &schedule.monthly_plan {
            println!(
                "  {:<12} {} topics, {}h",
                entry.month, entry.topic_count, entry.hours
            );
        }
        println!();
    }

    fn render_assessment_plan(&self, plan: &AssessmentPlan) {
        if self.is_muted() {
            return;
        }
        println!("{}", "Assessment plan".bright_blue().bold());
        if plan.methods.is_empty() {
            println!("  {}", "No assessment methods yet".dimmed());
        }
        for (index, method) in plan.methods.iter().enumerate() {
            println!(
                "  {}. {:<28} {:>5}%  {}",
                index, method.name, method.weight_percent, method.frequency
            );
        }
        let total: f64 = plan.methods.iter().map(|m| m.weight_percent).sum();
        if !plan.methods.is_empty() && total != 100.0 {
            println!("  {}", format!("Weights total {total}%").yellow());
        }
        println!();
    }

    fn notify(&self, message: &str, severity: Severity) {
        match severity {
            Severity::Info => println!("{} {}", "ℹ".blue(), message),
            Severity::Success => println!("{} {}", "✓".green(), message),
            Severity::Warning => eprintln!("{} {}", "⚠️".yellow(), message.yellow()),
            Severity::Error => eprintln!("{} {}", "✗".red(), message.red()),
        }
    }

    fn confirm(&self, prompt: &str) -> bool {
        if self.assume_yes {
            return true;
        }

        print!("{} {} ", prompt, "[y/N]".dimmed());
        let _ = std::io::stdout().flush();

        let mut answer = String::new();
        match std::io::stdin().lock().read_line(&mut answer) {
            Ok(_) => is_yes(&answer),
            Err(e) => {
                tracing::warn!(error = %e, "failed to read confirmation");
                false
            }
        }
    }
}

fn format_topic(topic: &Topic) -> String {
    let check = if topic.completed {
        "[x]".green().to_string()
    } else {
        "[ ]".to_string()
    };
    let mut line = format!(
        "{} {}. {} ({}h, {})",
        check, topic.index, topic.name, topic.duration_hours, topic.difficulty
    );
    if !topic.description.is_empty() {
        line.push_str(&format!(" {}", topic.description.dimmed()));
    }
    line
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
