use crate::domain::achievements;
use crate::domain::{format_focus_time, level_title, progress_bar, Settings, Stats, Task};
use crate::persistence::{atomic_write, FocusRepository};
use crate::report::stats::{calculate_focus_summary, calculate_task_summary};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::path::{Path, PathBuf};

/// Format percentage with 1 decimal place
fn format_percent(value: f64) -> String {
    format!("{:.1}%", value)
}

fn ratio_percent(done: u32, total: u32) -> f64 {
    if total == 0 {
        0.0
    } else {
        done as f64 / total as f64 * 100.0
    }
}

/// One-paragraph text for sharing progress
pub fn share_text(stats: &Stats) -> String {
    format!(
        "Я уже выполнил {} сессий в ФокусПомощнике! 🎯 Сфокусировался {} часов и набрал {} XP. Текущий уровень: {} 🚀",
        stats.total_sessions,
        (stats.total_focus_time / 60.0).floor() as u32,
        stats.xp,
        stats.level
    )
}

/// Render the progress report as markdown
pub fn render_report(date: NaiveDate, settings: &Settings, tasks: &[Task], stats: &Stats) -> String {
    let task_summary = calculate_task_summary(tasks);
    let focus = calculate_focus_summary(stats);

    let mut report = String::new();

    report.push_str(&format!("# Focus Report - {}\n\n", date));

    // Level
    report.push_str("## Progress\n\n");
    report.push_str(&format!(
        "- **Level:** {} ({}) - {} XP, {} to next level\n",
        stats.level,
        level_title(stats.xp),
        stats.xp,
        focus.xp_to_next_level
    ));
    report.push_str(&format!(
        "- **Sessions:** {} ({} focused, avg {:.0}m)\n",
        stats.total_sessions,
        format_focus_time(stats.total_focus_time),
        focus.avg_session_minutes
    ));
    report.push_str(&format!(
        "- **Streak:** {} days (longest {})\n",
        stats.current_streak, stats.longest_streak
    ));
    report.push_str(&format!(
        "- **Plan:** {}h/day, {}, {} min sessions with {} min breaks\n\n",
        settings.daily_hours,
        settings.productive_time.label(),
        settings.pomodoro_length,
        settings.break_length
    ));

    // Achievements
    report.push_str("## Achievements\n\n");
    for achievement in achievements::ACHIEVEMENTS {
        let unlocked = stats.achievements.iter().find(|a| a.id == achievement.id);
        match unlocked {
            Some(entry) => report.push_str(&format!(
                "- [x] {} **{}** - {} (unlocked {})\n",
                achievement.icon,
                achievement.title,
                achievement.description,
                entry.unlocked_at.format("%Y-%m-%d")
            )),
            None => report.push_str(&format!(
                "- [ ] {} **{}** - {}\n",
                achievement.icon, achievement.title, achievement.description
            )),
        }
    }
    report.push('\n');

    // Tasks
    report.push_str("## Tasks\n\n");
    report.push_str(&format!(
        "- **Tasks:** {}/{} complete, {}/{} steps\n",
        task_summary.completed_tasks, task_summary.total_tasks, task_summary.completed_steps, task_summary.total_steps
    ));
    report.push_str(&format!(
        "- **Pomodoros:** {}/{} ({})\n\n",
        task_summary.completed_pomodoros,
        task_summary.total_pomodoros,
        format_percent(ratio_percent(task_summary.completed_pomodoros, task_summary.total_pomodoros))
    ));

    for task in tasks {
        let mark = if task.is_complete() { "x" } else { " " };
        let deadline = task
            .deadline
            .as_ref()
            .map(|d| format!(" (deadline: {})", d))
            .unwrap_or_default();
        report.push_str(&format!("- [{}] **{}**{}\n", mark, task.title, deadline));
        report.push_str(&format!(
            "  - {} {}/{} pomodoros\n",
            progress_bar(task.progress_percent(), 10),
            task.completed_pomodoros,
            task.total_pomodoros
        ));
        for subtask in &task.sub_tasks {
            let sub_mark = if subtask.completed { "x" } else { " " };
            report.push_str(&format!(
                "    - [{}] {} ({}/{})\n",
                sub_mark, subtask.title, subtask.completed_pomodoros, subtask.estimated_pomodoros
            ));
        }
    }
    if !tasks.is_empty() {
        report.push('\n');
    }

    report.push_str("## Share\n\n");
    report.push_str(&format!("> {}\n", share_text(stats)));

    report
}

/// Generate the report from the persisted blobs and write it
pub fn generate_report(repo: &FocusRepository, data_dir: &Path, date: NaiveDate, output_path: Option<PathBuf>) -> Result<PathBuf> {
    let settings = repo.load_settings();
    let tasks = repo.load_tasks();
    let stats = repo.load_stats();

    let report = render_report(date, &settings, &tasks, &stats);

    let output = output_path.unwrap_or_else(|| data_dir.join(format!("report-{}.md", date)));
    atomic_write(&output, &report).with_context(|| format!("Failed to write report: {}", output.display()))?;

    Ok(output)
}
