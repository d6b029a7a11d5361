//! Plain-text views for task lists and the month grid.

use lazytask_core::{DayCell, MonthView, Task, TaskStatus};
use std::fmt::Write;

/// Characters of the task id shown in lists.
pub const SHORT_ID_LEN: usize = 8;
const CELL_WIDTH: usize = 14;
const WEEKDAY_HEADER: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

pub fn short_id(task: &Task) -> String {
    task.id.simple().to_string()[..SHORT_ID_LEN].to_string()
}

fn status_mark(status: TaskStatus) -> &'static str {
    match status {
        TaskStatus::Active => "[ ]",
        TaskStatus::Paused => "[-]",
        TaskStatus::Completed => "[x]",
    }
}

pub fn task_line(task: &Task) -> String {
    let mut line = format!(
        "{} {} {}  {:<6} {}",
        status_mark(task.status),
        short_id(task),
        task.due_date.format("%Y-%m-%d %H:%M"),
        task.priority.as_str(),
        task.title
    );
    if let Some(category) = &task.category {
        let _ = write!(line, " #{category}");
    }
    if task.recurrence.is_repeating() {
        let _ = write!(line, " ({})", task.recurrence.describe());
    }
    line
}

pub fn task_list(tasks: &[Task]) -> String {
    if tasks.is_empty() {
        return "no tasks\n".to_string();
    }
    tasks.iter().fold(String::new(), |mut out, task| {
        out.push_str(&task_line(task));
        out.push('\n');
        out
    })
}

fn truncate(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        return value.to_string();
    }
    let mut cut: String = value.chars().take(width.saturating_sub(1)).collect();
    cut.push('~');
    cut
}

/// Text lines of one day cell: day header, entries, then `+N` overflow.
fn cell_lines(cell: &DayCell, height: usize) -> Vec<String> {
    let marker = if cell.is_today { "*" } else { "" };
    let day = if cell.in_month {
        format!("{}{marker}", cell.date.format("%e").to_string().trim())
    } else {
        format!("({}){marker}", cell.date.format("%e").to_string().trim())
    };
    let mut lines = vec![day];
    for entry in &cell.entries {
        let label = format!("{} {}", entry.date.format("%H:%M"), entry.title);
        lines.push(truncate(&label, CELL_WIDTH));
    }
    if cell.overflow > 0 {
        lines.push(format!("+{}", cell.overflow));
    }
    lines.resize(height, String::new());
    lines
}

/// Renders a Sunday-first grid. Days outside the month are parenthesized
/// and today carries a `*`.
pub fn month_grid(view: &MonthView) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", view.month.format("%B %Y"));

    let header: Vec<String> = WEEKDAY_HEADER
        .iter()
        .map(|name| format!("{name:<width$}", width = CELL_WIDTH))
        .collect();
    let _ = writeln!(out, "{}", header.join("|").trim_end());

    for week in view.weeks() {
        let height = week
            .iter()
            .map(|cell| 1 + cell.entries.len() + usize::from(cell.overflow > 0))
            .max()
            .unwrap_or(1);
        let columns: Vec<Vec<String>> = week.iter().map(|cell| cell_lines(cell, height)).collect();
        let _ = writeln!(out, "{}", vec!["-".repeat(CELL_WIDTH); 7].join("+"));
        for row in 0..height {
            let line: Vec<String> = columns
                .iter()
                .map(|column| format!("{:<width$}", column[row], width = CELL_WIDTH))
                .collect();
            let _ = writeln!(out, "{}", line.join("|").trim_end());
        }
    }
    out
}
