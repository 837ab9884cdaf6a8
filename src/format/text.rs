//! Text formatting for terminal output.
//!
//! Plain text unless `use_color` is set, in which case ANSI styling comes
//! from `crossterm`.

use crate::aggregate::{ReadyTask, StatusSummary, TaskView};
use crate::classify::Label;
use crate::model::{IssueType, Priority};
use crossterm::style::Stylize;
use std::fmt::Write as _;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Label icon characters.
pub mod icons {
    /// Ready - available to work (hollow circle).
    pub const READY: &str = "○";
    /// In progress - active work (half-filled).
    pub const IN_PROGRESS: &str = "◐";
    /// Blocked - waiting on another issue (filled circle).
    pub const BLOCKED: &str = "●";
    /// Done (checkmark).
    pub const DONE: &str = "✓";
}

/// Formatting options for text output.
#[derive(Debug, Clone, Copy)]
pub struct TextFormatOptions {
    pub use_color: bool,
    pub max_width: Option<usize>,
}

impl TextFormatOptions {
    #[must_use]
    pub const fn plain() -> Self {
        Self {
            use_color: false,
            max_width: None,
        }
    }
}

#[must_use]
pub const fn format_label_icon(label: Label) -> &'static str {
    match label {
        Label::Ready => icons::READY,
        Label::InProgress => icons::IN_PROGRESS,
        Label::Blocked => icons::BLOCKED,
        Label::Done => icons::DONE,
    }
}

#[must_use]
pub fn format_label_icon_colored(label: Label, use_color: bool) -> String {
    let icon = format_label_icon(label);
    if !use_color {
        return icon.to_string();
    }

    match label {
        Label::Ready => icon.green().to_string(),
        Label::InProgress => icon.yellow().to_string(),
        Label::Blocked => icon.red().to_string(),
        Label::Done => icon.dark_grey().to_string(),
    }
}

/// Format priority as "P0", "P1", etc.
#[must_use]
pub fn format_priority(priority: &Priority) -> String {
    format!("P{}", priority.0)
}

/// Format priority label with optional color.
#[must_use]
pub fn format_priority_label(priority: &Priority, use_color: bool) -> String {
    let label = format_priority(priority);
    if !use_color {
        return label;
    }

    match priority.0 {
        0 => label.red().bold().to_string(),
        1 => label.red().to_string(),
        2 => label.yellow().to_string(),
        3 | 4 => label.dark_grey().to_string(),
        _ => label,
    }
}

#[must_use]
pub fn format_priority_badge(priority: &Priority, use_color: bool) -> String {
    format!("[{}]", format_priority_label(priority, use_color))
}

/// Format issue type as a bracketed badge.
#[must_use]
pub fn format_type_badge(issue_type: &IssueType) -> String {
    format!("[{}]", issue_type.as_str())
}

#[must_use]
pub fn format_type_badge_colored(issue_type: &IssueType, use_color: bool) -> String {
    let label = issue_type.as_str();
    if !use_color {
        return format!("[{label}]");
    }

    let colored = match issue_type {
        IssueType::Bug => label.red().to_string(),
        IssueType::Feature => label.cyan().to_string(),
        IssueType::Task | IssueType::Custom(_) => label.to_string(),
        IssueType::Epic => label.magenta().bold().to_string(),
        IssueType::Docs | IssueType::Question => label.blue().to_string(),
        IssueType::Chore => label.dark_grey().to_string(),
    };

    format!("[{colored}]")
}

/// Terminal width: `COLUMNS`, then the tty size, then 80.
#[must_use]
pub fn terminal_width() -> usize {
    if let Ok(columns) = std::env::var("COLUMNS") {
        if let Ok(value) = columns.trim().parse::<usize>() {
            if value > 0 {
                return value;
            }
        }
    }
    crossterm::terminal::size()
        .ok()
        .map(|(cols, _)| usize::from(cols))
        .filter(|&cols| cols > 0)
        .unwrap_or(80)
}

/// Truncate a title to fit within `max_len` visible columns.
///
/// Handles wide characters (emojis, CJK) correctly using `unicode-width`.
#[must_use]
pub fn truncate_title(title: &str, max_len: usize) -> String {
    if max_len == 0 {
        return String::new();
    }
    if UnicodeWidthStr::width(title) <= max_len {
        return title.to_string();
    }

    let (target, ellipsis) = if max_len <= 3 {
        (max_len, "")
    } else {
        (max_len - 3, "...")
    };

    let mut w = 0;
    let mut s = String::new();
    for c in title.chars() {
        let cw = UnicodeWidthChar::width(c).unwrap_or(0);
        if w + cw > target {
            break;
        }
        w += cw;
        s.push(c);
    }
    s.push_str(ellipsis);
    s
}

fn fit_title(title: &str, prefix: &str, options: TextFormatOptions) -> String {
    options.max_width.map_or_else(
        || title.to_string(),
        |width| truncate_title(title, width.saturating_sub(UnicodeWidthStr::width(prefix) + 1)),
    )
}

/// One line per task.
///
/// Format: `{icon} {id} [{priority}] [{type}] {title}`, followed by
/// `(blocked by: ...)` for blocked tasks.
#[must_use]
pub fn format_task_line(task: &TaskView, options: TextFormatOptions) -> String {
    let suffix = if task.blocked_by.is_empty() {
        String::new()
    } else {
        format!(" (blocked by: {})", task.blocked_by.join(", "))
    };

    let plain_prefix = format!(
        "{} {} {} {}",
        format_label_icon(task.computed_label),
        task.id,
        format_priority_badge(&task.priority, false),
        format_type_badge(&task.issue_type),
    );
    let title = fit_title(&task.title, &format!("{plain_prefix}{suffix}"), options);

    format!(
        "{} {} {} {} {title}{suffix}",
        format_label_icon_colored(task.computed_label, options.use_color),
        task.id,
        format_priority_badge(&task.priority, options.use_color),
        format_type_badge_colored(&task.issue_type, options.use_color),
    )
}

/// Format: `{n}. [{priority}] {id}: {title}`
#[must_use]
pub fn format_ready_line(index: usize, task: &ReadyTask, options: TextFormatOptions) -> String {
    let plain_prefix = format!(
        "{index}. {} {}:",
        format_priority_badge(&task.priority, false),
        task.id
    );
    let title = fit_title(&task.title, &plain_prefix, options);
    format!(
        "{index}. {} {}: {title}",
        format_priority_badge(&task.priority, options.use_color),
        task.id
    )
}

/// Multi-line summary block.
#[must_use]
pub fn format_status_summary(summary: &StatusSummary, use_color: bool) -> String {
    let blocked = summary
        .total
        .saturating_sub(summary.ready + summary.in_progress + summary.completed);
    let rows = [
        (Label::Ready, "Ready", summary.ready),
        (Label::InProgress, "In progress", summary.in_progress),
        (Label::Blocked, "Blocked", blocked),
        (Label::Done, "Completed", summary.completed),
    ];

    let mut out = format!("Total issues: {}\n", summary.total);
    for (label, name, count) in rows {
        let _ = writeln!(
            out,
            "  {} {name:<12} {count}",
            format_label_icon_colored(label, use_color)
        );
    }
    out
}
