//! Output formatting for `bready`.
//!
//! JSON output is plain `serde_json` over the aggregate views; this module
//! only covers the human-readable text side:
//! - Label icons (○ ◐ ● ✓)
//! - Priority badges (P0-P4)
//! - Type badges ([bug], [feature], etc.)
//! - Task, ready-task and summary rendering

mod text;

pub use text::{
    TextFormatOptions, format_label_icon, format_label_icon_colored, format_priority,
    format_priority_badge, format_priority_label, format_ready_line, format_status_summary,
    format_task_line, format_type_badge, format_type_badge_colored, terminal_width,
    truncate_title,
};
