pub mod achievements;
pub mod enums;
pub mod error;
pub mod plan;
pub mod settings;
pub mod stats;
pub mod task;
pub mod tips;
pub mod views;

pub use enums::{ProductiveTime, TimerState, UiMode, View};
pub use error::FocusError;
pub use settings::{ActiveHours, Settings};
pub use stats::{evaluate_streak, level_title, Stats};
pub use task::{next_task_id, PlannedStep, SubTask, Task};
pub use views::{format_countdown, format_focus_time, progress_bar, step_rows, StepRow, StepState};
