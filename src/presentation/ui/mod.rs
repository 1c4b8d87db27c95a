pub mod display;
pub mod prompts;

pub use display::{DisplayHelper, TaskListDisplay};
pub use prompts::{AnswerOverrides, InstallPrompts};
