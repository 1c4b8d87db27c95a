use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use colored::Colorize;
use console::{measure_text_width, pad_str, Alignment};
use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};

use crate::application::services::progress::{StepObserver, StepOutcome};
use crate::common::SwagError;

/// Display utilities for the CLI interface
#[derive(Debug, Clone, Copy)]
pub struct DisplayHelper {
    pub use_color: bool,
}

impl DisplayHelper {
    pub fn new(use_color: bool) -> Self {
        Self { use_color }
    }

    /// Color only when stdout is a terminal and `NO_COLOR` is unset
    pub fn auto(no_color: bool) -> Self {
        let use_color =
            !no_color && atty::is(atty::Stream::Stdout) && std::env::var("NO_COLOR").is_err();
        Self::new(use_color)
    }

    pub fn success(&self, message: &str) {
        if self.use_color {
            println!("{} {}", "✔".green().bold(), message);
        } else {
            println!("[SUCCESS] {}", message);
        }
    }

    pub fn error(&self, message: &str) {
        if self.use_color {
            eprintln!("{} {}", "✗".red().bold(), message.red());
        } else {
            eprintln!("✗ {}", message);
        }
    }

    pub fn warning(&self, message: &str) {
        if self.use_color {
            println!("{} {}", "⚠".yellow().bold(), message);
        } else {
            println!("[WARNING] {}", message);
        }
    }

    pub fn info(&self, message: &str) {
        if self.use_color {
            println!("{} {}", "::".blue().bold(), message);
        } else {
            println!("[INFO] {}", message);
        }
    }

    /// Print `name  description` rows with aligned descriptions
    pub fn print_table(&self, rows: &[(&str, &str)]) {
        let width = rows
            .iter()
            .map(|(name, _)| measure_text_width(name))
            .max()
            .unwrap_or(0);
        for (name, description) in rows {
            let padded = pad_str(name, width, Alignment::Left, None);
            if self.use_color {
                println!("  {}  {}", padded.cyan().bold(), description.dimmed());
            } else {
                println!("  {}  {}", padded, description);
            }
        }
    }
}

/// Task list with one spinner per running step
///
/// Spinners are drawn only when colors are enabled; otherwise every finished
/// step is printed as one line.
pub struct TaskListDisplay {
    display: DisplayHelper,
    progress: MultiProgress,
    running: Mutex<HashMap<String, ProgressBar>>,
}

impl TaskListDisplay {
    pub fn new(display: DisplayHelper) -> Self {
        let progress = if display.use_color {
            MultiProgress::new()
        } else {
            MultiProgress::with_draw_target(ProgressDrawTarget::hidden())
        };
        Self {
            display,
            progress,
            running: Mutex::new(HashMap::new()),
        }
    }

    fn spinner(&self, title: &str) -> ProgressBar {
        let spinner = self.progress.add(ProgressBar::new_spinner());
        if let Ok(style) = ProgressStyle::default_spinner()
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "✔"])
            .template("{spinner:.yellow} {msg}")
        {
            spinner.set_style(style);
        }
        spinner.set_message(title.to_string());
        spinner.enable_steady_tick(Duration::from_millis(80));
        spinner
    }

    fn take(&self, title: &str) -> Option<ProgressBar> {
        self.running.lock().ok().and_then(|mut running| running.remove(title))
    }

    fn finish(&self, title: &str, line: String) {
        match self.take(title) {
            Some(spinner) if self.display.use_color => spinner.finish_with_message(line),
            _ => println!("{}", line),
        }
    }
}

impl StepObserver for TaskListDisplay {
    fn step_started(&self, title: &str) {
        if !self.display.use_color {
            return;
        }
        let spinner = self.spinner(title);
        if let Ok(mut running) = self.running.lock() {
            running.insert(title.to_string(), spinner);
        }
    }

    fn step_finished(&self, title: &str, outcome: &StepOutcome) {
        let line = match (outcome, self.display.use_color) {
            (StepOutcome::Done, true) => format!("{} {}", "✔".green(), title),
            (StepOutcome::Done, false) => format!("✔ {}", title),
            (StepOutcome::Skipped(reason), true) => {
                format!("{} {} {}", "↓".yellow(), title, format!("[skipped: {}]", reason).dimmed())
            }
            (StepOutcome::Skipped(reason), false) => format!("↓ {} [skipped: {}]", title, reason),
        };
        self.finish(title, line);
    }

    fn step_failed(&self, title: &str, error: &SwagError) {
        let line = if self.display.use_color {
            format!("{} {} {}", "✖".red(), title, format!("({})", error).red())
        } else {
            format!("✖ {} ({})", title, error)
        };
        match self.take(title) {
            Some(spinner) if self.display.use_color => spinner.abandon_with_message(line),
            _ => eprintln!("{}", line),
        }
    }
}
