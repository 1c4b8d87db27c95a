pub mod progress;
pub mod shopware_console;

pub use progress::{LoggingObserver, StepObserver, StepOutcome, StepReport};
pub use shopware_console::ShopwareConsole;
