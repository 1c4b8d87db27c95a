pub mod console_flags;

pub use console_flags::{ConsoleFlags, FlagValue, ForwardedArgs};
