mod console_appender;
mod file_appender;
mod trait_;

pub use console_appender::{ConsoleAppender, SharedBuffer};
pub use file_appender::{FileAppender, RotateOutcome, SinkState};
pub use trait_::LogAppender;
