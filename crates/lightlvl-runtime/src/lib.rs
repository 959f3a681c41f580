//! Background scan loop and the main-thread handoff.
#![forbid(unsafe_code)]

mod queue;
mod scanner;

pub use queue::{
    HIGHLIGHT_OWNER, HighlightRenderer, HighlightTask, MainThreadQueue, TaskSender, task_queue,
};
pub use scanner::{DEFAULT_PERIOD, Scanner, ScannerState, ScannerStats};
