pub mod input;
pub mod output;
pub mod tool_use;

pub use input::{HookEvent, HookInput};
pub use output::{Outcome, Verdict};
pub use tool_use::ToolUse;
