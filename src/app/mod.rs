pub mod search;
mod state;

pub use search::QuickSearch;
pub use state::{App, InputMode, Mode, Prompt, PromptKind};
