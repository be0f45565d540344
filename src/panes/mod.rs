mod help_pane;
mod menu_pane;
mod prompt_pane;

pub use help_pane::HelpPane;
pub use menu_pane::MenuPane;
pub use prompt_pane::PromptPane;
