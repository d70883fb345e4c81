//! Command implementations.

mod doc;
mod hook;
mod menu;

pub use doc::DocCommand;
pub use hook::HookCommand;
pub use menu::{MenuAction, MenuCommand};
