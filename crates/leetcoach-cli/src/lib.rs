// Library interface for leetcoach-cli, so integration tests can reach the
// command parser, the theme and the renderer.

pub mod app;
pub mod commands;
pub mod render;
pub mod theme;

pub use commands::{handle_command, CommandResult};
pub use theme::Theme;
