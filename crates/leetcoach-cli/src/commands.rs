/// Result of processing a slash command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandResult {
    /// Display a message to the user.
    Message(String),
    /// Quit the application.
    Quit,
    /// Start a fresh conversation.
    NewConversation,
    /// Flip between light and dark.
    ToggleTheme,
    /// Set the theme by name.
    ThemeChanged(String),
    /// Show the loaded problem, if any.
    ShowContext,
    /// List the contacts.
    ShowContacts,
    /// Make another contact active. Resets the conversation.
    SwitchContact(String),
    /// Not a command - treat as regular input.
    NotACommand,
}

pub fn handle_command(input: &str) -> CommandResult {
    let input = input.trim();
    let parts: Vec<&str> = input.splitn(2, ' ').collect();
    let cmd = parts[0];
    let arg = parts.get(1).map(|s| s.trim()).unwrap_or("");

    match cmd {
        "/help" | "/h" => show_help(),
        "/exit" | "/quit" | "/q" => CommandResult::Quit,
        "/new" | "/clear" => CommandResult::NewConversation,

        "/theme" => {
            if arg.is_empty() {
                CommandResult::ToggleTheme
            } else if crate::theme::Theme::all_names().contains(&arg) {
                CommandResult::ThemeChanged(arg.to_string())
            } else {
                let themes = crate::theme::Theme::all_names().join(", ");
                CommandResult::Message(format!("Available themes: {themes}\nUsage: /theme [name]"))
            }
        }

        "/context" | "/problem" => CommandResult::ShowContext,
        "/contacts" => CommandResult::ShowContacts,
        "/switch" => {
            if arg.is_empty() {
                CommandResult::Message("Usage: /switch <contact-name>".into())
            } else {
                CommandResult::SwitchContact(arg.to_string())
            }
        }
        "/version" => CommandResult::Message(format!("LeetCoach v{}", env!("CARGO_PKG_VERSION"))),

        _ => {
            if input.starts_with('/') {
                CommandResult::Message(format!("Unknown command: {cmd}. Type /help for commands."))
            } else {
                CommandResult::NotACommand
            }
        }
    }
}

fn show_help() -> CommandResult {
    let help_text = "\
╭─ LeetCoach Commands ─────────────────────────────────────╮

  Paste a LeetCode problem URL to load it, or just ask.

  CHAT
    /new, /clear          Start a fresh conversation
    /context              Show the loaded problem
    /contacts             List contacts
    /switch <name>        Talk to another contact (starts over)

  DISPLAY
    /theme [light|dark]   Toggle or set the color theme

  OTHER
    /help, /h             Show this help message
    /version              Show version information
    /exit, /quit, /q      Quit

╰──────────────────────────────────────────────────────────╯";

    CommandResult::Message(help_text.into())
}
