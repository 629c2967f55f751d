use anyhow::Result;
use std::io::{self, Write};
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::task::{JoinError, JoinHandle};
use tracing::{debug, warn};

use leetcoach_core::{
    ControllerOptions, ConversationController, HttpChatBackend, HttpProblemLookup, ProblemLookup,
    Sender, Settings, SubmitOutcome,
};

use crate::commands::{self, CommandResult};
use crate::render;
use crate::theme::Theme;

const CONTACTS: &[&str] = &["LeetCode Guide", "Interview Coach", "Study Buddy"];

const WELCOME: &str = "\
Welcome to LeetCode Assistant
Enter a LeetCode problem URL or ask a coding question to start!

You can try:
  • Paste a LeetCode problem URL
  • \"Help me understand dynamic programming\"
  • \"How do I implement a binary search tree?\"

Type /help for commands.";

pub fn build_controller(settings: &Settings) -> Result<ConversationController> {
    let client = &settings.client;
    let backend = Arc::new(HttpChatBackend::new(&client.endpoint, client.timeout())?);

    let lookup: Option<Arc<dyn ProblemLookup>> = if client.context_detection {
        Some(Arc::new(
            HttpProblemLookup::new(&client.endpoint, client.timeout())?
                .with_resource(&settings.lookup.resource),
        ))
    } else {
        None
    };

    let options = ControllerOptions {
        context_detection: client.context_detection,
        site: settings.lookup.site.clone(),
        timeout: client.timeout(),
    };
    Ok(ConversationController::new(backend, lookup, options)?)
}

fn input_hint(controller: &ConversationController) -> String {
    match controller.problem_context() {
        Some(problem) => format!("Ask about \"{}\"...", problem.title),
        None => "Enter a LeetCode URL or ask a question...".to_string(),
    }
}

fn write_new_turns(
    out: &mut impl Write,
    controller: &ConversationController,
    shown: &mut usize,
    include_user: bool,
    theme: Theme,
) -> io::Result<()> {
    let transcript = controller.transcript();
    for turn in transcript.iter().skip(*shown) {
        if include_user || turn.sender() != Sender::User {
            render::write_turn(out, turn, theme)?;
        }
    }
    *shown = transcript.len();
    Ok(())
}

// ── Single-prompt mode ──────────────────────────────────────────────────

pub async fn run_single_prompt(settings: &Settings, prompt: &str, theme: Theme) -> Result<()> {
    let controller = build_controller(settings)?;
    let outcome = controller.submit(prompt).await;
    debug!(?outcome, "single prompt finished");

    let mut out = io::stdout();
    let mut shown = 0;
    write_new_turns(&mut out, &controller, &mut shown, true, theme)?;

    match outcome {
        SubmitOutcome::Ignored => anyhow::bail!("prompt is empty"),
        SubmitOutcome::ReplyFailed => {
            anyhow::bail!("no reply from {}", settings.client.endpoint)
        }
        _ => Ok(()),
    }
}

// ── Interactive REPL ────────────────────────────────────────────────────

struct ReplState {
    controller: Arc<ConversationController>,
    theme: Theme,
    contact: usize,
    show_contacts: bool,
    shown: usize,
}

impl ReplState {
    fn reset(&mut self) {
        self.controller.reset();
        self.shown = 0;
    }
}

async fn wait_for(pending: &mut Option<JoinHandle<SubmitOutcome>>) -> Result<SubmitOutcome, JoinError> {
    match pending {
        Some(handle) => handle.await,
        None => std::future::pending().await,
    }
}

pub async fn run_repl(settings: Settings, theme: Theme) -> Result<()> {
    let controller = Arc::new(build_controller(&settings)?);
    let input = BufReader::new(tokio::io::stdin());
    run_session(
        controller,
        input,
        &mut io::stdout(),
        theme,
        settings.client.show_contacts,
    )
    .await
}

/// Drive one chat session from `input` until `/quit` or end of input.
///
/// At end of input a submission that is still running is awaited and its turns
/// are written before returning.
pub async fn run_session<R, W>(
    controller: Arc<ConversationController>,
    input: R,
    out: &mut W,
    theme: Theme,
    show_contacts: bool,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut state = ReplState {
        controller,
        theme,
        contact: 0,
        show_contacts,
        shown: 0,
    };

    render::write_notice(out, WELCOME, state.theme)?;
    if !state.controller.context_detection_enabled() {
        render::write_notice(out, "(problem URL detection is off)", state.theme)?;
    }
    render::write_notice(out, &input_hint(&state.controller), state.theme)?;

    let mut lines = input.lines();
    let mut pending: Option<JoinHandle<SubmitOutcome>> = None;

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    if let Some(handle) = pending.take() {
                        debug!("input closed, waiting for the last reply");
                        finish_submission(out, &mut state, handle.await)?;
                    }
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }

                match commands::handle_command(&line) {
                    CommandResult::NotACommand => {
                        if pending.is_some() {
                            render::write_error(
                                out,
                                "Still waiting on the last reply. Please wait before sending another message.",
                                state.theme,
                            )?;
                            continue;
                        }
                        render::write_notice(out, "Guide is typing...", state.theme)?;
                        let controller = state.controller.clone();
                        pending = Some(tokio::spawn(async move { controller.submit(&line).await }));
                    }
                    CommandResult::Quit => break,
                    result => apply_command(out, &mut state, result)?,
                }
            }
            finished = wait_for(&mut pending), if pending.is_some() => {
                pending = None;
                finish_submission(out, &mut state, finished)?;
            }
        }
    }

    Ok(())
}

fn finish_submission(
    out: &mut impl Write,
    state: &mut ReplState,
    finished: Result<SubmitOutcome, JoinError>,
) -> io::Result<()> {
    match finished {
        Ok(SubmitOutcome::Discarded) => Ok(()),
        Ok(outcome) => {
            debug!(?outcome, "submission finished");
            write_new_turns(out, &state.controller, &mut state.shown, false, state.theme)?;
            render::write_notice(out, &input_hint(&state.controller), state.theme)
        }
        Err(e) => {
            warn!(error = %e, "submission task failed");
            Ok(())
        }
    }
}

fn apply_command(out: &mut impl Write, state: &mut ReplState, result: CommandResult) -> io::Result<()> {
    match result {
        CommandResult::Message(text) => render::write_notice(out, &text, state.theme),
        CommandResult::NewConversation => {
            state.reset();
            render::write_notice(out, "Started a new conversation.", state.theme)
        }
        CommandResult::ToggleTheme => {
            state.theme = state.theme.toggled();
            render::write_notice(out, &format!("Theme: {}", state.theme.name()), state.theme)
        }
        CommandResult::ThemeChanged(name) => {
            state.theme = Theme::by_name(&name);
            render::write_notice(out, &format!("Theme: {}", state.theme.name()), state.theme)
        }
        CommandResult::ShowContext => {
            let text = match state.controller.problem_context() {
                Some(problem) => format!(
                    "{} [{}]\nTags: {}",
                    problem.title,
                    problem.difficulty,
                    if problem.tags.is_empty() {
                        "none".to_string()
                    } else {
                        problem.tags_label()
                    }
                ),
                None => "No problem loaded. Paste a LeetCode problem URL to load one.".to_string(),
            };
            render::write_notice(out, &text, state.theme)
        }
        CommandResult::ShowContacts => {
            if !state.show_contacts {
                return render::write_notice(out, "Contacts are hidden (client.show_contacts = false).", state.theme);
            }
            let list = CONTACTS
                .iter()
                .enumerate()
                .map(|(i, name)| {
                    let marker = if i == state.contact { "●" } else { "○" };
                    format!("  {marker} {name}")
                })
                .collect::<Vec<_>>()
                .join("\n");
            render::write_notice(out, &format!("Contacts:\n{list}"), state.theme)
        }
        CommandResult::SwitchContact(name) => {
            match find_contact(&name) {
                Some(index) if index == state.contact => {
                    render::write_notice(out, &format!("Already talking to {}.", CONTACTS[index]), state.theme)
                }
                Some(index) => {
                    state.contact = index;
                    state.reset();
                    render::write_notice(
                        out,
                        &format!("Switched to {}. Started a new conversation.", CONTACTS[index]),
                        state.theme,
                    )
                }
                None => render::write_error(out, &format!("Unknown contact: {name}"), state.theme),
            }
        }
        CommandResult::Quit | CommandResult::NotACommand => Ok(()),
    }
}

/// Case-insensitive match on the full name or its first word.
pub fn find_contact(name: &str) -> Option<usize> {
    let wanted = name.trim().to_lowercase();
    CONTACTS.iter().position(|contact| {
        let contact = contact.to_lowercase();
        contact == wanted || contact.split_whitespace().next() == Some(wanted.as_str())
    })
}

pub fn contacts() -> &'static [&'static str] {
    CONTACTS
}
