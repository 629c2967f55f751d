use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::time::error::Elapsed;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::history::Conversation;
use super::turn::{Sender, Turn};
use crate::adapter::{ChatCompletion, ChatRequest, ErrorBody};
use crate::error::{CoachError, Result};
use crate::problem::{ProblemContext, ProblemLookup, ProblemUrlMatcher};

pub const CONTEXT_FAILED_NOTICE: &str =
    "I couldn't load the problem from that URL. Please check the link or describe the problem manually.";

pub const REPLY_FAILED_NOTICE: &str =
    "Sorry, there was an error connecting to the AI. Please try again.";

fn context_loaded_notice(problem: &ProblemContext) -> String {
    format!(
        "I've loaded the LeetCode problem \"{}\". What specific part are you stuck on?",
        problem.title
    )
}

/// The chat service as seen by the controller.
#[async_trait::async_trait]
pub trait ChatBackend: Send + Sync {
    async fn complete(&self, request: &ChatRequest) -> Result<ChatCompletion>;
}

/// Talks to `POST {endpoint}/api/chat`.
pub struct HttpChatBackend {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpChatBackend {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: reqwest::Client::builder().timeout(timeout).build()?,
            endpoint: endpoint.into(),
        })
    }

    pub fn url(&self) -> String {
        format!("{}/api/chat", self.endpoint.trim_end_matches('/'))
    }
}

#[async_trait::async_trait]
impl ChatBackend for HttpChatBackend {
    async fn complete(&self, request: &ChatRequest) -> Result<ChatCompletion> {
        let response = self.client.post(self.url()).json(request).send().await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let detail = match serde_json::from_str::<ErrorBody>(&body) {
                Ok(ErrorBody {
                    error,
                    details: Some(details),
                }) => format!("{error}: {details}"),
                Ok(ErrorBody { error, .. }) => error,
                Err(_) => body,
            };
            return Err(CoachError::provider(format!(
                "chat service error ({status}): {detail}"
            )));
        }

        let completion: ChatCompletion = serde_json::from_str(&body)
            .map_err(|e| CoachError::malformed(format!("Failed to parse response: {e}")))?;
        if completion.text().is_none() {
            return Err(CoachError::malformed("response has no completion content"));
        }
        Ok(completion)
    }
}

#[derive(Debug, Clone)]
pub struct ControllerOptions {
    /// Recognize problem URLs and load their context. Needs a lookup to take effect.
    pub context_detection: bool,
    /// Host whose `/problems/<slug>` URLs are recognized.
    pub site: String,
    /// Upper bound for each lookup and chat call.
    pub timeout: Duration,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            context_detection: true,
            site: "leetcode.com".to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// How a single submission ended. The controller is idle again in every case.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Blank input. Nothing was recorded or sent.
    Ignored,
    /// Another submission is still in flight.
    Busy,
    ContextLoaded(ProblemContext),
    ContextFailed,
    Replied,
    ReplyFailed,
    /// The session was reset while the call was outstanding; its result was dropped.
    Discarded,
}

struct ContextDetector {
    matcher: ProblemUrlMatcher,
    lookup: Arc<dyn ProblemLookup>,
}

struct Session {
    id: Uuid,
    conversation: Conversation,
    problem: Option<ProblemContext>,
    cancel: CancellationToken,
}

impl Session {
    fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            conversation: Conversation::new(),
            problem: None,
            cancel: CancellationToken::new(),
        }
    }
}

enum Route {
    LoadContext(String),
    Reply(ChatRequest),
}

/// Releases the single-flight slot on every exit path.
struct FlightGuard<'a>(&'a AtomicBool);

impl<'a> FlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Owns one chat session and runs the turn-taking protocol for it.
pub struct ConversationController {
    backend: Arc<dyn ChatBackend>,
    detector: Option<ContextDetector>,
    timeout: Duration,
    session: Mutex<Session>,
    in_flight: AtomicBool,
    next_turn_id: AtomicU64,
}

impl ConversationController {
    pub fn new(
        backend: Arc<dyn ChatBackend>,
        lookup: Option<Arc<dyn ProblemLookup>>,
        options: ControllerOptions,
    ) -> Result<Self> {
        let detector = match lookup {
            Some(lookup) if options.context_detection => Some(ContextDetector {
                matcher: ProblemUrlMatcher::new(&options.site)?,
                lookup,
            }),
            _ => None,
        };

        Ok(Self {
            backend,
            detector,
            timeout: options.timeout,
            session: Mutex::new(Session::new()),
            in_flight: AtomicBool::new(false),
            next_turn_id: AtomicU64::new(1),
        })
    }

    pub fn context_detection_enabled(&self) -> bool {
        self.detector.is_some()
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    pub fn session_id(&self) -> Uuid {
        self.session().id
    }

    pub fn transcript(&self) -> Vec<Turn> {
        self.session().conversation.turns().to_vec()
    }

    pub fn problem_context(&self) -> Option<ProblemContext> {
        self.session().problem.clone()
    }

    /// Start a fresh session. Any outstanding call is cancelled and its result discarded.
    pub fn reset(&self) {
        let mut session = self.session();
        session.cancel.cancel();
        *session = Session::new();
        info!(session = %session.id, "session reset");
    }

    /// Run one submission to completion.
    pub async fn submit(&self, input: &str) -> SubmitOutcome {
        let text = input.trim();
        if text.is_empty() {
            return SubmitOutcome::Ignored;
        }

        let Some(_flight) = FlightGuard::acquire(&self.in_flight) else {
            debug!("rejecting submission while another is in flight");
            return SubmitOutcome::Busy;
        };

        let (session_id, cancel, route) = {
            let mut session = self.session();
            let slug = match (&self.detector, &session.problem) {
                (Some(detector), None) => detector.matcher.slug(text),
                _ => None,
            };

            let turn = self.turn(Sender::User, text);
            session.conversation.push(turn);

            let route = match slug {
                Some(slug) => Route::LoadContext(slug),
                None => Route::Reply(
                    ChatRequest::new(session.conversation.to_chat_messages())
                        .with_problem_context(session.problem.clone()),
                ),
            };
            (session.id, session.cancel.clone(), route)
        };

        match route {
            Route::LoadContext(slug) => self.load_context(session_id, &cancel, &slug).await,
            Route::Reply(request) => self.request_reply(session_id, &cancel, &request).await,
        }
    }

    async fn load_context(
        &self,
        session_id: Uuid,
        cancel: &CancellationToken,
        slug: &str,
    ) -> SubmitOutcome {
        let Some(detector) = self.detector.as_ref() else {
            return SubmitOutcome::ContextFailed;
        };
        debug!(slug, "loading problem context");

        let problem = match self.bounded(cancel, detector.lookup.lookup(slug)).await {
            None => return SubmitOutcome::Discarded,
            Some(Ok(problem)) => problem,
            Some(Err(_)) => {
                warn!(slug, timeout = ?self.timeout, "problem lookup timed out");
                None
            }
        };

        let mut session = self.session();
        if session.id != session_id {
            return SubmitOutcome::Discarded;
        }

        match problem {
            Some(problem) => {
                info!(title = %problem.title, difficulty = %problem.difficulty, "problem context loaded");
                let turn = self.turn(Sender::System, context_loaded_notice(&problem));
                session.conversation.push(turn);
                session.problem = Some(problem.clone());
                SubmitOutcome::ContextLoaded(problem)
            }
            None => {
                let turn = self.turn(Sender::System, CONTEXT_FAILED_NOTICE);
                session.conversation.push(turn);
                SubmitOutcome::ContextFailed
            }
        }
    }

    async fn request_reply(
        &self,
        session_id: Uuid,
        cancel: &CancellationToken,
        request: &ChatRequest,
    ) -> SubmitOutcome {
        debug!(messages = request.messages.len(), "requesting reply");

        let reply = match self.bounded(cancel, self.backend.complete(request)).await {
            None => return SubmitOutcome::Discarded,
            Some(Ok(result)) => result,
            Some(Err(_)) => Err(CoachError::Timeout(self.timeout)),
        }
        .and_then(|completion| {
            completion
                .text()
                .map(str::to_string)
                .ok_or_else(|| CoachError::malformed("response has no completion content"))
        });

        let mut session = self.session();
        if session.id != session_id {
            return SubmitOutcome::Discarded;
        }

        match reply {
            Ok(text) => {
                let turn = self.turn(Sender::Assistant, text);
                session.conversation.push(turn);
                SubmitOutcome::Replied
            }
            Err(e) => {
                warn!(error = %e, "provider call failed");
                let turn = self.turn(Sender::System, REPLY_FAILED_NOTICE);
                session.conversation.push(turn);
                SubmitOutcome::ReplyFailed
            }
        }
    }

    /// Run `fut` under the call timeout. `None` when the session is reset first.
    async fn bounded<F: Future>(
        &self,
        cancel: &CancellationToken,
        fut: F,
    ) -> Option<std::result::Result<F::Output, Elapsed>> {
        tokio::select! {
            _ = cancel.cancelled() => None,
            result = tokio::time::timeout(self.timeout, fut) => Some(result),
        }
    }

    fn turn(&self, sender: Sender, text: impl Into<String>) -> Turn {
        let id = self.next_turn_id.fetch_add(1, Ordering::Relaxed);
        Turn::new(id, sender, text)
    }

    fn session(&self) -> MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flight_guard_is_exclusive_and_released_on_drop() {
        let flag = AtomicBool::new(false);
        let first = FlightGuard::acquire(&flag);
        assert!(first.is_some());
        assert!(FlightGuard::acquire(&flag).is_none());
        drop(first);
        assert!(FlightGuard::acquire(&flag).is_some());
    }

    #[test]
    fn loaded_notice_names_the_problem() {
        let problem = ProblemContext::new(
            "Two Sum",
            crate::problem::Difficulty::Easy,
            Vec::<String>::new(),
        );
        assert_eq!(
            context_loaded_notice(&problem),
            "I've loaded the LeetCode problem \"Two Sum\". What specific part are you stuck on?"
        );
    }

    #[test]
    fn backend_url_has_single_slash() {
        let backend =
            HttpChatBackend::new("http://localhost:8000/", Duration::from_secs(1)).unwrap();
        assert_eq!(backend.url(), "http://localhost:8000/api/chat");
    }
}
