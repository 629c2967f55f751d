use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

use super::{Difficulty, ProblemContext};
use crate::error::{CoachError, Result};

/// Server-side source of problem metadata.
#[async_trait::async_trait]
pub trait ProblemCatalog: Send + Sync {
    /// `Ok(None)` means the slug is unknown. `Err` means the source itself failed.
    async fn find(&self, slug: &str) -> Result<Option<ProblemContext>>;
}

/// A small built-in catalog for development and offline use.
pub struct BuiltinCatalog {
    problems: HashMap<String, ProblemContext>,
    synthesize_unknown: bool,
}

impl BuiltinCatalog {
    pub fn new() -> Self {
        let mut problems = HashMap::new();
        problems.insert(
            "two-sum".to_string(),
            ProblemContext::new("Two Sum", Difficulty::Easy, ["Array", "Hash Table"]),
        );
        problems.insert(
            "add-two-numbers".to_string(),
            ProblemContext::new(
                "Add Two Numbers",
                Difficulty::Medium,
                ["Linked List", "Math", "Recursion"],
            ),
        );
        problems.insert(
            "median-of-two-sorted-arrays".to_string(),
            ProblemContext::new(
                "Median of Two Sorted Arrays",
                Difficulty::Hard,
                ["Array", "Binary Search", "Divide and Conquer"],
            ),
        );
        Self {
            problems,
            synthesize_unknown: false,
        }
    }

    /// Answer unknown slugs with a generated placeholder instead of "not found".
    pub fn with_synthesized_unknown(mut self, enabled: bool) -> Self {
        self.synthesize_unknown = enabled;
        self
    }

    fn synthesize(slug: &str) -> ProblemContext {
        let words = slug.split('-').filter(|w| !w.is_empty()).collect::<Vec<_>>();
        ProblemContext::new(
            format!("Problem: {}", words.join(" ")),
            Difficulty::Medium,
            Vec::<String>::new(),
        )
    }
}

impl Default for BuiltinCatalog {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl ProblemCatalog for BuiltinCatalog {
    async fn find(&self, slug: &str) -> Result<Option<ProblemContext>> {
        let key = slug.to_lowercase();
        if let Some(problem) = self.problems.get(&key) {
            return Ok(Some(problem.clone()));
        }
        if self.synthesize_unknown {
            debug!(slug, "synthesizing placeholder problem");
            return Ok(Some(Self::synthesize(&key)));
        }
        Ok(None)
    }
}

const QUESTION_QUERY: &str = "query questionData($titleSlug: String!) { \
    question(titleSlug: $titleSlug) { title difficulty topicTags { name } } }";

/// Looks problems up through the public LeetCode GraphQL endpoint.
pub struct LeetCodeCatalog {
    client: reqwest::Client,
    graphql_url: String,
}

#[derive(Debug, Deserialize)]
struct GraphqlResponse {
    data: Option<GraphqlData>,
}

#[derive(Debug, Deserialize)]
struct GraphqlData {
    question: Option<GraphqlQuestion>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GraphqlQuestion {
    title: String,
    difficulty: String,
    #[serde(default)]
    topic_tags: Vec<GraphqlTag>,
}

#[derive(Debug, Deserialize)]
struct GraphqlTag {
    name: String,
}

impl LeetCodeCatalog {
    pub fn new(graphql_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent("LeetCoach/1.0")
            .build()?;
        Ok(Self {
            client,
            graphql_url: graphql_url.into(),
        })
    }
}

#[async_trait::async_trait]
impl ProblemCatalog for LeetCodeCatalog {
    async fn find(&self, slug: &str) -> Result<Option<ProblemContext>> {
        let body = serde_json::json!({
            "query": QUESTION_QUERY,
            "variables": { "titleSlug": slug },
        });

        let response = self
            .client
            .post(&self.graphql_url)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(CoachError::provider(format!(
                "problem lookup failed ({status}): {text}"
            )));
        }

        let parsed: GraphqlResponse = serde_json::from_str(&text)?;
        let Some(question) = parsed.data.and_then(|d| d.question) else {
            return Ok(None);
        };

        let difficulty = question
            .difficulty
            .parse::<Difficulty>()
            .map_err(CoachError::malformed)?;

        Ok(Some(ProblemContext::new(
            question.title,
            difficulty,
            question.topic_tags.into_iter().map(|t| t.name),
        )))
    }
}
