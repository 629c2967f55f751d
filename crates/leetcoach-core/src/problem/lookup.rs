use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use super::ProblemContext;
use crate::error::Result;

/// Body of `GET /api/<resource>/problem/<slug>`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProblemResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub problem: Option<ProblemContext>,
}

impl ProblemResponse {
    pub fn found(problem: ProblemContext) -> Self {
        Self {
            success: true,
            problem: Some(problem),
        }
    }

    pub fn not_found() -> Self {
        Self {
            success: false,
            problem: None,
        }
    }

    pub fn into_problem(self) -> Option<ProblemContext> {
        if self.success {
            self.problem
        } else {
            None
        }
    }
}

/// Resolves a problem slug to its metadata.
/// Never fails: every kind of failure is reported as `None`.
#[async_trait::async_trait]
pub trait ProblemLookup: Send + Sync {
    async fn lookup(&self, slug: &str) -> Option<ProblemContext>;
}

pub struct HttpProblemLookup {
    client: reqwest::Client,
    endpoint: String,
    resource: String,
}

impl HttpProblemLookup {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            resource: "leetcode".to_string(),
        })
    }

    pub fn with_resource(mut self, resource: impl Into<String>) -> Self {
        self.resource = resource.into();
        self
    }

    pub fn url_for(&self, slug: &str) -> String {
        format!(
            "{}/api/{}/problem/{}",
            self.endpoint.trim_end_matches('/'),
            self.resource,
            slug
        )
    }

    async fn fetch(&self, slug: &str) -> Result<ProblemResponse> {
        let response = self.client.get(self.url_for(slug)).send().await?;
        let response = response.error_for_status()?;
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait::async_trait]
impl ProblemLookup for HttpProblemLookup {
    async fn lookup(&self, slug: &str) -> Option<ProblemContext> {
        match self.fetch(slug).await {
            Ok(response) => {
                let problem = response.into_problem();
                if problem.is_none() {
                    debug!(slug, "problem lookup reported not found");
                }
                problem
            }
            Err(e) => {
                warn!(slug, error = %e, "problem lookup failed");
                None
            }
        }
    }
}
