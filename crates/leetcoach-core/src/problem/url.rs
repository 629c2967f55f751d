use regex::{Regex, RegexBuilder};

use crate::error::{CoachError, Result};

/// Recognizes problem-page URLs of one site and extracts the problem slug.
#[derive(Debug, Clone)]
pub struct ProblemUrlMatcher {
    pattern: Regex,
}

impl ProblemUrlMatcher {
    pub fn new(site: &str) -> Result<Self> {
        let source = format!(
            r"^https?://(?:www\.)?{}/problems/([A-Za-z0-9-]+)/?$",
            regex::escape(site.trim())
        );
        let pattern = RegexBuilder::new(&source)
            .case_insensitive(true)
            .build()
            .map_err(|e| CoachError::Config(format!("invalid problem site {site:?}: {e}")))?;
        Ok(Self { pattern })
    }

    pub fn is_match(&self, input: &str) -> bool {
        self.pattern.is_match(input.trim())
    }

    pub fn slug(&self, input: &str) -> Option<String> {
        self.pattern
            .captures(input.trim())
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_slug_with_and_without_www() {
        let matcher = ProblemUrlMatcher::new("leetcode.com").unwrap();
        assert_eq!(
            matcher.slug("https://leetcode.com/problems/two-sum/").as_deref(),
            Some("two-sum")
        );
        assert_eq!(
            matcher.slug("http://www.leetcode.com/problems/add-two-numbers").as_deref(),
            Some("add-two-numbers")
        );
    }

    #[test]
    fn matching_is_case_insensitive_and_trims() {
        let matcher = ProblemUrlMatcher::new("leetcode.com").unwrap();
        assert_eq!(
            matcher.slug("  HTTPS://LeetCode.com/problems/Two-Sum/  ").as_deref(),
            Some("Two-Sum")
        );
    }

    #[test]
    fn rejects_other_shapes() {
        let matcher = ProblemUrlMatcher::new("leetcode.com").unwrap();
        assert!(!matcher.is_match("https://leetcode.com/problems/"));
        assert!(!matcher.is_match("https://leetcode.com/problems/two-sum/description/"));
        assert!(!matcher.is_match("https://leetcode.com.evil.io/problems/two-sum"));
        assert!(!matcher.is_match("ftp://leetcode.com/problems/two-sum"));
        assert!(!matcher.is_match("look at https://leetcode.com/problems/two-sum"));
        assert!(!matcher.is_match("how do I solve two-sum?"));
    }

    #[test]
    fn site_is_configurable() {
        let matcher = ProblemUrlMatcher::new("example.com").unwrap();
        assert_eq!(
            matcher.slug("https://www.example.com/problems/two-sum/").as_deref(),
            Some("two-sum")
        );
        assert!(!matcher.is_match("https://leetcode.com/problems/two-sum/"));
        // The dot in the site name is literal.
        assert!(!matcher.is_match("https://examplexcom/problems/two-sum/"));
    }
}
