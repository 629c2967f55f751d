use super::wire::ChatMessage;
use crate::problem::ProblemContext;

pub const DEFAULT_INSTRUCTIONS: &str = "
You are a helpful coding assistant specializing in LeetCode problems.
Follow these guidelines when responding to users:

1. DO NOT provide complete solutions to problems.
2. Instead, guide the user with:
   - Clarifying questions about their current understanding
   - Related concepts and topics they should understand
   - General problem-solving approaches and patterns
   - Small hints that lead them in the right direction
   - Similar but simpler examples to build intuition
3. Encourage users to think through problems step-by-step
4. When asked directly for answers, remind users that you're here to help them learn
5. Use the Socratic method - ask questions that lead users to discover answers themselves
6. Provide code snippets only as examples of concepts, never as direct solutions to their problem

Remember: The goal is to help users develop their problem-solving skills, not to solve problems for them.
";

pub const HISTORY_HEADER: &str = "Previous conversation:";

/// Builds the single prompt string sent to a one-shot completion provider.
///
/// Layout: instructions, problem summary, prior messages, then the final `User:` line.
pub struct PromptBuilder {
    instructions: String,
    problem: Option<ProblemContext>,
    history: Vec<ChatMessage>,
    question: String,
}

impl PromptBuilder {
    pub fn new() -> Self {
        Self {
            instructions: DEFAULT_INSTRUCTIONS.to_string(),
            problem: None,
            history: Vec::new(),
            question: String::new(),
        }
    }

    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = instructions.into();
        self
    }

    pub fn with_problem(mut self, problem: Option<ProblemContext>) -> Self {
        self.problem = problem;
        self
    }

    pub fn with_history(mut self, history: Vec<ChatMessage>) -> Self {
        self.history = history;
        self
    }

    pub fn with_question(mut self, question: impl Into<String>) -> Self {
        self.question = question.into();
        self
    }

    pub fn build(self) -> String {
        let mut prompt = self.instructions;

        if let Some(ref problem) = self.problem {
            prompt.push_str(&problem_block(problem));
        }

        if !self.history.is_empty() {
            let rendered = self
                .history
                .iter()
                .map(|m| format!("{}: {}", m.role.label(), m.content))
                .collect::<Vec<_>>()
                .join("\n\n");
            prompt.push_str(HISTORY_HEADER);
            prompt.push_str("\n\n");
            prompt.push_str(&rendered);
            prompt.push_str("\n\n");
        }

        prompt.push_str("User: ");
        prompt.push_str(&self.question);
        prompt
    }
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn problem_block(problem: &ProblemContext) -> String {
    format!(
        "\nThe user is working on the following LeetCode problem:\n\
         - Title: {}\n\
         - Difficulty: {}\n\
         - Tags: {}\n\
         \n\
         Keep this context in mind when providing guidance, but remember not to provide the direct solution.\n",
        problem.title,
        problem.difficulty,
        problem.tags_label()
    )
}
