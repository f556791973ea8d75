//! Canned tutor prompts for the derived utilities.
//!
//! Pure string builders; no provider logic here.

/// Persona preamble attached to conversational asks.
pub fn persona(question: &str) -> String {
    format!(
        "You are a friendly, encouraging programming tutor. \
         Be clear and didactic, and nudge the user toward learning by doing. \
         User question: {}",
        question
    )
}

pub fn explain_code(code: &str) -> String {
    format!(
        "Explain in detail what the following code does:\n\n{}",
        code
    )
}

pub fn summarize_text(text: &str) -> String {
    format!(
        "Summarize the following text in a few clear, objective lines:\n\n{}",
        text
    )
}

pub fn explain_error(error: &str) -> String {
    format!(
        "Explain the following error and how to fix it:\n\n{}",
        error
    )
}

pub fn fix_code(code: &str) -> String {
    format!(
        "Review the following code, point out mistakes and suggest improvements:\n\n{}",
        code
    )
}

pub fn quiz() -> String {
    "Create one multiple-choice programming question with 4 alternatives \
     and indicate the correct one at the end."
        .to_string()
}

pub fn challenge() -> String {
    "Propose a simple beginner programming challenge, explain what should \
     be done, and show the solution at the end."
        .to_string()
}

pub fn concept(topic: &str) -> String {
    format!(
        "Explain the programming concept '{}' in a didactic way, with a short example.",
        topic
    )
}

pub fn library(name: &str) -> String {
    format!(
        "Explain what the library '{}' is for and show a usage example.",
        name
    )
}

pub fn materials() -> String {
    "Suggest free materials for learning to program: sites, videos and books.".to_string()
}

pub fn projects(level: &str) -> String {
    format!(
        "Suggest 3 project ideas for the {} level, with a brief description of each.",
        level
    )
}

pub fn review_analysis(code: &str, lint_report: &str) -> String {
    format!(
        "The following code was analyzed by linters. Explain the main problems \
         found, show corrected code where possible, and suggest improvements in \
         clarity and style.\n\nCode:\n{}\n\nLinter report:\n{}",
        code, lint_report
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn persona_embeds_question() {
        let p = persona("what is a closure?");
        assert!(p.contains("what is a closure?"));
        assert!(p.contains("tutor"));
    }

    #[test]
    fn projects_embeds_level() {
        assert!(projects("beginner").contains("beginner"));
    }
}
