//! Prompt assembly

use reviewbot_core::{ConversationTurn, ScoredUnit};

/// The template the answer prompt is rendered from
const PROMPT_TEMPLATE: &str = "
You are an expert in answering questions about Naruto verse. You have access to relevant reviews and previous conversation history.

Previous conversation:
{chat_history}

Here are some relevant reviews: {reviews}

Here is the question to answer: {question}
";

/// Render the prompt for `question`
///
/// Substitution is literal and single-pass, so braces inside the question or
/// the reviews are never interpreted as placeholders.
pub fn assemble(history: &[ConversationTurn], retrieved: &[ScoredUnit], question: &str) -> String {
    let chat_history = render_history(history);
    let reviews = render_reviews(retrieved);

    let mut prompt = String::with_capacity(PROMPT_TEMPLATE.len() + reviews.len() + question.len());
    let mut rest = PROMPT_TEMPLATE;

    while let Some(start) = rest.find('{') {
        prompt.push_str(&rest[..start]);
        let after = &rest[start..];

        let (value, consumed) = if after.starts_with("{chat_history}") {
            (chat_history.as_str(), "{chat_history}".len())
        } else if after.starts_with("{reviews}") {
            (reviews.as_str(), "{reviews}".len())
        } else if after.starts_with("{question}") {
            (question, "{question}".len())
        } else {
            ("{", 1)
        };

        prompt.push_str(value);
        rest = &after[consumed..];
    }
    prompt.push_str(rest);

    prompt
}

/// One line per turn, e.g. `Human: who is the best ninja?`
fn render_history(history: &[ConversationTurn]) -> String {
    history
        .iter()
        .map(|turn| format!("{}: {}", turn.role.label(), turn.content))
        .collect::<Vec<_>>()
        .join("\n")
}

/// One line per retrieved review with its attributes
fn render_reviews(retrieved: &[ScoredUnit]) -> String {
    retrieved
        .iter()
        .map(|scored| {
            let unit = &scored.unit;
            format!(
                "[{}] {} (rating: {}, date: {}, best character: {})",
                unit.id,
                unit.content,
                unit.metadata.rating,
                unit.metadata.date,
                unit.metadata.best_character
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
