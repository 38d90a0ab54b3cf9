use std::fmt::Write;

use crate::models::{ConversationTurn, Document};

/// Chat-template control tokens that must not reach the model from
/// user-controlled text (questions, history, or repository code).
const CONTROL_TOKENS: &[&str] = &["<|im_start|>", "<|im_end|>", "<|endoftext|>"];

pub fn sanitize_for_prompt(text: &str) -> String {
    let mut out = text.to_string();
    for token in CONTROL_TOKENS {
        if out.contains(token) {
            out = out.replace(token, "");
        }
    }
    out
}

/// Render retrieved documents as `[path]\ncontent` blocks separated by a
/// blank line.
pub fn build_context(documents: &[Document]) -> String {
    documents
        .iter()
        .map(|d| format!("[{}]\n{}", d.path, sanitize_for_prompt(&d.content)))
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn build_prompt(context: &str, query: &str, history: &[ConversationTurn]) -> String {
    let mut prompt = String::from("\nYou are a codebase expert.\n\n");

    if !history.is_empty() {
        prompt.push_str("Previous conversation:\n");
        for turn in history {
            let _ = writeln!(prompt, "User: {}", sanitize_for_prompt(&turn.query));
            let _ = writeln!(prompt, "Assistant: {}", sanitize_for_prompt(&turn.response));
        }
        prompt.push('\n');
    }

    let _ = write!(
        prompt,
        "Context:\n{context}\n\nQuestion:\n{}\n\nExplain clearly and mention file paths.\n",
        sanitize_for_prompt(query)
    );
    prompt
}
