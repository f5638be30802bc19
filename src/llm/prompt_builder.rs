use crate::llm::prompts;

pub struct PromptPair {
    pub system: String,
    pub user: String,
}

/// Prompt for a commit message covering the whole staged diff.
pub fn commit_message_prompt(diff: &str) -> PromptPair {
    let user = format!("Staged diff:\n```diff\n{diff}\n```", diff = diff.trim_end());

    PromptPair {
        system: prompts::COMMIT_INSTRUCTIONS.to_owned(),
        user,
    }
}

/// Strip wrapping code fences and surrounding whitespace some models add
/// despite being told not to.
pub fn clean_response(raw: &str) -> String {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed.to_string();
    };
    let Some(body) = rest.strip_suffix("```") else {
        return trimmed.to_string();
    };

    // Drop an info string such as ```text on the opening fence line.
    let body = match body.split_once('\n') {
        Some((first, remainder)) if !first.trim().contains(' ') => remainder,
        _ => body,
    };
    body.trim().to_string()
}
