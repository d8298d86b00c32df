use once_cell::sync::Lazy;
use regex::Regex;

static THINK_TAG_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<think>[\s\S]*?</think>|<think\s*/>").unwrap());

static REASONING_TAG_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<reasoning>[\s\S]*?</reasoning>").unwrap());

static CODE_FENCE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^```(?:json|yaml|markdown)?\s*\n?(.*?)\n?```$").unwrap());

static MULTIPLE_NEWLINES_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());

/// Cleans an LLM response by stripping reasoning tags and code fences so the
/// enrichment payload can be parsed as plain JSON or text.
pub fn clean_llm_response(response: &str) -> String {
    let mut cleaned = response.to_string();

    cleaned = THINK_TAG_PATTERN.replace_all(&cleaned, "").to_string();
    cleaned = REASONING_TAG_PATTERN.replace_all(&cleaned, "").to_string();

    cleaned = cleaned.trim().to_string();

    // Models often wrap JSON answers in a fenced block.
    if let Some(caps) = CODE_FENCE_PATTERN.captures(&cleaned) {
        cleaned = caps[1].trim().to_string();
    }

    cleaned = MULTIPLE_NEWLINES_PATTERN
        .replace_all(&cleaned, "\n\n")
        .to_string();

    cleaned
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_think_tags() {
        let input = "<think>Some reasoning here</think>{\"description\": \"x\"}";
        assert_eq!(clean_llm_response(input), "{\"description\": \"x\"}");
    }

    #[test]
    fn test_clean_self_closing_think() {
        let input = "<think/>The actual response";
        assert_eq!(clean_llm_response(input), "The actual response");
    }

    #[test]
    fn test_clean_json_code_fence() {
        let input = "```json\n{\"tasks\": []}\n```";
        assert_eq!(clean_llm_response(input), "{\"tasks\": []}");
    }

    #[test]
    fn test_clean_bare_code_fence() {
        let input = "```\n{\"duration\": \"1 week\"}\n```";
        assert_eq!(clean_llm_response(input), "{\"duration\": \"1 week\"}");
    }

    #[test]
    fn test_clean_multiple_newlines() {
        let input = "Line 1\n\n\n\n\nLine 2";
        assert_eq!(clean_llm_response(input), "Line 1\n\nLine 2");
    }

    #[test]
    fn test_clean_preserves_normal_text() {
        let input = "This is a normal response without any special tags.";
        assert_eq!(
            clean_llm_response(input),
            "This is a normal response without any special tags."
        );
    }
}
