//! JSON extraction from judge-model replies.
//!
//! Judges are instructed to reply with plain JSON but often wrap it in
//! markdown code fences or surround it with prose. Extraction tries, in
//! order: a ```json fence, a generic fence, content that already starts with
//! '{', and finally the largest valid JSON object anywhere in the reply
//! (reasoning models tend to emit thinking text before the real answer).

use regex::Regex;

/// Extract a JSON object from a judge reply, if one can be found.
///
/// Every candidate is validated with `serde_json` before being returned, so a
/// `Some` result is guaranteed to parse.
pub fn extract_json_object(content: &str) -> Option<String> {
    let trimmed = content.trim();

    for fenced in [from_json_fence(trimmed), from_generic_fence(trimmed)]
        .into_iter()
        .flatten()
    {
        if serde_json::from_str::<serde_json::Value>(&fenced).is_ok() {
            return Some(fenced);
        }
    }

    if trimmed.starts_with('{') {
        if let Some(end) = find_matching_brace(trimmed) {
            let candidate = &trimmed[..=end];
            if serde_json::from_str::<serde_json::Value>(candidate).is_ok() {
                return Some(candidate.to_string());
            }
        }
    }

    largest_valid_object(trimmed)
}

/// Index of the '}' matching the leading '{', string- and escape-aware.
fn find_matching_brace(s: &str) -> Option<usize> {
    let mut depth = 0;
    let mut in_string = false;
    let mut escape_next = false;

    for (i, c) in s.char_indices() {
        if escape_next {
            escape_next = false;
            continue;
        }

        match c {
            '\\' if in_string => escape_next = true,
            '"' => in_string = !in_string,
            '{' if !in_string => depth += 1,
            '}' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }

    None
}

/// Extract the body of a ```json ... ``` fence.
fn from_json_fence(content: &str) -> Option<String> {
    let re = Regex::new(r"```json\s*\n?([\s\S]*?)\n?```").ok()?;
    let body = re.captures(content)?.get(1)?.as_str().trim();
    if body.starts_with('{') {
        if let Some(end) = find_matching_brace(body) {
            return Some(body[..=end].to_string());
        }
        return Some(body.to_string());
    }
    None
}

/// Extract the first JSON object inside a generic ``` ... ``` fence.
fn from_generic_fence(content: &str) -> Option<String> {
    let re = Regex::new(r"```(?:\w+)?\s*\n?([\s\S]*?)\n?```").ok()?;
    let body = re.captures(content)?.get(1)?.as_str().trim();
    let start = body.find('{')?;
    let end = find_matching_brace(&body[start..])?;
    Some(body[start..=start + end].to_string())
}

/// The largest valid JSON object anywhere in the content; ties go to the
/// later occurrence, which is where reasoning models put the real answer.
fn largest_valid_object(content: &str) -> Option<String> {
    let mut best: Option<String> = None;

    for (start, c) in content.char_indices() {
        if c != '{' {
            continue;
        }
        let substr = &content[start..];
        let Some(end) = find_matching_brace(substr) else {
            continue;
        };
        let candidate = &substr[..=end];
        if serde_json::from_str::<serde_json::Value>(candidate).is_err() {
            continue;
        }
        // >= so a later object of equal size wins
        let better = match &best {
            Some(existing) => candidate.len() >= existing.len(),
            None => true,
        };
        if better {
            best = Some(candidate.to_string());
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direct_json() {
        let input = r#"{"category": "intent_misinterpretation", "rationale": "dropped the fallback"}"#;
        assert_eq!(extract_json_object(input).as_deref(), Some(input));
    }

    #[test]
    fn test_json_fence() {
        let input = "Here is the verdict:\n```json\n{\"category\": \"policy_constraint_violation\"}\n```\nDone.";
        assert_eq!(
            extract_json_object(input).as_deref(),
            Some(r#"{"category": "policy_constraint_violation"}"#)
        );
    }

    #[test]
    fn test_generic_fence() {
        let input = "```\n{\"category\": \"partial_plan_execution\"}\n```";
        assert_eq!(
            extract_json_object(input).as_deref(),
            Some(r#"{"category": "partial_plan_execution"}"#)
        );
    }

    #[test]
    fn test_prose_wrapped() {
        let input = r#"Sure, the verdict is: {"category": "overgeneralized_action_pattern", "rationale": "rebooked unasked"} - done."#;
        assert_eq!(
            extract_json_object(input).as_deref(),
            Some(r#"{"category": "overgeneralized_action_pattern", "rationale": "rebooked unasked"}"#)
        );
    }

    #[test]
    fn test_reasoning_before_answer_picks_larger_later_object() {
        let input = r#"Thinking: an example could be {"x": 1}.

Final answer:
{"category": "intent_misinterpretation", "rationale": "missed both directions"}"#;
        let json = extract_json_object(input).expect("should extract");
        assert!(json.contains("intent_misinterpretation"));
    }

    #[test]
    fn test_escaped_quotes_and_nesting() {
        let input = r#"{"rationale": "user said \"cancel only\"", "nested": {"depth": 2}}"#;
        assert_eq!(extract_json_object(input).as_deref(), Some(input));
        assert_eq!(find_matching_brace(input), Some(input.len() - 1));
    }

    #[test]
    fn test_no_json_found() {
        assert_eq!(extract_json_object("plain prose, no verdict"), None);
        assert_eq!(extract_json_object(""), None);
    }

    #[test]
    fn test_truncated_object_not_returned() {
        assert_eq!(extract_json_object(r#"{"category": "unknow"#), None);
    }
}
