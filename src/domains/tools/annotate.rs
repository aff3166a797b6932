//! Acknowledgment annotation of successful results.
//!
//! A proof token is an operator-configured string that lets the caller
//! verify a handler genuinely executed, as opposed to the result being
//! fabricated upstream by a language model. It is appended verbatim as one
//! extra content entry, only to results that are not error-marked, and is
//! never derived from the tool's input or output.

use rmcp::model::{CallToolResult, Content};

/// Append the configured proof token to a successful result.
///
/// Error-marked results and tools without a configured token pass through
/// unchanged. At most one token entry is ever appended per invocation.
pub fn annotate(mut result: CallToolResult, proof_token: Option<&str>) -> CallToolResult {
    if result.is_error == Some(true) {
        return result;
    }
    if let Some(token) = proof_token {
        result.content.push(Content::text(token.to_string()));
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use rmcp::model::RawContent;

    fn text_of(content: &Content) -> &str {
        match &content.raw {
            RawContent::Text(text) => &text.text,
            _ => panic!("expected text content"),
        }
    }

    #[test]
    fn token_appended_to_success() {
        let result = CallToolResult::success(vec![Content::text("payload".to_string())]);
        let annotated = annotate(result, Some("ALPHA_TOKEN"));
        assert_eq!(annotated.content.len(), 2);
        assert_eq!(text_of(annotated.content.last().unwrap()), "ALPHA_TOKEN");
    }

    #[test]
    fn no_token_configured_leaves_result_unchanged() {
        let result = CallToolResult::success(vec![Content::text("payload".to_string())]);
        let annotated = annotate(result, None);
        assert_eq!(annotated.content.len(), 1);
        assert_eq!(text_of(&annotated.content[0]), "payload");
    }

    #[test]
    fn token_never_attached_to_error_result() {
        let result = CallToolResult::error(vec![Content::text("failure".to_string())]);
        let annotated = annotate(result, Some("ALPHA_TOKEN"));
        assert_eq!(annotated.content.len(), 1);
        assert_eq!(text_of(&annotated.content[0]), "failure");
    }

    #[test]
    fn exactly_one_token_per_invocation() {
        let result = CallToolResult::success(vec![Content::text("payload".to_string())]);
        let annotated = annotate(result, Some("ALPHA_TOKEN"));
        let tokens = annotated
            .content
            .iter()
            .filter(|c| text_of(c) == "ALPHA_TOKEN")
            .count();
        assert_eq!(tokens, 1);
    }
}
