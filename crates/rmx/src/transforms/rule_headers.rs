// ai
//! 📜 Rule Header Rewriter — two dialects, one meaning 🔄
//!
//! Old rules say `emxSourceSystem=="cars"`. New rules say `endpoint.system=="cars"`.
//! Both mean "messages from cars". This module swaps the field names and
//! touches nothing else: not the literals, not the whitespace, not the `&&`s.
//!
//! Plain substring substitution over the whole rule. No parsing. The rules were
//! never meant to be parsed by anyone but the dispatch service, and we respect that. 🦆

use super::RuleTransform;
use crate::error::TransformError;

/// 🔤 legacy field name → structured field name
const FIELD_PAIRS: [(&str, &str); 2] = [
    ("emxSourceSystem", "endpoint.system"),
    ("emxSourceEnvironment", "endpoint.env"),
];

/// 📥 `emxSourceSystem` → `endpoint.system`, `emxSourceEnvironment` → `endpoint.env`
pub struct StructuredFieldRewriter;

/// 📤 the exact inverse of [`StructuredFieldRewriter`]
pub struct LegacyFieldRewriter;

impl RuleTransform for StructuredFieldRewriter {
    fn transform_rule(rule: &str) -> Result<String, TransformError> {
        Ok(to_structured_fields(rule))
    }
}

impl RuleTransform for LegacyFieldRewriter {
    fn transform_rule(rule: &str) -> Result<String, TransformError> {
        Ok(to_legacy_fields(rule))
    }
}

/// 🔄 Replace every legacy field name with its structured twin.
pub fn to_structured_fields(rule: &str) -> String {
    FIELD_PAIRS
        .iter()
        .fold(rule.to_string(), |rewritten, (legacy, structured)| {
            rewritten.replace(*legacy, structured)
        })
}

/// 🔄 Replace every structured field name with its legacy twin.
pub fn to_legacy_fields(rule: &str) -> String {
    FIELD_PAIRS
        .iter()
        .fold(rule.to_string(), |rewritten, (legacy, structured)| {
            rewritten.replace(*structured, legacy)
        })
}
