// ai
//! 🔀 Endpoint Pattern Expander & Collapser — one target, two spellings 🎭
//!
//! 🎬 COLD OPEN — INT. DISPATCH SERVICE — MIGRATION WEEK
//!
//! Half the producers say `cars#stage/vendor`. The other half already say
//! `cars/vendor#stage`. The dispatch service compares strings, not meanings,
//! so a rule written for one spelling silently ignores the other.
//!
//! The fix is two-phase:
//! 1. **expand** — every qualified `endpoint=="…"` literal becomes a disjunction
//!    that accepts both spellings, canonical arm first:
//!    `(endpoint=="cars/vendor#stage" || endpoint=="cars#stage/vendor")`
//! 2. **collapse** — once every producer has moved, the disjunction shrinks back
//!    to the canonical spelling alone: `endpoint=="cars/vendor#stage"`
//!
//! Everything around the literal (other predicates, `&&`, newlines, the lot)
//! comes out byte-identical. Literals without a qualifier, and rules without
//! any endpoint literal, pass straight through. Every independent literal in a
//! rule is handled. A disjunction that already pairs one target's two spellings
//! is left alone; any other disjunction gets each of its arms expanded.
//!
//! Regex, not a parser. The rule language stays the dispatch service's problem. 🦆

use std::sync::LazyLock;

use regex::{Captures, Regex};

use super::RuleTransform;
use crate::error::TransformError;

// -- 🔍 leftmost-first: at a '(' the whole disjunction wins, so its arms are judged together
static EXPANDABLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?P<pair>\(endpoint=="(?P<pair_first>[^"]*)"\s*\|\|\s*endpoint=="(?P<pair_second>[^"]*)"\))|endpoint=="(?P<literal>[^"]*)""#,
    )
    .expect("endpoint literal pattern is valid")
});

static LITERAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"endpoint=="(?P<literal>[^"]*)""#).expect("endpoint literal pattern is valid")
});

static COLLAPSIBLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\(endpoint=="(?P<first>[^"]*)"\s*\|\|\s*endpoint=="(?P<second>[^"]*)"\)"#)
        .expect("endpoint disjunction pattern is valid")
});

/// 🧭 Which of the two equivalent spellings a literal uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Spelling {
    /// `system/qualifier#environment` — the canonical one
    QualifierFirst,
    /// `system#environment/qualifier`
    EnvironmentFirst,
}

/// 🎯 A qualified endpoint, pulled apart. Exactly one `#`, exactly one `/`, no empty parts.
#[derive(Debug, Clone, PartialEq, Eq)]
struct QualifiedEndpoint<'a> {
    system: &'a str,
    environment: &'a str,
    qualifier: &'a str,
    spelling: Spelling,
}

impl<'a> QualifiedEndpoint<'a> {
    fn parse(literal: &'a str) -> Option<Self> {
        if literal.matches('#').count() != 1 || literal.matches('/').count() != 1 {
            return None;
        }
        let (head, tail) = literal.split_once('#')?;
        let parsed = match (head.split_once('/'), tail.split_once('/')) {
            (Some((system, qualifier)), None) => QualifiedEndpoint {
                system,
                environment: tail,
                qualifier,
                spelling: Spelling::QualifierFirst,
            },
            (None, Some((environment, qualifier))) => QualifiedEndpoint {
                system: head,
                environment,
                qualifier,
                spelling: Spelling::EnvironmentFirst,
            },
            _ => return None,
        };
        let all_present = !parsed.system.is_empty()
            && !parsed.environment.is_empty()
            && !parsed.qualifier.is_empty();
        all_present.then_some(parsed)
    }

    fn canonical(&self) -> String {
        format!("{}/{}#{}", self.system, self.qualifier, self.environment)
    }

    fn environment_first(&self) -> String {
        format!("{}#{}/{}", self.system, self.environment, self.qualifier)
    }

    fn same_target(&self, other: &QualifiedEndpoint<'_>) -> bool {
        self.system == other.system
            && self.environment == other.environment
            && self.qualifier == other.qualifier
    }
}

/// 📤 one literal → a disjunction of both spellings
pub struct EndpointPatternExpander;

/// 📥 a disjunction of both spellings → the canonical literal
pub struct EndpointPatternCollapser;

impl RuleTransform for EndpointPatternExpander {
    fn transform_rule(rule: &str) -> Result<String, TransformError> {
        Ok(expand_endpoint_pattern(rule))
    }
}

impl RuleTransform for EndpointPatternCollapser {
    fn transform_rule(rule: &str) -> Result<String, TransformError> {
        Ok(collapse_endpoint_pattern(rule))
    }
}

/// 🔄 Expand each qualified `endpoint=="…"` literal into a two-armed disjunction.
pub fn expand_endpoint_pattern(rule: &str) -> String {
    EXPANDABLE
        .replace_all(rule, |caps: &Captures<'_>| {
            if caps.name("pair").is_some() {
                return expand_disjunction(&caps[0], &caps["pair_first"], &caps["pair_second"]);
            }
            expand_literal(&caps["literal"]).unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

// -- 🎭 already both spellings of one target? hands off. otherwise each arm is its own literal.
fn expand_disjunction(disjunction: &str, first: &str, second: &str) -> String {
    if let (Some(first), Some(second)) = (QualifiedEndpoint::parse(first), QualifiedEndpoint::parse(second)) {
        if first.same_target(&second) && first.spelling != second.spelling {
            return disjunction.to_string();
        }
    }
    LITERAL
        .replace_all(disjunction, |caps: &Captures<'_>| {
            expand_literal(&caps["literal"]).unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

fn expand_literal(literal: &str) -> Option<String> {
    QualifiedEndpoint::parse(literal).map(|target| {
        format!(
            r#"(endpoint=="{}" || endpoint=="{}")"#,
            target.canonical(),
            target.environment_first()
        )
    })
}

/// 🔄 Collapse each two-armed disjunction of one target's spellings to the canonical literal.
///
/// Both arms must name the same system, environment and qualifier, one in each
/// spelling. Anything else is somebody's deliberate rule and stays as written.
pub fn collapse_endpoint_pattern(rule: &str) -> String {
    COLLAPSIBLE
        .replace_all(rule, |caps: &Captures<'_>| {
            let arms = (
                QualifiedEndpoint::parse(&caps["first"]),
                QualifiedEndpoint::parse(&caps["second"]),
            );
            match arms {
                (Some(first), Some(second))
                    if first.same_target(&second) && first.spelling != second.spelling =>
                {
                    format!(r#"endpoint=="{}""#, first.canonical())
                }
                _ => caps[0].to_string(),
            }
        })
        .into_owned()
}
