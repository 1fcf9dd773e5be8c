// ai
//! 🔄 Transforms — the Rosetta Stone of route migration 🎭🚀
//!
//! 🎬 COLD OPEN — INT. DISPATCH SERVICE — SIMULTANEOUS TRANSLATION BOOTH — 2:47 AM
//!
//! Legacy queue names on the left screen: `emx-to-scms-stage`.
//! Endpoint keys on the right screen: `scms#stage`.
//! Rules in the middle, written in two dialects by two generations of engineers
//! who never met and would not have agreed on anything.
//!
//! "It's just a rename," they said. (Narrator: it was seven renames.)
//!
//! This module is the translator. Every conversion is a pure function over text.
//! No I/O, no clocks, no shared state. Same input, same output, forever.
//!
//! ## Architecture 📐
//!
//! ```text
//!   per-queue transforms                 per-rule transforms
//!  ┌────────────────────────────┐      ┌─────────────────────────────┐
//!  │ EndpointKeyEncoder         │      │ StructuredFieldRewriter     │
//!  │ QueueNameDecoder           │      │ LegacyFieldRewriter         │
//!  │ QualifierTargetNormalizer  │      │ EndpointPatternExpander     │
//!  └─────────────┬──────────────┘      │ EndpointPatternCollapser    │
//!                │                     └──────────────┬──────────────┘
//!                └──────────┐        ┌────────────────┘
//!                           ▼        ▼
//!                      ┌──────────────────┐
//!                      │    Operation     │  ← one enum, seven variants
//!                      └────────┬─────────┘
//!                               ▼
//!                  ┌──────────────────────────┐
//!                  │  RouteBatchTransformer   │  → BatchOutcome
//!                  └──────────────────────────┘
//! ```
//!
//! Every transform is a zero-sized marker type. The `Operation` enum picks one
//! and the compiler monomorphizes the rest into straight-line code.
//!
//! ⚠️ The singularity will standardize all naming schemes. Until then, we regex. 🦆

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::common::Route;
use crate::error::TransformError;

pub mod batch;
pub mod endpoint_pattern;
pub mod qualifier;
pub mod queue_codec;
pub mod rule_headers;

pub use batch::{BatchOutcome, RouteBatchTransformer, RouteFailure};
pub use endpoint_pattern::{
    EndpointPatternCollapser, EndpointPatternExpander, collapse_endpoint_pattern,
    expand_endpoint_pattern,
};
pub use qualifier::{QualifierTargetNormalizer, normalize_qualifier_target};
pub use queue_codec::{EndpointKeyEncoder, QueueNameDecoder, to_endpoint_key, to_queue_name};
pub use rule_headers::{
    LegacyFieldRewriter, StructuredFieldRewriter, to_legacy_fields, to_structured_fields,
};

/// 🌍 The knobs a transform may need that are not in the route itself.
///
/// Today that's the environment baked into the special-case targets
/// (`emx-core-trash#<env>` and friends). Threaded in, never a constant,
/// so one binary serves dev, stage and prod without a rebuild.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationContext {
    pub queue_environment: String,
}

impl MigrationContext {
    pub fn new(queue_environment: impl Into<String>) -> Self {
        Self {
            queue_environment: queue_environment.into(),
        }
    }
}

/// 📥 A transform applied to each entry of `Route::queues`, one string at a time.
pub trait QueueTransform {
    fn transform_queue(queue: &str, context: &MigrationContext) -> Result<String, TransformError>;
}

/// 📜 A transform applied to `Route::rule` as a whole.
pub trait RuleTransform {
    fn transform_rule(rule: &str) -> Result<String, TransformError>;
}

/// 🎯 Which field of a route an operation rewrites.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformTarget {
    Rule,
    Queues,
}

/// 🎭 The seven faces of a migration. Pick one per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Operation {
    /// `emx-to-scms-stage` → `scms#stage`
    EncodeQueues,
    /// `scms#stage` → `emx-to-scms-stage`
    DecodeQueues,
    /// `emxSourceSystem` → `endpoint.system`
    HeadersToStructured,
    /// `endpoint.system` → `emxSourceSystem`
    HeadersToLegacy,
    /// `endpoint=="a#e/q"` → `(endpoint=="a/q#e" || endpoint=="a#e/q")`
    ExpandEndpointPattern,
    /// the disjunction above → `endpoint=="a/q#e"`
    CollapseEndpointPattern,
    /// queue `a#e/q` → `a/q#e`
    NormalizeQualifiers,
}

impl Operation {
    pub const ALL: [Operation; 7] = [
        Operation::EncodeQueues,
        Operation::DecodeQueues,
        Operation::HeadersToStructured,
        Operation::HeadersToLegacy,
        Operation::ExpandEndpointPattern,
        Operation::CollapseEndpointPattern,
        Operation::NormalizeQualifiers,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::EncodeQueues => "encode-queues",
            Operation::DecodeQueues => "decode-queues",
            Operation::HeadersToStructured => "headers-to-structured",
            Operation::HeadersToLegacy => "headers-to-legacy",
            Operation::ExpandEndpointPattern => "expand-endpoint-pattern",
            Operation::CollapseEndpointPattern => "collapse-endpoint-pattern",
            Operation::NormalizeQualifiers => "normalize-qualifiers",
        }
    }

    pub fn target(&self) -> TransformTarget {
        match self {
            Operation::EncodeQueues | Operation::DecodeQueues | Operation::NormalizeQualifiers => {
                TransformTarget::Queues
            }
            Operation::HeadersToStructured
            | Operation::HeadersToLegacy
            | Operation::ExpandEndpointPattern
            | Operation::CollapseEndpointPattern => TransformTarget::Rule,
        }
    }

    /// 🔙 The operation that undoes this one on canonical input.
    /// Normalization has no inverse: the legacy spelling is gone on purpose.
    ///
    /// ⚠️ Not a revert. Inputs the forward run left alone can still be rewritten
    /// by the inverse; putting routes back is what `MigrationConfig::restore` is for.
    pub fn inverse(&self) -> Option<Operation> {
        match self {
            Operation::EncodeQueues => Some(Operation::DecodeQueues),
            Operation::DecodeQueues => Some(Operation::EncodeQueues),
            Operation::HeadersToStructured => Some(Operation::HeadersToLegacy),
            Operation::HeadersToLegacy => Some(Operation::HeadersToStructured),
            Operation::ExpandEndpointPattern => Some(Operation::CollapseEndpointPattern),
            Operation::CollapseEndpointPattern => Some(Operation::ExpandEndpointPattern),
            Operation::NormalizeQualifiers => None,
        }
    }

    /// 🔄 Apply this operation to one route, producing a new route.
    ///
    /// Queue operations may return a route with an empty `queues` list;
    /// deciding what that means is the batch transformer's job, not ours.
    pub fn apply(&self, route: &Route, context: &MigrationContext) -> Result<Route, TransformError> {
        match self {
            Operation::EncodeQueues => rewrite_queues::<EndpointKeyEncoder>(route, context),
            Operation::DecodeQueues => rewrite_queues::<QueueNameDecoder>(route, context),
            Operation::NormalizeQualifiers => {
                rewrite_queues::<QualifierTargetNormalizer>(route, context)
            }
            Operation::HeadersToStructured => rewrite_rule::<StructuredFieldRewriter>(route),
            Operation::HeadersToLegacy => rewrite_rule::<LegacyFieldRewriter>(route),
            Operation::ExpandEndpointPattern => rewrite_rule::<EndpointPatternExpander>(route),
            Operation::CollapseEndpointPattern => rewrite_rule::<EndpointPatternCollapser>(route),
        }
    }
}

// -- 🔁 every queue through T, in order. the first bad one stops the route.
fn rewrite_queues<T: QueueTransform>(
    route: &Route,
    context: &MigrationContext,
) -> Result<Route, TransformError> {
    let queues = route
        .queues
        .iter()
        .map(|queue| T::transform_queue(queue, context))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(route.with_queues(queues))
}

fn rewrite_rule<T: RuleTransform>(route: &Route) -> Result<Route, TransformError> {
    Ok(route.with_rule(T::transform_rule(&route.rule)?))
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Operation::ALL
            .into_iter()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| {
                let known: Vec<&str> = Operation::ALL.iter().map(Operation::as_str).collect();
                format!("unknown operation '{s}', expected one of: {}", known.join(", "))
            })
    }
}
