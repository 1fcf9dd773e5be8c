// ai
//! 🧹 Qualifier Target Normalizer — one spelling per queue target.
//!
//! Queue lists picked up `crm-aveng-stage/cmiss`, `crm-aveng#stage/cmiss` and
//! `crm-aveng/cmiss#stage` over the years. Same target. Different strings. Comparisons lie.
//! This rewrites both environment-first spellings into the canonical
//! `system/qualifier#environment` and leaves everything else exactly where it was.
//!
//! In the hyphen spelling the environment is the last hyphen segment before the
//! `/`, the same rule the queue codec uses for legacy names.

use super::{MigrationContext, QueueTransform};
use crate::error::TransformError;

/// 🧹 `system-env/qualifier` or `system#env/qualifier` → `system/qualifier#env`, per queue entry
pub struct QualifierTargetNormalizer;

impl QueueTransform for QualifierTargetNormalizer {
    fn transform_queue(queue: &str, _context: &MigrationContext) -> Result<String, TransformError> {
        Ok(normalize_qualifier_target(queue))
    }
}

/// 🔄 Canonicalize one queue target. Already-canonical and unqualified targets pass through.
pub fn normalize_qualifier_target(queue: &str) -> String {
    let Some((head, qualifier)) = queue.split_once('/') else {
        return queue.to_string();
    };
    // -- ✂️ `#` splits system from environment if present, otherwise the last hyphen does
    let split = if head.contains('#') {
        head.split_once('#')
    } else {
        head.rsplit_once('-')
    };
    let Some((system, environment)) = split else {
        return queue.to_string();
    };
    // -- 🎯 one '/', at most one '#', nothing empty. anything fancier is not ours to touch.
    let well_formed = !system.is_empty()
        && !environment.is_empty()
        && !environment.contains('#')
        && !qualifier.is_empty()
        && !qualifier.contains(['/', '#']);
    if !well_formed {
        return queue.to_string();
    }
    format!("{system}/{qualifier}#{environment}")
}
