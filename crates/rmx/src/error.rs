//! 🏷️ Typed errors for the pure conversion engine.
//!
//! The shell (config, HTTP, disk) speaks `anyhow`. The core speaks this, so
//! the batch transformer can tell a broken target apart from a broken network.
//! Spoiler: the core never touches the network. It only breaks targets. 🦆

use thiserror::Error;

/// 💀 Things that can go wrong while converting one route.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransformError {
    /// A queue name or endpoint key is missing the segments its direction needs.
    /// Structural, not transient. Retrying will not grow it new hyphens.
    #[error("malformed target '{target}': {reason}")]
    MalformedTarget { target: String, reason: String },
}

impl TransformError {
    pub(crate) fn malformed(target: &str, reason: impl Into<String>) -> Self {
        TransformError::MalformedTarget {
            target: target.to_string(),
            reason: reason.into(),
        }
    }
}
