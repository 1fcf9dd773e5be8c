// ai
//! 🔐 Queue Target Codec — legacy queue names ⇄ endpoint keys 🎭🔄
//!
//! 🎬 COLD OPEN — INT. NAMING COMMITTEE — CONFERENCE ROOM B — 10:00 AM
//!
//! "We'll just put the environment at the end. After a hyphen."
//! "What if the system name has a hyphen in it?"
//! "Then... the LAST hyphen. Obviously."
//! "What if the environment has a colon in it?"
//! *[long silence]* *[someone invents percent-encoding, again]*
//!
//! Legacy queue:   `emx-to-<system>-<environment>`  e.g. `emx-to-scms-stage`
//! Endpoint key:   `<system>#<environment>`         e.g. `scms#stage`
//!
//! Three queues predate the convention and get a fixed mapping instead:
//!
//! | queue name               | endpoint key                |
//! |--------------------------|-----------------------------|
//! | `emx-trash`              | `emx-core-trash#<env>`      |
//! | `emx-to-archive-core`    | `emx-core-archive#<env>`    |
//! | `emx-to-emx-healthcheck` | `emx-core-healthcheck#<env>`|
//!
//! System and environment are www-form encoded on the way in (`:` → `%3A`,
//! `;` → `%3B`) and decoded on the way out. Values already in the target form
//! pass straight through, so running the same direction twice is harmless. 🦆

use std::borrow::Cow;

use percent_encoding::percent_decode_str;

use super::{MigrationContext, QueueTransform};
use crate::error::TransformError;

/// 🏷️ The two hyphen segments every conventional queue name starts with.
const QUEUE_PREFIX: &str = "emx-to-";
const PREFIX_SEGMENTS: usize = 2;

/// 📜 Legacy queue name ↔ system part of the special endpoint keys.
const SPECIAL_TARGETS: [(&str, &str); 3] = [
    ("emx-trash", "emx-core-trash"),
    ("emx-to-archive-core", "emx-core-archive"),
    ("emx-to-emx-healthcheck", "emx-core-healthcheck"),
];

/// 📥 `emx-to-scms-stage` → `scms#stage`
pub struct EndpointKeyEncoder;

/// 📤 `scms#stage` → `emx-to-scms-stage`
pub struct QueueNameDecoder;

impl QueueTransform for EndpointKeyEncoder {
    fn transform_queue(queue: &str, context: &MigrationContext) -> Result<String, TransformError> {
        to_endpoint_key(queue, context)
    }
}

impl QueueTransform for QueueNameDecoder {
    fn transform_queue(queue: &str, context: &MigrationContext) -> Result<String, TransformError> {
        to_queue_name(queue, context)
    }
}

/// 🔄 Convert a legacy queue name to an endpoint key.
///
/// The first two hyphen segments are the prefix and are dropped, the last is the
/// environment, everything in between is the system. A name too short to have a
/// system is malformed, not truncated.
pub fn to_endpoint_key(queue: &str, context: &MigrationContext) -> Result<String, TransformError> {
    if let Some((_, system)) = SPECIAL_TARGETS.iter().find(|(name, _)| *name == queue) {
        return Ok(format!("{system}#{}", context.queue_environment));
    }
    // -- ✅ already an endpoint key. encoding it again would be a war crime.
    if queue.contains('#') {
        return Ok(queue.to_string());
    }

    let segments: Vec<&str> = queue.split('-').collect();
    if segments.len() <= PREFIX_SEGMENTS + 1 {
        return Err(TransformError::malformed(
            queue,
            format!(
                "a queue name needs at least {} hyphen-separated segments (prefix, system, environment), found {}",
                PREFIX_SEGMENTS + 2,
                segments.len()
            ),
        ));
    }

    let (environment, rest) = segments
        .split_last()
        .ok_or_else(|| TransformError::malformed(queue, "empty queue name"))?;
    let system = rest[PREFIX_SEGMENTS..].join("-");
    if system.is_empty() || environment.is_empty() {
        return Err(TransformError::malformed(
            queue,
            "system and environment must both be non-empty",
        ));
    }

    Ok(format!("{}#{}", form_encode(&system), form_encode(environment)))
}

/// 🔄 Convert an endpoint key back to a legacy queue name.
///
/// Splits on the single `#`, decodes both halves and rebuilds `emx-to-<system>-<env>`.
pub fn to_queue_name(endpoint: &str, context: &MigrationContext) -> Result<String, TransformError> {
    if let Some((name, _)) = SPECIAL_TARGETS.iter().find(|(_, system)| {
        endpoint
            .strip_prefix(*system)
            .and_then(|rest| rest.strip_prefix('#'))
            == Some(context.queue_environment.as_str())
    }) {
        return Ok(name.to_string());
    }
    // -- ✅ already a queue name. leave it be.
    if endpoint.starts_with(QUEUE_PREFIX) || SPECIAL_TARGETS.iter().any(|(name, _)| *name == endpoint) {
        return Ok(endpoint.to_string());
    }

    let (system, environment) = match endpoint.split_once('#') {
        Some((system, environment)) if !environment.contains('#') => (system, environment),
        _ => {
            return Err(TransformError::malformed(
                endpoint,
                "an endpoint key needs exactly one '#' between system and environment",
            ));
        }
    };
    if system.is_empty() || environment.is_empty() {
        return Err(TransformError::malformed(
            endpoint,
            "system and environment must both be non-empty",
        ));
    }

    Ok(format!(
        "{QUEUE_PREFIX}{}-{}",
        form_decode(system),
        form_decode(environment)
    ))
}

// -- 🔐 application/x-www-form-urlencoded, the same rules the route manager's old client used
fn form_encode(raw: &str) -> String {
    form_urlencoded::byte_serialize(raw.as_bytes()).collect()
}

// -- 🔓 the other way. '+' is a space in www-form land, so it goes first.
fn form_decode(encoded: &str) -> String {
    let plus_as_space: Cow<'_, str> = if encoded.contains('+') {
        Cow::Owned(encoded.replace('+', " "))
    } else {
        Cow::Borrowed(encoded)
    };
    percent_decode_str(&plus_as_space)
        .decode_utf8_lossy()
        .into_owned()
}
