// ai
//! 📦 Common data structures — the building blocks of rmx
//!
//! ---
//!
//! 🎬 COLD OPEN — INT. ROUTE MANAGER — 4:12 PM, THE FRIDAY BEFORE A LONG WEEKEND
//!
//! Somebody renamed a queue. Then somebody renamed the naming scheme.
//! Now every route in the dispatch service points at targets spelled two
//! different ways, and the rules attached to them speak two dialects.
//! Nobody remembers which one is "new". Both of them are.
//!
//! ✅ And then — a `Route` arrives. Quietly. Carrying its uuid like a passport,
//! its rule like a grudge, and its queues like a grocery list that must be
//! read top to bottom. Order matters. The list says so. The list is always right.
//!
//! 🦆
//!
//! This module defines the humble yet load-bearing structs that carry routes
//! from the route manager, through the transforms, and back again. They don't
//! ask questions. They are never mutated in place. Every change is a new Route,
//! born whole, with every field it didn't touch copied verbatim.

use anyhow::Context;
use serde::{Deserialize, Deserializer, Serialize};

/// 🎯 A singular `Route` — one rule, some queues, one destiny.
///
/// The uuid, name, rule and queues are required. If the JSON forgets one of them,
/// serde says so by name. The rest default to empty/false, and `null` is welcome
/// too, because the route manager has been known to send it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    /// Opaque identifier. No transform touches it. Ever.
    pub uuid: String,
    pub name: String,
    /// 📜 A free-text boolean predicate. Not parsed. Only gently rewritten.
    pub rule: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub enabled: bool,
    /// 🔢 Ordered targets. Order survives every transform that doesn't explicitly reorder.
    pub queues: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub created_date: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub modified_date: String,
}

/// 📦 The wire envelope. One object, one array, one oddly-named field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutesList {
    #[serde(rename = "routesList")]
    pub routes: Vec<Route>,
}

// -- 🕳️ `null` → default. The route manager sends nulls like a cat brings you birds.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl Route {
    /// 🔄 A new Route with these queues and everything else copied verbatim.
    pub fn with_queues(&self, queues: Vec<String>) -> Route {
        Route {
            queues,
            ..self.clone()
        }
    }

    /// 🔄 A new Route with this rule and everything else copied verbatim.
    pub fn with_rule(&self, rule: String) -> Route {
        Route {
            rule,
            ..self.clone()
        }
    }

    /// 📋 The form parameters the update endpoint expects, in the order it has always received them.
    ///
    /// `queues` travel comma-joined, `enabled` travels as the words "true"/"false".
    /// `createdDate` and `modifiedDate` stay home; the server owns those.
    pub fn form_params(&self) -> Vec<(&'static str, String)> {
        vec![
            ("name", self.name.clone()),
            ("rule", self.rule.clone()),
            ("description", self.description.clone()),
            ("queues", self.queues.join(",")),
            ("enabled", self.enabled.to_string()),
            ("uuid", self.uuid.clone()),
        ]
    }

    /// 📮 `form_params` run through the www-form encoder. Ready for a PUT body.
    pub fn form_body(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (key, value) in self.form_params() {
            serializer.append_pair(key, &value);
        }
        serializer.finish()
    }
}

impl RoutesList {
    /// 🏗️ Parse the route manager's document. Missing required fields are named in the error.
    pub fn parse(raw: &str) -> anyhow::Result<Self> {
        serde_json::from_str(raw).context(
            "💀 The routes document refused to become routes. \
             Expected an object with a `routesList` array, each route carrying at least \
             uuid, name, rule and queues. Something in there is missing or mistyped.",
        )
    }

    /// 📝 Pretty JSON, the same shape we read. For dry runs and humans.
    pub fn to_json_pretty(&self) -> anyhow::Result<String> {
        serde_json::to_string_pretty(self)
            .context("💀 Failed to serialize routes back into JSON. The round trip got lost on the way home.")
    }
}

impl From<Vec<Route>> for RoutesList {
    fn from(routes: Vec<Route>) -> Self {
        RoutesList { routes }
    }
}
