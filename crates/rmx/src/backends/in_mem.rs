//! # Previously, on rmx...
//!
//! 🎬 The routes were real. The route manager was not invited. Someone needed a
//! source that lives entirely in RAM and a sink that remembers everything it was
//! handed, so tests could run without a network, a disk, or a mortgage.
//!
//! That someone was this module. 🦆
//!
//! ⚠️ Also backs `sink = "Discard"`: routes go in, nothing goes out.

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::backends::{RouteSink, RouteSource};
use crate::common::Route;

/// 📦 A source holding one document, handed over on request.
#[derive(Debug, Clone)]
pub struct InMemorySource {
    document: String,
}

impl InMemorySource {
    pub fn new(document: impl Into<String>) -> Self {
        Self {
            document: document.into(),
        }
    }
}

#[async_trait]
impl RouteSource for InMemorySource {
    async fn load_document(&mut self) -> Result<String> {
        Ok(self.document.clone())
    }

    fn describe(&self) -> String {
        "in-memory".to_string()
    }

    fn is_remote(&self) -> bool {
        false
    }
}

/// 📦 A sink that never forgets.
///
/// Clone-able because tests need to peek inside after handing `self` off to the
/// migration. The `Arc` means every clone shares the same Vec.
#[derive(Debug, Default, Clone)]
pub struct InMemorySink {
    pub received: Arc<Mutex<Vec<Route>>>,
}

impl InMemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// 📋 What arrived so far, in arrival order.
    pub async fn routes(&self) -> Vec<Route> {
        self.received.lock().await.clone()
    }
}

#[async_trait]
impl RouteSink for InMemorySink {
    async fn submit(&self, route: &Route) -> Result<()> {
        self.received.lock().await.push(route.clone());
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        // 🗑️ nothing to flush. we live in RAM.
        Ok(())
    }

    fn describe(&self) -> String {
        "in-memory".to_string()
    }

    fn is_remote(&self) -> bool {
        false
    }
}
