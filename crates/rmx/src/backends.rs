//! 🔌 Backends — where the real I/O happens.
//!
//! 🚰 Sources hand us the routes document. Sinks take transformed routes away.
//! And in between, the pure transforms do their thing without ever seeing a socket.
//!
//! 🎭 This module is the casting agency. Need routes from the route manager?
//! From yesterday's backup file? Want to send them back, write them to disk
//! for a dry run, or throw them into the void? We've got a backend for that.
//!
//! 🦆 The duck is here because every file must have one. This is law. Do not question the duck.

use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;

use crate::common::Route;

pub mod backup;
pub mod file;
pub mod in_mem;
pub mod route_manager;

pub use file::{FileSink, FileSinkConfig, FileSource, FileSourceConfig};
pub use in_mem::{InMemorySink, InMemorySource};
pub use route_manager::{RouteManagerClient, RouteManagerConfig, RouteManagerSink, RouteManagerSource};

// ===== Source Trait and Backend Enum =====

/// 🚰 Something that can hand over the raw routes document.
///
/// Raw on purpose: the caller backs up exactly what it received before parsing
/// a single byte of it.
#[async_trait]
pub trait RouteSource: std::fmt::Debug + Send + Sync {
    /// 📦 Fetch the whole document, as text, exactly as the origin sent it.
    async fn load_document(&mut self) -> Result<String>;
    /// 🏷️ Where the document came from, for logs and the summary table.
    fn describe(&self) -> String;
    /// 📡 Whether the document came from the live service (and so deserves a backup).
    fn is_remote(&self) -> bool;
}

/// 🧭 Which source to use. Configured as `source = "RouteManager"` or `[source.File]`.
#[derive(Debug, Deserialize, Clone, Default)]
pub enum SourceConfig {
    #[default]
    RouteManager,
    File(FileSourceConfig),
}

/// 🎭 The many faces of a RouteSource.
#[derive(Debug)]
pub enum SourceBackend {
    InMemory(InMemorySource),
    File(FileSource),
    RouteManager(RouteManagerSource),
}

#[async_trait]
impl RouteSource for SourceBackend {
    async fn load_document(&mut self) -> Result<String> {
        match self {
            SourceBackend::InMemory(source) => source.load_document().await,
            SourceBackend::File(source) => source.load_document().await,
            SourceBackend::RouteManager(source) => source.load_document().await,
        }
    }

    fn describe(&self) -> String {
        match self {
            SourceBackend::InMemory(source) => source.describe(),
            SourceBackend::File(source) => source.describe(),
            SourceBackend::RouteManager(source) => source.describe(),
        }
    }

    fn is_remote(&self) -> bool {
        match self {
            SourceBackend::InMemory(source) => source.is_remote(),
            SourceBackend::File(source) => source.is_remote(),
            SourceBackend::RouteManager(source) => source.is_remote(),
        }
    }
}

// ===== Sink Trait and Backend Enum =====

/// 🕳️ Something that accepts transformed routes, one at a time.
///
/// `submit` takes `&self` so several submissions can be in flight at once.
/// `close` flushes whatever the sink buffered. Call it. Always.
#[async_trait]
pub trait RouteSink: std::fmt::Debug + Send + Sync {
    /// 📥 Hand one route over. An error here is fatal for that route's call.
    async fn submit(&self, route: &Route) -> Result<()>;
    /// 🗑️ Flush, finalize, release.
    async fn close(&self) -> Result<()>;
    fn describe(&self) -> String;
    /// 📡 Whether submissions go to the live service. Local sinks record arrival
    /// order, so they get one submission at a time.
    fn is_remote(&self) -> bool;
}

/// 🧭 Which sink to use. `Discard` runs everything but sends nothing anywhere.
#[derive(Debug, Deserialize, Clone, Default)]
pub enum SinkConfig {
    #[default]
    RouteManager,
    File(FileSinkConfig),
    Discard,
}

/// 🎭 The many faces of a RouteSink.
#[derive(Debug)]
pub enum SinkBackend {
    InMemory(InMemorySink),
    File(FileSink),
    RouteManager(RouteManagerSink),
}

#[async_trait]
impl RouteSink for SinkBackend {
    async fn submit(&self, route: &Route) -> Result<()> {
        match self {
            SinkBackend::InMemory(sink) => sink.submit(route).await,
            SinkBackend::File(sink) => sink.submit(route).await,
            SinkBackend::RouteManager(sink) => sink.submit(route).await,
        }
    }

    async fn close(&self) -> Result<()> {
        match self {
            SinkBackend::InMemory(sink) => sink.close().await,
            SinkBackend::File(sink) => sink.close().await,
            SinkBackend::RouteManager(sink) => sink.close().await,
        }
    }

    fn describe(&self) -> String {
        match self {
            SinkBackend::InMemory(sink) => sink.describe(),
            SinkBackend::File(sink) => sink.describe(),
            SinkBackend::RouteManager(sink) => sink.describe(),
        }
    }

    fn is_remote(&self) -> bool {
        match self {
            SinkBackend::InMemory(sink) => sink.is_remote(),
            SinkBackend::File(sink) => sink.is_remote(),
            SinkBackend::RouteManager(sink) => sink.is_remote(),
        }
    }
}
