//! Collector abstraction: two polymorphic collection strategies (HTTP
//! request/response and full browser rendering) behind one capability, so
//! the orchestrator treats them uniformly and a third strategy can be added
//! without touching the merger.

pub mod browser;
pub mod chromium;
pub mod http;

use crate::record::{CookieRecord, FailureStage, StorageItem};
use async_trait::async_trait;
use std::fmt;
use thiserror::Error;
use url::Url;

/// Which collection strategy a collector implements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectorKind {
    Http,
    Browser,
}

impl CollectorKind {
    /// The failure stage a collector's errors are recorded under.
    pub fn stage(self) -> FailureStage {
        match self {
            Self::Http => FailureStage::Http,
            Self::Browser => FailureStage::Browser,
        }
    }
}

impl fmt::Display for CollectorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http => write!(f, "http"),
            Self::Browser => write!(f, "browser"),
        }
    }
}

/// Errors raised inside the collection pipeline. None of these aborts a
/// run; the orchestrator demotes them to per-record failure notes.
#[derive(Debug, Error)]
pub enum CollectError {
    /// The site identifier contains no resolvable host. Fatal for that one
    /// site only.
    #[error("invalid target `{0}`: no resolvable host")]
    InvalidTarget(String),

    /// A collector failed (network, TLS, engine launch, navigation).
    #[error("{kind} collector failed: {message}")]
    Collector {
        kind: CollectorKind,
        message: String,
    },
}

impl CollectError {
    /// Shorthand for a collector-tagged failure.
    pub fn collector(kind: CollectorKind, message: impl fmt::Display) -> Self {
        Self::Collector {
            kind,
            message: message.to_string(),
        }
    }
}

/// What one collection pass observed on a site.
#[derive(Debug, Default)]
pub struct PartialResult {
    pub cookies: Vec<CookieRecord>,
    pub storage_items: Vec<StorageItem>,
}

/// A collection strategy. Implementations never panic past this boundary;
/// failure is reported through `CollectError` and yields no data.
#[async_trait]
pub trait Collector: Send + Sync {
    /// Which strategy this is (used to tag cookies and failure notes).
    fn kind(&self) -> CollectorKind;

    /// Visit the seed URL and return everything observed.
    async fn collect(&self, url: &Url) -> Result<PartialResult, CollectError>;
}
