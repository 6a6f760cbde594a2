// Audit trail: hands each moderation result to a sink after the fact.
//
// Recording happens on a detached task: a slow or failing sink can never
// delay or fail the moderation response. Failures are logged and dropped.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::moderation::models::{Hit, ModerationResult};
use crate::output::truncate_chars;

/// Immutable record of one moderation call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    pub text: String,
    pub used_semantic: bool,
    pub contains_profanity: bool,
    pub severity: u8,
    pub hits: Vec<Hit>,
    pub created_at: DateTime<Utc>,
}

impl AuditEntry {
    pub fn new(text: &str, result: &ModerationResult) -> Self {
        Self {
            text: text.to_string(),
            used_semantic: result.used_semantic,
            contains_profanity: result.contains_profanity,
            severity: result.severity,
            hits: result.hits.clone(),
            created_at: Utc::now(),
        }
    }
}

#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn record(&self, entry: &AuditEntry) -> Result<()>;
}

/// Sink that writes each entry as a structured log event.
pub struct TracingAuditSink;

#[async_trait]
impl AuditSink for TracingAuditSink {
    async fn record(&self, entry: &AuditEntry) -> Result<()> {
        info!(
            target: "bleep::audit",
            contains_profanity = entry.contains_profanity,
            severity = entry.severity,
            hits = entry.hits.len(),
            used_semantic = entry.used_semantic,
            text_preview = %truncate_chars(&entry.text, 80),
            "Moderation recorded"
        );
        Ok(())
    }
}

/// Record an entry on a spawned task. Returns immediately.
pub fn record_detached(sink: Arc<dyn AuditSink>, entry: AuditEntry) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        if let Err(e) = sink.record(&entry).await {
            warn!(error = %format!("{e:#}"), "Failed to record moderation audit entry");
        }
    })
}
