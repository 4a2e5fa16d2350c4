use mongodb::bson::oid::ObjectId;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

use crate::db::repository::ResourceRepository;
use crate::error::AppError;
use crate::models::notes::Topic;
use crate::parser::tokens::parse_image_ref;
use crate::storage::client::{AssetStorage, PendingAsset};

/// Substring the persistence layer uses to signal an order conflict.
///
/// Matching on the message keeps compatibility with collaborators that
/// report conflicts as plain failure text instead of a structured error.
const ORDER_CONFLICT_MARKER: &str = "Order already exists";

/// Classification of a single failed topic submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FailureReason {
    /// The container already holds a topic with the submitted order.
    DuplicateOrder,
    /// Any other submission error, carrying the underlying message.
    Other(String),
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::DuplicateOrder => write!(f, "{ORDER_CONFLICT_MARKER}"),
            FailureReason::Other(msg) => write!(f, "{msg}"),
        }
    }
}

/// One failed topic within a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportFailure {
    /// Title of the topic whose submission failed.
    pub title: String,
    pub reason: FailureReason,
}

/// Aggregate outcome of one bulk import batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    pub success_count: usize,
    pub failures: Vec<ImportFailure>,
}

impl ImportReport {
    /// True when every topic in the batch was persisted.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Upload every pending asset and rewrite matching image references to
/// the returned URLs.
///
/// Runs before parsing, so the hierarchy builder only ever sees resolved
/// URLs and performs no I/O itself. References that name no pending asset
/// are left untouched (they may already be resolved). Any upload failure
/// aborts resolution before a single topic is submitted.
pub async fn resolve_asset_refs(
    storage: &dyn AssetStorage,
    text: &str,
    assets: Vec<PendingAsset>,
) -> Result<String, AppError> {
    let mut resolved: HashMap<String, String> = HashMap::new();
    for asset in assets {
        let url = storage
            .upload_asset(&asset.name, &asset.content_type, asset.data)
            .await?;
        resolved.insert(asset.name, url);
    }

    let lines: Vec<String> = text
        .lines()
        .map(|line| {
            if let Some(name) = parse_image_ref(line.trim()) {
                if let Some(url) = resolved.get(&name) {
                    return format!("![Image]({url})");
                }
            }
            line.to_string()
        })
        .collect();

    Ok(lines.join("\n"))
}

fn classify(err: &AppError) -> FailureReason {
    match err {
        AppError::Conflict(_) => FailureReason::DuplicateOrder,
        other if other.to_string().contains(ORDER_CONFLICT_MARKER) => {
            FailureReason::DuplicateOrder
        }
        other => FailureReason::Other(other.to_string()),
    }
}

/// Submit each parsed topic to the container, one at a time.
///
/// Submissions are strictly sequential — each one is awaited before the
/// next begins — so conflict detection on the server yields the same error
/// report for the same input every time. A failed item never stops the
/// rest of the batch; the caller presents the aggregate report. Nothing is
/// retried automatically.
pub async fn import_topics(
    repo: &dyn ResourceRepository,
    container_id: &ObjectId,
    topics: &[Topic],
) -> ImportReport {
    let mut report = ImportReport::default();

    for topic in topics {
        match repo.submit_topic(container_id, topic).await {
            Ok(()) => report.success_count += 1,
            Err(err) => {
                tracing::warn!(title = %topic.title, "Topic submission failed: {err}");
                report.failures.push(ImportFailure {
                    title: topic.title.clone(),
                    reason: classify(&err),
                });
            }
        }
    }

    tracing::info!(
        succeeded = report.success_count,
        failed = report.failures.len(),
        "Bulk import finished"
    );
    report
}
