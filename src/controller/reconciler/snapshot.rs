//! # Revision Snapshots
//!
//! Fetches and decodes the per-revision kube-controller-manager config
//! documents for the revisions the fleet currently runs.
//!
//! Every distinct revision is looked up exactly once. Lookups run
//! concurrently and the first failure aborts the whole batch.

use crate::observability;
use crate::store::{SnapshotSource, StoreError};
use futures::future::try_join_all;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use thiserror::Error;
use tracing::debug;

/// Config revision a control-plane replica is running
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RevisionId(pub i32);

impl fmt::Display for RevisionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Decoded `KubeControllerManagerConfig` document
///
/// Only `extendedArguments` is read. Unknown fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigSnapshot {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub extended_arguments: BTreeMap<String, Vec<String>>,
}

/// `null` for the whole map or for a value list decodes as empty
fn null_as_empty<'de, D>(deserializer: D) -> Result<BTreeMap<String, Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let arguments = Option::<BTreeMap<String, Option<Vec<String>>>>::deserialize(deserializer)?;
    Ok(arguments
        .unwrap_or_default()
        .into_iter()
        .map(|(name, values)| (name, values.unwrap_or_default()))
        .collect())
}

impl ConfigSnapshot {
    /// Snapshot whose arguments each carry a single value
    pub fn with_arguments<'a, I>(arguments: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        Self {
            extended_arguments: arguments
                .into_iter()
                .map(|(name, value)| (name.to_string(), vec![value.to_string()]))
                .collect(),
        }
    }

    /// Values recorded for `name`, `None` when the argument is absent
    #[must_use]
    pub fn argument(&self, name: &str) -> Option<&[String]> {
        self.extended_arguments.get(name).map(Vec::as_slice)
    }
}

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("config snapshot {namespace}/{name} for revision {revision} not found")]
    NotFound {
        revision: RevisionId,
        namespace: String,
        name: String,
    },
    #[error("could not find {key} in {name} config map from {namespace} namespace")]
    MissingKey {
        key: String,
        namespace: String,
        name: String,
    },
    #[error("failed to decode config snapshot {namespace}/{name}: {source}")]
    Decode {
        namespace: String,
        name: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to look up config snapshot for revision {revision}: {source}")]
    Store {
        revision: RevisionId,
        #[source]
        source: StoreError,
    },
}

/// Where per-revision snapshots live
#[derive(Debug, Clone, Copy)]
pub struct SnapshotLocation<'a> {
    pub namespace: &'a str,
    pub base_name: &'a str,
    pub key: &'a str,
}

/// Deduplicate revisions, keeping first-seen order
pub fn distinct_revisions<I>(revisions: I) -> Vec<RevisionId>
where
    I: IntoIterator<Item = RevisionId>,
{
    let mut seen = HashSet::new();
    revisions
        .into_iter()
        .filter(|revision| seen.insert(*revision))
        .collect()
}

/// Name of the snapshot document for `revision`, e.g. `config-7`
#[must_use]
pub fn snapshot_name(base_name: &str, revision: RevisionId) -> String {
    format!("{base_name}-{revision}")
}

/// Decode the raw document data of a snapshot
pub fn decode_snapshot(
    data: &BTreeMap<String, String>,
    location: SnapshotLocation<'_>,
    name: &str,
) -> Result<ConfigSnapshot, SnapshotError> {
    let raw = data.get(location.key).ok_or_else(|| SnapshotError::MissingKey {
        key: location.key.to_string(),
        namespace: location.namespace.to_string(),
        name: name.to_string(),
    })?;
    serde_json::from_str(raw).map_err(|source| SnapshotError::Decode {
        namespace: location.namespace.to_string(),
        name: name.to_string(),
        source,
    })
}

async fn fetch_one<S>(
    source: &S,
    location: SnapshotLocation<'_>,
    revision: RevisionId,
) -> Result<ConfigSnapshot, SnapshotError>
where
    S: SnapshotSource + ?Sized,
{
    let name = snapshot_name(location.base_name, revision);
    debug!(revision = %revision, snapshot = %name, "Looking up config snapshot");

    let data = match source.get_document(location.namespace, &name).await {
        Ok(Some(data)) => data,
        Ok(None) => {
            observability::increment_snapshot_lookups("missing");
            return Err(SnapshotError::NotFound {
                revision,
                namespace: location.namespace.to_string(),
                name,
            });
        }
        Err(source) => {
            observability::increment_snapshot_lookups("error");
            return Err(SnapshotError::Store { revision, source });
        }
    };
    observability::increment_snapshot_lookups("found");

    decode_snapshot(&data, location, &name)
}

/// Fetch the snapshot of every distinct revision in `revisions`
///
/// One lookup per distinct revision, all in flight at once. Results are in
/// first-seen revision order.
///
/// # Errors
///
/// The first lookup, missing-key or decode failure aborts the batch.
pub async fn fetch_snapshots<S>(
    source: &S,
    location: SnapshotLocation<'_>,
    revisions: &[RevisionId],
) -> Result<Vec<ConfigSnapshot>, SnapshotError>
where
    S: SnapshotSource + ?Sized,
{
    let distinct = distinct_revisions(revisions.iter().copied());
    try_join_all(
        distinct
            .into_iter()
            .map(|revision| fetch_one(source, location, revision)),
    )
    .await
}
