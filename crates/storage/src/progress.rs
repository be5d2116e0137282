use std::sync::Arc;

use lesson_core::model::{Progress, TopicId};
use serde::{Deserialize, Serialize};

use crate::repository::{KeyValueStore, StorageError};

const PROGRESS_KEY_PREFIX: &str = "Progress";

/// Store key for a topic's progress record.
#[must_use]
pub fn progress_key(topic_id: TopicId) -> String {
    format!("{PROGRESS_KEY_PREFIX}_{topic_id}")
}

/// Persisted shape for a progress record.
///
/// Field names are part of the stored format and must stay stable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressRecord {
    #[serde(rename = "topicID")]
    pub topic_id: TopicId,
    pub lesson_read: bool,
    pub flashcard_studied: bool,
    pub quiz_passed: bool,
    #[serde(default)]
    pub quiz_high_score: Option<u32>,
}

impl ProgressRecord {
    #[must_use]
    pub fn from_progress(progress: &Progress) -> Self {
        Self {
            topic_id: progress.topic_id,
            lesson_read: progress.lesson_read,
            flashcard_studied: progress.flashcard_studied,
            quiz_passed: progress.quiz_passed,
            quiz_high_score: progress.quiz_high_score,
        }
    }

    #[must_use]
    pub fn into_progress(self) -> Progress {
        Progress {
            topic_id: self.topic_id,
            lesson_read: self.lesson_read,
            flashcard_studied: self.flashcard_studied,
            quiz_passed: self.quiz_passed,
            quiz_high_score: self.quiz_high_score,
        }
    }

    /// Encode as JSON bytes.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` if encoding fails.
    pub fn encode(&self) -> Result<Vec<u8>, StorageError> {
        serde_json::to_vec(self).map_err(|err| StorageError::Serialization(err.to_string()))
    }

    /// Decode from JSON bytes.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` if the payload is not a valid record.
    pub fn decode(bytes: &[u8]) -> Result<Self, StorageError> {
        serde_json::from_slice(bytes).map_err(|err| StorageError::Serialization(err.to_string()))
    }
}

/// Loads and saves `Progress` through a key-value store.
///
/// Storage failures never reach the caller: a failed or undecodable load reads as
/// "no record", and a failed save is logged and dropped.
#[derive(Clone)]
pub struct ProgressGateway {
    store: Arc<dyn KeyValueStore>,
}

impl ProgressGateway {
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub async fn load(&self, topic_id: TopicId) -> Option<Progress> {
        let key = progress_key(topic_id);
        let bytes = match self.store.get(&key).await {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return None,
            Err(error) => {
                tracing::warn!(%key, %error, "failed to read progress; using defaults");
                return None;
            }
        };

        match ProgressRecord::decode(&bytes) {
            Ok(record) if record.topic_id == topic_id => Some(record.into_progress()),
            Ok(record) => {
                tracing::warn!(
                    %key,
                    stored = %record.topic_id,
                    "progress record belongs to another topic; ignoring"
                );
                None
            }
            Err(error) => {
                tracing::warn!(%key, %error, "undecodable progress record; ignoring");
                None
            }
        }
    }

    pub async fn save(&self, progress: &Progress) {
        let key = progress_key(progress.topic_id);
        let result = match ProgressRecord::from_progress(progress).encode() {
            Ok(bytes) => self.store.set(&key, &bytes).await,
            Err(error) => Err(error),
        };
        match result {
            Ok(()) => tracing::debug!(%key, "progress saved"),
            Err(error) => tracing::warn!(%key, %error, "failed to save progress"),
        }
    }
}
