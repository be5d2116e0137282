//! Shared error types for the services crate.

use thiserror::Error;

use lesson_core::model::{FlashcardId, QuizItemId, TopicId};

/// Errors emitted by `LessonPlanService`.
///
/// Every variant is benign: the requested mutation was not applied and callers
/// may ignore it.
#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum LessonError {
    #[error("topic {0} not found")]
    TopicNotFound(TopicId),
    #[error("flashcard {flashcard_id} not found in topic {topic_id}")]
    FlashcardNotFound {
        flashcard_id: FlashcardId,
        topic_id: TopicId,
    },
    #[error("quiz item {quiz_item_id} not found in topic {topic_id}")]
    QuizItemNotFound {
        quiz_item_id: QuizItemId,
        topic_id: TopicId,
    },
    #[error("quiz item {0} has already been answered")]
    AlreadyAnswered(QuizItemId),
}

impl LessonError {
    /// True for lookups that did not resolve.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            LessonError::TopicNotFound(_)
                | LessonError::FlashcardNotFound { .. }
                | LessonError::QuizItemNotFound { .. }
        )
    }
}
