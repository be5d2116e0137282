use thiserror::Error;

use crate::model::ids::FlashcardId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum FlashcardError {
    #[error("flashcard front cannot be empty")]
    EmptyFront,

    #[error("flashcard back cannot be empty")]
    EmptyBack,
}

/// One front/back pair studied by flipping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flashcard {
    id: FlashcardId,
    front: String,
    back: String,
    is_face_up: bool,
}

impl Flashcard {
    /// Creates a face-up flashcard.
    ///
    /// # Errors
    ///
    /// Returns `FlashcardError` if either side is blank.
    pub fn new(
        id: FlashcardId,
        front: impl Into<String>,
        back: impl Into<String>,
    ) -> Result<Self, FlashcardError> {
        let front = front.into();
        let back = back.into();
        if front.trim().is_empty() {
            return Err(FlashcardError::EmptyFront);
        }
        if back.trim().is_empty() {
            return Err(FlashcardError::EmptyBack);
        }

        Ok(Self {
            id,
            front,
            back,
            is_face_up: true,
        })
    }

    #[must_use]
    pub fn id(&self) -> FlashcardId {
        self.id
    }

    #[must_use]
    pub fn front(&self) -> &str {
        &self.front
    }

    #[must_use]
    pub fn back(&self) -> &str {
        &self.back
    }

    #[must_use]
    pub fn is_face_up(&self) -> bool {
        self.is_face_up
    }

    /// The text currently showing.
    #[must_use]
    pub fn visible_text(&self) -> &str {
        if self.is_face_up { &self.front } else { &self.back }
    }

    /// Turns the card over and returns the new orientation.
    pub fn flip(&mut self) -> bool {
        self.is_face_up = !self.is_face_up;
        self.is_face_up
    }

    pub fn reset(&mut self) {
        self.is_face_up = true;
    }
}
