use std::collections::HashSet;

use thiserror::Error;

use crate::model::flashcard::Flashcard;
use crate::model::ids::{FlashcardId, QuizItemId, TopicId};
use crate::model::quiz::QuizItem;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TopicError {
    #[error("topic title cannot be empty")]
    EmptyTitle,

    #[error("duplicate flashcard id {0} in topic")]
    DuplicateFlashcard(FlashcardId),

    #[error("duplicate quiz item id {0} in topic")]
    DuplicateQuizItem(QuizItemId),
}

/// One unit of instruction: a reading, a flashcard deck and an ordered quiz.
#[derive(Debug, Clone, PartialEq)]
pub struct Topic {
    id: TopicId,
    title: String,
    lesson_text: String,
    flashcards: Vec<Flashcard>,
    quiz: Vec<QuizItem>,
}

impl Topic {
    /// Creates a topic.
    ///
    /// # Errors
    ///
    /// Returns `TopicError` if the title is blank or flashcard/quiz ids repeat.
    pub fn new(
        id: TopicId,
        title: impl Into<String>,
        lesson_text: impl Into<String>,
        flashcards: Vec<Flashcard>,
        quiz: Vec<QuizItem>,
    ) -> Result<Self, TopicError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(TopicError::EmptyTitle);
        }

        let mut seen = HashSet::new();
        for card in &flashcards {
            if !seen.insert(card.id()) {
                return Err(TopicError::DuplicateFlashcard(card.id()));
            }
        }
        let mut seen = HashSet::new();
        for item in &quiz {
            if !seen.insert(item.id()) {
                return Err(TopicError::DuplicateQuizItem(item.id()));
            }
        }

        Ok(Self {
            id,
            title,
            lesson_text: lesson_text.into(),
            flashcards,
            quiz,
        })
    }

    #[must_use]
    pub fn id(&self) -> TopicId {
        self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn lesson_text(&self) -> &str {
        &self.lesson_text
    }

    #[must_use]
    pub fn flashcards(&self) -> &[Flashcard] {
        &self.flashcards
    }

    #[must_use]
    pub fn quiz(&self) -> &[QuizItem] {
        &self.quiz
    }

    #[must_use]
    pub fn flashcard(&self, id: FlashcardId) -> Option<&Flashcard> {
        self.flashcards.iter().find(|card| card.id() == id)
    }

    pub fn flashcard_mut(&mut self, id: FlashcardId) -> Option<&mut Flashcard> {
        self.flashcards.iter_mut().find(|card| card.id() == id)
    }

    #[must_use]
    pub fn quiz_item(&self, id: QuizItemId) -> Option<&QuizItem> {
        self.quiz.iter().find(|item| item.id() == id)
    }

    pub fn quiz_item_mut(&mut self, id: QuizItemId) -> Option<&mut QuizItem> {
        self.quiz.iter_mut().find(|item| item.id() == id)
    }

    /// Sum of item scores; always consistent with item state.
    #[must_use]
    pub fn quiz_score(&self) -> u32 {
        self.quiz
            .iter()
            .fold(0_u32, |total, item| total.saturating_add(item.score()))
    }

    /// True only when every item has been answered correctly.
    #[must_use]
    pub fn is_quiz_passed(&self) -> bool {
        self.quiz.iter().all(|item| item.is_correct() == Some(true))
    }

    pub fn reset_flashcards(&mut self) {
        for card in &mut self.flashcards {
            card.reset();
        }
    }

    pub fn reset_quiz(&mut self) {
        for item in &mut self.quiz {
            item.reset();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;
    use chrono::Duration;

    fn topic() -> Topic {
        let cards = vec![
            Flashcard::new(FlashcardId::new(1), "Hello", "Bonjour").unwrap(),
            Flashcard::new(FlashcardId::new(2), "Goodbye", "Au revoir").unwrap(),
        ];
        let quiz = vec![
            QuizItem::new(QuizItemId::new(1), "Hello?", vec!["Bonjour".into()], "bonjour")
                .unwrap(),
            QuizItem::new(QuizItemId::new(2), "Oui?", vec![], "yes").unwrap(),
        ];
        Topic::new(TopicId::new(0), "Greetings", "Some helpful content", cards, quiz).unwrap()
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let cards = vec![
            Flashcard::new(FlashcardId::new(1), "a", "b").unwrap(),
            Flashcard::new(FlashcardId::new(1), "c", "d").unwrap(),
        ];
        let err = Topic::new(TopicId::new(0), "T", "", cards, vec![]).unwrap_err();
        assert_eq!(err, TopicError::DuplicateFlashcard(FlashcardId::new(1)));
    }

    #[test]
    fn quiz_score_sums_items_and_pass_requires_all_correct() {
        let t0 = fixed_now();
        let mut topic = topic();
        let first = topic.quiz_item_mut(QuizItemId::new(1)).unwrap();
        first.open(t0);
        first.submit("Bonjour", t0 + Duration::seconds(3)).unwrap();
        topic
            .quiz_item_mut(QuizItemId::new(2))
            .unwrap()
            .submit("no", t0)
            .unwrap();

        assert_eq!(topic.quiz_score(), 19);
        assert!(!topic.is_quiz_passed());
    }

    #[test]
    fn unanswered_item_fails_the_quiz() {
        let mut topic = topic();
        topic
            .quiz_item_mut(QuizItemId::new(1))
            .unwrap()
            .submit("bonjour", fixed_now())
            .unwrap();
        assert!(!topic.is_quiz_passed());
    }

    #[test]
    fn reset_flashcards_turns_every_card_face_up() {
        let mut topic = topic();
        topic.flashcard_mut(FlashcardId::new(2)).unwrap().flip();
        topic.reset_flashcards();
        assert!(topic.flashcards().iter().all(Flashcard::is_face_up));
    }
}
