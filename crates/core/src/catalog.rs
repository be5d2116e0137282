//! Static lesson content shipped with the app.

use std::collections::HashSet;

use thiserror::Error;

use crate::model::{
    Flashcard, FlashcardError, FlashcardId, QuizItem, QuizItemError, QuizItemId, Topic,
    TopicError, TopicId,
};

#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum LessonPlanError {
    #[error("language name cannot be empty")]
    EmptyLanguageName,

    #[error("duplicate topic id {0}")]
    DuplicateTopic(TopicId),

    #[error(transparent)]
    Topic(#[from] TopicError),

    #[error(transparent)]
    Flashcard(#[from] FlashcardError),

    #[error(transparent)]
    QuizItem(#[from] QuizItemError),
}

/// The ordered topic catalog for one language.
#[derive(Debug, Clone, PartialEq)]
pub struct LessonPlan {
    language_name: String,
    topics: Vec<Topic>,
}

impl LessonPlan {
    /// Builds a plan from topics in display order.
    ///
    /// # Errors
    ///
    /// Returns `LessonPlanError` if the language name is blank or topic ids repeat.
    pub fn new(
        language_name: impl Into<String>,
        topics: Vec<Topic>,
    ) -> Result<Self, LessonPlanError> {
        let language_name = language_name.into();
        if language_name.trim().is_empty() {
            return Err(LessonPlanError::EmptyLanguageName);
        }
        let mut seen = HashSet::new();
        for topic in &topics {
            if !seen.insert(topic.id()) {
                return Err(LessonPlanError::DuplicateTopic(topic.id()));
            }
        }
        Ok(Self {
            language_name,
            topics,
        })
    }

    /// The built-in French course.
    ///
    /// # Errors
    ///
    /// Returns `LessonPlanError` only if the bundled content is malformed.
    pub fn french() -> Result<Self, LessonPlanError> {
        let flashcards = [
            ("Hello", "Bonjour"),
            ("Goodbye", "Au revoir"),
            ("Hi", "Salut"),
            ("How are you?", "Comment allez-vous?"),
        ]
        .into_iter()
        .zip(1_u64..)
        .map(|((front, back), id)| Flashcard::new(FlashcardId::new(id), front, back))
        .collect::<Result<Vec<_>, _>>()?;

        let quiz = vec![
            QuizItem::new(
                QuizItemId::new(1),
                "What is the French word for 'Hello'?",
                ["Bonjour", "Salut", "Oui", "Non"]
                    .into_iter()
                    .map(String::from)
                    .collect(),
                "bonjour",
            )?,
            QuizItem::new(QuizItemId::new(2), "What does 'Oui' mean?", Vec::new(), "yes")?,
        ];

        let greetings = Topic::new(
            TopicId::new(0),
            "Basic Greetings and Farewells",
            "Some helpful content",
            flashcards,
            quiz,
        )?;

        Self::new("French", vec![greetings])
    }

    #[must_use]
    pub fn language_name(&self) -> &str {
        &self.language_name
    }

    #[must_use]
    pub fn topics(&self) -> &[Topic] {
        &self.topics
    }

    #[must_use]
    pub fn topic(&self, id: TopicId) -> Option<&Topic> {
        self.topics.iter().find(|topic| topic.id() == id)
    }

    pub fn topic_mut(&mut self, id: TopicId) -> Option<&mut Topic> {
        self.topics.iter_mut().find(|topic| topic.id() == id)
    }
}
