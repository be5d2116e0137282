use crate::model::ids::TopicId;

/// Durable per-topic completion record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub topic_id: TopicId,
    pub lesson_read: bool,
    pub flashcard_studied: bool,
    pub quiz_passed: bool,
    pub quiz_high_score: Option<u32>,
}

/// Closed set of progress mutations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressUpdate {
    SetLessonRead(bool),
    SetFlashcardStudied(bool),
    SetQuizPassed(bool),
    SetQuizHighScore(u32),
}

impl Progress {
    /// A record with nothing completed yet.
    #[must_use]
    pub fn new(topic_id: TopicId) -> Self {
        Self {
            topic_id,
            lesson_read: false,
            flashcard_studied: false,
            quiz_passed: false,
            quiz_high_score: None,
        }
    }

    /// Applies one update and reports whether anything changed.
    pub fn apply(&mut self, update: ProgressUpdate) -> bool {
        let before = *self;
        match update {
            ProgressUpdate::SetLessonRead(value) => self.lesson_read = value,
            ProgressUpdate::SetFlashcardStudied(value) => self.flashcard_studied = value,
            ProgressUpdate::SetQuizPassed(value) => self.quiz_passed = value,
            ProgressUpdate::SetQuizHighScore(value) => self.quiz_high_score = Some(value),
        }
        before != *self
    }

    /// Records a passed quiz; the high score never decreases.
    pub fn record_quiz_pass(&mut self, score: u32) {
        self.quiz_passed = true;
        let best = self.quiz_high_score.unwrap_or(0).max(score);
        self.quiz_high_score = Some(best);
    }
}
