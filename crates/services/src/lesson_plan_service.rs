use std::collections::HashMap;
use std::sync::Arc;

use lesson_core::LessonPlan;
use lesson_core::model::{
    AnswerOutcome, BonusTiming, Flashcard, FlashcardId, Progress, ProgressUpdate, QuizItem,
    QuizItemCommand, QuizItemId, QuizTransition, Topic, TopicId,
};
use rand::Rng;
use rand::seq::SliceRandom;
use storage::ProgressGateway;

use crate::Clock;
use crate::audio::{CORRECT_ANSWER_SOUND, SoundPlayer};
use crate::error::LessonError;

/// Outcome of `LessonPlanService::finish_quiz`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizResult {
    pub passed: bool,
    pub score: u32,
    pub high_score: Option<u32>,
}

/// Single owner and mutator of the lesson catalog and per-topic progress.
///
/// Quiz and flashcard state lives in memory only. Progress is loaded lazily on first
/// access per topic and written through to the gateway after every mutation.
pub struct LessonPlanService {
    clock: Clock,
    plan: LessonPlan,
    progress: HashMap<TopicId, Progress>,
    gateway: ProgressGateway,
    sound: Arc<dyn SoundPlayer>,
}

impl LessonPlanService {
    #[must_use]
    pub fn new(
        clock: Clock,
        plan: LessonPlan,
        gateway: ProgressGateway,
        sound: Arc<dyn SoundPlayer>,
    ) -> Self {
        Self {
            clock,
            plan,
            progress: HashMap::new(),
            gateway,
            sound,
        }
    }

    #[must_use]
    pub fn clock(&self) -> Clock {
        self.clock
    }

    pub fn set_clock(&mut self, clock: Clock) {
        self.clock = clock;
    }

    //
    // ─── CATALOG READS ─────────────────────────────────────────────────────────
    //

    #[must_use]
    pub fn language_name(&self) -> &str {
        self.plan.language_name()
    }

    #[must_use]
    pub fn list_topics(&self) -> &[Topic] {
        self.plan.topics()
    }

    #[must_use]
    pub fn get_topic(&self, topic_id: TopicId) -> Option<&Topic> {
        self.plan.topic(topic_id)
    }

    #[must_use]
    pub fn flashcard(&self, flashcard_id: FlashcardId, topic_id: TopicId) -> Option<&Flashcard> {
        self.get_topic(topic_id)?.flashcard(flashcard_id)
    }

    #[must_use]
    pub fn quiz_item(&self, quiz_item_id: QuizItemId, topic_id: TopicId) -> Option<&QuizItem> {
        self.get_topic(topic_id)?.quiz_item(quiz_item_id)
    }

    /// Orientation of a flashcard; unknown cards read as face up.
    #[must_use]
    pub fn is_face_up(&self, flashcard_id: FlashcardId, topic_id: TopicId) -> bool {
        self.flashcard(flashcard_id, topic_id)
            .is_none_or(Flashcard::is_face_up)
    }

    #[must_use]
    pub fn quiz_score(&self, topic_id: TopicId) -> Option<u32> {
        self.get_topic(topic_id).map(Topic::quiz_score)
    }

    /// Bonus-clock snapshot for a periodic display tick, evaluated at the clock's now.
    #[must_use]
    pub fn quiz_item_timing(
        &self,
        quiz_item_id: QuizItemId,
        topic_id: TopicId,
    ) -> Option<BonusTiming> {
        self.quiz_item(quiz_item_id, topic_id)
            .map(|item| item.timing(self.clock.now()))
    }

    //
    // ─── FLASHCARDS ────────────────────────────────────────────────────────────
    //

    /// Flips a flashcard and returns its new orientation.
    ///
    /// # Errors
    ///
    /// Returns `LessonError::TopicNotFound` or `LessonError::FlashcardNotFound`.
    pub fn flip_flashcard(
        &mut self,
        flashcard_id: FlashcardId,
        topic_id: TopicId,
    ) -> Result<bool, LessonError> {
        let card = self
            .topic_mut(topic_id)?
            .flashcard_mut(flashcard_id)
            .ok_or(LessonError::FlashcardNotFound {
                flashcard_id,
                topic_id,
            })?;
        Ok(card.flip())
    }

    /// Turns every flashcard of a topic face up.
    ///
    /// # Errors
    ///
    /// Returns `LessonError::TopicNotFound` for unknown topics.
    pub fn reset_flashcards(&mut self, topic_id: TopicId) -> Result<(), LessonError> {
        self.topic_mut(topic_id)?.reset_flashcards();
        tracing::debug!(%topic_id, "flashcards reset");
        Ok(())
    }

    /// A shuffled copy of a topic's flashcards for one study pass.
    ///
    /// # Errors
    ///
    /// Returns `LessonError::TopicNotFound` for unknown topics.
    pub fn shuffled_flashcards<R: Rng + ?Sized>(
        &self,
        topic_id: TopicId,
        rng: &mut R,
    ) -> Result<Vec<Flashcard>, LessonError> {
        let mut cards = self
            .get_topic(topic_id)
            .ok_or(LessonError::TopicNotFound(topic_id))?
            .flashcards()
            .to_vec();
        cards.shuffle(rng);
        Ok(cards)
    }

    //
    // ─── QUIZ ──────────────────────────────────────────────────────────────────
    //

    /// Applies one explicit command to a quiz item at the clock's now.
    ///
    /// # Errors
    ///
    /// Returns `LessonError` if the item does not resolve or was already answered.
    pub fn apply_quiz_command(
        &mut self,
        quiz_item_id: QuizItemId,
        topic_id: TopicId,
        command: QuizItemCommand,
    ) -> Result<QuizTransition, LessonError> {
        if let QuizItemCommand::SubmitAnswer(response) = command {
            return self
                .submit_answer(quiz_item_id, topic_id, response)
                .map(QuizTransition::Answered);
        }

        let now = self.clock.now();
        let transition = self
            .quiz_item_mut(quiz_item_id, topic_id)?
            .apply(command, now)
            .map_err(|_| LessonError::AlreadyAnswered(quiz_item_id))?;
        tracing::debug!(%topic_id, %quiz_item_id, ?transition, "quiz item updated");
        Ok(transition)
    }

    /// Submits a response to a quiz item.
    ///
    /// Plays the correct-answer cue exactly once, when the submission resolves correct.
    ///
    /// # Errors
    ///
    /// Returns `LessonError::AlreadyAnswered` for repeat submissions, which leave the
    /// item and score unchanged, or a not-found error.
    pub fn submit_answer(
        &mut self,
        quiz_item_id: QuizItemId,
        topic_id: TopicId,
        response: impl Into<String>,
    ) -> Result<AnswerOutcome, LessonError> {
        let now = self.clock.now();
        let outcome = self
            .quiz_item_mut(quiz_item_id, topic_id)?
            .submit(response, now)
            .map_err(|_| LessonError::AlreadyAnswered(quiz_item_id))?;

        tracing::debug!(%topic_id, %quiz_item_id, ?outcome, "answer submitted");
        if outcome.is_correct() {
            self.sound.play_sound(CORRECT_ANSWER_SOUND);
        }
        Ok(outcome)
    }

    /// Opens a question; starts its bonus clock on first open.
    ///
    /// # Errors
    ///
    /// Returns a not-found error if the item does not resolve.
    pub fn open_question(
        &mut self,
        quiz_item_id: QuizItemId,
        topic_id: TopicId,
    ) -> Result<(), LessonError> {
        self.apply_quiz_command(quiz_item_id, topic_id, QuizItemCommand::SetQuestionOpen(true))
            .map(|_| ())
    }

    /// Closes a question; stops a running bonus clock.
    ///
    /// # Errors
    ///
    /// Returns a not-found error if the item does not resolve.
    pub fn close_question(
        &mut self,
        quiz_item_id: QuizItemId,
        topic_id: TopicId,
    ) -> Result<(), LessonError> {
        self.apply_quiz_command(quiz_item_id, topic_id, QuizItemCommand::SetQuestionOpen(false))
            .map(|_| ())
    }

    /// Returns every quiz item of a topic to `Unopened`. Progress is untouched.
    ///
    /// # Errors
    ///
    /// Returns `LessonError::TopicNotFound` for unknown topics.
    pub fn reset_quiz(&mut self, topic_id: TopicId) -> Result<(), LessonError> {
        self.topic_mut(topic_id)?.reset_quiz();
        tracing::debug!(%topic_id, "quiz reset");
        Ok(())
    }

    /// Evaluates the quiz and, on a pass, records it in progress.
    ///
    /// A failed quiz leaves progress unchanged, so an earlier pass is never lost.
    ///
    /// # Errors
    ///
    /// Returns `LessonError::TopicNotFound` for unknown topics.
    pub async fn finish_quiz(&mut self, topic_id: TopicId) -> Result<QuizResult, LessonError> {
        let topic = self
            .get_topic(topic_id)
            .ok_or(LessonError::TopicNotFound(topic_id))?;
        let passed = topic.is_quiz_passed();
        let score = topic.quiz_score();

        let mut progress = self.get_progress(topic_id).await;
        if passed {
            progress.record_quiz_pass(score);
            self.store_progress(progress).await;
        }

        tracing::info!(%topic_id, passed, score, high_score = ?progress.quiz_high_score, "quiz finished");
        Ok(QuizResult {
            passed,
            score,
            high_score: progress.quiz_high_score,
        })
    }

    //
    // ─── PROGRESS ──────────────────────────────────────────────────────────────
    //

    /// Progress for a topic: cached, persisted, or a fresh default. Never fails.
    pub async fn get_progress(&mut self, topic_id: TopicId) -> Progress {
        if let Some(progress) = self.progress.get(&topic_id) {
            return *progress;
        }

        let progress = match self.gateway.load(topic_id).await {
            Some(progress) => progress,
            None => Progress::new(topic_id),
        };
        self.progress.insert(topic_id, progress);
        progress
    }

    /// Progress for every catalog topic, in catalog order.
    pub async fn all_progress(&mut self) -> Vec<Progress> {
        let ids: Vec<TopicId> = self.plan.topics().iter().map(Topic::id).collect();
        let mut out = Vec::with_capacity(ids.len());
        for id in ids {
            out.push(self.get_progress(id).await);
        }
        out
    }

    /// Sets one progress field and writes it through before returning.
    pub async fn update_progress(&mut self, topic_id: TopicId, update: ProgressUpdate) -> Progress {
        let mut progress = self.get_progress(topic_id).await;
        progress.apply(update);
        self.store_progress(progress).await;
        tracing::info!(%topic_id, ?update, "progress updated");
        progress
    }

    async fn store_progress(&mut self, progress: Progress) {
        self.progress.insert(progress.topic_id, progress);
        self.gateway.save(&progress).await;
    }

    //
    // ─── LOOKUP HELPERS ────────────────────────────────────────────────────────
    //

    fn topic_mut(&mut self, topic_id: TopicId) -> Result<&mut Topic, LessonError> {
        self.plan
            .topic_mut(topic_id)
            .ok_or(LessonError::TopicNotFound(topic_id))
    }

    fn quiz_item_mut(
        &mut self,
        quiz_item_id: QuizItemId,
        topic_id: TopicId,
    ) -> Result<&mut QuizItem, LessonError> {
        self.topic_mut(topic_id)?
            .quiz_item_mut(quiz_item_id)
            .ok_or(LessonError::QuizItemNotFound {
                quiz_item_id,
                topic_id,
            })
    }
}
