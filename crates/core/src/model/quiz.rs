use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::ids::QuizItemId;
use crate::scoring::{self, DEFAULT_BONUS_TIME_LIMIT_SECS};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum QuizItemError {
    #[error("quiz question cannot be empty")]
    EmptyQuestion,

    #[error("quiz correct answer cannot be empty")]
    EmptyCorrectAnswer,

    #[error("bonus time limit must be finite and >= 0, got {provided}")]
    InvalidBonusTimeLimit { provided: f64 },
}

/// Rejection of a repeat submission; the item is left untouched.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("quiz item has already been answered")]
pub struct AlreadyAnswered;

//
// ─── STATE ─────────────────────────────────────────────────────────────────────
//

/// How a learner responds to a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionKind {
    /// Pick one of the listed answers.
    MultipleChoice,
    /// Type a free-form response; no options are listed.
    FreeText,
}

/// Answer lifecycle of a quiz item.
///
/// `Unopened -> Open -> Answered`, with `reset` returning to `Unopened` from anywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizPhase {
    Unopened,
    Open,
    Answered { correct: bool },
}

/// Explicit mutations a caller may apply to a quiz item's runtime state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuizItemCommand {
    SetQuestionOpen(bool),
    SubmitAnswer(String),
    Reset,
}

/// Result of submitting a response to an unanswered item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerOutcome {
    Correct { score: u32 },
    Incorrect,
}

impl AnswerOutcome {
    #[must_use]
    pub fn is_correct(self) -> bool {
        matches!(self, AnswerOutcome::Correct { .. })
    }
}

/// What a `QuizItemCommand` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizTransition {
    Opened { timer_started: bool },
    Closed { timer_stopped: bool },
    Answered(AnswerOutcome),
    Reset,
}

/// Point-in-time view of an item's bonus clock, for a periodic display tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BonusTiming {
    pub time_taken: f64,
    pub bonus_time_remaining: f64,
    pub bonus_remaining_percent: f64,
    pub is_consuming_bonus_time: bool,
    pub score: u32,
}

//
// ─── QUIZ ITEM ─────────────────────────────────────────────────────────────────
//

/// One quiz question plus its answer and bonus-timer state.
#[derive(Debug, Clone, PartialEq)]
pub struct QuizItem {
    id: QuizItemId,
    question: String,
    answers: Vec<String>,
    correct_answer: String,
    bonus_time_limit: f64,

    answer: Option<String>,
    is_correct: Option<bool>,
    is_question_open: bool,
    question_opened: Option<DateTime<Utc>>,
    question_finished: Option<DateTime<Utc>>,
}

impl QuizItem {
    /// Creates an unopened item with the default bonus time limit.
    ///
    /// An empty `answers` list makes this a free-text question.
    ///
    /// # Errors
    ///
    /// Returns `QuizItemError` if the question or correct answer is blank.
    pub fn new(
        id: QuizItemId,
        question: impl Into<String>,
        answers: Vec<String>,
        correct_answer: impl Into<String>,
    ) -> Result<Self, QuizItemError> {
        let question = question.into();
        let correct_answer = correct_answer.into();
        if question.trim().is_empty() {
            return Err(QuizItemError::EmptyQuestion);
        }
        if correct_answer.trim().is_empty() {
            return Err(QuizItemError::EmptyCorrectAnswer);
        }

        Ok(Self {
            id,
            question,
            answers,
            correct_answer,
            bonus_time_limit: DEFAULT_BONUS_TIME_LIMIT_SECS,
            answer: None,
            is_correct: None,
            is_question_open: false,
            question_opened: None,
            question_finished: None,
        })
    }

    /// Overrides the bonus time limit (seconds).
    ///
    /// # Errors
    ///
    /// Returns `QuizItemError::InvalidBonusTimeLimit` for negative or non-finite values.
    pub fn with_bonus_time_limit(mut self, secs: f64) -> Result<Self, QuizItemError> {
        if !secs.is_finite() || secs < 0.0 {
            return Err(QuizItemError::InvalidBonusTimeLimit { provided: secs });
        }
        self.bonus_time_limit = secs;
        Ok(self)
    }

    #[must_use]
    pub fn id(&self) -> QuizItemId {
        self.id
    }

    #[must_use]
    pub fn question(&self) -> &str {
        &self.question
    }

    #[must_use]
    pub fn answers(&self) -> &[String] {
        &self.answers
    }

    #[must_use]
    pub fn correct_answer(&self) -> &str {
        &self.correct_answer
    }

    #[must_use]
    pub fn bonus_time_limit(&self) -> f64 {
        self.bonus_time_limit
    }

    #[must_use]
    pub fn answer(&self) -> Option<&str> {
        self.answer.as_deref()
    }

    #[must_use]
    pub fn is_correct(&self) -> Option<bool> {
        self.is_correct
    }

    #[must_use]
    pub fn is_question_open(&self) -> bool {
        self.is_question_open
    }

    #[must_use]
    pub fn question_opened(&self) -> Option<DateTime<Utc>> {
        self.question_opened
    }

    #[must_use]
    pub fn question_finished(&self) -> Option<DateTime<Utc>> {
        self.question_finished
    }

    #[must_use]
    pub fn kind(&self) -> QuestionKind {
        if self.answers.is_empty() {
            QuestionKind::FreeText
        } else {
            QuestionKind::MultipleChoice
        }
    }

    #[must_use]
    pub fn is_answered(&self) -> bool {
        self.is_correct.is_some()
    }

    #[must_use]
    pub fn phase(&self) -> QuizPhase {
        match (self.is_correct, self.question_opened) {
            (Some(correct), _) => QuizPhase::Answered { correct },
            (None, Some(_)) => QuizPhase::Open,
            (None, None) => QuizPhase::Unopened,
        }
    }

    //
    // ─── TRANSITIONS ───────────────────────────────────────────────────────────
    //

    /// Marks the question open, starting the bonus clock the first time only.
    ///
    /// Returns `true` if this call started the clock.
    pub fn open(&mut self, now: DateTime<Utc>) -> bool {
        self.is_question_open = true;
        let can_start = self.is_correct.is_none()
            && self.question_finished.is_none()
            && self.question_opened.is_none();
        if can_start {
            self.question_opened = Some(now);
        }
        can_start
    }

    /// Marks the question closed and stops a running clock.
    ///
    /// Returns `true` if this call stopped the clock.
    pub fn close(&mut self, now: DateTime<Utc>) -> bool {
        self.is_question_open = false;
        self.stop_clock(now)
    }

    fn stop_clock(&mut self, now: DateTime<Utc>) -> bool {
        if self.question_opened.is_some() && self.question_finished.is_none() {
            self.question_finished = Some(now);
            true
        } else {
            false
        }
    }

    /// Records a response and locks in correctness.
    ///
    /// Matching is case-insensitive. The bonus clock stops at `now` if still running.
    ///
    /// # Errors
    ///
    /// Returns `AlreadyAnswered` if correctness is already set.
    pub fn submit(
        &mut self,
        response: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Result<AnswerOutcome, AlreadyAnswered> {
        if self.is_answered() {
            return Err(AlreadyAnswered);
        }

        let response = response.into();
        let correct = response.to_lowercase() == self.correct_answer.to_lowercase();
        self.answer = Some(response);
        self.is_correct = Some(correct);
        self.stop_clock(now);

        if correct {
            Ok(AnswerOutcome::Correct {
                score: self.score(),
            })
        } else {
            Ok(AnswerOutcome::Incorrect)
        }
    }

    /// Returns the item to `Unopened`.
    pub fn reset(&mut self) {
        self.answer = None;
        self.is_correct = None;
        self.is_question_open = false;
        self.question_opened = None;
        self.question_finished = None;
    }

    /// Dispatches an explicit command.
    ///
    /// # Errors
    ///
    /// Propagates `AlreadyAnswered` from `submit`.
    pub fn apply(
        &mut self,
        command: QuizItemCommand,
        now: DateTime<Utc>,
    ) -> Result<QuizTransition, AlreadyAnswered> {
        match command {
            QuizItemCommand::SetQuestionOpen(true) => Ok(QuizTransition::Opened {
                timer_started: self.open(now),
            }),
            QuizItemCommand::SetQuestionOpen(false) => Ok(QuizTransition::Closed {
                timer_stopped: self.close(now),
            }),
            QuizItemCommand::SubmitAnswer(response) => {
                self.submit(response, now).map(QuizTransition::Answered)
            }
            QuizItemCommand::Reset => {
                self.reset();
                Ok(QuizTransition::Reset)
            }
        }
    }

    //
    // ─── DERIVED TIMING ────────────────────────────────────────────────────────
    //

    #[must_use]
    pub fn time_taken(&self, now: DateTime<Utc>) -> f64 {
        scoring::time_taken(self.question_opened, self.question_finished, now)
    }

    #[must_use]
    pub fn bonus_time_remaining(&self, now: DateTime<Utc>) -> f64 {
        scoring::bonus_time_remaining(self.bonus_time_limit, self.time_taken(now))
    }

    #[must_use]
    pub fn bonus_remaining_percent(&self, now: DateTime<Utc>) -> f64 {
        scoring::bonus_remaining_percent(self.bonus_time_limit, self.bonus_time_remaining(now))
    }

    /// Whether a live countdown should be running for this item.
    #[must_use]
    pub fn is_consuming_bonus_time(&self, now: DateTime<Utc>) -> bool {
        self.is_question_open
            && self.bonus_time_remaining(now) > 0.0
            && self.question_finished.is_none()
            && self.is_correct != Some(true)
    }

    /// Points earned by this item.
    ///
    /// Uses the span frozen when the clock stopped, so it does not depend on "now".
    #[must_use]
    pub fn score(&self) -> u32 {
        let frozen = match (self.question_opened, self.question_finished) {
            (Some(opened), Some(finished)) => {
                scoring::time_taken(Some(opened), Some(finished), finished)
            }
            _ => 0.0,
        };
        scoring::score(self.is_correct, self.bonus_time_limit, frozen)
    }

    #[must_use]
    pub fn timing(&self, now: DateTime<Utc>) -> BonusTiming {
        let time_taken = self.time_taken(now);
        let bonus_time_remaining = scoring::bonus_time_remaining(self.bonus_time_limit, time_taken);
        BonusTiming {
            time_taken,
            bonus_time_remaining,
            bonus_remaining_percent: scoring::bonus_remaining_percent(
                self.bonus_time_limit,
                bonus_time_remaining,
            ),
            is_consuming_bonus_time: self.is_consuming_bonus_time(now),
            score: self.score(),
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
