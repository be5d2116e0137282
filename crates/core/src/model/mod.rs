mod flashcard;
mod ids;
mod progress;
mod quiz;
mod topic;

pub use ids::{FlashcardId, ParseIdError, QuizItemId, TopicId};

pub use flashcard::{Flashcard, FlashcardError};
pub use progress::{Progress, ProgressUpdate};
pub use quiz::{
    AlreadyAnswered, AnswerOutcome, BonusTiming, QuestionKind, QuizItem, QuizItemCommand, QuizItemError,
    QuizPhase, QuizTransition,
};
pub use topic::{Topic, TopicError};
