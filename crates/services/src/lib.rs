#![forbid(unsafe_code)]

pub mod audio;
pub mod error;
pub mod lesson_plan_service;

pub use lesson_core::Clock;

pub use audio::{CORRECT_ANSWER_SOUND, SilentSoundPlayer, SoundPlayer};
pub use error::LessonError;
pub use lesson_plan_service::{LessonPlanService, QuizResult};
