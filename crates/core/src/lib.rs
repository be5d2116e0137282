#![forbid(unsafe_code)]

pub mod catalog;
pub mod model;
pub mod scoring;
pub mod time;

pub use catalog::{LessonPlan, LessonPlanError};
pub use time::Clock;
