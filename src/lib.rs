//! Gesture-driven quiz: a tracked hand answers multiple-choice questions by
//! hovering, draws answers by pinching, and can end the quiz early by holding
//! the finish control.

mod app;
pub mod config;
pub mod engine;
pub mod error;
pub mod interaction;
pub mod layout;
pub mod quiz;
pub mod responses;
pub mod state;
pub mod tracking;
pub mod utils;

pub use app::App;
pub use config::QuizConfig;
pub use engine::{QuizOutcome, QuizRun};
pub use error::QuizError;
pub use interaction::InteractionEvent;
pub use quiz::{OptionLetter, Question};
