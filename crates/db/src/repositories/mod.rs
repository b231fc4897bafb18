//! Database repositories.

pub mod choice;
pub mod question;

pub use choice::ChoiceRepository;
pub use question::{ChoiceChanges, QuestionRepository, QuestionSearch};
