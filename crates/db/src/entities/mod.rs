//! Database entities.

#![allow(missing_docs)]

pub mod choice;
pub mod question;

pub use choice::Entity as Choice;
pub use question::Entity as Question;
