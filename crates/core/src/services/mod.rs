//! Business logic services.

#![allow(missing_docs)]

pub mod admin;
pub mod question;
pub mod vote;

pub use admin::{
    AdminListQuery, AdminQuestionList, ChoiceEdit, ChoiceInput, CreateQuestionInput, DateRange,
    PubDateFilter, QuestionAdminService, UpdateQuestionInput,
};
pub use question::{QuestionService, QuestionWithChoices};
pub use vote::{VoteOutcome, VoteService};
