//! Vote service.

use chrono::Utc;
use polls_common::{AppError, AppResult};
use polls_db::{
    entities::{choice, question},
    repositories::{ChoiceRepository, QuestionRepository},
};
use tracing::info;

/// Result of a vote attempt on a published question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoteOutcome {
    /// The vote was counted.
    Recorded { question_id: String },
    /// No valid choice of this question was selected.
    ChoiceMissing {
        question: question::Model,
        choices: Vec<choice::Model>,
    },
}

/// Service for casting votes.
#[derive(Clone)]
pub struct VoteService {
    question_repo: QuestionRepository,
    choice_repo: ChoiceRepository,
}

impl VoteService {
    /// Create a new vote service.
    #[must_use]
    pub const fn new(question_repo: QuestionRepository, choice_repo: ChoiceRepository) -> Self {
        Self {
            question_repo,
            choice_repo,
        }
    }

    /// Cast a vote for `choice_id` on a published question.
    pub async fn vote(&self, question_id: &str, choice_id: Option<&str>) -> AppResult<VoteOutcome> {
        let question = self
            .question_repo
            .find_published_by_id(question_id, Utc::now())
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Question not found: {question_id}")))?;

        if let Some(choice_id) = choice_id.filter(|id| !id.is_empty())
            && self
                .choice_repo
                .increment_votes(&question.id, choice_id)
                .await?
        {
            info!(question_id = %question.id, choice_id = %choice_id, "Vote recorded");
            return Ok(VoteOutcome::Recorded {
                question_id: question.id,
            });
        }

        let choices = self.choice_repo.find_by_question(&question.id).await?;
        Ok(VoteOutcome::ChoiceMissing { question, choices })
    }
}
