//! Shared application state.

use std::sync::Arc;

use polls_common::AppResult;
use polls_core::{QuestionAdminService, QuestionService, VoteService};
use polls_db::repositories::{ChoiceRepository, QuestionRepository};
use sea_orm::DatabaseConnection;

use crate::templates::Templates;

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub question_service: QuestionService,
    pub vote_service: VoteService,
    pub admin_service: QuestionAdminService,
    pub templates: Templates,
    /// Bearer token for the admin API. `None` disables it.
    pub admin_token: Option<String>,
}

impl AppState {
    /// Wire repositories and services over a database connection.
    pub fn new(db: Arc<DatabaseConnection>) -> AppResult<Self> {
        let question_repo = QuestionRepository::new(Arc::clone(&db));
        let choice_repo = ChoiceRepository::new(db);

        Ok(Self {
            question_service: QuestionService::new(question_repo.clone(), choice_repo.clone()),
            vote_service: VoteService::new(question_repo.clone(), choice_repo.clone()),
            admin_service: QuestionAdminService::new(question_repo, choice_repo),
            templates: Templates::new()?,
            admin_token: None,
        })
    }

    /// Enable the admin API with the given bearer token.
    #[must_use]
    pub fn with_admin_token(mut self, token: Option<String>) -> Self {
        self.admin_token = token.filter(|t| !t.is_empty());
        self
    }

    /// Cap the number of questions on the index page.
    #[must_use]
    pub fn with_index_limit(mut self, limit: Option<u64>) -> Self {
        self.question_service = self.question_service.with_index_limit(limit);
        self
    }
}
