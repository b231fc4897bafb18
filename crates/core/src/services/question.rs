//! Question service for the public poll pages.

use chrono::{DateTime, Utc};
use polls_common::{AppError, AppResult};
use polls_db::{
    entities::{choice, question},
    repositories::{ChoiceRepository, QuestionRepository},
};
use serde::Serialize;

/// A question together with its choices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestionWithChoices {
    pub question: question::Model,
    pub choices: Vec<choice::Model>,
}

/// Service for looking up published questions.
#[derive(Clone)]
pub struct QuestionService {
    question_repo: QuestionRepository,
    choice_repo: ChoiceRepository,
    index_limit: Option<u64>,
}

impl QuestionService {
    /// Create a new question service.
    #[must_use]
    pub const fn new(question_repo: QuestionRepository, choice_repo: ChoiceRepository) -> Self {
        Self {
            question_repo,
            choice_repo,
            index_limit: None,
        }
    }

    /// Cap the number of questions returned by [`Self::latest_published`].
    #[must_use]
    pub const fn with_index_limit(mut self, limit: Option<u64>) -> Self {
        self.index_limit = limit;
        self
    }

    /// Published questions, most recent first.
    pub async fn latest_published(&self) -> AppResult<Vec<question::Model>> {
        self.latest_published_at(Utc::now()).await
    }

    /// Questions published at `now`, most recent first.
    pub async fn latest_published_at(&self, now: DateTime<Utc>) -> AppResult<Vec<question::Model>> {
        self.question_repo
            .find_published(now, self.index_limit)
            .await
    }

    /// Get a published question.
    ///
    /// Missing and not-yet-published questions both yield `NotFound`.
    pub async fn get_published(&self, id: &str) -> AppResult<question::Model> {
        self.question_repo
            .find_published_by_id(id, Utc::now())
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Question not found: {id}")))
    }

    /// Get a published question with its choices.
    pub async fn get_published_with_choices(&self, id: &str) -> AppResult<QuestionWithChoices> {
        let question = self.get_published(id).await?;
        let choices = self.choice_repo.find_by_question(&question.id).await?;
        Ok(QuestionWithChoices { question, choices })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use polls_db::test_utils::TestDatabase;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn service_for(db: &TestDatabase) -> QuestionService {
        QuestionService::new(
            QuestionRepository::new(db.connection()),
            ChoiceRepository::new(db.connection()),
        )
    }

    fn texts(questions: &[question::Model]) -> Vec<&str> {
        questions.iter().map(|q| q.text.as_str()).collect()
    }

    #[tokio::test]
    async fn test_no_questions() {
        let db = TestDatabase::new().await.unwrap();
        let service = service_for(&db);

        assert!(service.latest_published().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_future_question_is_not_listed() {
        let db = TestDatabase::new().await.unwrap();
        db.create_question("Future Question", Duration::days(30))
            .await
            .unwrap();
        let service = service_for(&db);

        assert!(service.latest_published().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_past_and_future_question() {
        let db = TestDatabase::new().await.unwrap();
        db.create_question("Past Question", -Duration::days(30))
            .await
            .unwrap();
        db.create_question("Future Question", Duration::days(30))
            .await
            .unwrap();
        let service = service_for(&db);

        let listed = service.latest_published().await.unwrap();
        assert_eq!(texts(&listed), vec!["Past Question"]);
    }

    #[tokio::test]
    async fn test_two_past_questions_newest_first() {
        let db = TestDatabase::new().await.unwrap();
        db.create_question("Past Question 1", -Duration::days(30))
            .await
            .unwrap();
        db.create_question("Past Question 2", -Duration::days(5))
            .await
            .unwrap();
        let service = service_for(&db);

        let listed = service.latest_published().await.unwrap();
        assert_eq!(texts(&listed), vec!["Past Question 2", "Past Question 1"]);
    }

    #[tokio::test]
    async fn test_index_limit_keeps_most_recent() {
        let db = TestDatabase::new().await.unwrap();
        for days in 1..=4 {
            db.create_question(&format!("Q{days}"), -Duration::days(days))
                .await
                .unwrap();
        }
        let service = service_for(&db).with_index_limit(Some(2));

        let listed = service.latest_published().await.unwrap();
        assert_eq!(texts(&listed), vec!["Q1", "Q2"]);
    }

    #[tokio::test]
    async fn test_get_published_future_question_not_found() {
        let db = TestDatabase::new().await.unwrap();
        let future = db.create_question("Future", Duration::days(30)).await.unwrap();
        let service = service_for(&db);

        let result = service.get_published(&future.id).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_get_published_with_choices() {
        let db = TestDatabase::new().await.unwrap();
        let past = db
            .create_question("Past Question", -Duration::days(30))
            .await
            .unwrap();
        let yes = db.create_choice(&past.id, "Yes", 1).await.unwrap();
        let no = db.create_choice(&past.id, "No", 0).await.unwrap();
        let service = service_for(&db);

        let found = service.get_published_with_choices(&past.id).await.unwrap();
        assert_eq!(found.question, past);
        assert_eq!(found.choices.len(), 2);
        assert!(found.choices.contains(&yes));
        assert!(found.choices.contains(&no));
    }

    #[tokio::test]
    async fn test_get_published_missing_id_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<question::Model>::new()])
                .into_connection(),
        );
        let service = QuestionService::new(
            QuestionRepository::new(Arc::clone(&db)),
            ChoiceRepository::new(db),
        );

        let result = service.get_published("nonexistent").await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
