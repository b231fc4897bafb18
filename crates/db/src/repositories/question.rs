//! Question repository.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use polls_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select, TransactionTrait,
    sea_query::{Expr, Func, LikeExpr},
};

use crate::entities::{Choice, Question, choice, question};

/// Criteria for the admin question list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuestionSearch {
    /// Words that must each appear in the question text (case-insensitive).
    pub words: Vec<String>,
    /// Inclusive lower bound on `pub_date`.
    pub pub_date_from: Option<DateTime<Utc>>,
    /// Exclusive upper bound on `pub_date`.
    pub pub_date_until: Option<DateTime<Utc>>,
}

impl QuestionSearch {
    /// Build search words from a free-form query string.
    #[must_use]
    pub fn with_query(mut self, query: &str) -> Self {
        self.words = query.split_whitespace().map(str::to_lowercase).collect();
        self
    }

    fn apply(&self, mut select: Select<Question>) -> Select<Question> {
        for word in &self.words {
            let pattern = format!("%{}%", escape_like(word));
            select = select.filter(
                Expr::expr(Func::lower(Expr::col(question::Column::Text)))
                    .like(LikeExpr::new(pattern).escape('\\')),
            );
        }
        if let Some(from) = self.pub_date_from {
            select = select.filter(question::Column::PubDate.gte(from));
        }
        if let Some(until) = self.pub_date_until {
            select = select.filter(question::Column::PubDate.lt(until));
        }
        select
    }
}

fn escape_like(word: &str) -> String {
    word.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Inline choice edits applied together with a question update.
#[derive(Debug, Clone, Default)]
pub struct ChoiceChanges {
    /// New choices to insert.
    pub insert: Vec<choice::ActiveModel>,
    /// Existing choices to update.
    pub update: Vec<choice::ActiveModel>,
    /// IDs of choices to delete.
    pub delete: Vec<String>,
}

/// Question repository for database operations.
#[derive(Clone)]
pub struct QuestionRepository {
    db: Arc<DatabaseConnection>,
}

impl QuestionRepository {
    /// Create a new question repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a question by ID regardless of its publication date.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<question::Model>> {
        Question::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a question by ID if it is published at `now`.
    pub async fn find_published_by_id(
        &self,
        id: &str,
        now: DateTime<Utc>,
    ) -> AppResult<Option<question::Model>> {
        Question::find_by_id(id)
            .filter(question::Column::PubDate.lte(now))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Questions published at `now`, most recent first.
    pub async fn find_published(
        &self,
        now: DateTime<Utc>,
        limit: Option<u64>,
    ) -> AppResult<Vec<question::Model>> {
        Question::find()
            .filter(question::Column::PubDate.lte(now))
            .order_by_desc(question::Column::PubDate)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Search questions for the admin list, most recent first.
    pub async fn search(
        &self,
        search: &QuestionSearch,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<question::Model>> {
        search
            .apply(Question::find())
            .order_by_desc(question::Column::PubDate)
            .order_by_desc(question::Column::Id)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count questions matching the admin search.
    pub async fn count(&self, search: &QuestionSearch) -> AppResult<u64> {
        search
            .apply(Question::find())
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a question together with its inline choices.
    pub async fn create_with_choices(
        &self,
        model: question::ActiveModel,
        choices: Vec<choice::ActiveModel>,
    ) -> AppResult<(question::Model, Vec<choice::Model>)> {
        let txn = self.begin().await?;

        let question = model
            .insert(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let mut created = Vec::with_capacity(choices.len());
        for choice in choices {
            created.push(
                choice
                    .insert(&txn)
                    .await
                    .map_err(|e| AppError::Database(e.to_string()))?,
            );
        }

        Self::commit(txn).await?;
        Ok((question, created))
    }

    /// Update a question and apply inline choice edits in one transaction.
    ///
    /// When `model` is `None` only the choices change.
    pub async fn update_with_choices(
        &self,
        id: &str,
        model: Option<question::ActiveModel>,
        changes: ChoiceChanges,
    ) -> AppResult<question::Model> {
        let txn = self.begin().await?;

        let question = match model {
            Some(model) => model
                .update(&txn)
                .await
                .map_err(|e| AppError::Database(e.to_string()))?,
            None => Question::find_by_id(id)
                .one(&txn)
                .await
                .map_err(|e| AppError::Database(e.to_string()))?
                .ok_or_else(|| AppError::NotFound(format!("Question not found: {id}")))?,
        };

        if !changes.delete.is_empty() {
            Choice::delete_many()
                .filter(choice::Column::QuestionId.eq(id))
                .filter(choice::Column::Id.is_in(changes.delete))
                .exec(&txn)
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
        }
        for choice in changes.update {
            choice
                .update(&txn)
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
        }
        for choice in changes.insert {
            choice
                .insert(&txn)
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
        }

        Self::commit(txn).await?;
        Ok(question)
    }

    /// Delete a question and all of its choices.
    ///
    /// Returns `false` when no question with this ID existed.
    pub async fn delete_with_choices(&self, id: &str) -> AppResult<bool> {
        let txn = self.begin().await?;

        Choice::delete_many()
            .filter(choice::Column::QuestionId.eq(id))
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let result = Question::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Self::commit(txn).await?;
        Ok(result.rows_affected > 0)
    }

    async fn begin(&self) -> AppResult<DatabaseTransaction> {
        self.db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn commit(txn: DatabaseTransaction) -> AppResult<()> {
        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Set};

    fn create_test_question(id: &str, text: &str, pub_date: DateTime<Utc>) -> question::Model {
        question::Model {
            id: id.to_string(),
            text: text.to_string(),
            pub_date,
        }
    }

    #[tokio::test]
    async fn test_find_by_id_returns_question() {
        let question = create_test_question("q1", "What's new?", Utc::now());

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[question.clone()]])
                .into_connection(),
        );

        let repo = QuestionRepository::new(db);
        let result = repo.find_by_id("q1").await.unwrap();

        assert_eq!(result, Some(question));
    }

    #[tokio::test]
    async fn test_find_published_by_id_filters_on_pub_date() {
        let now = Utc::now();
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<question::Model>::new()])
                .into_connection(),
        );

        let repo = QuestionRepository::new(Arc::clone(&db));
        let result = repo.find_published_by_id("q1", now).await.unwrap();
        assert!(result.is_none());

        drop(repo);
        let log = Arc::try_unwrap(db).unwrap().into_transaction_log();
        let sql = format!("{log:?}");
        assert!(sql.contains("pub_date"));
        assert!(sql.contains("<="));
    }

    #[tokio::test]
    async fn test_find_published_orders_newest_first() {
        let now = Utc::now();
        let recent = create_test_question("q2", "Past Question 2", now - Duration::days(5));
        let old = create_test_question("q1", "Past Question 1", now - Duration::days(30));

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[recent.clone(), old.clone()]])
                .into_connection(),
        );

        let repo = QuestionRepository::new(Arc::clone(&db));
        let results = repo.find_published(now, None).await.unwrap();
        assert_eq!(results, vec![recent, old]);

        drop(repo);
        let log = Arc::try_unwrap(db).unwrap().into_transaction_log();
        let sql = format!("{log:?}");
        assert!(sql.contains("ORDER BY"));
        assert!(sql.contains("DESC"));
        assert!(!sql.contains("LIMIT"));
    }

    #[tokio::test]
    async fn test_search_applies_words_and_date_range() {
        let now = Utc::now();
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<question::Model>::new()])
                .into_connection(),
        );

        let search = QuestionSearch {
            pub_date_from: Some(now - Duration::days(7)),
            pub_date_until: Some(now),
            ..QuestionSearch::default()
        }
        .with_query("  What's  NEW_ ");
        assert_eq!(search.words, vec!["what's".to_string(), "new_".to_string()]);

        let repo = QuestionRepository::new(Arc::clone(&db));
        repo.search(&search, 20, 0).await.unwrap();

        drop(repo);
        let log = Arc::try_unwrap(db).unwrap().into_transaction_log();
        let sql = format!("{log:?}");
        assert!(sql.contains("LOWER"));
        assert!(sql.contains("LIKE"));
        assert!(sql.contains("ESCAPE"));
        assert!(sql.contains(">="));
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("100%_sure\\"), "100\\%\\_sure\\\\");
    }

    #[tokio::test]
    async fn test_count_returns_correct_count() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[maplit::btreemap! {
                    "num_items" => sea_orm::Value::BigInt(Some(3))
                }]])
                .into_connection(),
        );

        let repo = QuestionRepository::new(db);
        let count = repo.count(&QuestionSearch::default()).await.unwrap();

        assert_eq!(count, 3);
    }

    #[tokio::test]
    async fn test_create_with_choices() {
        let now = Utc::now();
        let question = create_test_question("q1", "Favorite color?", now);
        let red = choice::Model {
            id: "c1".to_string(),
            question_id: "q1".to_string(),
            text: "Red".to_string(),
            votes: 0,
        };

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[question.clone()]])
                .append_query_results([[red.clone()]])
                .into_connection(),
        );

        let repo = QuestionRepository::new(db);
        let (created, choices) = repo
            .create_with_choices(
                question::ActiveModel {
                    id: Set("q1".to_string()),
                    text: Set("Favorite color?".to_string()),
                    pub_date: Set(now),
                },
                vec![choice::ActiveModel {
                    id: Set("c1".to_string()),
                    question_id: Set("q1".to_string()),
                    text: Set("Red".to_string()),
                    votes: Set(0),
                }],
            )
            .await
            .unwrap();

        assert_eq!(created, question);
        assert_eq!(choices, vec![red]);
    }

    #[tokio::test]
    async fn test_delete_with_choices_reports_existing_question() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([
                    MockExecResult {
                        last_insert_id: 0,
                        rows_affected: 2,
                    },
                    MockExecResult {
                        last_insert_id: 0,
                        rows_affected: 1,
                    },
                ])
                .into_connection(),
        );

        let repo = QuestionRepository::new(db);
        assert!(repo.delete_with_choices("q1").await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_with_choices_missing_question() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([
                    MockExecResult {
                        last_insert_id: 0,
                        rows_affected: 0,
                    },
                    MockExecResult {
                        last_insert_id: 0,
                        rows_affected: 0,
                    },
                ])
                .into_connection(),
        );

        let repo = QuestionRepository::new(db);
        assert!(!repo.delete_with_choices("missing").await.unwrap());
    }
}
