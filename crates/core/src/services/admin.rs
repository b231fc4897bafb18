//! Question administration: listing, search, date filters and inline choice editing.

use std::collections::HashSet;

use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, NaiveTime, Utc};
use polls_common::{AppError, AppResult, IdGenerator};
use polls_db::{
    entities::{choice, question},
    repositories::{ChoiceChanges, ChoiceRepository, QuestionRepository, QuestionSearch},
};
use sea_orm::Set;
use serde::Deserialize;
use tracing::info;
use validator::Validate;

use super::question::QuestionWithChoices;

/// Default page size for the admin question list.
pub const DEFAULT_PAGE_SIZE: u64 = 100;

/// Maximum page size for the admin question list.
pub const MAX_PAGE_SIZE: u64 = 500;

/// Publication date filter for the admin question list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PubDateFilter {
    #[default]
    Any,
    Today,
    #[serde(rename = "past_7_days")]
    PastSevenDays,
    ThisMonth,
    ThisYear,
}

/// Half-open UTC range `[from, until)`. Missing bounds are unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub from: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
}

fn midnight(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

impl PubDateFilter {
    /// The `pub_date` range this filter selects at `now`.
    #[must_use]
    pub fn range(self, now: DateTime<Utc>) -> DateRange {
        let today = now.date_naive();
        let tomorrow = today + Duration::days(1);

        let (from, until) = match self {
            Self::Any => return DateRange::default(),
            Self::Today => (Some(today), Some(tomorrow)),
            Self::PastSevenDays => (Some(today - Duration::days(7)), Some(tomorrow)),
            Self::ThisMonth => {
                let first = today.with_day(1);
                (first, first.and_then(|d| d.checked_add_months(Months::new(1))))
            }
            Self::ThisYear => (
                NaiveDate::from_ymd_opt(today.year(), 1, 1),
                NaiveDate::from_ymd_opt(today.year() + 1, 1, 1),
            ),
        };

        DateRange {
            from: from.map(midnight),
            until: until.map(midnight),
        }
    }
}

/// Query for the admin question list.
#[derive(Debug, Clone, Default)]
pub struct AdminListQuery {
    /// Free-form search over question text.
    pub search: Option<String>,
    pub pub_date: PubDateFilter,
    pub limit: Option<u64>,
    pub offset: u64,
}

/// A page of the admin question list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminQuestionList {
    pub questions: Vec<question::Model>,
    pub total: u64,
}

/// Inline choice for a new question.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ChoiceInput {
    #[validate(length(min = 1, max = 200))]
    pub text: String,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub votes: i32,
}

/// Input for creating a question.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateQuestionInput {
    #[validate(length(min = 1, max = 200))]
    pub text: String,
    pub pub_date: DateTime<Utc>,
    #[serde(default)]
    #[validate(nested)]
    pub choices: Vec<ChoiceInput>,
}

/// Inline edit of a choice. Edits without `id` add a new choice.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ChoiceEdit {
    pub id: Option<String>,
    #[validate(length(min = 1, max = 200))]
    pub text: Option<String>,
    #[validate(range(min = 0))]
    pub votes: Option<i32>,
    #[serde(default)]
    pub delete: bool,
}

/// Input for updating a question.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateQuestionInput {
    #[validate(length(min = 1, max = 200))]
    pub text: Option<String>,
    pub pub_date: Option<DateTime<Utc>>,
    #[serde(default)]
    #[validate(nested)]
    pub choices: Vec<ChoiceEdit>,
}

/// Service backing the admin API.
#[derive(Clone)]
pub struct QuestionAdminService {
    question_repo: QuestionRepository,
    choice_repo: ChoiceRepository,
    id_gen: IdGenerator,
}

impl QuestionAdminService {
    /// Create a new question admin service.
    #[must_use]
    pub const fn new(question_repo: QuestionRepository, choice_repo: ChoiceRepository) -> Self {
        Self {
            question_repo,
            choice_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// List questions matching the search and date filter, most recent first.
    pub async fn list(&self, query: AdminListQuery) -> AppResult<AdminQuestionList> {
        let range = query.pub_date.range(Utc::now());
        let search = QuestionSearch {
            pub_date_from: range.from,
            pub_date_until: range.until,
            ..QuestionSearch::default()
        }
        .with_query(query.search.as_deref().unwrap_or_default());

        let limit = query.limit.unwrap_or(DEFAULT_PAGE_SIZE).min(MAX_PAGE_SIZE);
        let questions = self
            .question_repo
            .search(&search, limit, query.offset)
            .await?;
        let total = self.question_repo.count(&search).await?;

        Ok(AdminQuestionList { questions, total })
    }

    /// Get any question with its choices, published or not.
    pub async fn get(&self, id: &str) -> AppResult<QuestionWithChoices> {
        let question = self.find(id).await?;
        let choices = self.choice_repo.find_by_question(id).await?;
        Ok(QuestionWithChoices { question, choices })
    }

    /// Create a question with its inline choices.
    pub async fn create(&self, input: CreateQuestionInput) -> AppResult<QuestionWithChoices> {
        input.validate()?;

        let question_id = self.id_gen.generate();
        let model = question::ActiveModel {
            id: Set(question_id.clone()),
            text: Set(input.text),
            pub_date: Set(input.pub_date),
        };
        let choices = input
            .choices
            .into_iter()
            .map(|c| self.new_choice(&question_id, c.text, c.votes))
            .collect();

        let (question, choices) = self
            .question_repo
            .create_with_choices(model, choices)
            .await?;

        info!(question_id = %question.id, choices = choices.len(), "Question created");
        Ok(QuestionWithChoices { question, choices })
    }

    /// Update a question and apply inline choice edits.
    pub async fn update(
        &self,
        id: &str,
        input: UpdateQuestionInput,
    ) -> AppResult<QuestionWithChoices> {
        input.validate()?;

        let existing = self.find(id).await?;
        let current = self.choice_repo.find_by_question(id).await?;

        let mut changes = ChoiceChanges::default();
        let mut seen = HashSet::new();
        for edit in input.choices {
            match edit.id {
                Some(choice_id) => {
                    if !seen.insert(choice_id.clone()) {
                        return Err(AppError::BadRequest(format!(
                            "Choice {choice_id} is edited more than once"
                        )));
                    }
                    let choice = current.iter().find(|c| c.id == choice_id).ok_or_else(|| {
                        AppError::BadRequest(format!(
                            "Choice {choice_id} does not belong to question {id}"
                        ))
                    })?;
                    if edit.delete {
                        changes.delete.push(choice_id);
                        continue;
                    }
                    let mut active: choice::ActiveModel = choice.clone().into();
                    if let Some(text) = edit.text {
                        active.text = Set(text);
                    }
                    if let Some(votes) = edit.votes {
                        active.votes = Set(votes);
                    }
                    changes.update.push(active);
                }
                None if edit.delete => {}
                None => {
                    let text = edit.text.ok_or_else(|| {
                        AppError::BadRequest("New choices need a text".to_string())
                    })?;
                    changes
                        .insert
                        .push(self.new_choice(id, text, edit.votes.unwrap_or_default()));
                }
            }
        }

        let model = if input.text.is_some() || input.pub_date.is_some() {
            let mut active: question::ActiveModel = existing.into();
            if let Some(text) = input.text {
                active.text = Set(text);
            }
            if let Some(pub_date) = input.pub_date {
                active.pub_date = Set(pub_date);
            }
            Some(active)
        } else {
            None
        };

        let question = self
            .question_repo
            .update_with_choices(id, model, changes)
            .await?;
        let choices = self.choice_repo.find_by_question(id).await?;

        info!(question_id = %question.id, "Question updated");
        Ok(QuestionWithChoices { question, choices })
    }

    /// Delete a question and its choices.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        if !self.question_repo.delete_with_choices(id).await? {
            return Err(AppError::NotFound(format!("Question not found: {id}")));
        }
        info!(question_id = %id, "Question deleted");
        Ok(())
    }

    async fn find(&self, id: &str) -> AppResult<question::Model> {
        self.question_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Question not found: {id}")))
    }

    fn new_choice(&self, question_id: &str, text: String, votes: i32) -> choice::ActiveModel {
        choice::ActiveModel {
            id: Set(self.id_gen.generate()),
            question_id: Set(question_id.to_string()),
            text: Set(text),
            votes: Set(votes),
        }
    }
}
