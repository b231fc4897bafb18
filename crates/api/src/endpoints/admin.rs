//! Admin endpoints for managing questions and their choices.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::get,
};
use chrono::Utc;
use polls_common::AppResult;
use polls_core::{
    AdminListQuery, CreateQuestionInput, PubDateFilter, QuestionWithChoices, UpdateQuestionInput,
};
use polls_db::entities::{choice, question};
use serde::{Deserialize, Serialize};

use crate::{
    extractors::AdminUser,
    response::{self, ApiResponse},
    state::AppState,
};

/// Question response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionResponse {
    pub id: String,
    pub text: String,
    pub pub_date: String,
    /// Visible on the public pages.
    pub is_published: bool,
    pub was_published_recently: bool,
}

impl From<question::Model> for QuestionResponse {
    fn from(question: question::Model) -> Self {
        let now = Utc::now();
        Self {
            is_published: question.is_published_at(now),
            was_published_recently: question.was_published_recently_at(now),
            pub_date: question.pub_date.to_rfc3339(),
            id: question.id,
            text: question.text,
        }
    }
}

/// Choice response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChoiceResponse {
    pub id: String,
    pub question_id: String,
    pub text: String,
    pub votes: i32,
}

impl From<choice::Model> for ChoiceResponse {
    fn from(choice: choice::Model) -> Self {
        Self {
            id: choice.id,
            question_id: choice.question_id,
            text: choice.text,
            votes: choice.votes,
        }
    }
}

/// Question with inline choices.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionDetailResponse {
    #[serde(flatten)]
    pub question: QuestionResponse,
    pub choices: Vec<ChoiceResponse>,
}

impl From<QuestionWithChoices> for QuestionDetailResponse {
    fn from(page: QuestionWithChoices) -> Self {
        Self {
            question: page.question.into(),
            choices: page.choices.into_iter().map(ChoiceResponse::from).collect(),
        }
    }
}

/// Question list response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionListResponse {
    pub questions: Vec<QuestionResponse>,
    pub total: u64,
}

/// List query parameters.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    /// Case-insensitive search over question text.
    pub q: Option<String>,
    #[serde(default)]
    pub pub_date: PubDateFilter,
    pub limit: Option<u64>,
    #[serde(default)]
    pub offset: u64,
}

impl From<ListQuery> for AdminListQuery {
    fn from(query: ListQuery) -> Self {
        Self {
            search: query.q,
            pub_date: query.pub_date,
            limit: query.limit,
            offset: query.offset,
        }
    }
}

/// Routes of the admin API.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/questions", get(list).post(create))
        .route("/questions/{id}", get(show).put(update).delete(delete))
}

/// List questions.
async fn list(
    _admin: AdminUser,
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> AppResult<ApiResponse<QuestionListResponse>> {
    let list = state.admin_service.list(query.into()).await?;

    Ok(ApiResponse::ok(QuestionListResponse {
        questions: list.questions.into_iter().map(Into::into).collect(),
        total: list.total,
    }))
}

/// Create a question with inline choices.
async fn create(
    _admin: AdminUser,
    State(state): State<AppState>,
    Json(input): Json<CreateQuestionInput>,
) -> AppResult<ApiResponse<QuestionDetailResponse>> {
    let created = state.admin_service.create(input).await?;
    Ok(ApiResponse::created(created.into()))
}

/// Get a question, published or not.
async fn show(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<QuestionDetailResponse>> {
    let question = state.admin_service.get(&id).await?;
    Ok(ApiResponse::ok(question.into()))
}

/// Update a question and edit its choices.
async fn update(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<UpdateQuestionInput>,
) -> AppResult<ApiResponse<QuestionDetailResponse>> {
    let updated = state.admin_service.update(&id, input).await?;
    Ok(ApiResponse::ok(updated.into()))
}

/// Delete a question and its choices.
async fn delete(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    state.admin_service.delete(&id).await?;
    Ok(response::ok())
}
