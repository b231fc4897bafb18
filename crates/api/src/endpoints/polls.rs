//! Public poll pages.

use axum::{
    Form, Router,
    extract::{Path, State, rejection::FormRejection},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use polls_core::{QuestionWithChoices, VoteOutcome};
use polls_db::entities::{choice, question};
use serde::{Deserialize, Serialize};

use crate::{state::AppState, templates::PageResult};

/// Shown when a vote is submitted without a valid choice.
pub const NO_CHOICE_MESSAGE: &str = "You didn't select a choice.";

/// URL builders for the poll pages.
pub mod urls {
    /// Index page.
    #[must_use]
    pub fn index() -> String {
        "/polls/".to_string()
    }

    /// Detail page of a question.
    #[must_use]
    pub fn detail(question_id: &str) -> String {
        format!("/polls/{question_id}/")
    }

    /// Results page of a question.
    #[must_use]
    pub fn results(question_id: &str) -> String {
        format!("/polls/{question_id}/results/")
    }

    /// Vote target of a question.
    #[must_use]
    pub fn vote(question_id: &str) -> String {
        format!("/polls/{question_id}/vote/")
    }
}

/// Index entry linking to a question.
#[derive(Serialize)]
struct QuestionLink {
    id: String,
    text: String,
    url: String,
}

impl From<question::Model> for QuestionLink {
    fn from(question: question::Model) -> Self {
        Self {
            url: urls::detail(&question.id),
            id: question.id,
            text: question.text,
        }
    }
}

#[derive(Serialize)]
struct IndexPage {
    latest_question_list: Vec<QuestionLink>,
}

#[derive(Serialize)]
struct DetailPage {
    question: question::Model,
    choices: Vec<choice::Model>,
    vote_url: String,
    error_message: Option<&'static str>,
}

impl DetailPage {
    fn new(page: QuestionWithChoices, error_message: Option<&'static str>) -> Self {
        Self {
            vote_url: urls::vote(&page.question.id),
            question: page.question,
            choices: page.choices,
            error_message,
        }
    }
}

#[derive(Serialize)]
struct ResultsPage {
    detail_url: String,
    question: question::Model,
    choices: Vec<choice::Model>,
}

/// Submitted vote form.
#[derive(Debug, Deserialize)]
pub struct VoteForm {
    #[serde(default)]
    pub choice: Option<String>,
}

/// Routes of the public poll pages.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(&urls::index(), get(index))
        .route("/polls/{question_id}/", get(detail))
        .route("/polls/{question_id}/results/", get(results))
        .route("/polls/{question_id}/vote/", post(vote))
}

/// Latest published questions, newest first.
async fn index(State(state): State<AppState>) -> PageResult<Html<String>> {
    let questions = state.question_service.latest_published().await?;
    let page = IndexPage {
        latest_question_list: questions.into_iter().map(QuestionLink::from).collect(),
    };
    Ok(state.templates.render("polls/index.html", &page)?)
}

/// Voting form of a published question.
async fn detail(
    State(state): State<AppState>,
    Path(question_id): Path<String>,
) -> PageResult<Html<String>> {
    let page = state
        .question_service
        .get_published_with_choices(&question_id)
        .await?;
    Ok(state
        .templates
        .render("polls/detail.html", &DetailPage::new(page, None))?)
}

/// Vote tallies of a published question.
async fn results(
    State(state): State<AppState>,
    Path(question_id): Path<String>,
) -> PageResult<Html<String>> {
    let page = state
        .question_service
        .get_published_with_choices(&question_id)
        .await?;
    let page = ResultsPage {
        detail_url: urls::detail(&page.question.id),
        question: page.question,
        choices: page.choices,
    };
    Ok(state.templates.render("polls/results.html", &page)?)
}

/// Count a vote, then redirect to the results page.
///
/// An unreadable form counts as no choice, so unpublished questions still 404.
async fn vote(
    State(state): State<AppState>,
    Path(question_id): Path<String>,
    form: Result<Form<VoteForm>, FormRejection>,
) -> PageResult<Response> {
    let choice = form.ok().and_then(|Form(form)| form.choice);
    let outcome = state
        .vote_service
        .vote(&question_id, choice.as_deref())
        .await?;

    match outcome {
        VoteOutcome::Recorded { question_id } => {
            Ok(Redirect::to(&urls::results(&question_id)).into_response())
        }
        VoteOutcome::ChoiceMissing { question, choices } => {
            let page = DetailPage::new(
                QuestionWithChoices { question, choices },
                Some(NO_CHOICE_MESSAGE),
            );
            Ok(state
                .templates
                .render("polls/detail.html", &page)?
                .into_response())
        }
    }
}
