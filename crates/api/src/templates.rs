//! HTML rendering for the public poll pages.

use std::sync::Arc;

use axum::response::{Html, IntoResponse, Response};
use polls_common::{AppError, AppResult};
use serde::Serialize;
use tera::{Context, Tera};
use tracing::debug;

const TEMPLATES: [(&str, &str); 4] = [
    ("base.html", include_str!("../templates/base.html")),
    ("polls/index.html", include_str!("../templates/polls/index.html")),
    ("polls/detail.html", include_str!("../templates/polls/detail.html")),
    ("polls/results.html", include_str!("../templates/polls/results.html")),
];

/// Compiled page templates.
#[derive(Clone)]
pub struct Templates {
    tera: Arc<Tera>,
}

impl Templates {
    /// Compile the embedded templates.
    pub fn new() -> AppResult<Self> {
        let mut tera = Tera::default();
        tera.add_raw_templates(TEMPLATES)
            .map_err(|e| AppError::Template(e.to_string()))?;
        debug!(count = TEMPLATES.len(), "Compiled page templates");
        Ok(Self {
            tera: Arc::new(tera),
        })
    }

    /// Render a template with a serializable context.
    pub fn render<T: Serialize>(&self, name: &str, context: &T) -> AppResult<Html<String>> {
        let context =
            Context::from_serialize(context).map_err(|e| AppError::Template(e.to_string()))?;
        self.tera
            .render(name, &context)
            .map(Html)
            .map_err(|e| AppError::Template(format!("{name}: {e}")))
    }
}

/// Error returned by page handlers; rendered as a small HTML page.
#[derive(Debug)]
pub struct PageError(pub AppError);

impl From<AppError> for PageError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        self.0.log();

        let status = self.0.status_code();
        let title = status.canonical_reason().unwrap_or("Error");
        let body = format!(
            "<!DOCTYPE html>\n<html lang=\"en\">\n<head><meta charset=\"utf-8\"><title>{title}</title></head>\n<body><h1>{} {title}</h1></body>\n</html>\n",
            status.as_u16()
        );

        (status, Html(body)).into_response()
    }
}

/// Shorthand for page handler results.
pub type PageResult<T> = Result<T, PageError>;
