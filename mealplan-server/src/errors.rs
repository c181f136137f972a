use axum::{
    http,
    response::{Html, IntoResponse, Response},
};
pub type WebResult<T> = std::result::Result<T, WebError>;

#[derive(thiserror::Error, Debug)]
pub enum WebError {
    #[error("Internal Server Error: {0}")]
    Internal(#[from] anyhow::Error),
    #[error("Templating error: {0:#}")]
    Template(#[from] minijinja::Error),
    #[error("Invalid recipe: {0}")]
    Invalid(#[from] mealplan::ValidationError),
    #[error("Not found")]
    NotFound,
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        match self {
            WebError::Internal(_) | WebError::Template(_) => {
                tracing::error!("{}", message);
                (http::StatusCode::INTERNAL_SERVER_ERROR, message).into_response()
            }
            // Validation failures are always explained
            WebError::Invalid(_) => {
                tracing::warn!("{}", message);
                (http::StatusCode::UNPROCESSABLE_ENTITY, message).into_response()
            }
            WebError::NotFound => (http::StatusCode::NOT_FOUND, "Not Found").into_response(),
        }
    }
}

/// The result of rendering one HTMX fragment.
///
/// All three are sent with status 200 so the client swaps them in like any
/// other fragment; the variants only differ in how they were produced.
#[derive(Debug)]
pub enum FragmentOutcome {
    Success(String),
    ValidationFailure(String),
    /// Rendering itself failed. Carries a ready-made error element.
    UnexpectedFailure(String),
}

impl FragmentOutcome {
    /// A plain error element replacing the element with `target_id`.
    pub fn unexpected(target_id: &str, message: &str) -> Self {
        FragmentOutcome::UnexpectedFailure(format!(
            r#"<div id="{}" class="text-error">{}</div>"#,
            html_escape::encode_double_quoted_attribute(target_id),
            html_escape::encode_text(message)
        ))
    }

    pub fn body(&self) -> &str {
        match self {
            FragmentOutcome::Success(html)
            | FragmentOutcome::ValidationFailure(html)
            | FragmentOutcome::UnexpectedFailure(html) => html,
        }
    }
}

impl IntoResponse for FragmentOutcome {
    fn into_response(self) -> Response {
        match self {
            FragmentOutcome::Success(html)
            | FragmentOutcome::ValidationFailure(html)
            | FragmentOutcome::UnexpectedFailure(html) => Html(html).into_response(),
        }
    }
}
