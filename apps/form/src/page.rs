//! HTML rendering of the prediction page

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use minijinja::Environment;
use penguin_predict::{ArtifactLoadError, FormView, PredictionError, PredictionRequest, PredictionResult};
use serde::Serialize;

const PAGE_TEMPLATE: &str = "page.html";

pub struct Pages {
    env: Environment<'static>,
}

#[derive(Debug, Serialize)]
pub struct ErrorView {
    pub kind: &'static str,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct EchoRow {
    pub column: &'static str,
    pub value: String,
}

/// Everything one render cycle shows.
#[derive(Debug, Default, Serialize)]
pub struct PageView {
    pub form: Option<FormView>,
    pub echo: Vec<EchoRow>,
    pub result: Option<PredictionResult>,
    pub error: Option<ErrorView>,
}

impl PageView {
    pub fn form(form: FormView) -> Self {
        PageView {
            form: Some(form),
            ..Default::default()
        }
    }

    /// No controls at all, only the load failure.
    pub fn unavailable(err: &ArtifactLoadError) -> Self {
        PageView {
            error: Some(ErrorView {
                kind: "ArtifactLoadError",
                message: err.to_string(),
            }),
            ..Default::default()
        }
    }

    pub fn with_echo(mut self, request: &PredictionRequest) -> Self {
        self.echo = request
            .columns()
            .into_iter()
            .map(|(column, value)| EchoRow { column, value })
            .collect();
        self
    }

    pub fn with_outcome(mut self, outcome: Result<PredictionResult, PredictionError>) -> Self {
        match outcome {
            Ok(result) => self.result = Some(result),
            Err(err) => {
                self.error = Some(ErrorView {
                    kind: err.kind(),
                    message: err.to_string(),
                })
            }
        }
        self
    }
}

/// Status code a submission's error maps to.
pub fn status_for(err: &PredictionError) -> StatusCode {
    if err.is_input_error() {
        StatusCode::UNPROCESSABLE_ENTITY
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

impl Pages {
    pub fn new() -> Self {
        let mut env = Environment::new();
        // embedded at compile time, a parse failure is a build defect
        env.add_template(PAGE_TEMPLATE, include_str!("../templates/page.html"))
            .expect("page template parses");
        Pages { env }
    }

    pub fn render(&self, status: StatusCode, view: &PageView) -> Response {
        let rendered = self
            .env
            .get_template(PAGE_TEMPLATE)
            .and_then(|template| template.render(view));
        match rendered {
            Ok(html) => (status, Html(html)).into_response(),
            Err(err) => {
                tracing::error!("Failed to render page: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to render page".to_string(),
                )
                    .into_response()
            }
        }
    }
}

impl Default for Pages {
    fn default() -> Self {
        Self::new()
    }
}
