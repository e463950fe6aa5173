use crate::page::{ErrorView, PageView, status_for};
use crate::state::AppState;
use crate::telemetry;
use axum::extract::rejection::FormRejection;
use axum::extract::{Form, State};
use axum::http::StatusCode;
use axum::response::Response;
use penguin_predict::{FormSubmission, FormView};
use std::time::Instant;

#[tracing::instrument(name = "GET /", skip(state))]
pub async fn show_form(State(state): State<AppState>) -> Response {
    match &state.artifacts {
        Ok(context) => state
            .pages
            .render(StatusCode::OK, &PageView::form(FormView::new(context))),
        Err(err) => state
            .pages
            .render(StatusCode::SERVICE_UNAVAILABLE, &PageView::unavailable(err)),
    }
}

#[tracing::instrument(name = "POST /", skip(state, form))]
pub async fn submit_form(
    State(state): State<AppState>,
    form: Result<Form<FormSubmission>, FormRejection>,
) -> Response {
    let context = match &state.artifacts {
        Ok(context) => context,
        Err(err) => {
            telemetry::record_submission("ArtifactLoadError", Default::default());
            return state
                .pages
                .render(StatusCode::SERVICE_UNAVAILABLE, &PageView::unavailable(err));
        }
    };

    let form = match form {
        Ok(Form(form)) => form,
        Err(rejection) => {
            tracing::warn!("Rejected form submission: {}", rejection);
            let view = PageView {
                error: Some(ErrorView {
                    kind: "InvalidInputError",
                    message: rejection.body_text(),
                }),
                ..PageView::form(FormView::new(context))
            };
            return state.pages.render(StatusCode::BAD_REQUEST, &view);
        }
    };

    let started = Instant::now();
    let submission = context.submit(&form);
    telemetry::record_submission(submission.outcome_label(), started.elapsed());

    let status = match &submission.outcome {
        Ok(result) => {
            tracing::info!(species = %result.species, "Prediction succeeded");
            StatusCode::OK
        }
        Err(err) => {
            tracing::warn!(kind = err.kind(), "Prediction failed: {}", err);
            status_for(err)
        }
    };

    let mut view = PageView::form(FormView::with_values(context, &form));
    if let Some(request) = &submission.request {
        view = view.with_echo(request);
    }
    let view = view.with_outcome(submission.outcome);
    state.pages.render(status, &view)
}
