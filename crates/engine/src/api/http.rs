//! HTTP routes.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, patch, post, put},
    Json, Router,
};
use std::sync::Arc;
use uuid::Uuid;

use formcraft_domain::{BuilderSessionId, ErrorMap, FieldPatch, FormSchema};
use formcraft_shared::{
    AddFieldRequest, BeginEditRequest, BuilderResponse, DefinitionIssue, ErrorCode,
    ErrorResponse, EvaluationResponse, FormValuesRequest, ReorderFieldsRequest, SaveFormRequest,
    SavedFormSummary, SelectFormRequest, SetFormNameRequest, SubmissionResponse,
};

use crate::app::App;
use crate::infrastructure::ports::RepoError;
use crate::use_cases::{BuilderError, FormBuilder, FormSession, SessionError};

/// Create all HTTP routes.
pub fn routes() -> Router<Arc<App>> {
    Router::new()
        .route("/", get(health))
        .route("/api/health", get(health))
        // Saved forms
        .route("/api/forms", get(list_forms).post(save_form))
        .route("/api/forms/current", get(current_form).put(select_form))
        .route("/api/forms/current/evaluate", post(evaluate_current))
        .route("/api/forms/current/submit", post(submit_current))
        .route("/api/forms/{index}", get(get_form))
        // Builder sessions
        .route("/api/builders", post(create_builder))
        .route("/api/builders/{id}", get(get_builder).delete(close_builder))
        .route(
            "/api/builders/{id}/fields",
            post(add_field).put(reorder_fields),
        )
        .route(
            "/api/builders/{id}/fields/{index}",
            patch(update_field).delete(delete_field),
        )
        .route("/api/builders/{id}/name", put(set_form_name))
        .route("/api/builders/{id}/reset", post(reset_builder))
        .route("/api/builders/{id}/edit", post(begin_edit))
        .route("/api/builders/{id}/edit/commit", post(commit_edit))
        .route("/api/builders/{id}/edit/cancel", post(cancel_edit))
        .route("/api/builders/{id}/save", post(save_builder))
}

async fn health() -> &'static str {
    "OK"
}

// =============================================================================
// Saved forms
// =============================================================================

async fn list_forms(State(app): State<Arc<App>>) -> Result<Json<Vec<SavedFormSummary>>, ApiError> {
    let forms = app.library.list().await?;
    Ok(Json(
        forms
            .into_iter()
            .enumerate()
            .map(|(index, form)| SavedFormSummary {
                index,
                name: form.name,
                created_at: form.created_at,
                field_count: form.fields.len(),
            })
            .collect(),
    ))
}

async fn get_form(
    State(app): State<Arc<App>>,
    Path(index): Path<usize>,
) -> Result<Json<FormSchema>, ApiError> {
    let form = app
        .library
        .list()
        .await?
        .into_iter()
        .nth(index)
        .ok_or(ApiError::NotFound)?;
    Ok(Json(form))
}

async fn save_form(
    State(app): State<Arc<App>>,
    Json(request): Json<SaveFormRequest>,
) -> Result<(StatusCode, Json<FormSchema>), ApiError> {
    let schema = FormSchema::new(request.name, app.clock.now(), request.fields)
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;
    app.library.append(schema.clone()).await?;
    Ok((StatusCode::CREATED, Json(schema)))
}

async fn current_form(State(app): State<Arc<App>>) -> Result<Json<FormSchema>, ApiError> {
    let form = app.library.current().await?.ok_or(ApiError::NotFound)?;
    Ok(Json(form))
}

async fn select_form(
    State(app): State<Arc<App>>,
    Json(request): Json<SelectFormRequest>,
) -> Result<Json<FormSchema>, ApiError> {
    Ok(Json(app.library.select(request.index).await?))
}

async fn evaluate_current(
    State(app): State<Arc<App>>,
    Json(request): Json<FormValuesRequest>,
) -> Result<Json<EvaluationResponse>, ApiError> {
    let form = app.library.current().await?.ok_or(ApiError::NotFound)?;
    let snapshot = FormSession::with_values(form, request.values).snapshot();
    Ok(Json(EvaluationResponse {
        valid: snapshot.is_valid(),
        values: snapshot.values,
        errors: snapshot.errors,
    }))
}

async fn submit_current(
    State(app): State<Arc<App>>,
    Json(request): Json<FormValuesRequest>,
) -> Result<Json<SubmissionResponse>, ApiError> {
    let form = app.library.current().await?.ok_or(ApiError::NotFound)?;
    let form_name = form.name.clone();
    let values = FormSession::with_values(form, request.values).submit()?;
    Ok(Json(SubmissionResponse { form_name, values }))
}

// =============================================================================
// Builder sessions
// =============================================================================

fn builder_response(id: Uuid, builder: &FormBuilder) -> BuilderResponse {
    BuilderResponse {
        id,
        name: builder.name().to_string(),
        fields: builder.fields().to_vec(),
        editing: builder.editing_index(),
        issues: builder
            .definition_issues()
            .into_iter()
            .map(|issue| DefinitionIssue {
                field_id: issue.field_id().to_string(),
                message: issue.to_string(),
            })
            .collect(),
    }
}

/// Run `op` against the draft `id` and report the resulting state.
async fn with_builder(
    app: &App,
    id: Uuid,
    op: impl FnOnce(&mut FormBuilder) -> Result<(), BuilderError>,
) -> Result<Json<BuilderResponse>, ApiError> {
    let builder = app
        .builders
        .get(BuilderSessionId::from_uuid(id))
        .ok_or(ApiError::NotFound)?;
    let mut builder = builder.lock().await;
    op(&mut *builder)?;
    Ok(Json(builder_response(id, &builder)))
}

async fn create_builder(State(app): State<Arc<App>>) -> (StatusCode, Json<BuilderResponse>) {
    let (id, builder) = app.builders.create(app.ids.clone());
    let builder = builder.lock().await;
    (
        StatusCode::CREATED,
        Json(builder_response(id.to_uuid(), &builder)),
    )
}

async fn get_builder(
    State(app): State<Arc<App>>,
    Path(id): Path<Uuid>,
) -> Result<Json<BuilderResponse>, ApiError> {
    with_builder(&app, id, |_| Ok(())).await
}

async fn close_builder(
    State(app): State<Arc<App>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if app.builders.remove(BuilderSessionId::from_uuid(id)) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound)
    }
}

async fn add_field(
    State(app): State<Arc<App>>,
    Path(id): Path<Uuid>,
    Json(request): Json<AddFieldRequest>,
) -> Result<Json<BuilderResponse>, ApiError> {
    with_builder(&app, id, |builder| {
        builder.add_field(request.field_type);
        Ok(())
    })
    .await
}

async fn reorder_fields(
    State(app): State<Arc<App>>,
    Path(id): Path<Uuid>,
    Json(request): Json<ReorderFieldsRequest>,
) -> Result<Json<BuilderResponse>, ApiError> {
    with_builder(&app, id, |builder| {
        builder.reorder_fields(request.fields);
        Ok(())
    })
    .await
}

async fn update_field(
    State(app): State<Arc<App>>,
    Path((id, index)): Path<(Uuid, usize)>,
    Json(patch): Json<FieldPatch>,
) -> Result<Json<BuilderResponse>, ApiError> {
    with_builder(&app, id, |builder| {
        builder.update_field(index, patch).map(|_| ())
    })
    .await
}

async fn delete_field(
    State(app): State<Arc<App>>,
    Path((id, index)): Path<(Uuid, usize)>,
) -> Result<Json<BuilderResponse>, ApiError> {
    with_builder(&app, id, |builder| builder.delete_field(index).map(|_| ())).await
}

async fn set_form_name(
    State(app): State<Arc<App>>,
    Path(id): Path<Uuid>,
    Json(request): Json<SetFormNameRequest>,
) -> Result<Json<BuilderResponse>, ApiError> {
    with_builder(&app, id, |builder| {
        builder.set_form_name(request.name);
        Ok(())
    })
    .await
}

async fn reset_builder(
    State(app): State<Arc<App>>,
    Path(id): Path<Uuid>,
) -> Result<Json<BuilderResponse>, ApiError> {
    with_builder(&app, id, |builder| {
        builder.reset_form();
        Ok(())
    })
    .await
}

async fn begin_edit(
    State(app): State<Arc<App>>,
    Path(id): Path<Uuid>,
    Json(request): Json<BeginEditRequest>,
) -> Result<Json<BuilderResponse>, ApiError> {
    with_builder(&app, id, |builder| {
        builder.begin_edit(request.index).map(|_| ())
    })
    .await
}

async fn commit_edit(
    State(app): State<Arc<App>>,
    Path(id): Path<Uuid>,
    Json(patch): Json<FieldPatch>,
) -> Result<Json<BuilderResponse>, ApiError> {
    with_builder(&app, id, |builder| builder.commit_edit(patch).map(|_| ())).await
}

async fn cancel_edit(
    State(app): State<Arc<App>>,
    Path(id): Path<Uuid>,
) -> Result<Json<BuilderResponse>, ApiError> {
    with_builder(&app, id, |builder| {
        builder.cancel_edit();
        Ok(())
    })
    .await
}

async fn save_builder(
    State(app): State<Arc<App>>,
    Path(id): Path<Uuid>,
) -> Result<(StatusCode, Json<FormSchema>), ApiError> {
    let builder = app
        .builders
        .get(BuilderSessionId::from_uuid(id))
        .ok_or(ApiError::NotFound)?;
    let mut builder = builder.lock().await;
    let schema = builder.save_form(&app.library, app.clock.as_ref()).await?;
    Ok((StatusCode::CREATED, Json(schema)))
}

// =============================================================================
// Errors
// =============================================================================

#[derive(Debug)]
pub enum ApiError {
    NotFound,
    BadRequest(String),
    Invalid(ErrorMap),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::NotFound => (
                StatusCode::NOT_FOUND,
                ErrorResponse::new(ErrorCode::NotFound, "Not found"),
            ),
            ApiError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse::new(ErrorCode::BadRequest, msg),
            ),
            ApiError::Invalid(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorResponse::new(ErrorCode::ValidationError, "Form has invalid fields")
                    .with_errors(errors),
            ),
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new(ErrorCode::InternalError, "Internal error"),
                )
            }
        };
        (status, Json(body)).into_response()
    }
}

impl From<RepoError> for ApiError {
    fn from(e: RepoError) -> Self {
        if e.is_not_found() {
            ApiError::NotFound
        } else {
            ApiError::Internal(e.to_string())
        }
    }
}

impl From<BuilderError> for ApiError {
    fn from(e: BuilderError) -> Self {
        match e {
            BuilderError::Repo(e) => e.into(),
            other => ApiError::BadRequest(other.to_string()),
        }
    }
}

impl From<SessionError> for ApiError {
    fn from(e: SessionError) -> Self {
        match e {
            SessionError::Invalid(errors) => ApiError::Invalid(errors),
            other => ApiError::BadRequest(other.to_string()),
        }
    }
}
