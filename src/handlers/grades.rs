use axum::{extract::rejection::JsonRejection, http::StatusCode, Extension, Json};

use crate::database::manager::DatabaseManager;
use crate::database::models::{GradeInput, GradeReplace};
use crate::database::repository::GradeRepository;
use crate::error::ApiError;
use crate::middleware::AuthUser;

/// POST /grades - bulk create snippets for the caller's themes
pub async fn create_bulk(
    Extension(user): Extension<AuthUser>,
    payload: Result<Json<Vec<GradeInput>>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let Json(items) = payload?;
    let repo = GradeRepository::new(DatabaseManager::pool().await?);
    repo.create_many(items, &user.subject).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /grades - bulk whole-object replace keyed by id
pub async fn update_bulk(
    Extension(user): Extension<AuthUser>,
    payload: Result<Json<Vec<GradeReplace>>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let Json(items) = payload?;
    let repo = GradeRepository::new(DatabaseManager::pool().await?);
    repo.replace_many(items, &user.subject).await?;
    Ok(StatusCode::NO_CONTENT)
}
