use axum::{
    extract::{rejection::JsonRejection, Path},
    Extension, Json,
};
use uuid::Uuid;

use crate::database::manager::DatabaseManager;
use crate::database::models::{Report, ReportInput};
use crate::database::repository::ReportRepository;
use crate::error::ApiError;
use crate::middleware::AuthUser;

/// GET /reports - list the caller's reports
pub async fn list(Extension(user): Extension<AuthUser>) -> Result<Json<Vec<Report>>, ApiError> {
    let repo = ReportRepository::new(DatabaseManager::pool().await?);
    Ok(Json(repo.list(&user.subject).await?))
}

/// GET /reports/:id - single report, scoped to the caller
pub async fn get(
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<Report>, ApiError> {
    let repo = ReportRepository::new(DatabaseManager::pool().await?);
    Ok(Json(repo.get(id, &user.subject).await?))
}

/// POST /reports - create a report owned by the caller
pub async fn create(
    Extension(user): Extension<AuthUser>,
    payload: Result<Json<ReportInput>, JsonRejection>,
) -> Result<Json<Report>, ApiError> {
    let Json(input) = payload?;
    let repo = ReportRepository::new(DatabaseManager::pool().await?);
    Ok(Json(repo.create(input, &user.subject).await?))
}

/// PUT /reports/:id - whole-document overwrite
pub async fn update(
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    payload: Result<Json<ReportInput>, JsonRejection>,
) -> Result<Json<Report>, ApiError> {
    let Json(input) = payload?;
    let repo = ReportRepository::new(DatabaseManager::pool().await?);
    Ok(Json(repo.update(id, input, &user.subject).await?))
}
