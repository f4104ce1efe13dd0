use axum::{
    extract::{rejection::JsonRejection, Path},
    http::StatusCode,
    Extension, Json,
};
use uuid::Uuid;

use crate::database::manager::DatabaseManager;
use crate::database::models::{ThemeInput, ThemeWithGrades};
use crate::database::repository::ThemeRepository;
use crate::error::ApiError;
use crate::middleware::AuthUser;

/// GET /themes - the caller's themes with their grades nested
pub async fn list(
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<ThemeWithGrades>>, ApiError> {
    let repo = ThemeRepository::new(DatabaseManager::pool().await?);
    Ok(Json(repo.list(&user.subject).await?))
}

/// GET /themes/:id - single theme with its grades
pub async fn get(
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ThemeWithGrades>, ApiError> {
    let repo = ThemeRepository::new(DatabaseManager::pool().await?);
    Ok(Json(repo.get(id, &user.subject).await?))
}

/// POST /themes - create a theme owned by the caller
pub async fn create(
    Extension(user): Extension<AuthUser>,
    payload: Result<Json<ThemeInput>, JsonRejection>,
) -> Result<Json<ThemeWithGrades>, ApiError> {
    let Json(input) = payload?;
    let repo = ThemeRepository::new(DatabaseManager::pool().await?);
    Ok(Json(repo.create(input, &user.subject).await?))
}

/// PUT /themes/:id - replace label, differentiation and color
pub async fn update(
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    payload: Result<Json<ThemeInput>, JsonRejection>,
) -> Result<Json<ThemeWithGrades>, ApiError> {
    let Json(input) = payload?;
    let repo = ThemeRepository::new(DatabaseManager::pool().await?);
    Ok(Json(repo.update(id, input, &user.subject).await?))
}

/// DELETE /themes/:id - delete the theme and all grades referencing it
pub async fn delete(
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let repo = ThemeRepository::new(DatabaseManager::pool().await?);
    repo.delete(id, &user.subject).await?;
    Ok(StatusCode::NO_CONTENT)
}
