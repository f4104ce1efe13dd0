//! Access-scoped data access. Every query and mutation takes the caller's
//! verified subject and filters or stamps `user_id` with it; no operation can
//! touch another owner's rows.

use sqlx::PgPool;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{
    Grade, GradeInput, GradeReplace, Report, ReportInput, Theme, ThemeInput, ThemeWithGrades,
};

pub struct ReportRepository {
    pool: PgPool,
}

impl ReportRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, owner: &str) -> Result<Vec<Report>, DatabaseError> {
        let reports = sqlx::query_as::<_, Report>(
            "SELECT id, ga, description, user_id FROM reports WHERE user_id = $1",
        )
        .bind(owner)
        .fetch_all(&self.pool)
        .await?;
        Ok(reports)
    }

    pub async fn get(&self, id: Uuid, owner: &str) -> Result<Report, DatabaseError> {
        sqlx::query_as::<_, Report>(
            "SELECT id, ga, description, user_id FROM reports WHERE id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(owner)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::NotFound(format!("kein gutachten mit id={}", id)))
    }

    pub async fn create(&self, input: ReportInput, owner: &str) -> Result<Report, DatabaseError> {
        let report = sqlx::query_as::<_, Report>(
            r#"
            INSERT INTO reports (id, ga, description, user_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id, ga, description, user_id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(input.ga)
        .bind(input.description)
        .bind(owner)
        .fetch_one(&self.pool)
        .await?;
        Ok(report)
    }

    /// Whole-document overwrite of the scoped record
    pub async fn update(
        &self,
        id: Uuid,
        input: ReportInput,
        owner: &str,
    ) -> Result<Report, DatabaseError> {
        sqlx::query_as::<_, Report>(
            r#"
            UPDATE reports SET ga = $1, description = $2
            WHERE id = $3 AND user_id = $4
            RETURNING id, ga, description, user_id
            "#,
        )
        .bind(input.ga)
        .bind(input.description)
        .bind(id)
        .bind(owner)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::NotFound(format!("kein gutachten mit id={}", id)))
    }
}

pub struct ThemeRepository {
    pool: PgPool,
}

impl ThemeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, owner: &str) -> Result<Vec<ThemeWithGrades>, DatabaseError> {
        let themes = sqlx::query_as::<_, Theme>(
            "SELECT id, theme, differentiation, color, user_id FROM themes WHERE user_id = $1",
        )
        .bind(owner)
        .fetch_all(&self.pool)
        .await?;

        let grades = sqlx::query_as::<_, Grade>(
            "SELECT id, grade, snippet, theme_id, user_id FROM grades WHERE user_id = $1",
        )
        .bind(owner)
        .fetch_all(&self.pool)
        .await?;

        let mut by_theme: std::collections::HashMap<Uuid, Vec<Grade>> =
            std::collections::HashMap::new();
        for grade in grades {
            by_theme.entry(grade.theme_id).or_default().push(grade);
        }

        Ok(themes
            .into_iter()
            .map(|theme| {
                let grades = by_theme.remove(&theme.id).unwrap_or_default();
                ThemeWithGrades::from_parts(theme, grades)
            })
            .collect())
    }

    pub async fn get(&self, id: Uuid, owner: &str) -> Result<ThemeWithGrades, DatabaseError> {
        let theme = sqlx::query_as::<_, Theme>(
            "SELECT id, theme, differentiation, color, user_id FROM themes WHERE id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(owner)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::NotFound(format!("kein thema mit id={}", id)))?;

        let grades = self.grades_for(id, owner).await?;
        Ok(ThemeWithGrades::from_parts(theme, grades))
    }

    pub async fn create(
        &self,
        input: ThemeInput,
        owner: &str,
    ) -> Result<ThemeWithGrades, DatabaseError> {
        let theme = sqlx::query_as::<_, Theme>(
            r#"
            INSERT INTO themes (id, theme, differentiation, color, user_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, theme, differentiation, color, user_id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(input.theme)
        .bind(input.differentiation)
        .bind(input.color)
        .bind(owner)
        .fetch_one(&self.pool)
        .await?;

        Ok(ThemeWithGrades::from_parts(theme, Vec::new()))
    }

    /// Replaces the mutable fields (label, differentiation, color)
    pub async fn update(
        &self,
        id: Uuid,
        input: ThemeInput,
        owner: &str,
    ) -> Result<ThemeWithGrades, DatabaseError> {
        let theme = sqlx::query_as::<_, Theme>(
            r#"
            UPDATE themes SET theme = $1, differentiation = $2, color = $3
            WHERE id = $4 AND user_id = $5
            RETURNING id, theme, differentiation, color, user_id
            "#,
        )
        .bind(input.theme)
        .bind(input.differentiation)
        .bind(input.color)
        .bind(id)
        .bind(owner)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::NotFound(format!("kein thema mit id={}", id)))?;

        let grades = self.grades_for(id, owner).await?;
        Ok(ThemeWithGrades::from_parts(theme, grades))
    }

    /// Deletes the theme and all grades referencing it in one transaction.
    /// The grades table also carries ON DELETE CASCADE, but the explicit
    /// delete keeps the invariant independent of the schema's FK definition.
    pub async fn delete(&self, id: Uuid, owner: &str) -> Result<(), DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let owned: Option<(Uuid,)> =
            sqlx::query_as("SELECT id FROM themes WHERE id = $1 AND user_id = $2")
                .bind(id)
                .bind(owner)
                .fetch_optional(&mut *tx)
                .await?;
        if owned.is_none() {
            return Err(DatabaseError::NotFound(format!("kein thema mit id={}", id)));
        }

        sqlx::query("DELETE FROM grades WHERE theme_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM themes WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn grades_for(&self, theme_id: Uuid, owner: &str) -> Result<Vec<Grade>, DatabaseError> {
        let grades = sqlx::query_as::<_, Grade>(
            "SELECT id, grade, snippet, theme_id, user_id FROM grades WHERE theme_id = $1 AND user_id = $2",
        )
        .bind(theme_id)
        .bind(owner)
        .fetch_all(&self.pool)
        .await?;
        Ok(grades)
    }
}

pub struct GradeRepository {
    pool: PgPool,
}

impl GradeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Bulk insert, all-or-nothing. Every referenced theme must exist and
    /// belong to the caller; a single mismatch rejects the whole batch.
    pub async fn create_many(
        &self,
        items: Vec<GradeInput>,
        owner: &str,
    ) -> Result<(), DatabaseError> {
        if items.is_empty() {
            return Ok(());
        }

        let mut tx = self.pool.begin().await?;

        let theme_ids = distinct_theme_ids(items.iter().map(|item| item.theme_id));
        verify_theme_ownership(&mut tx, &theme_ids, owner).await?;

        let ids: Vec<Uuid> = items.iter().map(|_| Uuid::new_v4()).collect();
        let grades: Vec<i32> = items.iter().map(|item| item.grade).collect();
        let snippets: Vec<String> = items.iter().map(|item| item.snippet.clone()).collect();
        let themes: Vec<Uuid> = items.iter().map(|item| item.theme_id).collect();
        let owners: Vec<String> = items.iter().map(|_| owner.to_string()).collect();

        sqlx::query(
            r#"
            INSERT INTO grades (id, grade, snippet, theme_id, user_id)
            SELECT * FROM UNNEST($1::uuid[], $2::int4[], $3::text[], $4::uuid[], $5::text[])
            "#,
        )
        .bind(&ids)
        .bind(&grades)
        .bind(&snippets)
        .bind(&themes)
        .bind(&owners)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Bulk whole-object replace keyed by id, all-or-nothing. Items matching
    /// no scoped row (unknown id or foreign owner) reject the whole batch.
    pub async fn replace_many(
        &self,
        items: Vec<GradeReplace>,
        owner: &str,
    ) -> Result<(), DatabaseError> {
        if items.is_empty() {
            return Ok(());
        }

        let mut tx = self.pool.begin().await?;

        let theme_ids = distinct_theme_ids(items.iter().map(|item| item.theme_id));
        verify_theme_ownership(&mut tx, &theme_ids, owner).await?;

        for item in items {
            let result = sqlx::query(
                r#"
                UPDATE grades SET grade = $1, snippet = $2, theme_id = $3
                WHERE id = $4 AND user_id = $5
                "#,
            )
            .bind(item.grade)
            .bind(&item.snippet)
            .bind(item.theme_id)
            .bind(item.id)
            .bind(owner)
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() == 0 {
                return Err(DatabaseError::ConstraintViolation(format!(
                    "kein textbaustein mit id={}",
                    item.id
                )));
            }
        }

        tx.commit().await?;
        Ok(())
    }
}

fn distinct_theme_ids(ids: impl Iterator<Item = Uuid>) -> Vec<Uuid> {
    let mut ids: Vec<Uuid> = ids.collect();
    ids.sort_unstable();
    ids.dedup();
    ids
}

/// Every id in `theme_ids` must name a theme owned by `owner`
async fn verify_theme_ownership(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    theme_ids: &[Uuid],
    owner: &str,
) -> Result<(), DatabaseError> {
    let owned: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM themes WHERE id = ANY($1) AND user_id = $2")
            .bind(theme_ids)
            .bind(owner)
            .fetch_one(&mut **tx)
            .await?;

    if owned as usize != theme_ids.len() {
        return Err(DatabaseError::ConstraintViolation(
            "textbaustein verweist auf ein unbekanntes thema".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn theme_ids_are_deduplicated_for_the_ownership_check() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let ids = distinct_theme_ids(vec![a, b, a, a, b].into_iter());
        assert_eq!(ids.len(), 2);
        assert!(ids.contains(&a));
        assert!(ids.contains(&b));
    }
}
