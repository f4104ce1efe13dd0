use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Stored grade-level text snippet, owned by exactly one theme
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Grade {
    pub id: Uuid,
    pub grade: i32,
    pub snippet: String,
    pub theme_id: Uuid,
    pub user_id: String,
}

/// Bulk-create contract
#[derive(Debug, Clone, Deserialize)]
pub struct GradeInput {
    pub grade: i32,
    pub snippet: String,
    pub theme_id: Uuid,
}

/// Bulk-replace contract, keyed by id
#[derive(Debug, Clone, Deserialize)]
pub struct GradeReplace {
    pub id: Uuid,
    pub grade: i32,
    pub snippet: String,
    pub theme_id: Uuid,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn create_contract_requires_theme_reference() {
        let missing: Result<GradeInput, _> = serde_json::from_value(json!({
            "grade": 2,
            "snippet": "arbeitet zuverlässig mit"
        }));
        assert!(missing.is_err());
    }

    #[test]
    fn replace_contract_requires_id() {
        let missing: Result<GradeReplace, _> = serde_json::from_value(json!({
            "grade": 1,
            "snippet": "x",
            "theme_id": Uuid::nil()
        }));
        assert!(missing.is_err());

        let item: GradeReplace = serde_json::from_value(json!({
            "id": Uuid::nil(),
            "grade": 1,
            "snippet": "x",
            "theme_id": Uuid::nil()
        }))
        .unwrap();
        assert_eq!(item.grade, 1);
    }
}
