use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::grade::Grade;

/// Stored categorization theme with its sub-classification
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Theme {
    pub id: Uuid,
    pub theme: String,
    pub differentiation: String,
    pub color: Option<String>,
    pub user_id: String,
}

/// Creation/update contract (mutable fields only, owner from token)
#[derive(Debug, Clone, Deserialize)]
pub struct ThemeInput {
    pub theme: String,
    pub differentiation: String,
    #[serde(default)]
    pub color: Option<String>,
}

/// Read contract: the theme plus its owned grade snippets
#[derive(Debug, Clone, Serialize)]
pub struct ThemeWithGrades {
    pub id: Uuid,
    pub theme: String,
    pub differentiation: String,
    pub color: Option<String>,
    pub user_id: String,
    pub grades: Vec<Grade>,
}

impl ThemeWithGrades {
    pub fn from_parts(theme: Theme, grades: Vec<Grade>) -> Self {
        Self {
            id: theme.id,
            theme: theme.theme,
            differentiation: theme.differentiation,
            color: theme.color,
            user_id: theme.user_id,
            grades,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn input_requires_label_and_differentiation() {
        let missing: Result<ThemeInput, _> =
            serde_json::from_value(json!({ "theme": "Sozialverhalten" }));
        assert!(missing.is_err());

        let input: ThemeInput = serde_json::from_value(json!({
            "theme": "T1",
            "differentiation": "D1",
            "color": "#fff"
        }))
        .unwrap();
        assert_eq!(input.theme, "T1");
        assert_eq!(input.color.as_deref(), Some("#fff"));
    }

    #[test]
    fn color_is_optional() {
        let input: ThemeInput = serde_json::from_value(json!({
            "theme": "Arbeitsverhalten",
            "differentiation": "sehr gut"
        }))
        .unwrap();
        assert!(input.color.is_none());
    }

    #[test]
    fn read_contract_nests_grades() {
        let theme = Theme {
            id: Uuid::nil(),
            theme: "T1".to_string(),
            differentiation: "D1".to_string(),
            color: Some("#fff".to_string()),
            user_id: "u1".to_string(),
        };
        let value = serde_json::to_value(ThemeWithGrades::from_parts(theme, vec![])).unwrap();
        assert_eq!(value["theme"], "T1");
        assert_eq!(value["differentiation"], "D1");
        assert_eq!(value["color"], "#fff");
        assert_eq!(value["user_id"], "u1");
        assert_eq!(value["grades"], json!([]));
    }
}
