use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

/// Stored evaluation report (Gutachten). The `ga` field holds the arbitrary
/// nested document tree produced by the editor.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Report {
    pub id: Uuid,
    pub ga: Value,
    pub description: Option<String>,
    pub user_id: String,
}

/// Creation/update contract. Carries no id and no owner: the owner is always
/// stamped from the verified token subject, never from the payload.
#[derive(Debug, Clone, Deserialize)]
pub struct ReportInput {
    pub ga: Value,
    #[serde(default)]
    pub description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn input_requires_content() {
        let missing: Result<ReportInput, _> = serde_json::from_value(json!({
            "description": "Halbjahr 1"
        }));
        assert!(missing.is_err());

        let empty_tree: ReportInput = serde_json::from_value(json!({ "ga": {} })).unwrap();
        assert_eq!(empty_tree.ga, json!({}));
        assert!(empty_tree.description.is_none());
    }

    #[test]
    fn client_supplied_owner_is_not_part_of_the_contract() {
        // A payload trying to stamp an owner still deserializes, but the
        // contract has no owner field to carry it
        let input: ReportInput = serde_json::from_value(serde_json::json!({
            "ga": { "root": { "children": [] } },
            "user_id": "somebody-else"
        }))
        .unwrap();
        assert_eq!(input.ga["root"]["children"], serde_json::json!([]));
    }

    #[test]
    fn stored_report_serializes_all_fields() {
        let report = Report {
            id: Uuid::nil(),
            ga: json!({ "root": {} }),
            description: Some("Zwischenbericht".to_string()),
            user_id: "auth0|u1".to_string(),
        };
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["user_id"], "auth0|u1");
        assert_eq!(value["description"], "Zwischenbericht");
        assert_eq!(value["ga"], json!({ "root": {} }));
    }
}
