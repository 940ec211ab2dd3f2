use serde::{Deserialize, Serialize};

/// A user-defined expense category. The server assigns ids; a category
/// built locally carries `id: None` until it round-trips a create call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub name: String,
    /// Number of expenses referencing this category, computed server-side.
    #[serde(default)]
    pub usage_count: u32,
}

impl Category {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            usage_count: 0,
        }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_camel_case_fields_and_no_null_id() {
        let category = Category::new("Groceries");
        let json = serde_json::to_value(&category).unwrap();
        assert_eq!(json, serde_json::json!({"name": "Groceries", "usageCount": 0}));
    }

    #[test]
    fn deserializes_server_shape() {
        let category: Category =
            serde_json::from_value(serde_json::json!({"id": 3, "name": "Rent", "usageCount": 12}))
                .unwrap();
        assert_eq!(category.id, Some(3));
        assert_eq!(category.name, "Rent");
        assert_eq!(category.usage_count, 12);
    }

    #[test]
    fn usage_count_defaults_to_zero_when_absent() {
        let category: Category =
            serde_json::from_value(serde_json::json!({"id": 9, "name": "Travel"})).unwrap();
        assert_eq!(category.usage_count, 0);
    }
}
