use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single spend entry. Amounts are fixed two-place currency decimals,
/// dates are civil dates with no time component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub date: NaiveDate,
    pub amount: Decimal,
    pub category_id: i64,
    /// Free-form note, may be empty.
    #[serde(default)]
    pub comment: String,
}

impl Expense {
    pub fn new(date: NaiveDate, amount: Decimal, category_id: i64) -> Self {
        Self {
            id: None,
            date,
            amount,
            category_id,
            comment: String::new(),
        }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn serializes_wire_shape() {
        let expense = Expense::new(date(2024, 5, 1), Decimal::new(1050, 2), 3)
            .with_id(7)
            .with_comment("coffee");
        let json = serde_json::to_value(&expense).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": 7,
                "date": "2024-05-01",
                "amount": "10.50",
                "categoryId": 3,
                "comment": "coffee",
            })
        );
    }

    #[test]
    fn deserializes_numeric_amounts() {
        let expense: Expense = serde_json::from_value(serde_json::json!({
            "id": 1,
            "date": "2024-01-31",
            "amount": 9.5,
            "categoryId": 2,
            "comment": "",
        }))
        .unwrap();
        assert_eq!(expense.amount, Decimal::new(95, 1));
    }
}
