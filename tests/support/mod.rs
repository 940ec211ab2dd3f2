use std::str::FromStr;
use std::sync::Arc;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::NaiveDate;
use rust_decimal::Decimal;

use tallybook::api::ApiClient;
use tallybook::auth::{MemoryTokenStore, StoredSession};
use tallybook::models::{Category, Expense, Income};

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn amount(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

pub fn expense(id: i64, date: NaiveDate, amt: &str, category: i64) -> Expense {
    Expense::new(date, amount(amt), category).with_id(id)
}

pub fn income(id: i64, date: NaiveDate, amt: &str) -> Income {
    Income::new(date, amount(amt)).with_id(id)
}

pub fn category(id: i64, name: &str) -> Category {
    Category::new(name).with_id(id)
}

/// Unsigned token whose only claim is the given expiry, shaped like what
/// the backend issues.
pub fn jwt_with_expiry(exp: i64) -> String {
    let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(format!(r#"{{"exp":{exp}}}"#));
    format!("{header}.{payload}.sig")
}

/// Client whose token store already holds a session with a non-expiring
/// token, so data calls go straight through.
pub fn signed_in_client(base_url: &str) -> Arc<ApiClient> {
    let tokens = MemoryTokenStore::with_session(StoredSession::new(
        "user@example.com",
        "hunter2",
        "cached-token",
    ));
    Arc::new(ApiClient::new(base_url, Arc::new(tokens)))
}
