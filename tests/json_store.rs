use std::str::FromStr;

use anyhow::Result;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use tallybook::models::{Category, Expense};
use tallybook::store::{CacheStore, JsonFileStore};
use tempfile::TempDir;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn expense(id: i64, date: NaiveDate, amt: &str) -> Expense {
    Expense::new(date, Decimal::from_str(amt).unwrap(), 1).with_id(id)
}

#[tokio::test]
async fn records_survive_a_reopen() -> Result<()> {
    let dir = TempDir::new()?;

    {
        let store = JsonFileStore::new(dir.path());
        store
            .insert_expenses(&[
                expense(1, date(2024, 5, 1), "10.00"),
                expense(2, date(2024, 5, 2), "20.00"),
            ])
            .await?;
    }

    let reopened = JsonFileStore::new(dir.path());
    let expenses = reopened.list_expenses().await?;
    assert_eq!(expenses.len(), 2);
    assert_eq!(expenses[0].id, Some(1));
    assert_eq!(expenses[1].amount, Decimal::from_str("20.00").unwrap());

    Ok(())
}

#[tokio::test]
async fn replace_window_rewrites_only_recent_records() -> Result<()> {
    let dir = TempDir::new()?;
    let store = JsonFileStore::new(dir.path());

    // The second record sits exactly on the cutoff and must be replaced;
    // only dates strictly before it survive.
    store
        .insert_expenses(&[
            expense(1, date(2024, 4, 30), "10.00"),
            expense(2, date(2024, 5, 1), "20.00"),
        ])
        .await?;

    store
        .replace_expenses_since(date(2024, 5, 1), &[expense(3, date(2024, 5, 20), "30.00")])
        .await?;

    let expenses = store.list_expenses().await?;
    let ids: Vec<i64> = expenses.iter().filter_map(|e| e.id).collect();
    assert_eq!(ids, vec![1, 3]);

    Ok(())
}

#[tokio::test]
async fn full_replace_discards_all_prior_content() -> Result<()> {
    let dir = TempDir::new()?;
    let store = JsonFileStore::new(dir.path());

    store
        .insert_expenses(&[
            expense(1, date(2024, 4, 10), "10.00"),
            expense(2, date(2024, 5, 15), "20.00"),
        ])
        .await?;

    store
        .replace_expenses(&[expense(9, date(2024, 6, 1), "90.00")])
        .await?;
    let expenses = store.list_expenses().await?;
    assert_eq!(expenses.len(), 1);
    assert_eq!(expenses[0].id, Some(9));

    store.replace_expenses(&[]).await?;
    assert!(store.list_expenses().await?.is_empty());

    Ok(())
}

#[tokio::test]
async fn update_and_delete_match_by_id() -> Result<()> {
    let dir = TempDir::new()?;
    let store = JsonFileStore::new(dir.path());

    store.insert_category(&Category::new("Groceries").with_id(1)).await?;
    store.insert_category(&Category::new("Rent").with_id(2)).await?;

    store
        .update_category(&Category::new("Food").with_id(1))
        .await?;
    let categories = store.list_categories().await?;
    assert_eq!(categories[0].name, "Food");
    assert_eq!(categories[1].name, "Rent");

    assert!(store.delete_category(2).await?);
    assert!(!store.delete_category(2).await?, "second delete finds nothing");
    assert_eq!(store.list_categories().await?.len(), 1);

    Ok(())
}

#[tokio::test]
async fn unparseable_lines_are_skipped_on_read() -> Result<()> {
    let dir = TempDir::new()?;

    std::fs::write(
        dir.path().join("expenses.jsonl"),
        concat!(
            r#"{"id":1,"date":"2024-05-01","amount":"10.00","categoryId":1,"comment":""}"#,
            "\n",
            "{this line is broken\n",
            r#"{"id":2,"date":"2024-05-02","amount":"20.00","categoryId":1,"comment":""}"#,
            "\n",
        ),
    )?;

    let store = JsonFileStore::new(dir.path());
    let expenses = store.list_expenses().await?;
    assert_eq!(expenses.len(), 2);
    assert_eq!(expenses[0].id, Some(1));
    assert_eq!(expenses[1].id, Some(2));

    Ok(())
}
