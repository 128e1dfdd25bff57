//! Integration tests for budget edit sessions against a record store
//!
//! Covers redistribution through a full load/edit/commit cycle, cancel,
//! partial commit failure and the JSON directory backend.

use allotment::budget::{BudgetSession, SessionState};
use allotment::store::{Entity, JsonDirStore, MemoryStore, Record, RecordStore};
use allotment::FinanceError;
use rust_decimal::Decimal;
use std::str::FromStr;
use tempfile::TempDir;

fn rec(pairs: &[(&str, &str)]) -> Record {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn d(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn item(id: &str, plan: &str, amount: &str) -> Record {
    rec(&[
        ("id", id),
        ("budget_plan_id", plan),
        ("category_id", &format!("cat_{}", id)),
        ("planned_amount", amount),
        ("notes", ""),
    ])
}

/// Plan bp_1 with a 1000/month salary ceiling and the given (id, amount) items
fn seeded_store(items: &[(&str, &str)]) -> MemoryStore {
    let store = MemoryStore::new();
    store.seed(
        Entity::BudgetPlan,
        vec![
            rec(&[("id", "bp_1"), ("year", "2025"), ("month", "1"), ("currency", "USD")]),
            rec(&[("id", "bp_2"), ("year", "2025"), ("month", "2"), ("currency", "USD")]),
        ],
    );
    store.seed(
        Entity::RecurringRule,
        vec![
            rec(&[
                ("id", "rr_salary"),
                ("name", "Salary"),
                ("amount", "1,000.00"),
                ("direction", "income"),
                ("frequency", "monthly"),
                ("is_active", "true"),
            ]),
            rec(&[
                ("id", "rr_old"),
                ("name", "Old job"),
                ("amount", "5000"),
                ("direction", "income"),
                ("frequency", "monthly"),
                ("is_active", "false"),
            ]),
        ],
    );
    let mut rows: Vec<Record> = items.iter().map(|(id, v)| item(id, "bp_1", v)).collect();
    rows.push(item("other_plan", "bp_2", "50"));
    store.seed(Entity::BudgetItem, rows);
    store
}

fn stored_amount(store: &MemoryStore, id: &str) -> String {
    store
        .rows(Entity::BudgetItem)
        .into_iter()
        .find(|r| r.get("id").map(String::as_str) == Some(id))
        .and_then(|r| r.get("planned_amount").cloned())
        .unwrap_or_default()
}

fn written_ids(store: &MemoryStore) -> Vec<String> {
    store.write_log().into_iter().map(|(_, id)| id).collect()
}

#[tokio::test]
async fn test_load_scopes_items_to_plan() {
    let store = seeded_store(&[("A", "400"), ("B", "300"), ("C", "300")]);
    let session = BudgetSession::load(&store, None).await.unwrap();

    assert_eq!(session.plan().id, "bp_1");
    assert_eq!(session.items().len(), 3);
    assert_eq!(session.ceiling(), d("1000"));
    assert_eq!(session.state(), SessionState::Idle);

    let other = BudgetSession::load(&store, Some("bp_2")).await.unwrap();
    assert_eq!(other.items().len(), 1);
}

#[tokio::test]
async fn test_unknown_plan() {
    let store = seeded_store(&[]);
    let result = BudgetSession::load(&store, Some("bp_404")).await;
    assert!(matches!(result, Err(FinanceError::PlanNotFound(id)) if id == "bp_404"));
}

#[tokio::test]
async fn test_even_redistribution_committed() {
    let store = seeded_store(&[("A", "400"), ("B", "300"), ("C", "300")]);
    let mut session = BudgetSession::load(&store, None).await.unwrap();

    session.begin().unwrap();
    assert_eq!(session.set_item("A", d("700")).unwrap(), d("700"));
    assert_eq!(session.amount("B"), Some(d("150")));
    assert_eq!(session.amount("C"), Some(d("150")));

    let report = session.commit(&store).await.unwrap();
    assert_eq!(report.written, vec!["A", "B", "C"]);
    assert_eq!(report.unchanged, 0);
    assert_eq!(session.state(), SessionState::Idle);

    assert_eq!(stored_amount(&store, "A"), "700");
    assert_eq!(stored_amount(&store, "B"), "150");
    assert_eq!(stored_amount(&store, "C"), "150");
    assert_eq!(stored_amount(&store, "other_plan"), "50");
    assert_eq!(session.total_allocated(), d("1000"));
}

#[tokio::test]
async fn test_clawback_committed() {
    let store = seeded_store(&[("A", "900"), ("B", "50"), ("C", "50")]);
    let mut session = BudgetSession::load(&store, None).await.unwrap();

    session.begin().unwrap();
    assert_eq!(session.set_item("A", d("1200")).unwrap(), d("1000"));
    session.commit(&store).await.unwrap();

    assert_eq!(stored_amount(&store, "A"), "1000");
    assert_eq!(stored_amount(&store, "B"), "0");
    assert_eq!(stored_amount(&store, "C"), "0");
}

#[tokio::test]
async fn test_reset_then_commit_zeroes_everything() {
    let store = seeded_store(&[("A", "400"), ("B", "300"), ("C", "0")]);
    let mut session = BudgetSession::load(&store, None).await.unwrap();

    session.begin().unwrap();
    session.reset_all().unwrap();
    let report = session.commit(&store).await.unwrap();

    // C already held 0
    assert_eq!(report.written, vec!["A", "B"]);
    assert_eq!(report.unchanged, 1);
    for id in ["A", "B", "C"] {
        assert_eq!(d(&stored_amount(&store, id)), Decimal::ZERO);
    }
}

#[tokio::test]
async fn test_cancel_leaves_store_untouched() {
    let store = seeded_store(&[("A", "400"), ("B", "300"), ("C", "300")]);
    let before = store.rows(Entity::BudgetItem);
    let mut session = BudgetSession::load(&store, None).await.unwrap();

    session.begin().unwrap();
    session.set_item("A", d("950")).unwrap();
    session.set_item("C", d("0")).unwrap();
    session.reset_all().unwrap();
    session.cancel().unwrap();

    assert_eq!(session.state(), SessionState::Idle);
    assert_eq!(session.amount("A"), Some(d("400")));
    assert!(store.write_log().is_empty());
    assert_eq!(store.rows(Entity::BudgetItem), before);
}

#[tokio::test]
async fn test_numeric_comparison_skips_equal_amounts() {
    let store = seeded_store(&[("A", "400.00"), ("B", "$300"), ("C", "300")]);
    let mut session = BudgetSession::load(&store, None).await.unwrap();

    session.begin().unwrap();
    session.set_item("A", d("400")).unwrap();
    session.set_item("B", d("300.001")).unwrap();
    let report = session.commit(&store).await.unwrap();

    assert!(report.written.is_empty());
    assert_eq!(report.unchanged, 3);
    assert!(store.write_log().is_empty());
}

#[tokio::test]
async fn test_partial_commit_failure() {
    let store = seeded_store(&[("A", "400"), ("B", "300"), ("C", "300")]);
    let mut session = BudgetSession::load(&store, None).await.unwrap();

    session.begin().unwrap();
    session.set_item("A", d("700")).unwrap();
    store.fail_writes_after(1);

    let err = session.commit(&store).await.unwrap_err();
    match err {
        FinanceError::CommitFailed {
            failed_id, written, ..
        } => {
            assert_eq!(failed_id, "B");
            assert_eq!(written, vec!["A"]);
        }
        other => panic!("expected CommitFailed, got {:?}", other),
    }
    assert_eq!(session.state(), SessionState::Idle);

    // A landed, B and C were never attempted past the failure
    assert_eq!(written_ids(&store), vec!["A"]);
    assert_eq!(stored_amount(&store, "A"), "700");
    assert_eq!(stored_amount(&store, "B"), "300");
    assert_eq!(stored_amount(&store, "C"), "300");

    // Reloading shows exactly what was persisted
    store.clear_failures();
    let reloaded = BudgetSession::load(&store, None).await.unwrap();
    assert_eq!(reloaded.amount("A"), Some(d("700")));
    assert_eq!(reloaded.amount("B"), Some(d("300")));
    assert_eq!(reloaded.remaining(), d("-300"));
}

#[tokio::test]
async fn test_session_misuse_rejected() {
    let store = seeded_store(&[("A", "400")]);
    let mut session = BudgetSession::load(&store, None).await.unwrap();

    assert!(matches!(
        session.commit(&store).await,
        Err(FinanceError::InvalidTransition { .. })
    ));
    assert!(matches!(
        session.cancel(),
        Err(FinanceError::InvalidTransition { .. })
    ));
    assert!(matches!(
        session.reset_all(),
        Err(FinanceError::NotEditing(_))
    ));

    session.begin().unwrap();
    assert!(matches!(
        session.set_item("other_plan", d("10")),
        Err(FinanceError::UnknownItem(_))
    ));
}

#[tokio::test]
async fn test_ceiling_holds_across_edit_sequence() {
    let store = seeded_store(&[("A", "250"), ("B", "250"), ("C", "250"), ("D", "250")]);
    let mut session = BudgetSession::load(&store, None).await.unwrap();
    session.begin().unwrap();

    let edits = [
        ("A", "333.33"),
        ("B", "999.99"),
        ("C", "0.01"),
        ("D", "512.5"),
        ("A", "1000"),
        ("C", "77.777"),
    ];
    for (id, value) in edits {
        session.set_item(id, d(value)).unwrap();
        assert!(session.total_allocated() <= session.ceiling());
        assert!(session.remaining() >= Decimal::ZERO);
    }
}

#[tokio::test]
async fn test_json_dir_store_round_trip() {
    let temp = TempDir::new().unwrap();
    let store = JsonDirStore::open(temp.path()).await.unwrap();

    let seed = seeded_store(&[("A", "400"), ("B", "300"), ("C", "300")]);
    for entity in [Entity::BudgetPlan, Entity::RecurringRule, Entity::BudgetItem] {
        for row in seed.rows(entity) {
            let id = row["id"].clone();
            store.write_record(entity, &id, row).await.unwrap();
        }
    }

    let mut session = BudgetSession::load(&store, Some("bp_1")).await.unwrap();
    session.begin().unwrap();
    session.set_item("B", d("600")).unwrap();
    let report = session.commit(&store).await.unwrap();
    assert_eq!(report.written, vec!["A", "B", "C"]);

    let reopened = JsonDirStore::open(temp.path()).await.unwrap();
    let reloaded = BudgetSession::load(&reopened, Some("bp_1")).await.unwrap();
    assert_eq!(reloaded.amount("A"), Some(d("250")));
    assert_eq!(reloaded.amount("B"), Some(d("600")));
    assert_eq!(reloaded.amount("C"), Some(d("150")));
    assert_eq!(reloaded.total_allocated(), d("1000"));
}

#[test]
fn test_load_outside_async_test() {
    let store = seeded_store(&[("A", "400")]);
    let session = tokio_test::block_on(BudgetSession::load(&store, None)).unwrap();
    assert_eq!(session.remaining(), d("600"));
}

#[tokio::test]
async fn test_oversized_income_cell_loads() {
    let store = seeded_store(&[("A", "400"), ("B", "300")]);
    store
        .write_record(
            Entity::RecurringRule,
            "rr_lottery",
            rec(&[
                ("id", "rr_lottery"),
                ("name", "Lottery"),
                ("amount", "10,000,000,000,000,000,000,000,000,000"),
                ("direction", "income"),
                ("frequency", "weekly"),
                ("is_active", "true"),
            ]),
        )
        .await
        .unwrap();

    let mut session = BudgetSession::load(&store, None).await.unwrap();
    // the weekly amount cannot be annualized, so only the salary counts
    assert_eq!(session.ceiling(), d("1000"));

    session.begin().unwrap();
    assert_eq!(session.set_item("A", d("700")).unwrap(), d("700"));
    assert_eq!(session.amount("B"), Some(d("300")));
    session.commit(&store).await.unwrap();
    assert_eq!(stored_amount(&store, "A"), "700");
}
