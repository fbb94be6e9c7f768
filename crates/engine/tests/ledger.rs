use chrono::{Duration, TimeZone, Utc};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};

use engine::{
    AccountType, DateRange, Engine, EngineError, LedgerFilter, Money, NewCreditor,
    NewExternalDebt,
};
use migration::MigratorTrait;
use uuid::Uuid;

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    (engine, db)
}

async fn engine_with_file_db() -> (Engine, DatabaseConnection, String, std::path::PathBuf) {
    let root = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../target/test_dbs");
    std::fs::create_dir_all(&root).unwrap();

    let path = root.join(format!("ledger_{}.db", Uuid::new_v4()));
    let url = format!("sqlite:{}?mode=rwc", path.display());

    let db = Database::connect(&url).await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();

    (engine, db, url, path)
}

#[tokio::test]
async fn opening_balance_is_written_as_a_cash_entry() {
    let (engine, _db) = engine_with_db().await;

    let creditor = engine
        .add_creditor(NewCreditor::new("Al Noor Trading"), Money::new(150_000))
        .await
        .unwrap();
    assert_eq!(creditor.total_debt, Money::new(150_000));

    let entries = engine.external_debts_for(creditor.id).await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].amount, Money::new(150_000));
    assert_eq!(entries[0].account_type, AccountType::Cash);
    assert_eq!(entries[0].notes, "opening balance");

    let stored = engine.creditor(creditor.id).await.unwrap();
    assert_eq!(stored.total_debt, Money::new(150_000));
}

#[tokio::test]
async fn creditor_names_are_unique_ignoring_case() {
    let (engine, _db) = engine_with_db().await;

    engine
        .add_creditor(NewCreditor::new("Benghazi Freight"), Money::ZERO)
        .await
        .unwrap();
    let err = engine
        .add_creditor(NewCreditor::new("  benghazi FREIGHT "), Money::ZERO)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::ExistingKey(_)));

    let err = engine
        .add_creditor(NewCreditor::new("   "), Money::ZERO)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidInput(_)));
    assert_eq!(engine.creditors().await.unwrap().len(), 1);
}

#[tokio::test]
async fn cached_total_tracks_entries_across_adds_and_deletes() {
    let (engine, _db) = engine_with_db().await;
    let creditor = engine
        .add_creditor(NewCreditor::new("Supplier"), Money::ZERO)
        .await
        .unwrap();
    let now = Utc::now();

    engine
        .add_external_debt(NewExternalDebt::new(creditor.id, Money::new(500), now))
        .await
        .unwrap();
    let payment = engine
        .add_external_debt(
            NewExternalDebt::new(creditor.id, Money::new(-200), now)
                .account_type(AccountType::Bank)
                .notes("bank transfer"),
        )
        .await
        .unwrap();
    engine
        .add_external_debt(
            NewExternalDebt::new(creditor.id, Money::new(50), now).account_type(AccountType::Usd),
        )
        .await
        .unwrap();
    assert_eq!(
        engine.creditor(creditor.id).await.unwrap().total_debt,
        Money::new(350)
    );

    let deleted = engine.delete_external_debt(payment.id).await.unwrap();
    assert_eq!(deleted.amount, Money::new(-200));

    let stored = engine.creditor(creditor.id).await.unwrap();
    assert_eq!(stored.total_debt, Money::new(550));

    let balances = engine.creditor_balance(creditor.id).await.unwrap();
    assert_eq!(balances.cash, Money::new(500));
    assert_eq!(balances.bank, Money::ZERO);
    assert_eq!(balances.usd, Money::new(50));
    assert_eq!(balances.total, stored.total_debt);

    let err = engine.delete_external_debt(payment.id).await.unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
}

#[tokio::test]
async fn deleting_the_first_entry_leaves_the_later_payment() {
    let (engine, _db) = engine_with_db().await;
    let creditor = engine
        .add_creditor(NewCreditor::new("C"), Money::ZERO)
        .await
        .unwrap();
    assert!(engine.external_debts_for(creditor.id).await.unwrap().is_empty());

    let first = engine
        .add_external_debt(NewExternalDebt::new(creditor.id, Money::new(100), Utc::now()))
        .await
        .unwrap();
    assert_eq!(
        engine.creditor_balance(creditor.id).await.unwrap().cash,
        Money::new(100)
    );

    engine
        .add_external_debt(NewExternalDebt::new(creditor.id, Money::new(-40), Utc::now()))
        .await
        .unwrap();
    assert_eq!(
        engine.creditor(creditor.id).await.unwrap().total_debt,
        Money::new(60)
    );

    engine.delete_external_debt(first.id).await.unwrap();
    let balances = engine.creditor_balance(creditor.id).await.unwrap();
    assert_eq!(balances.cash, Money::new(-40));
    assert_eq!(
        engine.creditor(creditor.id).await.unwrap().total_debt,
        Money::new(-40)
    );
}

#[tokio::test]
async fn rejected_entries_write_nothing() {
    let (engine, _db) = engine_with_db().await;
    let creditor = engine
        .add_creditor(NewCreditor::new("Supplier"), Money::new(100))
        .await
        .unwrap();

    let err = engine
        .add_external_debt(NewExternalDebt::new(creditor.id, Money::ZERO, Utc::now()))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));

    let err = engine
        .add_external_debt(NewExternalDebt::new(
            Uuid::new_v4(),
            Money::new(10),
            Utc::now(),
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));

    assert_eq!(engine.all_external_debts().await.unwrap().len(), 1);
    assert_eq!(
        engine.creditor(creditor.id).await.unwrap().total_debt,
        Money::new(100)
    );
}

#[tokio::test]
async fn amounts_and_totals_stay_within_the_money_limit() {
    let (engine, _db) = engine_with_db().await;

    let err = engine
        .add_creditor(NewCreditor::new("Too Big"), Money::new(i64::MAX))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));
    assert!(engine.creditors().await.unwrap().is_empty());

    let creditor = engine
        .add_creditor(NewCreditor::new("Wholesaler"), Money::ZERO)
        .await
        .unwrap();
    for minor in [i64::MAX / 2 + 1, i64::MIN] {
        let err = engine
            .add_external_debt(NewExternalDebt::new(
                creditor.id,
                Money::new(minor),
                Utc::now(),
            ))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidAmount(_)));
    }

    let top = engine
        .add_external_debt(NewExternalDebt::new(creditor.id, Money::MAX, Utc::now()))
        .await
        .unwrap();
    let err = engine
        .add_external_debt(NewExternalDebt::new(
            creditor.id,
            Money::new(1),
            Utc::now(),
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));

    // the rejected entry rolled back with its total update
    assert_eq!(engine.external_debts_for(creditor.id).await.unwrap().len(), 1);
    assert_eq!(engine.creditor(creditor.id).await.unwrap().total_debt, Money::MAX);
    assert_eq!(engine.creditors().await.unwrap().len(), 1);
    assert_eq!(
        engine.creditor_balance(creditor.id).await.unwrap().cash,
        Money::MAX
    );
    assert_eq!(
        engine.recompute_creditor_total(creditor.id).await.unwrap(),
        Money::MAX
    );

    engine.delete_external_debt(top.id).await.unwrap();
    assert_eq!(engine.creditor(creditor.id).await.unwrap().total_debt, Money::ZERO);
}

#[tokio::test]
async fn rename_keeps_total_and_entry_snapshots() {
    let (engine, _db) = engine_with_db().await;
    let creditor = engine
        .add_creditor(NewCreditor::new("Old Name"), Money::new(70))
        .await
        .unwrap();

    let renamed = engine
        .update_creditor(
            creditor.id,
            engine::CreditorUpdate {
                name: Some("New Name".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(renamed.name, "New Name");
    assert_eq!(renamed.total_debt, Money::new(70));

    let entries = engine.external_debts_for(creditor.id).await.unwrap();
    assert_eq!(entries[0].creditor_name, "Old Name");
}

#[tokio::test]
async fn deleting_a_creditor_removes_its_ledger() {
    let (engine, _db) = engine_with_db().await;
    let keep = engine
        .add_creditor(NewCreditor::new("Keep"), Money::new(10))
        .await
        .unwrap();
    let gone = engine
        .add_creditor(NewCreditor::new("Gone"), Money::new(20))
        .await
        .unwrap();

    engine.delete_creditor(gone.id).await.unwrap();

    let entries = engine.all_external_debts().await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].creditor_id, keep.id);
    assert!(matches!(
        engine.creditor(gone.id).await.unwrap_err(),
        EngineError::KeyNotFound(_)
    ));
}

#[tokio::test]
async fn recompute_repairs_a_drifted_cache() {
    let (engine, db) = engine_with_db().await;
    let creditor = engine
        .add_creditor(NewCreditor::new("Drift"), Money::new(300))
        .await
        .unwrap();
    engine
        .add_external_debt(NewExternalDebt::new(
            creditor.id,
            Money::new(-100),
            Utc::now(),
        ))
        .await
        .unwrap();

    let backend = db.get_database_backend();
    db.execute(Statement::from_sql_and_values(
        backend,
        "UPDATE creditors SET total_debt_minor = ? WHERE id = ?",
        vec![9_999_i64.into(), creditor.id.to_string().into()],
    ))
    .await
    .unwrap();
    assert_eq!(
        engine.creditor(creditor.id).await.unwrap().total_debt,
        Money::new(9_999)
    );

    let total = engine.recompute_creditor_total(creditor.id).await.unwrap();
    assert_eq!(total, Money::new(200));
    assert_eq!(
        engine.creditor(creditor.id).await.unwrap().total_debt,
        Money::new(200)
    );
}

#[tokio::test]
async fn creditor_report_totals_describe_the_filtered_rows() {
    let (engine, _db) = engine_with_db().await;
    let first = engine
        .add_creditor(NewCreditor::new("Misrata Cargo"), Money::ZERO)
        .await
        .unwrap();
    let second = engine
        .add_creditor(NewCreditor::new("Tripoli Imports"), Money::ZERO)
        .await
        .unwrap();

    let march = |day| Utc.with_ymd_and_hms(2024, 3, day, 12, 0, 0).unwrap();
    for (creditor, amount, account, day) in [
        (first.id, 1_000, AccountType::Cash, 1),
        (first.id, -400, AccountType::Cash, 5),
        (first.id, 250, AccountType::Bank, 5),
        (second.id, 800, AccountType::Usd, 9),
        (second.id, -800, AccountType::Bank, 10),
    ] {
        engine
            .add_external_debt(
                NewExternalDebt::new(creditor, Money::new(amount), march(day))
                    .account_type(account),
            )
            .await
            .unwrap();
    }

    let all = engine
        .creditor_report(&LedgerFilter::default())
        .await
        .unwrap();
    assert_eq!(all.rows.len(), 5);
    assert_eq!(all.total.net, Money::new(850));
    assert_eq!(all.total.debits, Money::new(2_050));
    assert_eq!(all.total.credits, Money::new(1_200));
    assert_eq!(all.cash.net, Money::new(600));
    assert!(all.rows.windows(2).all(|w| w[0].date >= w[1].date));

    let filters = [
        LedgerFilter {
            range: Some(DateRange::day(march(5).date_naive())),
            ..Default::default()
        },
        LedgerFilter {
            account_type: Some(AccountType::Bank),
            ..Default::default()
        },
        LedgerFilter {
            text: Some("tripoli".to_string()),
            ..Default::default()
        },
        LedgerFilter {
            range: Some(
                DateRange::new(march(1).date_naive(), march(9).date_naive()).unwrap(),
            ),
            account_type: Some(AccountType::Cash),
            text: None,
        },
    ];
    for filter in &filters {
        let report = engine.creditor_report(filter).await.unwrap();
        let shown: Money = report.rows.iter().map(|r| r.amount).sum();
        assert_eq!(report.total.net, shown);
        assert_eq!(
            report.cash.net + report.bank.net + report.usd.net,
            report.total.net
        );
    }

    let bank = engine.creditor_report(&filters[1]).await.unwrap();
    assert_eq!(bank.rows.len(), 2);
    assert_eq!(bank.total.net, Money::new(-550));

    let tripoli = engine.creditor_report(&filters[2]).await.unwrap();
    assert_eq!(tripoli.rows.len(), 2);
    assert_eq!(tripoli.total.net, Money::ZERO);
}

#[tokio::test]
async fn totals_survive_a_reconnect() {
    let (engine, db, url, path) = engine_with_file_db().await;

    let creditor = engine
        .add_creditor(NewCreditor::new("Persisted"), Money::new(1_200))
        .await
        .unwrap();
    engine
        .add_external_debt(NewExternalDebt::new(
            creditor.id,
            Money::new(-200),
            Utc::now() - Duration::days(1),
        ))
        .await
        .unwrap();

    drop(engine);
    drop(db);

    let db2 = Database::connect(&url).await.unwrap();
    let engine2 = Engine::builder().database(db2.clone()).build().await.unwrap();

    let stored = engine2.creditor(creditor.id).await.unwrap();
    assert_eq!(stored.total_debt, Money::new(1_000));
    assert_eq!(
        engine2.creditor_balance(creditor.id).await.unwrap().total,
        Money::new(1_000)
    );

    drop(db2);
    let _ = std::fs::remove_file(path);
}
