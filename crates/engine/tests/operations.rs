use std::sync::Arc;

use chrono::{Duration, Utc};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};

use engine::{
    DateRange, DepositStatus, DepositUpdate, Engine, EngineError, LogEntryKind, LogFilter, Money,
    NewDeposit, NewOrder, NewRepresentative, NewSubOrder, NewTempOrder, OrderStatus, Period,
    Representative, TempOrderPayment,
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

async fn engine_with_file_db() -> (Engine, DatabaseConnection, std::path::PathBuf) {
    let root = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../target/test_dbs");
    std::fs::create_dir_all(&root).unwrap();

    let path = root.join(format!("operations_{}.db", Uuid::new_v4()));
    let url = format!("sqlite:{}?mode=rwc", path.display());

    let db = Database::connect(&url).await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();

    (engine, db, path)
}

async fn representative(engine: &Engine, name: &str) -> Representative {
    engine
        .add_representative(NewRepresentative::new(name))
        .await
        .unwrap()
}

/// Walk an order up to the courier so it can be delivered.
async fn out_for_delivery(engine: &Engine, order_id: Uuid) {
    for status in [
        OrderStatus::Processed,
        OrderStatus::Ready,
        OrderStatus::Shipped,
        OrderStatus::ArrivedTobruk,
        OrderStatus::OutForDelivery,
    ] {
        engine.update_order_status(order_id, status).await.unwrap();
    }
}

#[tokio::test]
async fn representative_names_are_unique() {
    let (engine, _db) = engine_with_db().await;
    representative(&engine, "Omar").await;

    let err = engine
        .add_representative(NewRepresentative::new("OMAR"))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::ExistingKey(_)));

    representative(&engine, "Ali").await;
    let names: Vec<String> = engine
        .representatives()
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.name)
        .collect();
    assert_eq!(names, vec!["Ali", "Omar"]);
}

#[tokio::test]
async fn order_moves_through_the_pipeline() {
    let (engine, _db) = engine_with_db().await;
    let order = engine
        .create_order(
            NewOrder::new("Salem", Money::new(1_000))
                .tracking_number("TRK-1")
                .down_payment(Money::new(400)),
        )
        .await
        .unwrap();
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.remaining_amount, Money::new(600));

    for status in [
        OrderStatus::Processed,
        OrderStatus::Ready,
        OrderStatus::Shipped,
        OrderStatus::ArrivedBenghazi,
        OrderStatus::OutForDelivery,
    ] {
        let moved = engine.update_order_status(order.id, status).await.unwrap();
        assert_eq!(moved.status, status);
        assert_eq!(moved.delivery_date, None);
    }

    let err = engine
        .update_order_status(order.id, OrderStatus::Pending)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidTransition(_)));

    let delivered = engine
        .update_order_status(order.id, OrderStatus::Delivered)
        .await
        .unwrap();
    assert!(delivered.delivery_date.is_some());

    let err = engine
        .update_order_status(order.id, OrderStatus::Cancelled)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidTransition(_)));
    assert_eq!(
        engine.order(order.id).await.unwrap().status,
        OrderStatus::Delivered
    );
}

#[tokio::test]
async fn invalid_orders_are_rejected() {
    let (engine, _db) = engine_with_db().await;

    let err = engine
        .create_order(NewOrder::new("Salem", Money::new(-1)))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));

    let err = engine
        .create_order(NewOrder::new("Salem", Money::new(100)).down_payment(Money::new(101)))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));

    let err = engine
        .create_order(NewOrder::new("Salem", Money::new(100)).representative(Uuid::new_v4()))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));

    let err = engine.order(Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
    assert!(engine.orders().await.unwrap().is_empty());
}

#[tokio::test]
async fn representative_payment_delivers_and_clears_the_order() {
    let (engine, _db) = engine_with_db().await;
    let rep = representative(&engine, "Omar").await;
    let order = engine
        .create_order(NewOrder::new("Salem", Money::new(500)))
        .await
        .unwrap();

    let err = engine
        .record_representative_payment(order.id, Money::new(500))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidInput(_)));

    let assigned = engine
        .assign_order_representative(order.id, Some(rep.id))
        .await
        .unwrap();
    assert_eq!(assigned.representative_name.as_deref(), Some("Omar"));

    let err = engine
        .record_representative_payment(order.id, Money::new(-5))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));

    let err = engine
        .record_representative_payment(order.id, Money::new(450))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidTransition(_)));

    out_for_delivery(&engine, order.id).await;
    let paid = engine
        .record_representative_payment(order.id, Money::new(450))
        .await
        .unwrap();
    assert_eq!(paid.status, OrderStatus::Delivered);
    assert_eq!(paid.collected_amount, Some(Money::new(450)));
    assert_eq!(paid.remaining_amount, Money::ZERO);
    assert!(paid.delivery_date.is_some());

    let err = engine
        .record_representative_payment(order.id, Money::new(450))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidTransition(_)));

    let err = engine
        .assign_order_representative(order.id, None)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidInput(_)));

    let stored = engine.order(order.id).await.unwrap();
    assert_eq!(stored.collected_amount, Some(Money::new(450)));
    assert_eq!(stored.representative_id, Some(rep.id));
    assert_eq!(engine.orders_by_representative(rep.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn deposit_statuses_are_final_once_left_pending() {
    let (engine, _db) = engine_with_db().await;

    let err = engine
        .add_deposit(NewDeposit::new("Huda", Money::ZERO))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));

    let collected = engine
        .add_deposit(NewDeposit::new("Huda", Money::new(300)).description("advance"))
        .await
        .unwrap();
    let cancelled = engine
        .add_deposit(NewDeposit::new("Salem", Money::new(100)))
        .await
        .unwrap();
    assert_eq!(collected.status, DepositStatus::Pending);
    assert_eq!(collected.collected_date, None);

    let done = engine
        .update_deposit_status(collected.id, DepositStatus::Collected)
        .await
        .unwrap();
    assert!(done.collected_date.is_some());

    let dropped = engine
        .update_deposit_status(cancelled.id, DepositStatus::Cancelled)
        .await
        .unwrap();
    assert_eq!(dropped.collected_date, None);

    for (id, next) in [
        (collected.id, DepositStatus::Pending),
        (collected.id, DepositStatus::Cancelled),
        (cancelled.id, DepositStatus::Collected),
    ] {
        let err = engine.update_deposit_status(id, next).await.unwrap_err();
        assert!(matches!(err, EngineError::InvalidTransition(_)));
    }

    let err = engine
        .update_deposit(
            collected.id,
            DepositUpdate {
                amount: Some(Money::new(1)),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidInput(_)));
    assert_eq!(
        engine.deposit(collected.id).await.unwrap().amount,
        Money::new(300)
    );
}

#[tokio::test]
async fn pending_deposits_can_be_edited_and_deleted() {
    let (engine, _db) = engine_with_db().await;
    let rep = representative(&engine, "Omar").await;
    let deposit = engine
        .add_deposit(NewDeposit::new("Huda", Money::new(300)))
        .await
        .unwrap();

    let edited = engine
        .update_deposit(
            deposit.id,
            DepositUpdate {
                customer_name: Some("Huda A.".to_string()),
                amount: Some(Money::new(350)),
                representative_id: Some(Some(rep.id)),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(edited.customer_name, "Huda A.");
    assert_eq!(edited.amount, Money::new(350));
    assert_eq!(edited.representative_name.as_deref(), Some("Omar"));
    assert_eq!(edited.status, DepositStatus::Pending);

    let cleared = engine
        .update_deposit(
            deposit.id,
            DepositUpdate {
                representative_id: Some(None),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(cleared.representative_id, None);
    assert_eq!(cleared.representative_name, None);

    let err = engine
        .update_deposit(
            deposit.id,
            DepositUpdate {
                amount: Some(Money::new(-1)),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));

    engine.delete_deposit(deposit.id).await.unwrap();
    let err = engine.delete_deposit(deposit.id).await.unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
    assert!(engine.deposits().await.unwrap().is_empty());
}

#[tokio::test]
async fn only_the_assigned_representative_confirms_a_deposit() {
    let (engine, _db) = engine_with_db().await;
    let omar = representative(&engine, "Omar").await;
    let ali = representative(&engine, "Ali").await;

    let assigned = engine
        .add_deposit(NewDeposit::new("Huda", Money::new(300)).representative(omar.id))
        .await
        .unwrap();
    let err = engine
        .confirm_deposit_collection(assigned.id, ali.id)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidInput(_)));
    assert_eq!(
        engine.deposit(assigned.id).await.unwrap().status,
        DepositStatus::Pending
    );

    let confirmed = engine
        .confirm_deposit_collection(assigned.id, omar.id)
        .await
        .unwrap();
    assert_eq!(confirmed.status, DepositStatus::Collected);
    assert!(confirmed.collected_date.is_some());

    let unassigned = engine
        .add_deposit(NewDeposit::new("Salem", Money::new(80)))
        .await
        .unwrap();
    let taken = engine
        .confirm_deposit_collection(unassigned.id, ali.id)
        .await
        .unwrap();
    assert_eq!(taken.representative_id, Some(ali.id));
    assert_eq!(taken.representative_name.as_deref(), Some("Ali"));

    let err = engine
        .confirm_deposit_collection(unassigned.id, ali.id)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidTransition(_)));

    let err = engine
        .confirm_deposit_collection(unassigned.id, Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));

    assert_eq!(engine.deposits_by_representative(ali.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn financial_log_summary_matches_the_rows_shown() {
    let (engine, db) = engine_with_db().await;
    let rep = representative(&engine, "Omar").await;

    let order = engine
        .create_order(NewOrder::new("Salem", Money::new(50)).representative(rep.id))
        .await
        .unwrap();
    out_for_delivery(&engine, order.id).await;
    engine
        .record_representative_payment(order.id, Money::new(50))
        .await
        .unwrap();

    let delivered_on = Utc::now() - Duration::days(3);
    let backend = db.get_database_backend();
    db.execute(Statement::from_sql_and_values(
        backend,
        "UPDATE orders SET delivery_date = ? WHERE id = ?",
        vec![delivered_on.into(), order.id.to_string().into()],
    ))
    .await
    .unwrap();

    let deposit = engine
        .add_deposit(NewDeposit::new("Huda", Money::new(30)).representative(rep.id))
        .await
        .unwrap();
    engine
        .confirm_deposit_collection(deposit.id, rep.id)
        .await
        .unwrap();

    // Still open, never part of the log.
    engine
        .create_order(NewOrder::new("Late", Money::new(999)).representative(rep.id))
        .await
        .unwrap();
    engine
        .add_deposit(NewDeposit::new("Late", Money::new(999)).representative(rep.id))
        .await
        .unwrap();

    let today = Utc::now().date_naive();
    let all = engine
        .representative_financial_log(rep.id, &LogFilter::default(), today)
        .await
        .unwrap();
    let kinds: Vec<LogEntryKind> = all.rows.iter().map(|r| r.kind).collect();
    assert_eq!(kinds, vec![LogEntryKind::Deposit, LogEntryKind::Order]);
    assert_eq!(all.rows[0].amount, Money::new(30));
    assert_eq!(all.rows[1].amount, Money::new(50));
    assert_eq!(all.summary.total_collected, Money::new(80));
    assert_eq!(all.summary.order_count, 1);
    assert_eq!(all.summary.deposit_count, 1);

    let delivery_day = LogFilter {
        period: Period::Custom {
            range: DateRange::day(delivered_on.date_naive()),
        },
        text: None,
    };
    let log = engine
        .representative_financial_log(rep.id, &delivery_day, today)
        .await
        .unwrap();
    assert_eq!(log.rows.len(), 1);
    assert_eq!(log.rows[0].kind, LogEntryKind::Order);
    assert_eq!(log.summary.total_collected, Money::new(50));

    let daily = LogFilter {
        period: Period::Daily,
        text: None,
    };
    let log = engine
        .representative_financial_log(rep.id, &daily, today)
        .await
        .unwrap();
    assert_eq!(log.rows.len(), 1);
    assert_eq!(log.summary.deposit_total, Money::new(30));
    assert_eq!(log.summary.order_total, Money::ZERO);

    let by_name = LogFilter {
        period: Period::Weekly,
        text: Some("SALEM".to_string()),
    };
    let log = engine
        .representative_financial_log(rep.id, &by_name, today)
        .await
        .unwrap();
    let shown: Money = log.rows.iter().map(|r| r.amount).sum();
    assert_eq!(log.summary.total_collected, shown);
    assert_eq!(shown, Money::new(50));
}

#[tokio::test]
async fn summary_splits_open_balances_from_collected_cash() {
    let (engine, _db) = engine_with_db().await;
    let rep = representative(&engine, "Omar").await;

    let open = engine
        .create_order(
            NewOrder::new("Open", Money::new(700))
                .down_payment(Money::new(200))
                .representative(rep.id),
        )
        .await
        .unwrap();
    let delivered = engine
        .create_order(NewOrder::new("Paid", Money::new(400)).representative(rep.id))
        .await
        .unwrap();
    out_for_delivery(&engine, delivered.id).await;
    engine
        .record_representative_payment(delivered.id, Money::new(400))
        .await
        .unwrap();
    let cancelled = engine
        .create_order(NewOrder::new("Gone", Money::new(900)).representative(rep.id))
        .await
        .unwrap();
    engine
        .update_order_status(cancelled.id, OrderStatus::Cancelled)
        .await
        .unwrap();

    let batch = engine
        .create_temp_order(
            NewTempOrder::new("INV-S")
                .sub_order(NewSubOrder::new("A", Money::new(120)).representative(rep.id))
                .sub_order(NewSubOrder::new("B", Money::new(60)).representative(rep.id))
                .sub_order(NewSubOrder::new("C", Money::new(10)).representative(rep.id)),
        )
        .await
        .unwrap();
    engine
        .apply_payment(TempOrderPayment::new(
            batch.id,
            batch.sub_orders[0].id,
            Money::new(20),
            Utc::now(),
        ))
        .await
        .unwrap();
    engine
        .apply_payment(TempOrderPayment::new(
            batch.id,
            batch.sub_orders[1].id,
            Money::new(60),
            Utc::now(),
        ))
        .await
        .unwrap();
    engine
        .update_sub_order_status(batch.sub_orders[2].id, OrderStatus::Cancelled)
        .await
        .unwrap();

    engine
        .add_deposit(NewDeposit::new("Pending", Money::new(75)).representative(rep.id))
        .await
        .unwrap();
    let taken = engine
        .add_deposit(NewDeposit::new("Taken", Money::new(25)).representative(rep.id))
        .await
        .unwrap();
    engine
        .confirm_deposit_collection(taken.id, rep.id)
        .await
        .unwrap();

    let summary = engine.representative_summary(rep.id).await.unwrap();
    assert_eq!(summary.pending_orders_amount, open.remaining_amount);
    assert_eq!(summary.pending_orders_amount, Money::new(500));
    assert_eq!(summary.pending_sub_orders_amount, Money::new(100));
    assert_eq!(summary.pending_deposits_amount, Money::new(75));
    assert_eq!(summary.total_collected, Money::new(425));

    let err = engine
        .representative_summary(Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn racing_status_changes_settle_on_a_single_outcome() {
    let (engine, db, path) = engine_with_file_db().await;
    let engine = Arc::new(engine);

    let deposit = engine
        .add_deposit(NewDeposit::new("Huda", Money::new(300)))
        .await
        .unwrap();
    let deposit_id = deposit.id;
    let mut handles = Vec::new();
    for next in [DepositStatus::Collected, DepositStatus::Cancelled] {
        let engine = Arc::clone(&engine);
        handles.push(tokio::spawn(async move {
            engine
                .update_deposit_status(deposit_id, next)
                .await
                .map(|d| d.status)
        }));
    }
    let mut winners = Vec::new();
    for handle in handles {
        if let Ok(status) = handle.await.unwrap() {
            winners.push(status);
        }
    }
    assert!(winners.len() <= 1);
    let stored = engine.deposit(deposit.id).await.unwrap();
    assert_eq!(
        stored.status,
        winners.first().copied().unwrap_or(DepositStatus::Pending)
    );

    let rep = representative(&engine, "Omar").await;
    let order = engine
        .create_order(NewOrder::new("Salem", Money::new(500)).representative(rep.id))
        .await
        .unwrap();
    out_for_delivery(&engine, order.id).await;
    let order_id = order.id;
    let mut handles = Vec::new();
    for amount in [500, 450] {
        let engine = Arc::clone(&engine);
        handles.push(tokio::spawn(async move {
            engine
                .record_representative_payment(order_id, Money::new(amount))
                .await
                .map(|o| o.collected_amount)
        }));
    }
    let mut collected = Vec::new();
    for handle in handles {
        if let Ok(amount) = handle.await.unwrap() {
            collected.push(amount);
        }
    }
    assert!(collected.len() <= 1);
    let stored = engine.order(order.id).await.unwrap();
    match collected.first() {
        Some(amount) => {
            assert_eq!(stored.status, OrderStatus::Delivered);
            assert_eq!(stored.collected_amount, *amount);
        }
        None => assert_eq!(stored.status, OrderStatus::OutForDelivery),
    }

    drop(engine);
    drop(db);
    let _ = std::fs::remove_file(path);
}
