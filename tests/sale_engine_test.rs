// ==========================================
// Sale Engine Integration Tests
// ==========================================
// Create/update flows through the engine over a temp database,
// with the schedule reconciliation that preserves payment history
// across edits.
// ==========================================


use chrono::NaiveDate;
use realty_ledger::domain::{
    BalloonTerms, DealTerms, DownPayment, InstallmentGroup, InstallmentKind, InstallmentStatus,
    SaleStatus,
};
use realty_ledger::engine::{SaleCreation, SaleDraft, SaleEngine};
use realty_ledger::logging;
use realty_ledger::repository::LedgerStore;
use realty_ledger::ImportConfig;
use test_helpers::{create_test_store, seed_registries};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn ocean_view_draft() -> SaleDraft {
    SaleDraft {
        development_id: Some("dev-ocean".to_string()),
        broker_id: "broker-jane".to_string(),
        client_id: Some("client-maria".to_string()),
        unit_number: Some("101".to_string()),
        block: Some("A".to_string()),
        floor: None,
        sale_date: date(2024, 3, 15),
        sale_price: 500_000.0,
        status: SaleStatus::Pending,
        terms: DealTerms {
            signal: Some(10_000.0),
            down_payment: DownPayment::Installments {
                groups: vec![InstallmentGroup {
                    count: 3,
                    amount: 1_000.0,
                }],
            },
            balloon: BalloonTerms::None,
        },
    }
}

async fn create(engine: &SaleEngine, draft: SaleDraft) -> String {
    match engine.create_sale(draft).await.unwrap() {
        SaleCreation::Created { sale_id } => sale_id,
        SaleCreation::Duplicate { existing_sale_id } => {
            panic!("unexpected duplicate of {}", existing_sale_id)
        }
    }
}

#[tokio::test]
async fn test_engine_create_then_duplicate() {
    logging::init_test();
    let (_db, store) = create_test_store().unwrap();
    seed_registries(&store).await.unwrap();
    let engine = SaleEngine::new(store.clone(), ImportConfig::default());

    let sale_id = create(&engine, ocean_view_draft()).await;
    assert!(!sale_id.is_empty());

    // Same draft again lands on the existing sale.
    match engine.create_sale(ocean_view_draft()).await.unwrap() {
        SaleCreation::Duplicate { existing_sale_id } => assert_eq!(existing_sale_id, sale_id),
        SaleCreation::Created { .. } => panic!("duplicate not detected"),
    }
}

#[tokio::test]
async fn test_independent_broker_uses_personal_default() {
    logging::init_test();
    let (_db, store) = create_test_store().unwrap();
    seed_registries(&store).await.unwrap();
    let engine = SaleEngine::new(store.clone(), ImportConfig::default());

    let mut draft = ocean_view_draft();
    draft.development_id = None;
    draft.broker_id = "broker-carlos".to_string();
    let sale_id = create(&engine, draft).await;

    let sale = store.get_sale(&sale_id).await.unwrap().unwrap();
    // External default of 4% with no development role table.
    assert!((sale.commission_factor - 0.04).abs() < 1e-12);
    let allocations = store.list_allocations_by_sale(&sale_id).await.unwrap();
    assert_eq!(allocations.len(), 1);
    assert_eq!(allocations[0].role_name, "Independent Broker");
}

#[tokio::test]
async fn test_update_preserves_paid_installments() {
    logging::init_test();
    let (_db, store) = create_test_store().unwrap();
    seed_registries(&store).await.unwrap();
    let engine = SaleEngine::new(store.clone(), ImportConfig::default());

    let sale_id = create(&engine, ocean_view_draft()).await;

    // Pay the signal.
    let installments = store.list_installments_by_sale(&sale_id).await.unwrap();
    let signal = installments
        .iter()
        .find(|i| i.kind == InstallmentKind::Signal)
        .unwrap();
    store
        .mark_installment_paid(&signal.id, date(2024, 3, 20), None)
        .await
        .unwrap();

    // Edit: add a balloon, keep signal and installments unchanged.
    let mut edited = ocean_view_draft();
    edited.terms.balloon = BalloonTerms::Confirmed {
        groups: vec![InstallmentGroup {
            count: 1,
            amount: 50_000.0,
        }],
    };
    let update = engine.update_sale(&sale_id, edited).await.unwrap();
    assert!(update.needs_review.is_empty());

    let installments = store.list_installments_by_sale(&sale_id).await.unwrap();
    assert_eq!(installments.len(), 5);

    let signal = installments
        .iter()
        .find(|i| i.kind == InstallmentKind::Signal)
        .unwrap();
    assert_eq!(signal.status, InstallmentStatus::Paid);
    assert_eq!(signal.paid_date, Some(date(2024, 3, 20)));

    // A sale with payments never reads as plain pending.
    let sale = store.get_sale(&sale_id).await.unwrap().unwrap();
    assert_eq!(sale.status, SaleStatus::InProgress);
}

#[tokio::test]
async fn test_update_flags_paid_installments_that_changed() {
    logging::init_test();
    let (_db, store) = create_test_store().unwrap();
    seed_registries(&store).await.unwrap();
    let engine = SaleEngine::new(store.clone(), ImportConfig::default());

    let sale_id = create(&engine, ocean_view_draft()).await;

    // Pay installment #1.
    let installments = store.list_installments_by_sale(&sale_id).await.unwrap();
    let first = installments
        .iter()
        .find(|i| i.installment_no == Some(1))
        .unwrap();
    store
        .mark_installment_paid(&first.id, date(2024, 4, 18), None)
        .await
        .unwrap();

    // Edit changes the per-installment amount; the paid entry no
    // longer matches any slot in the new schedule.
    let mut edited = ocean_view_draft();
    edited.terms.down_payment = DownPayment::Installments {
        groups: vec![InstallmentGroup {
            count: 3,
            amount: 1_500.0,
        }],
    };
    let update = engine.update_sale(&sale_id, edited).await.unwrap();

    assert_eq!(update.needs_review.len(), 1);
    assert!((update.needs_review[0].amount - 1_000.0).abs() < 1e-9);

    let installments = store.list_installments_by_sale(&sale_id).await.unwrap();
    assert!(installments
        .iter()
        .filter(|i| i.kind == InstallmentKind::DownPaymentInstallment)
        .all(|i| i.status == InstallmentStatus::Pending));
}

#[tokio::test]
async fn test_update_of_missing_sale_fails() {
    logging::init_test();
    let (_db, store) = create_test_store().unwrap();
    seed_registries(&store).await.unwrap();
    let engine = SaleEngine::new(store.clone(), ImportConfig::default());

    let result = engine.update_sale("no-such-sale", ocean_view_draft()).await;
    assert!(result.is_err());
}
