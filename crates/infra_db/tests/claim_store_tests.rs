//! PgClaimStore against a real PostgreSQL
//!
//! Run with `cargo test -p infra_db -- --ignored` when Docker is available.

use chrono::Duration;

use core_kernel::{PortError, UserId};
use domain_claims::{ClaimChange, ClaimQuery, ClaimStatus, ClaimStore, WriteCondition};
use infra_db::PgClaimStore;
use test_utils::{db_test, ClaimBuilder, FraudFixtures};

db_test!(test_insert_then_get_round_trips, |pool| {
    let store = PgClaimStore::new(pool);
    let claim = ClaimBuilder::new().verified(FraudFixtures::review()).build();

    store.insert(&claim).await.unwrap();

    assert_eq!(store.get(claim.id).await.unwrap(), claim);
});

db_test!(test_duplicate_insert_conflicts, |pool| {
    let store = PgClaimStore::new(pool);
    let claim = ClaimBuilder::new().build();
    store.insert(&claim).await.unwrap();

    let err = store.insert(&claim).await.unwrap_err();
    assert!(err.is_conflict(), "{}", err);
});

db_test!(test_get_missing_claim_is_not_found, |pool| {
    let store = PgClaimStore::new(pool);
    let err = store.get(ClaimBuilder::new().build().id).await.unwrap_err();
    assert!(err.is_not_found());
});

db_test!(test_conditional_update_applies_once, |pool| {
    let store = PgClaimStore::new(pool);
    let pending = ClaimBuilder::new().verified(FraudFixtures::genuine()).build();
    store.insert(&pending).await.unwrap();

    let approved = ClaimBuilder::new().with_id(pending.id).approved().build();
    store
        .update(&approved, ClaimChange::Decision, WriteCondition::status_is(ClaimStatus::UnderReview))
        .await
        .unwrap();

    let rejected = ClaimBuilder::new().with_id(pending.id).rejected("Late filing").build();
    let err = store
        .update(&rejected, ClaimChange::Decision, WriteCondition::status_is(ClaimStatus::UnderReview))
        .await
        .unwrap_err();
    assert!(matches!(err, PortError::Conflict { .. }), "{}", err);

    assert_eq!(store.get(pending.id).await.unwrap().status, ClaimStatus::Approved);
});

db_test!(test_decision_does_not_revert_newer_assessment, |pool| {
    let store = PgClaimStore::new(pool);
    let pending = ClaimBuilder::new().verified(FraudFixtures::genuine()).build();
    store.insert(&pending).await.unwrap();
    let under_review = WriteCondition::status_is(ClaimStatus::UnderReview);

    let rescored = ClaimBuilder::new()
        .with_id(pending.id)
        .verified(FraudFixtures::review())
        .build();
    store
        .update(&rescored, ClaimChange::Assessment, under_review)
        .await
        .unwrap();

    let approved_from_stale_read = ClaimBuilder::new()
        .with_id(pending.id)
        .verified(FraudFixtures::genuine())
        .approved()
        .build();
    store
        .update(&approved_from_stale_read, ClaimChange::Decision, under_review)
        .await
        .unwrap();

    let stored = store.get(pending.id).await.unwrap();
    assert_eq!(stored.status, ClaimStatus::Approved);
    assert_eq!(stored.fraud, Some(FraudFixtures::review()));
    assert_eq!(stored.policy_number, pending.policy_number);
});

db_test!(test_payout_write_requires_empty_payout, |pool| {
    let store = PgClaimStore::new(pool);
    let approved = ClaimBuilder::new().approved().build();
    store.insert(&approved).await.unwrap();

    let first = ClaimBuilder::new()
        .with_id(approved.id)
        .approved()
        .with_payout("000123456789", "SBIN0000001")
        .build();
    store
        .update(&first, ClaimChange::PayoutAccount, WriteCondition::approved_without_payout())
        .await
        .unwrap();

    let second = ClaimBuilder::new()
        .with_id(approved.id)
        .approved()
        .with_payout("999999999999", "HDFC0000002")
        .build();
    let err = store
        .update(&second, ClaimChange::PayoutAccount, WriteCondition::approved_without_payout())
        .await
        .unwrap_err();
    assert!(err.is_conflict());

    let stored = store.get(approved.id).await.unwrap();
    assert_eq!(stored.payout.map(|p| p.account_number().to_string()).as_deref(), Some("000123456789"));
});

db_test!(test_update_of_missing_claim_is_not_found, |pool| {
    let store = PgClaimStore::new(pool);
    let ghost = ClaimBuilder::new().approved().build();
    let err = store
        .update(&ghost, ClaimChange::Decision, WriteCondition::status_is(ClaimStatus::UnderReview))
        .await
        .unwrap_err();
    assert!(err.is_not_found());
});

db_test!(test_check_constraints_refuse_inconsistent_rows, |pool| {
    let store = PgClaimStore::new(pool);
    let mut claim = ClaimBuilder::new().build();
    // rejected without a reason or a review
    claim.status = ClaimStatus::Rejected;
    let err = store.insert(&claim).await.unwrap_err();
    assert!(matches!(err, PortError::Internal { .. }), "{}", err);
});

db_test!(test_list_filters_and_orders_newest_first, |pool| {
    let store = PgClaimStore::new(pool);
    let holder = UserId::new();
    let base = ClaimBuilder::new().build().created_at;

    for hours in 0..3 {
        let claim = ClaimBuilder::new()
            .filed_by(holder)
            .filed_at(base + Duration::hours(hours))
            .build();
        store.insert(&claim).await.unwrap();
    }
    store.insert(&ClaimBuilder::new().filed_by(holder).approved().build()).await.unwrap();
    store.insert(&ClaimBuilder::new().build()).await.unwrap();

    let mine = store.list(ClaimQuery::by_holder(holder)).await.unwrap();
    assert_eq!(mine.len(), 4);
    test_utils::assert_newest_first(&mine);

    let pending = store
        .list(ClaimQuery::by_holder(holder).with_status(Some(ClaimStatus::UnderReview)))
        .await
        .unwrap();
    assert_eq!(pending.len(), 3);

    let page = store
        .list(ClaimQuery::by_holder(holder).paginate(2, 1))
        .await
        .unwrap();
    assert_eq!(page.len(), 2);
    assert_eq!(page[0].id, mine[1].id);
});
