use chrono::Duration;

use buzzer_entry_code::domain::types::{CodeRecord, CodeUse, RequestContext};
use buzzer_entry_code::error::EntryCodeServiceError;
use buzzer_entry_code::usecase::validate::ValidateEntryCodeUseCase;
use buzzer_testing::event::TEST_ADDRESS;

use crate::helpers::{InMemoryCodeStore, code, now};

fn ctx(entry_code: u64, at: chrono::DateTime<chrono::Utc>) -> RequestContext {
    RequestContext {
        entry_code,
        contact_address: TEST_ADDRESS.to_owned(),
        received_at: at,
    }
}

#[tokio::test]
async fn should_reject_inactive_code_regardless_of_expiry() {
    for expires_at in [None, Some(now() + Duration::days(30))] {
        let store = InMemoryCodeStore::new(vec![CodeRecord {
            active: false,
            expires_at,
            ..code(1234, false)
        }]);
        let uc = ValidateEntryCodeUseCase { codes: store };

        let result = uc.execute(&ctx(1234, now())).await;

        assert!(
            matches!(result, Err(EntryCodeServiceError::InvalidCode)),
            "expected InvalidCode for expiry {expires_at:?}, got {result:?}"
        );
    }
}

#[tokio::test]
async fn should_reject_expired_code() {
    let store = InMemoryCodeStore::new(vec![CodeRecord {
        expires_at: Some(now() - Duration::seconds(1)),
        ..code(1234, false)
    }]);
    let uc = ValidateEntryCodeUseCase { codes: store };

    let result = uc.execute(&ctx(1234, now())).await;

    assert!(matches!(result, Err(EntryCodeServiceError::InvalidCode)));
}

#[tokio::test]
async fn should_reject_unknown_code_or_address() {
    let store = InMemoryCodeStore::new(vec![code(1234, false)]);
    let uc = ValidateEntryCodeUseCase { codes: store };

    let wrong_code = uc.execute(&ctx(4321, now())).await;
    let wrong_address = uc
        .execute(&RequestContext {
            contact_address: "+15550000000".to_owned(),
            ..ctx(1234, now())
        })
        .await;

    assert!(matches!(wrong_code, Err(EntryCodeServiceError::InvalidCode)));
    assert!(matches!(wrong_address, Err(EntryCodeServiceError::InvalidCode)));
}

#[tokio::test]
async fn should_accept_code_expiring_exactly_now() {
    let store = InMemoryCodeStore::new(vec![CodeRecord {
        expires_at: Some(now()),
        ..code(1234, false)
    }]);
    let uc = ValidateEntryCodeUseCase { codes: store };

    assert_eq!(uc.execute(&ctx(1234, now())).await.unwrap(), CodeUse::Reusable);
}

#[tokio::test]
async fn should_accept_reusable_code_without_touching_it() {
    let original = CodeRecord {
        expires_at: Some(now() + Duration::days(7)),
        ..code(1234, false)
    };
    let store = InMemoryCodeStore::new(vec![original.clone()]);
    let uc = ValidateEntryCodeUseCase {
        codes: store.clone(),
    };

    let result = uc.execute(&ctx(1234, now())).await.unwrap();

    assert_eq!(result, CodeUse::Reusable);
    assert_eq!(store.get(1234, TEST_ADDRESS), Some(original));
    assert_eq!(store.applied_writes(), 0);
}

#[tokio::test]
async fn should_consume_single_use_code_with_grace_window() {
    let store = InMemoryCodeStore::new(vec![code(1234, true)]);
    let uc = ValidateEntryCodeUseCase {
        codes: store.clone(),
    };

    let result = uc.execute(&ctx(1234, now())).await.unwrap();

    let expected_expiry = now() + Duration::minutes(5);
    assert_eq!(
        result,
        CodeUse::Consumed {
            expires_at: expected_expiry
        }
    );
    let stored = store.get(1234, TEST_ADDRESS).unwrap();
    assert_eq!(stored.expires_at, Some(expected_expiry));
    assert!(stored.active, "consumption must not deactivate the record");
    assert_eq!(store.applied_writes(), 1);
}

#[tokio::test]
async fn should_tighten_distant_expiry_of_single_use_code() {
    let store = InMemoryCodeStore::new(vec![CodeRecord {
        expires_at: Some(now() + Duration::days(1)),
        ..code(1234, true)
    }]);
    let uc = ValidateEntryCodeUseCase {
        codes: store.clone(),
    };

    uc.execute(&ctx(1234, now())).await.unwrap();

    assert_eq!(
        store.get(1234, TEST_ADDRESS).unwrap().expires_at,
        Some(now() + Duration::minutes(5))
    );
}

#[tokio::test]
async fn should_not_extend_expiry_that_is_already_sooner() {
    let soon = now() + Duration::minutes(2);
    let store = InMemoryCodeStore::new(vec![CodeRecord {
        expires_at: Some(soon),
        ..code(1234, true)
    }]);
    let uc = ValidateEntryCodeUseCase {
        codes: store.clone(),
    };

    let result = uc.execute(&ctx(1234, now())).await.unwrap();

    assert_eq!(result, CodeUse::AlreadyPending);
    assert_eq!(store.get(1234, TEST_ADDRESS).unwrap().expires_at, Some(soon));
    assert_eq!(store.applied_writes(), 0);
}

#[tokio::test]
async fn should_accept_consumed_code_again_within_grace_window_only() {
    let store = InMemoryCodeStore::new(vec![code(1234, true)]);
    let uc = ValidateEntryCodeUseCase {
        codes: store.clone(),
    };

    uc.execute(&ctx(1234, now())).await.unwrap();
    let within = uc
        .execute(&ctx(1234, now() + Duration::minutes(4)))
        .await
        .unwrap();
    let after = uc.execute(&ctx(1234, now() + Duration::minutes(6))).await;

    assert_eq!(within, CodeUse::AlreadyPending);
    assert!(matches!(after, Err(EntryCodeServiceError::InvalidCode)));
    assert_eq!(store.applied_writes(), 1);
}

#[tokio::test]
async fn should_accept_both_racers_and_consume_once() {
    let first = now();
    let second = now() + Duration::seconds(1);
    // Both reads see the unused code before either write lands.
    let store = InMemoryCodeStore::new(vec![code(1234, true)])
        .with_read_barrier(2)
        .with_write_order(vec![
            first + Duration::minutes(5),
            second + Duration::minutes(5),
        ]);
    let uc = ValidateEntryCodeUseCase {
        codes: store.clone(),
    };

    let (ctx_a, ctx_b) = (ctx(1234, first), ctx(1234, second));
    let (a, b) = tokio::join!(uc.execute(&ctx_a), uc.execute(&ctx_b));

    assert_eq!(
        a.unwrap(),
        CodeUse::Consumed {
            expires_at: first + Duration::minutes(5)
        }
    );
    assert_eq!(b.unwrap(), CodeUse::AlreadyPending);
    assert_eq!(store.applied_writes(), 1, "exactly one write must land");
    assert_eq!(
        store.get(1234, TEST_ADDRESS).unwrap().expires_at,
        Some(first + Duration::minutes(5))
    );
}

#[tokio::test]
async fn should_accept_both_racers_in_same_millisecond() {
    // Equal expiries satisfy the `>=` condition, so both writes land.
    let store = InMemoryCodeStore::new(vec![code(1234, true)]).with_read_barrier(2);
    let uc = ValidateEntryCodeUseCase {
        codes: store.clone(),
    };

    let (ctx_a, ctx_b) = (ctx(1234, now()), ctx(1234, now()));
    let (a, b) = tokio::join!(uc.execute(&ctx_a), uc.execute(&ctx_b));

    let consumed = CodeUse::Consumed {
        expires_at: now() + Duration::minutes(5),
    };
    assert_eq!(a.unwrap(), consumed);
    assert_eq!(b.unwrap(), consumed);
    assert_eq!(store.applied_writes(), 2);
    assert_eq!(
        store.get(1234, TEST_ADDRESS).unwrap().expires_at,
        Some(now() + Duration::minutes(5))
    );
}

#[tokio::test]
async fn should_surface_store_read_fault_as_validation_error() {
    let uc = ValidateEntryCodeUseCase {
        codes: InMemoryCodeStore::new(vec![code(1234, false)]).failing_reads(),
    };

    let result = uc.execute(&ctx(1234, now())).await;

    assert!(
        matches!(result, Err(EntryCodeServiceError::Validation(_))),
        "expected Validation, got {result:?}"
    );
}

#[tokio::test]
async fn should_surface_non_condition_write_fault_as_validation_error() {
    let uc = ValidateEntryCodeUseCase {
        codes: InMemoryCodeStore::new(vec![code(1234, true)]).failing_writes(),
    };

    let result = uc.execute(&ctx(1234, now())).await;

    assert!(matches!(result, Err(EntryCodeServiceError::Validation(_))));
}

#[tokio::test]
async fn should_not_write_when_single_use_flag_is_absent() {
    let store = InMemoryCodeStore::new(vec![code(1234, false)]).failing_writes();
    let uc = ValidateEntryCodeUseCase {
        codes: store.clone(),
    };

    assert_eq!(uc.execute(&ctx(1234, now())).await.unwrap(), CodeUse::Reusable);
}
