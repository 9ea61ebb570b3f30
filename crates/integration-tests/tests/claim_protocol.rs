//! Cross-crate tests for the name claim protocol: the uniqueness race,
//! self-renames, and availability precedence, against both the in-memory
//! and the SQLite gateway.

use lp_core::error::AppError;
use lp_core::memory::MemoryProfileRepo;
use lp_core::models::Profile;
use lp_core::names::{Availability, NameRegistry};
use lp_core::traits::ProfileRepo;
use lp_db_sqlite::SqliteProfileRepo;

#[tokio::test]
async fn concurrent_claims_have_exactly_one_winner() {
    let repo = MemoryProfileRepo::new();
    let registry = NameRegistry::new();

    let mut doc_a = Profile::blank_for("owner-a");
    doc_a.display_name = "A".into();
    let mut doc_b = Profile::blank_for("owner-b");
    doc_b.display_name = "B".into();

    let (result_a, result_b) = tokio::join!(
        registry.claim(&repo, "hot-name", "owner-a", &doc_a),
        registry.claim(&repo, "hot-name", "owner-b", &doc_b),
    );

    let winners = [result_a.is_ok(), result_b.is_ok()]
        .iter()
        .filter(|ok| **ok)
        .count();
    assert_eq!(winners, 1, "exactly one claim must win");

    let stored = repo.get("hot-name").await.unwrap().unwrap();
    let expected_owner = if result_a.is_ok() { "owner-a" } else { "owner-b" };
    assert_eq!(stored["ownerId"], expected_owner);

    let loser = if result_a.is_ok() { result_b } else { result_a };
    assert!(matches!(loser.unwrap_err(), AppError::Conflict(_)));
}

#[tokio::test]
async fn claims_on_different_names_do_not_contend() {
    let repo = MemoryProfileRepo::new();
    let registry = NameRegistry::new();

    let profile_a = Profile::blank_for("owner-a");
    let profile_b = Profile::blank_for("owner-b");
    let (a, b) = tokio::join!(
        registry.claim(&repo, "name-one", "owner-a", &profile_a),
        registry.claim(&repo, "name-two", "owner-b", &profile_b),
    );
    a.unwrap();
    b.unwrap();
}

#[tokio::test]
async fn self_rename_is_never_a_conflict() {
    let repo = SqliteProfileRepo::new("sqlite::memory:").await.unwrap();
    let registry = NameRegistry::new();
    let profile = Profile::blank_for("u1");

    for _ in 0..5 {
        registry.claim(&repo, "my-page", "u1", &profile).await.unwrap();
    }
    assert_eq!(
        repo.get("my-page").await.unwrap().unwrap()["ownerId"],
        "u1"
    );
}

#[tokio::test]
async fn availability_precedence_over_sqlite() {
    let repo = SqliteProfileRepo::new("sqlite::memory:").await.unwrap();
    let registry = NameRegistry::new();

    registry
        .claim(&repo, "already-bound-name", "u1", &Profile::blank_for("u1"))
        .await
        .unwrap();

    // Invalid beats whatever the store holds.
    assert_eq!(
        registry.check(&repo, "ab").await.unwrap(),
        Availability::Invalid
    );
    assert_eq!(
        registry.check(&repo, "already-bound-name").await.unwrap(),
        Availability::Taken { owner_id: "u1".into() }
    );
    assert_eq!(
        registry.check(&repo, "free-name").await.unwrap(),
        Availability::Available
    );
}

#[tokio::test]
async fn conflicting_claim_writes_nothing() {
    let repo = SqliteProfileRepo::new("sqlite::memory:").await.unwrap();
    let registry = NameRegistry::new();

    let mut original = Profile::blank_for("u1");
    original.bio = "original".into();
    registry.claim(&repo, "my-page", "u1", &original).await.unwrap();

    let mut intruder = Profile::blank_for("u2");
    intruder.bio = "clobbered".into();
    let err = registry.claim(&repo, "my-page", "u2", &intruder).await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    let stored = repo.get("my-page").await.unwrap().unwrap();
    assert_eq!(stored["bio"], "original");
    assert_eq!(stored["ownerId"], "u1");
}
