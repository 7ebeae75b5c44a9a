//! Integration tests walking whole journeys through the tracker.

use std::sync::Arc;

use yggdrasil_progression::{
    FlagOutcome, InMemoryProgressionRepository, ProgressionError, ProgressionTracker, Stage,
};
use yggdrasil_realm::{FlagSigner, Realm, UserId};

// =========================================================================
// Helpers
// =========================================================================

const SECRET: &str = "integration-test-master-secret-abcdefghijkl";

fn tracker() -> ProgressionTracker<InMemoryProgressionRepository> {
    ProgressionTracker::new(
        InMemoryProgressionRepository::new(),
        FlagSigner::new(SECRET).unwrap(),
    )
}

fn flag(t: &ProgressionTracker<InMemoryProgressionRepository>, realm: Realm, user: &UserId) -> String {
    t.signer().generate(realm, user)
}

// =========================================================================
// Full journey
// =========================================================================

#[tokio::test]
async fn test_full_journey_unlocks_one_realm_per_flag() {
    let t = tracker();
    let user = UserId::new("traveller");
    t.initialize(&user).await.unwrap();

    for (i, realm) in Realm::ALL.into_iter().enumerate() {
        let outcome = t.submit_flag(&user, &flag(&t, realm, &user)).await.unwrap();

        let expected_next = realm.next();
        assert_eq!(
            outcome,
            FlagOutcome::Advanced {
                solved: realm,
                unlocked: expected_next,
                complete: expected_next.is_none(),
            }
        );

        let unlocked = t.unlocked_realms(&user).await.unwrap();
        let expected_len = (i + 2).min(Realm::ALL.len());
        assert_eq!(unlocked, Realm::ALL[..expected_len].to_vec());
    }

    let progression = t.progression(&user).await.unwrap();
    assert_eq!(progression.stage(), Stage::Complete);

    // Accepted flags stay accepted after the journey ends.
    for realm in [Realm::Asgard, Realm::Niflheim] {
        let again = t.submit_flag(&user, &flag(&t, realm, &user)).await.unwrap();
        assert_eq!(again, FlagOutcome::AlreadySolved(realm));
    }
    let bogus = "YGGDRASIL{MIDGARD:00000000-0000-0000-0000-000000000000}";
    assert!(matches!(
        t.submit_flag(&user, bogus).await,
        Err(ProgressionError::WrongFlag(Realm::Midgard))
    ));
    assert_eq!(t.progression(&user).await.unwrap(), progression);
}

#[tokio::test]
async fn test_skipping_ahead_is_rejected_at_every_stage() {
    let t = tracker();
    let user = UserId::new("traveller");

    t.submit_flag(&user, &flag(&t, Realm::Niflheim, &user)).await.unwrap();
    t.submit_flag(&user, &flag(&t, Realm::Helheim, &user)).await.unwrap();

    for ahead in [Realm::Jotunheim, Realm::Midgard, Realm::Asgard] {
        let result = t.submit_flag(&user, &flag(&t, ahead, &user)).await;
        assert!(
            matches!(
                result,
                Err(ProgressionError::OutOfOrder { expected: Realm::Svartalfheim, submitted }) if submitted == ahead
            ),
            "{ahead} should be out of order"
        );
    }
    assert!(!t.is_unlocked(&user, "jotunheim").await.unwrap());
}

#[tokio::test]
async fn test_resubmitting_solved_flag_is_idempotent() {
    let t = tracker();
    let user = UserId::new("traveller");
    let niflheim = flag(&t, Realm::Niflheim, &user);

    t.submit_flag(&user, &niflheim).await.unwrap();
    let before = t.progression(&user).await.unwrap();
    let outcome = t.submit_flag(&user, &niflheim).await.unwrap();

    assert_eq!(outcome, FlagOutcome::AlreadySolved(Realm::Niflheim));
    assert_eq!(t.progression(&user).await.unwrap(), before);
}

#[tokio::test]
async fn test_progress_is_per_user() {
    let t = tracker();
    let alice = UserId::new("alice");
    let bob = UserId::new("bob");

    t.submit_flag(&alice, &flag(&t, Realm::Niflheim, &alice)).await.unwrap();

    assert!(t.is_unlocked(&alice, "helheim").await.unwrap());
    assert!(!t.is_unlocked(&bob, "helheim").await.unwrap());
}

// =========================================================================
// Concurrency
// =========================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_submissions_advance_once() {
    let t = Arc::new(tracker());
    let user = UserId::new("racer");
    let niflheim = flag(&t, Realm::Niflheim, &user);

    let mut handles = Vec::new();
    for _ in 0..8 {
        let t = Arc::clone(&t);
        let user = user.clone();
        let niflheim = niflheim.clone();
        handles.push(tokio::spawn(async move { t.submit_flag(&user, &niflheim).await }));
    }

    let mut advanced = 0;
    let mut already = 0;
    for handle in handles {
        match handle.await.unwrap().unwrap() {
            FlagOutcome::Advanced { .. } => advanced += 1,
            FlagOutcome::AlreadySolved(_) => already += 1,
        }
    }

    assert_eq!(advanced, 1);
    assert_eq!(already, 7);
    assert_eq!(
        t.unlocked_realms(&user).await.unwrap(),
        vec![Realm::Niflheim, Realm::Helheim]
    );
}
