use chrono::Utc;

use coaster_book::catalog::{add_coaster, resolve_coaster, resolve_park, CoasterDraft};
use coaster_book::model::MAIN_LIST;
use coaster_book::ranking::{self, Direction};
use coaster_book::session::{Session, SessionError};
use coaster_book::store::{GitHubStore, MemoryStore};

use crate::support::{location, sample, start_github, FakeRepo, TOKEN};

#[tokio::test]
async fn rank_edits_end_to_end() {
    let store = MemoryStore::new(sample());
    let mut session = Session::open(store.clone()).await.unwrap();
    let now = Utc::now();

    session
        .commit(|d| {
            let id = resolve_coaster(d, "orion")?.id.clone();
            ranking::rank_coaster(d, MAIN_LIST, &id, now)
        })
        .await
        .unwrap();
    session
        .commit(|d| ranking::step(d, MAIN_LIST, "ob", Direction::Up, now))
        .await
        .unwrap();

    let order: Vec<String> = ranking::ordered_list(&store.document(), MAIN_LIST)
        .iter()
        .map(|r| r.coaster_id.clone())
        .collect();
    assert_eq!(order, vec!["ob", "mf"]);
    assert_eq!(store.history(), vec!["Add to rankings", "Move up"]);

    // Already at the top: nothing to save
    let change = session
        .commit(|d| ranking::step(d, MAIN_LIST, "ob", Direction::Up, now))
        .await
        .unwrap();
    assert!(change.is_none());
    assert_eq!(store.history().len(), 2);
}

#[tokio::test]
async fn duplicate_coaster_is_rejected_before_writing() {
    let store = MemoryStore::new(sample());
    let mut session = Session::open(store.clone()).await.unwrap();

    let err = session
        .commit(|d| {
            let park_id = resolve_park(d, "Cedar Point")?.id.clone();
            add_coaster(
                d,
                &CoasterDraft {
                    name: "millennium force".into(),
                    park_id,
                    manufacturer_id: None,
                    notes: None,
                },
            )
        })
        .await
        .unwrap_err();

    assert!(matches!(err, SessionError::Validation(_)));
    assert!(store.history().is_empty());
    assert_eq!(store.document(), sample());
}

#[tokio::test]
async fn conflict_over_http_keeps_local_state() {
    let repo = FakeRepo::new(&sample());
    let base = start_github(repo.clone()).await;
    let mut session = Session::open(GitHubStore::new(&base, location(), TOKEN).unwrap())
        .await
        .unwrap();
    let before = session.revision().clone();

    repo.touch("Other device");
    let err = session
        .commit(|d| ranking::unrank_coaster(d, MAIN_LIST, "mf"))
        .await
        .unwrap_err();

    assert!(err.is_conflict());
    assert_eq!(session.revision(), &before);
    assert_eq!(session.document(), &sample());

    session.reload().await.unwrap();
    session
        .commit(|d| ranking::unrank_coaster(d, MAIN_LIST, "mf"))
        .await
        .unwrap();
    assert!(repo.document().ranks.is_empty());
    assert_eq!(repo.commits(), vec!["Other device", "Remove from rankings"]);
}
