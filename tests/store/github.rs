use coaster_book::catalog::{add_manufacturer, Change};
use coaster_book::store::{DocumentStore, GitHubStore, Revision, StoreError};

use crate::support::{location, sample, start_github, FakeRepo, TOKEN};

async fn store_for(repo: &FakeRepo, token: &str) -> GitHubStore {
    let base = start_github(repo.clone()).await;
    GitHubStore::new(&base, location(), token).unwrap()
}

#[tokio::test]
async fn load_decodes_wrapped_base64() {
    let repo = FakeRepo::new(&sample());
    let store = store_for(&repo, TOKEN).await;

    let loaded = store.load().await.unwrap();
    assert_eq!(loaded.document, sample());
    assert_eq!(loaded.revision.as_str(), repo.sha());
}

#[tokio::test]
async fn save_writes_document_and_message() {
    let repo = FakeRepo::new(&sample());
    let store = store_for(&repo, TOKEN).await;
    let loaded = store.load().await.unwrap();

    let mut doc = loaded.document.clone();
    let Change { message, .. } = add_manufacturer(&mut doc, "Bolliger & Mabillard").unwrap();
    let revision = store.save(&doc, &loaded.revision, &message).await.unwrap();

    assert_eq!(revision.as_str(), repo.sha());
    assert_ne!(revision, loaded.revision);
    assert_eq!(repo.document(), doc);
    assert_eq!(repo.commits(), vec!["Add manufacturer: Bolliger & Mabillard"]);

    // The new revision is good for the next save
    let again = store.save(&sample(), &revision, "Revert").await.unwrap();
    assert_eq!(again.as_str(), repo.sha());
}

#[tokio::test]
async fn stale_revision_is_a_conflict_and_writes_nothing() {
    let repo = FakeRepo::new(&sample());
    let store = store_for(&repo, TOKEN).await;
    let loaded = store.load().await.unwrap();

    repo.touch("Edited on another machine");

    let mut doc = loaded.document.clone();
    add_manufacturer(&mut doc, "Vekoma").unwrap();
    let err = store
        .save(&doc, &loaded.revision, "Add manufacturer: Vekoma")
        .await
        .unwrap_err();

    assert!(err.is_conflict());
    assert!(err.hint().is_some());
    assert_eq!(repo.document(), sample());
    assert_eq!(repo.commits(), vec!["Edited on another machine"]);
}

#[tokio::test]
async fn bad_token_is_a_401_transport_error() {
    let repo = FakeRepo::new(&sample());
    let store = store_for(&repo, "wrong").await;

    let err = store.load().await.unwrap_err();
    match &err {
        StoreError::Transport { status, message } => {
            assert_eq!(*status, Some(401));
            assert_eq!(message, "Bad credentials");
        }
        other => panic!("expected transport error, got {:?}", other),
    }
    assert!(!err.is_transient());
    assert!(err.hint().unwrap().contains("token"));
}

#[tokio::test]
async fn missing_file_is_a_404() {
    let repo = FakeRepo::new(&sample());
    let base = start_github(repo).await;
    let mut elsewhere = location();
    elsewhere.path = "other.json".into();
    let store = GitHubStore::new(&base, elsewhere, TOKEN).unwrap();

    let err = store.load().await.unwrap_err();
    assert!(matches!(
        err,
        StoreError::Transport {
            status: Some(404),
            ..
        }
    ));
}

#[tokio::test]
async fn invalid_json_is_a_format_error() {
    let repo = FakeRepo::with_text("{ not json");
    let store = store_for(&repo, TOKEN).await;

    let err = store.load().await.unwrap_err();
    assert!(matches!(err, StoreError::Format(_)));
}

#[tokio::test]
async fn unreachable_server_is_transient() {
    // Nothing listens on port 9 of localhost
    let store = GitHubStore::new("http://127.0.0.1:9", location(), TOKEN).unwrap();
    let err = store
        .save(&sample(), &Revision::new("abc"), "noop")
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Transport { status: None, .. }));
    assert!(err.is_transient());
}
