use coaster_book::catalog::{add_park, ParkDraft};
use coaster_book::config::StoreConfig;
use coaster_book::store::{DocumentStore, Gateway, ProxyStore, StoreError};

use crate::support::{location, sample, start_proxy, FakeRepo};

#[tokio::test]
async fn load_and_save_through_proxy() {
    let repo = FakeRepo::new(&sample());
    let base = start_proxy(repo.clone()).await;
    let store = ProxyStore::new(&base, location()).unwrap();

    let loaded = store.load().await.unwrap();
    assert_eq!(loaded.document, sample());

    let mut doc = loaded.document.clone();
    let change = add_park(
        &mut doc,
        &ParkDraft {
            name: "Europa-Park".into(),
            country: Some("Germany".into()),
        },
    )
    .unwrap();
    let revision = store
        .save(&doc, &loaded.revision, &change.message)
        .await
        .unwrap();

    assert_eq!(revision.as_str(), repo.sha());
    assert_eq!(repo.document(), doc);
    assert_eq!(repo.commits(), vec!["Add park: Europa-Park"]);
}

#[tokio::test]
async fn parsed_json_responses_are_accepted() {
    let repo = FakeRepo::new(&sample());
    repo.state().serve_json = true;
    let base = start_proxy(repo.clone()).await;
    let store = ProxyStore::new(&base, location()).unwrap();

    let loaded = store.load().await.unwrap();
    assert_eq!(loaded.document, sample());
    assert_eq!(loaded.revision.as_str(), repo.sha());
}

#[tokio::test]
async fn proxy_conflict_leaves_file_alone() {
    let repo = FakeRepo::new(&sample());
    let base = start_proxy(repo.clone()).await;
    let store = ProxyStore::new(&base, location()).unwrap();
    let loaded = store.load().await.unwrap();

    repo.touch("Someone else");
    let err = store
        .save(&loaded.document, &loaded.revision, "Reorder rankings")
        .await
        .unwrap_err();

    assert!(matches!(err, StoreError::Conflict { .. }));
    assert_eq!(repo.commits(), vec!["Someone else"]);
}

#[tokio::test]
async fn gateway_prefers_proxy_without_token() {
    let repo = FakeRepo::new(&sample());
    let base = start_proxy(repo).await;
    let config = StoreConfig {
        owner: "alice".into(),
        repo: "coasters".into(),
        proxy_url: Some(base),
        ..StoreConfig::default()
    };

    let gateway = Gateway::from_config(&config, None).unwrap();
    assert!(matches!(gateway, Gateway::Proxy(_)));
    let loaded = gateway.load().await.unwrap();
    assert_eq!(loaded.document.coasters.len(), 2);
}
