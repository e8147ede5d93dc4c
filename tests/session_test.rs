use std::sync::Arc;
use std::time::Duration;

use rescue::screens::{COMMENTS_ROOT, CONTACTS_ROOT, comment_composer, open_comments, open_contacts};
use rescue::{
    BundledResources, BusyCounter, DocPath, FileStore, FixedConnectivity, Photo, SessionDeps,
    SessionSource,
};
use serde_json::json;
use serial_test::serial;
use tempfile::TempDir;
use tokio::sync::mpsc;

async fn recv<T>(rx: &mut mpsc::UnboundedReceiver<T>) -> T {
    tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("timed out waiting for snapshot")
        .expect("channel closed")
}

fn deps(store: FileStore, busy: Arc<BusyCounter>) -> SessionDeps {
    SessionDeps {
        client: Arc::new(store),
        connectivity: Arc::new(FixedConnectivity(true)),
        fallback: Arc::new(BundledResources::empty()),
        busy,
    }
}

#[tokio::test(flavor = "multi_thread")]
#[serial]
async fn test_outside_edit_reaches_open_session() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("database.json");
    std::fs::write(&db, json!({"contacts": {"sections": {"a": "Alpha"}}}).to_string()).unwrap();

    let mut store = FileStore::open(&db).unwrap();
    store.watch().unwrap();
    let busy = Arc::new(BusyCounter::new());
    let deps = deps(store, busy.clone());

    let (tx, mut rx) = mpsc::unbounded_channel();
    let session = open_contacts(&deps, &DocPath::parse(CONTACTS_ROOT).unwrap(), move |list| {
        let _ = tx.send(list.clone());
    });
    assert!(matches!(session.source(), SessionSource::Remote(_)));

    let first = recv(&mut rx).await;
    assert_eq!(first.label("a"), Some("Alpha"));
    assert!(!busy.is_busy());

    // give the watcher time to register before editing
    tokio::time::sleep(Duration::from_millis(200)).await;
    std::fs::write(&db, json!({"contacts": {"sections": {"b": "Bravo"}}}).to_string()).unwrap();

    let updated = loop {
        let list = recv(&mut rx).await;
        if list.label("b").is_some() {
            break list;
        }
    };
    assert_eq!(updated.label("a"), None);

    session.close();
    assert!(session.is_closed());
}

#[tokio::test(flavor = "multi_thread")]
#[serial]
async fn test_comment_written_to_file_and_republished() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("nested").join("database.json");
    let store = FileStore::open(&db).unwrap();
    let deps = deps(store, Arc::new(BusyCounter::new()));
    let root = DocPath::parse(COMMENTS_ROOT).unwrap();
    let photo = Photo {
        id: Some("p7".into()),
        url: None,
        story: String::new(),
    };

    let (tx, mut rx) = mpsc::unbounded_channel();
    let session = open_comments(&deps, &root, &photo, move |comments| {
        let _ = tx.send(comments.len());
    })
    .unwrap()
    .unwrap();
    assert_eq!(recv(&mut rx).await, 0);

    let composer = comment_composer(&deps, &root, &photo).unwrap();
    composer.set_input("Salute");
    composer
        .send(jiff::Timestamp::from_second(1534567890).unwrap())
        .await
        .unwrap();

    // unvalidated, so still nothing to show
    assert_eq!(recv(&mut rx).await, 0);

    let saved: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&db).unwrap()).unwrap();
    assert_eq!(
        saved,
        json!({"heros_of_India_comments": {"p7": {"1534567890": {
            "comment": "Salute",
            "timestamp": "1534567890",
            "isValidated": false
        }}}})
    );

    drop(session);
}
