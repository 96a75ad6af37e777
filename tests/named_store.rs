use crossbeam_utils::thread;
use crs::{ClientEngine, CrsError, NamedStore, Result, DEFAULT_SERVICE, META_KEY};
use serde_json::{json, Map, Value};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn fields(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => panic!("fields must be an object"),
    }
}

fn data_path(temp_dir: &TempDir) -> PathBuf {
    temp_dir.path().join("clients.json")
}

fn open(temp_dir: &TempDir) -> Result<NamedStore> {
    NamedStore::open(&data_path(temp_dir))
}

fn read_doc(temp_dir: &TempDir) -> Result<Value> {
    Ok(serde_json::from_str(&fs::read_to_string(data_path(temp_dir))?)?)
}

#[test]
fn crud_scenario() -> Result<()> {
    let temp_dir = TempDir::new().expect("unable to create temporary working directory");
    let store = open(&temp_dir)?;

    let created = store.create(&fields(
        json!({"name": "TestUser", "service": "Internet", "data": {"plan": "Pro"}}),
    ))?;
    assert_eq!(created.id, None);
    assert_eq!(created.name, "TestUser");
    assert_eq!(created.history.len(), 1);
    assert_eq!(created.history[0].action, "create");
    assert_eq!(created.history[0].service, "Internet");

    let fetched = store.get("TestUser").expect("client was created");
    assert_eq!(fetched, created);

    let updated = store.update("TestUser", &fields(json!({"data": {"plan": "Premium"}})))?;
    assert_eq!(updated.extra.get("plan"), Some(&json!("Premium")));
    assert_eq!(updated.service, "Internet");

    let deleted = store.delete("TestUser")?;
    assert_eq!(deleted.name, "TestUser");
    assert_eq!(deleted.extra.get("plan"), Some(&json!("Premium")));
    assert_eq!(store.get("TestUser"), None);
    assert!(matches!(store.delete("TestUser"), Err(CrsError::NotFound(_))));
    Ok(())
}

#[test]
fn service_defaults_when_missing() -> Result<()> {
    let temp_dir = TempDir::new().expect("unable to create temporary working directory");
    let store = open(&temp_dir)?;

    let record = store.create(&fields(json!({"nombre": "Ana", "servicio": ""})))?;
    assert_eq!(record.service, DEFAULT_SERVICE);
    assert_eq!(record.history[0].service, DEFAULT_SERVICE);
    Ok(())
}

#[test]
fn duplicate_names_conflict() -> Result<()> {
    let temp_dir = TempDir::new().expect("unable to create temporary working directory");
    let store = open(&temp_dir)?;
    store.create(&fields(json!({"name": "Acme"})))?;

    assert!(matches!(
        store.create(&fields(json!({"name": "Acme", "service": "other"}))),
        Err(CrsError::Conflict(_))
    ));
    assert!(matches!(
        store.create(&fields(json!({"service": "other"}))),
        Err(CrsError::Validation(_))
    ));
    assert_eq!(store.list().len(), 1);
    assert_eq!(store.get("Acme").map(|r| r.service), Some(DEFAULT_SERVICE.to_string()));
    Ok(())
}

#[test]
fn names_are_looked_up_exactly() -> Result<()> {
    let temp_dir = TempDir::new().expect("unable to create temporary working directory");
    let store = open(&temp_dir)?;
    store.create(&fields(json!({"name": "7", "service": "s"})))?;

    assert!(store.get("7").is_some());
    assert!(store.get("07").is_none());
    Ok(())
}

#[test]
fn meta_key_is_reserved() -> Result<()> {
    let temp_dir = TempDir::new().expect("unable to create temporary working directory");
    let store = open(&temp_dir)?;
    store.create(&fields(json!({"name": "a"})))?;

    let doc = read_doc(&temp_dir)?;
    assert_eq!(doc[META_KEY], json!({"version": 1}));
    assert_eq!(doc.as_object().and_then(|o| o.keys().next().cloned()), Some(META_KEY.to_string()));

    assert_eq!(store.list().len(), 1);
    assert_eq!(store.get(META_KEY), None);
    assert!(matches!(store.delete(META_KEY), Err(CrsError::NotFound(_))));
    assert!(matches!(
        store.update(META_KEY, &fields(json!({"service": "x"}))),
        Err(CrsError::NotFound(_))
    ));
    assert!(matches!(
        store.create(&fields(json!({"name": META_KEY}))),
        Err(CrsError::Validation(_))
    ));
    assert!(matches!(
        store.update("a", &fields(json!({"name": META_KEY}))),
        Err(CrsError::Validation(_))
    ));
    Ok(())
}

#[test]
fn update_merges_extra_and_appends_history() -> Result<()> {
    let temp_dir = TempDir::new().expect("unable to create temporary working directory");
    let store = open(&temp_dir)?;
    store.create(&fields(json!({"name": "a", "service": "s1", "extra": {"plan": "Pro", "seats": 3}})))?;

    store.update("a", &fields(json!({"service": "s2", "extra": {"plan": "Premium", "region": "eu"}})))?;
    let record = store.update("a", &fields(json!({"correo": "a@example.com"})))?;

    assert_eq!(
        Value::Object(record.extra.clone()),
        json!({"plan": "Premium", "seats": 3, "region": "eu"})
    );
    assert_eq!(record.contact.as_deref(), Some("a@example.com"));
    let history: Vec<_> = record
        .history
        .iter()
        .map(|h| (h.action.as_str(), h.service.as_str()))
        .collect();
    assert_eq!(history, vec![("create", "s1"), ("update", "s2"), ("update", "s2")]);
    assert!(record.history.iter().all(|h| chrono::DateTime::parse_from_rfc3339(&h.timestamp).is_ok()));
    Ok(())
}

// an empty patch only adds a history entry
#[test]
fn empty_patch_only_appends_history() -> Result<()> {
    let temp_dir = TempDir::new().expect("unable to create temporary working directory");
    let store = open(&temp_dir)?;
    let created = store.create(&fields(json!({"name": "a", "service": "s", "data": {"k": 1}})))?;

    let updated = store.update("a", &Map::new())?;
    assert_eq!(updated.history.len(), 2);
    assert_eq!(updated.history[1].action, "update");

    let mut without_history = updated.clone();
    without_history.history.truncate(1);
    assert_eq!(without_history, created);
    Ok(())
}

#[test]
fn renames_keep_position_and_reject_existing_names() -> Result<()> {
    let temp_dir = TempDir::new().expect("unable to create temporary working directory");
    let store = open(&temp_dir)?;
    for name in &["a", "b", "c"] {
        store.create(&fields(json!({ "name": name })))?;
    }

    assert!(matches!(
        store.update("b", &fields(json!({"name": "c"}))),
        Err(CrsError::Conflict(_))
    ));
    let renamed = store.update("b", &fields(json!({"name": "bee"})))?;
    assert_eq!(renamed.name, "bee");

    let names: Vec<_> = store.list().into_iter().map(|r| r.name).collect();
    assert_eq!(names, vec!["a", "bee", "c"]);
    assert_eq!(store.get("b"), None);
    Ok(())
}

#[test]
fn corrupt_documents_read_as_empty() -> Result<()> {
    let temp_dir = TempDir::new().expect("unable to create temporary working directory");
    fs::write(data_path(&temp_dir), "[1, 2, 3]")?;
    let store = open(&temp_dir)?;
    assert!(store.list().is_empty());

    fs::write(data_path(&temp_dir), "not json at all")?;
    assert!(store.list().is_empty());

    store.create(&fields(json!({"name": "a"})))?;
    assert_eq!(store.list().len(), 1);
    Ok(())
}

#[test]
fn invalid_entries_are_skipped_but_kept() -> Result<()> {
    let temp_dir = TempDir::new().expect("unable to create temporary working directory");
    fs::write(
        data_path(&temp_dir),
        r#"{"_meta": {"version": 1}, "broken": 42, "ok": {"name": "ok", "service": "s", "data": {}, "history": []}}"#,
    )?;
    let store = open(&temp_dir)?;

    let names: Vec<_> = store.list().into_iter().map(|r| r.name).collect();
    assert_eq!(names, vec!["ok"]);

    store.create(&fields(json!({"name": "new"})))?;
    let doc = read_doc(&temp_dir)?;
    assert_eq!(doc["broken"], json!(42));
    Ok(())
}

// concurrent increments of one counter must all be kept, each with its history entry
#[test]
fn concurrent_updates_are_not_lost() -> Result<()> {
    const THREADS: usize = 8;
    const INCREMENTS: usize = 25;

    let temp_dir = TempDir::new().expect("unable to create temporary working directory");
    let store = open(&temp_dir)?;
    store.create(&fields(json!({"name": "counter", "service": "s", "data": {"n": 0}})))?;
    store.create(&fields(json!({"name": "other", "service": "s"})))?;

    thread::scope(|s| {
        for t in 0..THREADS {
            let store = store.clone();
            s.spawn(move |_| {
                for i in 0..INCREMENTS {
                    store
                        .update_with("counter", |record| {
                            let n = record.extra.get("n").and_then(Value::as_u64).unwrap_or(0);
                            record.extra.insert("n".to_string(), json!(n + 1));
                        })
                        .expect("increment failed");
                    store
                        .update("other", &fields(json!({"data": {(format!("t{}", t)): i}})))
                        .expect("update failed");
                }
            });
        }
    })
    .expect("a worker thread panicked");

    let counter = store.get("counter").expect("counter exists");
    assert_eq!(counter.extra.get("n"), Some(&json!(THREADS * INCREMENTS)));
    assert_eq!(counter.history.len(), 1 + THREADS * INCREMENTS);
    let other = store.get("other").expect("other exists");
    assert_eq!(other.extra.len(), THREADS);
    assert_eq!(store.list().len(), 2);
    Ok(())
}
