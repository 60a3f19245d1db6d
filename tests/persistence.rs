use std::fs;

use songmarks::backup::{export_to_path, import_from_path, BACKUP_FILE_NAME};
use songmarks::db::{ensure_schema, SqliteStorage};
use songmarks::store::SONGS_KEY;
use songmarks::{FilterMode, LinkKind, SnapshotStorage, SortOrder, Store, ViewState};

fn open(path: &std::path::Path) -> Store<SqliteStorage> {
    let conn = ensure_schema(path).unwrap();
    Store::load(SqliteStorage::new(conn)).unwrap()
}

#[test]
fn songs_survive_reopening_the_database() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("nested").join("songmarks.sqlite");

    let opened_id = {
        let mut store = open(&db_path);
        store
            .add_song("Blackbird", "The Beatles", "https://www.youtube.com/watch?v=Man4Xw8Xypo")
            .unwrap();
        let tabs = store
            .add_song("Dust in the Wind", "Kansas", "https://tabs.example/dust")
            .unwrap();
        store.open_song(tabs.id).unwrap();
        tabs.id
    };

    let store = open(&db_path);
    assert_eq!(store.len(), 2);
    let opened = store.get(opened_id).unwrap();
    assert_eq!(opened.link_kind, LinkKind::Tabs);
    assert!(opened.last_opened.is_some());

    let recent = ViewState {
        filter: FilterMode::All,
        sort: SortOrder::LastOpened,
    }
    .project(store.songs());
    assert_eq!(recent[0].id, opened_id);
}

#[test]
fn snapshot_is_stored_under_one_key() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("songmarks.sqlite");
    let mut store = open(&db_path);
    store.add_song("A", "x", "https://youtu.be/a").unwrap();

    let storage = SqliteStorage::new(ensure_schema(&db_path).unwrap());
    assert_eq!(storage.keys().unwrap(), vec![SONGS_KEY.to_string()]);
    let raw = storage.read(SONGS_KEY).unwrap().unwrap();
    assert!(raw.contains("\"linkType\":\"youtube\""));
}

#[test]
fn backup_moves_songs_between_databases() {
    let dir = tempfile::tempdir().unwrap();
    let mut source = open(&dir.path().join("source.sqlite"));
    source.add_song("A", "x", "https://youtu.be/a").unwrap();
    source.add_song("B", "y", "https://tabs.example/b").unwrap();
    let backup = export_to_path(&source, dir.path()).unwrap();
    assert_eq!(backup, dir.path().join(BACKUP_FILE_NAME));

    let target_path = dir.path().join("target.sqlite");
    let mut target = open(&target_path);
    target.add_song("Gone", "z", "l").unwrap();
    assert_eq!(import_from_path(&mut target, &backup).unwrap(), 2);
    drop(target);

    let reopened = open(&target_path);
    assert_eq!(reopened.songs(), source.songs());
}

#[test]
fn rejected_import_leaves_database_alone() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("songmarks.sqlite");
    let mut store = open(&db_path);
    store.add_song("Keep", "x", "l").unwrap();

    let bad = dir.path().join("bad.json");
    fs::write(&bad, r#"[{"id":1,"title":"","artist":"a","link":"l","linkType":"tabs"}]"#)
        .unwrap();
    assert!(import_from_path(&mut store, &bad).is_err());
    drop(store);

    let reopened = open(&db_path);
    assert_eq!(reopened.len(), 1);
    assert_eq!(reopened.songs()[0].title, "Keep");
}
