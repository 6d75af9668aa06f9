use crate::data::test_support::*;
use crate::data::Schedule;

use crate::db::StateStore;
use std::ops::Deref;
use tempfile::TempDir;

pub struct TmpStore(StateStore, TempDir);

impl TmpStore {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let store = StateStore::new(dir.path().join("state.json"));
        TmpStore(store, dir)
    }
}

impl Deref for TmpStore {
    type Target = StateStore;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

fn sample(all_done: &str) -> Schedule {
    let now = "2022-01-10 08:00";
    let mut schedule = Schedule::default();
    schedule.set_all_done(Some(ts(all_done, now)));
    schedule.add_product("Bread").unwrap();
    schedule.add_step(0, step("proof", "1h30")).unwrap();
    schedule.add_step(0, step("bake", "45m")).unwrap();
    schedule.add_product("Soup").unwrap();
    schedule
}

#[test]
fn backup_is_a_hidden_sibling() {
    let store = StateStore::new("/tmp/some/state.json");
    assert_eq!(
        store.backup_path(),
        std::path::Path::new("/tmp/some/.state.json")
    );
}

#[test]
fn missing_files_load_empty() {
    let store = TmpStore::new();
    assert_eq!(store.load(), Schedule::default());
}

#[test]
fn load_just_stored_schedule() {
    let store = TmpStore::new();
    let schedule = sample("5pm");
    store.save(&schedule).unwrap();

    assert!(store.path().is_file());
    assert!(!store.backup_path().exists());
    assert_eq!(store.load(), schedule);
}

#[test]
fn save_creates_the_directory() {
    let dir = TempDir::new().unwrap();
    let store = StateStore::new(dir.path().join("nested").join("state.json"));
    store.save(&sample("5pm")).unwrap();
    assert_eq!(store.load(), sample("5pm"));
}

#[test]
fn leftover_backup_is_newer() {
    let store = TmpStore::new();
    store.save(&sample("5pm")).unwrap();

    // crash between writing the backup and the main file
    let newer = sample("6pm");
    std::fs::write(store.backup_path(), serde_json::to_vec(&newer).unwrap()).unwrap();

    assert_eq!(store.load(), newer);
}

#[test]
fn corrupt_backup_falls_back_to_main() {
    let store = TmpStore::new();
    let schedule = sample("5pm");
    store.save(&schedule).unwrap();
    std::fs::write(store.backup_path(), b"{\"all_do").unwrap();

    assert_eq!(store.load(), schedule);
}

#[test]
fn corrupt_main_with_backup() {
    let store = TmpStore::new();
    let schedule = sample("5pm");
    std::fs::write(store.backup_path(), serde_json::to_vec(&schedule).unwrap()).unwrap();
    std::fs::write(store.path(), b"").unwrap();

    assert_eq!(store.load(), schedule);
}

#[test]
fn everything_corrupt_loads_empty() {
    let store = TmpStore::new();
    std::fs::write(store.backup_path(), b"not json").unwrap();
    std::fs::write(store.path(), b"[]").unwrap();

    assert_eq!(store.load(), Schedule::default());
}

#[test]
fn save_after_crash_replaces_backup() {
    let store = TmpStore::new();
    std::fs::write(store.backup_path(), b"garbage").unwrap();
    let schedule = sample("7pm");
    store.save(&schedule).unwrap();

    assert!(!store.backup_path().exists());
    assert_eq!(store.load(), schedule);
}
