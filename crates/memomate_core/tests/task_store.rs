use memomate_core::db::{open_db, open_db_in_memory, DbError};
use memomate_core::{
    Category, MemoryPreferenceStore, PreferenceStore, SqlitePreferenceStore, StoreError,
    StoreResult, Task, TaskStore, TASKS_KEY,
};
use std::cell::Cell;

fn task(id: i64, title: &str, due_date: &str, category: Category) -> Task {
    Task {
        id,
        title: title.to_string(),
        description: format!("{title} details"),
        due_date: due_date.to_string(),
        due_time: "09:30 AM".to_string(),
        created_date: "Jan 01, 2025".to_string(),
        category,
        completed: false,
    }
}

/// Memory store whose reads fail while `fail_reads` is set.
#[derive(Default)]
struct FailingReads {
    inner: MemoryPreferenceStore,
    fail_reads: Cell<bool>,
}

impl PreferenceStore for FailingReads {
    fn get_string(&self, key: &str) -> StoreResult<Option<String>> {
        if self.fail_reads.get() {
            return Err(StoreError::Db(DbError::Sqlite(rusqlite::Error::InvalidQuery)));
        }
        self.inner.get_string(key)
    }

    fn put_string(&self, key: &str, value: &str) -> StoreResult<()> {
        self.inner.put_string(key, value)
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        self.inner.remove(key)
    }
}

#[test]
fn add_to_empty_store_then_get_all() {
    let store = TaskStore::new(MemoryPreferenceStore::new());
    assert!(store.get_all().is_empty());

    let milk = task(1, "Buy milk", "Jan 05, 2025", Category::High);
    store.add(milk.clone()).unwrap();

    assert_eq!(store.get_all(), vec![milk]);
}

#[test]
fn save_all_then_get_all_preserves_order() {
    let conn = open_db_in_memory().unwrap();
    let store = TaskStore::new(SqlitePreferenceStore::new(&conn));
    let tasks = vec![
        task(3, "c", "Mar 01, 2025", Category::Low),
        task(1, "a", "Jan 01, 2025", Category::High),
        task(2, "b", "Feb 01, 2025", Category::Medium),
    ];

    store.save_all(&tasks).unwrap();
    assert_eq!(store.get_all(), tasks);
}

#[test]
fn tasks_survive_reopening_the_database_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("memomate.db");
    let milk = task(1, "Buy milk", "Jan 05, 2025", Category::High);

    {
        let conn = open_db(&path).unwrap();
        TaskStore::new(SqlitePreferenceStore::new(&conn))
            .add(milk.clone())
            .unwrap();
    }

    let conn = open_db(&path).unwrap();
    assert_eq!(
        TaskStore::new(SqlitePreferenceStore::new(&conn)).get_all(),
        vec![milk]
    );
}

#[test]
fn undecodable_stored_value_reads_as_empty() {
    let prefs = MemoryPreferenceStore::new();
    prefs.put_string(TASKS_KEY, "[{\"id\": \"oops\"}]").unwrap();
    let store = TaskStore::new(&prefs);

    assert!(store.get_all().is_empty());

    store
        .add(task(1, "fresh", "Jan 05, 2025", Category::Low))
        .unwrap();
    assert_eq!(store.get_all().len(), 1);
}

#[test]
fn read_failure_aborts_mutations_without_touching_stored_tasks() {
    let prefs = FailingReads::default();
    let store = TaskStore::new(&prefs);
    let existing = vec![
        task(1, "a", "Jan 05, 2025", Category::High),
        task(2, "b", "Jan 06, 2025", Category::Medium),
        task(3, "c", "Jan 07, 2025", Category::Low),
    ];
    store.save_all(&existing).unwrap();
    let stored_before = prefs.inner.get_string(TASKS_KEY).unwrap();

    prefs.fail_reads.set(true);
    assert!(store.get_all().is_empty());
    assert!(matches!(
        store.add(task(4, "d", "Jan 08, 2025", Category::High)),
        Err(StoreError::Db(_))
    ));
    assert!(store
        .update(&task(2, "edited", "Jan 06, 2025", Category::High))
        .is_err());
    assert!(store.delete_by_id(1).is_err());
    assert!(store.next_id().is_err());
    assert!(store.find(1).is_err());
    assert_eq!(prefs.inner.get_string(TASKS_KEY).unwrap(), stored_before);

    prefs.fail_reads.set(false);
    assert_eq!(store.get_all(), existing);
    assert_eq!(store.next_id().unwrap(), 4);
}

#[test]
fn update_replaces_first_match_only_and_ignores_unknown_ids() {
    let store = TaskStore::new(MemoryPreferenceStore::new());
    let first = task(1, "first", "Jan 05, 2025", Category::High);
    let duplicate = task(1, "duplicate", "Jan 06, 2025", Category::High);
    store.save_all(&[first.clone(), duplicate.clone()]).unwrap();

    let mut edited = first.clone();
    edited.title = "edited".to_string();
    assert!(store.update(&edited).unwrap());
    assert_eq!(store.get_all(), vec![edited, duplicate]);

    let before = store.get_all();
    assert!(!store
        .update(&task(42, "ghost", "Jan 05, 2025", Category::Low))
        .unwrap());
    assert_eq!(store.get_all(), before);
}

#[test]
fn delete_removes_every_task_with_the_id() {
    let store = TaskStore::new(MemoryPreferenceStore::new());
    let keep = task(2, "keep", "Jan 05, 2025", Category::High);
    store
        .save_all(&[
            task(1, "x", "Jan 05, 2025", Category::High),
            keep.clone(),
            task(1, "y", "Jan 06, 2025", Category::Low),
        ])
        .unwrap();

    let removed = store
        .delete(&task(1, "whatever", "", Category::Medium))
        .unwrap();
    assert_eq!(removed, 2);
    assert_eq!(store.get_all(), vec![keep]);
    assert_eq!(store.delete_by_id(99).unwrap(), 0);
}

#[test]
fn store_matches_functional_fold_of_operations() {
    #[derive(Debug)]
    enum Op {
        Add(Task),
        Update(Task),
        Delete(i64),
    }

    // Deterministic LCG so the sequence is reproducible.
    let mut seed: u64 = 0x5eed;
    let mut next = move |bound: u64| {
        seed = seed
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        (seed >> 33) % bound
    };

    let ops = (0..200)
        .map(|step| {
            let id = next(8) as i64;
            let category = Category::ALL[next(3) as usize];
            let candidate = task(id, &format!("t{step}"), "Jan 05, 2025", category);
            match next(3) {
                0 => Op::Add(candidate),
                1 => Op::Update(candidate),
                _ => Op::Delete(id),
            }
        })
        .collect::<Vec<_>>();

    let store = TaskStore::new(MemoryPreferenceStore::new());
    let mut model: Vec<Task> = Vec::new();
    for op in &ops {
        match op {
            Op::Add(task) => {
                store.add(task.clone()).unwrap();
                model.push(task.clone());
            }
            Op::Update(task) => {
                store.update(task).unwrap();
                if let Some(slot) = model.iter_mut().find(|stored| stored.id == task.id) {
                    *slot = task.clone();
                }
            }
            Op::Delete(id) => {
                store.delete_by_id(*id).unwrap();
                model.retain(|stored| stored.id != *id);
            }
        }
        assert_eq!(store.get_all(), model, "diverged after {op:?}");
    }
}

#[test]
fn filter_by_category_is_exact_and_keeps_store_order() {
    let store = TaskStore::new(MemoryPreferenceStore::new());
    let tasks = vec![
        task(1, "a", "Jan 05, 2025", Category::Low),
        task(2, "b", "Jan 05, 2025", Category::High),
        task(3, "c", "Jan 05, 2025", Category::Low),
    ];
    store.save_all(&tasks).unwrap();

    assert_eq!(
        store.filter_by_category("Low"),
        vec![tasks[0].clone(), tasks[2].clone()]
    );
    assert!(store.filter_by_category("low").is_empty());
    assert!(store.filter_by_category("Urgent").is_empty());
}

#[test]
fn date_range_filter_compares_strings_lexicographically() {
    let store = TaskStore::new(MemoryPreferenceStore::new());
    let january = task(1, "jan", "Jan 05, 2025", Category::High);
    let february = task(2, "feb", "Feb 01, 2025", Category::High);
    let last_year = task(3, "old", "Jan 15, 2024", Category::High);
    store
        .save_all(&[january.clone(), february.clone(), last_year.clone()])
        .unwrap();

    // "Jan 15, 2024" sorts between the bounds even though it is a year early.
    assert_eq!(
        store.filter_by_date_range("Jan 01, 2025", "Jan 31, 2025"),
        vec![january.clone(), last_year.clone()]
    );

    // "Feb" sorts before "Jan", so February falls outside January..March.
    assert_eq!(
        store.filter_by_date_range("Jan 01, 2025", "Mar 31, 2025"),
        vec![january.clone(), last_year]
    );
}

#[test]
fn calendar_range_filter_compares_dates() {
    let store = TaskStore::new(MemoryPreferenceStore::new());
    let january = task(1, "jan", "Jan 05, 2025", Category::High);
    let february = task(2, "feb", "Feb 01, 2025", Category::High);
    let last_year = task(3, "old", "Jan 15, 2024", Category::High);
    let undated = task(4, "undated", "someday", Category::High);
    store
        .save_all(&[january.clone(), february.clone(), last_year, undated])
        .unwrap();

    assert_eq!(
        store
            .filter_by_calendar_range("Jan 01, 2025", "Jan 31, 2025")
            .unwrap(),
        vec![january.clone()]
    );
    assert_eq!(
        store
            .filter_by_calendar_range("Jan 01, 2025", "Mar 31, 2025")
            .unwrap(),
        vec![january, february]
    );
    assert!(store
        .filter_by_calendar_range("yesterday", "Mar 31, 2025")
        .is_err());
}
