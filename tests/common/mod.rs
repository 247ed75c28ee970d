//! Shared test fixtures: an in-memory mock of the remote task service and
//! helpers for building local models.
#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use tasklane::remote::{
    InsertListArgs, InsertTaskArgs, Page, PageQuery, RemoteApi, RemoteError, RemoteTask,
    RemoteTaskList, TaskQuery,
};

/// Base instant used for mock-assigned modification times.
pub const BASE_MS: i64 = 1_700_000_000_000;

#[derive(Default)]
struct MockState {
    lists: Vec<RemoteTaskList>,
    tasks: HashMap<String, Vec<RemoteTask>>,
    next_id: u64,
    list_insert_calls: u32,
    task_insert_calls: u32,
    list_delete_calls: u32,
    task_delete_calls: u32,
    unreachable: bool,
    failing_task_titles: HashSet<String>,
}

/// In-memory remote service double. Records call counts and lets tests seed
/// remote state or make the service unreachable.
#[derive(Default)]
pub struct MockRemote {
    state: Mutex<MockState>,
}

impl MockRemote {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_unreachable(&self, unreachable: bool) {
        self.state.lock().unwrap().unreachable = unreachable;
    }

    /// Make task inserts with this title fail until cleared.
    pub fn fail_insert_titled(&self, title: &str) {
        self.state
            .lock()
            .unwrap()
            .failing_task_titles
            .insert(title.to_string());
    }

    pub fn clear_insert_failures(&self) {
        self.state.lock().unwrap().failing_task_titles.clear();
    }

    pub fn seed_list(&self, id: &str, title: &str, updated_ms: i64) {
        let mut state = self.state.lock().unwrap();
        state.lists.push(RemoteTaskList {
            id: id.to_string(),
            title: title.to_string(),
            updated_ms,
        });
        state.tasks.entry(id.to_string()).or_default();
    }

    pub fn seed_task(&self, list_id: &str, task: RemoteTask) {
        let mut state = self.state.lock().unwrap();
        state.tasks.entry(list_id.to_string()).or_default().push(task);
    }

    pub fn rename_list(&self, id: &str, title: &str, updated_ms: i64) {
        let mut state = self.state.lock().unwrap();
        if let Some(list) = state.lists.iter_mut().find(|l| l.id == id) {
            list.title = title.to_string();
            list.updated_ms = updated_ms;
        }
    }

    pub fn remove_task(&self, list_id: &str, task_id: &str) {
        let mut state = self.state.lock().unwrap();
        if let Some(tasks) = state.tasks.get_mut(list_id) {
            tasks.retain(|t| t.id != task_id);
        }
    }

    pub fn list_insert_calls(&self) -> u32 {
        self.state.lock().unwrap().list_insert_calls
    }

    pub fn task_insert_calls(&self) -> u32 {
        self.state.lock().unwrap().task_insert_calls
    }

    pub fn task_delete_calls(&self) -> u32 {
        self.state.lock().unwrap().task_delete_calls
    }

    pub fn lists(&self) -> Vec<RemoteTaskList> {
        self.state.lock().unwrap().lists.clone()
    }

    pub fn tasks(&self, list_id: &str) -> Vec<RemoteTask> {
        self.state
            .lock()
            .unwrap()
            .tasks
            .get(list_id)
            .cloned()
            .unwrap_or_default()
    }
}

fn paginate<T: Clone>(items: &[T], max_results: Option<u32>, token: &Option<String>) -> Page<T> {
    let start: usize = token
        .as_deref()
        .and_then(|t| t.parse().ok())
        .unwrap_or(0);
    let window = max_results.map_or(usize::MAX, |m| m as usize);
    let end = start.saturating_add(window).min(items.len());
    let next_page_token = (end < items.len()).then(|| end.to_string());
    Page {
        items: items[start..end].to_vec(),
        next_page_token,
    }
}

#[async_trait]
impl RemoteApi for MockRemote {
    async fn list_task_lists(&self, page: PageQuery) -> Result<Page<RemoteTaskList>, RemoteError> {
        let state = self.state.lock().unwrap();
        if state.unreachable {
            return Err(RemoteError::Network("connection refused".to_string()));
        }
        Ok(paginate(&state.lists, page.max_results, &page.page_token))
    }

    async fn insert_task_list(&self, args: InsertListArgs) -> Result<RemoteTaskList, RemoteError> {
        let mut state = self.state.lock().unwrap();
        if state.unreachable {
            return Err(RemoteError::Network("connection refused".to_string()));
        }
        state.list_insert_calls += 1;
        state.next_id += 1;
        let list = RemoteTaskList {
            id: format!("rl-{}", state.next_id),
            title: args.title,
            updated_ms: BASE_MS + state.next_id as i64,
        };
        state.lists.push(list.clone());
        state.tasks.entry(list.id.clone()).or_default();
        Ok(list)
    }

    async fn delete_task_list(&self, list_id: &str) -> Result<(), RemoteError> {
        let mut state = self.state.lock().unwrap();
        if state.unreachable {
            return Err(RemoteError::Network("connection refused".to_string()));
        }
        state.list_delete_calls += 1;
        let before = state.lists.len();
        state.lists.retain(|l| l.id != list_id);
        state.tasks.remove(list_id);
        if state.lists.len() == before {
            return Err(RemoteError::NotFound(list_id.to_string()));
        }
        Ok(())
    }

    async fn list_tasks(&self, list_id: &str, query: TaskQuery) -> Result<Page<RemoteTask>, RemoteError> {
        let state = self.state.lock().unwrap();
        if state.unreachable {
            return Err(RemoteError::Network("connection refused".to_string()));
        }
        let Some(tasks) = state.tasks.get(list_id) else {
            return Err(RemoteError::NotFound(list_id.to_string()));
        };
        let filtered: Vec<RemoteTask> = tasks
            .iter()
            .filter(|t| query.show_deleted || !t.deleted)
            .filter(|t| query.show_hidden || !t.hidden)
            .filter(|t| query.show_completed || !t.is_completed)
            .filter(|t| query.updated_min.map_or(true, |min| t.updated_ms >= min))
            .cloned()
            .collect();
        Ok(paginate(&filtered, query.max_results, &query.page_token))
    }

    async fn insert_task(
        &self,
        list_id: &str,
        args: InsertTaskArgs,
        parent_id: Option<&str>,
        _previous_id: Option<&str>,
    ) -> Result<RemoteTask, RemoteError> {
        let mut state = self.state.lock().unwrap();
        if state.unreachable {
            return Err(RemoteError::Network("connection refused".to_string()));
        }
        if state.failing_task_titles.contains(&args.title) {
            return Err(RemoteError::Other(format!("insert rejected: {}", args.title)));
        }
        if !state.tasks.contains_key(list_id) {
            return Err(RemoteError::NotFound(list_id.to_string()));
        }
        state.task_insert_calls += 1;
        state.next_id += 1;
        let task = RemoteTask {
            id: format!("rt-{}", state.next_id),
            title: args.title,
            notes: args.notes,
            parent_id: parent_id.map(str::to_string),
            position: format!("{:020}", state.next_id),
            due_date: args.due_date,
            is_completed: args.is_completed,
            completed_ms: args.completed_ms,
            updated_ms: BASE_MS + state.next_id as i64,
            deleted: false,
            hidden: false,
        };
        state
            .tasks
            .get_mut(list_id)
            .expect("list checked above")
            .push(task.clone());
        Ok(task)
    }

    async fn delete_task(&self, list_id: &str, task_id: &str) -> Result<(), RemoteError> {
        let mut state = self.state.lock().unwrap();
        if state.unreachable {
            return Err(RemoteError::Network("connection refused".to_string()));
        }
        state.task_delete_calls += 1;
        let Some(tasks) = state.tasks.get_mut(list_id) else {
            return Err(RemoteError::NotFound(list_id.to_string()));
        };
        let before = tasks.len();
        tasks.retain(|t| t.id != task_id);
        if tasks.len() == before {
            return Err(RemoteError::NotFound(task_id.to_string()));
        }
        Ok(())
    }

    async fn clear_completed(&self, list_id: &str) -> Result<(), RemoteError> {
        let mut state = self.state.lock().unwrap();
        if state.unreachable {
            return Err(RemoteError::Network("connection refused".to_string()));
        }
        let Some(tasks) = state.tasks.get_mut(list_id) else {
            return Err(RemoteError::NotFound(list_id.to_string()));
        };
        tasks.retain(|t| !t.is_completed);
        Ok(())
    }
}

/// Build a sync service over fresh in-memory storage and the given mock.
pub async fn service(remote: std::sync::Arc<MockRemote>) -> tasklane::sync::SyncService {
    let storage = tasklane::storage::LocalStorage::new()
        .await
        .expect("in-memory storage");
    tasklane::sync::SyncService::with_storage(storage, remote, &tasklane::config::Config::default())
}

/// Remote task fixture with sensible defaults.
pub fn remote_task(id: &str, title: &str, updated_ms: i64) -> RemoteTask {
    RemoteTask {
        id: id.to_string(),
        title: title.to_string(),
        notes: None,
        parent_id: None,
        position: format!("{:020}", 0),
        due_date: None,
        is_completed: false,
        completed_ms: None,
        updated_ms,
        deleted: false,
        hidden: false,
    }
}
