//! Scope reindexing.
//!
//! The reindexer takes a flat, unordered collection of tasks and recomputes
//! dense, gap-free positions per scope. Completed tasks are partitioned off
//! and encoded from their completion instant, so they never need manual
//! reordering and always land after the incomplete tasks of the same scope.

use std::cmp::Ordering;

use uuid::Uuid;

use super::position::{encode_completed, encode_sequential};
use super::{OrderingError, SortMode};
use crate::entities::task;

/// One recomputed position, keyed by local task id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionAssignment {
    pub uuid: Uuid,
    pub position: String,
}

/// Recompute positions for every scope present in `tasks`.
///
/// Input order is the current manual order: under [`SortMode::Manual`] it is
/// preserved as-is and only compacted. The operation is idempotent; feeding
/// the result back in yields identical assignments.
pub fn reindex(tasks: &[task::Model], mode: SortMode) -> Vec<PositionAssignment> {
    let mut assignments = Vec::with_capacity(tasks.len());

    for (_, scope_tasks) in partition_scopes(tasks) {
        let (incomplete, completed): (Vec<_>, Vec<_>) =
            scope_tasks.into_iter().partition(|t| !t.is_completed);

        let mut incomplete = incomplete;
        match mode {
            SortMode::Manual => {}
            SortMode::DueDate => incomplete.sort_by(|a, b| due_date_cmp(a, b)),
            SortMode::Title => incomplete.sort_by(|a, b| title_cmp(a, b)),
        }

        for (index, task) in incomplete.iter().enumerate() {
            assignments.push(PositionAssignment {
                uuid: task.uuid,
                position: encode_sequential(index as u64),
            });
        }

        assignments.extend(completed_assignments(completed));
    }

    assignments
}

/// Recompute positions for a completed-only set of tasks.
///
/// Contract: every input task must be completed. An incomplete task is an
/// invalid-argument error, surfaced immediately and never retried.
pub fn sort_completed(tasks: &[task::Model]) -> Result<Vec<PositionAssignment>, OrderingError> {
    if let Some(open) = tasks.iter().find(|t| !t.is_completed) {
        return Err(OrderingError::IncompleteTask(open.uuid));
    }
    Ok(completed_assignments(tasks.iter().collect()))
}

/// Most recently completed first; position derives from the instant alone.
fn completed_assignments(mut completed: Vec<&task::Model>) -> Vec<PositionAssignment> {
    completed.sort_by(|a, b| completion_ms(b).cmp(&completion_ms(a)));
    completed
        .into_iter()
        .map(|task| PositionAssignment {
            uuid: task.uuid,
            position: encode_completed(completion_ms(task)),
        })
        .collect()
}

fn completion_ms(task: &task::Model) -> i64 {
    task.completed_ms.unwrap_or_default()
}

/// Group by `(list_uuid, parent_uuid)`, preserving input order within and
/// across scopes.
fn partition_scopes(tasks: &[task::Model]) -> Vec<((Uuid, Option<Uuid>), Vec<&task::Model>)> {
    let mut scopes: Vec<((Uuid, Option<Uuid>), Vec<&task::Model>)> = Vec::new();
    for task in tasks {
        let key = task.scope();
        match scopes.iter_mut().find(|(k, _)| *k == key) {
            Some((_, members)) => members.push(task),
            None => scopes.push((key, vec![task])),
        }
    }
    scopes
}

/// Ascending by due date, undated tasks last; ties keep manual order (the
/// sort is stable).
fn due_date_cmp(a: &task::Model, b: &task::Model) -> Ordering {
    match (&a.due_date, &b.due_date) {
        (Some(da), Some(db)) => da.cmp(db),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Case-insensitive ascending by title. When two titles are equal under case
/// folding, the lowercase-original variant sorts before the uppercase one
/// ("t1" before "T1"); that direction is a deliberate behavioral contract.
fn title_cmp(a: &task::Model, b: &task::Model) -> Ordering {
    a.title
        .to_lowercase()
        .cmp(&b.title.to_lowercase())
        .then_with(|| b.title.cmp(&a.title))
}
