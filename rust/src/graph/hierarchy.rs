//! Parent/child hierarchy levels.
//!
//! Parent links are resolved through the task index, never through object
//! references. A parent cycle is a separate invariant from a dependency
//! cycle, so it gets its own visited-set guard here.

use rustc_hash::FxHashSet;

use crate::config::{DanglingPolicy, SchedulingConfig};
use crate::error::{EntityKind, ScheduleError, ValidationError};
use crate::log_changes;
use crate::models::Task;

use super::index::{TaskIdx, TaskIndex};

fn parent_of(
    task: &Task,
    index: &TaskIndex,
    config: &SchedulingConfig,
) -> Result<Option<TaskIdx>, ScheduleError> {
    let Some(parent_id) = task.parent_id.as_deref() else {
        return Ok(None);
    };
    match (index.get(parent_id), config.dangling_references) {
        (Some(idx), _) => Ok(Some(idx)),
        (None, DanglingPolicy::Ignore) => {
            log_changes!(
                config.verbosity,
                "Task {} has unknown parent {}; treating it as a root",
                task.id,
                parent_id
            );
            Ok(None)
        }
        (None, DanglingPolicy::Reject) => {
            Err(ScheduleError::not_found(EntityKind::ParentTask, parent_id))
        }
    }
}

/// Hierarchy level of every task (roots are 0), memoized across walks.
///
/// # Errors
/// * `Validation(OwnAncestor)` if a parent chain loops back on itself
/// * `NotFound` for an unknown parent under `DanglingPolicy::Reject`
pub(crate) fn compute_levels(
    tasks: &[&Task],
    index: &TaskIndex,
    config: &SchedulingConfig,
) -> Result<Vec<u32>, ScheduleError> {
    let mut levels: Vec<Option<u32>> = vec![None; tasks.len()];
    let mut path: Vec<TaskIdx> = Vec::new();
    let mut on_path: FxHashSet<TaskIdx> = FxHashSet::default();

    for start in 0..tasks.len() as TaskIdx {
        if levels[start as usize].is_some() {
            continue;
        }
        path.clear();
        on_path.clear();

        // Climb until a root or an ancestor whose level is already known
        let mut known_ancestor_level = None;
        let mut cursor = Some(start);
        while let Some(current) = cursor {
            if let Some(level) = levels[current as usize] {
                known_ancestor_level = Some(level);
                break;
            }
            if !on_path.insert(current) {
                return Err(ValidationError::OwnAncestor(index.id(current).to_string()).into());
            }
            path.push(current);
            cursor = parent_of(tasks[current as usize], index, config)?;
        }

        let mut level = known_ancestor_level.map_or(0, |l| l + 1);
        for &task in path.iter().rev() {
            levels[task as usize] = Some(level);
            level += 1;
        }
    }

    Ok(levels.into_iter().map(|l| l.unwrap_or(0)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn levels_for(tasks: &[Task], config: &SchedulingConfig) -> Result<Vec<u32>, ScheduleError> {
        let mut index = TaskIndex::default();
        for task in tasks {
            index.insert(&task.id);
        }
        let refs: Vec<&Task> = tasks.iter().collect();
        compute_levels(&refs, &index, config)
    }

    #[test]
    fn test_levels_follow_parent_chain() {
        // Children listed before their parents to exercise memoization
        let tasks = vec![
            Task::new("leaf", "p", 1).with_parent("phase"),
            Task::new("phase", "p", 1).with_parent("root"),
            Task::new("root", "p", 1),
            Task::new("sibling", "p", 1).with_parent("phase"),
        ];
        let levels = levels_for(&tasks, &SchedulingConfig::default()).unwrap();
        assert_eq!(levels, vec![2, 1, 0, 2]);
    }

    #[test]
    fn test_self_parent_rejected() {
        let tasks = vec![Task::new("a", "p", 1).with_parent("a")];
        let err = levels_for(&tasks, &SchedulingConfig::default()).unwrap_err();
        assert_eq!(
            err,
            ScheduleError::Validation(ValidationError::OwnAncestor("a".to_string()))
        );
    }

    #[test]
    fn test_parent_cycle_rejected() {
        let tasks = vec![
            Task::new("a", "p", 1).with_parent("b"),
            Task::new("b", "p", 1).with_parent("c"),
            Task::new("c", "p", 1).with_parent("b"),
        ];
        let err = levels_for(&tasks, &SchedulingConfig::default()).unwrap_err();
        assert_eq!(
            err,
            ScheduleError::Validation(ValidationError::OwnAncestor("b".to_string()))
        );
    }

    #[test]
    fn test_unknown_parent() {
        let tasks = vec![Task::new("a", "p", 1).with_parent("missing")];
        assert!(matches!(
            levels_for(&tasks, &SchedulingConfig::default()),
            Err(ScheduleError::NotFound {
                kind: EntityKind::ParentTask,
                ..
            })
        ));

        let config = SchedulingConfig {
            dangling_references: DanglingPolicy::Ignore,
            ..Default::default()
        };
        assert_eq!(levels_for(&tasks, &config).unwrap(), vec![0]);
    }
}
