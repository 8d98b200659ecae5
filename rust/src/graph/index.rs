//! Dense integer indexing for task ids.
//!
//! The graph stores tasks in an arena; every adjacency list and per-task
//! vector is addressed by [`TaskIdx`], and strings only appear at the edges.

use rustc_hash::FxHashMap;

/// Arena position of a task (u32 for compact adjacency lists).
pub type TaskIdx = u32;

/// Bidirectional map between task id strings and arena positions.
#[derive(Debug, Clone, Default)]
pub struct TaskIndex {
    by_id: FxHashMap<String, TaskIdx>,
    ids: Vec<String>,
}

impl TaskIndex {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            by_id: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            ids: Vec::with_capacity(capacity),
        }
    }

    /// Register a new id. Returns `None` if the id is already present.
    pub fn insert(&mut self, id: &str) -> Option<TaskIdx> {
        if self.by_id.contains_key(id) {
            return None;
        }
        let idx = self.ids.len() as TaskIdx;
        self.ids.push(id.to_string());
        self.by_id.insert(id.to_string(), idx);
        Some(idx)
    }

    #[inline]
    pub fn get(&self, id: &str) -> Option<TaskIdx> {
        self.by_id.get(id).copied()
    }

    /// Id of an arena position. Panics on an index this map never issued.
    #[inline]
    pub fn id(&self, idx: TaskIdx) -> &str {
        &self.ids[idx as usize]
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_lookup() {
        let mut index = TaskIndex::with_capacity(2);
        assert_eq!(index.insert("design"), Some(0));
        assert_eq!(index.insert("build"), Some(1));
        assert_eq!(index.insert("design"), None);

        assert_eq!(index.get("build"), Some(1));
        assert_eq!(index.get("ship"), None);
        assert_eq!(index.id(0), "design");
        assert_eq!(index.len(), 2);
    }
}
