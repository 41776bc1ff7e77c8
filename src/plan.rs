//! Chunked commit planning
//!
//! Large workspaces are committed in several batches so that no single
//! commit carries much more than the configured ceiling. Files keep their
//! inventory order and are never split; a file bigger than the ceiling on
//! its own is left out and reported.

use serde::{Deserialize, Serialize};

use crate::scanner::{FileRecord, Inventory};
use crate::utils::MIB;

/// Byte thresholds for chunked pushes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushPolicy {
    /// A chunk is sealed once it reaches this many bytes
    pub chunk_ceiling: u64,
    /// Chunked mode is used only when the workspace is larger than this
    pub chunk_trigger_total: u64,
}

impl Default for PushPolicy {
    fn default() -> Self {
        Self {
            chunk_ceiling: 50 * MIB,
            chunk_trigger_total: 100 * MIB,
        }
    }
}

impl PushPolicy {
    pub fn from_mib(chunk_ceiling_mb: u64, chunk_trigger_mb: u64) -> Self {
        Self {
            chunk_ceiling: chunk_ceiling_mb * MIB,
            chunk_trigger_total: chunk_trigger_mb * MIB,
        }
    }

    pub fn is_chunked(&self, total_size: u64) -> bool {
        total_size > self.chunk_trigger_total
    }
}

/// Contiguous run of files for one commit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitChunk {
    pub paths: Vec<String>,
    /// Accumulated size of `paths` in bytes
    pub size: u64,
}

/// File left out of every chunk because it alone exceeds the ceiling
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedFile {
    pub path: String,
    pub size: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChunkPlan {
    pub chunks: Vec<CommitChunk>,
    pub skipped: Vec<SkippedFile>,
}

impl ChunkPlan {
    pub fn planned_bytes(&self) -> u64 {
        self.chunks.iter().map(|c| c.size).sum()
    }

    pub fn planned_files(&self) -> usize {
        self.chunks.iter().map(|c| c.paths.len()).sum()
    }
}

/// Partition an inventory into commit chunks
pub fn plan_chunks(inventory: &Inventory, ceiling: u64) -> ChunkPlan {
    plan_records(inventory.files(), ceiling)
}

/// Partition records in order; a chunk is sealed as soon as it reaches `ceiling`
pub fn plan_records(files: &[FileRecord], ceiling: u64) -> ChunkPlan {
    let mut plan = ChunkPlan::default();
    let mut pending: Vec<String> = Vec::new();
    let mut accumulated: u64 = 0;

    for file in files {
        if file.size > ceiling {
            plan.skipped.push(SkippedFile {
                path: file.path.clone(),
                size: file.size,
            });
            continue;
        }

        pending.push(file.path.clone());
        accumulated += file.size;

        if accumulated >= ceiling {
            plan.chunks.push(CommitChunk {
                paths: std::mem::take(&mut pending),
                size: accumulated,
            });
            accumulated = 0;
        }
    }

    if !pending.is_empty() {
        plan.chunks.push(CommitChunk {
            paths: pending,
            size: accumulated,
        });
    }

    plan
}

#[cfg(test)]
mod tests {
    use super::*;

    const MB: u64 = 1024 * 1024;

    fn inventory(sizes: &[u64]) -> Inventory {
        let mut inventory = Inventory::new("/work", "2025-01-01T00:00:00");
        for (i, size) in sizes.iter().enumerate() {
            inventory.push(FileRecord {
                path: format!("file{}", i + 1),
                size: *size,
                hash: String::new(),
                mtime: String::new(),
            });
        }
        inventory
    }

    fn chunk_paths(plan: &ChunkPlan) -> Vec<Vec<&str>> {
        plan.chunks
            .iter()
            .map(|c| c.paths.iter().map(String::as_str).collect())
            .collect()
    }

    #[test]
    fn test_three_files_of_thirty() {
        let plan = plan_chunks(&inventory(&[30 * MB, 30 * MB, 30 * MB]), 50 * MB);
        assert_eq!(chunk_paths(&plan), vec![vec!["file1", "file2"], vec!["file3"]]);
        assert_eq!(plan.chunks[0].size, 60 * MB);
        assert_eq!(plan.chunks[1].size, 30 * MB);
        assert!(plan.skipped.is_empty());
    }

    #[test]
    fn test_oversize_file_skipped() {
        let plan = plan_chunks(&inventory(&[200 * MB]), 50 * MB);
        assert!(plan.chunks.is_empty());
        assert_eq!(plan.skipped, vec![SkippedFile { path: "file1".into(), size: 200 * MB }]);
    }

    #[test]
    fn test_empty_inventory() {
        let plan = plan_chunks(&inventory(&[]), 50 * MB);
        assert!(plan.chunks.is_empty());
        assert!(plan.skipped.is_empty());
    }

    #[test]
    fn test_all_oversize() {
        let plan = plan_chunks(&inventory(&[51 * MB, 60 * MB, 500 * MB]), 50 * MB);
        assert!(plan.chunks.is_empty());
        assert_eq!(plan.skipped.len(), 3);
    }

    #[test]
    fn test_exact_ceiling_seals_chunk() {
        let plan = plan_chunks(&inventory(&[50 * MB, 1, 49 * MB]), 50 * MB);
        assert_eq!(chunk_paths(&plan), vec![vec!["file1"], vec!["file2", "file3"]]);
    }

    #[test]
    fn test_oversize_between_chunks_keeps_accumulator() {
        let plan = plan_chunks(&inventory(&[20 * MB, 80 * MB, 40 * MB]), 50 * MB);
        assert_eq!(chunk_paths(&plan), vec![vec!["file1", "file3"]]);
        assert_eq!(plan.skipped[0].path, "file2");
    }

    #[test]
    fn test_order_preserved_and_nothing_lost() {
        let sizes = [10 * MB, 70 * MB, 45 * MB, 5 * MB, 1, 49 * MB, 200 * MB, 3 * MB];
        let inv = inventory(&sizes);
        let plan = plan_chunks(&inv, 50 * MB);

        // Merge chunked and skipped paths back by original position
        let mut rebuilt: Vec<String> = plan
            .chunks
            .iter()
            .flat_map(|c| c.paths.iter().cloned())
            .chain(plan.skipped.iter().map(|s| s.path.clone()))
            .collect();
        let position = |p: &String| inv.files().iter().position(|f| &f.path == p).unwrap();
        let chunked: Vec<usize> = plan.chunks.iter().flat_map(|c| c.paths.iter()).map(position).collect();
        assert!(chunked.windows(2).all(|w| w[0] < w[1]));

        rebuilt.sort_by_key(position);
        let original: Vec<String> = inv.files().iter().map(|f| f.path.clone()).collect();
        assert_eq!(rebuilt, original);
    }

    #[test]
    fn test_planning_is_idempotent() {
        let inv = inventory(&[10 * MB, 70 * MB, 45 * MB, 5 * MB, 33 * MB]);
        assert_eq!(plan_chunks(&inv, 50 * MB), plan_chunks(&inv, 50 * MB));
    }

    #[test]
    fn test_chunks_are_maximal() {
        let inv = inventory(&[10 * MB, 15 * MB, 20 * MB, 30 * MB, 2 * MB, 60 * MB, 49 * MB, 1, 7 * MB]);
        let ceiling = 50 * MB;
        let plan = plan_chunks(&inv, ceiling);
        let size_of = |p: &str| inv.files().iter().find(|f| f.path == p).unwrap().size;

        let (last, sealed) = plan.chunks.split_last().unwrap();
        for chunk in sealed {
            assert!(chunk.size >= ceiling);
            let without_last: u64 = chunk.paths[..chunk.paths.len() - 1].iter().map(|p| size_of(p)).sum();
            assert!(without_last < ceiling);
        }
        assert!(last.size <= last.paths.iter().map(|p| size_of(p)).sum::<u64>());
        assert_eq!(plan.planned_bytes() + plan.skipped.iter().map(|s| s.size).sum::<u64>(), inv.total_size());
    }

    #[test]
    fn test_policy_trigger() {
        let policy = PushPolicy::default();
        assert!(!policy.is_chunked(100 * MB));
        assert!(policy.is_chunked(100 * MB + 1));
        assert_eq!(PushPolicy::from_mib(50, 100), policy);
    }
}
