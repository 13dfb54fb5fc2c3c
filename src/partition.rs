//! # Range Partitioning
//!
//! Deterministic, non-overlapping partitioning of an ordered collection
//! across a fixed pool of workers. The batch size is the floor of
//! `collection_size / worker_count`; every partition but the last gets
//! exactly that many records, and the last partition absorbs the
//! truncation remainder so the union covers the whole collection.
//!
//! The remainder absorption is intentional and load-uneven. Downstream
//! shard naming and record counts depend on it, so it must not be
//! "fixed" to a more even distribution.

use serde::{Deserialize, Serialize};

use crate::error::{Result, ShardmillError};

/// One contiguous, order-preserving slice of a collection, owned by
/// exactly one worker.
///
/// For partitions sorted by index: `skip(0) == 0`,
/// `skip(i+1) == skip(i) + limit(i)`, and the final partition ends at
/// `collection_size`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Partition {
    /// Position of this partition in `[0, worker_count)`.
    pub index: usize,
    /// Number of records to skip before this partition's window.
    pub skip: u64,
    /// Number of records in this partition's window.
    pub limit: u64,
}

/// Split `collection_size` records into `worker_count` disjoint,
/// contiguous partitions.
///
/// When `collection_size < worker_count` every partition but the last
/// is empty and the last takes the entire collection. This degenerate
/// shape is a real corner, not an error.
pub fn partition_collection(collection_size: u64, worker_count: usize) -> Result<Vec<Partition>> {
    if worker_count == 0 {
        return Err(ShardmillError::configuration(
            "worker_count must be at least 1",
        ));
    }

    let batch_size = collection_size / worker_count as u64;
    let mut partitions = Vec::with_capacity(worker_count);

    for index in 0..worker_count {
        let skip = index as u64 * batch_size;
        let limit = if index == worker_count - 1 {
            // Last partition absorbs the floor-division remainder.
            collection_size - skip
        } else {
            batch_size
        };
        partitions.push(Partition { index, skip, limit });
    }

    Ok(partitions)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ten_records_three_workers() {
        let partitions = partition_collection(10, 3).unwrap();
        assert_eq!(
            partitions,
            vec![
                Partition {
                    index: 0,
                    skip: 0,
                    limit: 3
                },
                Partition {
                    index: 1,
                    skip: 3,
                    limit: 3
                },
                Partition {
                    index: 2,
                    skip: 6,
                    limit: 4
                },
            ]
        );
    }

    #[test]
    fn test_fewer_records_than_workers() {
        // batch_size = 2 // 5 = 0, so every skip is 0; the last
        // partition covers both records.
        let partitions = partition_collection(2, 5).unwrap();
        assert_eq!(partitions.len(), 5);
        for partition in &partitions[..4] {
            assert_eq!(partition.skip, 0);
            assert_eq!(partition.limit, 0);
        }
        assert_eq!(partitions[4].skip, 0);
        assert_eq!(partitions[4].limit, 2);
    }

    #[test]
    fn test_single_worker_takes_everything() {
        let partitions = partition_collection(42, 1).unwrap();
        assert_eq!(
            partitions,
            vec![Partition {
                index: 0,
                skip: 0,
                limit: 42
            }]
        );
    }

    #[test]
    fn test_empty_collection() {
        let partitions = partition_collection(0, 3).unwrap();
        assert!(partitions.iter().all(|p| p.limit == 0));
    }

    #[test]
    fn test_zero_workers_is_configuration_error() {
        assert!(matches!(
            partition_collection(10, 0),
            Err(ShardmillError::Configuration { .. })
        ));
    }

    #[test]
    fn test_partitions_cover_collection_exactly() {
        for (size, workers) in [(0u64, 1usize), (1, 1), (7, 3), (100, 7), (3, 8), (1000, 1)] {
            let partitions = partition_collection(size, workers).unwrap();
            assert_eq!(partitions.len(), workers);
            assert_eq!(partitions[0].skip, 0);
            for pair in partitions.windows(2) {
                assert_eq!(pair[1].skip, pair[0].skip + pair[0].limit);
            }
            let total: u64 = partitions.iter().map(|p| p.limit).sum();
            assert_eq!(total, size);
        }
    }
}
