//! Property tests for range partitioning.
//!
//! The partition set must be pairwise disjoint, contiguous, and cover
//! exactly `[0, collection_size)` for every input, with the final
//! partition absorbing the floor-division remainder.

use proptest::prelude::*;
use shardmill::partition::{partition_collection, Partition};

proptest! {
    #[test]
    fn partitions_are_contiguous_and_cover_exactly(
        collection_size in 0u64..100_000,
        worker_count in 1usize..64,
    ) {
        let partitions = partition_collection(collection_size, worker_count).unwrap();

        prop_assert_eq!(partitions.len(), worker_count);
        prop_assert_eq!(partitions[0].skip, 0);

        // Contiguity doubles as disjointness for sorted ranges.
        for pair in partitions.windows(2) {
            prop_assert_eq!(pair[1].skip, pair[0].skip + pair[0].limit);
        }

        let last = &partitions[worker_count - 1];
        prop_assert_eq!(last.skip + last.limit, collection_size);

        let total: u64 = partitions.iter().map(|p| p.limit).sum();
        prop_assert_eq!(total, collection_size);
    }

    #[test]
    fn all_but_last_share_the_floor_batch_size(
        collection_size in 0u64..100_000,
        worker_count in 1usize..64,
    ) {
        let partitions = partition_collection(collection_size, worker_count).unwrap();
        let batch_size = collection_size / worker_count as u64;
        for partition in &partitions[..worker_count - 1] {
            prop_assert_eq!(partition.limit, batch_size);
        }
    }

    #[test]
    fn empty_collection_means_all_empty_partitions(worker_count in 1usize..64) {
        let partitions = partition_collection(0, worker_count).unwrap();
        prop_assert!(partitions.iter().all(|p| p.limit == 0));
    }
}

#[test]
fn literal_ten_by_three_scenario() {
    assert_eq!(
        partition_collection(10, 3).unwrap(),
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
fn literal_two_by_five_scenario() {
    // batch_size = 2 // 5 = 0: four degenerate leading partitions with
    // skip 0 and limit 0, then the last partition covering both
    // records from skip 0.
    assert_eq!(
        partition_collection(2, 5).unwrap(),
        vec![
            Partition {
                index: 0,
                skip: 0,
                limit: 0
            },
            Partition {
                index: 1,
                skip: 0,
                limit: 0
            },
            Partition {
                index: 2,
                skip: 0,
                limit: 0
            },
            Partition {
                index: 3,
                skip: 0,
                limit: 0
            },
            Partition {
                index: 4,
                skip: 0,
                limit: 2
            },
        ]
    );
}
