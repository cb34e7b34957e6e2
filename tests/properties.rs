mod support;

use proptest::prelude::*;
use taskdex::due_date::{DueDateIndex, TraversalOrder};
use taskdex::graph::DependencyGraph;
use taskdex::index::TaskIndex;

use support::{date, task};

#[derive(Debug, Clone, Copy)]
enum Op {
    Add(u8),
    Undo,
    Redo,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (1u8..=10).prop_map(Op::Add),
        Just(Op::Undo),
        Just(Op::Redo),
    ]
}

proptest! {
    #[test]
    fn task_count_tracks_adds_undos_and_redos(ops in prop::collection::vec(op(), 0..60)) {
        let mut index = TaskIndex::new();
        index.register_user(1, "Alice").unwrap();

        let mut next_id = 0u32;
        let mut expected = 0usize;
        for op in ops {
            match op {
                Op::Add(prio) => {
                    next_id += 1;
                    index.add_task_to_user(1, task(next_id, &format!("t{next_id}"), prio)).unwrap();
                    expected += 1;
                }
                Op::Undo => {
                    if index.undo_last_task().is_some() {
                        expected -= 1;
                    }
                }
                Op::Redo => {
                    if index.redo_last_task().is_some() {
                        expected += 1;
                    }
                }
            }

            prop_assert_eq!(index.user_tasks(1).unwrap().len(), expected);
            prop_assert_eq!(index.ranking().len(), expected);
            prop_assert_eq!(index.schedule().len(), expected);
            prop_assert_eq!(index.arrival_log().len(), expected);
        }
    }

    #[test]
    fn ranked_view_is_sorted_by_priority(prios in prop::collection::vec(1u8..=10, 0..40)) {
        let mut index = TaskIndex::new();
        index.register_user(1, "Alice").unwrap();
        for (i, prio) in prios.iter().enumerate() {
            index.add_task_to_user(1, task(i as u32, "t", *prio)).unwrap();
        }

        let ranked = index.ranked();
        prop_assert_eq!(ranked.len(), prios.len());
        for pair in ranked.windows(2) {
            prop_assert!(pair[0].priority >= pair[1].priority);
            if pair[0].priority == pair[1].priority {
                prop_assert!(pair[0].id < pair[1].id);
            }
        }
    }

    #[test]
    fn in_order_traversal_is_ascending(days in prop::collection::vec(0i64..3650, 0..80)) {
        let base = date(2020, 1, 1);
        let mut tree = DueDateIndex::new();
        for (i, offset) in days.iter().enumerate() {
            tree.insert(format!("t{i}"), base + chrono::Duration::days(*offset));
        }

        let dates: Vec<_> = tree
            .traverse(TraversalOrder::InOrder)
            .iter()
            .map(|entry| entry.date)
            .collect();
        prop_assert_eq!(dates.len(), days.len());
        prop_assert!(dates.windows(2).all(|pair| pair[0] <= pair[1]));
    }

    #[test]
    fn acyclic_chains_never_report_cycles(len in 1usize..200, start in 0usize..200) {
        let mut graph = DependencyGraph::new();
        for i in 0..len {
            graph.add_dependency(&format!("n{}", i + 1), &format!("n{i}"));
        }
        let start = format!("n{}", start % (len + 1));
        prop_assert!(!graph.has_cycle_from(&start));

        graph.add_dependency("n0", &format!("n{len}"));
        prop_assert!(graph.has_cycle_from(&start));
    }
}
