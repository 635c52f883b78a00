use proptest::prelude::*;

/// Subscriber priorities drawn from a narrow range so ties are common
pub fn priorities_strategy() -> impl Strategy<Value = Vec<i32>> {
    prop::collection::vec(-3i32..=3, 0..12)
}

/// Number of behaviors wrapped around a handler
pub fn behavior_count_strategy() -> impl Strategy<Value = usize> {
    0usize..8
}

/// Indices of `priorities` in the order a stable descending sort yields
pub fn expected_delivery_order(priorities: &[i32]) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..priorities.len()).collect();
    indices.sort_by(|a, b| priorities[*b].cmp(&priorities[*a]));
    indices
}
