use std::cmp::Reverse;

use crate::record::ActivityRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Order {
    OldestFirst,
    #[default]
    NewestFirst,
}

/// Sort by creation time. The sort is stable in both directions, so records
/// created in the same second keep the order they were collected in.
pub fn sort_timeline(records: &mut [ActivityRecord], order: Order) {
    match order {
        Order::OldestFirst => records.sort_by_key(ActivityRecord::creation_time),
        Order::NewestFirst => records.sort_by_key(|record| Reverse(record.creation_time())),
    }
}

/// Collect records from unrelated sources into one ordered timeline.
pub fn merge_timeline<I>(sources: I, order: Order) -> Vec<ActivityRecord>
where
    I: IntoIterator,
    I::Item: IntoIterator<Item = ActivityRecord>,
{
    let mut merged: Vec<ActivityRecord> = sources.into_iter().flatten().collect();
    sort_timeline(&mut merged, order);
    merged
}
