//! Filtering, ordering and paging shared by list queries

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Sort direction on `createdAt`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// Inclusive range check where either bound may be open
pub(crate) fn within(
    value: DateTime<Utc>,
    from: Option<DateTime<Utc>>,
    to: Option<DateTime<Utc>>,
) -> bool {
    from.is_none_or(|from| value >= from) && to.is_none_or(|to| value <= to)
}

/// An absent filter matches anything, an absent value matches no filter
pub(crate) fn prefix_matches(filter: Option<&str>, value: Option<&str>) -> bool {
    match (filter, value) {
        (None, _) => true,
        (Some(filter), Some(value)) => value.starts_with(filter),
        (Some(_), None) => false,
    }
}

/// Order by creation time, then skip and take
pub(crate) fn order_and_page<T>(
    mut items: Vec<T>,
    created_at: impl Fn(&T) -> DateTime<Utc>,
    order: Option<SortOrder>,
    skip: Option<usize>,
    take: Option<usize>,
) -> Vec<T> {
    match order.unwrap_or_default() {
        SortOrder::Asc => items.sort_by_key(|item| created_at(item)),
        SortOrder::Desc => items.sort_by_key(|item| std::cmp::Reverse(created_at(item))),
    }

    items
        .into_iter()
        .skip(skip.unwrap_or(0))
        .take(take.unwrap_or(usize::MAX))
        .collect()
}
