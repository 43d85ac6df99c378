use std::collections::HashSet;
use std::hash::Hash;

/// Merges ordered source lists, keeping the first occurrence of each key
///
/// Sources are consumed in the order given and items keep their position
/// within their source. When two sources yield the same entity, the copy from
/// the earlier source wins even if the later copy is newer or ranked higher:
/// precedence is source priority, never recency.
pub fn merge_first_seen<T, K, I, F>(sources: I, key: F) -> Vec<T>
where
    I: IntoIterator<Item = Vec<T>>,
    K: Eq + Hash,
    F: Fn(&T) -> K,
{
    let mut seen = HashSet::new();
    let mut merged = Vec::new();

    for source in sources {
        for item in source {
            if seen.insert(key(&item)) {
                merged.push(item);
            }
        }
    }

    merged
}
