use futures::future::{join_all, BoxFuture};

use crate::error::{AppError, AppResult};

/// One named source fetch
pub struct Source<'a, T> {
    pub name: &'static str,
    pub fetch: BoxFuture<'a, AppResult<Vec<T>>>,
}

impl<'a, T> Source<'a, T> {
    pub fn new(name: &'static str, fetch: BoxFuture<'a, AppResult<Vec<T>>>) -> Self {
        Self { name, fetch }
    }
}

/// Results of a concurrent multi-source fetch
///
/// `lists[i]` belongs to the i-th source passed to [`gather`]; a failed source
/// contributes an empty list in its slot.
#[derive(Debug)]
pub struct Gathered<T> {
    pub lists: Vec<Vec<T>>,
    pub failures: Vec<(&'static str, AppError)>,
}

impl<T> Gathered<T> {
    pub fn all_failed(&self) -> bool {
        !self.failures.is_empty() && self.failures.len() == self.lists.len()
    }

    /// Surfaces the first error when no source succeeded
    pub fn into_lists(mut self) -> AppResult<Vec<Vec<T>>> {
        if self.all_failed() {
            let (_, error) = self.failures.remove(0);
            return Err(error);
        }
        Ok(self.lists)
    }
}

/// Treats a failed source as empty, logging the failure
pub fn isolate<T>(name: &str, result: AppResult<Vec<T>>) -> Vec<T> {
    match result {
        Ok(items) => items,
        Err(e) => {
            tracing::warn!(source = %name, error = %e, "Source fetch failed, using empty result");
            Vec::new()
        }
    }
}

/// Runs every source concurrently and waits for all of them
///
/// A failing source never cancels the others; its slot is empty and the error
/// is kept in `failures`.
pub async fn gather<T>(sources: Vec<Source<'_, T>>) -> Gathered<T> {
    let names: Vec<&'static str> = sources.iter().map(|s| s.name).collect();
    let results = join_all(sources.into_iter().map(|s| s.fetch)).await;

    let mut lists = Vec::with_capacity(results.len());
    let mut failures = Vec::new();

    for (name, result) in names.into_iter().zip(results) {
        match result {
            Ok(items) => lists.push(items),
            Err(e) => {
                tracing::warn!(source = %name, error = %e, "Source fetch failed, using empty result");
                failures.push((name, e));
                lists.push(Vec::new());
            }
        }
    }

    if !failures.is_empty() {
        tracing::warn!(
            success_count = lists.len() - failures.len(),
            error_count = failures.len(),
            "Partial source fetch failure"
        );
    }

    Gathered { lists, failures }
}
