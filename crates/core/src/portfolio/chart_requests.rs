use std::collections::HashMap;
use std::sync::Mutex;

/// Per-account request generations for last-request-wins chart loading.
///
/// Each chart request takes a ticket; only the holder of the newest ticket
/// for an account may publish its result.
#[derive(Debug, Default)]
pub struct ChartRequestTracker {
    generations: Mutex<HashMap<String, u64>>,
}

impl ChartRequestTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&self, account_id: &str) -> u64 {
        let mut generations = self
            .generations
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let generation = generations.entry(account_id.to_string()).or_insert(0);
        *generation += 1;
        *generation
    }

    pub fn is_current(&self, account_id: &str, ticket: u64) -> bool {
        self.generations
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(account_id)
            .is_some_and(|latest| *latest == ticket)
    }
}
