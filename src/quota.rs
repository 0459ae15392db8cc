//! Per-run processing budget.

/// Result of applying the budget to the stale assets of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition<T> {
    pub process_now: Vec<T>,
    pub deferred: Vec<T>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct QuotaLimiter {
    budget: Option<usize>,
}

impl QuotaLimiter {
    /// A budget of `None` or `Some(0)` disables limiting.
    pub fn new(budget: Option<usize>) -> Self {
        Self {
            budget: budget.filter(|&b| b > 0),
        }
    }

    pub fn unlimited() -> Self {
        Self { budget: None }
    }

    pub fn budget(&self) -> Option<usize> {
        self.budget
    }

    /// Keeps the first `budget` items (traversal order) for this run and
    /// defers the rest.
    pub fn partition<T>(&self, mut stale: Vec<T>) -> Partition<T> {
        let deferred = match self.budget {
            Some(budget) if stale.len() > budget => stale.split_off(budget),
            _ => Vec::new(),
        };
        Partition {
            process_now: stale,
            deferred,
        }
    }
}
