//! Subset-selection solver for payroll eligibility estimation.
//!
//! Chooses paycodes `x_j in {0,1}` to minimize `|sum_j x_j * value_j - target|`,
//! with a small secondary objective preferring fewer selected codes. Dollar
//! values are scaled to integer units (cents by default) so the search is
//! exact, and an explicit branch-and-bound with a time limit does the work of
//! the MILP formulation.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tracing::debug;

#[derive(Debug, Clone)]
pub struct SolveOptions {
    /// Multiplier converting dollars to integer units (100 = cents).
    pub scale: u32,
    pub time_limit: Duration,
    /// When more candidates are provided, only this many largest (by absolute
    /// value) are considered.
    pub max_candidates: usize,
    /// Break equal-error ties toward fewer selected codes.
    pub prefer_fewer: bool,
}

impl Default for SolveOptions {
    fn default() -> Self {
        Self {
            scale: 100,
            time_limit: Duration::from_secs(5),
            max_candidates: 50,
            prefer_fewer: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveStatus {
    /// The search ran to completion; the selection is a true optimum.
    Optimal,
    /// The time limit expired; the best incumbent found so far is returned.
    Feasible,
    /// No non-zero candidates to select from.
    Infeasible,
}

#[derive(Debug, Clone)]
pub struct Solution {
    pub status: SolveStatus,
    /// Selected paycodes, in candidate order (absolute value descending).
    pub selected: Vec<String>,
    /// Dollar sum of the selected values.
    pub selected_sum: f64,
    pub target: f64,
    /// Absolute error in dollars.
    pub abs_error: f64,
    /// Absolute error in scaled integer units.
    pub scaled_error: i64,
    pub solve_time: Duration,
    /// Candidates actually searched, after zero-filtering and truncation.
    pub num_candidates: usize,
}

/// Solves binary selection of pay codes to approximate `target` dollars.
///
/// Zero-valued codes are dropped up front. Values are expected to be
/// non-negative dollar amounts, but the search bound stays correct for
/// negative entries as well.
pub fn solve_subset_selection(
    values: &HashMap<String, f64>,
    target: f64,
    options: &SolveOptions,
) -> Solution {
    let started = Instant::now();
    let scale = f64::from(options.scale);
    let scaled_target = (target * scale).round() as i64;

    let mut items: Vec<(&str, f64)> = values
        .iter()
        .filter(|(_, value)| **value != 0.0)
        .map(|(code, value)| (code.as_str(), *value))
        .collect();

    if items.is_empty() {
        return Solution {
            status: SolveStatus::Infeasible,
            selected: Vec::new(),
            selected_sum: 0.0,
            target,
            abs_error: target.abs(),
            scaled_error: scaled_target.abs(),
            solve_time: started.elapsed(),
            num_candidates: 0,
        };
    }

    items.sort_by(|a, b| {
        b.1.abs()
            .partial_cmp(&a.1.abs())
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.0.cmp(b.0))
    });
    if items.len() > options.max_candidates {
        debug!(
            dropped = items.len() - options.max_candidates,
            kept = options.max_candidates,
            "truncating candidate set to the largest values"
        );
        items.truncate(options.max_candidates);
    }

    let scaled: Vec<i64> = items
        .iter()
        .map(|(_, value)| (value * scale).round() as i64)
        .collect();
    let n = scaled.len();

    // Reachable sum adjustments for the suffix starting at each index; the
    // interval [sum + suffix_neg, sum + suffix_pos] bounds every completion.
    let mut suffix_pos = vec![0i64; n + 1];
    let mut suffix_neg = vec![0i64; n + 1];
    for i in (0..n).rev() {
        suffix_pos[i] = suffix_pos[i + 1] + scaled[i].max(0);
        suffix_neg[i] = suffix_neg[i + 1] + scaled[i].min(0);
    }

    // The error term must always dominate the selected-count tiebreak.
    let large = i128::from(scaled_target.max(0) + 1).max(1_000_000);

    let mut search = Search {
        scaled: &scaled,
        suffix_pos: &suffix_pos,
        suffix_neg: &suffix_neg,
        scaled_target,
        large,
        prefer_fewer: options.prefer_fewer,
        deadline: started + options.time_limit,
        timed_out: false,
        // The empty selection is always available as the initial incumbent.
        best_cost: i128::MAX,
        best_picked: vec![false; n],
        picked: vec![false; n],
    };
    search.best_cost = search.objective(scaled_target.abs(), 0);
    search.descend(0, 0, 0);

    let status = if search.timed_out {
        debug!(
            limit_ms = options.time_limit.as_millis() as u64,
            "time limit expired; returning incumbent"
        );
        SolveStatus::Feasible
    } else {
        SolveStatus::Optimal
    };

    let mut selected = Vec::new();
    let mut selected_scaled = 0i64;
    for (i, picked) in search.best_picked.iter().enumerate() {
        if *picked {
            selected.push(items[i].0.to_string());
            selected_scaled += scaled[i];
        }
    }
    let scaled_error = (selected_scaled - scaled_target).abs();

    Solution {
        status,
        selected,
        selected_sum: selected_scaled as f64 / scale,
        target,
        abs_error: scaled_error as f64 / scale,
        scaled_error,
        solve_time: started.elapsed(),
        num_candidates: n,
    }
}

struct Search<'a> {
    scaled: &'a [i64],
    suffix_pos: &'a [i64],
    suffix_neg: &'a [i64],
    scaled_target: i64,
    large: i128,
    prefer_fewer: bool,
    deadline: Instant,
    timed_out: bool,
    best_cost: i128,
    best_picked: Vec<bool>,
    picked: Vec<bool>,
}

impl Search<'_> {
    fn objective(&self, diff: i64, count: usize) -> i128 {
        let mut cost = i128::from(diff) * self.large;
        if self.prefer_fewer {
            cost += count as i128;
        }
        cost
    }

    fn descend(&mut self, index: usize, sum: i64, count: usize) {
        if self.timed_out {
            return;
        }
        if Instant::now() >= self.deadline {
            self.timed_out = true;
            return;
        }

        // Tightest error still reachable below this node; since the count only
        // grows on the way down, this under-estimates every completion.
        let lo = sum + self.suffix_neg[index];
        let hi = sum + self.suffix_pos[index];
        let reachable_diff = if self.scaled_target < lo {
            lo - self.scaled_target
        } else if self.scaled_target > hi {
            self.scaled_target - hi
        } else {
            0
        };
        if self.objective(reachable_diff, count) >= self.best_cost {
            return;
        }

        if index == self.scaled.len() {
            let diff = (sum - self.scaled_target).abs();
            let cost = self.objective(diff, count);
            if cost < self.best_cost {
                self.best_cost = cost;
                self.best_picked.copy_from_slice(&self.picked);
            }
            return;
        }

        self.picked[index] = true;
        self.descend(index + 1, sum + self.scaled[index], count + 1);
        self.picked[index] = false;
        self.descend(index + 1, sum, count);
    }
}
