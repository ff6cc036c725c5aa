//! Ordering of registered callbacks.
//!
//! Constraints become edges `a -> b` ("a runs before b"). A wildcard
//! `before("*")` on `a` adds an edge from `a` to every callback that does not
//! itself claim `before("*")`, and symmetrically for `after("*")`, so several
//! wildcard claimers keep their registration order among themselves.
//!
//! The sort is Kahn's algorithm with a stable pick: at every step the
//! earliest-registered callback whose predecessors are all placed goes next.

use std::collections::HashMap;

use crate::error::ConstraintConflict;

use super::processor::Callback;

/// Name used in `before`/`after` to mean every other callback of the phase.
pub const WILDCARD: &str = "*";

/// Returns callback indices in execution order.
pub(crate) fn sort(callbacks: &[Callback]) -> Result<Vec<usize>, ConstraintConflict> {
    let graph = Graph::build(callbacks);
    graph.check_direct_conflicts(callbacks)?;
    graph.order(callbacks)
}

struct Graph {
    /// `preds[b]` holds every `a` with an edge `a -> b`.
    preds: Vec<Vec<bool>>,
}

impl Graph {
    fn build(callbacks: &[Callback]) -> Self {
        let n = callbacks.len();
        let index: HashMap<&str, usize> = callbacks
            .iter()
            .enumerate()
            .map(|(idx, cb)| (cb.name.as_str(), idx))
            .collect();
        let mut preds = vec![vec![false; n]; n];

        for (a, cb) in callbacks.iter().enumerate() {
            for name in &cb.before {
                if name == WILDCARD {
                    for (b, other) in callbacks.iter().enumerate() {
                        if b != a && !other.before.contains(WILDCARD) {
                            preds[b][a] = true;
                        }
                    }
                } else if let Some(&b) = index.get(name.as_str()) {
                    if b != a {
                        preds[b][a] = true;
                    }
                }
            }
            for name in &cb.after {
                if name == WILDCARD {
                    for (b, other) in callbacks.iter().enumerate() {
                        if b != a && !other.after.contains(WILDCARD) {
                            preds[a][b] = true;
                        }
                    }
                } else if let Some(&b) = index.get(name.as_str()) {
                    if b != a {
                        preds[a][b] = true;
                    }
                }
            }
        }

        Self { preds }
    }

    fn check_direct_conflicts(&self, callbacks: &[Callback]) -> Result<(), ConstraintConflict> {
        for a in 0..self.preds.len() {
            for b in (a + 1)..self.preds.len() {
                if self.preds[a][b] && self.preds[b][a] {
                    return Err(conflict(callbacks, a, b));
                }
            }
        }
        Ok(())
    }

    fn order(&self, callbacks: &[Callback]) -> Result<Vec<usize>, ConstraintConflict> {
        let n = self.preds.len();
        let mut placed = vec![false; n];
        let mut order = Vec::with_capacity(n);

        while order.len() < n {
            let next = (0..n).find(|&b| {
                !placed[b] && self.preds[b].iter().zip(&placed).all(|(&p, &done)| !p || done)
            });
            match next {
                Some(b) => {
                    placed[b] = true;
                    order.push(b);
                }
                None => {
                    // Every unplaced node waits on another unplaced node.
                    let stuck = (0..n).find(|&b| !placed[b]).unwrap_or_default();
                    let blocker = (0..n)
                        .find(|&a| self.preds[stuck][a] && !placed[a])
                        .unwrap_or(stuck);
                    return Err(conflict(callbacks, stuck, blocker));
                }
            }
        }

        Ok(order)
    }
}

fn conflict(callbacks: &[Callback], a: usize, b: usize) -> ConstraintConflict {
    ConstraintConflict {
        callback: callbacks[a].name.clone(),
        other: callbacks[b].name.clone(),
    }
}
