//! Depth/iteration-bounded traversal guards.
//!
//! The occurs-check, `unify`, `generalize`/`instantiate`, and the shared
//! `toString`/`realizeString`/`canRealize`/`hasUnbound` walk all recurse
//! over the same type graph. None of them can recurse forever (the
//! occurs-check forbids cycles), but a very deep, non-cyclic graph is
//! still reachable from pathological generated code and must fail
//! closed rather than blow the stack.

use rustc_hash::FxHashSet;
use std::hash::Hash;

/// A named recursion budget for one of this engine's traversals.
///
/// `Custom` lets a caller pick an ad hoc budget (used by tests); the
/// named variants are the ones the engine itself reaches for, mirroring
/// `glyph_common::limits`' constants one-to-one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecursionProfile {
    /// The occurs-check traversal.
    OccursCheck,
    /// The structural unifier.
    Unify,
    /// `generalize`/`instantiate`.
    Generalize,
    /// `toString`/`realizeString`/`canRealize`/`hasUnbound`.
    Print,
    Custom { max_depth: u32, max_iterations: u32 },
}

impl RecursionProfile {
    pub fn max_depth(self) -> u32 {
        match self {
            RecursionProfile::OccursCheck => glyph_common::limits::MAX_OCCURS_DEPTH,
            RecursionProfile::Unify => glyph_common::limits::MAX_UNIFY_DEPTH,
            RecursionProfile::Generalize => glyph_common::limits::MAX_GENERALIZE_DEPTH,
            RecursionProfile::Print => glyph_common::limits::MAX_PRINT_DEPTH,
            RecursionProfile::Custom { max_depth, .. } => max_depth,
        }
    }

    pub fn max_iterations(self) -> u32 {
        match self {
            RecursionProfile::Custom { max_iterations, .. } => max_iterations,
            // Named profiles don't bound total node visits separately
            // from depth; an order of magnitude above the deepest
            // legitimate traversal is enough headroom for a wide
            // (not just deep) pathological graph.
            _ => self.max_depth().saturating_mul(64).max(1),
        }
    }
}

/// Outcome of [`RecursionGuard::enter`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecursionResult {
    Entered,
    /// The key being entered is already on the current path.
    Cycle,
    DepthExceeded,
    IterationExceeded,
}

impl RecursionResult {
    pub fn is_entered(self) -> bool {
        matches!(self, RecursionResult::Entered)
    }

    pub fn is_cycle(self) -> bool {
        matches!(self, RecursionResult::Cycle)
    }

    pub fn is_exceeded(self) -> bool {
        matches!(
            self,
            RecursionResult::DepthExceeded | RecursionResult::IterationExceeded
        )
    }

    pub fn is_denied(self) -> bool {
        !self.is_entered()
    }
}

/// Tracks the current recursion path by key, bounding both depth and
/// total entry attempts, and detecting cycles (re-entering a key still
/// on the path).
pub struct RecursionGuard<K> {
    visiting: FxHashSet<K>,
    depth: u32,
    max_depth: u32,
    iterations: u32,
    max_iterations: u32,
    max_visiting: Option<usize>,
    exceeded: bool,
}

impl<K: Eq + Hash + Clone> RecursionGuard<K> {
    pub fn new(max_depth: u32, max_iterations: u32) -> Self {
        RecursionGuard {
            visiting: FxHashSet::default(),
            depth: 0,
            max_depth,
            iterations: 0,
            max_iterations,
            max_visiting: None,
            exceeded: false,
        }
    }

    pub fn with_profile(profile: RecursionProfile) -> Self {
        Self::new(profile.max_depth(), profile.max_iterations())
    }

    pub fn with_max_visiting(mut self, max_visiting: usize) -> Self {
        self.max_visiting = Some(max_visiting);
        self
    }

    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    pub fn max_iterations(&self) -> u32 {
        self.max_iterations
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    pub fn visiting_count(&self) -> usize {
        self.visiting.len()
    }

    pub fn is_visiting(&self, key: &K) -> bool {
        self.visiting.contains(key)
    }

    pub fn is_active(&self) -> bool {
        self.depth > 0
    }

    pub fn is_exceeded(&self) -> bool {
        self.exceeded
    }

    pub fn mark_exceeded(&mut self) {
        self.exceeded = true;
    }

    pub fn reset(&mut self) {
        self.visiting.clear();
        self.depth = 0;
        self.iterations = 0;
        self.exceeded = false;
    }

    /// Attempt to step into `key`. Iteration budget is checked first,
    /// then depth, then the cycle check, then the visiting-set cap —
    /// in that order, so the first applicable reason wins.
    pub fn enter(&mut self, key: K) -> RecursionResult {
        self.iterations = self.iterations.saturating_add(1);
        if self.iterations > self.max_iterations {
            self.exceeded = true;
            return RecursionResult::IterationExceeded;
        }
        if self.depth >= self.max_depth {
            self.exceeded = true;
            return RecursionResult::DepthExceeded;
        }
        if self.visiting.contains(&key) {
            return RecursionResult::Cycle;
        }
        if let Some(max) = self.max_visiting {
            if self.visiting.len() >= max {
                self.exceeded = true;
                return RecursionResult::DepthExceeded;
            }
        }
        self.visiting.insert(key);
        self.depth += 1;
        RecursionResult::Entered
    }

    pub fn leave(&mut self, key: K) {
        let removed = self.visiting.remove(&key);
        debug_assert!(removed, "leave() called with a key not in the visiting set");
        self.depth -= 1;
    }

    /// Enter `key`, run `body`, and leave again — so a recursive call
    /// can't forget to unwind on an early return.
    pub fn scope<R>(&mut self, key: K, body: impl FnOnce() -> R) -> Result<R, RecursionResult> {
        match self.enter(key.clone()) {
            RecursionResult::Entered => {
                let r = body();
                self.leave(key);
                Ok(r)
            }
            denied => Err(denied),
        }
    }
}

/// A lighter-weight guard for traversals that only need depth bounding,
/// not cycle detection by key (the occurs-check already forbids cycles
/// by construction, so `toString`/`realizeString` only need to stop a
/// pathologically deep but acyclic graph).
pub struct DepthCounter {
    depth: u32,
    base_depth: u32,
    max_depth: u32,
    exceeded: bool,
}

impl DepthCounter {
    pub fn new(max_depth: u32) -> Self {
        DepthCounter {
            depth: 0,
            base_depth: 0,
            max_depth,
            exceeded: false,
        }
    }

    pub fn with_profile(profile: RecursionProfile) -> Self {
        Self::new(profile.max_depth())
    }

    pub fn with_initial_depth(max_depth: u32, initial_depth: u32) -> Self {
        DepthCounter {
            depth: initial_depth,
            base_depth: initial_depth,
            max_depth,
            exceeded: false,
        }
    }

    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub fn is_exceeded(&self) -> bool {
        self.exceeded
    }

    pub fn mark_exceeded(&mut self) {
        self.exceeded = true;
    }

    pub fn reset(&mut self) {
        self.depth = self.base_depth;
        self.exceeded = false;
    }

    pub fn enter(&mut self) -> bool {
        if self.depth >= self.max_depth {
            self.exceeded = true;
            return false;
        }
        self.depth += 1;
        true
    }

    pub fn leave(&mut self) {
        debug_assert!(self.depth > 0, "leave() called at depth 0");
        self.depth -= 1;
    }
}

#[cfg(test)]
#[path = "tests/recursion.rs"]
mod tests;
