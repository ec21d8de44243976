//! Centralized recursion and capacity limits for the type engine.
//!
//! Type graphs built from well-formed source are shallow. These limits
//! exist to fail closed (as an ordinary outcome, never a panic) on
//! pathological but non-cyclic graphs rather than overflow the stack or
//! spin forever — the occurs-check and structural unifier are mutually
//! recursive over the same graph, so a single bound has to cover both.

/// Maximum recursion depth for the occurs-check traversal.
///
/// The occurs-check walks `Class.args`, `Class.explicits`, `Class.parent`
/// and `Static.explicits`, following `Link`s as it goes. A type nested a
/// few dozen levels deep (e.g. `List[List[List[...]]]`) is unusual but
/// legitimate generated code; a few thousand levels deep is not
/// reachable from well-formed source and is treated as "does not occur"
/// rather than crashing the compiler:
///
/// ```text
/// type Wrap[T] = class { value: T }
/// // Wrap[Wrap[Wrap[...Wrap[Int]...]]] nested MAX_OCCURS_DEPTH+1 times
/// ```
pub const MAX_OCCURS_DEPTH: u32 = 4_096;

/// Maximum recursion depth for `unify` itself.
///
/// Slightly lower than [`MAX_OCCURS_DEPTH`] since each unify frame does
/// more work per level (pairwise arg unification, explicit generics,
/// parent) than a single occurs-check frame.
pub const MAX_UNIFY_DEPTH: u32 = 2_048;

/// Maximum recursion depth for `generalize`/`instantiate`.
///
/// Both rebuild the term graph bottom-up; this bounds how deep that
/// rebuild may recurse before the engine gives up and reports the term
/// as not generalizable, rather than overflowing the stack.
pub const MAX_GENERALIZE_DEPTH: u32 = 2_048;

/// Maximum recursion depth for the shared `toString`/`realizeString`/
/// `canRealize`/`hasUnbound` traversal.
///
/// These are the traversals most likely to run during error reporting
/// on a type the compiler is already unhappy about (e.g. a partially
/// unified recursive-looking structure); keeping this bound separate
/// from [`MAX_UNIFY_DEPTH`] means a printer bug can't regress unify
/// performance and vice versa.
pub const MAX_PRINT_DEPTH: u32 = 1_024;

/// Inline capacity for `Class.args` / `Function.args` storage.
///
/// Most classes have a handful of fields and most functions a handful
/// of parameters; this keeps the common case on the stack inside the
/// arena entry without spilling to a heap allocation per term.
pub const TYPE_ARGS_INLINE: usize = 4;

/// Initial capacity reserved for the `instantiate` cache.
///
/// Most generic functions and classes close over a handful of type
/// parameters; starting the `FxHashMap` at this size avoids a resize on
/// the common path without over-allocating for simple monomorphic code.
pub const INSTANTIATE_CACHE_CAPACITY: usize = 8;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn occurs_depth_exceeds_unify_depth() {
        // The occurs-check must be allowed to look at least as deep as a
        // single unify call can recurse, or a legitimate non-cyclic
        // structure could spuriously "not occur" before unify itself
        // would have bailed out anyway.
        assert!(MAX_OCCURS_DEPTH >= MAX_UNIFY_DEPTH);
    }

    #[test]
    fn limits_are_nonzero() {
        assert!(MAX_OCCURS_DEPTH > 0);
        assert!(MAX_UNIFY_DEPTH > 0);
        assert!(MAX_GENERALIZE_DEPTH > 0);
        assert!(MAX_PRINT_DEPTH > 0);
        assert!(TYPE_ARGS_INLINE > 0);
        assert!(INSTANTIATE_CACHE_CAPACITY > 0);
    }
}
