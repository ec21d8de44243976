//! Structured outcomes. No `anyhow`/`thiserror`: unification failure is
//! an expected, recoverable result the caller is meant to match on and
//! drive `undo()` from, not an error to be formatted and propagated.

/// Why `unify` failed. Every variant here is [`crate::error::UnifyMismatch`]'s
/// one job: let the caller decide whether to try another overload, not
/// describe the failure in prose (that is the out-of-scope diagnostics
/// layer's job, once it attaches a source location).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UnifyMismatch {
    /// The two sides' `isStatic` flags disagree.
    StaticFlagMismatch,
    /// Unifying an `Unbound` variable with a term that contains it.
    OccursCheck { var: u32 },
    /// Two `Generic`s with different ids, or a `Generic` paired with
    /// anything other than an identical `Generic`.
    GenericRigidity,
    /// `Class.is_record` flags disagree.
    RecordFlagMismatch,
    /// `Class.args`/`Function.args` lengths disagree.
    ArityMismatch,
    /// Nominal (non-record, non-tuple, non-function-class) name clash.
    NameMismatch,
    /// One side has a `parent` and the other does not.
    ParentPresenceMismatch,
    /// Two `Static` expressions are not syntactically identical.
    ExpressionMismatch,
    /// Two `Partial`s have different-length or different-valued
    /// `known_types` bitmasks.
    BitmaskMismatch,
    /// A `Partial` was unified against something that is not a `Partial`
    /// (or an absorbing `Unbound`/`Link`).
    NotPartial,
    /// Neither side is a shape that the other can unify against at all
    /// (e.g. a bare `Static` against a `Class`).
    Unclassifiable,
    /// A recursive traversal exceeded its configured depth bound; see
    /// `glyph_common::limits`. Treated as an ordinary mismatch, not a
    /// panic, since the graphs this can happen on are pathological but
    /// not malformed.
    DepthExceeded,
}

/// A unification attempt's result: a non-negative match score on
/// success (see `crate::unify::unify`'s doc comment for the scoring
/// rule), or the reason it failed.
pub type UnifyOutcome = Result<u32, UnifyMismatch>;

/// An invariant violation: unreachable by correct use of this crate's
/// API. These are bugs, not recoverable outcomes, and the engine does
/// not try to make them recoverable — callers should treat an
/// `EngineBug` as fatal (per the source's "abort compilation with a
/// diagnostic" policy), not catch and retry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EngineBug {
    /// `Journal::undo` or `Journal::commit` called twice on the same
    /// journal, or a journal older than the most recent rollback point.
    DoubleUndo,
    /// `generalize` was asked to generalize a `Link` cell sitting in an
    /// impossible state (e.g. a `Link` variant whose target index is out
    /// of range for the arena it came from).
    CorruptLinkState,
}

impl std::fmt::Display for EngineBug {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineBug::DoubleUndo => write!(f, "journal undone or committed twice"),
            EngineBug::CorruptLinkState => write!(f, "link cell in an impossible state"),
        }
    }
}

impl std::error::Error for EngineBug {}
