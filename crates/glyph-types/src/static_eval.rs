//! Adapter to the external compile-time expression evaluator.
//!
//! `Static` types carry an opaque expression over a set of named,
//! explicitly bound generics; reducing that expression to an integer is
//! entirely the responsibility of a collaborator outside this crate
//! (the source lexer/parser/expression layer is explicitly out of
//! scope). This module only defines the seam: a handle type the engine
//! can compare and print without understanding, and a one-method trait
//! the engine calls through to reduce it.

use std::fmt;
use std::rc::Rc;

/// A compile-time integer expression, opaque to this crate.
///
/// The only two things the engine ever does with an expression are
/// compare its printed form for syntactic equality (`Static::unify`
/// requires the two sides' expressions to print identically — this
/// engine does not solve arithmetic equalities like `N+1 ≡ 1+N`) and
/// hand it to a [`StaticEvaluator`] for reduction.
pub trait Expression: fmt::Debug {
    /// Canonical printed form, used for syntactic-equality comparisons
    /// during `Static` unification.
    fn printed_form(&self) -> String;
}

/// Shared, type-erased handle to an [`Expression`].
///
/// `Rc` rather than `Box` since the same expression is reused across
/// `generalize`/`instantiate` (which clone a `Static` term's explicit
/// generics but never need to touch the expression itself).
pub type ExprHandle = Rc<dyn Expression>;

/// Outcome of reducing a [`Static`](crate::term::StaticData)'s
/// expression given concrete bindings for its explicit generics.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EvalOutcome {
    /// The expression reduced to a concrete integer.
    Ready(i64),
    /// One or more bindings are not concrete yet; not an error, just
    /// "ask again once more of the type graph is resolved".
    NotReady,
}

/// The external pure reducer a `Static` type's realization depends on.
///
/// Implementations must be pure functions of `(expr, bindings)`: the
/// engine may call `eval` speculatively (e.g. while computing
/// `canRealize`) and must be able to throw the result away.
pub trait StaticEvaluator {
    fn eval(&self, expr: &ExprHandle, bindings: &rustc_hash::FxHashMap<String, i64>) -> EvalOutcome;
}

/// A [`StaticEvaluator`] that never has a concrete answer.
///
/// Useful for engine-level tests that exercise unification, generalize,
/// and printing without needing a real expression-reduction backend.
pub struct StubEvaluator;

impl StaticEvaluator for StubEvaluator {
    fn eval(&self, _expr: &ExprHandle, _bindings: &rustc_hash::FxHashMap<String, i64>) -> EvalOutcome {
        EvalOutcome::NotReady
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// A literal integer expression, for tests that need `canRealize`
    /// to actually succeed on a `Static` term.
    #[derive(Debug)]
    pub struct LiteralExpr(pub String);

    impl Expression for LiteralExpr {
        fn printed_form(&self) -> String {
            self.0.clone()
        }
    }

    /// Evaluates `"N+1"`-shaped literal expressions by summing the
    /// bindings named in the expression text, enough to exercise
    /// `Static::realize_string` without a real expression grammar.
    pub struct AdditionEvaluator;

    impl StaticEvaluator for AdditionEvaluator {
        fn eval(&self, expr: &ExprHandle, bindings: &rustc_hash::FxHashMap<String, i64>) -> EvalOutcome {
            let text = expr.printed_form();
            let mut total: i64 = 0;
            for term in text.split('+') {
                let term = term.trim();
                if let Ok(n) = term.parse::<i64>() {
                    total += n;
                } else if let Some(&v) = bindings.get(term) {
                    total += v;
                } else {
                    return EvalOutcome::NotReady;
                }
            }
            EvalOutcome::Ready(total)
        }
    }
}
