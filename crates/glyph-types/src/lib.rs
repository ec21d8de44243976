//! Type inference and unification engine for the glyph compiler.
//!
//! Hindley-Milner unification extended with nominal classes, records,
//! functions, partial applications, and compile-time `Static` integer
//! types. [`engine::Engine`] is the façade the semantic-analysis layer
//! drives; every other module is an implementation detail it composes.

pub mod arena;
pub mod engine;
pub mod error;
pub mod generalize;
pub mod ids;
pub mod journal;
pub mod link;
pub mod predicates;
pub mod recursion;
pub mod static_eval;
pub mod term;
pub mod unify;

pub use engine::Engine;
pub use error::{EngineBug, UnifyMismatch, UnifyOutcome};
pub use ids::{IdAllocator, TypeTermId, TypeVarId};
pub use journal::Journal;
pub use link::LinkState;
pub use static_eval::{EvalOutcome, ExprHandle, Expression, StaticEvaluator, StubEvaluator};
pub use term::{ClassData, Explicits, ExplicitGeneric, FunctionData, PartialData, StaticData, TypeTermKind};
