use super::*;
use crate::static_eval::test_support::{AdditionEvaluator, LiteralExpr};
use crate::term::ExplicitGeneric;
use glyph_common::SourceLocation;
use std::rc::Rc;

fn int_ty(e: &mut Engine) -> TypeTermId {
    e.class_of("Int.0", false, &[], Explicits::new(), None, SourceLocation::synthetic())
}

#[test]
fn scenario_1_unbound_unifies_with_concrete_then_undoes() {
    let mut e = Engine::new();
    let a = e.fresh_unbound(1, false);
    let int = int_ty(&mut e);

    let journal = e.new_journal();
    let score = e.unify(a, int).expect("unify should succeed");
    assert_eq!(score, 0);
    assert_eq!(e.follow(a), int);

    e.undo(journal);
    assert!(e.var_of(a).is_some());
    assert_eq!(e.to_string(a, false), "?0.1");
}

#[test]
fn scenario_2_list_unbound_unifies_with_list_int_and_realizes() {
    let mut e = Engine::new();
    let a = e.fresh_unbound(1, false);
    let int = int_ty(&mut e);
    let mut list_explicits = Explicits::new();
    list_explicits.insert("T".to_string(), ExplicitGeneric::new(a, 0));
    let list_a = e.class_of("List.0", false, &[], list_explicits, None, SourceLocation::synthetic());
    let mut list_int_explicits = Explicits::new();
    list_int_explicits.insert("T".to_string(), ExplicitGeneric::new(int, 0));
    let list_int = e.class_of(
        "List.0",
        false,
        &[],
        list_int_explicits,
        None,
        SourceLocation::synthetic(),
    );

    e.unify(list_a, list_int).expect("unify should succeed");
    let out = e
        .realize_string(&crate::static_eval::StubEvaluator, list_a)
        .expect("no depth error");
    assert_eq!(out, Some("List[Int]".to_string()));
}

#[test]
fn scenario_3_occurs_check_fails_without_mutation() {
    let mut e = Engine::new();
    let a = e.fresh_unbound(1, false);
    let int = int_ty(&mut e);
    let tuple = e.class_of(
        "tuple.2.0",
        true,
        &[a, int],
        Explicits::new(),
        None,
        SourceLocation::synthetic(),
    );

    let err = e.unify(a, tuple).unwrap_err();
    assert_eq!(err, UnifyMismatch::OccursCheck { var: 0 });
    assert!(e.var_of(a).is_some());
}

#[test]
fn scenario_4_generalize_then_instantiate_shares_matching_ids() {
    let mut e = Engine::new();
    e.enter_scope();
    e.enter_scope();
    assert_eq!(e.level(), 2);

    let a = e.fresh_unbound(2, false);
    let b = e.fresh_unbound(2, false);
    let pair = e.class_of(
        "tuple.2.0",
        true,
        &[a, b],
        Explicits::new(),
        None,
        SourceLocation::synthetic(),
    );

    let generalized = e.generalize(pair).expect("generalize should succeed");

    e.enter_scope();
    assert_eq!(e.level(), 3);
    let mut cache = crate::generalize::new_instantiate_cache();
    let instantiated = e
        .instantiate(generalized, &mut cache)
        .expect("instantiate should succeed");

    // `tests` is a child module of `engine`, so it may reach past the
    // public façade to inspect the arena directly for this assertion.
    let c = e.arena.get(instantiated).as_class().unwrap();
    assert_ne!(c.args[0], c.args[1], "different original ids get distinct fresh vars");

    let mut cache2 = crate::generalize::new_instantiate_cache();
    let a_again = e.instantiate(a, &mut cache2).expect("instantiate should succeed");
    assert_eq!(a_again, a, "an already-Unbound term instantiates to itself");
}

fn function_class_view(e: &mut Engine, name: &str, arity: usize) -> TypeTermId {
    let mut explicits = Explicits::new();
    for i in 0..arity {
        explicits.insert(format!("T{i}"), ExplicitGeneric { term: None, id: i as u32 });
    }
    e.class_of(name, true, &[], explicits, None, SourceLocation::synthetic())
}

#[test]
fn scenario_5_partial_bitmasks_must_match_before_delegating() {
    let mut e = Engine::new();
    let int = int_ty(&mut e);
    let func_class_a = function_class_view(&mut e, "function.1.0", 1);
    let func_a = e.function_of(
        "function.1.0",
        func_class_a,
        &[int],
        Explicits::new(),
        None,
        false,
        SourceLocation::synthetic(),
    );
    let func_class_b = function_class_view(&mut e, "function.1.0", 1);
    let func_b = e.function_of(
        "function.1.0",
        func_class_b,
        &[int],
        Explicits::new(),
        None,
        false,
        SourceLocation::synthetic(),
    );

    let mut matching = FixedBitSet::with_capacity(3);
    matching.set(0, true);
    matching.set(2, true);
    let partial_a = e.partial_of(func_a, matching.clone(), SourceLocation::synthetic());
    let partial_b = e.partial_of(func_b, matching, SourceLocation::synthetic());
    e.unify(partial_a, partial_b).expect("matching bitmasks should delegate to class unify");

    let mut mismatched = FixedBitSet::with_capacity(3);
    mismatched.set(0, true);
    mismatched.set(1, true);
    let partial_c = e.partial_of(func_a, mismatched, SourceLocation::synthetic());
    assert_eq!(
        e.unify(partial_b, partial_c),
        Err(UnifyMismatch::BitmaskMismatch)
    );
}

#[test]
fn scenario_6_static_binds_then_realizes_and_rejects_different_expressions() {
    let mut e = Engine::new();
    let n_unbound = e.fresh_unbound(1, true);
    let mut a_explicits = Explicits::new();
    a_explicits.insert("N".to_string(), ExplicitGeneric::new(n_unbound, 0));
    let a = e.static_of(a_explicits, Rc::new(LiteralExpr("N+1".to_string())), SourceLocation::synthetic());

    let n_three = e.static_of(Explicits::new(), Rc::new(LiteralExpr("3".to_string())), SourceLocation::synthetic());
    let mut b_explicits = Explicits::new();
    b_explicits.insert("N".to_string(), ExplicitGeneric::new(n_three, 0));
    let b = e.static_of(b_explicits, Rc::new(LiteralExpr("N+1".to_string())), SourceLocation::synthetic());

    e.unify(a, b).expect("identical expressions with compatible bindings should unify");
    let out = e.realize_string(&AdditionEvaluator, a).expect("no depth error");
    assert_eq!(out, Some("3;4".to_string()));

    let c = e.static_of(Explicits::new(), Rc::new(LiteralExpr("1+N".to_string())), SourceLocation::synthetic());
    assert_eq!(e.unify(a, c), Err(UnifyMismatch::ExpressionMismatch));
}
