//! Unification microbenchmarks (unify, generalize/instantiate, realize_string).

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use glyph_common::SourceLocation;
use glyph_types::static_eval::StubEvaluator;
use glyph_types::{Engine, Explicits, ExplicitGeneric, TypeTermId};

fn int_ty(e: &mut Engine) -> TypeTermId {
    e.class_of("Int.0", false, &[], Explicits::new(), None, SourceLocation::synthetic())
}

fn build_nested_tuple(e: &mut Engine, depth: usize) -> TypeTermId {
    let mut t = int_ty(e);
    for _ in 0..depth {
        t = e.class_of(
            "tuple.2.0",
            true,
            &[t, t],
            Explicits::new(),
            None,
            SourceLocation::synthetic(),
        );
    }
    t
}

fn bench_unify_concrete(c: &mut Criterion) {
    c.bench_function("unify_nested_tuple_self", |b| {
        b.iter(|| {
            let mut e = Engine::new();
            let a = build_nested_tuple(&mut e, 6);
            let b_term = build_nested_tuple(&mut e, 6);
            black_box(e.unify(a, b_term))
        })
    });
}

fn bench_unify_unbound_absorb(c: &mut Criterion) {
    c.bench_function("unify_unbound_absorbs_concrete", |b| {
        b.iter(|| {
            let mut e = Engine::new();
            let var = e.fresh_unbound(1, false);
            let concrete = build_nested_tuple(&mut e, 6);
            black_box(e.unify(var, concrete))
        })
    });
}

fn bench_occurs_check(c: &mut Criterion) {
    c.bench_function("unify_occurs_check_rejects", |b| {
        b.iter(|| {
            let mut e = Engine::new();
            let var = e.fresh_unbound(1, false);
            let int = int_ty(&mut e);
            let wrapping = e.class_of(
                "tuple.2.0",
                true,
                &[var, int],
                Explicits::new(),
                None,
                SourceLocation::synthetic(),
            );
            black_box(e.unify(var, wrapping))
        })
    });
}

fn bench_generalize_instantiate(c: &mut Criterion) {
    c.bench_function("generalize_then_instantiate", |b| {
        b.iter(|| {
            let mut e = Engine::new();
            e.enter_scope();
            let var = e.fresh_unbound(1, false);
            let list = {
                let mut explicits = Explicits::new();
                explicits.insert("T".to_string(), ExplicitGeneric::new(var, 0));
                e.class_of("List.0", false, &[], explicits, None, SourceLocation::synthetic())
            };
            let generalized = e.generalize(list).expect("generalize should succeed");

            e.enter_scope();
            let mut cache = glyph_types::generalize::new_instantiate_cache();
            black_box(e.instantiate(generalized, &mut cache))
        })
    });
}

fn bench_realize_string(c: &mut Criterion) {
    let mut e = Engine::new();
    let t = build_nested_tuple(&mut e, 6);

    c.bench_function("realize_string_nested_tuple", |b| {
        b.iter(|| black_box(e.realize_string(&StubEvaluator, t)))
    });
}

criterion_group!(
    unify_benches,
    bench_unify_concrete,
    bench_unify_unbound_absorb,
    bench_occurs_check,
    bench_generalize_instantiate,
    bench_realize_string,
);
criterion_main!(unify_benches);
