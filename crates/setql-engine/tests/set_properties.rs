//! End-to-end set semantics: trees are bound, lowered and evaluated
//! against in-memory inputs.

use proptest::prelude::*;
use setql_common::types::{Cardinality, LogicalType, SetMode, Value, Volatility};
use setql_common::utils::error::{Error, ExecutionError, ResolveError};
use setql_core::execution::{EmptySource, FunctionRegistry, InMemorySource};
use setql_engine::catalog::{
    CatalogBuilder, DeclaredType, OperatorImpl, OperatorKind, OperatorSignature, ParameterSpec,
};
use setql_engine::{Config, Engine, ExprNode, InputRef};

fn engine() -> Engine {
    Engine::builtin(Config::default()).unwrap()
}

fn ints(values: &[i64]) -> ExprNode {
    ExprNode::set(
        LogicalType::Int64,
        values.iter().copied().map(Value::Int64).collect(),
    )
}

fn input(name: &str, ty: LogicalType, cardinality: Cardinality, volatility: Volatility) -> ExprNode {
    ExprNode::input(InputRef::new(name, ty, cardinality).with_volatility(volatility))
}

fn eval(tree: ExprNode, source: &InMemorySource) -> Result<Vec<Value>, Error> {
    let mut tree = tree;
    engine().session().evaluate(&mut tree, source)
}

fn count(values: &[Value], x: &Value) -> usize {
    values.iter().filter(|v| *v == x).count()
}

fn sorted(mut values: Vec<Value>) -> Vec<i64> {
    let mut out: Vec<i64> = values.drain(..).filter_map(|v| v.as_i64()).collect();
    out.sort_unstable();
    out
}

/// A singleton of int64, decimal or float64, or an untyped `{}`.
fn element(kind: usize, x: i64) -> ExprNode {
    match kind {
        0 => ExprNode::literal(x),
        1 => ExprNode::literal(format!("{x}.25").parse::<bigdecimal::BigDecimal>().unwrap()),
        2 => ExprNode::literal(x as f64 + 0.5),
        _ => ExprNode::empty_set(),
    }
}

fn small_set() -> impl Strategy<Value = Vec<i64>> {
    prop::collection::vec(-4i64..4, 0..8)
}

proptest! {
    #[test]
    fn union_is_commutative_as_multiset(a in small_set(), b in small_set()) {
        let ab = eval(ExprNode::call("UNION", vec![ints(&a), ints(&b)]), &InMemorySource::new()).unwrap();
        let ba = eval(ExprNode::call("UNION", vec![ints(&b), ints(&a)]), &InMemorySource::new()).unwrap();
        prop_assert_eq!(sorted(ab), sorted(ba));
    }

    #[test]
    fn union_counts_add(a in small_set(), b in small_set(), x in -4i64..4) {
        let source = InMemorySource::new()
            .with_values("a", a.iter().copied().map(Value::Int64).collect())
            .with_values("b", b.iter().copied().map(Value::Int64).collect());
        let tree = ExprNode::call(
            "UNION",
            vec![
                input("a", LogicalType::Int64, Cardinality::Many, Volatility::Stable),
                input("b", LogicalType::Int64, Cardinality::Many, Volatility::Stable),
            ],
        );
        let out = eval(tree, &source).unwrap();
        let x = Value::Int64(x);
        let a_vals: Vec<Value> = a.iter().copied().map(Value::Int64).collect();
        let b_vals: Vec<Value> = b.iter().copied().map(Value::Int64).collect();
        prop_assert_eq!(count(&out, &x), count(&a_vals, &x) + count(&b_vals, &x));
    }

    #[test]
    fn distinct_is_idempotent(s in small_set()) {
        let once = eval(ExprNode::call("DISTINCT", vec![ints(&s)]), &InMemorySource::new()).unwrap();
        let twice = eval(
            ExprNode::call("DISTINCT", vec![ExprNode::call("DISTINCT", vec![ints(&s)])]),
            &InMemorySource::new(),
        )
        .unwrap();
        prop_assert_eq!(sorted(once.clone()), sorted(twice));
        let mut unique = s.clone();
        unique.sort_unstable();
        unique.dedup();
        prop_assert_eq!(sorted(once), unique);
    }

    #[test]
    fn exists_matches_non_emptiness(s in small_set()) {
        let out = eval(ExprNode::call("EXISTS", vec![ints(&s)]), &InMemorySource::new()).unwrap();
        prop_assert_eq!(out, vec![Value::Bool(!s.is_empty())]);
    }

    #[test]
    fn membership_against_empty_is_empty(
        x in -4i64..4,
        kind in 0usize..4,
        negated in any::<bool>(),
    ) {
        let name = if negated { "NOT IN" } else { "IN" };
        let out = eval(
            ExprNode::call(name, vec![element(kind, x), ExprNode::empty_set()]),
            &InMemorySource::new(),
        )
        .unwrap();
        prop_assert!(out.is_empty());
    }

    #[test]
    fn untyped_element_membership_is_empty(
        s in prop::collection::vec(-4i64..4, 0..6),
        negated in any::<bool>(),
    ) {
        let name = if negated { "NOT IN" } else { "IN" };
        let floats = ExprNode::set(
            LogicalType::Float64,
            s.iter().map(|&v| Value::Float64(v as f64)).collect(),
        );
        let out = eval(
            ExprNode::call(name, vec![ExprNode::empty_set(), floats]),
            &InMemorySource::new(),
        )
        .unwrap();
        prop_assert!(out.is_empty());
    }

    #[test]
    fn empty_set_is_union_identity(s in small_set()) {
        let out = eval(
            ExprNode::call("UNION", vec![ExprNode::empty_set(), ints(&s)]),
            &InMemorySource::new(),
        )
        .unwrap();
        prop_assert_eq!(out, s.iter().copied().map(Value::Int64).collect::<Vec<_>>());
    }
}

#[test]
fn coalesce_skips_volatile_fallback_when_left_present() {
    let source = InMemorySource::new()
        .with_values("nick", vec![Value::from("ada")])
        .with_generator("counter", |n| vec![Value::from(format!("guest-{n}"))]);
    let tree = ExprNode::call(
        "??",
        vec![
            input("nick", LogicalType::String, Cardinality::AtMostOne, Volatility::Stable),
            input("counter", LogicalType::String, Cardinality::One, Volatility::Volatile),
        ],
    );

    let out = eval(tree, &source).unwrap();
    assert_eq!(out, vec![Value::from("ada")]);
    assert_eq!(source.fetch_count("counter"), 0);
}

#[test]
fn coalesce_uses_fallback_when_left_empty() {
    let source = InMemorySource::new()
        .with_values("nick", vec![])
        .with_generator("counter", |n| vec![Value::from(format!("guest-{n}"))]);
    let tree = ExprNode::call(
        "??",
        vec![
            input("nick", LogicalType::String, Cardinality::AtMostOne, Volatility::Stable),
            input("counter", LogicalType::String, Cardinality::One, Volatility::Volatile),
        ],
    );

    let out = eval(tree, &source).unwrap();
    assert_eq!(out, vec![Value::from("guest-1")]);
    assert_eq!(source.fetch_count("counter"), 1);
}

#[test]
fn coalesce_never_evaluates_unused_failing_fallback() {
    for folding in [true, false] {
        let engine = Engine::builtin(Config::default().with_constant_folding(folding)).unwrap();
        let mut tree = ExprNode::call(
            "??",
            vec![
                ExprNode::literal(1i64),
                ExprNode::call(
                    "IF",
                    vec![
                        ExprNode::literal(2i64),
                        ExprNode::set(LogicalType::Bool, vec![]),
                        ExprNode::literal(3i64),
                    ],
                ),
            ],
        );
        let out = engine.session().evaluate(&mut tree, &EmptySource).unwrap();
        assert_eq!(out, vec![Value::Int64(1)], "folding = {folding}");
    }
}

#[test]
fn conditional_never_touches_other_branch() {
    let source = InMemorySource::new()
        .with_values("a", vec![Value::Int64(1), Value::Int64(1)])
        .with_values("b", vec![Value::Int64(2)]);
    let tree = ExprNode::call(
        "IF",
        vec![
            input("a", LogicalType::Int64, Cardinality::Many, Volatility::Volatile),
            ExprNode::literal(true),
            input("b", LogicalType::Int64, Cardinality::Many, Volatility::Volatile),
        ],
    );

    let out = eval(tree, &source).unwrap();
    assert_eq!(out, vec![Value::Int64(1), Value::Int64(1)]);
    assert_eq!(source.fetch_count("b"), 0);
}

#[test]
fn conditional_with_empty_condition_fails() {
    let source = InMemorySource::new().with_values("flag", vec![]);
    let tree = ExprNode::call(
        "IF",
        vec![
            ints(&[1]),
            input("flag", LogicalType::Bool, Cardinality::AtMostOne, Volatility::Stable),
            ints(&[2]),
        ],
    );

    let err = eval(tree, &source).unwrap_err();
    assert!(matches!(
        err,
        Error::Execution(ExecutionError::CardinalityViolation { found: 0, .. })
    ));
}

#[test]
fn decimal_float_membership_resolves_both_ways() {
    let session = engine().session();
    for (element, set) in [
        (LogicalType::Decimal, LogicalType::Float64),
        (LogicalType::Float64, LogicalType::Decimal),
    ] {
        let resolved = session.resolve("IN", &[element, set]);
        assert!(resolved.is_ok(), "{element} IN SET OF {set}: {resolved:?}");
    }
}

#[test]
fn decimal_float_membership_compares_exactly() {
    let source = InMemorySource::new().with_values("rates", vec![Value::Float64(0.5), Value::Float64(0.75)]);
    let price: bigdecimal::BigDecimal = "0.5".parse().unwrap();
    let tree = ExprNode::call(
        "IN",
        vec![
            ExprNode::literal(price.clone()),
            input("rates", LogicalType::Float64, Cardinality::Many, Volatility::Stable),
        ],
    );
    assert_eq!(eval(tree, &source).unwrap(), vec![Value::Bool(true)]);

    let source = InMemorySource::new().with_values("rates", vec![Value::Float64(0.25)]);
    let tree = ExprNode::call(
        "NOT IN",
        vec![
            ExprNode::literal(price),
            input("rates", LogicalType::Float64, Cardinality::Many, Volatility::Stable),
        ],
    );
    assert_eq!(eval(tree, &source).unwrap(), vec![Value::Bool(true)]);
}

#[test]
fn stable_input_fetched_once_per_evaluation() {
    let source = InMemorySource::new().with_values("ids", vec![Value::Int64(1), Value::Int64(2)]);
    let ids = || input("ids", LogicalType::Int64, Cardinality::Many, Volatility::Stable);
    let tree = ExprNode::call("UNION", vec![ids(), ExprNode::call("DISTINCT", vec![ids()])]);

    let out = eval(tree, &source).unwrap();
    assert_eq!(out.len(), 4);
    assert_eq!(source.fetch_count("ids"), 1);
}

#[test]
fn volatile_input_fetched_at_every_reference() {
    let source = InMemorySource::new().with_generator("tick", |n| vec![Value::Int64(n as i64)]);
    let tick = || input("tick", LogicalType::Int64, Cardinality::One, Volatility::Volatile);
    let tree = ExprNode::call("UNION", vec![tick(), tick()]);

    let out = eval(tree, &source).unwrap();
    assert_eq!(sorted(out), vec![1, 2]);
    assert_eq!(source.fetch_count("tick"), 2);
}

#[test]
fn engine_functions_apply_elementwise() {
    let mut builder = CatalogBuilder::with_builtins().unwrap();
    builder
        .register(
            OperatorSignature::new(
                "plus",
                OperatorKind::Function,
                OperatorImpl::EngineFunction {
                    name: "plus".to_string(),
                },
            )
            .param(ParameterSpec::new("a", LogicalType::Int64))
            .param(ParameterSpec::new("b", LogicalType::Int64).with_default(100i64))
            .returns(LogicalType::Int64, SetMode::Singleton),
        )
        .unwrap();
    builder
        .register(
            OperatorSignature::new(
                "count",
                OperatorKind::Function,
                OperatorImpl::EngineFunction {
                    name: "count".to_string(),
                },
            )
            .param(ParameterSpec::new("s", DeclaredType::Any).set_of())
            .returns(LogicalType::Int64, SetMode::Singleton),
        )
        .unwrap();

    let mut functions = FunctionRegistry::new();
    functions.register("plus", |args: &[Vec<Value>]| {
        let a = args[0][0].as_i64().unwrap_or_default();
        let b = args[1][0].as_i64().unwrap_or_default();
        Ok(vec![Value::Int64(a + b)])
    });
    functions.register("count", |args: &[Vec<Value>]| {
        Ok(vec![Value::Int64(args[0].len() as i64)])
    });
    let engine = Engine::new(builder.build(), Config::default()).with_functions(functions);
    let session = engine.session();

    let mut tree = ExprNode::call("plus", vec![ints(&[1, 2])]);
    let out = session.evaluate(&mut tree, &EmptySource).unwrap();
    assert_eq!(out, vec![Value::Int64(101), Value::Int64(102)]);
    assert_eq!(tree.info().map(|i| i.cardinality), Some(Cardinality::Many));

    let mut tree = ExprNode::call("plus", vec![ints(&[]), ExprNode::literal(1i64)]);
    assert!(session.evaluate(&mut tree, &EmptySource).unwrap().is_empty());

    let mut tree = ExprNode::call("count", vec![ints(&[])]);
    assert_eq!(
        session.evaluate(&mut tree, &EmptySource).unwrap(),
        vec![Value::Int64(0)]
    );
}

#[test]
fn mismatched_union_is_rejected_at_compile_time() {
    let err = eval(
        ExprNode::call("UNION", vec![ExprNode::literal("a"), ExprNode::literal(true)]),
        &InMemorySource::new(),
    )
    .unwrap_err();
    assert!(err.is_compile_time());
    assert!(matches!(err, Error::Resolve(ResolveError::TypeMismatch { .. })));
}

#[test]
fn disabling_folding_keeps_semantics() {
    let engine = Engine::builtin(Config::default().with_constant_folding(false)).unwrap();
    let session = engine.session();
    let mut tree = ExprNode::call("DISTINCT", vec![ints(&[3, 3, 1])]);
    let fragment = session.compile(&mut tree).unwrap();
    assert!(matches!(fragment, setql_core::Fragment::Distinct(_)));

    let mut tree = ExprNode::call("DISTINCT", vec![ints(&[3, 3, 1])]);
    let out = session.evaluate(&mut tree, &EmptySource).unwrap();
    assert_eq!(sorted(out), vec![1, 3]);
}
