//! Property tests for union and filter algebra

use proptest::prelude::*;
use scopedsl_engine::{EngineConfig, EvaluationContext, ScopeEngine};
use scopedsl_foundation::{EntityId, EntitySet, QualifiedId};
use scopedsl_storage::World;

/// Source for a literal entity set, `none` when empty.
fn literal(ids: &[u8]) -> String {
    if ids.is_empty() {
        return "none".to_string();
    }
    ids.iter()
        .map(|n| format!("\"e:{n}\""))
        .collect::<Vec<_>>()
        .join(" | ")
}

fn set(ids: &[u8]) -> EntitySet {
    ids.iter().map(|n| EntityId::from(format!("e:{n}"))).collect()
}

fn engine(a: &[u8], b: &[u8], c: &[u8]) -> ScopeEngine {
    let source = format!(
        "p:a := {}\np:b := {}\np:c := {}\n\
         p:ab := p:a | p:b\np:ba := p:b + p:a\n\
         p:ab_c := p:ab | p:c\np:bc := p:b | p:c\np:a_bc := p:a | p:bc",
        literal(a),
        literal(b),
        literal(c)
    );
    let mut engine = ScopeEngine::with_config(EngineConfig::new());
    let report = engine.load_source("props", &source);
    assert!(report.is_ok(), "{:?}", report.errors);
    engine
}

fn eval(engine: &ScopeEngine, key: &str) -> EntitySet {
    let key = QualifiedId::parse(key).unwrap();
    engine
        .evaluate(&World::new(), &key, &EvaluationContext::new("e:0"))
        .unwrap()
}

fn ids() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(0u8..8, 0..5)
}

proptest! {
    #[test]
    fn union_is_commutative(a in ids(), b in ids()) {
        let engine = engine(&a, &b, &[]);
        prop_assert_eq!(eval(&engine, "p:ab"), eval(&engine, "p:ba"));
    }

    #[test]
    fn union_is_associative(a in ids(), b in ids(), c in ids()) {
        let engine = engine(&a, &b, &c);
        prop_assert_eq!(eval(&engine, "p:ab_c"), eval(&engine, "p:a_bc"));
    }

    #[test]
    fn union_is_set_union(a in ids(), b in ids()) {
        let engine = engine(&a, &b, &[]);
        let expected: EntitySet = set(&a).union(&set(&b)).cloned().collect();
        prop_assert_eq!(eval(&engine, "p:ab"), expected);
    }

    #[test]
    fn filter_is_intersection(a in ids(), keep in ids()) {
        let engine = engine(&a, &[], &[]);
        let haystack = keep
            .iter()
            .map(|n| format!("\"e:{n}\""))
            .collect::<Vec<_>>()
            .join(", ");
        let source = format!(r#"p:a[{{"in": [{{"var": "."}}, [{haystack}]]}}]"#);
        let filtered = engine
            .query(&World::new(), &source, &EvaluationContext::new("e:0"))
            .unwrap();

        let expected: EntitySet = set(&a).intersection(&set(&keep)).cloned().collect();
        prop_assert!(filtered.is_subset(&eval(&engine, "p:a")));
        prop_assert_eq!(filtered, expected);
    }
}
