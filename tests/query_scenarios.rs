//! Query Scenario Tests
//!
//! End-to-end evaluation over the sample cars:
//! - Equality, conjunction, one_of and negation scenarios
//! - Range operators and mixed-type index values
//! - Algebraic properties (commutativity, complement, idempotence)

mod common;

use common::{all_keys, car_store, key_set, names};
use keyquery::store::IndexHandle;
use keyquery::{Index, Key, MemoryStore, ObjectStore};

// =============================================================================
// Sample Scenarios
// =============================================================================

#[tokio::test]
async fn test_eq_bmw() {
    let store = car_store();
    let keys = all_keys(&Index::new("make").eq("BMW"), &store).await.unwrap();
    assert_eq!(key_set(keys), names(&["ECTO-1", "ECTO-2", "Cheesy"]));
}

#[tokio::test]
async fn test_bmw_and_325e() {
    let store = car_store();
    let query = Index::new("make").eq("BMW").and(&Index::new("model").eq("325e"));
    let keys = all_keys(&query, &store).await.unwrap();
    assert_eq!(key_set(keys), names(&["ECTO-2", "Cheesy"]));
}

#[tokio::test]
async fn test_one_of_volkswagen_subaru() {
    let store = car_store();
    let query = Index::new("make").one_of(["Volkswagen", "Subaru"]).unwrap();
    let keys = all_keys(&query, &store).await.unwrap();
    assert_eq!(key_set(keys), names(&["Pikachubaru", "Ferdinand the Bug"]));
}

#[tokio::test]
async fn test_neq_bmw() {
    let store = car_store();
    let keys = all_keys(&Index::new("make").neq("BMW"), &store).await.unwrap();
    assert_eq!(key_set(keys), names(&["Pikachubaru", "Ferdinand the Bug"]));
}

#[tokio::test]
async fn test_eq_without_matches_is_empty() {
    let store = car_store();
    let keys = all_keys(&Index::new("make").eq("Chevrolet"), &store).await.unwrap();
    assert!(keys.is_empty());
}

// =============================================================================
// Range Operators
// =============================================================================

#[tokio::test]
async fn test_strict_and_inclusive_bounds() {
    let store = car_store();
    let year = Index::new("year");

    let lt = all_keys(&year.lt(1984), &store).await.unwrap();
    assert_eq!(key_set(lt), names(&["Ferdinand the Bug"]));

    let lteq = all_keys(&year.lteq(1984), &store).await.unwrap();
    assert_eq!(key_set(lteq), names(&["Ferdinand the Bug", "Cheesy"]));

    let gt = all_keys(&Index::new("races").gt(5), &store).await.unwrap();
    assert_eq!(key_set(gt), names(&["Cheesy"]));

    let gteq = all_keys(&Index::new("races").gteq(5), &store).await.unwrap();
    assert_eq!(key_set(gteq), names(&["Cheesy", "Pikachubaru"]));
}

#[tokio::test]
async fn test_between_variants() {
    let store = car_store();
    let races = Index::new("races");

    let open = all_keys(&races.between(1, 5), &store).await.unwrap();
    assert_eq!(key_set(open), names(&["ECTO-2"]));

    let closed = all_keys(&races.between_eq(1, 5), &store).await.unwrap();
    assert_eq!(key_set(closed), names(&["ECTO-1", "ECTO-2", "Pikachubaru"]));
}

/// Keys order Int before String, so "1984ish" sits above every integer year.
#[tokio::test]
async fn test_mixed_type_year_values() {
    let store = car_store();
    let year = Index::new("year");

    let numeric = all_keys(&year.between_eq(1900, 2100), &store).await.unwrap();
    assert_eq!(
        key_set(numeric),
        names(&["ECTO-1", "Cheesy", "Pikachubaru", "Ferdinand the Bug"])
    );

    let unbounded = all_keys(&year.gteq(1900), &store).await.unwrap();
    assert!(unbounded.contains(&Key::from("ECTO-2")));
    assert_eq!(unbounded.len(), 5);

    let fuzzy = all_keys(&year.eq("1984ish"), &store).await.unwrap();
    assert_eq!(key_set(fuzzy), names(&["ECTO-2"]));
}

#[tokio::test]
async fn test_nested_expression() {
    let store = car_store();
    let query = Index::new("make")
        .eq("BMW")
        .and(&Index::new("races").gt(2))
        .or(&Index::new("year").lt(1980));
    let keys = all_keys(&query, &store).await.unwrap();
    assert_eq!(key_set(keys), names(&["ECTO-2", "Cheesy", "Ferdinand the Bug"]));
}

// =============================================================================
// Algebraic Properties
// =============================================================================

#[tokio::test]
async fn test_and_or_match_set_algebra_over_operands() {
    let store = car_store();
    let a = Index::new("make").eq("BMW");
    let b = Index::new("races").lteq(3);

    let a_keys = key_set(all_keys(&a, &store).await.unwrap());
    let b_keys = key_set(all_keys(&b, &store).await.unwrap());

    let and_keys = key_set(all_keys(&a.and(&b), &store).await.unwrap());
    let or_keys = key_set(all_keys(&a.or(&b), &store).await.unwrap());

    assert_eq!(and_keys, a_keys.intersection(&b_keys).cloned().collect());
    assert_eq!(or_keys, a_keys.union(&b_keys).cloned().collect());
}

#[tokio::test]
async fn test_commutativity() {
    let store = car_store();
    let a = Index::new("model").eq("325e");
    let b = Index::new("year").gt(1980);

    let ab = key_set(all_keys(&a.or(&b), &store).await.unwrap());
    let ba = key_set(all_keys(&b.or(&a), &store).await.unwrap());
    assert_eq!(ab, ba);

    let ab = key_set(all_keys(&a.and(&b), &store).await.unwrap());
    let ba = key_set(all_keys(&b.and(&a), &store).await.unwrap());
    assert_eq!(ab, ba);
}

#[tokio::test]
async fn test_eq_or_neq_covers_index_without_duplicates() {
    let store = car_store();
    let make = Index::new("make");

    let keys = all_keys(&make.eq("BMW").or(&make.neq("BMW")), &store)
        .await
        .unwrap();
    let everything = full_index(&store, "make").await;

    assert_eq!(keys.len(), everything.len());
    assert_eq!(key_set(keys), key_set(everything));
}

#[tokio::test]
async fn test_neq_is_complement_of_eq() {
    let store = car_store();
    let model = Index::new("model");

    for value in ["325e", "325i", "Super Beetle", "Trabant"] {
        let eq = key_set(all_keys(&model.eq(value), &store).await.unwrap());
        let neq = key_set(all_keys(&model.neq(value), &store).await.unwrap());
        let everything = key_set(full_index(&store, "model").await);

        assert!(eq.is_disjoint(&neq), "overlap for {}", value);
        assert_eq!(everything.difference(&eq).cloned().collect::<std::collections::BTreeSet<_>>(), neq);
    }
}

#[tokio::test]
async fn test_evaluation_is_idempotent() {
    let store = car_store();
    let query = Index::new("make")
        .one_of(["BMW", "Subaru"])
        .unwrap()
        .and(&Index::new("races").neq(9));

    let first = all_keys(&query, &store).await.unwrap();
    let second = all_keys(&query, &store).await.unwrap();
    assert_eq!(key_set(first.clone()), key_set(second));
    assert_eq!(key_set(first), names(&["ECTO-1", "ECTO-2", "Pikachubaru"]));
}

#[tokio::test]
async fn test_shared_subtree_reused() {
    let store = car_store();
    let bmw = Index::new("make").eq("BMW");
    let old_bmw = bmw.and(&Index::new("year").lt(1985));
    let bmw_or_vw = bmw.or(&Index::new("make").eq("Volkswagen"));

    assert_eq!(key_set(all_keys(&old_bmw, &store).await.unwrap()), names(&["Cheesy"]));
    assert_eq!(
        key_set(all_keys(&bmw_or_vw, &store).await.unwrap()),
        names(&["ECTO-1", "ECTO-2", "Cheesy", "Ferdinand the Bug"])
    );
}

#[tokio::test]
async fn test_direct_evaluate_matches_request() {
    let store = car_store();
    let query = Index::new("model").eq("325e").or(&Index::new("races").eq(0));

    let direct = query.evaluate(&*store).await.unwrap();
    let requested = all_keys(&query, &store).await.unwrap();
    assert_eq!(key_set(direct), key_set(requested));
}

// =============================================================================
// Helper Functions
// =============================================================================

async fn full_index(store: &MemoryStore, name: &str) -> Vec<Key> {
    let index = store.index(name).unwrap();
    index.get_all_keys(None).await.unwrap()
}
