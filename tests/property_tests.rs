//! Property-based tests for accessor identity, path resolution, and
//! projection construction.

mod common;

use proptest::prelude::*;
use schemata::{AnyKeyPath, Model, TypeTag, ValueMap};

use common::*;

/// `Employee.manager` repeated `hops` times, then one terminal field.
fn manager_chain(hops: usize, terminal: &AnyKeyPath) -> AnyKeyPath {
    let mut chain = Employee::manager().erased().clone();
    for _ in 1..hops {
        chain = chain.appending(Employee::manager().erased());
    }
    chain.appending(terminal)
}

fn terminal_strategy() -> impl Strategy<Value = (AnyKeyPath, &'static str)> {
    prop_oneof![
        Just((Employee::name().erased().clone(), "name")),
        Just((Employee::level().erased().clone(), "level")),
        Just((Employee::skills().erased().clone(), "skills")),
    ]
}

proptest! {
    #[test]
    fn manager_chains_resolve_hop_by_hop(hops in 1usize..6, (terminal, path) in terminal_strategy()) {
        let chain = manager_chain(hops, &terminal);
        let resolved = Employee::schema().properties_for(&chain);

        prop_assert_eq!(resolved.len(), hops + 1);
        for property in &resolved[..hops] {
            prop_assert_eq!(property.path(), "manager_id");
        }
        prop_assert_eq!(resolved[hops].path(), path);
    }

    #[test]
    fn unknown_terminal_is_unreachable(hops in 1usize..5, field in "[a-z]{3,10}") {
        prop_assume!(!["name", "level", "skills", "manager", "department"].contains(&field.as_str()));
        let leaked: &'static str = Box::leak(field.into_boxed_str());
        let terminal = AnyKeyPath::field(TypeTag::of::<Employee>(), leaked);
        prop_assert!(Employee::schema().properties_for(manager_chain(hops, &terminal)).is_empty());
    }

    #[test]
    fn chain_equality_is_structural(a in 1usize..5, b in 1usize..5) {
        let name = Employee::name().erased().clone();
        prop_assert_eq!(manager_chain(a, &name) == manager_chain(b, &name), a == b);
    }

    #[test]
    fn make_value_matches_direct_construction(title in "\\PC{0,40}", author in "[A-Za-z ]{1,20}") {
        let direct = Book {
            title: title.clone(),
            author: Author { name: author.clone(), books: Vec::new() },
        };
        let values = ValueMap::new()
            .with(&Book::title(), title)
            .with(&Book::author(), Author { name: author, books: Vec::new() });

        let built = Book::schema().constructor().unwrap().make_value(&values);
        prop_assert_eq!(built, direct);
    }
}
