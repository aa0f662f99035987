//! Query codec properties.

use proptest::collection::{btree_map, vec};
use proptest::prelude::*;
use std::collections::BTreeMap;
use workflow_navigator::query::{decode, encode};
use workflow_navigator::{Query, QueryValue};

// Keys and values deliberately include the codec's own syntax characters.
const TEXT: &str = "[a-zA-Z0-9 _.~%&=+?#/\\[\\]éü]{0,8}";
const KEY: &str = "[a-zA-Z0-9 _.~%&=+?#/\\[\\]éü]{1,6}";

fn query_value() -> impl Strategy<Value = QueryValue> {
    let leaf = prop_oneof![
        TEXT.prop_map(QueryValue::Scalar),
        vec(TEXT, 1..4).prop_map(QueryValue::List),
    ];
    leaf.prop_recursive(3, 16, 4, |inner| {
        btree_map(KEY, inner, 1..4).prop_map(QueryValue::Map)
    })
}

fn query() -> impl Strategy<Value = Query> {
    btree_map(KEY, query_value(), 0..5).prop_map(|entries: BTreeMap<String, QueryValue>| {
        entries.into_iter().collect::<Query>()
    })
}

proptest! {
    #[test]
    fn prop_decode_inverts_encode(query in query()) {
        let encoded = encode(&query);
        prop_assert_eq!(decode(&encoded), query);
    }

    #[test]
    fn prop_encoding_is_canonical(query in query()) {
        let encoded = encode(&query);
        prop_assert_eq!(encode(&decode(&encoded)), encoded);
    }

    #[test]
    fn prop_decode_never_panics(input in "\\PC{0,40}") {
        let _ = decode(&input);
    }
}

#[test]
fn test_nested_structures() {
    let query = decode("?filter[status]=open&filter[tags][]=a&filter[tags][]=b&page=2");

    let filter = query.get("filter").and_then(QueryValue::as_map).unwrap();
    assert_eq!(filter["status"].as_str(), Some("open"));
    assert_eq!(
        filter["tags"].as_list(),
        Some(&["a".to_string(), "b".to_string()][..])
    );
    assert_eq!(query.get_as::<u32>("page"), Some(2));
    assert_eq!(
        encode(&query),
        "filter[status]=open&filter[tags][]=a&filter[tags][]=b&page=2"
    );
}

#[test]
fn test_malformed_keys_do_not_poison_the_rest() {
    let query = decode("a[b=1&ok=yes&[x]=2&c[]d=3");
    assert_eq!(query.get_str("a[b"), Some("1"));
    assert_eq!(query.get_str("ok"), Some("yes"));
    assert_eq!(query.get_str("[x]"), Some("2"));
    assert_eq!(query.get_str("c[]d"), Some("3"));
}

#[test]
fn test_empty_keys_are_not_encoded() {
    let mut query = Query::new();
    query.insert("", "v");
    let mut nested = BTreeMap::new();
    nested.insert(String::new(), QueryValue::Scalar("x".into()));
    nested.insert("b".to_string(), QueryValue::Scalar("1".into()));
    query.insert("a", QueryValue::Map(nested));

    let encoded = encode(&query);
    assert_eq!(encoded, "a[b]=1");
    let decoded = decode(&encoded);
    assert!(decoded.get("").is_none());
    assert!(decoded.get("a").and_then(QueryValue::as_list).is_none());
    assert_eq!(
        decoded.get("a").and_then(QueryValue::as_map).map(|m| m.len()),
        Some(1)
    );

    let mut only_empty = Query::new();
    only_empty.insert("", "v");
    assert_eq!(encode(&only_empty), "");
}

#[test]
fn test_empty_query() {
    assert!(decode("").is_empty());
    assert!(decode("?").is_empty());
    assert!(decode("&&").is_empty());
    assert_eq!(encode(&Query::new()), "");
    assert_eq!(Query::new().to_search(), "");
}
