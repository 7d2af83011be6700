use ordered_json::{deep_equal, Decoder, Encoder, OrderedMap, Value};
use proptest::prelude::*;

fn arb_key() -> impl Strategy<Value = String> {
    "[a-z{}\\[\\]:,\"\\\\<>& ]{0,6}"
}

fn arb_scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::from),
        any::<i64>().prop_map(Value::from),
        any::<u64>().prop_map(Value::from),
        (-1.0e9f64..1.0e9).prop_map(Value::from),
        any::<String>().prop_map(Value::from),
    ]
}

fn arb_value() -> impl Strategy<Value = Value> {
    arb_scalar().prop_recursive(4, 48, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Sequence),
            prop::collection::vec((arb_key(), inner), 0..6)
                .prop_map(|pairs| Value::Map(pairs.into_iter().collect())),
        ]
    })
}

fn arb_map() -> impl Strategy<Value = OrderedMap> {
    prop::collection::vec((arb_key(), arb_value()), 0..8)
        .prop_map(|pairs| pairs.into_iter().collect())
}

fn encoders() -> [Encoder; 3] {
    [
        Encoder::new(),
        Encoder::new().escape_html(false),
        Encoder::pretty(),
    ]
}

proptest! {
    #[test]
    fn decode_of_encode_preserves_order_and_values(m in arb_map()) {
        for encoder in encoders() {
            let text = encoder.encode(&m).expect("finite values always encode");
            let back = Decoder::new().decode_str(&text).expect("encoder output is valid");
            prop_assert_eq!(&back, &m, "via {}", text);
        }
    }

    #[test]
    fn sort_keys_is_a_permutation(m in arb_map()) {
        let mut sorted = m.clone();
        sorted.sort_keys(|keys| keys.sort()).expect("sorting keeps the key set");
        let mut expected = m.keys();
        expected.sort();
        prop_assert_eq!(sorted.keys(), expected);
        prop_assert!(deep_equal(&Value::Map(sorted), &Value::Map(m)));
    }

    #[test]
    fn sort_by_value_is_stable(values in prop::collection::vec(0u8..4, 0..12)) {
        let mut m = OrderedMap::new();
        for (i, v) in values.iter().enumerate() {
            m.set(format!("k{i:02}"), *v);
        }
        m.sort(|a, b| a.value().as_u64() < b.value().as_u64());

        let mut expected: Vec<(usize, u8)> = values.iter().copied().enumerate().collect();
        expected.sort_by_key(|&(_, v)| v);
        let expected: Vec<String> = expected.iter().map(|(i, _)| format!("k{i:02}")).collect();
        prop_assert_eq!(m.keys(), expected);
    }
}
