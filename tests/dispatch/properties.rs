//! Pin construction properties.

use proptest::prelude::*;
use serde_json::{json, Value};

use microplum::{Args, Attr, Pin};

fn key() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("role".to_string()),
        Just("cmd".to_string()),
        Just("version".to_string()),
        Just("environment".to_string()),
        "[a-z]{1,6}",
    ]
}

fn value() -> impl Strategy<Value = Value> {
    prop_oneof![
        "[a-z0-9]{0,6}".prop_map(Value::from),
        any::<i32>().prop_map(Value::from),
        any::<bool>().prop_map(Value::from),
        Just(json!("*")),
    ]
}

fn args() -> impl Strategy<Value = Args> {
    prop::collection::vec((key(), value()), 0..8).prop_map(|pairs| pairs.into_iter().collect())
}

proptest! {
    #[test]
    fn build_never_overrides_role_or_cmd(base in args(), call in args()) {
        let pin = Pin::build("widget", "find", &base, &call);
        prop_assert_eq!(pin.role(), &Attr::from("widget"));
        prop_assert_eq!(pin.cmd(), &Attr::from("find"));
    }

    #[test]
    fn call_attrs_win_over_base(base in args(), call in args()) {
        let pin = Pin::build("widget", "find", &base, &call);
        for (k, v) in call.iter().filter(|(k, _)| *k != "role" && *k != "cmd") {
            prop_assert_eq!(pin.get(k), Some(&Attr::from(v.clone())));
        }
    }

    #[test]
    fn decorate_keeps_existing_version(call in args()) {
        let original = Pin::build("widget", "find", &Args::new(), &call);
        let decorated = original.clone().decorate("v9", "staging", Some("ada"));

        match original.version() {
            Some(v) => prop_assert_eq!(decorated.version(), Some(v)),
            None => prop_assert_eq!(decorated.version(), Some(&Attr::from("v9"))),
        }
        prop_assert!(decorated.developer() == original.developer());
    }

    #[test]
    fn pattern_key_is_order_independent(call in args()) {
        let forward = Pin::build("widget", "find", &Args::new(), &call);
        let reversed: Args = call.into_iter().rev().collect();
        let backward = Pin::build("widget", "find", &Args::new(), &reversed);
        prop_assert_eq!(forward.to_pattern_key(), backward.to_pattern_key());
    }

    #[test]
    fn pin_matches_itself(call in args()) {
        let pin = Pin::build("widget", "find", &Args::new(), &call);
        prop_assert!(pin.matches(&pin));
    }
}
