use serde_persist::{from_str, to_string, to_string_with_options, value, Kind, Options, Value};

#[test]
fn test_macro_builds_nested_values() {
    let data = value!({
        "user": {"name": "Alice", "age": 30},
        "roles": ["admin", "dev"],
        "ids": {1, 2, 3}
    });

    let dict = data.as_dict().unwrap();
    assert_eq!(dict.len(), 3);
    assert_eq!(dict.get("user").unwrap().kind(), Kind::Dict);
    assert_eq!(dict.get("roles").unwrap().as_list().unwrap().len(), 2);
    assert_eq!(dict.get("ids").unwrap().as_set().unwrap().len(), 3);
}

#[test]
fn test_macro_values_round_trip() {
    let data = value!([true, false, 0, (-7), 2.25, "", "x\ny", [], {}, {"k": [1]}]);
    for options in [Options::plain(), Options::identity_aware()] {
        let text = to_string_with_options(&data, options).unwrap();
        assert_eq!(from_str(&text).unwrap(), data);
    }
}

#[test]
fn test_macro_trailing_commas() {
    assert_eq!(value!([1, 2,]), Value::list(vec![Value::from(1), Value::from(2)]));
    assert_eq!(value!({"a": 1,}).as_dict().unwrap().len(), 1);
    assert_eq!(value!({"a", "b",}).as_set().unwrap().len(), 2);
}

#[test]
fn test_macro_literals_are_separate_objects() {
    let data = value!(["same", "same"]);
    let text = to_string(&data).unwrap();
    assert_eq!(text, "version:2\nlist:1:2\nstr:2:1\nsame\nstr:3:1\nsame\n");
}

#[test]
fn test_macro_accepts_expressions() {
    let shared = value!(["inner"]);
    let data = value!([(shared.clone()), (shared.clone())]);
    let items = data.as_list().unwrap().to_vec();
    assert!(items[0].same_object(&shared));
    assert!(items[1].same_object(&shared));
}
