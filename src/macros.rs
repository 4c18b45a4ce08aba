/// Builds a [`Value`](crate::Value) from literal syntax.
///
/// - `[a, b]` is a list
/// - `{}` is an empty dict, `{k: v, ..}` a dict
/// - `{a, b}` is a set
/// - anything else goes through `Value::from`
///
/// Dict keys and set elements must convert into a [`Key`](crate::Key).
/// Nested items are single token trees; wrap negative numbers and other
/// multi-token expressions in parentheses.
///
/// ```rust
/// use serde_persist::value;
///
/// let data = value!({
///     "name": "Alice",
///     "scores": [1, 2, (-3)],
///     "flags": {true, "admin"}
/// });
/// assert_eq!(data.as_dict().unwrap().len(), 3);
/// ```
#[macro_export]
macro_rules! value {
    (true) => {
        $crate::Value::Bool(true)
    };

    (false) => {
        $crate::Value::Bool(false)
    };

    ([]) => {
        $crate::Value::list(::std::vec::Vec::new())
    };

    ([ $($elem:tt),+ $(,)? ]) => {
        $crate::Value::list(vec![$($crate::value!($elem)),+])
    };

    ({}) => {
        $crate::Value::Dict($crate::Dict::new())
    };

    ({ $($key:tt : $value:tt),+ $(,)? }) => {{
        let dict = $crate::Dict::new();
        $(
            dict.insert($crate::Key::from($key), $crate::value!($value));
        )+
        $crate::Value::Dict(dict)
    }};

    ({ $($elem:tt),+ $(,)? }) => {{
        let set = $crate::Set::new();
        $(
            set.insert($crate::Key::from($elem));
        )+
        $crate::Value::Set(set)
    }};

    ($e:expr) => {
        $crate::Value::from($e)
    };
}

#[cfg(test)]
mod tests {
    use crate::{Key, Kind, Value};

    #[test]
    fn test_value_macro_scalars() {
        assert_eq!(value!(true), Value::Bool(true));
        assert_eq!(value!(false), Value::Bool(false));
        assert_eq!(value!(42), Value::Int(42));
        assert_eq!(value!(2.5), Value::Float(2.5));
        assert_eq!(value!("hello").as_str(), Some("hello"));
    }

    #[test]
    fn test_value_macro_lists() {
        assert_eq!(value!([]), Value::list(vec![]));
        let list = value!([1, "two", [true]]);
        let items = list.as_list().unwrap().to_vec();
        assert_eq!(items.len(), 3);
        assert_eq!(items[2].kind(), Kind::List);
    }

    #[test]
    fn test_value_macro_dict_and_set() {
        assert!(value!({}).as_dict().unwrap().is_empty());

        let dict = value!({"a": 1, 2: {"x", "y", "x"}});
        let dict = dict.as_dict().unwrap();
        assert_eq!(dict.get("a"), Some(Value::Int(1)));
        let set = dict.get(2).unwrap();
        assert_eq!(set.as_set().unwrap().len(), 2);
        assert!(set.as_set().unwrap().contains(Key::from("y")));
    }

    #[test]
    fn test_value_macro_expressions() {
        let name = String::from("Bob");
        assert_eq!(value!(name).as_str(), Some("Bob"));
        assert_eq!(value!((-3)), Value::Int(-3));
    }
}
