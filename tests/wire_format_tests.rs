//! Exact stream layouts for both generations.

use serde_persist::{
    from_str, from_str_with_options, to_string, to_string_with_options, Decoder, Dict, Encoder,
    Error, Generation, Key, List, Options, StreamDecoder, StreamEncoder, Value,
};

fn plain(value: &Value) -> String {
    to_string_with_options(value, Options::plain()).unwrap()
}

mod header {
    use super::*;

    #[test]
    fn test_each_generation_writes_its_number() {
        assert!(plain(&Value::from(1)).starts_with("version:1\n"));
        assert!(to_string(&Value::from(1)).unwrap().starts_with("version:2\n"));
    }

    #[test]
    fn test_header_must_be_first() {
        assert!(matches!(
            from_str("list:0\nversion:1\n"),
            Err(Error::Format { line: 1, .. })
        ));
        assert!(matches!(
            from_str("version\n"),
            Err(Error::Format { line: 1, .. })
        ));
        assert!(matches!(
            from_str("version:\n"),
            Err(Error::UnsupportedVersion { line: 1, .. })
        ));
    }

    #[test]
    fn test_stream_with_only_a_header_is_truncated() {
        assert!(matches!(
            from_str("version:2\n"),
            Err(Error::TruncatedStream { line: 2, .. })
        ));
    }
}

mod scalars {
    use super::*;

    #[test]
    fn test_bool_literals() {
        assert_eq!(plain(&Value::from(true)), "version:1\nbool:True\n");
        assert_eq!(plain(&Value::from(false)), "version:1\nbool:False\n");
        assert!(matches!(
            from_str("version:1\nbool:1\n"),
            Err(Error::InvalidLiteral { line: 2, .. })
        ));
    }

    #[test]
    fn test_float_literals() {
        assert_eq!(plain(&Value::from(1.0)), "version:1\nfloat:1.0\n");
        assert_eq!(plain(&Value::from(0.1)), "version:1\nfloat:0.1\n");
        assert_eq!(plain(&Value::from(f64::NEG_INFINITY)), "version:1\nfloat:-inf\n");
        assert_eq!(from_str("version:1\nfloat:3\n").unwrap(), Value::from(3.0));
    }

    #[test]
    fn test_integers_stay_integers() {
        assert_eq!(plain(&Value::from(-3)), "version:1\nint:-3\n");
        assert_eq!(from_str("version:1\nint:3\n").unwrap().kind(), serde_persist::Kind::Int);
    }

    #[test]
    fn test_scalars_get_fresh_tokens() {
        let value = Value::list(vec![Value::from(7), Value::from(7), Value::from(true)]);
        assert_eq!(
            to_string(&value).unwrap(),
            "version:2\nlist:1:3\nint:2:7\nint:3:7\nbool:4:True\n"
        );
    }
}

mod strings {
    use super::*;

    #[test]
    fn test_empty_string_is_one_empty_line() {
        assert_eq!(plain(&Value::from("")), "version:1\nstr:1\n\n");
        assert_eq!(from_str("version:1\nstr:1\n\n").unwrap(), Value::from(""));
    }

    #[test]
    fn test_line_count_literal() {
        assert_eq!(plain(&Value::from("a\nb\nc")), "version:1\nstr:3\na\nb\nc\n");
        assert_eq!(
            to_string(&Value::from("a\n")).unwrap(),
            "version:2\nstr:1:2\na\n\n"
        );
    }

    #[test]
    fn test_payload_looks_like_a_record() {
        let text = "version:2\nlist:1:2\nstr:2:1\nalias:1:\nint:3:4\n";
        let value = from_str(text).unwrap();
        let items = value.as_list().unwrap().to_vec();
        assert_eq!(items[0].as_str(), Some("alias:1:"));
        assert_eq!(items[1], Value::from(4));
    }

    #[test]
    fn test_missing_payload_lines() {
        assert!(matches!(
            from_str("version:1\nstr:4\none\ntwo\n"),
            Err(Error::TruncatedStream { line: 5, .. })
        ));
    }
}

mod containers {
    use super::*;

    #[test]
    fn test_dict_alternates_keys_and_values() {
        let dict = Dict::new();
        dict.insert(Key::from("a"), Value::from(1));
        dict.insert(Key::from(2), Value::list(vec![]));
        assert_eq!(
            plain(&Value::Dict(dict)),
            "version:1\ndict:2\nstr:1\na\nint:1\nint:2\nlist:0\n"
        );
    }

    #[test]
    fn test_set_elements() {
        let value = Value::set(vec![Value::from(1), Value::from("x")]).unwrap();
        assert_eq!(plain(&value), "version:1\nset:2\nint:1\nstr:1\nx\n");
    }

    #[test]
    fn test_negative_count_is_invalid() {
        assert!(matches!(
            from_str("version:1\nlist:-1\n"),
            Err(Error::InvalidLiteral { line: 2, .. })
        ));
    }

    #[test]
    fn test_huge_count_does_not_allocate_up_front() {
        assert!(matches!(
            from_str("version:1\nlist:18446744073709551615\n"),
            Err(Error::TruncatedStream { line: 3, .. })
        ));
    }

    #[test]
    fn test_container_keys_are_unhashable() {
        assert!(matches!(
            from_str("version:1\ndict:1\nlist:0\nint:1\n"),
            Err(Error::Unhashable(_))
        ));
        assert!(Value::set(vec![Value::list(vec![])]).is_err());
    }
}

mod identity {
    use super::*;

    #[test]
    fn test_alias_records() {
        let inner = Value::list(vec![]);
        let value = Value::list(vec![inner.clone(), inner]);
        assert_eq!(
            to_string(&value).unwrap(),
            "version:2\nlist:1:2\nlist:2:0\nalias:2:\n"
        );
    }

    #[test]
    fn test_self_containing_dict() {
        let dict = Dict::new();
        dict.insert(Key::from("me"), Value::Dict(dict.clone()));
        assert_eq!(
            to_string(&Value::Dict(dict.clone())).unwrap(),
            "version:2\ndict:1:1\nstr:2:1\nme\nalias:1:\n"
        );
        dict.clear();
    }

    #[test]
    fn test_alias_is_unknown_in_plain() {
        assert!(matches!(
            from_str("version:1\nlist:1\nalias:1:\n"),
            Err(Error::UnknownKind { line: 3, .. })
        ));
    }

    #[test]
    fn test_alias_to_a_later_token() {
        assert!(matches!(
            from_str("version:2\nlist:1:2\nalias:2:\nlist:2:0\n"),
            Err(Error::DanglingAlias { line: 3, token: 2 })
        ));
    }

    #[test]
    fn test_tokens_need_not_be_sequential() {
        let value = from_str("version:2\nlist:10:2\nstr:4:1\nhi\nalias:4:\n").unwrap();
        let items = value.as_list().unwrap().to_vec();
        assert!(items[0].same_object(&items[1]));
    }

    #[test]
    fn test_reused_token() {
        assert!(matches!(
            from_str("version:2\nlist:1:1\nlist:1:0\n"),
            Err(Error::DuplicateToken { line: 3, token: 1 })
        ));
    }

    #[test]
    fn test_cycle_cannot_be_written_plain_but_can_be_read_identity() {
        let list = List::new();
        list.push(Value::List(list.clone()));
        let value = Value::List(list.clone());

        assert!(matches!(
            to_string_with_options(&value, Options::plain()),
            Err(Error::CycleInPlainFormat)
        ));

        let text = to_string(&value).unwrap();
        let back = from_str_with_options(&text, Options::plain()).unwrap();
        assert!(back.as_list().unwrap().get(0).unwrap().same_object(&back));

        list.clear();
        back.as_list().unwrap().clear();
    }
}

mod streams {
    use super::*;

    // Each value is built inside the loop and dropped before the next one.
    fn write_temporaries(generation: Generation) -> String {
        let mut encoder = StreamEncoder::begin(Vec::new(), generation).unwrap();
        for i in 0..32 {
            encoder.encode(&Value::str(&format!("word {}", i))).unwrap();
            encoder
                .encode(&Value::list(vec![Value::from(i)]))
                .unwrap();
        }
        String::from_utf8(encoder.finish().unwrap()).unwrap()
    }

    #[test]
    fn test_several_values_on_one_stream() {
        for generation in [Generation::Plain, Generation::IdentityAware] {
            let text = write_temporaries(generation);
            assert!(!text.contains("alias"), "{}", text);

            let mut decoder = StreamDecoder::begin(text.as_bytes(), generation).unwrap();
            for i in 0..32 {
                let word = decoder.decode().unwrap();
                assert_eq!(word.as_str(), Some(format!("word {}", i).as_str()));
                let list = decoder.decode().unwrap();
                assert_eq!(list, Value::list(vec![Value::from(i)]));
            }
        }
    }

    #[test]
    fn test_identity_survives_across_values() {
        let shared = Value::str("kept");
        let mut encoder = StreamEncoder::begin(Vec::new(), Generation::IdentityAware).unwrap();
        encoder.encode(&shared).unwrap();
        encoder.encode(&Value::list(vec![shared.clone()])).unwrap();
        let text = String::from_utf8(encoder.finish().unwrap()).unwrap();
        assert_eq!(text, "version:2\nstr:1:1\nkept\nlist:2:1\nalias:1:\n");

        let mut decoder = StreamDecoder::begin(text.as_bytes(), Generation::Plain).unwrap();
        let first = decoder.decode().unwrap();
        let second = decoder.decode().unwrap();
        assert!(second.as_list().unwrap().get(0).unwrap().same_object(&first));
    }
}
