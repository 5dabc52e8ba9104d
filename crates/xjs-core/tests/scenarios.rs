use xjs_core::options::{JsonOptions, XjsOptions};
use xjs_core::parser::json::parse_json;
use xjs_core::parser::xjs::parse_xjs;
use xjs_core::serializer::json::to_json_string;
use xjs_core::serializer::xjs::to_xjs_string;
use xjs_core::value::{Array, CommentPosition, Reference, ValueKind, ValueNode};

#[test]
fn strict_json_round_trip() {
    let value = parse_json(r#"{"a":1,"b":[2,3]}"#).unwrap();
    assert_eq!(to_json_string(&value, &JsonOptions::default()), r#"{"a":1,"b":[2,3]}"#);

    let formatted = JsonOptions {
        format: true,
        ..JsonOptions::default()
    };
    assert_eq!(
        to_json_string(&value, &formatted),
        "{\n  \"a\": 1,\n  \"b\": [\n    2,\n    3\n  ]\n}"
    );
}

#[test]
fn xjs_relaxed_parse_round_trips_with_defaults() {
    let input = "a: 1 # Comment\nb: 2";
    let value = parse_xjs(input).unwrap();
    let rendered = to_xjs_string(&value, &XjsOptions::default());
    assert_eq!(rendered, input);
}

#[test]
fn comment_placement_header_survives_round_trip() {
    let input = "// Header\nkey: value";
    let value = parse_xjs(input).unwrap();
    value.visiting(|node| {
        let comment = node
            .metadata
            .comments
            .as_ref()
            .and_then(|h| h.get(CommentPosition::Header))
            .expect("header comment");
        assert_eq!(comment.text.trim(), "Header");
    });
    let rendered = to_xjs_string(&value, &XjsOptions::default());
    assert_eq!(rendered, input);
}

#[test]
fn implicit_balanced_value_preserves_internal_punctuation() {
    let input = "k: complex ( nested ( body ) here )";
    let value = parse_xjs(input).unwrap();
    value.visiting(|node| {
        let ValueKind::Object(obj) = &node.kind else {
            panic!("expected object root")
        };
        let member = obj.get("k").unwrap();
        member.visiting(|m| match &m.kind {
            ValueKind::String(text, style) => {
                assert_eq!(text, "complex ( nested ( body ) here )");
                assert_eq!(*style, xjs_core::value::StringStyle::Implicit);
            }
            other => panic!("expected implicit string, got {other:?}"),
        });
    });
    let rendered = to_xjs_string(&value, &XjsOptions::default());
    assert_eq!(rendered, input);
}

#[test]
fn last_write_wins_on_duplicate_keys() {
    let value = parse_json(r#"{"k":1,"k":2}"#).unwrap();
    value.accessing(|node| {
        let ValueKind::Object(obj) = &node.kind else {
            panic!("expected object root")
        };
        assert_eq!(obj.index_of("k"), Some(1));
        let got = obj.get("k").unwrap().accessing(|m| match m.kind {
            ValueKind::Integer(n) => n,
            _ => panic!("expected integer"),
        });
        assert_eq!(got, 2);
    });
    assert_eq!(to_json_string(&value, &JsonOptions::default()), r#"{"k":1,"k":2}"#);
}

#[test]
fn reference_sharing_mutates_every_holder() {
    let shared = Reference::new(ValueNode::new(ValueKind::Integer(1)));

    let mut a1 = Array::new();
    a1.push(shared.clone());
    a1.push(Reference::new(ValueNode::new(ValueKind::Integer(2))));
    a1.push(Reference::new(ValueNode::new(ValueKind::Integer(3))));

    let mut a2 = Array::new();
    a2.push(shared.clone());
    a2.push(Reference::new(ValueNode::new(ValueKind::Integer(5))));
    a2.push(Reference::new(ValueNode::new(ValueKind::Integer(6))));

    shared.set(ValueNode::new(ValueKind::Integer(7))).unwrap();

    let read_int = |r: &Reference| r.visiting(|m| match m.kind {
        ValueKind::Integer(n) => n,
        _ => panic!("expected integer"),
    });

    assert_eq!(read_int(a1.get(0).unwrap()), 7);
    assert_eq!(read_int(a1.get(1).unwrap()), 2);
    assert_eq!(read_int(a1.get(2).unwrap()), 3);
    assert_eq!(read_int(a2.get(0).unwrap()), 7);
    assert_eq!(read_int(a2.get(1).unwrap()), 5);
    assert_eq!(read_int(a2.get(2).unwrap()), 6);
    assert!(a1.get(0).unwrap().shares_identity_with(a2.get(0).unwrap()));
}
