use formwright_types::{FieldPath, Segment};
use proptest::prelude::*;

fn key(k: &str) -> Segment {
    Segment::Key(k.to_string())
}

// ── Parsing ───────────────────────────────────────────────────────

#[test]
fn parse_empty_is_root() {
    let path = FieldPath::parse("").unwrap();
    assert!(path.is_root());
    assert_eq!(path.to_string(), "");
}

#[test]
fn parse_dotted_keys() {
    let path = FieldPath::parse("mtlsConfig.mtls").unwrap();
    assert_eq!(path.segments(), &[key("mtlsConfig"), key("mtls")]);
}

#[test]
fn parse_indices() {
    let path = FieldPath::parse("targets[2].hostname").unwrap();
    assert_eq!(
        path.segments(),
        &[key("targets"), Segment::Index(2), key("hostname")]
    );
}

#[test]
fn parse_leading_and_nested_indices() {
    let path = FieldPath::parse("[0][1].a").unwrap();
    assert_eq!(
        path.segments(),
        &[Segment::Index(0), Segment::Index(1), key("a")]
    );
    assert_eq!(path.to_string(), "[0][1].a");
}

#[test]
fn parse_rejects_malformed_paths() {
    for bad in [".a", "a..b", "a.", "a[", "a[]", "a[x]", "a]", "a[0]b", "a.[0]"] {
        assert!(FieldPath::parse(bad).is_err(), "expected '{bad}' to be rejected");
    }
}

#[test]
fn invalid_path_error_names_the_path() {
    let err = FieldPath::parse("a..b").unwrap_err();
    assert!(err.to_string().contains("a..b"));
}

// ── Navigation helpers ────────────────────────────────────────────

#[test]
fn parent_and_last() {
    let path = FieldPath::parse("a.b[3]").unwrap();
    assert_eq!(path.last(), Some(&Segment::Index(3)));
    assert_eq!(path.parent().unwrap().to_string(), "a.b");
    assert!(FieldPath::root().parent().is_none());
}

#[test]
fn join_key_and_index_builders() {
    let base = FieldPath::parse("targets").unwrap();
    let element = base.index(1);
    let leaf = element.join(&FieldPath::parse("tls.enabled").unwrap());
    assert_eq!(leaf.to_string(), "targets[1].tls.enabled");
    assert_eq!(element.key("port").to_string(), "targets[1].port");
}

#[test]
fn prefix_operations() {
    let path = FieldPath::parse("a.b[0].c").unwrap();
    let prefix = FieldPath::parse("a.b").unwrap();
    assert!(path.starts_with(&prefix));
    assert_eq!(path.strip_prefix(&prefix).unwrap().to_string(), "[0].c");
    assert!(path.strip_prefix(&FieldPath::parse("x").unwrap()).is_none());
}

#[test]
fn schema_key_drops_indices() {
    let path = FieldPath::parse("directives[4].arguments.url").unwrap();
    assert_eq!(path.schema_key(), "directives.arguments.url");
}

#[test]
fn serde_uses_string_form() {
    let path = FieldPath::parse("a[1].b").unwrap();
    let json = serde_json::to_string(&path).unwrap();
    assert_eq!(json, "\"a[1].b\"");
    let back: FieldPath = serde_json::from_str(&json).unwrap();
    assert_eq!(back, path);
    assert!(serde_json::from_str::<FieldPath>("\"a..b\"").is_err());
}

// ── Properties ────────────────────────────────────────────────────

fn segment_strategy() -> impl Strategy<Value = Segment> {
    prop_oneof![
        "[a-zA-Z_][a-zA-Z0-9_]{0,8}".prop_map(Segment::Key),
        (0usize..50).prop_map(Segment::Index),
    ]
}

proptest! {
    /// Display followed by parse yields the same segments.
    #[test]
    fn display_then_parse_is_identity(segments in prop::collection::vec(segment_strategy(), 0..6)) {
        let path = FieldPath::from_segments(segments);
        let reparsed = FieldPath::parse(&path.to_string()).unwrap();
        prop_assert_eq!(reparsed, path);
    }
}
