use super::*;

#[test]
fn new_and_len() {
    let s = Span::new(4, 10);
    assert_eq!(s.len(), 6);
    assert!(!s.is_empty());
}

#[test]
fn at_is_empty() {
    let s = Span::at(7);
    assert!(s.is_empty());
    assert_eq!(s.start, 7);
    assert_eq!(s.end, 7);
}

#[test]
fn dummy_is_recognized() {
    let s = Span::dummy();
    assert!(s.is_dummy());
    assert!(!Span::new(0, 1).is_dummy());
}

#[test]
fn merge_covers_both() {
    let a = Span::new(2, 5);
    let b = Span::new(10, 14);
    let m = a.merge(b);
    assert_eq!(m, Span::new(2, 14));
}

#[test]
fn span_builder_tracks_start() {
    let b = SpanBuilder::start(3);
    let s = b.end(9);
    assert_eq!(s, Span::new(3, 9));
}

#[test]
fn source_location_roundtrip() {
    let span = Span::new(1, 2);
    let loc: SourceLocation = span.into();
    assert_eq!(loc.span(), span);
    assert!(!loc.is_synthetic());
    assert!(SourceLocation::synthetic().is_synthetic());
}

#[test]
fn display_format() {
    assert_eq!(Span::new(1, 4).to_string(), "1..4");
}
