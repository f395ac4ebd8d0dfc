//! The concrete end-to-end scenario table.

use super::common::parse_default;
use crate::{
    AssemblerOptions, ColumnCountStrategy, Error, LexerOptions, OutputShape, Pipeline, Record,
    ScalarLexer,
};

fn object_field<'a>(record: &'a Record, key: &str) -> Option<&'a str> {
    match record {
        Record::Object(map) => map.get(key).and_then(|v| v.as_deref()),
        Record::Array(_) => panic!("expected object-shape record"),
    }
}

#[test]
fn scenario_1_infers_header_and_emits_two_rows() {
    let records = parse_default("name,age\nAlice,42\nBob,69").unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(object_field(&records[0], "name"), Some("Alice"));
    assert_eq!(object_field(&records[0], "age"), Some("42"));
    assert_eq!(object_field(&records[1], "name"), Some("Bob"));
    assert_eq!(object_field(&records[1], "age"), Some("69"));
}

#[test]
fn scenario_2_quoted_fields_with_embedded_delimiter_and_escaped_quote() {
    let records = parse_default("a,b,c\n1,\"x,y\",3\n4,\"he said \"\"hi\"\"\",6").unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(object_field(&records[0], "b"), Some("x,y"));
    assert_eq!(object_field(&records[1], "b"), Some("he said \"hi\""));
}

#[test]
fn scenario_3_crlf_with_no_trailing_empty_record() {
    let records = parse_default("a,b\r\n1,2\r\n3,4\r\n").unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(object_field(&records[0], "a"), Some("1"));
    assert_eq!(object_field(&records[1], "a"), Some("3"));
}

#[test]
fn scenario_4_pad_strategy_fills_absent_trailing_field() {
    let records = parse_default("a,b,c\n1,2").unwrap();
    assert_eq!(records.len(), 1);
    match &records[0] {
        Record::Object(map) => {
            assert_eq!(map.get("a").unwrap().as_deref(), Some("1"));
            assert_eq!(map.get("b").unwrap().as_deref(), Some("2"));
            assert_eq!(map.get("c").unwrap(), &None);
        }
        Record::Array(_) => panic!("expected object-shape record"),
    }
}

#[test]
fn scenario_5_strict_strategy_reports_column_count_mismatch() {
    let mut options = AssemblerOptions::default();
    options.column_count_strategy = Some(ColumnCountStrategy::Strict);
    let err = super::common::parse_with("a,b,c\n1,2,3,4", options).unwrap_err();
    match err {
        Error::ColumnCountMismatch { header_len, record_len, row_number, .. } => {
            assert_eq!(header_len, 3);
            assert_eq!(record_len, 4);
            assert_eq!(row_number, 2);
        }
        other => panic!("expected ColumnCountMismatch, got {other:?}"),
    }
}

#[test]
fn scenario_6_skip_empty_lines_drops_the_blank_row() {
    let mut options = AssemblerOptions::default();
    options.skip_empty_lines = true;
    let records = super::common::parse_with("a,b\n\n1,2", options).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(object_field(&records[0], "a"), Some("1"));
}

#[test]
fn blank_line_fabricates_empty_strings_under_default_object_pad() {
    let records = parse_default("a,b\n\n1,2").unwrap();
    assert_eq!(records.len(), 2);
    match &records[0] {
        Record::Object(map) => {
            assert_eq!(map.get("a").unwrap().as_deref(), Some(""));
            assert_eq!(map.get("b").unwrap().as_deref(), Some(""));
        }
        Record::Array(_) => panic!("expected object-shape record"),
    }
}

#[test]
fn blank_line_under_array_keep_emits_one_element_array_of_empty_string() {
    let mut options = AssemblerOptions::default();
    options.header = Some(vec!["a".to_string(), "b".to_string()]);
    options.output_shape = OutputShape::Array;
    options.column_count_strategy = Some(ColumnCountStrategy::Keep);
    let records = super::common::parse_with("\n1,2\n", options).unwrap();
    assert_eq!(records.len(), 2);
    assert!(matches!(&records[0], Record::Array(f) if f == &vec![Some(String::new())]));
}

#[test]
fn scenario_7_quote_spans_chunks_with_caller_supplied_header() {
    let mut options = AssemblerOptions::default();
    options.header = Some(vec!["x".to_string(), "y".to_string()]);
    let lexer = ScalarLexer::new(LexerOptions::default()).unwrap();
    let mut pipeline = Pipeline::new(lexer, options).unwrap();
    let mut records = pipeline.feed("\"hel").unwrap();
    records.extend(pipeline.feed("lo\"").unwrap());
    records.extend(pipeline.feed(",world\n").unwrap());
    records.extend(pipeline.flush().unwrap());
    assert_eq!(records.len(), 1);
    assert_eq!(object_field(&records[0], "x"), Some("hello"));
    assert_eq!(object_field(&records[0], "y"), Some("world"));
}

#[test]
fn scenario_8_unterminated_quote_at_flush_is_an_error() {
    let lexer = ScalarLexer::new(LexerOptions::default()).unwrap();
    let mut pipeline = Pipeline::new(lexer, AssemblerOptions::default()).unwrap();
    pipeline.feed("a\n\"unterminated").unwrap();
    assert!(matches!(
        pipeline.flush(),
        Err(Error::UnterminatedQuotedField { .. })
    ));
}

#[test]
fn array_shape_headerless_mode_passes_rows_through() {
    let mut options = AssemblerOptions::default();
    options.header = Some(Vec::new());
    options.output_shape = OutputShape::Array;
    let records = super::common::parse_with("1,2\n3,4,5\n", options).unwrap();
    assert_eq!(records.len(), 2);
    assert!(matches!(&records[0], Record::Array(f) if f.len() == 2));
    assert!(matches!(&records[1], Record::Array(f) if f.len() == 3));
}
