//! Chunk-boundary invariance (Testable Property 1) at the trickiest split
//! points: CRLF torn between `\r` and `\n`, a multi-byte UTF-8 character
//! torn mid-sequence, a doubled-quote escape torn between the two quotes,
//! and a split immediately after the opening quote.

use crate::{IndexedLexer, Lexer, LexerOptions, ScalarLexer};

fn lex_whole<L: Lexer>(mut lexer: L, input: &str) -> Vec<crate::Token> {
    let mut tokens = lexer.feed(input).unwrap();
    tokens.extend(lexer.flush().unwrap());
    tokens
}

fn lex_split<L: Lexer>(mut lexer: L, input: &str, split_at: usize) -> Vec<crate::Token> {
    let (first, second) = input.split_at(split_at);
    let mut tokens = lexer.feed(first).unwrap();
    tokens.extend(lexer.feed(second).unwrap());
    tokens.extend(lexer.flush().unwrap());
    tokens
}

fn field_values(tokens: &[crate::Token]) -> Vec<&str> {
    tokens
        .iter()
        .filter_map(|t| match t {
            crate::Token::Field { value, .. } => Some(value.as_str()),
            _ => None,
        })
        .collect()
}

fn assert_every_split_matches(input: &str) {
    let whole_tokens = lex_whole(ScalarLexer::new(LexerOptions::default()).unwrap(), input);
    let whole = field_values(&whole_tokens);
    for split_at in 0..=input.len() {
        if !input.is_char_boundary(split_at) {
            continue;
        }
        let chunked = lex_split(
            ScalarLexer::new(LexerOptions::default()).unwrap(),
            input,
            split_at,
        );
        assert_eq!(
            field_values(&chunked),
            whole,
            "split at byte {split_at} diverged for input {input:?}"
        );
    }
}

#[test]
fn crlf_split_between_cr_and_lf() {
    assert_every_split_matches("a,b\r\nc,d\r\n");
}

#[test]
fn multibyte_utf8_character_split_mid_sequence() {
    // "日" is 3 bytes; every split point, including inside it, must still
    // round-trip once the character's bytes are all fed.
    assert_every_split_matches("a,日本\nb,語\n");
}

#[test]
fn doubled_quote_escape_split_between_the_two_quotes() {
    assert_every_split_matches("\"a\"\"b\",c\n");
}

#[test]
fn split_immediately_after_opening_quote() {
    assert_every_split_matches("\"hello, world\",x\n");
}

#[test]
fn bare_cr_not_followed_by_lf_is_field_content_regardless_of_split() {
    assert_every_split_matches("a\rb,c\n");
}

#[test]
fn indexed_lexer_agrees_with_scalar_lexer_on_crlf_split() {
    let input = "a,b\r\nc,d\r\n";
    let scalar_tokens = lex_whole(ScalarLexer::new(LexerOptions::default()).unwrap(), input);
    let scalar = field_values(&scalar_tokens);
    for split_at in 1..input.len() {
        if !input.is_char_boundary(split_at) {
            continue;
        }
        let indexed = lex_split(
            IndexedLexer::new(LexerOptions::default()).unwrap(),
            input,
            split_at,
        );
        assert_eq!(field_values(&indexed), scalar);
    }
}
