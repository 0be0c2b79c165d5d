use crate::scan;
use psl_formats::{CullMode, ShaderStage};
use psl_text::{Line, MemoryLogger, Severity, Token};
use std::path::Path;

fn scan_tokens(source: &str) -> Vec<Token> {
    let logger = MemoryLogger::new();
    let tokens = scan(source, Path::new("test.pset"), &logger);
    assert!(!logger.has_errors(), "unexpected scan errors: {:?}", logger.events());
    tokens.into_iter().map(|t| t.token).collect()
}

#[test]
fn scan_punctuation() {
    assert_eq!(
        scan_tokens("[ ] { } ( ) : ; ,"),
        vec![
            Token::LeftSquareBracket,
            Token::RightSquareBracket,
            Token::LeftBrace,
            Token::RightBrace,
            Token::LeftParen,
            Token::RightParen,
            Token::Colon,
            Token::Semicolon,
            Token::Comma,
        ]
    );
}

#[test]
fn scan_keywords_and_identifiers() {
    assert_eq!(
        scan_tokens("pipelineSet myThing cull back vertex"),
        vec![
            Token::PipelineSet,
            Token::Identifier("myThing".to_string()),
            Token::CullKey,
            Token::CullModeValue(CullMode::Back),
            Token::Stage(ShaderStage::Vertex),
        ]
    );
}

#[test]
fn identifiers_may_contain_dots() {
    assert_eq!(
        scan_tokens("queue.opaque"),
        vec![Token::Identifier("queue.opaque".to_string())]
    );
}

#[test]
fn scan_strings() {
    assert_eq!(
        scan_tokens("\"hello world\" \"\""),
        vec![
            Token::Text("hello world".to_string()),
            Token::Text(String::new()),
        ]
    );
}

#[test]
fn scan_numbers() {
    assert_eq!(
        scan_tokens("4 1.5 .25 0.125"),
        vec![
            Token::Number(4.0),
            Token::Number(1.5),
            Token::Number(0.25),
            Token::Number(0.125),
        ]
    );
}

#[test]
fn number_with_two_points_is_an_error() {
    let logger = MemoryLogger::new();
    let tokens = scan("1.2.5", Path::new("test.pset"), &logger);
    assert!(logger.has_errors());
    // The truncated prefix is kept
    assert_eq!(tokens[0].token, Token::Number(1.2));
}

#[test]
fn comments_are_filtered_but_track_lines() {
    let logger = MemoryLogger::new();
    let source = "// line comment\n/* block\ncomment */ pass";
    let tokens = scan(source, Path::new("test.pset"), &logger);
    assert!(!logger.has_errors());
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].token, Token::Pass);
    assert_eq!(tokens[0].line, Line(3));
}

#[test]
fn unterminated_block_comment_is_an_error() {
    let logger = MemoryLogger::new();
    let tokens = scan("/* never closed", Path::new("test.pset"), &logger);
    assert!(tokens.is_empty());
    let events = logger.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].severity, Severity::Error);
}

#[test]
fn shader_code_counts_braces() {
    let tokens = scan_tokens("shaderGlsl { void main() { int x = 0; } }");
    assert_eq!(
        tokens,
        vec![Token::ShaderGlsl(
            " void main() { int x = 0; } ".to_string()
        )]
    );
}

#[test]
fn unterminated_shader_code_is_an_error() {
    let logger = MemoryLogger::new();
    let tokens = scan("shaderHlsl { never closed", Path::new("test.pset"), &logger);
    assert!(logger.has_errors());
    assert_eq!(tokens.len(), 1);
}

#[test]
fn token_positions() {
    let logger = MemoryLogger::new();
    let tokens = scan("pass\n  pass", Path::new("test.pset"), &logger);
    assert_eq!(tokens[0].line, Line(1));
    assert_eq!(tokens[1].line, Line(2));
    assert_eq!(tokens[1].column.0, 3);
}
