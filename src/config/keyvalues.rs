//! Reader for the brace-delimited key/value text format used by the levels file.
//!
//! ```text
//! // comment
//! Levels
//! {
//!     Flags
//!     {
//!         "kick"    "c"
//!     }
//! }
//! ```
//!
//! Tokens are quoted strings (with `\"`, `\\`, `\n`, `\t` escapes) or bare
//! words. A token followed by `{` opens a section; two tokens form a pair.

use std::iter::Peekable;
use std::str::Chars;

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    EnterSection { name: String, line: usize },
    KeyValue { key: String, value: String, line: usize },
    LeaveSection { line: usize },
}

#[derive(Debug, PartialEq, Eq)]
enum Token {
    Text(String),
    Open,
    Close,
}

struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
    line: usize,
}

impl<'a> Lexer<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            chars: text.chars().peekable(),
            line: 1,
        }
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.chars.next()?;
        if ch == '\n' {
            self.line += 1;
        }
        Some(ch)
    }

    /// Skips whitespace and comments. Returns an error for an unterminated
    /// block comment.
    fn skip_trivia(&mut self) -> Result<()> {
        loop {
            match self.chars.peek() {
                Some(ch) if ch.is_whitespace() => {
                    self.bump();
                }
                Some('/') => {
                    let mut ahead = self.chars.clone();
                    ahead.next();
                    match ahead.peek() {
                        Some('/') => {
                            while let Some(ch) = self.bump() {
                                if ch == '\n' {
                                    break;
                                }
                            }
                        }
                        Some('*') => {
                            let start = self.line;
                            self.bump();
                            self.bump();
                            let mut closed = false;
                            while let Some(ch) = self.bump() {
                                if ch == '*' && self.chars.peek() == Some(&'/') {
                                    self.bump();
                                    closed = true;
                                    break;
                                }
                            }
                            if !closed {
                                return Err(Error::parse(start, "unterminated comment"));
                            }
                        }
                        _ => return Ok(()),
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn next_token(&mut self) -> Result<Option<(Token, usize)>> {
        self.skip_trivia()?;
        let line = self.line;
        let Some(&ch) = self.chars.peek() else {
            return Ok(None);
        };

        let token = match ch {
            '{' => {
                self.bump();
                Token::Open
            }
            '}' => {
                self.bump();
                Token::Close
            }
            '"' => {
                self.bump();
                Token::Text(self.quoted(line)?)
            }
            _ => Token::Text(self.bare()),
        };
        Ok(Some((token, line)))
    }

    fn quoted(&mut self, start: usize) -> Result<String> {
        let mut value = String::new();
        loop {
            match self.bump() {
                Some('"') => return Ok(value),
                Some('\\') => match self.bump() {
                    Some('n') => value.push('\n'),
                    Some('t') => value.push('\t'),
                    Some(other) => value.push(other),
                    None => break,
                },
                Some('\n') => {
                    return Err(Error::parse(start, "newline inside quoted string"));
                }
                Some(ch) => value.push(ch),
                None => break,
            }
        }
        Err(Error::parse(start, "unterminated string"))
    }

    fn bare(&mut self) -> String {
        let mut value = String::new();
        while let Some(&ch) = self.chars.peek() {
            if ch.is_whitespace() || matches!(ch, '{' | '}' | '"') {
                break;
            }
            if ch == '/' {
                let mut ahead = self.chars.clone();
                ahead.next();
                if matches!(ahead.peek(), Some('/') | Some('*')) {
                    break;
                }
            }
            value.push(ch);
            self.bump();
        }
        value
    }
}

/// Parses `text` into a flat list of section and pair events.
pub fn parse(text: &str) -> Result<Vec<Event>> {
    let mut lexer = Lexer::new(text);
    let mut events = Vec::new();
    let mut depth = 0usize;
    let mut pending: Option<(String, usize)> = None;

    while let Some((token, line)) = lexer.next_token()? {
        match (token, pending.take()) {
            (Token::Text(value), Some((key, key_line))) => {
                events.push(Event::KeyValue {
                    key,
                    value,
                    line: key_line,
                });
            }
            (Token::Text(key), None) => pending = Some((key, line)),
            (Token::Open, Some((name, name_line))) => {
                depth += 1;
                events.push(Event::EnterSection {
                    name,
                    line: name_line,
                });
            }
            (Token::Open, None) => {
                return Err(Error::parse(line, "section opened without a name"));
            }
            (Token::Close, Some((key, key_line))) => {
                return Err(Error::parse(key_line, format!("key \"{key}\" has no value")));
            }
            (Token::Close, None) => {
                if depth == 0 {
                    return Err(Error::parse(line, "unbalanced '}'"));
                }
                depth -= 1;
                events.push(Event::LeaveSection { line });
            }
        }
    }

    if let Some((key, line)) = pending {
        return Err(Error::parse(line, format!("key \"{key}\" has no value")));
    }
    if depth > 0 {
        return Err(Error::parse(lexer.line, "unexpected end of file inside a section"));
    }
    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line_of(err: Error) -> usize {
        match err {
            Error::Parse { line, .. } => line,
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_parse_sections_and_pairs() {
        let text = "Levels\n{\n  Flags\n  {\n    \"kick\" \"c\" // trailing\n    root z\n  }\n}\n";
        let events = parse(text).unwrap();
        assert_eq!(
            events,
            vec![
                Event::EnterSection { name: "Levels".into(), line: 1 },
                Event::EnterSection { name: "Flags".into(), line: 3 },
                Event::KeyValue { key: "kick".into(), value: "c".into(), line: 5 },
                Event::KeyValue { key: "root".into(), value: "z".into(), line: 6 },
                Event::LeaveSection { line: 7 },
                Event::LeaveSection { line: 8 },
            ]
        );
    }

    #[test]
    fn test_comments_and_escapes() {
        let text = "/* block\ncomment */ \"a\\\"b\" \"x\\ty\"";
        let events = parse(text).unwrap();
        assert_eq!(
            events,
            vec![Event::KeyValue { key: "a\"b".into(), value: "x\ty".into(), line: 2 }]
        );
    }

    #[test]
    fn test_syntax_errors_report_line() {
        assert_eq!(line_of(parse("Levels\n{\n").unwrap_err()), 3);
        assert_eq!(line_of(parse("a b\n}\n").unwrap_err()), 2);
        assert_eq!(line_of(parse("\n\"open").unwrap_err()), 2);
        assert_eq!(line_of(parse("key\n}").unwrap_err()), 1);
        assert_eq!(line_of(parse("{").unwrap_err()), 1);
        assert_eq!(line_of(parse("/* never closed").unwrap_err()), 1);
    }
}
