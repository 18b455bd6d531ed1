//! Tokenizer for single RULES lines.

use std::fmt;

use crate::script_lexer::Located;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    LBracket,
    RBracket,
    Bar,
    Arrow,
    Ellipsis,
    Plus,
    /// `>`
    Forward,
    /// `<`
    Back,
    /// `^`
    Caret,
    /// Any other run of characters, lower-cased.
    Word(String),
    /// `message` and the rest of its line, original case kept.
    Message(String),
    Eof,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::LBracket => write!(f, "'['"),
            Token::RBracket => write!(f, "']'"),
            Token::Bar => write!(f, "'|'"),
            Token::Arrow => write!(f, "'->'"),
            Token::Ellipsis => write!(f, "'...'"),
            Token::Plus => write!(f, "'+'"),
            Token::Forward => write!(f, "'>'"),
            Token::Back => write!(f, "'<'"),
            Token::Caret => write!(f, "'^'"),
            Token::Word(w) => write!(f, "'{w}'"),
            Token::Message(_) => write!(f, "message"),
            Token::Eof => write!(f, "end of line"),
        }
    }
}

fn is_word_char(c: char) -> bool {
    !c.is_whitespace() && !matches!(c, '[' | ']' | '|' | '+' | '>' | '<' | '^')
}

/// Split one rule line into tokens. Every token carries `line`.
pub fn lex_rule(text: &str, line: usize) -> Vec<Located<Token>> {
    let mut tokens = Vec::new();
    let mut depth = 0usize;
    let mut rest = text;

    let at = |value| Located { value, line };

    while let Some(ch) = rest.chars().next() {
        if ch.is_whitespace() {
            rest = &rest[ch.len_utf8()..];
            continue;
        }
        if rest.starts_with("->") {
            tokens.push(at(Token::Arrow));
            rest = &rest[2..];
            continue;
        }
        let single = match ch {
            '[' => {
                depth += 1;
                Some(Token::LBracket)
            }
            ']' => {
                depth = depth.saturating_sub(1);
                Some(Token::RBracket)
            }
            '|' => Some(Token::Bar),
            '+' => Some(Token::Plus),
            '>' => Some(Token::Forward),
            '<' => Some(Token::Back),
            '^' => Some(Token::Caret),
            _ => None,
        };
        if let Some(tok) = single {
            tokens.push(at(tok));
            rest = &rest[1..];
            continue;
        }

        let end = rest
            .char_indices()
            .find(|&(i, c)| !is_word_char(c) || (c == '-' && rest[i..].starts_with("->")))
            .map_or(rest.len(), |(i, _)| i);
        let word = rest[..end].to_lowercase();
        rest = &rest[end..];

        if word == "message" && depth == 0 {
            tokens.push(at(Token::Message(rest.trim().to_string())));
            break;
        }
        if word.chars().all(|c| c == '.') && word.len() == 3 {
            tokens.push(at(Token::Ellipsis));
        } else {
            tokens.push(at(Token::Word(word)));
        }
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(text: &str) -> Vec<Token> {
        lex_rule(text, 1).into_iter().map(|t| t.value).collect()
    }

    fn word(w: &str) -> Token {
        Token::Word(w.to_string())
    }

    #[test]
    fn push_rule() {
        assert_eq!(
            kinds("[ > Player | Crate ] -> [ > Player | > Crate ]"),
            vec![
                Token::LBracket,
                Token::Forward,
                word("player"),
                Token::Bar,
                word("crate"),
                Token::RBracket,
                Token::Arrow,
                Token::LBracket,
                Token::Forward,
                word("player"),
                Token::Bar,
                Token::Forward,
                word("crate"),
                Token::RBracket,
            ]
        );
    }

    #[test]
    fn tight_spacing_and_ellipsis() {
        assert_eq!(
            kinds("+ late [a|...|b]->[]"),
            vec![
                Token::Plus,
                word("late"),
                Token::LBracket,
                word("a"),
                Token::Bar,
                Token::Ellipsis,
                Token::Bar,
                word("b"),
                Token::RBracket,
                Token::Arrow,
                Token::LBracket,
                Token::RBracket,
            ]
        );
    }

    #[test]
    fn message_keeps_case() {
        let toks = kinds("[ Player Target ] -> [ Player Target ] message Well Done!");
        assert_eq!(toks.last(), Some(&Token::Message("Well Done!".to_string())));
    }

    #[test]
    fn message_inside_brackets_is_a_name() {
        let toks = kinds("[ message ] -> [ ]");
        assert_eq!(toks[1], word("message"));
    }
}
