//! Recursive-descent parser turning one RULES line into a [`RuleAst`].
//!
//! The AST keeps names unresolved and qualifiers relative; the rule compiler
//! resolves names against the legend and expands directions.

use puzzlang_types::{DirectionMask, MAX_SFX, RuleCommand, RuleFlags};

use crate::rule_lexer::{Token, lex_rule};
use crate::script_lexer::{Located, SourceLine};

#[derive(Debug, thiserror::Error)]
pub enum RuleParseError {
    #[error("line {line}: {msg}")]
    Parse { line: usize, msg: String },
    #[error("line {line}: '{keyword}' is not supported")]
    Unsupported { line: usize, keyword: String },
}

/// Movement qualifier as written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Qualifier {
    Up,
    Down,
    Left,
    Right,
    /// `>`
    Forward,
    /// `<`
    Back,
    /// `^`
    Ccw,
    /// `v`
    Cw,
    Moving,
    Stationary,
    Action,
    RandomDir,
    Perpendicular,
    Parallel,
}

impl Qualifier {
    fn from_word(word: &str) -> Option<Self> {
        let q = match word {
            "up" => Self::Up,
            "down" => Self::Down,
            "left" => Self::Left,
            "right" => Self::Right,
            "v" => Self::Cw,
            "moving" => Self::Moving,
            "stationary" => Self::Stationary,
            "action" => Self::Action,
            "randomdir" => Self::RandomDir,
            "perpendicular" => Self::Perpendicular,
            "parallel" => Self::Parallel,
            _ => return None,
        };
        Some(q)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AstTerm {
    pub name: String,
    pub negated: bool,
    pub random: bool,
    pub qualifier: Option<Qualifier>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AstCell {
    Cell(Vec<AstTerm>),
    Ellipsis,
}

pub type AstRow = Vec<AstCell>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleAst {
    pub line: usize,
    /// Directions named in the prefix; `None` means all four.
    pub directions: Option<DirectionMask>,
    pub flags: RuleFlags,
    /// Started with `+`: belongs to the previous rule's group.
    pub joined: bool,
    pub lhs: Vec<AstRow>,
    pub rhs: Vec<AstRow>,
    pub commands: Vec<RuleCommand>,
}

struct Parser {
    tokens: Vec<Located<Token>>,
    pos: usize,
    line: usize,
}

impl Parser {
    fn new(tokens: Vec<Located<Token>>, line: usize) -> Self {
        Self { tokens, pos: 0, line }
    }

    fn peek(&self) -> &Token {
        self.peek_at(0)
    }

    fn peek_at(&self, offset: usize) -> &Token {
        self.tokens
            .get(self.pos + offset)
            .map(|t| &t.value)
            .unwrap_or(&Token::Eof)
    }

    fn advance(&mut self) -> Token {
        let tok = self.peek().clone();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    fn expect(&mut self, expected: &Token) -> Result<(), RuleParseError> {
        let tok = self.advance();
        if &tok == expected {
            Ok(())
        } else {
            Err(self.err(&format!("expected {expected}, found {tok}")))
        }
    }

    fn err(&self, msg: &str) -> RuleParseError {
        RuleParseError::Parse {
            line: self.line,
            msg: msg.into(),
        }
    }

    fn parse(mut self) -> Result<RuleAst, RuleParseError> {
        let mut rule = RuleAst {
            line: self.line,
            directions: None,
            flags: RuleFlags::empty(),
            joined: false,
            lhs: Vec::new(),
            rhs: Vec::new(),
            commands: Vec::new(),
        };

        self.parse_prefixes(&mut rule)?;
        rule.lhs = self.parse_side()?;
        if rule.lhs.is_empty() {
            return Err(self.err("rule has no left-hand side"));
        }
        self.expect(&Token::Arrow)?;
        rule.rhs = self.parse_side()?;
        rule.commands = self.parse_commands()?;
        if rule.rhs.is_empty() && rule.commands.is_empty() {
            return Err(self.err("rule has neither a right-hand side nor commands"));
        }
        Ok(rule)
    }

    fn parse_prefixes(&mut self, rule: &mut RuleAst) -> Result<(), RuleParseError> {
        loop {
            match self.peek().clone() {
                Token::LBracket => return Ok(()),
                Token::Plus => {
                    self.advance();
                    rule.joined = true;
                }
                Token::Word(w) => {
                    self.advance();
                    if let Some(mask) = DirectionMask::from_keyword(&w) {
                        *rule.directions.get_or_insert(DirectionMask::empty()) |= mask;
                        continue;
                    }
                    match w.as_str() {
                        "late" => rule.flags |= RuleFlags::LATE,
                        "rigid" => rule.flags |= RuleFlags::RIGID,
                        "random" => rule.flags |= RuleFlags::RANDOM,
                        "startloop" | "endloop" => {
                            return Err(RuleParseError::Unsupported {
                                line: self.line,
                                keyword: w,
                            });
                        }
                        _ => return Err(self.err(&format!("unknown rule prefix '{w}'"))),
                    }
                }
                other => return Err(self.err(&format!("expected '[', found {other}"))),
            }
        }
    }

    fn parse_side(&mut self) -> Result<Vec<AstRow>, RuleParseError> {
        let mut rows = Vec::new();
        while self.peek() == &Token::LBracket {
            rows.push(self.parse_row()?);
        }
        Ok(rows)
    }

    fn parse_row(&mut self) -> Result<AstRow, RuleParseError> {
        self.expect(&Token::LBracket)?;
        let mut cells = vec![self.parse_cell()?];
        loop {
            match self.advance() {
                Token::Bar => cells.push(self.parse_cell()?),
                Token::RBracket => return Ok(cells),
                other => return Err(self.err(&format!("expected '|' or ']', found {other}"))),
            }
        }
    }

    fn at_cell_end(&self, offset: usize) -> bool {
        matches!(
            self.peek_at(offset),
            Token::Bar | Token::RBracket | Token::Eof | Token::Ellipsis
        )
    }

    fn parse_cell(&mut self) -> Result<AstCell, RuleParseError> {
        if self.peek() == &Token::Ellipsis {
            self.advance();
            if !matches!(self.peek(), Token::Bar | Token::RBracket) {
                return Err(self.err("'...' must fill a whole cell"));
            }
            return Ok(AstCell::Ellipsis);
        }
        let mut terms = Vec::new();
        while !self.at_cell_end(0) {
            terms.push(self.parse_term()?);
        }
        if self.peek() == &Token::Ellipsis {
            return Err(self.err("'...' must fill a whole cell"));
        }
        Ok(AstCell::Cell(terms))
    }

    fn set_qualifier(&self, term: &mut AstTerm, q: Qualifier) -> Result<(), RuleParseError> {
        if term.qualifier.replace(q).is_some() {
            return Err(self.err("a term takes at most one movement qualifier"));
        }
        Ok(())
    }

    fn parse_term(&mut self) -> Result<AstTerm, RuleParseError> {
        let mut term = AstTerm {
            name: String::new(),
            negated: false,
            random: false,
            qualifier: None,
        };
        loop {
            let modifier_follows = !self.at_cell_end(1);
            match self.advance() {
                Token::Forward => self.set_qualifier(&mut term, Qualifier::Forward)?,
                Token::Back => self.set_qualifier(&mut term, Qualifier::Back)?,
                Token::Caret => self.set_qualifier(&mut term, Qualifier::Ccw)?,
                Token::Word(w) if modifier_follows && w == "no" && !term.negated => term.negated = true,
                Token::Word(w) if modifier_follows && w == "random" && !term.random => term.random = true,
                Token::Word(w) if modifier_follows && Qualifier::from_word(&w).is_some() => {
                    if let Some(q) = Qualifier::from_word(&w) {
                        self.set_qualifier(&mut term, q)?;
                    }
                }
                Token::Word(w) => {
                    term.name = w;
                    return Ok(term);
                }
                other => return Err(self.err(&format!("expected an object name, found {other}"))),
            }
        }
    }

    fn parse_commands(&mut self) -> Result<Vec<RuleCommand>, RuleParseError> {
        let mut commands = Vec::new();
        loop {
            let command = match self.advance() {
                Token::Eof => return Ok(commands),
                Token::Message(text) => RuleCommand::Message(text),
                Token::Word(w) => match w.as_str() {
                    "cancel" => RuleCommand::Cancel,
                    "win" => RuleCommand::Win,
                    "restart" => RuleCommand::Restart,
                    "again" => RuleCommand::Again,
                    "checkpoint" => RuleCommand::Checkpoint,
                    sfx => match sfx.strip_prefix("sfx").and_then(|n| n.parse::<u8>().ok()) {
                        Some(n) if n <= MAX_SFX => RuleCommand::Sfx(n),
                        _ => return Err(self.err(&format!("unknown command '{w}'"))),
                    },
                },
                other => return Err(self.err(&format!("unexpected {other} after the right-hand side"))),
            };
            if !commands.contains(&command) {
                commands.push(command);
            }
        }
    }
}

/// Parse one rule line.
pub fn parse_rule(line: &SourceLine) -> Result<RuleAst, RuleParseError> {
    let tokens = lex_rule(&line.value, line.line);
    Parser::new(tokens, line.line).parse()
}
