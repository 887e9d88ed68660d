//! Lexer and recursive-descent parser for Relay-generated Flow type files.
//!
//! The input files contain more than type declarations (docblock comments,
//! relay hashes, the request node literal). The parser only cares about
//! `export type Name = <type>;` statements; every other top-level token is
//! skipped without error. Inside a type expression, any unrecognized form
//! is a parse error.

use super::ast::{
    FlowProgram, FlowProperty, FlowType, ParseDiagnostic, ParseOutcome, TypeAlias,
};

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Ident(String),
    Str(String),
    Num(f64),
    LBraceBar,
    RBraceBar,
    LBrace,
    RBrace,
    LAngle,
    RAngle,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,
    Semi,
    Colon,
    Eq,
    Pipe,
    Amp,
    Question,
    Plus,
    Unknown(char),
}

impl Token {
    fn describe(&self) -> String {
        match self {
            Token::Ident(name) => format!("identifier `{name}`"),
            Token::Str(value) => format!("string literal \"{value}\""),
            Token::Num(value) => format!("number literal {value}"),
            Token::LBraceBar => "`{|`".to_string(),
            Token::RBraceBar => "`|}`".to_string(),
            Token::LBrace => "`{`".to_string(),
            Token::RBrace => "`}`".to_string(),
            Token::LAngle => "`<`".to_string(),
            Token::RAngle => "`>`".to_string(),
            Token::LParen => "`(`".to_string(),
            Token::RParen => "`)`".to_string(),
            Token::LBracket => "`[`".to_string(),
            Token::RBracket => "`]`".to_string(),
            Token::Comma => "`,`".to_string(),
            Token::Semi => "`;`".to_string(),
            Token::Colon => "`:`".to_string(),
            Token::Eq => "`=`".to_string(),
            Token::Pipe => "`|`".to_string(),
            Token::Amp => "`&`".to_string(),
            Token::Question => "`?`".to_string(),
            Token::Plus => "`+`".to_string(),
            Token::Unknown(c) => format!("`{c}`"),
        }
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '$'
}

fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '$'
}

/// Tokenize the whole input. Comments and whitespace are dropped;
/// characters with no token form become `Token::Unknown` so the statement
/// skipper can step over them.
fn tokenize(content: &str) -> Vec<(Token, usize)> {
    let mut tokens = Vec::new();
    let mut chars = content.chars().peekable();
    let mut line = 1usize;

    while let Some(c) = chars.next() {
        match c {
            '\n' => line += 1,
            c if c.is_whitespace() => {}
            '/' => match chars.peek() {
                Some('/') => {
                    while let Some(&next) = chars.peek() {
                        if next == '\n' {
                            break;
                        }
                        chars.next();
                    }
                }
                Some('*') => {
                    chars.next();
                    let mut prev = ' ';
                    for next in chars.by_ref() {
                        if next == '\n' {
                            line += 1;
                        }
                        if prev == '*' && next == '/' {
                            break;
                        }
                        prev = next;
                    }
                }
                _ => tokens.push((Token::Unknown('/'), line)),
            },
            '"' | '\'' => {
                let quote = c;
                let mut value = String::new();
                while let Some(next) = chars.next() {
                    match next {
                        '\\' => {
                            if let Some(escaped) = chars.next() {
                                value.push(escaped);
                            }
                        }
                        '\n' => {
                            line += 1;
                            value.push('\n');
                        }
                        next if next == quote => break,
                        next => value.push(next),
                    }
                }
                tokens.push((Token::Str(value), line));
            }
            '{' => {
                if chars.peek() == Some(&'|') {
                    chars.next();
                    tokens.push((Token::LBraceBar, line));
                } else {
                    tokens.push((Token::LBrace, line));
                }
            }
            '|' => {
                if chars.peek() == Some(&'}') {
                    chars.next();
                    tokens.push((Token::RBraceBar, line));
                } else {
                    tokens.push((Token::Pipe, line));
                }
            }
            '}' => tokens.push((Token::RBrace, line)),
            '<' => tokens.push((Token::LAngle, line)),
            '>' => tokens.push((Token::RAngle, line)),
            '(' => tokens.push((Token::LParen, line)),
            ')' => tokens.push((Token::RParen, line)),
            '[' => tokens.push((Token::LBracket, line)),
            ']' => tokens.push((Token::RBracket, line)),
            ',' => tokens.push((Token::Comma, line)),
            ';' => tokens.push((Token::Semi, line)),
            ':' => tokens.push((Token::Colon, line)),
            '=' => tokens.push((Token::Eq, line)),
            '&' => tokens.push((Token::Amp, line)),
            '?' => tokens.push((Token::Question, line)),
            '+' => tokens.push((Token::Plus, line)),
            c if c.is_ascii_digit() => {
                let mut text = String::new();
                text.push(c);
                while let Some(&next) = chars.peek() {
                    if next.is_ascii_digit() || next == '.' || next == 'e' || next == 'E' {
                        text.push(next);
                        chars.next();
                    } else {
                        break;
                    }
                }
                let value = text.parse::<f64>().unwrap_or(0.0);
                tokens.push((Token::Num(value), line));
            }
            c if is_ident_start(c) => {
                let mut name = String::new();
                name.push(c);
                while let Some(&next) = chars.peek() {
                    if is_ident_continue(next) {
                        name.push(next);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push((Token::Ident(name), line));
            }
            other => tokens.push((Token::Unknown(other), line)),
        }
    }

    tokens
}

struct Parser {
    tokens: Vec<(Token, usize)>,
    pos: usize,
    errors: Vec<ParseDiagnostic>,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(token, _)| token)
    }

    fn current_line(&self) -> usize {
        self.tokens
            .get(self.pos)
            .or_else(|| self.tokens.last())
            .map_or(1, |(_, line)| *line)
    }

    fn bump(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).map(|(token, _)| token.clone());
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, expected: &Token) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn error_here(&mut self, message: impl Into<String>) {
        let line = self.current_line();
        self.errors.push(ParseDiagnostic {
            line,
            message: message.into(),
        });
    }

    fn expect(&mut self, expected: &Token) -> bool {
        if self.eat(expected) {
            return true;
        }
        let found = self
            .peek()
            .map_or("end of input".to_string(), Token::describe);
        self.error_here(format!("expected {}, found {found}", expected.describe()));
        false
    }

    /// Skip forward to a statement boundary after a failed alias parse.
    fn recover_to_statement(&mut self) {
        while let Some(token) = self.peek() {
            match token {
                Token::Semi => {
                    self.pos += 1;
                    return;
                }
                Token::Ident(name) if name == "export" => return,
                _ => {
                    self.pos += 1;
                }
            }
        }
    }

    fn parse_program(&mut self) -> FlowProgram {
        let mut aliases = Vec::new();
        while self.pos < self.tokens.len() {
            if self.at_export_type() {
                let before = self.errors.len();
                match self.parse_type_alias() {
                    Some(alias) if self.errors.len() == before => aliases.push(alias),
                    _ => self.recover_to_statement(),
                }
            } else {
                self.pos += 1;
            }
        }
        FlowProgram { aliases }
    }

    fn at_export_type(&self) -> bool {
        match (
            self.tokens.get(self.pos).map(|(token, _)| token),
            self.tokens.get(self.pos + 1).map(|(token, _)| token),
        ) {
            (Some(Token::Ident(first)), Some(Token::Ident(second))) => {
                first == "export" && second == "type"
            }
            _ => false,
        }
    }

    fn parse_type_alias(&mut self) -> Option<TypeAlias> {
        // `export` `type`
        self.pos += 2;
        let name = match self.bump() {
            Some(Token::Ident(name)) => name,
            other => {
                let found = other.map_or("end of input".to_string(), |token| token.describe());
                self.error_here(format!("expected type alias name, found {found}"));
                return None;
            }
        };
        if !self.expect(&Token::Eq) {
            return None;
        }
        let right = self.parse_type()?;
        self.expect(&Token::Semi);
        Some(TypeAlias { name, right })
    }

    /// Full type expression: a `|`-separated union of intersections.
    fn parse_type(&mut self) -> Option<FlowType> {
        // Leading `|` before the first union member is allowed.
        self.eat(&Token::Pipe);
        let first = self.parse_intersection()?;
        if self.peek() != Some(&Token::Pipe) {
            return Some(first);
        }
        let mut members = vec![first];
        while self.eat(&Token::Pipe) {
            members.push(self.parse_intersection()?);
        }
        Some(FlowType::Union(members))
    }

    fn parse_intersection(&mut self) -> Option<FlowType> {
        let first = self.parse_postfix()?;
        if self.peek() != Some(&Token::Amp) {
            return Some(first);
        }
        let mut members = vec![first];
        while self.eat(&Token::Amp) {
            members.push(self.parse_postfix()?);
        }
        Some(FlowType::Intersection(members))
    }

    fn parse_postfix(&mut self) -> Option<FlowType> {
        let mut ty = self.parse_primary()?;
        while self.peek() == Some(&Token::LBracket) {
            self.pos += 1;
            if !self.expect(&Token::RBracket) {
                return None;
            }
            ty = FlowType::Array(Box::new(ty));
        }
        Some(ty)
    }

    fn parse_primary(&mut self) -> Option<FlowType> {
        match self.bump() {
            Some(Token::Question) => {
                let inner = self.parse_postfix()?;
                Some(FlowType::Nullable(Box::new(inner)))
            }
            Some(Token::LParen) => {
                let inner = self.parse_type()?;
                if !self.expect(&Token::RParen) {
                    return None;
                }
                Some(inner)
            }
            Some(Token::LBraceBar) => self.parse_object(&Token::RBraceBar),
            Some(Token::LBrace) => self.parse_object(&Token::RBrace),
            Some(Token::Str(value)) => Some(FlowType::StringLiteral { value }),
            Some(Token::Num(value)) => Some(FlowType::NumberLiteral { value }),
            Some(Token::Ident(name)) => self.parse_named(name),
            other => {
                let found = other.map_or("end of input".to_string(), |token| token.describe());
                self.error_here(format!("expected a type, found {found}"));
                None
            }
        }
    }

    fn parse_named(&mut self, name: String) -> Option<FlowType> {
        match name.as_str() {
            "string" => return Some(FlowType::String),
            "number" => return Some(FlowType::Number),
            "boolean" => return Some(FlowType::Boolean),
            "true" => return Some(FlowType::BooleanLiteral { value: true }),
            "false" => return Some(FlowType::BooleanLiteral { value: false }),
            _ => {}
        }
        let mut type_args = Vec::new();
        if self.eat(&Token::LAngle) {
            loop {
                type_args.push(self.parse_type()?);
                if !self.eat(&Token::Comma) {
                    break;
                }
            }
            if !self.expect(&Token::RAngle) {
                return None;
            }
        }
        Some(FlowType::Generic { name, type_args })
    }

    fn parse_object(&mut self, close: &Token) -> Option<FlowType> {
        let mut properties = Vec::new();
        loop {
            if self.eat(close) {
                return Some(FlowType::Object { properties });
            }
            // `+` variance sigil has no bearing on the output.
            self.eat(&Token::Plus);
            let key = match self.bump() {
                Some(Token::Ident(name)) => name,
                Some(Token::Str(value)) => value,
                other => {
                    let found =
                        other.map_or("end of input".to_string(), |token| token.describe());
                    self.error_here(format!("expected a property key, found {found}"));
                    return None;
                }
            };
            let optional = self.eat(&Token::Question);
            if !self.expect(&Token::Colon) {
                return None;
            }
            let value = self.parse_type()?;
            properties.push(FlowProperty {
                key,
                value,
                optional,
            });
            if !self.eat(&Token::Comma) {
                self.eat(&Token::Semi);
            }
        }
    }
}

/// Parse one Relay-generated input file into its exported type aliases.
pub fn parse(content: &str) -> ParseOutcome {
    let mut parser = Parser {
        tokens: tokenize(content),
        pos: 0,
        errors: Vec::new(),
    };
    let program = parser.parse_program();
    ParseOutcome {
        program,
        errors: parser.errors,
    }
}
