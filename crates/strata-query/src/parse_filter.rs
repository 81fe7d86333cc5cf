use std::iter::Peekable;
use std::str::CharIndices;

use bson::Bson;
use regex::Regex;

use crate::expression::{Condition, Expression, Filtering};
use crate::operator::Operator;
use crate::path::FieldPath;

/// Parse error for filter expressions.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterParseError(pub String);

impl std::fmt::Display for FilterParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "filter parse error: {}", self.0)
    }
}

impl std::error::Error for FilterParseError {}

fn error_at(pos: usize, msg: impl std::fmt::Display) -> FilterParseError {
    FilterParseError(format!("{msg} at position {pos}"))
}

/// Parse a filter expression into an Expression tree.
///
/// Grammar, loosest binding first:
/// - `a or b`
/// - `a and b`
/// - `not a`
/// - `( expr )` or a comparison `field <op> literal`
///
/// Operators have a symbolic and a keyword spelling (`==`/`eq`, `>=`/`ge`,
/// `~`/`match`, ...). Literals are quoted strings, numbers, `true`, `false`,
/// `null` and `[...]` lists for `in`. Blank input is absent.
pub fn parse_filtering(input: &str) -> Result<Option<Filtering>, FilterParseError> {
    if input.trim().is_empty() {
        return Ok(None);
    }

    let tokens = tokenize(input)?;
    let mut parser = Parser {
        tokens,
        pos: 0,
        end: input.len(),
        depth: 0,
    };
    let root = parser.parse_or()?;

    if let Some(t) = parser.peek() {
        return match t.token {
            Token::RParen => Err(error_at(t.pos, "unbalanced parentheses: unexpected ')'")),
            _ => Err(error_at(t.pos, format!("unexpected {}", t.token.describe()))),
        };
    }

    Ok(Some(Filtering { root }))
}

// ── Tokenizer ───────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
enum Token {
    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,
    And,
    Or,
    Not,
    Op(Operator),
    Ident(String),
    Literal(Bson),
}

impl Token {
    fn describe(&self) -> String {
        match self {
            Token::LParen => "'('".into(),
            Token::RParen => "')'".into(),
            Token::LBracket => "'['".into(),
            Token::RBracket => "']'".into(),
            Token::Comma => "','".into(),
            Token::And => "'and'".into(),
            Token::Or => "'or'".into(),
            Token::Not => "'not'".into(),
            Token::Op(op) => format!("operator '{op}'"),
            Token::Ident(name) => format!("identifier '{name}'"),
            Token::Literal(v) => format!("literal {v}"),
        }
    }
}

#[derive(Debug, Clone)]
struct Spanned {
    token: Token,
    pos: usize,
}

fn tokenize(input: &str) -> Result<Vec<Spanned>, FilterParseError> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some(&(pos, ch)) = chars.peek() {
        if ch.is_whitespace() {
            chars.next();
            continue;
        }

        let token = match ch {
            '(' | ')' | '[' | ']' | ',' | '~' => {
                chars.next();
                match ch {
                    '(' => Token::LParen,
                    ')' => Token::RParen,
                    '[' => Token::LBracket,
                    ']' => Token::RBracket,
                    ',' => Token::Comma,
                    _ => Token::Op(Operator::Match),
                }
            }
            '=' | '!' | '>' | '<' | ':' => lex_symbol(&mut chars, pos, ch)?,
            '\'' | '"' => Token::Literal(Bson::String(lex_string(&mut chars, pos, ch)?)),
            c if c.is_ascii_digit() || c == '-' => Token::Literal(lex_number(input, &mut chars, pos)?),
            c if c.is_alphabetic() || c == '_' => lex_word(input, &mut chars, pos),
            c => return Err(error_at(pos, format!("unexpected character '{c}'"))),
        };

        tokens.push(Spanned { token, pos });
    }

    Ok(tokens)
}

fn lex_symbol(
    chars: &mut Peekable<CharIndices<'_>>,
    pos: usize,
    first: char,
) -> Result<Token, FilterParseError> {
    chars.next();
    let next = chars.peek().map(|&(_, c)| c);

    let (op, consumed) = match (first, next) {
        ('=', Some('=')) => (Operator::Eq, true),
        ('!', Some('=')) => (Operator::Ne, true),
        ('!', Some('~')) => (Operator::NoMatch, true),
        ('>', Some('=')) => (Operator::Gte, true),
        ('<', Some('=')) => (Operator::Lte, true),
        (':', Some('=')) => (Operator::IEq, true),
        ('>', _) => (Operator::Gt, false),
        ('<', _) => (Operator::Lt, false),
        (c, _) => return Err(error_at(pos, format!("unknown operator '{c}'"))),
    };
    if consumed {
        chars.next();
    }

    Ok(Token::Op(op))
}

fn lex_string(
    chars: &mut Peekable<CharIndices<'_>>,
    pos: usize,
    quote: char,
) -> Result<String, FilterParseError> {
    chars.next();
    let mut out = String::new();

    loop {
        let Some((_, c)) = chars.next() else {
            return Err(error_at(pos, "unterminated string literal"));
        };
        match c {
            '\\' => {
                let Some((esc_pos, esc)) = chars.next() else {
                    return Err(error_at(pos, "unterminated string literal"));
                };
                match esc {
                    '\\' | '\'' | '"' => out.push(esc),
                    'n' => out.push('\n'),
                    't' => out.push('\t'),
                    other => return Err(error_at(esc_pos, format!("invalid escape '\\{other}'"))),
                }
            }
            c if c == quote => return Ok(out),
            c => out.push(c),
        }
    }
}

fn lex_number(
    input: &str,
    chars: &mut Peekable<CharIndices<'_>>,
    start: usize,
) -> Result<Bson, FilterParseError> {
    let mut end = start;
    let mut is_float = false;

    while let Some(&(i, c)) = chars.peek() {
        let accept = match c {
            '0'..='9' => true,
            '-' | '+' => i == start || matches!(input[..i].chars().last(), Some('e' | 'E')),
            '.' | 'e' | 'E' => {
                is_float = true;
                true
            }
            _ => false,
        };
        if !accept {
            break;
        }
        end = i + c.len_utf8();
        chars.next();
    }

    let text = &input[start..end];
    let malformed = || error_at(start, format!("malformed number literal '{text}'"));

    if is_float {
        text.parse::<f64>().map(Bson::Double).map_err(|_| malformed())
    } else {
        text.parse::<i64>().map(Bson::Int64).map_err(|_| malformed())
    }
}

fn lex_word(input: &str, chars: &mut Peekable<CharIndices<'_>>, start: usize) -> Token {
    let mut end = start;
    while let Some(&(i, c)) = chars.peek() {
        if c.is_alphanumeric() || c == '_' || c == FieldPath::SEPARATOR {
            end = i + c.len_utf8();
            chars.next();
        } else {
            break;
        }
    }

    let word = &input[start..end];
    match word.to_ascii_lowercase().as_str() {
        "and" => Token::And,
        "or" => Token::Or,
        "not" => Token::Not,
        "true" => Token::Literal(Bson::Boolean(true)),
        "false" => Token::Literal(Bson::Boolean(false)),
        "null" => Token::Literal(Bson::Null),
        _ => match Operator::from_keyword(word) {
            Some(op) => Token::Op(op),
            None => Token::Ident(word.to_string()),
        },
    }
}

// ── Parser ──────────────────────────────────────────────────────

/// Deepest allowed nesting of parentheses and `not`.
const MAX_DEPTH: usize = 64;

struct Parser {
    tokens: Vec<Spanned>,
    pos: usize,
    end: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Spanned> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Spanned> {
        let t = self.tokens.get(self.pos).cloned();
        if t.is_some() {
            self.pos += 1;
        }
        t
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.peek().is_some_and(|t| &t.token == token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn enter(&mut self, pos: usize) -> Result<(), FilterParseError> {
        if self.depth >= MAX_DEPTH {
            return Err(error_at(pos, "filter nested too deeply"));
        }
        self.depth += 1;
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    fn parse_or(&mut self) -> Result<Expression, FilterParseError> {
        let mut children = vec![self.parse_and()?];
        while self.eat(&Token::Or) {
            children.push(self.parse_and()?);
        }
        Ok(collapse(children, Expression::Or))
    }

    fn parse_and(&mut self) -> Result<Expression, FilterParseError> {
        let mut children = vec![self.parse_unary()?];
        while self.eat(&Token::And) {
            children.push(self.parse_unary()?);
        }
        Ok(collapse(children, Expression::And))
    }

    fn parse_unary(&mut self) -> Result<Expression, FilterParseError> {
        let pos = self.peek().map_or(self.end, |t| t.pos);
        if self.eat(&Token::Not) {
            self.enter(pos)?;
            let inner = self.parse_unary()?;
            self.leave();
            return Ok(Expression::Not(Box::new(inner)));
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<Expression, FilterParseError> {
        let Some(t) = self.next() else {
            return Err(error_at(self.end, "unexpected end of expression"));
        };

        match t.token {
            Token::LParen => {
                self.enter(t.pos)?;
                let inner = self.parse_or()?;
                self.leave();
                match self.next() {
                    Some(Spanned {
                        token: Token::RParen,
                        ..
                    }) => Ok(inner),
                    Some(other) => Err(error_at(
                        other.pos,
                        format!("expected ')', found {}", other.token.describe()),
                    )),
                    None => Err(error_at(self.end, "unbalanced parentheses: missing ')'")),
                }
            }
            Token::Ident(name) => self.parse_comparison(FieldPath::from(name)),
            Token::RParen => Err(error_at(t.pos, "unbalanced parentheses: unexpected ')'")),
            other => Err(error_at(
                t.pos,
                format!("expected field name, found {}", other.describe()),
            )),
        }
    }

    fn parse_comparison(&mut self, field: FieldPath) -> Result<Expression, FilterParseError> {
        let (operator, op_pos) = match self.next() {
            Some(Spanned {
                token: Token::Op(op),
                pos,
            }) => (op, pos),
            Some(other) => {
                return Err(error_at(
                    other.pos,
                    format!("expected operator after '{field}', found {}", other.token.describe()),
                ));
            }
            None => return Err(error_at(self.end, format!("missing operator after '{field}'"))),
        };

        let value_pos = self.peek().map_or(self.end, |t| t.pos);
        let value = self.parse_literal()?;
        validate_operand(operator, &value, op_pos, value_pos)?;

        Ok(Expression::Condition(Condition {
            field,
            operator,
            value,
        }))
    }

    fn parse_literal(&mut self) -> Result<Bson, FilterParseError> {
        match self.next() {
            Some(Spanned {
                token: Token::Literal(v),
                ..
            }) => Ok(v),
            Some(Spanned {
                token: Token::LBracket,
                pos,
            }) => self.parse_list(pos),
            Some(other) => Err(error_at(
                other.pos,
                format!("expected literal, found {}", other.token.describe()),
            )),
            None => Err(error_at(self.end, "missing literal value")),
        }
    }

    fn parse_list(&mut self, open_pos: usize) -> Result<Bson, FilterParseError> {
        let mut items = Vec::new();
        loop {
            match self.next() {
                Some(Spanned {
                    token: Token::Literal(v),
                    ..
                }) => items.push(v),
                Some(Spanned {
                    token: Token::RBracket,
                    pos,
                }) if items.is_empty() => {
                    return Err(error_at(pos, "empty list literal"));
                }
                Some(other) => {
                    return Err(error_at(
                        other.pos,
                        format!("expected list element, found {}", other.token.describe()),
                    ));
                }
                None => return Err(error_at(open_pos, "unterminated list literal")),
            }

            match self.next() {
                Some(Spanned {
                    token: Token::Comma,
                    ..
                }) => continue,
                Some(Spanned {
                    token: Token::RBracket,
                    ..
                }) => return Ok(Bson::Array(items)),
                Some(other) => {
                    return Err(error_at(
                        other.pos,
                        format!("expected ',' or ']', found {}", other.token.describe()),
                    ));
                }
                None => return Err(error_at(open_pos, "unterminated list literal")),
            }
        }
    }
}

fn collapse(mut children: Vec<Expression>, make: fn(Vec<Expression>) -> Expression) -> Expression {
    if children.len() == 1 {
        children.remove(0)
    } else {
        make(children)
    }
}

/// Check that the literal makes sense for the operator.
fn validate_operand(
    operator: Operator,
    value: &Bson,
    op_pos: usize,
    value_pos: usize,
) -> Result<(), FilterParseError> {
    match (operator, value) {
        (Operator::In, Bson::Array(_)) => Ok(()),
        (Operator::In, _) => Err(error_at(value_pos, "'in' requires a list literal")),
        (_, Bson::Array(_)) => Err(error_at(
            value_pos,
            format!("list literal is only valid with 'in', not '{operator}'"),
        )),
        (Operator::Eq | Operator::Ne, _) => Ok(()),
        (_, Bson::Null) => Err(error_at(
            value_pos,
            format!("null is only valid with '==' or '!=', not '{operator}'"),
        )),
        (op, Bson::String(pattern)) if matches!(op, Operator::Match | Operator::NoMatch) => {
            Regex::new(pattern)
                .map(|_| ())
                .map_err(|e| error_at(value_pos, format!("invalid regex pattern: {e}")))
        }
        (op, Bson::String(_)) if op.requires_string() || op.is_ordering() => Ok(()),
        (op, Bson::Int64(_) | Bson::Double(_)) if op.is_ordering() => Ok(()),
        (op, _) if op.requires_string() => Err(error_at(
            value_pos,
            format!("'{op}' requires a string literal"),
        )),
        (op, _) => Err(error_at(
            op_pos,
            format!("'{op}' requires a string or number literal"),
        )),
    }
}
