use std::fmt;

use crate::error::JqError;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Literals
    Number(String), // source text, precision kept until conversion
    String(String),
    True,
    False,
    Null,

    Ident(String),

    // Punctuation
    Dot,       // .
    Pipe,      // |
    Comma,     // ,
    Colon,     // :
    Question,  // ?
    Star,      // * (only valid as `.*`)
    Minus,     // - (only valid before a number)

    // Brackets
    LParen,    // (
    RParen,    // )
    LBracket,  // [
    RBracket,  // ]
    LBrace,    // {
    RBrace,    // }

    // Comparison
    Eq,        // ==
    Ne,        // !=
    Lt,        // <
    Le,        // <=
    Gt,        // >
    Ge,        // >=

    // Logic
    And,
    Or,

    Eof,
}

impl Token {
    pub fn is_keyword(s: &str) -> Option<Token> {
        match s {
            "and" => Some(Token::And),
            "or" => Some(Token::Or),
            "true" => Some(Token::True),
            "false" => Some(Token::False),
            "null" => Some(Token::Null),
            _ => None,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Number(n) => write!(f, "{n}"),
            Token::String(s) => write!(f, "{s:?}"),
            Token::True => write!(f, "true"),
            Token::False => write!(f, "false"),
            Token::Null => write!(f, "null"),
            Token::Ident(name) => write!(f, "{name}"),
            Token::Dot => write!(f, "'.'"),
            Token::Pipe => write!(f, "'|'"),
            Token::Comma => write!(f, "','"),
            Token::Colon => write!(f, "':'"),
            Token::Question => write!(f, "'?'"),
            Token::Star => write!(f, "'*'"),
            Token::Minus => write!(f, "'-'"),
            Token::LParen => write!(f, "'('"),
            Token::RParen => write!(f, "')'"),
            Token::LBracket => write!(f, "'['"),
            Token::RBracket => write!(f, "']'"),
            Token::LBrace => write!(f, "'{{'"),
            Token::RBrace => write!(f, "'}}'"),
            Token::Eq => write!(f, "'=='"),
            Token::Ne => write!(f, "'!='"),
            Token::Lt => write!(f, "'<'"),
            Token::Le => write!(f, "'<='"),
            Token::Gt => write!(f, "'>'"),
            Token::Ge => write!(f, "'>='"),
            Token::And => write!(f, "and"),
            Token::Or => write!(f, "or"),
            Token::Eof => write!(f, "end of input"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Lexer {
    input: Vec<char>,
    pos: usize,
    /// Tokens paired with the character offset they start at.
    pub tokens: Vec<(Token, usize)>,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Lexer {
            input: input.chars().collect(),
            pos: 0,
            tokens: Vec::new(),
        }
    }

    pub fn tokenize(&mut self) -> Result<&[(Token, usize)], JqError> {
        while self.pos < self.input.len() {
            self.skip_whitespace();
            if self.pos >= self.input.len() {
                break;
            }

            let start = self.pos;
            let ch = self.input[self.pos];
            match ch {
                '#' => {
                    while self.pos < self.input.len() && self.input[self.pos] != '\n' {
                        self.pos += 1;
                    }
                }
                '.' => {
                    if self.peek_next().is_some_and(|c| c.is_ascii_digit()) {
                        self.read_number()?;
                    } else {
                        self.pos += 1;
                        self.push(Token::Dot, start);
                    }
                }
                '|' => self.single(Token::Pipe),
                ',' => self.single(Token::Comma),
                ':' => self.single(Token::Colon),
                '?' => self.single(Token::Question),
                '*' => self.single(Token::Star),
                '-' => self.single(Token::Minus),
                '(' => self.single(Token::LParen),
                ')' => self.single(Token::RParen),
                '[' => self.single(Token::LBracket),
                ']' => self.single(Token::RBracket),
                '{' => self.single(Token::LBrace),
                '}' => self.single(Token::RBrace),
                '=' => {
                    if self.peek_next() == Some('=') {
                        self.pos += 2;
                        self.push(Token::Eq, start);
                    } else {
                        return Err(self.error(start, "'='", "assignment is not supported, did you mean '=='?"));
                    }
                }
                '!' => {
                    if self.peek_next() == Some('=') {
                        self.pos += 2;
                        self.push(Token::Ne, start);
                    } else {
                        return Err(self.error(start, "'!'", "unexpected '!', did you mean 'not'?"));
                    }
                }
                '<' => {
                    self.pos += 1;
                    if self.peek_current() == Some('=') {
                        self.pos += 1;
                        self.push(Token::Le, start);
                    } else {
                        self.push(Token::Lt, start);
                    }
                }
                '>' => {
                    self.pos += 1;
                    if self.peek_current() == Some('=') {
                        self.pos += 1;
                        self.push(Token::Ge, start);
                    } else {
                        self.push(Token::Gt, start);
                    }
                }
                '"' => {
                    self.read_string()?;
                }
                c if c.is_ascii_digit() => {
                    self.read_number()?;
                }
                c if c.is_ascii_alphabetic() || c == '_' => {
                    self.read_ident();
                }
                _ => {
                    return Err(self.error(
                        start,
                        &format!("'{ch}'"),
                        &format!("unexpected character: '{ch}'"),
                    ));
                }
            }
        }

        let end = self.input.len();
        self.push(Token::Eof, end);
        Ok(&self.tokens)
    }

    fn push(&mut self, token: Token, position: usize) {
        self.tokens.push((token, position));
    }

    fn single(&mut self, token: Token) {
        self.push(token, self.pos);
        self.pos += 1;
    }

    fn error(&self, position: usize, token: &str, message: &str) -> JqError {
        JqError::Syntax {
            position,
            token: token.to_string(),
            message: message.to_string(),
        }
    }

    fn skip_whitespace(&mut self) {
        while self.pos < self.input.len() && self.input[self.pos].is_whitespace() {
            self.pos += 1;
        }
    }

    fn peek_current(&self) -> Option<char> {
        self.input.get(self.pos).copied()
    }

    fn peek_next(&self) -> Option<char> {
        self.input.get(self.pos + 1).copied()
    }

    fn eat_digits(&mut self) -> usize {
        let start = self.pos;
        while self.pos < self.input.len() && self.input[self.pos].is_ascii_digit() {
            self.pos += 1;
        }
        self.pos - start
    }

    fn read_number(&mut self) -> Result<(), JqError> {
        let start = self.pos;
        let mut text = String::new();
        if self.peek_current() == Some('.') {
            // `.5` is written as `0.5` so that serde_json accepts the text
            text.push('0');
        }
        self.eat_digits();
        if self.peek_current() == Some('.') {
            self.pos += 1;
            if self.eat_digits() == 0 {
                // `1.` is not valid JSON, but jq accepts it
                text.extend(&self.input[start..self.pos]);
                text.push('0');
                return self.finish_number(start, text);
            }
        }
        if matches!(self.peek_current(), Some('e' | 'E')) {
            self.pos += 1;
            if matches!(self.peek_current(), Some('+' | '-')) {
                self.pos += 1;
            }
            if self.eat_digits() == 0 {
                let text: String = self.input[start..self.pos].iter().collect();
                return Err(self.error(start, &text, &format!("invalid number: {text}")));
            }
        }
        text.extend(&self.input[start..self.pos]);
        self.finish_number(start, text)
    }

    fn finish_number(&mut self, start: usize, text: String) -> Result<(), JqError> {
        // Leading zeros are fine in jq but rejected by JSON; normalise them.
        let trimmed = match text.split_once('.') {
            Some((int, frac)) => format!("{}.{}", strip_leading_zeros(int), frac),
            None => match text.find(['e', 'E']) {
                Some(exp) => format!("{}{}", strip_leading_zeros(&text[..exp]), &text[exp..]),
                None => strip_leading_zeros(&text).to_string(),
            },
        };
        self.push(Token::Number(trimmed), start);
        Ok(())
    }

    fn read_string(&mut self) -> Result<(), JqError> {
        let start = self.pos;
        self.pos += 1; // skip opening quote
        let mut s = String::new();
        while self.pos < self.input.len() {
            match self.input[self.pos] {
                '"' => {
                    self.pos += 1;
                    self.push(Token::String(s), start);
                    return Ok(());
                }
                '\\' => {
                    self.pos += 1;
                    let Some(esc) = self.peek_current() else {
                        break;
                    };
                    match esc {
                        'n' => s.push('\n'),
                        'r' => s.push('\r'),
                        't' => s.push('\t'),
                        'b' => s.push('\u{8}'),
                        'f' => s.push('\u{c}'),
                        '\\' => s.push('\\'),
                        '"' => s.push('"'),
                        '/' => s.push('/'),
                        'u' => {
                            self.pos += 1;
                            let c = self.read_unicode_escape()?;
                            s.push(c);
                            continue;
                        }
                        '(' => {
                            return Err(self.error(
                                self.pos - 1,
                                "'\\('",
                                "string interpolation is not supported",
                            ));
                        }
                        c => {
                            return Err(self.error(
                                self.pos - 1,
                                &format!("'\\{c}'"),
                                &format!("invalid escape character: '\\{c}'"),
                            ));
                        }
                    }
                    self.pos += 1;
                }
                c => {
                    s.push(c);
                    self.pos += 1;
                }
            }
        }
        Err(self.error(start, "'\"'", "unterminated string literal"))
    }

    fn read_hex4(&mut self) -> Result<u32, JqError> {
        let start = self.pos;
        if start + 4 > self.input.len() {
            return Err(self.error(start, "'\\u'", "incomplete unicode escape"));
        }
        self.pos += 4;
        let hex: String = self.input[start..self.pos].iter().collect();
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(self.error(start, &hex, &format!("invalid unicode escape: \\u{hex}")));
        }
        u32::from_str_radix(&hex, 16).map_err(|_| {
            self.error(start, &hex, &format!("invalid unicode escape: \\u{hex}"))
        })
    }

    fn read_unicode_escape(&mut self) -> Result<char, JqError> {
        let start = self.pos;
        let high = self.read_hex4()?;
        let code = if (0xD800..0xDC00).contains(&high) {
            // surrogate pair: expect a following \uXXXX low half
            if self.peek_current() == Some('\\') && self.peek_next() == Some('u') {
                self.pos += 2;
                let low = self.read_hex4()?;
                if !(0xDC00..0xE000).contains(&low) {
                    return Err(self.error(start, "'\\u'", "invalid surrogate pair"));
                }
                0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00)
            } else {
                return Err(self.error(start, "'\\u'", "unpaired surrogate"));
            }
        } else {
            high
        };
        char::from_u32(code)
            .ok_or_else(|| self.error(start, "'\\u'", "invalid unicode code point"))
    }

    fn read_ident(&mut self) {
        let start = self.pos;
        while self.pos < self.input.len()
            && (self.input[self.pos].is_ascii_alphanumeric() || self.input[self.pos] == '_')
        {
            self.pos += 1;
        }
        let word: String = self.input[start..self.pos].iter().collect();
        match Token::is_keyword(&word) {
            Some(kw) => self.push(kw, start),
            None => self.push(Token::Ident(word), start),
        }
    }
}

fn strip_leading_zeros(int: &str) -> &str {
    let stripped = int.trim_start_matches('0');
    if stripped.is_empty() {
        "0"
    } else {
        stripped
    }
}
