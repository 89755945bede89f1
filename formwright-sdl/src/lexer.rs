use crate::error::{SdlError, SdlResult};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Tok {
    Name(String),
    Int(String),
    Float(String),
    Str { value: String, block: bool },
    Punct(char),
    Spread,
    Eof,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Token {
    pub tok: Tok,
    pub line: usize,
    pub column: usize,
}

pub(crate) fn tokenize(source: &str) -> SdlResult<Vec<Token>> {
    Lexer::new(source).run()
}

struct Lexer {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    column: usize,
}

impl Lexer {
    fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
            line: 1,
            column: 1,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn error(&self, message: impl Into<String>) -> SdlError {
        SdlError::syntax(self.line, self.column, message)
    }

    fn run(mut self) -> SdlResult<Vec<Token>> {
        let mut tokens = Vec::new();
        loop {
            self.skip_ignored();
            let (line, column) = (self.line, self.column);
            let Some(c) = self.peek() else {
                tokens.push(Token {
                    tok: Tok::Eof,
                    line,
                    column,
                });
                return Ok(tokens);
            };
            let tok = match c {
                '!' | '$' | '&' | '(' | ')' | ':' | '=' | '@' | '[' | ']' | '{' | '|' | '}' => {
                    self.bump();
                    Tok::Punct(c)
                }
                '.' => {
                    if self.peek_at(1) == Some('.') && self.peek_at(2) == Some('.') {
                        self.pos += 3;
                        self.column += 3;
                        Tok::Spread
                    } else {
                        return Err(self.error("unexpected '.'"));
                    }
                }
                '"' => self.string()?,
                c if c == '_' || c.is_ascii_alphabetic() => self.name(),
                c if c == '-' || c.is_ascii_digit() => self.number()?,
                other => return Err(self.error(format!("unexpected character '{other}'"))),
            };
            tokens.push(Token { tok, line, column });
        }
    }

    /// Whitespace, commas and `#` comments are insignificant.
    fn skip_ignored(&mut self) {
        while let Some(c) = self.peek() {
            match c {
                ' ' | '\t' | '\n' | '\r' | ',' | '\u{feff}' => {
                    self.bump();
                }
                '#' => {
                    while self.peek().is_some_and(|c| c != '\n') {
                        self.bump();
                    }
                }
                _ => break,
            }
        }
    }

    fn name(&mut self) -> Tok {
        let mut name = String::new();
        while let Some(c) = self.peek().filter(|c| *c == '_' || c.is_ascii_alphanumeric()) {
            name.push(c);
            self.bump();
        }
        Tok::Name(name)
    }

    fn number(&mut self) -> SdlResult<Tok> {
        let mut text = String::new();
        if self.peek() == Some('-') {
            text.push('-');
            self.bump();
        }
        self.digits(&mut text)?;
        let mut float = false;
        if self.peek() == Some('.') {
            float = true;
            text.push('.');
            self.bump();
            self.digits(&mut text)?;
        }
        if let Some(e) = self.peek().filter(|c| *c == 'e' || *c == 'E') {
            float = true;
            text.push(e);
            self.bump();
            if let Some(sign) = self.peek().filter(|c| *c == '+' || *c == '-') {
                text.push(sign);
                self.bump();
            }
            self.digits(&mut text)?;
        }
        if self.peek().is_some_and(|c| c == '_' || c.is_ascii_alphabetic() || c == '.') {
            return Err(self.error(format!("invalid number '{text}'")));
        }
        Ok(if float { Tok::Float(text) } else { Tok::Int(text) })
    }

    fn digits(&mut self, text: &mut String) -> SdlResult<()> {
        let start = text.len();
        while let Some(c) = self.peek().filter(char::is_ascii_digit) {
            text.push(c);
            self.bump();
        }
        if text.len() == start {
            return Err(self.error("expected a digit"));
        }
        Ok(())
    }

    fn string(&mut self) -> SdlResult<Tok> {
        if self.peek_at(1) == Some('"') && self.peek_at(2) == Some('"') {
            return self.block_string();
        }
        self.bump();
        let mut value = String::new();
        loop {
            match self.bump() {
                None | Some('\n') | Some('\r') => return Err(self.error("unterminated string")),
                Some('"') => return Ok(Tok::Str { value, block: false }),
                Some('\\') => value.push(self.escape()?),
                Some(c) => value.push(c),
            }
        }
    }

    fn escape(&mut self) -> SdlResult<char> {
        Ok(match self.bump() {
            Some('"') => '"',
            Some('\\') => '\\',
            Some('/') => '/',
            Some('b') => '\u{8}',
            Some('f') => '\u{c}',
            Some('n') => '\n',
            Some('r') => '\r',
            Some('t') => '\t',
            Some('u') => {
                let code = self.hex4()?;
                if (0xD800..0xDC00).contains(&code) {
                    if self.bump() != Some('\\') || self.bump() != Some('u') {
                        return Err(self.error("unpaired surrogate in escape"));
                    }
                    let low = self.hex4()?;
                    let combined = 0x10000 + ((code - 0xD800) << 10) + (low.wrapping_sub(0xDC00) & 0x3FF);
                    char::from_u32(combined).ok_or_else(|| self.error("invalid surrogate pair"))?
                } else {
                    char::from_u32(code).ok_or_else(|| self.error("invalid unicode escape"))?
                }
            }
            Some(other) => return Err(self.error(format!("invalid escape '\\{other}'"))),
            None => return Err(self.error("unterminated string")),
        })
    }

    fn hex4(&mut self) -> SdlResult<u32> {
        let mut code = 0;
        for _ in 0..4 {
            let digit = self
                .bump()
                .and_then(|c| c.to_digit(16))
                .ok_or_else(|| self.error("invalid unicode escape"))?;
            code = code * 16 + digit;
        }
        Ok(code)
    }

    fn block_string(&mut self) -> SdlResult<Tok> {
        for _ in 0..3 {
            self.bump();
        }
        let mut raw = String::new();
        loop {
            match self.peek() {
                None => return Err(self.error("unterminated block string")),
                Some('"') if self.peek_at(1) == Some('"') && self.peek_at(2) == Some('"') => {
                    for _ in 0..3 {
                        self.bump();
                    }
                    return Ok(Tok::Str {
                        value: block_string_value(&raw),
                        block: true,
                    });
                }
                Some('\\')
                    if self.peek_at(1) == Some('"')
                        && self.peek_at(2) == Some('"')
                        && self.peek_at(3) == Some('"') =>
                {
                    for _ in 0..4 {
                        self.bump();
                    }
                    raw.push_str("\"\"\"");
                }
                Some(c) => {
                    raw.push(c);
                    self.bump();
                }
            }
        }
    }
}

/// Removes the common indentation and the leading/trailing blank lines of a
/// block string.
fn block_string_value(raw: &str) -> String {
    let lines: Vec<&str> = raw.split('\n').map(|l| l.strip_suffix('\r').unwrap_or(l)).collect();
    let indent = lines
        .iter()
        .skip(1)
        .filter(|l| !l.trim().is_empty())
        .map(|l| l.len() - l.trim_start_matches([' ', '\t']).len())
        .min()
        .unwrap_or(0);

    let mut out: Vec<&str> = lines
        .iter()
        .enumerate()
        .map(|(i, l)| if i == 0 { l } else { l.get(indent..).unwrap_or("") })
        .collect();
    while out.first().is_some_and(|l| l.trim().is_empty()) {
        out.remove(0);
    }
    while out.last().is_some_and(|l| l.trim().is_empty()) {
        out.pop();
    }
    out.join("\n")
}
