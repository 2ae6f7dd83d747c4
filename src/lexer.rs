use std::iter::Peekable;

use crate::token::{Span, Token, TokenKind, KEYWORDS};

pub const SUGGESTED_TOKENS_CAPACITY: usize = 8_192;

/// A tab counts as this many indentation units; a space counts as one.
pub const TAB_WIDTH: u32 = 8;

/// Lexes the provided string, producing the tokens into the provided buffer.
pub fn lex(src: &str, tokens: &mut Vec<Token>) {
    Lexer::new(src, tokens).lex();
}

/// A convenience function that allocates a new buffer per lexed input and
/// returns it.
pub fn lex_in_new(src: &str) -> Vec<Token> {
    let mut tokens = Vec::with_capacity(SUGGESTED_TOKENS_CAPACITY);
    lex(src, &mut tokens);
    tokens
}

/// The Sere lexer.
///
/// Layout handling lives in the lexer: at every true line start (bracket
/// depth zero) the leading whitespace is measured and compared against the
/// indentation stack, emitting `Indent` and `Dedent` tokens; newlines inside
/// brackets and after a line-continuation backslash are plain trivia.
struct Lexer<'src, 'tok> {
    src: &'src str,
    iter: Peekable<std::str::Chars<'src>>,
    cursor: usize,
    current_lo: usize,
    tokens: &'tok mut Vec<Token>,
    at_line_start: bool,
    /// Paren/bracket nesting depth. Newlines are insignificant while > 0.
    depth: u32,
    /// Current indentation level, in units.
    indent: u32,
    /// Enclosing indentation levels.
    indent_stack: Vec<u32>,
}

impl Lexer<'_, '_> {
    /// Scans the source string until the input is exhausted.
    ///
    /// Tokens are written into the provided tokens buffer. The buffer always
    /// ends with an `Eof` token, preceded by one `Dedent` per indentation
    /// level still open at the end of input.
    fn lex(mut self) {
        assert_eq!(self.tokens.len(), 0, "must pass clean tokens buffer");
        loop {
            if self.at_line_start && self.depth == 0 {
                self.scan_line_start();
            }
            let next = self.scan_token_kind();
            if matches!(next, TokenKind::Eof) {
                while let Some(level) = self.indent_stack.pop() {
                    self.indent = level;
                    self.produce(TokenKind::Dedent);
                }
                self.produce(TokenKind::Eof);
                break;
            }
            self.produce(next);
        }
    }

    /// Measures the indentation of a fresh line and emits the layout tokens.
    ///
    /// Blank and comment-only lines never affect the indentation level.
    fn scan_line_start(&mut self) {
        self.at_line_start = false;
        self.current_lo = self.cursor;

        let mut width = 0;
        loop {
            match self.peek() {
                ' ' => width += 1,
                '\t' => width += TAB_WIDTH,
                _ => break,
            }
            self.advance();
        }
        if self.cursor > self.current_lo {
            self.produce(TokenKind::Whitespace);
        }
        if matches!(self.peek(), '\n' | '\r' | '#' | '\0') {
            return;
        }

        if width > self.indent {
            self.indent_stack.push(self.indent);
            self.indent = width;
            self.produce(TokenKind::Indent);
        } else if width < self.indent {
            while width < self.indent {
                let Some(level) = self.indent_stack.pop() else {
                    break;
                };
                self.indent = level;
                self.produce(TokenKind::Dedent);
            }
            if width != self.indent {
                // The new level matches no enclosing level. Recover by
                // adopting it so subsequent lines are judged consistently.
                self.indent = width;
                self.produce(TokenKind::ErrorIndent);
            }
        }
    }

    /// Tries to scan the current character.
    fn scan_token_kind(&mut self) -> TokenKind {
        use TokenKind::*;
        match self.mark_advance() {
            '\0' => Eof,
            '\n' => {
                if self.depth == 0 {
                    self.at_line_start = true;
                    Newline
                } else {
                    Whitespace
                }
            }
            ' ' | '\t' | '\r' => self.whitespace(),
            '#' => self.comment(),
            '(' => {
                self.depth += 1;
                LParen
            }
            ')' => {
                self.depth = self.depth.saturating_sub(1);
                RParen
            }
            '[' => {
                self.depth += 1;
                LBracket
            }
            ']' => {
                self.depth = self.depth.saturating_sub(1);
                RBracket
            }
            '{' => LBrace,
            '}' => RBrace,
            ',' => Comma,
            ';' => Semicolon,
            '.' => match self.peek() {
                c if c.is_ascii_digit() => self.number('.'),
                _ => Dot,
            },
            '+' => match self.peek() {
                '=' => self.advance_with(PlusEq),
                _ => Plus,
            },
            '-' => match self.peek() {
                '=' => self.advance_with(MinusEq),
                '>' => self.advance_with(Arrow),
                _ => Minus,
            },
            '*' => match self.peek() {
                '=' => self.advance_with(StarEq),
                '*' => {
                    self.advance();
                    match self.peek() {
                        '=' => self.advance_with(StarStarEq),
                        _ => StarStar,
                    }
                }
                _ => Star,
            },
            '/' => match self.peek() {
                '=' => self.advance_with(SlashEq),
                '/' => {
                    self.advance();
                    match self.peek() {
                        '=' => self.advance_with(SlashSlashEq),
                        _ => SlashSlash,
                    }
                }
                _ => Slash,
            },
            '%' => match self.peek() {
                '=' => self.advance_with(PercentEq),
                _ => Percent,
            },
            ':' => match self.peek() {
                '=' => self.advance_with(ColonEq),
                _ => Colon,
            },
            '|' => match self.peek() {
                '=' => self.advance_with(PipeEq),
                '|' => self.advance_with(PipePipe),
                _ => Pipe,
            },
            '&' => match self.peek() {
                '=' => self.advance_with(AmpEq),
                '&' => self.advance_with(AmpAmp),
                _ => Amp,
            },
            '^' => match self.peek() {
                '=' => self.advance_with(CaretEq),
                _ => Caret,
            },
            '~' => Tilde,
            '!' => match self.peek() {
                '=' => self.advance_with(BangEq),
                _ => Bang,
            },
            '=' => match self.peek() {
                '=' => self.advance_with(EqEq),
                _ => Eq,
            },
            '<' => match self.peek() {
                '<' => {
                    self.advance();
                    match self.peek() {
                        '=' => self.advance_with(ShlEq),
                        _ => Shl,
                    }
                }
                '=' => self.advance_with(LessEq),
                _ => Less,
            },
            '>' => match self.peek() {
                '>' => {
                    self.advance();
                    match self.peek() {
                        '=' => self.advance_with(ShrEq),
                        _ => Shr,
                    }
                }
                '=' => self.advance_with(GreaterEq),
                _ => Greater,
            },
            q @ ('\'' | '"') => self.string(q),
            '\\' => match self.peek() {
                // A trailing backslash suppresses the line break; the next
                // line continues the current logical line, so its leading
                // whitespace is not measured as indentation.
                '\n' => self.advance_with(Whitespace),
                _ => ErrorUnexpectedChar,
            },
            c if c.is_ascii_digit() => self.number(c),
            c if c.is_ascii_alphabetic() || c == '_' => self.identifier_or_keyword(),
            _ => ErrorUnexpectedChar,
        }
    }

    /// Scans a numeric literal. `first` is the already-consumed character —
    /// either a digit or the `.` of a leading-dot float such as `.5`.
    ///
    /// The lexer only delimits the literal; base prefixes, value parsing and
    /// the 32-bit range check happen in [`extract`].
    fn number(&mut self, first: char) -> TokenKind {
        if first == '.' {
            self.digits();
            return self.exponent_or(TokenKind::Float);
        }

        // Base-prefixed integer literals: 0x / 0o / 0b.
        if first == '0' && matches!(self.peek(), 'x' | 'X' | 'o' | 'O' | 'b' | 'B') {
            self.advance();
            while self.peek().is_ascii_hexdigit() {
                self.advance();
            }
            return TokenKind::Int;
        }

        self.digits();
        let mut is_float = false;
        if self.peek() == '.' && self.peek_next().is_ascii_digit() {
            self.advance();
            self.digits();
            is_float = true;
        }
        if matches!(self.peek(), 'e' | 'E') {
            return self.exponent_or(TokenKind::Float);
        }
        if is_float {
            TokenKind::Float
        } else {
            TokenKind::Int
        }
    }

    /// Consumes an exponent part, if present. An exponent marker without any
    /// digit after it (and the optional sign) is a malformed literal.
    fn exponent_or(&mut self, kind: TokenKind) -> TokenKind {
        if matches!(self.peek(), 'e' | 'E') {
            self.advance();
            if matches!(self.peek(), '+' | '-') {
                self.advance();
            }
            if !self.peek().is_ascii_digit() {
                return TokenKind::ErrorMalformedNumber;
            }
            self.digits();
        }
        kind
    }

    fn digits(&mut self) {
        while self.peek().is_ascii_digit() {
            self.advance();
        }
    }

    /// Tries to lex a string token, opened by `quote` (`'` or `"`).
    ///
    /// A doubled opening quote upgrades to a triple-quoted string which may
    /// embed raw line breaks. Escape sequences are not decoded here; the
    /// lexer only records whether any escaping happened (`EscapedStr`) so
    /// that the decode pass in [`extract`] runs only when actually needed.
    fn string(&mut self, quote: char) -> TokenKind {
        let triple = self.peek() == quote && self.peek_next() == quote;
        if triple {
            self.advance();
            self.advance();
        }

        // Whether any escaping did happen inside this string token
        let mut has_escaped = false;
        // Whether the current character is being escaped
        let mut is_escaping = false;
        loop {
            let (current, current_span) = self.advance_with_span();
            match (is_escaping, current) {
                // The input exhausted before the closing quote.
                (_, '\0') => {
                    return TokenKind::ErrorUnterminatedString;
                }
                (false, c) if c == quote => {
                    if !triple {
                        return if has_escaped {
                            TokenKind::EscapedStr
                        } else {
                            TokenKind::Str
                        };
                    }
                    if self.peek() == quote && self.peek_next() == quote {
                        self.advance();
                        self.advance();
                        return if has_escaped {
                            TokenKind::EscapedStr
                        } else {
                            TokenKind::Str
                        };
                    }
                    // A lone quote inside a triple-quoted string is content.
                }
                // A single-line string cannot contain a bare line break. The
                // string token ends here and the line break is re-emitted so
                // the layout machinery stays consistent.
                (false, '\n') if !triple => {
                    let lo = self.current_lo;
                    self.produce_spanned(
                        TokenKind::ErrorUnterminatedString,
                        Span::new_of_bounds(lo..current_span.lo),
                    );
                    self.current_lo = current_span.lo;
                    return if self.depth == 0 {
                        self.at_line_start = true;
                        TokenKind::Newline
                    } else {
                        TokenKind::Whitespace
                    };
                }
                // Mark a new escape context. An escaped line break is a line
                // continuation within the string.
                (false, '\\') => {
                    has_escaped = true;
                    is_escaping = true;
                }
                // For any other character, just advance. Also, reset the
                // previous escaping context, if any.
                (_, _) => {
                    is_escaping = false;
                }
            }
        }
    }

    fn identifier_or_keyword(&mut self) -> TokenKind {
        let valid_suffix = |c: char| c.is_ascii_alphanumeric() || c == '_';
        while valid_suffix(self.peek()) {
            self.advance();
        }
        match KEYWORDS.get(self.substr()).copied() {
            Some(keyword) => keyword,
            None => TokenKind::Identifier,
        }
    }

    fn whitespace(&mut self) -> TokenKind {
        while matches!(self.peek(), ' ' | '\t' | '\r') {
            self.advance();
        }
        TokenKind::Whitespace
    }

    fn comment(&mut self) -> TokenKind {
        while !matches!(self.peek(), '\n' | '\0') {
            self.advance();
        }
        TokenKind::Comment
    }
}

impl Lexer<'_, '_> {
    /// Constructs a new lexer with the default state.
    fn new<'src, 'tok>(src: &'src str, tokens: &'tok mut Vec<Token>) -> Lexer<'src, 'tok> {
        Lexer {
            src,
            iter: src.chars().peekable(),
            cursor: 0,
            current_lo: 0,
            tokens,
            at_line_start: true,
            depth: 0,
            indent: 0,
            indent_stack: Vec::new(),
        }
    }

    /// Starts a new token "mark" and advances the iterator.
    fn mark_advance(&mut self) -> char {
        self.current_lo = self.cursor;
        self.advance()
    }

    /// Returns the next character and advances the iterator.
    fn advance(&mut self) -> char {
        self.iter
            .next()
            .inspect(|c| self.cursor += c.len_utf8())
            .unwrap_or('\0')
    }

    /// Advances and returns the provided value.
    fn advance_with<T>(&mut self, value: T) -> T {
        self.advance();
        value
    }

    /// Returns the next character (with its span) and advances the iterator.
    fn advance_with_span(&mut self) -> (char, Span) {
        let lo = self.cursor;
        let char = self.advance();
        let hi = lo + char.len_utf8();
        let span = Span::new_of_bounds(lo..hi);
        (char, span)
    }

    /// Returns the next character without advancing the iterator.
    fn peek(&mut self) -> char {
        self.iter.peek().copied().unwrap_or('\0')
    }

    /// Returns the character after the next one, without advancing.
    fn peek_next(&self) -> char {
        let mut chars = self.src[self.cursor..].chars();
        chars.next();
        chars.next().unwrap_or('\0')
    }

    /// Returns the current span.
    fn span(&self) -> Span {
        Span::new_of_bounds(self.current_lo..self.cursor)
    }

    /// Returns the substring of the current marked bounds.
    fn substr(&self) -> &str {
        self.span().substr(self.src)
    }

    /// Produces a token using the marked bounds.
    fn produce(&mut self, kind: TokenKind) {
        self.produce_spanned(kind, self.span());
    }

    /// Produces a token with the provided span.
    fn produce_spanned(&mut self, kind: TokenKind, span: Span) {
        self.tokens.push(Token::new(kind, span));
    }
}

/// Literal payload extraction.
///
/// Tokens are payload-free; the parser re-reads the literal value from the
/// token's source span through these functions.
pub mod extract {
    use super::*;

    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    pub enum LitError {
        Malformed,
        OutOfRange,
    }

    /// Parses an integer literal, honoring `0x`/`0o`/`0b` base prefixes.
    /// Values outside the 32-bit signed range are an error, never truncated.
    pub fn int(token: Token, src: &str) -> Result<i32, LitError> {
        debug_assert_eq!(token.kind, TokenKind::Int);
        let s = token.span().substr(src);
        let (digits, base) = match s.as_bytes() {
            [b'0', b'x' | b'X', ..] => (&s[2..], 16),
            [b'0', b'o' | b'O', ..] => (&s[2..], 8),
            [b'0', b'b' | b'B', ..] => (&s[2..], 2),
            _ => (s, 10),
        };
        let value = i64::from_str_radix(digits, base).map_err(|_| LitError::Malformed)?;
        i32::try_from(value).map_err(|_| LitError::OutOfRange)
    }

    pub fn float(token: Token, src: &str) -> Result<f32, LitError> {
        debug_assert_eq!(token.kind, TokenKind::Float);
        let s = token.span().substr(src);
        let value: f32 = s.parse().map_err(|_| LitError::Malformed)?;
        if value.is_finite() {
            Ok(value)
        } else {
            Err(LitError::OutOfRange)
        }
    }

    pub fn ident(token: Token, src: &str) -> &str {
        debug_assert_eq!(token.kind, TokenKind::Identifier);
        token.span().substr(src)
    }

    pub fn string(token: Token, src: &str) -> Box<str> {
        debug_assert_eq!(token.kind, TokenKind::Str);
        unquote(token.span().substr(src)).into()
    }

    pub fn escaped_string(token: Token, src: &str) -> Box<str> {
        debug_assert_eq!(token.kind, TokenKind::EscapedStr);
        perform_escape(unquote(token.span().substr(src))).into_boxed_str()
    }

    /// Strips the enclosing quotes, single or triple.
    fn unquote(s: &str) -> &str {
        let q = s.as_bytes()[0];
        debug_assert!(matches!(q, b'\'' | b'"'));
        let n = if s.len() >= 6 && s.as_bytes()[1] == q && s.as_bytes()[2] == q {
            3
        } else {
            1
        };
        &s[n..s.len() - n]
    }
}

fn perform_escape(raw: &str) -> String {
    let mut buf = String::with_capacity(raw.len());
    let mut escaped = false;
    for char in raw.chars() {
        if !escaped {
            if char == '\\' {
                escaped = true;
            } else {
                buf.push(char);
            }
            continue;
        }
        escaped = false;
        match char {
            'n' => buf.push('\n'),
            't' => buf.push('\t'),
            'r' => buf.push('\r'),
            'a' => buf.push('\x07'),
            'b' => buf.push('\x08'),
            'f' => buf.push('\x0c'),
            'v' => buf.push('\x0b'),
            '0' => buf.push('\0'),
            // An escaped line break continues the string with no character.
            '\n' => {}
            other => buf.push(other),
        }
    }
    buf.shrink_to_fit();
    buf
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// Lexes and strips trivia, keeping only the token kinds.
    fn kinds(src: &str) -> Vec<TokenKind> {
        lex_in_new(src)
            .into_iter()
            .filter(|t| !t.kind.is_trivia())
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn tests_with_span() {
        use TokenKind::*;
        let cases = cases!(match .. {
            "1 + 2 * 3" => [
                (Int, 0..1),
                (Whitespace, 1..2),
                (Plus, 2..3),
                (Whitespace, 3..4),
                (Int, 4..5),
                (Whitespace, 5..6),
                (Star, 6..7),
                (Whitespace, 7..8),
                (Int, 8..9),
                (Eof, 9..9),
            ],
            "x := y ** 2 // 3" => [
                (Identifier, 0..1),
                (Whitespace, 1..2),
                (ColonEq, 2..4),
                (Whitespace, 4..5),
                (Identifier, 5..6),
                (Whitespace, 6..7),
                (StarStar, 7..9),
                (Whitespace, 9..10),
                (Int, 10..11),
                (Whitespace, 11..12),
                (SlashSlash, 12..14),
                (Whitespace, 14..15),
                (Int, 15..16),
                (Eof, 16..16),
            ],
            "def f() -> int:" => [
                (Def, 0..3),
                (Whitespace, 3..4),
                (Identifier, 4..5),
                (LParen, 5..6),
                (RParen, 6..7),
                (Whitespace, 7..8),
                (Arrow, 8..10),
                (Whitespace, 10..11),
                (Identifier, 11..14),
                (Colon, 14..15),
                (Eof, 15..15),
            ],
            "a\n    b\nc" => [
                (Identifier, 0..1),
                (Newline, 1..2),
                (Whitespace, 2..6),
                (Indent, 2..6),
                (Identifier, 6..7),
                (Newline, 7..8),
                (Dedent, 8..8),
                (Identifier, 8..9),
                (Eof, 9..9),
            ],
            "a\n    b" => [
                (Identifier, 0..1),
                (Newline, 1..2),
                (Whitespace, 2..6),
                (Indent, 2..6),
                (Identifier, 6..7),
                (Dedent, 7..7),
                (Eof, 7..7),
            ],
            "# only a comment" => [(Comment, 0..16), (Eof, 16..16)],
            "'hi' \"there\"" => [
                (Str, 0..4),
                (Whitespace, 4..5),
                (Str, 5..12),
                (Eof, 12..12),
            ],
            r#""a\nb""# => [(EscapedStr, 0..6), (Eof, 6..6)],
            "'''a\nb'''" => [(Str, 0..9), (Eof, 9..9)],
            "\"oops\nx" => [
                (ErrorUnterminatedString, 0..5),
                (Newline, 5..6),
                (Identifier, 6..7),
                (Eof, 7..7),
            ],
            "0x1F 0o17 0b101 .5 1.25 2e3" => [
                (Int, 0..4),
                (Whitespace, 4..5),
                (Int, 5..9),
                (Whitespace, 9..10),
                (Int, 10..15),
                (Whitespace, 15..16),
                (Float, 16..18),
                (Whitespace, 18..19),
                (Float, 19..23),
                (Whitespace, 23..24),
                (Float, 24..27),
                (Eof, 27..27),
            ],
            "1e+" => [(ErrorMalformedNumber, 0..3), (Eof, 3..3)],
            "a $ b" => [
                (Identifier, 0..1),
                (Whitespace, 1..2),
                (ErrorUnexpectedChar, 2..3),
                (Whitespace, 3..4),
                (Identifier, 4..5),
                (Eof, 5..5),
            ],
        });

        for (input, tokens) in cases {
            let lexed = lex_in_new(input);
            assert_eq!(&lexed, tokens, "input: {input:?}");
        }
    }

    #[test]
    fn indent_dedent_balance() {
        use TokenKind::*;
        let src = "a\n    b\n        c\n    d\ne\n";
        let kinds = kinds(src);
        assert_eq!(
            kinds,
            vec![
                Identifier, Newline, // a
                Indent, Identifier, Newline, // b
                Indent, Identifier, Newline, // c
                Dedent, Identifier, Newline, // d
                Dedent, Identifier, Newline, // e
                Eof,
            ]
        );
        let indents = kinds.iter().filter(|k| **k == Indent).count();
        let dedents = kinds.iter().filter(|k| **k == Dedent).count();
        assert_eq!(indents, dedents);
    }

    #[test]
    fn trailing_dedents_close_every_level() {
        use TokenKind::*;
        // No trailing newline, two levels still open at end of input.
        let src = "a\n  b\n    c";
        assert_eq!(
            kinds(src),
            vec![
                Identifier, Newline, Indent, Identifier, Newline, Indent, Identifier, Dedent,
                Dedent, Eof,
            ]
        );
    }

    #[test]
    fn partial_dedent_is_an_indentation_error() {
        use TokenKind::*;
        let src = "a\n        b\n    c\n";
        assert_eq!(
            kinds(src),
            vec![
                Identifier, Newline, Indent, Identifier, Newline, Dedent, ErrorIndent, Identifier,
                Newline, Eof,
            ]
        );
    }

    #[test]
    fn blank_and_comment_lines_keep_the_level() {
        use TokenKind::*;
        let src = "a\n    b\n\n    # note\n    c\n";
        assert_eq!(
            kinds(src),
            vec![
                Identifier, Newline, Indent, Identifier, Newline, Newline, Newline, Identifier,
                Newline, Dedent, Eof,
            ]
        );
    }

    #[test]
    fn crlf_blank_lines_keep_the_level() {
        use TokenKind::*;
        let src = "a\r\n    b\r\n\r\n    c\r\n";
        assert_eq!(
            kinds(src),
            vec![
                Identifier, Newline, Indent, Identifier, Newline, Newline, Identifier, Newline,
                Dedent, Eof,
            ]
        );
    }

    #[test]
    fn brackets_suppress_layout() {
        use TokenKind::*;
        let src = "(1 +\n    2)\n[\n1\n]\n";
        assert_eq!(
            kinds(src),
            vec![
                LParen, Int, Plus, Int, RParen, Newline, LBracket, Int, RBracket, Newline, Eof,
            ]
        );
    }

    #[test]
    fn backslash_continues_the_line() {
        use TokenKind::*;
        let src = "1 + \\\n    2\n";
        assert_eq!(kinds(src), vec![Int, Plus, Int, Newline, Eof]);
    }

    #[test]
    fn tab_counts_as_eight_units() {
        use TokenKind::*;
        // A tab-indented line followed by an eight-space line stays level.
        let src = "a\n\tb\n        c\n";
        assert_eq!(
            kinds(src),
            vec![
                Identifier, Newline, Indent, Identifier, Newline, Identifier, Newline, Dedent, Eof,
            ]
        );
    }

    #[test]
    fn extract_ints() {
        use extract::LitError;
        let check = |src: &str| {
            let token = lex_in_new(src)[0];
            assert_eq!(token.kind, TokenKind::Int, "input: {src:?}");
            extract::int(token, src)
        };
        assert_eq!(check("0"), Ok(0));
        assert_eq!(check("2147483647"), Ok(i32::MAX));
        assert_eq!(check("2147483648"), Err(LitError::OutOfRange));
        assert_eq!(check("0x1F"), Ok(31));
        assert_eq!(check("0o17"), Ok(15));
        assert_eq!(check("0b101"), Ok(5));
        assert_eq!(check("0x"), Err(LitError::Malformed));
        assert_eq!(check("0b102"), Err(LitError::Malformed));
    }

    #[test]
    fn extract_floats() {
        let src = ".5 1.25 2e3";
        let tokens: Vec<_> = lex_in_new(src)
            .into_iter()
            .filter(|t| t.kind == TokenKind::Float)
            .collect();
        assert_eq!(extract::float(tokens[0], src), Ok(0.5));
        assert_eq!(extract::float(tokens[1], src), Ok(1.25));
        assert_eq!(extract::float(tokens[2], src), Ok(2000.0));
    }

    #[test]
    fn extract_strings() {
        let src = r#"'plain' "a\tb" '''multi
line'''"#;
        let tokens: Vec<_> = lex_in_new(src)
            .into_iter()
            .filter(|t| matches!(t.kind, TokenKind::Str | TokenKind::EscapedStr))
            .collect();
        assert_eq!(&*extract::string(tokens[0], src), "plain");
        assert_eq!(&*extract::escaped_string(tokens[1], src), "a\tb");
        assert_eq!(&*extract::string(tokens[2], src), "multi\nline");
    }

    #[test]
    fn escape_table() {
        assert_eq!(perform_escape(r"\n\t\r\\\'\0"), "\n\t\r\\'\0");
        assert_eq!(perform_escape("a\\\nb"), "ab"); // escaped line break
        assert_eq!(perform_escape(r"\q"), "q"); // unknown escape: literal
    }

    macro_rules! cases {
        (match .. {
            $($str:expr => [$(($kind:expr, $range:expr)),* $(,)?]),* $(,)?
        }) => {{
            &[$((
                $str,
                vec![
                    $(Token::new($kind, Span::new_of_bounds($range.start..$range.end))),*
                ],
            )),*]
        }};
    }
    use cases;
}
