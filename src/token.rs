use std::{fmt, ops::Range};

#[derive(Copy, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    lo: usize,
    len: u32,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Token {
        Token {
            kind,
            len: span.len,
            lo: span.lo,
        }
    }

    /// Returns an `Eof` token positioned at the end of the given source.
    pub fn eof_for(src: &str) -> Token {
        Token::new(TokenKind::Eof, Span::new_of_length(src.len(), 0))
    }

    pub fn span(&self) -> Span {
        Span {
            len: self.len,
            lo: self.lo,
        }
    }

    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::Eof
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Token({:?}, {})", self.kind, self.span())
    }
}

#[derive(Copy, Clone, PartialEq, Eq)]
pub struct Span {
    pub len: u32,
    pub lo: usize,
}

impl Span {
    pub fn new_of_bounds(Range { start: lo, end: hi }: Range<usize>) -> Span {
        debug_assert!(hi >= lo);
        Self::new_of_length(lo, u32::try_from(hi - lo).unwrap())
    }

    pub fn new_of_length(lo: usize, len: u32) -> Span {
        Span { len, lo }
    }

    /// Returns the span covering both `self` and `other`.
    pub fn to(self, other: Span) -> Span {
        let lo = self.lo.min(other.lo);
        let hi = (self.lo + self.len as usize).max(other.lo + other.len as usize);
        Span::new_of_bounds(lo..hi)
    }

    /// Shifts the lower and upper bounds by the provided deltas.
    pub fn offset(self, lo: i32, hi: i32) -> Span {
        let new_lo = self.lo.checked_add_signed(lo as isize).unwrap();
        let new_hi = (self.lo + self.len as usize)
            .checked_add_signed(hi as isize)
            .unwrap();
        Span::new_of_bounds(new_lo..new_hi)
    }

    pub fn substr(self, src: &str) -> &str {
        &src[self.lo..self.lo + self.len as usize]
    }

    /// Wraps the provided value with this span.
    pub fn wrap<T>(self, inner: T) -> Spanned<T> {
        Spanned { span: self, inner }
    }

    /// Computes the 1-based line and column of the span's start.
    pub fn line_col(self, src: &str) -> (usize, usize) {
        let upto = &src[..self.lo.min(src.len())];
        let line = upto.bytes().filter(|&b| b == b'\n').count() + 1;
        let col = upto.len() - upto.rfind('\n').map_or(0, |i| i + 1) + 1;
        (line, col)
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Span({self}, len: {})", self.len)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lo = self.lo;
        let hi = lo + self.len as usize;
        write!(f, "{lo}..{hi}")
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Spanned<T> {
    pub span: Span,
    pub inner: T,
}

// Token kinds carry no payload; literal payloads are re-extracted from the
// source using the token's span (see `lexer::extract`).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TokenKind {
    // Keywords
    And,
    Class,
    Def,
    Elif,
    Else,
    False,
    For,
    If,
    Not,
    Or,
    Return,
    SelfKw,
    Super,
    NoneKw,
    True,
    While,

    // Punctuation
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Comma,
    Dot,
    Colon,
    Semicolon,

    // Operators
    Plus,
    PlusEq,
    Minus,
    MinusEq,
    /// `->`
    Arrow,
    Star,
    StarEq,
    /// `**`
    StarStar,
    StarStarEq,
    Slash,
    SlashEq,
    /// `//`
    SlashSlash,
    SlashSlashEq,
    Percent,
    PercentEq,
    /// `:=`
    ColonEq,
    Pipe,
    PipeEq,
    PipePipe,
    Amp,
    AmpEq,
    AmpAmp,
    Caret,
    CaretEq,
    Tilde,
    Bang,
    BangEq,
    Eq,
    EqEq,
    Less,
    LessEq,
    /// `<<`
    Shl,
    ShlEq,
    Greater,
    GreaterEq,
    /// `>>`
    Shr,
    ShrEq,

    // Literals
    Int,
    Float,
    Str,
    /// A string literal containing at least one backslash escape.
    EscapedStr,
    Identifier,

    // Structural (indentation-sensitive layout)
    Indent,
    Dedent,
    Newline,

    // Trivia
    Whitespace,
    Comment,

    Eof,

    // Errors
    ErrorUnexpectedChar,
    ErrorUnterminatedString,
    ErrorIndent,
    ErrorMalformedNumber,
}

impl TokenKind {
    /// Trivia tokens are skipped by the parser. Note that `Newline`, `Indent`
    /// and `Dedent` are *not* trivia: the grammar is layout-sensitive.
    pub fn is_trivia(self) -> bool {
        matches!(self, TokenKind::Whitespace | TokenKind::Comment)
    }

    pub fn is_error(self) -> bool {
        matches!(
            self,
            TokenKind::ErrorUnexpectedChar
                | TokenKind::ErrorUnterminatedString
                | TokenKind::ErrorIndent
                | TokenKind::ErrorMalformedNumber
        )
    }
}

pub static KEYWORDS: phf::Map<&'static str, TokenKind> = phf::phf_map! {
    "and" => TokenKind::And,
    "class" => TokenKind::Class,
    "def" => TokenKind::Def,
    "elif" => TokenKind::Elif,
    "else" => TokenKind::Else,
    "False" => TokenKind::False,
    "for" => TokenKind::For,
    "if" => TokenKind::If,
    "not" => TokenKind::Not,
    "or" => TokenKind::Or,
    "return" => TokenKind::Return,
    "self" => TokenKind::SelfKw,
    "super" => TokenKind::Super,
    "None" => TokenKind::NoneKw,
    "True" => TokenKind::True,
    "while" => TokenKind::While,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_cover_and_offset() {
        let a = Span::new_of_bounds(2..5);
        let b = Span::new_of_bounds(8..10);
        assert_eq!(a.to(b), Span::new_of_bounds(2..10));
        assert_eq!(b.to(a), Span::new_of_bounds(2..10));
        assert_eq!(a.offset(1, -1), Span::new_of_bounds(3..4));
    }

    #[test]
    fn span_line_col() {
        let src = "ab\ncd\nef";
        assert_eq!(Span::new_of_length(0, 1).line_col(src), (1, 1));
        assert_eq!(Span::new_of_length(4, 1).line_col(src), (2, 2));
        assert_eq!(Span::new_of_length(6, 2).line_col(src), (3, 1));
    }

    #[test]
    fn keyword_table() {
        assert_eq!(KEYWORDS.get("def"), Some(&TokenKind::Def));
        assert_eq!(KEYWORDS.get("None"), Some(&TokenKind::NoneKw));
        // Keywords are case sensitive; `none` is a plain identifier.
        assert_eq!(KEYWORDS.get("none"), None);
    }
}
