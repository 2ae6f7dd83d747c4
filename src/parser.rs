use crate::{
    ast::{
        BinaryOperator, Expr, ExprKind, Ident, LogicalOperator, Param, Stmt, StmtKind, TypeName,
        UnaryOperator,
    },
    lexer::{self, extract},
    token::{Span, Spanned, Token, TokenKind},
    util::intern::Interner,
};

type Result<T, E = ()> = std::result::Result<T, E>;

pub type ParseResult<T> = Result<T, (T, Vec<Spanned<Error>>)>;

pub fn parse_program(
    src: &str,
    tokens: &mut Vec<Token>,
    ident_interner: &mut Interner,
) -> ParseResult<Vec<Stmt>> {
    parse(src, tokens, ident_interner, Parser::parse_program, Vec::new)
}

pub fn parse_expr(
    src: &str,
    tokens: &mut Vec<Token>,
    ident_interner: &mut Interner,
) -> ParseResult<Expr> {
    let default = || Expr::dummy(Span::new_of_length(src.len(), 0));
    parse(src, tokens, ident_interner, Parser::parse_expr, default)
}

fn parse<'src, 'tok, 'ident, T>(
    src: &'src str,
    tokens: &'tok mut Vec<Token>,
    ident_interner: &'ident mut Interner,
    f: impl for<'a> FnOnce(&'a mut Parser<'src, 'tok, 'ident>) -> Result<T>,
    default: impl FnOnce() -> T,
) -> ParseResult<T> {
    assert!(tokens.is_empty());

    // Lex and parse
    lexer::lex(src, tokens);
    let mut p = Parser::new(src, tokens, ident_interner);
    let parse_result = f(&mut p);

    // Error handling
    let success = parse_result.is_ok();
    let el = parse_result.unwrap_or_else(|()| default());
    if p.errors.is_empty() {
        assert!(success);
        Ok(el)
    } else {
        Err((el, p.errors))
    }
}

struct Parser<'src, 'tok, 'ident> {
    src: &'src str,
    tokens: &'tok mut Vec<Token>,
    ident_interner: &'ident mut Interner,
    cursor: usize,
    errors: Vec<Spanned<Error>>,
}

/// Statement boundaries the parser resynchronizes at after a syntax error.
const SYNC_STOP: &[TokenKind] = &[
    TokenKind::Def,
    TokenKind::Return,
    TokenKind::Class,
    TokenKind::If,
    TokenKind::Else,
    TokenKind::While,
];

impl Parser<'_, '_, '_> {
    fn parse_program(&mut self) -> Result<Vec<Stmt>> {
        let mut stmts = Vec::with_capacity(16);
        loop {
            while self.take(TokenKind::Newline) {}
            if !self.except([]) {
                break;
            }
            if let Ok(stmt) = self.synchronize(
                &[TokenKind::Newline, TokenKind::Semicolon],
                SYNC_STOP,
                Parser::parse_stmt,
            ) {
                stmts.push(stmt);
            }
        }
        self.consume(TokenKind::Eof)?;
        Ok(stmts)
    }

    fn parse_stmt(&mut self) -> Result<Stmt> {
        match self.peek().kind {
            TokenKind::Def => self.parse_function(),
            TokenKind::Return => self.parse_return(),
            TokenKind::Identifier if self.is_assignment() => self.parse_assign(),
            _ => {
                let expr = self.parse_expr()?;
                let span = expr.span;
                self.end_of_stmt()?;
                Ok(Stmt {
                    kind: StmtKind::Expr(expr),
                    span,
                })
            }
        }
    }

    /// An identifier opens an assignment statement when followed by `=`
    /// (plain) or `:` (type-annotated).
    fn is_assignment(&self) -> bool {
        matches!(self.peek_second().kind, TokenKind::Eq | TokenKind::Colon)
    }

    // def NAME '(' [param (',' param)*] ')' ['->' type] ':' block
    fn parse_function(&mut self) -> Result<Stmt> {
        let def = self.consume(TokenKind::Def)?;
        let name = self.parse_ident()?;

        self.consume(TokenKind::LParen)?;
        let params = self.parse_list(TokenKind::RParen, TokenKind::Comma, None, |p| {
            p.parse_param()
        })?;
        self.consume(TokenKind::RParen)?;

        let return_ty = if self.take(TokenKind::Arrow) {
            Some(self.parse_type()?)
        } else {
            None
        };

        let colon = self.consume(TokenKind::Colon)?;
        let body = self.parse_block()?;

        let end = body.last().map_or(colon.span(), |stmt| stmt.span);
        Ok(Stmt {
            kind: StmtKind::Function {
                name,
                params,
                return_ty,
                body,
            },
            span: def.span().to(end),
        })
    }

    fn parse_param(&mut self) -> Result<Param> {
        let name = self.parse_ident()?;
        self.consume(TokenKind::Colon)?;
        let ty = self.parse_type()?;
        Ok(Param { name, ty })
    }

    // NEWLINE INDENT stmt+ DEDENT
    fn parse_block(&mut self) -> Result<Vec<Stmt>> {
        self.consume(TokenKind::Newline)?;
        let indent = self.consume(TokenKind::Indent)?;

        let mut stmts = Vec::with_capacity(4);
        while self.except([TokenKind::Dedent]) {
            if self.take(TokenKind::Newline) {
                continue;
            }
            let Ok(stmt) =
                self.synchronize(&[TokenKind::Newline], &[TokenKind::Dedent], Parser::parse_stmt)
            else {
                break;
            };
            stmts.push(stmt);
        }
        // The file may simply end; `Eof` closes the block as well.
        self.take(TokenKind::Dedent);

        if stmts.is_empty() && self.errors.is_empty() {
            self.error(indent.span().wrap(Error::EmptyBlock));
            return Err(());
        }
        Ok(stmts)
    }

    // return [expr] end
    fn parse_return(&mut self) -> Result<Stmt> {
        let ret = self.consume(TokenKind::Return)?;
        let value = if self.at_end_of_stmt() {
            None
        } else {
            Some(self.parse_expr()?)
        };
        let span = value
            .as_ref()
            .map_or(ret.span(), |expr| ret.span().to(expr.span));
        self.end_of_stmt()?;
        Ok(Stmt {
            kind: StmtKind::Return(value),
            span,
        })
    }

    // NAME [':' type] '=' expr end
    fn parse_assign(&mut self) -> Result<Stmt> {
        let name = self.parse_ident()?;
        let annotation = if self.take(TokenKind::Colon) {
            Some(self.parse_type()?)
        } else {
            None
        };
        self.consume(TokenKind::Eq)?;
        let value = self.parse_expr()?;
        let span = name.span.to(value.span);
        self.end_of_stmt()?;
        Ok(Stmt {
            kind: StmtKind::Assign {
                name,
                annotation,
                value,
            },
            span,
        })
    }

    fn parse_type(&mut self) -> Result<TypeName> {
        let token = self.peek();
        let name = match token.kind {
            TokenKind::Identifier => extract::ident(token, self.src),
            // `None` is a keyword, yet also a valid return annotation.
            TokenKind::NoneKw => "None",
            _ => {
                self.error(token.span().wrap(Error::Unexpected {
                    actual: token.kind,
                    expected: TokenKind::Identifier,
                }));
                return Err(());
            }
        };
        self.advance();
        Ok(TypeName {
            name: self.ident_interner.intern(name),
            span: token.span(),
        })
    }

    fn parse_ident(&mut self) -> Result<Ident> {
        let token = self.consume(TokenKind::Identifier)?;
        Ok(Ident {
            name: self.ident_interner.intern(extract::ident(token, self.src)),
            span: token.span(),
        })
    }

    fn parse_expr(&mut self) -> Result<Expr> {
        self.parse_expr_bp(0)
    }

    fn parse_expr_bp(&mut self, min_bp: u8) -> Result<Expr> {
        let lhs_token = self.advance();
        let mut lhs = self.parse_nud(lhs_token)?;

        loop {
            let op_token = self.peek();

            if let Some((lbp, rbp)) = Self::infix_binding_power(op_token.kind) {
                if lbp < min_bp {
                    // Operator binds less tightly than the minimum required
                    break;
                }

                self.advance(); // Operator
                lhs = self.parse_led(op_token, lhs, rbp)?;
            } else {
                // Not an infix operator or binds too loosely
                break;
            }
        }

        Ok(lhs)
    }

    /// nud: Parses tokens that start an expression
    /// (prefix operators, literals, grouping)
    fn parse_nud(&mut self, token: Token) -> Result<Expr> {
        let (kind, span) = match token.kind {
            TokenKind::Identifier => {
                let ident = Ident {
                    name: self.ident_interner.intern(extract::ident(token, self.src)),
                    span: token.span(),
                };
                (ExprKind::Variable(ident), token.span())
            }
            TokenKind::Int => {
                let parsed = match extract::int(token, self.src) {
                    Ok(parsed) => parsed,
                    Err(e) => {
                        self.error(token.span().wrap(Error::IntLiteral(e)));
                        return Err(());
                    }
                };
                (ExprKind::Int(parsed), token.span())
            }
            TokenKind::Float => {
                let parsed = match extract::float(token, self.src) {
                    Ok(parsed) => parsed,
                    Err(e) => {
                        self.error(token.span().wrap(Error::FloatLiteral(e)));
                        return Err(());
                    }
                };
                (ExprKind::Float(parsed), token.span())
            }
            TokenKind::Str => (
                ExprKind::Str(extract::string(token, self.src)),
                token.span(),
            ),
            TokenKind::EscapedStr => (
                ExprKind::Str(extract::escaped_string(token, self.src)),
                token.span(),
            ),
            TokenKind::True => (ExprKind::Bool(true), token.span()),
            TokenKind::False => (ExprKind::Bool(false), token.span()),
            TokenKind::NoneKw => (ExprKind::None, token.span()),

            // Grouping: ( expr )
            TokenKind::LParen => {
                let expr = self.parse_expr()?;
                let end = self.consume(TokenKind::RParen)?;
                (ExprKind::Group(Box::new(expr)), token.span().to(end.span()))
            }

            // Prefix operators: not, unary + and -
            kind @ (TokenKind::Not | TokenKind::Plus | TokenKind::Minus) => {
                let op = match kind {
                    TokenKind::Not => UnaryOperator::Not,
                    TokenKind::Plus => UnaryOperator::Pos,
                    TokenKind::Minus => UnaryOperator::Neg,
                    _ => unreachable!(),
                };
                // SAFETY: Should have prefix due to above match
                let ((), rbp) = Self::prefix_binding_power(kind).unwrap();

                let expr = self.parse_expr_bp(rbp)?;

                let span = token.span().to(expr.span);
                let unary = ExprKind::Unary {
                    op,
                    expr: Box::new(expr),
                };
                (unary, span)
            }

            kind if kind.is_error() => {
                self.error(token.span().wrap(Error::Lexer(kind)));
                return Err(());
            }

            other => {
                let error = Error::UnexpectedTokenInExpr { token: other };
                self.error(token.span().wrap(error));
                return Err(());
            }
        };

        Ok(Expr { kind, span })
    }

    /// led: Parses tokens that follow a left-hand-side expression
    /// (infix/postfix operators)
    fn parse_led(&mut self, op_token: Token, lhs: Expr, rbp: u8) -> Result<Expr> {
        let (kind, span) = match op_token.kind {
            // Binary operators
            kind @ (TokenKind::Plus
            | TokenKind::Minus
            | TokenKind::Star
            | TokenKind::Slash
            | TokenKind::StarStar
            | TokenKind::EqEq
            | TokenKind::BangEq
            | TokenKind::Less
            | TokenKind::LessEq
            | TokenKind::Greater
            | TokenKind::GreaterEq) => {
                let op = match kind {
                    TokenKind::Plus => BinaryOperator::Add,
                    TokenKind::Minus => BinaryOperator::Sub,
                    TokenKind::Star => BinaryOperator::Mul,
                    TokenKind::Slash => BinaryOperator::Div,
                    TokenKind::StarStar => BinaryOperator::Pow,
                    TokenKind::EqEq => BinaryOperator::Eq,
                    TokenKind::BangEq => BinaryOperator::Neq,
                    TokenKind::Less => BinaryOperator::Lt,
                    TokenKind::LessEq => BinaryOperator::Leq,
                    TokenKind::Greater => BinaryOperator::Gt,
                    TokenKind::GreaterEq => BinaryOperator::Geq,
                    _ => unreachable!(),
                };
                // Parse right operand with correct precedence
                let rhs = self.parse_expr_bp(rbp)?;

                let span = lhs.span.to(rhs.span);
                let binary = ExprKind::Binary {
                    op,
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                };
                (binary, span)
            }

            kind @ (TokenKind::And | TokenKind::Or) => {
                let op = match kind {
                    TokenKind::And => LogicalOperator::And,
                    TokenKind::Or => LogicalOperator::Or,
                    _ => unreachable!(),
                };
                let rhs = self.parse_expr_bp(rbp)?;

                let span = lhs.span.to(rhs.span);
                let logical = ExprKind::Logical {
                    op,
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                };
                (logical, span)
            }

            // Call: NAME '(' [expr (',' expr)*] ')'
            TokenKind::LParen => {
                // Only a bare identifier can be called.
                let ExprKind::Variable(callee) = lhs.kind else {
                    self.error(lhs.span.wrap(Error::InvalidCallee));
                    return Err(());
                };

                // LParen was already consumed above.
                let args = self.parse_list(TokenKind::RParen, TokenKind::Comma, None, |p| {
                    p.parse_expr()
                })?;
                let end = self.consume(TokenKind::RParen)?;

                let call = ExprKind::Call { callee, args };
                (call, lhs.span.to(end.span()))
            }

            other => {
                let error = Error::UnexpectedOperator { actual: other };
                self.error(op_token.span().wrap(error));
                return Err(());
            }
        };

        Ok(Expr { kind, span })
    }

    /// Parses `item (delim item)*` until `end_delim` is found. Does **NOT**
    /// consume the end delimiter.
    fn parse_list<T>(
        &mut self,
        end_delim: TokenKind,
        separator: TokenKind,
        require_one: Option<Error>,
        parse_item: impl Fn(&mut Self) -> Result<T>,
    ) -> Result<Vec<T>> {
        debug_assert_ne!(end_delim, separator);

        let mut items = Vec::new();
        while self.except([end_delim]) {
            let item = self.synchronize(&[separator], &[end_delim], |p| parse_item(p))?;
            items.push(item);

            // After consuming an item, we must consume the separator.
            if !self.take(separator) {
                if self.is(end_delim) {
                    // If, however, it is not present, then we check if the end
                    // delimiter is current. If so, we can stop.
                    break;
                }
                // However, if the current token is not the separator nor
                // the end delimiter, we must return an error.
                let c = self.peek();
                self.error(c.span().wrap(Error::UnexpectedAny {
                    actual: c.kind,
                    expected: Box::from([separator, end_delim]),
                }));
            }
        }

        let next = self.peek();
        assert!(next.kind == end_delim || next.kind == TokenKind::Eof);
        if let Some(error) = require_one {
            if items.is_empty() {
                self.error(next.span().wrap(error));
                return Err(());
            }
        }

        Ok(items)
    }

    // Binding powers realize the cascade
    //   or < and < not < comparison < additive < multiplicative
    //      < unary < power < call
    fn infix_binding_power(kind: TokenKind) -> Option<(u8, u8)> {
        let bp = match kind {
            TokenKind::Or => (1, 2),
            TokenKind::And => (3, 4),

            // Comparisons (left-associative)
            TokenKind::EqEq
            | TokenKind::BangEq
            | TokenKind::Less
            | TokenKind::LessEq
            | TokenKind::Greater
            | TokenKind::GreaterEq => (7, 8),

            // Addition/Subtraction (left-associative)
            TokenKind::Plus | TokenKind::Minus => (9, 10),

            // Multiplication/Division (left-associative)
            TokenKind::Star | TokenKind::Slash => (11, 12),

            // Exponentiation (right-associative, binds tighter than unary
            // minus on its left, looser on its right: -2 ** 2 is -(2 ** 2))
            TokenKind::StarStar => (16, 15),

            // Call
            TokenKind::LParen => (17, 18),

            _ => return None,
        };
        Some(bp)
    }

    fn prefix_binding_power(kind: TokenKind) -> Option<((), u8)> {
        let bp = match kind {
            // `not` sits between `and` and the comparisons
            TokenKind::Not => ((), 5),

            // Unary plus/minus
            TokenKind::Plus | TokenKind::Minus => ((), 13),

            _ => return None,
        };
        Some(bp)
    }

    fn at_end_of_stmt(&self) -> bool {
        matches!(
            self.peek().kind,
            TokenKind::Newline | TokenKind::Semicolon | TokenKind::Dedent | TokenKind::Eof
        )
    }

    /// Consumes a statement terminator. `Dedent` and `Eof` terminate a
    /// statement but are left for the enclosing block to consume.
    fn end_of_stmt(&mut self) -> Result<()> {
        let c = self.peek();
        match c.kind {
            TokenKind::Newline | TokenKind::Semicolon => {
                self.advance();
                Ok(())
            }
            TokenKind::Dedent | TokenKind::Eof => Ok(()),
            actual => {
                self.error(c.span().wrap(Error::ExpectedStatementEnd { actual }));
                Err(())
            }
        }
    }
}

impl Parser<'_, '_, '_> {
    pub fn new<'src, 'tok, 'ident>(
        src: &'src str,
        tokens: &'tok mut Vec<Token>,
        ident_interner: &'ident mut Interner,
    ) -> Parser<'src, 'tok, 'ident> {
        let mut p = Parser {
            src,
            tokens,
            ident_interner,
            cursor: 0,
            errors: Vec::with_capacity(8),
        };
        p.setup();
        p
    }

    /// Adds an error and returns the error sentinel.
    fn error(&mut self, error: Spanned<Error>) {
        self.errors.push(error);
    }

    /// Setups the parser, skipping any trivia if necessary.
    fn setup(&mut self) {
        while self.peek().kind.is_trivia() {
            self.cursor += 1;
        }
    }

    /// Returns the current token.
    #[inline]
    fn peek(&self) -> Token {
        match self.tokens.get(self.cursor) {
            Some(token) => *token,
            None => Token::eof_for(self.src),
        }
    }

    /// Returns the token after the current one, skipping trivia.
    fn peek_second(&self) -> Token {
        let mut i = self.cursor + 1;
        while let Some(token) = self.tokens.get(i) {
            if !token.kind.is_trivia() {
                return *token;
            }
            i += 1;
        }
        Token::eof_for(self.src)
    }

    /// Returns the current token and advances. Skips any trivia.
    fn advance(&mut self) -> Token {
        let c = self.peek(); // Before any advancement
        while {
            self.cursor += 1;
            self.peek().kind.is_trivia()
        } {}
        c
    }

    /// Checks whether the current token matches the given one.
    fn is(&self, expect: TokenKind) -> bool {
        self.peek().kind == expect
    }

    /// Advances if the current token matches the provided one, returning true.
    /// If not, returns false and doesn't advance.
    fn take(&mut self, expect: TokenKind) -> bool {
        if self.is(expect) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Advances if the current token matches the provided one, returning it.
    /// If not, records an error.
    fn consume(&mut self, expect: TokenKind) -> Result<Token> {
        let c = self.peek();
        if self.is(expect) {
            self.advance();
            Ok(c)
        } else {
            self.error(c.span().wrap(Error::Unexpected {
                actual: c.kind,
                expected: expect,
            }));
            Err(())
        }
    }

    /// Returns true while the current token does *not* match one of the
    /// provided ones. [`TokenKind::Eof`] is implicitly included in the list.
    ///
    /// This won't advance the cursor.
    fn except(&mut self, except: impl IntoIterator<Item = TokenKind>) -> bool {
        let c = self.peek();
        for e in except {
            if c.kind == e {
                return false;
            }
        }
        if c.kind == TokenKind::Eof {
            return false;
        }
        true
    }

    fn synchronize<T>(
        &mut self,
        cont_cond: &[TokenKind],
        stop_cond: &[TokenKind],
        mut f: impl FnMut(&mut Self) -> Result<T>,
    ) -> Result<T> {
        'outer: loop {
            if let Ok(val) = f(self) {
                break Ok(val);
            }
            // In the case of an error, try to advance until find a token
            // specified in `cont_cond` (in which case we retry) or in
            // `stop_cond` (in which case we stop).
            loop {
                let c = self.peek().kind;
                // Check whether must stop
                if c == TokenKind::Eof || stop_cond.contains(&c) {
                    break 'outer Err(());
                }
                // The token advancement must be AFTER stopping. If we break
                // out, the caller should advance (to follow the convention).
                self.advance();
                // Check whether can retry. Retrying right before a stop token
                // (or the end of input) would only manufacture a second error
                // out of the same failure, so stop there instead.
                if cont_cond.contains(&c) {
                    let next = self.peek().kind;
                    if next == TokenKind::Eof || stop_cond.contains(&next) {
                        break 'outer Err(());
                    }
                    continue 'outer;
                }
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Error {
    UnexpectedTokenInExpr {
        token: TokenKind,
    },
    Unexpected {
        actual: TokenKind,
        expected: TokenKind,
    },
    UnexpectedAny {
        actual: TokenKind,
        expected: Box<[TokenKind]>,
    },
    UnexpectedOperator {
        actual: TokenKind,
    },
    ExpectedStatementEnd {
        actual: TokenKind,
    },
    /// Calls are only allowed on bare identifiers.
    InvalidCallee,
    EmptyBlock,
    IntLiteral(extract::LitError),
    FloatLiteral(extract::LitError),
    /// A token kind which holds the [`TokenKind::is_error`] property.
    Lexer(TokenKind),
}

#[cfg(test)]
mod tests {
    use crate::util::test_utils::tree_tests;

    tree_tests!(
        use parser;

        fn test_precedence_addition_vs_multiplication() {
            let expr = "1 + 2 * 3";
            let tree_ok = "
                binary Add (0..9)
                  int 1 (0..1)
                  binary Mul (4..9)
                    int 2 (4..5)
                    int 3 (8..9)
            ";
        }

        fn test_grouping_overrides_precedence() {
            let expr = "(1 + 2) * 3";
            let tree_ok = "
                binary Mul (0..11)
                  group (0..7)
                    binary Add (1..6)
                      int 1 (1..2)
                      int 2 (5..6)
                  int 3 (10..11)
            ";
        }

        fn test_float_literal() {
            let expr = "2.5";
            let tree_ok = "float 2.5 (0..3)";
        }

        fn test_string_literal() {
            let expr = r#""hello\nworld""#;
            let tree_ok = r#"string "hello\nworld" (0..14)"#;
        }

        fn test_none_literal() {
            let expr = "None";
            let tree_ok = "none (0..4)";
        }

        fn test_bool_literals() {
            let expr = "True";
            let tree_ok = "bool true (0..4)";
        }

        fn test_unary_minus_binds_looser_than_power() {
            let expr = "-x ** 2";
            let tree_ok = "
                unary Neg (0..7)
                  binary Pow (1..7)
                    variable x (1..2)
                    int 2 (6..7)
            ";
        }

        fn test_power_is_right_associative() {
            let expr = "2 ** 3 ** 2";
            let tree_ok = "
                binary Pow (0..11)
                  int 2 (0..1)
                  binary Pow (5..11)
                    int 3 (5..6)
                    int 2 (10..11)
            ";
        }

        fn test_logical_cascade() {
            let expr = "not a and b or c";
            let tree_ok = "
                logical Or (0..16)
                  logical And (0..11)
                    unary Not (0..5)
                      variable a (4..5)
                    variable b (10..11)
                  variable c (15..16)
            ";
        }

        fn test_comparison_is_left_associative() {
            let expr = "1 < 2 == True";
            let tree_ok = "
                binary Eq (0..13)
                  binary Lt (0..5)
                    int 1 (0..1)
                    int 2 (4..5)
                  bool true (9..13)
            ";
        }

        fn test_call_with_arguments() {
            let expr = "f(1, x)";
            let tree_ok = "
                call f (0..7)
                  int 1 (2..3)
                  variable x (5..6)
            ";
        }

        fn test_call_requires_bare_identifier() {
            let expr = "(f)(1)";
            let expected_errors = &["0..3: only a bare identifier can be called"];
        }

        fn test_int_literal_out_of_range() {
            let expr = "2147483648";
            let expected_errors = &["0..10: integer literal out of range"];
        }

        fn test_unexpected_token_in_expr() {
            let expr = "1 + *";
            let expected_errors = &["4..5: unexpected token Star in expression"];
        }
    );

    tree_tests!(
        use parser;

        fn test_function_definition() {
            let program = "def main() -> int:\n    x: int = 2 + 3\n    return x\n";
            let tree_ok = "
                function main() -> int (0..50)
                  assign x: int (23..37)
                    binary Add (32..37)
                      int 2 (32..33)
                      int 3 (36..37)
                  return (42..50)
                    variable x (49..50)
            ";
        }

        fn test_function_with_params() {
            let program = "def add(a: int, b: int) -> int:\n    return a + b\n";
            let tree_ok = "
                function add(a: int, b: int) -> int (0..48)
                  return (36..48)
                    binary Add (43..48)
                      variable a (43..44)
                      variable b (47..48)
            ";
        }

        fn test_function_without_return_annotation() {
            let program = "def f():\n    1\n";
            let tree_ok = "
                function f() (0..14)
                  int 1 (13..14)
            ";
        }

        fn test_plain_assignment() {
            let program = "x = 1\n";
            let tree_ok = "
                assign x (0..5)
                  int 1 (4..5)
            ";
        }

        fn test_bare_return() {
            let program = "return\n";
            let tree_ok = "return (0..6)";
        }

        fn test_empty_block_is_an_error() {
            let program = "def f():\n    \n";
            let expected_errors = &["13..14: expected token Indent, but got Newline"];
        }

        fn test_missing_statement_end() {
            let program = "x = 1 2\n";
            let expected_errors = &["6..7: expected end of statement, but got Int"];
        }

        fn test_error_on_the_last_statement_reports_once() {
            let program = "y = 2\nx = )\n";
            let tree_error = "
                assign y (0..5)
                  int 2 (4..5)
            ";
            let expected_errors = &["10..11: unexpected token RParen in expression"];
        }

        fn test_recovers_at_next_statement() {
            let program = "x = )\ny = 2\n";
            let tree_error = "
                assign y (6..11)
                  int 2 (10..11)
            ";
            let expected_errors = &["4..5: unexpected token RParen in expression"];
        }
    );
}
