//! Expression parsing, lowest precedence first:
//! `||`, `&&`, equality, relational, additive, multiplicative, unary, postfix

use crate::ast::*;
use crate::error::ParseError;
use crate::parser::Parser;
use p4_error::Spanned;
use p4_lexer::{Keyword, TokenKind};

type Level<'src> = fn(&mut Parser<'src>) -> Result<Expr, ParseError>;

fn binary(left: Expr, op: BinOp, right: Expr) -> Expr {
    let span = left.span().merge(right.span());
    Expr::Binary {
        left: Box::new(left),
        op,
        right: Box::new(right),
        span,
    }
}

fn or_op(kind: &TokenKind) -> Option<BinOp> {
    matches!(kind, TokenKind::OrOr).then_some(BinOp::Or)
}

fn and_op(kind: &TokenKind) -> Option<BinOp> {
    matches!(kind, TokenKind::AndAnd).then_some(BinOp::And)
}

fn equality_op(kind: &TokenKind) -> Option<BinOp> {
    match kind {
        TokenKind::EqEq => Some(BinOp::Eq),
        TokenKind::Ne => Some(BinOp::Ne),
        _ => None,
    }
}

fn relational_op(kind: &TokenKind) -> Option<BinOp> {
    match kind {
        TokenKind::Lt => Some(BinOp::Lt),
        TokenKind::Gt => Some(BinOp::Gt),
        TokenKind::Le => Some(BinOp::Le),
        TokenKind::Ge => Some(BinOp::Ge),
        _ => None,
    }
}

fn additive_op(kind: &TokenKind) -> Option<BinOp> {
    match kind {
        TokenKind::Plus => Some(BinOp::Add),
        TokenKind::Minus => Some(BinOp::Sub),
        _ => None,
    }
}

fn multiplicative_op(kind: &TokenKind) -> Option<BinOp> {
    match kind {
        TokenKind::Star => Some(BinOp::Mul),
        TokenKind::Slash => Some(BinOp::Div),
        TokenKind::Percent => Some(BinOp::Mod),
        _ => None,
    }
}

impl<'src> Parser<'src> {
    /// Parses an expression
    pub fn parse_expression(&mut self) -> Result<Expr, ParseError> {
        self.nested("less deeply nested expression", Self::parse_or)
    }

    /// Parses one left-associative level
    fn parse_left_assoc(
        &mut self,
        operand: Level<'src>,
        operator: fn(&TokenKind) -> Option<BinOp>,
    ) -> Result<Expr, ParseError> {
        let mut left = operand(self)?;

        while let Some(op) = operator(&self.peek().kind) {
            self.advance();
            let right = operand(self)?;
            left = binary(left, op, right);
        }

        Ok(left)
    }

    /// Parses one non-associative level: at most one operator
    fn parse_non_assoc(
        &mut self,
        operand: Level<'src>,
        operator: fn(&TokenKind) -> Option<BinOp>,
    ) -> Result<Expr, ParseError> {
        let left = operand(self)?;

        let Some(op) = operator(&self.peek().kind) else {
            return Ok(left);
        };
        let op_position = self.advance().position();
        let right = operand(self)?;

        if let Some(next) = operator(&self.peek().kind) {
            return Err(ParseError::NonAssociative {
                operator: next.as_str().to_string(),
                previous: op.as_str().to_string(),
                position: self.peek().position(),
                previous_position: op_position,
            });
        }

        Ok(binary(left, op, right))
    }

    fn parse_or(&mut self) -> Result<Expr, ParseError> {
        self.parse_left_assoc(Self::parse_and, or_op)
    }

    fn parse_and(&mut self) -> Result<Expr, ParseError> {
        self.parse_left_assoc(Self::parse_equality, and_op)
    }

    fn parse_equality(&mut self) -> Result<Expr, ParseError> {
        self.parse_non_assoc(Self::parse_relational, equality_op)
    }

    fn parse_relational(&mut self) -> Result<Expr, ParseError> {
        self.parse_non_assoc(Self::parse_additive, relational_op)
    }

    fn parse_additive(&mut self) -> Result<Expr, ParseError> {
        self.parse_left_assoc(Self::parse_multiplicative, additive_op)
    }

    fn parse_multiplicative(&mut self) -> Result<Expr, ParseError> {
        self.parse_left_assoc(Self::parse_unary, multiplicative_op)
    }

    /// Parses unary operators: `-` and `!`
    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        let op = match self.peek().kind {
            TokenKind::Minus => UnaryOp::Neg,
            TokenKind::Bang => UnaryOp::Not,
            _ => return self.parse_postfix(),
        };

        let start = self.advance().span;
        let operand = self.nested("less deeply nested expression", Self::parse_unary)?;

        Ok(Expr::Unary {
            op,
            span: start.merge(operand.span()),
            operand: Box::new(operand),
        })
    }

    /// Parses calls and indexing: `f(x)[0](y)`
    pub(crate) fn parse_postfix(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.parse_primary()?;

        loop {
            if self.match_token(&TokenKind::LParen) {
                let args = self.parse_arguments()?;
                let close = self.expect(&TokenKind::RParen, "`,` or `)` after argument")?;
                expr = Expr::Call {
                    span: expr.span().merge(close.span),
                    callee: Box::new(expr),
                    args,
                };
            } else if self.match_token(&TokenKind::LBracket) {
                let index = self.parse_expression()?;
                let close = self.expect(&TokenKind::RBracket, "`]`")?;
                expr = Expr::Index {
                    span: expr.span().merge(close.span),
                    base: Box::new(expr),
                    index: Box::new(index),
                };
            } else {
                break;
            }
        }

        Ok(expr)
    }

    fn parse_arguments(&mut self) -> Result<Vec<Expr>, ParseError> {
        let mut args = Vec::new();

        if self.check(&TokenKind::RParen) {
            return Ok(args);
        }

        loop {
            args.push(self.parse_expression()?);
            if !self.match_token(&TokenKind::Comma) {
                break;
            }
        }

        Ok(args)
    }

    /// Parses primary expressions
    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let token = self.peek().clone();

        match token.kind {
            TokenKind::IntLit(n) => {
                self.advance();
                Ok(Expr::IntLit(n, token.span))
            }
            TokenKind::FloatLit(n) => {
                self.advance();
                Ok(Expr::FloatLit(n, token.span))
            }
            TokenKind::StringLit(s) => {
                self.advance();
                Ok(Expr::StringLit(s, token.span))
            }
            TokenKind::BoolLit(b) => {
                self.advance();
                Ok(Expr::BoolLit(b, token.span))
            }
            TokenKind::Ident => {
                self.advance();
                Ok(Expr::Ident(Identifier::new(token.text, token.span)))
            }
            TokenKind::Keyword(Keyword::Input) => {
                self.check_vocabulary(&token)?;
                self.advance();
                Ok(Expr::Input(token.span))
            }
            TokenKind::LParen => {
                self.advance();
                let expr = self.parse_expression()?;
                self.expect(&TokenKind::RParen, "`)`")?;
                Ok(expr)
            }
            TokenKind::LBracket => self.parse_array_literal(),
            _ => Err(self.error_at_current("expression")),
        }
    }

    /// Parse: `[]` or `[e1, e2, ...]`
    fn parse_array_literal(&mut self) -> Result<Expr, ParseError> {
        let open = self.expect(&TokenKind::LBracket, "`[`")?.span;

        let mut elements = Vec::new();
        if !self.check(&TokenKind::RBracket) {
            loop {
                elements.push(self.parse_expression()?);
                if !self.match_token(&TokenKind::Comma) {
                    break;
                }
            }
        }

        let close = self.expect(&TokenKind::RBracket, "`,` or `]`")?.span;
        Ok(Expr::ArrayLit(elements, open.merge(close)))
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::*;
    use crate::error::ParseError;
    use crate::parser::Parser;
    use p4_error::Spanned;
    use p4_lexer::tokenize;

    fn parse_expr(source: &str) -> Result<Expr, ParseError> {
        let tokens = tokenize(source).expect("source should lex");
        let mut parser = Parser::new(tokens);
        parser.parse_expression()
    }

    fn expr(source: &str) -> Expr {
        parse_expr(source).expect("expression should parse")
    }

    /// Fully parenthesized form, for comparing tree shapes
    fn shape(expr: &Expr) -> String {
        match expr {
            Expr::IntLit(n, _) => n.to_string(),
            Expr::FloatLit(n, _) => n.to_string(),
            Expr::StringLit(s, _) => format!("{:?}", s),
            Expr::BoolLit(b, _) => b.to_string(),
            Expr::Ident(id) => id.name.clone(),
            Expr::Input(_) => "input".to_string(),
            Expr::ArrayLit(items, _) => {
                let items: Vec<_> = items.iter().map(shape).collect();
                format!("[{}]", items.join(", "))
            }
            Expr::Unary { op, operand, .. } => format!("({}{})", op.as_str(), shape(operand)),
            Expr::Binary { left, op, right, .. } => {
                format!("({} {} {})", shape(left), op.as_str(), shape(right))
            }
            Expr::Call { callee, args, .. } => {
                let args: Vec<_> = args.iter().map(shape).collect();
                format!("{}({})", shape(callee), args.join(", "))
            }
            Expr::Index { base, index, .. } => format!("{}[{}]", shape(base), shape(index)),
        }
    }

    #[test]
    fn test_precedence() {
        assert_eq!(shape(&expr("1 + 2 * 3")), "(1 + (2 * 3))");
        assert_eq!(shape(&expr("a || b && c")), "(a || (b && c))");
        assert_eq!(shape(&expr("a + 1 < b * 2")), "((a + 1) < (b * 2))");
        assert_eq!(shape(&expr("a < b == c > d")), "((a < b) == (c > d))");
        assert_eq!(shape(&expr("x == 1 && y != 2 || z")), "(((x == 1) && (y != 2)) || z)");
        assert_eq!(shape(&expr("(1 + 2) * 3")), "((1 + 2) * 3)");
    }

    #[test]
    fn test_left_associativity() {
        assert_eq!(shape(&expr("a - b - c")), "((a - b) - c)");
        assert_eq!(shape(&expr("a / b % c * d")), "(((a / b) % c) * d)");
        assert_eq!(shape(&expr("a || b || c")), "((a || b) || c)");
        assert_eq!(shape(&expr("a && b && c")), "((a && b) && c)");
    }

    #[test]
    fn test_unary() {
        assert_eq!(shape(&expr("-x * 2")), "((-x) * 2)");
        assert_eq!(shape(&expr("!!done")), "(!(!done))");
        assert_eq!(shape(&expr("- -3")), "(-(-3))");
        assert_eq!(shape(&expr("-f(x)[1]")), "(-f(x)[1])");
    }

    #[test]
    fn test_postfix_chain() {
        assert_eq!(shape(&expr("grid[i][j]")), "grid[i][j]");
        assert_eq!(shape(&expr("f(1, g(2))[0](x)")), "f(1, g(2))[0](x)");
        assert_eq!(shape(&expr("f()")), "f()");
        assert_eq!(shape(&expr("[1, 2][0]")), "[1, 2][0]");
    }

    #[test]
    fn test_primaries() {
        assert_eq!(shape(&expr("[]")), "[]");
        assert_eq!(shape(&expr("[1, [2, 3]]")), "[1, [2, 3]]");
        assert_eq!(shape(&expr("input")), "input");
        assert_eq!(shape(&expr("indskriv")), "input");
        assert_eq!(shape(&expr("\"hi\"")), "\"hi\"");
        assert_eq!(shape(&expr("true && false")), "(true && false)");
        assert!(matches!(expr("2.5"), Expr::FloatLit(n, _) if n == 2.5));
    }

    #[test]
    fn test_non_associative_relational() {
        match parse_expr("1 < x < 10") {
            Err(ParseError::NonAssociative {
                operator,
                previous,
                position,
                previous_position,
            }) => {
                assert_eq!(operator, "<");
                assert_eq!(previous, "<");
                assert_eq!(position.column, 7);
                assert_eq!(previous_position.column, 3);
            }
            other => panic!("expected NonAssociative, got {:?}", other),
        }
    }

    #[test]
    fn test_non_associative_equality() {
        match parse_expr("a == b != c") {
            Err(ParseError::NonAssociative { operator, previous, .. }) => {
                assert_eq!(operator, "!=");
                assert_eq!(previous, "==");
            }
            other => panic!("expected NonAssociative, got {:?}", other),
        }
    }

    #[test]
    fn test_parenthesized_comparisons_chain() {
        assert_eq!(shape(&expr("(a < b) < c")), "((a < b) < c)");
        assert_eq!(shape(&expr("a == (b == c)")), "(a == (b == c))");
    }

    #[test]
    fn test_trailing_comma_rejected() {
        assert!(matches!(
            parse_expr("[1, 2,]"),
            Err(ParseError::UnexpectedToken { .. })
        ));
        assert!(matches!(
            parse_expr("f(1,)"),
            Err(ParseError::UnexpectedToken { .. })
        ));
    }

    #[test]
    fn test_missing_operand() {
        match parse_expr("1 +") {
            Err(ParseError::UnexpectedEof { expected, .. }) => assert_eq!(expected, "expression"),
            other => panic!("expected UnexpectedEof, got {:?}", other),
        }
        match parse_expr("(1 + 2") {
            Err(ParseError::UnexpectedEof { expected, .. }) => assert_eq!(expected, "`)`"),
            other => panic!("expected UnexpectedEof, got {:?}", other),
        }
        assert!(matches!(
            parse_expr("* 2"),
            Err(ParseError::UnexpectedToken { .. })
        ));
    }

    #[test]
    fn test_spans_cover_operands() {
        let e = expr("ab + f(c)");
        let span = e.span();
        assert_eq!((span.start.column, span.end.column), (1, 10));
    }

    #[test]
    fn test_deep_nesting_is_an_error() {
        let shallow = format!("{}1{}", "(".repeat(40), ")".repeat(40));
        assert!(matches!(expr(&shallow), Expr::IntLit(1, _)));

        match parse_expr(&"(".repeat(10_000)) {
            Err(ParseError::UnexpectedToken { expected, position, .. }) => {
                assert_eq!(expected, "less deeply nested expression");
                assert_eq!(position.column, crate::MAX_NESTING as u32 + 1);
            }
            other => panic!("expected nesting error, got {:?}", other),
        }

        let negations = format!("{}x", "-".repeat(10_000));
        assert!(parse_expr(&negations).is_err());

        let arrays = format!("{}1", "[".repeat(10_000));
        assert!(parse_expr(&arrays).is_err());
    }
}
