//! Parser for the P4 language
//!
//! Converts a sequence of tokens into an AST using recursive descent.
//! Expressions live in `expr.rs`; this file covers the header, function
//! definitions, blocks and statements.

use crate::ast::*;
use crate::error::ParseError;
use crate::options::{KeywordPolicy, ParseOptions};
use p4_error::{Position, Span, Spanned};
use p4_lexer::{Keyword, Language, Token, TokenKind};

/// Deepest combined nesting of blocks and expressions accepted
pub const MAX_NESTING: usize = 64;

/// Parser for the P4 language
pub struct Parser<'src> {
    /// Tokens to be parsed, always terminated by `Eof`
    tokens: Vec<Token<'src>>,
    /// Current position
    pos: usize,
    options: ParseOptions,
    /// Declared language, known once the header has been read
    language: Option<Language>,
    /// Blocks and expressions currently open
    depth: usize,
}

impl<'src> Parser<'src> {
    /// Creates a new parser
    pub fn new(mut tokens: Vec<Token<'src>>) -> Self {
        if !tokens.last().is_some_and(Token::is_eof) {
            let end = tokens
                .last()
                .map(|t| t.span.end)
                .unwrap_or_else(Position::start);
            tokens.push(Token::new(TokenKind::Eof, "", Span::point(end)));
        }

        Self {
            tokens,
            pos: 0,
            options: ParseOptions::default(),
            language: None,
            depth: 0,
        }
    }

    pub fn with_options(mut self, options: ParseOptions) -> Self {
        self.options = options;
        self
    }

    // =========================================
    // Helpers
    // =========================================

    /// Returns the token `n` places ahead, or `Eof` past the end
    pub(crate) fn peek_at(&self, n: usize) -> &Token<'src> {
        let last = self.tokens.len() - 1;
        &self.tokens[(self.pos + n).min(last)]
    }

    /// Returns the current token without advancing
    pub(crate) fn peek(&self) -> &Token<'src> {
        self.peek_at(0)
    }

    /// Checks if the current token is of the specified type
    pub(crate) fn check(&self, kind: &TokenKind) -> bool {
        self.peek().is(kind)
    }

    pub(crate) fn check_keyword(&self, keyword: Keyword) -> bool {
        self.peek().kind == TokenKind::Keyword(keyword)
    }

    /// Checks if we've reached the end
    pub(crate) fn is_at_end(&self) -> bool {
        self.peek().is_eof()
    }

    /// Advances to the next token, returning the consumed one
    pub(crate) fn advance(&mut self) -> Token<'src> {
        let token = self.peek().clone();
        if !self.is_at_end() {
            self.pos += 1;
        }
        token
    }

    /// Consumes the token if it matches the expected type
    pub(crate) fn match_token(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Requires a specific token or reports what was expected
    pub(crate) fn expect(&mut self, kind: &TokenKind, expected: &str) -> Result<Token<'src>, ParseError> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.error_at_current(expected))
        }
    }

    /// Requires a keyword, honoring the keyword policy
    pub(crate) fn expect_keyword(&mut self, keyword: Keyword, expected: &str) -> Result<Token<'src>, ParseError> {
        if !self.check_keyword(keyword) {
            return Err(self.error_at_current(expected));
        }
        self.check_vocabulary(self.peek())?;
        Ok(self.advance())
    }

    /// Skips newlines
    fn skip_newlines(&mut self) {
        while self.check(&TokenKind::Newline) {
            self.advance();
        }
    }

    /// Builds the error for the current token not being `expected`
    pub(crate) fn error_at_current(&self, expected: &str) -> ParseError {
        let token = self.peek();
        if token.is_eof() {
            ParseError::UnexpectedEof {
                expected: expected.to_string(),
                position: token.position(),
            }
        } else {
            ParseError::UnexpectedToken {
                expected: expected.to_string(),
                found: token.describe(),
                position: token.position(),
            }
        }
    }

    /// Runs `parse` one nesting level deeper. Past `MAX_NESTING` the
    /// current token is rejected with `expected` instead.
    pub(crate) fn nested<T>(
        &mut self,
        expected: &str,
        parse: impl FnOnce(&mut Self) -> Result<T, ParseError>,
    ) -> Result<T, ParseError> {
        if self.depth >= MAX_NESTING {
            tracing::debug!(depth = self.depth, "nesting limit reached");
            return Err(self.error_at_current(expected));
        }

        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    fn header_error(&self, expected: &str) -> ParseError {
        let token = self.peek();
        ParseError::MalformedHeader {
            expected: expected.to_string(),
            found: token.describe(),
            position: token.position(),
        }
    }

    /// Under [`KeywordPolicy::PerLanguage`], rejects keywords spelled in the
    /// vocabulary the header did not declare
    pub(crate) fn check_vocabulary(&self, token: &Token<'_>) -> Result<(), ParseError> {
        if self.options.keyword_policy != KeywordPolicy::PerLanguage {
            return Ok(());
        }
        let Some(language) = self.language else {
            return Ok(());
        };

        let expected = match token.kind {
            TokenKind::Keyword(keyword) => keyword.spelling(language),
            TokenKind::Type(ty) => ty.spelling(language),
            _ => return Ok(()),
        };

        if token.text == expected {
            Ok(())
        } else {
            Err(ParseError::ForeignKeyword {
                found: token.text.to_string(),
                expected,
                language,
                position: token.position(),
            })
        }
    }

    // =========================================
    // Main parsing
    // =========================================

    /// Parses the complete program
    pub fn parse_program(&mut self) -> Result<Program, ParseError> {
        self.skip_newlines();
        let start = self.peek().span;

        let (language, case_style) = self.parse_header()?;
        self.language = Some(language);

        let mut functions = Vec::new();
        loop {
            functions.push(self.parse_function()?);

            if self.is_at_end() {
                break;
            }
            self.expect(&TokenKind::Newline, "newline after function definition")?;
            self.skip_newlines();
            if self.is_at_end() {
                break;
            }
        }

        let end = functions.last().map_or(start, |f| f.span);

        Ok(Program {
            language,
            case_style,
            functions,
            span: start.merge(end),
        })
    }

    /// Parse: `Language EN|DK` NEWLINE `Case camelCase|snake_case` NEWLINE
    fn parse_header(&mut self) -> Result<(Language, CaseStyle), ParseError> {
        if !self.match_token(&TokenKind::LanguageHeader) {
            return Err(self.header_error("`Language`"));
        }

        let language = match self.peek().kind {
            TokenKind::LanguageTag(language) => {
                self.advance();
                language
            }
            _ => return Err(self.header_error("`EN` or `DK`")),
        };
        self.end_header_line()?;

        if !self.match_token(&TokenKind::CaseHeader) {
            return Err(self.header_error("`Case`"));
        }

        let token = self.peek();
        let case_style = match (&token.kind, CaseStyle::from_tag(token.text)) {
            (TokenKind::Ident, Some(style)) => style,
            _ => return Err(self.header_error("`camelCase` or `snake_case`")),
        };
        self.advance();
        self.end_header_line()?;

        tracing::trace!(%language, case = case_style.tag(), "parsed header");

        Ok((language, case_style))
    }

    fn end_header_line(&mut self) -> Result<(), ParseError> {
        if !self.match_token(&TokenKind::Newline) {
            return Err(self.header_error("newline"));
        }
        self.skip_newlines();
        Ok(())
    }

    /// Parse: `function type[bound]? name(params) { ... }`
    fn parse_function(&mut self) -> Result<FunctionDef, ParseError> {
        let start = self
            .expect_keyword(Keyword::Function, "function definition")?
            .span;

        let return_type = self.parse_type()?;
        let array = if self.check(&TokenKind::LBracket) {
            Some(self.parse_array_suffix()?)
        } else {
            None
        };

        let name = self.parse_identifier("function name")?;

        self.expect(&TokenKind::LParen, "`(` after function name")?;
        let params = self.parse_param_list()?;
        self.expect(&TokenKind::RParen, "`,` or `)` after parameter")?;

        let body = self.parse_block()?;

        tracing::trace!(name = %name.name, params = params.len(), "parsed function");

        Ok(FunctionDef {
            return_type,
            array,
            name,
            params,
            span: start.merge(body.span),
            body,
        })
    }

    fn parse_param_list(&mut self) -> Result<Vec<Param>, ParseError> {
        let mut params = Vec::new();

        if self.check(&TokenKind::RParen) {
            return Ok(params);
        }

        loop {
            let ty = self.parse_type()?;
            let name = self.parse_identifier("parameter name")?;
            let array = if self.check(&TokenKind::LBracket) {
                Some(self.parse_array_suffix()?)
            } else {
                None
            };

            params.push(Param {
                span: ty.span.merge(self.previous_span()),
                ty,
                name,
                array,
            });

            if !self.match_token(&TokenKind::Comma) {
                break;
            }
        }

        Ok(params)
    }

    fn previous_span(&self) -> Span {
        self.tokens[self.pos.saturating_sub(1)].span
    }

    /// Parse: `[]`, `[10]` or `[size]`
    fn parse_array_suffix(&mut self) -> Result<ArrayBound, ParseError> {
        self.expect(&TokenKind::LBracket, "`[`")?;

        let token = self.peek().clone();
        let bound = match token.kind {
            TokenKind::RBracket => ArrayBound::Unsized,
            TokenKind::IntLit(n) => {
                self.advance();
                ArrayBound::Literal(n)
            }
            TokenKind::Ident => {
                self.advance();
                ArrayBound::Named(Identifier::new(token.text, token.span))
            }
            _ => return Err(self.error_at_current("array size, size name or `]`")),
        };

        self.expect(&TokenKind::RBracket, "`]`")?;
        Ok(bound)
    }

    pub(crate) fn parse_type(&mut self) -> Result<TypeRef, ParseError> {
        match self.peek().kind {
            TokenKind::Type(name) => {
                self.check_vocabulary(self.peek())?;
                let token = self.advance();
                Ok(TypeRef {
                    name,
                    span: token.span,
                })
            }
            _ => Err(self.error_at_current("type name")),
        }
    }

    pub(crate) fn parse_identifier(&mut self, expected: &str) -> Result<Identifier, ParseError> {
        if self.check(&TokenKind::Ident) {
            let token = self.advance();
            Ok(Identifier::new(token.text, token.span))
        } else {
            Err(self.error_at_current(expected))
        }
    }

    // =========================================
    // Blocks
    // =========================================

    /// Parse: `{` statements separated by newlines `}`
    fn parse_block(&mut self) -> Result<Block, ParseError> {
        self.nested("less deeply nested block", Self::parse_block_body)
    }

    fn parse_block_body(&mut self) -> Result<Block, ParseError> {
        let open = self.expect(&TokenKind::LBrace, "`{`")?.span;

        let mut statements = Vec::new();
        loop {
            self.skip_newlines();
            if self.check(&TokenKind::RBrace) {
                break;
            }

            statements.push(self.parse_statement()?);

            if !self.check(&TokenKind::RBrace) {
                self.expect(&TokenKind::Newline, "newline after statement")?;
            }
        }

        let close = self.advance().span;

        Ok(Block {
            statements,
            span: open.merge(close),
        })
    }

    // =========================================
    // Statements
    // =========================================

    /// Parses a statement, dispatching on its first token
    fn parse_statement(&mut self) -> Result<Stmt, ParseError> {
        match self.peek().kind {
            TokenKind::Keyword(Keyword::New) => self.parse_declaration(),
            TokenKind::Keyword(Keyword::If) => self.parse_if(),
            TokenKind::Keyword(Keyword::While) => self.parse_while(),
            TokenKind::Keyword(Keyword::Return) => self.parse_return(),
            TokenKind::Keyword(Keyword::Output) => self.parse_output(),
            TokenKind::Ident if self.is_assignment() => self.parse_assignment(),
            TokenKind::Ident
            | TokenKind::IntLit(_)
            | TokenKind::FloatLit(_)
            | TokenKind::StringLit(_)
            | TokenKind::BoolLit(_)
            | TokenKind::LParen
            | TokenKind::LBracket
            | TokenKind::Keyword(Keyword::Input) => Ok(Stmt::Expr(self.parse_postfix()?)),
            _ => Err(self.error_at_current("statement or `}`")),
        }
    }

    /// Looks past `name[...][...]` for a top-level `=`
    fn is_assignment(&self) -> bool {
        let mut depth = 0usize;
        let mut n = 1;

        loop {
            match self.peek_at(n).kind {
                TokenKind::Newline | TokenKind::Eof => return false,
                TokenKind::LBracket => depth += 1,
                TokenKind::RBracket if depth > 0 => depth -= 1,
                TokenKind::Eq if depth == 0 => return true,
                _ if depth == 0 => return false,
                _ => {}
            }
            n += 1;
        }
    }

    /// Parse: `name[index]... = expr`
    fn parse_assignment(&mut self) -> Result<Stmt, ParseError> {
        let base = self.parse_identifier("assignment target")?;

        let mut indices = Vec::new();
        while self.match_token(&TokenKind::LBracket) {
            indices.push(self.parse_expression()?);
            self.expect(&TokenKind::RBracket, "`]`")?;
        }

        let target = Lvalue {
            span: base.span.merge(self.previous_span()),
            base,
            indices,
        };

        self.expect(&TokenKind::Eq, "`=`")?;
        let value = self.parse_expression()?;

        Ok(Stmt::Assignment {
            span: target.span.merge(value.span()),
            target,
            value,
        })
    }

    /// Parse: `new type name[bound]... (= expr)?`
    fn parse_declaration(&mut self) -> Result<Stmt, ParseError> {
        let start = self.expect_keyword(Keyword::New, "`new`")?.span;

        let ty = self.parse_type()?;
        let name = self.parse_identifier("variable name")?;

        let mut dims = Vec::new();
        while self.check(&TokenKind::LBracket) {
            dims.push(self.parse_array_suffix()?);
        }

        let init = if self.match_token(&TokenKind::Eq) {
            Some(self.parse_expression()?)
        } else {
            None
        };

        Ok(Stmt::Declaration {
            ty,
            name,
            dims,
            init,
            span: start.merge(self.previous_span()),
        })
    }

    /// Parse: `if cond then { ... } (else { ... } | else if ...)?`
    fn parse_if(&mut self) -> Result<Stmt, ParseError> {
        let start = self.expect_keyword(Keyword::If, "`if`")?.span;

        let condition = self.parse_expression()?;
        self.expect_keyword(Keyword::Then, "`then`")?;
        let then_block = self.parse_block()?;

        let else_block = if self.else_follows() {
            self.skip_newlines();
            self.expect_keyword(Keyword::Else, "`else`")?;

            if self.check_keyword(Keyword::If) {
                let nested = self.nested("shorter `else if` chain", Self::parse_if)?;
                Some(Block {
                    span: nested.span(),
                    statements: vec![nested],
                })
            } else {
                Some(self.parse_block()?)
            }
        } else {
            None
        };

        let end = else_block.as_ref().map_or(then_block.span, |b| b.span);

        Ok(Stmt::If {
            condition,
            then_block,
            else_block,
            span: start.merge(end),
        })
    }

    /// True if the next non-newline token is `else`
    fn else_follows(&self) -> bool {
        let mut n = 0;
        while self.peek_at(n).kind == TokenKind::Newline {
            n += 1;
        }
        self.peek_at(n).kind == TokenKind::Keyword(Keyword::Else)
    }

    /// Parse: `while cond do { ... }`
    fn parse_while(&mut self) -> Result<Stmt, ParseError> {
        let start = self.expect_keyword(Keyword::While, "`while`")?.span;

        let condition = self.parse_expression()?;
        self.expect_keyword(Keyword::Do, "`do`")?;
        let body = self.parse_block()?;

        Ok(Stmt::While {
            condition,
            span: start.merge(body.span),
            body,
        })
    }

    /// Parse: `return` or `return expr`
    fn parse_return(&mut self) -> Result<Stmt, ParseError> {
        let start = self.expect_keyword(Keyword::Return, "`return`")?.span;

        let value = if self.check(&TokenKind::Newline)
            || self.check(&TokenKind::RBrace)
            || self.is_at_end()
        {
            None
        } else {
            Some(self.parse_expression()?)
        };

        let span = value.as_ref().map_or(start, |v| start.merge(v.span()));

        Ok(Stmt::Return { value, span })
    }

    /// Parse: `output expr`
    fn parse_output(&mut self) -> Result<Stmt, ParseError> {
        let start = self.expect_keyword(Keyword::Output, "`output`")?.span;
        let value = self.parse_expression()?;

        Ok(Stmt::Output {
            span: start.merge(value.span()),
            value,
        })
    }
}

/// Parses a token sequence with default options
pub fn parse(tokens: Vec<Token<'_>>) -> Result<Program, ParseError> {
    parse_with(tokens, ParseOptions::default())
}

/// Parses a token sequence
pub fn parse_with(tokens: Vec<Token<'_>>, options: ParseOptions) -> Result<Program, ParseError> {
    let result = Parser::new(tokens).with_options(options).parse_program();

    match &result {
        Ok(program) => tracing::debug!(
            functions = program.functions.len(),
            language = %program.language,
            "parsing finished"
        ),
        Err(err) => tracing::debug!(%err, "parsing failed"),
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use p4_lexer::{tokenize, TypeName};

    const HEADER: &str = "Language EN\nCase camelCase\n";

    fn parse_source(source: &str) -> Result<Program, ParseError> {
        parse(tokenize(source).expect("source should lex"))
    }

    fn parse_body(body: &str) -> Vec<Stmt> {
        let source = format!("{HEADER}function noType main() {{\n{body}\n}}\n");
        let program = parse_source(&source).expect("program should parse");
        program.functions[0].body.statements.clone()
    }

    #[test]
    fn test_parse_minimal_program() {
        let program = parse_source("Language EN\nCase camelCase\nfunction integer main() {\n}\n").unwrap();
        assert_eq!(program.language, Language::En);
        assert_eq!(program.case_style, CaseStyle::CamelCase);
        assert_eq!(program.functions.len(), 1);

        let main = &program.functions[0];
        assert_eq!(main.name.name, "main");
        assert_eq!(main.return_type.name, TypeName::Integer);
        assert!(!main.is_array());
        assert!(main.params.is_empty());
        assert!(main.body.statements.is_empty());
    }

    #[test]
    fn test_parse_danish_program() {
        let source = "Language DK\nCase snake_case\n\nfunktion heltal[] tal_liste(heltal n, tekst navne[]) {\n    returner [n]\n}\n";
        let program = parse_source(source).unwrap();
        assert_eq!(program.language, Language::Dk);
        assert_eq!(program.case_style, CaseStyle::SnakeCase);

        let f = &program.functions[0];
        assert_eq!(f.array, Some(ArrayBound::Unsized));
        assert_eq!(f.params.len(), 2);
        assert_eq!(f.params[1].ty.name, TypeName::Str);
        assert!(f.params[1].is_array());
        assert!(!f.params[0].is_array());
    }

    #[test]
    fn test_array_bounds_literal_and_named() {
        let source = format!("{HEADER}function integer[10] f(integer xs[size]) {{\n}}\n");
        let program = parse_source(&source).unwrap();
        let f = &program.functions[0];
        assert_eq!(f.array, Some(ArrayBound::Literal(10)));
        match &f.params[0].array {
            Some(ArrayBound::Named(ident)) => assert_eq!(ident.name, "size"),
            other => panic!("expected named bound, got {:?}", other),
        }
    }

    #[test]
    fn test_multiple_functions() {
        let source = format!(
            "{HEADER}function integer one() {{\n    return 1\n}}\n\n\nfunction integer two() {{\n    return 2\n}}"
        );
        let program = parse_source(&source).unwrap();
        assert_eq!(program.functions.len(), 2);
        assert!(program.function("two").is_some());
        assert!(program.function("three").is_none());
    }

    #[test]
    fn test_declarations() {
        let stmts = parse_body("new integer x = 5\nnew decimal grid[3][n]\nnew string s");
        assert_eq!(stmts.len(), 3);

        match &stmts[0] {
            Stmt::Declaration { ty, name, dims, init, .. } => {
                assert_eq!(ty.name, TypeName::Integer);
                assert_eq!(name.name, "x");
                assert!(dims.is_empty());
                assert!(matches!(init, Some(Expr::IntLit(5, _))));
            }
            other => panic!("expected declaration, got {:?}", other),
        }

        match &stmts[1] {
            Stmt::Declaration { dims, init, .. } => {
                assert_eq!(dims.len(), 2);
                assert_eq!(dims[0], ArrayBound::Literal(3));
                assert!(matches!(&dims[1], ArrayBound::Named(id) if id.name == "n"));
                assert!(init.is_none());
            }
            other => panic!("expected declaration, got {:?}", other),
        }
    }

    #[test]
    fn test_assignment_with_index_chain() {
        let stmts = parse_body("grid[i][j + 1] = 0");
        match &stmts[0] {
            Stmt::Assignment { target, value, .. } => {
                assert_eq!(target.base.name, "grid");
                assert_eq!(target.indices.len(), 2);
                assert!(matches!(target.indices[1], Expr::Binary { op: BinOp::Add, .. }));
                assert!(matches!(value, Expr::IntLit(0, _)));
            }
            other => panic!("expected assignment, got {:?}", other),
        }
    }

    #[test]
    fn test_index_without_assignment_is_expression_statement() {
        let stmts = parse_body("xs[0]\nf(x)[1]");
        assert!(matches!(&stmts[0], Stmt::Expr(Expr::Index { .. })));
        assert!(matches!(&stmts[1], Stmt::Expr(Expr::Index { base, .. }) if matches!(**base, Expr::Call { .. })));
    }

    #[test]
    fn test_call_statement() {
        let stmts = parse_body("print(\"hi\", 2)");
        match &stmts[0] {
            Stmt::Expr(Expr::Call { callee, args, .. }) => {
                assert!(matches!(&**callee, Expr::Ident(id) if id.name == "print"));
                assert_eq!(args.len(), 2);
            }
            other => panic!("expected call, got {:?}", other),
        }
    }

    #[test]
    fn test_if_else_and_while() {
        let stmts = parse_body(
            "if x > 1 then {\n    output x\n} else {\n    output 0\n}\nwhile i < 10 do {\n    i = i + 1\n}",
        );
        assert_eq!(stmts.len(), 2);
        match &stmts[0] {
            Stmt::If { then_block, else_block, .. } => {
                assert_eq!(then_block.statements.len(), 1);
                assert_eq!(else_block.as_ref().map(|b| b.statements.len()), Some(1));
            }
            other => panic!("expected if, got {:?}", other),
        }
        assert!(matches!(&stmts[1], Stmt::While { body, .. } if body.statements.len() == 1));
    }

    #[test]
    fn test_else_on_next_line_and_else_if() {
        let stmts = parse_body("if a then {\n}\nelse if b then {\n    return\n}");
        assert_eq!(stmts.len(), 1);
        match &stmts[0] {
            Stmt::If { else_block: Some(block), .. } => {
                assert_eq!(block.statements.len(), 1);
                assert!(matches!(block.statements[0], Stmt::If { else_block: None, .. }));
            }
            other => panic!("expected if/else, got {:?}", other),
        }
    }

    #[test]
    fn test_return_forms() {
        let stmts = parse_body("return\nreturn x * 2");
        assert!(matches!(&stmts[0], Stmt::Return { value: None, .. }));
        assert!(matches!(&stmts[1], Stmt::Return { value: Some(_), .. }));

        let source = format!("{HEADER}function noType f() {{ return }}\n");
        let program = parse_source(&source).unwrap();
        assert!(matches!(
            program.functions[0].body.statements[0],
            Stmt::Return { value: None, .. }
        ));
    }

    #[test]
    fn test_blank_lines_and_comments_between_statements() {
        let stmts = parse_body("x = 1\n\n\n# note #\ny = 2\n  # trailing note\n");
        assert_eq!(stmts.len(), 2);
    }

    #[test]
    fn test_statements_need_separator() {
        let source = format!("{HEADER}function noType f() {{\n    x = 1 y = 2\n}}\n");
        match parse_source(&source) {
            Err(ParseError::UnexpectedToken { expected, found, .. }) => {
                assert_eq!(expected, "newline after statement");
                assert_eq!(found, "identifier `y`");
            }
            other => panic!("expected UnexpectedToken, got {:?}", other),
        }
    }

    #[test]
    fn test_binary_expression_statement_rejected() {
        let source = format!("{HEADER}function noType f() {{\n    f(x) + 1\n}}\n");
        assert!(matches!(
            parse_source(&source),
            Err(ParseError::UnexpectedToken { .. })
        ));
    }

    #[test]
    fn test_invalid_statement_start() {
        let source = format!("{HEADER}function noType f() {{\n    then\n}}\n");
        match parse_source(&source) {
            Err(ParseError::UnexpectedToken { expected, position, .. }) => {
                assert_eq!(expected, "statement or `}`");
                assert_eq!((position.line, position.column), (4, 5));
            }
            other => panic!("expected UnexpectedToken, got {:?}", other),
        }
    }

    #[test]
    fn test_reserved_words_rejected_as_identifiers() {
        for word in ["new", "ny", "hvis", "mens", "returner", "heltal", "string", "så"] {
            let source = format!("{HEADER}function integer main() {{\n    new integer {word} = 1\n}}\n");
            match parse_source(&source) {
                Err(ParseError::UnexpectedToken { expected, .. }) => {
                    assert_eq!(expected, "variable name", "for `{word}`");
                }
                other => panic!("`{word}` should be rejected, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_missing_case_line_is_malformed_header() {
        match parse_source("Language EN\nfunction integer main() {\n}\n") {
            Err(ParseError::MalformedHeader { expected, position, .. }) => {
                assert_eq!(expected, "`Case`");
                assert_eq!((position.line, position.column), (2, 1));
            }
            other => panic!("expected MalformedHeader, got {:?}", other),
        }
    }

    #[test]
    fn test_header_errors() {
        let cases = [
            ("function integer main() {\n}\n", "`Language`"),
            ("Language en\n", "`EN` or `DK`"),
            ("Language EN Case camelCase\n", "newline"),
            ("Language EN\nCase kebabCase\n", "`camelCase` or `snake_case`"),
            ("Language EN\nCase camelCase", "newline"),
            ("", "`Language`"),
        ];
        for (source, want) in cases {
            match parse_source(source) {
                Err(ParseError::MalformedHeader { expected, .. }) => assert_eq!(expected, want, "for {:?}", source),
                other => panic!("expected MalformedHeader for {:?}, got {:?}", source, other),
            }
        }
    }

    #[test]
    fn test_header_only_program_needs_a_function() {
        assert!(matches!(
            parse_source("Language EN\nCase camelCase\n\n"),
            Err(ParseError::UnexpectedEof { .. })
        ));
    }

    #[test]
    fn test_repeated_header_rejected() {
        let source = format!("{HEADER}{HEADER}function integer main() {{\n}}\n");
        assert!(matches!(
            parse_source(&source),
            Err(ParseError::UnexpectedToken { .. })
        ));
    }

    #[test]
    fn test_unclosed_block_is_eof() {
        let source = format!("{HEADER}function integer main() {{\n    x = 1\n");
        match parse_source(&source) {
            Err(ParseError::UnexpectedEof { expected, .. }) => assert_eq!(expected, "statement or `}`"),
            other => panic!("expected UnexpectedEof, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_token_stream() {
        assert!(matches!(
            parse(Vec::new()),
            Err(ParseError::MalformedHeader { .. })
        ));
    }

    #[test]
    fn test_mixed_vocabulary_accepted_by_default() {
        let source = "Language EN\nCase camelCase\nfunktion integer main() {\n    hvis x then {\n    }\n}\n";
        assert!(parse_source(source).is_ok());
    }

    #[test]
    fn test_per_language_policy_rejects_foreign_keywords() {
        let source = "Language EN\nCase camelCase\nfunction integer main() {\n    new heltal x = 1\n}\n";
        let options = ParseOptions::new().with_keyword_policy(KeywordPolicy::PerLanguage);
        match parse_with(tokenize(source).unwrap(), options) {
            Err(ParseError::ForeignKeyword { found, expected, language, position }) => {
                assert_eq!(found, "heltal");
                assert_eq!(expected, "integer");
                assert_eq!(language, Language::En);
                assert_eq!((position.line, position.column), (4, 9));
            }
            other => panic!("expected ForeignKeyword, got {:?}", other),
        }

        let danish = "Language DK\nCase camelCase\nfunktion boolean main() {\n    mens true gør {\n    }\n}\n";
        assert!(parse_with(tokenize(danish).unwrap(), options).is_ok());
    }

    #[test]
    fn test_deeply_nested_blocks_are_rejected() {
        let depth = 10_000;
        let body = format!("{}{}", "while true do {\n".repeat(depth), "}\n".repeat(depth));
        let source = format!("{HEADER}function noType main() {{\n{body}}}\n");

        match parse_source(&source) {
            // The loop condition reaches the limit before its block does
            Err(ParseError::UnexpectedToken { expected, .. }) => {
                assert!(expected.starts_with("less deeply nested"), "{expected}");
            }
            other => panic!("expected nesting error, got {:?}", other),
        }

        let shallow = "while true do {\n".repeat(10) + &"}\n".repeat(10);
        assert_eq!(parse_body(&shallow).len(), 1);
    }

    #[test]
    fn test_long_else_if_chain_is_rejected() {
        let chain = "if a then {\n} else ".repeat(10_000) + "{\n}";
        let source = format!("{HEADER}function noType main() {{\n{chain}\n}}\n");
        assert!(parse_source(&source).is_err());

        let short = "if a then {\n} else ".repeat(5) + "{\n}";
        assert_eq!(parse_body(&short).len(), 1);
    }
}
