//! Integration tests for the P4 language front end
//!
//! This crate exercises the complete pipeline:
//! Source → Lexer → Parser → AST, and AST → Renderer → Source

use p4_error::{DiagnosticRenderer, IntoDiagnostic, SourceFile, Span};
use p4_parser::{
    parse_source, render, ArrayBound, Block, Expr, FrontendError, Identifier, Program, Stmt,
};

/// Lexes and parses source with default options
pub fn parse_program(source: &str) -> Result<Program, FrontendError> {
    parse_source(source)
}

/// Asserts that source parses, returning the program
pub fn assert_parses(source: &str) -> Program {
    match parse_program(source) {
        Ok(program) => program,
        Err(err) => {
            let file = SourceFile::new("test.p4", source);
            let rendered = DiagnosticRenderer::new(&file)
                .without_colors()
                .render(&err.to_diagnostic());
            panic!("Expected source to parse, but got:\n{}", rendered);
        }
    }
}

/// Asserts that source is rejected, returning the error
pub fn assert_parse_fails(source: &str) -> FrontendError {
    match parse_program(source) {
        Ok(program) => panic!(
            "Expected source to fail, but it parsed:\n{}",
            render(&program)
        ),
        Err(err) => err,
    }
}

/// Asserts that rendering and reparsing yields the same tree, spans aside
pub fn assert_round_trips(source: &str) {
    let mut original = assert_parses(source);
    let rendered = render(&original);

    let mut reparsed = match parse_program(&rendered) {
        Ok(program) => program,
        Err(err) => panic!("Rendered source failed to parse: {}\n\n{}", err, rendered),
    };

    strip_spans(&mut original);
    strip_spans(&mut reparsed);
    if original != reparsed {
        panic!(
            "Round trip changed the tree.\n\nRendered:\n{}\nOriginal: {:#?}\n\nReparsed: {:#?}",
            rendered, original, reparsed
        );
    }
}

/// Resets every span in the tree, so trees parsed from differently laid
/// out sources compare equal
pub fn strip_spans(program: &mut Program) {
    program.span = Span::default();

    for function in &mut program.functions {
        function.span = Span::default();
        function.return_type.span = Span::default();
        strip_ident(&mut function.name);
        if let Some(bound) = &mut function.array {
            strip_bound(bound);
        }

        for param in &mut function.params {
            param.span = Span::default();
            param.ty.span = Span::default();
            strip_ident(&mut param.name);
            if let Some(bound) = &mut param.array {
                strip_bound(bound);
            }
        }

        strip_block(&mut function.body);
    }
}

fn strip_ident(ident: &mut Identifier) {
    ident.span = Span::default();
}

fn strip_bound(bound: &mut ArrayBound) {
    if let ArrayBound::Named(ident) = bound {
        strip_ident(ident);
    }
}

fn strip_block(block: &mut Block) {
    block.span = Span::default();
    for stmt in &mut block.statements {
        strip_stmt(stmt);
    }
}

fn strip_stmt(stmt: &mut Stmt) {
    match stmt {
        Stmt::Assignment { target, value, span } => {
            *span = Span::default();
            target.span = Span::default();
            strip_ident(&mut target.base);
            target.indices.iter_mut().for_each(strip_expr);
            strip_expr(value);
        }
        Stmt::Declaration {
            ty,
            name,
            dims,
            init,
            span,
        } => {
            *span = Span::default();
            ty.span = Span::default();
            strip_ident(name);
            dims.iter_mut().for_each(strip_bound);
            if let Some(init) = init {
                strip_expr(init);
            }
        }
        Stmt::If {
            condition,
            then_block,
            else_block,
            span,
        } => {
            *span = Span::default();
            strip_expr(condition);
            strip_block(then_block);
            if let Some(block) = else_block {
                strip_block(block);
            }
        }
        Stmt::While {
            condition,
            body,
            span,
        } => {
            *span = Span::default();
            strip_expr(condition);
            strip_block(body);
        }
        Stmt::Return { value, span } => {
            *span = Span::default();
            if let Some(value) = value {
                strip_expr(value);
            }
        }
        Stmt::Output { value, span } => {
            *span = Span::default();
            strip_expr(value);
        }
        Stmt::Expr(expr) => strip_expr(expr),
    }
}

fn strip_expr(expr: &mut Expr) {
    match expr {
        Expr::IntLit(_, span)
        | Expr::FloatLit(_, span)
        | Expr::StringLit(_, span)
        | Expr::BoolLit(_, span)
        | Expr::Input(span) => *span = Span::default(),
        Expr::ArrayLit(items, span) => {
            *span = Span::default();
            items.iter_mut().for_each(strip_expr);
        }
        Expr::Ident(ident) => strip_ident(ident),
        Expr::Unary { operand, span, .. } => {
            *span = Span::default();
            strip_expr(operand);
        }
        Expr::Binary {
            left, right, span, ..
        } => {
            *span = Span::default();
            strip_expr(left);
            strip_expr(right);
        }
        Expr::Call { callee, args, span } => {
            *span = Span::default();
            strip_expr(callee);
            args.iter_mut().for_each(strip_expr);
        }
        Expr::Index { base, index, span } => {
            *span = Span::default();
            strip_expr(base);
            strip_expr(index);
        }
    }
}
