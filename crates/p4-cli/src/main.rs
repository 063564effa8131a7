//! P4 front-end CLI

use clap::{Parser, Subcommand};
use p4_error::{DiagnosticRenderer, IntoDiagnostic, SourceFile};
use p4_lexer::{tokenize, TokenKind};
use p4_parser::{
    parse_source_with, render, render_expr, ArrayBound, Block, Expr, KeywordPolicy, Language,
    ParseOptions, Program, Stmt,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::process;
use tracing_subscriber::EnvFilter;

/// Environment variable holding a tracing filter, e.g. `P4_LOG=p4_parser=trace`
const LOG_ENV: &str = "P4_LOG";

#[derive(Parser)]
#[command(name = "p4")]
#[command(author = "Guilherme Mendes")]
#[command(version = "0.1.0")]
#[command(about = "P4 teaching language front end", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Reject keywords not spelled in the header's language
    #[arg(long, global = true)]
    strict_keywords: bool,

    /// Disable colored diagnostics
    #[arg(long, global = true)]
    no_color: bool,

    /// Log front-end progress to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Checks a file for lexical and syntax errors
    Check {
        /// Input file
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Shows file tokens
    Lex {
        /// Input file
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Shows file AST
    Parse {
        /// Input file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Print the AST as JSON
        #[arg(long)]
        json: bool,
    },

    /// Re-prints a file in canonical layout
    Render {
        /// Input file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let options = if cli.strict_keywords {
        ParseOptions::new().with_keyword_policy(KeywordPolicy::PerLanguage)
    } else {
        ParseOptions::default()
    };
    let color = !cli.no_color;

    match cli.command {
        Commands::Check { input } => {
            let file = read_source(&input);
            let program = parse_or_exit(&file, options, color);

            println!(
                "[ok] {}: {} function(s), language {}, case {}",
                input.display(),
                program.functions.len(),
                program.language,
                program.case_style.tag()
            );
        }

        Commands::Lex { input } => {
            let file = read_source(&input);

            let tokens = match tokenize(&file.source) {
                Ok(tokens) => tokens,
                Err(err) => report(&file, &err, color),
            };

            for token in &tokens {
                let kind_str = format!("{:?}", token.kind);
                let display = match &token.kind {
                    TokenKind::Newline => "↵".to_string(),
                    TokenKind::Eof => "EOF".to_string(),
                    _ => token.text.to_string(),
                };

                println!(
                    "  {:4}:{:<3}  {:<20}  {}",
                    token.line(),
                    token.column(),
                    kind_str.chars().take(20).collect::<String>(),
                    display
                );
            }

            println!("\nTotal: {} tokens", tokens.len());
        }

        Commands::Parse { input, json } => {
            let file = read_source(&input);
            let program = parse_or_exit(&file, options, color);

            if json {
                match serde_json::to_string_pretty(&program) {
                    Ok(text) => println!("{}", text),
                    Err(e) => {
                        eprintln!("Error serializing AST: {}", e);
                        process::exit(1);
                    }
                }
            } else {
                print!("{}", format_program(&program));
            }
        }

        Commands::Render { input, output } => {
            let file = read_source(&input);
            let program = parse_or_exit(&file, options, color);
            let text = render(&program);

            match output {
                Some(path) => {
                    if let Err(e) = fs::write(&path, text) {
                        eprintln!("Error writing {}: {}", path.display(), e);
                        process::exit(1);
                    }
                    tracing::info!(path = %path.display(), "wrote rendered source");
                }
                None => print!("{}", text),
            }
        }
    }
}

fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "warn" }));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn read_source(path: &Path) -> SourceFile {
    match fs::read_to_string(path) {
        Ok(source) => SourceFile::new(path.display().to_string(), source),
        Err(e) => {
            eprintln!("Error reading file: {}", e);
            process::exit(1);
        }
    }
}

fn parse_or_exit(file: &SourceFile, options: ParseOptions, color: bool) -> Program {
    match parse_source_with(&file.source, options) {
        Ok(program) => program,
        Err(err) => {
            tracing::debug!(stage = %err.stage(), "front end rejected input");
            report(file, &err, color)
        }
    }
}

/// Prints the diagnostic for `err` and exits
fn report(file: &SourceFile, err: &impl IntoDiagnostic, color: bool) -> ! {
    let mut renderer = DiagnosticRenderer::new(file);
    if !color {
        renderer = renderer.without_colors();
    }
    eprintln!("{}", renderer.render(&err.to_diagnostic()));
    process::exit(1);
}

// =========================================
// AST outline
// =========================================

fn format_program(program: &Program) -> String {
    let mut out = format!(
        "Program (language {}, case {}, {} function(s))\n",
        program.language,
        program.case_style.tag(),
        program.functions.len()
    );

    for function in &program.functions {
        let params: Vec<String> = function
            .params
            .iter()
            .map(|p| {
                format!(
                    "{} {}{}",
                    p.ty.name.spelling(program.language),
                    p.name.name,
                    format_bound(p.array.as_ref())
                )
            })
            .collect();

        out.push_str(&format!(
            "  Function {}({}) -> {}{}\n",
            function.name.name,
            params.join(", "),
            function.return_type.name.spelling(program.language),
            format_bound(function.array.as_ref())
        ));
        format_block(&function.body, program.language, 2, &mut out);
    }

    out
}

fn format_bound(bound: Option<&ArrayBound>) -> String {
    match bound {
        None => String::new(),
        Some(ArrayBound::Unsized) => "[]".to_string(),
        Some(ArrayBound::Literal(n)) => format!("[{}]", n),
        Some(ArrayBound::Named(ident)) => format!("[{}]", ident.name),
    }
}

fn format_block(block: &Block, language: Language, indent: usize, out: &mut String) {
    for stmt in &block.statements {
        format_stmt(stmt, language, indent, out);
    }
}

fn format_stmt(stmt: &Stmt, language: Language, indent: usize, out: &mut String) {
    let pad = "  ".repeat(indent);
    let expr = |e: &Expr| render_expr(e, language);

    match stmt {
        Stmt::Assignment { target, value, .. } => {
            let indices: String = target
                .indices
                .iter()
                .map(|i| format!("[{}]", expr(i)))
                .collect();
            out.push_str(&format!("{}Assign {}{} = {}\n", pad, target.base.name, indices, expr(value)));
        }
        Stmt::Declaration { ty, name, dims, init, .. } => {
            let dims: String = dims.iter().map(|d| format_bound(Some(d))).collect();
            let init = init.as_ref().map(|e| format!(" = {}", expr(e))).unwrap_or_default();
            out.push_str(&format!(
                "{}Declare {} {}{}{}\n",
                pad,
                ty.name.spelling(language),
                name.name,
                dims,
                init
            ));
        }
        Stmt::If {
            condition,
            then_block,
            else_block,
            ..
        } => {
            out.push_str(&format!("{}If {}\n", pad, expr(condition)));
            format_block(then_block, language, indent + 1, out);
            if let Some(else_block) = else_block {
                out.push_str(&format!("{}Else\n", pad));
                format_block(else_block, language, indent + 1, out);
            }
        }
        Stmt::While { condition, body, .. } => {
            out.push_str(&format!("{}While {}\n", pad, expr(condition)));
            format_block(body, language, indent + 1, out);
        }
        Stmt::Return { value, .. } => {
            let value = value.as_ref().map(|e| format!(" {}", expr(e))).unwrap_or_default();
            out.push_str(&format!("{}Return{}\n", pad, value));
        }
        Stmt::Output { value, .. } => {
            out.push_str(&format!("{}Output {}\n", pad, expr(value)));
        }
        Stmt::Expr(e) => {
            out.push_str(&format!("{}Expr {}\n", pad, expr(e)));
        }
    }
}
