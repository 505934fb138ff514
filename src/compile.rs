use crate::check::check;
use crate::codegen::Codegen;
use crate::context::ParsedContext;
use crate::diag::CompileError;
use crate::lexer::{LexError, Lexer, Token};
use crate::parse::Parser;

#[derive(Default)]
pub struct CompileOptions {
    /// Comma-separated list of things to dump: tokens,ast,typed,cpp
    pub dump: Option<String>,
    /// Stop after checking; no C++ is produced.
    pub check_only: bool,
}

pub struct CompileOutput {
    pub cpp: String,
}

pub fn compile(source: &str, opts: &CompileOptions) -> Result<CompileOutput, Vec<CompileError>> {
    let mut dump_tokens = false;
    let mut dump_ast = false;
    let mut dump_typed = false;
    let mut dump_cpp = false;

    if let Some(dump) = &opts.dump {
        for item in dump.split(',').map(|s| s.trim().to_lowercase()) {
            match item.as_str() {
                "tokens" => dump_tokens = true,
                "ast" => dump_ast = true,
                "typed" => dump_typed = true,
                "cpp" => dump_cpp = true,
                "" => {}
                _ => {
                    eprintln!("[WARN] unknown dump flag: {item}");
                }
            }
        }
    }

    // --- Lex ---

    let lexer = Lexer::new(source);
    let tokens = lexer
        .tokenize()
        .collect::<Result<Vec<Token>, LexError>>()
        .map_err(|e| vec![e.into()])?;

    if dump_tokens {
        println!("Tokens:");
        println!("--------------------------------");
        for (i, token) in tokens.iter().enumerate() {
            println!("{}: {}", i, token);
        }
        println!("--------------------------------");
    }

    // --- Parse ---

    let mut parser = Parser::new(&tokens);
    let program = parser.parse().map_err(|e| vec![e.into()])?;

    if dump_ast {
        println!("AST:");
        println!("--------------------------------");
        println!("{:#?}", program);
        println!("--------------------------------");
    }

    // --- Check ---

    let parsed_context = ParsedContext::new(program);
    let checked_context = check(parsed_context).map_err(|e| vec![e.into()])?;

    if dump_typed {
        println!("Typed program:");
        println!("--------------------------------");
        println!("{:#?}", checked_context.program);
        println!("--------------------------------");
    }

    if opts.check_only {
        return Ok(CompileOutput { cpp: String::new() });
    }

    // --- Emit C++ ---

    let cpp = Codegen::new(&checked_context).generate();

    if dump_cpp {
        println!("C++:");
        println!("--------------------------------");
        println!("{}", cpp);
        println!("--------------------------------");
    }

    Ok(CompileOutput { cpp })
}
