use clap::Parser as ClapParser;

use std::path::Path;

use ash::compile::{CompileOptions, compile};
use ash::diag::format_error;

#[derive(ClapParser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input source file path
    input: String,

    /// Output path for the C++ translation unit (defaults to <input>.cpp)
    #[clap(short, long)]
    output: Option<String>,

    /// Comma-separated list of things to dump: tokens,ast,typed,cpp
    #[clap(long)]
    dump: Option<String>,

    /// Stop after checking; do not write any output
    #[clap(long)]
    check: bool,
}

fn main() {
    let args = Args::parse();
    let source = match std::fs::read_to_string(&args.input) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("[ERROR] failed to read {}: {e}", args.input);
            std::process::exit(1);
        }
    };

    let opts = CompileOptions {
        dump: args.dump.clone(),
        check_only: args.check,
    };

    match compile(&source, &opts) {
        Ok(output) => {
            if args.check {
                return;
            }
            let output_path = args
                .output
                .map(Into::into)
                .unwrap_or_else(|| Path::new(&args.input).with_extension("cpp"));
            match std::fs::write(&output_path, output.cpp) {
                Ok(_) => {
                    println!("[SUCCESS] C++ written to {}", output_path.display())
                }
                Err(e) => {
                    eprintln!("[ERROR] failed to write {}: {e}", output_path.display());
                    std::process::exit(1);
                }
            }
        }
        Err(errors) => {
            for error in errors {
                match error.span() {
                    Some(span) => eprintln!("{}", format_error(&source, span, &error)),
                    None => eprintln!("{}", error),
                }
            }
            std::process::exit(1);
        }
    }
}
