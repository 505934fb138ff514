use ash::compile::{CompileOptions, CompileOutput, compile};
use ash::diag::CompileError;

pub fn compile_source(source: &str) -> Result<CompileOutput, Vec<CompileError>> {
    compile(source, &CompileOptions::default())
}

pub fn check_source(source: &str) -> Result<(), Vec<CompileError>> {
    let opts = CompileOptions {
        dump: None,
        check_only: true,
    };
    compile(source, &opts).map(|_| ())
}

pub fn first_error(source: &str) -> String {
    let errors = check_source(source).expect_err("Expected a compile error");
    errors
        .first()
        .expect("error list should not be empty")
        .to_string()
}
