use std::{env, fs, process::ExitCode};

use sere::{
    codegen, lexer,
    opt::Pipeline,
    parser,
    token::Spanned,
    type_checker,
    util::{
        fmt::{Context, Show},
        intern::Interner,
    },
};

const EXIT_USAGE: u8 = 64;
const EXIT_BAD_INPUT: u8 = 65;
const EXIT_PARSE: u8 = 66;
const EXIT_FAILURE: u8 = 1;
const EXIT_INTERNAL: u8 = 2;

fn main() -> ExitCode {
    let Some(path) = env::args().nth(1) else {
        eprintln!("usage: sere <input-file>");
        return ExitCode::from(EXIT_USAGE);
    };

    let src = match fs::read_to_string(&path) {
        Ok(src) if !src.is_empty() => src,
        Ok(_) => {
            eprintln!("{path}: empty input");
            return ExitCode::from(EXIT_BAD_INPUT);
        }
        Err(error) => {
            eprintln!("{path}: {error}");
            return ExitCode::from(EXIT_BAD_INPUT);
        }
    };

    match run(&src) {
        Ok(module_text) => {
            print!("{module_text}");
            ExitCode::SUCCESS
        }
        Err(failure) => ExitCode::from(match failure {
            Failure::Parse => EXIT_PARSE,
            Failure::Lowering => EXIT_FAILURE,
            Failure::Internal => EXIT_INTERNAL,
        }),
    }
}

enum Failure {
    Parse,
    Lowering,
    Internal,
}

fn run(src: &str) -> Result<String, Failure> {
    let mut tokens = Vec::with_capacity(lexer::SUGGESTED_TOKENS_CAPACITY);
    let mut interner = Interner::with_capacity(128);

    let stmts = match parser::parse_program(src, &mut tokens, &mut interner) {
        Ok(stmts) => stmts,
        Err((_, errors)) => {
            report(src, &interner, &errors);
            return Err(Failure::Parse);
        }
    };

    if let Err(errors) = type_checker::check(&stmts, &mut interner) {
        report(src, &interner, &errors);
        return Err(Failure::Lowering);
    }

    let mut module = match codegen::compile(&stmts, &mut interner) {
        Ok(module) => module,
        Err(error) => {
            report(src, &interner, std::slice::from_ref(&error));
            return Err(Failure::Lowering);
        }
    };

    if let Err(error) = Pipeline::standard().run(&mut module) {
        eprintln!("internal error in pass `{}`: {}", error.pass, error.error);
        return Err(Failure::Internal);
    }

    Ok(module.to_string())
}

/// Prints each error as `line N: message` on stderr.
fn report<E>(src: &str, interner: &Interner, errors: &[Spanned<E>])
where
    Spanned<E>: Show,
{
    let ctx = Context {
        ident_interner: interner,
    };
    for error in errors {
        let (line, _) = error.span.line_col(src);
        eprintln!("line {line}: {}", error.display(&ctx));
    }
}
