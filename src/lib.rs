/// The lexer takes the source input, mapping it into a sequence of tokens,
/// including the indentation structure of the program.
pub mod lexer;

/// The parser takes a sequence of tokens, mapping it into an AST.
pub mod parser;

/// The type checker verifies the soundness of a program's types.
pub mod type_checker;

/// The code generator lowers a checked program into an IR module.
pub mod codegen;

/// IR-to-IR rewrite passes.
pub mod opt;

pub mod ast;
pub mod context;
pub mod env;
pub mod ir;
pub mod stdlib;
pub mod token;
pub mod types;
pub mod value;

pub mod util {
    pub mod fmt;
    pub mod intern;
    #[cfg(test)]
    pub(crate) mod test_utils;
}
