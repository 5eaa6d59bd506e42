//! The demangled-symbol sub-language and everything built on top of it.
//!
//! Stage order mirrors the data flow: [token] and [lexing] produce the token
//! stream, [parsing] recognizes the `static_member` grammar, [building]
//! assembles AST nodes, [extraction] folds ASTs into the registry,
//! [numbering] assigns IDs and [generation] renders the outputs.

pub mod ast;
pub mod building;
pub mod error;
pub mod extraction;
pub mod generation;
pub mod lexing;
pub mod numbering;
pub mod parsing;
pub mod pipeline;
pub mod token;
