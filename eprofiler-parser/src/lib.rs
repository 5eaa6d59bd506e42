//! # eprofiler-parser
//!
//! Mines eprofiler declarations back out of demangled linker symbols.
//!
//! The eprofiler C++ library encodes profiler and tag names as compile-time
//! character-sequence template parameters. The only place those strings
//! surface again is the unresolved-symbol listing of a compiled static
//! library (`nm -u | c++filt`). This crate parses that listing's restricted
//! symbol sub-language, rebuilds the template-instantiated declarations as a
//! typed AST, assigns every tag a stable numeric ID, and renders the C++
//! definitions (plus a JSON identifier map) that satisfy the linker.
//!
//! The pipeline runs in three strictly ordered phases, see
//! [pipeline](symbols::pipeline):
//!
//! 1. Parsing: each symbol line becomes one AST rooted in a scope chain and
//!    is folded into the [SymbolRegistry](symbols::extraction::SymbolRegistry).
//! 2. Numbering: tags receive globally unique, gapless IDs in first-seen
//!    order. See [numbering](symbols::numbering).
//! 3. Generation: C++ source and the JSON map are rendered. See
//!    [generation](symbols::generation).

pub mod symbols;

pub use symbols::error::SymbolError;
pub use symbols::extraction::SymbolRegistry;
pub use symbols::pipeline::{generate, run_pipeline, symbol_in_dump_line, GeneratedOutput};
