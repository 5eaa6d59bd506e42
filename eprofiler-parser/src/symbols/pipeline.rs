//! The three strictly ordered phases behind one entry point.
//!
//! 1. Parse: every line is tokenized, parsed and folded into the registry,
//!    strictly sequentially in input order.
//! 2. Number: IDs and offsets are attached (the registry's only deferred
//!    mutation).
//! 3. Generate: the C++ source and the JSON map are rendered.
//!
//! Any line-level failure aborts the whole run; no partial registry ever
//! reaches generation.

use crate::symbols::error::SymbolError;
use crate::symbols::extraction::SymbolRegistry;
use crate::symbols::{generation, numbering};

/// The rendered outputs of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedOutput {
    /// Generated C++ translation unit.
    pub source: String,
    /// JSON identifier map: profiler → tag → ID.
    pub map: String,
}

/// Extract the demangled eprofiler symbol from one `nm` dump line.
///
/// GNU `nm -u` prints an address column and a symbol-type marker before the
/// symbol (`                 U eprofiler::...`), and `c++filt` leaves both
/// in place. The symbol itself always starts at its root namespace, so the
/// suffix from the first `eprofiler::` onwards is the declaration. Returns
/// `None` for dump lines carrying no eprofiler symbol.
pub fn symbol_in_dump_line(line: &str) -> Option<&str> {
    line.find("eprofiler::").map(|start| &line[start..])
}

/// Parse all lines and assign IDs, returning the finished registry.
///
/// Blank lines are skipped; every other line must be a well-formed symbol
/// declaration. Callers are expected to have filtered the dump down to
/// eprofiler symbols already, see [symbol_in_dump_line].
pub fn run_pipeline<I, S>(lines: I) -> Result<SymbolRegistry, SymbolError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut registry = SymbolRegistry::new();
    for line in lines {
        let line = line.as_ref().trim();
        if line.is_empty() {
            continue;
        }
        registry.record_line(line)?;
    }
    numbering::assign_ids(&mut registry);
    Ok(registry)
}

/// Render both outputs from a numbered registry.
pub fn generate(registry: &SymbolRegistry) -> GeneratedOutput {
    GeneratedOutput {
        source: generation::render_source(registry),
        map: generation::render_map(registry),
    }
}
