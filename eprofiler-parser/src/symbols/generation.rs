//! Renders the generated C++ translation unit and the JSON identifier map.
//!
//! The emitted file has to satisfy every unresolved symbol the registry was
//! mined from: one `to_id()` accessor definition per tag, one `offset`
//! static-member definition per profiler and, where flagged, a fixed-size
//! backing array bound into the hashtable's `value_store` span. The JSON
//! map persists the same numbering for external tooling.

use serde_json::Value;

use crate::symbols::extraction::{ProfilerRecord, SymbolRegistry};

/// Include preamble of the generated translation unit.
const PREAMBLE: &str = "#include <cstdint>\n#include <eprofiler/eprofiler.hpp>\n";

/// Render the generated C++ source. Assumes numbering has run; an
/// unnumbered entity renders as 0, which the tests rule out.
pub fn render_source(registry: &SymbolRegistry) -> String {
    let mut out = String::from(PREAMBLE);
    for profiler in &registry.profilers {
        out.push('\n');
        render_profiler(&mut out, profiler);
    }
    out
}

fn render_profiler(out: &mut String, profiler: &ProfilerRecord) {
    let hashtable = profiler.hashtable_type.render();

    out.push_str(&format!(
        "// profiler \"{}\"\ntemplate<>\n{} {}::offset = {};\n",
        profiler.name,
        profiler.key_type,
        hashtable,
        profiler.offset.unwrap_or(0),
    ));

    for tag in &profiler.tags {
        out.push_str(&format!(
            "\ntemplate<>\ntemplate<>\n{} {} noexcept {{\n    return {};\n}}\n",
            profiler.key_type,
            tag.ast.render(),
            tag.id.unwrap_or(0),
        ));
    }

    if profiler.needs_value_store {
        // A zero-length array is ill-formed C++; one slot suffices for a
        // profiler that declared storage but no tags.
        let slots = profiler.tags.len().max(1);
        let array = format!("value_store_{}", profiler.name_hash);
        out.push_str(&format!(
            "\nstatic {value_type} {array}[{slots}] = {{}};\ntemplate<>\nconst std::span<{value_type}> {hashtable}::value_store = {array};\n",
            value_type = profiler.value_type,
        ));
    }
}

/// Render the identifier map: profiler name → tag name → assigned ID,
/// first-seen order preserved.
pub fn render_map(registry: &SymbolRegistry) -> String {
    let mut profilers = serde_json::Map::new();
    for profiler in &registry.profilers {
        let mut tags = serde_json::Map::new();
        for tag in &profiler.tags {
            tags.insert(tag.name.clone(), Value::from(tag.id.unwrap_or(0)));
        }
        profilers.insert(profiler.name.clone(), Value::Object(tags));
    }
    format!("{:#}\n", Value::Object(profilers))
}
