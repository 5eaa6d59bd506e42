//! Command-line generator for eprofiler link-time definitions.
//!
//! Usage:
//!   eprofiler-gen `<output>` `<static-lib>`
//!
//! Dumps the unresolved symbols of `<static-lib>` (`nm -u | c++filt`),
//! mines the eprofiler declarations out of them and writes three files:
//! `<output>` (the generated C++ translation unit), `<output>.json` (the
//! profiler → tag → ID map) and `<output>.txt` (the filtered symbol dump,
//! kept for inspection). The map is also printed to stdout. On any failure
//! the process exits non-zero and no output file is left behind, half
//! written or otherwise.

use clap::{Arg, Command};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command as Shell, Stdio};

use eprofiler_parser::{generate, run_pipeline, symbol_in_dump_line, SymbolError};

fn main() {
    let matches = Command::new("eprofiler-gen")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Generates eprofiler link-time definitions from a static library's unresolved symbols")
        .arg(
            Arg::new("output")
                .help("Path of the generated C++ source file")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::new("static-lib")
                .help("Static library to mine for unresolved eprofiler symbols")
                .required(true)
                .index(2),
        )
        .get_matches();

    let output = PathBuf::from(matches.get_one::<String>("output").expect("output is required"));
    let static_lib = PathBuf::from(
        matches
            .get_one::<String>("static-lib")
            .expect("static-lib is required"),
    );

    if let Err(error) = run(&output, &static_lib) {
        eprintln!("eprofiler-gen: {}", error);
        std::process::exit(1);
    }
}

fn run(output: &Path, static_lib: &Path) -> Result<(), Box<dyn std::error::Error>> {
    if !static_lib.exists() {
        return Err(Box::new(SymbolError::MissingInput(static_lib.to_path_buf())));
    }

    // nm prefixes each symbol with an address column and a type marker;
    // keep only the demangled declarations themselves.
    let dump = dump_symbols(static_lib)?;
    let lines: Vec<&str> = dump.lines().filter_map(symbol_in_dump_line).collect();

    let registry = run_pipeline(&lines)?;
    let generated = generate(&registry);

    // Outputs are finalized only once the whole pipeline has succeeded.
    write_atomic(&sibling(output, "txt"), &(lines.join("\n") + "\n"))?;
    write_atomic(output, &generated.source)?;
    write_atomic(&sibling(output, "json"), &generated.map)?;

    print!("{}", generated.map);
    Ok(())
}

/// `<output>.<ext>` next to the generated source file.
fn sibling(output: &Path, ext: &str) -> PathBuf {
    PathBuf::from(format!("{}.{}", output.display(), ext))
}

/// Dump unresolved symbols: `nm -u <lib> | c++filt`.
fn dump_symbols(static_lib: &Path) -> Result<String, Box<dyn std::error::Error>> {
    let mut nm = Shell::new("nm")
        .arg("-u")
        .arg(static_lib)
        .stdout(Stdio::piped())
        .spawn()
        .map_err(|e| format!("failed to run nm: {}", e))?;
    let nm_stdout = nm
        .stdout
        .take()
        .ok_or("failed to capture nm output")?;

    let filtered = Shell::new("c++filt")
        .stdin(Stdio::from(nm_stdout))
        .output()
        .map_err(|e| format!("failed to run c++filt: {}", e))?;

    let nm_status = nm.wait()?;
    if !nm_status.success() {
        return Err(format!("nm exited with {}", nm_status).into());
    }
    if !filtered.status.success() {
        return Err(format!("c++filt exited with {}", filtered.status).into());
    }

    Ok(String::from_utf8_lossy(&filtered.stdout).into_owned())
}

/// Write through a temp file in the target directory and rename into place,
/// so a failed run never leaves a half-written file.
fn write_atomic(path: &Path, contents: &str) -> Result<(), Box<dyn std::error::Error>> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(contents.as_bytes())?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
