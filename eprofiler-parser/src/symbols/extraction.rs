//! Folds parsed symbol ASTs into the profiler registry.
//!
//! Every eprofiler symbol has a fixed structural shape (see
//! `linktimehashtable.hpp` in the C++ library): the scope chain's root is
//! the library namespace, its child is the link-time hashtable
//! instantiation, and — for tag accessors — the hashtable's child is the
//! `StringConstant_WithID` tag type. The profiler's declared name is the
//! first template argument of the hashtable's first template argument: a
//! constructed literal whose initializer list spells the name one character
//! code per element. Tag names are spelled the same way across the tag
//! type's template arguments, after the leading ID-kind tag.
//!
//! The registry is the single piece of long-lived state in the whole run.
//! It is built by exactly one linear pass and only mutated afterwards by
//! [numbering](crate::symbols::numbering), which attaches IDs and offsets.

use sha2::{Digest, Sha256};

use crate::symbols::ast::{InitializerList, Literal, LiteralValue, Node, Type};
use crate::symbols::error::SymbolError;
use crate::symbols::parsing;

/// Decode a character-sequence string encoding: one integer character code
/// per element, concatenated in order. A single trailing NUL (the C++ char
/// array terminator) is dropped. Returns `None` if any code is not a valid
/// Unicode scalar value.
pub fn decode_char_sequence(values: &[i64]) -> Option<String> {
    let values = match values.split_last() {
        Some((&0, rest)) => rest,
        _ => values,
    };
    values
        .iter()
        .map(|&v| u32::try_from(v).ok().and_then(char::from_u32))
        .collect()
}

/// One discovered tag: the AST of its `to_id()` symbol (profiler-name
/// literal already substituted) and, after numbering, its assigned ID.
#[derive(Debug, Clone)]
pub struct TagRecord {
    pub name: String,
    pub ast: Type,
    pub id: Option<u64>,
}

/// One discovered profiler, keyed by its decoded name.
#[derive(Debug, Clone)]
pub struct ProfilerRecord {
    pub name: String,
    /// Second template argument of the hashtable type, rendered.
    pub key_type: String,
    /// Third template argument of the hashtable type, rendered.
    pub value_type: String,
    /// The chain cut down to the hashtable level, member-free; target of
    /// the emitted `offset` and `value_store` definitions.
    pub hashtable_type: Type,
    /// First ID assigned to this profiler's tags; set during numbering.
    pub offset: Option<u64>,
    /// Deterministic content hash of the profiler name, used only to
    /// disambiguate generated symbol names.
    pub name_hash: String,
    /// Whether a backing value array must be emitted.
    pub needs_value_store: bool,
    pub tags: Vec<TagRecord>,
}

/// The registry built by the parse pass: profilers in first-seen order,
/// tags in first-seen order within each profiler.
#[derive(Debug, Default)]
pub struct SymbolRegistry {
    pub profilers: Vec<ProfilerRecord>,
}

impl SymbolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of tags across all profilers.
    pub fn tag_count(&self) -> usize {
        self.profilers.iter().map(|p| p.tags.len()).sum()
    }

    /// Parse one symbol line and fold it into the registry.
    pub fn record_line(&mut self, line: &str) -> Result<(), SymbolError> {
        let ast = parsing::parse_line(line)?;
        self.record(ast, line)
    }

    /// Fold one parsed symbol into the registry.
    pub fn record(&mut self, mut ast: Type, line: &str) -> Result<(), SymbolError> {
        let member_name = match ast.tail().member.as_ref() {
            Some(member) => member.name.clone(),
            None => return Err(SymbolError::malformed(line, "missing member declaration")),
        };
        if !matches!(member_name.as_str(), "to_id" | "offset" | "value_store") {
            return Err(SymbolError::UnrecognizedMember {
                member: member_name,
            });
        }

        // Decode the profiler name and substitute its character-array
        // encoding with a quoted string literal, so every later rendering
        // of this AST prints the human-readable name.
        let profiler_name = substitute_profiler_name(&mut ast, line)?;

        let index = match self.profilers.iter().position(|p| p.name == profiler_name) {
            Some(index) => index,
            None => {
                self.profilers.push(profiler_record(&ast, profiler_name, line)?);
                self.profilers.len() - 1
            }
        };

        match member_name.as_str() {
            "value_store" => self.profilers[index].needs_value_store = true,
            "offset" => {}
            _ => {
                let tag_name = decode_tag_name(&ast, line)?;
                let profiler = &mut self.profilers[index];
                if !profiler.tags.iter().any(|t| t.name == tag_name) {
                    profiler.tags.push(TagRecord {
                        name: tag_name,
                        ast,
                        id: None,
                    });
                }
            }
        }
        Ok(())
    }
}

/// The hashtable level of a symbol chain: the root's child.
fn hashtable_of<'a>(root: &'a Type, line: &str) -> Result<&'a Type, SymbolError> {
    root.child
        .as_deref()
        .ok_or_else(|| SymbolError::malformed(line, "symbol has no hashtable scope level"))
}

/// Locate the profiler-name literal: first template argument of the
/// hashtable's first template argument.
fn profiler_name_literal_mut<'a>(root: &'a mut Type) -> Option<&'a mut Literal> {
    let hashtable = root.child.as_deref_mut()?;
    // The instantiation argument is itself a scoped type; its template
    // arguments sit on the chain tail.
    let instantiation = match hashtable.args.first_mut()? {
        Node::Type(ty) => ty.tail_mut(),
        _ => return None,
    };
    match instantiation.args.first_mut()? {
        Node::Literal(literal) => Some(literal),
        _ => None,
    }
}

/// Decode the profiler name from its fixed structural position and replace
/// the character-array encoding with a plain quoted string literal.
fn substitute_profiler_name(root: &mut Type, line: &str) -> Result<String, SymbolError> {
    let literal = profiler_name_literal_mut(root)
        .ok_or_else(|| SymbolError::malformed(line, "profiler name literal not found"))?;
    let list = match &literal.value {
        LiteralValue::List(list) => list,
        _ => {
            return Err(SymbolError::malformed(
                line,
                "profiler name is not an initializer list",
            ))
        }
    };

    let mut codes = Vec::with_capacity(list.0.len());
    for element in &list.0 {
        match element {
            Node::Literal(lit) if lit.casts.is_empty() => match lit.value {
                LiteralValue::Integer(code) => codes.push(code),
                _ => {
                    return Err(SymbolError::malformed(
                        line,
                        "non-integer element in name encoding",
                    ))
                }
            },
            _ => {
                return Err(SymbolError::malformed(
                    line,
                    "cast or non-literal element in name encoding",
                ))
            }
        }
    }

    let name = decode_char_sequence(&codes)
        .ok_or_else(|| SymbolError::malformed(line, "invalid character code in name encoding"))?;
    literal.value = LiteralValue::List(InitializerList(vec![Node::Literal(Literal::string(
        name.clone(),
    ))]));
    Ok(name)
}

/// Decode a tag name from the tag type's template arguments, skipping the
/// leading ID-kind tag. Each remaining argument must be a single integer
/// character literal; a `(char)` cast is tolerated there since demanglers
/// spell char non-type arguments that way.
fn decode_tag_name(root: &Type, line: &str) -> Result<String, SymbolError> {
    let tag_type = hashtable_of(root, line)?
        .child
        .as_deref()
        .ok_or_else(|| SymbolError::malformed(line, "tag accessor has no tag scope level"))?;
    if tag_type.args.is_empty() {
        return Err(SymbolError::malformed(line, "tag type has no arguments"));
    }

    let mut codes = Vec::with_capacity(tag_type.args.len() - 1);
    for argument in tag_type.args.iter().skip(1) {
        match argument {
            Node::Literal(lit) => match lit.as_integer() {
                Some(code) => codes.push(code),
                None => {
                    return Err(SymbolError::malformed(
                        line,
                        "non-integer character in tag name encoding",
                    ))
                }
            },
            _ => {
                return Err(SymbolError::malformed(
                    line,
                    "non-literal character in tag name encoding",
                ))
            }
        }
    }
    decode_char_sequence(&codes)
        .ok_or_else(|| SymbolError::malformed(line, "invalid character code in tag name"))
}

/// Capture a new profiler record from the first symbol that names it.
fn profiler_record(
    root: &Type,
    name: String,
    line: &str,
) -> Result<ProfilerRecord, SymbolError> {
    let hashtable = hashtable_of(root, line)?;
    let key_type = hashtable
        .args
        .get(1)
        .ok_or_else(|| SymbolError::malformed(line, "hashtable type has no key type argument"))?
        .to_string();
    let value_type = hashtable
        .args
        .get(2)
        .ok_or_else(|| SymbolError::malformed(line, "hashtable type has no value type argument"))?
        .to_string();
    let name_hash = profiler_name_hash(&name);

    Ok(ProfilerRecord {
        name,
        key_type,
        value_type,
        hashtable_type: hashtable_signature(root, hashtable),
        offset: None,
        name_hash,
        needs_value_store: false,
        tags: Vec::new(),
    })
}

/// Rebuild the chain cut down to the hashtable level, member-free. Built
/// fresh from the immutable source tree rather than by mutating a clone.
fn hashtable_signature(root: &Type, hashtable: &Type) -> Type {
    Type {
        name: root.name.clone(),
        args: root.args.clone(),
        child: Some(Box::new(Type {
            name: hashtable.name.clone(),
            args: hashtable.args.clone(),
            child: None,
            member: None,
        })),
        member: None,
    }
}

/// First 8 bytes of SHA-256 over the profiler name, hex-encoded. Used only
/// as a disambiguating identifier fragment in generated symbol names.
fn profiler_name_hash(name: &str) -> String {
    let digest = Sha256::digest(name.as_bytes());
    hex::encode(&digest[..8])
}

#[cfg(test)]
mod tests {
    use super::*;

    // "Requests" spelled as character codes, with the array's trailing NUL.
    const REQUESTS: &str = "82, 101, 113, 117, 101, 115, 116, 115, 0";

    fn tag_line(chars: &str) -> String {
        format!(
            "eprofiler::LinkTimeHashTable<eprofiler::EProfiler<eprofiler::EProfilerName<9ul>{{{REQUESTS}}}, int, int>, int, int>::StringConstant_WithID<eprofiler::StringConstantID, {chars}>::to_id() const"
        )
    }

    fn store_line() -> String {
        format!(
            "eprofiler::LinkTimeHashTable<eprofiler::EProfiler<eprofiler::EProfilerName<9ul>{{{REQUESTS}}}, int, int>, int, int>::value_store"
        )
    }

    #[test]
    fn test_decode_round_trip() {
        assert_eq!(
            decode_char_sequence(&[72, 101, 108, 108, 111]).as_deref(),
            Some("Hello")
        );
    }

    #[test]
    fn test_decode_drops_single_trailing_nul() {
        assert_eq!(
            decode_char_sequence(&[72, 105, 0]).as_deref(),
            Some("Hi")
        );
        assert_eq!(decode_char_sequence(&[0]).as_deref(), Some(""));
    }

    #[test]
    fn test_decode_rejects_invalid_scalar() {
        assert_eq!(decode_char_sequence(&[-1]), None);
        assert_eq!(decode_char_sequence(&[0xD800]), None);
    }

    #[test]
    fn test_records_tag_with_decoded_names() {
        let mut registry = SymbolRegistry::new();
        registry
            .record_line(&tag_line("(char)71, (char)69, (char)84"))
            .expect("record failed");

        assert_eq!(registry.profilers.len(), 1);
        let profiler = &registry.profilers[0];
        assert_eq!(profiler.name, "Requests");
        assert_eq!(profiler.key_type, "int");
        assert_eq!(profiler.value_type, "int");
        assert_eq!(profiler.tags.len(), 1);
        assert_eq!(profiler.tags[0].name, "GET");
        assert!(!profiler.needs_value_store);

        // Substitution: the stored AST renders the readable name.
        let rendered = profiler.tags[0].ast.render();
        assert!(rendered.contains("EProfilerName<9ul>{\"Requests\"}"), "{rendered}");
        assert!(!rendered.contains("82"), "{rendered}");
    }

    #[test]
    fn test_hashtable_signature_strips_member_and_tag_level() {
        let mut registry = SymbolRegistry::new();
        registry
            .record_line(&tag_line("(char)71, (char)69, (char)84"))
            .expect("record failed");

        let signature = &registry.profilers[0].hashtable_type;
        assert_eq!(signature.chain_len(), 2);
        assert!(signature.tail().member.is_none());
        let rendered = signature.render();
        assert!(rendered.starts_with("eprofiler::LinkTimeHashTable<"), "{rendered}");
        assert!(!rendered.contains("StringConstant_WithID"), "{rendered}");
    }

    #[test]
    fn test_value_store_flags_profiler() {
        let mut registry = SymbolRegistry::new();
        registry.record_line(&store_line()).expect("record failed");

        assert_eq!(registry.profilers.len(), 1);
        assert!(registry.profilers[0].needs_value_store);
        assert!(registry.profilers[0].tags.is_empty());
    }

    #[test]
    fn test_unrecognized_member_is_fatal() {
        let line = "eprofiler::LinkTimeHashTable<eprofiler::EProfiler<eprofiler::EProfilerName<9ul>{72, 105, 0}, int, int>, int, int>::frobnicate";
        let err = SymbolRegistry::new().record_line(line).unwrap_err();
        assert_eq!(
            err,
            SymbolError::UnrecognizedMember {
                member: "frobnicate".to_string()
            }
        );
    }

    #[test]
    fn test_cast_inside_name_encoding_is_malformed() {
        let line = "eprofiler::LinkTimeHashTable<eprofiler::EProfiler<eprofiler::EProfilerName<3ul>{(char)72, 105, 0}, int, int>, int, int>::offset";
        let err = SymbolRegistry::new().record_line(line).unwrap_err();
        assert!(matches!(err, SymbolError::MalformedSymbolLine { .. }));
    }

    #[test]
    fn test_duplicate_tag_lines_are_idempotent() {
        let mut registry = SymbolRegistry::new();
        let line = tag_line("(char)71, (char)69, (char)84");
        registry.record_line(&line).expect("record failed");
        registry.record_line(&line).expect("record failed");
        assert_eq!(registry.profilers[0].tags.len(), 1);
    }

    #[test]
    fn test_name_hash_is_stable() {
        let a = profiler_name_hash("Requests");
        let b = profiler_name_hash("Requests");
        assert_eq!(a, b);
        assert_eq!(a.len(), 16);
        assert_ne!(a, profiler_name_hash("Responses"));
    }
}
