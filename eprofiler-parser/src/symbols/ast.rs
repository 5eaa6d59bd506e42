//! Typed AST for the demangled-symbol sub-language.
//!
//! The node hierarchy is a closed set of variants matched exhaustively at
//! every consumer: a scoped [Type] (optionally an [ArrayType]), a [Literal]
//! and an [InitializerList]. Scope chains are strictly acyclic linear chains
//! owned top-down through `child`, terminating in an optional [Member].
//!
//! Rendering back to C++ source text lives here too, since every stage that
//! emits text (key/value type capture, code generation) shares the same
//! rules: `name<arg, arg>` for template packs, `::template Child<...>` when
//! a template child hangs off a template parent (dependent-name lookup),
//! `elem [len]` for arrays, casts outermost-first for literals.

use std::fmt;

/// Any node that can appear in a template argument pack or initializer list.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Type(Type),
    Array(ArrayType),
    Literal(Literal),
    List(InitializerList),
}

/// A named type: template arguments, an optional scope-chain child and an
/// optional terminal member.
#[derive(Debug, Clone, PartialEq)]
pub struct Type {
    pub name: String,
    pub args: Vec<Node>,
    pub child: Option<Box<Type>>,
    pub member: Option<Member>,
}

impl Type {
    /// A bare type with no template arguments.
    pub fn named(name: impl Into<String>) -> Self {
        Type {
            name: name.into(),
            args: Vec::new(),
            child: None,
            member: None,
        }
    }

    /// The last type of the scope chain.
    pub fn tail(&self) -> &Type {
        match self.child.as_deref() {
            Some(child) => child.tail(),
            None => self,
        }
    }

    /// Mutable access to the last type of the scope chain.
    pub fn tail_mut(&mut self) -> &mut Type {
        match self.child {
            Some(ref mut child) => child.tail_mut(),
            None => self,
        }
    }

    /// Number of types in the scope chain, the member excluded.
    pub fn chain_len(&self) -> usize {
        let mut n = 1;
        let mut cursor = self;
        while let Some(child) = cursor.child.as_deref() {
            n += 1;
            cursor = child;
        }
        n
    }

    /// Render to C++ source text.
    pub fn render(&self) -> String {
        self.to_string()
    }
}

/// A fixed-size array spelling: element type plus element count.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayType {
    pub elem: Type,
    pub len: u64,
}

/// Member kind of a static-member declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberKind {
    Function,
    Variable,
}

/// cv-qualifier on a member declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CvQualifier {
    Const,
    Volatile,
}

impl fmt::Display for CvQualifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CvQualifier::Const => f.write_str("const"),
            CvQualifier::Volatile => f.write_str("volatile"),
        }
    }
}

/// The innermost declaration a symbol denotes.
#[derive(Debug, Clone, PartialEq)]
pub struct Member {
    pub name: String,
    pub kind: MemberKind,
    pub qualifiers: Vec<CvQualifier>,
}

/// Payload of a [Literal].
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    Integer(i64),
    Str(String),
    List(InitializerList),
}

/// A literal template argument: optional stacked C-style casts
/// (outermost-to-innermost), an optional constructed-value type, the value
/// and an optional numeric or literal-operator suffix.
#[derive(Debug, Clone, PartialEq)]
pub struct Literal {
    pub casts: Vec<Type>,
    pub ty: Option<Box<Node>>,
    pub value: LiteralValue,
    pub suffix: Option<String>,
}

impl Literal {
    pub fn integer(value: i64) -> Self {
        Literal {
            casts: Vec::new(),
            ty: None,
            value: LiteralValue::Integer(value),
            suffix: None,
        }
    }

    pub fn string(value: impl Into<String>) -> Self {
        Literal {
            casts: Vec::new(),
            ty: None,
            value: LiteralValue::Str(value.into()),
            suffix: None,
        }
    }

    /// The integer payload, if this literal carries one (casts ignored).
    pub fn as_integer(&self) -> Option<i64> {
        match self.value {
            LiteralValue::Integer(v) => Some(v),
            _ => None,
        }
    }
}

/// Braced-init-list: an ordered sequence of literal or type elements.
#[derive(Debug, Clone, PartialEq)]
pub struct InitializerList(pub Vec<Node>);

fn write_joined(f: &mut fmt::Formatter<'_>, items: &[Node]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Type(ty) => write!(f, "{}", ty),
            Node::Array(arr) => write!(f, "{}", arr),
            Node::Literal(lit) => write!(f, "{}", lit),
            Node::List(list) => write!(f, "{}", list),
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if !self.args.is_empty() {
            f.write_str("<")?;
            write_joined(f, &self.args)?;
            f.write_str(">")?;
        }
        if let Some(child) = self.child.as_deref() {
            // `template` disambiguator only where lookup is dependent: a
            // template child named inside a template parent's scope.
            if !self.args.is_empty() && !child.args.is_empty() {
                write!(f, "::template {}", child)?;
            } else {
                write!(f, "::{}", child)?;
            }
        }
        if let Some(member) = &self.member {
            write!(f, "::{}", member)?;
        }
        Ok(())
    }
}

impl fmt::Display for ArrayType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.elem, self.len)
    }
}

impl fmt::Display for Member {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if self.kind == MemberKind::Function {
            f.write_str("()")?;
        }
        for qual in &self.qualifiers {
            write!(f, " {}", qual)?;
        }
        Ok(())
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for cast in &self.casts {
            write!(f, "({})", cast)?;
        }
        if let Some(ty) = self.ty.as_deref() {
            write!(f, "{}", ty)?;
        }
        match &self.value {
            LiteralValue::Integer(v) => write!(f, "{}", v)?,
            LiteralValue::Str(s) => write!(f, "\"{}\"", s)?,
            LiteralValue::List(list) => write!(f, "{}", list)?,
        }
        if let Some(suffix) = &self.suffix {
            f.write_str(suffix)?;
        }
        Ok(())
    }
}

impl fmt::Display for InitializerList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        write_joined(f, &self.0)?;
        f.write_str("}")?;
        Ok(())
    }
}
