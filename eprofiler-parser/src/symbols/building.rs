//! AST-construction helpers shared by the parser.
//!
//! The grammar walk in [parsing](crate::symbols::parsing) recognizes token
//! shapes; everything that actually assembles nodes lives here: linking a
//! scope path into a single chain, attaching the terminal member, folding
//! fundamental integer spellings into plain named types and assembling
//! literals with their cast stacks.

use crate::symbols::ast::{
    InitializerList, Literal, LiteralValue, Member, Node, Type,
};

/// Link an ordered scope path into one chain and return its head.
///
/// `[A, B<char>, C]` becomes `A::B<char>::C` with each node owning the next
/// as its `child`. A singleton list is returned unchanged; an empty list has
/// no valid head.
pub fn chain_types(types: Vec<Type>) -> Option<Type> {
    let mut iter = types.into_iter().rev();
    let mut head = iter.next()?;
    for mut parent in iter {
        parent.child = Some(Box::new(head));
        head = parent;
    }
    Some(head)
}

/// Attach the terminal member to the tail of a scope chain.
pub fn attach_member(chain: &mut Type, member: Member) {
    chain.tail_mut().member = Some(member);
}

/// Fold a fundamental integer spelling (`unsigned long long int`,
/// `long double`, ...) into a zero-argument type named by its spelled text.
pub fn fold_fundamental(words: &[&str]) -> Type {
    Type::named(words.join(" "))
}

/// Assemble a literal from its parsed pieces. Casts are stacked
/// outermost-to-innermost exactly as they appeared in the source; rendering
/// concatenates them back in the same order.
pub fn assemble_literal(
    casts: Vec<Type>,
    ty: Option<Node>,
    value: LiteralValue,
    suffix: Option<String>,
) -> Literal {
    Literal {
        casts,
        ty: ty.map(Box::new),
        value,
        suffix,
    }
}

/// Assemble a constructed value: a type (or array type) braced-initialized
/// with a list of literal elements.
pub fn constructed_value(ty: Node, list: InitializerList) -> Literal {
    assemble_literal(Vec::new(), Some(ty), LiteralValue::List(list), None)
}
