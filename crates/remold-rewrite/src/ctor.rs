//! The constructor/allocation rewrite: replacing the one-shot
//! "reflect and wrap" allocation idiom with the explicit two-step
//! allocate-then-initialise protocol.
//!
//! The old idiom heap-allocates an uninitialised value and registers it
//! with the tracing system in a single call, with the initialiser
//! embedded as an argument:
//!
//! ```text
//! reflect_dom_object(box Foo::new_inherited(a, b), global, FooBinding::Wrap)
//! ```
//!
//! The replacement allocates a tracked container first, populates it
//! with a dedicated initialiser call, and converts the local handle into
//! a rooted return value. The call expression routinely spans several
//! source lines, so these rules accumulate input until the
//! `Binding::Wrap)` terminator — an identifier-suffixed closing
//! parenthesis the corpus style guarantees is unique per call.

use crate::error::RewriteError;
use crate::rule::Rule;

/// Trigger for the plain and `Some(...)`-wrapped allocation idioms.
const REFLECT_TRIGGER: &str = "reflect_dom_object(";
/// Trigger for the node-like base record's allocation idiom.
const NODE_TRIGGER: &str = "Node::reflect_node(";
/// The terminator closing an accumulated allocation call.
const WRAP_TERMINATOR: &str = "::Wrap)";

/// Builds the constructor rule set, ordered most specific first.
///
/// The cascade relies on first-match-wins: the `Some(...)` shape is
/// tried before the plain shape, which would otherwise match inside it.
///
/// # Errors
///
/// Returns an error if a built-in pattern fails to compile, which would
/// be a defect in the table itself.
pub(crate) fn rules() -> Result<Vec<Rule>, RewriteError> {
    let some_variant = Rule::rewrite(
        "Some(reflect_dom_object(box $TYPE::new_inherited($$$ARGS), $$$GLOBAL, $BINDING::Wrap))",
        "let mut obj = alloc_dom_object::<$TYPE>($GLOBAL);\n\
         obj.new_inherited($ARGS);\n\
         Some(obj.into_root())",
    )?
    .accumulating(REFLECT_TRIGGER, WRAP_TERMINATOR)?;

    let node_variant = Rule::rewrite(
        "Node::reflect_node(box $TYPE::new_inherited($$$ARGS), $DOCUMENT, $BINDING::Wrap)",
        "let mut obj = Node::alloc_node::<$TYPE>($DOCUMENT);\n\
         obj.new_inherited($ARGS);\n\
         obj.into_root()",
    )?
    .accumulating(NODE_TRIGGER, WRAP_TERMINATOR)?;

    let plain_variant = Rule::rewrite(
        "reflect_dom_object(box $TYPE::new_inherited($$$ARGS), $$$GLOBAL, $BINDING::Wrap)",
        "let mut obj = alloc_dom_object::<$TYPE>($GLOBAL);\n\
         obj.new_inherited($ARGS);\n\
         obj.into_root()",
    )?
    .accumulating(REFLECT_TRIGGER, WRAP_TERMINATOR)?;

    let import = Rule::rewrite(
        "use dom::bindings::utils::reflect_dom_object;",
        "use dom::bindings::magic::alloc_dom_object;",
    )?;

    Ok(vec![some_variant, node_variant, plain_variant, import])
}
