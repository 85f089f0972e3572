//! Node-kind classification.
//!
//! Kind strings come from the `tree-sitter-kotlin-ng` grammar. Note that the
//! grammar lexes `true`, `false` and `null` as plain `identifier` tokens, so
//! those are not covered by [`is_literal`]; callers that care inspect the
//! token text.

/// A syntactic control construct.
///
/// The variants are matched exhaustively at every counting site, so adding a
/// construct forces those sites to be revisited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlConstruct {
    /// An `if` expression (each link of an `else if` chain is its own node).
    If,
    /// A `when` expression.
    When,
    /// A `for` loop.
    For,
    /// A `while` loop.
    While,
    /// A `do`/`while` loop.
    DoWhile,
    /// A functional iteration call with a lambda body (`forEach`, `map`, ...).
    ///
    /// Never produced by [`control_construct`]; classification requires the
    /// callee name, which the caller resolves.
    IterationCall,
}

impl ControlConstruct {
    /// Returns true for looping constructs.
    pub fn is_loop(self) -> bool {
        match self {
            ControlConstruct::If | ControlConstruct::When => false,
            ControlConstruct::For
            | ControlConstruct::While
            | ControlConstruct::DoWhile
            | ControlConstruct::IterationCall => true,
        }
    }
}

/// Classifies a node kind as a keyword-level control construct.
///
/// Iteration calls are not recognized here; they are call expressions and
/// need the callee name.
pub fn control_construct(kind: &str) -> Option<ControlConstruct> {
    match kind {
        "if_expression" => Some(ControlConstruct::If),
        "when_expression" => Some(ControlConstruct::When),
        "for_statement" => Some(ControlConstruct::For),
        "while_statement" => Some(ControlConstruct::While),
        "do_while_statement" => Some(ControlConstruct::DoWhile),
        _ => None,
    }
}

/// Returns true for non-string literal constants (numbers and chars).
pub fn is_literal(kind: &str) -> bool {
    matches!(
        kind,
        "number_literal" | "float_literal" | "character_literal"
    )
}

/// Returns true for string literal nodes.
pub fn is_string_literal(kind: &str) -> bool {
    matches!(kind, "string_literal" | "multiline_string_literal")
}

/// Returns true for string interpolation segments (`$name` and `${expr}`
/// both parse as `interpolation`).
pub fn is_interpolation(kind: &str) -> bool {
    kind == "interpolation"
}

/// Returns true for lambda literal nodes.
pub fn is_lambda(kind: &str) -> bool {
    matches!(kind, "lambda_literal" | "annotated_lambda")
}
