//! Fixed lookup tables for Compose-specific names.
//!
//! These back the structural checks when the in-file symbol table cannot
//! resolve a name (external composables, framework calls). Pattern matching
//! is a documented source of false negatives/positives; the structural path
//! is always consulted first.

/// Substrings identifying reactive value container types.
pub const REACTIVE_TYPE_MARKERS: &[&str] = &[
    "State",
    "MutableState",
    "StateFlow",
    "SharedFlow",
    "Flow",
    "LiveData",
];

/// Factory calls that produce observed state.
pub const STATE_FACTORIES: &[&str] = &[
    "mutableStateOf",
    "mutableIntStateOf",
    "mutableLongStateOf",
    "mutableFloatStateOf",
    "mutableDoubleStateOf",
    "mutableStateListOf",
    "mutableStateMapOf",
    "derivedStateOf",
    "rememberSaveable",
    "collectAsState",
    "collectAsStateWithLifecycle",
    "observeAsState",
];

/// Lifecycle-bound side-effect constructs.
pub const EFFECT_CONSTRUCTS: &[&str] = &[
    "LaunchedEffect",
    "DisposableEffect",
    "SideEffect",
    "produceState",
];

/// Concurrency-launching calls counted as nested scopes inside effects.
pub const SCOPE_LAUNCHERS: &[&str] = &["launch", "async", "withContext"];

/// Collection-iteration calls that behave as loops when given a lambda.
pub const ITERATION_CALLS: &[&str] = &[
    "forEach",
    "forEachIndexed",
    "map",
    "mapIndexed",
    "mapNotNull",
    "filter",
    "filterNot",
    "flatMap",
    "fold",
    "reduce",
    "repeat",
    "takeWhile",
    "dropWhile",
    "onEach",
];

/// Calls whose lambda stays on the render path (no deferred execution).
pub const RENDER_SCOPE_CALLS: &[&str] = &[
    "remember",
    "derivedStateOf",
    "let",
    "run",
    "apply",
    "also",
    "with",
    "takeIf",
    "takeUnless",
];

/// State-provider lookups counted as distinct state sources.
pub const STATE_PROVIDER_CALLS: &[&str] = &["viewModel", "hiltViewModel", "koinViewModel"];

/// Pure structural factories whose results are invariant when their
/// arguments are (rule 5 of the constant classifier).
pub const PURE_FACTORIES: &[&str] = &[
    "listOf",
    "setOf",
    "mapOf",
    "arrayOf",
    "intArrayOf",
    "emptyList",
    "emptySet",
    "emptyMap",
    "persistentListOf",
    "Pair",
    "Triple",
];

/// Type-text substrings marking purely presentational parameters, excluded
/// from the complexity engine's relevant-parameter count.
pub const PRESENTATIONAL_TYPE_MARKERS: &[&str] = &[
    "Modifier",
    "Style",
    "Colors",
    "Color",
    "Shape",
    "PaddingValues",
    "Arrangement",
    "Alignment",
    "FontFamily",
    "TextUnit",
    "Dp",
];

/// Lowercased parameter-name fragments marking presentational parameters.
pub const PRESENTATIONAL_NAME_PATTERNS: &[&str] =
    &["modifier", "shape", "color", "style", "padding", "elevation"];

/// Returns true for `onClick`-shaped named-argument labels.
pub fn is_callback_label(label: &str) -> bool {
    let Some(rest) = label.strip_prefix("on") else {
        return false;
    };
    rest.chars().next().is_some_and(|c| c.is_ascii_uppercase())
}

/// Returns true when a callee name starts with an uppercase letter, the
/// Compose convention for UI-emitting calls.
pub fn is_capitalized(name: &str) -> bool {
    name.chars().next().is_some_and(|c| c.is_ascii_uppercase())
}

/// Returns true if the declared type text mentions a reactive container.
pub fn is_reactive_type(type_text: &str) -> bool {
    REACTIVE_TYPE_MARKERS.iter().any(|m| type_text.contains(m))
}

/// Returns true for parameters excluded from the relevant-parameter count.
pub fn is_presentational_parameter(name: &str, type_text: &str) -> bool {
    if PRESENTATIONAL_TYPE_MARKERS
        .iter()
        .any(|m| type_text.contains(m))
    {
        return true;
    }
    let lower = name.to_lowercase();
    PRESENTATIONAL_NAME_PATTERNS
        .iter()
        .any(|p| lower.contains(p))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn callback_labels() {
        assert!(is_callback_label("onClick"));
        assert!(is_callback_label("onValueChange"));
        assert!(!is_callback_label("once"));
        assert!(!is_callback_label("content"));
    }

    #[test]
    fn reactive_types() {
        assert!(is_reactive_type("State<Int>"));
        assert!(is_reactive_type("StateFlow<List<User>>"));
        assert!(!is_reactive_type("String"));
    }

    #[test]
    fn presentational_parameters() {
        assert!(is_presentational_parameter("modifier", "Modifier"));
        assert!(is_presentational_parameter("titleStyle", "TextStyle"));
        assert!(!is_presentational_parameter("items", "List<User>"));
    }
}
