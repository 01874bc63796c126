use proptest::prelude::*;
use proptest::strategy::Just;

/// Strategy for import urls such as `theme`, `lib/grid` or `_partial`
pub fn import_url_strategy() -> impl Strategy<Value = String> {
    "[a-z_][a-z0-9_]{0,8}(/[a-z][a-z0-9_]{0,8})?"
}

/// Strategy for parent contexts, including the sentinels that normalise to `stdin`
pub fn parent_context_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        Just("string".to_string()),
        Just("stdin".to_string()),
        import_url_strategy(),
    ]
}

/// Strategy for import bodies
pub fn body_strategy() -> impl Strategy<Value = String> {
    "[a-z.#:; {}]{0,32}"
}

/// Strategy for a sequence of override store records
pub fn records_strategy() -> impl Strategy<Value = Vec<(String, String, String)>> {
    prop::collection::vec(
        (parent_context_strategy(), import_url_strategy(), body_strategy()),
        0..24,
    )
}

/// Strategy for cache insertion sequences over a small key space so keys repeat
pub fn cache_inserts_strategy() -> impl Strategy<Value = Vec<(u8, u8)>> {
    prop::collection::vec((0u8..6, 0u8..3), 0..64)
}
