use serde_json::Value;

/// Default cacheability predicate.
///
/// A value may be stored unless it is `null` (which is also how `None` and
/// `()` serialize) or an empty array.
///
/// # Examples
///
/// ```
/// use memento_core::cache::is_cacheable;
/// use serde_json::json;
///
/// assert!(!is_cacheable(&json!(null)));
/// assert!(!is_cacheable(&json!([])));
/// assert!(is_cacheable(&json!({})));
/// assert!(is_cacheable(&json!(false)));
/// ```
pub fn is_cacheable(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Array(items) => !items.is_empty(),
        _ => true,
    }
}
