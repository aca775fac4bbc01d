//! Cache key generation.
//!
//! A [`KeyGenerator`] turns a call's receiver, operation name and arguments
//! into the string key the interceptor reads and writes. An
//! [`InvalidationKeys`] describes which keys an invalidating call removes.

use std::fmt;
use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Serialize;
use serde_json::Value;

use super::Result;

/// Function deriving a cache key from the receiver and the call arguments.
pub type DeriveKeyFn<R, A> = Arc<dyn Fn(&R, &A) -> String + Send + Sync>;

/// Function deriving the keys to invalidate from the receiver and arguments.
pub type DeriveKeysFn<R, A> = Arc<dyn Fn(&R, &A) -> Vec<String> + Send + Sync>;

/// Strategy for building the cache key of a call.
///
/// - `Default`: `<receiver-type>:<operation>:<base64 of the JSON arguments>`
/// - `Fixed`: one literal shared by every call, whatever the arguments
/// - `Derived`: a caller-supplied function of the receiver and arguments
///
/// Strings convert into `Fixed`, and `KeyGenerator::default()` is `Default`.
pub enum KeyGenerator<R, A> {
    Default,
    Fixed(String),
    Derived(DeriveKeyFn<R, A>),
}

impl<R, A> KeyGenerator<R, A> {
    /// Creates a generator that always returns `key`.
    pub fn fixed(key: impl Into<String>) -> Self {
        Self::Fixed(key.into())
    }

    /// Creates a generator backed by `f`, called with the receiver itself.
    pub fn derived<F>(f: F) -> Self
    where
        F: Fn(&R, &A) -> String + Send + Sync + 'static,
    {
        Self::Derived(Arc::new(f))
    }

    /// Generates the key for a call of `operation` on `receiver`.
    pub fn generate(&self, receiver: &R, operation: &str, args: &A) -> Result<String>
    where
        A: Serialize,
    {
        match self {
            Self::Default => default_key(short_type_name::<R>(), operation, args),
            Self::Fixed(key) => Ok(key.clone()),
            Self::Derived(f) => Ok(f(receiver, args)),
        }
    }
}

impl<R, A> Default for KeyGenerator<R, A> {
    fn default() -> Self {
        Self::Default
    }
}

impl<R, A> Clone for KeyGenerator<R, A> {
    fn clone(&self) -> Self {
        match self {
            Self::Default => Self::Default,
            Self::Fixed(key) => Self::Fixed(key.clone()),
            Self::Derived(f) => Self::Derived(Arc::clone(f)),
        }
    }
}

impl<R, A> fmt::Debug for KeyGenerator<R, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Default => f.write_str("Default"),
            Self::Fixed(key) => f.debug_tuple("Fixed").field(key).finish(),
            Self::Derived(_) => f.write_str("Derived(..)"),
        }
    }
}

impl<R, A> From<&str> for KeyGenerator<R, A> {
    fn from(key: &str) -> Self {
        Self::fixed(key)
    }
}

impl<R, A> From<String> for KeyGenerator<R, A> {
    fn from(key: String) -> Self {
        Self::Fixed(key)
    }
}

/// Values that can be turned into a list of cache keys.
pub trait IntoCacheKeys {
    fn into_cache_keys(self) -> Vec<String>;
}

impl IntoCacheKeys for String {
    fn into_cache_keys(self) -> Vec<String> {
        vec![self]
    }
}

impl IntoCacheKeys for &str {
    fn into_cache_keys(self) -> Vec<String> {
        vec![self.to_string()]
    }
}

impl IntoCacheKeys for Vec<String> {
    fn into_cache_keys(self) -> Vec<String> {
        self
    }
}

impl IntoCacheKeys for Vec<&str> {
    fn into_cache_keys(self) -> Vec<String> {
        self.into_iter().map(str::to_string).collect()
    }
}

impl<const N: usize> IntoCacheKeys for [&str; N] {
    fn into_cache_keys(self) -> Vec<String> {
        self.into_iter().map(str::to_string).collect()
    }
}

/// Keys removed by an invalidating call: a literal list or a function of
/// the receiver and arguments.
pub enum InvalidationKeys<R, A> {
    Literal(Vec<String>),
    Derived(DeriveKeysFn<R, A>),
}

impl<R, A> InvalidationKeys<R, A> {
    /// Creates invalidation keys computed from each call.
    ///
    /// The function may return a single key or a list of keys.
    pub fn derived<F, K>(f: F) -> Self
    where
        F: Fn(&R, &A) -> K + Send + Sync + 'static,
        K: IntoCacheKeys,
    {
        Self::Derived(Arc::new(move |receiver: &R, args: &A| {
            f(receiver, args).into_cache_keys()
        }))
    }

    /// Resolves the keys for one call.
    pub fn resolve(&self, receiver: &R, args: &A) -> Vec<String> {
        match self {
            Self::Literal(keys) => keys.clone(),
            Self::Derived(f) => f(receiver, args),
        }
    }
}

impl<R, A, K: IntoCacheKeys> From<K> for InvalidationKeys<R, A> {
    fn from(keys: K) -> Self {
        Self::Literal(keys.into_cache_keys())
    }
}

impl<R, A> Clone for InvalidationKeys<R, A> {
    fn clone(&self) -> Self {
        match self {
            Self::Literal(keys) => Self::Literal(keys.clone()),
            Self::Derived(f) => Self::Derived(Arc::clone(f)),
        }
    }
}

impl<R, A> fmt::Debug for InvalidationKeys<R, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(keys) => f.debug_tuple("Literal").field(keys).finish(),
            Self::Derived(_) => f.write_str("Derived(..)"),
        }
    }
}

/// Builds the default key for a call.
///
/// Arguments are serialized through `serde_json::Value` so object fields are
/// emitted in sorted order, making structurally equal arguments produce the
/// same key.
///
/// # Examples
///
/// ```
/// use memento_core::cache::default_key;
///
/// let key = default_key("UserService", "findById", &(123,)).unwrap();
/// assert_eq!(key, "user-service:find-by-id:WzEyM10=");
/// ```
pub fn default_key<A>(receiver_type: &str, operation: &str, args: &A) -> Result<String>
where
    A: Serialize + ?Sized,
{
    // `()` is the empty argument list and keys as `[]`, not `null`
    let canonical = if std::any::type_name::<A>() == "()" {
        Value::Array(Vec::new())
    } else {
        serde_json::to_value(args)?
    };
    let json = serde_json::to_vec(&canonical)?;
    let prefix = to_kebab_case(&format!("{receiver_type}:{operation}"));

    Ok(format!("{}:{}", prefix, STANDARD.encode(json)))
}

/// Returns the unqualified name of `T`, without module path or generics.
pub fn short_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    let without_generics = full.split('<').next().unwrap_or(full);
    without_generics
        .rsplit("::")
        .next()
        .unwrap_or(without_generics)
}

/// Converts camelCase, PascalCase and snake_case identifiers to kebab-case.
///
/// Separators other than `_`, `-` and spaces (such as `:`) are kept as-is.
///
/// # Examples
///
/// ```
/// use memento_core::cache::to_kebab_case;
///
/// assert_eq!(to_kebab_case("MyService:myMethod"), "my-service:my-method");
/// assert_eq!(to_kebab_case("find_by_id"), "find-by-id");
/// assert_eq!(to_kebab_case("HTTPClient"), "http-client");
/// ```
pub fn to_kebab_case(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut out = String::with_capacity(input.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if c == '_' || c == '-' || c == ' ' {
            if !out.is_empty() && !out.ends_with(['-', ':']) {
                out.push('-');
            }
            continue;
        }

        if c.is_uppercase() {
            let prev = i.checked_sub(1).map(|p| chars[p]);
            let next = chars.get(i + 1).copied();
            let boundary = match prev {
                Some(p) if p.is_lowercase() || p.is_ascii_digit() => true,
                // End of an acronym: "HTTPClient" splits before "Client"
                Some(p) if p.is_uppercase() => next.is_some_and(char::is_lowercase),
                _ => false,
            };
            if boundary && !out.ends_with('-') {
                out.push('-');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }

    out
}
