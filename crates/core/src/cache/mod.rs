mod cacheable;
mod error;
mod keys;
mod traits;

pub use cacheable::is_cacheable;
pub use error::{CacheError, Result};
pub use keys::{
    default_key, short_type_name, to_kebab_case, DeriveKeyFn, DeriveKeysFn, IntoCacheKeys,
    InvalidationKeys, KeyGenerator,
};
pub use traits::{CacheEntry, CacheValue, Store};
