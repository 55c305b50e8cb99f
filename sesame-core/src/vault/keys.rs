//! Storage key layout for the secure key-value store.

/// Key holding the serialized PIN envelope.
pub(crate) const PIN_KEY: &str = "sesame_pin";

/// Key holding the setup-complete flag.
pub(crate) const SETUP_FLAG_KEY: &str = "sesame_setup_complete";

/// Value stored under [`SETUP_FLAG_KEY`] once setup has finished.
pub(crate) const SETUP_FLAG_VALUE: &str = "true";

/// Key holding the record index (JSON array of id strings).
pub(crate) const INDEX_KEY: &str = "sesame_record_list";

/// Prefix for per-record keys.
const RECORD_KEY_PREFIX: &str = "sesame_record_";

/// Derives the storage key for a record id.
pub(crate) fn record_key(id: &str) -> String {
    format!("{RECORD_KEY_PREFIX}{id}")
}
