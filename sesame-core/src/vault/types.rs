//! Credential record types and validation.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::VaultError;
use super::VaultResult;

/// A stored credential record.
///
/// Serialized as a flat JSON object with camelCase keys; optional fields
/// are omitted when absent. There is no format-version field, so a future
/// layout change needs its own migration story.
///
/// `id` and `created_at` are set once at creation and never change;
/// `updated_at` is refreshed on every mutation after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, uniffi::Record)]
#[serde(rename_all = "camelCase")]
pub struct CredentialRecord {
    /// Opaque unique identifier, assigned at creation.
    pub id: String,
    /// Display name. Never empty.
    pub title: String,
    /// Optional identity string (account name, email).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// The protected value itself. Clear text inside the record; the
    /// backing store is responsible for encryption at rest.
    pub secret: String,
    /// Optional site or service URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Optional free-form notes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Creation time, unix seconds. Immutable.
    pub created_at: u64,
    /// Last mutation time, unix seconds. Absent until the first update.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<u64>,
}

/// Caller-supplied fields for creating or updating a record.
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Record)]
pub struct RecordDraft {
    /// Display name, required.
    pub title: String,
    /// Optional identity string.
    pub username: Option<String>,
    /// The protected value, required.
    pub secret: String,
    /// Optional site or service URL.
    pub url: Option<String>,
    /// Optional free-form notes.
    pub notes: Option<String>,
}

impl RecordDraft {
    /// Validates and trims the draft.
    ///
    /// `title` and `secret` must be non-empty after trimming; optional
    /// fields that trim to empty become absent.
    pub(crate) fn normalized(&self) -> VaultResult<Self> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(VaultError::invalid_field("title", "must not be empty"));
        }
        let secret = self.secret.trim();
        if secret.is_empty() {
            return Err(VaultError::invalid_field("secret", "must not be empty"));
        }
        Ok(Self {
            title: title.to_owned(),
            username: trimmed(self.username.as_deref()),
            secret: secret.to_owned(),
            url: trimmed(self.url.as_deref()),
            notes: trimmed(self.notes.as_deref()),
        })
    }

    /// Extracts the mutable fields of an existing record as a draft.
    pub(crate) fn from_record(record: &CredentialRecord) -> Self {
        Self {
            title: record.title.clone(),
            username: record.username.clone(),
            secret: record.secret.clone(),
            url: record.url.clone(),
            notes: record.notes.clone(),
        }
    }
}

impl CredentialRecord {
    /// Mints a new record from a normalized draft.
    pub(crate) fn create(draft: RecordDraft, now: u64) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: draft.title,
            username: draft.username,
            secret: draft.secret,
            url: draft.url,
            notes: draft.notes,
            created_at: now,
            updated_at: None,
        }
    }

    /// Applies a normalized draft over this record's mutable fields,
    /// stamping `updated_at`. Identity and creation time are preserved.
    pub(crate) fn apply(self, draft: RecordDraft, now: u64) -> Self {
        Self {
            id: self.id,
            title: draft.title,
            username: draft.username,
            secret: draft.secret,
            url: draft.url,
            notes: draft.notes,
            created_at: self.created_at,
            updated_at: Some(now),
        }
    }
}

fn trimmed(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
}
