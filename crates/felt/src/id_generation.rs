//! Slug-based ID generation for fibers.
//!
//! IDs have the form `{slug}-{hex}` where the slug is derived from the title
//! and the hex suffix is eight characters of a SHA-256 digest:
//!
//! - `"Fix the login bug"` becomes `fix-the-login-bug-3fa85f64`
//! - `"[auth] Fix login"` becomes `fix-login-...` (bracketed tags are dropped)
//! - a title without letters or digits yields the bare hex suffix
//!
//! # Example
//!
//! ```
//! use felt::id_generation::{IdGenerator, validate_id};
//!
//! let mut generator = IdGenerator::new(["existing-0000aaaa".to_string()]);
//! let id = generator.generate("Write the docs", chrono::Utc::now()).unwrap();
//!
//! assert!(id.starts_with("write-the-docs-"));
//! assert!(validate_id(&id));
//! ```

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use regex::Regex;
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::sync::LazyLock;
use tracing::debug;

/// Longest slug kept before the hex suffix.
pub const MAX_SLUG_LENGTH: usize = 32;

const HEX_BYTES: usize = 4;
const MAX_NONCE: u32 = 100;

static ID_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([a-z0-9-]+-)?[a-f0-9]{8}$").unwrap_or_else(|e| unreachable!("{e}"))
});

/// Generates fiber ids that do not collide with a known set.
#[derive(Debug, Default)]
pub struct IdGenerator {
    existing_ids: HashSet<String>,
}

impl IdGenerator {
    /// Create a generator that avoids every id in `existing`.
    pub fn new(existing: impl IntoIterator<Item = String>) -> Self {
        Self {
            existing_ids: existing.into_iter().collect(),
        }
    }

    /// Generate a new unique id for `title`.
    ///
    /// The digest covers the title, `now` and a nonce; on collision the nonce
    /// is bumped and the digest recomputed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IdGeneration`] when every nonce collides.
    pub fn generate(&mut self, title: &str, now: DateTime<Utc>) -> Result<String> {
        let slug = truncate_at_word(&slugify(title), MAX_SLUG_LENGTH);

        for nonce in 0..MAX_NONCE {
            let suffix = hex_suffix(title, now, nonce);
            let id = if slug.is_empty() {
                suffix
            } else {
                format!("{slug}-{suffix}")
            };

            if self.existing_ids.insert(id.clone()) {
                if nonce > 0 {
                    debug!(nonce, %id, "Generated unique ID after collision retries");
                }
                return Ok(id);
            }
        }

        Err(Error::IdGeneration {
            attempts: MAX_NONCE,
        })
    }
}

fn hex_suffix(title: &str, now: DateTime<Utc>, nonce: u32) -> String {
    let timestamp = now.timestamp_nanos_opt().unwrap_or_else(|| now.timestamp());
    let mut hasher = Sha256::new();
    hasher.update(format!("{title}|{timestamp}|{nonce}").as_bytes());
    let digest = hasher.finalize();

    digest[..HEX_BYTES]
        .iter()
        .map(|byte| format!("{byte:02x}"))
        .collect()
}

/// Lowercase `title`, drop bracketed tags and collapse every run of
/// non-alphanumeric characters into a single `-`.
pub fn slugify(title: &str) -> String {
    let stripped = strip_bracketed_tags(title).to_lowercase();

    let mut slug = String::with_capacity(stripped.len());
    let mut previous_hyphen = false;
    for c in stripped.chars() {
        if c.is_alphanumeric() {
            slug.push(c);
            previous_hyphen = false;
        } else if !previous_hyphen {
            slug.push('-');
            previous_hyphen = true;
        }
    }

    slug.trim_matches('-').to_string()
}

/// Remove every `[...]` group anywhere in the string.
fn strip_bracketed_tags(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find('[') {
        let Some(len) = result[start..].find(']') else {
            break;
        };
        result.replace_range(start..=start + len, "");
    }
    result.trim().to_string()
}

/// Cut `slug` to at most `max_len` bytes, preferring the last `-` boundary.
pub fn truncate_at_word(slug: &str, max_len: usize) -> String {
    if slug.len() <= max_len {
        return slug.to_string();
    }

    let mut end = max_len;
    while !slug.is_char_boundary(end) {
        end -= 1;
    }

    match slug[..end].rfind('-') {
        Some(hyphen) if hyphen > 0 => slug[..hyphen].to_string(),
        _ => slug[..end].to_string(),
    }
}

/// Whether `id` has the generated shape `[slug-]xxxxxxxx`.
pub fn validate_id(id: &str) -> bool {
    ID_PATTERN.is_match(id)
}
