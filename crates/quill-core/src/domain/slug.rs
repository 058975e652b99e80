//! Slug normalization.
//!
//! Every slug that reaches the post store goes through [`normalize`], usually
//! via [`Slug::parse`]. The policy is ASCII-only: letters outside `a-z`
//! (including CJK) are dropped, and underscores separate words like spaces
//! do, so the output alphabet is exactly `[a-z0-9-]`.

use std::fmt;

use serde::Serialize;

use crate::error::DomainError;

/// Convert arbitrary text into a URL-safe slug.
///
/// Lower-cases, drops every character that is not a letter, digit,
/// whitespace or hyphen, turns whitespace runs into a single hyphen,
/// collapses repeated hyphens and trims hyphens from both ends.
/// Input without any `[a-z0-9]` content yields an empty string.
pub fn normalize(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut separator = false;

    for ch in text.to_lowercase().chars() {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            if separator && !slug.is_empty() {
                slug.push('-');
            }
            separator = false;
            slug.push(ch);
        } else if ch.is_whitespace() || ch == '-' || ch == '_' {
            separator = true;
        }
    }

    slug
}

/// A normalized, non-empty slug.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Slug(String);

impl Slug {
    /// Normalize user input into a slug, rejecting input that normalizes to nothing.
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let slug = normalize(raw);
        if slug.is_empty() {
            return Err(DomainError::validation(
                "slug must contain at least one letter or digit",
            ));
        }
        Ok(Self(slug))
    }

    /// Whether `value` is already a valid slug as stored.
    pub fn is_normalized(value: &str) -> bool {
        !value.is_empty() && normalize(value) == value
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl AsRef<str> for Slug {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
