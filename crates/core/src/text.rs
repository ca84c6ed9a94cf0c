#![forbid(unsafe_code)]

const MAX_SLUG_LEN: usize = 128;

/// URL-safe client identifier: lowercase ASCII letters, digits and hyphens.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Slug(String);

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SlugError {
    #[error("slug is empty")]
    Empty,
    #[error("slug is longer than {MAX_SLUG_LEN} characters")]
    TooLong,
    #[error("slug contains invalid character {ch:?} at index {index}")]
    InvalidChar { ch: char, index: usize },
}

impl Slug {
    pub fn try_new(value: impl Into<String>) -> Result<Self, SlugError> {
        let value = value.into();
        validate_slug(&value)?;
        Ok(Self(value))
    }

    /// Derives a slug from a display name, e.g. `"Acme  Corp"` -> `"acme-corp"`.
    pub fn from_display_name(name: &str) -> Result<Self, SlugError> {
        Self::try_new(slugify(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Display name for a client first seen through its slug.
    pub fn display_name(&self) -> String {
        title_case(&self.0.replace('-', " "))
    }
}

impl std::fmt::Display for Slug {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

fn validate_slug(value: &str) -> Result<(), SlugError> {
    if !value.chars().any(|ch| ch.is_ascii_alphanumeric()) {
        return Err(SlugError::Empty);
    }
    if value.len() > MAX_SLUG_LEN {
        return Err(SlugError::TooLong);
    }
    for (index, ch) in value.chars().enumerate() {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '-' {
            continue;
        }
        return Err(SlugError::InvalidChar { ch, index });
    }
    Ok(())
}

/// Lowercases, drops everything outside `[a-z0-9\s-]`, trims, and turns each
/// run of whitespace into a single hyphen.
pub fn slugify(name: &str) -> String {
    let kept: String = name
        .to_lowercase()
        .chars()
        .filter(|ch| {
            ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch.is_whitespace() || *ch == '-'
        })
        .collect();

    let mut out = String::with_capacity(kept.len());
    let mut in_whitespace = false;
    for ch in kept.trim().chars() {
        if ch.is_whitespace() {
            if !in_whitespace {
                out.push('-');
            }
            in_whitespace = true;
        } else {
            out.push(ch);
            in_whitespace = false;
        }
    }
    out
}

/// Uppercases the first letter of every word and lowercases the rest; any
/// non-letter starts a new word.
pub fn title_case(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut inside_word = false;
    for ch in value.chars() {
        if ch.is_alphabetic() {
            if inside_word {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            inside_word = true;
        } else {
            out.push(ch);
            inside_word = false;
        }
    }
    out
}
