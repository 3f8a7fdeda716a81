use std::fmt;

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

use crate::DeployError;

pub const MAX_SLUG_LENGTH: usize = 63;

lazy_static! {
    static ref SEPARATOR_RUN: Regex = Regex::new("[^a-z0-9]+").unwrap();
}

// Always matches `^[a-z0-9]+(-[a-z0-9]+)*$`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct Slug(String);

impl Slug {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Slug {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

pub fn sanitize(name: &str) -> Result<Slug, DeployError> {
    let lowercase = name.to_lowercase();
    let hyphenated = SEPARATOR_RUN.replace_all(&lowercase, "-");
    let trimmed = hyphenated.trim_matches('-');
    // Only ASCII is left at this point, so byte offsets are char offsets.
    let truncated = &trimmed[..trimmed.len().min(MAX_SLUG_LENGTH)];
    let slug = truncated.trim_end_matches('-');
    if slug.is_empty() {
        return Err(DeployError::InvalidName(name.to_owned()));
    }
    Ok(Slug(slug.to_owned()))
}

pub fn suggest_name(existing: &Slug) -> Slug {
    let suffix = 1000 + fnv1a(existing.as_str().as_bytes()) % 9000;
    let suffix = suffix.to_string();
    let max_base = MAX_SLUG_LENGTH - suffix.len() - 1;
    let base = &existing.0[..existing.0.len().min(max_base)];
    let base = base.trim_end_matches('-');
    Slug(format!("{}-{}", base, suffix))
}

fn fnv1a(bytes: &[u8]) -> u64 {
    bytes.iter().fold(0xcbf29ce484222325, |hash, byte| {
        (hash ^ u64::from(*byte)).wrapping_mul(0x100000001b3)
    })
}
