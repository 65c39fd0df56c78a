//! Course identifiers and roster loading
//!
//! A roster is a plain text file with one student identity per line. Each
//! entry becomes an instance `Name` tag and a DNS label, so entries are
//! validated as DNS labels before anything is created.

use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use thiserror::Error;

/// Roster and course validation errors
#[derive(Debug, Error)]
pub enum RosterError {
    /// Roster file does not exist
    #[error("Roster file '{0}' not found")]
    NotFound(String),

    /// Roster file could not be read
    #[error("Failed to read roster file '{path}'")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Entry is not usable as a DNS label
    #[error("Invalid roster entry '{entry}' on line {line}: {reason}")]
    InvalidEntry {
        line: usize,
        entry: String,
        reason: &'static str,
    },

    /// Same entry appears twice
    #[error("Duplicate roster entry '{entry}' on line {line}")]
    DuplicateEntry { line: usize, entry: String },

    /// Course identifier is empty or contains whitespace
    #[error("Invalid course name '{0}': must be non-empty and contain no whitespace")]
    InvalidCourse(String),
}

/// Course identifier, the value of the `course` tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CourseId(String);

impl CourseId {
    pub fn new(course: impl Into<String>) -> Result<Self, RosterError> {
        let course = course.into();
        if course.is_empty() || course.chars().any(char::is_whitespace) {
            return Err(RosterError::InvalidCourse(course));
        }
        Ok(Self(course))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CourseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single student identity, valid as a DNS label.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RosterEntry(String);

impl RosterEntry {
    /// Maximum length of a DNS label
    pub const MAX_LEN: usize = 63;

    pub fn parse(entry: &str) -> Result<Self, &'static str> {
        if entry.is_empty() {
            return Err("entry is empty");
        }
        if entry.len() > Self::MAX_LEN {
            return Err("longer than 63 characters");
        }
        if !entry.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return Err("only ASCII letters, digits and '-' are allowed");
        }
        if entry.starts_with('-') || entry.ends_with('-') {
            return Err("must not start or end with '-'");
        }
        Ok(Self(entry.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RosterEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Ordered, duplicate-free list of roster entries
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Roster {
    entries: Vec<RosterEntry>,
}

impl Roster {
    /// Parse roster text. Blank lines and `#` comments are skipped.
    pub fn parse(text: &str) -> Result<Self, RosterError> {
        let mut entries = Vec::new();
        let mut seen = HashSet::new();

        for (idx, raw) in text.lines().enumerate() {
            let line = idx + 1;
            let trimmed = raw.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            let entry =
                RosterEntry::parse(trimmed).map_err(|reason| RosterError::InvalidEntry {
                    line,
                    entry: trimmed.to_string(),
                    reason,
                })?;

            if !seen.insert(trimmed.to_ascii_lowercase()) {
                return Err(RosterError::DuplicateEntry {
                    line,
                    entry: trimmed.to_string(),
                });
            }
            entries.push(entry);
        }

        Ok(Self { entries })
    }

    /// Load and parse a roster file
    pub fn load(path: &Path) -> Result<Self, RosterError> {
        if !path.exists() {
            return Err(RosterError::NotFound(path.display().to_string()));
        }
        let text = std::fs::read_to_string(path).map_err(|source| RosterError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&text)
    }

    pub fn entries(&self) -> &[RosterEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RosterEntry> {
        self.entries.iter()
    }
}

impl FromIterator<RosterEntry> for Roster {
    fn from_iter<I: IntoIterator<Item = RosterEntry>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Roster {
    type Item = &'a RosterEntry;
    type IntoIter = std::slice::Iter<'a, RosterEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
