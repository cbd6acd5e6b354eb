//! Document paths.
//!
//! A path is a sequence of child indices, optionally ending with an attribute
//! name. The textual form follows JSON pointer conventions (`/0/2/Value`, with
//! `~0` and `~1` escaping `~` and `/` inside keys). The root path prints as `/`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Div;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathEntry {
    Index(usize),
    Key(String),
}

impl PathEntry {
    pub fn as_index(&self) -> Option<usize> {
        match self {
            PathEntry::Index(index) => Some(*index),
            PathEntry::Key(_) => None,
        }
    }

    pub fn as_key(&self) -> Option<&str> {
        match self {
            PathEntry::Key(key) => Some(key),
            PathEntry::Index(_) => None,
        }
    }
}

impl From<usize> for PathEntry {
    fn from(index: usize) -> Self {
        PathEntry::Index(index)
    }
}

impl From<&str> for PathEntry {
    fn from(key: &str) -> Self {
        PathEntry::Key(key.to_string())
    }
}

impl From<String> for PathEntry {
    fn from(key: String) -> Self {
        PathEntry::Key(key)
    }
}

impl fmt::Display for PathEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathEntry::Index(index) => write!(f, "{index}"),
            PathEntry::Key(key) => write!(f, "{}", key.replace('~', "~0").replace('/', "~1")),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Path(Vec<PathEntry>);

impl Path {
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn new(entries: Vec<PathEntry>) -> Self {
        Self(entries)
    }

    pub fn entries(&self) -> &[PathEntry] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn push(&mut self, entry: impl Into<PathEntry>) {
        self.0.push(entry.into());
    }

    pub fn pop(&mut self) -> Option<PathEntry> {
        self.0.pop()
    }

    pub fn last(&self) -> Option<&PathEntry> {
        self.0.last()
    }

    pub fn parent(&self) -> Option<Path> {
        let (_, rest) = self.0.split_last()?;
        Some(Path(rest.to_vec()))
    }

    pub fn child(&self, entry: impl Into<PathEntry>) -> Path {
        let mut path = self.clone();
        path.push(entry);
        path
    }

    /// True when every entry of `self` leads `other`. A path is a prefix of itself.
    pub fn is_prefix_of(&self, other: &Path) -> bool {
        other.0.starts_with(&self.0)
    }

    /// Splits `/a/b/Name` into (`/a/b`, `Name`) when the last entry is a key.
    pub fn split_attribute(&self) -> Option<(Path, &str)> {
        let (last, rest) = self.0.split_last()?;
        let name = last.as_key()?;
        Some((Path(rest.to_vec()), name))
    }

    /// True when the path only contains child indices.
    pub fn is_node_path(&self) -> bool {
        self.0.iter().all(|entry| entry.as_index().is_some())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PathEntry> {
        self.0.iter()
    }
}

impl<E: Into<PathEntry>> Div<E> for Path {
    type Output = Path;

    fn div(mut self, rhs: E) -> Path {
        self.push(rhs);
        self
    }
}

impl<E: Into<PathEntry>> Div<E> for &Path {
    type Output = Path;

    fn div(self, rhs: E) -> Path {
        self.child(rhs)
    }
}

impl From<Vec<PathEntry>> for Path {
    fn from(entries: Vec<PathEntry>) -> Self {
        Self(entries)
    }
}

impl FromIterator<PathEntry> for Path {
    fn from_iter<I: IntoIterator<Item = PathEntry>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Path {
    type Item = &'a PathEntry;
    type IntoIter = std::slice::Iter<'a, PathEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "/");
        }
        for entry in &self.0 {
            write!(f, "/{entry}")?;
        }
        Ok(())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PathParseError {
    #[error("Path must start with '/': {0}")]
    MissingLeadingSlash(String),

    #[error("Invalid escape sequence in path segment: {0}")]
    InvalidEscape(String),
}

impl FromStr for Path {
    type Err = PathParseError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        if text.is_empty() || text == "/" {
            return Ok(Path::root());
        }
        let rest = text
            .strip_prefix('/')
            .ok_or_else(|| PathParseError::MissingLeadingSlash(text.to_string()))?;

        rest.split('/').map(parse_segment).collect()
    }
}

fn parse_segment(segment: &str) -> Result<PathEntry, PathParseError> {
    if !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit()) {
        if let Ok(index) = segment.parse::<usize>() {
            return Ok(PathEntry::Index(index));
        }
    }

    let mut key = String::with_capacity(segment.len());
    let mut chars = segment.chars();
    while let Some(c) = chars.next() {
        if c != '~' {
            key.push(c);
            continue;
        }
        match chars.next() {
            Some('0') => key.push('~'),
            Some('1') => key.push('/'),
            _ => return Err(PathParseError::InvalidEscape(segment.to_string())),
        }
    }
    Ok(PathEntry::Key(key))
}
