//! Dotted config paths with list-index segments.
//!
//! A path such as `model.abundances.item2` is parsed once into typed
//! segments and then resolved iteratively against a [`Namespace`].
//!
//! [`Namespace`]: super::Namespace

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Prefix marking a list-index segment (`item0`, `item12`).
pub const INDEX_PREFIX: &str = "item";

/// One segment of a [`ConfigPath`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// A named field.
    Key(String),
    /// A zero-based list index written as `item<N>`.
    ///
    /// When applied to a namespace rather than a list, the segment is looked
    /// up as the literal key `raw`.
    Index {
        /// The parsed index.
        index: usize,
        /// The segment as written.
        raw: String,
    },
}

impl PathSegment {
    fn parse(segment: &str) -> Self {
        segment
            .strip_prefix(INDEX_PREFIX)
            .filter(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
            .and_then(|digits| digits.parse().ok())
            .map_or_else(
                || Self::Key(segment.to_string()),
                |index| Self::Index {
                    index,
                    raw: segment.to_string(),
                },
            )
    }

    /// Returns the segment as written.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Key(key) => key,
            Self::Index { raw, .. } => raw,
        }
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed dotted config path.
///
/// # Examples
///
/// ```
/// use tardis_config::namespace::{ConfigPath, PathSegment};
///
/// let path: ConfigPath = "model.abundances.item2".parse().unwrap();
/// assert_eq!(path.len(), 3);
/// assert!(matches!(path.segments()[2], PathSegment::Index { index: 2, .. }));
///
/// assert!("model..structure".parse::<ConfigPath>().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigPath {
    segments: Vec<PathSegment>,
}

impl ConfigPath {
    /// Parses a dotted path.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfigPath`] if the path is empty or contains
    /// an empty segment.
    pub fn parse(path: &str) -> Result<Self> {
        if path.is_empty() {
            return Err(Error::InvalidConfigPath {
                path: path.to_string(),
                reason: "path is empty".into(),
            });
        }

        let segments = path
            .split('.')
            .map(|segment| {
                if segment.is_empty() {
                    Err(Error::InvalidConfigPath {
                        path: path.to_string(),
                        reason: "empty path segment".into(),
                    })
                } else {
                    Ok(PathSegment::parse(segment))
                }
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { segments })
    }

    /// Returns the parsed segments.
    #[must_use]
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Returns the number of segments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Always `false` for a successfully parsed path.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Renders the first `count` segments, for error messages.
    #[must_use]
    pub(crate) fn prefix(&self, count: usize) -> String {
        self.segments[..count.min(self.segments.len())]
            .iter()
            .map(PathSegment::as_str)
            .collect::<Vec<_>>()
            .join(".")
    }
}

impl FromStr for ConfigPath {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<&str> for ConfigPath {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self> {
        Self::parse(value)
    }
}

impl fmt::Display for ConfigPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.prefix(self.segments.len()))
    }
}
