//! OAuth2 scopes and scope tokens

use std::{
    collections::{btree_set, BTreeSet},
    convert::TryFrom,
    fmt,
    iter::FromIterator,
    str::FromStr,
};

use aliri_braid::braid;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// An invalid scope token
#[derive(Debug, Error)]
pub enum InvalidScopeToken {
    /// The scope token was the empty string
    #[error("scope token cannot be empty")]
    EmptyString,
    /// The scope token contained an invalid byte
    #[error("invalid scope token byte at position {position}: 0x{value:02x}")]
    InvalidByte {
        /// The index in the scope token where the invalid byte was found
        position: usize,
        /// The invalid byte value
        value: u8,
    },
}

aliri_braid::from_infallible!(InvalidScopeToken);

/// An OAuth2 scope token as defined in [RFC 6749, Section 3.3][RFC6749 3.3]
///
/// A scope token must be composed of printable ASCII characters excluding
/// ` ` (space), `"` (double quote), and `\` (backslash). Beyond that, tokens
/// are opaque: two tokens are the same only if they are byte-for-byte equal.
///
///   [RFC6749 3.3]: (https://datatracker.ietf.org/doc/html/rfc6749#section-3.3)
#[braid(
    serde,
    validator,
    ref_doc = "A borrowed reference to an OAuth2 [`ScopeToken`]"
)]
pub struct ScopeToken;

impl aliri_braid::Validator for ScopeToken {
    type Error = InvalidScopeToken;

    /// Validates that the scope token is valid
    ///
    /// A valid scope token is non-empty and composed of printable
    /// ASCII characters except ` `, `"`, and `\`.
    fn validate(s: &str) -> Result<(), Self::Error> {
        if s.is_empty() {
            Err(InvalidScopeToken::EmptyString)
        } else if let Some((position, &value)) = s
            .as_bytes()
            .iter()
            .enumerate()
            .find(|(_, &b)| b <= 0x20 || b == 0x22 || b == 0x5C || 0x7F <= b)
        {
            Err(InvalidScopeToken::InvalidByte { position, value })
        } else {
            Ok(())
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
enum ScopeDto {
    String(String),
    Array(Vec<ScopeToken>),
}

impl TryFrom<Option<ScopeDto>> for Scope {
    type Error = InvalidScopeToken;

    fn try_from(dto: Option<ScopeDto>) -> Result<Self, Self::Error> {
        if let Some(dto) = dto {
            match dto {
                ScopeDto::String(s) => Self::try_from(s),
                ScopeDto::Array(arr) => Ok(arr.into_iter().collect()),
            }
        } else {
            Ok(Self::empty())
        }
    }
}

impl From<Scope> for ScopeDto {
    fn from(s: Scope) -> Self {
        ScopeDto::String(s.to_string())
    }
}

/// An OAuth2 scope: a set of scope tokens
///
/// Duplicate tokens collapse and the order in which tokens were added has no
/// meaning. Iteration always yields tokens in lexicographic order so that
/// anything derived from a scope, such as the first token missing from
/// another scope, is stable across calls.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(try_from = "Option<ScopeDto>", into = "ScopeDto")]
pub struct Scope(BTreeSet<ScopeToken>);

impl Scope {
    /// Produces an empty scope
    #[inline]
    pub const fn empty() -> Self {
        Self(BTreeSet::new())
    }

    /// Adds a scope token to the scope
    ///
    /// Returns `false` if the token was already present.
    #[inline]
    pub fn insert(&mut self, scope_token: ScopeToken) -> bool {
        self.0.insert(scope_token)
    }

    /// The number of distinct scope tokens
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the scope holds no tokens at all
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Produces an iterator of the scope tokens in this set
    #[inline]
    pub fn iter(&self) -> Iter<'_> {
        self.into_iter()
    }

    /// Checks whether the scope holds the given scope token
    #[inline]
    pub fn contains(&self, scope_token: &ScopeTokenRef) -> bool {
        self.0.contains(scope_token)
    }

    /// Checks to see whether this scope contains all of
    /// the scope tokens in `subset`.
    #[inline]
    pub fn contains_all(&self, subset: &Scope) -> bool {
        self.0.is_superset(&subset.0)
    }

    /// Finds the first scope token of this scope which `other` does not hold
    ///
    /// Returns `None` when this scope is a subset of `other`.
    #[inline]
    pub fn first_missing_from(&self, other: &Scope) -> Option<&ScopeTokenRef> {
        self.iter().find(|token| !other.contains(token))
    }

    /// Produces the union of this scope and `other`
    pub fn union(&self, other: &Scope) -> Scope {
        Self(self.0.union(&other.0).cloned().collect())
    }
}

impl fmt::Display for Scope {
    /// Formats the scope in the space-delimited form used on the wire
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut tokens = self.iter();
        if let Some(first) = tokens.next() {
            f.write_str(first.as_str())?;
            for token in tokens {
                f.write_str(" ")?;
                f.write_str(token.as_str())?;
            }
        }
        Ok(())
    }
}

impl IntoIterator for Scope {
    type Item = ScopeToken;
    type IntoIter = <BTreeSet<ScopeToken> as IntoIterator>::IntoIter;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// An iterator over a set of borrowed scope tokens
#[derive(Clone, Debug)]
pub struct Iter<'a> {
    iter: btree_set::Iter<'a, ScopeToken>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a ScopeTokenRef;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.iter.next().map(|x| x.as_ref())
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.iter.size_hint()
    }
}

impl<'a> IntoIterator for &'a Scope {
    type Item = &'a ScopeTokenRef;
    type IntoIter = Iter<'a>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        Self::IntoIter {
            iter: self.0.iter(),
        }
    }
}

impl<S> Extend<S> for Scope
where
    S: Into<ScopeToken>,
{
    #[inline]
    fn extend<I>(&mut self, iter: I)
    where
        I: IntoIterator<Item = S>,
    {
        self.0.extend(iter.into_iter().map(Into::into))
    }
}

impl<S> FromIterator<S> for Scope
where
    S: Into<ScopeToken>,
{
    #[inline]
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = S>,
    {
        let mut set = Self::empty();
        set.extend(iter);
        set
    }
}

impl TryFrom<&'_ str> for Scope {
    type Error = InvalidScopeToken;

    #[inline]
    fn try_from(s: &str) -> Result<Self, Self::Error> {
        s.split_whitespace().map(|t| ScopeToken::new(t.to_owned())).collect()
    }
}

impl TryFrom<String> for Scope {
    type Error = InvalidScopeToken;

    #[inline]
    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::try_from(s.as_str())
    }
}

impl FromStr for Scope {
    type Err = InvalidScopeToken;

    #[inline]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_from(s)
    }
}

#[doc(hidden)]
pub fn __static_scope_token(token: &'static str) -> ScopeToken {
    match ScopeToken::new(token.to_owned()) {
        Ok(token) => token,
        Err(err) => panic!("{}: scope token = {}", err, token),
    }
}

/// Construct a [`Scope`] from a list of static scope tokens
///
/// # Panics
///
/// Panics if any of the tokens is not a valid [`ScopeToken`].
///
/// ```
/// use warrant_oauth2::scope;
///
/// let scope = scope!["read", "write", "read"];
/// assert_eq!(scope.len(), 2);
/// assert_eq!(scope.to_string(), "read write");
/// ```
#[macro_export]
macro_rules! scope {
    ($($token:expr),* $(,)?) => {{
        #[allow(unused_mut)]
        let mut scope = $crate::Scope::empty();
        $(
            scope.insert($crate::scope::__static_scope_token($token));
        )*
        scope
    }};
}
