/*
 * mimelib - headers
 *
 * Copyright 2023 Manos Pitsidianakis
 *
 * This file is part of mimelib.
 *
 * mimelib is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * mimelib is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with mimelib. If not, see <http://www.gnu.org/licenses/>.
 */

//! E-mail header names. Also referred to as `Fields` in `RFC5322`.
//!
//! See [`HeaderName`] for more information.

use std::{
    borrow::Cow,
    convert::TryFrom,
    error::Error,
    hash::{Hash, Hasher},
    str::FromStr,
};

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use smallvec::SmallVec;

use super::standards::{StandardHeader, ValueKind};
use crate::parser::BytesExt;

/// Case insensitive owned wrapper for a header name.
///
/// Because it is implementing [RFC5322], it's guaranteed to be ASCII and to
/// contain no bytes not allowed in header names. See [`HEADER_CHARS`] for
/// more information.
///
/// Internally, it only allocates if the header name value is not one
/// statically encoded in the [`StandardHeader`] type.
///
/// [RFC5322]: https://datatracker.ietf.org/doc/html/rfc5322
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct HeaderName {
    pub(super) inner: Repr<Custom>,
}

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub(super) enum Repr<T> {
    Standard(StandardHeader),
    Custom(T),
}

impl<T: std::fmt::Display> std::fmt::Display for Repr<T> {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Standard(inner) => write!(fmt, "{}", inner.as_str()),
            Self::Custom(inner) => inner.fmt(fmt),
        }
    }
}

/// Wrapper type used to hijack the Hash impl
#[derive(Clone, Debug, Eq)]
pub(super) struct Custom(pub(super) SmallVec<[u8; 32]>);

impl Custom {
    #[inline]
    fn as_str(&self) -> &str {
        // SAFETY: it's always a valid ASCII string when created.
        unsafe { std::str::from_utf8_unchecked(&self.0) }
    }
}

impl PartialEq for Custom {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }
}

impl Hash for Custom {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for b in self.0.iter() {
            b.to_ascii_lowercase().hash(state);
        }
    }
}

impl std::fmt::Display for Custom {
    /// Canonicalize capitalization of dash-separated segments, e.g.
    /// `x-user-agent` prints as `X-User-Agent` and `list-id` as `List-ID`.
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        const ACRONYMS: &[&str] = &["id", "arc", "dkim", "mime", "rss", "spf"];
        let mut first = true;
        for segment in self.as_str().split('-') {
            if !first {
                write!(fmt, "-")?;
            }
            first = false;
            if ACRONYMS.contains(&segment) {
                write!(fmt, "{}", segment.to_ascii_uppercase())?;
            } else {
                let mut chars = segment.chars();
                if let Some(c) = chars.next() {
                    write!(fmt, "{}", c.to_ascii_uppercase())?;
                }
                write!(fmt, "{}", chars.as_str())?;
            }
        }
        Ok(())
    }
}

/// A possible error when converting into a [`HeaderName`] from another type.
pub struct InvalidHeaderName;

impl InvalidHeaderName {
    pub const fn new() -> Self {
        Self
    }
}

impl Error for InvalidHeaderName {}

impl std::fmt::Debug for InvalidHeaderName {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(fmt, "Invalid header name.")
    }
}

impl std::fmt::Display for InvalidHeaderName {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(fmt, "Invalid header name.")
    }
}

impl From<InvalidHeaderName> for crate::error::Error {
    fn from(_: InvalidHeaderName) -> Self {
        Self::new("Invalid header name.").set_kind(crate::error::ErrorKind::MalformedHeader)
    }
}

/// Valid header name ASCII bytes
///
/// The index of an ASCII byte corresponds to the byte value itself, or the
/// `NUL` byte -zero- if it's not a valid header name character.
///
/// Source: [RFC5322 3.6.8.](https://datatracker.ietf.org/doc/html/rfc5322#autoid-35)
///
/// ```text
/// field-name      =   1*ftext
///
/// ftext           =   %d33-57 /          ; Printable US-ASCII
///                     %d59-126           ;  characters not including
///                                        ;  ":".
/// ```
pub const HEADER_CHARS: [u8; 128] = [
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, //   x
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, //  1x
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, //  2x
    0, 0, 0, b'!', b'"', b'#', b'$', b'%', b'&', b'\'', //  3x
    0, 0, b'*', b'+', 0, b'-', b'.', 0, b'0', b'1', //  4x
    b'2', b'3', b'4', b'5', b'6', b'7', b'8', b'9', 0, 0, //  5x
    0, 0, 0, 0, 0, b'a', b'b', b'c', b'd', b'e', //  6x
    b'f', b'g', b'h', b'i', b'j', b'k', b'l', b'm', b'n', b'o', //  7x
    b'p', b'q', b'r', b's', b't', b'u', b'v', b'w', b'x', b'y', //  8x
    b'z', 0, 0, 0, b'^', b'_', b'`', b'a', b'b', b'c', //  9x
    b'd', b'e', b'f', b'g', b'h', b'i', b'j', b'k', b'l', b'm', // 10x
    b'n', b'o', b'p', b'q', b'r', b's', b't', b'u', b'v', b'w', // 11x
    b'x', b'y', b'z', 0, b'|', 0, b'~', 0, // 128
];

impl HeaderName {
    /// Returns a `str` representation of the header.
    ///
    /// Standard header names are returned in their canonical
    /// capitalization, custom names in lower case.
    #[inline]
    pub fn as_str(&self) -> &str {
        match self.inner {
            Repr::Standard(v) => v.as_str(),
            Repr::Custom(ref v) => v.as_str(),
        }
    }

    /// Checks `src` byte slice for invalid header bytes, according to
    /// [RFC5322].
    ///
    /// As an optimization, if `src` corresponds to a *standard* e-mail
    /// header we know about, as encoded in the [`StandardHeader`] type,
    /// the parsed return value does not allocate.
    ///
    /// [RFC5322]: https://datatracker.ietf.org/doc/html/rfc5322#autoid-35
    pub fn from_bytes(src: &[u8]) -> Result<Self, InvalidHeaderName> {
        if let Some(std) = StandardHeader::from_bytes(src.trim()) {
            Ok(Self {
                inner: Repr::Standard(std),
            })
        } else {
            let mut buf = SmallVec::<[u8; 32]>::new();
            for b in src.trim() {
                let Some(b) = HEADER_CHARS.get(*b as usize).filter(|b| **b != 0) else {
                    return Err(InvalidHeaderName::new());
                };
                buf.push(*b);
            }
            if buf.is_empty() {
                return Err(InvalidHeaderName::new());
            }

            Ok(Self {
                inner: Repr::Custom(Custom(buf)),
            })
        }
    }

    #[inline]
    pub const fn is_standard(&self) -> bool {
        matches!(
            self,
            Self {
                inner: Repr::Standard(_)
            }
        )
    }

    /// The typed value kind this field name maps to, per the process-wide
    /// registry seeded in [`StandardHeader`]. Unknown names yield
    /// [`ValueKind::Raw`].
    #[inline]
    pub const fn value_kind(&self) -> ValueKind {
        match self.inner {
            Repr::Standard(v) => v.value_kind(),
            Repr::Custom(_) => ValueKind::Raw,
        }
    }
}

impl std::fmt::Display for HeaderName {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.inner.fmt(fmt)
    }
}

impl From<StandardHeader> for HeaderName {
    fn from(value: StandardHeader) -> Self {
        Self {
            inner: Repr::Standard(value),
        }
    }
}

impl FromStr for HeaderName {
    type Err = InvalidHeaderName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_bytes(s.as_bytes())
    }
}

impl TryFrom<&str> for HeaderName {
    type Error = InvalidHeaderName;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::from_bytes(value.as_bytes())
    }
}

impl TryFrom<&[u8]> for HeaderName {
    type Error = InvalidHeaderName;

    fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
        Self::from_bytes(value)
    }
}

impl TryFrom<String> for HeaderName {
    type Error = InvalidHeaderName;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_bytes(value.as_bytes())
    }
}

impl TryFrom<&HeaderName> for HeaderName {
    type Error = InvalidHeaderName;

    fn try_from(value: &HeaderName) -> Result<Self, Self::Error> {
        Ok(value.clone())
    }
}

impl PartialEq<str> for HeaderName {
    fn eq(&self, other: &str) -> bool {
        self.as_str().eq_ignore_ascii_case(other)
    }
}

impl PartialEq<&str> for HeaderName {
    fn eq(&self, other: &&str) -> bool {
        self.as_str().eq_ignore_ascii_case(other)
    }
}

impl PartialEq<[u8]> for HeaderName {
    fn eq(&self, other: &[u8]) -> bool {
        other
            .trim()
            .eq_ignore_ascii_case(self.as_str().as_bytes())
    }
}

impl PartialEq<StandardHeader> for HeaderName {
    fn eq(&self, other: &StandardHeader) -> bool {
        matches!(self.inner, Repr::Standard(v) if v == *other)
    }
}

impl Serialize for HeaderName {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for HeaderName {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = <Cow<'de, str>>::deserialize(deserializer)?;
        Self::from_bytes(s.as_bytes())
            .map_err(|_| de::Error::custom("invalid header name value"))
    }
}
