/*
 * mimelib - error module
 *
 * Copyright 2017 Manos Pitsidianakis
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

/*!
 * An error object for `mimelib`.
 */

use std::{borrow::Cow, error, fmt, io, result, str, string, sync::Arc};

pub type Result<T> = result::Result<T, Error>;

/// Classification of an [`Error`].
///
/// Parsing is permissive and does not return most of these: a malformed
/// field degrades to its raw form and the kind is only surfaced when a
/// typed view of the value is requested.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub enum ErrorKind {
    #[default]
    None,
    /// No header/body split could be found at all.
    Parsing,
    /// A header line has no usable name/colon split.
    MalformedHeader,
    /// A typed parse of a field value failed.
    MalformedFieldValue,
    /// A `Content-Transfer-Encoding` token we do not implement.
    UnknownEncoding,
    /// A multipart media type without a `boundary` parameter.
    BoundaryMissing,
    /// A multipart body without a closing delimiter.
    BoundaryUnterminated,
    /// A date header value with no plausible parse.
    BadDateTime,
    /// Stream failure during generation or streamed parsing.
    Io,
    /// Builder inputs violate construction preconditions.
    BuilderInvariant,
    /// Invalid value given to an operation.
    ValueError,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::None => "Error",
                Self::Parsing => "Parsing error",
                Self::MalformedHeader => "Malformed header",
                Self::MalformedFieldValue => "Malformed field value",
                Self::UnknownEncoding => "Unknown content transfer encoding",
                Self::BoundaryMissing => "Multipart boundary parameter missing",
                Self::BoundaryUnterminated => "Multipart boundary not terminated",
                Self::BadDateTime => "Invalid date time value",
                Self::Io => "I/O error",
                Self::BuilderInvariant => "Draft invariant violation",
                Self::ValueError => "Invalid value",
            }
        )
    }
}

impl ErrorKind {
    pub const fn is_recoverable(&self) -> bool {
        !matches!(self, Self::Io | Self::BuilderInvariant)
    }
}

#[derive(Clone, Debug)]
pub struct Error {
    pub summary: Option<Cow<'static, str>>,
    pub details: Cow<'static, str>,
    pub kind: ErrorKind,
    pub source: Option<Arc<dyn error::Error + Send + Sync + 'static>>,
}

pub trait IntoError {
    fn set_err_summary<M>(self, msg: M) -> Error
    where
        M: Into<Cow<'static, str>>;

    fn set_err_kind(self, kind: ErrorKind) -> Error;
}

pub trait ResultIntoError<T> {
    fn chain_err_summary<M, F>(self, msg_fn: F) -> Result<T>
    where
        F: Fn() -> M,
        M: Into<Cow<'static, str>>;

    fn chain_err_kind(self, kind: ErrorKind) -> Result<T>;
}

impl<I: Into<Error>> IntoError for I {
    #[inline]
    fn set_err_summary<M>(self, msg: M) -> Error
    where
        M: Into<Cow<'static, str>>,
    {
        let err: Error = self.into();
        err.set_summary(msg)
    }

    #[inline]
    fn set_err_kind(self, kind: ErrorKind) -> Error {
        let err: Error = self.into();
        err.set_kind(kind)
    }
}

impl<T, I: Into<Error>> ResultIntoError<T> for result::Result<T, I> {
    #[inline]
    fn chain_err_summary<M, F>(self, msg_fn: F) -> Result<T>
    where
        F: Fn() -> M,
        M: Into<Cow<'static, str>>,
    {
        self.map_err(|err| err.set_err_summary(msg_fn()))
    }

    #[inline]
    fn chain_err_kind(self, kind: ErrorKind) -> Result<T> {
        self.map_err(|err| err.set_err_kind(kind))
    }
}

impl Error {
    pub fn new<M>(msg: M) -> Self
    where
        M: Into<Cow<'static, str>>,
    {
        Self {
            summary: None,
            details: msg.into(),
            kind: ErrorKind::None,
            source: None,
        }
    }

    pub fn set_summary<M>(mut self, summary: M) -> Self
    where
        M: Into<Cow<'static, str>>,
    {
        self.summary = Some(summary.into());
        self
    }

    pub fn set_kind(mut self, kind: ErrorKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn set_source(
        mut self,
        new_val: Option<Arc<dyn error::Error + Send + Sync + 'static>>,
    ) -> Self {
        self.source = new_val;
        self
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if let Some(summary) = self.summary.as_ref() {
            writeln!(f, "Summary: {}", summary)?;
        }
        if !matches!(self.kind, ErrorKind::None) {
            write!(f, "{}: ", self.kind)?;
        }
        write!(f, "{}", self.details)?;
        if let Some(source) = self.source.as_ref() {
            write!(f, "\nCaused by: {}", source)?;
        }
        Ok(())
    }
}

impl From<Error> for String {
    fn from(val: Error) -> Self {
        val.details.into()
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        self.source.as_ref().map(|s| &(*(*s)) as _)
    }
}

impl From<io::Error> for Error {
    #[inline]
    fn from(kind: io::Error) -> Self {
        Self::new(kind.to_string())
            .set_kind(ErrorKind::Io)
            .set_source(Some(Arc::new(kind)))
    }
}

impl<'a> From<nom::Err<nom::error::Error<&'a [u8]>>> for Error {
    #[inline]
    fn from(kind: nom::Err<nom::error::Error<&'a [u8]>>) -> Self {
        Self::new(format!("Parsing error: {:?}", kind)).set_kind(ErrorKind::Parsing)
    }
}

impl<'a> From<nom::Err<nom::error::Error<&'a str>>> for Error {
    #[inline]
    fn from(kind: nom::Err<nom::error::Error<&'a str>>) -> Self {
        Self::new(format!("Parsing error: {:?}", kind)).set_kind(ErrorKind::Parsing)
    }
}

impl From<string::FromUtf8Error> for Error {
    #[inline]
    fn from(kind: string::FromUtf8Error) -> Self {
        Self::new(format!("{:?}", kind))
            .set_kind(ErrorKind::ValueError)
            .set_source(Some(Arc::new(kind)))
    }
}

impl From<str::Utf8Error> for Error {
    #[inline]
    fn from(kind: str::Utf8Error) -> Self {
        Self::new(format!("{:?}", kind))
            .set_kind(ErrorKind::ValueError)
            .set_source(Some(Arc::new(kind)))
    }
}

impl From<std::num::ParseIntError> for Error {
    #[inline]
    fn from(kind: std::num::ParseIntError) -> Self {
        Self::new(kind.to_string())
            .set_kind(ErrorKind::ValueError)
            .set_source(Some(Arc::new(kind)))
    }
}

impl From<Cow<'static, str>> for Error {
    #[inline]
    fn from(kind: Cow<'static, str>) -> Self {
        Self::new(kind)
    }
}

impl From<&str> for Error {
    #[inline]
    fn from(kind: &str) -> Self {
        Self::new(kind.to_string())
    }
}

impl From<String> for Error {
    #[inline]
    fn from(kind: String) -> Self {
        Self::new(kind)
    }
}
