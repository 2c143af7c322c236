/*
 * mimelib
 *
 * Copyright 2017-2019 Manos Pitsidianakis
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

//! Types of attachments: media types, charsets, transfer encodings and
//! dispositions.

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    str,
};

use crate::{
    attachments::Attachment,
    parser::BytesExt,
};

/// A tag for a character set as found in `charset` parameters and encoded
/// word tokens. The actual transcoding is performed by
/// [`parser::encodings::decode_charset`](crate::parser::encodings::decode_charset).
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum Charset {
    Ascii,
    UTF8,
    UTF16,
    ISO8859_1,
    ISO8859_2,
    ISO8859_3,
    ISO8859_4,
    ISO8859_5,
    ISO8859_6,
    ISO8859_7,
    ISO8859_8,
    ISO8859_10,
    ISO8859_13,
    ISO8859_14,
    ISO8859_15,
    ISO8859_16,
    Windows1250,
    Windows1251,
    Windows1252,
    Windows1253,
    GBK,
    GB2312,
    GB18030,
    BIG5,
    ISO2022JP,
    EUCJP,
    KOI8R,
    KOI8U,
}

impl Default for Charset {
    fn default() -> Self {
        Self::UTF8
    }
}

impl<'a> From<&'a [u8]> for Charset {
    fn from(b: &'a [u8]) -> Self {
        match b.trim() {
            b if b.eq_ignore_ascii_case(b"us-ascii") || b.eq_ignore_ascii_case(b"ascii") => {
                Self::Ascii
            }
            b if b.eq_ignore_ascii_case(b"utf-8") || b.eq_ignore_ascii_case(b"utf8") => Self::UTF8,
            b if b.eq_ignore_ascii_case(b"utf-16") || b.eq_ignore_ascii_case(b"utf16") => {
                Self::UTF16
            }
            b if b.eq_ignore_ascii_case(b"iso-8859-1") || b.eq_ignore_ascii_case(b"iso8859-1") => {
                Self::ISO8859_1
            }
            b if b.eq_ignore_ascii_case(b"iso-8859-2") || b.eq_ignore_ascii_case(b"iso8859-2") => {
                Self::ISO8859_2
            }
            b if b.eq_ignore_ascii_case(b"iso-8859-3") || b.eq_ignore_ascii_case(b"iso8859-3") => {
                Self::ISO8859_3
            }
            b if b.eq_ignore_ascii_case(b"iso-8859-4") || b.eq_ignore_ascii_case(b"iso8859-4") => {
                Self::ISO8859_4
            }
            b if b.eq_ignore_ascii_case(b"iso-8859-5") || b.eq_ignore_ascii_case(b"iso8859-5") => {
                Self::ISO8859_5
            }
            b if b.eq_ignore_ascii_case(b"iso-8859-6") || b.eq_ignore_ascii_case(b"iso8859-6") => {
                Self::ISO8859_6
            }
            b if b.eq_ignore_ascii_case(b"iso-8859-7") || b.eq_ignore_ascii_case(b"iso8859-7") => {
                Self::ISO8859_7
            }
            b if b.eq_ignore_ascii_case(b"iso-8859-8") || b.eq_ignore_ascii_case(b"iso8859-8") => {
                Self::ISO8859_8
            }
            b if b.eq_ignore_ascii_case(b"iso-8859-10")
                || b.eq_ignore_ascii_case(b"iso8859-10") =>
            {
                Self::ISO8859_10
            }
            b if b.eq_ignore_ascii_case(b"iso-8859-13")
                || b.eq_ignore_ascii_case(b"iso8859-13") =>
            {
                Self::ISO8859_13
            }
            b if b.eq_ignore_ascii_case(b"iso-8859-14")
                || b.eq_ignore_ascii_case(b"iso8859-14") =>
            {
                Self::ISO8859_14
            }
            b if b.eq_ignore_ascii_case(b"iso-8859-15")
                || b.eq_ignore_ascii_case(b"iso8859-15") =>
            {
                Self::ISO8859_15
            }
            b if b.eq_ignore_ascii_case(b"iso-8859-16")
                || b.eq_ignore_ascii_case(b"iso8859-16") =>
            {
                Self::ISO8859_16
            }
            b if b.eq_ignore_ascii_case(b"windows-1250")
                || b.eq_ignore_ascii_case(b"windows1250") =>
            {
                Self::Windows1250
            }
            b if b.eq_ignore_ascii_case(b"windows-1251")
                || b.eq_ignore_ascii_case(b"windows1251") =>
            {
                Self::Windows1251
            }
            b if b.eq_ignore_ascii_case(b"windows-1252")
                || b.eq_ignore_ascii_case(b"windows1252")
                || b.eq_ignore_ascii_case(b"cp1252") =>
            {
                Self::Windows1252
            }
            b if b.eq_ignore_ascii_case(b"windows-1253")
                || b.eq_ignore_ascii_case(b"windows1253") =>
            {
                Self::Windows1253
            }
            b if b.eq_ignore_ascii_case(b"gbk") => Self::GBK,
            b if b.eq_ignore_ascii_case(b"gb2312") || b.eq_ignore_ascii_case(b"gb-2312") => {
                Self::GB2312
            }
            b if b.eq_ignore_ascii_case(b"gb18030") || b.eq_ignore_ascii_case(b"gb-18030") => {
                Self::GB18030
            }
            b if b.eq_ignore_ascii_case(b"big5") => Self::BIG5,
            b if b.eq_ignore_ascii_case(b"iso-2022-jp") => Self::ISO2022JP,
            b if b.eq_ignore_ascii_case(b"euc-jp") => Self::EUCJP,
            b if b.eq_ignore_ascii_case(b"koi8-r") => Self::KOI8R,
            b if b.eq_ignore_ascii_case(b"koi8-u") => Self::KOI8U,
            _ => {
                debug!("unknown charset tag is {:?}", str::from_utf8(b));
                Self::Ascii
            }
        }
    }
}

impl Display for Charset {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        match self {
            Self::Ascii => write!(f, "us-ascii"),
            Self::UTF8 => write!(f, "utf-8"),
            Self::UTF16 => write!(f, "utf-16"),
            Self::ISO8859_1 => write!(f, "iso-8859-1"),
            Self::ISO8859_2 => write!(f, "iso-8859-2"),
            Self::ISO8859_3 => write!(f, "iso-8859-3"),
            Self::ISO8859_4 => write!(f, "iso-8859-4"),
            Self::ISO8859_5 => write!(f, "iso-8859-5"),
            Self::ISO8859_6 => write!(f, "iso-8859-6"),
            Self::ISO8859_7 => write!(f, "iso-8859-7"),
            Self::ISO8859_8 => write!(f, "iso-8859-8"),
            Self::ISO8859_10 => write!(f, "iso-8859-10"),
            Self::ISO8859_13 => write!(f, "iso-8859-13"),
            Self::ISO8859_14 => write!(f, "iso-8859-14"),
            Self::ISO8859_15 => write!(f, "iso-8859-15"),
            Self::ISO8859_16 => write!(f, "iso-8859-16"),
            Self::Windows1250 => write!(f, "windows-1250"),
            Self::Windows1251 => write!(f, "windows-1251"),
            Self::Windows1252 => write!(f, "windows-1252"),
            Self::Windows1253 => write!(f, "windows-1253"),
            Self::GBK => write!(f, "gbk"),
            Self::GB2312 => write!(f, "gb2312"),
            Self::GB18030 => write!(f, "gb18030"),
            Self::BIG5 => write!(f, "big5"),
            Self::ISO2022JP => write!(f, "iso-2022-jp"),
            Self::EUCJP => write!(f, "euc-jp"),
            Self::KOI8R => write!(f, "koi8-r"),
            Self::KOI8U => write!(f, "koi8-u"),
        }
    }
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum MultipartType {
    Alternative,
    Digest,
    Mixed,
    Related,
    Other { tag: Vec<u8> },
}

impl Default for MultipartType {
    fn default() -> Self {
        Self::Mixed
    }
}

impl Display for MultipartType {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        match self {
            Self::Alternative => write!(f, "multipart/alternative"),
            Self::Digest => write!(f, "multipart/digest"),
            Self::Mixed => write!(f, "multipart/mixed"),
            Self::Related => write!(f, "multipart/related"),
            Self::Other { tag } => write!(f, "multipart/{}", String::from_utf8_lossy(tag)),
        }
    }
}

impl From<&[u8]> for MultipartType {
    fn from(val: &[u8]) -> Self {
        if val.eq_ignore_ascii_case(b"mixed") {
            Self::Mixed
        } else if val.eq_ignore_ascii_case(b"alternative") {
            Self::Alternative
        } else if val.eq_ignore_ascii_case(b"digest") {
            Self::Digest
        } else if val.eq_ignore_ascii_case(b"related") {
            Self::Related
        } else {
            Self::Other {
                tag: val.to_ascii_lowercase(),
            }
        }
    }
}

/// The parsed `Content-Type` of a part, along with the part's children when
/// the type is a `multipart`.
///
/// The effective media type of a part without a `Content-Type` header is the
/// `Default` impl, `text/plain; charset=us-ascii`.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum ContentType {
    Text {
        kind: Text,
        parameters: Vec<(Vec<u8>, Vec<u8>)>,
        charset: Charset,
    },
    Multipart {
        boundary: Vec<u8>,
        kind: MultipartType,
        parameters: Vec<(Vec<u8>, Vec<u8>)>,
        parts: Vec<Attachment>,
    },
    MessageRfc822,
    Other {
        tag: Vec<u8>,
        name: Option<String>,
        parameters: Vec<(Vec<u8>, Vec<u8>)>,
    },
    OctetStream {
        name: Option<String>,
        parameters: Vec<(Vec<u8>, Vec<u8>)>,
    },
}

impl Default for ContentType {
    fn default() -> Self {
        Self::Text {
            kind: Text::Plain,
            parameters: Vec::new(),
            charset: Charset::Ascii,
        }
    }
}

impl PartialEq<&str> for ContentType {
    fn eq(&self, other: &&str) -> bool {
        match (self, *other) {
            (
                Self::Text {
                    kind: Text::Plain, ..
                },
                "text/plain",
            )
            | (
                Self::Text {
                    kind: Text::Html, ..
                },
                "text/html",
            )
            | (
                Self::Multipart {
                    kind: MultipartType::Alternative,
                    ..
                },
                "multipart/alternative",
            )
            | (
                Self::Multipart {
                    kind: MultipartType::Digest,
                    ..
                },
                "multipart/digest",
            )
            | (
                Self::Multipart {
                    kind: MultipartType::Mixed,
                    ..
                },
                "multipart/mixed",
            )
            | (
                Self::Multipart {
                    kind: MultipartType::Related,
                    ..
                },
                "multipart/related",
            )
            | (Self::MessageRfc822, "message/rfc822")
            | (Self::OctetStream { .. }, "application/octet-stream") => true,
            (Self::Other { tag, .. }, _) => {
                other.eq_ignore_ascii_case(&String::from_utf8_lossy(tag))
            }
            _ => false,
        }
    }
}

impl Display for ContentType {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        match self {
            Self::Text { kind: t, .. } => t.fmt(f),
            Self::Multipart { kind: k, .. } => k.fmt(f),
            Self::Other { tag, .. } => write!(f, "{}", String::from_utf8_lossy(tag)),
            Self::MessageRfc822 => write!(f, "message/rfc822"),
            Self::OctetStream { .. } => write!(f, "application/octet-stream"),
        }
    }
}

impl ContentType {
    pub fn is_text(&self) -> bool {
        matches!(self, Self::Text { .. })
    }

    pub fn is_text_html(&self) -> bool {
        matches!(
            self,
            Self::Text {
                kind: Text::Html,
                ..
            }
        )
    }

    pub fn is_text_plain(&self) -> bool {
        matches!(
            self,
            Self::Text {
                kind: Text::Plain,
                ..
            }
        )
    }

    pub fn is_multipart(&self) -> bool {
        matches!(self, Self::Multipart { .. })
    }

    /// The top-level type token, e.g. `multipart` for `multipart/mixed`.
    pub fn toplevel(&self) -> &str {
        match self {
            Self::Text { .. } => "text",
            Self::Multipart { .. } => "multipart",
            Self::MessageRfc822 => "message",
            Self::OctetStream { .. } => "application",
            Self::Other { tag, .. } => {
                let tag = str::from_utf8(tag).unwrap_or_default();
                tag.split('/').next().unwrap_or_default()
            }
        }
    }

    /// Choose a boundary no line of any of `parts`' serialized forms starts
    /// with.
    ///
    /// rfc1341: "The only mandatory parameter for the multipart Content-Type
    /// is the boundary parameter, which consists of 1 to 70 characters from
    /// a set of characters known to be very robust through email gateways,
    /// and NOT ending with white space."
    pub fn make_boundary(parts: &[Attachment]) -> String {
        use crate::compose::random::gen_boundary;

        let mut boundary = "bzz_bzz__bzz__".to_string();
        let mut random_boundary = gen_boundary();

        let mut loop_counter = 4096;
        loop {
            let mut flag = true;
            for sub in parts {
                while sub.raw().find(random_boundary.as_bytes()).is_some() {
                    random_boundary = gen_boundary();
                    flag = false;
                }
            }
            if flag {
                break;
            }
            loop_counter -= 1;
            if loop_counter == 0 {
                panic!("Can't generate randomness. This is a BUG");
            }
        }

        boundary.push_str(&random_boundary);
        boundary.truncate(70);
        boundary
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Other { name, .. } | Self::OctetStream { name, .. } => {
                name.as_ref().map(|n| n.as_ref())
            }
            Self::Text { parameters, .. } => parameters
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(b"name"))
                .map(|(_, v)| str::from_utf8(v).unwrap_or_default()),
            _ => None,
        }
    }

    pub fn parts(&self) -> Option<&[Attachment]> {
        if let Self::Multipart { parts, .. } = self {
            Some(parts)
        } else {
            None
        }
    }

    pub fn parts_mut(&mut self) -> Option<&mut Vec<Attachment>> {
        if let Self::Multipart { parts, .. } = self {
            Some(parts)
        } else {
            None
        }
    }

    /// The parameter list of the value, in original order, not including
    /// any `boundary` parameter.
    pub fn parameters(&self) -> &[(Vec<u8>, Vec<u8>)] {
        match self {
            Self::Text { parameters, .. }
            | Self::Multipart { parameters, .. }
            | Self::Other { parameters, .. }
            | Self::OctetStream { parameters, .. } => parameters,
            Self::MessageRfc822 => &[],
        }
    }
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum Text {
    Plain,
    Html,
    Other { tag: Vec<u8> },
}

impl Text {
    pub fn is_html(&self) -> bool {
        matches!(self, Self::Html)
    }
}

impl Display for Text {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        match self {
            Self::Plain => write!(f, "text/plain"),
            Self::Html => write!(f, "text/html"),
            Self::Other { tag } => write!(f, "text/{}", String::from_utf8_lossy(tag)),
        }
    }
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum ContentTransferEncoding {
    _8Bit,
    _7Bit,
    Base64,
    QuotedPrintable,
    Other { tag: Vec<u8> },
}

impl Default for ContentTransferEncoding {
    fn default() -> Self {
        Self::_8Bit
    }
}

impl Display for ContentTransferEncoding {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        match self {
            Self::_7Bit => write!(f, "7bit"),
            Self::_8Bit => write!(f, "8bit"),
            Self::Base64 => write!(f, "base64"),
            Self::QuotedPrintable => write!(f, "quoted-printable"),
            Self::Other { tag } => write!(f, "{}", String::from_utf8_lossy(tag)),
        }
    }
}

impl From<&[u8]> for ContentTransferEncoding {
    fn from(val: &[u8]) -> Self {
        let val = val.trim();
        if val.eq_ignore_ascii_case(b"base64") {
            Self::Base64
        } else if val.eq_ignore_ascii_case(b"7bit") {
            Self::_7Bit
        } else if val.eq_ignore_ascii_case(b"8bit") {
            Self::_8Bit
        } else if val.eq_ignore_ascii_case(b"quoted-printable") {
            Self::QuotedPrintable
        } else {
            Self::Other {
                tag: val.to_ascii_lowercase(),
            }
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct ContentDisposition {
    pub kind: ContentDispositionKind,
    pub filename: Option<String>,
    pub creation_date: Option<String>,
    pub modification_date: Option<String>,
    pub read_date: Option<String>,
    pub size: Option<String>,
    pub parameters: Vec<(Vec<u8>, Vec<u8>)>,
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum ContentDispositionKind {
    Inline,
    Attachment,
}

impl ContentDispositionKind {
    pub fn is_inline(&self) -> bool {
        *self == Self::Inline
    }

    pub fn is_attachment(&self) -> bool {
        *self == Self::Attachment
    }
}

impl Default for ContentDispositionKind {
    fn default() -> Self {
        Self::Inline
    }
}

impl Display for ContentDispositionKind {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        match self {
            Self::Inline => write!(f, "inline"),
            Self::Attachment => write!(f, "attachment"),
        }
    }
}

impl From<&[u8]> for ContentDisposition {
    fn from(val: &[u8]) -> Self {
        crate::parser::attachments::content_disposition(val)
            .map(|(_, v)| v)
            .unwrap_or_default()
    }
}
