/*
 * mimelib - attachments module
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

//! The part tree of a message.
//!
//! An [`Attachment`] is one part: its own header fields, a typed content
//! type, transfer encoding and disposition, and its body octets. Multipart
//! parts carry their children inside
//! [`ContentType::Multipart`] together with the preamble and epilogue
//! octets. An [`AttachmentBuilder`] parses or assembles a part; the built
//! [`Attachment`] is immutable and its `raw`/`body` octets are always in
//! wire form, matching `content_transfer_encoding`.

use std::{fmt, io};

use data_encoding::BASE64_MIME;

use crate::{
    address::StrBuilder,
    compose::mime,
    error::{Error, ErrorKind, Result},
    headers::{HeaderMap, HeaderName},
    parser,
    parser::BytesExt,
};

pub use crate::attachment_types::*;

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct AttachmentBuilder {
    pub headers: HeaderMap,
    pub content_type: ContentType,
    pub content_transfer_encoding: ContentTransferEncoding,
    pub content_disposition: ContentDisposition,

    pub raw: Vec<u8>,
    pub body: StrBuilder,
    preamble: StrBuilder,
    epilogue: StrBuilder,
    /// Whether `raw` already holds transfer-encoded octets. Parsed input
    /// always does; octets set through [`AttachmentBuilder::set_raw`] get
    /// encoded on [`AttachmentBuilder::build`].
    raw_is_encoded: bool,
}

impl AttachmentBuilder {
    /// Parse a part (headers and body) out of `content`.
    ///
    /// Never fails: content that has no parseable header block at all
    /// becomes a `text/plain` leaf of the whole input.
    pub fn new(content: &[u8]) -> Self {
        let (headers, body) = match parser::attachments::attachment(content) {
            Ok((_, v)) => v,
            Err(_) => {
                debug!(
                    "error in parsing attachment: {:?}",
                    String::from_utf8_lossy(content)
                );
                return Self {
                    content_transfer_encoding: ContentTransferEncoding::_7Bit,
                    raw: content.to_vec(),
                    body: StrBuilder {
                        length: content.len(),
                        offset: 0,
                    },
                    raw_is_encoded: true,
                    ..Self::default()
                };
            }
        };

        let mut builder = Self {
            raw: content.to_vec(),
            body: StrBuilder {
                offset: content.len() - body.len(),
                length: body.len(),
            },
            raw_is_encoded: true,
            ..Self::default()
        };
        for (name, value) in headers {
            builder.add_header(name, value);
        }
        builder
    }

    fn add_header(&mut self, name: &[u8], value: &[u8]) {
        if name.eq_ignore_ascii_case(b"content-type") {
            self.set_content_type_from_bytes(value);
        } else if name.eq_ignore_ascii_case(b"content-transfer-encoding") {
            self.content_transfer_encoding = ContentTransferEncoding::from(value);
        } else if name.eq_ignore_ascii_case(b"content-disposition") {
            self.content_disposition = ContentDisposition::from(value);
        }
        if let Ok(header_name) = HeaderName::from_bytes(name) {
            let decoded = parser::generic::unstructured(value)
                .unwrap_or_else(|_| String::from_utf8_lossy(value).to_string());
            self.headers.append(header_name, decoded);
        } else {
            debug!("invalid header name: {:?}", String::from_utf8_lossy(name));
        }
    }

    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    pub fn body(&self) -> &[u8] {
        self.body.display_bytes(&self.raw)
    }

    /// Set the part's body octets in their logical (unencoded) form. They
    /// are transfer-encoded on [`AttachmentBuilder::build`] according to
    /// the set encoding.
    pub fn set_raw(&mut self, raw: Vec<u8>) -> &mut Self {
        self.raw = raw;
        self.body = StrBuilder {
            offset: 0,
            length: self.raw.len(),
        };
        self.raw_is_encoded = false;
        self
    }

    /// Set body to the entire raw contents, use this if raw contains only
    /// data and no headers. If raw contains data and headers pass it
    /// through [`AttachmentBuilder::new`].
    pub fn set_body_to_raw(&mut self) -> &mut Self {
        self.body = StrBuilder {
            offset: 0,
            length: self.raw.len(),
        };
        self
    }

    pub fn set_content_type(&mut self, val: ContentType) -> &mut Self {
        self.content_type = val;
        self
    }

    pub fn content_type(&self) -> &ContentType {
        &self.content_type
    }

    pub fn set_content_transfer_encoding(&mut self, val: ContentTransferEncoding) -> &mut Self {
        self.content_transfer_encoding = val;
        self
    }

    pub fn content_transfer_encoding(&self) -> &ContentTransferEncoding {
        &self.content_transfer_encoding
    }

    pub fn set_content_disposition(&mut self, val: ContentDisposition) -> &mut Self {
        self.content_disposition = val;
        self
    }

    pub fn content_disposition(&self) -> &ContentDisposition {
        &self.content_disposition
    }

    pub fn set_header(&mut self, name: HeaderName, value: String) -> &mut Self {
        self.headers.insert(name, value);
        self
    }

    /// Interpret a raw `Content-Type` header value, recursively parsing
    /// multipart children and discovering preamble and epilogue.
    pub fn set_content_type_from_bytes(&mut self, value: &[u8]) -> &mut Self {
        match parser::attachments::content_type(value) {
            Ok((_, (ct, cst, params))) => {
                let merged = parser::attachments::rfc2231_parameters(&params);
                if ct.eq_ignore_ascii_case(b"multipart") {
                    let mut boundary = None;
                    for (n, v) in &merged {
                        if n.eq_ignore_ascii_case(b"boundary") && !v.is_empty() {
                            boundary = Some(v.clone());
                            break;
                        }
                    }
                    if let Some(boundary) = boundary {
                        let sections = parser::attachments::multipart_sections(
                            self.body.display_bytes(&self.raw),
                            &boundary,
                        );
                        if !sections.terminated {
                            debug!(
                                "multipart body without closing delimiter, boundary {:?}",
                                String::from_utf8_lossy(&boundary)
                            );
                        }
                        let base = self.body.offset;
                        let mut parts = Vec::with_capacity(sections.parts.len());
                        for s in &sections.parts {
                            let slice = &self.raw[base + s.offset..base + s.offset + s.length];
                            parts.push(Self::new(slice).build());
                        }
                        self.preamble = StrBuilder {
                            offset: base + sections.preamble.offset,
                            length: sections.preamble.length,
                        };
                        self.epilogue = StrBuilder {
                            offset: base + sections.epilogue.offset.min(self.body.length),
                            length: sections.epilogue.length,
                        };
                        self.content_type = ContentType::Multipart {
                            boundary,
                            kind: MultipartType::from(cst),
                            parameters: merged
                                .iter()
                                .filter(|(n, _)| !n.eq_ignore_ascii_case(b"boundary"))
                                .cloned()
                                .collect(),
                            parts,
                        };
                    } else {
                        /* A multipart without a boundary parameter degrades
                         * to a single opaque leaf carrying the original
                         * bytes. */
                        debug!(
                            "no boundary parameter found in multipart/{}",
                            String::from_utf8_lossy(cst)
                        );
                        let mut tag: Vec<u8> = Vec::with_capacity(ct.len() + cst.len() + 1);
                        tag.extend(ct.to_ascii_lowercase());
                        tag.push(b'/');
                        tag.extend(cst.to_ascii_lowercase());
                        self.content_type = ContentType::Other {
                            tag,
                            name: None,
                            parameters: merged,
                        };
                    }
                } else if ct.eq_ignore_ascii_case(b"text") {
                    let mut charset = Charset::Ascii;
                    for (n, v) in &merged {
                        if n.eq_ignore_ascii_case(b"charset") {
                            charset = Charset::from(v.as_slice());
                            break;
                        }
                    }
                    let kind = if cst.eq_ignore_ascii_case(b"html") {
                        Text::Html
                    } else if cst.eq_ignore_ascii_case(b"plain") {
                        Text::Plain
                    } else {
                        Text::Other {
                            tag: cst.to_ascii_lowercase(),
                        }
                    };
                    self.content_type = ContentType::Text {
                        kind,
                        charset,
                        parameters: merged,
                    };
                } else if ct.eq_ignore_ascii_case(b"message") && cst.eq_ignore_ascii_case(b"rfc822")
                {
                    self.content_type = ContentType::MessageRfc822;
                } else {
                    let mut name: Option<String> = None;
                    for (n, v) in &merged {
                        if n.eq_ignore_ascii_case(b"name") || n.eq_ignore_ascii_case(b"filename") {
                            if let Ok((_, decoded)) =
                                parser::encodings::phrase(v.trim(), false)
                            {
                                name = Some(String::from_utf8_lossy(&decoded).to_string());
                            } else {
                                name = Some(String::from_utf8_lossy(v).to_string());
                            }
                            break;
                        }
                    }
                    if ct.eq_ignore_ascii_case(b"application")
                        && cst.eq_ignore_ascii_case(b"octet-stream")
                    {
                        self.content_type = ContentType::OctetStream {
                            name,
                            parameters: merged,
                        };
                    } else {
                        let mut tag: Vec<u8> = Vec::with_capacity(ct.len() + cst.len() + 1);
                        tag.extend(ct.to_ascii_lowercase());
                        tag.push(b'/');
                        tag.extend(cst.to_ascii_lowercase());
                        self.content_type = ContentType::Other {
                            tag,
                            name,
                            parameters: merged,
                        };
                    }
                }
            }
            Err(e) => {
                debug!(
                    "parsing error in content_type: {:?} {:?}",
                    String::from_utf8_lossy(value),
                    e
                );
            }
        }
        self
    }

    pub fn build(mut self) -> Attachment {
        if !self.raw_is_encoded {
            match self.content_transfer_encoding {
                ContentTransferEncoding::Base64 => {
                    self.raw = BASE64_MIME.encode(&self.raw).trim().to_string().into_bytes();
                }
                ContentTransferEncoding::QuotedPrintable => {
                    self.raw = mime::quoted_printable_encode(&self.raw);
                }
                _ => {}
            }
            self.body = StrBuilder {
                offset: 0,
                length: self.raw.len(),
            };
        }
        Attachment {
            headers: self.headers,
            content_type: self.content_type,
            content_transfer_encoding: self.content_transfer_encoding,
            content_disposition: self.content_disposition,
            raw: self.raw,
            body: self.body,
            preamble: self.preamble,
            epilogue: self.epilogue,
        }
    }
}

impl From<Attachment> for AttachmentBuilder {
    fn from(val: Attachment) -> Self {
        let Attachment {
            headers,
            content_type,
            content_disposition,
            content_transfer_encoding,
            raw,
            body,
            preamble,
            epilogue,
        } = val;
        Self {
            headers,
            content_type,
            content_disposition,
            content_transfer_encoding,
            raw,
            body,
            preamble,
            epilogue,
            raw_is_encoded: true,
        }
    }
}

/// Immutable part type.
#[derive(Clone, Deserialize, Serialize)]
pub struct Attachment {
    pub headers: HeaderMap,
    pub content_type: ContentType,
    pub content_transfer_encoding: ContentTransferEncoding,
    pub content_disposition: ContentDisposition,

    pub raw: Vec<u8>,
    pub body: StrBuilder,
    pub preamble: StrBuilder,
    pub epilogue: StrBuilder,
}

impl Default for Attachment {
    fn default() -> Self {
        AttachmentBuilder::default().build()
    }
}

/// Structural equality: typed content, header fields other than the
/// canonically regenerated content trio, and body octets. Raw buffer
/// layout does not participate, so a parsed part compares equal to the
/// reparse of its own serialization.
impl PartialEq for Attachment {
    fn eq(&self, other: &Self) -> bool {
        fn structural_headers(h: &HeaderMap) -> Vec<(&HeaderName, &[String])> {
            h.iter()
                .filter(|(name, _)| {
                    **name != HeaderName::CONTENT_TYPE
                        && **name != HeaderName::CONTENT_TRANSFER_ENCODING
                        && **name != HeaderName::CONTENT_DISPOSITION
                })
                .map(|(name, values)| (name, values.as_slice()))
                .collect()
        }

        if structural_headers(&self.headers) != structural_headers(&other.headers)
            || self.content_type != other.content_type
            || self.content_transfer_encoding != other.content_transfer_encoding
            || self.content_disposition != other.content_disposition
        {
            return false;
        }
        if self.content_type.is_multipart() {
            self.preamble() == other.preamble() && self.epilogue() == other.epilogue()
        } else {
            self.body() == other.body()
        }
    }
}

impl Eq for Attachment {}

impl fmt::Debug for Attachment {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Attachment")
            .field("content_type", &self.content_type)
            .field("content_transfer_encoding", &self.content_transfer_encoding)
            .field("content_disposition", &self.content_disposition)
            .field("raw bytes", &self.raw.len())
            .field("body", &self.text())
            .finish()
    }
}

impl fmt::Display for Attachment {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.content_type {
            ContentType::MessageRfc822 => match self.message() {
                Some(message) => write!(
                    f,
                    "message/rfc822: {}",
                    message
                        .subject()
                        .unwrap_or_else(|_| "no subject".to_string())
                ),
                None => write!(f, "message/rfc822 attachment"),
            },
            ContentType::OctetStream { ref name, .. } => {
                write!(f, "{}", name.clone().unwrap_or_else(|| self.mime_type()))
            }
            ContentType::Other {
                name: Some(ref name),
                ..
            } => write!(f, "\"{}\", [{}]", name, self.mime_type()),
            ContentType::Other { .. } => write!(f, "Data attachment of type {}", self.mime_type()),
            ContentType::Text { .. } => {
                if let Some(name) = self.content_type.name() {
                    write!(f, "\"{}\", [{}]", name, self.mime_type())
                } else {
                    write!(f, "Text attachment of type {}", self.mime_type())
                }
            }
            ContentType::Multipart { ref parts, .. } => write!(
                f,
                "{} attachment with {} subs",
                self.mime_type(),
                parts.len()
            ),
        }
    }
}

impl Attachment {
    /// A leaf part with the given types. `raw` must hold octets already in
    /// the form declared by `content_transfer_encoding`.
    pub fn new(
        content_type: ContentType,
        content_transfer_encoding: ContentTransferEncoding,
        raw: Vec<u8>,
    ) -> Self {
        Self {
            headers: HeaderMap::default(),
            content_type,
            content_disposition: ContentDisposition::default(),
            content_transfer_encoding,
            body: StrBuilder {
                length: raw.len(),
                offset: 0,
            },
            raw,
            preamble: StrBuilder::default(),
            epilogue: StrBuilder::default(),
        }
    }

    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    /// The part's body octets in wire form.
    pub fn body(&self) -> &[u8] {
        self.body.display_bytes(&self.raw)
    }

    pub fn preamble(&self) -> &[u8] {
        self.preamble.display_bytes(&self.raw)
    }

    pub fn epilogue(&self) -> &[u8] {
        self.epilogue.display_bytes(&self.raw)
    }

    pub fn content_type(&self) -> &ContentType {
        &self.content_type
    }

    pub fn content_transfer_encoding(&self) -> &ContentTransferEncoding {
        &self.content_transfer_encoding
    }

    pub fn mime_type(&self) -> String {
        self.content_type.to_string()
    }

    pub fn is_text(&self) -> bool {
        self.content_type.is_text()
    }

    pub fn is_html(&self) -> bool {
        match self.content_type {
            ContentType::Text {
                kind: Text::Html, ..
            } => true,
            ContentType::Text { .. } => false,
            ContentType::Multipart { ref parts, .. } => parts.iter().any(Self::is_html),
            _ => false,
        }
    }

    /// Whether this part is an attachment rather than primary content: a
    /// leaf whose disposition is `attachment`, or a leaf that is neither
    /// `text/*` nor `message/*`.
    pub fn is_attachment(&self) -> bool {
        match self.content_type {
            ContentType::Multipart { .. } => false,
            ContentType::MessageRfc822 | ContentType::Text { .. } => {
                self.content_disposition.kind.is_attachment()
            }
            _ => true,
        }
    }

    /// Depth-first collection of all attachment leaves of the tree.
    pub fn attachments(&self) -> Vec<Self> {
        let mut ret = Vec::new();
        fn collect(att: &Attachment, ret: &mut Vec<Attachment>) {
            match att.content_type {
                ContentType::Multipart { ref parts, .. } => {
                    for a in parts {
                        collect(a, ret);
                    }
                }
                _ => {
                    if att.is_attachment() {
                        ret.push(att.clone());
                    }
                }
            }
        }
        collect(self, &mut ret);
        ret
    }

    pub fn count_attachments(&self) -> usize {
        self.attachments().len()
    }

    /// The `Content-ID` of this part without the angle brackets, if set.
    pub fn content_id(&self) -> Option<String> {
        let val = self.headers.get(HeaderName::CONTENT_ID)?;
        let val = val.trim();
        Some(
            val.strip_prefix('<')
                .and_then(|v| v.strip_suffix('>'))
                .unwrap_or(val)
                .to_string(),
        )
    }

    pub fn content_location(&self) -> Option<&str> {
        self.headers.get(HeaderName::CONTENT_LOCATION)
    }

    /// The encapsulated message of a `message/rfc822` part, parsed on
    /// demand.
    pub fn message(&self) -> Option<crate::Message> {
        if !matches!(self.content_type, ContentType::MessageRfc822) {
            return None;
        }
        let bytes = self.decoded_bytes().ok()?;
        crate::Message::from_bytes(&bytes).ok()
    }

    /// The body octets with the transfer encoding undone. Fails with
    /// [`ErrorKind::UnknownEncoding`] on a transfer encoding we do not
    /// implement.
    pub fn decoded_bytes(&self) -> Result<Vec<u8>> {
        match self.content_transfer_encoding {
            ContentTransferEncoding::Base64 => {
                match BASE64_MIME.decode(self.body().trim()) {
                    Ok(v) => Ok(v),
                    Err(_) => Ok(self.body().to_vec()),
                }
            }
            ContentTransferEncoding::QuotedPrintable => Ok(parser::encodings::quoted_printable_bytes(
                self.body(),
            )
            .map_err(Error::from)?
            .1),
            ContentTransferEncoding::_7Bit | ContentTransferEncoding::_8Bit => {
                Ok(self.body().to_vec())
            }
            ContentTransferEncoding::Other { ref tag } => Err(Error::new(format!(
                "Unknown content transfer encoding: {}",
                String::from_utf8_lossy(tag)
            ))
            .set_kind(ErrorKind::UnknownEncoding)),
        }
    }

    fn get_text_recursive(&self, text: &mut Vec<u8>) {
        match self.content_type {
            ContentType::Text { .. } => {
                text.extend(decode(self, None));
            }
            ContentType::Multipart {
                ref kind,
                ref parts,
                ..
            } => match kind {
                MultipartType::Alternative => {
                    for a in parts {
                        if a.content_disposition.kind.is_inline()
                            && a.content_type.is_text_plain()
                        {
                            a.get_text_recursive(text);
                            break;
                        }
                    }
                }
                _ => {
                    for a in parts {
                        if a.content_disposition.kind.is_inline() {
                            a.get_text_recursive(text);
                        }
                    }
                }
            },
            _ => {}
        }
    }

    /// The text content of the tree: the plain representation of
    /// alternatives, inline parts of other multiparts.
    pub fn text(&self) -> String {
        let mut text = Vec::with_capacity(self.body.length);
        self.get_text_recursive(&mut text);
        String::from_utf8_lossy(text.as_slice()).into()
    }

    /// The name a file saved from this part should get.
    pub fn filename(&self) -> Option<String> {
        if self.content_disposition.kind.is_attachment() {
            self.content_disposition.filename.clone()
        } else {
            None
        }
        .or_else(|| self.content_type.name().map(str::to_string))
        .map(|n| n.replace(|c| std::path::is_separator(c) || c.is_ascii_control(), "_"))
    }

    /// Serialize the part (headers and body) as octets onto `out`.
    pub fn write_to<W: io::Write>(&self, out: &mut W) -> Result<()> {
        /* children are serialized first so the boundary can be verified
         * against their output */
        let children: Option<(Vec<Vec<u8>>, Vec<u8>)> =
            if let ContentType::Multipart { ref parts, .. } = self.content_type {
                let mut bufs = Vec::with_capacity(parts.len());
                for p in parts {
                    bufs.push(p.to_bytes()?);
                }
                let boundary = self.effective_boundary(&bufs);
                Some((bufs, boundary))
            } else {
                None
            };
        self.write_headers(out, children.as_ref().map(|(_, b)| b.as_slice()))?;
        out.write_all(b"\r\n")?;
        self.write_body(out, children)
    }

    /// Serialize the part into owned octets.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut ret = Vec::with_capacity(self.raw.len() + 256);
        self.write_to(&mut ret)?;
        Ok(ret)
    }

    /// The canonical `Content-Type` header value of this part, with the
    /// given boundary for multiparts.
    fn content_type_value(&self, boundary: Option<&[u8]>) -> String {
        let mut v = self.content_type.to_string();
        for (name, value) in self.content_type.parameters() {
            v.push_str("; ");
            v.push_str(&String::from_utf8_lossy(name));
            v.push('=');
            mime::push_parameter_value(&mut v, value);
        }
        if let Some(boundary) = boundary {
            v.push_str("; boundary=\"");
            v.push_str(&String::from_utf8_lossy(boundary));
            v.push('"');
        }
        v
    }

    fn content_disposition_value(&self) -> String {
        let cd = &self.content_disposition;
        let mut v = cd.kind.to_string();
        if let Some(ref filename) = cd.filename {
            v.push_str("; filename=");
            mime::push_parameter_value(&mut v, filename.as_bytes());
        }
        if let Some(ref size) = cd.size {
            v.push_str("; size=");
            v.push_str(size);
        }
        if let Some(ref date) = cd.creation_date {
            v.push_str("; creation-date=\"");
            v.push_str(date);
            v.push('"');
        }
        if let Some(ref date) = cd.modification_date {
            v.push_str("; modification-date=\"");
            v.push_str(date);
            v.push('"');
        }
        if let Some(ref date) = cd.read_date {
            v.push_str("; read-date=\"");
            v.push_str(date);
            v.push('"');
        }
        for (name, value) in &cd.parameters {
            v.push_str("; ");
            v.push_str(&String::from_utf8_lossy(name));
            v.push('=');
            mime::push_parameter_value(&mut v, value);
        }
        v
    }

    /// Pick the boundary to emit: the stored one if it does not occur as a
    /// line prefix in any child's serialized output, a fresh one otherwise.
    fn effective_boundary(&self, children: &[Vec<u8>]) -> Vec<u8> {
        let ContentType::Multipart {
            ref boundary,
            ref parts,
            ..
        } = self.content_type
        else {
            return Vec::new();
        };
        let conflicts = |candidate: &[u8]| {
            candidate.is_empty()
                || children.iter().any(|buf| {
                    buf.split(|&b| b == b'\n').any(|line| {
                        let line = line.rtrim();
                        line.starts_with(candidate)
                            || (line.starts_with(b"--") && line[2..].starts_with(candidate))
                    })
                })
        };
        let mut candidate = boundary.clone();
        while conflicts(&candidate) {
            candidate = ContentType::make_boundary(parts).into_bytes();
        }
        candidate
    }

    fn write_headers<W: io::Write>(&self, out: &mut W, boundary: Option<&[u8]>) -> Result<()> {
        let mut wrote_content_type = false;
        let mut wrote_encoding = false;
        let mut wrote_disposition = false;
        for (name, values) in self.headers.iter() {
            if *name == HeaderName::CONTENT_TYPE {
                mime::write_folded(out, "Content-Type", &self.content_type_value(boundary))?;
                wrote_content_type = true;
            } else if *name == HeaderName::CONTENT_TRANSFER_ENCODING {
                mime::write_folded(
                    out,
                    "Content-Transfer-Encoding",
                    &self.content_transfer_encoding.to_string(),
                )?;
                wrote_encoding = true;
            } else if *name == HeaderName::CONTENT_DISPOSITION {
                mime::write_folded(out, "Content-Disposition", &self.content_disposition_value())?;
                wrote_disposition = true;
            } else {
                for value in values.iter() {
                    let encoded = if value.is_ascii() {
                        value.clone()
                    } else {
                        mime::encode_header(value)
                    };
                    mime::write_folded(out, &name.to_string(), &encoded)?;
                }
            }
        }
        if !wrote_content_type && self.content_type != ContentType::default() {
            mime::write_folded(out, "Content-Type", &self.content_type_value(boundary))?;
        }
        if !wrote_encoding
            && !matches!(
                self.content_transfer_encoding,
                ContentTransferEncoding::_7Bit | ContentTransferEncoding::_8Bit
            )
        {
            mime::write_folded(
                out,
                "Content-Transfer-Encoding",
                &self.content_transfer_encoding.to_string(),
            )?;
        }
        if !wrote_disposition
            && (self.content_disposition.kind.is_attachment()
                || self.content_disposition.filename.is_some())
        {
            mime::write_folded(out, "Content-Disposition", &self.content_disposition_value())?;
        }
        Ok(())
    }

    fn write_body<W: io::Write>(
        &self,
        out: &mut W,
        children: Option<(Vec<Vec<u8>>, Vec<u8>)>,
    ) -> Result<()> {
        if let Some((bufs, boundary)) = children {
            /* the line terminator before each delimiter belongs to the
             * delimiter, so the preamble and the parts are written without
             * a trailing one */
            let preamble = self.preamble();
            out.write_all(preamble)?;
            if bufs.is_empty() {
                if !preamble.is_empty() {
                    out.write_all(b"\r\n")?;
                }
                out.write_all(b"--")?;
                out.write_all(&boundary)?;
                out.write_all(b"--\r\n")?;
            } else {
                for (i, buf) in bufs.iter().enumerate() {
                    if i > 0 || !preamble.is_empty() {
                        out.write_all(b"\r\n")?;
                    }
                    out.write_all(b"--")?;
                    out.write_all(&boundary)?;
                    out.write_all(b"\r\n")?;
                    out.write_all(buf)?;
                }
                out.write_all(b"\r\n--")?;
                out.write_all(&boundary)?;
                out.write_all(b"--\r\n")?;
            }
            let epilogue = self.epilogue();
            if !epilogue.is_empty() {
                out.write_all(epilogue)?;
            }
            Ok(())
        } else {
            out.write_all(self.body())?;
            Ok(())
        }
    }
}

pub type Filter<'a> = Box<dyn FnMut(&'a Attachment, &mut Vec<u8>) + 'a>;

fn decode_helper<'a>(a: &'a Attachment, filter: &mut Option<Filter<'a>>) -> Vec<u8> {
    let charset = match a.content_type {
        ContentType::Text { charset: c, .. } => c,
        _ => Charset::default(),
    };

    let bytes = a.decoded_bytes().unwrap_or_else(|_| a.body().to_vec());

    let mut ret = if a.content_type.is_text() {
        if let Ok(v) = parser::encodings::decode_charset(&bytes, charset) {
            v.into_bytes()
        } else {
            bytes
        }
    } else {
        bytes
    };
    if let Some(filter) = filter {
        filter(a, &mut ret);
    }

    ret
}

/// Decode a single leaf part into displayable bytes.
pub fn decode<'a>(a: &'a Attachment, mut filter: Option<Filter<'a>>) -> Vec<u8> {
    decode_helper(a, &mut filter)
}
