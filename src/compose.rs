/*
 * mimelib - compose module
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

//! Composing new e-mail.
//!
//! A [`Draft`] holds the logical inputs of a message: addressing headers, a
//! plain text body, optionally an HTML body with embedded objects, and a
//! list of attachments. [`Draft::finalise`] assembles the correct MIME
//! tree out of them:
//!
//! | plain alt | embedded | attachments | root structure |
//! |-----------|----------|-------------|----------------|
//! | no  | no  | no  | single text leaf |
//! | yes | no  | no  | `multipart/alternative` |
//! | no  | yes | no  | `multipart/related` |
//! | yes | yes | no  | `multipart/alternative` with nested `multipart/related` |
//! | *   | *   | yes | all of the above wrapped in `multipart/mixed` |

pub mod mime;
pub mod random;
#[cfg(test)]
mod tests;

use std::{ffi::OsStr, path::Path, str::FromStr};

use crate::{
    attachment_types::{
        Charset, ContentDisposition, ContentDispositionKind, ContentTransferEncoding, ContentType,
        MultipartType, Text,
    },
    attachments::{Attachment, AttachmentBuilder},
    error::{Error, ErrorKind, Result},
    headers::{HeaderMap, HeaderName},
    message::Message,
    parser,
    utils::datetime,
};

#[derive(Clone, Debug, PartialEq)]
pub struct Draft {
    pub headers: HeaderMap,
    pub body: String,
    pub html_body: Option<String>,
    pub embedded: Vec<AttachmentBuilder>,
    pub attachments: Vec<AttachmentBuilder>,
}

impl Default for Draft {
    fn default() -> Self {
        let mut headers = HeaderMap::default();
        headers.insert(
            HeaderName::DATE,
            datetime::timestamp_to_rfc822(datetime::now()),
        );
        headers.insert(HeaderName::FROM, "".into());
        headers.insert(HeaderName::TO, "".into());
        headers.insert(HeaderName::CC, "".into());
        headers.insert(HeaderName::BCC, "".into());
        headers.insert(HeaderName::SUBJECT, "".into());
        headers.insert(HeaderName::USER_AGENT, "mimelib".into());
        Self {
            headers,
            body: String::new(),
            html_body: None,
            embedded: Vec::new(),
            attachments: Vec::new(),
        }
    }
}

impl FromStr for Draft {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s.is_empty() {
            return Err(Error::new("Empty input in Draft::from_str")
                .set_kind(ErrorKind::ValueError));
        }

        let (_, (headers, body)) = parser::headers::mail(s.as_bytes()).map_err(|err| {
            Error::from(err)
                .set_summary("Could not parse e-mail into a Draft")
                .set_kind(ErrorKind::ValueError)
        })?;
        let mut ret = Self::default();

        for (k, v) in headers {
            if ignore_header(k) {
                continue;
            }
            let name = HeaderName::from_bytes(k).map_err(Error::from)?;
            let value = parser::generic::unstructured(v)?;
            ret.headers.insert(name, value);
        }
        if ret.headers.contains_key(HeaderName::FROM)
            && !ret.headers.contains_key(HeaderName::MESSAGE_ID)
        {
            if let Ok((_, addr)) =
                parser::address::mailbox(ret.headers[HeaderName::FROM].as_bytes())
            {
                if let Some(fqdn) = addr.get_fqdn() {
                    ret.headers
                        .insert(HeaderName::MESSAGE_ID, random::gen_message_id(&fqdn));
                }
            }
        }

        ret.body = String::from_utf8(body.to_vec())?;

        Ok(ret)
    }
}

impl Draft {
    /// Start a reply to `message`: `To` from `Reply-To` or `From`,
    /// threading headers accumulated, the original body quoted.
    pub fn new_reply(message: &Message) -> Self {
        let mut ret = Self::default();
        let mut references = String::new();
        if let Some(refs) = message.references() {
            for r in &refs.refs {
                if !references.is_empty() {
                    references.push(' ');
                }
                references.push_str(&r.to_string());
            }
        }
        if let Ok(mid) = message.message_id() {
            if !references.is_empty() {
                references.push(' ');
            }
            references.push_str(&mid.to_string());
            ret.headers.insert(HeaderName::IN_REPLY_TO, mid.to_string());
        }
        if !references.is_empty() {
            ret.headers.insert(HeaderName::REFERENCES, references);
        }
        if let Some(reply_to) = message.headers().get(HeaderName::REPLY_TO) {
            ret.headers.insert(HeaderName::TO, reply_to.to_string());
        } else if let Some(from) = message.headers().get(HeaderName::FROM) {
            ret.headers.insert(HeaderName::TO, from.to_string());
        }
        if let Some(cc) = message.headers().get(HeaderName::CC) {
            ret.headers.insert(HeaderName::CC, cc.to_string());
        }
        if let Ok(subject) = message.subject() {
            if subject
                .get(..3)
                .map(|s| s.eq_ignore_ascii_case("re:"))
                .unwrap_or(false)
            {
                ret.headers.insert(HeaderName::SUBJECT, subject);
            } else {
                ret.headers
                    .insert(HeaderName::SUBJECT, format!("Re: {}", subject));
            }
        }
        ret.body = {
            let reply_body = message.root.text();
            let lines: Vec<&str> = reply_body.lines().collect();
            let mut body = String::with_capacity(reply_body.len() + lines.len() * 2);
            for l in lines {
                body.push('>');
                body.push(' ');
                body.push_str(l.trim());
                body.push('\n');
            }
            body.pop();
            body
        };

        ret
    }

    pub fn set_header(&mut self, header: HeaderName, value: String) -> &mut Self {
        self.headers.insert(header, value);
        self
    }

    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn set_body(&mut self, s: String) -> &mut Self {
        self.body = s;
        self
    }

    pub fn html_body(&self) -> Option<&str> {
        self.html_body.as_deref()
    }

    /// Set an HTML body. A non-empty plain [`Draft::body`] becomes its
    /// plain text alternative.
    pub fn set_html_body(&mut self, s: String) -> &mut Self {
        self.html_body = Some(s);
        self
    }

    pub fn attachments(&self) -> &[AttachmentBuilder] {
        &self.attachments
    }

    pub fn attachments_mut(&mut self) -> &mut Vec<AttachmentBuilder> {
        &mut self.attachments
    }

    /// Objects referenced from the HTML body through `cid:` URIs. Each
    /// builder must carry a `Content-ID` header.
    pub fn embedded_mut(&mut self) -> &mut Vec<AttachmentBuilder> {
        &mut self.embedded
    }

    /// The edit representation: headers, one empty line, plain body. No
    /// MIME structure, no encoding.
    pub fn to_edit_string(&self) -> String {
        let mut ret = String::new();

        for (name, values) in self.headers.iter() {
            for value in values.iter() {
                ret.push_str(&format!("{}: {}\n", name, value));
            }
        }
        ret.push('\n');
        ret.push_str(&self.body);

        ret
    }

    fn text_leaf(content: &str, kind: Text) -> Attachment {
        let mut builder = AttachmentBuilder::default();
        let charset = if content.is_ascii() {
            Charset::Ascii
        } else {
            Charset::UTF8
        };
        builder.set_content_type(ContentType::Text {
            kind,
            charset,
            parameters: vec![(b"charset".to_vec(), charset.to_string().into_bytes())],
        });
        builder.set_content_transfer_encoding(mime::transfer_encoding_for(
            content.as_bytes(),
            true,
        ));
        builder.set_raw(content.as_bytes().to_vec());
        builder.build()
    }

    fn multipart(
        kind: MultipartType,
        parameters: Vec<(Vec<u8>, Vec<u8>)>,
        parts: Vec<Attachment>,
    ) -> Attachment {
        let boundary = ContentType::make_boundary(&parts).into_bytes();
        let mut att = Attachment::new(
            ContentType::Multipart {
                boundary,
                kind,
                parameters,
                parts,
            },
            ContentTransferEncoding::_7Bit,
            Vec::new(),
        );
        att.content_disposition = ContentDisposition::default();
        att
    }

    /// The `cid:` URIs referenced from `html`.
    fn scan_cids(html: &str) -> Vec<String> {
        let mut ret = Vec::new();
        let mut rest = html;
        while let Some(pos) = rest.find("cid:") {
            let after = &rest[pos + 4..];
            let end = after
                .find(|c: char| {
                    c.is_whitespace() || matches!(c, '"' | '\'' | ')' | '>' | '<' | ',')
                })
                .unwrap_or(after.len());
            if end > 0 {
                ret.push(after[..end].to_string());
            }
            rest = &after[end..];
        }
        ret
    }

    /// Assemble and serialize the message.
    ///
    /// The tree shape follows the embedded/alternative/attachment decision
    /// table of the module documentation. `MIME-Version`, `Date` and a
    /// `Message-ID` derived from the `From` domain are stamped on the root.
    pub fn finalise(mut self) -> Result<String> {
        if self.headers.contains_key(HeaderName::FROM)
            && !self.headers.contains_key(HeaderName::MESSAGE_ID)
        {
            if let Ok((_, addr)) =
                parser::address::mailbox(self.headers[HeaderName::FROM].as_bytes())
            {
                if let Some(fqdn) = addr.get_fqdn() {
                    self.headers
                        .insert(HeaderName::MESSAGE_ID, random::gen_message_id(&fqdn));
                }
            }
        }
        if !self.headers.contains_key(HeaderName::DATE) {
            self.headers.insert(
                HeaderName::DATE,
                datetime::timestamp_to_rfc822(datetime::now()),
            );
        }

        /* embedded objects are only reachable through cid: references in an
         * HTML body */
        if self.html_body.is_none() && !self.embedded.is_empty() {
            return Err(Error::new(
                "embedded objects were attached but there is no HTML body to reference them",
            )
            .set_kind(ErrorKind::BuilderInvariant));
        }

        /* every cid: reference must resolve to an embedded object */
        if let Some(ref html) = self.html_body {
            let ids: Vec<String> = self
                .embedded
                .iter()
                .filter_map(|b| {
                    b.headers.get(HeaderName::CONTENT_ID).map(|v| {
                        let v = v.trim();
                        v.strip_prefix('<')
                            .and_then(|v| v.strip_suffix('>'))
                            .unwrap_or(v)
                            .to_string()
                    })
                })
                .collect();
            for cid in Self::scan_cids(html) {
                if !ids.iter().any(|id| *id == cid) {
                    return Err(Error::new(format!(
                        "HTML body references cid:{} but no embedded object carries that \
                         Content-ID",
                        cid
                    ))
                    .set_kind(ErrorKind::BuilderInvariant));
                }
            }
        }

        let embedded: Vec<Attachment> = std::mem::take(&mut self.embedded)
            .into_iter()
            .map(AttachmentBuilder::build)
            .collect();
        let attachments: Vec<Attachment> = std::mem::take(&mut self.attachments)
            .into_iter()
            .map(AttachmentBuilder::build)
            .collect();

        let content = match self.html_body.take() {
            None => Self::text_leaf(&self.body, Text::Plain),
            Some(html) => {
                let html_leaf = Self::text_leaf(&html, Text::Html);
                let related = if embedded.is_empty() {
                    html_leaf
                } else {
                    let mut parts = Vec::with_capacity(1 + embedded.len());
                    parts.push(html_leaf);
                    parts.extend(embedded);
                    Self::multipart(
                        MultipartType::Related,
                        vec![(b"type".to_vec(), b"text/html".to_vec())],
                        parts,
                    )
                };
                if self.body.is_empty() {
                    related
                } else {
                    let plain = Self::text_leaf(&self.body, Text::Plain);
                    Self::multipart(MultipartType::Alternative, Vec::new(), vec![plain, related])
                }
            }
        };

        let mut root = if attachments.is_empty() {
            content
        } else {
            let mut parts = Vec::with_capacity(1 + attachments.len());
            parts.push(content);
            parts.extend(attachments);
            Self::multipart(MultipartType::Mixed, Vec::new(), parts)
        };

        let mut headers = std::mem::take(&mut self.headers);
        headers.insert(HeaderName::MIME_VERSION, "1.0".into());
        root.headers = headers;

        let bytes = Message { root }.to_bytes()?;
        Ok(String::from_utf8(bytes)?)
    }
}

fn ignore_header(header: &[u8]) -> bool {
    match header {
        h if h.eq_ignore_ascii_case(b"from")
            || h.eq_ignore_ascii_case(b"to")
            || h.eq_ignore_ascii_case(b"date")
            || h.eq_ignore_ascii_case(b"message-id")
            || h.eq_ignore_ascii_case(b"user-agent")
            || h.eq_ignore_ascii_case(b"subject")
            || h.eq_ignore_ascii_case(b"reply-to")
            || h.eq_ignore_ascii_case(b"cc")
            || h.eq_ignore_ascii_case(b"bcc")
            || h.eq_ignore_ascii_case(b"in-reply-to")
            || h.eq_ignore_ascii_case(b"references") =>
        {
            false
        }
        h if h.eq_ignore_ascii_case(b"mime-version") => true,
        h if h.starts_with(b"X-") || h.starts_with(b"x-") => false,
        _ => true,
    }
}

/// Build an attachment out of a file: media type guessed by extension,
/// `base64` transfer encoding, `attachment` disposition with the file name.
pub fn attachment_from_file<P: AsRef<Path>>(path: P) -> Result<AttachmentBuilder> {
    let path = path.as_ref();
    let contents = std::fs::read(path)?;
    let filename = path
        .file_name()
        .and_then(OsStr::to_str)
        .map(str::to_string)
        .ok_or_else(|| {
            Error::new(format!("{} is not a file", path.display())).set_kind(ErrorKind::ValueError)
        })?;
    let tag: &[u8] = match path
        .extension()
        .and_then(OsStr::to_str)
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("jpg") | Some("jpeg") => b"image/jpeg",
        Some("png") => b"image/png",
        Some("gif") => b"image/gif",
        Some("pdf") => b"application/pdf",
        Some("txt") | Some("text") => b"text/plain",
        Some("html") | Some("htm") => b"text/html",
        Some("zip") => b"application/zip",
        _ => b"application/octet-stream",
    };
    let mut builder = AttachmentBuilder::default();
    if tag.starts_with(b"text/") {
        builder.set_content_type_from_bytes(
            format!("{}; name={}", String::from_utf8_lossy(tag), filename).as_bytes(),
        );
        builder.set_content_transfer_encoding(mime::transfer_encoding_for(&contents, true));
    } else if tag == b"application/octet-stream" {
        builder.set_content_type(ContentType::OctetStream {
            name: Some(filename.clone()),
            parameters: vec![(b"name".to_vec(), filename.clone().into_bytes())],
        });
        builder.set_content_transfer_encoding(ContentTransferEncoding::Base64);
    } else {
        builder.set_content_type(ContentType::Other {
            tag: tag.to_vec(),
            name: Some(filename.clone()),
            parameters: vec![(b"name".to_vec(), filename.clone().into_bytes())],
        });
        builder.set_content_transfer_encoding(ContentTransferEncoding::Base64);
    }
    builder.set_content_disposition(ContentDisposition {
        kind: ContentDispositionKind::Attachment,
        filename: Some(filename),
        ..ContentDisposition::default()
    });
    builder.set_raw(contents);
    Ok(builder)
}
