/*
 * mimelib - message module
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

//! The root of a parsed e-mail.
//!
//! A [`Message`] is the topmost [`Attachment`] of the part tree plus typed,
//! registry-driven access to its header fields. Parsing is permissive:
//! [`Message::from_bytes`] accepts anything with a parseable header block
//! and degrades everything else. Typed access is strict: each accessor
//! surfaces the parse failure of its field.


use std::io;

use smallvec::SmallVec;

use crate::{
    address::{Address, MessageID, References},
    attachment_types::{ContentDisposition, ContentTransferEncoding, ContentType},
    attachments::{Attachment, AttachmentBuilder},
    error::{Error, ErrorKind, Result},
    headers::{HeaderMap, HeaderName, ValueKind},
    parser,
    parser::BytesExt,
    utils::datetime::UnixTimestamp,
};

/// A typed header field value, selected by the field name through the
/// [`ValueKind`] registry.
#[derive(Clone, Debug)]
pub enum FieldValue {
    Mailbox(Address),
    AddressList(SmallVec<[Address; 1]>),
    DateTime {
        timestamp: UnixTimestamp,
        /// Zone offset in minutes east of UTC.
        offset: i64,
    },
    Text(String),
    MediaType(ContentType),
    Encoding(ContentTransferEncoding),
    Disposition(ContentDisposition),
    MessageId(MessageID),
    MessageIdList(Vec<MessageID>),
    Raw(String),
}

/// A parsed e-mail: the root part of the tree.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Message {
    pub root: Attachment,
}

impl std::ops::Deref for Message {
    type Target = Attachment;

    fn deref(&self) -> &Attachment {
        &self.root
    }
}

impl Message {
    /// Parse `bytes` into a message tree.
    ///
    /// Accepts both `CRLF` and bare `LF` line terminators, and recovers
    /// from an mbox `From ` line prefix. Returns an error only when no
    /// header field can be parsed at all.
    pub fn from_bytes(mut bytes: &[u8]) -> Result<Self> {
        if bytes.starts_with(b"From ") {
            /* Attempt to recover if message includes the mbox From label as
             * first line */
            if let Some(offset) = bytes.find(b"\n") {
                bytes = &bytes[offset + 1..];
            }
        }
        if parser::headers::headers(bytes).is_err() {
            return Err(Error::new("Could not parse mail.").set_kind(ErrorKind::Parsing));
        }
        Ok(Self {
            root: AttachmentBuilder::new(bytes).build(),
        })
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.root.headers
    }

    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.root.headers
    }

    /// The typed value of the first field named `name`, parsed per the
    /// registry. A field whose typed parse fails surfaces the failure;
    /// names registered as `Raw` and unknown names yield
    /// [`FieldValue::Raw`].
    pub fn typed_value(&self, name: HeaderName) -> Result<FieldValue> {
        let value = self
            .root
            .headers
            .get(&name)
            .ok_or_else(|| {
                Error::new(format!("Header {} not present", name)).set_kind(ErrorKind::None)
            })?
            .to_string();
        fn malformed(what: &str, value: &str) -> Error {
            Error::new(format!("Could not parse {} value: {:?}", what, value))
                .set_kind(ErrorKind::MalformedFieldValue)
        }
        Ok(match name.value_kind() {
            ValueKind::Mailbox => FieldValue::Mailbox(
                parser::address::mailbox(value.as_bytes())
                    .map_err(|_| malformed("mailbox", &value))?
                    .1,
            ),
            ValueKind::AddressList => FieldValue::AddressList(
                parser::address::rfc2822address_list(value.as_bytes())
                    .map_err(|_| malformed("address list", &value))?
                    .1,
            ),
            ValueKind::DateTime => {
                let (timestamp, offset) = parser::dates::rfc5322_date_zone(value.as_bytes())?;
                FieldValue::DateTime { timestamp, offset }
            }
            ValueKind::Text => FieldValue::Text(value),
            ValueKind::MediaType => {
                let mut builder = AttachmentBuilder::default();
                builder.set_content_type_from_bytes(value.as_bytes());
                FieldValue::MediaType(builder.content_type().clone())
            }
            ValueKind::Encoding => {
                FieldValue::Encoding(ContentTransferEncoding::from(value.as_bytes()))
            }
            ValueKind::Disposition => FieldValue::Disposition(
                parser::attachments::content_disposition(value.as_bytes())
                    .map_err(|_| malformed("content disposition", &value))?
                    .1,
            ),
            ValueKind::MessageId => FieldValue::MessageId(
                parser::address::msg_id(value.as_bytes())
                    .map_err(|_| malformed("message id", &value))?
                    .1,
            ),
            ValueKind::MessageIdList => FieldValue::MessageIdList(
                parser::address::msg_id_list(value.as_bytes())
                    .map_err(|_| malformed("message id list", &value))?
                    .1,
            ),
            ValueKind::Raw => FieldValue::Raw(value),
        })
    }

    pub fn subject(&self) -> Result<String> {
        if !self.root.headers.contains_key(HeaderName::SUBJECT) {
            return Ok(String::new());
        }
        match self.typed_value(HeaderName::SUBJECT)? {
            FieldValue::Text(mut s) => {
                while s.chars().last().map(char::is_control).unwrap_or(false) {
                    s.pop();
                }
                Ok(s)
            }
            _ => Ok(String::new()),
        }
    }

    pub fn from_addresses(&self) -> Result<SmallVec<[Address; 1]>> {
        self.address_list(HeaderName::FROM)
    }

    pub fn to_addresses(&self) -> Result<SmallVec<[Address; 1]>> {
        self.address_list(HeaderName::TO)
    }

    pub fn cc_addresses(&self) -> Result<SmallVec<[Address; 1]>> {
        self.address_list(HeaderName::CC)
    }

    pub fn bcc_addresses(&self) -> Result<SmallVec<[Address; 1]>> {
        self.address_list(HeaderName::BCC)
    }

    fn address_list(&self, name: HeaderName) -> Result<SmallVec<[Address; 1]>> {
        if !self.root.headers.contains_key(&name) {
            return Ok(SmallVec::new());
        }
        match self.typed_value(name)? {
            FieldValue::AddressList(list) => Ok(list),
            FieldValue::Mailbox(mbox) => {
                let mut ret = SmallVec::new();
                ret.push(mbox);
                Ok(ret)
            }
            _ => Ok(SmallVec::new()),
        }
    }

    /// The `Date` field as a UNIX timestamp.
    pub fn date(&self) -> Result<UnixTimestamp> {
        match self.typed_value(HeaderName::DATE)? {
            FieldValue::DateTime { timestamp, .. } => Ok(timestamp),
            _ => Ok(0),
        }
    }

    pub fn message_id(&self) -> Result<MessageID> {
        match self.typed_value(HeaderName::MESSAGE_ID)? {
            FieldValue::MessageId(id) => Ok(id),
            _ => Err(Error::new("Message-ID is not a msg-id value")
                .set_kind(ErrorKind::MalformedFieldValue)),
        }
    }

    pub fn in_reply_to(&self) -> Option<MessageID> {
        match self.typed_value(HeaderName::IN_REPLY_TO) {
            Ok(FieldValue::MessageIdList(ids)) => ids.into_iter().next(),
            _ => None,
        }
    }

    /// The `References` field, with the message's own id and duplicate
    /// entries removed.
    pub fn references(&self) -> Option<References> {
        let raw = self.root.headers.get(HeaderName::REFERENCES)?.to_string();
        let mut refs: Vec<MessageID> = match self.typed_value(HeaderName::REFERENCES) {
            Ok(FieldValue::MessageIdList(ids)) => ids,
            _ => return None,
        };
        if let Ok(own) = self.message_id() {
            refs.retain(|r| *r != own);
        }
        let mut seen: Vec<MessageID> = Vec::with_capacity(refs.len());
        for r in refs {
            if !seen.contains(&r) {
                seen.push(r);
            }
        }
        Some(References {
            raw: raw.into_bytes(),
            refs: seen,
        })
    }

    /// The message body as a part tree. The root of the tree is the
    /// message itself.
    pub fn body(&self) -> &Attachment {
        &self.root
    }

    /// Serialize the message to octets, `CRLF` line terminators
    /// throughout.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        self.root.to_bytes()
    }

    pub fn write_to<W: io::Write>(&self, out: &mut W) -> Result<()> {
        self.root.write_to(out)
    }

    /// Append an attachment to the message.
    ///
    /// If the root is already `multipart/mixed` the attachment becomes its
    /// last child. Otherwise the current root content is pushed down into
    /// the first child of a fresh `multipart/mixed`: the content headers
    /// (`Content-Type`, `Content-Transfer-Encoding`, `Content-Disposition`)
    /// migrate onto that child, the addressing headers stay on the root.
    pub fn add_attachment(&mut self, attachment: Attachment) {
        use crate::attachment_types::MultipartType;

        if let ContentType::Multipart {
            kind: MultipartType::Mixed,
            ref mut parts,
            ..
        } = self.root.content_type
        {
            parts.push(attachment);
            return;
        }

        /* push the current content down into a fresh first child */
        let mut inner = Attachment::new(
            std::mem::take(&mut self.root.content_type),
            std::mem::replace(
                &mut self.root.content_transfer_encoding,
                ContentTransferEncoding::default(),
            ),
            Vec::new(),
        );
        inner.content_disposition =
            std::mem::take(&mut self.root.content_disposition);
        inner.raw = std::mem::take(&mut self.root.raw);
        inner.body = self.root.body;
        inner.preamble = self.root.preamble;
        inner.epilogue = self.root.epilogue;
        for name in [
            HeaderName::CONTENT_TYPE,
            HeaderName::CONTENT_TRANSFER_ENCODING,
            HeaderName::CONTENT_DISPOSITION,
        ] {
            if let Some(value) = self.root.headers.remove(name.clone()) {
                inner.headers.insert(name, value);
            }
        }

        let parts = vec![inner, attachment];
        let boundary = ContentType::make_boundary(&parts).into_bytes();
        self.root.headers.insert(
            HeaderName::CONTENT_TYPE,
            format!(
                "multipart/mixed; boundary=\"{}\"",
                String::from_utf8_lossy(&boundary)
            ),
        );
        self.root.content_type = ContentType::Multipart {
            boundary,
            kind: MultipartType::Mixed,
            parameters: Vec::new(),
            parts,
        };
        self.root.raw = Vec::new();
        self.root.body = crate::address::StrBuilder::default();
        self.root.preamble = crate::address::StrBuilder::default();
        self.root.epilogue = crate::address::StrBuilder::default();
        self.root.content_transfer_encoding = ContentTransferEncoding::_7Bit;
        self.root.content_disposition = ContentDisposition::default();
    }
}

impl std::str::FromStr for Message {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_bytes(s.as_bytes())
    }
}
