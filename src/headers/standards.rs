/*
 * mimelib - headers
 *
 * Copyright 2020 Manos Pitsidianakis
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

//! Standard header names and the typed-value registry.
//!
//! Every standard header is statically encoded here along with the
//! [`ValueKind`] its values parse into. The table is constructed at compile
//! time and never mutated; names not in it degrade to [`ValueKind::Raw`]
//! handling.

use super::names::*;

bitflags! {
    /// A protocol associated with a standard e-mail header.
    #[derive(Default, Serialize, Deserialize)]
    pub struct Protocol: u32 {
        const None    =  0b00000001;
        const Mail    =  Self::None.bits() << 1;
        const NNTP    =  Self::Mail.bits() << 1;
        const MIME    =  Self::NNTP.bits() << 1;
    }
}

/// The typed representation a field value parses into.
///
/// This is the registry selector of the parsing layer: each standard header
/// name maps to exactly one kind, lookups are case-insensitive, and the
/// mapping is fixed for the lifetime of the process.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum ValueKind {
    /// A single mailbox (`Sender`).
    Mailbox,
    /// A list of mailboxes and groups (`To`, `Cc`, ...).
    AddressList,
    /// An RFC5322 `date-time` (`Date`).
    DateTime,
    /// Unstructured, possibly encoded-word text (`Subject`).
    Text,
    /// `type/subtype` plus parameters (`Content-Type`).
    MediaType,
    /// A content transfer encoding token.
    Encoding,
    /// A content disposition with parameters.
    Disposition,
    /// A single `msg-id` (`Message-ID`, `Content-ID`).
    MessageId,
    /// A sequence of `msg-id`s (`References`).
    MessageIdList,
    /// Uninterpreted octets.
    #[default]
    Raw,
}

macro_rules! standard_headers {
    (
        $(
            $(#[$docs:meta])*
            ($konst:ident, $upcase:ident, $name:literal, $(Protocol::$var:tt)|+, ValueKind::$kind:tt);
        )+
    ) => {
        /// An enumerator type over statically encoded header names.
        ///
        /// Each variant value corresponds to an associated constant exposing
        /// it as a [`HeaderName`] under both [`StandardHeader`] and
        /// [`HeaderName`] types.
        #[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
        pub enum StandardHeader {
            $(
                $konst,
            )+
        }

        $(
            $(#[$docs])*
            pub const $upcase: HeaderName = HeaderName {
                inner: Repr::Standard(StandardHeader::$konst),
            };
        )+

        impl HeaderName {
            $(
                pub const $upcase: Self = $upcase;
            )+
        }

        impl StandardHeader {
            #[inline]
            pub const fn as_str(&self) -> &'static str {
                match *self {
                    $(
                        Self::$konst => $name,
                    )+
                }
            }

            #[inline]
            pub const fn protocol(&self) -> Protocol {
                match *self {
                    $(
                        Self::$konst => Protocol::from_bits_truncate($(Protocol::$var.bits())|+),
                    )+
                }
            }

            /// The typed value this header's values parse into.
            #[inline]
            pub const fn value_kind(&self) -> ValueKind {
                match *self {
                    $(
                        Self::$konst => ValueKind::$kind,
                    )+
                }
            }

            // invalid clippy lint match here
            #[allow(clippy::string_lit_as_bytes)]
            pub fn from_bytes(name_bytes: &[u8]) -> Option<Self> {
                match name_bytes {
                    $(
                        _ if name_bytes.eq_ignore_ascii_case($name.as_bytes()) => Some(Self::$konst),
                    )+
                    _ => None,
                }
            }
        }

        #[cfg(test)]
        pub(super) const TEST_HEADERS: &[(StandardHeader, &str)] = &[
            $(
                (StandardHeader::$konst, $name),
            )+
        ];
    }
}

standard_headers! {
    /// [RFC5322, Section 3.6.5.](https://datatracker.ietf.org/doc/html/rfc5322#section-3.6.5)
    (Subject, SUBJECT, "Subject", Protocol::Mail | Protocol::NNTP, ValueKind::Text);
    /// [RFC5322, Section 3.6.1.](https://datatracker.ietf.org/doc/html/rfc5322#section-3.6.1)
    (Date, DATE, "Date", Protocol::Mail | Protocol::NNTP, ValueKind::DateTime);
    /// [RFC5322, Section 3.6.2.](https://datatracker.ietf.org/doc/html/rfc5322#section-3.6.2)
    (From, FROM, "From", Protocol::Mail | Protocol::NNTP, ValueKind::AddressList);
    /// [RFC5322, Section 3.6.2.](https://datatracker.ietf.org/doc/html/rfc5322#section-3.6.2)
    (Sender, SENDER, "Sender", Protocol::Mail, ValueKind::Mailbox);
    /// [RFC5322, Section 3.6.2.](https://datatracker.ietf.org/doc/html/rfc5322#section-3.6.2)
    (ReplyTo, REPLY_TO, "Reply-To", Protocol::Mail, ValueKind::AddressList);
    /// [RFC5322, Section 3.6.3.](https://datatracker.ietf.org/doc/html/rfc5322#section-3.6.3)
    (To, TO, "To", Protocol::Mail, ValueKind::AddressList);
    /// [RFC5322, Section 3.6.3.](https://datatracker.ietf.org/doc/html/rfc5322#section-3.6.3)
    (Cc, CC, "Cc", Protocol::Mail, ValueKind::AddressList);
    /// [RFC5322, Section 3.6.3.](https://datatracker.ietf.org/doc/html/rfc5322#section-3.6.3)
    (Bcc, BCC, "Bcc", Protocol::Mail, ValueKind::AddressList);
    /// [RFC5322, Section 3.6.5.](https://datatracker.ietf.org/doc/html/rfc5322#section-3.6.5)
    (Comments, COMMENTS, "Comments", Protocol::Mail, ValueKind::Text);
    /// [RFC5322, Section 3.6.5.](https://datatracker.ietf.org/doc/html/rfc5322#section-3.6.5)
    (Keywords, KEYWORDS, "Keywords", Protocol::Mail, ValueKind::Text);
    /// [RFC5322, Section 3.6.4.](https://datatracker.ietf.org/doc/html/rfc5322#section-3.6.4)
    (MessageId, MESSAGE_ID, "Message-ID", Protocol::Mail | Protocol::NNTP, ValueKind::MessageId);
    /// [RFC5322, Section 3.6.4.](https://datatracker.ietf.org/doc/html/rfc5322#section-3.6.4)
    (InReplyTo, IN_REPLY_TO, "In-Reply-To", Protocol::Mail, ValueKind::MessageIdList);
    /// [RFC5322, Section 3.6.4.](https://datatracker.ietf.org/doc/html/rfc5322#section-3.6.4)
    (References, REFERENCES, "References", Protocol::Mail | Protocol::NNTP, ValueKind::MessageIdList);
    /// [RFC5322, Section 3.6.7.](https://datatracker.ietf.org/doc/html/rfc5322#section-3.6.7)
    (Received, RECEIVED, "Received", Protocol::Mail, ValueKind::Raw);
    /// [RFC5322, Section 3.6.7.](https://datatracker.ietf.org/doc/html/rfc5322#section-3.6.7)
    (ReturnPath, RETURN_PATH, "Return-Path", Protocol::Mail, ValueKind::Raw);
    /// [RFC2045, Section 4.](https://datatracker.ietf.org/doc/html/rfc2045#section-4)
    (MimeVersion, MIME_VERSION, "MIME-Version", Protocol::MIME, ValueKind::Text);
    /// [RFC2045, Section 5.](https://datatracker.ietf.org/doc/html/rfc2045#section-5)
    (ContentType, CONTENT_TYPE, "Content-Type", Protocol::MIME, ValueKind::MediaType);
    /// [RFC2045, Section 6.](https://datatracker.ietf.org/doc/html/rfc2045#section-6)
    (ContentTransferEncoding, CONTENT_TRANSFER_ENCODING, "Content-Transfer-Encoding", Protocol::MIME, ValueKind::Encoding);
    /// [RFC2183, Section 2.](https://datatracker.ietf.org/doc/html/rfc2183#section-2)
    (ContentDisposition, CONTENT_DISPOSITION, "Content-Disposition", Protocol::MIME, ValueKind::Disposition);
    /// [RFC2045, Section 7.](https://datatracker.ietf.org/doc/html/rfc2045#section-7)
    (ContentId, CONTENT_ID, "Content-ID", Protocol::MIME, ValueKind::MessageId);
    /// [RFC2557, Section 4.1.](https://datatracker.ietf.org/doc/html/rfc2557#section-4.1)
    (ContentLocation, CONTENT_LOCATION, "Content-Location", Protocol::MIME, ValueKind::Text);
    /// [RFC2045, Section 8.](https://datatracker.ietf.org/doc/html/rfc2045#section-8)
    (ContentDescription, CONTENT_DESCRIPTION, "Content-Description", Protocol::MIME, ValueKind::Text);
    /// [RFC5322, Section 3.6.6.](https://datatracker.ietf.org/doc/html/rfc5322#section-3.6.6)
    (ResentDate, RESENT_DATE, "Resent-Date", Protocol::Mail, ValueKind::DateTime);
    /// [RFC5322, Section 3.6.6.](https://datatracker.ietf.org/doc/html/rfc5322#section-3.6.6)
    (ResentFrom, RESENT_FROM, "Resent-From", Protocol::Mail, ValueKind::AddressList);
    /// [RFC5322, Section 3.6.6.](https://datatracker.ietf.org/doc/html/rfc5322#section-3.6.6)
    (ResentSender, RESENT_SENDER, "Resent-Sender", Protocol::Mail, ValueKind::Mailbox);
    /// [RFC5322, Section 3.6.6.](https://datatracker.ietf.org/doc/html/rfc5322#section-3.6.6)
    (ResentTo, RESENT_TO, "Resent-To", Protocol::Mail, ValueKind::AddressList);
    /// [RFC5322, Section 3.6.6.](https://datatracker.ietf.org/doc/html/rfc5322#section-3.6.6)
    (ResentCc, RESENT_CC, "Resent-Cc", Protocol::Mail, ValueKind::AddressList);
    /// [RFC5322, Section 3.6.6.](https://datatracker.ietf.org/doc/html/rfc5322#section-3.6.6)
    (ResentBcc, RESENT_BCC, "Resent-Bcc", Protocol::Mail, ValueKind::AddressList);
    /// [RFC5322, Section 3.6.6.](https://datatracker.ietf.org/doc/html/rfc5322#section-3.6.6)
    (ResentMessageId, RESENT_MESSAGE_ID, "Resent-Message-ID", Protocol::Mail, ValueKind::MessageId);
    /// [RFC2369, Section 3.](https://datatracker.ietf.org/doc/html/rfc2369#section-3)
    (ListArchive, LIST_ARCHIVE, "List-Archive", Protocol::Mail, ValueKind::Raw);
    /// [RFC2369, Section 3.](https://datatracker.ietf.org/doc/html/rfc2369#section-3)
    (ListHelp, LIST_HELP, "List-Help", Protocol::Mail, ValueKind::Raw);
    /// [RFC2919, Section 3.](https://datatracker.ietf.org/doc/html/rfc2919#section-3)
    (ListId, LIST_ID, "List-ID", Protocol::Mail, ValueKind::Text);
    /// [RFC2369, Section 3.](https://datatracker.ietf.org/doc/html/rfc2369#section-3)
    (ListOwner, LIST_OWNER, "List-Owner", Protocol::Mail, ValueKind::Raw);
    /// [RFC2369, Section 3.](https://datatracker.ietf.org/doc/html/rfc2369#section-3)
    (ListPost, LIST_POST, "List-Post", Protocol::Mail, ValueKind::Raw);
    /// [RFC2369, Section 3.](https://datatracker.ietf.org/doc/html/rfc2369#section-3)
    (ListSubscribe, LIST_SUBSCRIBE, "List-Subscribe", Protocol::Mail, ValueKind::Raw);
    /// [RFC2369, Section 3.](https://datatracker.ietf.org/doc/html/rfc2369#section-3)
    (ListUnsubscribe, LIST_UNSUBSCRIBE, "List-Unsubscribe", Protocol::Mail, ValueKind::Raw);
    /// De facto mail user agent identification.
    (UserAgent, USER_AGENT, "User-Agent", Protocol::Mail | Protocol::NNTP, ValueKind::Text);
    /// De facto mail user agent identification.
    (XMailer, X_MAILER, "X-Mailer", Protocol::Mail, ValueKind::Text);
    /// De facto organization identification.
    (Organization, ORGANIZATION, "Organization", Protocol::Mail | Protocol::NNTP, ValueKind::Text);
}
