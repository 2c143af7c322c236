/*
 * mimelib - lib.rs
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

//! Parsing, decoding, generation and composition of Internet Messages
//! ([RFC5322](https://datatracker.ietf.org/doc/html/rfc5322)) with MIME
//! ([RFC2045](https://datatracker.ietf.org/doc/html/rfc2045) through
//! `RFC2049`, [RFC2047](https://datatracker.ietf.org/doc/html/rfc2047)
//! encoded words, [RFC2231](https://datatracker.ietf.org/doc/html/rfc2231)
//! parameter values).
//!
//! # Parsing bytes into a [`Message`]
//!
//! A [`Message`] is the root [`Attachment`] of a parsed e-mail: an ordered
//! header map plus a body which is either a leaf, a recursive multipart
//! container or an encapsulated message.
//!
//! ```
//! use mimelib::Message;
//!
//! let raw_mail = "From: \"some name\" <some@example.com>\r\n\
//! To: \"me\" <myself@example.com>\r\n\
//! Cc:\r\n\
//! Subject: =?utf-8?Q?gratuitously_encoded_subject?=\r\n\
//! Message-ID: <h2g7f.z0gy2pgaen5m@example.com>\r\n\
//! MIME-Version: 1.0\r\n\
//! Content-Type: multipart/mixed; charset=\"utf-8\"; boundary=\"bzz_bzz__bzz__\"\r\n\
//! \r\n\
//! This is a MIME formatted message with attachments. Use a MIME-compliant client to view it properly.\r\n\
//! --bzz_bzz__bzz__\r\n\
//! \r\n\
//! hello world.\r\n\
//! --bzz_bzz__bzz__\r\n\
//! Content-Type: application/pdf; name=\"test.pdf\"\r\n\
//! Content-Disposition: attachment\r\n\
//! Content-Transfer-Encoding: base64\r\n\
//! \r\n\
//! JVBERi0xLjQKJcOkw7zDtsOfCg==\r\n\
//! --bzz_bzz__bzz__--\r\n";
//!
//! let message = Message::from_bytes(raw_mail.as_bytes()).expect("Could not parse mail");
//! assert_eq!(
//!     message.subject().unwrap().as_str(),
//!     "gratuitously encoded subject"
//! );
//! assert_eq!(
//!     message.message_id().unwrap().to_string().as_str(),
//!     "<h2g7f.z0gy2pgaen5m@example.com>"
//! );
//! assert_eq!(message.root.text().as_str(), "hello world.");
//! ```
//!
//! # Composing mail with [`Draft`](compose::Draft)
//!
//! ```
//! use mimelib::compose::Draft;
//! use mimelib::HeaderName;
//!
//! let mut draft = Draft::default();
//! draft.set_header(HeaderName::FROM, "me@example.com".into());
//! draft.set_header(HeaderName::TO, "you@example.com".into());
//! draft.set_header(HeaderName::SUBJECT, "Message subject".into());
//! draft.set_body("This is the text of your message...".to_string());
//! let finalised = draft.finalise().unwrap();
//! assert!(finalised.contains("Message subject"));
//! ```

#[macro_use]
pub mod dbg {
    #[allow(clippy::redundant_closure)]
    #[macro_export]
    macro_rules! debug {
        ($val:literal) => {
            {
                if cfg!(feature="debug-tracing") {
                    $crate::log::debug!($val);
                }
                $val
            }
        };
        ($val:expr) => {
            if cfg!(feature="debug-tracing") {
                let stringify = stringify!($val);
                // Use of `match` here is intentional because it affects the lifetimes
                // of temporaries - https://stackoverflow.com/a/48732525/1063961
                match $val {
                    tmp => {
                        $crate::log::debug!("{} = {:?}", stringify, tmp);
                        tmp
                    }
                }
            } else {
                $val
            }
        };
        ($fmt:literal, $($arg:tt)*) => {
            if cfg!(feature="debug-tracing") {
                $crate::log::debug!($fmt, $($arg)*);
            }
        };
    }
}

#[macro_use]
extern crate serde_derive;
pub extern crate data_encoding;
pub extern crate log;
pub extern crate nom;
#[macro_use]
extern crate bitflags;
pub extern crate indexmap;
pub extern crate smallvec;

pub mod address;
pub mod attachment_types;
pub mod attachments;
pub mod compose;
pub mod error;
pub mod flatten;
pub mod headers;
pub mod message;
pub mod parser;
#[macro_use]
pub mod utils;

pub use address::{Address, GroupAddress, MailboxAddress, MessageID, References, StrBuild, StrBuilder};
pub use attachment_types::{
    Charset, ContentDisposition, ContentDispositionKind, ContentTransferEncoding, ContentType,
    MultipartType, Text,
};
pub use attachments::{Attachment, AttachmentBuilder};
pub use compose::{attachment_from_file, Draft};
pub use error::{Error, ErrorKind, Result};
pub use flatten::{EmbeddedObject, Flattened, TextPart};
pub use headers::{HeaderMap, HeaderName, ValueKind};
pub use message::{FieldValue, Message};
pub use utils::datetime::UnixTimestamp;
