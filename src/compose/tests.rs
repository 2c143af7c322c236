//
// mimelib
//
// Copyright 2017 Emmanouil Pitsidianakis <manos@pitsidianak.is>
//
// This file is part of mimelib.
//
// mimelib is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// mimelib is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with mimelib. If not, see <http://www.gnu.org/licenses/>.
//
// SPDX-License-Identifier: EUPL-1.2 OR GPL-3.0-or-later

use std::str::FromStr;

use super::*;
use crate::{
    attachment_types::Text,
    error::ErrorKind,
    utils::datetime,
};

#[test]
fn test_compose_new_draft() {
    let mut default = Draft::default();
    assert_eq!(Draft::from_str(&default.to_edit_string()).unwrap(), default);
    default.set_body("αδφαφσαφασ".to_string());
    assert_eq!(Draft::from_str(&default.to_edit_string()).unwrap(), default);
    default.set_body("ascii only".to_string());
    assert_eq!(Draft::from_str(&default.to_edit_string()).unwrap(), default);
}

#[test]
fn test_compose_draft_from_str_errors() {
    assert_eq!(
        Draft::from_str("").unwrap_err().kind,
        ErrorKind::ValueError
    );
    let err = Draft::from_str("safd ffsadfa asfd ").unwrap_err();
    assert_eq!(err.kind, ErrorKind::ValueError);
    assert_eq!(
        err.summary.as_deref(),
        Some("Could not parse e-mail into a Draft")
    );
}

#[test]
fn test_compose_mime_encode_header() {
    let words = "compilers/2020a σε Rust";
    assert_eq!(
        words,
        std::str::from_utf8(
            &crate::parser::encodings::phrase(mime::encode_header(words).as_bytes(), false)
                .unwrap()
                .1
        )
        .unwrap(),
    );
    let words = "[internal] Νέος Οδηγός Συγγραφής";
    assert_eq!(
        words,
        std::str::from_utf8(
            &crate::parser::encodings::phrase(mime::encode_header(words).as_bytes(), false)
                .unwrap()
                .1
        )
        .unwrap(),
    );
    let words = "Πρόσθετη εξεταστική";
    assert!(mime::encode_header(words).starts_with("=?UTF-8?B?"));
    assert_eq!(
        words,
        std::str::from_utf8(
            &crate::parser::encodings::phrase(mime::encode_header(words).as_bytes(), false)
                .unwrap()
                .1
        )
        .unwrap(),
    );
    /* mostly-ascii words use Q */
    assert_eq!(mime::encode_header("naïve"), "=?UTF-8?Q?na=C3=AFve?=");
    /* plain ascii passes through untouched */
    assert_eq!(mime::encode_header("hello there"), "hello there");
}

#[test]
fn test_compose_mime_transfer_encoding_choice() {
    assert_eq!(
        mime::transfer_encoding_for(b"plain ascii\r\nshort lines\r\n", true),
        ContentTransferEncoding::_7Bit
    );
    assert_eq!(
        mime::transfer_encoding_for("κείμενο".as_bytes(), true),
        ContentTransferEncoding::QuotedPrintable
    );
    assert_eq!(
        mime::transfer_encoding_for(&[0xff, 0xd8, 0xff, 0xe0], false),
        ContentTransferEncoding::Base64
    );
    let long_line = vec![b'a'; 1200];
    assert_ne!(
        mime::transfer_encoding_for(&long_line, true),
        ContentTransferEncoding::_7Bit
    );
}

#[test]
fn test_compose_mime_quoted_printable_encode() {
    let text = "Années de pèlerinage\r\n";
    let encoded = mime::quoted_printable_encode(text.as_bytes());
    let (_, decoded) = crate::parser::encodings::quoted_printable_bytes(&encoded).unwrap();
    assert_eq!(decoded, text.as_bytes());
    /* long lines get soft breaks */
    let long = "x".repeat(300);
    let encoded = mime::quoted_printable_encode(long.as_bytes());
    for line in encoded.split(|&b| b == b'\n') {
        assert!(line.len() <= 77);
    }
    let (_, decoded) = crate::parser::encodings::quoted_printable_bytes(&encoded).unwrap();
    assert_eq!(decoded, long.as_bytes());
}

#[test]
fn test_compose_simple_plain_message() {
    let mut draft = Draft::default();
    draft.set_header(HeaderName::FROM, "me@example.org".into());
    draft.set_header(HeaderName::TO, "you@example.org".into());
    draft.set_header(HeaderName::SUBJECT, "Message subject".into());
    draft.set_body("This is the text of your message...".to_string());
    let finalised = draft.finalise().unwrap();

    let message = Message::from_bytes(finalised.as_bytes()).unwrap();
    assert_eq!(message.subject().unwrap(), "Message subject");
    assert_eq!(
        message.from_addresses().unwrap()[0].get_email(),
        "me@example.org"
    );
    assert_eq!(
        message.to_addresses().unwrap()[0].get_email(),
        "you@example.org"
    );
    assert_eq!(message.root.body(), b"This is the text of your message...");
    assert_eq!(message.headers().get(HeaderName::MIME_VERSION), Some("1.0"));
    /* a Message-ID was generated from the From domain */
    assert!(message
        .message_id()
        .unwrap()
        .to_string()
        .ends_with("@example.org>"));
    /* Date is stamped at draft creation */
    let age = datetime::now().saturating_sub(message.date().unwrap());
    assert!(age <= 1, "Date should be within 1s of the test run");

    /* generated output is stable through a parse/generate cycle */
    assert_eq!(
        finalised.as_bytes(),
        Message::from_bytes(finalised.as_bytes())
            .unwrap()
            .to_bytes()
            .unwrap()
            .as_slice()
    );
}

#[test]
fn test_compose_html_with_embedded_image() {
    let mut draft = Draft::default();
    draft.set_header(HeaderName::FROM, "me@example.org".into());
    draft.set_header(HeaderName::TO, "you@example.org".into());
    draft.set_header(HeaderName::SUBJECT, "pictures".into());
    draft.set_body("plain fallback".to_string());
    draft.set_html_body("<html><body><img src=\"cid:photo@local\"></body></html>".to_string());
    let mut image = AttachmentBuilder::default();
    image.set_content_type(ContentType::Other {
        tag: b"image/jpeg".to_vec(),
        name: Some("photo.jpg".to_string()),
        parameters: vec![(b"name".to_vec(), b"photo.jpg".to_vec())],
    });
    image.set_content_transfer_encoding(ContentTransferEncoding::Base64);
    image.set_header(HeaderName::CONTENT_ID, "<photo@local>".into());
    image.set_raw(vec![0xff, 0xd8, 0xff, 0xe0, 0x00, 0x10]);
    draft.embedded_mut().push(image);

    let finalised = draft.finalise().unwrap();
    let message = Message::from_bytes(finalised.as_bytes()).unwrap();

    /* structure: multipart/alternative { text/plain,
     * multipart/related { text/html, image/jpeg } } */
    let ContentType::Multipart {
        kind: MultipartType::Alternative,
        ref parts,
        ..
    } = message.root.content_type
    else {
        panic!(
            "expected multipart/alternative root, got {}",
            message.root.mime_type()
        );
    };
    assert_eq!(parts.len(), 2);
    assert!(parts[0].content_type.is_text_plain());
    let ContentType::Multipart {
        kind: MultipartType::Related,
        parts: ref related,
        ..
    } = parts[1].content_type
    else {
        panic!("expected multipart/related, got {}", parts[1].mime_type());
    };
    assert_eq!(related.len(), 2);
    assert!(related[0].content_type.is_text_html());
    assert_eq!(related[1].mime_type(), "image/jpeg");
    /* the HTML references the image part's Content-ID minus the angle
     * brackets */
    let cid = related[1].content_id().unwrap();
    assert!(String::from_utf8_lossy(&crate::attachments::decode(&related[0], None))
        .contains(&format!("cid:{}", cid)));
    assert_eq!(
        related[1].decoded_bytes().unwrap(),
        vec![0xff, 0xd8, 0xff, 0xe0, 0x00, 0x10]
    );

    /* and the flattening overlay agrees */
    let flat = crate::flatten::flatten(&message);
    assert_eq!(flat.text_parts.len(), 1);
    match &flat.text_parts[0] {
        crate::flatten::TextPart::Html { plain, objects, .. } => {
            assert_eq!(plain.as_deref(), Some("plain fallback"));
            assert_eq!(objects.len(), 1);
        }
        other => panic!("expected html text part, got {:?}", other),
    }
    assert!(flat.attachments.is_empty());
}

#[test]
fn test_compose_with_attachment_wraps_in_mixed() {
    let mut draft = Draft::default();
    draft.set_header(HeaderName::FROM, "me@example.org".into());
    draft.set_header(HeaderName::SUBJECT, "report attached".into());
    draft.set_body("see attachment".to_string());
    let mut pdf = AttachmentBuilder::default();
    pdf.set_content_type(ContentType::Other {
        tag: b"application/pdf".to_vec(),
        name: Some("report.pdf".to_string()),
        parameters: vec![(b"name".to_vec(), b"report.pdf".to_vec())],
    });
    pdf.set_content_transfer_encoding(ContentTransferEncoding::Base64);
    pdf.set_content_disposition(ContentDisposition {
        kind: ContentDispositionKind::Attachment,
        filename: Some("report.pdf".to_string()),
        ..ContentDisposition::default()
    });
    pdf.set_raw(b"%PDF-1.4\nfake".to_vec());
    draft.attachments_mut().push(pdf);

    let finalised = draft.finalise().unwrap();
    let message = Message::from_bytes(finalised.as_bytes()).unwrap();
    let ContentType::Multipart {
        kind: MultipartType::Mixed,
        ref parts,
        ..
    } = message.root.content_type
    else {
        panic!("expected multipart/mixed root");
    };
    assert_eq!(parts.len(), 2);
    assert!(parts[0].content_type.is_text_plain());
    assert_eq!(parts[0].body(), b"see attachment");
    assert_eq!(parts[1].decoded_bytes().unwrap(), b"%PDF-1.4\nfake");
    assert_eq!(
        parts[1].content_disposition.filename.as_deref(),
        Some("report.pdf")
    );
}

#[test]
fn test_compose_unresolved_cid_is_invariant_error() {
    let mut draft = Draft::default();
    draft.set_header(HeaderName::FROM, "me@example.org".into());
    draft.set_html_body("<img src=\"cid:nothere@local\">".to_string());
    let err = draft.finalise().unwrap_err();
    assert_eq!(err.kind, ErrorKind::BuilderInvariant);
}

#[test]
fn test_compose_embedded_without_html_is_invariant_error() {
    let mut draft = Draft::default();
    draft.set_header(HeaderName::FROM, "me@example.org".into());
    draft.set_body("plain only".to_string());
    let mut image = AttachmentBuilder::default();
    image.set_content_type(ContentType::Other {
        tag: b"image/png".to_vec(),
        name: Some("pixel.png".to_string()),
        parameters: vec![(b"name".to_vec(), b"pixel.png".to_vec())],
    });
    image.set_content_transfer_encoding(ContentTransferEncoding::Base64);
    image.set_header(HeaderName::CONTENT_ID, "<pixel@local>".into());
    image.set_raw(vec![0x89, 0x50, 0x4e, 0x47]);
    draft.embedded_mut().push(image);
    let err = draft.finalise().unwrap_err();
    assert_eq!(err.kind, ErrorKind::BuilderInvariant);
}

#[test]
fn test_compose_non_ascii_body_gets_encoded() {
    let mut draft = Draft::default();
    draft.set_header(HeaderName::FROM, "me@example.org".into());
    draft.set_header(HeaderName::SUBJECT, "γειά σου".into());
    draft.set_body("κείμενο στο σώμα\n".to_string());
    let finalised = draft.finalise().unwrap();
    assert!(finalised.is_ascii(), "finalised output must be 7bit clean");
    let message = Message::from_bytes(finalised.as_bytes()).unwrap();
    assert_eq!(message.subject().unwrap(), "γειά σου");
    assert_eq!(message.root.text(), "κείμενο στο σώμα\r\n");
    match message.root.content_type {
        ContentType::Text {
            kind: Text::Plain,
            charset,
            ..
        } => assert_eq!(charset, Charset::UTF8),
        ref other => panic!("expected text/plain, got {:?}", other),
    }
}

#[test]
fn test_compose_new_reply() {
    let raw = "From: sender@example.org\r\n\
To: me@example.org\r\n\
Subject: a question\r\n\
Message-ID: <q1@example.org>\r\n\
\r\n\
What's the answer?\r\nAsking for a friend.";
    let message = Message::from_bytes(raw.as_bytes()).unwrap();
    let reply = Draft::new_reply(&message);
    assert_eq!(reply.headers[HeaderName::TO], *"sender@example.org");
    assert_eq!(reply.headers[HeaderName::SUBJECT], *"Re: a question");
    assert_eq!(reply.headers[HeaderName::IN_REPLY_TO], *"<q1@example.org>");
    assert_eq!(reply.headers[HeaderName::REFERENCES], *"<q1@example.org>");
    assert_eq!(reply.body, "> What's the answer?\n> Asking for a friend.");
}
