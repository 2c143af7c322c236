/*
 * mimelib - flatten module
 *
 * Copyright 2019 Manos Pitsidianakis
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

//! Flattening of a part tree into text parts and attachments.
//!
//! Any legal MIME structure reduces to two lists: the *text parts* the
//! message displays as (plain text, or HTML with its plain alternative and
//! embedded objects), and the *attachments*. `multipart/alternative`
//! resolves to its best text representation, `multipart/related` to its
//! root with the remaining children as embedded objects, `multipart/mixed`
//! children are classified individually.

use crate::{
    attachment_types::{Charset, ContentType, MultipartType, Text},
    attachments::{decode, Attachment},
    message::Message,
};

/// A child of a `multipart/related` body, keyed by `Content-ID` or
/// `Content-Location`.
#[derive(Clone, Debug)]
pub struct EmbeddedObject {
    pub content_id: Option<String>,
    pub content_location: Option<String>,
    pub inner: Attachment,
}

impl EmbeddedObject {
    fn new(inner: &Attachment) -> Self {
        Self {
            content_id: inner.content_id(),
            content_location: inner.content_location().map(str::to_string),
            inner: inner.clone(),
        }
    }
}

/// A displayable text representation found in the tree.
#[derive(Clone, Debug)]
pub enum TextPart {
    Plain {
        charset: Charset,
        content: String,
    },
    Html {
        content: String,
        /// The `text/plain` alternative, when the HTML came out of a
        /// `multipart/alternative`.
        plain: Option<String>,
        objects: Vec<EmbeddedObject>,
    },
}

impl TextPart {
    pub fn is_html(&self) -> bool {
        matches!(self, Self::Html { .. })
    }

    /// The displayable content, HTML markup included.
    pub fn content(&self) -> &str {
        match self {
            Self::Plain { content, .. } | Self::Html { content, .. } => content,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct Flattened {
    pub text_parts: Vec<TextPart>,
    pub attachments: Vec<Attachment>,
}

/// Flatten a message into its text parts and attachments.
pub fn flatten(message: &Message) -> Flattened {
    flatten_attachment(&message.root)
}

/// Flatten a part tree into its text parts and attachments.
pub fn flatten_attachment(root: &Attachment) -> Flattened {
    let mut out = Flattened::default();
    /* inline non-text leaves: embedded objects if some HTML part
     * references them, attachments otherwise */
    let mut loose: Vec<Attachment> = Vec::new();
    walk(root, &mut out, &mut loose);

    for att in loose {
        let object = EmbeddedObject::new(&att);
        let referenced = |content: &str| {
            object
                .content_id
                .as_ref()
                .map(|id| content.contains(&format!("cid:{}", id)))
                .unwrap_or(false)
                || object
                    .content_location
                    .as_ref()
                    .map(|loc| content.contains(loc.as_str()))
                    .unwrap_or(false)
        };
        let mut placed = false;
        for part in out.text_parts.iter_mut() {
            if let TextPart::Html {
                content, objects, ..
            } = part
            {
                if referenced(content) {
                    objects.push(object.clone());
                    placed = true;
                    break;
                }
            }
        }
        if !placed {
            out.attachments.push(att);
        }
    }
    out
}

fn text_content(att: &Attachment) -> String {
    String::from_utf8_lossy(&decode(att, None)).to_string()
}

/// The primary child of a `multipart/related`: the part the `start`
/// parameter's `Content-ID` names, or the first child.
fn related_root_index(content_type: &ContentType, parts: &[Attachment]) -> usize {
    let start = content_type
        .parameters()
        .iter()
        .find(|(n, _)| n.eq_ignore_ascii_case(b"start"))
        .map(|(_, v)| {
            let v = String::from_utf8_lossy(v);
            let v = v.trim();
            v.strip_prefix('<')
                .and_then(|v| v.strip_suffix('>'))
                .unwrap_or(v)
                .to_string()
        });
    if let Some(start) = start {
        for (i, p) in parts.iter().enumerate() {
            if p.content_id().as_deref() == Some(start.as_str()) {
                return i;
            }
        }
    }
    0
}

fn flatten_related(
    content_type: &ContentType,
    parts: &[Attachment],
    out: &mut Flattened,
    loose: &mut Vec<Attachment>,
) {
    if parts.is_empty() {
        return;
    }
    let root_idx = related_root_index(content_type, parts);
    let objects: Vec<EmbeddedObject> = parts
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != root_idx)
        .map(|(_, p)| EmbeddedObject::new(p))
        .collect();
    let root = &parts[root_idx];
    match &root.content_type {
        ContentType::Text {
            kind: Text::Html, ..
        } => {
            out.text_parts.push(TextPart::Html {
                content: text_content(root),
                plain: None,
                objects,
            });
        }
        ContentType::Multipart {
            kind: MultipartType::Alternative,
            parts: alt_parts,
            ..
        } => {
            flatten_alternative(alt_parts, Some(objects), out, loose);
        }
        _ => {
            /* a related body whose root is not displayable: classify
             * everything individually */
            for p in parts {
                walk(p, out, loose);
            }
        }
    }
}

fn flatten_alternative(
    parts: &[Attachment],
    related_objects: Option<Vec<EmbeddedObject>>,
    out: &mut Flattened,
    loose: &mut Vec<Attachment>,
) {
    /* HTML is preferred over plain; the plain sibling becomes the HTML
     * part's alternative, other alternatives become attachments */
    let html_idx = parts.iter().rposition(Attachment::is_html);
    let plain_idx = parts
        .iter()
        .rposition(|p| p.content_type.is_text_plain());
    match (html_idx, plain_idx) {
        (Some(h), plain_idx) => {
            let plain = plain_idx.map(|i| text_content(&parts[i]));
            match &parts[h].content_type {
                ContentType::Multipart {
                    kind: MultipartType::Related,
                    parts: rel_parts,
                    ..
                } => {
                    let before = out.text_parts.len();
                    flatten_related(&parts[h].content_type, rel_parts, out, loose);
                    /* attach the plain alternative to the html part the
                     * related body produced */
                    if let Some(TextPart::Html {
                        plain: ref mut p, ..
                    }) = out.text_parts.get_mut(before)
                    {
                        *p = plain;
                    }
                }
                _ => {
                    out.text_parts.push(TextPart::Html {
                        content: text_content(&parts[h]),
                        plain,
                        objects: related_objects.unwrap_or_default(),
                    });
                }
            }
            for (i, p) in parts.iter().enumerate() {
                if Some(i) != html_idx && Some(i) != plain_idx {
                    out.attachments.push(p.clone());
                }
            }
        }
        (None, Some(i)) => {
            let charset = match parts[i].content_type {
                ContentType::Text { charset, .. } => charset,
                _ => Charset::default(),
            };
            out.text_parts.push(TextPart::Plain {
                charset,
                content: text_content(&parts[i]),
            });
            for (j, p) in parts.iter().enumerate() {
                if j != i {
                    out.attachments.push(p.clone());
                }
            }
        }
        (None, None) => {
            for p in parts {
                walk(p, out, loose);
            }
        }
    }
}

fn walk(att: &Attachment, out: &mut Flattened, loose: &mut Vec<Attachment>) {
    match &att.content_type {
        ContentType::Multipart {
            kind: MultipartType::Alternative,
            parts,
            ..
        } => flatten_alternative(parts, None, out, loose),
        ContentType::Multipart {
            kind: MultipartType::Related,
            parts,
            ..
        } => flatten_related(&att.content_type, parts, out, loose),
        ContentType::Multipart { parts, .. } => {
            for p in parts {
                walk(p, out, loose);
            }
        }
        ContentType::MessageRfc822 => {
            out.attachments.push(att.clone());
        }
        ContentType::Text { kind, charset, .. } => {
            if att.content_disposition.kind.is_attachment() {
                out.attachments.push(att.clone());
            } else if matches!(kind, Text::Html) {
                out.text_parts.push(TextPart::Html {
                    content: text_content(att),
                    plain: None,
                    objects: Vec::new(),
                });
            } else {
                out.text_parts.push(TextPart::Plain {
                    charset: *charset,
                    content: text_content(att),
                });
            }
        }
        _ => {
            if att.content_disposition.kind.is_attachment() {
                out.attachments.push(att.clone());
            } else {
                loose.push(att.clone());
            }
        }
    }
}
