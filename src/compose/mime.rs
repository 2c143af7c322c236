/*
 * mimelib - compose module
 *
 * Copyright 2017-2020 Manos Pitsidianakis
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

//! Octet-level generation helpers: encoded words, header folding, quoted
//! printable encoding and transfer encoding selection.

use std::io;

use data_encoding::BASE64_MIME;

use crate::attachment_types::ContentTransferEncoding;

/// The soft line length limit of generated header lines.
pub const SOFT_LINE_LIMIT: usize = 78;
/// Octets of raw input encoded into a single encoded word token.
const ENCODED_WORD_CHUNK: usize = 45;

#[inline]
fn q_safe(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'!' | b'*' | b'+' | b'-' | b'/')
}

fn push_q(ret: &mut String, bytes: &[u8]) {
    for &b in bytes {
        if b == b' ' {
            ret.push('_');
        } else if q_safe(b) {
            ret.push(char::from(b));
        } else {
            ret.push_str(&format!("={:02X}", b));
        }
    }
}

/// Append one `=?UTF-8?..?=` token for `chunk`, choosing `B` iff more than
/// a third of the bytes would need quoting under `Q`.
fn push_encoded_word(ret: &mut String, chunk: &str) {
    let bytes = chunk.as_bytes();
    let quoted = bytes.iter().filter(|b| !q_safe(**b) && **b != b' ').count();
    if quoted * 3 > bytes.len() {
        ret.push_str("=?UTF-8?B?");
        ret.push_str(BASE64_MIME.encode(bytes).trim());
        ret.push_str("?=");
    } else {
        ret.push_str("=?UTF-8?Q?");
        push_q(ret, bytes);
        ret.push_str("?=");
    }
}

fn encode_window(ret: &mut String, window: &str) {
    let mut rest = window;
    let mut first = true;
    while !rest.is_empty() {
        let mut split = rest.len().min(ENCODED_WORD_CHUNK);
        while !rest.is_char_boundary(split) {
            split -= 1;
        }
        if !first {
            /* whitespace between adjacent encoded words is discarded by
             * conforming decoders */
            ret.push(' ');
        }
        push_encoded_word(ret, &rest[..split]);
        rest = &rest[split..];
        first = false;
    }
}

/// Encode a header value: words containing non-ASCII octets become RFC2047
/// encoded words. Consecutive such words are taken greedily into one token
/// so their interior whitespace survives encoding.
pub fn encode_header(value: &str) -> String {
    if value.is_ascii() {
        return value.to_string();
    }
    let mut ret = String::with_capacity(value.len());
    let mut window: Option<String> = None;
    for word in value.split_inclusive(char::is_whitespace) {
        if word.trim_end_matches(char::is_whitespace).is_ascii() {
            if let Some(w) = window.take() {
                encode_window(&mut ret, w.trim_end_matches(char::is_whitespace));
                ret.push(' ');
            }
            ret.push_str(word);
        } else if let Some(ref mut w) = window {
            w.push_str(word);
        } else {
            window = Some(word.to_string());
        }
    }
    if let Some(w) = window.take() {
        encode_window(&mut ret, w.trim_end_matches(char::is_whitespace));
    }
    ret
}

/// Fold a `name: value` header into physical lines no longer than
/// [`SOFT_LINE_LIMIT`] octets where possible, breaking before whitespace
/// runs. The returned string carries no trailing line terminator.
pub fn fold(name: &str, value: &str) -> String {
    let mut ret = String::with_capacity(name.len() + value.len() + 2);
    ret.push_str(name);
    ret.push_str(": ");
    let mut line_len = name.len() + 2;
    for (i, word) in value.split(' ').enumerate() {
        if i == 0 {
            ret.push_str(word);
            line_len += word.len();
            continue;
        }
        if line_len + 1 + word.len() > SOFT_LINE_LIMIT && line_len > name.len() + 2 {
            ret.push_str("\r\n ");
            line_len = 1;
        } else {
            ret.push(' ');
            line_len += 1;
        }
        ret.push_str(word);
        line_len += word.len();
    }
    ret
}

/// Write a folded header line onto `out`, with its `CRLF` terminator.
pub fn write_folded<W: io::Write>(out: &mut W, name: &str, value: &str) -> crate::error::Result<()> {
    out.write_all(fold(name, value).as_bytes())?;
    out.write_all(b"\r\n")?;
    Ok(())
}

/// Append a `Content-Type`/`Content-Disposition` parameter value, quoting
/// it when it is not a plain token.
pub fn push_parameter_value(ret: &mut String, value: &[u8]) {
    let is_token = !value.is_empty()
        && value.iter().all(|&b| {
            b.is_ascii_alphanumeric()
                || matches!(
                    b,
                    b'!' | b'#' | b'$' | b'%' | b'&' | b'\'' | b'*' | b'+' | b'-' | b'.' | b'^'
                        | b'_' | b'`' | b'|' | b'~'
                )
        });
    if is_token {
        ret.push_str(&String::from_utf8_lossy(value));
    } else {
        ret.push('"');
        for &b in value {
            if b == b'"' || b == b'\\' {
                ret.push('\\');
            }
            ret.push(char::from(b));
        }
        ret.push('"');
    }
}

/// Quoted printable encoding of a body, RFC2045 6.7: `=HH` escapes, soft
/// line breaks at 75 octets, trailing whitespace of a line escaped.
pub fn quoted_printable_encode(bytes: &[u8]) -> Vec<u8> {
    let mut ret = Vec::with_capacity(bytes.len() + bytes.len() / 4);
    let mut line_len = 0_usize;
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        if b == b'\r' && i + 1 < bytes.len() && bytes[i + 1] == b'\n' {
            ret.extend_from_slice(b"\r\n");
            line_len = 0;
            i += 2;
            continue;
        }
        if b == b'\n' {
            ret.extend_from_slice(b"\r\n");
            line_len = 0;
            i += 1;
            continue;
        }
        let at_line_end =
            i + 1 == bytes.len() || bytes[i + 1] == b'\n' || bytes[i + 1] == b'\r';
        let literal = (b == b'\t' || b == b' ' || (33..=126).contains(&b) && b != b'=')
            && !((b == b' ' || b == b'\t') && at_line_end);
        let width = if literal { 1 } else { 3 };
        if line_len + width > 75 {
            ret.extend_from_slice(b"=\r\n");
            line_len = 0;
        }
        if literal {
            ret.push(b);
        } else {
            ret.extend_from_slice(format!("={:02X}", b).as_bytes());
        }
        line_len += width;
        i += 1;
    }
    ret
}

/// Pick the transfer encoding for a body: `7bit` only when every octet is
/// ASCII and no line exceeds 998 octets, `quoted-printable` for other
/// text, `base64` for other binary.
pub fn transfer_encoding_for(bytes: &[u8], is_text: bool) -> ContentTransferEncoding {
    let all_ascii = bytes.iter().all(|&b| b < 128 && b != 0);
    let max_line = bytes
        .split(|&b| b == b'\n')
        .map(<[u8]>::len)
        .max()
        .unwrap_or(0);
    if all_ascii && max_line <= 998 {
        ContentTransferEncoding::_7Bit
    } else if is_text {
        ContentTransferEncoding::QuotedPrintable
    } else {
        ContentTransferEncoding::Base64
    }
}
