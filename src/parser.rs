/*
 * mimelib - parser module
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

//! Parsers for message grammars.
//!
//! The submodules are arranged by context: [`headers`] splits octets into
//! header fields and body, [`encodings`] covers RFC2047 encoded words and
//! the quoted printable and base64 content encodings, [`address`],
//! [`dates`] and [`attachments`] parse typed field values. Parsing is
//! permissive throughout: a value that cannot be parsed in its typed
//! grammar is left to the caller in raw form.

use nom::{
    error::{Error as NomError, ErrorKind as NomErrorKind},
    Err as NomErr, IResult,
};

#[cfg(test)]
mod tests;

macro_rules! is_ctl_or_space {
    ($var:expr) => {
        /* <any ASCII control character and DEL> */
        $var < 33 || $var == 127
    };
}

macro_rules! is_whitespace {
    ($var:expr) => {
        $var == b' ' || $var == b'\t' || $var == b'\n' || $var == b'\r'
    };
}

#[inline]
fn parse_err<O>(input: &[u8]) -> IResult<&[u8], O> {
    Err(NomErr::Error(NomError::new(input, NomErrorKind::Verify)))
}

pub trait BytesExt {
    fn rtrim(&self) -> &Self;
    fn ltrim(&self) -> &Self;
    fn trim(&self) -> &Self;
    fn find(&self, needle: &[u8]) -> Option<usize>;
    fn rfind(&self, needle: &[u8]) -> Option<usize>;
    fn replace(&self, from: &[u8], to: &[u8]) -> Vec<u8>;
    fn is_quoted(&self) -> bool;
}

impl BytesExt for [u8] {
    fn rtrim(&self) -> &Self {
        if let Some(last) = self.iter().rposition(|b| !is_whitespace!(*b)) {
            &self[..=last]
        } else {
            &[]
        }
    }

    fn ltrim(&self) -> &Self {
        if let Some(first) = self.iter().position(|b| !is_whitespace!(*b)) {
            &self[first..]
        } else {
            &[]
        }
    }

    fn trim(&self) -> &[u8] {
        self.rtrim().ltrim()
    }

    // https://stackoverflow.com/a/35907071
    fn find(&self, needle: &[u8]) -> Option<usize> {
        if needle.is_empty() {
            return None;
        }
        self.windows(needle.len())
            .position(|window| window == needle)
    }

    fn rfind(&self, needle: &[u8]) -> Option<usize> {
        if needle.is_empty() {
            return None;
        }
        self.windows(needle.len())
            .rposition(|window| window == needle)
    }

    fn replace(&self, from: &[u8], to: &[u8]) -> Vec<u8> {
        let mut ret = self.to_vec();
        if let Some(idx) = self.find(from) {
            ret.splice(idx..(idx + from.len()), to.iter().cloned());
        }
        ret
    }

    fn is_quoted(&self) -> bool {
        self.starts_with(b"\"") && self.ends_with(b"\"") && self.len() > 1
    }
}

pub mod generic {
    //! Parsers useful in more than one header context.

    use super::*;

    /// Parse a possibly nested parenthesized comment, consuming it.
    pub fn comment(input: &[u8]) -> IResult<&[u8], ()> {
        if !input.starts_with(b"(") {
            return parse_err(input);
        }
        let mut depth = 0_usize;
        let mut i = 0;
        while i < input.len() {
            match input[i] {
                b'\\' => {
                    i += 1;
                }
                b'(' => {
                    depth += 1;
                }
                b')' => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok((&input[i + 1..], ()));
                    }
                }
                _ => {}
            }
            i += 1;
        }
        parse_err(input)
    }

    /// Remove comments from `input`, outside of quoted strings.
    pub fn eat_comments(input: &[u8]) -> Vec<u8> {
        let mut in_comment = 0_usize;
        let mut in_quotes = false;
        let mut prev = 0_u8;
        input
            .iter()
            .fold(Vec::with_capacity(input.len()), |mut acc, x| {
                if *x == b'"' && in_comment == 0 && prev != b'\\' {
                    in_quotes = !in_quotes;
                    acc.push(*x);
                } else if *x == b'(' && !in_quotes {
                    in_comment += 1;
                } else if *x == b')' && !in_quotes && in_comment > 0 {
                    in_comment -= 1;
                } else if in_comment == 0 {
                    acc.push(*x);
                }
                prev = *x;
                acc
            })
    }

    /// A sequence of atoms and quoted strings, joined with single spaces.
    /// Quoted pairs are unescaped.
    pub fn phrase2(input: &[u8]) -> IResult<&[u8], Vec<u8>> {
        let mut acc = Vec::with_capacity(input.len());
        let mut slice = input.ltrim();
        if slice.is_empty() {
            return parse_err(input);
        }
        while !slice.is_empty() {
            if slice[0] == b'"' {
                let mut word = Vec::new();
                let mut i = 1;
                let mut closed = false;
                while i < slice.len() {
                    match slice[i] {
                        b'\\' if i + 1 < slice.len() => {
                            word.push(slice[i + 1]);
                            i += 2;
                        }
                        b'"' => {
                            closed = true;
                            i += 1;
                            break;
                        }
                        b => {
                            word.push(b);
                            i += 1;
                        }
                    }
                }
                if !closed {
                    return parse_err(input);
                }
                if !acc.is_empty() && !word.is_empty() {
                    acc.push(b' ');
                }
                acc.extend(word);
                slice = slice[i..].ltrim();
            } else {
                let end = slice
                    .iter()
                    .position(|b| is_whitespace!(*b) || *b == b'"')
                    .unwrap_or(slice.len());
                if end == 0 {
                    // only reachable on a stray quote handled above
                    break;
                }
                if !acc.is_empty() {
                    acc.push(b' ');
                }
                acc.extend_from_slice(&slice[..end]);
                slice = slice[end..].ltrim();
            }
        }
        Ok((&b""[..], acc))
    }

    /// Decode an unstructured header value: unfold it, keeping the
    /// whitespace octet of each fold, and resolve any encoded words.
    pub fn unstructured(input: &[u8]) -> crate::error::Result<String> {
        let unfolded: Vec<u8> = input
            .iter()
            .filter(|&&b| b != b'\r' && b != b'\n')
            .copied()
            .collect();
        if unfolded.find(b"=?").is_some() {
            let (_, v) = super::encodings::phrase(&unfolded, false)
                .map_err(crate::error::Error::from)?;
            Ok(String::from_utf8_lossy(&v).to_string())
        } else {
            Ok(String::from_utf8_lossy(&unfolded).to_string())
        }
    }

    /// Iterate over the header fields of a raw header block.
    pub struct HeaderIterator<'a>(pub &'a [u8]);

    impl<'a> Iterator for HeaderIterator<'a> {
        type Item = (&'a [u8], &'a [u8]);

        fn next(&mut self) -> Option<(&'a [u8], &'a [u8])> {
            if self.0.is_empty() {
                return None;
            }

            match super::headers::header(self.0) {
                Ok((rest, value)) => {
                    self.0 = rest;
                    Some(value)
                }
                _ => {
                    self.0 = &[];
                    None
                }
            }
        }
    }
}

pub mod headers {
    //! Parsers for splitting octets into header fields and body.
    //!
    //! A header can span multiple lines, eg:
    //!
    //! ```text
    //! Received: from -------------------- (-------------------------)
    //!     by --------------------- (--------------------- [------------------])
    //!     with ESMTP id ------------ for <------------------->;
    //!     Tue,  5 Jan 2016 21:30:44 +0100 (CET)
    //! ```

    use super::*;

    fn header_value(input: &[u8]) -> IResult<&[u8], &[u8]> {
        let input_len = input.len();
        for (i, x) in input.iter().enumerate() {
            if *x == b'\n'
                && (((i + 1) < input_len && input[i + 1] != b' ' && input[i + 1] != b'\t')
                    || i + 1 == input_len)
            {
                return Ok((&input[(i + 1)..], input[0..i].rtrim()));
            } else if input[i..].starts_with(b"\r\n")
                && (((i + 2) < input_len && input[i + 2] != b' ' && input[i + 2] != b'\t')
                    || i + 2 == input_len)
            {
                return Ok((&input[(i + 2)..], input[0..i].rtrim()));
            }
        }
        // value runs to the end of input without a line terminator
        Ok((&input[input_len..], input.rtrim()))
    }

    /// Parse a single header as a (name, value) tuple.
    ///
    /// The value is returned raw: folded lines keep their terminators and
    /// any encoded words are not decoded.
    pub fn header(input: &[u8]) -> IResult<&[u8], (&[u8], &[u8])> {
        if input.is_empty() {
            return parse_err(input);
        } else if input.starts_with(b"\n") || input.starts_with(b"\r\n") {
            return parse_err(input);
        }
        let mut ptr = 0;
        let mut name: &[u8] = &input[0..0];
        /* field-name  =  1*<any CHAR, excluding CTLs, SPACE, and ":"> */
        for (i, x) in input.iter().enumerate() {
            if *x == b':' {
                name = &input[0..i];
                ptr = i + 1;
                break;
            } else if is_ctl_or_space!(*x) {
                return parse_err(input);
            }
        }
        if name.is_empty() {
            return parse_err(input);
        }
        if ptr >= input.len() {
            return Ok((&input[input.len()..], (name, &b""[..])));
        }

        /* a value might start on the next line, folded */
        if input[ptr] == b'\n' {
            if ptr + 1 >= input.len() {
                return Ok((&input[input.len()..], (name, &b""[..])));
            }
            if input[ptr + 1] != b' ' && input[ptr + 1] != b'\t' {
                return Ok((&input[ptr + 1..], (name, &b""[..])));
            }
            ptr += 1;
        } else if input[ptr..].starts_with(b"\r\n") {
            if ptr + 2 >= input.len() {
                return Ok((&input[input.len()..], (name, &b""[..])));
            }
            if input[ptr + 2] != b' ' && input[ptr + 2] != b'\t' {
                return Ok((&input[ptr + 2..], (name, &b""[..])));
            }
            ptr += 2;
        }
        while ptr < input.len() && (input[ptr] == b' ' || input[ptr] == b'\t') {
            ptr += 1;
        }
        if ptr >= input.len() {
            return Ok((&input[input.len()..], (name, &b""[..])));
        }
        let (rest, value) = header_value(&input[ptr..])?;
        Ok((rest, (name, value)))
    }

    /// Parse all headers of a message or part.
    ///
    /// Stops at the first empty line. Lines without a usable name/colon
    /// split are dropped.
    pub fn headers(input: &[u8]) -> IResult<&[u8], Vec<(&[u8], &[u8])>> {
        let mut ret = Vec::new();
        let mut slice = input;
        loop {
            if slice.is_empty() || slice.starts_with(b"\n") || slice.starts_with(b"\r\n") {
                break;
            }
            match header(slice) {
                Ok((rest, value)) => {
                    slice = rest;
                    ret.push(value);
                }
                Err(_) => {
                    debug!(
                        "dropped header line without name/colon split: {:?}",
                        String::from_utf8_lossy(
                            &slice[..slice.iter().position(|&b| b == b'\n').unwrap_or(slice.len())]
                        )
                    );
                    match slice.iter().position(|&b| b == b'\n') {
                        Some(pos) => slice = &slice[pos + 1..],
                        None => slice = &slice[slice.len()..],
                    }
                }
            }
        }
        if ret.is_empty() {
            return parse_err(input);
        }
        Ok((slice, ret))
    }

    /// The raw header block of a message, including the trailing line
    /// terminator but not the empty separator line.
    pub fn headers_raw(input: &[u8]) -> IResult<&[u8], &[u8]> {
        if input.is_empty() {
            return parse_err(input);
        }
        for i in 0..input.len() {
            if input[i..].starts_with(b"\n\n") {
                return Ok((&input[(i + 1)..], &input[0..=i]));
            } else if input[i..].starts_with(b"\r\n\r\n") {
                return Ok((&input[(i + 2)..], &input[0..=i]));
            }
        }
        parse_err(input)
    }

    /// The raw body of a message, i.e. everything after the first empty
    /// line.
    pub fn body_raw(input: &[u8]) -> IResult<&[u8], &[u8]> {
        for i in 0..input.len() {
            if input[i..].starts_with(b"\n\n") {
                return Ok((&b""[..], &input[(i + 2)..]));
            } else if input[i..].starts_with(b"\r\n\r\n") {
                return Ok((&b""[..], &input[(i + 4)..]));
            }
        }
        parse_err(input)
    }

    /// Split a message into its header fields and body.
    pub fn mail(input: &[u8]) -> IResult<&[u8], (Vec<(&[u8], &[u8])>, &[u8])> {
        let (rest, headers) = headers(input)?;
        let body = if rest.starts_with(b"\r\n") {
            &rest[2..]
        } else if rest.starts_with(b"\n") {
            &rest[1..]
        } else {
            rest
        };
        Ok((&b""[..], (headers, body)))
    }
}

pub mod encodings {
    //! RFC2047 encoded words, quoted printable and charset decoding.

    use data_encoding::BASE64_MIME;
    use encoding::{all::*, DecoderTrap, Encoding};

    use super::*;
    use crate::{
        attachment_types::Charset,
        error::{Error, ErrorKind, Result},
    };

    #[inline]
    fn is_hex_digit(b: u8) -> bool {
        b.is_ascii_hexdigit()
    }

    #[inline]
    fn hex_value(b: u8) -> u8 {
        if b < b':' {
            b - 48
        } else if b < b'[' {
            b - 55
        } else {
            b - 87
        }
    }

    /// A `=HH` escape. A bare `CRLF` decodes as `LF`.
    pub fn quoted_printable_byte(input: &[u8]) -> IResult<&[u8], u8> {
        if input.len() >= 3 && input[0] == b'=' && is_hex_digit(input[1]) && is_hex_digit(input[2])
        {
            Ok((&input[3..], hex_value(input[1]) * 16 + hex_value(input[2])))
        } else if input.starts_with(b"\r\n") {
            Ok((&input[2..], b'\n'))
        } else {
            parse_err(input)
        }
    }

    // With MIME, headers in quoted printable format can contain underscores
    // that represent spaces. In non-header context, an underscore is just a
    // plain underscore.
    pub fn quoted_printable_bytes_header(input: &[u8]) -> IResult<&[u8], Vec<u8>> {
        let mut ret = Vec::with_capacity(input.len());
        let mut slice = input;
        while !slice.is_empty() {
            if let Ok((rest, byte)) = quoted_printable_byte(slice) {
                ret.push(byte);
                slice = rest;
            } else if slice[0] == b'_' {
                ret.push(0x20);
                slice = &slice[1..];
            } else {
                ret.push(slice[0]);
                slice = &slice[1..];
            }
        }
        Ok((slice, ret))
    }

    /// Decode a quoted printable body. Soft line breaks are consumed,
    /// illegal `=XX` sequences are passed through as literals.
    pub fn quoted_printable_bytes(input: &[u8]) -> IResult<&[u8], Vec<u8>> {
        let mut ret = Vec::with_capacity(input.len());
        let mut slice = input;
        while !slice.is_empty() {
            if slice[0] == b'=' {
                if slice.len() >= 3 && slice[1] == b'\r' && slice[2] == b'\n' {
                    slice = &slice[3..];
                    continue;
                }
                if slice.len() >= 2 && slice[1] == b'\n' {
                    slice = &slice[2..];
                    continue;
                }
                if slice.len() >= 3 && is_hex_digit(slice[1]) && is_hex_digit(slice[2]) {
                    ret.push(hex_value(slice[1]) * 16 + hex_value(slice[2]));
                    slice = &slice[3..];
                    continue;
                }
                ret.push(b'=');
                slice = &slice[1..];
                continue;
            }
            ret.push(slice[0]);
            slice = &slice[1..];
        }
        Ok((slice, ret))
    }

    /// An RFC2047 `=?charset?encoding?encoded text?=` token.
    ///
    /// Charset decoding failures are errors here; the caller keeps the raw
    /// token as an `us-ascii` word instead.
    pub fn encoded_word(input: &[u8]) -> IResult<&[u8], Vec<u8>> {
        if input.is_empty() {
            return Ok((&b""[..], Vec::with_capacity(0)));
        }
        if input.len() < 5 || input[0] != b'=' || input[1] != b'?' {
            return parse_err(input);
        }
        /* find end of charset tag:
         * =?charset?encoding?encoded text?=
         * ---------^
         */
        let mut tag_end_idx = None;
        for (idx, b) in input.iter().enumerate().skip(2) {
            if *b == b'?' {
                tag_end_idx = Some(idx);
                break;
            }
        }
        let Some(tag_end_idx) = tag_end_idx else {
            return parse_err(input);
        };
        if tag_end_idx + 2 >= input.len() || input[tag_end_idx + 2] != b'?' {
            return parse_err(input);
        }
        /* See if input ends with "?=" and get ending index
         * =?charset?encoding?encoded text?=
         * -------------------------------^
         */
        let mut encoded_end_idx = None;
        for i in (tag_end_idx + 3)..input.len().saturating_sub(1) {
            if input[i] == b'?' && input[i + 1] == b'=' {
                encoded_end_idx = Some(i);
                break;
            }
        }
        let Some(encoded_end_idx) = encoded_end_idx else {
            return parse_err(input);
        };
        let encoded_text = &input[tag_end_idx + 3..encoded_end_idx];

        let s: Vec<u8> = match input[tag_end_idx + 1] {
            b'b' | b'B' => match BASE64_MIME.decode(encoded_text) {
                Ok(v) => v,
                Err(_) => encoded_text.to_vec(),
            },
            b'q' | b'Q' => match quoted_printable_bytes_header(encoded_text) {
                Ok((b"", s)) => s,
                _ => return parse_err(input),
            },
            _ => return parse_err(input),
        };

        let charset = Charset::from(&input[2..tag_end_idx]);

        if let Charset::UTF8 | Charset::Ascii = charset {
            Ok((&input[encoded_end_idx + 2..], s))
        } else {
            match decode_charset(&s, charset) {
                Ok(v) => Ok((&input[encoded_end_idx + 2..], v.into_bytes())),
                _ => parse_err(input),
            }
        }
    }

    /// Transcode `s` from `charset` into UTF-8, failing on undecodable
    /// sequences.
    pub fn decode_charset(s: &[u8], charset: Charset) -> Result<String> {
        decode_charset_with(s, charset, DecoderTrap::Strict)
    }

    /// Transcode `s` from `charset` into UTF-8. The `trap` selects what to
    /// do on undecodable sequences: fail, substitute a replacement
    /// character, or drop them.
    pub fn decode_charset_with(s: &[u8], charset: Charset, trap: DecoderTrap) -> Result<String> {
        let decode_err =
            |e: std::borrow::Cow<'static, str>| Error::new(e).set_kind(ErrorKind::ValueError);
        match charset {
            Charset::UTF8 | Charset::Ascii => Ok(String::from_utf8_lossy(s).to_string()),
            Charset::ISO8859_1 => ISO_8859_1.decode(s, trap).map_err(decode_err),
            Charset::ISO8859_2 => ISO_8859_2.decode(s, trap).map_err(decode_err),
            Charset::ISO8859_3 => ISO_8859_3.decode(s, trap).map_err(decode_err),
            Charset::ISO8859_4 => ISO_8859_4.decode(s, trap).map_err(decode_err),
            Charset::ISO8859_5 => ISO_8859_5.decode(s, trap).map_err(decode_err),
            Charset::ISO8859_6 => ISO_8859_6.decode(s, trap).map_err(decode_err),
            Charset::ISO8859_7 => ISO_8859_7.decode(s, trap).map_err(decode_err),
            Charset::ISO8859_8 => ISO_8859_8.decode(s, trap).map_err(decode_err),
            Charset::ISO8859_10 => ISO_8859_10.decode(s, trap).map_err(decode_err),
            Charset::ISO8859_13 => ISO_8859_13.decode(s, trap).map_err(decode_err),
            Charset::ISO8859_14 => ISO_8859_14.decode(s, trap).map_err(decode_err),
            Charset::ISO8859_15 => ISO_8859_15.decode(s, trap).map_err(decode_err),
            Charset::ISO8859_16 => ISO_8859_16.decode(s, trap).map_err(decode_err),
            Charset::Windows1250 => WINDOWS_1250.decode(s, trap).map_err(decode_err),
            Charset::Windows1251 => WINDOWS_1251.decode(s, trap).map_err(decode_err),
            Charset::Windows1252 => WINDOWS_1252.decode(s, trap).map_err(decode_err),
            Charset::Windows1253 => WINDOWS_1253.decode(s, trap).map_err(decode_err),
            Charset::GBK | Charset::GB2312 => GBK.decode(s, trap).map_err(decode_err),
            Charset::GB18030 => GB18030.decode(s, trap).map_err(decode_err),
            Charset::BIG5 => BIG5_2003.decode(s, trap).map_err(decode_err),
            Charset::ISO2022JP => ISO_2022_JP.decode(s, trap).map_err(decode_err),
            Charset::EUCJP => EUC_JP.decode(s, trap).map_err(decode_err),
            Charset::KOI8R => KOI8_R.decode(s, trap).map_err(decode_err),
            Charset::KOI8U => KOI8_U.decode(s, trap).map_err(decode_err),
            Charset::UTF16 => {
                if s.starts_with(&[0xfe, 0xff]) {
                    UTF_16BE.decode(&s[2..], trap).map_err(decode_err)
                } else if s.starts_with(&[0xff, 0xfe]) {
                    UTF_16LE.decode(&s[2..], trap).map_err(decode_err)
                } else {
                    UTF_16BE.decode(s, trap).map_err(decode_err)
                }
            }
        }
    }

    /// Decode a header text context: a mix of plain ASCII tokens and
    /// encoded words. Adjacent encoded words separated only by whitespace
    /// are concatenated with the whitespace discarded; a token that looks
    /// like an encoded word but cannot be decoded is kept raw.
    pub fn phrase(input: &[u8], eat_comments_flag: bool) -> IResult<&[u8], Vec<u8>> {
        if input.is_empty() {
            return Ok((&b""[..], Vec::with_capacity(0)));
        }

        let cleaned: Vec<u8>;
        let mut slice: &[u8] = if eat_comments_flag {
            cleaned = generic::eat_comments(input);
            &cleaned
        } else {
            input
        };
        slice = slice.ltrim();

        let mut acc: Vec<u8> = Vec::with_capacity(input.len());

        while !slice.is_empty() {
            if slice.starts_with(b"=?") {
                if let Ok((rest, decoded)) = encoded_word(slice) {
                    acc.extend(decoded);
                    let trimmed = rest.ltrim();
                    if trimmed.starts_with(b"=?") {
                        /* whitespace between two encoded words is discarded */
                        slice = trimmed;
                        continue;
                    }
                    let had_ws = rest.first().map(|b| is_whitespace!(*b)).unwrap_or(false);
                    if had_ws && !trimmed.is_empty() {
                        acc.push(b' ');
                    }
                    slice = trimmed;
                    continue;
                }
            }
            /* plain token, ends at whitespace or at an embedded encoded word */
            let ws = slice
                .iter()
                .position(|b| is_whitespace!(*b))
                .unwrap_or(slice.len());
            let mut end = ws;
            if let Some(ew) = slice.find(b"=?") {
                if ew > 0 && ew < end {
                    end = ew;
                }
            }
            acc.extend_from_slice(&slice[..end]);
            if end == ws {
                let rest = &slice[end..];
                let trimmed = rest.ltrim();
                if !rest.is_empty() && !trimmed.is_empty() {
                    acc.push(b' ');
                }
                slice = trimmed;
            } else {
                slice = &slice[end..];
            }
        }
        Ok((&b""[..], acc))
    }
}

pub mod address {
    //! Parsers for addresses, address lists and message ids.

    use smallvec::SmallVec;

    use super::*;
    use crate::address::{Address, MessageID, StrBuild};

    /// Find the position of `needle` in `input`, ignoring quoted strings
    /// and comments.
    fn find_unquoted(input: &[u8], needle: u8) -> Option<usize> {
        let mut in_quotes = false;
        let mut in_comment = 0_usize;
        let mut prev = 0_u8;
        for (i, b) in input.iter().enumerate() {
            if *b == b'"' && in_comment == 0 && prev != b'\\' {
                in_quotes = !in_quotes;
            } else if !in_quotes && *b == b'(' {
                in_comment += 1;
            } else if !in_quotes && *b == b')' && in_comment > 0 {
                in_comment -= 1;
            } else if !in_quotes && in_comment == 0 && *b == needle {
                return Some(i);
            }
            prev = *b;
        }
        None
    }

    fn decode_display_name(raw: &[u8]) -> Vec<u8> {
        /* unfold */
        let unfolded: Vec<u8> = raw
            .iter()
            .filter(|&&b| b != b'\r' && b != b'\n')
            .copied()
            .collect();
        let mut d: Vec<u8> = unfolded.trim().to_vec();
        if d.find(b"=?").is_some() {
            if let Ok((_, decoded)) = encodings::phrase(&d, false) {
                d = decoded;
            }
        }
        if d.contains(&b'"') {
            if let Ok((_, words)) = generic::phrase2(&d) {
                d = words;
            }
        }
        d.trim().to_vec()
    }

    /// `phrase <addr-spec>` with optional comments.
    pub fn display_addr(input: &[u8]) -> IResult<&[u8], Address> {
        let slice = input.ltrim();
        let lt = match find_unquoted(slice, b'<') {
            Some(pos) => pos,
            None => return parse_err(input),
        };
        let gt = match slice[lt..].iter().position(|&b| b == b'>') {
            Some(pos) => lt + pos,
            None => return parse_err(input),
        };
        let addr = generic::eat_comments(&slice[lt + 1..gt]);
        let addr = addr.trim();
        if !addr.contains(&b'@') {
            return parse_err(input);
        }
        let display_name = decode_display_name(&slice[..lt]);
        let rest = &slice[gt + 1..];

        let display = String::from_utf8_lossy(&display_name).to_string();
        let spec = String::from_utf8_lossy(addr).to_string();
        if display.is_empty() {
            Ok((rest, Address::new(None, spec)))
        } else {
            Ok((rest, Address::new(Some(display), spec)))
        }
    }

    /// A bare `addr-spec`, comments discarded.
    pub fn addr_spec(input: &[u8]) -> IResult<&[u8], Address> {
        let slice = input.ltrim();
        if slice.is_empty() {
            return parse_err(input);
        }
        let mut end = slice.len();
        let mut in_comment = 0_usize;
        for (i, b) in slice.iter().enumerate() {
            if *b == b'(' {
                in_comment += 1;
            } else if *b == b')' && in_comment > 0 {
                in_comment -= 1;
            } else if in_comment == 0 && (is_whitespace!(*b) || *b == b',' || *b == b';') {
                end = i;
                break;
            }
        }
        let token = generic::eat_comments(&slice[..end]);
        let token = token.trim();
        if token.is_empty() || !token[1..].contains(&b'@') {
            return parse_err(input);
        }
        Ok((
            &slice[end..],
            Address::new(None, String::from_utf8_lossy(token).to_string()),
        ))
    }

    /// `display_addr` or a bare `addr_spec`.
    pub fn mailbox(input: &[u8]) -> IResult<&[u8], Address> {
        display_addr(input).or_else(|_| addr_spec(input))
    }

    /// Group of recipients, e.g. `undisclosed-recipients:;`.
    pub fn group(input: &[u8]) -> IResult<&[u8], Address> {
        let slice = input.ltrim();
        let colon = match find_unquoted(slice, b':') {
            Some(pos) => pos,
            None => return parse_err(input),
        };
        let name = decode_display_name(&slice[..colon]);
        if name.is_empty() {
            return parse_err(input);
        }
        let end = find_unquoted(&slice[colon + 1..], b';')
            .map(|p| colon + 1 + p)
            .unwrap_or(slice.len());
        let inner = &slice[colon + 1..end];
        let mut mailbox_list = Vec::new();
        for segment in split_address_list(inner) {
            if segment.trim().is_empty() {
                continue;
            }
            let (_, mbox) = mailbox(segment)?;
            mailbox_list.push(mbox);
        }
        let rest = if end < slice.len() {
            &slice[end + 1..]
        } else {
            &slice[slice.len()..]
        };
        Ok((
            rest,
            Address::new_group(String::from_utf8_lossy(&name).to_string(), mailbox_list),
        ))
    }

    /// A single mailbox or group.
    pub fn address(input: &[u8]) -> IResult<&[u8], Address> {
        let slice = input.ltrim();
        let colon = find_unquoted(slice, b':');
        let lt = find_unquoted(slice, b'<');
        let at = slice.iter().position(|&b| b == b'@');
        match (colon, lt, at) {
            (Some(c), Some(l), _) if c < l => group(input).or_else(|_| mailbox(input)),
            (Some(c), None, Some(a)) if c < a => group(input).or_else(|_| mailbox(input)),
            (Some(_), None, None) => group(input).or_else(|_| mailbox(input)),
            _ => mailbox(input).or_else(|_| group(input)),
        }
    }

    /// Split a raw address list on top-level commas: commas inside quoted
    /// strings, comments, angle brackets or group syntax do not separate.
    fn split_address_list(input: &[u8]) -> Vec<&[u8]> {
        let mut ret = Vec::new();
        let mut in_quotes = false;
        let mut in_comment = 0_usize;
        let mut in_brackets = false;
        let mut in_group = false;
        let mut prev = 0_u8;
        let mut start = 0;
        for (i, b) in input.iter().enumerate() {
            match *b {
                b'"' if in_comment == 0 && prev != b'\\' => in_quotes = !in_quotes,
                b'(' if !in_quotes => in_comment += 1,
                b')' if !in_quotes && in_comment > 0 => in_comment -= 1,
                b'<' if !in_quotes && in_comment == 0 => in_brackets = true,
                b'>' if !in_quotes && in_comment == 0 => in_brackets = false,
                b':' if !in_quotes && in_comment == 0 && !in_brackets => in_group = true,
                b';' if !in_quotes && in_comment == 0 && !in_brackets => in_group = false,
                b',' if !in_quotes && in_comment == 0 && !in_brackets && !in_group => {
                    ret.push(&input[start..i]);
                    start = i + 1;
                }
                _ => {}
            }
            prev = *b;
        }
        if start <= input.len() {
            ret.push(&input[start..]);
        }
        ret
    }

    /// An RFC2822 address list: comma separated mailboxes and groups.
    pub fn rfc2822address_list(input: &[u8]) -> IResult<&[u8], SmallVec<[Address; 1]>> {
        let mut ret = SmallVec::new();
        if input.trim().is_empty() {
            return Ok((&input[input.len()..], ret));
        }
        for segment in split_address_list(input) {
            if segment.trim().is_empty() {
                continue;
            }
            let (_, addr) = address(segment)?;
            ret.push(addr);
        }
        Ok((&input[input.len()..], ret))
    }

    /// A `msg-id` token, `<id-left@id-right>`.
    pub fn msg_id(input: &[u8]) -> IResult<&[u8], MessageID> {
        let slice = input.ltrim();
        if !slice.starts_with(b"<") {
            return parse_err(input);
        }
        let gt = match slice.iter().position(|&b| b == b'>') {
            Some(pos) if pos > 1 => pos,
            _ => return parse_err(input),
        };
        let val = &slice[..=gt];
        let inner = &slice[1..gt];
        Ok((&slice[gt + 1..], MessageID::new(val, inner)))
    }

    /// A sequence of `msg-id`s separated by whitespace or commas.
    pub fn msg_id_list(input: &[u8]) -> IResult<&[u8], Vec<MessageID>> {
        let mut ret = Vec::new();
        let mut slice = input.ltrim();
        loop {
            while slice.starts_with(b",") {
                slice = slice[1..].ltrim();
            }
            if !slice.starts_with(b"<") {
                break;
            }
            match msg_id(slice) {
                Ok((rest, id)) => {
                    ret.push(id);
                    slice = rest.ltrim();
                }
                Err(_) => break,
            }
        }
        if ret.is_empty() {
            return parse_err(input);
        }
        Ok((slice, ret))
    }

}

pub mod dates {
    //! Parsers for RFC5322 `date-time` values, including obsolete forms.

    use super::*;
    use crate::{
        error::{Error, ErrorKind, Result},
        utils::datetime::{timestamp_from_civil, UnixTimestamp},
    };

    const MONTHS: [&[u8]; 12] = [
        b"jan", b"feb", b"mar", b"apr", b"may", b"jun", b"jul", b"aug", b"sep", b"oct", b"nov",
        b"dec",
    ];

    fn month_from_name(name: &[u8]) -> Option<u8> {
        let lower = name.to_ascii_lowercase();
        MONTHS
            .iter()
            .position(|m| lower.starts_with(m))
            .map(|p| (p + 1) as u8)
    }

    /// Obsolete named zones and `+HHMM`/`-HHMM` numeric forms, in minutes
    /// east of UTC. Unknown alphabetic zones mean `-0000`.
    fn zone_to_offset(zone: &[u8]) -> i64 {
        match zone {
            z if z.is_empty() => 0,
            z if z[0] == b'+' || z[0] == b'-' => {
                let sign = if z[0] == b'-' { -1 } else { 1 };
                let digits: Vec<u8> = z[1..]
                    .iter()
                    .copied()
                    .filter(u8::is_ascii_digit)
                    .collect();
                if digits.len() < 4 {
                    return 0;
                }
                let hours = i64::from(digits[0] - b'0') * 10 + i64::from(digits[1] - b'0');
                let minutes = i64::from(digits[2] - b'0') * 10 + i64::from(digits[3] - b'0');
                sign * (hours * 60 + minutes)
            }
            z if z.eq_ignore_ascii_case(b"UT") || z.eq_ignore_ascii_case(b"GMT") => 0,
            z if z.eq_ignore_ascii_case(b"EST") => -5 * 60,
            z if z.eq_ignore_ascii_case(b"EDT") => -4 * 60,
            z if z.eq_ignore_ascii_case(b"CST") => -6 * 60,
            z if z.eq_ignore_ascii_case(b"CDT") => -5 * 60,
            z if z.eq_ignore_ascii_case(b"MST") => -7 * 60,
            z if z.eq_ignore_ascii_case(b"MDT") => -6 * 60,
            z if z.eq_ignore_ascii_case(b"PST") => -8 * 60,
            z if z.eq_ignore_ascii_case(b"PDT") => -7 * 60,
            _ => 0,
        }
    }

    fn parse_u32(token: &[u8]) -> Option<u32> {
        if token.is_empty() || !token.iter().all(u8::is_ascii_digit) {
            return None;
        }
        std::str::from_utf8(token).ok()?.parse().ok()
    }

    /// Two-digit years are interpreted as `1900+` for `50..=99` and `2000+`
    /// for `00..=49`; three-digit years as `1900+`.
    fn normalize_year(year: u32, digits: usize) -> i64 {
        match digits {
            2 if year >= 50 => i64::from(year) + 1900,
            2 => i64::from(year) + 2000,
            3 => i64::from(year) + 1900,
            _ => i64::from(year),
        }
    }

    fn parse_time(token: &[u8]) -> Option<(u8, u8, u8)> {
        let mut iter = token.split(|&b| b == b':');
        let hour = parse_u32(iter.next()?)?;
        let minute = parse_u32(iter.next()?)?;
        let second = match iter.next() {
            Some(s) => parse_u32(s)?,
            None => 0,
        };
        if hour > 23 || minute > 59 || second > 60 {
            return None;
        }
        Some((hour as u8, minute as u8, second as u8))
    }

    /// Parse an RFC5322 `date-time`, returning the timestamp and the zone
    /// offset in minutes east of UTC.
    ///
    /// Handles obsolete two-digit years, named zones, comments, folded
    /// whitespace, and asctime dates (`Wed Sep  9 00:27:54 2020`). Fails
    /// with [`ErrorKind::BadDateTime`] only if no plausible parse exists.
    pub fn rfc5322_date_zone(input: &[u8]) -> Result<(UnixTimestamp, i64)> {
        let bad = || {
            Error::new(format!(
                "Could not parse date: {}",
                String::from_utf8_lossy(input)
            ))
            .set_kind(ErrorKind::BadDateTime)
        };
        let (_, decoded) = encodings::phrase(input, true).map_err(Error::from)?;
        let mut tokens: Vec<&[u8]> = decoded
            .split(|b| is_whitespace!(*b))
            .filter(|t| !t.is_empty())
            .collect();
        if tokens.is_empty() {
            return Err(bad());
        }
        /* drop the optional day-of-week */
        if tokens[0].ends_with(b",") {
            tokens.remove(0);
        } else if tokens.len() > 1 && tokens[1] == &b","[..] {
            tokens.drain(0..2);
        } else if !tokens[0].is_empty()
            && tokens[0].iter().all(u8::is_ascii_alphabetic)
            && tokens.len() > 1
            && month_from_name(tokens[1]).is_some()
        {
            /* asctime form: "Wed Sep  9 00:27:54 2020" */
            if tokens.len() < 5 {
                return Err(bad());
            }
            let month = month_from_name(tokens[1]).ok_or_else(bad)?;
            let day = parse_u32(tokens[2]).ok_or_else(bad)?;
            let (hour, minute, second) = parse_time(tokens[3]).ok_or_else(bad)?;
            let year = parse_u32(tokens[4]).ok_or_else(bad)?;
            let ts = timestamp_from_civil(
                normalize_year(year, tokens[4].len()),
                month,
                day as u8,
                hour,
                minute,
                second,
                0,
            );
            return Ok((ts, 0));
        } else if !tokens[0].is_empty()
            && tokens[0].iter().all(u8::is_ascii_alphabetic)
            && tokens.len() > 1
            && tokens[1].iter().all(u8::is_ascii_digit)
        {
            /* obsolete day-of-week without a comma */
            tokens.remove(0);
        }
        if tokens.len() < 4 {
            return Err(bad());
        }
        let day = parse_u32(tokens[0]).ok_or_else(bad)?;
        if day == 0 || day > 31 {
            return Err(bad());
        }
        let month = month_from_name(tokens[1]).ok_or_else(bad)?;
        let year = parse_u32(tokens[2]).ok_or_else(bad)?;
        let (hour, minute, second) = parse_time(tokens[3]).ok_or_else(bad)?;
        let offset = if tokens.len() > 4 {
            zone_to_offset(tokens[4])
        } else {
            0
        };
        let ts = timestamp_from_civil(
            normalize_year(year, tokens[2].len()),
            month,
            day as u8,
            hour,
            minute,
            second,
            offset,
        );
        Ok((ts, offset))
    }

    /// Parse an RFC5322 `date-time` into a UNIX timestamp.
    pub fn rfc5322_date(input: &[u8]) -> Result<UnixTimestamp> {
        rfc5322_date_zone(input).map(|(ts, _)| ts)
    }
}

pub mod attachments {
    //! Parsers for part bodies: header/body split, `Content-Type`,
    //! `Content-Disposition`, RFC2231 parameter values and multipart
    //! boundary discovery.

    use super::*;
    use crate::{
        address::StrBuilder,
        attachment_types::{ContentDisposition, ContentDispositionKind},
    };

    /// Split a part into its header fields and body. A part may legally
    /// have no headers at all.
    pub fn attachment(input: &[u8]) -> IResult<&[u8], (Vec<(&[u8], &[u8])>, &[u8])> {
        if input.starts_with(b"\r\n") {
            return Ok((&b""[..], (Vec::new(), &input[2..])));
        }
        if input.starts_with(b"\n") {
            return Ok((&b""[..], (Vec::new(), &input[1..])));
        }
        let mut fields = Vec::new();
        let mut slice = input;
        loop {
            if slice.is_empty() {
                break;
            }
            if slice.starts_with(b"\r\n") {
                slice = &slice[2..];
                return Ok((&b""[..], (fields, slice)));
            }
            if slice.starts_with(b"\n") {
                slice = &slice[1..];
                return Ok((&b""[..], (fields, slice)));
            }
            match headers::header(slice) {
                Ok((rest, value)) => {
                    slice = rest;
                    fields.push(value);
                }
                Err(_) => {
                    if fields.is_empty() {
                        return parse_err(input);
                    }
                    /* drop the malformed line */
                    match slice.iter().position(|&b| b == b'\n') {
                        Some(pos) => slice = &slice[pos + 1..],
                        None => slice = &slice[slice.len()..],
                    }
                }
            }
        }
        /* headers with no body at all */
        Ok((&b""[..], (fields, &b""[..])))
    }

    fn parameter(input: &[u8]) -> IResult<&[u8], (&[u8], &[u8])> {
        let slice = input.ltrim();
        if !slice.starts_with(b";") {
            return parse_err(input);
        }
        let slice = slice[1..].ltrim();
        let eq = match slice.iter().position(|&b| b == b'=') {
            Some(pos) if pos > 0 => pos,
            _ => return parse_err(input),
        };
        let name = slice[..eq].trim();
        let vstart = &slice[eq + 1..];
        let vstart = vstart.ltrim();
        if vstart.starts_with(b"\"") {
            let mut i = 1;
            while i < vstart.len() {
                match vstart[i] {
                    b'\\' if i + 1 < vstart.len() => i += 2,
                    b'"' => {
                        return Ok((&vstart[i + 1..], (name, &vstart[1..i])));
                    }
                    _ => i += 1,
                }
            }
            parse_err(input)
        } else {
            let end = vstart
                .iter()
                .position(|&b| b == b';')
                .unwrap_or(vstart.len());
            Ok((&vstart[end..], (name, vstart[..end].trim())))
        }
    }

    /// `type/subtype` plus raw `; name=value` parameters. RFC2231
    /// reassembly is applied by [`rfc2231_parameters`] on the result.
    pub fn content_type(input: &[u8]) -> IResult<&[u8], (&[u8], &[u8], Vec<(&[u8], &[u8])>)> {
        let slice = input.trim();
        let sep = match slice.iter().position(|&b| b == b'/') {
            Some(pos) if pos > 0 => pos,
            _ => return parse_err(input),
        };
        let ct = slice[..sep].trim();
        let rest = &slice[sep + 1..];
        let subtype_end = rest.iter().position(|&b| b == b';').unwrap_or(rest.len());
        let cst = rest[..subtype_end].trim();
        if cst.is_empty() {
            return parse_err(input);
        }
        let mut params = Vec::new();
        let mut param_slice = &rest[subtype_end..];
        while let Ok((rest, pair)) = parameter(param_slice) {
            params.push(pair);
            param_slice = rest;
        }
        Ok((param_slice, (ct, cst, params)))
    }

    fn percent_decode(input: &[u8]) -> Vec<u8> {
        let mut ret = Vec::with_capacity(input.len());
        let mut slice = input;
        while !slice.is_empty() {
            if slice.len() >= 3
                && slice[0] == b'%'
                && slice[1].is_ascii_hexdigit()
                && slice[2].is_ascii_hexdigit()
            {
                let hex = |b: u8| -> u8 {
                    if b < b':' {
                        b - 48
                    } else if b < b'[' {
                        b - 55
                    } else {
                        b - 87
                    }
                };
                ret.push(hex(slice[1]) * 16 + hex(slice[2]));
                slice = &slice[3..];
            } else {
                ret.push(slice[0]);
                slice = &slice[1..];
            }
        }
        ret
    }

    /// Reassemble RFC2231 parameter continuations and decode extended
    /// values.
    ///
    /// `name*0` / `name*1` ... segments are concatenated in numeric order;
    /// a trailing `*` marks a `charset'language'percent-encoded` value
    /// which is percent-decoded and transcoded to UTF-8.
    pub fn rfc2231_parameters(params: &[(&[u8], &[u8])]) -> Vec<(Vec<u8>, Vec<u8>)> {
        struct Accumulator {
            name: Vec<u8>,
            /* (index, extended, value) */
            segments: Vec<(u32, bool, Vec<u8>)>,
            extended: bool,
        }

        let mut accumulators: Vec<Accumulator> = Vec::new();
        for (name, value) in params {
            let mut name: &[u8] = name;
            let mut extended = false;
            if name.ends_with(b"*") {
                extended = true;
                name = &name[..name.len() - 1];
            }
            let (base, index) = match name.iter().position(|&b| b == b'*') {
                Some(pos) => {
                    let index = std::str::from_utf8(&name[pos + 1..])
                        .ok()
                        .and_then(|s| s.parse::<u32>().ok());
                    match index {
                        Some(i) => (&name[..pos], i),
                        None => (name, 0),
                    }
                }
                None => (name, 0),
            };
            if let Some(acc) = accumulators
                .iter_mut()
                .find(|a| a.name.eq_ignore_ascii_case(base))
            {
                acc.segments.push((index, extended, value.to_vec()));
                acc.extended |= extended;
            } else {
                accumulators.push(Accumulator {
                    name: base.to_vec(),
                    segments: vec![(index, extended, value.to_vec())],
                    extended,
                });
            }
        }

        let mut ret = Vec::with_capacity(accumulators.len());
        for mut acc in accumulators {
            acc.segments.sort_by_key(|(i, _, _)| *i);
            let mut charset = crate::attachment_types::Charset::Ascii;
            let mut bytes = Vec::new();
            for (seg_index, (_, extended, value)) in acc.segments.into_iter().enumerate() {
                let mut value: &[u8] = &value;
                if seg_index == 0 && extended {
                    /* charset'language'value */
                    let mut it = value.splitn(3, |&b| b == b'\'');
                    if let (Some(cs), Some(_lang), Some(rest)) = (it.next(), it.next(), it.next())
                    {
                        charset = crate::attachment_types::Charset::from(cs);
                        value = rest;
                    }
                }
                if extended {
                    bytes.extend(percent_decode(value));
                } else {
                    bytes.extend_from_slice(value);
                }
            }
            if acc.extended {
                if let Ok(decoded) = super::encodings::decode_charset(&bytes, charset) {
                    bytes = decoded.into_bytes();
                }
            }
            ret.push((acc.name, bytes));
        }
        ret
    }

    /// Parse a `Content-Disposition` value with its parameters.
    pub fn content_disposition(input: &[u8]) -> IResult<&[u8], ContentDisposition> {
        let slice = input.trim();
        if slice.is_empty() {
            return parse_err(input);
        }
        let token_end = slice.iter().position(|&b| b == b';').unwrap_or(slice.len());
        let token = slice[..token_end].trim();
        let kind = if token.eq_ignore_ascii_case(b"inline") {
            ContentDispositionKind::Inline
        } else {
            ContentDispositionKind::Attachment
        };
        let mut ret = ContentDisposition {
            kind,
            ..ContentDisposition::default()
        };
        let mut raw_params = Vec::new();
        let mut param_slice = &slice[token_end..];
        while let Ok((rest, pair)) = parameter(param_slice) {
            raw_params.push(pair);
            param_slice = rest;
        }
        for (name, value) in rfc2231_parameters(&raw_params) {
            let value_string = || {
                if value.find(b"=?").is_some() {
                    super::encodings::phrase(&value, false)
                        .map(|(_, v)| String::from_utf8_lossy(&v).to_string())
                        .unwrap_or_else(|_| String::from_utf8_lossy(&value).to_string())
                } else {
                    String::from_utf8_lossy(&value).to_string()
                }
            };
            if name.eq_ignore_ascii_case(b"filename") {
                ret.filename = Some(value_string());
            } else if name.eq_ignore_ascii_case(b"size") {
                ret.size = Some(value_string());
            } else if name.eq_ignore_ascii_case(b"creation-date") {
                ret.creation_date = Some(value_string());
            } else if name.eq_ignore_ascii_case(b"modification-date") {
                ret.modification_date = Some(value_string());
            } else if name.eq_ignore_ascii_case(b"read-date") {
                ret.read_date = Some(value_string());
            } else {
                ret.parameters.push((name, value));
            }
        }
        Ok((param_slice, ret))
    }

    /// The sections of a multipart body, as ranges into the input.
    #[derive(Clone, Debug, Default)]
    pub struct MultipartSections {
        pub preamble: StrBuilder,
        pub parts: Vec<StrBuilder>,
        pub epilogue: StrBuilder,
        /// Whether the closing `--boundary--` delimiter was found.
        pub terminated: bool,
    }

    /// Discover the `--boundary` delimiter lines of a multipart body.
    ///
    /// A missing closing delimiter is accepted: the parts found so far are
    /// kept and the epilogue is empty. If no delimiter occurs at all, the
    /// whole body is the preamble.
    pub fn multipart_sections(input: &[u8], boundary: &[u8]) -> MultipartSections {
        #[derive(Clone, Copy, PartialEq)]
        enum LineKind {
            Delimiter,
            Close,
        }

        let mut delimiters: Vec<(usize, usize, LineKind)> = Vec::new();
        let mut pos = 0;
        while pos <= input.len() {
            let line_end = input[pos..]
                .iter()
                .position(|&b| b == b'\n')
                .map(|p| pos + p + 1)
                .unwrap_or(input.len());
            let line = &input[pos..line_end];
            let content = line.rtrim();
            if content.starts_with(b"--") && content[2..].starts_with(boundary) {
                let after = &content[2 + boundary.len()..];
                if after.starts_with(b"--") {
                    delimiters.push((pos, line_end, LineKind::Close));
                } else if after.trim().is_empty() {
                    delimiters.push((pos, line_end, LineKind::Delimiter));
                }
            }
            if line_end >= input.len() {
                break;
            }
            pos = line_end;
        }

        let mut sections = MultipartSections::default();
        let Some(&(first_start, _, _)) = delimiters.first() else {
            sections.preamble = StrBuilder {
                offset: 0,
                length: input.len(),
            };
            return sections;
        };

        /* the line terminator before a delimiter belongs to the delimiter */
        let strip_crlf = |end: usize| {
            if end >= 2 && &input[end - 2..end] == b"\r\n" {
                end - 2
            } else if end >= 1 && input[end - 1] == b'\n' {
                end - 1
            } else {
                end
            }
        };

        sections.preamble = StrBuilder {
            offset: 0,
            length: strip_crlf(first_start),
        };

        let mut i = 0;
        while i < delimiters.len() {
            let (_, line_end, kind) = delimiters[i];
            if kind == LineKind::Close {
                sections.terminated = true;
                sections.epilogue = StrBuilder {
                    offset: line_end.min(input.len()),
                    length: input.len().saturating_sub(line_end),
                };
                break;
            }
            let part_start = line_end;
            let part_end = if i + 1 < delimiters.len() {
                strip_crlf(delimiters[i + 1].0)
            } else {
                input.len()
            };
            if part_end >= part_start {
                sections.parts.push(StrBuilder {
                    offset: part_start,
                    length: part_end - part_start,
                });
            }
            i += 1;
        }
        sections
    }

    /// The children of a multipart body as byte slices.
    pub fn parts<'a>(input: &'a [u8], boundary: &[u8]) -> IResult<&'a [u8], Vec<&'a [u8]>> {
        let sections = multipart_sections(input, boundary);
        Ok((
            &input[input.len()..],
            sections
                .parts
                .iter()
                .map(|s| s.display_bytes(input))
                .collect(),
        ))
    }

    /// The children of a multipart body as ranges into `input`.
    pub fn multipart_parts<'a>(
        input: &'a [u8],
        boundary: &[u8],
    ) -> IResult<&'a [u8], Vec<StrBuilder>> {
        let sections = multipart_sections(input, boundary);
        Ok((&input[input.len()..], sections.parts))
    }
}
