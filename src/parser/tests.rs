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

use super::{
    address::*,
    attachments::{content_disposition, content_type, multipart_sections, rfc2231_parameters},
    dates::rfc5322_date,
    encodings::*,
    generic::{comment, phrase2, unstructured},
    headers, BytesExt,
};
use crate::{address::*, make_address};

macro_rules! to_str {
    ($l:expr) => {{
        unsafe { std::str::from_utf8_unchecked($l) }
    }};
}

#[test]
fn test_parser_phrase() {
    let words = b"=?iso-8859-7?B?W215Y291cnNlcy5udHVhLmdyIC0gyvXs4fTp6t4g6uHpIMri4e306ere?=
     =?iso-8859-7?B?INb18+nq3l0gzd3hIMHt4erv3+358+c6IMzF0c/TIMHQz9TFy8XTzMHU?=
      =?iso-8859-7?B?2c0gwiDUzC4gysHNLiDFzsXUwdPH0yAyMDE3LTE4OiDTx8zFydnTxw==?=";
    assert_eq!(
        "[mycourses.ntua.gr - Κυματική και Κβαντική Φυσική] Νέα Ανακοίνωση: ΜΕΡΟΣ ΑΠΟΤΕΛΕΣΜΑΤΩΝ Β \
         ΤΜ. ΚΑΝ. ΕΞΕΤΑΣΗΣ 2017-18: ΣΗΜΕΙΩΣΗ",
        std::str::from_utf8(&phrase(words.trim(), false).unwrap().1).unwrap()
    );
    let words = b"=?UTF-8?Q?=CE=A0=CF=81=CF=8C=CF=83=CE=B8=CE=B5?= =?UTF-8?Q?=CF=84=CE=B7_=CE=B5=CE=BE=CE=B5=CF=84?= =?UTF-8?Q?=CE=B1=CF=83=CF=84=CE=B9=CE=BA=CE=AE?=";
    assert_eq!(
        "Πρόσθετη εξεταστική",
        std::str::from_utf8(&phrase(words.trim(), false).unwrap().1).unwrap()
    );
    let words = b"[Advcomparch] =?utf-8?b?zqPPhc68z4DOtc+BzrnPhs6/z4HOrCDPg861IGZs?=\n\t=?utf-8?b?dXNoIM67z4zOs8+JIG1pc3ByZWRpY3Rpb24gzrrOsc+Ezqwgz4TOt869?=\n\t=?utf-8?b?IM61zrrPhM6tzrvOtc+Dzrcgc3RvcmU=?=";
    assert_eq!(
        "[Advcomparch] Συμπεριφορά σε flush λόγω misprediction κατά την εκτέλεση store",
        std::str::from_utf8(&phrase(words.trim(), false).unwrap().1).unwrap()
    );
    let words = b"sdf";
    assert_eq!(
        "sdf",
        std::str::from_utf8(&phrase(words, false).unwrap().1).unwrap()
    );
    let words = b"=?iso-8859-7?b?U2VnIGZhdWx0IPP05+0g5er03evl8+cg9O/1?= =?iso-8859-7?q?_example_ru_n_=5Fsniper?=";
    assert_eq!(
        "Seg fault στην εκτέλεση του example ru n _sniper",
        std::str::from_utf8(&phrase(words, false).unwrap().1).unwrap()
    );
    let words = b"Re: [Advcomparch]
 =?iso-8859-7?b?U2VnIGZhdWx0IPP05+0g5er03evl8+cg9O/1?=
 =?iso-8859-7?q?_example_ru_n_=5Fsniper?=";
    assert_eq!(
        "Re: [Advcomparch] Seg fault στην εκτέλεση του example ru n _sniper",
        std::str::from_utf8(&phrase(words, false).unwrap().1).unwrap()
    );

    let words = r#"=?UTF-8?Q?Re=3a_Climate_crisis_reality_check_=e2=80=93=c2=a0EcoHust?=
 =?UTF-8?Q?ler?="#;
    assert_eq!(
        "Re: Climate crisis reality check –\u{a0}EcoHustler",
        std::str::from_utf8(&phrase(words.as_bytes(), false).unwrap().1).unwrap()
    );

    let words = r#"Re: Climate crisis reality check =?windows-1250?B?lqBFY29IdXN0?=
 =?windows-1250?B?bGVy?="#;
    assert_eq!(
        "Re: Climate crisis reality check –\u{a0}EcoHustler",
        std::str::from_utf8(&phrase(words.as_bytes(), false).unwrap().1).unwrap()
    );

    let words = r#"=?gb18030?B?zNrRtsbz0rXTys/k19S2r9eqt6LR6dak08q8/g==?="#;
    assert_eq!(
        "腾讯企业邮箱自动转发验证邮件",
        std::str::from_utf8(&phrase(words.as_bytes(), false).unwrap().1).unwrap()
    );
}

#[test]
fn test_parser_address_list() {
    let s = b"Obit Oppidum <user@domain>,
            list <list@domain.tld>, list2 <list2@domain.tld>,
            Bobit Boppidum <user@otherdomain.com>, Cobit Coppidum <user2@otherdomain.com>, <user@domain.tld>";
    assert_eq!(
        (
            &s[0..0],
            smallvec::smallvec![
                make_address!("Obit Oppidum", "user@domain"),
                make_address!("list", "list@domain.tld"),
                make_address!("list2", "list2@domain.tld"),
                make_address!("Bobit Boppidum", "user@otherdomain.com"),
                make_address!("Cobit Coppidum", "user2@otherdomain.com"),
                make_address!("", "user@domain.tld")
            ]
        ),
        rfc2822address_list(s).unwrap()
    );
    let s = b"   ";
    assert!(rfc2822address_list(s).unwrap().1.is_empty());
}

#[test]
fn test_parser_addresses() {
    macro_rules! assert_parse {
        ($name:literal, $addr:literal, $raw:literal) => {{
            #[allow(clippy::string_lit_as_bytes)]
            let s = $raw.as_bytes();
            let r = address(s).unwrap().1;
            match r {
                Address::Mailbox(ref m) => {
                    assert_eq!(to_str!(m.display_name.display_bytes(&m.raw)), $name);
                    assert_eq!(to_str!(m.address_spec.display_bytes(&m.raw)), $addr);
                }
                _ => assert!(false),
            }
        }};
    }

    assert_parse!(
        "Σταύρος Μαλτέζος",
        "maltezos@central.ntua.gr",
        "=?iso-8859-7?B?0/Th/fHv8iDM4ev03ebv8g==?= <maltezos@central.ntua.gr>"
    );
    assert_parse!("", "user@domain", "user@domain");
    assert_parse!("", "user@domain", "<user@domain>");
    assert_parse!("", "user@domain", "  <user@domain>");
    assert_parse!("Name", "user@domain", "Name <user@domain>");
    assert_parse!(
        "",
        "julia@ficdep.minitrue",
        "julia(outer party)@ficdep.minitrue"
    );
    assert_parse!(
        "Winston Smith",
        "winston.smith@recdep.minitrue",
        "\"Winston Smith\" <winston.smith@recdep.minitrue> (Records Department)"
    );
    assert_parse!(
        "John Q. Public",
        "JQB@bar.com",
        "\"John Q. Public\" <JQB@bar.com>"
    );
    assert_parse!(
        "John Q. Public",
        "JQB@bar.com",
        "John \"Q.\" Public <JQB@bar.com>"
    );
    assert_parse!(
        "Jeffrey Stedfast",
        "fejj@helixcode.com",
        "Jeffrey Stedfast <fejj@helixcode.com>"
    );
    assert_parse!(
        "this is\ta folded name",
        "folded@name.com",
        "this is\n\ta folded name <folded@name.com>"
    );
    assert_parse!(
        "Jeffrey fejj Stedfast",
        "fejj@helixcode.com",
        "Jeffrey \"fejj\" Stedfast <fejj@helixcode.com>"
    );
    assert_parse!(
        "Jeffrey \"fejj\" Stedfast",
        "fejj@helixcode.com",
        "\"Jeffrey \\\"fejj\\\" Stedfast\" <fejj@helixcode.com>"
    );
    assert_parse!(
        "Stedfast, Jeffrey",
        "fejj@helixcode.com",
        "\"Stedfast, Jeffrey\" <fejj@helixcode.com>"
    );
    assert_parse!(
        "",
        "fejj@helixcode.com",
        "fejj@helixcode.com (Jeffrey Stedfast)"
    );
    assert_parse!(
        "Jeffrey Stedfast",
        "fejj@helixcode.com",
        "Jeffrey Stedfast <fejj(nonrecursive block)@helixcode.(and a comment here)com>"
    );
    assert_parse!(
        "Joe Q. Public",
        "john.q.public@example.com",
        "\"Joe Q. Public\" <john.q.public@example.com>"
    );
    assert_parse!("Mary Smith", "mary@x.test", "Mary Smith <mary@x.test>");
    assert_parse!("", "jdoe@example.org", "jdoe@example.org");
    assert_parse!("Who?", "one@y.test", "Who? <one@y.test>");
    assert_parse!("", "boss@nil.test", "<boss@nil.test>");
    assert_parse!(
        "Giant; \"Big\" Box",
        "sysservices@example.net",
        r#""Giant; \"Big\" Box" <sysservices@example.net>"#
    );
    assert_parse!(
        "John <middle> Doe",
        "jdoe@machine.example",
        "\"John <middle> Doe\" <jdoe@machine.example>"
    );
    // RFC 2047 "Q"-encoded ISO-8859-1 address.
    assert_parse!(
        "Jörg Doe",
        "joerg@example.com",
        "=?iso-8859-1?q?J=F6rg_Doe?= <joerg@example.com>"
    );
    // RFC 2047 "Q"-encoded US-ASCII address. Dumb but legal.
    assert_parse!(
        "Jorg Doe",
        "joerg@example.com",
        "=?us-ascii?q?J=6Frg_Doe?= <joerg@example.com>"
    );
    // RFC 2047 "Q"-encoded UTF-8 address.
    assert_parse!(
        "Jörg Doe",
        "joerg@example.com",
        "=?utf-8?q?J=C3=B6rg_Doe?= <joerg@example.com>"
    );
    // RFC 2047 "Q"-encoded UTF-8 address with multiple encoded-words.
    assert_parse!(
        "JörgDoe",
        "joerg@example.com",
        "=?utf-8?q?J=C3=B6rg?=  =?utf-8?q?Doe?= <joerg@example.com>"
    );
    assert_parse!(
        "André Pirard",
        "PIRARD@vm1.ulg.ac.be",
        "=?ISO-8859-1?Q?Andr=E9?= Pirard <PIRARD@vm1.ulg.ac.be>"
    );
    // Custom example of RFC 2047 "B"-encoded ISO-8859-1 address.
    assert_parse!(
        "Jörg",
        "joerg@example.com",
        "=?ISO-8859-1?B?SvZyZw==?= <joerg@example.com>"
    );
    // Custom example of RFC 2047 "B"-encoded UTF-8 address.
    assert_parse!(
        "Jörg",
        "joerg@example.com",
        "=?UTF-8?B?SsO2cmc=?= <joerg@example.com>"
    );
    assert_parse!(
        // RFC 6532 3.2.3, qtext /= UTF8-non-ascii
        "Gø Pher",
        "gopher@example.com",
        "\"Gø Pher\" <gopher@example.com>"
    );
    // RFC 6532 3.2, atext /= UTF8-non-ascii
    assert_parse!("µ", "micro@example.com", "µ <micro@example.com>");
    assert_parse!(
        "",
        "emptystring@example.com",
        "\"\" <emptystring@example.com>"
    );
    // CFWS
    assert_parse!(
        "",
        "cfws@example.com",
        "<cfws@example.com> (CFWS (cfws))  (another comment)"
    );
    assert_parse!(
        "Kristoffer Brånemyr",
        "ztion@swipenet.se",
        "=?iso-8859-1?q?Kristoffer_Br=E5nemyr?= <ztion@swipenet.se>"
    );
    assert_parse!(
        "François Pons",
        "fpons@mandrakesoft.com",
        "=?iso-8859-1?q?Fran=E7ois?= Pons <fpons@mandrakesoft.com>"
    );
    assert_parse!(
        "狂ったこの世で狂うなら気は確かだ。",
        "famous@quotes.ja",
        "狂ったこの世で狂うなら気は確かだ。 <famous@quotes.ja>"
    );
    assert_eq!(
        Address::new_group(
            "A Group".to_string(),
            vec![
                make_address!("Ed Jones", "c@a.test"),
                make_address!("", "joe@where.test"),
                make_address!("John", "jdoe@one.test")
            ]
        ),
        address(b"A Group:Ed Jones <c@a.test>,joe@where.test,John <jdoe@one.test>;")
            .unwrap()
            .1
    );
    assert_eq!(
        Address::new_group("Undisclosed recipients".to_string(), vec![]),
        address(b"Undisclosed recipients:;").unwrap().1
    );
}

#[test]
fn test_parser_quoted_printable() {
    let input = r#"<=21-- SEPARATOR  -->
   <tr>
    <td style=3D=22padding-left: 10px;padding-right: 10px;background-color:=
 =23f3f5fa;=22>
     <table width=3D=22100%=22 cellspacing=3D=220=22 cellpadding=3D=220=22 =
border=3D=220=22>
      <tr>
       <td style=3D=22height:5px;background-color: =23f3f5fa;=22>&nbsp;</td>
      </tr>
     </table>
    </td>
   </tr>"#;
    assert_eq!(
        quoted_printable_bytes(input.as_bytes())
            .as_ref()
            .map(|(_, b)| unsafe { std::str::from_utf8_unchecked(b) }),
        Ok(r#"<!-- SEPARATOR  -->
   <tr>
    <td style="padding-left: 10px;padding-right: 10px;background-color: #f3f5fa;">
     <table width="100%" cellspacing="0" cellpadding="0" border="0">
      <tr>
       <td style="height:5px;background-color: #f3f5fa;">&nbsp;</td>
      </tr>
     </table>
    </td>
   </tr>"#)
    );
    /* an illegal escape is passed through as a literal */
    assert_eq!(
        quoted_printable_bytes(b"100=% of it")
            .as_ref()
            .map(|(_, b)| b.as_slice()),
        Ok(&b"100=% of it"[..])
    );
}

#[test]
fn test_parser_msg_id() {
    let s = "Message-ID: <1234@local.machine.example>\r\n";
    let (rest, (_header_name, value)) = headers::header(s.as_bytes()).unwrap();
    assert!(rest.is_empty());
    let a = msg_id(value).unwrap().1;
    assert_eq!(a.val(), b"<1234@local.machine.example>");
    let s = "Message-ID:              <testabcd.1234@silly.test>\r\n";
    let (rest, (_header_name, value)) = headers::header(s.as_bytes()).unwrap();
    assert!(rest.is_empty());
    let b = msg_id(value).unwrap().1;
    assert_eq!(b.val(), b"<testabcd.1234@silly.test>");
    let s = "References: <1234@local.machine.example>\r\n";
    let (rest, (_header_name, value)) = headers::header(s.as_bytes()).unwrap();
    assert!(rest.is_empty());
    assert_eq!(&msg_id_list(value).unwrap().1, &[a.clone()]);
    let s = "References: <1234@local.machine.example> <3456@example.net>\r\n";
    let (rest, (_header_name, value)) = headers::header(s.as_bytes()).unwrap();
    assert!(rest.is_empty());
    let s = b"<3456@example.net>";
    let c = msg_id(s).unwrap().1;
    assert_eq!(&msg_id_list(value).unwrap().1, &[a, c]);
}

#[test]
fn test_parser_dates() {
    let s = b"Thu, 31 Aug 2017 13:43:37 +0000 (UTC)";
    let _s = b"Thu, 31 Aug 2017 13:43:37 +0000";
    let __s = b"=?utf-8?q?Thu=2C_31_Aug_2017_13=3A43=3A37_-0000?=";
    assert_eq!(rfc5322_date(s).unwrap(), rfc5322_date(_s).unwrap());
    assert_eq!(rfc5322_date(_s).unwrap(), rfc5322_date(__s).unwrap());
    let val = b"Fri, 23 Dec 0001 21:20:36 -0800 (PST)";
    assert_eq!(rfc5322_date(val).unwrap(), 0);
    let val = b"Wed Sep  9 00:27:54 2020";
    assert_eq!(rfc5322_date(val).unwrap(), 1599611274);
    /* named zone, RFC822 */
    assert_eq!(
        rfc5322_date(b"Wed, 8 Jan 2020 10:44:03 PST").unwrap(),
        rfc5322_date(b"Wed, 8 Jan 2020 10:44:03 -0800").unwrap()
    );
    /* two-digit year: 50..=99 is 1900+, 00..=49 is 2000+ */
    assert_eq!(
        rfc5322_date(b"1 Jan 70 00:00:00 +0000").unwrap(),
        rfc5322_date(b"1 Jan 1970 00:00:00 +0000").unwrap()
    );
    assert_eq!(
        rfc5322_date(b"1 Jan 20 00:00:00 +0000").unwrap(),
        rfc5322_date(b"1 Jan 2020 00:00:00 +0000").unwrap()
    );
    assert!(rfc5322_date(b"not a date at all").is_err());
}

#[test]
fn test_parser_encoded_word_with_escaped_marker() {
    /* "=?" inside the encoded text must not terminate the token early */
    assert_eq!(
        "a=?b",
        std::str::from_utf8(&phrase(b"=?utf-8?q?a=3D=3Fb?=", false).unwrap().1).unwrap()
    );
    /* an undecodable token is kept raw */
    assert_eq!(
        "=?bogus-charset-tag?x?zzzz?=",
        std::str::from_utf8(
            &phrase(b"=?bogus-charset-tag?x?zzzz?=", false).unwrap().1
        )
        .unwrap()
    );
}

#[test]
fn test_parser_comment() {
    let s = b"(recursive (comment) block)";
    assert_eq!(comment(s), Ok((&b""[..], ())));
}

#[test]
fn test_parser_unstructured() {
    let s = r#"This
 is a test"#;
    assert_eq!(&unstructured(s.as_bytes()).unwrap(), "This is a test",);
    let s = "this is\n\ta folded name";
    assert_eq!(
        &unstructured(s.as_bytes()).unwrap(),
        "this is\ta folded name",
    );
}

#[test]
fn test_parser_phrase2() {
    let s = b"\"Jeffrey \\\"fejj\\\" Stedfast\"";
    assert_eq!(to_str!(&phrase2(s).unwrap().1), "Jeffrey \"fejj\" Stedfast");
}

#[test]
fn test_parser_headers() {
    let s = "Subject: hello\r\nTo: you@example.com\r\n\r\nbody here\r\n";
    let (rest, (fields, body)) = headers::mail(s.as_bytes()).unwrap();
    assert!(rest.is_empty());
    assert_eq!(fields.len(), 2);
    assert_eq!(fields[0], (&b"Subject"[..], &b"hello"[..]));
    assert_eq!(body, b"body here\r\n");

    /* bare LF line terminators are accepted */
    let s = "Subject: hello\nTo: you@example.com\n\nbody here\n";
    let (_, (fields, body)) = headers::mail(s.as_bytes()).unwrap();
    assert_eq!(fields.len(), 2);
    assert_eq!(body, b"body here\n");

    /* lines without a name/colon split are dropped */
    let s = "Subject: hello\nthis line is junk\nTo: you@example.com\n\nbody";
    let (_, (fields, _)) = headers::mail(s.as_bytes()).unwrap();
    assert_eq!(fields.len(), 2);
    assert_eq!(fields[1].0, b"To");

    /* no parseable header at all is an error */
    assert!(headers::headers(b"safd ffsadfa asfd ").is_err());

    /* a field may span many folded continuation lines */
    let s = "X-Spam-Report: a\r\n b\r\n c\r\n d\r\n e\r\n f\r\n g\r\n h\r\n i\r\n j\r\n k\r\n l\r\n\r\n";
    let (_, (fields, _)) = headers::mail(s.as_bytes()).unwrap();
    assert_eq!(fields.len(), 1);
    assert_eq!(
        unstructured(fields[0].1).unwrap(),
        "a b c d e f g h i j k l"
    );
}

#[test]
fn test_parser_content_type() {
    let (rest, (ct, cst, params)) =
        content_type(b"multipart/mixed; charset=\"utf-8\"; boundary=\"bzz_bzz__bzz__\"").unwrap();
    assert!(rest.is_empty());
    assert_eq!(ct, b"multipart");
    assert_eq!(cst, b"mixed");
    assert_eq!(params.len(), 2);
    assert_eq!(params[0], (&b"charset"[..], &b"utf-8"[..]));
    assert_eq!(params[1], (&b"boundary"[..], &b"bzz_bzz__bzz__"[..]));

    let (_, (ct, cst, params)) = content_type(b"image/gif; name=test_image.gif").unwrap();
    assert_eq!(ct, b"image");
    assert_eq!(cst, b"gif");
    assert_eq!(params, vec![(&b"name"[..], &b"test_image.gif"[..])]);
}

#[test]
fn test_parser_rfc2231_parameters() {
    /* the RFC2231 example: continuations with mixed extended segments */
    let (_, (_, _, params)) = content_type(
        b"application/x-stuff; title*0*=us-ascii'en'This%20is%20even%20more%20; \
          title*1*=%2A%2A%2Afun%2A%2A%2A%20; title*2=\"isn't it!\"",
    )
    .unwrap();
    let merged = rfc2231_parameters(&params);
    assert_eq!(merged.len(), 1);
    assert_eq!(merged[0].0, b"title".to_vec());
    assert_eq!(
        String::from_utf8_lossy(&merged[0].1),
        "This is even more ***fun*** isn't it!"
    );

    /* charset-tagged single extended value */
    let (_, (_, _, params)) =
        content_type(b"application/x-stuff; title*=iso-8859-1'en'%A3%20rates").unwrap();
    let merged = rfc2231_parameters(&params);
    assert_eq!(String::from_utf8_lossy(&merged[0].1), "£ rates");

    /* four plain continuation segments */
    let (_, (_, _, params)) = content_type(
        b"message/external-body; access-type=URL; url*0=\"ftp://\"; url*1=\"cs.utk.edu/pub/\"; \
          url*2=\"moore/bulk-mailer/\"; url*3=\"bulk-mailer.tar\"",
    )
    .unwrap();
    let merged = rfc2231_parameters(&params);
    assert_eq!(merged.len(), 2);
    assert_eq!(merged[0].0, b"access-type".to_vec());
    assert_eq!(
        String::from_utf8_lossy(&merged[1].1),
        "ftp://cs.utk.edu/pub/moore/bulk-mailer/bulk-mailer.tar"
    );
}

#[test]
fn test_parser_content_disposition() {
    let (_, cd) = content_disposition(
        b"attachment; filename=genome.jpeg; modification-date=\"Wed, 12 Feb 1997 16:29:51 -0500\"",
    )
    .unwrap();
    assert!(cd.kind.is_attachment());
    assert_eq!(cd.filename.as_deref(), Some("genome.jpeg"));
    assert_eq!(
        cd.modification_date.as_deref(),
        Some("Wed, 12 Feb 1997 16:29:51 -0500")
    );
    let (_, cd) = content_disposition(b"inline").unwrap();
    assert!(cd.kind.is_inline());
    /* RFC2231 encoded filename */
    let (_, cd) =
        content_disposition(b"attachment; filename*=utf-8''%CE%B1%CF%81%CF%87%CE%B5%CE%AF%CE%BF")
            .unwrap();
    assert_eq!(cd.filename.as_deref(), Some("αρχείο"));
}

#[test]
fn test_parser_multipart_sections() {
    let body = b"This is the preamble.\r\n\
--simple boundary\r\n\
Content-Type: text/plain; charset=us-ascii\r\n\
\r\n\
First part.\r\n\
--simple boundary\r\n\
\r\n\
Second part.\r\n\
--simple boundary--\r\n\
This is the epilogue.\r\n";
    let sections = multipart_sections(body, b"simple boundary");
    assert!(sections.terminated);
    assert_eq!(
        sections.preamble.display_bytes(body),
        b"This is the preamble."
    );
    assert_eq!(sections.parts.len(), 2);
    assert_eq!(
        sections.parts[0].display_bytes(body),
        b"Content-Type: text/plain; charset=us-ascii\r\n\r\nFirst part."
    );
    assert_eq!(sections.parts[1].display_bytes(body), b"\r\nSecond part.");
    assert_eq!(
        sections.epilogue.display_bytes(body),
        b"This is the epilogue.\r\n"
    );

    /* a missing closing delimiter keeps the parts found so far */
    let body = b"--b\r\n\r\nonly part\r\nno closing delimiter";
    let sections = multipart_sections(body, b"b");
    assert!(!sections.terminated);
    assert_eq!(sections.parts.len(), 1);
    assert_eq!(
        sections.parts[0].display_bytes(body),
        b"\r\nonly part\r\nno closing delimiter"
    );
    assert_eq!(sections.epilogue.length, 0);

    /* no delimiter at all: everything is preamble */
    let body = b"there is no boundary here";
    let sections = multipart_sections(body, b"b1_");
    assert!(sections.parts.is_empty());
    assert_eq!(sections.preamble.display_bytes(body), body);

    /* a part whose every line begins with dashes does not confuse the
     * scanner */
    let body = b"--b\r\n\r\n--not the boundary\r\n--still not\r\n--b--\r\n";
    let sections = multipart_sections(body, b"b");
    assert!(sections.terminated);
    assert_eq!(sections.parts.len(), 1);
    assert_eq!(
        sections.parts[0].display_bytes(body),
        b"\r\n--not the boundary\r\n--still not"
    );
}

#[test]
fn test_parser_bytes_ext() {
    assert_eq!(b"  hello  ".trim(), b"hello");
    assert_eq!(b"\t\r\nhello".ltrim(), b"hello");
    assert_eq!(b"hello\r\n\t".rtrim(), b"hello");
    assert_eq!(b"hello world".find(b"world"), Some(6));
    assert_eq!(b"hello world".find(b"worlds"), None);
    assert!(b"\"quoted\"".is_quoted());
}
