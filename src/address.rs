/*
 * mimelib - addresses
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

//! E-mail addresses. Parsing functions are in
//! [`parser::address`](crate::parser::address).

use std::{collections::HashSet, convert::TryFrom, hash::{Hash, Hasher}};

use crate::{
    error::{Error, Result},
    parser,
    parser::BytesExt,
};

/// A named list of mailboxes, e.g. `undisclosed-recipients:;`.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct GroupAddress {
    pub raw: Vec<u8>,
    pub display_name: StrBuilder,
    pub mailbox_list: Vec<Address>,
}

/// Container for a single mailbox.
///
/// ```text
/// >           raw: Vec<u8>
/// > ┌──────────┴────────────┐
/// > Name <address@domain.tld>
/// > └─┬┘  └──────────┬─────┘
/// > display_name     │
/// >                  │
/// >            address_spec
/// ```
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct MailboxAddress {
    pub raw: Vec<u8>,
    pub display_name: StrBuilder,
    pub address_spec: StrBuilder,
}

impl Eq for MailboxAddress {}

impl PartialEq for MailboxAddress {
    fn eq(&self, other: &Self) -> bool {
        self.address_spec.display_bytes(&self.raw) == other.address_spec.display_bytes(&other.raw)
    }
}

/// An email address.
///
/// Conforms to [RFC5322 - Internet Message Format](https://tools.ietf.org/html/rfc5322).
///
/// # Creating an `Address`
///
/// You can directly create an address with `Address::new`,
///
/// ```rust
/// # use mimelib::Address;
/// let addr = Address::new(Some("Jörg Doe".to_string()), "joerg@example.com".to_string());
/// assert_eq!(addr.to_string().as_str(), "Jörg Doe <joerg@example.com>");
/// ```
///
/// or parse it from a raw value:
///
/// ```rust
/// let (rest_bytes, addr) = mimelib::parser::address::address(
///     "=?utf-8?q?J=C3=B6rg_Doe?= <joerg@example.com>".as_bytes(),
/// )
/// .unwrap();
/// assert!(rest_bytes.is_empty());
/// assert_eq!(addr.get_display_name(), Some("Jörg Doe".to_string()));
/// assert_eq!(addr.get_email(), "joerg@example.com".to_string());
/// ```
#[derive(Clone, Deserialize, Serialize)]
pub enum Address {
    Mailbox(MailboxAddress),
    Group(GroupAddress),
}

impl Address {
    pub fn new(display_name: Option<String>, address: String) -> Self {
        Self::Mailbox(if let Some(d) = display_name {
            MailboxAddress {
                raw: format!("{} <{}>", d, address).into_bytes(),
                display_name: StrBuilder {
                    offset: 0,
                    length: d.len(),
                },
                address_spec: StrBuilder {
                    offset: d.len() + 2,
                    length: address.len(),
                },
            }
        } else {
            MailboxAddress {
                raw: address.clone().into_bytes(),
                display_name: StrBuilder {
                    offset: 0,
                    length: 0,
                },
                address_spec: StrBuilder {
                    offset: 0,
                    length: address.len(),
                },
            }
        })
    }

    pub fn new_group(display_name: String, mailbox_list: Vec<Self>) -> Self {
        Self::Group(GroupAddress {
            raw: format!(
                "{}:{};",
                display_name,
                mailbox_list
                    .iter()
                    .map(|a| a.to_string())
                    .collect::<Vec<String>>()
                    .join(",")
            )
            .into_bytes(),
            display_name: StrBuilder {
                offset: 0,
                length: display_name.len(),
            },
            mailbox_list,
        })
    }

    pub fn raw(&self) -> &[u8] {
        match self {
            Self::Mailbox(m) => m.raw.as_slice(),
            Self::Group(g) => g.raw.as_slice(),
        }
    }

    /// Get the display name of this address.
    ///
    /// If it's a group, it's the name of the group. Otherwise it's the
    /// `display_name` part of the mailbox.
    pub fn get_display_name(&self) -> Option<String> {
        let ret = match self {
            Self::Mailbox(m) => m.display_name.display(&m.raw),
            Self::Group(g) => g.display_name.display(&g.raw),
        };
        if ret.is_empty() {
            None
        } else {
            Some(ret)
        }
    }

    /// Get the address spec part of this address. A group returns an empty
    /// `String`.
    pub fn get_email(&self) -> String {
        match self {
            Self::Mailbox(m) => m.address_spec.display(&m.raw),
            Self::Group(_) => String::new(),
        }
    }

    pub fn address_spec_raw(&self) -> &[u8] {
        match self {
            Self::Mailbox(m) => m.address_spec.display_bytes(&m.raw),
            Self::Group(g) => &g.raw,
        }
    }

    /// The domain part of the address spec, if any.
    pub fn get_fqdn(&self) -> Option<String> {
        match self {
            Self::Mailbox(m) => {
                let raw_address = m.address_spec.display_bytes(&m.raw);
                let fqdn_pos = raw_address.iter().position(|&b| b == b'@')? + 1;
                Some(String::from_utf8_lossy(&raw_address[fqdn_pos..]).into())
            }
            Self::Group(_) => None,
        }
    }

    pub fn list_try_from(val: &str) -> Result<Vec<Self>> {
        Ok(parser::address::rfc2822address_list(val.as_bytes())
            .map_err(Error::from)?
            .1
            .to_vec())
    }
}

impl Eq for Address {}

impl PartialEq for Address {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Mailbox(_), Self::Group(_)) | (Self::Group(_), Self::Mailbox(_)) => false,
            (Self::Mailbox(s), Self::Mailbox(o)) => s == o,
            (Self::Group(s), Self::Group(o)) => {
                s.display_name.display_bytes(&s.raw) == o.display_name.display_bytes(&o.raw)
                    && s.mailbox_list.iter().collect::<HashSet<_>>()
                        == o.mailbox_list.iter().collect::<HashSet<_>>()
            }
        }
    }
}

impl Hash for Address {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Self::Mailbox(s) => {
                s.address_spec.display_bytes(&s.raw).hash(state);
            }
            Self::Group(s) => {
                s.display_name.display_bytes(&s.raw).hash(state);
                for sub in &s.mailbox_list {
                    sub.hash(state);
                }
            }
        }
    }
}

impl core::fmt::Display for Address {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        match self {
            Self::Mailbox(m) if m.display_name.length > 0 => {
                let name = m.display_name.display(&m.raw);
                if name.as_bytes().iter().any(|b| {
                    !(b.is_ascii_alphanumeric() || b" .-_'".contains(b) || *b > 0x7f)
                }) {
                    write!(
                        f,
                        "\"{}\" <{}>",
                        name.replace('\\', "\\\\").replace('"', "\\\""),
                        m.address_spec.display(&m.raw)
                    )
                } else {
                    write!(f, "{} <{}>", name, m.address_spec.display(&m.raw))
                }
            }
            Self::Group(g) => {
                let mailbox_strings: Vec<String> =
                    g.mailbox_list.iter().map(|a| a.to_string()).collect();
                write!(
                    f,
                    "{}: {};",
                    g.display_name.display(&g.raw),
                    mailbox_strings.join(", ")
                )
            }
            Self::Mailbox(m) => write!(f, "{}", m.address_spec.display(&m.raw)),
        }
    }
}

impl core::fmt::Debug for Address {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        match self {
            Self::Mailbox(m) => f
                .debug_struct("Address::Mailbox")
                .field("display_name", &m.display_name.display(&m.raw))
                .field("address_spec", &m.address_spec.display(&m.raw))
                .finish(),
            Self::Group(g) => {
                let mailbox_strings: Vec<String> =
                    g.mailbox_list.iter().map(|a| a.to_string()).collect();

                f.debug_struct("Address::Group")
                    .field("display_name", &g.display_name.display(&g.raw))
                    .field("addresses", &mailbox_strings.join(", "))
                    .finish()
            }
        }
    }
}

impl TryFrom<&str> for Address {
    type Error = Error;

    fn try_from(val: &str) -> Result<Self> {
        Ok(parser::address::address(val.as_bytes())
            .map_err(Error::from)?
            .1)
    }
}

/// Helper struct to return slices from a struct field on demand.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct StrBuilder {
    pub offset: usize,
    pub length: usize,
}

/// Structs implementing this trait must contain a `StrBuilder` field.
pub trait StrBuild {
    /// Create a new `Self` out of a string and a slice
    fn new(string: &[u8], slice: &[u8]) -> Self;
    /// Get the slice part of the string
    fn raw(&self) -> &[u8];
    /// Get the entire string as a slice
    fn val(&self) -> &[u8];
}

impl StrBuilder {
    pub fn display(&self, s: &[u8]) -> String {
        String::from_utf8_lossy(self.display_bytes(s)).to_string()
    }

    pub fn display_bytes<'a>(&self, b: &'a [u8]) -> &'a [u8] {
        &b[self.offset..(self.offset + self.length)]
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }
}

/// `MessageID` is accessed through the [`StrBuild`] trait: `val()` is the
/// full `<id@domain>` token, `raw()` the identifier between the angle
/// brackets.
#[derive(Clone, Default, Deserialize, Serialize)]
pub struct MessageID(pub Vec<u8>, pub StrBuilder);

impl StrBuild for MessageID {
    fn new(string: &[u8], slice: &[u8]) -> Self {
        let offset = string.find(slice).unwrap_or(0);
        Self(
            string.to_owned(),
            StrBuilder {
                offset,
                length: slice.len() + 1,
            },
        )
    }

    fn raw(&self) -> &[u8] {
        let offset = self.1.offset;
        let length = self.1.length;
        &self.0[offset..offset + length.saturating_sub(1)]
    }

    fn val(&self) -> &[u8] {
        &self.0
    }
}

impl core::fmt::Display for MessageID {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(self.val()))
    }
}

impl PartialEq for MessageID {
    fn eq(&self, other: &Self) -> bool {
        self.raw() == other.raw()
    }
}

impl Eq for MessageID {}

impl core::fmt::Debug for MessageID {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(self.raw()))
    }
}

/// The value of a `References` header: the raw value plus the parsed
/// sequence of message ids.
#[derive(Clone, Deserialize, Serialize)]
pub struct References {
    pub raw: Vec<u8>,
    pub refs: Vec<MessageID>,
}

impl core::fmt::Debug for References {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "{:#?}", self.refs)
    }
}

#[macro_export]
macro_rules! make_address {
    ($d:expr, $a:expr) => {
        $crate::address::Address::Mailbox(if $d.is_empty() {
            $crate::address::MailboxAddress {
                raw: $a.to_string().into_bytes(),
                display_name: $crate::address::StrBuilder {
                    offset: 0,
                    length: 0,
                },
                address_spec: $crate::address::StrBuilder {
                    offset: 0,
                    length: $a.len(),
                },
            }
        } else {
            $crate::address::MailboxAddress {
                raw: format!("{} <{}>", $d, $a).into_bytes(),
                display_name: $crate::address::StrBuilder {
                    offset: 0,
                    length: $d.len(),
                },
                address_spec: $crate::address::StrBuilder {
                    offset: $d.len() + 2,
                    length: $a.len(),
                },
            }
        })
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_strbuilder() {
        let m_id = b"<20170825132332.6734-1@mail.example.gr>";
        let (_, val) = parser::address::msg_id(m_id).unwrap();
        assert_eq!(
            val,
            MessageID(
                m_id.to_vec(),
                StrBuilder {
                    offset: 1,
                    length: 38,
                }
            )
        );
    }

    #[test]
    fn test_address_display() {
        assert_eq!(
            &make_address!("Name Name2", "address@domain.tld").to_string(),
            "Name Name2 <address@domain.tld>"
        );
        assert_eq!(
            &make_address!("", "address@domain.tld").to_string(),
            "address@domain.tld"
        );
        assert_eq!(
            &make_address!("Name, Comma", "address@domain.tld").to_string(),
            "\"Name, Comma\" <address@domain.tld>"
        );
        assert_eq!(
            &Address::new_group(
                "A Group".to_string(),
                vec![
                    make_address!("Ed Jones", "c@a.test"),
                    make_address!("", "joe@where.test"),
                ]
            )
            .to_string(),
            "A Group: Ed Jones <c@a.test>, joe@where.test;"
        );
    }
}
