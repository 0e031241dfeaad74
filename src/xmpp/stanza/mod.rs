/*
** This file is a part of Iksemel (XML parser for Jabber/XMPP)
** Copyright (C) 2000-2025 Gurer Ozen
**
** Iksemel is free software: you can redistribute it and/or modify it
** under the terms of the GNU Lesser General Public License as
** published by the Free Software Foundation, either version 3 of
** the License, or (at your option) any later version.
*/

//! Typed views over the three XMPP stanza kinds.
//!
//! Each stanza type owns its [Element] and offers typed accessors for the
//! attributes and children defined by RFC 6120. Anything else can still be
//! reached through the underlying element.

macro_rules! stanza_common {
    ($type:ident, $tag:literal) => {
        impl $type {
            pub const TAG: &'static str = $tag;

            pub fn id(&self) -> Option<&str> {
                self.xml.attribute("id")
            }

            pub fn set_id(&mut self, id: Option<&str>) {
                self.xml.set_attribute("id", id);
            }

            /// Sender address, `None` when missing or not a valid JID.
            pub fn from(&self) -> Option<$crate::Jid> {
                self.xml
                    .attribute("from")
                    .and_then(|jid| $crate::Jid::new(jid).ok())
            }

            pub fn set_from(&mut self, jid: Option<&$crate::Jid>) {
                self.xml.set_attribute("from", jid.map($crate::Jid::as_str));
            }

            /// Recipient address, `None` when missing or not a valid JID.
            pub fn to(&self) -> Option<$crate::Jid> {
                self.xml
                    .attribute("to")
                    .and_then(|jid| $crate::Jid::new(jid).ok())
            }

            pub fn set_to(&mut self, jid: Option<&$crate::Jid>) {
                self.xml.set_attribute("to", jid.map($crate::Jid::as_str));
            }

            /// The error payload of an `error` typed stanza.
            pub fn error(&self) -> Option<$crate::xmpp::stanza::StanzaError> {
                if self.xml.attribute("type") != Some("error") {
                    return None;
                }
                $crate::xmpp::stanza::StanzaError::from_stanza(&self.xml)
            }

            pub fn extension(&self, name: &str, namespace: &str) -> Option<&$crate::Element> {
                self.xml.first_child(name, namespace)
            }

            pub fn extension_mut(
                &mut self,
                name: &str,
                namespace: &str,
            ) -> Option<&mut $crate::Element> {
                self.xml.first_child_mut(name, namespace)
            }

            pub fn add_extension(&mut self, name: &str, namespace: &str) -> &mut $crate::Element {
                self.xml.add_child_ns(name, namespace)
            }

            pub fn xml_mut(&mut self) -> &mut $crate::Element {
                &mut self.xml
            }

            pub fn into_element(self) -> $crate::Element {
                self.xml
            }
        }

        impl $crate::HasXml for $type {
            fn xml(&self) -> &$crate::Element {
                &self.xml
            }
        }

        impl std::fmt::Display for $type {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                std::fmt::Display::fmt(&self.xml, f)
            }
        }

        impl TryFrom<$crate::Element> for $type {
            type Error = $crate::Element;

            fn try_from(xml: $crate::Element) -> Result<Self, Self::Error> {
                if xml.name() == $type::TAG && xml.prefix().is_none() {
                    Ok($type { xml })
                } else {
                    Err(xml)
                }
            }
        }

        impl From<$type> for $crate::Element {
            fn from(stanza: $type) -> Self {
                stanza.xml
            }
        }

        impl From<$type> for $crate::xmpp::stanza::Stanza {
            fn from(stanza: $type) -> Self {
                $crate::xmpp::stanza::Stanza::$type(stanza)
            }
        }
    };
}

mod error;
mod iq;
mod message;
mod presence;

use std::fmt::Display;

use crate::Element;
use crate::HasXml;

pub use error::Condition;
pub use error::ErrorType;
pub use error::StanzaError;
pub use iq::Iq;
pub use iq::IqType;
pub use message::Message;
pub use message::MessageType;
pub use presence::Presence;
pub use presence::PresenceType;
pub use presence::Show;

/// Any of the top level elements exchanged after authentication.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Stanza {
    Message(Message),
    Presence(Presence),
    Iq(Iq),
}

impl Stanza {
    /// Wraps an element into the matching stanza type.
    ///
    /// Elements which are not stanzas are given back untouched.
    pub fn from_element(xml: Element) -> Result<Stanza, Element> {
        match xml.name() {
            Message::TAG => Message::try_from(xml).map(Stanza::Message),
            Presence::TAG => Presence::try_from(xml).map(Stanza::Presence),
            Iq::TAG => Iq::try_from(xml).map(Stanza::Iq),
            _ => Err(xml),
        }
    }

    pub fn id(&self) -> Option<&str> {
        match self {
            Stanza::Message(message) => message.id(),
            Stanza::Presence(presence) => presence.id(),
            Stanza::Iq(iq) => iq.id(),
        }
    }

    /// Tag name of the stanza.
    pub fn name(&self) -> &'static str {
        match self {
            Stanza::Message(_) => Message::TAG,
            Stanza::Presence(_) => Presence::TAG,
            Stanza::Iq(_) => Iq::TAG,
        }
    }

    pub fn into_element(self) -> Element {
        match self {
            Stanza::Message(message) => message.into_element(),
            Stanza::Presence(presence) => presence.into_element(),
            Stanza::Iq(iq) => iq.into_element(),
        }
    }
}

impl TryFrom<Element> for Stanza {
    type Error = Element;

    fn try_from(xml: Element) -> Result<Self, Self::Error> {
        Stanza::from_element(xml)
    }
}

impl HasXml for Stanza {
    fn xml(&self) -> &Element {
        match self {
            Stanza::Message(message) => message.xml(),
            Stanza::Presence(presence) => presence.xml(),
            Stanza::Iq(iq) => iq.xml(),
        }
    }
}

impl Display for Stanza {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self.xml(), f)
    }
}

#[cfg(test)]
mod tests;
