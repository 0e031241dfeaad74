/*
** This file is a part of Iksemel (XML parser for Jabber/XMPP)
** Copyright (C) 2000-2025 Gurer Ozen
**
** Iksemel is free software: you can redistribute it and/or modify it
** under the terms of the GNU Lesser General Public License as
** published by the Free Software Foundation, either version 3 of
** the License, or (at your option) any later version.
*/

use crate::Element;

use super::StanzaError;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum IqType {
    Get,
    Set,
    Result,
    Error,
}

impl IqType {
    pub fn as_str(&self) -> &'static str {
        match self {
            IqType::Get => "get",
            IqType::Set => "set",
            IqType::Result => "result",
            IqType::Error => "error",
        }
    }

    pub fn parse(s: &str) -> Option<IqType> {
        match s {
            "get" => Some(IqType::Get),
            "set" => Some(IqType::Set),
            "result" => Some(IqType::Result),
            "error" => Some(IqType::Error),
            _ => None,
        }
    }
}

/// Info/query stanza.
///
/// Requests (`get` and `set`) must be answered with exactly one response
/// (`result` or `error`) carrying the same id.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Iq {
    xml: Element,
}

stanza_common!(Iq, "iq");

impl Iq {
    pub fn new(iq_type: IqType) -> Iq {
        let mut iq = Iq {
            xml: Element::new(Self::TAG),
        };
        iq.set_iq_type(iq_type);
        iq
    }

    /// `None` when the type is missing or unknown.
    pub fn iq_type(&self) -> Option<IqType> {
        self.xml.attribute("type").and_then(IqType::parse)
    }

    pub fn set_iq_type(&mut self, iq_type: IqType) {
        self.xml.set_attribute("type", Some(iq_type.as_str()));
    }

    pub fn is_request(&self) -> bool {
        matches!(self.iq_type(), Some(IqType::Get | IqType::Set))
    }

    pub fn is_response(&self) -> bool {
        matches!(self.iq_type(), Some(IqType::Result | IqType::Error))
    }

    pub fn query(&self, namespace: &str) -> Option<&Element> {
        self.extension("query", namespace)
    }

    pub fn add_query(&mut self, namespace: &str) -> &mut Element {
        self.add_extension("query", namespace)
    }

    fn reply(&self, iq_type: IqType) -> Iq {
        let mut reply = Iq::new(iq_type);
        reply.set_id(self.id());
        reply.xml.set_attribute("to", self.xml.attribute("from"));
        reply.xml.set_attribute("from", self.xml.attribute("to"));
        reply
    }

    /// An empty `result` addressed back to the sender of this request.
    pub fn result_reply(&self) -> Iq {
        self.reply(IqType::Result)
    }

    /// An `error` response to this request, carrying the request payload.
    pub fn error_reply(&self, error: &StanzaError) -> Iq {
        let mut reply = self.reply(IqType::Error);
        for child in self.xml.children() {
            reply.xml.append_child(child);
        }
        reply.xml.push_child(error.to_element());
        reply
    }
}
