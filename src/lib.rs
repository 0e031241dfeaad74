/*
** This file is a part of Iksemel (XML parser for Jabber/XMPP)
** Copyright (C) 2000-2025 Gurer Ozen
**
** Iksemel is free software: you can redistribute it and/or modify it
** under the terms of the GNU Lesser General Public License as
** published by the Free Software Foundation, either version 3 of
** the License, or (at your option) any later version.
*/

//! Runtime for XMPP external components (XEP-0114).
//!
//! The crate is layered from the bytes up: a push [SaxParser], an
//! [XmlFramer] turning its output into namespace resolved [XmlEvent]s, an
//! [ElementAssembler] building the stanzas of a never ending stream, and
//! the [ComponentStream] protocol state machine. [ComponentService] runs a
//! [Component] over a TCP connection on top of all that.

mod assembler;
mod element;
mod entities;
mod framer;
mod parser;
mod xmpp;

pub use parser::Location;
pub use parser::SaxElement;
pub use parser::SaxError;
pub use parser::SaxHandler;
pub use parser::SaxParser;

pub use framer::QName;
pub use framer::StartElement;
pub use framer::XML_NS;
pub use framer::XmlEvent;
pub use framer::XmlFramer;

pub use assembler::ElementAssembler;
pub use assembler::StreamItem;

pub use element::ANY;
pub use element::Attributes;
pub use element::Children;
pub use element::Cursor;
pub use element::Element;
pub use element::ElementError;
pub use element::ElementParser;
pub use element::HasXml;
pub use element::Node;
pub use element::XmlBuilder;

pub use xmpp::Component;
pub use xmpp::ComponentHandle;
pub use xmpp::ComponentConfig;
pub use xmpp::ComponentConfigBuilder;
pub use xmpp::ConfigError;
pub use xmpp::Dispatcher;
pub use xmpp::IqError;
pub use xmpp::IqFuture;
pub use xmpp::ComponentError;
pub use xmpp::BadJid;
pub use xmpp::Jid;
pub use xmpp::ComponentService;
pub use xmpp::Condition;
pub use xmpp::ErrorType;
pub use xmpp::Iq;
pub use xmpp::IqType;
pub use xmpp::Message;
pub use xmpp::MessageType;
pub use xmpp::Presence;
pub use xmpp::PresenceType;
pub use xmpp::Show;
pub use xmpp::Stanza;
pub use xmpp::StanzaError;
pub use xmpp::ComponentStream;
pub use xmpp::StreamError;
pub use xmpp::StreamEvent;
pub use xmpp::StreamStatus;
pub use xmpp::handshake;

pub use xmpp::constants::COMPONENT_PORT;
pub use xmpp::constants::ns;

/// Version of the crate, as reported by the demo component.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
