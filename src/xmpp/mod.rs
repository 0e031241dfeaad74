/*
** This file is a part of Iksemel (XML parser for Jabber/XMPP)
** Copyright (C) 2000-2025 Gurer Ozen
**
** Iksemel is free software: you can redistribute it and/or modify it
** under the terms of the GNU Lesser General Public License as
** published by the Free Software Foundation, either version 3 of
** the License, or (at your option) any later version.
*/

mod component;
mod config;
pub(crate) mod constants;
mod dispatcher;
mod error;
mod jid;
mod service;
mod stanza;
mod stream;

pub use component::Component;
pub use component::ComponentHandle;
pub use config::ComponentConfig;
pub use config::ComponentConfigBuilder;
pub use config::ConfigError;
pub use dispatcher::Dispatcher;
pub use dispatcher::IqError;
pub use dispatcher::IqFuture;
pub use error::ComponentError;
pub use jid::BadJid;
pub use jid::Jid;
pub use service::ComponentService;
pub use stanza::Condition;
pub use stanza::ErrorType;
pub use stanza::Iq;
pub use stanza::IqType;
pub use stanza::Message;
pub use stanza::MessageType;
pub use stanza::Presence;
pub use stanza::PresenceType;
pub use stanza::Show;
pub use stanza::Stanza;
pub use stanza::StanzaError;
pub use stream::ComponentStream;
pub use stream::StreamError;
pub use stream::StreamEvent;
pub use stream::StreamStatus;
pub use stream::handshake;
