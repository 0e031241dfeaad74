/*
** This file is a part of Iksemel (XML parser for Jabber/XMPP)
** Copyright (C) 2000-2025 Gurer Ozen
**
** Iksemel is free software: you can redistribute it and/or modify it
** under the terms of the GNU Lesser General Public License as
** published by the Free Software Foundation, either version 3 of
** the License, or (at your option) any later version.
*/

pub const COMPONENT_PORT: u16 = 5347;

pub const STREAM_TAG: &str = "stream:stream";

pub const STREAM_CLOSE: &str = "</stream:stream>";

pub const HANDSHAKE_TAG: &str = "handshake";

pub const ERROR_TAG: &str = "error";

pub mod ns {
    pub const STREAM: &str = "http://etherx.jabber.org/streams";

    pub const COMPONENT_ACCEPT: &str = "jabber:component:accept";

    pub const STREAM_ERRORS: &str = "urn:ietf:params:xml:ns:xmpp-streams";

    pub const STANZA_ERRORS: &str = "urn:ietf:params:xml:ns:xmpp-stanzas";

    pub const DISCO_INFO: &str = "http://jabber.org/protocol/disco#info";

    pub const VERSION: &str = "jabber:iq:version";

    pub const PING: &str = "urn:xmpp:ping";
}
