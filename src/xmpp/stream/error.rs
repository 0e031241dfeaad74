/*
** This file is a part of Iksemel (XML parser for Jabber/XMPP)
** Copyright (C) 2000-2025 Gurer Ozen
**
** Iksemel is free software: you can redistribute it and/or modify it
** under the terms of the GNU Lesser General Public License as
** published by the Free Software Foundation, either version 3 of
** the License, or (at your option) any later version.
*/

use thiserror::Error;

use crate::SaxError;

/// Errors which end a component stream.
///
/// The stream is disconnected when any of these is returned.
#[derive(Debug, Eq, PartialEq, Clone, Error)]
pub enum StreamError {
    /// The peer sent malformed XML.
    #[error("invalid xml in stream: {0}")]
    BadXml(#[from] SaxError),

    /// The peer broke the stream protocol.
    #[error("invalid stream protocol: {0}")]
    BadStream(&'static str),

    /// The server opened its stream with a different domain.
    #[error("stream is not from the expected server")]
    HostMismatch,

    #[error("stream header has no id")]
    MissingStreamId,

    /// The server closed the stream instead of accepting the handshake.
    #[error("handshake failed")]
    HandshakeFailed,

    /// The server sent a stream error with this condition.
    #[error("stream error from server: {0}")]
    Remote(String),

    /// A top level element which is not a stanza was received.
    #[error("unknown stanza: {0}")]
    UnknownStanza(String),

    #[error("stream is disconnected")]
    Disconnected,
}

pub(crate) mod description {
    pub(crate) const NOT_A_STREAM: &str = "root element is not a stream";
    pub(crate) const BAD_NAMESPACE: &str = "stream default namespace is not jabber:component:accept";
    pub(crate) const HANDSHAKE_EXPECTED: &str = "element received before the handshake reply";
    pub(crate) const UNEXPECTED_CONTENT: &str = "content received in the wrong stream state";
}
