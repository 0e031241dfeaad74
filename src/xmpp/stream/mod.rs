/*
** This file is a part of Iksemel (XML parser for Jabber/XMPP)
** Copyright (C) 2000-2025 Gurer Ozen
**
** Iksemel is free software: you can redistribute it and/or modify it
** under the terms of the GNU Lesser General Public License as
** published by the Free Software Foundation, either version 3 of
** the License, or (at your option) any later version.
*/

//! Component side of the XEP-0114 stream protocol.
//!
//! [ComponentStream] does no I/O itself. Bytes read from the server are
//! fed into [receive_bytes()](ComponentStream::receive_bytes), and the
//! returned events tell what to write back and which stanzas arrived.

mod error;

use sha1::Digest;
use sha1::Sha1;
use tracing::debug;

use crate::ANY;
use crate::Element;
use crate::ElementAssembler;
use crate::Jid;
use crate::StartElement;
use crate::StreamItem;
use crate::XmlFramer;
use crate::xmpp::constants::HANDSHAKE_TAG;
use crate::xmpp::constants::STREAM_CLOSE;
use crate::xmpp::constants::ns;
use crate::xmpp::stanza::Stanza;

pub use error::StreamError;
use error::description;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum StreamStatus {
    /// Waiting for the server's stream header.
    Connect,
    /// Handshake is sent, waiting for the reply.
    Authenticate,
    /// Stanzas can be exchanged.
    Ready,
    Disconnected,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum StreamEvent {
    /// Text to write to the server.
    Send(String),
    /// The server accepted the handshake.
    Authenticated,
    Stanza(Stanza),
    /// The server closed the stream.
    Closed,
}

/// Computes the XEP-0114 handshake value for a stream.
///
/// ```
/// use iks_component::handshake;
///
/// assert_eq!(
///     handshake("abc", "s3cret"),
///     "31998b73ea3a9f9924c37e68133695467a6701e6"
/// );
/// ```
pub fn handshake(stream_id: &str, secret: &str) -> String {
    let mut hasher = Sha1::new();
    hasher.update(stream_id.as_bytes());
    hasher.update(secret.as_bytes());
    hex::encode(hasher.finalize())
}

fn stream_error_condition(error: &Element) -> String {
    error
        .children_named(ANY, ns::STREAM_ERRORS)
        .find(|child| child.name() != "text")
        .map_or_else(|| "undefined-condition".to_string(), |child| child.name().to_string())
}

pub struct ComponentStream {
    server_name: Jid,
    secret: String,
    framer: XmlFramer,
    assembler: ElementAssembler,
    status: StreamStatus,
    stream_id: Option<String>,
    close_sent: bool,
}

impl ComponentStream {
    /// Creates a stream for the component domain `server_name`.
    pub fn new(server_name: Jid, secret: &str) -> Self {
        ComponentStream {
            server_name,
            secret: secret.to_string(),
            framer: XmlFramer::new(),
            assembler: ElementAssembler::new(1),
            status: StreamStatus::Connect,
            stream_id: None,
            close_sent: false,
        }
    }

    pub fn status(&self) -> StreamStatus {
        self.status
    }

    /// The id the server assigned to this stream, known after its header.
    pub fn stream_id(&self) -> Option<&str> {
        self.stream_id.as_deref()
    }

    pub fn server_name(&self) -> &Jid {
        &self.server_name
    }

    /// The stream header to send right after connecting.
    pub fn open(&self) -> String {
        format!(
            "<stream:stream xmlns='{}' xmlns:stream='{}' to='{}'>",
            ns::COMPONENT_ACCEPT,
            ns::STREAM,
            self.server_name
        )
    }

    /// Closes the stream from our side.
    ///
    /// Returns the closing tag to send, or `None` if the stream was already
    /// disconnected. Whatever the server sends afterwards is ignored.
    pub fn close(&mut self) -> Option<String> {
        if self.status == StreamStatus::Disconnected {
            return None;
        }
        debug!("closing stream");
        self.status = StreamStatus::Disconnected;
        self.close_sent = true;
        Some(STREAM_CLOSE.to_string())
    }

    /// Processes bytes received from the server.
    ///
    /// Input may be split anywhere. Every error disconnects the stream.
    pub fn receive_bytes(&mut self, bytes: &[u8]) -> Result<Vec<StreamEvent>, StreamError> {
        if self.status == StreamStatus::Disconnected {
            if self.close_sent {
                return Ok(Vec::new());
            }
            return Err(StreamError::Disconnected);
        }
        let events = match self.framer.feed(bytes) {
            Ok(events) => events,
            Err(err) => return Err(self.fail(err.into())),
        };
        let mut output = Vec::new();
        for event in events {
            let Some(item) = self.assembler.push(event) else {
                continue;
            };
            if let Err(err) = self.handle_item(item, &mut output) {
                return Err(self.fail(err));
            }
            if self.status == StreamStatus::Disconnected {
                break;
            }
        }
        Ok(output)
    }

    fn fail(&mut self, err: StreamError) -> StreamError {
        debug!(%err, "stream failed");
        self.status = StreamStatus::Disconnected;
        err
    }

    fn handle_item(
        &mut self,
        item: StreamItem,
        output: &mut Vec<StreamEvent>,
    ) -> Result<(), StreamError> {
        match (self.status, item) {
            (StreamStatus::Connect, StreamItem::Open(start)) => {
                let reply = self.handle_header(&start)?;
                output.push(StreamEvent::Send(reply));
            }
            (StreamStatus::Authenticate, StreamItem::Close(_)) => {
                return Err(StreamError::HandshakeFailed);
            }
            (StreamStatus::Ready, StreamItem::Close(_)) => {
                debug!("server closed the stream");
                self.status = StreamStatus::Disconnected;
                self.close_sent = true;
                output.push(StreamEvent::Send(STREAM_CLOSE.to_string()));
                output.push(StreamEvent::Closed);
            }
            (StreamStatus::Authenticate, StreamItem::Element(mut element)) => {
                element.strip_namespace(ns::COMPONENT_ACCEPT);
                if element.is(HANDSHAKE_TAG, "") {
                    debug!("handshake accepted");
                    self.status = StreamStatus::Ready;
                    output.push(StreamEvent::Authenticated);
                } else if element.is("error", ns::STREAM) {
                    return Err(StreamError::Remote(stream_error_condition(&element)));
                } else {
                    return Err(StreamError::BadStream(description::HANDSHAKE_EXPECTED));
                }
            }
            (StreamStatus::Ready, StreamItem::Element(mut element)) => {
                if element.is("error", ns::STREAM) {
                    return Err(StreamError::Remote(stream_error_condition(&element)));
                }
                element.strip_namespace(ns::COMPONENT_ACCEPT);
                match Stanza::from_element(element) {
                    Ok(stanza) => output.push(StreamEvent::Stanza(stanza)),
                    Err(element) => {
                        return Err(StreamError::UnknownStanza(element.name().to_string()));
                    }
                }
            }
            _ => return Err(StreamError::BadStream(description::UNEXPECTED_CONTENT)),
        }
        Ok(())
    }

    fn handle_header(&mut self, start: &StartElement) -> Result<String, StreamError> {
        if !start.name.is("stream", ns::STREAM) {
            return Err(StreamError::BadStream(description::NOT_A_STREAM));
        }
        if start.default_namespace.as_deref() != Some(ns::COMPONENT_ACCEPT) {
            return Err(StreamError::BadStream(description::BAD_NAMESPACE));
        }
        let from = start.attribute("from").and_then(|from| Jid::new(from).ok());
        if from.as_ref() != Some(&self.server_name) {
            return Err(StreamError::HostMismatch);
        }
        let id = match start.attribute("id") {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => return Err(StreamError::MissingStreamId),
        };
        debug!(stream_id = %id, "stream opened");
        let reply = format!(
            "<{HANDSHAKE_TAG}>{}</{HANDSHAKE_TAG}>",
            handshake(&id, &self.secret)
        );
        self.stream_id = Some(id);
        self.status = StreamStatus::Authenticate;
        Ok(reply)
    }
}
