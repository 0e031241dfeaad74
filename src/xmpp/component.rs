/*
** This file is a part of Iksemel (XML parser for Jabber/XMPP)
** Copyright (C) 2000-2025 Gurer Ozen
**
** Iksemel is free software: you can redistribute it and/or modify it
** under the terms of the GNU Lesser General Public License as
** published by the Free Software Foundation, either version 3 of
** the License, or (at your option) any later version.
*/

use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;

use tokio::sync::mpsc;
use tokio::sync::oneshot;
use tracing::warn;

use crate::Jid;
use crate::xmpp::dispatcher::IqError;
use crate::xmpp::dispatcher::IqFuture;
use crate::xmpp::stanza::Iq;
use crate::xmpp::stanza::Message;
use crate::xmpp::stanza::Presence;
use crate::xmpp::stanza::Stanza;

/// Application logic of an external component.
///
/// All callbacks of a connection are called one at a time from the task
/// running the [ComponentService](crate::ComponentService), in the order the
/// stanzas arrived. Long running work should be spawned off and report back
/// through the [ComponentHandle].
///
/// A panic in one of the stanza handlers is logged and the connection goes
/// on. A panicking [handle_iq](Component::handle_iq) is answered with
/// `internal-server-error`.
pub trait Component: Send + 'static {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// The handshake was accepted and stanzas can be sent.
    fn connected(&mut self, _handle: &ComponentHandle) {}

    /// The connection is about to be closed from our side.
    fn will_disconnect(&mut self, _handle: &ComponentHandle) {}

    /// The connection is gone. Pending IQ requests are already cancelled.
    fn disconnected(&mut self) {}

    fn handle_message(&mut self, _handle: &ComponentHandle, _message: Message) {}

    fn handle_presence(&mut self, _handle: &ComponentHandle, _presence: Presence) {}

    /// Answers a `get` or `set` request.
    ///
    /// Returning `None` makes the service reply with `feature-not-implemented`.
    fn handle_iq(&mut self, _handle: &ComponentHandle, _iq: Iq) -> Option<Iq> {
        None
    }
}

pub(crate) enum Command {
    Send(Stanza),
    SendIq(Iq, oneshot::Sender<Result<Iq, IqError>>),
    Disconnect,
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Command::Send(stanza) => f.debug_tuple("Send").field(stanza).finish(),
            Command::SendIq(iq, _) => f.debug_tuple("SendIq").field(iq).finish(),
            Command::Disconnect => f.write_str("Disconnect"),
        }
    }
}

/// Cloneable handle for talking to the server from component code.
#[derive(Clone, Debug)]
pub struct ComponentHandle {
    jid: Jid,
    commands: mpsc::UnboundedSender<Command>,
    connected: Arc<AtomicBool>,
}

impl ComponentHandle {
    pub(crate) fn new(
        jid: Jid,
        commands: mpsc::UnboundedSender<Command>,
        connected: Arc<AtomicBool>,
    ) -> Self {
        ComponentHandle {
            jid,
            commands,
            connected,
        }
    }

    /// Address of the component.
    pub fn jid(&self) -> &Jid {
        &self.jid
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    /// Queues a stanza for sending.
    ///
    /// Stanzas are dropped with a warning when the component is not connected.
    pub fn send(&self, stanza: impl Into<Stanza>) {
        let stanza = stanza.into();
        if !self.is_connected() {
            warn!(%stanza, "not connected, dropping stanza");
            return;
        }
        if let Err(err) = self.commands.send(Command::Send(stanza)) {
            warn!(command = ?err.0, "connection is gone, dropping stanza");
        }
    }

    /// Sends a `get` or `set` request and returns a future for its response.
    ///
    /// A missing id is filled in with a random one. The future always
    /// completes: with the response, with the error the server returned, or
    /// with [IqError::Cancelled] when the connection goes away first.
    pub fn send_iq(&self, iq: Iq) -> IqFuture {
        let (waiter, future) = IqFuture::channel();
        if !iq.is_request() {
            let _ = waiter.send(Err(IqError::NotRequest));
        } else if self.is_connected() {
            // A closed channel drops the waiter, which cancels the future
            let _ = self.commands.send(Command::SendIq(iq, waiter));
        } else {
            warn!(%iq, "not connected, cancelling request");
        }
        future
    }

    /// Asks the service to close the stream and stop.
    pub fn disconnect(&self) {
        let _ = self.commands.send(Command::Disconnect);
    }
}
