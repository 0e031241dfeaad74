/*
** This file is a part of Iksemel (XML parser for Jabber/XMPP)
** Copyright (C) 2000-2025 Gurer Ozen
**
** Iksemel is free software: you can redistribute it and/or modify it
** under the terms of the GNU Lesser General Public License as
** published by the Free Software Foundation, either version 3 of
** the License, or (at your option) any later version.
*/

use std::any::Any;
use std::collections::HashMap;
use std::future::Future;
use std::panic;
use std::panic::AssertUnwindSafe;
use std::pin::Pin;
use std::task::Context;
use std::task::Poll;

use thiserror::Error;
use tokio::sync::oneshot;
use tracing::debug;
use tracing::error;
use tracing::warn;
use uuid::Uuid;

use crate::HasXml;
use crate::xmpp::component::Component;
use crate::xmpp::component::ComponentHandle;
use crate::xmpp::stanza::Condition;
use crate::xmpp::stanza::Iq;
use crate::xmpp::stanza::IqType;
use crate::xmpp::stanza::Stanza;
use crate::xmpp::stanza::StanzaError;

#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum IqError {
    /// Only `get` and `set` stanzas wait for a response.
    #[error("iq is not a request")]
    NotRequest,

    /// The peer answered with an `error` response.
    #[error("iq request failed: {0}")]
    Response(StanzaError, Iq),

    /// The connection went away before the response arrived.
    #[error("iq request was cancelled")]
    Cancelled,
}

type Waiter = oneshot::Sender<Result<Iq, IqError>>;

/// Resolves to the response of an IQ request.
///
/// Wrap it in [tokio::time::timeout] to give up waiting, nothing times out
/// on its own.
#[derive(Debug)]
pub struct IqFuture {
    receiver: oneshot::Receiver<Result<Iq, IqError>>,
}

impl IqFuture {
    pub(crate) fn channel() -> (Waiter, IqFuture) {
        let (sender, receiver) = oneshot::channel();
        (sender, IqFuture { receiver })
    }
}

impl Future for IqFuture {
    type Output = Result<Iq, IqError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.receiver)
            .poll(cx)
            .map(|result| result.unwrap_or(Err(IqError::Cancelled)))
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(text) = payload.downcast_ref::<&str>() {
        text
    } else if let Some(text) = payload.downcast_ref::<String>() {
        text
    } else {
        "unknown panic"
    }
}

/// Runs a component callback. A panic is logged and turns into `None`.
fn guarded<R>(callback: &str, run: impl FnOnce() -> R) -> Option<R> {
    match panic::catch_unwind(AssertUnwindSafe(run)) {
        Ok(result) => Some(result),
        Err(payload) => {
            error!(callback, panic = panic_message(&*payload), "component callback panicked");
            None
        }
    }
}

/// Routes incoming stanzas to a [Component] and matches IQ responses to the
/// requests waiting for them.
#[derive(Debug, Default)]
pub struct Dispatcher {
    pending: HashMap<String, Waiter>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Dispatcher {
            pending: HashMap::new(),
        }
    }

    /// Number of requests waiting for a response.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Starts waiting for the response of a request about to be sent.
    ///
    /// A random id is assigned when the request has none.
    pub fn register(&mut self, iq: &mut Iq) -> Result<IqFuture, IqError> {
        let (waiter, future) = IqFuture::channel();
        self.register_waiter(iq, waiter)?;
        Ok(future)
    }

    pub(crate) fn register_waiter(&mut self, iq: &mut Iq, waiter: Waiter) -> Result<(), IqError> {
        if !iq.is_request() {
            return Err(IqError::NotRequest);
        }
        let id = match iq.id() {
            Some(id) => id.to_string(),
            None => {
                let id = Uuid::new_v4().to_string();
                iq.set_id(Some(&id));
                id
            }
        };
        if self.pending.insert(id.clone(), waiter).is_some() {
            warn!(id, "request id reused, cancelling the earlier request");
        }
        Ok(())
    }

    /// Hands a stanza to the component.
    ///
    /// Returns the reply to send back, which is only ever produced for
    /// `get` and `set` requests.
    pub fn dispatch(
        &mut self,
        stanza: Stanza,
        component: &mut dyn Component,
        handle: &ComponentHandle,
    ) -> Option<Stanza> {
        match stanza {
            Stanza::Message(message) => {
                guarded("message", || component.handle_message(handle, message));
                None
            }
            Stanza::Presence(presence) => {
                guarded("presence", || component.handle_presence(handle, presence));
                None
            }
            Stanza::Iq(iq) => match iq.iq_type() {
                Some(IqType::Get | IqType::Set) => {
                    Some(Stanza::Iq(Self::answer(iq, component, handle)))
                }
                Some(IqType::Result | IqType::Error) => {
                    self.resolve(iq);
                    None
                }
                None => {
                    warn!(%iq, "dropping iq without a valid type");
                    None
                }
            },
        }
    }

    fn answer(request: Iq, component: &mut dyn Component, handle: &ComponentHandle) -> Iq {
        let Some(reply) = guarded("iq", || component.handle_iq(handle, request.clone())) else {
            return request.error_reply(&StanzaError::new(Condition::InternalServerError));
        };
        match reply {
            None => {
                warn!(id = request.id(), "no response for iq request");
                request.error_reply(&StanzaError::new(Condition::FeatureNotImplemented))
            }
            Some(reply) if !reply.is_response() => {
                warn!(%reply, "iq handler returned a request as response");
                request.error_reply(&StanzaError::new(Condition::InternalServerError))
            }
            Some(mut reply) => {
                if reply.id().is_none() {
                    reply.set_id(request.id());
                }
                let xml = reply.xml_mut();
                if !xml.has_attribute("to") {
                    xml.set_attribute("to", request.xml().attribute("from"));
                }
                if !xml.has_attribute("from") {
                    xml.set_attribute("from", request.xml().attribute("to"));
                }
                reply
            }
        }
    }

    fn resolve(&mut self, response: Iq) {
        let Some(id) = response.id() else {
            warn!(%response, "dropping iq response without id");
            return;
        };
        let Some(waiter) = self.pending.remove(id) else {
            warn!(id, "dropping response to unknown request");
            return;
        };
        let result = match response.iq_type() {
            Some(IqType::Error) => {
                let error = response
                    .error()
                    .unwrap_or(StanzaError::new(Condition::UndefinedCondition));
                Err(IqError::Response(error, response))
            }
            _ => Ok(response),
        };
        if waiter.send(result).is_err() {
            debug!("nobody is waiting for the iq response anymore");
        }
    }

    /// Fails every waiting request with [IqError::Cancelled].
    pub fn cancel_all(&mut self) {
        for (_, waiter) in self.pending.drain() {
            let _ = waiter.send(Err(IqError::Cancelled));
        }
    }
}

#[cfg(test)]
mod tests;
