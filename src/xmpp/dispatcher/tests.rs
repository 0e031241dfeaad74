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

use tokio::sync::mpsc;

use super::*;
use crate::Element;
use crate::Jid;
use crate::xmpp::constants::ns;
use crate::xmpp::stanza::Message;
use crate::xmpp::stanza::Presence;

#[derive(Default)]
struct Recorder {
    messages: Vec<Message>,
    presences: Vec<Presence>,
    reply: Option<Iq>,
}

impl Component for Recorder {
    fn name(&self) -> &str {
        "recorder"
    }

    fn description(&self) -> &str {
        "records what it receives"
    }

    fn handle_message(&mut self, _handle: &ComponentHandle, message: Message) {
        self.messages.push(message);
    }

    fn handle_presence(&mut self, _handle: &ComponentHandle, presence: Presence) {
        self.presences.push(presence);
    }

    fn handle_iq(&mut self, _handle: &ComponentHandle, _iq: Iq) -> Option<Iq> {
        self.reply.clone()
    }
}

fn handle() -> ComponentHandle {
    let (sender, _) = mpsc::unbounded_channel();
    ComponentHandle::new(
        Jid::new("comp.example.com").unwrap(),
        sender,
        Arc::new(AtomicBool::new(true)),
    )
}

fn iq(xml: &str) -> Iq {
    Iq::try_from(xml.parse::<Element>().unwrap()).unwrap()
}

fn request() -> Stanza {
    Stanza::Iq(iq(
        "<iq type='get' id='q1' from='user@example.com/res' to='comp.example.com'>\
         <query xmlns='http://jabber.org/protocol/disco#info'/></iq>",
    ))
}

#[test]
fn messages_and_presences() {
    let mut dispatcher = Dispatcher::new();
    let mut component = Recorder::default();
    let handle = handle();

    let reply = dispatcher.dispatch(Message::chat("hi").into(), &mut component, &handle);
    assert!(reply.is_none());
    let reply = dispatcher.dispatch(Presence::new().into(), &mut component, &handle);
    assert!(reply.is_none());
    assert_eq!(component.messages.len(), 1);
    assert_eq!(component.messages[0].body().as_deref(), Some("hi"));
    assert_eq!(component.presences.len(), 1);
}

#[test]
fn unanswered_request() {
    let mut dispatcher = Dispatcher::new();
    let mut component = Recorder::default();
    let Some(Stanza::Iq(reply)) = dispatcher.dispatch(request(), &mut component, &handle()) else {
        panic!("no reply");
    };
    assert_eq!(reply.iq_type(), Some(IqType::Error));
    assert_eq!(reply.id(), Some("q1"));
    assert_eq!(reply.to().unwrap().full(), "user@example.com/res");
    assert_eq!(
        reply.error().unwrap().condition,
        Condition::FeatureNotImplemented
    );
}

#[test]
fn answered_request() {
    let mut dispatcher = Dispatcher::new();
    let mut reply = Iq::new(IqType::Result);
    reply.add_query(ns::DISCO_INFO);
    let mut component = Recorder {
        reply: Some(reply),
        ..Default::default()
    };
    let Some(Stanza::Iq(reply)) = dispatcher.dispatch(request(), &mut component, &handle()) else {
        panic!("no reply");
    };
    assert_eq!(
        reply.to_string(),
        "<iq type=\"result\" id=\"q1\" to=\"user@example.com/res\" from=\"comp.example.com\">\
         <query xmlns=\"http://jabber.org/protocol/disco#info\"/></iq>"
    );

    let mut component = Recorder {
        reply: Some(Iq::new(IqType::Set)),
        ..Default::default()
    };
    let Some(Stanza::Iq(reply)) = dispatcher.dispatch(request(), &mut component, &handle()) else {
        panic!("no reply");
    };
    assert_eq!(
        reply.error().unwrap().condition,
        Condition::InternalServerError
    );
}

#[tokio::test]
async fn responses_resolve_waiters() {
    let mut dispatcher = Dispatcher::new();
    let mut component = Recorder::default();
    let handle = handle();

    let mut first = Iq::new(IqType::Get);
    first.set_id(Some("r1"));
    let first_future = dispatcher.register(&mut first).unwrap();
    let mut second = Iq::new(IqType::Set);
    let second_future = dispatcher.register(&mut second).unwrap();
    let second_id = second.id().unwrap().to_string();
    assert_eq!(second_id.len(), 36);
    assert_eq!(dispatcher.pending(), 2);

    let reply = dispatcher.dispatch(
        iq("<iq type='result' id='r1'/>").into(),
        &mut component,
        &handle,
    );
    assert!(reply.is_none());
    let response = first_future.await.unwrap();
    assert_eq!(response.id(), Some("r1"));

    let error = format!(
        "<iq type='error' id='{second_id}'><error type='cancel'>\
         <item-not-found xmlns='urn:ietf:params:xml:ns:xmpp-stanzas'/></error></iq>"
    );
    dispatcher.dispatch(iq(&error).into(), &mut component, &handle);
    match second_future.await {
        Err(IqError::Response(error, response)) => {
            assert_eq!(error.condition, Condition::ItemNotFound);
            assert_eq!(response.id(), Some(second_id.as_str()));
        }
        other => panic!("unexpected result {other:?}"),
    }
    assert_eq!(dispatcher.pending(), 0);

    // Unknown ids are dropped without side effects
    let reply = dispatcher.dispatch(
        iq("<iq type='result' id='nobody'/>").into(),
        &mut component,
        &handle,
    );
    assert!(reply.is_none());
}

#[tokio::test]
async fn register_rejects_responses() {
    let mut dispatcher = Dispatcher::new();
    let mut result = Iq::new(IqType::Result);
    assert_eq!(
        dispatcher.register(&mut result).unwrap_err(),
        IqError::NotRequest
    );
    assert_eq!(dispatcher.pending(), 0);
}

#[tokio::test]
async fn cancel_all() {
    let mut dispatcher = Dispatcher::new();
    let futures: Vec<IqFuture> = (0..3)
        .map(|_| dispatcher.register(&mut Iq::new(IqType::Get)).unwrap())
        .collect();
    assert_eq!(dispatcher.pending(), 3);
    dispatcher.cancel_all();
    assert_eq!(dispatcher.pending(), 0);
    for future in futures {
        assert_eq!(future.await, Err(IqError::Cancelled));
    }
}

struct Faulty;

impl Component for Faulty {
    fn name(&self) -> &str {
        "faulty"
    }

    fn description(&self) -> &str {
        "panics on every stanza"
    }

    fn handle_message(&mut self, _handle: &ComponentHandle, _message: Message) {
        panic!("message handler failed");
    }

    fn handle_iq(&mut self, _handle: &ComponentHandle, _iq: Iq) -> Option<Iq> {
        panic!("iq handler failed");
    }
}

#[test]
fn panicking_handlers() {
    let mut dispatcher = Dispatcher::new();
    let handle = handle();

    let reply = dispatcher.dispatch(Message::chat("hi").into(), &mut Faulty, &handle);
    assert!(reply.is_none());

    let Some(Stanza::Iq(reply)) = dispatcher.dispatch(request(), &mut Faulty, &handle) else {
        panic!("no reply");
    };
    assert_eq!(reply.iq_type(), Some(IqType::Error));
    assert_eq!(reply.id(), Some("q1"));
    assert_eq!(reply.to().unwrap().full(), "user@example.com/res");
    assert_eq!(
        reply.error().unwrap().condition,
        Condition::InternalServerError
    );
}

#[tokio::test]
async fn dropped_dispatcher_cancels() {
    let mut dispatcher = Dispatcher::new();
    let future = dispatcher.register(&mut Iq::new(IqType::Get)).unwrap();
    drop(dispatcher);
    assert_eq!(future.await, Err(IqError::Cancelled));
}

#[tokio::test]
async fn handle_without_connection() {
    let (sender, receiver) = mpsc::unbounded_channel();
    let connected = Arc::new(AtomicBool::new(false));
    let handle = ComponentHandle::new(Jid::new("comp.example.com").unwrap(), sender, connected);
    assert!(!handle.is_connected());
    handle.send(Message::chat("lost"));
    assert_eq!(
        handle.send_iq(Iq::new(IqType::Get)).await,
        Err(IqError::Cancelled)
    );
    assert_eq!(
        handle.send_iq(Iq::new(IqType::Result)).await,
        Err(IqError::NotRequest)
    );
    drop(receiver);
}
