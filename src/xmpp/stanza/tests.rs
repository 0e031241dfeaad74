/*
** This file is a part of Iksemel (XML parser for Jabber/XMPP)
** Copyright (C) 2000-2025 Gurer Ozen
**
** Iksemel is free software: you can redistribute it and/or modify it
** under the terms of the GNU Lesser General Public License as
** published by the Free Software Foundation, either version 3 of
** the License, or (at your option) any later version.
*/

use super::*;
use crate::Jid;
use crate::xmpp::constants::ns;

fn parse(xml: &str) -> Stanza {
    Stanza::from_element(xml.parse::<Element>().unwrap()).unwrap()
}

#[test]
fn message() {
    let mut message = Message::chat("hi");
    message.set_id(Some("m1"));
    message.set_to(Some(&Jid::new("juliet@example.com").unwrap()));
    message.set_subject(Some("greeting"));
    assert_eq!(
        message.to_string(),
        "<message type=\"chat\" id=\"m1\" to=\"juliet@example.com\">\
         <body>hi</body><subject>greeting</subject></message>"
    );
    message.set_subject(None);
    message.set_body(Some("bye"));
    assert_eq!(message.body().as_deref(), Some("bye"));
    assert_eq!(message.subject(), None);
    assert_eq!(message.message_type(), MessageType::Chat);

    let Stanza::Message(parsed) = parse("<message from='romeo@montague.lit/orchard' type='weird'><thread>t1</thread></message>") else {
        panic!("not a message");
    };
    assert_eq!(parsed.message_type(), MessageType::Normal);
    assert_eq!(parsed.thread().as_deref(), Some("t1"));
    assert_eq!(parsed.from().unwrap().resourcepart(), Some("orchard"));
    assert!(parsed.to().is_none());
    assert_eq!(Message::default().to_string(), "<message/>");
}

#[test]
fn presence() {
    let mut presence = Presence::new();
    assert_eq!(presence.to_string(), "<presence/>");
    assert_eq!(presence.presence_type(), None);
    assert_eq!(presence.priority(), 0);

    presence.set_show(Some(Show::Dnd));
    presence.set_status(Some("busy"));
    presence.set_priority(-5);
    assert_eq!(presence.show(), Some(Show::Dnd));
    assert_eq!(presence.status().as_deref(), Some("busy"));
    assert_eq!(presence.priority(), 0);
    presence.set_priority(10);
    assert_eq!(presence.priority(), 10);

    let presence = Presence::with_type(PresenceType::Unavailable);
    assert_eq!(presence.to_string(), "<presence type=\"unavailable\"/>");

    let Stanza::Presence(parsed) = parse("<presence><priority>1000</priority><show>bogus</show></presence>") else {
        panic!("not a presence");
    };
    assert_eq!(parsed.priority(), 127);
    assert_eq!(parsed.show(), None);

    let Stanza::Presence(parsed) = parse("<presence><priority> -300 </priority></presence>") else {
        panic!("not a presence");
    };
    assert_eq!(parsed.priority(), -128);
}

#[test]
fn iq_replies() {
    let Stanza::Iq(request) = parse(
        "<iq type='get' id='q1' from='user@example.com/res' to='comp.example.com'>\
         <query xmlns='http://jabber.org/protocol/disco#info'/></iq>",
    ) else {
        panic!("not an iq");
    };
    assert!(request.is_request());
    assert!(!request.is_response());
    assert!(request.query(ns::DISCO_INFO).is_some());
    assert!(request.query(ns::VERSION).is_none());

    let result = request.result_reply();
    assert!(result.is_response());
    assert_eq!(
        result.to_string(),
        "<iq type=\"result\" id=\"q1\" to=\"user@example.com/res\" from=\"comp.example.com\"/>"
    );

    let error = request.error_reply(&StanzaError::new(Condition::FeatureNotImplemented));
    assert_eq!(error.iq_type(), Some(IqType::Error));
    assert!(error.query(ns::DISCO_INFO).is_some());
    let reported = error.error().unwrap();
    assert_eq!(reported.condition, Condition::FeatureNotImplemented);
    assert_eq!(reported.error_type, ErrorType::Cancel);
    assert!(request.error().is_none());
}

#[test]
fn stanza_errors() {
    let error = StanzaError::new(Condition::ItemNotFound).with_text("no such node");
    assert_eq!(
        error.to_element().to_string(),
        "<error type=\"cancel\">\
         <item-not-found xmlns=\"urn:ietf:params:xml:ns:xmpp-stanzas\"/>\
         <text xmlns=\"urn:ietf:params:xml:ns:xmpp-stanzas\">no such node</text></error>"
    );
    assert_eq!(error.to_string(), "stanza error: item-not-found (cancel)");

    let Stanza::Message(message) = parse(
        "<message type='error'><error type='bogus'>\
         <made-up xmlns='urn:ietf:params:xml:ns:xmpp-stanzas'/></error></message>",
    ) else {
        panic!("not a message");
    };
    let error = message.error().unwrap();
    assert_eq!(error.condition, Condition::UndefinedCondition);
    assert_eq!(error.error_type, ErrorType::Cancel);
    assert_eq!(error.text, None);

    assert_eq!(Condition::parse("conflict"), Some(Condition::Conflict));
    assert_eq!(Condition::NotAuthorized.default_type(), ErrorType::Auth);
}

#[test]
fn extensions() {
    let mut iq = Iq::new(IqType::Set);
    iq.add_query("jabber:iq:register")
        .set_child_text("username", Some("romeo"));
    iq.add_extension("x", "urn:x").set_attribute("n", Some("1"));
    assert_eq!(
        iq.query("jabber:iq:register")
            .and_then(|query| query.child_text("username", crate::ANY))
            .as_deref(),
        Some("romeo")
    );
    iq.extension_mut("x", "urn:x")
        .unwrap()
        .set_attribute("n", Some("2"));
    assert_eq!(iq.extension("x", "urn:x").unwrap().attribute("n"), Some("2"));
    assert!(iq.extension("x", "urn:y").is_none());
}

#[test]
fn conversions() {
    let element: Element = "<handshake/>".parse().unwrap();
    let element = Stanza::from_element(element).unwrap_err();
    assert_eq!(element.name(), "handshake");

    let element: Element = "<message/>".parse().unwrap();
    assert!(Presence::try_from(element.clone()).is_err());
    let stanza = Stanza::try_from(element).unwrap();
    assert_eq!(stanza.name(), "message");
    assert_eq!(stanza.id(), None);

    let mut iq = Iq::new(IqType::Get);
    iq.set_id(Some("x"));
    let stanza = Stanza::from(iq.clone());
    assert_eq!(stanza.id(), Some("x"));
    assert_eq!(stanza.to_string(), iq.to_string());
    assert_eq!(stanza.into_element(), Element::from(iq));
}
