/*
** This file is a part of Iksemel (XML parser for Jabber/XMPP)
** Copyright (C) 2000-2025 Gurer Ozen
**
** Iksemel is free software: you can redistribute it and/or modify it
** under the terms of the GNU Lesser General Public License as
** published by the Free Software Foundation, either version 3 of
** the License, or (at your option) any later version.
*/

use super::error::description::*;
use super::*;

fn check_xml(element: &Element, expected: &str) {
    let xml = element.to_string();
    assert_eq!(xml, expected);
    // Output must parse back into the same tree
    let parsed: Element = xml.parse().unwrap();
    assert_eq!(parsed.to_string(), expected);
}

#[test]
fn it_works() {
    let mut html = Element::new("html");
    html.add_child("p")
        .add_child("b")
        .add_child("blink")
        .set_text(Some("lala"));
    html.append_text("foo&");
    html.add_child("p2");

    check_xml(
        &html,
        "<html><p><b><blink>lala</blink></b></p>foo&amp;<p2/></html>",
    );
    assert_eq!(html.text(), "lalafoo&");
}

#[test]
fn attributes() {
    let mut a = Element::new("a");
    a.set_attribute("i", Some("1"))
        .set_attribute("j", Some("<\"'&>"))
        .set_attribute("i", Some("2"));
    assert_eq!(a.attribute("i"), Some("2"));
    let names: Vec<(&str, &str)> = a.attributes().collect();
    assert_eq!(names, vec![("i", "2"), ("j", "<\"'&>")]);
    check_xml(&a, "<a i=\"2\" j=\"&lt;&quot;&apos;&amp;&gt;\"/>");

    a.set_attribute("i", None);
    assert!(!a.has_attribute("i"));
    a.set_attribute("nope", None);
    check_xml(&a, "<a j=\"&lt;&quot;&apos;&amp;&gt;\"/>");
}

#[test]
fn appended_child_is_a_copy() {
    let mut child = Element::new("item");
    child.set_attribute("n", Some("1"));
    let mut parent = Element::new("list");
    parent.append_child(&child);

    child.set_attribute("n", Some("2"));
    child.add_child("extra");

    let copy = parent.first_child("item", ANY).unwrap();
    assert_eq!(copy.attribute("n"), Some("1"));
    assert!(!copy.has_child("extra", ANY));
}

#[test]
fn lookups() {
    let doc: Element = "<r xmlns='urn:r'><a/><b xmlns='urn:b'/><a xmlns=''/>text<a/></r>"
        .parse()
        .unwrap();
    assert_eq!(doc.namespace(), Some("urn:r"));
    assert_eq!(doc.children().count(), 4);
    assert_eq!(doc.children_named("a", ANY).count(), 3);
    assert_eq!(doc.children_named("a", "urn:r").count(), 2);
    assert_eq!(doc.children_named("a", "").count(), 1);
    assert_eq!(doc.children_named(ANY, "urn:b").count(), 1);
    assert!(doc.has_child("b", "urn:b"));
    assert!(!doc.has_child("b", "urn:r"));
    assert_eq!(
        doc.first_child_by(|e| e.namespace().is_none())
            .map(Element::name),
        Some("a")
    );
    assert_eq!(doc.children_by(|e| e.name() == "b").count(), 1);
}

#[test]
fn child_text() {
    let mut message = Element::new_ns("message", "jabber:component:accept");
    message.set_child_text("body", Some("hello"));
    assert_eq!(message.child_text("body", ANY).as_deref(), Some("hello"));
    assert_eq!(message.child_text("body", "").as_deref(), Some("hello"));

    message.set_child_text("body", Some("again"));
    assert_eq!(message.children().count(), 1);
    assert_eq!(message.child_text("body", ANY).as_deref(), Some("again"));

    message.set_child_text_ns("x", "urn:x", Some("1"));
    assert_eq!(message.child_text("x", "urn:x").as_deref(), Some("1"));
    // namespaced lookup ignores the body in no namespace
    message.set_child_text_ns("body", "urn:x", Some("other"));
    assert_eq!(message.children().count(), 3);

    message.set_child_text("body", None);
    assert_eq!(message.children_named("body", ANY).count(), 1);
    assert_eq!(message.child_text("body", ANY).as_deref(), Some("other"));
}

#[test]
fn set_text_replaces_children() {
    let mut e: Element = "<a><b/>x<c>y</c></a>".parse().unwrap();
    assert_eq!(e.text(), "xy");
    e.set_text(Some("z"));
    check_xml(&e, "<a>z</a>");
    e.set_text(None);
    check_xml(&e, "<a/>");
}

#[test]
fn remove_child() {
    let mut e: Element = "<a><b n='1'/><c/><b n='2'/></a>".parse().unwrap();
    let removed = e.remove_child("b", ANY).unwrap();
    assert_eq!(removed.attribute("n"), Some("1"));
    assert_eq!(e.to_string(), "<a><c/><b n=\"2\"/></a>");
    assert!(e.remove_child("d", ANY).is_none());
}

#[test]
fn namespace_serialization() {
    let mut iq = Element::new("iq");
    iq.add_child_ns("query", "http://jabber.org/protocol/disco#info")
        .add_child("identity");
    check_xml(
        &iq,
        "<iq><query xmlns=\"http://jabber.org/protocol/disco#info\"><identity xmlns=\"\"/></query></iq>",
    );

    let mut query = Element::new_ns("query", "jabber:iq:roster");
    query.add_child_ns("item", "jabber:iq:roster");
    check_xml(
        &query,
        "<query xmlns=\"jabber:iq:roster\"><item/></query>",
    );

    let mut error = Element::new_prefixed("stream", "error", "http://etherx.jabber.org/streams");
    error.add_child_ns("conflict", "urn:ietf:params:xml:ns:xmpp-streams");
    error
        .add_child_ns("other", "http://etherx.jabber.org/streams")
        .set_text(Some("x"));
    assert_eq!(
        error.to_string(),
        "<stream:error xmlns:stream=\"http://etherx.jabber.org/streams\"><conflict xmlns=\"urn:ietf:params:xml:ns:xmpp-streams\"/><other xmlns=\"http://etherx.jabber.org/streams\">x</other></stream:error>"
    );
    let parsed: Element = error.to_string().parse().unwrap();
    assert_eq!(parsed, error);
}

#[test]
fn attribute_prefixes_are_kept() {
    let message: Element = "<message xmlns:x='urn:x' x:attr='v'><body>hi</body></message>"
        .parse()
        .unwrap();
    check_xml(
        &message,
        "<message xmlns:x=\"urn:x\" x:attr=\"v\"><body>hi</body></message>",
    );

    let doc: Element = "<r xmlns:x='urn:x'><a x:k='1'/><b x:k='2'/></r>".parse().unwrap();
    check_xml(
        &doc,
        "<r><a xmlns:x=\"urn:x\" x:k=\"1\"/><b xmlns:x=\"urn:x\" x:k=\"2\"/></r>",
    );

    let doc: Element = "<a xmlns:x='urn:x' x:k='1'><b x:k='2' xml:lang='en'/></a>"
        .parse()
        .unwrap();
    check_xml(
        &doc,
        "<a xmlns:x=\"urn:x\" x:k=\"1\"><b x:k=\"2\" xml:lang=\"en\"/></a>",
    );

    let mut item = Element::new("item");
    item.declare_prefix("x", "urn:x")
        .set_attribute("x:k", Some("1"));
    check_xml(&item, "<item xmlns:x=\"urn:x\" x:k=\"1\"/>");

    assert!("<message x:attr='v'/>".parse::<Element>().is_err());
}

#[test]
fn strip_namespace() {
    let mut message: Element =
        "<message xmlns='jabber:component:accept'><body>x</body><x xmlns='urn:x'><y xmlns='jabber:component:accept'/></x></message>"
            .parse()
            .unwrap();
    message.strip_namespace("jabber:component:accept");
    assert_eq!(
        message.to_string(),
        "<message><body>x</body><x xmlns=\"urn:x\"><y xmlns=\"\"/></x></message>"
    );
}

#[test]
fn cursor_navigation() {
    let doc: Element = "<a><b><c/></b><d/></a>".parse().unwrap();
    let root = Cursor::new(&doc);
    assert!(root.parent().is_none());
    assert_eq!(root.depth(), 0);

    let c = root
        .first_child("b", ANY)
        .and_then(|b| b.first_child("c", ANY))
        .unwrap();
    assert_eq!(c.name(), "c");
    assert_eq!(c.depth(), 2);
    assert_eq!(c.parent().unwrap().name(), "b");
    assert_eq!(c.root().name(), "a");
    assert!(c.root().parent().is_none());

    let names: Vec<String> = root.children().map(|n| n.name().to_string()).collect();
    assert_eq!(names, vec!["b", "d"]);
    assert!(root.children().all(|n| n.parent().unwrap().name() == "a"));
}

#[test]
fn builder() {
    let mut item = Element::new("item");
    item.set_attribute("jid", Some("x@y"));

    let builder = XmlBuilder::new("iq")
        .attribute("type", "result")
        .child_ns("query", "jabber:iq:roster")
        .append(&item)
        .child_text("note", "n")
        .child("group")
        .text("g")
        .parent()
        .parent()
        .parent()
        .attribute("id", "1");
    assert_eq!(builder.xml().name(), "iq");
    let iq = builder.build();
    assert_eq!(
        iq.to_string(),
        "<iq type=\"result\" id=\"1\"><query xmlns=\"jabber:iq:roster\"><item xmlns=\"\" jid=\"x@y\"/><note xmlns=\"\">n</note><group xmlns=\"\">g</group></query></iq>"
    );

    item.set_attribute("jid", Some("changed"));
    assert_eq!(
        iq.first_child("query", ANY)
            .and_then(|q| q.first_child("item", ANY))
            .and_then(|i| i.attribute("jid")),
        Some("x@y")
    );
}

#[test]
fn parse_errors() {
    assert_eq!(
        "".parse::<Element>(),
        Err(ElementError::BadXml(crate::parser::description::DOC_NO_CONTENT))
    );
    assert_eq!(
        "<a>".parse::<Element>(),
        Err(ElementError::BadXml(crate::parser::description::DOC_OPEN_TAGS))
    );
    assert!(matches!(
        "<!DOCTYPE a><a/>".parse::<Element>(),
        Err(ElementError::NotSupported(_))
    ));
    let parser = ElementParser::new();
    assert_eq!(
        parser.into_element(),
        Err(ElementError::BadXml(crate::parser::description::DOC_NO_CONTENT))
    );
    assert_eq!(NO_ELEMENT, "no element parsed yet");
}
