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

const STREAM_OPEN: &str = "<?xml version='1.0'?><stream:stream xmlns='jabber:component:accept' xmlns:stream='http://etherx.jabber.org/streams' from='example.com' id='abc'>";

fn name(local: &str, ns: Option<&str>) -> QName {
    QName {
        namespace: ns.map(str::to_string),
        prefix: None,
        local: local.to_string(),
    }
}

#[test]
fn stream_root_is_reported_early() {
    let mut framer = XmlFramer::new();
    let events = framer.feed(STREAM_OPEN.as_bytes()).unwrap();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0], XmlEvent::StartDocument);
    let XmlEvent::StartElement(start) = &events[1] else {
        panic!("expected start element, got {:?}", events[1]);
    };
    assert!(start.name.is("stream", "http://etherx.jabber.org/streams"));
    assert_eq!(start.name.prefix.as_deref(), Some("stream"));
    assert_eq!(start.name.qualified(), "stream:stream");
    assert_eq!(
        start.default_namespace.as_deref(),
        Some("jabber:component:accept")
    );
    assert_eq!(start.attribute("from"), Some("example.com"));
    assert_eq!(start.attribute("id"), Some("abc"));
    assert_eq!(start.attribute("xmlns"), None);
    assert_eq!(
        start.declared_namespace(Some("stream")),
        Some("http://etherx.jabber.org/streams")
    );
    assert_eq!(framer.depth(), 1);
}

#[test]
fn default_namespace_is_inherited() {
    let mut framer = XmlFramer::new();
    framer.feed(STREAM_OPEN.as_bytes()).unwrap();
    let events = framer
        .feed(b"<message to='a@b'><body>hi</body><x xmlns='jabber:x:data'/></message>")
        .unwrap();
    let ns = Some("jabber:component:accept");
    assert_eq!(events.len(), 7);
    let XmlEvent::StartElement(start) = &events[0] else {
        panic!("expected start element");
    };
    assert_eq!(start.name, name("message", ns));
    assert_eq!(start.attribute("to"), Some("a@b"));
    assert_eq!(events[2], XmlEvent::Characters("hi".to_string()));
    assert_eq!(events[3], XmlEvent::EndElement(name("body", ns)));
    let XmlEvent::StartElement(x) = &events[4] else {
        panic!("expected start element");
    };
    assert_eq!(x.name, name("x", Some("jabber:x:data")));
    assert_eq!(x.declared_namespace(None), Some("jabber:x:data"));
    assert_eq!(
        events[5],
        XmlEvent::EndElement(name("x", Some("jabber:x:data")))
    );
    assert_eq!(events[6], XmlEvent::EndElement(name("message", ns)));
}

#[test]
fn empty_default_namespace_undeclares() {
    let mut framer = XmlFramer::new();
    let events = framer.feed(b"<a xmlns='urn:a'><b xmlns=''/></a>").unwrap();
    let XmlEvent::StartElement(b) = &events[2] else {
        panic!("expected start element");
    };
    assert_eq!(b.name, name("b", None));
    assert_eq!(events.last(), Some(&XmlEvent::EndDocument));
    assert_eq!(framer.finish(), Ok(()));
}

#[test]
fn characters_are_coalesced() {
    let mut framer = XmlFramer::new();
    let events = framer
        .feed(b"<a>x &amp; y<![CDATA[ <z> ]]>&#33;</a>")
        .unwrap();
    assert_eq!(
        events,
        vec![
            XmlEvent::StartDocument,
            XmlEvent::StartElement(StartElement {
                name: name("a", None),
                attributes: Vec::new(),
                attribute_prefixes: Vec::new(),
                namespaces: Vec::new(),
                default_namespace: None,
            }),
            XmlEvent::Characters("x & y <z> !".to_string()),
            XmlEvent::EndElement(name("a", None)),
            XmlEvent::EndDocument,
        ]
    );
}

#[test]
fn xml_prefix_is_predefined() {
    let mut framer = XmlFramer::new();
    let events = framer.feed(b"<xml:a xml:lang='en'/>").unwrap();
    let XmlEvent::StartElement(a) = &events[1] else {
        panic!("expected start element");
    };
    assert_eq!(a.name.namespace.as_deref(), Some(XML_NS));
    assert_eq!(a.attribute("xml:lang"), Some("en"));
}

#[test]
fn chunked_input() {
    let doc = b"<r xmlns:p='urn:p'><p:c k='v'>text</p:c></r>";
    let mut whole = XmlFramer::new();
    let expected = whole.feed(doc).unwrap();

    let mut framer = XmlFramer::new();
    let mut events = Vec::new();
    for chunk in doc.chunks(3) {
        events.extend(framer.feed(chunk).unwrap());
    }
    assert_eq!(events, expected);
    let XmlEvent::StartElement(c) = &events[2] else {
        panic!("expected start element");
    };
    assert!(c.name.is("c", "urn:p"));
}

#[test]
fn attribute_prefixes() {
    let mut framer = XmlFramer::new();
    let events = framer
        .feed(b"<r xmlns:x='urn:x'><a x:k='1' x:j='2' xml:lang='en'/></r>")
        .unwrap();
    let XmlEvent::StartElement(a) = &events[2] else {
        panic!("expected start element");
    };
    assert_eq!(a.attribute("x:k"), Some("1"));
    assert_eq!(
        a.attribute_prefixes,
        vec![("x".to_string(), "urn:x".to_string())]
    );
    assert!(a.namespaces.is_empty());
}

#[test]
fn bad_namespaces() {
    let mut framer = XmlFramer::new();
    assert_eq!(
        framer.feed(b"<p:a/>"),
        Err(SaxError::BadXml(description::NAMESPACE_UNDECLARED_PREFIX))
    );

    framer.reset();
    assert_eq!(
        framer.feed(b"<a q:k='v'/>"),
        Err(SaxError::BadXml(description::NAMESPACE_UNDECLARED_PREFIX))
    );

    framer.reset();
    assert_eq!(
        framer.feed(b"<a xmlns:p=''/>"),
        Err(SaxError::BadXml(description::NAMESPACE_BAD_DECLARATION))
    );
}

#[test]
fn mismatched_end_tag() {
    let mut framer = XmlFramer::new();
    assert_eq!(
        framer.feed(b"<a><b></a>"),
        Err(SaxError::BadXml(description::TAG_MISMATCH))
    );
    framer.reset();
    assert!(framer.feed(b"<a><b/></a>").is_ok());
}
