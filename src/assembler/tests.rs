/*
** This file is a part of Iksemel (XML parser for Jabber/XMPP)
** Copyright (C) 2000-2025 Gurer Ozen
**
** Iksemel is free software: you can redistribute it and/or modify it
** under the terms of the GNU Lesser General Public License as
** published by the Free Software Foundation, either version 3 of
** the License, or (at your option) any later version.
*/

use proptest::prelude::*;

use super::*;
use crate::XmlFramer;

const STREAM: &str = "<stream:stream xmlns='jabber:component:accept' xmlns:stream='http://etherx.jabber.org/streams' from='example.org' id='abc'> <message to='a@b'><body>one</body></message>\n<presence/> <iq type='get' id='1'><query xmlns='jabber:iq:version'/></iq></stream:stream>";

fn assemble(chunks: &[&[u8]]) -> Vec<StreamItem> {
    let mut framer = XmlFramer::new();
    let mut assembler = ElementAssembler::default();
    let mut items = Vec::new();
    for chunk in chunks {
        for event in framer.feed(chunk).unwrap() {
            if let Some(item) = assembler.push(event) {
                items.push(item);
            }
        }
    }
    items
}

#[test]
fn stream_items() {
    let items = assemble(&[STREAM.as_bytes()]);
    assert_eq!(items.len(), 5);

    let StreamItem::Open(root) = &items[0] else {
        panic!("expected the stream root, got {:?}", items[0]);
    };
    assert_eq!(root.attribute("id"), Some("abc"));

    let StreamItem::Element(message) = &items[1] else {
        panic!("expected an element");
    };
    assert!(message.is("message", "jabber:component:accept"));
    assert_eq!(message.child_text("body", crate::ANY).as_deref(), Some("one"));
    // keep-alive whitespace around stanzas is dropped
    assert_eq!(message.nodes().len(), 1);

    let StreamItem::Element(presence) = &items[2] else {
        panic!("expected an element");
    };
    assert_eq!(presence.name(), "presence");

    let StreamItem::Element(iq) = &items[3] else {
        panic!("expected an element");
    };
    assert!(iq.has_child("query", "jabber:iq:version"));

    let StreamItem::Close(name) = &items[4] else {
        panic!("expected the stream close");
    };
    assert!(name.is("stream", "http://etherx.jabber.org/streams"));
}

#[test]
fn partial_stanza_waits() {
    let mut framer = XmlFramer::new();
    let mut assembler = ElementAssembler::new(1);
    let mut items = Vec::new();
    for event in framer
        .feed(b"<stream:stream xmlns:stream='http://etherx.jabber.org/streams'><message><bo")
        .unwrap()
    {
        items.extend(assembler.push(event));
    }
    assert_eq!(items.len(), 1);
    assert_eq!(assembler.depth(), 2);
    for event in framer.feed(b"dy>hi</body></message>").unwrap() {
        items.extend(assembler.push(event));
    }
    assert_eq!(items.len(), 2);
    assert_eq!(assembler.depth(), 1);
}

#[test]
fn skip_zero_assembles_the_root() {
    let mut framer = XmlFramer::new();
    let mut assembler = ElementAssembler::new(0);
    let items: Vec<StreamItem> = framer
        .feed(b"<a><b>x</b>y</a>")
        .unwrap()
        .into_iter()
        .filter_map(|event| assembler.push(event))
        .collect();
    assert_eq!(items.len(), 1);
    let StreamItem::Element(a) = &items[0] else {
        panic!("expected an element");
    };
    assert_eq!(a.to_string(), "<a><b>x</b>y</a>");
}

proptest! {
    #[test]
    fn chunking_keeps_order(cuts in proptest::collection::vec(0..STREAM.len(), 0..12)) {
        let bytes = STREAM.as_bytes();
        let mut cuts = cuts;
        cuts.sort_unstable();
        cuts.dedup();
        let mut chunks: Vec<&[u8]> = Vec::new();
        let mut start = 0;
        for cut in cuts {
            chunks.push(&bytes[start..cut]);
            start = cut;
        }
        chunks.push(&bytes[start..]);

        prop_assert_eq!(assemble(&chunks), assemble(&[bytes]));
    }
}
