/*
** This file is a part of Iksemel (XML parser for Jabber/XMPP)
** Copyright (C) 2000-2025 Gurer Ozen
**
** Iksemel is free software: you can redistribute it and/or modify it
** under the terms of the GNU Lesser General Public License as
** published by the Free Software Foundation, either version 3 of
** the License, or (at your option) any later version.
*/

use crate::Element;
use crate::QName;
use crate::StartElement;
use crate::XmlEvent;

/// What the [ElementAssembler] makes out of the event stream.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum StreamItem {
    /// A start tag above the assembly depth, e.g. the stream root.
    Open(StartElement),
    /// The end tag matching an earlier [Open](StreamItem::Open).
    Close(QName),
    /// A complete element found at the assembly depth.
    Element(Element),
}

/// Collects XML events into complete elements.
///
/// The outermost `skip` levels of the document are never assembled, their
/// start and end tags are passed through. Every element starting right
/// below them is built up and returned once its end tag arrives. With a
/// `skip` of one this yields the stanzas of an XMPP stream one by one while
/// the stream root stays open.
pub struct ElementAssembler {
    skip: usize,
    depth: usize,
    stack: Vec<Element>,
}

impl ElementAssembler {
    pub fn new(skip: usize) -> Self {
        ElementAssembler {
            skip,
            depth: 0,
            stack: Vec::new(),
        }
    }

    pub fn reset(&mut self) {
        self.depth = 0;
        self.stack.clear();
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn push(&mut self, event: XmlEvent) -> Option<StreamItem> {
        match event {
            XmlEvent::StartDocument | XmlEvent::EndDocument => None,
            XmlEvent::StartElement(start) => {
                if self.depth < self.skip {
                    self.depth += 1;
                    return Some(StreamItem::Open(start));
                }
                self.depth += 1;
                self.stack.push(Element::from_start(&start));
                None
            }
            XmlEvent::Characters(text) => {
                // Text between the top level children is not kept
                if let Some(current) = self.stack.last_mut() {
                    current.append_text(&text);
                }
                None
            }
            XmlEvent::EndElement(name) => {
                if self.depth <= self.skip {
                    self.depth = self.depth.saturating_sub(1);
                    return Some(StreamItem::Close(name));
                }
                self.depth -= 1;
                let element = self.stack.pop()?;
                match self.stack.last_mut() {
                    Some(parent) => {
                        parent.push_child(element);
                        None
                    }
                    None => Some(StreamItem::Element(element)),
                }
            }
        }
    }
}

impl Default for ElementAssembler {
    fn default() -> Self {
        Self::new(1)
    }
}

#[cfg(test)]
mod tests;
