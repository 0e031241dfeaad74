/*
** This file is a part of Iksemel (XML parser for Jabber/XMPP)
** Copyright (C) 2000-2025 Gurer Ozen
**
** Iksemel is free software: you can redistribute it and/or modify it
** under the terms of the GNU Lesser General Public License as
** published by the Free Software Foundation, either version 3 of
** the License, or (at your option) any later version.
*/

use crate::ElementAssembler;
use crate::Location;
use crate::StreamItem;
use crate::XmlFramer;

use super::Element;
use super::error::ElementError;
use super::error::description;

/// Parses a standalone document into an [Element].
pub struct ElementParser {
    framer: XmlFramer,
    assembler: ElementAssembler,
    element: Option<Element>,
}

impl ElementParser {
    pub fn new() -> ElementParser {
        ElementParser {
            framer: XmlFramer::new(),
            assembler: ElementAssembler::new(0),
            element: None,
        }
    }

    pub fn parse_bytes(&mut self, bytes: &[u8]) -> Result<(), ElementError> {
        for event in self.framer.feed(bytes)? {
            if let Some(StreamItem::Element(element)) = self.assembler.push(event) {
                self.element = Some(element);
            }
        }
        Ok(())
    }

    pub fn into_element(mut self) -> Result<Element, ElementError> {
        self.framer.finish()?;
        self.element
            .take()
            .ok_or(ElementError::BadXml(description::NO_ELEMENT))
    }

    pub fn location(&self) -> Location {
        self.framer.location()
    }
}

impl Default for ElementParser {
    fn default() -> Self {
        Self::new()
    }
}
