/*
** This file is a part of Iksemel (XML parser for Jabber/XMPP)
** Copyright (C) 2000-2025 Gurer Ozen
**
** Iksemel is free software: you can redistribute it and/or modify it
** under the terms of the GNU Lesser General Public License as
** published by the Free Software Foundation, either version 3 of
** the License, or (at your option) any later version.
*/

use std::slice::Iter;

use super::Element;
use super::Node;

pub struct Attributes<'a> {
    current: Iter<'a, (String, String)>,
}

impl<'a> Attributes<'a> {
    pub(super) fn new(element: &'a Element) -> Self {
        Attributes {
            current: element.attributes.iter(),
        }
    }
}

impl<'a> Iterator for Attributes<'a> {
    type Item = (&'a str, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        self.current
            .next()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }
}

/// Child elements in document order, text nodes skipped.
pub struct Children<'a> {
    current: Iter<'a, Node>,
}

impl<'a> Children<'a> {
    pub(super) fn new(element: &'a Element) -> Self {
        Children {
            current: element.children.iter(),
        }
    }
}

impl<'a> Iterator for Children<'a> {
    type Item = &'a Element;

    fn next(&mut self) -> Option<Self::Item> {
        for node in self.current.by_ref() {
            if let Node::Element(element) = node {
                return Some(element);
            }
        }
        None
    }
}
