/*
** This file is a part of Iksemel (XML parser for Jabber/XMPP)
** Copyright (C) 2000-2025 Gurer Ozen
**
** Iksemel is free software: you can redistribute it and/or modify it
** under the terms of the GNU Lesser General Public License as
** published by the Free Software Foundation, either version 3 of
** the License, or (at your option) any later version.
*/

use super::Element;
use super::HasXml;
use super::descend_mut;

/// Fluent construction of element trees.
///
/// The builder has a current element which starts as the root.
/// [child()](XmlBuilder::child) moves into the new child and
/// [parent()](XmlBuilder::parent) moves back up, while the rest of the
/// calls add to the current element and stay there.
///
/// ```
/// use iks_component::XmlBuilder;
///
/// let iq = XmlBuilder::new("iq")
///     .attribute("type", "get")
///     .child_ns("query", "http://jabber.org/protocol/disco#info")
///     .child("item")
///     .attribute("jid", "a.example.com")
///     .parent()
///     .parent()
///     .build();
/// assert_eq!(
///     iq.to_string(),
///     "<iq type=\"get\"><query xmlns=\"http://jabber.org/protocol/disco#info\"><item jid=\"a.example.com\"/></query></iq>"
/// );
/// ```
pub struct XmlBuilder {
    root: Element,
    path: Vec<usize>,
}

impl XmlBuilder {
    pub fn new(name: &str) -> XmlBuilder {
        XmlBuilder::from_element(Element::new(name))
    }

    pub fn new_ns(name: &str, namespace: &str) -> XmlBuilder {
        XmlBuilder::from_element(Element::new_ns(name, namespace))
    }

    /// Continues building on an existing tree, starting at its root.
    pub fn from_element(root: Element) -> XmlBuilder {
        XmlBuilder {
            root,
            path: Vec::new(),
        }
    }

    fn with_current(&mut self, edit: impl FnOnce(&mut Element)) {
        if let Some(current) = descend_mut(&mut self.root, &self.path) {
            edit(current);
        }
    }

    fn descend_into(mut self, child: Element) -> Self {
        let mut index = None;
        self.with_current(|current| {
            current.push_child(child);
            index = Some(current.nodes().len() - 1);
        });
        if let Some(index) = index {
            self.path.push(index);
        }
        self
    }

    pub fn attribute(mut self, name: &str, value: &str) -> Self {
        self.with_current(|current| {
            current.set_attribute(name, Some(value));
        });
        self
    }

    /// Adds a child without a namespace and makes it current.
    pub fn child(self, name: &str) -> Self {
        self.descend_into(Element::new(name))
    }

    /// Adds a child in `namespace` and makes it current.
    pub fn child_ns(self, name: &str, namespace: &str) -> Self {
        self.descend_into(Element::new_ns(name, namespace))
    }

    /// Appends a deep copy of `element`, staying on the current element.
    pub fn append(mut self, element: &impl HasXml) -> Self {
        self.with_current(|current| {
            current.append_child(element);
        });
        self
    }

    /// Adds a child with only text content, staying on the current element.
    pub fn child_text(mut self, name: &str, text: &str) -> Self {
        self.with_current(|current| {
            current.add_child(name).set_text(Some(text));
        });
        self
    }

    pub fn text(mut self, text: &str) -> Self {
        self.with_current(|current| {
            current.append_text(text);
        });
        self
    }

    /// Moves up to the parent. Stays put at the root.
    pub fn parent(mut self) -> Self {
        self.path.pop();
        self
    }

    /// The whole tree, regardless of the current position.
    pub fn xml(&self) -> &Element {
        &self.root
    }

    pub fn build(self) -> Element {
        self.root
    }
}

impl HasXml for XmlBuilder {
    fn xml(&self) -> &Element {
        &self.root
    }
}

impl From<XmlBuilder> for Element {
    fn from(builder: XmlBuilder) -> Self {
        builder.build()
    }
}
