/*
** This file is a part of Iksemel (XML parser for Jabber/XMPP)
** Copyright (C) 2000-2025 Gurer Ozen
**
** Iksemel is free software: you can redistribute it and/or modify it
** under the terms of the GNU Lesser General Public License as
** published by the Free Software Foundation, either version 3 of
** the License, or (at your option) any later version.
*/

mod builder;
mod cursor;
mod error;
mod iterators;
mod parser;

use std::fmt::Write;
use std::str::FromStr;

use crate::StartElement;
use crate::entities::escape_fmt;

pub use builder::XmlBuilder;
pub use cursor::Cursor;
pub use error::ElementError;
pub use iterators::Attributes;
pub use iterators::Children;
pub use parser::ElementParser;

/// Wildcard accepted by the name and namespace lookups.
pub const ANY: &str = "*";

/// Something that can be viewed as an XML element.
pub trait HasXml {
    fn xml(&self) -> &Element;
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
}

/// An owned, mutable XML element tree.
///
/// Unlike the parsed stream, elements are plain values: cloning one makes a
/// deep copy and nothing is shared between two trees.
///
/// ```
/// use iks_component::Element;
///
/// let mut message = Element::new("message");
/// message.set_attribute("to", Some("juliet@example.com"));
/// message.set_child_text("body", Some("Art thou not Romeo?"));
/// assert_eq!(
///     message.to_string(),
///     "<message to=\"juliet@example.com\"><body>Art thou not Romeo?</body></message>"
/// );
/// ```
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Element {
    name: String,
    prefix: Option<String>,
    namespace: Option<String>,
    attributes: Vec<(String, String)>,
    attribute_prefixes: Vec<(String, String)>,
    children: Vec<Node>,
}

fn matches(element: &Element, name: &str, namespace: &str) -> bool {
    (name == ANY || element.name == name)
        && (namespace == ANY || element.namespace.as_deref().unwrap_or("") == namespace)
}

fn namespace_value(namespace: &str) -> Option<String> {
    if namespace.is_empty() {
        None
    } else {
        Some(namespace.to_string())
    }
}

pub(crate) fn descend_mut<'a>(mut element: &'a mut Element, path: &[usize]) -> Option<&'a mut Element> {
    for &index in path {
        element = match element.children.get_mut(index)? {
            Node::Element(child) => child,
            Node::Text(_) => return None,
        };
    }
    Some(element)
}

impl Element {
    /// Creates an element without a namespace.
    pub fn new(name: &str) -> Element {
        Element {
            name: name.to_string(),
            prefix: None,
            namespace: None,
            attributes: Vec::new(),
            attribute_prefixes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Creates an element in the given namespace. An empty namespace means none.
    pub fn new_ns(name: &str, namespace: &str) -> Element {
        let mut element = Element::new(name);
        element.namespace = namespace_value(namespace);
        element
    }

    /// Creates a prefixed element, e.g. `stream:error`.
    pub fn new_prefixed(prefix: &str, name: &str, namespace: &str) -> Element {
        let mut element = Element::new_ns(name, namespace);
        element.prefix = Some(prefix.to_string());
        element
    }

    pub(crate) fn from_start(start: &StartElement) -> Element {
        Element {
            name: start.name.local.clone(),
            prefix: start.name.prefix.clone(),
            namespace: start.name.namespace.clone(),
            attributes: start.attributes.clone(),
            attribute_prefixes: start.attribute_prefixes.clone(),
            children: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    pub fn set_namespace(&mut self, namespace: &str) {
        self.namespace = namespace_value(namespace);
    }

    /// Checks the name and namespace, both accepting [ANY].
    pub fn is(&self, name: &str, namespace: &str) -> bool {
        matches(self, name, namespace)
    }

    /// Moves every element of the subtree in `namespace` out of any namespace.
    ///
    /// Prefixed elements keep their namespace.
    pub(crate) fn strip_namespace(&mut self, namespace: &str) {
        if self.prefix.is_none() && self.namespace.as_deref() == Some(namespace) {
            self.namespace = None;
        }
        for node in &mut self.children {
            if let Node::Element(child) = node {
                child.strip_namespace(namespace);
            }
        }
    }

    //
    // Attributes
    //

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(attr, _)| attr == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attribute(name).is_some()
    }

    pub fn attributes(&self) -> Attributes<'_> {
        Attributes::new(self)
    }

    /// Sets an attribute value, or removes the attribute when `value` is `None`.
    ///
    /// An existing attribute keeps its position.
    pub fn set_attribute(&mut self, name: &str, value: Option<&str>) -> &mut Element {
        let pos = self.attributes.iter().position(|(attr, _)| attr == name);
        match (pos, value) {
            (Some(pos), Some(value)) => self.attributes[pos].1 = value.to_string(),
            (Some(pos), None) => {
                self.attributes.remove(pos);
            }
            (None, Some(value)) => self
                .attributes
                .push((name.to_string(), value.to_string())),
            (None, None) => (),
        }
        self
    }

    /// Binds a prefix used by attribute names, e.g. `x` for `x:k`.
    ///
    /// The declaration is written on this element unless the same binding
    /// is already in scope.
    pub fn declare_prefix(&mut self, prefix: &str, namespace: &str) -> &mut Element {
        match self.attribute_prefixes.iter_mut().find(|(p, _)| p == prefix) {
            Some((_, uri)) => *uri = namespace.to_string(),
            None => self
                .attribute_prefixes
                .push((prefix.to_string(), namespace.to_string())),
        }
        self
    }

    //
    // Children
    //

    pub fn nodes(&self) -> &[Node] {
        &self.children
    }

    pub fn children(&self) -> Children<'_> {
        Children::new(self)
    }

    pub fn children_named<'a>(
        &'a self,
        name: &'a str,
        namespace: &'a str,
    ) -> impl Iterator<Item = &'a Element> {
        self.children()
            .filter(move |child| matches(child, name, namespace))
    }

    pub fn children_by<'a, P>(&'a self, predicate: P) -> impl Iterator<Item = &'a Element>
    where
        P: Fn(&Element) -> bool + 'a,
    {
        self.children().filter(move |child| predicate(child))
    }

    pub fn first_child(&self, name: &str, namespace: &str) -> Option<&Element> {
        self.children().find(|child| matches(child, name, namespace))
    }

    pub fn first_child_mut(&mut self, name: &str, namespace: &str) -> Option<&mut Element> {
        self.children.iter_mut().find_map(|node| match node {
            Node::Element(child) if matches(child, name, namespace) => Some(child),
            _ => None,
        })
    }

    pub fn first_child_by<P>(&self, predicate: P) -> Option<&Element>
    where
        P: Fn(&Element) -> bool,
    {
        self.children().find(|child| predicate(child))
    }

    pub fn has_child(&self, name: &str, namespace: &str) -> bool {
        self.first_child(name, namespace).is_some()
    }

    /// Text content of the first matching child.
    pub fn child_text(&self, name: &str, namespace: &str) -> Option<String> {
        self.first_child(name, namespace).map(Element::text)
    }

    /// Adds a new empty child without a namespace and returns it.
    pub fn add_child(&mut self, name: &str) -> &mut Element {
        self.push_child(Element::new(name))
    }

    pub fn add_child_ns(&mut self, name: &str, namespace: &str) -> &mut Element {
        self.push_child(Element::new_ns(name, namespace))
    }

    /// Appends a deep copy of the given element.
    pub fn append_child(&mut self, child: &impl HasXml) -> &mut Element {
        self.push_child(child.xml().clone())
    }

    /// Moves the element in as the last child.
    pub fn push_child(&mut self, child: Element) -> &mut Element {
        self.children.push(Node::Element(child));
        match self.children.last_mut() {
            Some(Node::Element(child)) => child,
            _ => unreachable!("an element was just pushed"),
        }
    }

    pub fn append_text(&mut self, text: &str) -> &mut Element {
        if let Some(Node::Text(last)) = self.children.last_mut() {
            last.push_str(text);
        } else if !text.is_empty() {
            self.children.push(Node::Text(text.to_string()));
        }
        self
    }

    /// Removes the first matching child and returns it.
    pub fn remove_child(&mut self, name: &str, namespace: &str) -> Option<Element> {
        let pos = self.children.iter().position(|node| match node {
            Node::Element(child) => matches(child, name, namespace),
            Node::Text(_) => false,
        })?;
        match self.children.remove(pos) {
            Node::Element(child) => Some(child),
            Node::Text(_) => None,
        }
    }

    //
    // Text
    //

    /// Concatenated text of the whole subtree.
    pub fn text(&self) -> String {
        let mut buf = String::new();
        self.collect_text(&mut buf);
        buf
    }

    fn collect_text(&self, buf: &mut String) {
        for node in &self.children {
            match node {
                Node::Text(text) => buf.push_str(text),
                Node::Element(child) => child.collect_text(buf),
            }
        }
    }

    /// Replaces all children with the given text.
    pub fn set_text(&mut self, text: Option<&str>) {
        self.children.clear();
        if let Some(text) = text {
            if !text.is_empty() {
                self.children.push(Node::Text(text.to_string()));
            }
        }
    }

    /// Sets the text of the first child named `name` in any namespace.
    ///
    /// A missing child is created without a namespace, and `None` removes
    /// the child.
    pub fn set_child_text(&mut self, name: &str, text: Option<&str>) {
        self.replace_child_text(name, ANY, "", text);
    }

    /// Like [set_child_text()](Element::set_child_text) but only looks in
    /// `namespace` and creates the child there.
    pub fn set_child_text_ns(&mut self, name: &str, namespace: &str, text: Option<&str>) {
        self.replace_child_text(name, namespace, namespace, text);
    }

    fn replace_child_text(&mut self, name: &str, lookup: &str, create: &str, text: Option<&str>) {
        match text {
            None => {
                self.remove_child(name, lookup);
            }
            Some(text) => match self.first_child_mut(name, lookup) {
                Some(child) => child.set_text(Some(text)),
                None => self.add_child_ns(name, create).set_text(Some(text)),
            },
        }
    }

    //
    // Serialization
    //

    fn write_xml<'a, W: Write>(
        &'a self,
        out: &mut W,
        parent_default: Option<&'a str>,
        prefixes: &mut Vec<(&'a str, &'a str)>,
    ) -> std::fmt::Result {
        let mark = prefixes.len();
        let mut default = parent_default;

        out.write_char('<')?;
        if let Some(prefix) = &self.prefix {
            out.write_str(prefix)?;
            out.write_char(':')?;
        }
        out.write_str(&self.name)?;
        match (self.prefix.as_deref(), self.namespace.as_deref()) {
            (None, namespace) => {
                if namespace != parent_default {
                    out.write_str(" xmlns=\"")?;
                    escape_fmt(namespace.unwrap_or(""), out)?;
                    out.write_char('"')?;
                    default = namespace;
                }
            }
            (Some(prefix), Some(namespace)) => {
                let declared = prefixes
                    .iter()
                    .rev()
                    .find(|(p, _)| *p == prefix)
                    .map(|(_, uri)| *uri);
                if declared != Some(namespace) {
                    write!(out, " xmlns:{prefix}=\"")?;
                    escape_fmt(namespace, out)?;
                    out.write_char('"')?;
                    prefixes.push((prefix, namespace));
                }
            }
            (Some(_), None) => (),
        }
        for (prefix, namespace) in &self.attribute_prefixes {
            let declared = prefixes
                .iter()
                .rev()
                .find(|(p, _)| *p == prefix.as_str())
                .map(|(_, uri)| *uri);
            if declared != Some(namespace.as_str()) {
                write!(out, " xmlns:{prefix}=\"")?;
                escape_fmt(namespace, out)?;
                out.write_char('"')?;
                prefixes.push((prefix.as_str(), namespace.as_str()));
            }
        }
        for (name, value) in &self.attributes {
            out.write_char(' ')?;
            out.write_str(name)?;
            out.write_str("=\"")?;
            escape_fmt(value, out)?;
            out.write_char('"')?;
        }

        if self.children.is_empty() {
            out.write_str("/>")?;
        } else {
            out.write_char('>')?;
            for node in &self.children {
                match node {
                    Node::Text(text) => escape_fmt(text, out)?,
                    Node::Element(child) => child.write_xml(out, default, prefixes)?,
                }
            }
            out.write_str("</")?;
            if let Some(prefix) = &self.prefix {
                out.write_str(prefix)?;
                out.write_char(':')?;
            }
            out.write_str(&self.name)?;
            out.write_char('>')?;
        }

        prefixes.truncate(mark);
        Ok(())
    }
}

impl HasXml for Element {
    fn xml(&self) -> &Element {
        self
    }
}

impl std::fmt::Display for Element {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.write_xml(f, None, &mut Vec::new())
    }
}

impl FromStr for Element {
    type Err = ElementError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parser = ElementParser::new();
        parser.parse_bytes(s.as_bytes())?;
        parser.into_element()
    }
}

#[cfg(test)]
mod tests;
