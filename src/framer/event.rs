/*
** This file is a part of Iksemel (XML parser for Jabber/XMPP)
** Copyright (C) 2000-2025 Gurer Ozen
**
** Iksemel is free software: you can redistribute it and/or modify it
** under the terms of the GNU Lesser General Public License as
** published by the Free Software Foundation, either version 3 of
** the License, or (at your option) any later version.
*/

use std::fmt::Display;

/// A namespace resolved tag name.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct QName {
    pub namespace: Option<String>,
    pub prefix: Option<String>,
    pub local: String,
}

impl QName {
    /// Checks the local name and the namespace together.
    ///
    /// An empty `namespace` matches only names without a namespace.
    pub fn is(&self, local: &str, namespace: &str) -> bool {
        self.local == local && self.namespace.as_deref().unwrap_or("") == namespace
    }

    /// Name as written in the document, with the prefix if there was one.
    pub fn qualified(&self) -> String {
        self.to_string()
    }
}

impl Display for QName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.prefix {
            Some(prefix) => write!(f, "{}:{}", prefix, self.local),
            None => f.write_str(&self.local),
        }
    }
}

/// An opened tag with its attributes and namespace context.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StartElement {
    pub name: QName,
    /// Attributes except the namespace declarations, in document order.
    pub attributes: Vec<(String, String)>,
    /// Bindings of the prefixes used by the attributes, `xml` excluded.
    pub attribute_prefixes: Vec<(String, String)>,
    /// Namespace declarations made on this tag. `None` prefix is the default namespace.
    pub namespaces: Vec<(Option<String>, String)>,
    /// Default namespace in effect for the content of this tag.
    pub default_namespace: Option<String>,
}

impl StartElement {
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(attr, _)| attr == name)
            .map(|(_, value)| value.as_str())
    }

    /// Looks up a namespace declared on this very tag.
    pub fn declared_namespace(&self, prefix: Option<&str>) -> Option<&str> {
        self.namespaces
            .iter()
            .find(|(p, _)| p.as_deref() == prefix)
            .map(|(_, uri)| uri.as_str())
    }
}

/// Events produced by the [XmlFramer](super::XmlFramer).
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum XmlEvent {
    StartDocument,
    StartElement(StartElement),
    /// Character data between two tags, with references resolved and CDATA
    /// sections merged in.
    Characters(String),
    EndElement(QName),
    EndDocument,
}
