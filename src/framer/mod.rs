/*
** This file is a part of Iksemel (XML parser for Jabber/XMPP)
** Copyright (C) 2000-2025 Gurer Ozen
**
** Iksemel is free software: you can redistribute it and/or modify it
** under the terms of the GNU Lesser General Public License as
** published by the Free Software Foundation, either version 3 of
** the License, or (at your option) any later version.
*/

mod event;

pub use event::QName;
pub use event::StartElement;
pub use event::XmlEvent;

use crate::Location;
use crate::SaxElement;
use crate::SaxError;
use crate::SaxHandler;
use crate::SaxParser;
use crate::parser::description;

pub const XML_NS: &str = "http://www.w3.org/XML/1998/namespace";

macro_rules! xml_error {
    ($a:ident) => {
        return Err(SaxError::BadXml(description::$a))
    };
}

struct Scope {
    name: QName,
    raw_name: String,
    default_namespace: Option<String>,
    prefixes: Vec<(String, String)>,
}

struct EventBuilder {
    events: Vec<XmlEvent>,
    scopes: Vec<Scope>,
    tag: Option<(String, Vec<(String, String)>)>,
    text: String,
    started: bool,
}

impl EventBuilder {
    fn new() -> Self {
        Self {
            events: Vec::new(),
            scopes: Vec::new(),
            tag: None,
            text: String::new(),
            started: false,
        }
    }

    fn reset(&mut self) {
        self.events.clear();
        self.scopes.clear();
        self.tag = None;
        self.text.clear();
        self.started = false;
    }

    fn lookup_prefix<'a>(
        &'a self,
        declared: &'a [(String, String)],
        prefix: &str,
    ) -> Option<&'a str> {
        if prefix == "xml" {
            return Some(XML_NS);
        }
        declared
            .iter()
            .chain(self.scopes.iter().rev().flat_map(|scope| scope.prefixes.iter()))
            .find(|(p, _)| p == prefix)
            .map(|(_, uri)| uri.as_str())
    }

    fn flush_text(&mut self) {
        if !self.text.is_empty() {
            self.events
                .push(XmlEvent::Characters(std::mem::take(&mut self.text)));
        }
    }

    fn open_tag(&mut self, is_empty: bool) -> Result<(), SaxError> {
        let Some((raw_name, raw_attributes)) = self.tag.take() else {
            xml_error!(TAG_EMPTY_NAME);
        };

        let mut default_namespace = self
            .scopes
            .last()
            .and_then(|scope| scope.default_namespace.clone());
        let mut prefixes = Vec::new();
        let mut namespaces = Vec::new();
        let mut attributes = Vec::new();
        for (name, value) in raw_attributes {
            if name == "xmlns" {
                default_namespace = if value.is_empty() {
                    None
                } else {
                    Some(value.clone())
                };
                namespaces.push((None, value));
            } else if let Some(prefix) = name.strip_prefix("xmlns:") {
                if value.is_empty() {
                    xml_error!(NAMESPACE_BAD_DECLARATION);
                }
                prefixes.push((prefix.to_string(), value.clone()));
                namespaces.push((Some(prefix.to_string()), value));
            } else {
                match attributes.iter_mut().find(|(n, _)| *n == name) {
                    Some((_, old)) => *old = value,
                    None => attributes.push((name, value)),
                }
            }
        }

        let name = match raw_name.split_once(':') {
            Some((prefix, local)) => {
                let Some(uri) = self.lookup_prefix(&prefixes, prefix) else {
                    xml_error!(NAMESPACE_UNDECLARED_PREFIX);
                };
                QName {
                    namespace: Some(uri.to_string()),
                    prefix: Some(prefix.to_string()),
                    local: local.to_string(),
                }
            }
            None => QName {
                namespace: default_namespace.clone(),
                prefix: None,
                local: raw_name.clone(),
            },
        };

        let mut attribute_prefixes: Vec<(String, String)> = Vec::new();
        for (attribute, _) in &attributes {
            let Some((prefix, _)) = attribute.split_once(':') else {
                continue;
            };
            if prefix == "xml" || attribute_prefixes.iter().any(|(p, _)| p == prefix) {
                continue;
            }
            let Some(uri) = self.lookup_prefix(&prefixes, prefix) else {
                xml_error!(NAMESPACE_UNDECLARED_PREFIX);
            };
            attribute_prefixes.push((prefix.to_string(), uri.to_string()));
        }

        if !self.started {
            self.started = true;
            self.events.push(XmlEvent::StartDocument);
        }
        self.events.push(XmlEvent::StartElement(StartElement {
            name: name.clone(),
            attributes,
            attribute_prefixes,
            namespaces,
            default_namespace: default_namespace.clone(),
        }));

        if is_empty {
            self.events.push(XmlEvent::EndElement(name));
            if self.scopes.is_empty() {
                self.events.push(XmlEvent::EndDocument);
            }
        } else {
            self.scopes.push(Scope {
                name,
                raw_name,
                default_namespace,
                prefixes,
            });
        }
        Ok(())
    }

    fn close_tag(&mut self, raw_name: &str) -> Result<(), SaxError> {
        let Some(scope) = self.scopes.pop() else {
            xml_error!(TAG_CLOSE_WITHOUT_OPEN);
        };
        if scope.raw_name != raw_name {
            xml_error!(TAG_MISMATCH);
        }
        self.events.push(XmlEvent::EndElement(scope.name));
        if self.scopes.is_empty() {
            self.events.push(XmlEvent::EndDocument);
        }
        Ok(())
    }
}

impl SaxHandler for EventBuilder {
    fn handle_element(&mut self, element: &SaxElement) -> Result<(), SaxError> {
        match element {
            SaxElement::StartTag(name) => {
                self.flush_text();
                self.tag = Some((name.to_string(), Vec::new()));
            }
            SaxElement::Attribute(name, value) => {
                if let Some((_, attributes)) = &mut self.tag {
                    attributes.push((name.to_string(), value.to_string()));
                }
            }
            SaxElement::StartTagContent => self.open_tag(false)?,
            SaxElement::StartTagEmpty => self.open_tag(true)?,
            SaxElement::EndTag(name) => {
                self.flush_text();
                self.close_tag(name)?;
            }
            SaxElement::CData(s) => self.text.push_str(s),
        }
        Ok(())
    }
}

/// Turns a chunked byte stream into namespace resolved XML events.
///
/// Events are produced as soon as they are complete, so the start of a
/// document root which never closes (such as an XMPP stream) is reported
/// right after its start tag arrives.
pub struct XmlFramer {
    parser: SaxParser,
    builder: EventBuilder,
}

impl XmlFramer {
    pub fn new() -> Self {
        Self {
            parser: SaxParser::new(),
            builder: EventBuilder::new(),
        }
    }

    pub fn reset(&mut self) {
        self.parser.reset();
        self.builder.reset();
    }

    /// Parses the given bytes and returns every event they completed.
    ///
    /// Partial input is kept until the next call. After an error the framer
    /// must be reset before reuse.
    pub fn feed(&mut self, bytes: &[u8]) -> Result<Vec<XmlEvent>, SaxError> {
        if let Err(err) = self.parser.parse_bytes(&mut self.builder, bytes) {
            self.builder.events.clear();
            return Err(err);
        }
        Ok(std::mem::take(&mut self.builder.events))
    }

    /// Checks that a standalone document is complete.
    pub fn finish(&mut self) -> Result<(), SaxError> {
        self.parser.parse_finish()
    }

    pub fn location(&self) -> Location {
        self.parser.location()
    }

    /// Number of currently open elements.
    pub fn depth(&self) -> usize {
        self.builder.scopes.len()
    }
}

impl Default for XmlFramer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests;
