/*
** This file is a part of Iksemel (XML parser for Jabber/XMPP)
** Copyright (C) 2000-2025 Gurer Ozen
**
** Iksemel is free software: you can redistribute it and/or modify it
** under the terms of the GNU Lesser General Public License as
** published by the Free Software Foundation, either version 3 of
** the License, or (at your option) any later version.
*/

use crate::ANY;
use crate::Element;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum MessageType {
    Chat,
    Error,
    Groupchat,
    Headline,
    #[default]
    Normal,
}

impl MessageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageType::Chat => "chat",
            MessageType::Error => "error",
            MessageType::Groupchat => "groupchat",
            MessageType::Headline => "headline",
            MessageType::Normal => "normal",
        }
    }

    pub fn parse(s: &str) -> Option<MessageType> {
        match s {
            "chat" => Some(MessageType::Chat),
            "error" => Some(MessageType::Error),
            "groupchat" => Some(MessageType::Groupchat),
            "headline" => Some(MessageType::Headline),
            "normal" => Some(MessageType::Normal),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Message {
    xml: Element,
}

stanza_common!(Message, "message");

impl Message {
    pub fn new(message_type: MessageType) -> Message {
        let mut message = Message {
            xml: Element::new(Self::TAG),
        };
        message.set_message_type(message_type);
        message
    }

    /// Creates a chat message with the given body.
    pub fn chat(body: &str) -> Message {
        let mut message = Message::new(MessageType::Chat);
        message.set_body(Some(body));
        message
    }

    /// Missing or unknown types mean a normal message.
    pub fn message_type(&self) -> MessageType {
        self.xml
            .attribute("type")
            .and_then(MessageType::parse)
            .unwrap_or_default()
    }

    pub fn set_message_type(&mut self, message_type: MessageType) {
        self.xml
            .set_attribute("type", Some(message_type.as_str()));
    }

    pub fn body(&self) -> Option<String> {
        self.xml.child_text("body", ANY)
    }

    pub fn set_body(&mut self, body: Option<&str>) {
        self.xml.set_child_text("body", body);
    }

    pub fn subject(&self) -> Option<String> {
        self.xml.child_text("subject", ANY)
    }

    pub fn set_subject(&mut self, subject: Option<&str>) {
        self.xml.set_child_text("subject", subject);
    }

    pub fn thread(&self) -> Option<String> {
        self.xml.child_text("thread", ANY)
    }

    pub fn set_thread(&mut self, thread: Option<&str>) {
        self.xml.set_child_text("thread", thread);
    }
}

impl Default for Message {
    fn default() -> Self {
        Message {
            xml: Element::new(Self::TAG),
        }
    }
}
