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

/// Presence types other than plain availability.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PresenceType {
    Error,
    Probe,
    Subscribe,
    Subscribed,
    Unavailable,
    Unsubscribe,
    Unsubscribed,
}

impl PresenceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PresenceType::Error => "error",
            PresenceType::Probe => "probe",
            PresenceType::Subscribe => "subscribe",
            PresenceType::Subscribed => "subscribed",
            PresenceType::Unavailable => "unavailable",
            PresenceType::Unsubscribe => "unsubscribe",
            PresenceType::Unsubscribed => "unsubscribed",
        }
    }

    pub fn parse(s: &str) -> Option<PresenceType> {
        match s {
            "error" => Some(PresenceType::Error),
            "probe" => Some(PresenceType::Probe),
            "subscribe" => Some(PresenceType::Subscribe),
            "subscribed" => Some(PresenceType::Subscribed),
            "unavailable" => Some(PresenceType::Unavailable),
            "unsubscribe" => Some(PresenceType::Unsubscribe),
            "unsubscribed" => Some(PresenceType::Unsubscribed),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Show {
    Away,
    Chat,
    Dnd,
    Xa,
}

impl Show {
    pub fn as_str(&self) -> &'static str {
        match self {
            Show::Away => "away",
            Show::Chat => "chat",
            Show::Dnd => "dnd",
            Show::Xa => "xa",
        }
    }

    pub fn parse(s: &str) -> Option<Show> {
        match s {
            "away" => Some(Show::Away),
            "chat" => Some(Show::Chat),
            "dnd" => Some(Show::Dnd),
            "xa" => Some(Show::Xa),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Presence {
    xml: Element,
}

stanza_common!(Presence, "presence");

impl Presence {
    /// Creates an available presence.
    pub fn new() -> Presence {
        Presence {
            xml: Element::new(Self::TAG),
        }
    }

    pub fn with_type(presence_type: PresenceType) -> Presence {
        let mut presence = Presence::new();
        presence.set_presence_type(Some(presence_type));
        presence
    }

    /// `None` means the sender is available.
    pub fn presence_type(&self) -> Option<PresenceType> {
        self.xml.attribute("type").and_then(PresenceType::parse)
    }

    pub fn set_presence_type(&mut self, presence_type: Option<PresenceType>) {
        self.xml
            .set_attribute("type", presence_type.as_ref().map(PresenceType::as_str));
    }

    pub fn show(&self) -> Option<Show> {
        self.xml
            .child_text("show", ANY)
            .as_deref()
            .and_then(Show::parse)
    }

    pub fn set_show(&mut self, show: Option<Show>) {
        self.xml
            .set_child_text("show", show.as_ref().map(Show::as_str));
    }

    pub fn status(&self) -> Option<String> {
        self.xml.child_text("status", ANY)
    }

    pub fn set_status(&mut self, status: Option<&str>) {
        self.xml.set_child_text("status", status);
    }

    /// Priority of the resource, zero when missing or not a number.
    ///
    /// Values outside of the -128..127 range are clamped.
    pub fn priority(&self) -> i8 {
        self.xml
            .child_text("priority", ANY)
            .and_then(|text| text.trim().parse::<i64>().ok())
            .map_or(0, |value| value.clamp(i8::MIN.into(), i8::MAX.into()) as i8)
    }

    /// Sets the priority. Negative values are sent as zero.
    pub fn set_priority(&mut self, priority: i8) {
        let priority = priority.max(0).to_string();
        self.xml.set_child_text("priority", Some(&priority));
    }
}

impl Default for Presence {
    fn default() -> Self {
        Self::new()
    }
}
