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

use thiserror::Error;

use crate::ANY;
use crate::Element;
use crate::xmpp::constants::ERROR_TAG;
use crate::xmpp::constants::ns;

/// How the sender should react to a stanza error (RFC 6120 section 8.3.2).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorType {
    Auth,
    Cancel,
    Continue,
    Modify,
    Wait,
}

impl ErrorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorType::Auth => "auth",
            ErrorType::Cancel => "cancel",
            ErrorType::Continue => "continue",
            ErrorType::Modify => "modify",
            ErrorType::Wait => "wait",
        }
    }

    pub fn parse(s: &str) -> Option<ErrorType> {
        match s {
            "auth" => Some(ErrorType::Auth),
            "cancel" => Some(ErrorType::Cancel),
            "continue" => Some(ErrorType::Continue),
            "modify" => Some(ErrorType::Modify),
            "wait" => Some(ErrorType::Wait),
            _ => None,
        }
    }
}

macro_rules! conditions {
    ($($variant:ident => $name:literal, $error_type:ident;)*) => {
        /// Defined stanza error conditions (RFC 6120 section 8.3.3).
        #[derive(Clone, Copy, Debug, Eq, PartialEq)]
        pub enum Condition {
            $($variant,)*
        }

        impl Condition {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Condition::$variant => $name,)*
                }
            }

            pub fn parse(s: &str) -> Option<Condition> {
                match s {
                    $($name => Some(Condition::$variant),)*
                    _ => None,
                }
            }

            /// The error type usually sent with this condition.
            pub fn default_type(&self) -> ErrorType {
                match self {
                    $(Condition::$variant => ErrorType::$error_type,)*
                }
            }
        }
    };
}

conditions! {
    BadRequest => "bad-request", Modify;
    Conflict => "conflict", Cancel;
    FeatureNotImplemented => "feature-not-implemented", Cancel;
    Forbidden => "forbidden", Auth;
    Gone => "gone", Cancel;
    InternalServerError => "internal-server-error", Cancel;
    ItemNotFound => "item-not-found", Cancel;
    JidMalformed => "jid-malformed", Modify;
    NotAcceptable => "not-acceptable", Modify;
    NotAllowed => "not-allowed", Cancel;
    NotAuthorized => "not-authorized", Auth;
    PolicyViolation => "policy-violation", Modify;
    RecipientUnavailable => "recipient-unavailable", Wait;
    Redirect => "redirect", Modify;
    RegistrationRequired => "registration-required", Auth;
    RemoteServerNotFound => "remote-server-not-found", Cancel;
    RemoteServerTimeout => "remote-server-timeout", Wait;
    ResourceConstraint => "resource-constraint", Wait;
    ServiceUnavailable => "service-unavailable", Cancel;
    SubscriptionRequired => "subscription-required", Auth;
    UndefinedCondition => "undefined-condition", Cancel;
    UnexpectedRequest => "unexpected-request", Wait;
}

impl Display for Condition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The `<error/>` payload of an error stanza.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
#[error("stanza error: {condition} ({})", .error_type.as_str())]
pub struct StanzaError {
    pub error_type: ErrorType,
    pub condition: Condition,
    pub text: Option<String>,
}

impl StanzaError {
    /// Creates an error with the usual type of the condition.
    pub fn new(condition: Condition) -> StanzaError {
        StanzaError {
            error_type: condition.default_type(),
            condition,
            text: None,
        }
    }

    pub fn with_text(mut self, text: &str) -> StanzaError {
        self.text = Some(text.to_string());
        self
    }

    /// Reads the error child of a stanza.
    ///
    /// Unknown conditions are reported as `undefined-condition`, and a
    /// missing or invalid type is replaced with the condition's usual type.
    pub fn from_stanza(stanza: &Element) -> Option<StanzaError> {
        let error = stanza.first_child(ERROR_TAG, ANY)?;
        let mut condition = Condition::UndefinedCondition;
        let mut text = None;
        for child in error.children_named(ANY, ns::STANZA_ERRORS) {
            if child.name() == "text" {
                text = Some(child.text());
            } else if let Some(known) = Condition::parse(child.name()) {
                condition = known;
            }
        }
        let error_type = error
            .attribute("type")
            .and_then(ErrorType::parse)
            .unwrap_or(condition.default_type());
        Some(StanzaError {
            error_type,
            condition,
            text,
        })
    }

    pub fn to_element(&self) -> Element {
        let mut error = Element::new(ERROR_TAG);
        error.set_attribute("type", Some(self.error_type.as_str()));
        error.add_child_ns(self.condition.as_str(), ns::STANZA_ERRORS);
        if let Some(text) = &self.text {
            error.set_child_text_ns("text", ns::STANZA_ERRORS, Some(text));
        }
        error
    }
}
