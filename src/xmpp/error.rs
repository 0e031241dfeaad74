/*
** This file is a part of Iksemel (XML parser for Jabber/XMPP)
** Copyright (C) 2000-2025 Gurer Ozen
**
** Iksemel is free software: you can redistribute it and/or modify it
** under the terms of the GNU Lesser General Public License as
** published by the Free Software Foundation, either version 3 of
** the License, or (at your option) any later version.
*/

use thiserror::Error;

use crate::xmpp::config::ConfigError;
use crate::xmpp::stream::StreamError;

/// Reasons a component connection ended abnormally.
#[derive(Debug, Error)]
pub enum ComponentError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("connection failed: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Stream(#[from] StreamError),

    #[error("timed out connecting to the server")]
    Timeout,
}
