/*
** This file is a part of Iksemel (XML parser for Jabber/XMPP)
** Copyright (C) 2000-2025 Gurer Ozen
**
** Iksemel is free software: you can redistribute it and/or modify it
** under the terms of the GNU Lesser General Public License as
** published by the Free Software Foundation, either version 3 of
** the License, or (at your option) any later version.
*/

use std::time::Duration;

use thiserror::Error;

use crate::BadJid;
use crate::Jid;
use crate::xmpp::constants::COMPONENT_PORT;

pub const SERVER_VARIABLE: &str = "XMPP_SERVER";
pub const HOST_VARIABLE: &str = "XMPP_HOST";
pub const SECRET_VARIABLE: &str = "XMPP_SECRET";

#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum ConfigError {
    #[error("invalid component host: {0}")]
    BadHost(#[from] BadJid),

    #[error("component host must be a bare domain")]
    HostNotDomain,

    #[error("component secret is empty")]
    EmptySecret,

    #[error("environment variable {0} is not set")]
    MissingVariable(&'static str),
}

/// Connection settings of a component.
#[derive(Clone, Debug)]
pub struct ComponentConfig {
    server_address: String,
    xmpp_host: Jid,
    secret: String,
    connection_timeout: Duration,
}

pub struct ComponentConfigBuilder {
    xmpp_host: String,
    secret: String,
    server: Option<String>,
    connection_timeout: Duration,
}

impl ComponentConfigBuilder {
    pub fn new(xmpp_host: &str, secret: &str) -> Self {
        ComponentConfigBuilder {
            xmpp_host: xmpp_host.to_string(),
            secret: secret.to_string(),
            server: None,
            connection_timeout: Duration::from_secs(30),
        }
    }

    /// Address of the XMPP server, `localhost` when not given.
    ///
    /// The component port is used unless the address carries one.
    pub fn server(mut self, server: Option<String>) -> Self {
        self.server = server;
        self
    }

    pub fn connection_timeout(mut self, timeout: Duration) -> Self {
        self.connection_timeout = timeout;
        self
    }

    pub fn build(self) -> Result<ComponentConfig, ConfigError> {
        let xmpp_host = Jid::new(&self.xmpp_host)?;
        if !xmpp_host.is_bare() || xmpp_host.localpart().is_some() {
            return Err(ConfigError::HostNotDomain);
        }
        if self.secret.is_empty() {
            return Err(ConfigError::EmptySecret);
        }
        let host = self.server.unwrap_or_else(|| "localhost".to_string());
        // Resolver needs a port number but has no way to supply a default
        let column_pos = host.rfind(':');
        let bracket_pos = host.rfind(']');
        let need_port = match (column_pos, bracket_pos) {
            (None, _) => true,
            (Some(_), None) => false,
            (Some(column), Some(bracket)) => column < bracket,
        };
        let server_address = if need_port {
            format!("{host}:{COMPONENT_PORT}")
        } else {
            host
        };
        Ok(ComponentConfig {
            server_address,
            xmpp_host,
            secret: self.secret,
            connection_timeout: self.connection_timeout,
        })
    }
}

impl ComponentConfig {
    pub fn builder(xmpp_host: &str, secret: &str) -> ComponentConfigBuilder {
        ComponentConfigBuilder::new(xmpp_host, secret)
    }

    /// Reads `XMPP_SERVER`, `XMPP_HOST` and `XMPP_SECRET`.
    ///
    /// Only the server address is optional.
    pub fn from_env() -> Result<ComponentConfig, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<ComponentConfig, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup(HOST_VARIABLE).ok_or(ConfigError::MissingVariable(HOST_VARIABLE))?;
        let secret =
            lookup(SECRET_VARIABLE).ok_or(ConfigError::MissingVariable(SECRET_VARIABLE))?;
        ComponentConfigBuilder::new(&host, &secret)
            .server(lookup(SERVER_VARIABLE))
            .build()
    }

    /// Server address with a port, ready for connecting.
    pub fn server_address(&self) -> &str {
        &self.server_address
    }

    /// Domain of the component.
    pub fn xmpp_host(&self) -> &Jid {
        &self.xmpp_host
    }

    pub fn secret(&self) -> &str {
        &self.secret
    }

    pub fn connection_timeout(&self) -> Duration {
        self.connection_timeout
    }
}
