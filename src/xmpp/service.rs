/*
** This file is a part of Iksemel (XML parser for Jabber/XMPP)
** Copyright (C) 2000-2025 Gurer Ozen
**
** Iksemel is free software: you can redistribute it and/or modify it
** under the terms of the GNU Lesser General Public License as
** published by the Free Software Foundation, either version 3 of
** the License, or (at your option) any later version.
*/

use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;

use tokio::io::AsyncRead;
use tokio::io::AsyncReadExt;
use tokio::io::AsyncWrite;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::time::timeout;
use tracing::debug;
use tracing::error;
use tracing::info;
use tracing::instrument;
use tracing::trace;
use tracing::warn;

use crate::xmpp::component::Command;
use crate::xmpp::component::Component;
use crate::xmpp::component::ComponentHandle;
use crate::xmpp::config::ComponentConfig;
use crate::xmpp::dispatcher::Dispatcher;
use crate::xmpp::error::ComponentError;
use crate::xmpp::stream::ComponentStream;
use crate::xmpp::stream::StreamError;
use crate::xmpp::stream::StreamEvent;

async fn send_text<T>(transport: &mut T, text: &str) -> Result<(), ComponentError>
where
    T: AsyncWrite + Unpin,
{
    trace!(text, "sending");
    transport.write_all(text.as_bytes()).await?;
    transport.flush().await?;
    Ok(())
}

/// Runs a [Component] over a connection to an XMPP server.
///
/// ```no_run
/// use iks_component::{Component, ComponentConfig, ComponentService};
///
/// struct Silent;
///
/// impl Component for Silent {
///     fn name(&self) -> &str { "silent" }
///     fn description(&self) -> &str { "ignores everything" }
/// }
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = ComponentConfig::builder("silent.example.com", "s3cret").build()?;
/// let mut service = ComponentService::new(Silent, config);
/// service.run().await?;
/// # Ok(())
/// # }
/// ```
pub struct ComponentService<C: Component> {
    component: C,
    config: ComponentConfig,
    handle: ComponentHandle,
    commands: mpsc::UnboundedReceiver<Command>,
    connected: Arc<AtomicBool>,
}

impl<C: Component> ComponentService<C> {
    pub fn new(component: C, config: ComponentConfig) -> Self {
        let (sender, commands) = mpsc::unbounded_channel();
        let connected = Arc::new(AtomicBool::new(false));
        let handle = ComponentHandle::new(config.xmpp_host().clone(), sender, connected.clone());
        ComponentService {
            component,
            config,
            handle,
            commands,
            connected,
        }
    }

    /// A handle for sending stanzas from outside of the callbacks.
    pub fn handle(&self) -> ComponentHandle {
        self.handle.clone()
    }

    pub fn component(&self) -> &C {
        &self.component
    }

    pub fn component_mut(&mut self) -> &mut C {
        &mut self.component
    }

    pub fn config(&self) -> &ComponentConfig {
        &self.config
    }

    /// Connects to the configured server and runs until disconnected.
    pub async fn run(&mut self) -> Result<(), ComponentError> {
        let address = self.config.server_address();
        info!(address, "connecting");
        let transport = match timeout(self.config.connection_timeout(), TcpStream::connect(address)).await {
            Ok(result) => result?,
            Err(_) => {
                error!(address, "connection timed out");
                return Err(ComponentError::Timeout);
            }
        };
        transport.set_nodelay(true)?;
        self.run_on(transport).await
    }

    /// Runs the component protocol over an already connected transport.
    ///
    /// Returns when either side closes the stream. Waiting requests are
    /// cancelled and [Component::disconnected] is called before returning.
    #[instrument(
        name = "component",
        skip_all,
        fields(component = self.component.name(), host = %self.config.xmpp_host())
    )]
    pub async fn run_on<T>(&mut self, mut transport: T) -> Result<(), ComponentError>
    where
        T: AsyncRead + AsyncWrite + Unpin,
    {
        self.drop_commands();
        let mut stream = ComponentStream::new(self.config.xmpp_host().clone(), self.config.secret());
        let mut dispatcher = Dispatcher::new();

        let result = self.session(&mut transport, &mut stream, &mut dispatcher).await;

        self.connected.store(false, Ordering::Release);
        dispatcher.cancel_all();
        self.drop_commands();
        if let Err(err) = transport.shutdown().await {
            debug!(%err, "transport shutdown failed");
        }
        match &result {
            Ok(()) => info!("disconnected"),
            Err(err) => error!(%err, "connection failed"),
        }
        self.component.disconnected();
        result
    }

    async fn session<T>(
        &mut self,
        transport: &mut T,
        stream: &mut ComponentStream,
        dispatcher: &mut Dispatcher,
    ) -> Result<(), ComponentError>
    where
        T: AsyncRead + AsyncWrite + Unpin,
    {
        send_text(transport, &stream.open()).await?;
        let mut buffer = [0u8; 4096];
        loop {
            tokio::select! {
                read = transport.read(&mut buffer) => {
                    let count = read?;
                    if count == 0 {
                        warn!("server closed the connection");
                        return Err(StreamError::Disconnected.into());
                    }
                    trace!(bytes = %String::from_utf8_lossy(&buffer[..count]), "received");
                    for event in stream.receive_bytes(&buffer[..count])? {
                        match event {
                            StreamEvent::Send(text) => send_text(transport, &text).await?,
                            StreamEvent::Authenticated => {
                                info!("authenticated");
                                self.connected.store(true, Ordering::Release);
                                self.component.connected(&self.handle);
                            }
                            StreamEvent::Stanza(stanza) => {
                                debug!(stanza = stanza.name(), id = stanza.id(), "received stanza");
                                let reply = dispatcher.dispatch(stanza, &mut self.component, &self.handle);
                                if let Some(reply) = reply {
                                    self.handle.send(reply);
                                }
                                // Replies go out before anything that follows in this batch
                                if self.run_queued(transport, stream, dispatcher).await? {
                                    return Ok(());
                                }
                            }
                            StreamEvent::Closed => {
                                info!("server closed the stream");
                                return Ok(());
                            }
                        }
                    }
                }
                Some(command) = self.commands.recv() => {
                    if self.execute(command, transport, stream, dispatcher).await? {
                        return Ok(());
                    }
                }
            }
        }
    }

    /// Carries out a command, returns true when the session is over.
    async fn execute<T>(
        &mut self,
        command: Command,
        transport: &mut T,
        stream: &mut ComponentStream,
        dispatcher: &mut Dispatcher,
    ) -> Result<bool, ComponentError>
    where
        T: AsyncWrite + Unpin,
    {
        match command {
            Command::Send(stanza) => {
                if self.connected.load(Ordering::Acquire) {
                    send_text(transport, &stanza.to_string()).await?;
                } else {
                    warn!(%stanza, "stream is not ready, dropping stanza");
                }
            }
            Command::SendIq(mut iq, waiter) => {
                if !self.connected.load(Ordering::Acquire) {
                    warn!(%iq, "stream is not ready, cancelling request");
                    return Ok(false);
                }
                match dispatcher.register_waiter(&mut iq, waiter) {
                    Ok(()) => send_text(transport, &iq.to_string()).await?,
                    Err(err) => warn!(%err, %iq, "cannot send request"),
                }
            }
            Command::Disconnect => {
                info!("disconnecting");
                self.component.will_disconnect(&self.handle);
                self.flush_commands(transport).await?;
                if let Some(close) = stream.close() {
                    send_text(transport, &close).await?;
                }
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Carries out the commands queued so far.
    async fn run_queued<T>(
        &mut self,
        transport: &mut T,
        stream: &mut ComponentStream,
        dispatcher: &mut Dispatcher,
    ) -> Result<bool, ComponentError>
    where
        T: AsyncWrite + Unpin,
    {
        while let Ok(command) = self.commands.try_recv() {
            if self.execute(command, transport, stream, dispatcher).await? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Writes the stanzas queued so far, cancelling queued requests.
    async fn flush_commands<T>(&mut self, transport: &mut T) -> Result<(), ComponentError>
    where
        T: AsyncWrite + Unpin,
    {
        while let Ok(command) = self.commands.try_recv() {
            if let Command::Send(stanza) = command {
                send_text(transport, &stanza.to_string()).await?;
            }
        }
        Ok(())
    }

    fn drop_commands(&mut self) {
        while let Ok(command) = self.commands.try_recv() {
            debug!(?command, "dropping queued command");
        }
    }
}
