/*
** This file is a part of Iksemel (XML parser for Jabber/XMPP)
** Copyright (C) 2000-2025 Gurer Ozen
**
** Iksemel is free software: you can redistribute it and/or modify it
** under the terms of the GNU Lesser General Public License as
** published by the Free Software Foundation, either version 3 of
** the License, or (at your option) any later version.
*/

use std::env;
use std::process::ExitCode;

use iks_component::Component;
use iks_component::ComponentConfig;
use iks_component::ComponentHandle;
use iks_component::ComponentService;
use iks_component::Iq;
use iks_component::IqType;
use iks_component::Message;
use iks_component::MessageType;
use iks_component::ns;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn print_version() {
    println!("ikscomp (iksemel) v{}", iks_component::VERSION);
}

fn print_usage() {
    println!(concat!(
        "Usage: ikscomp [OPTIONS]\n",
        "This tool connects an echo component to an XMPP server.\n",
        "Options:\n",
        "  -s, --server <ADDRESS> Server address (default: localhost:5347)\n",
        "  -H, --host <DOMAIN>    Component domain\n",
        "  -p, --secret <SECRET>  Shared secret, asked when not given\n",
        "  -h, --help             Display this help message and exit\n",
        "  -v, --version          Display the version and exit\n",
        "XMPP_SERVER, XMPP_HOST and XMPP_SECRET are used for missing options.\n",
        "Report issues at https://github.com/meduketto/iksemel-rust/issues"
    ));
}

struct EchoComponent;

impl EchoComponent {
    fn disco_info(&self, request: &Iq) -> Iq {
        let mut reply = request.result_reply();
        let query = reply.add_query(ns::DISCO_INFO);
        query
            .add_child("identity")
            .set_attribute("category", Some("component"))
            .set_attribute("type", Some("generic"))
            .set_attribute("name", Some(self.description()));
        for feature in [ns::DISCO_INFO, ns::VERSION, ns::PING] {
            query.add_child("feature").set_attribute("var", Some(feature));
        }
        reply
    }

    fn version(&self, request: &Iq) -> Iq {
        let mut reply = request.result_reply();
        let query = reply.add_query(ns::VERSION);
        query.set_child_text("name", Some(self.name()));
        query.set_child_text("version", Some(iks_component::VERSION));
        reply
    }
}

impl Component for EchoComponent {
    fn name(&self) -> &str {
        "ikscomp"
    }

    fn description(&self) -> &str {
        "Echo component"
    }

    fn connected(&mut self, handle: &ComponentHandle) {
        info!(jid = %handle.jid(), "echo component is online");
    }

    fn handle_message(&mut self, handle: &ComponentHandle, message: Message) {
        if message.message_type() != MessageType::Chat {
            return;
        }
        let Some(body) = message.body() else {
            return;
        };
        let mut reply = Message::chat(&body);
        reply.set_to(message.from().as_ref());
        reply.set_from(message.to().as_ref());
        if let Some(thread) = message.thread() {
            reply.set_thread(Some(&thread));
        }
        handle.send(reply);
    }

    fn handle_iq(&mut self, _handle: &ComponentHandle, iq: Iq) -> Option<Iq> {
        if iq.iq_type() != Some(IqType::Get) {
            return None;
        }
        if iq.query(ns::DISCO_INFO).is_some() {
            Some(self.disco_info(&iq))
        } else if iq.query(ns::VERSION).is_some() {
            Some(self.version(&iq))
        } else if iq.extension("ping", ns::PING).is_some() {
            Some(iq.result_reply())
        } else {
            None
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let mut args = env::args();
    let mut server = env::var("XMPP_SERVER").ok();
    let mut host = env::var("XMPP_HOST").ok();
    let mut secret = env::var("XMPP_SECRET").ok();

    // Skip the first argument (program name)
    args.next();
    while let Some(arg) = args.next() {
        let target = match arg.as_str() {
            "-s" | "--server" => &mut server,
            "-H" | "--host" => &mut host,
            "-p" | "--secret" => &mut secret,
            "-h" | "--help" => {
                print_usage();
                return ExitCode::SUCCESS;
            }
            "-v" | "--version" => {
                print_version();
                return ExitCode::SUCCESS;
            }
            _ => {
                eprintln!("Error: unknown option {arg}");
                return ExitCode::FAILURE;
            }
        };
        match args.next() {
            Some(value) => *target = Some(value),
            None => {
                eprintln!("Error: value expected after {arg}");
                return ExitCode::FAILURE;
            }
        }
    }

    let Some(host) = host else {
        eprintln!("Error: component domain is not given, use --host");
        return ExitCode::FAILURE;
    };
    let secret = match secret {
        Some(secret) => secret,
        None => match rpassword::prompt_password("Secret: ") {
            Ok(secret) => secret,
            Err(err) => {
                eprintln!("Error: {err}");
                return ExitCode::FAILURE;
            }
        },
    };
    let config = match ComponentConfig::builder(&host, &secret).server(server).build() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Error: {err}");
            return ExitCode::FAILURE;
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut service = ComponentService::new(EchoComponent, config);
    let handle = service.handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("interrupted");
            handle.disconnect();
        }
    });

    match service.run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}
