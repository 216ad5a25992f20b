//
// Copyright 2017-2026 Hans W. Uhlig. All Rights Reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

//! Minimal echo portal: `cargo run --example echo_portal`, then
//! `telnet 127.0.0.1 4000`.

use async_trait::async_trait;
use mudgate_service::{
    ServiceConfig, SessionHandle, SessionHandler, ShutdownCause, TelnetService,
};
use std::sync::Arc;

struct EchoHandler;

#[async_trait]
impl SessionHandler for EchoHandler {
    async fn on_session_ready(&self, session: SessionHandle) {
        let caps = session.capabilities();
        tracing::info!(
            "session {} ready: {} {} color={:?} {}x{}",
            caps.session_name,
            caps.client_name,
            caps.client_version,
            caps.color,
            caps.width,
            caps.height,
        );
        session.send_text("Welcome to the echo portal. Type quit to leave.\n");
        while let Some(command) = session.recv().await {
            if command.text == "quit" {
                session.send_text("Goodbye.\n");
                session.shutdown(ShutdownCause::ApplicationRequest);
                return;
            }
            session.send_text(&format!("you said: {}\n", command.text));
        }
    }

    async fn on_session_closed(&self, session: SessionHandle, cause: ShutdownCause) {
        tracing::info!("session {} closed ({cause})", session.session_name());
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let config = ServiceConfig::new("127.0.0.1:4000".parse()?);
    let service = TelnetService::bind(config).await?;

    let shutdown = service.shutdown_handle();
    tokio::spawn(async move {
        let _ = tokio::signal::ctrl_c().await;
        shutdown.trigger(ShutdownCause::GracefulShutdown);
    });

    service.run(Arc::new(EchoHandler)).await?;
    Ok(())
}
