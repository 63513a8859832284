//! Gateway: the main event loop connecting channels to the news dispatcher.
//!
//! Each inbound message runs on its own task and produces at most one reply.

mod dispatcher;
mod format;


pub use dispatcher::Dispatcher;

use crate::commands::Command;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use steamwire_core::{
    message::{IncomingMessage, OutgoingMessage},
    traits::Channel,
};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Routes commands from every channel to the dispatcher and replies.
pub struct Gateway {
    channels: HashMap<String, Arc<dyn Channel>>,
    dispatcher: Arc<Dispatcher>,
}

impl Gateway {
    pub fn new(channels: HashMap<String, Arc<dyn Channel>>, dispatcher: Arc<Dispatcher>) -> Self {
        Self {
            channels,
            dispatcher,
        }
    }

    /// Run the main event loop until ctrl-c.
    pub async fn run(self: Arc<Self>) -> anyhow::Result<()> {
        self.run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("failed to listen for shutdown signal: {e}");
            }
        })
        .await
    }

    /// Run the main event loop until `shutdown` completes.
    pub async fn run_until<F>(self: Arc<Self>, shutdown: F) -> anyhow::Result<()>
    where
        F: Future<Output = ()>,
    {
        info!(
            "Steamwire gateway running | channels: {}",
            self.channels.keys().cloned().collect::<Vec<_>>().join(", "),
        );

        let (tx, mut rx) = mpsc::channel::<IncomingMessage>(256);

        for (name, channel) in &self.channels {
            let mut channel_rx = channel
                .start()
                .await
                .map_err(|e| anyhow::anyhow!("failed to start channel {name}: {e}"))?;
            let tx = tx.clone();
            let channel_name = name.clone();

            tokio::spawn(async move {
                while let Some(msg) = channel_rx.recv().await {
                    if tx.send(msg).await.is_err() {
                        info!("gateway receiver dropped, stopping {channel_name} forwarder");
                        break;
                    }
                }
            });

            info!("Channel started: {name}");
        }

        drop(tx);

        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                Some(incoming) = rx.recv() => {
                    let gw = self.clone();
                    tokio::spawn(async move {
                        gw.handle_message(incoming).await;
                    });
                }
                _ = &mut shutdown => {
                    info!("Received shutdown signal");
                    break;
                }
            }
        }

        self.shutdown().await;
        Ok(())
    }

    async fn handle_message(&self, incoming: IncomingMessage) {
        let Some(command) = Command::parse(&incoming.text, self.dispatcher.prefix()) else {
            debug!("ignoring non-command message from {}", incoming.sender_key());
            return;
        };

        match command {
            Command::Help => {
                self.send_text(&incoming, &self.dispatcher.help_text()).await;
            }
            Command::News { query, language } => {
                let sender_key = incoming.sender_key();
                info!(
                    "news request from {sender_key}: '{query}' lang={}",
                    language.as_deref().unwrap_or("default")
                );

                if let Some(ref target) = incoming.reply_target {
                    if let Some(channel) = self.channels.get(&incoming.channel) {
                        if let Err(e) = channel.send_typing(target).await {
                            debug!("typing indicator failed: {e}");
                        }
                    }
                }

                let text = match self
                    .dispatcher
                    .run_news(&sender_key, &query, language.as_deref())
                    .await
                {
                    Ok(delivery) => {
                        if delivery.degraded {
                            warn!("delivered untranslated news for {}", delivery.game);
                        }
                        delivery.text
                    }
                    Err(e) => {
                        info!("news request from {sender_key} rejected: {e}");
                        e.user_message()
                    }
                };
                self.send_text(&incoming, &text).await;
            }
        }
    }

    /// Stop all channels.
    async fn shutdown(&self) {
        info!("Shutting down...");
        for (name, channel) in &self.channels {
            if let Err(e) = channel.stop().await {
                warn!("failed to stop channel {name}: {e}");
            }
        }
        info!("Shutdown complete.");
    }

    /// Send a plain text message back to the sender. Failures are logged and
    /// the message is dropped.
    async fn send_text(&self, incoming: &IncomingMessage, text: &str) {
        let msg = OutgoingMessage {
            text: text.to_string(),
            reply_target: incoming.reply_target.clone(),
        };

        if let Some(channel) = self.channels.get(&incoming.channel) {
            if let Err(e) = channel.send(msg).await {
                error!("failed to send message: {e}");
            }
        }
    }
}
