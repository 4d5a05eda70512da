//! Message hand-off between sessions and registered handlers
//!
//! Sessions publish completed messages through a [`Publisher`]. A single
//! dispatcher task receives them one at a time and runs every registered
//! handler, in registration order, before receiving the next one.
//!
//! The hand-off is a rendezvous: [`Publisher::publish`] returns only once the
//! dispatcher has taken the message, so a busy dispatcher holds back the
//! DATA phase of every session.
//!
//! A panicking handler is logged and skipped. The remaining handlers still
//! run and the dispatcher keeps serving later messages.

use crate::error::{Result, SmtpError};
use crate::smtp::message::Message;
use crate::smtp::server::Registry;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

type Delivery = (Message, oneshot::Sender<()>);

#[derive(Clone)]
pub struct Publisher {
    tx: mpsc::Sender<Delivery>,
}

impl Publisher {
    /// Hand a message to the dispatcher and wait until it has been taken.
    pub async fn publish(&self, message: Message) -> Result<()> {
        let (ack_tx, ack_rx) = oneshot::channel();
        self.tx
            .send((message, ack_tx))
            .await
            .map_err(|_| SmtpError::Closed)?;
        ack_rx.await.map_err(|_| SmtpError::Closed)
    }
}

/// Start the dispatcher task. It stops once every [`Publisher`] is dropped.
pub fn spawn_dispatcher(registry: Arc<Registry>) -> (Publisher, JoinHandle<()>) {
    let (tx, mut rx) = mpsc::channel::<Delivery>(1);

    let handle = tokio::spawn(async move {
        while let Some((message, ack)) = rx.recv().await {
            // Handlers registered after the hand-off must not see this message.
            let handlers = registry.handlers().await;
            let _ = ack.send(());

            debug!(
                "Dispatching message from <{}> to {} handler(s)",
                message.sender,
                handlers.len()
            );
            for (index, handler) in handlers.iter().enumerate() {
                if panic::catch_unwind(AssertUnwindSafe(|| handler(&message))).is_err() {
                    error!(
                        "Handler #{} panicked on message from <{}>",
                        index, message.sender
                    );
                }
            }
        }
        info!("Message dispatcher stopped");
    });

    (Publisher { tx }, handle)
}
