use crate::config::Config;
use crate::error::{Result, SmtpError};
use crate::smtp::dispatcher::{spawn_dispatcher, Publisher};
use crate::smtp::message::{Mailbox, Message};
use crate::smtp::session::SmtpSession;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, ToSocketAddrs};
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Receives every message completed after it was registered.
pub type Handler = Arc<dyn Fn(&Message) + Send + Sync>;

/// Resolves a VRFY argument; returns `Mailbox::default()` when unknown.
pub type Verifier = Arc<dyn Fn(&str) -> Mailbox + Send + Sync>;

/// Expands an EXPN argument into the mailboxes of a list.
pub type Expander = Arc<dyn Fn(&str) -> Vec<Mailbox> + Send + Sync>;

/// Callbacks shared by the dispatcher and every session.
///
/// Readers take a snapshot of the callbacks and release the lock before
/// calling them.
pub struct Registry {
    handlers: RwLock<Vec<Handler>>,
    verifier: RwLock<Verifier>,
    expander: RwLock<Expander>,
}

impl Default for Registry {
    fn default() -> Self {
        let verifier: Verifier = Arc::new(|_: &str| Mailbox::default());
        let expander: Expander = Arc::new(|_: &str| Vec::new());

        Self {
            handlers: RwLock::new(Vec::new()),
            verifier: RwLock::new(verifier),
            expander: RwLock::new(expander),
        }
    }
}

impl Registry {
    pub async fn add_handler(&self, handler: Handler) {
        self.handlers.write().await.push(handler);
    }

    pub async fn handlers(&self) -> Vec<Handler> {
        self.handlers.read().await.clone()
    }

    pub async fn set_verifier(&self, verifier: Verifier) {
        *self.verifier.write().await = verifier;
    }

    pub async fn verifier(&self) -> Verifier {
        self.verifier.read().await.clone()
    }

    pub async fn set_expander(&self, expander: Expander) {
        *self.expander.write().await = expander;
    }

    pub async fn expander(&self) -> Expander {
        self.expander.read().await.clone()
    }
}

/// A running SMTP server.
///
/// # Example
/// ```no_run
/// use smtpd_rs::SmtpServer;
///
/// # async fn example() -> smtpd_rs::Result<()> {
/// let server = SmtpServer::listen("127.0.0.1:2525", "mx.test.local").await?;
///
/// server
///     .handle(|message| {
///         println!("Received message from {}", message.sender);
///     })
///     .await;
///
/// // ...
/// server.close().await?;
/// # Ok(())
/// # }
/// ```
pub struct SmtpServer {
    name: String,
    local_addr: SocketAddr,
    registry: Arc<Registry>,
    shutdown: CancellationToken,
    accept_task: Mutex<Option<JoinHandle<()>>>,
}

impl SmtpServer {
    /// Bind `addr` and start accepting connections, announcing the server
    /// as `name`.
    pub async fn listen<A: ToSocketAddrs>(addr: A, name: &str) -> Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        let local_addr = listener.local_addr()?;
        info!("SMTP server {} listening on {}", name, local_addr);

        let registry = Arc::new(Registry::default());
        let (publisher, _dispatcher) = spawn_dispatcher(registry.clone());
        let shutdown = CancellationToken::new();

        let accept_task = tokio::spawn(accept_loop(
            listener,
            name.to_string(),
            registry.clone(),
            publisher,
            shutdown.clone(),
        ));

        Ok(Self {
            name: name.to_string(),
            local_addr,
            registry,
            shutdown,
            accept_task: Mutex::new(Some(accept_task)),
        })
    }

    pub async fn listen_with_config(config: &Config) -> Result<Self> {
        Self::listen(config.server.listen_addr.as_str(), &config.server.hostname).await
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Register a handler. Handlers run one after another on the dispatcher
    /// task, so a slow handler delays delivery of every later message.
    pub async fn handle<F>(&self, handler: F)
    where
        F: Fn(&Message) + Send + Sync + 'static,
    {
        self.registry.add_handler(Arc::new(handler)).await;
    }

    /// Replace the VRFY policy.
    pub async fn verify<F>(&self, verifier: F)
    where
        F: Fn(&str) -> Mailbox + Send + Sync + 'static,
    {
        self.registry.set_verifier(Arc::new(verifier)).await;
    }

    /// Replace the EXPN policy.
    pub async fn expand<F>(&self, expander: F)
    where
        F: Fn(&str) -> Vec<Mailbox> + Send + Sync + 'static,
    {
        self.registry.set_expander(Arc::new(expander)).await;
    }

    /// Stop accepting connections and close the listening socket.
    ///
    /// Sessions already running are left alone and may still publish
    /// messages.
    pub async fn close(&self) -> Result<()> {
        self.shutdown.cancel();

        let accept_task = self.accept_task.lock().await.take();
        if let Some(task) = accept_task {
            task.await
                .map_err(|e| SmtpError::Io(std::io::Error::other(e)))?;
        }
        Ok(())
    }
}

async fn accept_loop(
    listener: TcpListener,
    name: String,
    registry: Arc<Registry>,
    publisher: Publisher,
    shutdown: CancellationToken,
) {
    loop {
        tokio::select! {
            biased;

            _ = shutdown.cancelled() => {
                info!("SMTP server {} stopped accepting connections", name);
                break;
            }
            accepted = listener.accept() => match accepted {
                Ok((socket, addr)) => {
                    info!("New SMTP connection from {}", addr);

                    let session = SmtpSession::new(
                        socket,
                        name.clone(),
                        registry.clone(),
                        publisher.clone(),
                    );

                    tokio::spawn(async move {
                        if let Err(e) = session.run().await {
                            error!("Session error ({}): {}", addr, e);
                        }
                    });
                }
                Err(e) => {
                    error!("Failed to accept connection: {}", e);
                }
            },
        }
    }
}
