//! Service wiring
//!
//! Builds every component from the configuration, connects, serves until
//! the shutdown token fires, then tears down in reverse order.

use crate::config::{Config, ConfigError};
use crate::depth::{DepthProvider, DepthPublisher, MarketSession, MockDepthProvider};
use crate::protocol::EnvelopeCodec;
use crate::quote::{MockStrategy, PricingStrategy, QuotePipeline};
use crate::signer::{QuoteSigner, QuoteSigning, SignerError};
use crate::utils::hex_address;
use ethers::types::Address;
use hypersockets::{BearerToken, HyperSocketError, ReconnectConfig, ShutdownToken};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum RunnerError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Signer error: {0}")]
    Signer(#[from] SignerError),

    #[error("Session error: {0}")]
    Session(#[from] HyperSocketError),
}

pub type Result<T> = std::result::Result<T, RunnerError>;

pub struct Runner {
    config: Arc<Config>,
    signer: Arc<QuoteSigner>,
    session: MarketSession,
    publisher: DepthPublisher,
}

impl Runner {
    /// Wire the mock strategy and mock depth provider
    pub fn new(config: Config) -> Result<Self> {
        Self::with_components(
            config,
            Arc::new(MockStrategy::default()),
            Arc::new(MockDepthProvider::default()),
        )
    }

    pub fn with_components(
        config: Config,
        strategy: Arc<dyn PricingStrategy>,
        provider: Arc<dyn DepthProvider>,
    ) -> Result<Self> {
        let config = Arc::new(config);

        let domains = config.domain_registry()?;
        for chain_id in domains.chain_ids() {
            if let Some(domain) = domains.get(chain_id) {
                info!(
                    chain_id,
                    verifying_contract = %hex_address(&domain.verifying_contract),
                    "Registered EIP-712 domain"
                );
            }
        }

        let private_key = config.resolve_private_key()?;
        let signer = Arc::new(QuoteSigner::from_hex(&private_key, domains)?);
        info!("Signer initialized: {}", hex_address(&signer.address()));

        let session = build_session(&config)?;

        let pipeline = Arc::new(QuotePipeline::new(
            strategy,
            signer.clone() as Arc<dyn QuoteSigning>,
            config.clone(),
            config.wrapped_tokens()?,
        ));

        let publisher = DepthPublisher::new(session.clone(), provider, pipeline, config.clone());

        Ok(Self {
            config,
            signer,
            session,
            publisher,
        })
    }

    pub fn session(&self) -> &MarketSession {
        &self.session
    }

    pub fn signer_address(&self) -> Address {
        self.signer.address()
    }

    /// Serve until `shutdown` is cancelled
    ///
    /// Handlers go in before the dial so an immediate acknowledgment is
    /// seen. A failed initial connect is returned; later faults heal
    /// through the session's reconnect cycle.
    pub async fn run(&self, shutdown: &ShutdownToken) -> Result<()> {
        info!(
            "Starting {} against {}",
            self.config.app.name, self.config.websocket.server_url
        );

        self.publisher.start(shutdown);
        if let Err(e) = self.session.connect(shutdown).await {
            self.publisher.stop().await;
            return Err(e.into());
        }
        info!("Market maker started, waiting for messages");

        shutdown.cancelled().await;

        self.shutdown().await;
        Ok(())
    }

    pub async fn shutdown(&self) {
        info!("Shutting down market maker...");
        self.publisher.stop().await;
        if let Err(e) = self.session.close().await {
            tracing::error!("Failed to close session: {}", e);
        }
        info!("Market maker stopped");
    }
}

fn build_session(config: &Config) -> Result<MarketSession> {
    let ws = &config.websocket;
    let session = hypersockets::builder()
        .url(ws.server_url.clone())
        .codec(EnvelopeCodec)
        .headers(BearerToken::new(ws.api_token.clone()))
        .reconnect(ReconnectConfig::new(ws.reconnect_interval, ws.max_reconnect_attempts))
        .heartbeat_interval(ws.heartbeat_interval)
        .read_timeout(ws.read_timeout)
        .write_timeout(ws.write_timeout)
        .handshake_timeout(ws.handshake_timeout)
        .build()?;
    Ok(session)
}
