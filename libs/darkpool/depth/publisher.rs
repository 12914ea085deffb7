//! Depth publication and inbound dispatch
//!
//! The publisher owns the business side of a session: it answers quote
//! requests and heartbeats, promotes the session to Ready on a successful
//! acknowledgment, and pushes one snapshot per configured pair on a timer
//! while Ready.

use super::provider::{DepthProvider, OrderBook};
use crate::config::{Config, DomainConfig, PairConfig};
use crate::protocol::{
    self, ConnectionAck, DepthSnapshot, Envelope, EnvelopeCodec, Heartbeat, Payload,
};
use crate::quote::QuotePipeline;
use crate::utils::now_millis;
use async_trait::async_trait;
use hypersockets::{ReconnectedHandler, Session, SessionHandler, ShutdownToken};
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, error, info};

pub type MarketSession = Session<EnvelopeCodec>;

pub fn chain_name(chain_id: u64) -> String {
    match chain_id {
        1 => "ethereum".to_string(),
        56 => "bsc".to_string(),
        8453 => "base".to_string(),
        42161 => "arbitrum".to_string(),
        10 => "optimism".to_string(),
        other => format!("chain_{}", other),
    }
}

/// Prices keep 30 fractional digits; native ratios can be tiny
pub fn build_snapshot(
    book: &OrderBook,
    pair: &PairConfig,
    domain: &DomainConfig,
    sequence_id: u64,
) -> DepthSnapshot {
    let level = |l: &super::provider::PriceLevel| protocol::PriceLevel {
        price: format!("{:.30}", l.price),
        amount: l.amount.to_string(),
    };
    let mm = domain.verifying_contract.to_lowercase();

    DepthSnapshot {
        chain_id: pair.chain_id,
        chain_name: chain_name(pair.chain_id),
        pair_id: pair.pair_id.clone(),
        mm_id: mm.clone(),
        mm_address: mm,
        fee_rate: pair.fee_rate,
        pool_address: pair.pool_address.to_lowercase(),
        token_a: pair.base_token.to_lowercase(),
        token_b: pair.quote_token.to_lowercase(),
        mid_price: format!("{:.30}", book.mid_price),
        spread: format!("{:.6}", book.spread),
        asks: book.asks.iter().map(level).collect(),
        bids: book.bids.iter().map(level).collect(),
        block_number: 0,
        sequence_id,
    }
}

struct Shared {
    session: MarketSession,
    provider: Arc<dyn DepthProvider>,
    pipeline: Arc<QuotePipeline>,
    config: Arc<Config>,
}

impl Shared {
    async fn push_all_pairs(&self) {
        if !self.session.is_ready() {
            debug!("Session not ready ({}), skipping depth push", self.session.state());
            return;
        }

        for pair in &self.config.pairs {
            if let Err(e) = self.push_pair(pair).await {
                error!(
                    chain_id = pair.chain_id,
                    pair_id = %pair.pair_id,
                    "Failed to push depth snapshot: {}",
                    e
                );
            }
        }
    }

    async fn push_pair(&self, pair: &PairConfig) -> Result<(), String> {
        let domain = self
            .config
            .domain_for_chain(pair.chain_id)
            .ok_or_else(|| format!("eip712 domain not found for chain {}", pair.chain_id))?;

        let book = self
            .provider
            .order_book(pair.chain_id, pair)
            .await
            .map_err(|e| format!("failed to get depth: {}", e))?;

        let snapshot = build_snapshot(&book, pair, domain, now_millis().max(0) as u64);
        let (asks, bids) = (snapshot.asks.len(), snapshot.bids.len());

        self.session
            .send(&Envelope::depth_snapshot(snapshot))
            .await
            .map_err(|e| format!("failed to send depth snapshot: {}", e))?;

        debug!(chain_id = pair.chain_id, pair_id = %pair.pair_id, asks, bids, "Depth snapshot sent");
        Ok(())
    }
}

/// Installed on the session as both message and reconnected handler
struct Dispatcher {
    shared: Arc<Shared>,
}

impl Dispatcher {
    async fn on_quote_request(&self, request: protocol::QuoteRequest) -> hypersockets::Result<()> {
        let response = self.shared.pipeline.handle(&request).await;

        let kind = response.kind();
        self.shared.session.send(&response).await?;
        info!(quote_id = %request.quote_id, "Quote response sent ({})", kind.as_str());
        Ok(())
    }

    async fn on_heartbeat(&self, heartbeat: Heartbeat) -> hypersockets::Result<()> {
        if heartbeat.ping {
            debug!("Received ping, replying pong");
            return self.shared.session.send(&Envelope::heartbeat(false, true)).await;
        }
        if heartbeat.pong {
            debug!("Received pong from server");
        }
        Ok(())
    }

    fn on_connection_ack(&self, ack: ConnectionAck) {
        if !ack.success {
            error!("Connection rejected: {}", ack.error_message);
            return;
        }

        info!(
            session_id = %ack.session_id,
            mm_address = %ack.mm_address,
            "Connection acknowledged"
        );
        self.shared.session.mark_ready();

        let shared = self.shared.clone();
        tokio::spawn(async move {
            shared.push_all_pairs().await;
        });
    }
}

#[async_trait]
impl SessionHandler<Envelope> for Dispatcher {
    async fn handle(&self, message: Envelope) -> hypersockets::Result<()> {
        let Some(payload) = message.payload else {
            return Ok(());
        };
        match payload {
            Payload::QuoteRequest(request) => self.on_quote_request(request).await,
            Payload::Heartbeat(heartbeat) => self.on_heartbeat(heartbeat).await,
            Payload::ConnectionAck(ack) => {
                self.on_connection_ack(ack);
                Ok(())
            }
            Payload::Error(err) => {
                error!(
                    code = err.code,
                    related_quote_id = %err.related_quote_id,
                    "Received error from server: {}",
                    err.message
                );
                Ok(())
            }
            other => {
                debug!("Ignoring {} message", other.kind().as_str());
                Ok(())
            }
        }
    }
}

#[async_trait]
impl ReconnectedHandler for Dispatcher {
    async fn on_reconnected(&self) {
        info!("Reconnected, depth resumes after the next acknowledgment");
    }
}

pub struct DepthPublisher {
    shared: Arc<Shared>,
    ticker: Mutex<Option<(ShutdownToken, JoinHandle<()>)>>,
}

impl DepthPublisher {
    pub fn new(
        session: MarketSession,
        provider: Arc<dyn DepthProvider>,
        pipeline: Arc<QuotePipeline>,
        config: Arc<Config>,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                session,
                provider,
                pipeline,
                config,
            }),
            ticker: Mutex::new(None),
        }
    }

    /// Install handlers and, if enabled, start the push timer
    pub fn start(&self, parent: &ShutdownToken) {
        let dispatcher = Arc::new(Dispatcher {
            shared: self.shared.clone(),
        });
        self.shared.session.set_message_handler(dispatcher.clone());
        self.shared.session.set_reconnected_handler(dispatcher);

        let depth = &self.shared.config.depth;
        if depth.enabled {
            let token = parent.child();
            let handle = tokio::spawn(push_loop(self.shared.clone(), depth.push_interval, token.clone()));
            if let Some((old, _)) = self.ticker.lock().replace((token, handle)) {
                old.cancel();
            }
        }

        info!(enabled = depth.enabled, "Depth publisher started");
    }

    pub async fn stop(&self) {
        let ticker = self.ticker.lock().take();
        if let Some((token, handle)) = ticker {
            token.cancel();
            let _ = handle.await;
        }
        self.shared.session.clear_handlers();
        info!("Depth publisher stopped");
    }

    pub async fn push_all_pairs(&self) {
        self.shared.push_all_pairs().await;
    }
}

async fn push_loop(shared: Arc<Shared>, period: std::time::Duration, token: ShutdownToken) {
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = token.cancelled() => break,
            _ = ticker.tick() => shared.push_all_pairs().await,
        }
    }
    debug!("Depth push loop exited");
}
