//! Quote request pipeline
//!
//! Validate, resolve, price, sign, respond. Every failure, including a
//! strategy that breaks its own contract, becomes a `QUOTE_REJECT` for the
//! peer.

use super::strategy::{PricingStrategy, QuoteParams, QuoteResult};
use crate::config::Config;
use crate::protocol::{
    Envelope, QuoteInfo, QuoteReject, QuoteRequest, QuoteResponse, QuoteStatus, RejectReason,
    SignedOrder,
};
use crate::signer::{MmQuote, QuoteSigning, WrappedTokens};
use crate::utils::{hex_address, now_millis, now_secs, parse_address_lenient};
use ethers::types::{Address, U256};
use std::sync::Arc;
use tracing::{error, info};

/// Short-circuits to a reject envelope
struct Rejection {
    reason: RejectReason,
    message: String,
}

impl Rejection {
    fn new(reason: RejectReason, message: impl Into<String>) -> Self {
        Self {
            reason,
            message: message.into(),
        }
    }

    fn internal(message: impl Into<String>) -> Self {
        Self::new(RejectReason::InternalError, message)
    }
}

/// Request after lookups, ready for pricing
struct Resolved {
    pool: Address,
    token_in: Address,
    token_out: Address,
    original_in: Address,
    original_out: Address,
    recipient: Address,
    amount_in: U256,
}

pub struct QuotePipeline {
    strategy: Arc<dyn PricingStrategy>,
    signer: Arc<dyn QuoteSigning>,
    config: Arc<Config>,
    wrapped: WrappedTokens,
}

impl QuotePipeline {
    pub fn new(
        strategy: Arc<dyn PricingStrategy>,
        signer: Arc<dyn QuoteSigning>,
        config: Arc<Config>,
        wrapped: WrappedTokens,
    ) -> Self {
        Self {
            strategy,
            signer,
            config,
            wrapped,
        }
    }

    fn mm_id(&self) -> String {
        hex_address(&self.signer.address())
    }

    /// Always a `QUOTE_RESPONSE` or `QUOTE_REJECT` envelope
    pub async fn handle(&self, request: &QuoteRequest) -> Envelope {
        info!(
            quote_id = %request.quote_id,
            chain_id = request.chain_id,
            token_in = %request.token_in,
            token_out = %request.token_out,
            amount_in = %request.amount_in,
            "Received quote request"
        );

        let resolved = match validate(request).and_then(|_| self.resolve(request)) {
            Ok(resolved) => resolved,
            Err(rejection) => return self.reject(request, rejection),
        };

        let params = QuoteParams {
            chain_id: request.chain_id,
            token_in: resolved.token_in,
            token_out: resolved.token_out,
            amount_in: resolved.amount_in,
            slippage_bps: request.slippage_bps,
        };
        let result = match self.strategy.calculate_quote(params).await {
            Ok(result) => result,
            Err(e) => {
                error!(quote_id = %request.quote_id, "Quote calculation failed: {}", e);
                return self.reject(
                    request,
                    Rejection::new(RejectReason::InsufficientLiquidity, e.to_string()),
                );
            }
        };

        if result.amount_out_minimum > result.amount_out {
            error!(
                quote_id = %request.quote_id,
                minimum = %result.amount_out_minimum,
                amount_out = %result.amount_out,
                "Strategy returned minimum above amount out"
            );
            return self.reject(
                request,
                Rejection::internal("minimum output exceeds amount out"),
            );
        }

        self.commit(request, &resolved, &result)
    }

    fn resolve(&self, request: &QuoteRequest) -> Result<Resolved, Rejection> {
        let chain_id = request.chain_id;

        let domain = self.config.domain_for_chain(chain_id).ok_or_else(|| {
            error!(chain_id, "Chain not configured");
            Rejection::new(
                RejectReason::PairNotSupported,
                format!("chain {} not configured", chain_id),
            )
        })?;
        let pool = domain
            .verifying_address()
            .map_err(|_| Rejection::internal(format!("invalid verifying contract for chain {}", chain_id)))?;

        let original_in = parse_address_lenient(&request.token_in)
            .ok_or_else(|| Rejection::internal("invalid token_in address"))?;
        let original_out = parse_address_lenient(&request.token_out)
            .ok_or_else(|| Rejection::internal("invalid token_out address"))?;
        let recipient = parse_address_lenient(&request.recipient)
            .ok_or_else(|| Rejection::internal("invalid recipient address"))?;

        let wrapped_missing = || {
            error!(chain_id, "Wrapped token not configured");
            Rejection::internal(format!("wrapped token not configured for chain {}", chain_id))
        };
        let token_in = self
            .wrapped
            .resolve(chain_id, original_in)
            .ok_or_else(wrapped_missing)?;
        let token_out = self
            .wrapped
            .resolve(chain_id, original_out)
            .ok_or_else(wrapped_missing)?;

        let (in_hex, out_hex) = (hex_address(&token_in), hex_address(&token_out));
        if self.config.pair_for_tokens(chain_id, &in_hex, &out_hex).is_none() {
            error!(chain_id, token_in = %in_hex, token_out = %out_hex, "Pair not found");
            return Err(Rejection::new(
                RejectReason::PairNotSupported,
                format!("pair not found for tokens {}-{}", in_hex, out_hex),
            ));
        }

        let amount_in = U256::from_dec_str(request.amount_in.trim())
            .map_err(|_| Rejection::internal("invalid amount_in"))?;
        if amount_in.is_zero() {
            return Err(Rejection::internal("amount_in must be positive"));
        }

        Ok(Resolved {
            pool,
            token_in,
            token_out,
            original_in,
            original_out,
            recipient,
            amount_in,
        })
    }

    /// Build, sign and wrap the quote
    fn commit(&self, request: &QuoteRequest, resolved: &Resolved, result: &QuoteResult) -> Envelope {
        let nonce = U256::from_dec_str(request.nonce.trim()).unwrap_or_default();

        // Signed with the tokens as requested, before wrapped substitution
        let quote = MmQuote {
            pool: resolved.pool,
            from: resolved.recipient,
            to: resolved.recipient,
            input_token: resolved.original_in,
            output_token: resolved.original_out,
            amount_in: resolved.amount_in,
            amount_out: result.amount_out_minimum,
            deadline: request.deadline.max(0) as u64,
            nonce,
            extra_data: Vec::new(),
        };

        let signature = match self.signer.sign_quote(request.chain_id, &quote) {
            Ok(signature) => signature,
            Err(e) => {
                error!(quote_id = %request.quote_id, "Signing failed: {}", e);
                return self.reject(request, Rejection::internal("signing failed"));
            }
        };
        info!(quote_id = %request.quote_id, "Quote signed");

        let valid_until =
            now_millis() + self.config.quote.valid_duration.as_millis() as i64;
        let mm_id = self.mm_id();

        Envelope::quote_response(QuoteResponse {
            quote_id: request.quote_id.clone(),
            chain_id: request.chain_id,
            mm_id: mm_id.clone(),
            status: QuoteStatus::Success as i32,
            quote: Some(QuoteInfo {
                token_in: request.token_in.to_lowercase(),
                token_out: request.token_out.to_lowercase(),
                amount_in: resolved.amount_in.to_string(),
                amount_out: result.amount_out.to_string(),
                amount_out_minimum: result.amount_out_minimum.to_string(),
                price: result.execution_price.to_string(),
                price_impact: format!("{:.4}", result.price_impact),
            }),
            order: Some(SignedOrder {
                signer: mm_id,
                pool: hex_address(&resolved.pool),
                nonce: nonce.to_string(),
                amount_in: resolved.amount_in.to_string(),
                amount_out: result.amount_out_minimum.to_string(),
                deadline: request.deadline,
                extra_data: quote.extra_data,
                signature,
            }),
            valid_until,
        })
    }

    fn reject(&self, request: &QuoteRequest, rejection: Rejection) -> Envelope {
        info!(
            quote_id = %request.quote_id,
            reason = ?rejection.reason,
            "Rejecting quote: {}",
            rejection.message
        );
        Envelope::quote_reject(QuoteReject {
            quote_id: request.quote_id.clone(),
            chain_id: request.chain_id,
            mm_id: self.mm_id(),
            reason: rejection.reason as i32,
            message: rejection.message,
        })
    }
}

fn validate(request: &QuoteRequest) -> Result<(), Rejection> {
    let fail = |msg: &str| Err(Rejection::internal(msg));

    if request.quote_id.is_empty() {
        return fail("quote_id is required");
    }
    if request.chain_id == 0 {
        return fail("chain_id is required");
    }
    if request.token_in.is_empty() {
        return fail("token_in is required");
    }
    if request.token_out.is_empty() {
        return fail("token_out is required");
    }
    if request.amount_in.is_empty() {
        return fail("amount_in is required");
    }
    if request.amount_in == "0" {
        return fail("amount_in must be positive");
    }
    if request.recipient.is_empty() {
        return fail("recipient is required");
    }
    if request.deadline == 0 {
        return fail("deadline is required");
    }
    if request.deadline < now_secs() {
        return fail("deadline has expired");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> QuoteRequest {
        QuoteRequest {
            quote_id: "q-1".to_string(),
            chain_id: 56,
            token_in: "0xbb4CdB9CBd36B01bD1cBaEBF2De08d9173bc095c".to_string(),
            token_out: "0x55d398326f99059fF775485246999027B3197955".to_string(),
            amount_in: "1000000000000000000".to_string(),
            recipient: "0x1234567890123456789012345678901234567890".to_string(),
            deadline: now_secs() + 60,
            ..Default::default()
        }
    }

    fn rejection_message(request: &QuoteRequest) -> Option<String> {
        validate(request).err().map(|r| r.message)
    }

    #[test]
    fn test_validation_order() {
        let mut req = request();
        req.quote_id.clear();
        req.chain_id = 0;
        assert_eq!(rejection_message(&req).as_deref(), Some("quote_id is required"));

        let mut req = request();
        req.chain_id = 0;
        assert_eq!(rejection_message(&req).as_deref(), Some("chain_id is required"));

        let mut req = request();
        req.token_out.clear();
        assert_eq!(rejection_message(&req).as_deref(), Some("token_out is required"));

        let mut req = request();
        req.amount_in.clear();
        assert_eq!(rejection_message(&req).as_deref(), Some("amount_in is required"));

        let mut req = request();
        req.amount_in = "0".to_string();
        assert_eq!(rejection_message(&req).as_deref(), Some("amount_in must be positive"));

        let mut req = request();
        req.recipient.clear();
        assert_eq!(rejection_message(&req).as_deref(), Some("recipient is required"));

        let mut req = request();
        req.deadline = 0;
        assert_eq!(rejection_message(&req).as_deref(), Some("deadline is required"));

        let mut req = request();
        req.deadline = now_secs() - 1;
        assert_eq!(rejection_message(&req).as_deref(), Some("deadline has expired"));

        assert!(validate(&request()).is_ok());
    }

    #[test]
    fn test_validation_rejects_are_internal() {
        let mut req = request();
        req.token_in.clear();
        let rejection = validate(&req).err().unwrap();
        assert_eq!(rejection.reason, RejectReason::InternalError);
    }
}
