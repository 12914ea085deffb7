//! Wire messages
//!
//! Every binary frame carries one protobuf [`Envelope`]: a message type, a
//! unix-ms timestamp and a one-of payload. Proto3 semantics apply, so a
//! missing field decodes to its zero value and request validation decides
//! what is required.
//!
//! Field numbers follow declaration order. Enums reserve `0` for an
//! unspecified value.

/// Discriminant carried next to the payload
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum MessageType {
    Unspecified = 0,
    ConnectionAck = 1,
    DepthSnapshot = 2,
    QuoteRequest = 3,
    QuoteResponse = 4,
    QuoteReject = 5,
    Heartbeat = 6,
    Error = 7,
}

impl MessageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageType::Unspecified => "UNSPECIFIED",
            MessageType::ConnectionAck => "CONNECTION_ACK",
            MessageType::DepthSnapshot => "DEPTH_SNAPSHOT",
            MessageType::QuoteRequest => "QUOTE_REQUEST",
            MessageType::QuoteResponse => "QUOTE_RESPONSE",
            MessageType::QuoteReject => "QUOTE_REJECT",
            MessageType::Heartbeat => "HEARTBEAT",
            MessageType::Error => "ERROR",
        }
    }
}

/// The one-of payload
#[derive(Clone, PartialEq, ::prost::Oneof)]
pub enum Payload {
    #[prost(message, tag = "3")]
    ConnectionAck(ConnectionAck),
    #[prost(message, tag = "4")]
    DepthSnapshot(DepthSnapshot),
    #[prost(message, tag = "5")]
    QuoteRequest(QuoteRequest),
    #[prost(message, tag = "6")]
    QuoteResponse(QuoteResponse),
    #[prost(message, tag = "7")]
    QuoteReject(QuoteReject),
    #[prost(message, tag = "8")]
    Heartbeat(Heartbeat),
    #[prost(message, tag = "9")]
    Error(ErrorMessage),
}

impl Payload {
    pub fn kind(&self) -> MessageType {
        match self {
            Payload::ConnectionAck(_) => MessageType::ConnectionAck,
            Payload::DepthSnapshot(_) => MessageType::DepthSnapshot,
            Payload::QuoteRequest(_) => MessageType::QuoteRequest,
            Payload::QuoteResponse(_) => MessageType::QuoteResponse,
            Payload::QuoteReject(_) => MessageType::QuoteReject,
            Payload::Heartbeat(_) => MessageType::Heartbeat,
            Payload::Error(_) => MessageType::Error,
        }
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Envelope {
    #[prost(enumeration = "MessageType", tag = "1")]
    pub r#type: i32,
    #[prost(int64, tag = "2")]
    pub timestamp: i64,
    #[prost(oneof = "Payload", tags = "3, 4, 5, 6, 7, 8, 9")]
    pub payload: Option<Payload>,
}

impl Envelope {
    /// Wrap a payload, stamping its type and the current time
    pub fn new(payload: Payload) -> Self {
        Self {
            r#type: payload.kind() as i32,
            timestamp: chrono::Utc::now().timestamp_millis(),
            payload: Some(payload),
        }
    }

    /// Declared type; unknown values read as `Unspecified`
    pub fn kind(&self) -> MessageType {
        MessageType::try_from(self.r#type).unwrap_or(MessageType::Unspecified)
    }

    /// A payload is present and the declared type agrees with it
    pub fn is_consistent(&self) -> bool {
        matches!(&self.payload, Some(payload) if payload.kind() == self.kind())
    }

    pub fn heartbeat(ping: bool, pong: bool) -> Self {
        Self::new(Payload::Heartbeat(Heartbeat { ping, pong }))
    }

    pub fn connection_ack(ack: ConnectionAck) -> Self {
        Self::new(Payload::ConnectionAck(ack))
    }

    pub fn depth_snapshot(snapshot: DepthSnapshot) -> Self {
        Self::new(Payload::DepthSnapshot(snapshot))
    }

    pub fn quote_request(request: QuoteRequest) -> Self {
        Self::new(Payload::QuoteRequest(request))
    }

    pub fn quote_response(response: QuoteResponse) -> Self {
        Self::new(Payload::QuoteResponse(response))
    }

    pub fn quote_reject(reject: QuoteReject) -> Self {
        Self::new(Payload::QuoteReject(reject))
    }

    pub fn error(code: i32, message: impl Into<String>) -> Self {
        Self::new(Payload::Error(ErrorMessage {
            code,
            message: message.into(),
            related_quote_id: String::new(),
        }))
    }
}

/// Server acknowledgment of an authenticated connection
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ConnectionAck {
    #[prost(bool, tag = "1")]
    pub success: bool,
    #[prost(string, tag = "2")]
    pub session_id: String,
    #[prost(string, tag = "3")]
    pub mm_id: String,
    #[prost(string, tag = "4")]
    pub mm_address: String,
    #[prost(string, tag = "5")]
    pub error_message: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Heartbeat {
    #[prost(bool, tag = "1")]
    pub ping: bool,
    #[prost(bool, tag = "2")]
    pub pong: bool,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ErrorMessage {
    #[prost(int32, tag = "1")]
    pub code: i32,
    #[prost(string, tag = "2")]
    pub message: String,
    #[prost(string, tag = "3")]
    pub related_quote_id: String,
}

/// Inbound request for a signed quote
///
/// Amounts are decimal strings in the token's native base units.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct QuoteRequest {
    #[prost(string, tag = "1")]
    pub quote_id: String,
    #[prost(uint64, tag = "2")]
    pub chain_id: u64,
    #[prost(string, tag = "3")]
    pub mm_id: String,
    #[prost(string, tag = "4")]
    pub token_in: String,
    #[prost(string, tag = "5")]
    pub token_out: String,
    #[prost(string, tag = "6")]
    pub amount_in: String,
    #[prost(string, tag = "7")]
    pub recipient: String,
    /// Unix seconds
    #[prost(int64, tag = "8")]
    pub deadline: i64,
    #[prost(string, tag = "9")]
    pub nonce: String,
    #[prost(uint32, tag = "10")]
    pub slippage_bps: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum QuoteStatus {
    Unspecified = 0,
    Success = 1,
}

/// Quoted terms, echoed for the taker
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct QuoteInfo {
    #[prost(string, tag = "1")]
    pub token_in: String,
    #[prost(string, tag = "2")]
    pub token_out: String,
    #[prost(string, tag = "3")]
    pub amount_in: String,
    #[prost(string, tag = "4")]
    pub amount_out: String,
    #[prost(string, tag = "5")]
    pub amount_out_minimum: String,
    #[prost(string, tag = "6")]
    pub price: String,
    #[prost(string, tag = "7")]
    pub price_impact: String,
}

/// The signed commitment the venue settles against
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SignedOrder {
    #[prost(string, tag = "1")]
    pub signer: String,
    #[prost(string, tag = "2")]
    pub pool: String,
    #[prost(string, tag = "3")]
    pub nonce: String,
    #[prost(string, tag = "4")]
    pub amount_in: String,
    #[prost(string, tag = "5")]
    pub amount_out: String,
    #[prost(int64, tag = "6")]
    pub deadline: i64,
    #[prost(bytes = "vec", tag = "7")]
    pub extra_data: Vec<u8>,
    /// 65 bytes, r || s || v
    #[prost(bytes = "vec", tag = "8")]
    pub signature: Vec<u8>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct QuoteResponse {
    #[prost(string, tag = "1")]
    pub quote_id: String,
    #[prost(uint64, tag = "2")]
    pub chain_id: u64,
    #[prost(string, tag = "3")]
    pub mm_id: String,
    #[prost(enumeration = "QuoteStatus", tag = "4")]
    pub status: i32,
    #[prost(message, optional, tag = "5")]
    pub quote: Option<QuoteInfo>,
    #[prost(message, optional, tag = "6")]
    pub order: Option<SignedOrder>,
    /// Unix milliseconds
    #[prost(int64, tag = "7")]
    pub valid_until: i64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum RejectReason {
    Unspecified = 0,
    InternalError = 1,
    PairNotSupported = 2,
    InsufficientLiquidity = 3,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct QuoteReject {
    #[prost(string, tag = "1")]
    pub quote_id: String,
    #[prost(uint64, tag = "2")]
    pub chain_id: u64,
    #[prost(string, tag = "3")]
    pub mm_id: String,
    #[prost(enumeration = "RejectReason", tag = "4")]
    pub reason: i32,
    #[prost(string, tag = "5")]
    pub message: String,
}

/// One side of a published book level
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PriceLevel {
    /// Quote-per-base ratio of native units
    #[prost(string, tag = "1")]
    pub price: String,
    /// Base token native units, decimal integer
    #[prost(string, tag = "2")]
    pub amount: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DepthSnapshot {
    #[prost(uint64, tag = "1")]
    pub chain_id: u64,
    #[prost(string, tag = "2")]
    pub chain_name: String,
    #[prost(string, tag = "3")]
    pub pair_id: String,
    #[prost(string, tag = "4")]
    pub mm_id: String,
    #[prost(string, tag = "5")]
    pub mm_address: String,
    #[prost(uint32, tag = "6")]
    pub fee_rate: u32,
    #[prost(string, tag = "7")]
    pub pool_address: String,
    #[prost(string, tag = "8")]
    pub token_a: String,
    #[prost(string, tag = "9")]
    pub token_b: String,
    #[prost(string, tag = "10")]
    pub mid_price: String,
    #[prost(string, tag = "11")]
    pub spread: String,
    #[prost(message, repeated, tag = "12")]
    pub asks: Vec<PriceLevel>,
    #[prost(message, repeated, tag = "13")]
    pub bids: Vec<PriceLevel>,
    #[prost(uint64, tag = "14")]
    pub block_number: u64,
    /// Unix milliseconds at build time
    #[prost(uint64, tag = "15")]
    pub sequence_id: u64,
}
