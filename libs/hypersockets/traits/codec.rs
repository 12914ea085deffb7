//! Frame codec
//!
//! The session moves opaque binary frames; a [`FrameCodec`] turns them into
//! typed envelopes and back. Implementations must be cheap to share across
//! the read loop, the liveness ticker and any number of concurrent senders.

use crate::Result;
use std::fmt::Debug;

/// Converts typed messages to and from binary websocket frames
///
/// # Example
///
/// ```ignore
/// struct ProtoCodec;
///
/// impl FrameCodec for ProtoCodec {
///     type Message = Envelope;
///
///     fn encode(&self, message: &Envelope) -> Result<Vec<u8>> {
///         Ok(message.encode_to_vec())
///     }
///
///     fn decode(&self, frame: &[u8]) -> Result<Envelope> {
///         Envelope::decode(frame).map_err(|e| HyperSocketError::Decode(e.to_string()))
///     }
///
///     fn ping(&self) -> Envelope {
///         Envelope::heartbeat(true, false)
///     }
///
///     fn kind(&self, message: &Envelope) -> &'static str {
///         message.kind().as_str()
///     }
/// }
/// ```
pub trait FrameCodec: Send + Sync + 'static {
    /// The typed message carried in each frame
    type Message: Send + Sync + Debug + 'static;

    /// Serialize a message into the payload of one binary frame
    fn encode(&self, message: &Self::Message) -> Result<Vec<u8>>;

    /// Parse the payload of one binary frame
    ///
    /// Errors are logged by the read loop and the frame is skipped; they
    /// never tear the connection down.
    fn decode(&self, frame: &[u8]) -> Result<Self::Message>;

    /// The liveness ping sent on every healthy heartbeat tick
    fn ping(&self) -> Self::Message;

    /// Short label for logs
    fn kind(&self, message: &Self::Message) -> &'static str;
}
