use super::messages::Envelope;
use hypersockets::{FrameCodec, HyperSocketError, Result};
use prost::Message as _;

/// Protobuf envelopes in binary frames
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvelopeCodec;

impl FrameCodec for EnvelopeCodec {
    type Message = Envelope;

    fn encode(&self, message: &Envelope) -> Result<Vec<u8>> {
        Ok(message.encode_to_vec())
    }

    fn decode(&self, frame: &[u8]) -> Result<Envelope> {
        let envelope =
            Envelope::decode(frame).map_err(|e| HyperSocketError::Decode(e.to_string()))?;

        match &envelope.payload {
            None => Err(HyperSocketError::Decode(format!(
                "{} frame has no payload",
                envelope.kind().as_str()
            ))),
            Some(payload) if payload.kind() != envelope.kind() => {
                Err(HyperSocketError::Decode(format!(
                    "type {} does not match payload {}",
                    envelope.kind().as_str(),
                    payload.kind().as_str()
                )))
            }
            Some(_) => Ok(envelope),
        }
    }

    fn ping(&self) -> Envelope {
        Envelope::heartbeat(true, false)
    }

    fn kind(&self, message: &Envelope) -> &'static str {
        message.kind().as_str()
    }
}
