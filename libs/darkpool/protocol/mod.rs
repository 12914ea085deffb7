//! Venue wire protocol

pub mod codec;
pub mod messages;

pub use codec::EnvelopeCodec;
pub use messages::*;
