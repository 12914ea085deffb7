/// Type-state markers for the session builder
///
/// These types track which required fields have been set, so a session
/// without a URL or a codec cannot be built.

use std::marker::PhantomData;

/// Marker trait for URL state
pub trait UrlState {}

/// URL has not been set
pub struct NoUrl;
impl UrlState for NoUrl {}

/// URL has been set
pub struct HasUrl;
impl UrlState for HasUrl {}

/// Marker trait for codec state
pub trait CodecState {}

/// Codec has not been set
pub struct NoCodec;
impl CodecState for NoCodec {}

/// Codec has been set
pub struct HasCodec;
impl CodecState for HasCodec {}

/// Phantom marker to prevent direct construction
#[derive(Debug, Clone, Copy)]
pub struct TypeState<U, K> {
    _url: PhantomData<U>,
    _codec: PhantomData<K>,
}

impl<U, K> TypeState<U, K> {
    pub(crate) fn new() -> Self {
        Self {
            _url: PhantomData,
            _codec: PhantomData,
        }
    }
}
