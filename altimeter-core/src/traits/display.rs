//! Display transport trait

use crate::display::RenderRegion;

/// Trait for pushing framebuffer bytes to a panel
///
/// The transport addresses the panel window described by `region` and then
/// streams `region.byte_length()` bytes of `buffer` into it. The caller is
/// responsible for a consistent region; the transport must not guess.
pub trait DisplayTransport {
    /// Error type for transfer failures
    type Error;

    /// Write `buffer` into the panel window `region`
    ///
    /// May be split into several bus transfers, so an error can leave the
    /// window partly updated.
    async fn present(&mut self, buffer: &[u8], region: &RenderRegion) -> Result<(), Self::Error>;
}
