//! The interface to the sampling transport (ADC plus DMA on hardware).
//!
//! The transport fills a fixed-size buffer in the background.  The consumer
//! polls for a full block, copies it out, and then re-arms the transport so
//! the next block is captured while the current one is being analyzed.

/// A transport-level problem with the most recent block
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransportFault {
    /// The hardware overwrote samples before the block was consumed
    Overrun,
    /// The block ended early; it holds fewer samples than requested
    Underrun,
}

impl TransportFault {
    /// Provides the name of the fault
    pub const fn to_str(&self) -> &'static str {
        match self {
            Self::Overrun => "sample overrun",
            Self::Underrun => "sample underrun",
        }
    }
}

impl core::fmt::Display for TransportFault {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.to_str())
    }
}

#[cfg(feature = "std")]
impl std::error::Error for TransportFault {}

/// A source of fixed-size blocks of unsigned 8 bit samples
pub trait SampleSource {
    /// Non-blocking poll for a full block.
    ///
    /// Returns `Ok(None)` while the current block is still filling.  Once a
    /// block is returned (or a fault reported), the source stays in that state
    /// until [SampleSource::rearm] is called.
    fn poll_block(&mut self) -> Result<Option<&[u8]>, TransportFault>;
    /// Start capturing the next block.  Must be called after the samples
    /// have been copied out, and before they are transformed.
    fn rearm(&mut self);
}
