//! Stereo output frames and channel routing.

/// Which audio source is active.
///
/// The two sources deliver left/right in opposite order, so the selector
/// doubles as the routing polarity of the output frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum AudioSource {
    /// Streaming link (packets delivered by the wireless stack).
    #[default]
    Wireless = 0,
    /// File playback from local storage.
    Storage = 1,
}

impl AudioSource {
    /// Routing selector: 0 or 1.
    #[inline]
    pub fn selector(self) -> usize {
        self as usize
    }

    /// Builds a source from its selector. Any non-zero value is `Storage`.
    pub fn from_selector(selector: u8) -> Self {
        if selector == 0 {
            AudioSource::Wireless
        } else {
            AudioSource::Storage
        }
    }

    /// The source with the opposite routing polarity.
    pub fn reversed(self) -> Self {
        match self {
            AudioSource::Wireless => AudioSource::Storage,
            AudioSource::Storage => AudioSource::Wireless,
        }
    }

    /// Short lowercase name, used in logs and configuration files.
    pub fn as_str(self) -> &'static str {
        match self {
            AudioSource::Wireless => "wireless",
            AudioSource::Storage => "storage",
        }
    }
}

/// One stereo sample pair as handed to the output transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AudioFrame {
    /// Physical output slots: slot 0 is transmitted first.
    pub slots: [i16; 2],
}

impl AudioFrame {
    /// Size of one frame on the wire.
    pub const BYTES: usize = 4;

    /// Creates a frame from its physical slots.
    pub const fn new(slot0: i16, slot1: i16) -> Self {
        Self {
            slots: [slot0, slot1],
        }
    }

    /// Routes computed left/right values into physical slots.
    ///
    /// Slot `selector` receives `left`, slot `1 - selector` receives `right`.
    #[inline]
    pub fn from_computed(left: i16, right: i16, source: AudioSource) -> Self {
        let selector = source.selector();
        let mut slots = [0i16; 2];
        slots[selector] = left;
        slots[1 - selector] = right;
        Self { slots }
    }

    /// Little-endian wire representation.
    #[inline]
    pub fn to_le_bytes(self) -> [u8; Self::BYTES] {
        let [a, b] = self.slots;
        let a = a.to_le_bytes();
        let b = b.to_le_bytes();
        [a[0], a[1], b[0], b[1]]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_routing_wireless_keeps_order() {
        let frame = AudioFrame::from_computed(100, -200, AudioSource::Wireless);
        assert_eq!(frame.slots, [100, -200]);
    }

    #[test]
    fn test_routing_storage_swaps() {
        let frame = AudioFrame::from_computed(100, -200, AudioSource::Storage);
        assert_eq!(frame.slots, [-200, 100]);
    }

    #[test]
    fn test_source_selector_roundtrip() {
        assert_eq!(AudioSource::from_selector(0), AudioSource::Wireless);
        assert_eq!(AudioSource::from_selector(1), AudioSource::Storage);
        assert_eq!(AudioSource::from_selector(7), AudioSource::Storage);
        assert_eq!(AudioSource::Storage.selector(), 1);
    }

    #[test]
    fn test_reversed_flips() {
        assert_eq!(AudioSource::Wireless.reversed(), AudioSource::Storage);
        assert_eq!(AudioSource::Storage.reversed().reversed(), AudioSource::Storage);
    }

    #[test]
    fn test_frame_le_bytes() {
        let frame = AudioFrame::new(0x0102, -1);
        assert_eq!(frame.to_le_bytes(), [0x02, 0x01, 0xFF, 0xFF]);
    }
}
