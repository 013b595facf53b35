//! Handing out MIDI channel numbers to blocks.

use md_engine::PERCUSSION_CHANNEL;

/// Tracks which of the 16 channels are taken. Melodic blocks get the
/// lowest free channel other than the percussion one; percussion blocks
/// only ever get the percussion channel.
#[derive(Clone, Debug, Default)]
pub struct ChannelAllocator {
    used: [bool; 16],
}

impl ChannelAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allocate(&mut self, percussion: bool) -> Option<u8> {
        let channel = if percussion {
            Some(PERCUSSION_CHANNEL).filter(|&c| !self.used[c as usize])
        } else {
            (0..16u8).find(|&c| c != PERCUSSION_CHANNEL && !self.used[c as usize])
        }?;
        self.used[channel as usize] = true;
        Some(channel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn melodic_pool_skips_percussion() {
        let mut alloc = ChannelAllocator::new();
        let channels: Vec<u8> = std::iter::from_fn(|| alloc.allocate(false)).collect();
        assert_eq!(channels.len(), 15);
        assert!(!channels.contains(&9));
        assert_eq!(alloc.allocate(true), Some(9));
    }

    #[test]
    fn one_percussion_channel() {
        let mut alloc = ChannelAllocator::new();
        assert_eq!(alloc.allocate(true), Some(9));
        assert_eq!(alloc.allocate(true), None);
        assert_eq!(alloc.allocate(false), Some(0));
    }
}
