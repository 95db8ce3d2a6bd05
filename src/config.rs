//! Per-endpoint configuration (the builder that replaces the original's
//! `DECLARE_ASC_DEVICE_W_REGISTER_POINTERS`/`SETUP_ASC_DEVICE_W_REGISTER_POINTERS`
//! macro pair). Those macros stamped out a device's fixed wiring at compile
//! time: protocol version bytes, the register map, and the extra-input
//! relay size. A builder gives the same fixed-up-front configuration
//! without needing the caller's crate to embed our macros into their own
//! translation unit.

/// What to do with a byte that arrives while the main input ring is full.
/// Neither policy can grow the ring — there's no allocator to grow it with
/// — so the choice is only about which byte loses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverflowPolicy {
    /// Keep the oldest buffered bytes; the arriving byte is discarded. This
    /// is the default: an in-flight frame that's already partially buffered
    /// is more valuable to finish than a frame that hasn't started yet.
    #[default]
    DropNewest,
    /// Evict the oldest buffered byte to make room (`ByteRing::push_back`'s
    /// native behavior).
    DropOldest,
}

impl OverflowPolicy {
    /// Applies this policy to one incoming byte against a ring that may
    /// already be full. Returns whether the byte was accepted.
    pub fn push_input<const N: usize>(self, ring: &mut crate::ring::ByteRing<N>, byte: u8) -> bool {
        match self {
            Self::DropOldest => {
                ring.push_back(byte);
                true
            }
            Self::DropNewest => {
                if ring.is_full() {
                    false
                } else {
                    ring.push_back(byte);
                    true
                }
            }
        }
    }
}

/// Fixed per-endpoint settings: the protocol version bytes every outgoing
/// frame carries, and the policy for handling input overflow.
#[derive(Debug, Clone, Copy)]
pub struct EndpointConfig {
    ver: u8,
    app: u8,
    overflow_policy: OverflowPolicy,
}

impl EndpointConfig {
    #[must_use]
    pub const fn new(ver: u8, app: u8) -> Self {
        Self {
            ver,
            app,
            overflow_policy: OverflowPolicy::DropNewest,
        }
    }

    #[must_use]
    pub const fn with_overflow_policy(mut self, policy: OverflowPolicy) -> Self {
        self.overflow_policy = policy;
        self
    }

    #[must_use]
    pub const fn ver(&self) -> u8 {
        self.ver
    }

    #[must_use]
    pub const fn app(&self) -> u8 {
        self.app
    }

    #[must_use]
    pub const fn overflow_policy(&self) -> OverflowPolicy {
        self.overflow_policy
    }

    /// Applies the configured policy to one incoming byte against a ring
    /// that may already be full. Returns whether the byte was accepted.
    pub fn push_input<const N: usize>(&self, ring: &mut crate::ring::ByteRing<N>, byte: u8) -> bool {
        self.overflow_policy.push_input(ring, byte)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ring::ByteRing;
    use pretty_assertions::assert_eq;

    #[test]
    fn default_policy_drops_newest_when_full() {
        let config = EndpointConfig::new(b'0', b'0');
        let mut ring: ByteRing<2> = ByteRing::new();
        assert!(config.push_input(&mut ring, 1));
        assert!(config.push_input(&mut ring, 2));
        assert!(!config.push_input(&mut ring, 3));
        assert_eq!(ring.get(0).unwrap(), 1);
        assert_eq!(ring.get(1).unwrap(), 2);
    }

    #[test]
    fn drop_oldest_policy_evicts_front() {
        let config = EndpointConfig::new(b'0', b'0').with_overflow_policy(OverflowPolicy::DropOldest);
        let mut ring: ByteRing<2> = ByteRing::new();
        config.push_input(&mut ring, 1);
        config.push_input(&mut ring, 2);
        config.push_input(&mut ring, 3);
        assert_eq!(ring.get(0).unwrap(), 2);
        assert_eq!(ring.get(1).unwrap(), 3);
    }
}
