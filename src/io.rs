//! Transport glue (C10 in the design doc) for the two environments this
//! protocol actually runs in: a poll-driven host process, and an
//! interrupt-driven microcontroller.
//!
//! Grounded on `circular_buffer_io_fd_poll.c` for the host side (same
//! poll-gate-on-emptiness structure, `rustix::event::poll` standing in for
//! `poll(2)`) and on the AVR/STM32 main loops' `ATOMIC_BLOCK`/`CM_ATOMIC_BLOCK`
//! pattern for the embedded side, generalized to `critical_section::with`.

use crate::config::OverflowPolicy;
use crate::endpoint::ProtocolEndpoint;
use crate::ring::ByteRing;
use crate::MAX_MESSAGE_LEN;

/// Moves bytes pushed from an interrupt context into the endpoint's
/// `in_buf` on the main loop's schedule. Grounded on the AVR examples'
/// `extraInputBuffer`: the ISR only ever pushes into a small ring behind a
/// critical section; the main loop is the only thing that pops from it
/// into the real input buffer.
pub struct IsrInputRelay<const N: usize> {
    extra_in: ByteRing<N>,
    overflow_policy: OverflowPolicy,
}

impl<const N: usize> Default for IsrInputRelay<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> IsrInputRelay<N> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            extra_in: ByteRing::new(),
            overflow_policy: OverflowPolicy::DropNewest,
        }
    }

    #[must_use]
    pub const fn with_overflow_policy(mut self, policy: OverflowPolicy) -> Self {
        self.overflow_policy = policy;
        self
    }

    /// Call from the interrupt handler. Takes the critical section so a
    /// `drain` running on the main loop can't observe a half-written push.
    /// Applies the configured overflow policy when `extra_in` is already
    /// full, instead of always evicting the oldest buffered byte.
    pub fn push_from_isr(&mut self, byte: u8, cs: critical_section::CriticalSection<'_>) {
        let _ = cs;
        self.overflow_policy.push_input(&mut self.extra_in, byte);
    }

    /// Call from the main loop: moves everything the ISR has queued so far
    /// into `endpoint.in_buf`, one critical section per byte so the ISR is
    /// never blocked for long.
    pub fn drain_into(&mut self, endpoint: &mut ProtocolEndpoint) {
        loop {
            let byte = critical_section::with(|_cs| self.extra_in.pop_front());
            match byte {
                Ok(b) => endpoint.in_buf_mut().push_back(b),
                Err(_) => break,
            }
        }
    }
}

/// Host-side poll-driven adapter: always polls the input fd, and polls the
/// output fd for writability only when there's something queued to send
/// (mirrors `circular_buffer_io_fd_poll_do_poll`'s output-gate).
#[cfg(feature = "std")]
pub mod host {
    use super::ProtocolEndpoint;
    use rustix::event::{poll, PollFd, PollFlags};
    use rustix::fd::{AsFd, BorrowedFd};
    use std::io;
    use std::time::Duration;

    pub struct BufferedIo<'a> {
        fd_in: BorrowedFd<'a>,
        fd_out: BorrowedFd<'a>,
    }

    impl<'a> BufferedIo<'a> {
        #[must_use]
        pub fn new(fd_in: BorrowedFd<'a>, fd_out: BorrowedFd<'a>) -> Self {
            Self { fd_in, fd_out }
        }

        /// Polls both descriptors. `timeout` of `None` waits indefinitely,
        /// matching `poll(2)`'s `-1`.
        pub fn poll_ready(
            &self,
            endpoint: &ProtocolEndpoint,
            timeout: Option<Duration>,
        ) -> io::Result<(bool, bool)> {
            let out_events = if endpoint.out_buf().is_empty() {
                PollFlags::empty()
            } else {
                PollFlags::OUT
            };
            let mut fds = [
                PollFd::new(&self.fd_in, PollFlags::IN),
                PollFd::new(&self.fd_out, out_events),
            ];
            let timeout_arg = timeout.map_or(-1, |d| d.as_millis().min(i32::MAX as u128) as i32);
            poll(&mut fds, timeout_arg).map_err(io::Error::from)?;
            let in_ready = fds[0].revents().contains(PollFlags::IN);
            let out_ready = fds[1].revents().contains(PollFlags::OUT);
            Ok((in_ready, out_ready))
        }

        /// Reads as many bytes as fit contiguously into `endpoint.in_buf`.
        /// Returns `0` on EOF as well as on "nothing to read right now".
        pub fn do_input(&self, endpoint: &mut ProtocolEndpoint) -> io::Result<usize> {
            endpoint
                .in_buf_mut()
                .push_back_from_reader(|buf| rustix::io::read(self.fd_in, buf).map_err(io::Error::from))
        }

        /// Writes as many queued bytes as the fd will currently accept.
        pub fn do_output(&self, endpoint: &mut ProtocolEndpoint) -> io::Result<usize> {
            endpoint
                .out_buf_mut()
                .pop_front_to_writer(|buf| rustix::io::write(self.fd_out, buf).map_err(io::Error::from))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn isr_relay_moves_bytes_in_push_order() {
        let mut relay: IsrInputRelay<8> = IsrInputRelay::new();
        critical_section::with(|cs| {
            relay.push_from_isr(b'h', cs);
            relay.push_from_isr(b'i', cs);
        });
        let mut endpoint = ProtocolEndpoint::new();
        relay.drain_into(&mut endpoint);
        assert_eq!(endpoint.in_buf().get(0).unwrap(), b'h');
        assert_eq!(endpoint.in_buf().get(1).unwrap(), b'i');
        assert_eq!(endpoint.in_buf().size(), 2);
    }

    #[test]
    fn default_policy_drops_the_arriving_byte_once_full() {
        let mut relay: IsrInputRelay<2> = IsrInputRelay::new();
        critical_section::with(|cs| {
            relay.push_from_isr(1, cs);
            relay.push_from_isr(2, cs);
            relay.push_from_isr(3, cs);
        });
        let mut endpoint = ProtocolEndpoint::new();
        relay.drain_into(&mut endpoint);
        assert_eq!(endpoint.in_buf().get(0).unwrap(), 1);
        assert_eq!(endpoint.in_buf().get(1).unwrap(), 2);
        assert_eq!(endpoint.in_buf().size(), 2);
    }

    #[test]
    fn drop_oldest_policy_evicts_the_buffered_byte() {
        let mut relay: IsrInputRelay<2> = IsrInputRelay::new().with_overflow_policy(OverflowPolicy::DropOldest);
        critical_section::with(|cs| {
            relay.push_from_isr(1, cs);
            relay.push_from_isr(2, cs);
            relay.push_from_isr(3, cs);
        });
        let mut endpoint = ProtocolEndpoint::new();
        relay.drain_into(&mut endpoint);
        assert_eq!(endpoint.in_buf().get(0).unwrap(), 2);
        assert_eq!(endpoint.in_buf().get(1).unwrap(), 3);
        assert_eq!(endpoint.in_buf().size(), 2);
    }

    #[test]
    fn drain_is_a_noop_on_an_empty_relay() {
        let mut relay: IsrInputRelay<8> = IsrInputRelay::new();
        let mut endpoint = ProtocolEndpoint::new();
        relay.drain_into(&mut endpoint);
        assert!(endpoint.in_buf().is_empty());
    }
}
