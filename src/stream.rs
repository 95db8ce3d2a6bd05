//! Streaming glue (C9 in the design doc): the `n`/`f` on-off toggle plus a
//! periodic producer that's gated on the output ring being empty.
//!
//! Grounded on `handle_nf_messages` and the ADC-streaming main loops
//! (`arduino_uno_adc_streaming.c` / `stm32f091nucleo64_adc_streaming.c`):
//! `n` turns streaming on, `f` turns it off, and once on, a sample is
//! pushed as an `s` frame only when the timer has fired *and* `out_buf` is
//! empty — backpressure by refusing to queue a sample on top of one not
//! yet drained, rather than growing an unbounded queue.

use crate::dispatch::CommandHandler;
use crate::endpoint::ProtocolEndpoint;
use crate::err::AscError;
use crate::ring::ByteRing;
use crate::timer::{MillisecTimer, TimerUnit};
use crate::{MAX_DATA_LEN, MAX_MESSAGE_LEN};

/// The on/off flag toggled by `n`/`f` frames. Bind this to
/// [`crate::dispatch::Dispatcher::bind_nf`]; drive the actual sampling with
/// a separate [`StreamPump`] since the dispatcher's handler call doesn't
/// carry a clock reading.
#[derive(Debug, Default)]
pub struct StreamToggle {
    on: bool,
}

impl StreamToggle {
    #[must_use]
    pub const fn new() -> Self {
        Self { on: false }
    }

    #[must_use]
    pub const fn is_on(&self) -> bool {
        self.on
    }
}

impl CommandHandler for StreamToggle {
    fn handle(
        &mut self,
        _out_buf: &mut ByteRing<MAX_MESSAGE_LEN>,
        _ver: u8,
        _app: u8,
        cmd: u8,
        _data: &[u8],
    ) -> Result<(), AscError> {
        match cmd {
            b'n' => self.on = true,
            b'f' => self.on = false,
            _ => return Err(AscError::UnexpectedCommand),
        }
        Ok(())
    }
}

/// Produces one stream sample's worth of payload bytes. Returning `None`
/// means "nothing to send yet"; the pump doesn't retry until its next tick.
pub trait StreamProducer {
    fn produce(&mut self, now: TimerUnit, out: &mut [u8; MAX_DATA_LEN]) -> Option<usize>;
}

/// Periodically calls a [`StreamProducer`] and queues its output as an `s`
/// frame, as long as [`StreamToggle::is_on`] and `out_buf` is empty.
pub struct StreamPump<P: StreamProducer> {
    timer: MillisecTimer,
    period_ms: TimerUnit,
    ver: u8,
    app: u8,
    producer: P,
}

impl<P: StreamProducer> StreamPump<P> {
    pub fn new(period_ms: TimerUnit, ver: u8, app: u8, producer: P) -> Self {
        Self {
            timer: MillisecTimer::new(),
            period_ms,
            ver,
            app,
            producer,
        }
    }

    pub fn pump(
        &mut self,
        toggle: &StreamToggle,
        endpoint: &mut ProtocolEndpoint,
        now: TimerUnit,
    ) -> Result<(), AscError> {
        if !toggle.is_on() {
            self.timer.disable();
            return Ok(());
        }
        if !self.timer.is_enabled() {
            self.timer.set_rel(now, self.period_ms);
        }
        if !endpoint.out_buf().is_empty() {
            return Ok(());
        }
        if self.timer.is_expired_repeat(now) {
            let mut data = [0u8; MAX_DATA_LEN];
            if let Some(len) = self.producer.produce(now, &mut data) {
                endpoint.put_message(self.ver, self.app, b's', &data[..len])?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    struct Counter(u8);
    impl StreamProducer for Counter {
        fn produce(&mut self, _now: TimerUnit, out: &mut [u8; MAX_DATA_LEN]) -> Option<usize> {
            out[0] = self.0;
            self.0 += 1;
            Some(1)
        }
    }

    #[test]
    fn n_turns_on_f_turns_off() {
        let mut toggle = StreamToggle::new();
        let mut scratch: ByteRing<MAX_MESSAGE_LEN> = ByteRing::new();
        toggle.handle(&mut scratch, b'0', b'0', b'n', b"").unwrap();
        assert!(toggle.is_on());
        toggle.handle(&mut scratch, b'0', b'0', b'f', b"").unwrap();
        assert!(!toggle.is_on());
    }

    #[test]
    fn does_nothing_while_off() {
        let toggle = StreamToggle::new();
        let mut endpoint = ProtocolEndpoint::new();
        let mut pump = StreamPump::new(100, b'0', b'0', Counter(0));
        pump.pump(&toggle, &mut endpoint, 0).unwrap();
        assert!(endpoint.out_buf().is_empty());
    }

    #[test]
    fn samples_once_per_period_once_enabled() {
        let mut toggle = StreamToggle::new();
        let mut scratch: ByteRing<MAX_MESSAGE_LEN> = ByteRing::new();
        toggle.handle(&mut scratch, b'0', b'0', b'n', b"").unwrap();

        let mut endpoint = ProtocolEndpoint::new();
        let mut pump = StreamPump::new(100, b'0', b'0', Counter(0));

        pump.pump(&toggle, &mut endpoint, 0).unwrap();
        assert!(endpoint.out_buf().is_empty()); // timer just armed, not expired yet

        pump.pump(&toggle, &mut endpoint, 100).unwrap();
        let frame = endpoint.get_message().unwrap().unwrap();
        assert_eq!(frame.cmd, b's');
        assert_eq!(frame.data(), &[0]);
    }

    #[test]
    fn refuses_to_sample_on_top_of_an_undrained_output() {
        let mut toggle = StreamToggle::new();
        let mut scratch: ByteRing<MAX_MESSAGE_LEN> = ByteRing::new();
        toggle.handle(&mut scratch, b'0', b'0', b'n', b"").unwrap();

        let mut endpoint = ProtocolEndpoint::new();
        endpoint.put_message(b'0', b'0', b'x', b"stale").unwrap();
        let mut pump = StreamPump::new(100, b'0', b'0', Counter(0));
        pump.pump(&toggle, &mut endpoint, 100).unwrap();

        // The stale frame is still the only thing in out_buf; no sample was appended.
        let frame = endpoint.get_message().unwrap().unwrap();
        assert_eq!(frame.cmd, b'x');
        assert!(endpoint.get_message().unwrap().is_none());
    }

    #[test]
    fn turning_off_disarms_the_timer_for_a_fresh_restart() {
        let mut toggle = StreamToggle::new();
        let mut scratch: ByteRing<MAX_MESSAGE_LEN> = ByteRing::new();
        toggle.handle(&mut scratch, b'0', b'0', b'n', b"").unwrap();
        let mut endpoint = ProtocolEndpoint::new();
        let mut pump = StreamPump::new(100, b'0', b'0', Counter(0));
        pump.pump(&toggle, &mut endpoint, 0).unwrap();

        toggle.handle(&mut scratch, b'0', b'0', b'f', b"").unwrap();
        pump.pump(&toggle, &mut endpoint, 50).unwrap();
        assert!(!pump.timer.is_enabled());
    }
}
