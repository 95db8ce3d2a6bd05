//! Command dispatch (C5 in the design doc). Classifies an incoming frame's
//! command byte, routes it to the bound handler for that class, and
//! converts a handler's `Err` into an outgoing error frame — the single
//! conversion point mentioned in [`crate::err`].
//!
//! Grounded on `ascii_serial_com_device_receive` in the original firmware,
//! generalized from its fixed three-way `frw`/`fs`/`fother` split to the
//! five classes `{rw, s, nf, e, other}` and from C function pointers + a
//! `void *` state blob to a trait object per slot.

use crate::endpoint::ProtocolEndpoint;
use crate::err::{self, AscError};
use crate::ring::ByteRing;
use crate::MAX_MESSAGE_LEN;

/// One of the five command classes a frame's `cmd` byte can fall into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandClass {
    /// Register read/write: `cmd == 'r'` or `cmd == 'w'`.
    Rw,
    /// Set/action command: `cmd == 's'`.
    S,
    /// Streaming on/off toggle: `cmd == 'n'` or `cmd == 'f'`.
    Nf,
    /// Error frame: `cmd == 'e'`.
    E,
    /// Anything else.
    Other,
}

impl CommandClass {
    #[must_use]
    pub fn classify(cmd: u8) -> Self {
        match cmd {
            b'r' | b'w' => Self::Rw,
            b's' => Self::S,
            b'n' | b'f' => Self::Nf,
            b'e' => Self::E,
            _ => Self::Other,
        }
    }
}

/// A handler bound to one command class. Implementors push their reply (if
/// any) directly onto `out_buf`; returning `Err` causes the dispatcher to
/// synthesize an error frame in the handler's place.
pub trait CommandHandler {
    fn handle(
        &mut self,
        out_buf: &mut ByteRing<MAX_MESSAGE_LEN>,
        ver: u8,
        app: u8,
        cmd: u8,
        data: &[u8],
    ) -> Result<(), AscError>;
}

/// Up to one handler per command class. A class with no bound handler
/// replies with [`AscError::CommandNotImplemented`] instead of silently
/// dropping the frame, which is what the original's null-function-pointer
/// check did.
#[derive(Default)]
pub struct Dispatcher<'a> {
    rw: Option<&'a mut dyn CommandHandler>,
    s: Option<&'a mut dyn CommandHandler>,
    nf: Option<&'a mut dyn CommandHandler>,
    e: Option<&'a mut dyn CommandHandler>,
    other: Option<&'a mut dyn CommandHandler>,
}

impl<'a> Dispatcher<'a> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            rw: None,
            s: None,
            nf: None,
            e: None,
            other: None,
        }
    }

    pub fn bind_rw(&mut self, handler: &'a mut dyn CommandHandler) -> &mut Self {
        self.rw = Some(handler);
        self
    }

    pub fn bind_s(&mut self, handler: &'a mut dyn CommandHandler) -> &mut Self {
        self.s = Some(handler);
        self
    }

    pub fn bind_nf(&mut self, handler: &'a mut dyn CommandHandler) -> &mut Self {
        self.nf = Some(handler);
        self
    }

    pub fn bind_e(&mut self, handler: &'a mut dyn CommandHandler) -> &mut Self {
        self.e = Some(handler);
        self
    }

    pub fn bind_other(&mut self, handler: &'a mut dyn CommandHandler) -> &mut Self {
        self.other = Some(handler);
        self
    }

    /// Pulls at most one frame out of `endpoint` and routes it. A frame that
    /// fails to decode at all is logged and dropped (there's no `ver`/`app`
    /// to address a reply to); a frame that decodes but whose handler
    /// returns `Err`, or whose class has no handler bound, gets an error
    /// frame back addressed to the same `ver`/`app`.
    pub fn poll(&mut self, endpoint: &mut ProtocolEndpoint) -> Result<(), AscError> {
        let frame = match endpoint.get_message() {
            Ok(Some(f)) => f,
            Ok(None) => return Ok(()),
            Err(e) => {
                log::warn!("dropping unparseable frame: {e}");
                return Ok(());
            }
        };

        let handler = match CommandClass::classify(frame.cmd) {
            CommandClass::Rw => self.rw.as_deref_mut(),
            CommandClass::S => self.s.as_deref_mut(),
            CommandClass::Nf => self.nf.as_deref_mut(),
            CommandClass::E => self.e.as_deref_mut(),
            CommandClass::Other => self.other.as_deref_mut(),
        };

        let result = match handler {
            Some(h) => h.handle(
                endpoint.out_buf_mut(),
                frame.ver,
                frame.app,
                frame.cmd,
                frame.data(),
            ),
            None => Err(AscError::CommandNotImplemented),
        };

        if let Err(e) = result {
            let (payload, len) = err::error_frame_payload(e, frame.cmd, frame.data());
            if let Err(encode_err) = endpoint.put_message(frame.ver, frame.app, b'e', &payload[..len]) {
                log::error!("could not queue error frame: {encode_err}");
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    struct Echo;
    impl CommandHandler for Echo {
        fn handle(
            &mut self,
            out_buf: &mut ByteRing<MAX_MESSAGE_LEN>,
            ver: u8,
            app: u8,
            cmd: u8,
            data: &[u8],
        ) -> Result<(), AscError> {
            crate::frame::encode_into(out_buf, ver, app, cmd, data)
        }
    }

    struct AlwaysFails;
    impl CommandHandler for AlwaysFails {
        fn handle(
            &mut self,
            _out_buf: &mut ByteRing<MAX_MESSAGE_LEN>,
            _ver: u8,
            _app: u8,
            _cmd: u8,
            _data: &[u8],
        ) -> Result<(), AscError> {
            Err(AscError::RegnumOob)
        }
    }

    #[test]
    fn classifies_every_documented_command() {
        assert_eq!(CommandClass::classify(b'r'), CommandClass::Rw);
        assert_eq!(CommandClass::classify(b'w'), CommandClass::Rw);
        assert_eq!(CommandClass::classify(b's'), CommandClass::S);
        assert_eq!(CommandClass::classify(b'n'), CommandClass::Nf);
        assert_eq!(CommandClass::classify(b'f'), CommandClass::Nf);
        assert_eq!(CommandClass::classify(b'e'), CommandClass::E);
        assert_eq!(CommandClass::classify(b'z'), CommandClass::Other);
    }

    #[test]
    fn routes_to_bound_handler() {
        let mut echo = Echo;
        let mut dispatcher = Dispatcher::new();
        dispatcher.bind_s(&mut echo);

        let mut endpoint = ProtocolEndpoint::new();
        endpoint.put_message(b'0', b'0', b's', b"hi").unwrap();
        while let Ok(b) = endpoint.out_buf_mut().pop_front() {
            endpoint.in_buf_mut().push_back(b);
        }

        dispatcher.poll(&mut endpoint).unwrap();
        let reply = endpoint.get_message().unwrap().unwrap();
        assert_eq!(reply.cmd, b's');
        assert_eq!(reply.data(), b"hi");
    }

    #[test]
    fn missing_handler_replies_with_command_not_implemented() {
        let mut dispatcher: Dispatcher = Dispatcher::new();
        let mut endpoint = ProtocolEndpoint::new();
        endpoint.put_message(b'0', b'0', b's', b"hi").unwrap();
        while let Ok(b) = endpoint.out_buf_mut().pop_front() {
            endpoint.in_buf_mut().push_back(b);
        }

        dispatcher.poll(&mut endpoint).unwrap();
        let reply = endpoint.get_message().unwrap().unwrap();
        assert_eq!(reply.cmd, b'e');
        assert_eq!(&reply.data()[..2], b"14"); // 20 decimal == 0x14
        assert_eq!(reply.data()[2], b's');
    }

    #[test]
    fn handler_error_becomes_error_frame() {
        let mut fails = AlwaysFails;
        let mut dispatcher = Dispatcher::new();
        dispatcher.bind_rw(&mut fails);

        let mut endpoint = ProtocolEndpoint::new();
        endpoint.put_message(b'0', b'0', b'r', b"0000").unwrap();
        while let Ok(b) = endpoint.out_buf_mut().pop_front() {
            endpoint.in_buf_mut().push_back(b);
        }

        dispatcher.poll(&mut endpoint).unwrap();
        let reply = endpoint.get_message().unwrap().unwrap();
        assert_eq!(reply.cmd, b'e');
        assert_eq!(&reply.data()[..2], b"18"); // 24 decimal == 0x18 (RegnumOob)
    }

    #[test]
    fn unparseable_frame_is_dropped_without_a_reply() {
        let mut dispatcher: Dispatcher = Dispatcher::new();
        let mut endpoint = ProtocolEndpoint::new();
        endpoint.in_buf_mut().push_back_block(b">00wBAD!\n");
        dispatcher.poll(&mut endpoint).unwrap();
        assert!(endpoint.out_buf().is_empty());
    }
}
