//! Minimal in-process demo: encode a register write, hand it to a
//! `Dispatcher` bound to a demo register table, and print the reply it
//! queues back. No real transport involved — see `bin/asc_loopback.rs` for
//! the version that talks to actual file descriptors.

use ascom::{DemoRegisterMap, Dispatcher, ProtocolEndpoint};

fn main() {
    let mut endpoint = ProtocolEndpoint::new();
    let regs = DemoRegisterMap::new();
    let mut table = regs.table();
    let mut dispatcher = Dispatcher::new();
    dispatcher.bind_rw(&mut table);

    endpoint
        .put_message(b'0', b'0', b'w', b"0001,000000FF")
        .expect("request fits in one frame");
    while let Ok(byte) = endpoint.out_buf_mut().pop_front() {
        endpoint.in_buf_mut().push_back(byte);
    }

    dispatcher
        .poll(&mut endpoint)
        .expect("dispatch does not fail on a well-formed frame");

    let reply = endpoint
        .get_message()
        .expect("reply decodes")
        .expect("a reply was queued");
    println!(
        "cmd={} data={:?}",
        reply.cmd as char,
        core::str::from_utf8(reply.data()).unwrap()
    );
    println!("register 1 is now {:#x}", regs.peek(1));
}
