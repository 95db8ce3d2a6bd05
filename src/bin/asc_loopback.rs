//! Host loopback utility (§6.5): a thin shell around [`ascom::io::host`],
//! grounded on `ascii_serial_com_dummy_loopback_device.c`'s poll loop.
//!
//! `-l` bypasses the codec entirely and just shuttles raw bytes between the
//! two descriptors; without it, incoming frames are decoded, dispatched
//! against a demo register table, and replies are queued back out.

use std::fs::File;
use std::os::fd::{AsFd, BorrowedFd};
use std::path::PathBuf;
use std::time::Duration;

use ascom::io::host::BufferedIo;
use ascom::{DemoRegisterMap, Dispatcher, ProtocolEndpoint, RegisterTable};
use clap::Parser;

/// ASCII-Serial-Com loopback device.
///
/// If no filenames are provided, stdin and stdout are used.
#[derive(Parser, Debug)]
#[command(name = "asc-loopback", version, about, long_about = None)]
struct Args {
    /// Raw loopback mode: shuttle bytes unchanged, without using ASCII-Serial-Com.
    #[arg(short = 'l', long = "raw")]
    raw: bool,

    /// Input file. Defaults to stdin.
    infile: Option<PathBuf>,

    /// Output file. Defaults to stdout.
    outfile: Option<PathBuf>,
}

fn main() {
    env_logger::init();
    let args = Args::parse();
    std::process::exit(run(args));
}

fn run(args: Args) -> i32 {
    if args.outfile.is_some() != args.infile.is_some() {
        eprintln!("Error: either 0 or 2 positional arguments required (infile outfile).");
        return 1;
    }

    let (in_file, out_file);
    let (stdin, stdout);
    let (fd_in, fd_out): (BorrowedFd<'_>, BorrowedFd<'_>) = match (&args.infile, &args.outfile) {
        (Some(infile), Some(outfile)) => {
            eprintln!("infile: {}\noutfile: {}", infile.display(), outfile.display());
            in_file = match File::open(infile) {
                Ok(f) => f,
                Err(e) => {
                    eprintln!("Error opening input file: {e}");
                    return 1;
                }
            };
            out_file = match File::options().append(true).create(true).open(outfile) {
                Ok(f) => f,
                Err(e) => {
                    eprintln!("Error opening output file: {e}");
                    return 1;
                }
            };
            (in_file.as_fd(), out_file.as_fd())
        }
        _ => {
            eprintln!("infile: stdin\noutfile: stdout");
            stdin = std::io::stdin();
            stdout = std::io::stdout();
            (stdin.as_fd(), stdout.as_fd())
        }
    };

    if args.raw {
        run_raw(fd_in, fd_out)
    } else {
        run_codec(fd_in, fd_out)
    }
}

fn run_raw(fd_in: BorrowedFd<'_>, fd_out: BorrowedFd<'_>) -> i32 {
    let mut buf = [0u8; 64];
    loop {
        let n = match rustix::io::read(fd_in, &mut buf) {
            Ok(n) => n,
            Err(e) => {
                eprintln!("Error reading from infile: {e}");
                return 1;
            }
        };
        if n == 0 {
            return 0;
        }
        let mut written = 0;
        while written < n {
            match rustix::io::write(fd_out, &buf[written..n]) {
                Ok(w) => written += w,
                Err(e) => {
                    eprintln!("Error writing to outfile: {e}");
                    return 1;
                }
            }
        }
    }
}

fn run_codec(fd_in: BorrowedFd<'_>, fd_out: BorrowedFd<'_>) -> i32 {
    let transport = BufferedIo::new(fd_in, fd_out);
    let mut endpoint = ProtocolEndpoint::new();
    let regs = DemoRegisterMap::new();
    let mut table: RegisterTable<'_, u32, { ascom::regdemo::DEMO_REG_COUNT }> = regs.table();
    let mut dispatcher = Dispatcher::new();
    dispatcher.bind_rw(&mut table);

    loop {
        let (in_ready, out_ready) = match transport.poll_ready(&endpoint, Some(Duration::from_millis(1000))) {
            Ok(r) => r,
            Err(e) => {
                eprintln!("Error while polling: {e}");
                return 1;
            }
        };

        if in_ready {
            match transport.do_input(&mut endpoint) {
                Ok(0) => return 0, // EOF
                Ok(_) => {}
                Err(e) => {
                    eprintln!("Error reading from infile: {e}");
                    return 1;
                }
            }
        }

        if let Err(e) = dispatcher.poll(&mut endpoint) {
            eprintln!("Error dispatching frame: {e}");
            return 1;
        }

        if out_ready {
            if let Err(e) = transport.do_output(&mut endpoint) {
                eprintln!("Error writing to outfile: {e}");
                return 1;
            }
        }
    }
}
