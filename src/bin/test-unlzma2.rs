//! `test-unlzma2` — the decoder's test bench (spec.md §6.3).
//!
//! `test-unlzma2 [-v] [-r|-x] [-c] [-b SIZE[K|M|G]] [FILE|-]`
//!
//! Reads the file (or stdin if `-` or absent), writes the decompressed
//! bytes to stdout. Plain argument scanning and direct `println!`/
//! `eprintln!`, grounded on the teacher's `src/bin/comparison.rs` rather
//! than pulling in a CLI-parsing crate for five flags.

use std::io::{Read, Write};

struct Args {
    verbose: u32,
    force_raw: bool,
    force_xz: bool,
    require_crc: bool,
    out_buf_size: Option<usize>,
    path: Option<String>,
}

fn usage() -> ! {
    eprintln!("usage: test-unlzma2 [-v] [-r|-x] [-c] [-b SIZE[K|M|G]] [FILE|-]");
    std::process::exit(2);
}

fn parse_size(s: &str) -> Option<usize> {
    let (digits, mult) = match s.chars().last() {
        Some('K') | Some('k') => (&s[..s.len() - 1], 1024),
        Some('M') | Some('m') => (&s[..s.len() - 1], 1024 * 1024),
        Some('G') | Some('g') => (&s[..s.len() - 1], 1024 * 1024 * 1024),
        _ => (s, 1),
    };
    digits.parse::<usize>().ok().map(|n| n * mult)
}

fn parse_args() -> Args {
    let mut args = Args {
        verbose: 0,
        force_raw: false,
        force_xz: false,
        require_crc: false,
        out_buf_size: None,
        path: None,
    };
    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "-v" => args.verbose += 1,
            "-r" => {
                if args.force_xz {
                    usage();
                }
                args.force_raw = true;
            }
            "-x" => {
                if args.force_raw {
                    usage();
                }
                args.force_xz = true;
            }
            "-c" => args.require_crc = true,
            "-b" => {
                let Some(size_arg) = it.next() else {
                    usage();
                };
                match parse_size(&size_arg) {
                    Some(n) if n > 0 => args.out_buf_size = Some(n),
                    _ => usage(),
                }
            }
            "-" => args.path = Some("-".to_string()),
            other if !other.starts_with('-') => {
                if args.path.is_some() {
                    usage();
                }
                args.path = Some(other.to_string());
            }
            _ => usage(),
        }
    }
    args
}

fn read_input(path: &Option<String>) -> std::io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    match path.as_deref() {
        None | Some("-") => std::io::stdin().read_to_end(&mut buf)?,
        Some(p) => std::fs::File::open(p)?.read_to_end(&mut buf)?,
    };
    Ok(buf)
}

fn looks_like_xz(input: &[u8]) -> bool {
    input.len() >= 6 && input[..6] == [0xFD, b'7', b'z', b'X', b'Z', 0x00]
}

fn main() {
    let args = parse_args();

    let input = match read_input(&args.path) {
        Ok(b) => b,
        Err(e) => {
            eprintln!("test-unlzma2: failed to read input: {e}");
            std::process::exit(1);
        }
    };

    let is_xz = if args.force_xz {
        true
    } else if args.force_raw {
        false
    } else {
        looks_like_xz(&input)
    };

    if args.verbose > 0 {
        eprintln!(
            "test-unlzma2: {} input bytes, mode={}",
            input.len(),
            if is_xz { "xz" } else { "raw lzma2" }
        );
    }

    let out_size = args.out_buf_size.unwrap_or_else(|| input.len() * 4);
    let mut output = vec![0u8; out_size];

    if args.require_crc && !is_xz {
        eprintln!("test-unlzma2: -c requires an XZ envelope (use with -x, not -r)");
        std::process::exit(2);
    }

    let outcome = if is_xz {
        if args.require_crc {
            unlzma2::xz::decode_requiring_crc32(&input, &mut output)
        } else {
            unlzma2::xz::decode(&input, &mut output)
        }
    } else {
        unlzma2::decode(&input, &mut output)
    };

    if outcome.consumed_in > input.len() || outcome.produced_out > output.len() {
        eprintln!("test-unlzma2: decoder cursors moved past buffer bounds");
        std::process::exit(3);
    }

    match outcome.status {
        unlzma2::Status::Ok => {
            if args.verbose > 0 {
                eprintln!(
                    "test-unlzma2: ok, consumed {} bytes, produced {} bytes",
                    outcome.consumed_in, outcome.produced_out
                );
            }
            let stdout = std::io::stdout();
            let mut lock = stdout.lock();
            if let Err(e) = lock.write_all(&output[..outcome.produced_out]) {
                eprintln!("test-unlzma2: failed to write output: {e}");
                std::process::exit(1);
            }
        }
        status => {
            eprintln!(
                "test-unlzma2: {status} (consumed {} bytes, produced {} bytes)",
                outcome.consumed_in, outcome.produced_out
            );
            std::process::exit(1);
        }
    }
}
