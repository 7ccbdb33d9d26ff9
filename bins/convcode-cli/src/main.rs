use std::process::ExitCode;

use clap::Parser;

use convcode::Coder;
use convcode_config::CoderProfile;
use convcode_core::bitio::{get_bit, put_bit};

mod logging;
mod testvectors;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "convolutional encode/decode harness",
    long_about = "Encodes or decodes a low-bit-first bit-string through a configurable convolutional code"
)]
struct Args {
    /// Constraint length k (1..16)
    k: u8,

    /// Low-bit-first bit-string payload (encode) or received stream (decode)
    #[arg(required_unless_present = "run_tests")]
    bitstring: Option<String>,

    /// Run the built-in test-vector suite instead of encoding/decoding
    #[arg(short = 't', long = "test")]
    run_tests: bool,

    /// Disable tail termination
    #[arg(short = 'x', long = "no-tail")]
    no_tail: bool,

    /// Decode the bit-string (default if neither -d nor -e given)
    #[arg(short = 'd', long = "decode")]
    decode: bool,

    /// Encode the bit-string
    #[arg(short = 'e', long = "encode")]
    encode: bool,

    /// Recursive systematic code
    #[arg(short = 'r', long = "recursive")]
    recursive: bool,

    /// Start state for encode/decode (default 0)
    #[arg(short = 's', long = "start-state", default_value_t = 0)]
    start_state: u32,

    /// Initial path metric bias for non-start decoder states
    #[arg(short = 'i', long = "init-other-states")]
    init_other_states: Option<u32>,

    /// Append a generator polynomial (octal accepted, e.g. 0o171 or 171)
    #[arg(short = 'p', long = "poly", action = clap::ArgAction::Append)]
    polys: Vec<String>,

    /// Use a named built-in profile (e.g. "voyager", "lte") for the default
    /// polynomials and tail/recursive settings; explicit -p/-r/-x still win
    #[arg(short = 'c', long = "profile")]
    profile: Option<String>,

    /// Increase log verbosity (-v, -vv); also honors RUST_LOG
    #[arg(short = 'v', action = clap::ArgAction::Count)]
    verbose: u8,
}

fn parse_poly(raw: &str) -> Result<u32, String> {
    let trimmed = raw.trim();
    let digits = trimmed.strip_prefix("0o").or_else(|| trimmed.strip_prefix("0O")).unwrap_or(trimmed);
    u32::from_str_radix(digits, 8).map_err(|e| format!("invalid octal polynomial '{raw}': {e}"))
}

pub(crate) fn bitstring_to_bytes(s: &str) -> Result<(Vec<u8>, usize), String> {
    let nbits = s.len();
    let mut bytes = vec![0u8; nbits.div_ceil(8).max(1)];
    for (i, c) in s.chars().enumerate() {
        let bit = match c {
            '0' => 0,
            '1' => 1,
            other => return Err(format!("invalid bit character '{other}' at position {i}")),
        };
        put_bit(&mut bytes, i, bit);
    }
    Ok((bytes, nbits))
}

pub(crate) fn bytes_to_bitstring(bytes: &[u8], nbits: usize) -> String {
    (0..nbits).map(|i| if get_bit(bytes, i) != 0 { '1' } else { '0' }).collect()
}

fn run(args: &Args) -> Result<(), String> {
    let profile = match &args.profile {
        Some(name) => Some(CoderProfile::named(name).ok_or_else(|| format!("unknown profile '{name}'"))?),
        None => None,
    };

    let polys: Vec<u32> = if !args.polys.is_empty() {
        args.polys.iter().map(|p| parse_poly(p)).collect::<Result<_, _>>()?
    } else if let Some(p) = &profile {
        p.polys.clone()
    } else {
        vec![0b101, 0b111]
    };
    let do_tail = if args.no_tail { false } else { profile.as_ref().map(|p| p.tail_terminated).unwrap_or(true) };
    let recursive = args.recursive || profile.as_ref().is_some_and(|p| p.recursive);
    let bitstring = args.bitstring.as_deref().unwrap_or("");
    let (input, nbits) = bitstring_to_bytes(bitstring)?;

    let do_decode = args.decode || !args.encode;

    if do_decode {
        let mut coder = Coder::new(args.k, &polys, nbits + 64, do_tail, recursive)
            .map_err(|e| e.to_string())?;
        let init_other = args.init_other_states.unwrap_or(u32::MAX / 2);
        coder
            .decoder_mut()
            .reinit(args.start_state, init_other)
            .map_err(|e| e.to_string())?;

        let num_polys = polys.len();
        let usable_bits = (nbits / num_polys) * num_polys;
        let mut out = vec![0u8; usable_bits.div_ceil(8).max(1)];
        let result = coder
            .decoder_mut()
            .decode_block(&input, usable_bits, None, &mut out, None)
            .map_err(|e| e.to_string())?;

        println!("{}", bytes_to_bitstring(&out, result.total_out_bits));
        eprintln!("num_errs={}", result.num_errs);
    } else {
        let mut coder = Coder::new(args.k, &polys, 0, do_tail, recursive).map_err(|e| e.to_string())?;
        coder.encoder_mut().reinit(args.start_state).map_err(|e| e.to_string())?;
        let tail = if do_tail { (args.k.saturating_sub(1)) as usize } else { 0 };
        let total_out_bits = (nbits + tail) * polys.len();
        let mut out = vec![0u8; total_out_bits.div_ceil(8).max(1)];
        coder
            .encoder_mut()
            .encode_block(&input, nbits, &mut out)
            .map_err(|e| e.to_string())?;
        println!("{}", bytes_to_bitstring(&out, total_out_bits));
    }

    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    logging::setup(args.verbose);

    if args.run_tests {
        return match testvectors::run_all() {
            Ok(()) => {
                println!("all test vectors passed");
                ExitCode::SUCCESS
            }
            Err(msg) => {
                eprintln!("test vector failure: {msg}");
                ExitCode::FAILURE
            }
        };
    }

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(msg) => {
            eprintln!("error: {msg}");
            ExitCode::FAILURE
        }
    }
}
