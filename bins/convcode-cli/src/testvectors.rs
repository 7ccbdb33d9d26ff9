//! Fixed test vectors exercised by `convcode-cli -t`.
//!
//! Mirrors the scenario table used by `convcode`'s own unit tests, but run
//! end-to-end through the CLI's bit-string parsing so a change to either
//! layer's framing shows up here too.

use convcode::Coder;

use crate::{bitstring_to_bytes, bytes_to_bitstring};

struct Case {
    name: &'static str,
    k: u8,
    polys: &'static [u32],
    decoded: &'static str,
    encoded: &'static str,
    num_errs: u32,
}

const HARD_CASES: &[Case] = &[
    Case {
        name: "A",
        k: 3,
        polys: &[0b101, 0b111],
        decoded: "010111001010001",
        encoded: "0011010010011011110100011100110111",
        num_errs: 0,
    },
    Case {
        name: "B",
        k: 3,
        polys: &[0b101, 0b111],
        decoded: "010111001010001",
        encoded: "0011010010011011110000011100110111",
        num_errs: 1,
    },
    Case {
        name: "C",
        k: 3,
        polys: &[0b011, 0b111],
        decoded: "101100",
        encoded: "0111101000110000",
        num_errs: 0,
    },
    Case {
        name: "D",
        k: 3,
        polys: &[0b101, 0b011],
        decoded: "1001101",
        encoded: "100111101110010111",
        num_errs: 0,
    },
    Case {
        name: "F",
        k: 7,
        polys: &[0o117, 0o127, 0o155],
        decoded: "10110111",
        encoded: "111001101011100110011101111111100110001111",
        num_errs: 0,
    },
];

fn run_hard_case(case: &Case) -> Result<(), String> {
    let (encoded_bytes, encoded_bits) = bitstring_to_bytes(case.encoded)?;
    let (expected_decoded_bytes, expected_decoded_bits) = bitstring_to_bytes(case.decoded)?;

    let mut coder = Coder::new(case.k, case.polys, encoded_bits, true, false)
        .map_err(|e| format!("case {}: {e}", case.name))?;
    let mut out = vec![0u8; encoded_bits.div_ceil(8).max(1)];
    let result = coder
        .decoder_mut()
        .decode_block(&encoded_bytes, encoded_bits, None, &mut out, None)
        .map_err(|e| format!("case {}: {e}", case.name))?;

    if result.total_out_bits != expected_decoded_bits {
        return Err(format!(
            "case {}: decoded length {} != expected {}",
            case.name, result.total_out_bits, expected_decoded_bits
        ));
    }
    let got = bytes_to_bitstring(&out, result.total_out_bits);
    let want = bytes_to_bitstring(&expected_decoded_bytes, expected_decoded_bits);
    if got != want {
        return Err(format!("case {}: decoded {got} != expected {want}", case.name));
    }
    if result.num_errs != case.num_errs {
        return Err(format!(
            "case {}: num_errs {} != expected {}",
            case.name, result.num_errs, case.num_errs
        ));
    }
    Ok(())
}

/// Case E (Voyager, soft-decision): decoded `01011010`, encoded
/// `0011100010011010100111011100` with `uncertainty[4] = 100` and all other
/// positions 0, `uncertainty_100 = 100`, expected `num_errs = 100`.
fn run_case_e() -> Result<(), String> {
    let decoded = "01011010";
    let encoded = "0011100010011010100111011100";
    let k = 7u8;
    let polys = [0o171u32, 0o133u32];

    let (encoded_bytes, encoded_bits) = bitstring_to_bytes(encoded)?;
    let (expected_decoded_bytes, expected_decoded_bits) = bitstring_to_bytes(decoded)?;

    let mut uncertainty = vec![0u8; encoded_bits];
    uncertainty[4] = 100;

    let mut coder = Coder::new(k, &polys, encoded_bits, true, false).map_err(|e| format!("case E: {e}"))?;
    coder.decoder_mut().set_max_uncertainty(100);
    let mut out = vec![0u8; encoded_bits.div_ceil(8).max(1)];
    let result = coder
        .decoder_mut()
        .decode_block(&encoded_bytes, encoded_bits, Some(&uncertainty), &mut out, None)
        .map_err(|e| format!("case E: {e}"))?;

    if result.total_out_bits != expected_decoded_bits {
        return Err(format!(
            "case E: decoded length {} != expected {}",
            result.total_out_bits, expected_decoded_bits
        ));
    }
    let got = bytes_to_bitstring(&out, result.total_out_bits);
    let want = bytes_to_bitstring(&expected_decoded_bytes, expected_decoded_bits);
    if got != want {
        return Err(format!("case E: decoded {got} != expected {want}"));
    }
    if result.num_errs != 100 {
        return Err(format!("case E: num_errs {} != expected 100", result.num_errs));
    }
    Ok(())
}

pub fn run_all() -> Result<(), String> {
    for case in HARD_CASES {
        run_hard_case(case)?;
    }
    run_case_e()?;
    Ok(())
}
