//! # NPI Checksum
//!
//! An NPI is ten ASCII digits whose last digit is a Luhn check digit computed
//! over the first nine with the implicit `80840` issuer prefix folded in as a
//! constant 24.

/// Contribution of the implicit `80840` prefix to the Luhn sum.
const PREFIX_CONSTANT: u32 = 24;

/// Returns true if `npi` is exactly ten ASCII digits with a valid check digit.
pub fn validate_npi(npi: &str) -> bool {
    let bytes = npi.as_bytes();
    if bytes.len() != 10 || !bytes.iter().all(u8::is_ascii_digit) {
        return false;
    }
    let body: [u8; 9] = std::array::from_fn(|i| bytes[i] - b'0');
    check_digit(&body) == bytes[9] - b'0'
}

/// Check digit for the first nine digits of an NPI.
pub fn check_digit(body: &[u8; 9]) -> u8 {
    let mut sum = PREFIX_CONSTANT;
    // Walk right to left; the rightmost body digit is doubled.
    for (step, &digit) in body.iter().rev().enumerate() {
        let mut value = u32::from(digit);
        if step % 2 == 0 {
            value *= 2;
            if value > 9 {
                value -= 9;
            }
        }
        sum += value;
    }
    ((10 - sum % 10) % 10) as u8
}
