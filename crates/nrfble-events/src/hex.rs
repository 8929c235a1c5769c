//! Byte formatting for OOB data.

/// Format bytes as upper-case two-digit hex joined by `-`, e.g. `01-0A-FF`.
pub fn to_hex_string(bytes: &[u8]) -> String {
    bytes.iter().map(|b| ::hex::encode_upper([*b])).collect::<Vec<_>>().join("-")
}

/// Parse consecutive hex digit pairs into bytes.
///
/// A trailing odd digit is dropped. Pairs that are not valid hex yield
/// `None`.
pub fn hex_string_to_bytes(text: &str) -> Option<Vec<u8>> {
    let digits = text.as_bytes();
    let even = digits.len() - digits.len() % 2;
    ::hex::decode(&digits[..even]).ok()
}
