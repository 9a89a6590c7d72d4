use num_bigint::BigInt;
use num_traits::Zero;

pub type Number = BigInt;

/// Decode a signed big-endian two's-complement atom. The empty atom is zero.
pub fn number_from_bytes(bytes: &[u8]) -> Number {
    if bytes.is_empty() {
        Number::zero()
    } else {
        Number::from_signed_bytes_be(bytes)
    }
}

/// Encode a number as the minimal-length signed big-endian two's-complement
/// byte sequence. Zero encodes as the empty sequence; the single sign byte
/// required to disambiguate sign is the only padding ever emitted.
pub fn number_to_bytes(number: &Number) -> Vec<u8> {
    if number.is_zero() {
        return Vec::new();
    }
    let mut bytes = number.to_signed_bytes_be();
    let mut start = 0;
    while start + 1 < bytes.len() {
        match bytes[start] {
            0x00 if bytes[start + 1] & 0x80 == 0 => start += 1,
            0xFF if bytes[start + 1] & 0x80 != 0 => start += 1,
            _ => break,
        }
    }
    bytes.drain(..start);
    bytes
}

/// True when `bytes` is the minimal encoding of the number it represents,
/// i.e. `number_to_bytes(number_from_bytes(bytes)) == bytes`.
pub fn is_canonical_number(bytes: &[u8]) -> bool {
    match bytes {
        [] => true,
        [0x00, rest @ ..] => !rest.is_empty() && rest[0] & 0x80 != 0,
        [0xFF, rest @ ..] => rest.is_empty() || rest[0] & 0x80 == 0,
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;

    #[rstest]
    #[case(0, &[])]
    #[case(1, &[0x01])]
    #[case(-1, &[0xFF])]
    #[case(127, &[0x7F])]
    #[case(128, &[0x00, 0x80])]
    #[case(-128, &[0x80])]
    #[case(-129, &[0xFF, 0x7F])]
    #[case(255, &[0x00, 0xFF])]
    #[case(256, &[0x01, 0x00])]
    #[case(32767, &[0x7F, 0xFF])]
    #[case(32768, &[0x00, 0x80, 0x00])]
    #[case(-32768, &[0x80, 0x00])]
    fn test_number_encoding(#[case] value: i64, #[case] expected: &[u8]) {
        let number = Number::from(value);
        let bytes = number_to_bytes(&number);
        assert_eq!(bytes, expected);
        assert_eq!(number_from_bytes(&bytes), number);
        assert!(is_canonical_number(&bytes));
    }

    #[test]
    fn test_roundtrip_range() {
        for value in -1025_i64..=1025 {
            let number = Number::from(value);
            let bytes = number_to_bytes(&number);
            assert_eq!(number_from_bytes(&bytes), number, "value {value}");
            assert!(is_canonical_number(&bytes), "value {value}");
        }
    }

    #[rstest]
    #[case(&[], true)]
    #[case(&[0x00], false)]
    #[case(&[0x00, 0x00], false)]
    #[case(&[0x00, 0x7F], false)]
    #[case(&[0x00, 0x80], true)]
    #[case(&[0xFF], true)]
    #[case(&[0xFF, 0xFF], false)]
    #[case(&[0xFF, 0x7F], true)]
    #[case(&[0x01, 0x00], true)]
    fn test_canonical(#[case] bytes: &[u8], #[case] expected: bool) {
        assert_eq!(is_canonical_number(bytes), expected);
    }
}
