use crate::encoding::Protocol;

/// Returns the bit that makes the total number of set bits in `byte` even.
pub(crate) fn parity_even_bit(byte: u8) -> u16 {
    (byte.count_ones() & 1) as u16
}

/// Folds `bytes` into the protocol's 8-bit wrapping sum.
pub(crate) fn checksum(protocol: Protocol, bytes: &[u8]) -> u8 {
    bytes
        .iter()
        .fold(protocol.checksum_base(), |sum, b| sum.wrapping_add(*b))
}

pub(crate) fn lo8(x: u16) -> u8 {
    (x & 0xff) as u8
}

pub(crate) fn hi8(x: u16) -> u8 {
    (x >> 8) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parity_even_bit() {
        assert_eq!(parity_even_bit(0x00), 0);
        assert_eq!(parity_even_bit(0x01), 1);
        assert_eq!(parity_even_bit(0x03), 0);
        assert_eq!(parity_even_bit(0x12), 0);
        assert_eq!(parity_even_bit(0x34), 1);
        assert_eq!(parity_even_bit(0xff), 0);
    }

    #[test]
    fn test_checksum_wraps() {
        assert_eq!(checksum(Protocol::Fs20, &[0xff, 0xff]), 0x04);
        assert_eq!(checksum(Protocol::Fht, &[]), 0x0c);
    }

    #[test]
    fn test_hi_lo() {
        assert_eq!(hi8(0x1234), 0x12);
        assert_eq!(lo8(0x1234), 0x34);
    }
}
