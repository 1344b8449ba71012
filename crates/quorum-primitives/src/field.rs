//! Field arithmetic over Winterfell's 64-bit Goldilocks field
//!
//! Every digest, map key and counter committed by the protocol is expressed
//! in this field, p = 2^64 - 2^32 + 1.

use winter_math::fields::f64::BaseElement;
use winter_math::FieldElement;

/// The field element type used throughout quorum settlement
pub type Felt = BaseElement;

/// Zero in the field
pub const FELT_ZERO: Felt = BaseElement::ZERO;

/// One in the field
pub const FELT_ONE: Felt = BaseElement::ONE;

/// The Goldilocks prime: p = 2^64 - 2^32 + 1
pub const GOLDILOCKS_PRIME: u64 = 0xFFFFFFFF00000001;

/// Convert a u64 to a field element (reduced mod p)
#[inline]
pub fn felt_from_u64(value: u64) -> Felt {
    BaseElement::new(value)
}

/// Canonical u64 representative of a field element
#[inline]
pub fn felt_to_u64(felt: Felt) -> u64 {
    felt.as_int()
}

/// Split bytes into little-endian u32 limbs, one field element per limb.
///
/// Since every limb is below p the mapping is injective for inputs of the
/// same length. A trailing partial limb is zero-padded.
pub fn bytes_to_felts(bytes: &[u8]) -> Vec<Felt> {
    bytes
        .chunks(4)
        .map(|chunk| {
            let mut limb = [0u8; 4];
            limb[..chunk.len()].copy_from_slice(chunk);
            felt_from_u64(u32::from_le_bytes(limb) as u64)
        })
        .collect()
}

/// Canonical little-endian encoding of a sequence of field elements
pub fn felts_to_bytes(elements: &[Felt]) -> Vec<u8> {
    elements
        .iter()
        .flat_map(|felt| felt_to_u64(*felt).to_le_bytes())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_felt_conversion() {
        let felt = felt_from_u64(12345678);
        assert_eq!(felt_to_u64(felt), 12345678);
    }

    #[test]
    fn test_felt_wraps_at_prime() {
        let max = felt_from_u64(GOLDILOCKS_PRIME - 1);
        assert_eq!(felt_to_u64(max + FELT_ONE), 0);
    }

    #[test]
    fn test_bytes_to_felts_limbs() {
        let felts = bytes_to_felts(&[1, 0, 0, 0, 0xff, 0xff, 0xff, 0xff, 7]);
        assert_eq!(felts.len(), 3);
        assert_eq!(felt_to_u64(felts[0]), 1);
        assert_eq!(felt_to_u64(felts[1]), u32::MAX as u64);
        assert_eq!(felt_to_u64(felts[2]), 7);
    }
}
