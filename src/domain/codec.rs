// ============================================================
// Layer 3 — Digit Sequence Codec
// ============================================================
// Converts a decimal digit string into a fixed-length one-hot
// tensor of shape (L, 10) and back again.
//
// Encoding is right-aligned:
//   capacity L = 5
//   "42"       → "00042"  (left-padded with zeros)
//   "1234567"  → "34567"  (most significant digits dropped)
//
// Decoding takes the arg-max of every row, joins the digits and
// strips leading zeros. Equal probabilities resolve to the
// LOWEST digit, and an all-zero sequence decodes to "0".
//
// The round trip is value-exact, not byte-exact:
//   decode(encode("00042")) == "42"

use crate::domain::error::CodecError;

/// One class per decimal digit.
pub const NUM_CLASSES: usize = 10;

// ─── CategoricalTensor ────────────────────────────────────────────────────────
/// A per-position distribution over the ten digit classes.
/// Ground-truth tensors are one-hot; model outputs are softmax rows.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoricalTensor {
    rows: Vec<[f32; NUM_CLASSES]>,
}

impl CategoricalTensor {
    pub fn from_rows(rows: Vec<[f32; NUM_CLASSES]>) -> Self {
        Self { rows }
    }

    /// Build from a row-major buffer, e.g. a model output slice.
    /// Trailing values that do not fill a whole row are ignored.
    pub fn from_flat(values: &[f32]) -> Self {
        let rows = values
            .chunks_exact(NUM_CLASSES)
            .map(|chunk| {
                let mut row = [0.0f32; NUM_CLASSES];
                row.copy_from_slice(chunk);
                row
            })
            .collect();
        Self { rows }
    }

    /// Number of positions (L).
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn rows(&self) -> &[[f32; NUM_CLASSES]] {
        &self.rows
    }

    /// Arg-max class of every row; the first maximum wins a tie.
    pub fn argmax(&self) -> Vec<u8> {
        self.rows
            .iter()
            .map(|row| {
                let mut best = 0usize;
                for (class, &p) in row.iter().enumerate().skip(1) {
                    if p > row[best] {
                        best = class;
                    }
                }
                best as u8
            })
            .collect()
    }

    /// True when every row holds exactly one 1.0 and nine 0.0.
    pub fn is_one_hot(&self) -> bool {
        self.rows.iter().all(|row| {
            row.iter().filter(|&&p| p == 1.0).count() == 1
                && row.iter().filter(|&&p| p == 0.0).count() == NUM_CLASSES - 1
        })
    }
}

// ─── Codec ────────────────────────────────────────────────────────────────────
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Codec {
    capacity: usize,
}

impl Codec {
    /// # Panics
    /// Panics if capacity is zero.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "sequence capacity must be at least 1");
        Self { capacity }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Validate `sequence` and bring it to exactly `capacity` digits.
    /// Returns the class index of every position, most significant first.
    pub fn fit(&self, sequence: &str) -> Result<Vec<u8>, CodecError> {
        let digits = sequence
            .chars()
            .enumerate()
            .map(|(position, character)| {
                character
                    .to_digit(10)
                    .map(|d| d as u8)
                    .ok_or(CodecError::InvalidCharacter { character, position })
            })
            .collect::<Result<Vec<u8>, _>>()?;

        let mut fitted = vec![0u8; self.capacity.saturating_sub(digits.len())];
        let keep_from = digits.len().saturating_sub(self.capacity);
        fitted.extend_from_slice(&digits[keep_from..]);
        Ok(fitted)
    }

    pub fn encode(&self, sequence: &str) -> Result<CategoricalTensor, CodecError> {
        let rows = self
            .fit(sequence)?
            .into_iter()
            .map(|digit| {
                let mut row = [0.0f32; NUM_CLASSES];
                row[digit as usize] = 1.0;
                row
            })
            .collect();
        Ok(CategoricalTensor::from_rows(rows))
    }

    pub fn decode(&self, tensor: &CategoricalTensor) -> String {
        let digits: String = tensor
            .argmax()
            .into_iter()
            .map(|d| char::from(b'0' + d))
            .collect();
        let stripped = digits.trim_start_matches('0');
        if stripped.is_empty() {
            "0".to_string()
        } else {
            stripped.to_string()
        }
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_pads_on_the_left() {
        let codec  = Codec::new(5);
        let tensor = codec.encode("00042").unwrap();
        assert_eq!(tensor.len(), 5);
        assert!(tensor.is_one_hot());
        assert_eq!(tensor.argmax(), vec![0, 0, 0, 4, 2]);
        assert_eq!(codec.decode(&tensor), "42");

        let short = codec.encode("42").unwrap();
        assert_eq!(short, tensor);
    }

    #[test]
    fn test_all_zero_decodes_to_single_zero() {
        let codec = Codec::new(6);
        let tensor = codec.encode("000000").unwrap();
        assert_eq!(codec.decode(&tensor), "0");
        assert_eq!(codec.decode(&codec.encode("").unwrap()), "0");
    }

    #[test]
    fn test_round_trip_is_value_exact() {
        let codec = Codec::new(8);
        for s in ["7", "10", "0007", "12345678", "00000001", "90000000", "0"] {
            let expected = match s.trim_start_matches('0') {
                "" => "0",
                rest => rest,
            };
            assert_eq!(codec.decode(&codec.encode(s).unwrap()), expected, "input {s}");
        }
    }

    #[test]
    fn test_long_input_keeps_trailing_digits() {
        let codec = Codec::new(4);
        let a = codec.encode("99991234").unwrap();
        let b = codec.encode("00001234").unwrap();
        let c = codec.encode("1234").unwrap();
        assert_eq!(a, b);
        assert_eq!(a, c);
        assert_eq!(codec.decode(&a), "1234");
    }

    #[test]
    fn test_invalid_character_is_reported() {
        let codec = Codec::new(5);
        assert_eq!(
            codec.encode("12a4"),
            Err(CodecError::InvalidCharacter { character: 'a', position: 2 })
        );
        // Characters beyond the kept window are still validated
        assert!(Codec::new(2).encode("x12").is_err());
        assert!(codec.encode("-5").is_err());
    }

    #[test]
    fn test_argmax_tie_picks_lowest_class() {
        let uniform = [0.1f32; NUM_CLASSES];
        let mut tie = [0.0f32; NUM_CLASSES];
        tie[3] = 0.5;
        tie[7] = 0.5;
        let tensor = CategoricalTensor::from_rows(vec![uniform, tie]);
        assert_eq!(tensor.argmax(), vec![0, 3]);
        assert_eq!(Codec::new(2).decode(&tensor), "3");
    }

    #[test]
    fn test_from_flat_rebuilds_rows() {
        let mut flat = vec![0.0f32; 2 * NUM_CLASSES];
        flat[9] = 1.0;
        flat[NUM_CLASSES + 1] = 1.0;
        let tensor = CategoricalTensor::from_flat(&flat);
        assert_eq!(tensor.len(), 2);
        assert_eq!(tensor.argmax(), vec![9, 1]);
    }

    #[test]
    #[should_panic]
    fn test_zero_capacity_panics() {
        let _ = Codec::new(0);
    }
}
