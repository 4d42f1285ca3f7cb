//! 7-segment encoding
//!
//! Segment bits follow the usual `.GFEDCBA` layout (bit 0 = segment A,
//! bit 7 = decimal point):
//!
//! ```text
//!    AAAAA
//!   F     B
//!   F     B
//!    GGGGG
//!   E     C
//!   E     C
//!    DDDDD  DP
//! ```
//!
//! Encoded digits are returned least significant first: index 0 is the
//! rightmost digit of the display.

/// Segment patterns for the decimal digits 0-9
pub const DIGIT_SEGMENTS: [u8; 10] = [
    0b0011_1111, // 0
    0b0000_0110, // 1
    0b0101_1011, // 2
    0b0100_1111, // 3
    0b0110_0110, // 4
    0b0110_1101, // 5
    0b0111_1101, // 6
    0b0000_0111, // 7
    0b0111_1111, // 8
    0b0110_0111, // 9
];

/// Decimal point segment
pub const SEGMENT_DOT: u8 = 0b1000_0000;

/// Number of digits on the display
pub const DIGIT_COUNT: usize = 6;

/// Largest integer that fits on the display
pub const MAX_INTEGER: u32 = 999_999;

/// Smallest and largest supported number of decimals
pub const MIN_DECIMALS: u8 = 1;
/// See [`MIN_DECIMALS`]
pub const MAX_DECIMALS: u8 = 3;

/// One segment byte per digit, least significant digit first
pub type DigitBytes = [u8; DIGIT_COUNT];

/// Errors from number formatting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FormatError {
    /// Value does not fit on the display (or is negative / not finite)
    ValueOutOfRange,
    /// Digit outside 0-9
    InvalidDigit,
}

/// Encode a single decimal digit
pub fn encode_digit(digit: u8) -> Result<u8, FormatError> {
    DIGIT_SEGMENTS
        .get(usize::from(digit))
        .copied()
        .ok_or(FormatError::InvalidDigit)
}

/// Write the decimal digits of `value` starting at slot `from`
///
/// Always writes at least one digit so zero shows as `0`; leading zeros
/// are left untouched.
fn fill_digits(value: u32, out: &mut DigitBytes, from: usize) -> Result<(), FormatError> {
    let mut rest = value;
    let mut slot = from;
    loop {
        let digit = out.get_mut(slot).ok_or(FormatError::ValueOutOfRange)?;
        *digit = DIGIT_SEGMENTS[(rest % 10) as usize];
        rest /= 10;
        slot += 1;
        if rest == 0 {
            return Ok(());
        }
    }
}

/// Encode an integer in the range 0-999999
pub fn encode_integer(value: u32) -> Result<DigitBytes, FormatError> {
    if value > MAX_INTEGER {
        return Err(FormatError::ValueOutOfRange);
    }
    let mut out = [0u8; DIGIT_COUNT];
    fill_digits(value, &mut out, 0)?;
    Ok(out)
}

/// Clamp a requested decimal count into the supported 1-3 range
pub fn clamp_decimals(decimals: u8) -> u8 {
    decimals.clamp(MIN_DECIMALS, MAX_DECIMALS)
}

/// Encode a non-negative number with a fixed number of decimals
///
/// The fractional part is truncated, not rounded. `decimals` is clamped
/// to 1-3 and the decimal point is set on slot `decimals - 1`. The integer
/// part must fit in the remaining `6 - decimals` digits.
///
/// Decimal values that `f32` stores just below their exact value show one
/// count low in the last digit: `1.05` with two decimals shows `1.04`.
pub fn encode_float(value: f32, decimals: u8) -> Result<DigitBytes, FormatError> {
    let decimals = clamp_decimals(decimals);
    let frac_digits = usize::from(decimals);

    if !value.is_finite() || value < 0.0 {
        return Err(FormatError::ValueOutOfRange);
    }
    let int_limit = 10u32.pow(DIGIT_COUNT as u32 - u32::from(decimals));
    if value >= int_limit as f32 {
        return Err(FormatError::ValueOutOfRange);
    }

    let scale = 10u32.pow(u32::from(decimals));
    // `as` truncates toward zero and saturates
    let scaled = (value * scale as f32) as u32;
    let int_part = scaled / scale;
    let mut frac_part = scaled % scale;

    let mut out = [0u8; DIGIT_COUNT];
    for slot in out.iter_mut().take(frac_digits) {
        *slot = DIGIT_SEGMENTS[(frac_part % 10) as usize];
        frac_part /= 10;
    }
    fill_digits(int_part, &mut out, frac_digits)?;
    out[frac_digits - 1] |= SEGMENT_DOT;

    Ok(out)
}
