//! Decimal digit helpers.

/// Returns the number of decimal digits needed to write `value`.
///
/// Zero still takes one digit.
///
/// # Example
///
/// ```
/// use longhand_core::digit_count;
///
/// assert_eq!(digit_count(0), 1);
/// assert_eq!(digit_count(9), 1);
/// assert_eq!(digit_count(120), 3);
/// ```
#[must_use]
pub const fn digit_count(value: u32) -> u8 {
    let mut count = 1;
    let mut rest = value / 10;
    while rest > 0 {
        count += 1;
        rest /= 10;
    }
    count
}

/// Returns the decimal digit of `value` at `position`, where position 0 is the ones digit.
///
/// Positions beyond the most significant digit yield 0.
#[must_use]
pub const fn digit_at(value: u32, position: u8) -> u32 {
    let mut rest = value;
    let mut i = 0;
    while i < position && rest > 0 {
        rest /= 10;
        i += 1;
    }
    if i < position { 0 } else { rest % 10 }
}

/// Splits `value` into its decimal digits, most significant first.
#[must_use]
pub fn digits_msb_first(value: u32) -> Vec<u32> {
    (0..digit_count(value))
        .rev()
        .map(|position| digit_at(value, position))
        .collect()
}
