/// Currency label used in caller-facing amounts.
pub const CURRENCY_LABEL: &str = "Rs.";

/// Prefix of every challan number (`CH-YYYYMM-NNNN`).
pub const CHALLAN_NUMBER_PREFIX: &str = "CH";

/// Exclusive upper bound of the random challan number suffix.
pub const CHALLAN_NUMBER_SUFFIX_SPACE: u32 = 10_000;

/// Regeneration rounds before giving up on unique challan numbers.
pub const MAX_CHALLAN_NUMBER_ROUNDS: usize = 16;

/// Display name used when a student or program lookup fails.
pub const UNKNOWN_DISPLAY_NAME: &str = "Unknown";

/// Formats an amount the way staff see it, e.g. `Rs. 1250.00`.
pub fn format_amount(amount: rust_decimal::Decimal) -> String {
    format!("{} {:.2}", CURRENCY_LABEL, amount)
}
