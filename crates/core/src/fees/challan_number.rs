//! Challan number generation (`CH-YYYYMM-NNNN`).

use chrono::{Datelike, NaiveDate};
use rand::Rng;
use std::collections::HashSet;

use super::fees_constants::{CHALLAN_NUMBER_PREFIX, CHALLAN_NUMBER_SUFFIX_SPACE};

/// Builds one challan number for the month of `on` with a random suffix.
pub fn generate_challan_number<R: Rng + ?Sized>(rng: &mut R, on: NaiveDate) -> String {
    format_challan_number(on, rng.gen_range(0..CHALLAN_NUMBER_SUFFIX_SPACE))
}

pub fn format_challan_number(on: NaiveDate, suffix: u32) -> String {
    format!(
        "{}-{}{:02}-{:04}",
        CHALLAN_NUMBER_PREFIX,
        on.year(),
        on.month(),
        suffix
    )
}

/// Draws `count` numbers that are distinct from each other and from `taken`.
///
/// Returns fewer than `count` numbers only when the month's suffix space is
/// exhausted.
pub fn generate_distinct<R: Rng + ?Sized>(
    rng: &mut R,
    on: NaiveDate,
    count: usize,
    taken: &HashSet<String>,
) -> Vec<String> {
    let space = CHALLAN_NUMBER_SUFFIX_SPACE as usize;
    let mut seen: HashSet<String> = HashSet::with_capacity(count);
    let mut numbers = Vec::with_capacity(count);

    while numbers.len() < count && taken.len() + seen.len() < space {
        let candidate = generate_challan_number(rng, on);
        if taken.contains(&candidate) || !seen.insert(candidate.clone()) {
            continue;
        }
        numbers.push(candidate);
    }
    numbers
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_format_pads_month_and_suffix() {
        assert_eq!(format_challan_number(date(2025, 3, 9), 7), "CH-202503-0007");
        assert_eq!(format_challan_number(date(2025, 11, 1), 9999), "CH-202511-9999");
    }

    #[test]
    fn test_generated_number_shape() {
        let mut rng = StdRng::seed_from_u64(42);
        let number = generate_challan_number(&mut rng, date(2026, 1, 15));
        assert!(number.starts_with("CH-202601-"));
        let suffix = number.rsplit('-').next().unwrap();
        assert_eq!(suffix.len(), 4);
        assert!(suffix.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_distinct_numbers_avoid_taken() {
        let mut rng = StdRng::seed_from_u64(7);
        let taken: HashSet<String> = (0..9_990)
            .map(|n| format_challan_number(date(2026, 2, 1), n))
            .collect();

        let numbers = generate_distinct(&mut rng, date(2026, 2, 1), 5, &taken);
        assert_eq!(numbers.len(), 5);
        let unique: HashSet<_> = numbers.iter().collect();
        assert_eq!(unique.len(), 5);
        assert!(numbers.iter().all(|n| !taken.contains(n)));
    }

    #[test]
    fn test_exhausted_space_returns_short() {
        let mut rng = StdRng::seed_from_u64(1);
        let taken: HashSet<String> = (0..CHALLAN_NUMBER_SUFFIX_SPACE - 2)
            .map(|n| format_challan_number(date(2026, 2, 1), n))
            .collect();

        let numbers = generate_distinct(&mut rng, date(2026, 2, 1), 5, &taken);
        assert_eq!(numbers.len(), 2);
    }
}
