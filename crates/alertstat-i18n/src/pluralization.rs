//! Pluralization helpers for Russian unit words.
//!
//! Russian picks one of three noun forms by the last one or two digits of the
//! count: `1 день`, `2 дня`, `5 дней`, with 11-14 always taking the genitive
//! plural (`11 дней`, `21 день`).

/// CLDR plural category of a cardinal number in Russian.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PluralCategory {
    /// Ends in 1, except 11.
    One,
    /// Ends in 2-4, except 12-14.
    Few,
    /// Everything else, including 11-14.
    Many,
}

/// Helper for Russian noun declension after a number.
#[derive(Debug)]
pub struct PluralizationHelper;

impl PluralizationHelper {
    /// Plural category for `count`. The sign is ignored.
    pub fn category(count: i64) -> PluralCategory {
        let n = count.unsigned_abs();
        if (11..=14).contains(&(n % 100)) {
            return PluralCategory::Many;
        }
        match n % 10 {
            1 => PluralCategory::One,
            2..=4 => PluralCategory::Few,
            _ => PluralCategory::Many,
        }
    }

    /// Picks the form of a noun matching `count`.
    pub fn select<'a>(count: i64, one: &'a str, few: &'a str, many: &'a str) -> &'a str {
        match Self::category(count) {
            PluralCategory::One => one,
            PluralCategory::Few => few,
            PluralCategory::Many => many,
        }
    }
}

/// The word "day" declined for `count`.
pub fn plural_days(count: i64) -> &'static str {
    PluralizationHelper::select(count, "день", "дня", "дней")
}
