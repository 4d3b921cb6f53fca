//! Integration tests for alertstat-i18n crate.
//!
//! These tests verify pluralization and the embedded Russian catalogue.

use alertstat_common::test_utils::init_test_logging;
use alertstat_i18n::{plural_days, Messages, PluralCategory, PluralizationHelper};
use proptest::prelude::*;

#[test]
fn test_pluralization_table() {
    let cases = [
        (1, "день"),
        (2, "дня"),
        (5, "дней"),
        (11, "дней"),
        (14, "дней"),
        (21, "день"),
        (29, "дней"),
        (30, "дней"),
        (31, "день"),
    ];
    for (count, expected) in cases {
        assert_eq!(plural_days(count), expected, "count = {count}");
    }
}

#[test]
fn test_catalogue_loads() {
    init_test_logging();
    let messages = Messages::russian().unwrap();
    assert_eq!(messages.get("chart-daily-x").unwrap(), "Дата");
    assert_eq!(
        messages.get("chart-extracted-watermark").unwrap(),
        "Приблизительные данные!*"
    );
    assert_eq!(messages.legend_mean(2.0).unwrap(), "Среднее: 2.00");
    assert_eq!(messages.legend_median(1.5).unwrap(), "Медиана: 1.50");
}

proptest! {
    #[test]
    fn test_property_teens_take_genitive_plural(hundreds in 0i64..1000, teen in 11i64..=14) {
        prop_assert_eq!(PluralizationHelper::category(hundreds * 100 + teen), PluralCategory::Many);
    }

    #[test]
    fn test_property_category_depends_on_last_two_digits(n in 0i64..1_000_000) {
        prop_assert_eq!(PluralizationHelper::category(n), PluralizationHelper::category(n % 100));
    }
}
