//! Property-based tests for slug normalization.

use proptest::prelude::*;

use super::normalize::{MAX_SLUG_LEN, is_valid_slug, slugify};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Any name yields a slug that passes the settings validator.
    #[test]
    fn prop_slugify_output_is_valid(name in "\\PC{0,200}") {
        let slug = slugify(&name);
        prop_assert!(is_valid_slug(&slug), "invalid slug {:?} from {:?}", slug, name);
        prop_assert!(slug.len() <= MAX_SLUG_LEN);
    }

    /// Normalizing twice changes nothing.
    #[test]
    fn prop_slugify_is_idempotent(name in "\\PC{0,120}") {
        let once = slugify(&name);
        prop_assert_eq!(slugify(&once), once);
    }

    /// Case and accents do not affect the slug.
    #[test]
    fn prop_slugify_ignores_case(name in "[a-zA-Z0-9 ]{1,60}") {
        prop_assert_eq!(slugify(&name.to_uppercase()), slugify(&name.to_lowercase()));
    }

    /// A suffixed slug stays valid.
    #[test]
    fn prop_suffix_keeps_slug_valid(name in "\\PC{0,200}", suffix in 1u32..=100) {
        let candidate = format!("{}-{suffix}", slugify(&name));
        prop_assert!(is_valid_slug(&candidate));
    }
}
