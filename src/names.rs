//! Disambiguation of repeated values within a row.
//!
//! A prospective header row such as `Name, Total, Total` cannot be mapped
//! column-by-column until its repeated names are made unique. Repeated values
//! receive an occurrence suffix, `Total(0)` and `Total(1)`, which schema
//! aliases may reference directly.

use std::collections::HashMap;

use itertools::Itertools;

/// Appends `(0)`, `(1)`, ... to every value that occurs more than once.
///
/// Suffixes follow order of appearance; values that occur once are returned
/// unchanged and the row order is preserved.
pub fn disambiguate<S: AsRef<str>>(values: &[S]) -> Vec<String> {
    let counts = values.iter().map(AsRef::as_ref).counts();
    let mut seen: HashMap<&str, usize> = HashMap::new();
    values
        .iter()
        .map(|value| {
            let value = value.as_ref();
            if counts.get(value).copied().unwrap_or(0) < 2 {
                return value.to_string();
            }
            let occurrence = seen.entry(value).or_insert(0);
            let renamed = format!("{value}({occurrence})");
            *occurrence += 1;
            renamed
        })
        .collect()
}

/// Repeats [`disambiguate`] until no two values are equal.
///
/// A single pass can collide with a value that already carried a suffix
/// (`a, a, a(0)` becomes `a(0), a(1), a(0)`); later passes suffix those again.
/// Every pass with a collision renames at least one value that no earlier
/// pass touched, so the loop ends after at most `values.len()` passes.
pub fn unique_names<S: AsRef<str>>(values: &[S]) -> Vec<String> {
    let mut names = disambiguate(values);
    while !names.iter().all_unique() {
        names = disambiguate(&names);
    }
    names
}

/// Lists the values that occur more than once, in order of first appearance.
pub fn duplicated_values<S: AsRef<str>>(values: &[S]) -> Vec<String> {
    let counts = values.iter().map(AsRef::as_ref).counts();
    values
        .iter()
        .map(AsRef::as_ref)
        .filter(|value| counts.get(value).copied().unwrap_or(0) > 1)
        .unique()
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn suffixes_follow_order_of_appearance() {
        let row = ["A", "A", "B", "A"];
        assert_eq!(disambiguate(&row), vec!["A(0)", "A(1)", "B", "A(2)"]);
    }

    #[test]
    fn unique_rows_are_untouched() {
        let row = ["Index", "Name", "Website"];
        assert_eq!(disambiguate(&row), vec!["Index", "Name", "Website"]);
    }

    #[test]
    fn repeated_header_names_gain_suffixes() {
        let row = [
            "Index",
            "Number of employees",
            "Industry",
            "Number of employees",
        ];
        assert_eq!(
            disambiguate(&row),
            vec![
                "Index",
                "Number of employees(0)",
                "Industry",
                "Number of employees(1)"
            ]
        );
    }

    #[test]
    fn suffixes_that_collide_again_are_suffixed_again() {
        let row = ["Index", "a", "a", "a(0)", "a(0)(0)"];
        assert_eq!(disambiguate(&row)[1], disambiguate(&row)[3]);
        assert_eq!(
            unique_names(&row),
            vec!["Index", "a(0)(0)(0)", "a(1)", "a(0)(1)", "a(0)(0)(1)"]
        );
    }

    #[test]
    fn duplicated_values_reports_each_value_once() {
        let row = ["a", "b", "a", "c", "b", "a"];
        assert_eq!(duplicated_values(&row), vec!["a", "b"]);
    }

    proptest! {
        #[test]
        fn disambiguation_preserves_length_and_unique_values(
            row in proptest::collection::vec("[abc]{1,2}", 0..12)
        ) {
            let renamed = disambiguate(&row);
            prop_assert_eq!(renamed.len(), row.len());
            let duplicated = duplicated_values(&row);
            for (original, renamed) in row.iter().zip(&renamed) {
                if duplicated.contains(original) {
                    prop_assert!(renamed.starts_with(original.as_str()));
                    prop_assert!(renamed.ends_with(')'));
                } else {
                    prop_assert_eq!(original, renamed);
                }
            }
        }

        #[test]
        fn unique_names_are_unique_and_extend_the_originals(
            row in proptest::collection::vec("[ab]{1,2}(\\(0\\))?", 0..12)
        ) {
            let renamed = unique_names(&row);
            prop_assert_eq!(renamed.len(), row.len());
            prop_assert!(renamed.iter().all_unique());
            for (original, renamed) in row.iter().zip(&renamed) {
                prop_assert!(renamed.starts_with(original.as_str()));
            }
        }
    }
}
