//! Comparison of requested and observed tag sets.

use crate::media::{normalize_field, TagSet, VALUE_SEPARATOR};

/// Field names different tools use for the same value.
const ALIASES: &[&[&str]] = &[
    &["date", "year"],
    &["tracknumber", "track"],
    &["discnumber", "disc", "disk"],
    &["albumartist", "album_artist", "album artist"],
    &["comment", "description"],
];

/// Fields holding an `N` or `N/total` position.
const NUMBERING: &[&str] = &["tracknumber", "track", "discnumber", "disc", "disk"];

fn aliases_of(field: &str) -> impl Iterator<Item = &'static str> + '_ {
    ALIASES
        .iter()
        .find(|group| group.contains(&field))
        .map(|group| group.iter().copied().filter(move |alias| *alias != field))
        .into_iter()
        .flatten()
}

/// Observed values for a field, falling back to its aliases.
fn observed_values<'a>(observed: &'a TagSet, field: &str) -> Option<&'a [String]> {
    observed
        .get(field)
        .or_else(|| aliases_of(field).find_map(|alias| observed.get(alias)))
}

fn values_match(field: &str, requested: &str, observed: &str) -> bool {
    let (requested, observed) = (requested.trim(), observed.trim());
    if requested == observed {
        return true;
    }
    // Containers that store "track 3 of 12" report "3/12" for a requested "3".
    NUMBERING.contains(&field)
        && !requested.contains('/')
        && observed.split('/').next().map(str::trim) == Some(requested)
}

fn lists_match(field: &str, wanted: &[String], actual: &[String]) -> bool {
    actual.len() == wanted.len()
        && wanted
            .iter()
            .zip(actual)
            .all(|(w, a)| values_match(field, w, a))
}

fn joined(values: &[String]) -> String {
    values.join(&VALUE_SEPARATOR.to_string())
}

fn mismatches<F>(requested: &TagSet, observed: &TagSet, matches: F) -> Vec<String>
where
    F: Fn(&str, &[String], &[String]) -> bool,
{
    let mut mismatched = Vec::new();
    for (field, wanted) in requested.iter() {
        let field = normalize_field(field);
        let ok = observed_values(observed, &field)
            .map(|actual| matches(&field, wanted, actual))
            .unwrap_or(false);
        if !ok {
            mismatched.push(field);
        }
    }
    mismatched
}

/// Returns every requested field whose full value list differs from the
/// observed one, in field order.
pub fn compare_tags(requested: &TagSet, observed: &TagSet) -> Vec<String> {
    mismatches(requested, observed, lists_match)
}

/// Like [`compare_tags`], for formats that store each field as one
/// `;`-joined value.
///
/// Both sides are compared in that joined form, so `["AC;DC"]` and a reading
/// of `["AC", "DC"]` agree.
pub fn compare_joined_tags(requested: &TagSet, observed: &TagSet) -> Vec<String> {
    mismatches(requested, observed, |field, wanted, actual| {
        lists_match(field, &[joined(wanted)], &[joined(actual)])
    })
}

/// Replaces observed value lists that only differ from the requested ones in
/// where the separator was split.
pub(crate) fn adopt_requested_splits(requested: &TagSet, observed: &mut TagSet) {
    for (field, wanted) in requested.iter() {
        let resplit = match observed.get(field) {
            Some(actual) => actual != wanted && joined(actual) == joined(wanted),
            None => false,
        };
        if resplit {
            observed.replace(field, wanted.to_vec());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_sets_match() {
        let tags = TagSet::new().with("artist", "Foo").with("title", "Bar");
        assert!(compare_tags(&tags, &tags).is_empty());
    }

    #[test]
    fn test_wrong_second_value_is_reported() {
        let requested = TagSet::new().with("artist", "Foo").with("artist", "Bar");
        let observed = TagSet::new().with("ARTIST", "Foo").with("ARTIST", "Baz");
        assert_eq!(compare_tags(&requested, &observed), ["artist"]);
    }

    #[test]
    fn test_missing_value_is_reported() {
        let requested = TagSet::new().with("artist", "Foo").with("artist", "Bar");
        let observed = TagSet::new().with("artist", "Foo");
        assert_eq!(compare_tags(&requested, &observed), ["artist"]);
    }

    #[test]
    fn test_all_mismatches_are_collected() {
        let requested = TagSet::new()
            .with("artist", "Foo")
            .with("album", "Bar")
            .with("title", "Baz");
        let observed = TagSet::new().with("artist", "Other").with("title", "Baz");
        assert_eq!(compare_tags(&requested, &observed), ["album", "artist"]);
    }

    #[test]
    fn test_aliases_resolve() {
        let requested = TagSet::new()
            .with("year", "1999")
            .with("tracknumber", "3")
            .with("albumartist", "Various");
        let observed = TagSet::new()
            .with("date", "1999")
            .with("track", "3/12")
            .with("album_artist", "Various");
        assert!(compare_tags(&requested, &observed).is_empty());
    }

    #[test]
    fn test_joined_comparison_accepts_separator_in_single_value() {
        let requested = TagSet::new().with("artist", "AC;DC");
        let observed = TagSet::new().with("artist", "AC").with("artist", "DC");
        assert!(compare_joined_tags(&requested, &observed).is_empty());
        assert_eq!(compare_tags(&requested, &observed), ["artist"]);
    }

    #[test]
    fn test_joined_comparison_still_reports_wrong_values() {
        let requested = TagSet::new()
            .with("artist", "Foo")
            .with("artist", "Bar")
            .with("track", "3");
        let observed = TagSet::new()
            .with("artist", "Foo")
            .with("artist", "Baz")
            .with("track", "3/12");
        assert_eq!(compare_joined_tags(&requested, &observed), ["artist"]);
    }

    #[test]
    fn test_adopt_requested_splits() {
        let requested = TagSet::new().with("artist", "AC;DC").with("title", "T");
        let mut observed = TagSet::new()
            .with("artist", "AC")
            .with("artist", "DC")
            .with("title", "T")
            .with("album", "A");
        adopt_requested_splits(&requested, &mut observed);

        assert_eq!(observed.get("artist").unwrap(), ["AC;DC"]);
        assert_eq!(observed.get("title").unwrap(), ["T"]);
        assert_eq!(observed.get("album").unwrap(), ["A"]);
    }

    #[test]
    fn test_numbering_only_relaxed_for_position_fields() {
        let requested = TagSet::new().with("title", "3");
        let observed = TagSet::new().with("title", "3/12");
        assert_eq!(compare_tags(&requested, &observed), ["title"]);
    }
}
