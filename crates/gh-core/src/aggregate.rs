//! Pure aggregation layer
//!
//! Every chart's dataset is a deterministic function of (rows, filters),
//! recomputed from scratch whenever either changes. All functions here are
//! total over any finite slice of rows, including the empty one, and
//! side-effect free. Malformed per-row fields (unparseable dates, broken
//! topic lists) are skipped for that row only, never fatal to the whole
//! derivation.

use ahash::AHashMap;
use indexmap::IndexMap;

use crate::model::Row;
use crate::selection::FilterState;

/// Default threshold under which a language is folded into "Others".
pub const LANGUAGE_THRESHOLD: usize = 50;

/// Bucket label for languages below the threshold.
pub const OTHERS_LABEL: &str = "Others";

/// Fixed bin edges for the repository-count histogram, inclusive on both
/// ends. Rows outside [1, 30] fall into no bin and are dropped; that
/// exclusion matches the observed product behavior and is asserted by tests.
pub const REPO_COUNT_BINS: [(u32, u32); 10] = [
    (1, 3),
    (4, 6),
    (7, 9),
    (10, 12),
    (13, 15),
    (16, 18),
    (19, 21),
    (22, 24),
    (25, 27),
    (28, 30),
];

/// Hireable / non-hireable split. The two counts always sum to the input
/// row count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HireableCounts {
    pub hireable: usize,
    pub non_hireable: usize,
}

/// One histogram bin with its inclusive range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoBin {
    pub lo: u32,
    pub hi: u32,
    pub count: usize,
}

impl RepoBin {
    pub fn label(&self) -> String {
        format!("{}-{}", self.lo, self.hi)
    }
}

/// Language counts with small languages folded into an "Others" bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageBreakdown {
    /// Languages at or above the threshold, in first-seen order, with the
    /// synthetic "Others" bucket appended last when non-empty.
    pub buckets: IndexMap<String, usize>,
    /// Names of the languages that were merged into "Others".
    pub merged: Vec<String>,
}

/// Per-year adoption ratio series for one target language.
#[derive(Debug, Clone, PartialEq)]
pub struct AdoptionSeries {
    pub language: String,
    /// (year, ratio in [0,1]) pairs, years ascending. A year only appears
    /// when it has at least one row, so no ratio ever divides by zero.
    pub points: Vec<(i32, f64)>,
}

/// Count of rows passing the country AND year filters. The language
/// dimension is chart-local and never narrows this number.
pub fn total_users(rows: &[Row], filters: &FilterState) -> usize {
    rows.iter()
        .filter(|r| matches_country(r, filters.country.as_deref()))
        .filter(|r| matches_year(r, filters.year))
        .count()
}

/// Hireability split over the given rows (pre-filter by country upstream).
pub fn hireable_counts(rows: impl IntoIterator<Item = impl std::borrow::Borrow<Row>>) -> HireableCounts {
    let mut counts = HireableCounts::default();
    for row in rows {
        if row.borrow().hireable {
            counts.hireable += 1;
        } else {
            counts.non_hireable += 1;
        }
    }
    counts
}

/// Users per country, optionally restricted to accounts created in one year.
/// Rows with unparseable dates are excluded only when a year filter is set.
/// Counts are keyed by the raw country name; the map-geometry spelling is a
/// separate, join-time concern (see [`map_join_name`]).
pub fn users_by_country(rows: &[Row], year: Option<i32>) -> IndexMap<String, usize> {
    let mut counts: IndexMap<String, usize> = IndexMap::new();
    for row in rows.iter().filter(|r| matches_year(r, year)) {
        *counts.entry(row.country.clone()).or_insert(0) += 1;
    }
    counts
}

/// Canonical spelling used when joining a country name against the world
/// atlas geometry. Confined to the join: selection state and aggregation
/// keys always carry the raw dataset spelling.
pub fn map_join_name(country: &str) -> &str {
    match country {
        "United States" => "United States of America",
        other => other,
    }
}

/// Inverse of [`map_join_name`], applied when a map click produces a
/// geometry name that must become a filter value.
pub fn map_display_name(geometry_name: &str) -> &str {
    match geometry_name {
        "United States of America" => "United States",
        other => other,
    }
}

/// Language counts over the (optionally country-filtered) rows, with any
/// language under `threshold` merged into [`OTHERS_LABEL`]. Rows with an
/// empty language are skipped.
pub fn language_breakdown(
    rows: &[Row],
    country: Option<&str>,
    threshold: usize,
) -> LanguageBreakdown {
    let mut counts: IndexMap<String, usize> = IndexMap::new();
    for row in rows.iter().filter(|r| matches_country(r, country)) {
        if row.most_used_language.is_empty() {
            continue;
        }
        *counts.entry(row.most_used_language.clone()).or_insert(0) += 1;
    }

    let mut buckets: IndexMap<String, usize> = IndexMap::new();
    let mut merged = Vec::new();
    let mut others = 0usize;
    for (language, count) in counts {
        if count < threshold {
            others += count;
            merged.push(language);
        } else {
            buckets.insert(language, count);
        }
    }
    if others > 0 {
        buckets.insert(OTHERS_LABEL.to_string(), others);
    }

    LanguageBreakdown { buckets, merged }
}

/// Second-level breakdown of exactly the languages that were merged into
/// "Others": re-derived on demand from the same rows, never persisted.
pub fn others_breakdown(
    rows: &[Row],
    country: Option<&str>,
    threshold: usize,
) -> IndexMap<String, usize> {
    let mut counts: IndexMap<String, usize> = IndexMap::new();
    for row in rows.iter().filter(|r| matches_country(r, country)) {
        if row.most_used_language.is_empty() {
            continue;
        }
        *counts.entry(row.most_used_language.clone()).or_insert(0) += 1;
    }
    counts.retain(|_, count| *count < threshold);
    counts
}

/// (year, cumulative user count) pairs, years ascending. Rows with
/// unparseable creation dates are excluded, so the final value equals the
/// count of rows with parseable dates and the series never decreases.
pub fn cumulative_users_by_year(rows: &[Row]) -> Vec<(i32, usize)> {
    let mut per_year: AHashMap<i32, usize> = AHashMap::new();
    for row in rows {
        if let Some(year) = row.created_year() {
            *per_year.entry(year).or_insert(0) += 1;
        }
    }

    let mut years: Vec<i32> = per_year.keys().copied().collect();
    years.sort_unstable();

    let mut running = 0usize;
    years
        .into_iter()
        .map(|year| {
            running += per_year[&year];
            (year, running)
        })
        .collect()
}

/// Fixed-bin histogram of repository counts over the (optionally
/// language-filtered) rows. Every bin from [`REPO_COUNT_BINS`] is present
/// even when empty; rows outside [1, 30] are silently dropped.
pub fn repo_count_histogram(rows: &[Row], language: Option<&str>) -> Vec<RepoBin> {
    let mut bins: Vec<RepoBin> = REPO_COUNT_BINS
        .iter()
        .map(|&(lo, hi)| RepoBin { lo, hi, count: 0 })
        .collect();

    for row in rows.iter().filter(|r| matches_language(r, language)) {
        let n = row.repositories_count;
        if let Some(bin) = bins.iter_mut().find(|b| n >= b.lo && n <= b.hi) {
            bin.count += 1;
        }
    }
    bins
}

/// The `n` most used languages after optional year filtering, descending by
/// count. Ties keep first-seen order: grouping is insertion-ordered and the
/// sort is stable, so equal counts never reorder.
pub fn top_languages(rows: &[Row], year: Option<i32>, n: usize) -> Vec<(String, usize)> {
    let mut counts: IndexMap<String, usize> = IndexMap::new();
    for row in rows.iter().filter(|r| matches_year(r, year)) {
        if row.most_used_language.is_empty() {
            continue;
        }
        *counts.entry(row.most_used_language.clone()).or_insert(0) += 1;
    }

    let mut ranked: Vec<(String, usize)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked.truncate(n);
    ranked
}

/// Per-year adoption ratio of one language: rows in the year whose language
/// matches the target, over all rows in that year. The target defaults to
/// the overall most frequent language when none is supplied; `None` when no
/// target can be determined (empty dataset or no languages at all).
pub fn adoption_series(rows: &[Row], language: Option<&str>) -> Option<AdoptionSeries> {
    let target: String = match language {
        Some(lang) => lang.to_string(),
        None => top_languages(rows, None, 1).into_iter().next()?.0,
    };

    let mut totals: AHashMap<i32, (usize, usize)> = AHashMap::new();
    for row in rows {
        let Some(year) = row.created_year() else {
            continue;
        };
        let entry = totals.entry(year).or_insert((0, 0));
        entry.0 += 1;
        if row.most_used_language == target {
            entry.1 += 1;
        }
    }

    let mut years: Vec<i32> = totals.keys().copied().collect();
    years.sort_unstable();

    let points = years
        .into_iter()
        .map(|year| {
            let (all, matching) = totals[&year];
            (year, matching as f64 / all as f64)
        })
        .collect();

    Some(AdoptionSeries {
        language: target,
        points,
    })
}

/// The `n` most frequent topics over the (optionally country- and
/// year-filtered) rows, descending by count. Topic parsing is defensive:
/// a row whose topic list fails to parse contributes nothing and the
/// aggregation carries on.
pub fn topic_frequency(
    rows: &[Row],
    country: Option<&str>,
    year: Option<i32>,
    n: usize,
) -> Vec<(String, usize)> {
    let mut counts: IndexMap<String, usize> = IndexMap::new();
    for row in rows
        .iter()
        .filter(|r| matches_country(r, country))
        .filter(|r| matches_year(r, year))
    {
        for topic in row.topics() {
            *counts.entry(topic).or_insert(0) += 1;
        }
    }

    let mut ranked: Vec<(String, usize)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked.truncate(n);
    ranked
}

/// Rows matching the country filter, as a borrowed sub-slice iterator.
pub fn filter_by_country<'a>(rows: &'a [Row], country: Option<&'a str>) -> impl Iterator<Item = &'a Row> {
    rows.iter().filter(move |r| matches_country(r, country))
}

fn matches_country(row: &Row, country: Option<&str>) -> bool {
    country.map_or(true, |c| row.country == c)
}

fn matches_year(row: &Row, year: Option<i32>) -> bool {
    year.map_or(true, |y| row.created_year() == Some(y))
}

fn matches_language(row: &Row, language: Option<&str>) -> bool {
    language.map_or(true, |l| row.most_used_language == l)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(country: &str, language: &str, created: &str) -> Row {
        serde_json::from_value(json!({
            "Country": country,
            "Most Used Language": language,
            "Account Created At": created,
        }))
        .unwrap()
    }

    fn row_with_repos(repos: u32, language: &str) -> Row {
        serde_json::from_value(json!({
            "Repositories Count": repos,
            "Most Used Language": language,
        }))
        .unwrap()
    }

    fn row_hireable(hireable: bool) -> Row {
        serde_json::from_value(json!({ "Hireable": hireable })).unwrap()
    }

    /// The three-row scenario from the product notes: two Go users created
    /// in 2020 and one Rust user created in 2021, all in France.
    fn france_fixture() -> Vec<Row> {
        vec![
            row("France", "Go", "2020-05-01"),
            row("France", "Go", "2020-06-01"),
            row("France", "Rust", "2021-01-01"),
        ]
    }

    #[test]
    fn hireable_counts_sum_to_input() {
        let rows = vec![
            row_hireable(true),
            row_hireable(false),
            row_hireable(true),
            row_hireable(false),
            row_hireable(false),
        ];
        let counts = hireable_counts(&rows);
        assert_eq!(counts.hireable, 2);
        assert_eq!(counts.non_hireable, 3);
        assert_eq!(counts.hireable + counts.non_hireable, rows.len());
    }

    #[test]
    fn users_by_country_counts_sum_to_total() {
        let rows = vec![
            row("France", "Go", "2020-05-01"),
            row("Japan", "Rust", "2020-06-01"),
            row("France", "Rust", "2021-01-01"),
            row("Brazil", "Go", "not-a-date"),
        ];

        let all = users_by_country(&rows, None);
        assert_eq!(all.values().sum::<usize>(), rows.len());
        assert_eq!(all["France"], 2);

        // Year filter drops the bad-date row along with the 2021 one.
        let only_2020 = users_by_country(&rows, Some(2020));
        assert_eq!(only_2020.values().sum::<usize>(), 2);
        assert_eq!(
            only_2020.values().sum::<usize>(),
            total_users(
                &rows,
                &FilterState {
                    year: Some(2020),
                    ..Default::default()
                }
            )
        );
    }

    #[test]
    fn canonicalization_confined_to_geometry_join() {
        let rows = vec![row("United States", "Go", "2020-01-01")];

        // Aggregation and filtering both see the literal dataset spelling.
        let counts = users_by_country(&rows, None);
        assert_eq!(counts["United States"], 1);
        let filters = FilterState {
            country: Some("United States".into()),
            ..Default::default()
        };
        assert_eq!(total_users(&rows, &filters), 1);

        // Only the join step translates, and it round-trips.
        assert_eq!(map_join_name("United States"), "United States of America");
        assert_eq!(map_display_name("United States of America"), "United States");
        assert_eq!(map_join_name("France"), "France");
    }

    #[test]
    fn language_breakdown_threshold_and_others() {
        let mut rows = Vec::new();
        for _ in 0..5 {
            rows.push(row("X", "Python", "2020-01-01"));
        }
        for _ in 0..3 {
            rows.push(row("X", "Go", "2020-01-01"));
        }
        rows.push(row("X", "Fortran", "2020-01-01"));
        rows.push(row("X", "", "2020-01-01")); // empty language skipped

        let breakdown = language_breakdown(&rows, None, 3);

        // Everything except Others is at or above the threshold.
        for (label, count) in &breakdown.buckets {
            if label != OTHERS_LABEL {
                assert!(*count >= 3, "{label} under threshold");
            }
        }
        assert_eq!(breakdown.buckets[OTHERS_LABEL], 1);
        assert_eq!(breakdown.merged, vec!["Fortran".to_string()]);

        // Others drill-down re-derives exactly the merged languages.
        let others = others_breakdown(&rows, None, 3);
        assert_eq!(others.len(), 1);
        assert_eq!(others["Fortran"], 1);

        // Deterministic: same inputs, same output.
        assert_eq!(breakdown, language_breakdown(&rows, None, 3));
    }

    #[test]
    fn language_breakdown_respects_country_filter() {
        let rows = vec![
            row("France", "Go", "2020-01-01"),
            row("Japan", "Go", "2020-01-01"),
            row("France", "Rust", "2020-01-01"),
        ];
        let breakdown = language_breakdown(&rows, Some("France"), 1);
        assert_eq!(breakdown.buckets.get("Go"), Some(&1));
        assert_eq!(breakdown.buckets.get("Rust"), Some(&1));
        assert_eq!(breakdown.buckets.values().sum::<usize>(), 2);
    }

    #[test]
    fn cumulative_users_matches_concrete_scenario() {
        let rows = france_fixture();
        assert_eq!(cumulative_users_by_year(&rows), vec![(2020, 2), (2021, 3)]);
    }

    #[test]
    fn cumulative_users_is_monotone_and_excludes_bad_dates() {
        let mut rows = france_fixture();
        rows.push(row("France", "Go", "garbage"));
        let series = cumulative_users_by_year(&rows);

        for pair in series.windows(2) {
            assert!(pair[0].1 <= pair[1].1);
            assert!(pair[0].0 < pair[1].0);
        }
        // Final value counts only rows with parseable dates.
        assert_eq!(series.last().unwrap().1, 3);
    }

    #[test]
    fn cumulative_users_empty_dataset() {
        assert!(cumulative_users_by_year(&[]).is_empty());
    }

    #[test]
    fn histogram_bin_sum_plus_out_of_range_is_total() {
        let rows = vec![
            row_with_repos(0, "Go"),   // below range, dropped
            row_with_repos(1, "Go"),   // bin 1-3
            row_with_repos(3, "Go"),   // bin 1-3
            row_with_repos(15, "Go"),  // bin 13-15
            row_with_repos(30, "Go"),  // bin 28-30
            row_with_repos(31, "Go"),  // above range, dropped
            row_with_repos(250, "Go"), // far above range, dropped
        ];
        let bins = repo_count_histogram(&rows, None);
        assert_eq!(bins.len(), REPO_COUNT_BINS.len());

        let binned: usize = bins.iter().map(|b| b.count).sum();
        let out_of_range = rows
            .iter()
            .filter(|r| r.repositories_count < 1 || r.repositories_count > 30)
            .count();
        assert_eq!(binned + out_of_range, rows.len());
        assert_eq!(binned, 4);

        assert_eq!(bins[0].count, 2); // 1-3
        assert_eq!(bins[4].count, 1); // 13-15
        assert_eq!(bins[9].count, 1); // 28-30
    }

    #[test]
    fn histogram_language_filter() {
        let rows = vec![
            row_with_repos(2, "Go"),
            row_with_repos(2, "Rust"),
            row_with_repos(5, "Go"),
        ];
        let bins = repo_count_histogram(&rows, Some("Go"));
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 2);
    }

    #[test]
    fn top_languages_ranked_with_first_seen_tie_break() {
        let rows = vec![
            row("X", "Ruby", "2020-01-01"),
            row("X", "Go", "2020-01-01"),
            row("X", "Go", "2020-01-01"),
            row("X", "Python", "2020-01-01"), // ties with Ruby at 1
        ];
        let top = top_languages(&rows, None, 5);
        assert_eq!(top[0], ("Go".to_string(), 2));
        // Ruby was encountered before Python; the tie preserves that order.
        assert_eq!(top[1].0, "Ruby");
        assert_eq!(top[2].0, "Python");
    }

    #[test]
    fn top_languages_truncates_and_filters_by_year() {
        let rows = france_fixture();
        let top = top_languages(&rows, Some(2020), 5);
        assert_eq!(top, vec![("Go".to_string(), 2)]);
        assert_eq!(top_languages(&rows, None, 1).len(), 1);
    }

    #[test]
    fn adoption_series_concrete_scenario() {
        let rows = france_fixture();
        let series = adoption_series(&rows, Some("Go")).unwrap();
        assert_eq!(series.language, "Go");
        // Per-year ratio, not cumulative: 2/2 in 2020, 0/1 in 2021.
        assert_eq!(series.points, vec![(2020, 1.0), (2021, 0.0)]);
    }

    #[test]
    fn adoption_series_exact_fraction() {
        let mut rows = Vec::new();
        for i in 0..10 {
            let lang = if i < 3 { "Rust" } else { "Go" };
            rows.push(row("X", lang, "2022-03-04"));
        }
        let series = adoption_series(&rows, Some("Rust")).unwrap();
        assert_eq!(series.points, vec![(2022, 0.3)]);
    }

    #[test]
    fn adoption_series_defaults_to_most_frequent_language() {
        let rows = france_fixture();
        let series = adoption_series(&rows, None).unwrap();
        assert_eq!(series.language, "Go");
        for (_, rate) in &series.points {
            assert!((0.0..=1.0).contains(rate));
        }
    }

    #[test]
    fn adoption_series_empty_dataset_has_no_target() {
        assert!(adoption_series(&[], None).is_none());
    }

    #[test]
    fn topic_frequency_is_fault_isolated() {
        let rows: Vec<Row> = vec![
            serde_json::from_value(json!({
                "Country": "France",
                "Unique Topics": "['web', 'api']",
            }))
            .unwrap(),
            serde_json::from_value(json!({
                "Country": "France",
                "Unique Topics": "[completely broken",
            }))
            .unwrap(),
            serde_json::from_value(json!({
                "Country": "France",
                "Unique Topics": ["web", "unknown"],
            }))
            .unwrap(),
        ];

        let top = topic_frequency(&rows, None, None, 50);
        assert_eq!(top[0], ("web".to_string(), 2));
        assert_eq!(top[1], ("api".to_string(), 1));
        // "unknown" excluded, broken row contributed nothing.
        assert_eq!(top.len(), 2);
    }

    #[test]
    fn topic_frequency_respects_filters_and_limit() {
        let rows: Vec<Row> = vec![
            serde_json::from_value(json!({
                "Country": "France",
                "Account Created At": "2020-01-01",
                "Unique Topics": ["a", "b"],
            }))
            .unwrap(),
            serde_json::from_value(json!({
                "Country": "Japan",
                "Account Created At": "2020-01-01",
                "Unique Topics": ["c"],
            }))
            .unwrap(),
        ];
        let top = topic_frequency(&rows, Some("France"), Some(2020), 1);
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].1, 1);
        assert!(topic_frequency(&rows, Some("France"), Some(1999), 50).is_empty());
    }

    #[test]
    fn total_users_ignores_language_dimension() {
        let rows = france_fixture();
        let filters = FilterState {
            country: Some("France".into()),
            year: None,
            language: Some("Go".into()),
        };
        assert_eq!(total_users(&rows, &filters), 3);
    }

    #[test]
    fn everything_is_total_over_empty_input() {
        let empty: Vec<Row> = Vec::new();
        assert_eq!(hireable_counts(&empty), HireableCounts::default());
        assert!(users_by_country(&empty, None).is_empty());
        assert!(language_breakdown(&empty, None, LANGUAGE_THRESHOLD).buckets.is_empty());
        assert!(cumulative_users_by_year(&empty).is_empty());
        assert!(repo_count_histogram(&empty, None).iter().all(|b| b.count == 0));
        assert!(top_languages(&empty, None, 5).is_empty());
        assert!(topic_frequency(&empty, None, None, 50).is_empty());
        assert_eq!(total_users(&empty, &FilterState::default()), 0);
    }
}
