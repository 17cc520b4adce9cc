//! Row reconstruction from positioned fragments.
//!
//! Fragments are bucketed by their vertical coordinate: two fragments on the
//! same page share a row iff `y` rounds to the same multiple of the row
//! tolerance. Rows come out in reading order (page ascending, then top to
//! bottom), fragments within a row left to right.

use std::collections::BTreeMap;
use std::cmp::{Ordering, Reverse};

use tracing::trace;

use super::fragments::Fragment;

/// Default vertical clustering tolerance in PDF units.
pub const DEFAULT_ROW_TOLERANCE: f64 = 2.0;

/// Fragments judged to lie on the same visual line.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    /// Zero-based page index.
    pub page: u32,
    /// Bucketed vertical coordinate (a multiple of the tolerance).
    pub y_key: f64,
    /// Fragments ordered left to right.
    pub fragments: Vec<Fragment>,
    /// Fragment texts joined with single spaces.
    pub flat_text: String,
}

impl Row {
    fn new(page: u32, y_key: f64, mut fragments: Vec<Fragment>) -> Self {
        // Stable: ties keep input order
        fragments.sort_by(|a, b| a.x.partial_cmp(&b.x).unwrap_or(Ordering::Equal));
        let flat_text = fragments
            .iter()
            .map(|f| f.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        Self {
            page,
            y_key,
            fragments,
            flat_text,
        }
    }

    /// Whether the row text contains `marker`.
    pub fn contains(&self, marker: &str) -> bool {
        self.flat_text.contains(marker)
    }
}

/// Round-half-up bucket index of a vertical coordinate.
fn bucket(y: f64, tolerance: f64) -> i64 {
    (y / tolerance + 0.5).floor() as i64
}

/// Group fragments into rows.
///
/// Fragments without usable coordinates are discarded. A non-positive or
/// non-finite tolerance falls back to [`DEFAULT_ROW_TOLERANCE`].
pub fn cluster_rows(fragments: &[Fragment], tolerance: f64) -> Vec<Row> {
    let tolerance = if tolerance.is_finite() && tolerance > 0.0 {
        tolerance
    } else {
        DEFAULT_ROW_TOLERANCE
    };

    // Key: page ascending, then bucket descending (PDF y grows upward)
    let mut buckets: BTreeMap<(u32, Reverse<i64>), Vec<Fragment>> = BTreeMap::new();

    for fragment in fragments.iter().filter(|f| f.is_positioned()) {
        let key = (fragment.page, Reverse(bucket(fragment.y, tolerance)));
        buckets.entry(key).or_default().push(fragment.clone());
    }

    let rows: Vec<Row> = buckets
        .into_iter()
        .map(|((page, Reverse(b)), items)| Row::new(page, b as f64 * tolerance, items))
        .collect();

    trace!("Clustered {} fragments into {} rows", fragments.len(), rows.len());
    rows
}

/// Rejoin rows into plain text, one row per line.
pub fn flatten_rows(rows: &[Row]) -> String {
    let mut text = String::new();
    for row in rows {
        text.push_str(&row.flat_text);
        text.push('\n');
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn texts(rows: &[Row]) -> Vec<&str> {
        rows.iter().map(|r| r.flat_text.as_str()).collect()
    }

    #[test]
    fn test_rows_top_to_bottom_left_to_right() {
        let fragments = vec![
            Fragment::new("$65.43", 500.0, 600.2, 0),
            Fragment::new("214.957.3190", 40.0, 600.0, 0),
            Fragment::new("Monthly charges", 40.0, 650.0, 0),
            Fragment::new("John Smith", 120.0, 599.6, 0),
        ];

        let rows = cluster_rows(&fragments, 2.0);
        assert_eq!(
            texts(&rows),
            vec!["Monthly charges", "214.957.3190 John Smith $65.43"]
        );
        assert_eq!(rows[1].y_key, 600.0);
    }

    #[test]
    fn test_tolerance_buckets() {
        // 600.9 -> bucket 300, 601.1 -> bucket 301
        let fragments = vec![
            Fragment::new("a", 0.0, 600.9, 0),
            Fragment::new("b", 10.0, 601.1, 0),
        ];
        let rows = cluster_rows(&fragments, 2.0);
        assert_eq!(texts(&rows), vec!["b", "a"]);
    }

    #[test]
    fn test_page_order_precedes_y() {
        let fragments = vec![
            Fragment::new("page two top", 0.0, 700.0, 1),
            Fragment::new("page one bottom", 0.0, 100.0, 0),
            Fragment::new("page one top", 0.0, 700.0, 0),
        ];
        let rows = cluster_rows(&fragments, 2.0);
        assert_eq!(
            texts(&rows),
            vec!["page one top", "page one bottom", "page two top"]
        );
    }

    #[test]
    fn test_permutation_invariance() {
        let fragments = vec![
            Fragment::new("302.310.7589", 40.0, 580.0, 0),
            Fragment::new("$58.21", 500.0, 580.4, 0),
            Fragment::new("Jane Doe", 120.0, 579.8, 0),
            Fragment::new("Monthly charges", 40.0, 650.0, 0),
            Fragment::new("$38.00", 400.0, 580.0, 0),
        ];
        let expected = texts(&cluster_rows(&fragments, 2.0))
            .into_iter()
            .map(String::from)
            .collect::<Vec<_>>();

        let mut reversed = fragments.clone();
        reversed.reverse();
        let mut rotated = fragments.clone();
        rotated.rotate_left(2);

        for permutation in [reversed, rotated] {
            let rows = cluster_rows(&permutation, 2.0);
            assert_eq!(texts(&rows), expected);
        }
    }

    #[test]
    fn test_unpositioned_fragments_discarded() {
        let fragments = vec![
            Fragment::new("ok", 0.0, 10.0, 0),
            Fragment::new("bad", f64::INFINITY, 10.0, 0),
        ];
        let rows = cluster_rows(&fragments, 2.0);
        assert_eq!(texts(&rows), vec!["ok"]);
    }

    #[test]
    fn test_flatten_rows() {
        let fragments = vec![
            Fragment::new("Total due", 0.0, 20.0, 0),
            Fragment::new("$120.00", 80.0, 20.0, 0),
            Fragment::new("Thank you", 0.0, 10.0, 0),
        ];
        let text = flatten_rows(&cluster_rows(&fragments, 2.0));
        assert_eq!(text, "Total due $120.00\nThank you\n");
    }
}
