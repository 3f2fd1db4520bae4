/// Pure data pipeline: dedupe → filter → stats → sort → paginate.
/// Components call these on read; no function here touches the DOM.
pub mod state;

pub use state::{SortDir, ViewState, PAGE_SIZES};

use contracts::record::{CellValue, NfeControleRecord};
use std::cmp::Ordering;
use std::collections::HashSet;
use unicode_normalization::UnicodeNormalization;

/// Search normalization: lowercase, then NFD with the combining diacritical
/// marks stripped, so "São" matches "sao".
pub fn normalize(input: &str) -> String {
    input
        .to_lowercase()
        .nfd()
        .filter(|c| !('\u{0300}'..='\u{036f}').contains(c))
        .collect()
}

/// Drops records whose identity key was already seen, keeping first-seen
/// order. Idempotent.
pub fn dedupe(records: Vec<NfeControleRecord>) -> Vec<NfeControleRecord> {
    let mut seen = HashSet::new();
    records
        .into_iter()
        .filter(|r| seen.insert(r.dedupe_key()))
        .collect()
}

/// Conjunctive substring filter on the unit name and the contact name.
/// An empty term always passes its side.
pub fn apply_filters(
    records: &[NfeControleRecord],
    client_filter: &str,
    contact_filter: &str,
) -> Vec<NfeControleRecord> {
    let client_term = normalize(client_filter);
    let contact_term = normalize(contact_filter);

    records
        .iter()
        .filter(|r| {
            let unit = normalize(&r.nom_unid_oper.text());
            let contact = normalize(&r.nom_contato.text());
            (client_term.is_empty() || unit.contains(&client_term))
                && (contact_term.is_empty() || contact.contains(&contact_term))
        })
        .cloned()
        .collect()
}

// ---------------------------------------------------------------------------
// Summary statistics
// ---------------------------------------------------------------------------

/// Per-flag truthy counts over the filtered set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FlagStats {
    pub certificado: usize,
    pub qrc_homologacao: usize,
    pub qrc_producao: usize,
    pub teste_cupom: usize,
    pub teste_nfse: usize,
}

impl FlagStats {
    /// Total completed tasks across the five flags.
    pub fn done(&self) -> usize {
        self.certificado
            + self.qrc_homologacao
            + self.qrc_producao
            + self.teste_cupom
            + self.teste_nfse
    }
}

pub fn compute_stats(filtered: &[NfeControleRecord]) -> FlagStats {
    let count = |f: fn(&NfeControleRecord) -> &CellValue| {
        filtered.iter().filter(|r| f(r).is_truthy()).count()
    };
    FlagStats {
        certificado: count(|r| &r.tem_certificado),
        qrc_homologacao: count(|r| &r.qr_code_homologacao),
        qrc_producao: count(|r| &r.qr_code_producao),
        teste_cupom: count(|r| &r.teste_cupom),
        teste_nfse: count(|r| &r.teste_nfse),
    }
}

/// Percent of `count` over `total` with one decimal and a comma separator;
/// `"0,0"` when the total is zero.
pub fn percent_text(count: usize, total: usize) -> String {
    if total == 0 {
        return "0,0".to_string();
    }
    format!("{:.1}", count as f64 / total as f64 * 100.0).replace('.', ",")
}

/// Header progress: each record counts as five possible tasks.
#[derive(Debug, Clone, PartialEq)]
pub struct OverallProgress {
    pub percent_number: f64,
    pub percent_text: String,
    pub done: usize,
    pub total: usize,
}

pub fn overall_progress(stats: &FlagStats, filtered_count: usize) -> OverallProgress {
    if filtered_count == 0 {
        return OverallProgress {
            percent_number: 0.0,
            percent_text: "0,0".to_string(),
            done: 0,
            total: 0,
        };
    }

    let done = stats.done();
    let total = filtered_count * 5;
    let percent_number = done as f64 / total as f64 * 100.0;
    OverallProgress {
        percent_number,
        percent_text: format!("{:.1}", percent_number).replace('.', ","),
        done,
        total,
    }
}

// ---------------------------------------------------------------------------
// Sorting
// ---------------------------------------------------------------------------

/// Numeric coercion used before falling back to text comparison: numbers as
/// themselves, bools as 0/1, blank text as 0, parseable text as its number.
fn numeric_value(value: &CellValue) -> Option<f64> {
    match value {
        CellValue::Number(n) => Some(*n),
        CellValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        CellValue::Text(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                Some(0.0)
            } else {
                trimmed.parse::<f64>().ok()
            }
        }
        _ => None,
    }
}

fn compare_digit_runs(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

/// Case- and diacritic-insensitive comparison with numeric-chunk awareness,
/// so "Unidade 2" sorts before "Unidade 10".
fn natural_compare(a: &str, b: &str) -> Ordering {
    let a = normalize(a);
    let b = normalize(b);
    let mut ai = a.chars().peekable();
    let mut bi = b.chars().peekable();

    loop {
        match (ai.peek().copied(), bi.peek().copied()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(ca), Some(cb)) => {
                if ca.is_ascii_digit() && cb.is_ascii_digit() {
                    let da: String = {
                        let mut s = String::new();
                        while let Some(c) = ai.peek().copied().filter(char::is_ascii_digit) {
                            s.push(c);
                            ai.next();
                        }
                        s
                    };
                    let db: String = {
                        let mut s = String::new();
                        while let Some(c) = bi.peek().copied().filter(char::is_ascii_digit) {
                            s.push(c);
                            bi.next();
                        }
                        s
                    };
                    match compare_digit_runs(&da, &db) {
                        Ordering::Equal => {}
                        other => return other,
                    }
                } else {
                    match ca.cmp(&cb) {
                        Ordering::Equal => {
                            ai.next();
                            bi.next();
                        }
                        other => return other,
                    }
                }
            }
        }
    }
}

/// Non-null cell comparison: numeric when both sides coerce, natural text
/// comparison otherwise.
pub fn compare_cells(a: &CellValue, b: &CellValue) -> Ordering {
    match (numeric_value(a), numeric_value(b)) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        _ => natural_compare(&a.text(), &b.text()),
    }
}

/// Stable sort on one column. Nulls rank last in both directions; the
/// direction only reverses the comparison of two non-null values.
pub fn sort_records(records: &mut [NfeControleRecord], key: &str, direction: SortDir) {
    records.sort_by(|a, b| {
        let va = a.field(key);
        let vb = b.field(key);
        match (va.is_null(), vb.is_null()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => {
                let cmp = compare_cells(va, vb);
                match direction {
                    SortDir::Asc => cmp,
                    SortDir::Desc => cmp.reverse(),
                }
            }
        }
    });
}

/// Slice `[(page-1)·size, (page-1)·size + size)` of the sorted sequence.
/// `page` is expected to be already clamped via `ViewState::current_page_safe`.
pub fn paginate(records: &[NfeControleRecord], page: usize, page_size: usize) -> Vec<NfeControleRecord> {
    let start = (page.max(1) - 1) * page_size;
    records
        .iter()
        .skip(start)
        .take(page_size)
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    fn record(negoc: &str, oper: &str, unit: &str, contact: &str) -> NfeControleRecord {
        NfeControleRecord {
            cod_unid_negoc: text(negoc),
            cod_unid_oper: text(oper),
            nom_unid_oper: text(unit),
            nom_contato: text(contact),
            ..Default::default()
        }
    }

    #[test]
    fn test_normalize_strips_case_and_accents() {
        assert_eq!(normalize("São Paulo"), "sao paulo");
        assert_eq!(normalize("HOMOLOGAÇÃO"), "homologacao");
        assert_eq!(normalize("já"), "ja");
    }

    #[test]
    fn test_dedupe_keeps_first_seen_and_is_idempotent() {
        let a = record("01", "1", "Unidade A", "Alice");
        let mut a_spaced = a.clone();
        a_spaced.nom_unid_oper = text("  Unidade A  ");
        a_spaced.teste_nfse = text("S"); // differs outside the identity fields
        let b = record("01", "2", "Unidade B", "Bob");

        let deduped = dedupe(vec![a.clone(), a_spaced, b.clone()]);
        assert_eq!(deduped, vec![a, b]);

        let again = dedupe(deduped.clone());
        assert_eq!(again, deduped);
    }

    #[test]
    fn test_filters_are_conjunctive_and_commutative() {
        let rows = vec![
            record("01", "1", "Unidade São João", "Alice"),
            record("01", "2", "Unidade São João", "Bob"),
            record("01", "3", "Unidade Centro", "Alice"),
        ];

        let both = apply_filters(&rows, "sao joao", "ali");
        assert_eq!(both.len(), 1);
        assert_eq!(both[0].cod_unid_oper, text("1"));

        // same result regardless of which filter is considered first
        let client_then_contact = apply_filters(&apply_filters(&rows, "sao joao", ""), "", "ali");
        let contact_then_client = apply_filters(&apply_filters(&rows, "", "ali"), "sao joao", "");
        assert_eq!(client_then_contact, both);
        assert_eq!(contact_then_client, both);
    }

    #[test]
    fn test_empty_filters_pass_everything() {
        let rows = vec![record("01", "1", "Unidade A", "Alice")];
        assert_eq!(apply_filters(&rows, "", "").len(), 1);
    }

    #[test]
    fn test_numeric_sort_beats_lexicographic() {
        let mut rows = vec![
            record("10", "1", "A", "x"),
            record("2", "2", "B", "x"),
        ];
        sort_records(&mut rows, "cod_unid_negoc", SortDir::Asc);
        assert_eq!(rows[0].cod_unid_negoc, text("2"));
        assert_eq!(rows[1].cod_unid_negoc, text("10"));
    }

    #[test]
    fn test_natural_compare_on_mixed_text() {
        assert_eq!(compare_cells(&text("Unidade 2"), &text("Unidade 10")), Ordering::Less);
        assert_eq!(compare_cells(&text("unidade a"), &text("Unidade A")), Ordering::Equal);
        assert_eq!(compare_cells(&text("São"), &text("sao")), Ordering::Equal);
    }

    #[test]
    fn test_blank_text_coerces_to_zero() {
        assert_eq!(compare_cells(&text(""), &CellValue::Number(0.0)), Ordering::Equal);
        assert_eq!(compare_cells(&text(" "), &CellValue::Number(1.0)), Ordering::Less);
    }

    #[test]
    fn test_nulls_rank_last_in_both_directions() {
        let mut with_null = record("5", "1", "A", "x");
        with_null.cod_unid_negoc = CellValue::Null;
        let rows = vec![with_null, record("3", "2", "B", "x"), record("7", "3", "C", "x")];

        let mut asc = rows.clone();
        sort_records(&mut asc, "cod_unid_negoc", SortDir::Asc);
        assert!(asc[2].cod_unid_negoc.is_null());
        assert_eq!(asc[0].cod_unid_negoc, text("3"));

        let mut desc = rows;
        sort_records(&mut desc, "cod_unid_negoc", SortDir::Desc);
        assert!(desc[2].cod_unid_negoc.is_null());
        assert_eq!(desc[0].cod_unid_negoc, text("7"));
    }

    #[test]
    fn test_desc_reverses_asc_for_distinct_keys() {
        let rows = vec![
            record("3", "1", "A", "x"),
            record("1", "2", "B", "x"),
            record("2", "3", "C", "x"),
        ];
        let mut asc = rows.clone();
        sort_records(&mut asc, "cod_unid_negoc", SortDir::Asc);
        let mut desc = rows;
        sort_records(&mut desc, "cod_unid_negoc", SortDir::Desc);

        asc.reverse();
        assert_eq!(asc, desc);
    }

    #[test]
    fn test_paginate_partitions_the_sorted_sequence() {
        let rows: Vec<_> = (1..=23)
            .map(|i| record(&i.to_string(), &i.to_string(), "U", "c"))
            .collect();
        let st = ViewState::default(); // size 10

        let mut reassembled = Vec::new();
        for page in 1..=st.page_count(rows.len()) {
            reassembled.extend(paginate(&rows, page, st.page_size));
        }
        assert_eq!(reassembled, rows);
        assert_eq!(paginate(&rows, 3, 10).len(), 3);
        assert!(paginate(&rows, 4, 10).is_empty());
    }

    #[test]
    fn test_percent_text_formats() {
        assert_eq!(percent_text(0, 0), "0,0");
        assert_eq!(percent_text(1, 1), "100,0");
        assert_eq!(percent_text(1, 3), "33,3");
        assert_eq!(percent_text(0, 4), "0,0");
    }

    #[test]
    fn test_single_record_scenario() {
        let mut row = record("01", "001", "Unit A", "Alice");
        row.tem_certificado = text("S");
        row.qr_code_homologacao = text("N");
        row.qr_code_producao = text("N");
        row.teste_cupom = text("N");
        row.teste_nfse = text("N");

        let data = dedupe(vec![row]);
        assert_eq!(data.len(), 1);

        let filtered = apply_filters(&data, "", "");
        let stats = compute_stats(&filtered);
        assert_eq!(stats.certificado, 1);
        assert_eq!(stats.qrc_homologacao, 0);
        assert_eq!(stats.teste_nfse, 0);

        assert_eq!(percent_text(stats.certificado, filtered.len()), "100,0");
        assert_eq!(percent_text(stats.qrc_homologacao, filtered.len()), "0,0");

        let progress = overall_progress(&stats, filtered.len());
        assert_eq!(progress.percent_text, "20,0");
        assert_eq!(progress.done, 1);
        assert_eq!(progress.total, 5);
    }

    #[test]
    fn test_filtering_narrows_view_and_resets_page() {
        let rows = vec![
            record("01", "1", "Unit A", "Alice"),
            record("01", "2", "Other B", "Bob"),
        ];
        let mut st = ViewState {
            page: 2,
            ..Default::default()
        };
        st.set_client_filter("unit".to_string());
        assert_eq!(st.page, 1);

        let filtered = apply_filters(&rows, &st.client_filter, &st.contact_filter);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].nom_unid_oper, text("Unit A"));
    }

    #[test]
    fn test_overall_progress_empty_set() {
        let progress = overall_progress(&FlagStats::default(), 0);
        assert_eq!(progress.percent_text, "0,0");
        assert_eq!(progress.percent_number, 0.0);
        assert_eq!(progress.total, 0);
    }
}
