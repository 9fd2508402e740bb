//! Per-category shaping: patient filter, recency ranking, trimming,
//! and the bounded reaction join.

use std::cmp::Reverse;
use std::collections::{HashMap, HashSet};

use chrono::NaiveDateTime;
use serde_json::Value;

use super::dates::{resolve_date, MIN_DATE};
use super::types::{Row, REACTIONS_PER_ALLERGY};

/// Keep one patient's rows, rank them newest-first by the first
/// usable date field, and trim to `limit`.
///
/// Patient matching is by string equality of the identifier, so a
/// numeric `patient_id` upstream matches its string form and vice
/// versa. Ties in the resolved date keep their input order.
pub fn select_recent(
    rows: Vec<Row>,
    patient_id: i64,
    date_fields: &[&str],
    limit: usize,
) -> Vec<Row> {
    let target = patient_id.to_string();
    let mut kept: Vec<Row> = rows
        .into_iter()
        .filter(|row| field_text(row.get("patient_id")).as_deref() == Some(target.as_str()))
        .collect();

    kept.sort_by_cached_key(|row| Reverse(row_date(row, date_fields)));
    kept.truncate(limit);
    kept
}

/// Attach the two most recent reactions to each trimmed allergy row.
///
/// Reactions are reachable only through a kept allergy record: the
/// join is by literal `allergy_record_id` value, never by patient.
/// Every allergy row gains a `reactions` array, empty when nothing
/// matched. A null or missing allergy identifier still participates
/// as a join key.
pub fn attach_reactions(mut allergies: Vec<Row>, reactions: Vec<Row>) -> Vec<Row> {
    let kept_ids: HashSet<String> = allergies
        .iter()
        .map(|row| join_key(row.get("record_id")))
        .collect();

    let mut matched: Vec<Row> = reactions
        .into_iter()
        .filter(|row| kept_ids.contains(&join_key(row.get("allergy_record_id"))))
        .collect();
    matched.sort_by_cached_key(|row| Reverse(resolve_date(row.get("reaction_date"))));

    let mut grouped: HashMap<String, Vec<Row>> = HashMap::new();
    for row in matched {
        let group = grouped.entry(join_key(row.get("allergy_record_id"))).or_default();
        if group.len() < REACTIONS_PER_ALLERGY {
            group.push(row);
        }
    }

    for allergy in &mut allergies {
        let group = grouped
            .get(&join_key(allergy.get("record_id")))
            .cloned()
            .unwrap_or_default();
        allergy.insert(
            "reactions".to_string(),
            Value::Array(group.into_iter().map(Value::Object).collect()),
        );
    }
    allergies
}

/// Sort key for a row: the first date candidate that is present and
/// truthy, resolved; otherwise the sentinel.
fn row_date(row: &Row, date_fields: &[&str]) -> NaiveDateTime {
    date_fields
        .iter()
        .find_map(|field| row.get(*field).filter(|value| is_truthy(value)))
        .map(|value| resolve_date(Some(value)))
        .unwrap_or(MIN_DATE)
}

/// Identifier text for patient matching. Missing and null fields
/// match nothing.
fn field_text(value: Option<&Value>) -> Option<String> {
    match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(other) => Some(other.to_string()),
    }
}

/// Canonical join-key text for an identifier value. The literal JSON
/// form keeps `10` and `"10"` distinct while letting null-like
/// identifiers group together.
fn join_key(value: Option<&Value>) -> String {
    match value {
        None => Value::Null.to_string(),
        Some(v) => v.to_string(),
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::types::{LAB_DATE_FIELDS, MEDICAL_HISTORY_DATE_FIELDS};
    use serde_json::json;

    fn row(value: Value) -> Row {
        match value {
            Value::Object(map) => map,
            other => panic!("fixture must be an object, got {other}"),
        }
    }

    fn text(r: &Row, field: &str) -> String {
        r.get(field).and_then(Value::as_str).unwrap_or("").to_string()
    }

    // ── select_recent ──────────────────────────────────────────

    #[test]
    fn keeps_three_newest_descending() {
        let rows: Vec<Row> = (1..=5)
            .map(|month| {
                row(json!({
                    "patient_id": 7,
                    "condition": format!("c{month}"),
                    "last_updated": format!("2021-{month:02}-01"),
                }))
            })
            .collect();

        let kept = select_recent(rows, 7, MEDICAL_HISTORY_DATE_FIELDS, 3);

        assert_eq!(kept.len(), 3);
        assert_eq!(text(&kept[0], "last_updated"), "2021-05-01");
        assert_eq!(text(&kept[1], "last_updated"), "2021-04-01");
        assert_eq!(text(&kept[2], "last_updated"), "2021-03-01");
    }

    #[test]
    fn string_patient_id_matches_numeric_target() {
        let rows = vec![
            row(json!({"patient_id": "7", "last_updated": "2021-01-01"})),
            row(json!({"patient_id": 7, "last_updated": "2021-02-01"})),
            row(json!({"patient_id": "8", "last_updated": "2021-03-01"})),
            row(json!({"patient_id": 9, "last_updated": "2021-04-01"})),
        ];

        let kept = select_recent(rows, 7, MEDICAL_HISTORY_DATE_FIELDS, 3);

        assert_eq!(kept.len(), 2);
        for r in &kept {
            let id = field_text(r.get("patient_id")).unwrap();
            assert_eq!(id, "7");
        }
    }

    #[test]
    fn missing_or_null_patient_id_never_matches() {
        let rows = vec![
            row(json!({"last_updated": "2021-01-01"})),
            row(json!({"patient_id": null, "last_updated": "2021-02-01"})),
        ];
        assert!(select_recent(rows, 7, MEDICAL_HISTORY_DATE_FIELDS, 3).is_empty());
    }

    #[test]
    fn falls_through_to_second_date_candidate() {
        // test_date absent on one row, null on another: uploaded_on ranks both.
        let rows = vec![
            row(json!({"patient_id": 7, "uploaded_on": "2020-06-01", "result": "a"})),
            row(json!({"patient_id": 7, "test_date": null, "uploaded_on": "2020-08-01", "result": "b"})),
            row(json!({"patient_id": 7, "test_date": "2020-07-01", "result": "c"})),
        ];

        let kept = select_recent(rows, 7, LAB_DATE_FIELDS, 3);

        assert_eq!(text(&kept[0], "result"), "b");
        assert_eq!(text(&kept[1], "result"), "c");
        assert_eq!(text(&kept[2], "result"), "a");
    }

    #[test]
    fn empty_string_date_is_not_a_usable_candidate() {
        let rows = vec![
            row(json!({"patient_id": 7, "test_date": "", "uploaded_on": "2020-06-01", "result": "a"})),
            row(json!({"patient_id": 7, "test_date": "2020-01-01", "result": "b"})),
        ];

        let kept = select_recent(rows, 7, LAB_DATE_FIELDS, 3);

        // Row "a" ranks by uploaded_on and lands first.
        assert_eq!(text(&kept[0], "result"), "a");
        assert_eq!(text(&kept[1], "result"), "b");
    }

    #[test]
    fn rows_without_any_date_sort_last() {
        let rows = vec![
            row(json!({"patient_id": 7, "condition": "undated"})),
            row(json!({"patient_id": 7, "condition": "dated", "last_updated": "2021-01-01"})),
        ];

        let kept = select_recent(rows, 7, MEDICAL_HISTORY_DATE_FIELDS, 3);

        assert_eq!(text(&kept[0], "condition"), "dated");
        assert_eq!(text(&kept[1], "condition"), "undated");
    }

    #[test]
    fn malformed_dates_sort_last_not_error() {
        let rows = vec![
            row(json!({"patient_id": 7, "condition": "broken", "last_updated": "banana"})),
            row(json!({"patient_id": 7, "condition": "fine", "last_updated": "2021-01-01"})),
        ];

        let kept = select_recent(rows, 7, MEDICAL_HISTORY_DATE_FIELDS, 3);

        assert_eq!(text(&kept[0], "condition"), "fine");
        assert_eq!(text(&kept[1], "condition"), "broken");
    }

    #[test]
    fn equal_dates_keep_input_order() {
        let rows = vec![
            row(json!({"patient_id": 7, "condition": "first", "last_updated": "2021-01-01"})),
            row(json!({"patient_id": 7, "condition": "second", "last_updated": "2021-01-01"})),
            row(json!({"patient_id": 7, "condition": "third", "last_updated": "2021-01-01"})),
        ];

        let kept = select_recent(rows, 7, MEDICAL_HISTORY_DATE_FIELDS, 3);

        assert_eq!(text(&kept[0], "condition"), "first");
        assert_eq!(text(&kept[1], "condition"), "second");
        assert_eq!(text(&kept[2], "condition"), "third");
    }

    #[test]
    fn limit_zero_yields_nothing() {
        let rows = vec![row(json!({"patient_id": 7, "last_updated": "2021-01-01"}))];
        assert!(select_recent(rows, 7, MEDICAL_HISTORY_DATE_FIELDS, 0).is_empty());
    }

    // ── attach_reactions ───────────────────────────────────────

    #[test]
    fn keeps_two_newest_reactions_per_record() {
        let allergies = vec![row(json!({"record_id": 10, "patient_id": 7, "allergen": "peanut"}))];
        let reactions: Vec<Row> = (1..=4)
            .map(|month| {
                row(json!({
                    "allergy_record_id": 10,
                    "reaction_date": format!("2022-{month:02}-01"),
                }))
            })
            .collect();

        let joined = attach_reactions(allergies, reactions);

        let attached = joined[0].get("reactions").and_then(Value::as_array).unwrap();
        assert_eq!(attached.len(), 2);
        assert_eq!(attached[0]["reaction_date"], "2022-04-01");
        assert_eq!(attached[1]["reaction_date"], "2022-03-01");
    }

    #[test]
    fn reactions_for_dropped_records_are_excluded() {
        let allergies = vec![row(json!({"record_id": 10}))];
        let reactions = vec![
            row(json!({"allergy_record_id": 10, "reaction_date": "2022-01-01"})),
            row(json!({"allergy_record_id": 99, "reaction_date": "2022-02-01"})),
        ];

        let joined = attach_reactions(allergies, reactions);

        let attached = joined[0].get("reactions").and_then(Value::as_array).unwrap();
        assert_eq!(attached.len(), 1);
        assert_eq!(attached[0]["allergy_record_id"], 10);
    }

    #[test]
    fn every_allergy_row_gains_a_reactions_field() {
        let allergies = vec![
            row(json!({"record_id": 10})),
            row(json!({"record_id": 11})),
        ];
        let reactions = vec![row(json!({"allergy_record_id": 10, "reaction_date": "2022-01-01"}))];

        let joined = attach_reactions(allergies, reactions);

        assert_eq!(
            joined[0].get("reactions").and_then(Value::as_array).unwrap().len(),
            1
        );
        assert!(joined[1].get("reactions").and_then(Value::as_array).unwrap().is_empty());
    }

    #[test]
    fn numeric_and_string_identifiers_stay_distinct() {
        let allergies = vec![row(json!({"record_id": 10}))];
        let reactions = vec![row(json!({"allergy_record_id": "10", "reaction_date": "2022-01-01"}))];

        let joined = attach_reactions(allergies, reactions);

        assert!(joined[0].get("reactions").and_then(Value::as_array).unwrap().is_empty());
    }

    #[test]
    fn null_identifier_participates_as_join_key() {
        let allergies = vec![row(json!({"record_id": null}))];
        let reactions = vec![
            row(json!({"allergy_record_id": null, "reaction_date": "2022-02-01"})),
            row(json!({"reaction_date": "2022-01-01"})),
        ];

        let joined = attach_reactions(allergies, reactions);

        // Both the explicit null and the absent parent reference group
        // under the null key.
        let attached = joined[0].get("reactions").and_then(Value::as_array).unwrap();
        assert_eq!(attached.len(), 2);
        assert_eq!(attached[0]["reaction_date"], "2022-02-01");
    }

    #[test]
    fn duplicate_record_ids_share_the_same_group() {
        let allergies = vec![
            row(json!({"record_id": 10, "allergen": "peanut"})),
            row(json!({"record_id": 10, "allergen": "latex"})),
        ];
        let reactions = vec![row(json!({"allergy_record_id": 10, "reaction_date": "2022-01-01"}))];

        let joined = attach_reactions(allergies, reactions);

        for allergy in &joined {
            let attached = allergy.get("reactions").and_then(Value::as_array).unwrap();
            assert_eq!(attached.len(), 1);
        }
    }
}
