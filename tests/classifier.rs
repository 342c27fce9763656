mod common;

use common::TestWorkspace;
use csv_inspect::{
    DataFile, Value,
    column::{ColumnMetadata, Datatype},
    value::{Number, is_numeric, to_number},
};
use proptest::prelude::*;

fn with_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::new();
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

#[test]
fn sentinel_values_stay_categorical() {
    for raw in ["$", "N.A.", "-", "1.2.3", "", "n/a"] {
        assert!(!is_numeric(raw), "{raw:?}");
        assert_eq!(Value::classify(raw), Value::Text(raw.to_string()));
    }
}

proptest! {
    #[test]
    fn formatted_integers_convert_to_their_value(value in 0u64..=999_999_999_999, negative in any::<bool>()) {
        let sign = if negative { "-" } else { "" };
        let raw = format!("{sign}${}", with_thousands(value));
        prop_assert!(is_numeric(&raw));
        let expected = if negative { -(value as i64) } else { value as i64 };
        prop_assert_eq!(to_number(&raw).unwrap(), Number::Integer(expected));
    }

    #[test]
    fn single_decimal_point_yields_float(whole in 0u32..100_000, fraction in 0u32..1000) {
        let raw = format!("{whole}.{fraction}");
        prop_assert!(is_numeric(&raw));
        prop_assert!(matches!(to_number(&raw).unwrap(), Number::Float(_)));
    }

    #[test]
    fn alphabetic_fields_are_categorical(raw in "[A-Za-z][A-Za-z .]{0,12}") {
        prop_assert!(!is_numeric(&raw));
    }

    #[test]
    fn widening_ignores_observation_order(fields in prop::collection::vec(prop_oneof![
        "[0-9]{1,6}",
        "[A-Z][a-z]{1,6}",
    ], 1..24)) {
        let mut forward = ColumnMetadata::new("c", 0);
        let mut backward = ColumnMetadata::new("c", 0);
        for field in &fields {
            forward.observe(field);
        }
        for field in fields.iter().rev() {
            backward.observe(field);
        }
        prop_assert_eq!(&forward, &backward);

        let saw_numeric = fields.iter().any(|f| is_numeric(f));
        let saw_text = fields.iter().any(|f| !is_numeric(f));
        let expected = match (saw_numeric, saw_text) {
            (true, true) => Datatype::Mixed,
            (true, false) => Datatype::Numeric,
            _ => Datatype::Categorical,
        };
        prop_assert_eq!(forward.datatype, Some(expected));
    }

    #[test]
    fn scan_observes_every_cell_once(rows in prop::collection::vec(
        ("[a-z]{1,5}", 0u32..5000, "[A-Z]{1,3}|[0-9]{1,3}"),
        0..20,
    )) {
        let workspace = TestWorkspace::new();
        let mut contents = String::from("name,qty,code\n");
        for (name, qty, code) in &rows {
            contents.push_str(&format!("{name},{qty},{code}\n"));
        }
        let path = workspace.write("generated.csv", &contents);
        let data = DataFile::open(&path).expect("open");

        prop_assert_eq!(data.row_count(), rows.len() + 1);
        let observed: usize = data
            .columns()
            .iter()
            .map(|c| c.categorical_count() + c.numeric_count)
            .sum();
        prop_assert_eq!(observed, 3 * rows.len());
        prop_assert_eq!(data.column("qty").unwrap().numeric_count, rows.len());
    }
}
