//! Data-driven analysis scenarios
//!
//! Each case is a small table; expected findings are written the way a
//! report prints them (1-based row numbers).

use chrono::NaiveDate;
use dtanalyze::{
    analyze, ActionColumn, Analysis, Analyzer, AnalyzerConfig, Cell, ConditionColumn,
    DeclaredType, Error, FactModel, Operator, Pattern, Row, Table,
};
use rstest::rstest;
use rust_decimal::Decimal;

// ============================================================================
// Helpers
// ============================================================================

/// One `Driver` pattern bound to `d`, one column per operator on `field`
fn table(field: &str, ops: &[&str]) -> Table {
    Table {
        name: "scenario".into(),
        attributes: vec![],
        patterns: vec![Pattern {
            fact_type: "Driver".into(),
            binding: Some("d".into()),
            conditions: ops
                .iter()
                .map(|op| ConditionColumn {
                    field: field.into(),
                    operator: Operator::from(*op),
                    ..Default::default()
                })
                .collect(),
        }],
        actions: vec![ActionColumn {
            header: "premium".into(),
            field: None,
        }],
    }
}

fn row(number: i64, conditions: Vec<Cell>, action: &str) -> Row {
    let mut cells = vec![Cell::from(number), Cell::from("")];
    cells.extend(conditions);
    cells.push(Cell::from(action));
    Row::new(cells)
}

fn model(typ: Option<&str>, values: &[&str]) -> FactModel {
    FactModel::new().with_field("Driver", "f", typ.map(DeclaredType::from), values)
}

fn describe(analysis: &Analysis) -> String {
    analysis
        .findings
        .iter()
        .map(|f| f.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

fn date(s: &str) -> Cell {
    Cell::Date(NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap())
}

fn age(v: Option<i64>) -> Cell {
    v.map(Cell::from).unwrap_or_default()
}

// ============================================================================
// Cross-row relationships on an age range (>= lower, < upper)
// ============================================================================

#[rstest]
#[case("nested", [(Some(18), Some(65)), (Some(20), Some(30))], ["", "subsumed by row 1"])]
#[case(
    "open_ended_parent",
    [(Some(18), None), (Some(20), Some(30))],
    ["", "subsumed by row 1"]
)]
#[case("adjacent", [(Some(18), Some(25)), (Some(25), Some(65))], ["", ""])]
#[case("overlapping", [(Some(18), Some(30)), (Some(25), Some(65))], ["", ""])]
#[case(
    "identical",
    [(Some(18), Some(65)), (Some(18), Some(65))],
    ["duplicate of row 2", "duplicate of row 1"]
)]
#[case(
    "empty_range",
    [(Some(30), Some(20)), (Some(18), Some(65))],
    ["impossible match on d.age", ""]
)]
#[case("blank_row", [(None, None), (Some(18), Some(65))], ["", ""])]
#[case("half_open_each_side", [(Some(18), None), (None, Some(65))], ["", ""])]
fn test_age_range_scenarios(
    #[case] name: &str,
    #[case] ranges: [(Option<i64>, Option<i64>); 2],
    #[case] expected: [&str; 2],
) {
    let table = table("age", &[">=", "<"]);
    let rows: Vec<Row> = ranges
        .iter()
        .zip(1..)
        .map(|((lower, upper), number)| row(number, vec![age(*lower), age(*upper)], "100"))
        .collect();
    let oracle = FactModel::new().with_field("Driver", "age", Some(DeclaredType::Numeric), &[]);

    let analyses = analyze(&table, &rows, &oracle).unwrap();

    let actual: Vec<String> = analyses.iter().map(describe).collect();
    assert_eq!(actual, expected, "{}: findings mismatch", name);
}

// ============================================================================
// Within-row contradictions per field type (two columns on field `f`)
// ============================================================================

#[rstest]
#[case(
    "date_gap_of_one_day",
    Some("Date"),
    &[],
    [">", "<"],
    [date("2024-01-01"), date("2024-01-02")],
    true
)]
#[case(
    "date_single_day",
    Some("Date"),
    &[],
    [">=", "<="],
    [date("2024-01-01"), date("2024-01-01")],
    false
)]
#[case(
    "date_listed",
    Some("Date"),
    &[],
    ["in", ">"],
    [Cell::from("2024-01-01, 2024-03-01"), date("2024-02-01")],
    false
)]
#[case(
    "string_eq_and_ne",
    Some("String"),
    &[],
    ["==", "!="],
    [Cell::from("gold"), Cell::from("gold")],
    true
)]
#[case(
    "string_in_and_ne",
    Some("String"),
    &[],
    ["in", "!="],
    [Cell::from("gold, silver"), Cell::from("gold")],
    false
)]
#[case(
    "enum_exhausted",
    Some("String"),
    &["basic", "standard", "premium"],
    ["not in", "!="],
    [Cell::from("basic, standard"), Cell::from("premium")],
    true
)]
#[case(
    "enum_remaining",
    Some("String"),
    &["basic", "standard", "premium"],
    ["not in", "=="],
    [Cell::from("basic"), Cell::from("premium")],
    false
)]
#[case(
    "boolean_both_ways",
    Some("Boolean"),
    &[],
    ["==", "=="],
    [Cell::from(true), Cell::from(false)],
    true
)]
#[case(
    "boolean_negated",
    Some("Boolean"),
    &[],
    ["!=", "=="],
    [Cell::from(true), Cell::from(false)],
    false
)]
#[case(
    "numeric_list_above_max",
    Some("Integer"),
    &[],
    ["in", ">"],
    [Cell::from("1, 2, 3"), Cell::from(3)],
    true
)]
#[case(
    "numeric_excluded_value",
    Some("Long"),
    &[],
    ["not in", "=="],
    [Cell::from("5"), Cell::from(5)],
    true
)]
#[case(
    "numeric_matches_operator",
    Some("Integer"),
    &[],
    ["matches", "=="],
    [Cell::from(1), Cell::from(2)],
    false
)]
#[case(
    "free_format_is_neutral",
    None,
    &[],
    ["==", "!="],
    [Cell::from("x"), Cell::from("x")],
    false
)]
#[case(
    "unknown_type_is_neutral",
    Some("Address"),
    &[],
    [">", "<"],
    [Cell::from(10), Cell::from(5)],
    false
)]
fn test_single_row_contradictions(
    #[case] name: &str,
    #[case] typ: Option<&str>,
    #[case] values: &[&str],
    #[case] ops: [&str; 2],
    #[case] cells: [Cell; 2],
    #[case] expected_impossible: bool,
) {
    let table = table("f", &ops);
    let rows = vec![row(1, cells.to_vec(), "x")];

    let analyses = analyze(&table, &rows, &model(typ, values)).unwrap();

    assert_eq!(
        analyses[0].is_impossible(),
        expected_impossible,
        "{}: impossibility mismatch",
        name
    );
}

// ============================================================================
// Conflicts and configuration
// ============================================================================

#[rstest]
#[case(true, true, true, "duplicate of row 2; conflicts with row 2")]
#[case(false, true, true, "conflicts with row 2")]
#[case(true, true, false, "duplicate of row 2")]
#[case(false, false, false, "")]
fn test_conflict_detection_toggles(
    #[case] duplicates: bool,
    #[case] subsumption: bool,
    #[case] conflicts: bool,
    #[case] expected_first_row: &str,
) {
    let table = table("age", &[">="]);
    let rows = vec![
        row(1, vec![Cell::from(18)], "100"),
        row(2, vec![Cell::from(18)], "200"),
    ];
    let oracle = FactModel::new().with_field("Driver", "age", Some(DeclaredType::Numeric), &[]);
    let config = AnalyzerConfig {
        detect_duplicates: duplicates,
        detect_subsumption: subsumption,
        detect_conflicts: conflicts,
        ..Default::default()
    };

    let analyses = Analyzer::with_config(&oracle, config)
        .analyze(&table, &rows)
        .unwrap();

    assert_eq!(describe(&analyses[0]), expected_first_row);
}

// ============================================================================
// Date ranges against listed dates
// ============================================================================

/// Columns on the date field `f`: `in`, `>=`, `<=`, `!=`
fn date_row(number: i64, listed: &str, range: Option<(&str, &str)>, skip: Option<&str>) -> Row {
    let (from, to) = match range {
        Some((from, to)) => (date(from), date(to)),
        None => (Cell::Blank, Cell::Blank),
    };
    let listed = if listed.is_empty() {
        Cell::Blank
    } else {
        Cell::from(listed)
    };
    let skip = skip.map(date).unwrap_or_default();
    row(number, vec![listed, from, to, skip], "100")
}

#[rstest]
#[case::range_equals_list(
    date_row(1, "2024-01-05, 2024-01-06", None, None),
    date_row(2, "", Some(("2024-01-05", "2024-01-06")), None),
    ["duplicate of row 2", "duplicate of row 1"]
)]
#[case::range_with_gap_equals_list(
    date_row(1, "2024-01-05, 2024-01-07", None, None),
    date_row(2, "", Some(("2024-01-05", "2024-01-07")), Some("2024-01-06")),
    ["duplicate of row 2", "duplicate of row 1"]
)]
#[case::range_inside_list(
    date_row(1, "2024-01-04, 2024-01-05, 2024-01-06, 2024-01-07", None, None),
    date_row(2, "", Some(("2024-01-05", "2024-01-06")), None),
    ["", "subsumed by row 1"]
)]
#[case::list_inside_range(
    date_row(1, "", Some(("2024-01-01", "2024-01-31")), None),
    date_row(2, "2024-01-05, 2024-01-20", None, None),
    ["", "subsumed by row 1"]
)]
#[case::range_spills_past_list(
    date_row(1, "2024-01-05, 2024-01-06", None, None),
    date_row(2, "", Some(("2024-01-05", "2024-01-07")), None),
    ["subsumed by row 2", ""]
)]
fn test_date_ranges_against_lists(
    #[case] first: Row,
    #[case] second: Row,
    #[case] expected: [&str; 2],
) {
    let table = table("f", &["in", ">=", "<=", "!="]);

    let analyses = analyze(&table, &[first, second], &model(Some("Date"), &[])).unwrap();

    let actual: Vec<String> = analyses.iter().map(describe).collect();
    assert_eq!(actual, expected);
}

// ============================================================================
// Malformed input
// ============================================================================

#[rstest]
#[case::wrong_width("in", vec![Cell::from(1), Cell::Blank, Cell::from(18)])]
#[case::missing_row_number(
    "in",
    vec![Cell::Blank, Cell::Blank, Cell::from(18), Cell::from("x")]
)]
#[case::fractional_row_number(
    "in",
    vec![Cell::from(Decimal::new(15, 1)), Cell::Blank, Cell::from(18), Cell::from("x")]
)]
#[case::date_in_numeric_column(
    "in",
    vec![Cell::from(1), Cell::Blank, date("2024-01-01"), Cell::from("x")]
)]
#[case::unparseable_list(
    "in",
    vec![Cell::from(1), Cell::Blank, Cell::from("ten, eleven"), Cell::from("x")]
)]
#[case::text_under_equality(
    "==",
    vec![Cell::from(1), Cell::Blank, Cell::from("5"), Cell::from("x")]
)]
#[case::text_under_ordering(
    ">",
    vec![Cell::from(1), Cell::Blank, Cell::from("18"), Cell::from("x")]
)]
fn test_malformed_rows_fail_the_call(#[case] operator: &str, #[case] cells: Vec<Cell>) {
    let table = table("age", &[operator]);
    let oracle = FactModel::new().with_field("Driver", "age", Some(DeclaredType::Numeric), &[]);

    let result = analyze(&table, &[Row::new(cells)], &oracle);

    assert!(matches!(
        result,
        Err(Error::CellCount { .. } | Error::RowNumber { .. } | Error::Detector { .. })
    ));
}

#[test]
fn test_text_under_date_comparison_fails() {
    let table = table("f", &["<"]);
    let rows = [row(1, vec![Cell::from("2024-01-01")], "x")];

    let err = analyze(&table, &rows, &model(Some("Date"), &[])).unwrap_err();

    assert!(matches!(err, Error::Detector { .. }));
}
