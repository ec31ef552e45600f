//! Tests for node payload fields and time unit expressions.

use super::*;

fn fields(names: &[&str]) -> FieldSet {
    names.iter().map(|n| (*n).to_owned()).collect()
}

#[test]
fn expr_fields_reads_dot_and_bracket_access() {
    let expr = r#"datum.a + datum["b c"] * datum['d'] - datum[ "e" ]"#;

    assert_eq!(expr_fields(expr), fields(&["a", "b c", "d", "e"]));
}

#[test]
fn expr_fields_ignores_non_datum_access() {
    assert!(expr_fields("parent.datum.a + mydatum.b + datum + 1").is_empty());
    assert!(expr_fields(r#"vlInterval("brush_store", datum)"#).is_empty());
}

#[test]
fn expr_fields_dedups_in_first_seen_order() {
    assert_eq!(expr_fields("datum.b > datum.a && datum.b < 10"), fields(&["b", "a"]));
}

#[test]
fn formula_depends_on_expression_fields() {
    let kind = NodeKind::Formula {
        expr: "datum.Horsepower / datum['Weight_in_lbs']".to_owned(),
        r#as: "ratio".to_owned(),
    };

    assert_eq!(kind.dependent_fields(), fields(&["Horsepower", "Weight_in_lbs"]));
    assert_eq!(kind.produced_fields(), fields(&["ratio"]));
}

#[test]
fn filter_depends_on_recorded_fields() {
    let kind = NodeKind::Filter {
        expr: "datum.a > 1".to_owned(),
        fields: expr_fields("datum.a > 1"),
    };

    assert_eq!(kind.dependent_fields(), fields(&["a"]));
    assert!(kind.produced_fields().is_empty());
}

#[test]
fn aggregate_depends_on_groupby_and_measured_fields() {
    let kind = NodeKind::Aggregate {
        groupby: vec!["Origin".to_owned()],
        measures: vec![
            AggregateMeasure {
                op: "count".to_owned(),
                field: None,
                r#as: "count_*".to_owned(),
            },
            AggregateMeasure {
                op: "mean".to_owned(),
                field: Some("Acceleration".to_owned()),
                r#as: "mean_Acceleration".to_owned(),
            },
        ],
    };

    assert_eq!(kind.dependent_fields(), fields(&["Origin", "Acceleration"]));
    assert_eq!(
        kind.produced_fields(),
        fields(&["Origin", "count_*", "mean_Acceleration"])
    );
}

#[test]
fn bin_depends_on_its_field() {
    let kind = NodeKind::Bin {
        field: "Horsepower".to_owned(),
        r#as: ["bin_Horsepower".to_owned(), "bin_Horsepower_end".to_owned()],
        maxbins: 10,
    };

    assert_eq!(kind.dependent_fields(), fields(&["Horsepower"]));
    assert_eq!(
        kind.produced_fields(),
        fields(&["bin_Horsepower", "bin_Horsepower_end"])
    );
}

#[test]
fn time_unit_year() {
    assert_eq!(
        time_unit_expr("year", "date"),
        r#"datetime(year(datum["date"]), 0, 1, 0, 0, 0, 0)"#
    );
}

#[test]
fn time_unit_yearmonth() {
    assert_eq!(
        time_unit_expr("yearmonth", "date"),
        r#"datetime(year(datum["date"]), month(datum["date"]), 1, 0, 0, 0, 0)"#
    );
}

#[test]
fn time_unit_quarter_maps_to_first_month() {
    assert_eq!(
        time_unit_expr("quarter", "date"),
        r#"datetime(2012, (quarter(datum["date"])-1)*3, 1, 0, 0, 0, 0)"#
    );
}

#[test]
fn time_unit_utc_uses_utc_parts() {
    assert_eq!(
        time_unit_expr("utcyearmonthdate", "date"),
        r#"utcdatetime(utcyear(datum["date"]), utcmonth(datum["date"]), utcdate(datum["date"]), 0, 0, 0, 0)"#
    );
}

#[test]
fn time_unit_milliseconds_is_not_seconds() {
    assert_eq!(
        time_unit_expr("milliseconds", "date"),
        r#"datetime(2012, 0, 1, 0, 0, 0, milliseconds(datum["date"]))"#
    );
    assert_eq!(
        time_unit_expr("secondsmilliseconds", "date"),
        r#"datetime(2012, 0, 1, 0, 0, seconds(datum["date"]), milliseconds(datum["date"]))"#
    );
}

#[test]
fn time_unit_day_lands_in_first_week_of_2006() {
    assert_eq!(
        time_unit_expr("day", "date"),
        r#"datetime(2006, 0, day(datum["date"])+1, 0, 0, 0, 0)"#
    );
}

#[test]
fn time_unit_names_are_validated() {
    assert!(is_time_unit("yearmonthdate"));
    assert!(is_time_unit("utcday"));
    assert!(!is_time_unit("week"));
    assert!(!is_time_unit("utc"));
    assert!(!is_time_unit("Year"));
}
