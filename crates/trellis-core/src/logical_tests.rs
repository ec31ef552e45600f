use crate::logical::{LogicalOperand, logical_expr, try_logical_expr};

fn render(op: &LogicalOperand<String>) -> String {
    logical_expr(op, &mut |name| format!("p{name}"))
}

fn leaf(name: &str) -> LogicalOperand<String> {
    LogicalOperand::leaf(name.to_owned())
}

#[test]
fn leaf_expands_through_callback() {
    assert_eq!(render(&leaf("A")), "pA");
}

#[test]
fn or_joins_with_disjunction() {
    let op = LogicalOperand::or([leaf("A"), leaf("B")]);
    assert_eq!(render(&op), "(pA) || (pB)");
}

#[test]
fn and_of_not_keeps_precedence() {
    let op = LogicalOperand::and([LogicalOperand::not(leaf("A")), leaf("B")]);
    assert_eq!(render(&op), "(!(pA)) && (pB)");
}

#[test]
fn nested_operands() {
    let op = LogicalOperand::or([
        LogicalOperand::and([leaf("A"), leaf("B")]),
        LogicalOperand::not(leaf("C")),
    ]);
    assert_eq!(render(&op), "((pA) && (pB)) || (!(pC))");
}

#[test]
fn empty_lists_are_identities() {
    assert_eq!(render(&LogicalOperand::and([])), "true");
    assert_eq!(render(&LogicalOperand::or([])), "false");
}

#[test]
fn callback_error_aborts() {
    let op = LogicalOperand::or([leaf("A"), leaf("missing")]);
    let result = try_logical_expr(&op, &mut |name: &String| {
        if name == "missing" {
            Err(format!("unknown {name}"))
        } else {
            Ok(name.clone())
        }
    });
    assert_eq!(result, Err("unknown missing".to_owned()));
}

#[test]
fn deserialize_json_shapes() {
    let op: LogicalOperand<String> =
        serde_json::from_str(r#"{"and": [{"not": "A"}, {"or": ["B", "C"]}]}"#).unwrap();
    assert_eq!(
        op,
        LogicalOperand::and([
            LogicalOperand::not(leaf("A")),
            LogicalOperand::or([leaf("B"), leaf("C")]),
        ])
    );
}

#[test]
fn deserialize_bare_leaf() {
    let op: LogicalOperand<String> = serde_json::from_str(r#""brush""#).unwrap();
    assert_eq!(op, leaf("brush"));
}

#[test]
fn leaves_visited_in_order() {
    let op = LogicalOperand::and([leaf("A"), LogicalOperand::not(leaf("B"))]);
    let mut seen = Vec::new();
    op.for_each_leaf(&mut |name| seen.push(name.clone()));
    assert_eq!(seen, vec!["A", "B"]);
}
