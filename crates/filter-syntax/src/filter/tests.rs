//! Parser tests.

use std::time::{Duration, Instant};

use super::*;
use crate::schema::Schema;

fn course_schema() -> Schema {
    Schema::builder()
        .boolean(["fysem", "grad"])
        .set(["professors"])
        .categorical(["subject"])
        .numeric(["number"])
        .text(["description"])
        .build()
        .unwrap()
}

fn parse(input: &str) -> Expr {
    FilterParser::parse(input, &course_schema()).unwrap()
}

fn kinds(input: &str) -> Vec<(&str, TokenKind)> {
    let schema = course_schema();
    FilterParser::tokens_with_tags(input, &schema)
        .into_iter()
        .map(|t| (t.token.text, t.kind))
        .collect()
}

fn free(text: &str) -> Expr {
    Expr::free_text(text)
}

fn many(values: &[&str]) -> QueryArg {
    QueryArg::Many(values.iter().map(|v| v.to_string()).collect())
}

// ==================== Empty Input ====================

#[test]
fn test_parse_empty() {
    assert_eq!(parse(""), Expr::match_all());
    assert_eq!(parse(" "), Expr::match_all());
    assert_eq!(parse("\t \n"), Expr::match_all());
}

#[test]
fn test_parse_empty_group() {
    assert_eq!(parse("()"), Expr::and(vec![Expr::match_all()]));
}

// ==================== Free Text ====================

#[test]
fn test_parse_free_text_words() {
    assert_eq!(parse("Hello world"), Expr::and(vec![free("Hello"), free("world")]));
    assert_eq!(parse("CPSC 223"), Expr::and(vec![free("CPSC"), free("223")]));
    assert_eq!(parse("WLH"), Expr::and(vec![free("WLH")]));
}

#[test]
fn test_parse_free_text_uses_wildcard_contains() {
    let Expr::Complex { operands, .. } = parse("hello") else {
        panic!("expected complex");
    };
    let Expr::Text(op) = &operands[0] else {
        panic!("expected text op");
    };
    assert_eq!(op.target, TextTarget::Wildcard);
    assert_eq!(op.operator, TextOperator::Contains);
    assert_eq!(op.value, "hello");
}

#[test]
fn test_parse_operator_on_wrong_category_is_free_text() {
    // subject is categorical, not a set
    assert_eq!(
        parse("subject:has MATH"),
        Expr::and(vec![free("subject:has"), free("MATH")])
    );
    assert_eq!(
        parse(r#"subject:has "foo bar", "bar baz""#),
        Expr::and(vec![
            free("subject:has"),
            free("foo bar"),
            free(","),
            free("bar baz"),
        ])
    );
    // fysem is boolean, not categorical
    assert_eq!(parse("fysem:is x"), Expr::and(vec![free("fysem:is"), free("x")]));
}

#[test]
fn test_parse_unknown_field_is_free_text() {
    assert_eq!(
        parse("room:is WLH"),
        Expr::and(vec![free("room:is"), free("WLH")])
    );
    assert_eq!(
        parse("is:online"),
        Expr::and(vec![free("is:online")])
    );
}

#[test]
fn test_parse_unclosed_quote_is_literal() {
    assert_eq!(parse(r#""quote"#), Expr::and(vec![free("\"quote")]));
}

#[test]
fn test_parse_quoted_keywords_are_text() {
    assert_eq!(
        parse(r#"a "AND" b"#),
        Expr::and(vec![free("a"), free("AND"), free("b")])
    );
    assert_eq!(
        parse(r#""subject:in" A"#),
        Expr::and(vec![free("subject:in"), free("A")])
    );
    assert_eq!(
        parse(r#""NOT" a"#),
        Expr::and(vec![free("NOT"), free("a")])
    );
}

// ==================== Groups ====================

#[test]
fn test_parse_unclosed_paren_degrades_to_text() {
    assert_eq!(parse("("), Expr::and(vec![free("(")]));
    assert_eq!(parse("(xxx"), Expr::and(vec![free("("), free("xxx")]));
}

#[test]
fn test_parse_trailing_paren_absorbed_as_text() {
    assert_eq!(parse("a )"), Expr::and(vec![free("a"), free(")")]));
    assert_eq!(parse(")"), Expr::and(vec![free(")")]));
    assert_eq!(
        kinds("a ) )"),
        vec![
            ("a", TokenKind::WildcardText),
            (")", TokenKind::WildcardText),
            (")", TokenKind::WildcardText),
        ]
    );
}

#[test]
fn test_parse_inner_group_closes_after_outer_fails() {
    assert_eq!(
        parse("( ( a ) b"),
        Expr::and(vec![free("("), Expr::and(vec![free("a")]), free("b")])
    );
    assert_eq!(
        kinds("( ( a ) b"),
        vec![
            ("(", TokenKind::WildcardText),
            ("(", TokenKind::Paren),
            ("a", TokenKind::WildcardText),
            (")", TokenKind::Paren),
            ("b", TokenKind::WildcardText),
        ]
    );
}

#[test]
fn test_parse_group_returns_inner_expression() {
    assert_eq!(
        parse("(a OR b) c"),
        Expr::and(vec![Expr::or(vec![free("a"), free("b")]), free("c")])
    );
}

#[test]
fn test_parse_nested_groups() {
    assert_eq!(
        parse("((a))"),
        Expr::and(vec![Expr::and(vec![Expr::and(vec![free("a")])])])
    );
}

// ==================== Combinators ====================

#[test]
fn test_parse_combinator_fixed_by_first_keyword() {
    assert_eq!(parse("a OR b"), Expr::or(vec![free("a"), free("b")]));
    assert_eq!(parse("a AND b"), Expr::and(vec![free("a"), free("b")]));
    // Operands side by side continue the group
    assert_eq!(parse("a OR b c"), Expr::or(vec![free("a"), free("b"), free("c")]));
}

#[test]
fn test_parse_other_combinator_inside_group_is_text() {
    assert_eq!(
        parse("a OR b AND c"),
        Expr::or(vec![free("a"), free("b"), free("AND"), free("c")])
    );
}

#[test]
fn test_parse_lowercase_keywords_are_text() {
    assert_eq!(
        parse("a or b"),
        Expr::and(vec![free("a"), free("or"), free("b")])
    );
}

#[test]
fn test_parse_not() {
    assert_eq!(
        parse("NOT is:grad"),
        Expr::and(vec![Expr::negate(Expr::Boolean(BooleanOp {
            target: "grad".into(),
            operator: BooleanOperator::Is,
        }))])
    );
    assert_eq!(
        parse("NOT NOT a"),
        Expr::and(vec![Expr::negate(Expr::negate(free("a")))])
    );
}

#[test]
fn test_parse_trailing_not_is_text() {
    assert_eq!(parse("a NOT"), Expr::and(vec![free("a"), free("NOT")]));
}

// ==================== Nesting ====================

fn nesting_depth(expr: &Expr) -> usize {
    match expr {
        Expr::Complex { operands, .. } => 1 + operands.iter().map(nesting_depth).max().unwrap_or(0),
        Expr::Not { operand } => 1 + nesting_depth(operand),
        _ => 1,
    }
}

#[test]
fn test_parse_many_unclosed_parens_is_fast() {
    let start = Instant::now();

    let expr = parse(&"(".repeat(64));
    assert_eq!(expr, Expr::and(vec![free("("); 64]));

    let expr = parse(&"( a ".repeat(64));
    let expected: Vec<Expr> = (0..64).flat_map(|_| [free("("), free("a")]).collect();
    assert_eq!(expr, Expr::and(expected));

    let input = "( a ".repeat(64);
    let tags = kinds(&input);
    assert!(tags.iter().all(|(_, kind)| *kind == TokenKind::WildcardText));

    assert!(start.elapsed() < Duration::from_secs(5), "took {:?}", start.elapsed());
}

#[test]
fn test_parse_not_chain_past_nesting_limit() {
    let query = format!("{}x", "NOT ".repeat(MAX_NESTING + 1));
    let mut innermost = free("NOT");
    for _ in 0..MAX_NESTING {
        innermost = Expr::negate(innermost);
    }
    assert_eq!(parse(&query), Expr::and(vec![innermost, free("x")]));
}

#[test]
fn test_parse_long_not_chain_does_not_overflow() {
    let query = format!("{}x", "NOT ".repeat(100_000));
    let expr = parse(&query);
    assert!(nesting_depth(&expr) <= MAX_NESTING + 2);

    let getter = |_: &(), _: &str, _: &Expr| crate::value::FieldValue::from("x");
    evaluate(&(), &expr, &getter);
}

#[test]
fn test_parse_deep_groups_past_nesting_limit() {
    let depth = 1_000;
    let query = format!("{}x{}", "(".repeat(depth), ")".repeat(depth));
    let expr = parse(&query);
    assert!(nesting_depth(&expr) <= MAX_NESTING + 3);

    let tags = kinds(&query);
    let parens = tags.iter().filter(|(_, kind)| *kind == TokenKind::Paren).count();
    assert_eq!(parens, 2 * MAX_NESTING);

    let getter = |_: &(), _: &str, _: &Expr| crate::value::FieldValue::from("(x)");
    assert!(evaluate(&(), &expr, &getter));
}

// ==================== Typed Operators ====================

#[test]
fn test_parse_boolean() {
    assert_eq!(
        parse("is:fysem not:grad"),
        Expr::and(vec![
            Expr::Boolean(BooleanOp {
                target: "fysem".into(),
                operator: BooleanOperator::Is,
            }),
            Expr::Boolean(BooleanOp {
                target: "grad".into(),
                operator: BooleanOperator::Not,
            }),
        ])
    );
}

#[test]
fn test_parse_set_operators() {
    assert_eq!(
        parse("professors:has Ozan"),
        Expr::and(vec![Expr::Set(SetOp {
            target: "professors".into(),
            operator: SetOperator::Has,
            value: QueryArg::One("Ozan".into()),
        })])
    );

    for (keyword, operator) in [
        ("has-all-of", SetOperator::HasAllOf),
        ("has-any-of", SetOperator::HasAnyOf),
        ("all-in", SetOperator::AllIn),
        ("equals", SetOperator::Equals),
    ] {
        let query = format!(r#"professors:{keyword} "Alan Weide", Ozan"#);
        assert_eq!(
            parse(&query),
            Expr::and(vec![Expr::Set(SetOp {
                target: "professors".into(),
                operator,
                value: many(&["Alan Weide", "Ozan"]),
            })]),
            "query: {query}"
        );
    }
}

#[test]
fn test_parse_has_takes_single_value() {
    assert_eq!(
        parse("professors:has a, b"),
        Expr::and(vec![
            Expr::Set(SetOp {
                target: "professors".into(),
                operator: SetOperator::Has,
                value: QueryArg::One("a".into()),
            }),
            free(","),
            free("b"),
        ])
    );
}

#[test]
fn test_parse_operator_without_value_is_text() {
    assert_eq!(parse("subject:in"), Expr::and(vec![free("subject:in")]));
    assert_eq!(parse("professors:has"), Expr::and(vec![free("professors:has")]));
    assert_eq!(parse("description:contains"), Expr::and(vec![free("description:contains")]));
}

#[test]
fn test_parse_categorical() {
    assert_eq!(
        parse("subject:is MATH"),
        Expr::and(vec![Expr::Categorical(CategoricalOp {
            target: "subject".into(),
            operator: CategoricalOperator::Is,
            value: QueryArg::One("MATH".into()),
        })])
    );
    assert_eq!(
        parse(r#"subject:in "A"#),
        Expr::and(vec![Expr::Categorical(CategoricalOp {
            target: "subject".into(),
            operator: CategoricalOperator::In,
            value: many(&["\"A"]),
        })])
    );
}

#[test]
fn test_parse_value_list_stops_at_dangling_comma() {
    assert_eq!(
        parse("subject:in A,"),
        Expr::and(vec![
            Expr::Categorical(CategoricalOp {
                target: "subject".into(),
                operator: CategoricalOperator::In,
                value: many(&["A"]),
            }),
            free(","),
        ])
    );
}

#[test]
fn test_parse_quoted_comma_is_a_value() {
    assert_eq!(
        parse(r#"subject:in A "," B"#),
        Expr::and(vec![
            Expr::Categorical(CategoricalOp {
                target: "subject".into(),
                operator: CategoricalOperator::In,
                value: many(&["A"]),
            }),
            free(","),
            free("B"),
        ])
    );
}

#[test]
fn test_parse_numeric() {
    for (keyword, operator) in [
        ("<", NumericOperator::Lt),
        ("<=", NumericOperator::Le),
        (">", NumericOperator::Gt),
        (">=", NumericOperator::Ge),
        ("=", NumericOperator::Eq),
        ("!=", NumericOperator::Ne),
    ] {
        let query = format!("number {keyword} 200");
        assert_eq!(
            parse(&query),
            Expr::and(vec![Expr::Numeric(NumericOp {
                target: "number".into(),
                operator,
                value: 200.0,
            })]),
            "query: {query}"
        );
    }
}

#[test]
fn test_parse_numeric_without_spaces() {
    assert_eq!(
        parse("number>=-1.5"),
        Expr::and(vec![Expr::Numeric(NumericOp {
            target: "number".into(),
            operator: NumericOperator::Ge,
            value: -1.5,
        })])
    );
}

#[test]
fn test_parse_numeric_non_number_is_text() {
    assert_eq!(
        parse("number < abc"),
        Expr::and(vec![free("number"), free("<"), free("abc")])
    );
    assert_eq!(
        parse(r#"number < "3""#),
        Expr::and(vec![free("number"), free("<"), free("3")])
    );
}

#[test]
fn test_parse_compound_numeric() {
    assert_eq!(
        parse("300<=number<500"),
        Expr::and(vec![Expr::CompoundNumeric(CompoundNumericOp {
            target: "number".into(),
            operators: [NumericOperator::Le, NumericOperator::Lt],
            values: [300.0, 500.0],
        })])
    );
    assert_eq!(
        parse("3 >= number > 1"),
        Expr::and(vec![Expr::CompoundNumeric(CompoundNumericOp {
            target: "number".into(),
            operators: [NumericOperator::Ge, NumericOperator::Gt],
            values: [3.0, 1.0],
        })])
    );
}

#[test]
fn test_parse_compound_mixed_direction_is_text() {
    assert_eq!(
        parse("1 < number > 3"),
        Expr::and(vec![
            free("1"),
            free("<"),
            Expr::Numeric(NumericOp {
                target: "number".into(),
                operator: NumericOperator::Gt,
                value: 3.0,
            }),
        ])
    );
    assert_eq!(
        parse("1 = number = 1"),
        Expr::and(vec![
            free("1"),
            free("="),
            Expr::Numeric(NumericOp {
                target: "number".into(),
                operator: NumericOperator::Eq,
                value: 1.0,
            }),
        ])
    );
}

#[test]
fn test_parse_text_operators() {
    for (keyword, operator) in [
        ("contains", TextOperator::Contains),
        ("contains-words", TextOperator::ContainsWords),
        ("matches", TextOperator::Matches),
    ] {
        let query = format!(r#"description:{keyword} "intro course""#);
        assert_eq!(
            parse(&query),
            Expr::and(vec![Expr::Text(TextOp {
                target: TextTarget::Field("description".into()),
                operator,
                value: "intro course".into(),
            })]),
            "query: {query}"
        );
    }
}

#[test]
fn test_parse_text_wildcard_target() {
    assert_eq!(
        parse("*:matches ^a.c"),
        Expr::and(vec![Expr::Text(TextOp {
            target: TextTarget::Wildcard,
            operator: TextOperator::Matches,
            value: "^a.c".into(),
        })])
    );
}

#[test]
fn test_parse_text_operator_is_prefix_matched() {
    assert_eq!(
        parse("description:containsfoo bar"),
        Expr::and(vec![Expr::Text(TextOp {
            target: TextTarget::Field("description".into()),
            operator: TextOperator::Contains,
            value: "bar".into(),
        })])
    );
}

#[test]
fn test_parse_text_operator_value_may_be_keyword() {
    assert_eq!(
        parse("description:contains description:contains"),
        Expr::and(vec![Expr::Text(TextOp {
            target: TextTarget::Field("description".into()),
            operator: TextOperator::Contains,
            value: "description:contains".into(),
        })])
    );
}

// ==================== Full Queries ====================

#[test]
fn test_parse_full_course_query() {
    let query = r#"(subject:in MATH, CPSC, S&DS AND 300<=number<500 AND NOT professors:has-any-of "Alan Weide", "Ozan Erat") OR is:fysem"#;

    let expected = Expr::or(vec![
        Expr::and(vec![
            Expr::Categorical(CategoricalOp {
                target: "subject".into(),
                operator: CategoricalOperator::In,
                value: many(&["MATH", "CPSC", "S&DS"]),
            }),
            Expr::CompoundNumeric(CompoundNumericOp {
                target: "number".into(),
                operators: [NumericOperator::Le, NumericOperator::Lt],
                values: [300.0, 500.0],
            }),
            Expr::negate(Expr::Set(SetOp {
                target: "professors".into(),
                operator: SetOperator::HasAnyOf,
                value: many(&["Alan Weide", "Ozan Erat"]),
            })),
        ]),
        Expr::Boolean(BooleanOp {
            target: "fysem".into(),
            operator: BooleanOperator::Is,
        }),
    ]);

    assert_eq!(parse(query), expected);
}

#[test]
fn test_parse_is_deterministic() {
    let query = r#"(subject:in MATH, CPSC AND 300<=number<500) OR is:fysem "intro""#;
    assert_eq!(parse(query), parse(query));
}

#[test]
fn test_parse_empty_schema_is_all_free_text() {
    let schema = Schema::default();
    let expr = FilterParser::parse("is:fysem subject:in A", &schema).unwrap();
    assert_eq!(
        expr,
        Expr::and(vec![free("is:fysem"), free("subject:in"), free("A")])
    );
}

// ==================== Token Tags ====================

#[test]
fn test_tags_full_query() {
    assert_eq!(
        kinds("(subject:in MATH, CPSC AND 300<=number<500) OR is:fysem hello"),
        vec![
            ("(", TokenKind::Paren),
            ("subject:in", TokenKind::CategoricalOp),
            ("MATH", TokenKind::QueryArg),
            (",", TokenKind::Comma),
            ("CPSC", TokenKind::QueryArg),
            ("AND", TokenKind::Combinator),
            ("300", TokenKind::Number),
            ("<=", TokenKind::NumericOp),
            ("number", TokenKind::NumericTarget),
            ("<", TokenKind::NumericOp),
            ("500", TokenKind::Number),
            (")", TokenKind::Paren),
            ("OR", TokenKind::Combinator),
            ("is:fysem", TokenKind::BooleanOp),
            ("hello", TokenKind::WildcardText),
        ]
    );
}

#[test]
fn test_tags_text_and_not() {
    assert_eq!(
        kinds("NOT description:matches x"),
        vec![
            ("NOT", TokenKind::Combinator),
            ("description:matches", TokenKind::TextOp),
            ("x", TokenKind::QueryArg),
        ]
    );
}

#[test]
fn test_tags_unclosed_paren() {
    assert_eq!(
        kinds("(xxx"),
        vec![("(", TokenKind::WildcardText), ("xxx", TokenKind::WildcardText)]
    );
}

#[test]
fn test_tags_match_parse_with_tags() {
    let schema = course_schema();
    let query = "subject:is MATH OR number > 3";
    let (_, tagged) = FilterParser::parse_with_tags(query, &schema).unwrap();
    assert_eq!(tagged, FilterParser::tokens_with_tags(query, &schema));
    assert!(tagged.iter().all(|t| t.kind != TokenKind::Unknown));
}

#[test]
fn test_tags_serialize() {
    let schema = course_schema();
    let tagged = FilterParser::tokens_with_tags("is:grad", &schema);
    let json = serde_json::to_value(&tagged).unwrap();
    assert_eq!(
        json,
        serde_json::json!([
            {"quoted": false, "text": "is:grad", "start": 0, "end": 7, "kind": "boolean-op"}
        ])
    );
}

// ==================== AST Shape ====================

#[test]
fn test_expr_serializes_with_type_tags() {
    let json = serde_json::to_value(parse("NOT is:grad")).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "type": "ComplexExpr",
            "operator": "AND",
            "operands": [{
                "type": "NotExpr",
                "operand": {"type": "BooleanOp", "target": "grad", "operator": "is"}
            }]
        })
    );
}
