#[cfg(test)]
mod tests {
    use crate::ast::{
        Expression, FromClause, JoinType, Literal, Node, Operator, SelectStatement, SetOpKind, Span,
    };
    use crate::error::{DiagnosticKind, Error};
    use crate::semantic::scope::ScopeRegistry;
    use crate::semantic::{ValidationState, Validator};
    use crate::types::{Column, DataType, Field, Table};
    use std::collections::HashMap;

    fn create_test_catalog() -> HashMap<String, Table> {
        let mut catalog = HashMap::new();

        catalog.insert(
            "t".to_string(),
            Table::new(
                "t",
                vec![
                    Column::new("a", DataType::I32, false),
                    Column::new("b", DataType::Varchar(Some(10)), false),
                ],
            ),
        );
        catalog.insert(
            "s".to_string(),
            Table::new(
                "s",
                vec![
                    Column::new("c", DataType::I64, false),
                    Column::new("d", DataType::Varchar(Some(20)), true),
                ],
            ),
        );
        catalog.insert(
            "r".to_string(),
            Table::new("r", vec![Column::new("e", DataType::I32, false)]),
        );
        catalog.insert(
            "flags".to_string(),
            Table::new(
                "flags",
                vec![
                    Column::new("ok", DataType::Bool, false),
                    Column::new("day", DataType::Date, false),
                ],
            ),
        );
        catalog.insert(
            "users".to_string(),
            Table::new(
                "users",
                vec![
                    Column::new("id", DataType::I32, false),
                    Column::new("name", DataType::Text, false),
                ],
            ),
        );
        catalog.insert(
            "orders".to_string(),
            Table::new(
                "orders",
                vec![
                    Column::new("id", DataType::I32, false),
                    Column::new("user_id", DataType::I32, false),
                    Column::new("total", DataType::Decimal(Some(10), Some(2)), true),
                ],
            ),
        );

        catalog
    }

    fn span(offset: u32, len: u32) -> Span {
        Span::new(offset, len)
    }

    /// `SELECT col, ... FROM table`
    fn select_columns(sp: Span, table: &str, columns: &[&str]) -> Node {
        Node::select(
            sp,
            SelectStatement {
                items: columns
                    .iter()
                    .map(|c| (Expression::column(*c), None))
                    .collect(),
                from: vec![FromClause::table(sp, table)],
                filter: None,
            },
        )
    }

    fn expect_diagnostic(error: Error) -> (DiagnosticKind, Span) {
        match error {
            Error::Validation(v) => (v.kind, v.span),
            other => panic!("expected a validation diagnostic, got {:?}", other),
        }
    }

    #[test]
    fn union_widens_operand_types() {
        // SELECT a, b FROM t UNION SELECT c, d FROM s
        // with t.a INT, t.b VARCHAR(10) and s.c BIGINT, s.d VARCHAR(20) NULL
        let mut validator = Validator::new(create_test_catalog());
        let query = Node::set_op(
            span(0, 50),
            SetOpKind::Union,
            false,
            vec![
                select_columns(span(0, 20), "t", &["a", "b"]),
                select_columns(span(27, 20), "s", &["c", "d"]),
            ],
        );

        let id = validator.register(query).unwrap();
        let row_type = validator.validate(id).unwrap();

        assert_eq!(row_type.arity(), 2);
        assert_eq!(row_type.fields[0], Field::new("a", DataType::I64, false));
        assert_eq!(
            row_type.fields[1],
            Field::new("b", DataType::Varchar(Some(20)), true)
        );
    }

    #[test]
    fn all_set_operators_validate() {
        for op in [SetOpKind::Union, SetOpKind::Intersect, SetOpKind::Except] {
            for all in [false, true] {
                let mut validator = Validator::new(create_test_catalog());
                let query = Node::set_op(
                    span(0, 40),
                    op,
                    all,
                    vec![
                        select_columns(span(0, 15), "t", &["a"]),
                        select_columns(span(20, 15), "s", &["c"]),
                    ],
                );
                let id = validator.register(query).unwrap();
                let row_type = validator.validate(id).unwrap();
                assert_eq!(row_type.fields, vec![Field::new("a", DataType::I64, false)]);
            }
        }
    }

    #[test]
    fn validate_is_idempotent_and_cached() {
        let mut validator = Validator::new(create_test_catalog());
        let query = Node::set_op(
            span(0, 40),
            SetOpKind::Union,
            false,
            vec![
                select_columns(span(0, 15), "t", &["a"]),
                select_columns(span(20, 15), "s", &["c"]),
            ],
        );
        let id = validator.register(query).unwrap();

        let first = validator.validate(id).unwrap();
        let second = validator.validate(id).unwrap();
        assert_eq!(first, second);

        // The second call must not re-traverse operands: gutting the catalog
        // after the first validation changes nothing.
        validator.catalog.clear();
        let third = validator.validate(id).unwrap();
        assert_eq!(first, third);
    }

    #[test]
    fn namespace_state_is_observable() {
        let mut validator = Validator::new(create_test_catalog());
        let query = select_columns(span(0, 15), "t", &["a"]);
        let id = validator.register(query).unwrap();

        assert!(matches!(
            validator.namespace(id).unwrap().state(),
            ValidationState::Unvalidated
        ));
        validator.validate(id).unwrap();
        assert!(matches!(
            validator.namespace(id).unwrap().state(),
            ValidationState::Validated(_)
        ));
    }

    #[test]
    fn non_query_operand_reported_at_its_position() {
        // The offending operand must be reported wherever it sits.
        for position in 0..3 {
            let mut validator = Validator::new(create_test_catalog());
            let bad_span = span(100 + position as u32 * 10, 1);
            let mut operands = vec![
                select_columns(span(0, 15), "t", &["a"]),
                select_columns(span(20, 15), "s", &["c"]),
                select_columns(span(40, 15), "r", &["e"]),
            ];
            operands[position] = Node::expr(bad_span, Expression::integer(2));

            let query = Node::set_op(span(0, 60), SetOpKind::Union, false, operands);
            let id = validator.register(query).unwrap();
            let error = validator.validate(id).unwrap_err();

            let (kind, error_span) = expect_diagnostic(error);
            assert_eq!(kind, DiagnosticKind::NotAQuery("2".to_string()));
            assert_eq!(error_span, bad_span);
        }
    }

    #[test]
    fn bare_scalar_union_operand() {
        // SELECT 1 UNION 2
        let mut validator = Validator::new(create_test_catalog());
        let query = Node::set_op(
            span(0, 16),
            SetOpKind::Union,
            false,
            vec![
                Node::select(
                    span(0, 8),
                    SelectStatement {
                        items: vec![(Expression::integer(1), None)],
                        from: vec![],
                        filter: None,
                    },
                ),
                Node::expr(span(15, 1), Expression::integer(2)),
            ],
        );

        let id = validator.register(query).unwrap();
        let (kind, error_span) = expect_diagnostic(validator.validate(id).unwrap_err());
        assert_eq!(kind, DiagnosticKind::NotAQuery("2".to_string()));
        assert_eq!(error_span, span(15, 1));
    }

    #[test]
    fn bare_scalar_at_root() {
        let mut validator = Validator::new(create_test_catalog());
        let error = validator
            .register(Node::expr(span(0, 1), Expression::integer(7)))
            .unwrap_err();
        let (kind, _) = expect_diagnostic(error);
        assert_eq!(kind, DiagnosticKind::NotAQuery("7".to_string()));
    }

    #[test]
    fn union_column_count_mismatch() {
        let mut validator = Validator::new(create_test_catalog());
        let right_span = span(30, 25);
        let query = Node::set_op(
            span(0, 55),
            SetOpKind::Union,
            false,
            vec![
                select_columns(span(0, 20), "t", &["a", "b"]),
                select_columns(right_span, "s", &["c", "d", "c"]),
            ],
        );

        let id = validator.register(query).unwrap();
        let (kind, error_span) = expect_diagnostic(validator.validate(id).unwrap_err());
        assert_eq!(kind, DiagnosticKind::ColumnCountMismatch { left: 2, right: 3 });
        assert_eq!(error_span, right_span);
    }

    #[test]
    fn union_incompatible_column_types() {
        let mut validator = Validator::new(create_test_catalog());
        let right_span = span(30, 22);
        let query = Node::set_op(
            span(0, 52),
            SetOpKind::Union,
            false,
            vec![
                select_columns(span(0, 22), "flags", &["ok"]),
                select_columns(right_span, "flags", &["day"]),
            ],
        );

        let id = validator.register(query).unwrap();
        let (kind, error_span) = expect_diagnostic(validator.validate(id).unwrap_err());
        assert_eq!(
            kind,
            DiagnosticKind::NoCommonType {
                position: 1,
                left: DataType::Bool,
                right: DataType::Date,
            }
        );
        assert_eq!(error_span, right_span);
    }

    #[test]
    fn nested_set_operations() {
        // (SELECT a FROM t UNION SELECT c FROM s) INTERSECT SELECT e FROM r
        let mut validator = Validator::new(create_test_catalog());
        let inner = Node::set_op(
            span(1, 38),
            SetOpKind::Union,
            false,
            vec![
                select_columns(span(1, 15), "t", &["a"]),
                select_columns(span(23, 15), "s", &["c"]),
            ],
        );
        let query = Node::set_op(
            span(0, 70),
            SetOpKind::Intersect,
            false,
            vec![inner, select_columns(span(50, 15), "r", &["e"])],
        );

        let id = validator.register(query).unwrap();
        let row_type = validator.validate(id).unwrap();
        // a INT ∪ c BIGINT = BIGINT, then ∩ e INT stays BIGINT.
        assert_eq!(row_type.fields, vec![Field::new("a", DataType::I64, false)]);
    }

    #[test]
    fn single_operand_set_operation() {
        let mut validator = Validator::new(create_test_catalog());
        let query = Node::set_op(
            span(0, 20),
            SetOpKind::Union,
            false,
            vec![select_columns(span(0, 20), "t", &["a", "b"])],
        );

        let id = validator.register(query).unwrap();
        let row_type = validator.validate(id).unwrap();
        assert_eq!(row_type.arity(), 2);
        assert_eq!(row_type.fields[0], Field::new("a", DataType::I32, false));
    }

    #[test]
    fn values_rows_unify() {
        // VALUES (1, 'x'), (2, NULL)
        let mut validator = Validator::new(create_test_catalog());
        let query = Node::values(
            span(0, 25),
            vec![
                vec![Expression::integer(1), Expression::string("x")],
                vec![Expression::integer(2), Literal::Null.into()],
            ],
        );

        let id = validator.register(query).unwrap();
        let row_type = validator.validate(id).unwrap();
        assert_eq!(
            row_type.fields,
            vec![
                Field::new("column1", DataType::I32, false),
                Field::new("column2", DataType::Varchar(None), true),
            ]
        );
    }

    #[test]
    fn values_uneven_rows() {
        let mut validator = Validator::new(create_test_catalog());
        let query = Node::values(
            span(0, 20),
            vec![
                vec![Expression::integer(1), Expression::integer(2)],
                vec![Expression::integer(3)],
            ],
        );

        let id = validator.register(query).unwrap();
        let (kind, _) = expect_diagnostic(validator.validate(id).unwrap_err());
        assert_eq!(
            kind,
            DiagnosticKind::UnevenValuesRows {
                expected: 2,
                found: 1
            }
        );
    }

    #[test]
    fn values_union_select() {
        // VALUES (1) UNION SELECT a FROM t
        let mut validator = Validator::new(create_test_catalog());
        let query = Node::set_op(
            span(0, 33),
            SetOpKind::Union,
            false,
            vec![
                Node::values(span(0, 10), vec![vec![Expression::integer(1)]]),
                select_columns(span(17, 16), "t", &["a"]),
            ],
        );

        let id = validator.register(query).unwrap();
        let row_type = validator.validate(id).unwrap();
        assert_eq!(
            row_type.fields,
            vec![Field::new("column1", DataType::I32, false)]
        );
    }

    #[test]
    fn where_must_be_boolean() {
        let mut validator = Validator::new(create_test_catalog());
        let query = Node::select(
            span(0, 25),
            SelectStatement {
                items: vec![(Expression::column("a"), None)],
                from: vec![FromClause::table(span(14, 1), "t")],
                filter: Some(Expression::column("a")),
            },
        );

        let id = validator.register(query).unwrap();
        let (kind, _) = expect_diagnostic(validator.validate(id).unwrap_err());
        assert_eq!(kind, DiagnosticKind::NonBooleanFilter(DataType::I32));
    }

    #[test]
    fn where_boolean_accepted() {
        let mut validator = Validator::new(create_test_catalog());
        let query = Node::select(
            span(0, 30),
            SelectStatement {
                items: vec![(Expression::column("b"), None)],
                from: vec![FromClause::table(span(14, 1), "t")],
                filter: Some(
                    Operator::GreaterThan(
                        Box::new(Expression::column("a")),
                        Box::new(Expression::integer(1)),
                    )
                    .into(),
                ),
            },
        );

        let id = validator.register(query).unwrap();
        let row_type = validator.validate(id).unwrap();
        assert_eq!(
            row_type.fields,
            vec![Field::new("b", DataType::Varchar(Some(10)), false)]
        );
    }

    #[test]
    fn projection_aliases_and_generated_names() {
        let mut validator = Validator::new(create_test_catalog());
        let query = Node::select(
            span(0, 40),
            SelectStatement {
                items: vec![
                    (Expression::column("a"), Some("renamed".to_string())),
                    (Expression::integer(42), None),
                ],
                from: vec![FromClause::table(span(30, 1), "t")],
                filter: None,
            },
        );

        let id = validator.register(query).unwrap();
        let row_type = validator.validate(id).unwrap();
        assert_eq!(row_type.fields[0].name, "renamed");
        assert_eq!(row_type.fields[1].name, "column2");
        assert_eq!(row_type.fields[1].data_type, DataType::I32);
    }

    #[test]
    fn inner_join_concatenates_fields() {
        // SELECT name, total FROM users JOIN orders ON users.id = orders.user_id
        let mut validator = Validator::new(create_test_catalog());
        let join = FromClause::join(
            span(20, 40),
            FromClause::table(span(20, 5), "users"),
            FromClause::table(span(31, 6), "orders"),
            JoinType::Inner,
            Some(
                Operator::Equal(
                    Box::new(Expression::qualified_column("users", "id")),
                    Box::new(Expression::qualified_column("orders", "user_id")),
                )
                .into(),
            ),
        );
        let query = Node::select(
            span(0, 60),
            SelectStatement {
                items: vec![
                    (Expression::column("name"), None),
                    (Expression::column("total"), None),
                ],
                from: vec![join],
                filter: None,
            },
        );

        let id = validator.register(query).unwrap();
        let row_type = validator.validate(id).unwrap();
        assert_eq!(
            row_type.fields,
            vec![
                Field::new("name", DataType::Text, false),
                Field::new("total", DataType::Decimal(Some(10), Some(2)), true),
            ]
        );
    }

    #[test]
    fn left_join_makes_right_side_nullable() {
        let mut validator = Validator::new(create_test_catalog());
        let join = FromClause::join(
            span(20, 40),
            FromClause::table(span(20, 5), "users"),
            FromClause::table(span(31, 6), "orders"),
            JoinType::Left,
            None,
        );
        let query = Node::select(
            span(0, 60),
            SelectStatement {
                items: vec![(Expression::column("user_id"), None)],
                from: vec![join],
                filter: None,
            },
        );

        let id = validator.register(query).unwrap();
        let row_type = validator.validate(id).unwrap();
        // orders.user_id is NOT NULL, but the left join may produce no
        // matching order row.
        assert_eq!(
            row_type.fields,
            vec![Field::new("user_id", DataType::I32, true)]
        );
    }

    #[test]
    fn derived_table_resolves_through_alias() {
        // SELECT u.a FROM (SELECT a FROM t) AS u
        let mut validator = Validator::new(create_test_catalog());
        let inner = select_columns(span(15, 15), "t", &["a"]);
        let query = Node::select(
            span(0, 40),
            SelectStatement {
                items: vec![(Expression::qualified_column("u", "a"), None)],
                from: vec![FromClause::derived(span(14, 22), inner, Some("u".to_string()))],
                filter: None,
            },
        );

        let id = validator.register(query).unwrap();
        let row_type = validator.validate(id).unwrap();
        assert_eq!(row_type.fields, vec![Field::new("a", DataType::I32, false)]);
    }

    #[test]
    fn derived_table_requires_alias() {
        let mut validator = Validator::new(create_test_catalog());
        let derived_span = span(14, 22);
        let inner = select_columns(span(15, 15), "t", &["a"]);
        let query = Node::select(
            span(0, 40),
            SelectStatement {
                items: vec![(Expression::column("a"), None)],
                from: vec![FromClause::derived(derived_span, inner, None)],
                filter: None,
            },
        );

        let (kind, error_span) = expect_diagnostic(validator.register(query).unwrap_err());
        assert_eq!(kind, DiagnosticKind::DerivedTableWithoutAlias);
        assert_eq!(error_span, derived_span);
    }

    #[test]
    fn unknown_table() {
        let mut validator = Validator::new(create_test_catalog());
        let table_span = span(14, 7);
        let query = Node::select(
            span(0, 25),
            SelectStatement {
                items: vec![(Expression::column("x"), None)],
                from: vec![FromClause::table(table_span, "nothere")],
                filter: None,
            },
        );

        let id = validator.register(query).unwrap();
        let (kind, error_span) = expect_diagnostic(validator.validate(id).unwrap_err());
        assert_eq!(kind, DiagnosticKind::TableNotFound("nothere".to_string()));
        assert_eq!(error_span, table_span);
    }

    #[test]
    fn unknown_column() {
        let mut validator = Validator::new(create_test_catalog());
        let query = select_columns(span(0, 20), "t", &["missing"]);
        let id = validator.register(query).unwrap();
        let (kind, _) = expect_diagnostic(validator.validate(id).unwrap_err());
        assert_eq!(kind, DiagnosticKind::ColumnNotFound("missing".to_string()));
    }

    #[test]
    fn ambiguous_column_across_sources() {
        // Both users and orders expose an id column.
        let mut validator = Validator::new(create_test_catalog());
        let query = Node::select(
            span(0, 40),
            SelectStatement {
                items: vec![(Expression::column("id"), None)],
                from: vec![
                    FromClause::table(span(15, 5), "users"),
                    FromClause::table(span(22, 6), "orders"),
                ],
                filter: None,
            },
        );

        let id = validator.register(query).unwrap();
        let (kind, _) = expect_diagnostic(validator.validate(id).unwrap_err());
        assert_eq!(kind, DiagnosticKind::AmbiguousColumn("id".to_string()));
    }

    #[test]
    fn qualified_reference_disambiguates() {
        let mut validator = Validator::new(create_test_catalog());
        let query = Node::select(
            span(0, 40),
            SelectStatement {
                items: vec![(Expression::qualified_column("users", "id"), None)],
                from: vec![
                    FromClause::table(span(15, 5), "users"),
                    FromClause::table(span(22, 6), "orders"),
                ],
                filter: None,
            },
        );

        let id = validator.register(query).unwrap();
        let row_type = validator.validate(id).unwrap();
        assert_eq!(row_type.fields, vec![Field::new("id", DataType::I32, false)]);
    }

    #[test]
    fn table_alias_relabels_source() {
        let mut validator = Validator::new(create_test_catalog());
        let query = Node::select(
            span(0, 30),
            SelectStatement {
                items: vec![(Expression::qualified_column("x", "a"), None)],
                from: vec![FromClause::aliased_table(span(14, 6), "t", "x")],
                filter: None,
            },
        );

        let id = validator.register(query).unwrap();
        let row_type = validator.validate(id).unwrap();
        assert_eq!(row_type.fields, vec![Field::new("a", DataType::I32, false)]);
    }

    #[test]
    fn duplicate_source_label() {
        let mut validator = Validator::new(create_test_catalog());
        let dup_span = span(17, 1);
        let query = Node::select(
            span(0, 25),
            SelectStatement {
                items: vec![(Expression::column("a"), None)],
                from: vec![
                    FromClause::table(span(14, 1), "t"),
                    FromClause::table(dup_span, "t"),
                ],
                filter: None,
            },
        );

        let (kind, error_span) = expect_diagnostic(validator.register(query).unwrap_err());
        assert_eq!(kind, DiagnosticKind::DuplicateSourceLabel("t".to_string()));
        assert_eq!(error_span, dup_span);
    }

    #[test]
    fn nesting_depth_is_bounded() {
        let mut validator = Validator::with_max_depth(create_test_catalog(), 3);
        let mut query = select_columns(span(0, 15), "t", &["a"]);
        for i in 0..5u32 {
            query = Node::select(
                span(0, 100 + i),
                SelectStatement {
                    items: vec![(Expression::column("a"), None)],
                    from: vec![FromClause::derived(span(14, 20), query, Some(format!("d{}", i)))],
                    filter: None,
                },
            );
        }

        let (kind, _) = expect_diagnostic(validator.register(query).unwrap_err());
        assert_eq!(kind, DiagnosticKind::NestingTooDeep(3));
    }

    #[test]
    fn failed_namespace_replays_its_error() {
        let mut validator = Validator::new(create_test_catalog());
        let query = select_columns(span(0, 20), "gone", &["x"]);
        let id = validator.register(query).unwrap();

        let first = validator.validate(id).unwrap_err();
        // Even after the table appears, the namespace stays failed for this
        // session.
        validator.catalog.insert(
            "gone".to_string(),
            Table::new("gone", vec![Column::new("x", DataType::I32, false)]),
        );
        let second = validator.validate(id).unwrap_err();
        assert_eq!(first, second);
    }

    #[test]
    fn row_type_before_validation_is_internal() {
        let mut validator = Validator::new(create_test_catalog());
        let query = select_columns(span(0, 15), "t", &["a"]);
        let id = validator.register(query).unwrap();

        let error = validator.row_type(id).unwrap_err();
        assert!(error.is_internal());
    }

    #[test]
    fn set_operation_without_scope_is_internal() {
        let mut validator = Validator::new(create_test_catalog());
        let query = Node::set_op(
            span(0, 40),
            SetOpKind::Union,
            false,
            vec![
                select_columns(span(0, 15), "t", &["a"]),
                select_columns(span(20, 15), "s", &["c"]),
            ],
        );
        let id = validator.register(query).unwrap();

        // Simulate a driver bug: the scope registry this session built is
        // gone by the time validation runs.
        validator.scopes = ScopeRegistry::new();
        let error = validator.validate(id).unwrap_err();
        assert!(error.is_internal());
    }
}
