// Unit Tests for the Converter Trait and Shared Validation
//
// UNIT UNDER TEST: OperatorTable, FilterExpressionConverter default methods
//
// BUSINESS RESPONSIBILITY:
//   - Rejects broken operator tables when a converter is built
//   - Validates the whole tree before any text is emitted
//   - Applies the same well-typedness rules on every backend
//
// TEST COVERAGE:
//   - Operator table construction and lookup
//   - Depth limit
//   - List/scalar rules, empty lists, empty keys, non-finite floats
//   - Validation order against unsupported operators

use crate::core_types::converter::{FilterExpressionConverter, OperatorTable, MAX_EXPRESSION_DEPTH};
use crate::core_types::expression::{ComparisonOperator, Expression, ExpressionType, Value};
use crate::error::FilterError;
use crate::tests::helpers::{create_test_config, ALL_BACKENDS};
use crate::UnifiedFilterConverter;

fn converter_for(backend: &str) -> UnifiedFilterConverter {
    UnifiedFilterConverter::from_config(&create_test_config(backend)).unwrap()
}

/// Left-leaning AND chain with `depth` levels
fn deep_and_chain(depth: usize) -> Expression {
    (1..depth).fold(Expression::eq("k", 0), |acc, i| {
        Expression::and(acc, Expression::eq("k", i as i64))
    })
}

#[cfg(test)]
mod operator_table_tests {
    use super::*;

    #[test]
    fn test_lookup_and_support() {
        // Arrange
        let table = OperatorTable::new(
            "test",
            &[
                (ExpressionType::And, "&&"),
                (ExpressionType::Or, "||"),
                (ExpressionType::Eq, "=="),
            ],
        )
        .unwrap();

        // Act & Assert
        assert_eq!(table.backend(), "test");
        assert_eq!(table.symbol(ExpressionType::Or).unwrap(), "||");
        assert!(table.supports(ExpressionType::Eq));
        assert!(!table.supports(ExpressionType::Gt));
        assert_eq!(table.supported_operators().count(), 3);
        assert_eq!(
            table.symbol(ExpressionType::Gt),
            Err(FilterError::UnsupportedOperator {
                operator: ExpressionType::Gt,
                backend: "test".to_string(),
            })
        );
    }

    #[test]
    fn test_duplicate_entries_are_rejected() {
        // Arrange & Act
        let result = OperatorTable::new(
            "test",
            &[
                (ExpressionType::And, "&&"),
                (ExpressionType::Or, "||"),
                (ExpressionType::Eq, "=="),
                (ExpressionType::Eq, "="),
            ],
        );

        // Assert
        assert!(matches!(
            result,
            Err(FilterError::InvalidOperatorTable { .. })
        ));
    }

    #[test]
    fn test_missing_required_operator_is_rejected() {
        // Arrange & Act
        let result = OperatorTable::new(
            "test",
            &[(ExpressionType::And, "&&"), (ExpressionType::Eq, "==")],
        );

        // Assert
        match result {
            Err(FilterError::InvalidOperatorTable { backend, message }) => {
                assert_eq!(backend, "test");
                assert!(message.contains("OR"));
            }
            other => panic!("expected invalid table, got {other:?}"),
        }
    }

    #[test]
    fn test_every_backend_supports_required_operators() {
        for backend in ALL_BACKENDS {
            let table = converter_for(backend).operator_table().clone();
            for operator in [ExpressionType::And, ExpressionType::Or, ExpressionType::Eq] {
                assert!(table.supports(operator), "{backend} lacks {operator}");
            }
        }
    }
}

#[cfg(test)]
mod validation_tests {
    use super::*;

    #[test]
    fn test_depth_limit_is_enforced() {
        // Arrange
        let at_limit = deep_and_chain(MAX_EXPRESSION_DEPTH);
        let too_deep = deep_and_chain(MAX_EXPRESSION_DEPTH + 1);

        for backend in ALL_BACKENDS {
            let converter = converter_for(backend);

            // Act & Assert
            assert!(converter.convert_expression(Some(&at_limit)).is_ok());
            assert!(matches!(
                converter.convert_expression(Some(&too_deep)),
                Err(FilterError::MalformedExpression { .. })
            ));
        }
    }

    #[test]
    fn test_list_value_rules() {
        // Arrange
        let scalar_in = Expression::comparison(ComparisonOperator::In, "a", 1);
        let list_eq = Expression::comparison(ComparisonOperator::Eq, "a", vec![1, 2]);
        let empty_in = Expression::comparison(ComparisonOperator::In, "a", Value::List(Vec::new()));
        let nested = Expression::comparison(
            ComparisonOperator::Nin,
            "a",
            Value::List(vec![Value::List(vec![Value::Int(1)])]),
        );

        for backend in ALL_BACKENDS {
            let converter = converter_for(backend);
            for filter in [&scalar_in, &list_eq, &empty_in, &nested] {
                // Act
                let result = converter.validate(filter);

                // Assert
                assert!(
                    matches!(result, Err(FilterError::MalformedExpression { .. })),
                    "{backend} accepted {filter:?}"
                );
            }
        }
    }

    #[test]
    fn test_empty_key_and_non_finite_float_are_rejected() {
        // Arrange
        let empty_key = Expression::eq("''", 1);
        let nan = Expression::gt("score", f64::NAN);
        let infinite = Expression::is_in("score", [1.0, f64::INFINITY]);

        for backend in ALL_BACKENDS {
            let converter = converter_for(backend);
            for filter in [&empty_key, &nan, &infinite] {
                // Act & Assert
                assert!(matches!(
                    converter.convert_expression(Some(filter)),
                    Err(FilterError::MalformedExpression { .. })
                ));
            }
        }
    }

    #[test]
    fn test_unsupported_operator_reported_before_later_siblings() {
        // Test verifies the walk stops at the first unsupported node in pre-order

        // Arrange
        let filter = Expression::and(
            Expression::not(Expression::eq("a", 1)),
            Expression::comparison(ComparisonOperator::In, "b", 2),
        );

        // Act
        let result = converter_for("mongodb").convert_expression(Some(&filter));

        // Assert
        assert!(matches!(
            result,
            Err(FilterError::UnsupportedOperator {
                operator: ExpressionType::Not,
                ..
            })
        ));
    }

    #[test]
    fn test_match_all_tokens() {
        // Arrange
        let expected = [
            ("mongodb", "{}"),
            ("elasticsearch", "*"),
            ("sql", "1 = 1"),
            ("weaviate", ""),
        ];

        for (backend, token) in expected {
            // Act & Assert
            assert_eq!(converter_for(backend).convert_expression(None).unwrap(), token);
        }
    }
}
