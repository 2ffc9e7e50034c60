//! Trait Compliance Tests for FilterExpressionConverter
//!
//! **CRITICAL TESTS**: These tests verify that ALL backend implementations of the
//! `FilterExpressionConverter` trait behave consistently on the same inputs.
//!
//! These tests ensure:
//! 1. Every backend converts every tree its operator table allows
//! 2. Conversion is deterministic
//! 3. Emitted fragments are structurally well formed
//! 4. Invalid trees fail on every backend with the same error kind
//! 5. The opt-in rewrites preserve meaning
//!
//! ## Testing Approach
//!
//! Trees are generated from fixed seeds with `fastrand`, so every run
//! covers the same cases and a failure names a reproducible tree.

mod common;
use common::*;
use vector_filter::core_types::rewrite::{expand_membership, negate, rewrite_negations};
use vector_filter::{
    ComparisonOperator, Expression, ExpressionType, FilterError, FilterExpressionConverter, Value,
};

const SEEDS: u64 = 200;
const MAX_DEPTH: usize = 6;

// ============================================================================
// Conversion Tests
// ============================================================================

#[cfg(test)]
mod conversion_tests {
    use super::*;

    #[test]
    fn test_all_backends_convert_supported_random_trees() {
        // Test verifies no backend fails on a tree built only from operators it supports

        for backend in ALL_BACKENDS {
            let converter = create_converter(backend);
            let table = converter.operator_table().clone();
            let supports = |operator: ExpressionType| table.supports(operator);

            for seed in 0..SEEDS {
                // Arrange
                let mut rng = fastrand::Rng::with_seed(seed);
                let tree = random_tree(&mut rng, MAX_DEPTH, Literals::Mixed, &supports);

                // Act
                let fragment = convert_ok(&converter, &tree);

                // Assert
                assert!(!fragment.is_empty(), "{backend} emitted nothing for {tree:?}");
                assert!(
                    brackets_balanced(&fragment),
                    "{backend} emitted unbalanced fragment {fragment} for {tree:?}"
                );
            }
        }
    }

    #[test]
    fn test_conversion_is_deterministic() {
        for backend in ALL_BACKENDS {
            let converter = create_converter(backend);
            let table = converter.operator_table().clone();
            let supports = |operator: ExpressionType| table.supports(operator);

            for seed in 0..SEEDS {
                // Arrange
                let tree = random_tree(
                    &mut fastrand::Rng::with_seed(seed),
                    MAX_DEPTH,
                    Literals::Mixed,
                    &supports,
                );

                // Act
                let first = convert_ok(&converter, &tree);
                let second = convert_ok(&converter, &tree.clone());

                // Assert
                assert_eq!(first, second, "{backend} is not deterministic");
            }
        }
    }

    #[test]
    fn test_mongodb_fragments_are_json_documents() {
        // Arrange
        let converter = create_converter("mongodb");
        let table = converter.operator_table().clone();
        let supports = |operator: ExpressionType| table.supports(operator);

        for seed in 0..SEEDS {
            let tree = random_tree(
                &mut fastrand::Rng::with_seed(seed),
                MAX_DEPTH,
                Literals::Mixed,
                &supports,
            );

            // Act
            let fragment = convert_ok(&converter, &tree);

            // Assert
            let parsed: serde_json::Value = serde_json::from_str(&fragment)
                .unwrap_or_else(|e| panic!("invalid JSON {fragment}: {e}"));
            assert!(parsed.is_object());
        }
    }

    #[test]
    fn test_sql_quotes_are_balanced() {
        // Arrange
        let converter = create_converter("sql");
        let supports = |_: ExpressionType| true;

        for seed in 0..SEEDS {
            let tree = random_tree(
                &mut fastrand::Rng::with_seed(seed),
                MAX_DEPTH,
                Literals::Mixed,
                &supports,
            );

            // Act
            let fragment = convert_ok(&converter, &tree);

            // Assert
            assert_eq!(fragment.matches('\'').count() % 2, 0, "{fragment}");
        }
    }
}

// ============================================================================
// Error Handling Tests
// ============================================================================

#[cfg(test)]
mod error_handling_tests {
    use super::*;

    #[test]
    fn test_invalid_leaf_fails_on_every_backend() {
        // Test verifies validation covers the whole tree before anything is written

        // Arrange
        let supports = |operator: ExpressionType| {
            !matches!(operator, ExpressionType::Not | ExpressionType::Nin)
        };
        let invalid = Expression::comparison(ComparisonOperator::In, "genre", Value::Int(1));

        for seed in 0..SEEDS {
            let valid = random_tree(
                &mut fastrand::Rng::with_seed(seed),
                MAX_DEPTH - 1,
                Literals::Mixed,
                &supports,
            );
            let tree = if seed % 2 == 0 {
                Expression::and(valid, invalid.clone())
            } else {
                Expression::or(invalid.clone(), valid)
            };

            for backend in ALL_BACKENDS {
                // Act
                let result = create_converter(backend).convert_expression(Some(&tree));

                // Assert
                assert!(
                    matches!(result, Err(FilterError::MalformedExpression { .. })),
                    "{backend} returned {result:?}"
                );
            }
        }
    }

    #[test]
    fn test_unsupported_operator_names_backend() {
        // Arrange
        let cases = [
            ("mongodb", Expression::not(Expression::eq("a", 1)), ExpressionType::Not),
            ("weaviate", Expression::not(Expression::eq("a", 1)), ExpressionType::Not),
            ("weaviate", Expression::not_in("a", [1]), ExpressionType::Nin),
        ];

        for (backend, tree, operator) in cases {
            // Act
            let result = create_converter(backend).convert_expression(Some(&tree));

            // Assert
            assert_eq!(
                result,
                Err(FilterError::UnsupportedOperator {
                    operator,
                    backend: backend.to_string(),
                })
            );
        }
    }
}

// ============================================================================
// Rewrite Semantics Tests
// ============================================================================

#[cfg(test)]
mod rewrite_semantics_tests {
    use super::*;

    #[test]
    fn test_rewrites_preserve_meaning_on_random_documents() {
        // Test verifies negation push-down and membership expansion never change results

        let supports = |_: ExpressionType| true;

        for seed in 0..SEEDS {
            // Arrange
            let mut rng = fastrand::Rng::with_seed(seed);
            let tree = random_tree(&mut rng, MAX_DEPTH, Literals::Integers, &supports);
            let without_not = rewrite_negations(&tree);
            let expanded = expand_membership(&tree).unwrap();
            let complement = negate(&tree);

            for _ in 0..10 {
                let document = random_document(&mut rng);

                // Act
                let expected = evaluate(&tree, &document);

                // Assert
                assert_eq!(evaluate(&without_not, &document), expected, "{tree:?}");
                assert_eq!(evaluate(&expanded, &document), expected, "{tree:?}");
                assert_eq!(evaluate(&complement, &document), !expected, "{tree:?}");
            }
            assert!(!without_not.contains(ExpressionType::Not));
            assert!(!expanded.contains(ExpressionType::In));
            assert!(!expanded.contains(ExpressionType::Nin));
        }
    }

    #[test]
    fn test_fully_rewriting_weaviate_accepts_every_tree() {
        // Arrange
        let config = vector_filter::FilterConfig {
            backend: Box::new(vector_filter::WeaviateConfig {
                rewrite_negation: true,
                expand_membership: true,
                ..vector_filter::WeaviateConfig::default()
            }),
        };
        let converter = vector_filter::UnifiedFilterConverter::from_config(&config).unwrap();
        let supports = |_: ExpressionType| true;

        for seed in 0..SEEDS {
            let tree = random_tree(
                &mut fastrand::Rng::with_seed(seed),
                MAX_DEPTH,
                Literals::Mixed,
                &supports,
            );

            // Act
            let fragment = convert_ok(&converter, &tree);

            // Assert
            assert!(brackets_balanced(&fragment), "{fragment}");
            assert!(!fragment.contains("ContainsAny"));
        }
    }
}
