// crates/tracker-logic/src/parser.rs
// ============================================================================
// Module: Requirement Parser
// Description: Builds AND/OR expression trees from requirement tokens.
// Purpose: Second stage of the requirement compiler.
// Dependencies: crate::{error, expr, limits, tokenizer}
// ============================================================================

//! ## Overview
//! Precedence is `or` < `and`: a token list is split on every `or` first, and
//! only a list with no `or` is split on `and`. Parenthesized groups are
//! tokenized and parsed recursively, bounded by
//! [`CompileLimits::max_nesting`].
//!
//! ```
//! use tracker_logic::CompileLimits;
//! use tracker_logic::Expr;
//! use tracker_logic::parser::parse_requirement;
//!
//! let expr = parse_requirement("|A| and (|B| or |C|)", &CompileLimits::default()).unwrap();
//! let expected = Expr::and(vec![
//!     Expr::primitive("A"),
//!     Expr::or(vec![Expr::primitive("B"), Expr::primitive("C")]),
//! ]);
//! assert_eq!(expr, expected);
//! ```

use crate::error::LogicError;
use crate::error::LogicResult;
use crate::expr::Expr;
use crate::limits::CompileLimits;
use crate::tokenizer::SpannedToken;
use crate::tokenizer::Token;
use crate::tokenizer::tokenize_range;

// ============================================================================
// SECTION: Public API
// ============================================================================

/// Tokenizes and parses a requirement string.
///
/// # Errors
///
/// Returns [`LogicError`] for empty or oversized input, any tokenizer error,
/// operands without an operator, operators without operands, and nesting
/// beyond the configured limit.
pub fn parse_requirement(rule: &str, limits: &CompileLimits) -> LogicResult<Expr> {
    if rule.len() > limits.max_input_bytes {
        return Err(LogicError::InputTooLarge {
            max_bytes: limits.max_input_bytes,
            actual_bytes: rule.len(),
        });
    }
    if rule.trim().is_empty() {
        return Err(LogicError::EmptyInput);
    }
    Parser::new(rule, limits).parse_range(0, rule.len(), 0)
}

/// Parses tokens previously produced by [`tokenize`] over `rule`.
///
/// `rule` must be the string the tokens were produced from; group tokens are
/// re-tokenized from it.
///
/// # Errors
///
/// Returns [`LogicError`] under the same conditions as [`parse_requirement`].
///
/// [`tokenize`]: crate::tokenizer::tokenize
pub fn parse_tokens<'a>(
    rule: &'a str,
    tokens: &[SpannedToken<'a>],
    limits: &CompileLimits,
) -> LogicResult<Expr> {
    if tokens.is_empty() {
        return Err(LogicError::EmptyInput);
    }
    Parser::new(rule, limits).parse_tokens(tokens, 0)
}

// ============================================================================
// SECTION: Connectives
// ============================================================================

/// Binary connective used to split a token list.
#[derive(Debug, Clone, Copy)]
enum Connective {
    /// Split on `and`.
    And,
    /// Split on `or`.
    Or,
}

impl Connective {
    /// Returns true when `token` is this connective's operator.
    const fn matches(self, token: &Token<'_>) -> bool {
        matches!((self, token), (Self::And, Token::And) | (Self::Or, Token::Or))
    }

    /// Operator keyword for diagnostics.
    const fn keyword(self) -> &'static str {
        match self {
            Self::And => "and",
            Self::Or => "or",
        }
    }

    /// Wraps parsed operands in the matching node.
    fn build(self, operands: Vec<Expr>) -> Expr {
        match self {
            Self::And => Expr::and(operands),
            Self::Or => Expr::or(operands),
        }
    }
}

// ============================================================================
// SECTION: Parser
// ============================================================================

/// Recursive parser over one requirement string.
struct Parser<'a> {
    /// Full requirement string.
    rule: &'a str,
    /// Resource limits.
    limits: &'a CompileLimits,
}

impl<'a> Parser<'a> {
    /// Creates a parser for `rule`.
    const fn new(rule: &'a str, limits: &'a CompileLimits) -> Self {
        Self {
            rule,
            limits,
        }
    }

    /// Tokenizes and parses `rule[start..end]` at the given nesting depth.
    fn parse_range(&self, start: usize, end: usize, depth: usize) -> LogicResult<Expr> {
        if depth > self.limits.max_nesting {
            return Err(LogicError::NestingTooDeep {
                max_depth: self.limits.max_nesting,
                actual_depth: depth,
            });
        }
        let tokens = tokenize_range(self.rule, start, end)?;
        self.parse_tokens(&tokens, depth)
    }

    /// Parses a non-empty token list.
    fn parse_tokens(&self, tokens: &[SpannedToken<'a>], depth: usize) -> LogicResult<Expr> {
        if let [single] = tokens {
            if !single.token.is_operator() {
                return self.parse_operand(single, depth);
            }
        }
        if tokens.iter().any(|token| Connective::Or.matches(&token.token)) {
            return self.parse_connective(tokens, Connective::Or, depth);
        }
        if tokens.iter().any(|token| Connective::And.matches(&token.token)) {
            return self.parse_connective(tokens, Connective::And, depth);
        }
        match tokens.get(1) {
            Some(second) => Err(LogicError::MissingOperator {
                position: second.position,
            }),
            None => Err(LogicError::EmptyInput),
        }
    }

    /// Splits on every occurrence of `connective` and parses each segment.
    fn parse_connective(
        &self,
        tokens: &[SpannedToken<'a>],
        connective: Connective,
        depth: usize,
    ) -> LogicResult<Expr> {
        let mut operands = Vec::new();
        let mut segment_start = 0;
        for (index, token) in tokens.iter().enumerate() {
            if connective.matches(&token.token) {
                operands.push(self.parse_segment(
                    &tokens[segment_start .. index],
                    connective,
                    token.position,
                    depth,
                )?);
                segment_start = index + 1;
            }
        }
        let last_operator = tokens[segment_start - 1].position;
        operands.push(self.parse_segment(
            &tokens[segment_start ..],
            connective,
            last_operator,
            depth,
        )?);
        Ok(connective.build(operands))
    }

    /// Parses one operand segment, rejecting empty segments.
    fn parse_segment(
        &self,
        segment: &[SpannedToken<'a>],
        connective: Connective,
        operator_position: usize,
        depth: usize,
    ) -> LogicResult<Expr> {
        if segment.is_empty() {
            return Err(LogicError::EmptyOperand {
                operator: connective.keyword(),
                position: operator_position,
            });
        }
        self.parse_tokens(segment, depth)
    }

    /// Parses a single non-operator token.
    fn parse_operand(&self, token: &SpannedToken<'a>, depth: usize) -> LogicResult<Expr> {
        match &token.token {
            Token::Literal(value) => Ok(Expr::primitive(*value)),
            Token::Function(primitive) => Ok(Expr::primitive(primitive.clone())),
            Token::Group(body) => {
                if body.trim().is_empty() {
                    return Err(LogicError::EmptyGroup {
                        position: token.position,
                    });
                }
                let start = token.position + 1;
                self.parse_range(start, start + body.len(), depth + 1)
            }
            Token::And | Token::Or => Err(LogicError::EmptyOperand {
                operator: if matches!(token.token, Token::And) { "and" } else { "or" },
                position: token.position,
            }),
        }
    }
}
