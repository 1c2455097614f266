// crates/tracker-logic/src/tokenizer.rs
// ============================================================================
// Module: Requirement Tokenizer
// Description: Splits requirement strings into groups, literals, calls, and operators.
// Purpose: First stage of the requirement compiler.
// Dependencies: crate::error
// ============================================================================

//! ## Overview
//! Requirement strings use a small, author-facing syntax:
//!
//! - `|Item Name|` is a primitive literal.
//! - `{Function(arg, arg)}` is a function call, translated here into a
//!   `$Function|arg|arg` primitive.
//! - `( ... )` groups a sub-expression; the group body is kept verbatim and
//!   tokenized again by the parser.
//! - `and` / `or` (any case) are the only operators.
//!
//! Anything else outside a token is a syntax error. Reported positions are
//! byte offsets into the top-level requirement string, including for tokens
//! found inside nested groups.
//!
//! ```
//! use tracker_logic::tokenizer::Token;
//! use tracker_logic::tokenizer::tokenize;
//!
//! let tokens = tokenize("|Sword| and {ItemValue(damage: 5)}").unwrap();
//! assert_eq!(tokens[0].token, Token::Literal("Sword"));
//! assert_eq!(tokens[2].token, Token::Function("$ItemValue|damage|5".to_string()));
//! ```

use crate::error::LogicError;
use crate::error::LogicResult;
use crate::expr::FUNCTION_ARG_SEPARATOR;
use crate::expr::FUNCTION_PREFIX;

// ============================================================================
// SECTION: Function Names
// ============================================================================

/// Function whose single parameter is `category: value`.
pub const ITEM_VALUE_FUNCTION: &str = "ItemValue";
/// Function whose three parameters are separated by whitespace.
pub const YAML_COMPARE_FUNCTION: &str = "YamlCompare";
/// Parameter count required by [`YAML_COMPARE_FUNCTION`].
const YAML_COMPARE_ARITY: usize = 3;

// ============================================================================
// SECTION: Tokens
// ============================================================================

/// Token produced from a requirement string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token<'a> {
    /// Body of a balanced `( ... )` group, without the parentheses.
    Group(&'a str),
    /// Body of a `| ... |` literal, without the pipes.
    Literal(&'a str),
    /// Function call already translated to `$name|arg|...` primitive form.
    Function(String),
    /// `and` operator.
    And,
    /// `or` operator.
    Or,
}

impl Token<'_> {
    /// Returns true for `and` / `or`.
    #[must_use]
    pub const fn is_operator(&self) -> bool {
        matches!(self, Self::And | Self::Or)
    }
}

/// Token paired with its byte offset in the top-level requirement string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpannedToken<'a> {
    /// Token value.
    pub token: Token<'a>,
    /// Byte offset of the token's first character.
    pub position: usize,
}

// ============================================================================
// SECTION: Public API
// ============================================================================

/// Tokenizes a full requirement string.
///
/// # Errors
///
/// Returns [`LogicError`] for unbalanced parentheses, unterminated pipes or
/// braces, malformed function calls, wrong `YamlCompare` arity, and bare text
/// that is not an operator.
pub fn tokenize(rule: &str) -> LogicResult<Vec<SpannedToken<'_>>> {
    Lexer::new(rule, 0, rule.len()).lex()
}

/// Tokenizes the byte range `start..end` of `rule`, keeping absolute offsets.
pub(crate) fn tokenize_range(
    rule: &str,
    start: usize,
    end: usize,
) -> LogicResult<Vec<SpannedToken<'_>>> {
    Lexer::new(rule, start, end).lex()
}

// ============================================================================
// SECTION: Lexer
// ============================================================================

/// Lexer over one byte range of a requirement string.
struct Lexer<'a> {
    /// Full requirement string, used for slicing and diagnostics.
    rule: &'a str,
    /// Current byte offset.
    offset: usize,
    /// Exclusive end of the range being lexed.
    end: usize,
}

impl<'a> Lexer<'a> {
    /// Creates a lexer for `rule[start..end]`.
    const fn new(rule: &'a str, start: usize, end: usize) -> Self {
        Self {
            rule,
            offset: start,
            end,
        }
    }

    /// Lexes the range into tokens.
    fn lex(&mut self) -> LogicResult<Vec<SpannedToken<'a>>> {
        let mut tokens = Vec::new();
        let bytes = self.rule.as_bytes();

        while self.offset < self.end {
            let start = self.offset;
            match bytes[start] {
                b'(' => {
                    let close = self.matching_paren(start)?;
                    tokens.push(SpannedToken {
                        token: Token::Group(&self.rule[start + 1 .. close]),
                        position: start,
                    });
                    self.offset = close + 1;
                }
                b'|' => {
                    let close = self.closing(start, b'|')?;
                    tokens.push(SpannedToken {
                        token: Token::Literal(&self.rule[start + 1 .. close]),
                        position: start,
                    });
                    self.offset = close + 1;
                }
                b'{' => {
                    let close = self.closing(start, b'}')?;
                    let primitive = translate_function(&self.rule[start + 1 .. close], start)?;
                    tokens.push(SpannedToken {
                        token: Token::Function(primitive),
                        position: start,
                    });
                    self.offset = close + 1;
                }
                _ => {
                    if let Some(width) = self.whitespace_at(start) {
                        self.offset += width;
                    } else if self.keyword_at(start, "and") {
                        tokens.push(SpannedToken {
                            token: Token::And,
                            position: start,
                        });
                        self.offset += 3;
                    } else if self.keyword_at(start, "or") {
                        tokens.push(SpannedToken {
                            token: Token::Or,
                            position: start,
                        });
                        self.offset += 2;
                    } else {
                        return Err(LogicError::UnrecognizedSyntax {
                            position: start,
                            rule: self.rule.to_string(),
                        });
                    }
                }
            }
        }
        Ok(tokens)
    }

    /// Returns the byte width of a whitespace character at `position`.
    fn whitespace_at(&self, position: usize) -> Option<usize> {
        self.rule
            .get(position .. self.end)
            .and_then(|rest| rest.chars().next())
            .filter(|ch| ch.is_whitespace())
            .map(char::len_utf8)
    }

    /// Checks for a case-insensitive keyword at `position`.
    fn keyword_at(&self, position: usize, keyword: &str) -> bool {
        let stop = position + keyword.len();
        stop <= self.end
            && self
                .rule
                .get(position .. stop)
                .is_some_and(|text| text.eq_ignore_ascii_case(keyword))
    }

    /// Finds the next `delimiter` after `open`, within the range.
    fn closing(&self, open: usize, delimiter: u8) -> LogicResult<usize> {
        self.rule.as_bytes()[open + 1 .. self.end]
            .iter()
            .position(|&byte| byte == delimiter)
            .map(|index| open + 1 + index)
            .ok_or_else(|| self.unterminated(open, delimiter))
    }

    /// Finds the `)` balancing the `(` at `open`.
    ///
    /// Pipe literals and brace calls inside the group are skipped whole, so
    /// parentheses inside item names or call parameters do not count.
    fn matching_paren(&self, open: usize) -> LogicResult<usize> {
        let bytes = self.rule.as_bytes();
        let mut depth = 1usize;
        let mut index = open + 1;
        while index < self.end {
            match bytes[index] {
                b'(' => depth += 1,
                b')' => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(index);
                    }
                }
                b'|' => index = self.closing(index, b'|')?,
                b'{' => index = self.closing(index, b'}')?,
                _ => {}
            }
            index += 1;
        }
        Err(LogicError::UnbalancedParenthesis {
            position: open,
            rule: self.rule.to_string(),
        })
    }

    /// Builds the unterminated-delimiter error for `open`.
    fn unterminated(&self, open: usize, delimiter: u8) -> LogicError {
        let rule = self.rule.to_string();
        if delimiter == b'|' {
            LogicError::UnterminatedPipe {
                position: open,
                rule,
            }
        } else {
            LogicError::UnterminatedBrace {
                position: open,
                rule,
            }
        }
    }
}

// ============================================================================
// SECTION: Function Translation
// ============================================================================

/// Translates a `{...}` body into `$name|param|...` primitive form.
///
/// The delimiter rule depends on the function name: `ItemValue` splits once on
/// `:`, `YamlCompare` splits on whitespace into exactly three parameters, and
/// everything else splits on `,`.
fn translate_function(body: &str, position: usize) -> LogicResult<String> {
    let (name, params) = match body.find('(') {
        None => (body.trim(), ""),
        Some(open) => {
            let close = body.rfind(')').filter(|&close| close > open).ok_or_else(|| {
                LogicError::MalformedFunction {
                    token: body.to_string(),
                    position,
                }
            })?;
            (body[.. open].trim(), &body[open + 1 .. close])
        }
    };

    let mut primitive = format!("{FUNCTION_PREFIX}{name}");
    if params.trim().is_empty() {
        return Ok(primitive);
    }

    let mut push = |param: &str| {
        primitive.push(FUNCTION_ARG_SEPARATOR);
        primitive.push_str(param);
    };
    match name {
        ITEM_VALUE_FUNCTION => {
            let (category, target) = params.split_once(':').unwrap_or((params, ""));
            push(category.trim());
            push(target.trim());
        }
        YAML_COMPARE_FUNCTION => {
            let parts: Vec<&str> = params.split_whitespace().collect();
            if parts.len() != YAML_COMPARE_ARITY {
                return Err(LogicError::FunctionArity {
                    function: name.to_string(),
                    expected: YAML_COMPARE_ARITY,
                    found: parts.len(),
                    params: params.to_string(),
                });
            }
            for part in parts {
                push(part);
            }
        }
        _ => {
            for param in params.split(',') {
                push(param.trim());
            }
        }
    }
    Ok(primitive)
}
