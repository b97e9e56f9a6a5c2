//! Binary configuration queries.
//!
//! A small boolean language evaluated against a package's stored settings
//! and options:
//!
//! ```text
//! os=Windows AND (arch=x86 OR compiler=gcc)
//! ```
//!
//! Precedence is parentheses, then `AND`, then `OR`. There is no negation.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::PkgReference;

/// Error parsing a configuration query.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("invalid package query `{query}`: {reason}")]
    InvalidSyntax { query: String, reason: String },
}

/// The stored configuration of one package binary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageConfiguration {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub settings: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub options: BTreeMap<String, String>,
}

impl PackageConfiguration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_setting(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.settings.insert(key.into(), value.into());
        self
    }

    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    /// Look up a query key.
    ///
    /// `options.X` and `settings.X` address one table; a bare key is looked
    /// up in settings first, then options.
    pub fn get(&self, key: &str) -> Option<&str> {
        if let Some(option) = key.strip_prefix("options.") {
            return self.options.get(option).map(String::as_str);
        }
        if let Some(setting) = key.strip_prefix("settings.") {
            return self.settings.get(setting).map(String::as_str);
        }
        self.settings
            .get(key)
            .or_else(|| self.options.get(key))
            .map(String::as_str)
    }
}

/// Package references paired with their configuration, in backend order.
pub type PackageConfigurations = Vec<(PkgReference, PackageConfiguration)>;

/// Parsed expression tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryExpr {
    /// `key=value`
    Term { key: String, value: String },
    And(Box<QueryExpr>, Box<QueryExpr>),
    Or(Box<QueryExpr>, Box<QueryExpr>),
}

impl QueryExpr {
    /// Evaluate against one configuration. An absent key never matches.
    pub fn evaluate(&self, config: &PackageConfiguration) -> bool {
        match self {
            QueryExpr::Term { key, value } => config.get(key) == Some(value.as_str()),
            QueryExpr::And(a, b) => a.evaluate(config) && b.evaluate(config),
            QueryExpr::Or(a, b) => a.evaluate(config) || b.evaluate(config),
        }
    }
}

impl fmt::Display for QueryExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryExpr::Term { key, value } if value.contains(' ') => {
                write!(f, "{}=\"{}\"", key, value)
            }
            QueryExpr::Term { key, value } => write!(f, "{}={}", key, value),
            QueryExpr::And(a, b) => write!(f, "({} AND {})", a, b),
            QueryExpr::Or(a, b) => write!(f, "({} OR {})", a, b),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    LParen,
    RParen,
    And,
    Or,
    Term(String, String),
}

fn tokenize(query: &str) -> Result<Vec<Token>, String> {
    let mut tokens = Vec::new();
    let mut chars = query.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '(' => {
                chars.next();
                tokens.push(Token::LParen);
            }
            ')' => {
                chars.next();
                tokens.push(Token::RParen);
            }
            _ => {
                let mut word = String::new();
                let mut in_quotes = false;
                while let Some(&c) = chars.peek() {
                    if c == '"' {
                        in_quotes = !in_quotes;
                        chars.next();
                        continue;
                    }
                    if !in_quotes && (c.is_whitespace() || c == '(' || c == ')') {
                        break;
                    }
                    word.push(c);
                    chars.next();
                }
                if in_quotes {
                    return Err("unterminated quote".to_string());
                }

                if word.eq_ignore_ascii_case("and") {
                    tokens.push(Token::And);
                } else if word.eq_ignore_ascii_case("or") {
                    tokens.push(Token::Or);
                } else {
                    let (key, value) = word
                        .split_once('=')
                        .ok_or_else(|| format!("expected key=value, found `{}`", word))?;
                    if key.is_empty() {
                        return Err(format!("missing key in `{}`", word));
                    }
                    tokens.push(Token::Term(key.to_string(), value.to_string()));
                }
            }
        }
    }

    Ok(tokens)
}

/// Recursive-descent parser over the token stream.
struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    // expr := and_expr (OR and_expr)*
    fn expr(&mut self) -> Result<QueryExpr, String> {
        let mut left = self.and_expr()?;
        while self.peek() == Some(&Token::Or) {
            self.next();
            let right = self.and_expr()?;
            left = QueryExpr::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    // and_expr := factor (AND factor)*
    fn and_expr(&mut self) -> Result<QueryExpr, String> {
        let mut left = self.factor()?;
        while self.peek() == Some(&Token::And) {
            self.next();
            let right = self.factor()?;
            left = QueryExpr::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    // factor := '(' expr ')' | key=value
    fn factor(&mut self) -> Result<QueryExpr, String> {
        match self.next() {
            Some(Token::LParen) => {
                let inner = self.expr()?;
                match self.next() {
                    Some(Token::RParen) => Ok(inner),
                    _ => Err("unbalanced parentheses".to_string()),
                }
            }
            Some(Token::Term(key, value)) => Ok(QueryExpr::Term { key, value }),
            Some(Token::RParen) => Err("unexpected `)`".to_string()),
            Some(Token::And) | Some(Token::Or) => Err("missing operand".to_string()),
            None => Err("missing operand at end of query".to_string()),
        }
    }
}

/// A parsed configuration query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigQuery {
    raw: String,
    expr: Option<QueryExpr>,
}

impl ConfigQuery {
    /// Parse a query. A blank query matches every configuration.
    pub fn parse(query: &str) -> Result<Self, QueryError> {
        let invalid = |reason: String| QueryError::InvalidSyntax {
            query: query.to_string(),
            reason,
        };

        let tokens = tokenize(query).map_err(invalid)?;
        if tokens.is_empty() {
            return Ok(ConfigQuery {
                raw: query.to_string(),
                expr: None,
            });
        }

        let mut parser = Parser { tokens, pos: 0 };
        let expr = parser.expr().map_err(invalid)?;
        if parser.pos < parser.tokens.len() {
            let reason = match parser.peek() {
                Some(Token::RParen) => "unbalanced parentheses".to_string(),
                _ => "expected AND or OR between terms".to_string(),
            };
            return Err(invalid(reason));
        }

        Ok(ConfigQuery {
            raw: query.to_string(),
            expr: Some(expr),
        })
    }

    /// The query as written.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// The parsed expression, if the query was not blank.
    pub fn expr(&self) -> Option<&QueryExpr> {
        self.expr.as_ref()
    }

    /// Whether a configuration satisfies the query.
    pub fn matches(&self, config: &PackageConfiguration) -> bool {
        self.expr.as_ref().is_none_or(|e| e.evaluate(config))
    }

    /// Keep the packages whose configuration satisfies the query.
    pub fn filter(&self, packages: PackageConfigurations) -> PackageConfigurations {
        packages
            .into_iter()
            .filter(|(_, config)| self.matches(config))
            .collect()
    }
}

/// Filter package configurations by a query string.
pub fn filter_packages(
    query: &str,
    packages: PackageConfigurations,
) -> Result<PackageConfigurations, QueryError> {
    Ok(ConfigQuery::parse(query)?.filter(packages))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::RecipeReference;

    fn packages() -> PackageConfigurations {
        let rrev = RecipeReference::parse("zlib/1.2.13#r1").unwrap();
        vec![
            (
                PkgReference::new(rrev.clone(), "A"),
                PackageConfiguration::new()
                    .with_setting("os", "Windows")
                    .with_setting("arch", "x86"),
            ),
            (
                PkgReference::new(rrev.clone(), "B"),
                PackageConfiguration::new()
                    .with_setting("os", "Linux")
                    .with_setting("arch", "x86")
                    .with_option("shared", "True"),
            ),
            (
                PkgReference::new(rrev, "C"),
                PackageConfiguration::new()
                    .with_setting("os", "Linux")
                    .with_setting("compiler", "Visual Studio"),
            ),
        ]
    }

    fn ids(packages: &PackageConfigurations) -> Vec<&str> {
        packages.iter().map(|(p, _)| p.package_id()).collect()
    }

    #[test]
    fn test_and_or() {
        let result = filter_packages("os=Windows AND arch=x86", packages()).unwrap();
        assert_eq!(ids(&result), vec!["A"]);

        let result = filter_packages("os=Windows OR arch=x86", packages()).unwrap();
        assert_eq!(ids(&result), vec!["A", "B"]);
    }

    #[test]
    fn test_precedence() {
        // AND binds tighter: os=Linux OR (os=Windows AND arch=arm)
        let result = filter_packages("os=Linux OR os=Windows AND arch=arm", packages()).unwrap();
        assert_eq!(ids(&result), vec!["B", "C"]);

        let result =
            filter_packages("(os=Linux OR os=Windows) AND arch=x86", packages()).unwrap();
        assert_eq!(ids(&result), vec!["A", "B"]);
    }

    #[test]
    fn test_options_and_quotes() {
        let result = filter_packages("options.shared=True", packages()).unwrap();
        assert_eq!(ids(&result), vec!["B"]);

        let result = filter_packages("shared=True", packages()).unwrap();
        assert_eq!(ids(&result), vec!["B"]);

        let result = filter_packages("compiler=\"Visual Studio\"", packages()).unwrap();
        assert_eq!(ids(&result), vec!["C"]);
    }

    #[test]
    fn test_absent_key_never_matches() {
        let result = filter_packages("build_type=Release OR compiler=gcc", packages()).unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_blank_query_matches_all() {
        assert_eq!(filter_packages("  ", packages()).unwrap().len(), 3);
    }

    #[test]
    fn test_keywords_case_insensitive() {
        let result = filter_packages("os=Windows or os=Linux and arch=x86", packages()).unwrap();
        assert_eq!(ids(&result), vec!["A", "B"]);
    }

    #[test]
    fn test_syntax_errors() {
        for query in [
            "(os=Windows",
            "os=Windows)",
            "os=Windows AND",
            "AND os=Windows",
            "os=Windows arch=x86",
            "os",
            "=Windows",
            "os=\"Windows",
            "()",
        ] {
            let err = ConfigQuery::parse(query).unwrap_err();
            assert!(matches!(err, QueryError::InvalidSyntax { .. }), "{}", query);
        }
    }

    #[test]
    fn test_expression_tree() {
        let q = ConfigQuery::parse("os=Windows AND (arch=x86 OR compiler=gcc)").unwrap();
        assert_eq!(
            q.expr().unwrap().to_string(),
            "(os=Windows AND (arch=x86 OR compiler=gcc))"
        );
    }
}
