use std::fmt::{Display, Formatter};

use solvane_core::{AppError, AppResult};

use crate::literal::ExpressionLiteral;

/// Prefix logical operator in a domain expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DomainOperator {
    /// Both following terms must match.
    And,
    /// Either following term may match.
    Or,
    /// The following term must not match.
    Not,
}

impl DomainOperator {
    /// Returns the operator symbol used inside domain list text.
    #[must_use]
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::And => "&",
            Self::Or => "|",
            Self::Not => "!",
        }
    }
}

/// One term of a domain expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainTerm {
    /// Prefix logical operator token.
    Operator(DomainOperator),
    /// Condition tuple or other element, kept as canonical source text.
    Condition(String),
}

/// An ordered prefix-notation filter over condition tuples.
///
/// Parsed from and serialized to the literal list text embedded in view
/// `domain` attributes, e.g. `['&', ('state', '=', 'confirm'), ...]`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DomainExpression {
    terms: Vec<DomainTerm>,
}

impl DomainExpression {
    /// Returns the empty domain, which matches everything.
    #[must_use]
    pub fn empty() -> Self {
        Self { terms: Vec::new() }
    }

    /// Parses domain list text into terms.
    pub fn parse(text: &str) -> AppResult<Self> {
        let ExpressionLiteral::List(items) = ExpressionLiteral::parse(text)? else {
            return Err(AppError::Validation(
                "domain expression must be a list literal".to_owned(),
            ));
        };

        let terms = items
            .into_iter()
            .map(|item| match item.as_str() {
                "'&'" => DomainTerm::Operator(DomainOperator::And),
                "'|'" => DomainTerm::Operator(DomainOperator::Or),
                "'!'" => DomainTerm::Operator(DomainOperator::Not),
                _ => DomainTerm::Condition(item),
            })
            .collect();

        Ok(Self { terms })
    }

    /// Returns the terms in order.
    #[must_use]
    pub fn terms(&self) -> &[DomainTerm] {
        &self.terms
    }

    /// Returns whether the domain has no terms.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Combines two domains under logical AND.
    ///
    /// Both non-empty yields `['&'] + left + right`; an empty side passes
    /// the other through unchanged.
    #[must_use]
    pub fn and(left: Self, right: Self) -> Self {
        if left.terms.is_empty() {
            return right;
        }
        if right.terms.is_empty() {
            return left;
        }

        let mut terms = Vec::with_capacity(left.terms.len() + right.terms.len() + 1);
        terms.push(DomainTerm::Operator(DomainOperator::And));
        terms.extend(left.terms);
        terms.extend(right.terms);

        Self { terms }
    }

    /// Serializes the domain back to canonical list text.
    #[must_use]
    pub fn to_source(&self) -> String {
        let parts: Vec<String> = self
            .terms
            .iter()
            .map(|term| match term {
                DomainTerm::Operator(operator) => format!("'{}'", operator.symbol()),
                DomainTerm::Condition(text) => text.clone(),
            })
            .collect();

        format!("[{}]", parts.join(", "))
    }
}

impl Display for DomainExpression {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.to_source())
    }
}
