// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Error surface for condition construction and compilation.
//!
//! Every failure is synchronous and terminal for the request that triggered
//! it. Messages are surfaced verbatim to clients, so they always name the
//! offending field, parameter or mapper.

use thiserror::Error;

/// Crate result alias.
pub type Result<T, E = ConditionError> = std::result::Result<T, E>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConditionError {
    /// No mapper is registered under the field name.
    #[error("No mapper found for field '{field}'")]
    MissingField { field: String },

    /// A mapper exists but lacks the capability the condition needs.
    #[error("Field '{field}' requires a {expected} mapper, but found a '{found}' mapper")]
    WrongMapperType {
        field: String,
        expected: String,
        found: String,
    },

    /// Blank field, missing value, out-of-domain number or bad ordering.
    #[error("{message}")]
    InvalidParameter { parameter: String, message: String },

    /// Malformed WKT or full-text query syntax.
    #[error("Unparseable {what} '{input}': {reason}")]
    ParseFailure {
        what: &'static str,
        input: String,
        reason: String,
    },

    /// The condition kind cannot be applied to the mapper's base type.
    #[error("{condition} condition is not supported by '{mapper}' mapper of field '{field}'")]
    UnsupportedCombination {
        condition: &'static str,
        field: String,
        mapper: String,
    },
}

impl ConditionError {
    pub fn invalid(parameter: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            parameter: parameter.into(),
            message: message.into(),
        }
    }

    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }

    pub fn wrong_mapper(
        field: impl Into<String>,
        expected: impl Into<String>,
        found: impl Into<String>,
    ) -> Self {
        Self::WrongMapperType {
            field: field.into(),
            expected: expected.into(),
            found: found.into(),
        }
    }

    pub fn unsupported(
        condition: &'static str,
        field: impl Into<String>,
        mapper: impl Into<String>,
    ) -> Self {
        Self::UnsupportedCombination {
            condition,
            field: field.into(),
            mapper: mapper.into(),
        }
    }

    pub fn parse(what: &'static str, input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ParseFailure {
            what,
            input: input.into(),
            reason: reason.into(),
        }
    }

    /// Short label used for metrics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingField { .. } => "missing_field",
            Self::WrongMapperType { .. } => "wrong_mapper_type",
            Self::InvalidParameter { .. } => "invalid_parameter",
            Self::ParseFailure { .. } => "parse_failure",
            Self::UnsupportedCombination { .. } => "unsupported_combination",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_culprit() {
        let err = ConditionError::wrong_mapper("place", "geo_point", "text");
        assert_eq!(
            err.to_string(),
            "Field 'place' requires a geo_point mapper, but found a 'text' mapper"
        );

        let err = ConditionError::unsupported("fuzzy", "age", "integer");
        assert_eq!(
            err.to_string(),
            "fuzzy condition is not supported by 'integer' mapper of field 'age'"
        );

        let err = ConditionError::missing_field("nope");
        assert_eq!(err.to_string(), "No mapper found for field 'nope'");
    }

    #[test]
    fn test_kind_labels() {
        assert_eq!(ConditionError::invalid("boost", "bad").kind(), "invalid_parameter");
        assert_eq!(ConditionError::parse("shape", "X", "bad").kind(), "parse_failure");
    }
}
