use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use solvane_core::{AppError, AppResult, NonEmptyString};

use crate::domain_expr::DomainExpression;
use crate::literal::ExpressionLiteral;

/// Placeholder substituted by the existing attribute text in `text_add`.
pub const OLD_VALUE_PLACEHOLDER: &str = "{old_value}";

/// Structured edit an inheriting view can request for one attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeOperation {
    /// Overwrite the attribute with the new text verbatim.
    Replace,
    /// Merge a dict literal into the existing dict literal.
    Update,
    /// AND a domain expression onto the existing domain.
    DomainAdd,
    /// Substitute the existing text into the new text at the placeholder.
    TextAdd,
}

impl AttributeOperation {
    /// Returns a stable storage value for this operation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Replace => "replace",
            Self::Update => "update",
            Self::DomainAdd => "domain_add",
            Self::TextAdd => "text_add",
        }
    }

    /// Maps a patch node's operation tag to an operation.
    ///
    /// Absent and unrecognized tags fall back to `Replace`, the default
    /// attribute-setting behavior of the host's inheritance mechanism.
    #[must_use]
    pub fn from_tag(tag: Option<&str>) -> Self {
        match tag {
            Some("update") => Self::Update,
            Some("domain_add") => Self::DomainAdd,
            Some("text_add") => Self::TextAdd,
            _ => Self::Replace,
        }
    }
}

/// One attribute patch directive from an inheriting view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributePatch {
    attribute: NonEmptyString,
    operation: AttributeOperation,
    value: String,
}

impl AttributePatch {
    /// Creates a validated patch directive.
    pub fn new(
        attribute: impl Into<String>,
        operation: AttributeOperation,
        value: impl Into<String>,
    ) -> AppResult<Self> {
        Ok(Self {
            attribute: NonEmptyString::new(attribute)?,
            operation,
            value: value.into(),
        })
    }

    /// Returns the target attribute name.
    #[must_use]
    pub fn attribute(&self) -> &NonEmptyString {
        &self.attribute
    }

    /// Returns the operation to apply.
    #[must_use]
    pub fn operation(&self) -> AttributeOperation {
        self.operation
    }

    /// Returns the raw new value text from the patch.
    #[must_use]
    pub fn value(&self) -> &str {
        self.value.as_str()
    }

    /// Applies the patch against the existing attribute text and returns
    /// the attribute's resulting text.
    ///
    /// `existing` is `None` when the node does not carry the attribute
    /// yet. The caller owns writing the result back onto the node.
    pub fn apply(&self, existing: Option<&str>) -> AppResult<String> {
        match self.operation {
            AttributeOperation::Replace => Ok(self.value.clone()),
            AttributeOperation::TextAdd => Ok(self
                .value
                .replace(OLD_VALUE_PLACEHOLDER, existing.unwrap_or(""))),
            AttributeOperation::Update => self.apply_update(existing),
            AttributeOperation::DomainAdd => self.apply_domain_add(existing),
        }
    }

    fn apply_update(&self, existing: Option<&str>) -> AppResult<String> {
        let ExpressionLiteral::Dict(new_entries) = ExpressionLiteral::parse(&self.value)? else {
            return Err(AppError::Validation(format!(
                "Operation for attribute `{}` is not a dict",
                self.attribute.as_str()
            )));
        };

        let mut entries = match existing {
            Some(text) if !text.trim().is_empty() => {
                let ExpressionLiteral::Dict(entries) = ExpressionLiteral::parse(text)? else {
                    return Err(AppError::Validation(format!(
                        "Attribute `{}` is not a dict",
                        self.attribute.as_str()
                    )));
                };
                entries
            }
            _ => Vec::new(),
        };

        for new_entry in new_entries {
            if let Some(entry) = entries.iter_mut().find(|entry| entry.key == new_entry.key) {
                entry.value = new_entry.value;
            } else {
                entries.push(new_entry);
            }
        }

        Ok(ExpressionLiteral::Dict(entries).to_source())
    }

    fn apply_domain_add(&self, existing: Option<&str>) -> AppResult<String> {
        let new_domain = parse_domain_or_empty(Some(self.value.as_str()))?;
        let existing_domain = parse_domain_or_empty(existing)?;

        Ok(DomainExpression::and(existing_domain, new_domain).to_source())
    }
}

fn parse_domain_or_empty(text: Option<&str>) -> AppResult<DomainExpression> {
    match text {
        Some(text) if !text.trim().is_empty() => DomainExpression::parse(text),
        _ => Ok(DomainExpression::empty()),
    }
}

/// Applies patch directives in order against a node's attribute map.
///
/// Each directive reads the map state left by its predecessors and writes
/// its result back under its attribute name. Structural node edits
/// (insert/replace/delete of whole nodes) stay with the view engine.
pub fn apply_attribute_patches(
    attributes: &mut BTreeMap<String, String>,
    patches: &[AttributePatch],
) -> AppResult<()> {
    for patch in patches {
        let existing = attributes
            .get(patch.attribute().as_str())
            .map(String::as_str);
        let patched = patch.apply(existing)?;
        attributes.insert(patch.attribute().as_str().to_owned(), patched);
    }

    Ok(())
}
