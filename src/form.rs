//! Forms and the answers that complete them

use crate::record::FormField;

/// A batch of prompt fields collected up to an end-of-form sentinel.
///
/// The exchange never dispatches an empty form; an end-of-form sentinel that
/// closes nothing is dropped instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Form {
    fields: Vec<FormField>,
}

impl Form {
    pub fn new(fields: Vec<FormField>) -> Self {
        Self { fields }
    }

    pub fn fields(&self) -> &[FormField] {
        &self.fields
    }

    /// Fields that expect an answer, in presentation order.
    pub fn answerable(&self) -> impl Iterator<Item = &FormField> {
        self.fields.iter().filter(|f| f.kind.takes_answer())
    }

    /// Look up an answerable field by its wire name.
    pub fn field(&self, name: &str) -> Option<&FormField> {
        self.fields
            .iter()
            .find(|f| f.kind.takes_answer() && f.name == name)
    }
}

/// One completed input, pairing a field's wire name with the user's value.
///
/// Message fields never produce an answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answer {
    pub name: String,
    pub value: String,
}

impl Answer {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// What the responder produced for one dispatched form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerSet {
    /// Inputs for the form's answerable fields
    Submitted(Vec<Answer>),
    /// The user declined; the exchange unwinds without replying to the daemon
    Cancelled,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{FieldKind, parse};

    fn sample_form() -> Form {
        Form::new(vec![
            parse("M Multi-factor login").unwrap(),
            parse("P user/Username=").unwrap(),
            parse("S grp/Group=[a/Group A|b/Group B]").unwrap(),
        ])
    }

    #[test]
    fn test_answerable_skips_messages() {
        let form = sample_form();
        let names: Vec<&str> = form.answerable().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["user", "grp"]);
    }

    #[test]
    fn test_field_lookup_by_name() {
        let form = sample_form();
        assert_eq!(form.field("grp").unwrap().kind, FieldKind::Select);
        assert!(form.field("nope").is_none());
        // Messages have no wire name and are never answerable.
        assert!(form.field("").is_none());
    }
}
