//! Wire grammar for daemon prompt records
//!
//! While authenticating, the daemon asks for input by writing prompt records
//! on its control channel, one record per line. The first character of a
//! record selects the field type:
//!
//! | Record | Meaning |
//! |--------|---------|
//! | `M Connecting to gateway...` | informational message |
//! | `P user/Username=` | masked input named `user` |
//! | `T code/Token code=123456` | plain input with a pre-filled default |
//! | `S grp/Group=[a/Group A\|b/Group B]` | single choice from a list |
//! | `E` | end of the current form |
//! | `X` | end of the whole exchange |
//!
//! Answers travel back as `<tag> <name>=<value>` records, e.g. `P user=bob`.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RecordError {
    #[error("malformed request record: {0:?}")]
    Malformed(String),
}

/// Field type selected by the first character of a prompt record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Informational text, carries no input field
    Message,
    /// Masked text input
    Password,
    /// Plain text input
    Text,
    /// Single choice from a list
    Select,
    /// Sentinel closing the form under collection
    EndOfForm,
    /// Sentinel closing the whole exchange
    EndOfControl,
}

impl FieldKind {
    /// Wire tag character for this kind.
    pub fn tag(self) -> char {
        match self {
            FieldKind::Message => 'M',
            FieldKind::Password => 'P',
            FieldKind::Text => 'T',
            FieldKind::Select => 'S',
            FieldKind::EndOfForm => 'E',
            FieldKind::EndOfControl => 'X',
        }
    }

    /// Whether fields of this kind collect an answer from the user.
    pub fn takes_answer(self) -> bool {
        matches!(
            self,
            FieldKind::Password | FieldKind::Text | FieldKind::Select
        )
    }
}

/// One `name/label` entry of a select field's choice list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    pub name: String,
    pub label: String,
}

/// One parsed prompt record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormField {
    pub kind: FieldKind,
    /// Wire identifier, empty for messages and sentinels
    pub name: String,
    /// Human-readable prompt, empty for messages and sentinels
    pub label: String,
    /// Pre-filled default, or the message text for `Message`
    pub value: String,
    /// Populated for `Select` fields only
    pub choices: Vec<Choice>,
}

impl FormField {
    fn sentinel(kind: FieldKind) -> Self {
        Self {
            kind,
            name: String::new(),
            label: String::new(),
            value: String::new(),
            choices: Vec::new(),
        }
    }

    /// Encode an answer for this field as a wire record.
    ///
    /// Only meaningful for kinds that take an answer.
    pub fn encode_answer(&self, value: &str) -> String {
        format!("{} {}={}", self.kind.tag(), self.name, value)
    }

    /// Render the field back into its prompt-record wire form.
    pub fn to_record(&self) -> String {
        match self.kind {
            FieldKind::Message => format!("M {}", self.value),
            FieldKind::EndOfForm | FieldKind::EndOfControl => self.kind.tag().to_string(),
            _ => format!(
                "{} {}/{}={}",
                self.kind.tag(),
                self.name,
                self.label,
                self.value
            ),
        }
    }
}

/// Parse one line of the control channel into a [`FormField`].
pub fn parse(record: &str) -> Result<FormField, RecordError> {
    let malformed = || RecordError::Malformed(record.to_string());

    let mut chars = record.chars();
    let kind = match chars.next().ok_or_else(malformed)? {
        'M' => FieldKind::Message,
        'P' => FieldKind::Password,
        'T' => FieldKind::Text,
        'S' => FieldKind::Select,
        'E' => FieldKind::EndOfForm,
        'X' => FieldKind::EndOfControl,
        _ => return Err(malformed()),
    };

    // Sentinels are bare tag characters; trailing text is an error.
    if matches!(kind, FieldKind::EndOfForm | FieldKind::EndOfControl) {
        if record.len() != 1 {
            return Err(malformed());
        }
        return Ok(FormField::sentinel(kind));
    }

    if record.len() < 3 || chars.next() != Some(' ') {
        return Err(malformed());
    }
    let rest = &record[2..];

    // Message text is taken verbatim, trailing whitespace included.
    if kind == FieldKind::Message {
        return Ok(FormField {
            kind,
            name: String::new(),
            label: String::new(),
            value: rest.to_string(),
            choices: Vec::new(),
        });
    }

    let (left, right) = rest.trim().split_once('=').ok_or_else(malformed)?;
    let (name, label) = left.trim().split_once('/').ok_or_else(malformed)?;
    let value = right.trim().to_string();

    let choices = if kind == FieldKind::Select {
        parse_choices(&value)
    } else {
        Vec::new()
    };

    Ok(FormField {
        kind,
        name: name.trim().to_string(),
        label: label.trim().to_string(),
        value,
        choices,
    })
}

/// Parse a select field's value into its choice list.
///
/// The surrounding brackets are each optional. Tokens without a `/`
/// separator are dropped rather than failing the record.
fn parse_choices(value: &str) -> Vec<Choice> {
    let mut list = value.trim();
    if let Some(stripped) = list.strip_prefix('[') {
        list = stripped;
    }
    if let Some(stripped) = list.strip_suffix(']') {
        list = stripped;
    }

    list.split('|')
        .filter_map(|token| token.split_once('/'))
        .map(|(name, label)| Choice {
            name: name.to_string(),
            label: label.to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_message() {
        let field = parse("M hello").unwrap();
        assert_eq!(field.kind, FieldKind::Message);
        assert_eq!(field.value, "hello");
        assert!(field.name.is_empty());
        assert!(field.label.is_empty());
    }

    #[test]
    fn test_parse_password() {
        let field = parse("P user/Username=bob").unwrap();
        assert_eq!(field.kind, FieldKind::Password);
        assert_eq!(field.name, "user");
        assert_eq!(field.label, "Username");
        assert_eq!(field.value, "bob");
        assert!(field.choices.is_empty());
    }

    #[test]
    fn test_parse_text_empty_default() {
        let field = parse("T code/Token code=").unwrap();
        assert_eq!(field.kind, FieldKind::Text);
        assert_eq!(field.name, "code");
        assert_eq!(field.label, "Token code");
        assert_eq!(field.value, "");
    }

    #[test]
    fn test_parse_select_choices_in_order() {
        let field = parse("S grp/Group=[a/Group A|b/Group B]").unwrap();
        assert_eq!(field.kind, FieldKind::Select);
        assert_eq!(field.name, "grp");
        assert_eq!(
            field.choices,
            vec![
                Choice {
                    name: "a".to_string(),
                    label: "Group A".to_string()
                },
                Choice {
                    name: "b".to_string(),
                    label: "Group B".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_parse_select_without_brackets() {
        let field = parse("S grp/Group=a/Group A|b/Group B").unwrap();
        assert_eq!(field.choices.len(), 2);
        assert_eq!(field.choices[0].name, "a");
    }

    #[test]
    fn test_parse_select_lone_leading_bracket() {
        let field = parse("S grp/Group=[a/Group A|b/Group B").unwrap();
        assert_eq!(field.choices.len(), 2);
        assert_eq!(field.choices[1].label, "Group B");
    }

    #[test]
    fn test_parse_select_drops_tokens_without_separator() {
        let field = parse("S grp/Group=[a/Group A|bogus|b/Group B]").unwrap();
        assert_eq!(field.choices.len(), 2);
        assert_eq!(field.choices[0].name, "a");
        assert_eq!(field.choices[1].name, "b");
    }

    #[test]
    fn test_parse_select_empty_list() {
        let field = parse("S grp/Group=[]").unwrap();
        assert!(field.choices.is_empty());
        // The raw value is still carried through.
        assert_eq!(field.value, "[]");
    }

    #[test]
    fn test_parse_sentinels() {
        assert_eq!(parse("E").unwrap().kind, FieldKind::EndOfForm);
        assert_eq!(parse("X").unwrap().kind, FieldKind::EndOfControl);
    }

    #[test]
    fn test_sentinels_reject_trailing_characters() {
        assert!(matches!(parse("X2"), Err(RecordError::Malformed(_))));
        assert!(matches!(parse("E "), Err(RecordError::Malformed(_))));
    }

    #[test]
    fn test_parse_rejects_unknown_tag() {
        assert!(matches!(parse("Q user/User=x"), Err(RecordError::Malformed(_))));
        assert!(matches!(parse(""), Err(RecordError::Malformed(_))));
    }

    #[test]
    fn test_parse_rejects_missing_space_or_short_record() {
        assert!(parse("Puser/User=x").is_err());
        assert!(parse("P ").is_err());
        assert!(parse("M").is_err());
    }

    #[test]
    fn test_parse_rejects_missing_separator() {
        // No '=' between option and value
        assert!(parse("P user/Username").is_err());
        // No '/' between name and label
        assert!(parse("P userUsername=bob").is_err());
    }

    #[test]
    fn test_parse_trims_around_separators() {
        let field = parse("P  user / Username = bob ").unwrap();
        assert_eq!(field.name, "user");
        assert_eq!(field.label, "Username");
        assert_eq!(field.value, "bob");
    }

    #[test]
    fn test_parse_splits_on_first_equals() {
        let field = parse("T env/Variable=key=value").unwrap();
        assert_eq!(field.name, "env");
        assert_eq!(field.value, "key=value");
    }

    #[test]
    fn test_prompt_records_round_trip() {
        for record in [
            "P user/Username=bob",
            "T code/Code=123",
            "S grp/Group=[a/Group A|b/Group B]",
        ] {
            let field = parse(record).unwrap();
            let reparsed = parse(&field.to_record()).unwrap();
            assert_eq!(reparsed.kind, field.kind);
            assert_eq!(reparsed.name, field.name);
            assert_eq!(reparsed.value, field.value);
        }
    }

    #[test]
    fn test_encode_answer() {
        let field = parse("P user/Username=").unwrap();
        assert_eq!(field.encode_answer("bob"), "P user=bob");

        let field = parse("S grp/Group=[a/Group A]").unwrap();
        assert_eq!(field.encode_answer("a"), "S grp=a");
    }

    #[test]
    fn test_takes_answer() {
        assert!(FieldKind::Password.takes_answer());
        assert!(FieldKind::Text.takes_answer());
        assert!(FieldKind::Select.takes_answer());
        assert!(!FieldKind::Message.takes_answer());
        assert!(!FieldKind::EndOfForm.takes_answer());
    }
}
