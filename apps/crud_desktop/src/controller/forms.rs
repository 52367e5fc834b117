//! Modal visibility and per-scope form buffers.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use shared::domain::{Student, StudentDraft};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FormScope {
    Add,
    Edit,
}

impl FormScope {
    /// Prefix distinguishing same-shaped fields of co-existing forms.
    pub fn prefix(self) -> &'static str {
        match self {
            Self::Add => "",
            Self::Edit => "edit",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ModalId {
    AddStudent,
    EditStudent,
}

impl ModalId {
    pub fn scope(self) -> FormScope {
        match self {
            Self::AddStudent => FormScope::Add,
            Self::EditStudent => FormScope::Edit,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::AddStudent => "Add student",
            Self::EditStudent => "Edit student",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Integer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    /// `None` is the malformed-number case; it is carried, not rejected.
    Integer(Option<i64>),
}

impl FieldValue {
    fn to_input_text(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Integer(Some(value)) => value.to_string(),
            Self::Integer(None) => String::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormState {
    fields: BTreeMap<&'static str, FieldValue>,
}

impl FormState {
    pub fn insert(&mut self, name: &'static str, value: FieldValue) {
        self.fields.insert(name, value);
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    pub fn text(&self, name: &str) -> &str {
        match self.fields.get(name) {
            Some(FieldValue::Text(text)) => text,
            _ => "",
        }
    }

    pub fn integer(&self, name: &str) -> Option<i64> {
        match self.fields.get(name) {
            Some(FieldValue::Integer(value)) => *value,
            _ => None,
        }
    }
}

/// An entity that can pre-fill a form.
pub trait FormModel {
    const FIELDS: &'static [FieldSpec];

    fn form_state(&self) -> FormState;
}

pub const STUDENT_FIELDS: &[FieldSpec] = &[
    FieldSpec {
        name: "name",
        label: "Name",
        kind: FieldKind::Text,
    },
    FieldSpec {
        name: "age",
        label: "Age",
        kind: FieldKind::Integer,
    },
    FieldSpec {
        name: "score",
        label: "Score",
        kind: FieldKind::Integer,
    },
];

impl FormModel for Student {
    const FIELDS: &'static [FieldSpec] = STUDENT_FIELDS;

    fn form_state(&self) -> FormState {
        let mut state = FormState::default();
        state.insert("name", FieldValue::Text(self.name.clone()));
        state.insert("age", FieldValue::Integer(Some(self.age)));
        state.insert("score", FieldValue::Integer(Some(self.score)));
        state
    }
}

pub fn student_draft_from_form(form: &FormState) -> StudentDraft {
    StudentDraft {
        name: form.text("name").to_string(),
        age: form.integer("age"),
        score: form.integer("score"),
    }
}

/// Lenient integer parse: leading whitespace, an optional sign, then as many
/// digits as are present. Anything else parses to `None`. Values beyond the
/// `i64` range clamp to `i64::MIN`/`i64::MAX`.
pub fn parse_int(raw: &str) -> Option<i64> {
    let trimmed = raw.trim_start();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    let value = digits[..end].bytes().fold(0i64, |acc, digit| {
        let digit = i64::from(digit - b'0');
        if negative {
            acc.saturating_mul(10).saturating_sub(digit)
        } else {
            acc.saturating_mul(10).saturating_add(digit)
        }
    });
    Some(value)
}

/// Owns which modals are open and the raw text of their fields.
///
/// Buffers for a scope exist from the moment its modal opens (or is written
/// to) until the modal closes.
#[derive(Debug)]
pub struct ModalController {
    fields: &'static [FieldSpec],
    open: BTreeSet<ModalId>,
    buffers: HashMap<FormScope, BTreeMap<&'static str, String>>,
}

impl ModalController {
    pub fn new(fields: &'static [FieldSpec]) -> Self {
        Self {
            fields,
            open: BTreeSet::new(),
            buffers: HashMap::new(),
        }
    }

    pub fn for_model<M: FormModel>() -> Self {
        Self::new(M::FIELDS)
    }

    pub fn fields(&self) -> &'static [FieldSpec] {
        self.fields
    }

    pub fn open_modal(&mut self, modal: ModalId) {
        if !self.open.insert(modal) {
            return;
        }
        let fields = self.fields;
        self.buffers.entry(modal.scope()).or_insert_with(|| {
            fields
                .iter()
                .map(|field| (field.name, String::new()))
                .collect()
        });
    }

    pub fn close_modal(&mut self, modal: ModalId) {
        self.open.remove(&modal);
        self.buffers.remove(&modal.scope());
    }

    pub fn close_all(&mut self) {
        self.open.clear();
        self.buffers.clear();
    }

    pub fn is_open(&self, modal: ModalId) -> bool {
        self.open.contains(&modal)
    }

    pub fn open_modals(&self) -> impl Iterator<Item = ModalId> + '_ {
        self.open.iter().copied()
    }

    /// Raw text of one field, for binding to an input widget.
    pub fn field_mut(&mut self, scope: FormScope, name: &'static str) -> Option<&mut String> {
        self.buffers.get_mut(&scope)?.get_mut(name)
    }

    /// Only meaningful while the scope's modal is open; callers guarantee that.
    pub fn read_form(&self, scope: FormScope) -> FormState {
        let buffer = self.buffers.get(&scope);
        let mut state = FormState::default();
        for field in self.fields {
            let raw = buffer
                .and_then(|buffer| buffer.get(field.name))
                .map(String::as_str)
                .unwrap_or_default();
            let value = match field.kind {
                FieldKind::Text => FieldValue::Text(raw.to_string()),
                FieldKind::Integer => FieldValue::Integer(parse_int(raw)),
            };
            state.insert(field.name, value);
        }
        state
    }

    pub fn write_form(&mut self, scope: FormScope, model: &impl FormModel) {
        let state = model.form_state();
        let buffer = self
            .fields
            .iter()
            .map(|field| {
                let text = state
                    .get(field.name)
                    .map(FieldValue::to_input_text)
                    .unwrap_or_default();
                (field.name, text)
            })
            .collect();
        self.buffers.insert(scope, buffer);
    }
}

#[cfg(test)]
mod tests {
    use shared::domain::StudentId;

    use super::*;

    fn student() -> Student {
        Student {
            id: StudentId(2),
            name: "Maenggu".to_string(),
            age: 5,
            score: 50,
        }
    }

    #[test]
    fn write_then_read_round_trips_entity_fields() {
        let mut modals = ModalController::new(STUDENT_FIELDS);
        let source = student();

        modals.write_form(FormScope::Edit, &source);
        modals.open_modal(ModalId::EditStudent);

        assert_eq!(modals.read_form(FormScope::Edit), source.form_state());
    }

    #[test]
    fn opening_twice_keeps_typed_input() {
        let mut modals = ModalController::new(STUDENT_FIELDS);
        modals.open_modal(ModalId::AddStudent);
        *modals.field_mut(FormScope::Add, "name").expect("name field") = "Hoon".to_string();

        modals.open_modal(ModalId::AddStudent);

        assert!(modals.is_open(ModalId::AddStudent));
        assert_eq!(modals.read_form(FormScope::Add).text("name"), "Hoon");
    }

    #[test]
    fn closing_destroys_form_state() {
        let mut modals = ModalController::new(STUDENT_FIELDS);
        modals.write_form(FormScope::Edit, &student());
        modals.open_modal(ModalId::EditStudent);

        modals.close_modal(ModalId::EditStudent);
        modals.close_modal(ModalId::EditStudent);

        assert!(!modals.is_open(ModalId::EditStudent));
        assert!(modals.field_mut(FormScope::Edit, "name").is_none());
        modals.open_modal(ModalId::EditStudent);
        assert_eq!(modals.read_form(FormScope::Edit).text("name"), "");
    }

    #[test]
    fn scopes_do_not_share_fields() {
        let mut modals = ModalController::new(STUDENT_FIELDS);
        modals.open_modal(ModalId::AddStudent);
        modals.write_form(FormScope::Edit, &student());
        modals.open_modal(ModalId::EditStudent);

        assert_eq!(modals.read_form(FormScope::Add).text("name"), "");
        assert_eq!(modals.read_form(FormScope::Edit).text("name"), "Maenggu");
        assert_eq!(FormScope::Edit.prefix(), "edit");
        assert_eq!(FormScope::Add.prefix(), "");
    }

    #[test]
    fn malformed_numbers_flow_through_as_none() {
        let mut modals = ModalController::new(STUDENT_FIELDS);
        modals.open_modal(ModalId::AddStudent);
        *modals.field_mut(FormScope::Add, "name").expect("name") = "Yuri".to_string();
        *modals.field_mut(FormScope::Add, "age").expect("age") = "five".to_string();
        *modals.field_mut(FormScope::Add, "score").expect("score") = " 42pts".to_string();

        let draft = student_draft_from_form(&modals.read_form(FormScope::Add));

        assert_eq!(
            draft,
            StudentDraft {
                name: "Yuri".to_string(),
                age: None,
                score: Some(42),
            }
        );
    }

    #[test]
    fn parse_int_follows_leading_digit_rules() {
        assert_eq!(parse_int("17"), Some(17));
        assert_eq!(parse_int("  -3"), Some(-3));
        assert_eq!(parse_int("+8kg"), Some(8));
        assert_eq!(parse_int("12.9"), Some(12));
        assert_eq!(parse_int(""), None);
        assert_eq!(parse_int("-"), None);
        assert_eq!(parse_int("abc"), None);
    }

    #[test]
    fn parse_int_saturates_out_of_range_values() {
        assert_eq!(parse_int("99999999999999999999"), Some(i64::MAX));
        assert_eq!(parse_int("-99999999999999999999"), Some(i64::MIN));
        assert_eq!(parse_int("-9223372036854775808"), Some(i64::MIN));
        assert_eq!(parse_int("9223372036854775807x"), Some(i64::MAX));
    }
}
