//! Field table for step flows and record forms
//!
//! The backend names the field it wants next. This table maps that name
//! to how the client collects and parses it. Fields not in the table are
//! collected as plain text.

use super::{EntityType, FieldValue};

/// How a field's text input is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Trimmed free text
    Text,
    /// Comma-separated items
    List,
    /// Yes/no answer
    Flag,
    /// Calendar date, YYYY-MM-DD (validated by the server)
    Date,
}

/// Description of one collectable field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// Wire name
    pub name: &'static str,
    /// Human label
    pub label: &'static str,
    /// Input interpretation
    pub kind: FieldKind,
    /// Must be non-empty on submit
    pub required: bool,
    /// Offered in the local edit form
    pub editable: bool,
    /// Allowed values or format, shown next to the input
    pub hint: Option<&'static str>,
}

const fn field(
    name: &'static str,
    label: &'static str,
    kind: FieldKind,
    required: bool,
    editable: bool,
    hint: Option<&'static str>,
) -> FieldSpec {
    FieldSpec {
        name,
        label,
        kind,
        required,
        editable,
        hint,
    }
}

const CHORE_FIELDS: &[FieldSpec] = &[
    field("chore_name", "Chore name", FieldKind::Text, true, true, None),
    field(
        "assigned_members",
        "Assigned members",
        FieldKind::List,
        true,
        true,
        Some("comma-separated names"),
    ),
    field(
        "start_date",
        "Start date",
        FieldKind::Date,
        true,
        true,
        Some("YYYY-MM-DD"),
    ),
    field(
        "repetition",
        "Repetition",
        FieldKind::Text,
        true,
        true,
        Some("daily, weekly, one-time"),
    ),
    field("due_time", "Due time", FieldKind::Text, false, true, Some("HH:MM")),
    field("reminder", "Reminder", FieldKind::Text, false, true, None),
    field(
        "type",
        "Type",
        FieldKind::Text,
        false,
        true,
        Some("individual, rotate, compete"),
    ),
    field("icon", "Icon", FieldKind::Text, false, false, None),
    field(
        "end_date",
        "End date",
        FieldKind::Date,
        false,
        false,
        Some("YYYY-MM-DD"),
    ),
];

const MEAL_FIELDS: &[FieldSpec] = &[
    field("meal_name", "Meal name", FieldKind::Text, true, true, None),
    field(
        "exist",
        "Already in recipes",
        FieldKind::Flag,
        true,
        true,
        None,
    ),
    field(
        "meal_kind",
        "Meal kind",
        FieldKind::Text,
        true,
        true,
        Some("breakfast, lunch, dinner, snack"),
    ),
    field(
        "meal_date",
        "Meal date",
        FieldKind::Date,
        true,
        true,
        Some("YYYY-MM-DD"),
    ),
    field(
        "dishes",
        "Dishes",
        FieldKind::List,
        false,
        true,
        Some("comma-separated dishes"),
    ),
];

const RECIPE_FIELDS: &[FieldSpec] = &[
    field("name", "Recipe name", FieldKind::Text, true, true, None),
    field(
        "kind",
        "Kind",
        FieldKind::Text,
        true,
        true,
        Some("breakfast, lunch, dinner, snack"),
    ),
    field("description", "Description", FieldKind::Text, false, true, None),
];

const MEMBER_FIELDS: &[FieldSpec] = &[
    field("name", "Name", FieldKind::Text, true, true, None),
    field(
        "gender",
        "Gender",
        FieldKind::Text,
        false,
        true,
        Some("male, female, or other"),
    ),
    field("avatar", "Avatar URL", FieldKind::Text, false, true, None),
];

/// All known fields for an entity, in display order
pub fn fields_for(entity: EntityType) -> &'static [FieldSpec] {
    match entity {
        EntityType::Chore => CHORE_FIELDS,
        EntityType::Meal => MEAL_FIELDS,
        EntityType::Recipe => RECIPE_FIELDS,
        EntityType::Member => MEMBER_FIELDS,
    }
}

/// Look up a field by its wire name
pub fn lookup(entity: EntityType, name: &str) -> Option<&'static FieldSpec> {
    fields_for(entity).iter().find(|f| f.name == name)
}

/// Fields offered by the local edit form
pub fn editable_fields(entity: EntityType) -> impl Iterator<Item = &'static FieldSpec> {
    fields_for(entity).iter().filter(|f| f.editable)
}

/// Split comma-separated text into trimmed, non-empty items
///
/// # Examples
///
/// ```
/// use household_assistant::flow::fields::parse_list;
///
/// assert_eq!(parse_list("Alex, Jamie"), vec!["Alex", "Jamie"]);
/// assert_eq!(parse_list(" , Sam ,,"), vec!["Sam"]);
/// ```
pub fn parse_list(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Interpret a yes/no answer. Only "true", "yes" and "y" are affirmative.
///
/// # Examples
///
/// ```
/// use household_assistant::flow::fields::parse_flag;
///
/// assert!(parse_flag("Yes"));
/// assert!(parse_flag(" y "));
/// assert!(!parse_flag("nope"));
/// ```
pub fn parse_flag(text: &str) -> bool {
    matches!(text.trim().to_lowercase().as_str(), "true" | "yes" | "y")
}

/// Parse raw input for a field of the given kind
pub fn parse_input(kind: FieldKind, text: &str) -> FieldValue {
    match kind {
        FieldKind::List => FieldValue::List(parse_list(text)),
        FieldKind::Flag => FieldValue::Flag(parse_flag(text)),
        FieldKind::Text | FieldKind::Date => FieldValue::Text(text.trim().to_string()),
    }
}

/// Parse raw input for a named field, falling back to text for unknown names
pub fn parse_field(entity: EntityType, name: &str, text: &str) -> FieldValue {
    let kind = lookup(entity, name).map_or(FieldKind::Text, |f| f.kind);
    parse_input(kind, text)
}

impl FieldSpec {
    /// Parse raw input for this field
    pub fn parse(&self, text: &str) -> FieldValue {
        parse_input(self.kind, text)
    }

    /// Extra text appended to the server prompt for this field
    pub fn prompt_suffix(&self) -> &'static str {
        match self.kind {
            FieldKind::Flag => " (yes/no or true/false)",
            _ => "",
        }
    }

    /// Label with hint, for form rows
    pub fn display_label(&self) -> String {
        match self.hint {
            Some(hint) => format!("{} ({})", self.label, hint),
            None => self.label.to_string(),
        }
    }
}
