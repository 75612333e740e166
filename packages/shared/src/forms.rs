//! # Form-builder shapes
//!
//! Two generations of form description live side by side:
//!
//! - [`Form`] / [`Question`]: the question list keyed by [`QuestionType`].
//! - [`FormData`] / [`FormElement`]: the element-based builder keyed by [`ElementType`].
//!
//! [`FormElement`] is tagged by its `type` field. Choice elements carry a list of
//! options; every other element carries `options: []` and decoding rejects a non-empty
//! list ([`NoOptions`]).

use std::fmt;

use serde::de::{self, IgnoredAny, SeqAccess, Visitor};
use serde::ser::SerializeSeq;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuestionType {
    #[serde(rename = "short-answer")]
    ShortAnswer,
    #[serde(rename = "paragraph")]
    Paragraph,
    #[serde(rename = "multiple-choice")]
    MultipleChoice,
    #[serde(rename = "checkboxes")]
    Checkboxes,
    #[serde(rename = "dropdown")]
    Dropdown,
    #[serde(rename = "linearScale")]
    LinearScale,
    #[serde(rename = "dateTime")]
    DateTime,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: QuestionType,
    pub title: String,
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Form {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub questions: Vec<Question>,
}

/// A labelled input on the auth and settings pages.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FieldValue {
    pub name: String,
    pub label: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementType {
    ShortText,
    LongText,
    MultipleChoice,
    Checkbox,
    Dropdown,
    Date,
    Time,
    FileUpload,
}

impl ElementType {
    pub fn is_choice(&self) -> bool {
        matches!(
            self,
            ElementType::MultipleChoice | ElementType::Checkbox | ElementType::Dropdown
        )
    }
}

/// Options list that must stay empty. Serialises as `[]`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NoOptions;

impl Serialize for NoOptions {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_seq(Some(0))?.end()
    }
}

impl<'de> Deserialize<'de> for NoOptions {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct EmptyList;

        impl<'de> Visitor<'de> for EmptyList {
            type Value = NoOptions;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("an empty options list")
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<NoOptions, A::Error> {
                let mut len = 0;
                while seq.next_element::<IgnoredAny>()?.is_some() {
                    len += 1;
                }
                if len > 0 {
                    return Err(de::Error::invalid_length(len, &self));
                }
                Ok(NoOptions)
            }
        }

        deserializer.deserialize_seq(EmptyList)
    }
}

/// Element without options (text, date, time, file upload).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlainElement {
    pub id: String,
    pub question: String,
    pub required: bool,
    #[serde(default)]
    pub options: NoOptions,
}

/// Element whose answer is picked from `options`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChoiceElement {
    pub id: String,
    pub question: String,
    pub required: bool,
    #[serde(default)]
    pub options: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FormElement {
    ShortText(PlainElement),
    LongText(PlainElement),
    MultipleChoice(ChoiceElement),
    Checkbox(ChoiceElement),
    Dropdown(ChoiceElement),
    Date(PlainElement),
    Time(PlainElement),
    FileUpload(PlainElement),
}

impl FormElement {
    pub fn element_type(&self) -> ElementType {
        match self {
            FormElement::ShortText(_) => ElementType::ShortText,
            FormElement::LongText(_) => ElementType::LongText,
            FormElement::MultipleChoice(_) => ElementType::MultipleChoice,
            FormElement::Checkbox(_) => ElementType::Checkbox,
            FormElement::Dropdown(_) => ElementType::Dropdown,
            FormElement::Date(_) => ElementType::Date,
            FormElement::Time(_) => ElementType::Time,
            FormElement::FileUpload(_) => ElementType::FileUpload,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            FormElement::MultipleChoice(e) | FormElement::Checkbox(e) | FormElement::Dropdown(e) => {
                &e.id
            }
            FormElement::ShortText(e)
            | FormElement::LongText(e)
            | FormElement::Date(e)
            | FormElement::Time(e)
            | FormElement::FileUpload(e) => &e.id,
        }
    }

    pub fn is_required(&self) -> bool {
        match self {
            FormElement::MultipleChoice(e) | FormElement::Checkbox(e) | FormElement::Dropdown(e) => {
                e.required
            }
            FormElement::ShortText(e)
            | FormElement::LongText(e)
            | FormElement::Date(e)
            | FormElement::Time(e)
            | FormElement::FileUpload(e) => e.required,
        }
    }

    /// Options for choice elements, empty for everything else.
    pub fn options(&self) -> &[String] {
        match self {
            FormElement::MultipleChoice(e) | FormElement::Checkbox(e) | FormElement::Dropdown(e) => {
                &e.options
            }
            _ => &[],
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FormData {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub elements: Vec<FormElement>,
}

impl FormData {
    pub fn element(&self, id: &str) -> Option<&FormElement> {
        self.elements.iter().find(|e| e.id() == id)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FormSettings {
    pub collect_email: bool,
    pub limit_responses: bool,
    pub response_limit: u32,
    pub show_progress_bar: bool,
    pub shuffle_questions: bool,
    pub confirmation_message: String,
    pub redirect_url: String,
    pub theme: String,
    pub header_color: String,
    pub font_family: String,
}

impl FormSettings {
    /// Whether one more response fits under the configured limit.
    pub fn accepts_response(&self, received: u32) -> bool {
        !self.limit_responses || received < self.response_limit
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormResponse {
    pub id: String,
    pub submitted_at: String,
    #[serde(default)]
    pub data: Map<String, Value>,
}

impl FormResponse {
    pub fn answer(&self, element_id: &str) -> Option<&Value> {
        self.data.get(element_id)
    }

    /// Ids of required elements in `form` that have no answer.
    pub fn missing_required<'a>(&self, form: &'a FormData) -> Vec<&'a str> {
        form.elements
            .iter()
            .filter(|e| e.is_required())
            .map(|e| e.id())
            .filter(|id| match self.data.get(*id) {
                None | Some(Value::Null) => true,
                Some(Value::String(s)) => s.trim().is_empty(),
                Some(Value::Array(a)) => a.is_empty(),
                Some(_) => false,
            })
            .collect()
    }
}
