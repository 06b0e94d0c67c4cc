use crate::mapper::html;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One flat form value. Multi-select inputs are lists; single-select widgets
/// may also store their choice as a one-element list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FormValue {
    Text(String),
    List(Vec<String>),
}

/// Flat field name -> value mapping collected by a form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormState {
    fields: BTreeMap<String, FormValue>,
}

impl FormState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_text(&mut self, field: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.fields.insert(field.into(), FormValue::Text(value.into()));
        self
    }

    pub fn set_list<I, S>(&mut self, field: impl Into<String>, values: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values = values.into_iter().map(Into::into).collect();
        self.fields.insert(field.into(), FormValue::List(values));
        self
    }

    pub fn with_text(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_text(field, value);
        self
    }

    pub fn with_list<I, S>(mut self, field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.set_list(field, values);
        self
    }

    pub fn get(&self, field: &str) -> Option<&FormValue> {
        self.fields.get(field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.text(field).is_some() || !self.list(field).is_empty()
    }

    pub fn remove(&mut self, field: &str) -> Option<FormValue> {
        self.fields.remove(field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FormValue)> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Scalar view of a field: trimmed, HTML-entity decoded, `None` when blank.
    /// A list with one non-blank value collapses to that value; a list with
    /// several is not a scalar (`Validator::check_single_values` reports it).
    pub fn text(&self, field: &str) -> Option<String> {
        let raw = match self.fields.get(field)? {
            FormValue::Text(s) => s.trim(),
            FormValue::List(values) => {
                let mut non_blank = values.iter().map(|v| v.trim()).filter(|v| !v.is_empty());
                match (non_blank.next(), non_blank.next()) {
                    (Some(only), None) => only,
                    _ => return None,
                }
            }
        };
        if raw.is_empty() {
            return None;
        }
        Some(html::unescape(raw))
    }

    /// List view of a field. A scalar becomes a one-element list; blanks are dropped.
    pub fn list(&self, field: &str) -> Vec<String> {
        let values: Vec<&str> = match self.fields.get(field) {
            Some(FormValue::List(values)) => values.iter().map(String::as_str).collect(),
            Some(FormValue::Text(s)) => vec![s.as_str()],
            None => Vec::new(),
        };
        values
            .into_iter()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(html::unescape)
            .collect()
    }

    /// Fills `field` only when the form has no usable value for it.
    pub fn seed_text(&mut self, field: &str, value: &str) {
        if self.text(field).is_none() && !value.trim().is_empty() {
            self.set_text(field, value);
        }
    }
}

impl<K: Into<String>> FromIterator<(K, FormValue)> for FormState {
    fn from_iter<I: IntoIterator<Item = (K, FormValue)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}
