use std::collections::HashMap;

/// Field name whose values accumulate line by line instead of replacing.
pub const DATA_FIELD: &str = "data";

/// A dispatched record: an ordered mapping from field name to field value.
///
/// Keys keep the order in which their field first appeared in the record.
/// Assigning to an existing key replaces the value in place, so the key
/// sequence of a message is exactly the sequence of distinct fields the
/// record declared.
///
/// ```text
///   id:1           ─┐
///   event:update    │  Message [ ("id", "1"),
///   data:a          │            ("event", "update"),
///   data:b          │            ("data", "a\nb\n") ]
///                  ─┘  (blank line dispatches)
/// ```
///
/// Fields live in a `Vec` in declaration order; `index` maps each name to
/// its slot so a record with many distinct names stays linear to build.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Message {
    fields: Vec<(String, String)>,
    index: HashMap<String, usize>,
}

impl Message {
    /// Create an empty message.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the value of a field.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.index
            .get(name)
            .map(|&slot| self.fields[slot].1.as_str())
    }

    /// The accumulated `data` value, including the trailing newline each
    /// `data` line contributes.
    #[must_use]
    pub fn data(&self) -> Option<&str> {
        self.get(DATA_FIELD)
    }

    #[must_use]
    pub fn event(&self) -> Option<&str> {
        self.get("event")
    }

    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.get("id")
    }

    /// Set a field, replacing any previous value but keeping its position.
    pub fn set(&mut self, name: String, value: String) {
        match self.index.get(&name) {
            Some(&slot) => self.fields[slot].1 = value,
            None => self.insert_new(name, value),
        }
    }

    /// Append `line` plus a newline to the field's current value (empty
    /// when absent).
    pub fn push_line(&mut self, name: String, line: &str) {
        match self.index.get(&name) {
            Some(&slot) => {
                let existing = &mut self.fields[slot].1;
                existing.push_str(line);
                existing.push('\n');
            }
            None => {
                let mut value = String::with_capacity(line.len() + 1);
                value.push_str(line);
                value.push('\n');
                self.insert_new(name, value);
            }
        }
    }

    fn insert_new(&mut self, name: String, value: String) {
        self.index.insert(name.clone(), self.fields.len());
        self.fields.push((name, value));
    }

    /// Apply a parsed `name: value` line: `data` accumulates, every other
    /// field replaces.
    pub fn assign(&mut self, name: String, value: &str) {
        if name == DATA_FIELD {
            self.push_line(name, value);
        } else {
            self.set(name, value.to_owned());
        }
    }

    /// Iterate over `(name, value)` pairs in field order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    /// Iterate over field names in field order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(key, _)| key.as_str())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl IntoIterator for Message {
    type Item = (String, String);
    type IntoIter = std::vec::IntoIter<(String, String)>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}

impl FromIterator<(String, String)> for Message {
    /// Build a message with [`set`](Message::set) semantics: a repeated name
    /// keeps its first position and its last value.
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        let mut message = Self::new();
        for (name, value) in iter {
            message.set(name, value);
        }
        message
    }
}
