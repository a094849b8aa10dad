//! Response envelope adapter.
//!
//! OneTap endpoints wrap their records three different ways:
//!
//! | endpoint family                      | shape                          |
//! |--------------------------------------|--------------------------------|
//! | profiles, integrations               | `{ "data": [..] }`             |
//! | passports, punch passes              | `{ "data": { "passports": [..] } }` |
//! | participants, lists                  | bare `[..]` (or a bare object) |
//!
//! Call sites pick a [`RecordPath`] instead of branching on the shape.

use serde_json::Value;

/// Where the record array lives inside a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordPath {
    Data,
    DataPassports,
    Bare,
}

/// Result of looking for records in a response.
#[derive(Debug, Clone, PartialEq)]
pub enum Page {
    /// The array was found at the expected location.
    Records(Vec<Value>),
    /// No array there; the untouched response.
    Raw(Value),
}

impl RecordPath {
    pub fn records(self, mut response: Value) -> Page {
        let located = match self {
            Self::Bare => {
                return match response {
                    Value::Array(records) => Page::Records(records),
                    other => Page::Raw(other),
                }
            }
            Self::Data => response.get_mut("data"),
            Self::DataPassports => response
                .get_mut("data")
                .and_then(|d| d.get_mut("passports")),
        };

        if let Some(Value::Array(records)) = located {
            return Page::Records(std::mem::take(records));
        }
        Page::Raw(response)
    }

    /// Whether a response without a record array still counts as one record
    /// when it is the first page of a return-all run.
    pub fn keeps_raw_first_page(self) -> bool {
        self == Self::Bare
    }
}

/// `.data` when present and not null, otherwise the whole response.
pub fn unwrap_data(response: Value) -> Value {
    match response {
        Value::Object(mut map) => match map.remove("data") {
            Some(data) if !data.is_null() => data,
            Some(data) => {
                map.insert("data".to_owned(), data);
                Value::Object(map)
            }
            None => Value::Object(map),
        },
        other => other,
    }
}
