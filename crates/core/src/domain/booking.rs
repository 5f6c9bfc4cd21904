use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingField {
    Date,
    Start,
    End,
    Duration,
}

impl BookingField {
    pub const ALL: [BookingField; 4] =
        [BookingField::Date, BookingField::Start, BookingField::End, BookingField::Duration];

    /// Key used in the platform session attributes.
    pub fn session_key(self) -> &'static str {
        match self {
            Self::Date => "date",
            Self::Start => "start",
            Self::End => "end",
            Self::Duration => "duration",
        }
    }

    /// Slot name as declared in the interaction model.
    pub fn slot_name(self) -> &'static str {
        match self {
            Self::Date => "Date",
            Self::Start => "Start",
            Self::End => "End",
            Self::Duration => "Duration",
        }
    }

    pub fn from_slot_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.slot_name() == name)
    }
}

/// The four booking parameters after merging a turn with the session.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingRequest {
    pub date: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub duration: Option<String>,
}

impl BookingRequest {
    pub fn get(&self, field: BookingField) -> Option<&str> {
        let value = match field {
            BookingField::Date => &self.date,
            BookingField::Start => &self.start,
            BookingField::End => &self.end,
            BookingField::Duration => &self.duration,
        };
        non_empty(value.as_deref())
    }

    pub fn set(&mut self, field: BookingField, value: Option<String>) {
        let slot = match field {
            BookingField::Date => &mut self.date,
            BookingField::Start => &mut self.start,
            BookingField::End => &mut self.end,
            BookingField::Duration => &mut self.duration,
        };
        *slot = value.filter(|value| !value.trim().is_empty());
    }

    pub fn has_end_or_duration(&self) -> bool {
        self.get(BookingField::End).is_some() || self.get(BookingField::Duration).is_some()
    }

    /// Copy of this request keeping only the fields accepted by `keep`.
    pub fn filtered(&self, keep: impl Fn(BookingField) -> bool) -> Self {
        let mut filtered = Self::default();
        for field in BookingField::ALL {
            if keep(field) {
                filtered.set(field, self.get(field).map(str::to_owned));
            }
        }
        filtered
    }
}

/// Slot values heard in the current utterance.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TurnInput {
    values: BookingRequest,
}

impl TurnInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: BookingField, value: impl Into<String>) -> Self {
        self.values.set(field, Some(value.into()));
        self
    }

    /// Builds the input from `(slot name, value)` pairs. Unknown slot names are ignored.
    pub fn from_slots<'a, I>(slots: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, Option<&'a str>)>,
    {
        let mut input = Self::default();
        for (name, value) in slots {
            if let Some(field) = BookingField::from_slot_name(name) {
                input.values.set(field, value.map(str::to_owned));
            }
        }
        input
    }

    pub fn get(&self, field: BookingField) -> Option<&str> {
        self.values.get(field)
    }

    pub fn is_empty(&self) -> bool {
        BookingField::ALL.into_iter().all(|field| self.get(field).is_none())
    }
}

/// Booking progress persisted by the platform between turns.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    start: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    end: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    duration: Option<String>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: BookingField, value: impl Into<String>) -> Self {
        let value = value.into();
        self.store(field, Some(value.as_str()));
        self
    }

    pub fn get(&self, field: BookingField) -> Option<&str> {
        let value = match field {
            BookingField::Date => &self.date,
            BookingField::Start => &self.start,
            BookingField::End => &self.end,
            BookingField::Duration => &self.duration,
        };
        non_empty(value.as_deref())
    }

    /// Records `value` for `field`. An absent or blank value leaves the stored one untouched.
    /// Returns whether the session changed.
    pub fn store(&mut self, field: BookingField, value: Option<&str>) -> bool {
        let Some(value) = non_empty(value) else {
            return false;
        };
        let slot = match field {
            BookingField::Date => &mut self.date,
            BookingField::Start => &mut self.start,
            BookingField::End => &mut self.end,
            BookingField::Duration => &mut self.duration,
        };
        if slot.as_deref() == Some(value) {
            return false;
        }
        *slot = Some(value.to_owned());
        true
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn is_empty(&self) -> bool {
        BookingField::ALL.into_iter().all(|field| self.get(field).is_none())
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|value| !value.trim().is_empty())
}
