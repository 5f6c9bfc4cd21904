use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::dialog::engine::DialogError;
use crate::domain::booking::{BookingField, BookingRequest};

/// Progress of a booking, derived from the merged fields alone.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DialogState {
    NoDate,
    DateOnly,
    DateAndStart,
    Complete,
}

impl DialogState {
    /// Date is checked first, then start, then end/duration.
    pub fn classify(booking: &BookingRequest) -> Self {
        if booking.get(BookingField::Date).is_none() {
            return Self::NoDate;
        }
        if booking.get(BookingField::Start).is_none() {
            return Self::DateOnly;
        }
        if !booking.has_end_or_duration() {
            return Self::DateAndStart;
        }
        Self::Complete
    }

    /// Fields persisted to the session when a turn lands in this state.
    pub fn persisted_fields(self) -> &'static [BookingField] {
        match self {
            Self::NoDate => &[],
            Self::DateOnly => &[BookingField::Date],
            Self::DateAndStart => &[BookingField::Date, BookingField::Start],
            Self::Complete => &BookingField::ALL,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::NoDate => "no_date",
            Self::DateOnly => "date_only",
            Self::DateAndStart => "date_and_start",
            Self::Complete => "complete",
        }
    }
}

/// Intents the skill answers. Anything else is rejected when parsed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DialogIntent {
    DialogRequestSitter,
    RequestSitter,
    Help,
    Cancel,
    Stop,
}

impl DialogIntent {
    pub const ALL: [DialogIntent; 5] = [
        DialogIntent::DialogRequestSitter,
        DialogIntent::RequestSitter,
        DialogIntent::Help,
        DialogIntent::Cancel,
        DialogIntent::Stop,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::DialogRequestSitter => "DialogRequestSitterIntent",
            Self::RequestSitter => "RequestSitterIntent",
            Self::Help => "AMAZON.HelpIntent",
            Self::Cancel => "AMAZON.CancelIntent",
            Self::Stop => "AMAZON.StopIntent",
        }
    }

    pub fn fills_slots(self) -> bool {
        matches!(self, Self::DialogRequestSitter | Self::RequestSitter)
    }
}

impl FromStr for DialogIntent {
    type Err = DialogError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|intent| intent.name() == value)
            .ok_or_else(|| DialogError::UnrecognizedIntent { name: value.to_owned() })
    }
}

impl fmt::Display for DialogIntent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub title: String,
    pub content: String,
}

impl Card {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self { title: title.into(), content: content.into() }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DialogAction {
    AskFollowUp { question: String, reprompt: String },
    Confirm { summary: String },
    Help { speech: String, reprompt: String, card: Card },
    EndSession { farewell: String, card: Option<Card> },
}

impl DialogAction {
    pub fn ask(question: impl Into<String>, reprompt: impl Into<String>) -> Self {
        Self::AskFollowUp { question: question.into(), reprompt: reprompt.into() }
    }

    pub fn speech(&self) -> &str {
        match self {
            Self::AskFollowUp { question, .. } => question,
            Self::Confirm { summary } => summary,
            Self::Help { speech, .. } => speech,
            Self::EndSession { farewell, .. } => farewell,
        }
    }

    pub fn ends_session(&self) -> bool {
        matches!(self, Self::EndSession { .. })
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::AskFollowUp { .. } => "ask_follow_up",
            Self::Confirm { .. } => "confirm",
            Self::Help { .. } => "help",
            Self::EndSession { .. } => "end_session",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogOutcome {
    pub intent: DialogIntent,
    /// `None` for canned intents that ignore the booking.
    pub state: Option<DialogState>,
    pub action: DialogAction,
    pub stored: Vec<BookingField>,
}

#[cfg(test)]
mod tests {
    use crate::dialog::engine::DialogError;
    use crate::dialog::states::{DialogAction, DialogIntent, DialogState};
    use crate::domain::booking::BookingRequest;

    fn booking(date: bool, start: bool, end: bool, duration: bool) -> BookingRequest {
        BookingRequest {
            date: date.then(|| "2016-12-31".to_owned()),
            start: start.then(|| "18:00".to_owned()),
            end: end.then(|| "22:00".to_owned()),
            duration: duration.then(|| "PT4H".to_owned()),
        }
    }

    #[test]
    fn classification_follows_field_priority() {
        assert_eq!(DialogState::classify(&booking(false, false, false, false)), DialogState::NoDate);
        assert_eq!(DialogState::classify(&booking(true, false, false, false)), DialogState::DateOnly);
        assert_eq!(
            DialogState::classify(&booking(true, true, false, false)),
            DialogState::DateAndStart
        );
        assert_eq!(DialogState::classify(&booking(true, true, true, false)), DialogState::Complete);
        assert_eq!(DialogState::classify(&booking(true, true, false, true)), DialogState::Complete);
    }

    #[test]
    fn missing_date_wins_over_everything_else() {
        assert_eq!(DialogState::classify(&booking(false, true, true, true)), DialogState::NoDate);
        assert_eq!(DialogState::classify(&booking(false, true, false, false)), DialogState::NoDate);
        assert_eq!(DialogState::classify(&booking(true, false, true, true)), DialogState::DateOnly);
    }

    #[test]
    fn intents_parse_from_platform_names() {
        for intent in DialogIntent::ALL {
            assert_eq!(intent.name().parse::<DialogIntent>(), Ok(intent));
        }
        assert!(DialogIntent::RequestSitter.fills_slots());
        assert!(!DialogIntent::Help.fills_slots());
    }

    #[test]
    fn unknown_intent_name_is_an_error() {
        let error = "BookTaxiIntent".parse::<DialogIntent>().expect_err("must reject");
        assert_eq!(error, DialogError::UnrecognizedIntent { name: "BookTaxiIntent".to_owned() });
    }

    #[test]
    fn only_end_session_closes_the_conversation() {
        assert!(!DialogAction::ask("q", "r").ends_session());
        assert!(!DialogAction::Confirm { summary: "s".to_owned() }.ends_session());
        assert!(DialogAction::EndSession { farewell: "bye".to_owned(), card: None }.ends_session());
    }
}
