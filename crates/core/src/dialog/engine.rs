use thiserror::Error;

use crate::audit::{AuditCategory, AuditContext, AuditEvent, AuditOutcome, AuditSink};
use crate::dialog::merge::merge;
use crate::dialog::states::{Card, DialogAction, DialogIntent, DialogOutcome, DialogState};
use crate::domain::booking::{BookingField, BookingRequest, SessionState, TurnInput};
use crate::format::SpeechFormatter;

pub const DEFAULT_SESSION_ENDED_MESSAGE: &str = "As you wish!";

const GREETING: &str = "Hi. When do you need a sitter?";
const GREETING_REPROMPT: &str = "For instructions, you can say, please help me.";

const ASK_DATE: &str = "When do you need a sitter?";
const ASK_START: &str = "Please try saying a start time for your request. For example, 7pm.";
const ASK_START_REPROMPT: &str = "You can also say a start time and end time, or a duration and \
                                  start time. For example, 7pm to 11pm or 4 hours starting at 7pm.";
const ASK_LENGTH: &str = "Please try saying a duration for your request. For example, 4 hours.";
const ASK_LENGTH_REPROMPT: &str = "You can also say just an end time. For example, 11pm.";

const HELP_TITLE: &str = "Sitterfied Help";
const HELP_SPEECH: &str = "I can request a sitter for you. Tell me the day, a start time and \
                           either an end time or a duration. For example, say, I need a sitter \
                           tomorrow at 7pm for 4 hours.";
const HELP_REPROMPT: &str = "What can I help you with?";

const FAREWELL_TITLE: &str = "Sitterfied";
const FAREWELL_CARD: &str = "Your sitter request was cancelled.";

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DialogError {
    #[error("unsupported intent: {name}")]
    UnrecognizedIntent { name: String },
}

/// Decides the next conversational step for a sitter request.
///
/// Every call re-merges the turn with the session and re-evaluates all four fields, so a
/// single utterance carrying date, start and duration goes straight to confirmation.
#[derive(Clone, Debug)]
pub struct DialogController {
    formatter: SpeechFormatter,
    session_ended_message: String,
}

impl Default for DialogController {
    fn default() -> Self {
        Self::new(SpeechFormatter::default())
    }
}

impl DialogController {
    pub fn new(formatter: SpeechFormatter) -> Self {
        Self { formatter, session_ended_message: DEFAULT_SESSION_ENDED_MESSAGE.to_owned() }
    }

    pub fn with_session_ended_message(mut self, message: impl Into<String>) -> Self {
        self.session_ended_message = message.into();
        self
    }

    pub fn greeting(&self) -> DialogAction {
        DialogAction::ask(GREETING, GREETING_REPROMPT)
    }

    pub fn help(&self) -> DialogAction {
        DialogAction::Help {
            speech: HELP_SPEECH.to_owned(),
            reprompt: HELP_REPROMPT.to_owned(),
            card: Card::new(HELP_TITLE, HELP_SPEECH),
        }
    }

    pub fn farewell(&self) -> DialogAction {
        DialogAction::EndSession {
            farewell: self.session_ended_message.clone(),
            card: Some(Card::new(FAREWELL_TITLE, FAREWELL_CARD)),
        }
    }

    pub fn advance(&self, input: &TurnInput, session: &mut SessionState) -> DialogAction {
        self.fill_slots(DialogIntent::DialogRequestSitter, input, session).action
    }

    pub fn respond(
        &self,
        intent: DialogIntent,
        input: &TurnInput,
        session: &mut SessionState,
    ) -> DialogOutcome {
        match intent {
            DialogIntent::DialogRequestSitter | DialogIntent::RequestSitter => {
                self.fill_slots(intent, input, session)
            }
            DialogIntent::Help => {
                DialogOutcome { intent, state: None, action: self.help(), stored: Vec::new() }
            }
            DialogIntent::Cancel | DialogIntent::Stop => {
                session.clear();
                DialogOutcome { intent, state: None, action: self.farewell(), stored: Vec::new() }
            }
        }
    }

    pub fn respond_with_audit<S>(
        &self,
        intent: DialogIntent,
        input: &TurnInput,
        session: &mut SessionState,
        sink: &S,
        audit: &AuditContext,
    ) -> DialogOutcome
    where
        S: AuditSink,
    {
        let outcome = self.respond(intent, input, session);
        let event_type = match &outcome.action {
            DialogAction::AskFollowUp { .. } => "dialog.follow_up_requested",
            DialogAction::Confirm { .. } => "dialog.confirmation_ready",
            DialogAction::Help { .. } => "dialog.help_requested",
            DialogAction::EndSession { .. } => "dialog.session_abandoned",
        };
        let stored = outcome
            .stored
            .iter()
            .map(|field| field.session_key())
            .collect::<Vec<_>>()
            .join(",");

        sink.emit(
            AuditEvent::new(audit, event_type, AuditCategory::Dialog, AuditOutcome::Success)
                .with_metadata("intent", outcome.intent.name())
                .with_metadata("state", outcome.state.map(DialogState::as_str).unwrap_or("none"))
                .with_metadata("action", outcome.action.kind())
                .with_metadata("stored", stored),
        );
        outcome
    }

    fn fill_slots(
        &self,
        intent: DialogIntent,
        input: &TurnInput,
        session: &mut SessionState,
    ) -> DialogOutcome {
        let merged = merge(input, session);
        let spoken = self.speak(&merged);
        // A value the formatter cannot render counts as not provided.
        let known = merged.filtered(|field| spoken.get(field).is_some());
        let state = DialogState::classify(&known);

        let stored = state
            .persisted_fields()
            .iter()
            .copied()
            .filter(|field| session.store(*field, known.get(*field)))
            .collect();

        let action = match state {
            DialogState::NoDate => DialogAction::ask(ASK_DATE, ASK_DATE),
            DialogState::DateOnly => DialogAction::ask(ASK_START, ASK_START_REPROMPT),
            DialogState::DateAndStart => DialogAction::ask(ASK_LENGTH, ASK_LENGTH_REPROMPT),
            DialogState::Complete => {
                DialogAction::Confirm { summary: confirmation_summary(&spoken) }
            }
        };

        DialogOutcome { intent, state: Some(state), action, stored }
    }

    fn speak(&self, booking: &BookingRequest) -> BookingRequest {
        BookingRequest {
            date: self.formatter.format_date(booking.get(BookingField::Date)),
            start: self.formatter.format_time(booking.get(BookingField::Start)),
            end: self.formatter.format_time(booking.get(BookingField::End)),
            duration: self.formatter.format_duration(booking.get(BookingField::Duration)),
        }
    }
}

fn confirmation_summary(spoken: &BookingRequest) -> String {
    let date = spoken.get(BookingField::Date).unwrap_or_default();
    let date_clause =
        if matches!(date, "today" | "tomorrow") { date.to_owned() } else { format!("on {date}") };
    let start = spoken.get(BookingField::Start).unwrap_or_default();
    let length_clause = match spoken.get(BookingField::Duration) {
        Some(duration) => format!("for {duration}"),
        None => format!("until {}", spoken.get(BookingField::End).unwrap_or_default()),
    };

    format!("You need a sitter {date_clause} at {start} {length_clause}. Is that correct?")
}
