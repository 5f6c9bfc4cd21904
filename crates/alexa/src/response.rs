use serde::Serialize;
use sitterfied_core::dialog::{Card, DialogAction};
use sitterfied_core::domain::booking::SessionState;

pub const RESPONSE_VERSION: &str = "1.0";

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum OutputSpeech {
    PlainText { text: String },
}

impl OutputSpeech {
    pub fn plain(text: impl Into<String>) -> Self {
        Self::PlainText { text: text.into() }
    }

    pub fn text(&self) -> &str {
        match self {
            Self::PlainText { text } => text,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Reprompt {
    pub output_speech: OutputSpeech,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum ResponseCard {
    Simple { title: String, content: String },
}

impl From<&Card> for ResponseCard {
    fn from(card: &Card) -> Self {
        Self::Simple { title: card.title.clone(), content: card.content.clone() }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_speech: Option<OutputSpeech>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reprompt: Option<Reprompt>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card: Option<ResponseCard>,
    pub should_end_session: bool,
}

/// Reply to one turn. Session attributes are echoed back only when at least one booking
/// field is known.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseEnvelope {
    pub version: String,
    pub response: ResponseBody,
    #[serde(skip_serializing_if = "SessionState::is_empty")]
    pub session_attributes: SessionState,
}

impl ResponseEnvelope {
    fn build(
        speech: Option<OutputSpeech>,
        reprompt: Option<String>,
        card: Option<ResponseCard>,
        should_end_session: bool,
    ) -> Self {
        Self {
            version: RESPONSE_VERSION.to_owned(),
            response: ResponseBody {
                output_speech: speech,
                reprompt: reprompt.map(|text| Reprompt { output_speech: OutputSpeech::plain(text) }),
                card,
                should_end_session,
            },
            session_attributes: SessionState::new(),
        }
    }

    pub fn ask(speech: impl Into<String>, reprompt: impl Into<String>) -> Self {
        Self::build(Some(OutputSpeech::plain(speech)), Some(reprompt.into()), None, false)
    }

    pub fn ask_with_card(
        speech: impl Into<String>,
        reprompt: impl Into<String>,
        card: &Card,
    ) -> Self {
        Self::build(Some(OutputSpeech::plain(speech)), Some(reprompt.into()), Some(card.into()), false)
    }

    pub fn tell(speech: impl Into<String>) -> Self {
        Self::build(Some(OutputSpeech::plain(speech)), None, None, true)
    }

    pub fn tell_with_card(speech: impl Into<String>, card: &Card) -> Self {
        Self::build(Some(OutputSpeech::plain(speech)), None, Some(card.into()), true)
    }

    /// Closes the conversation without saying anything.
    pub fn end_silently() -> Self {
        Self::build(None, None, None, true)
    }

    pub fn from_action(action: &DialogAction) -> Self {
        match action {
            DialogAction::AskFollowUp { question, reprompt } => Self::ask(question, reprompt),
            DialogAction::Confirm { summary } => Self::ask(summary, summary),
            DialogAction::Help { speech, reprompt, card } => {
                Self::ask_with_card(speech, reprompt, card)
            }
            DialogAction::EndSession { farewell, card: Some(card) } => {
                Self::tell_with_card(farewell, card)
            }
            DialogAction::EndSession { farewell, card: None } => Self::tell(farewell),
        }
    }

    pub fn with_session(mut self, session: &SessionState) -> Self {
        self.session_attributes = session.clone();
        self
    }

    pub fn speech(&self) -> Option<&str> {
        self.response.output_speech.as_ref().map(OutputSpeech::text)
    }

    pub fn ends_session(&self) -> bool {
        self.response.should_end_session
    }
}
