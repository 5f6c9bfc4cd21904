use crate::domain::booking::{BookingField, BookingRequest, SessionState, TurnInput};

/// Folds this turn's slot values over the session: a non-empty value heard now wins,
/// otherwise the stored value is kept, otherwise the field stays absent.
pub fn merge(input: &TurnInput, session: &SessionState) -> BookingRequest {
    let mut merged = BookingRequest::default();
    for field in BookingField::ALL {
        let value = input.get(field).or_else(|| session.get(field));
        merged.set(field, value.map(str::to_owned));
    }
    merged
}
