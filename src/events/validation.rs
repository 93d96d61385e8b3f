//! Request validation for event creation
//!
//! Runs before the service's business rule and reports every failing field
//! at once.

use crate::error::{Error, FieldError, Result};
use crate::events::types::{CreateEventRequest, NewEvent};

/// Longest event name accepted, in characters
pub const MAX_NAME_LEN: usize = 100;

/// Validate a create request into a [`NewEvent`]
pub fn validate_create(request: CreateEventRequest) -> Result<NewEvent> {
    let mut errors = Vec::new();

    let name = match request.name {
        Some(name) if !name.trim().is_empty() => {
            if name.chars().count() > MAX_NAME_LEN {
                errors.push(FieldError::new(
                    "name",
                    format!("Event name must not exceed {} characters", MAX_NAME_LEN),
                ));
            }
            Some(name)
        }
        _ => {
            errors.push(FieldError::new("name", "Event name is required"));
            None
        }
    };

    if request.date.is_none() {
        errors.push(FieldError::new("date", "Event date is required"));
    }

    let location = match request.location {
        Some(location) if !location.trim().is_empty() => Some(location),
        _ => {
            errors.push(FieldError::new("location", "Location is required"));
            None
        }
    };

    match (name, request.date, location) {
        (Some(name), Some(date), Some(location)) if errors.is_empty() => Ok(NewEvent {
            name,
            description: request.description,
            date,
            location,
        }),
        _ => Err(Error::Validation(errors)),
    }
}
