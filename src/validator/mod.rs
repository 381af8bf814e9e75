//! Roster record validation.
//!
//! Turns a [`RawRecord`] into a [`RosterRecord`] or a [`Rejection`]. Rules are checked
//! in a fixed order and the first failing rule decides the rejection reason.

use std::fmt;

use crate::models::{RawRecord, RosterRecord, SyncVariant, UserType};

/// Why a record was not synced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    MissingName,
    MissingType,
    PlayerMissingYearOrBirthday,
    InvalidType,
    MissingContactFields,
    MissingEnableFlag,
}

impl Rejection {
    pub fn message(&self) -> &'static str {
        match self {
            Rejection::MissingName => "missing name",
            Rejection::MissingType => "missing type",
            Rejection::PlayerMissingYearOrBirthday => "player missing year/birthday",
            Rejection::InvalidType => "invalid type",
            Rejection::MissingContactFields => "missing contact fields",
            Rejection::MissingEnableFlag => "missing enable flag",
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Non-empty value of an optional field.
fn present(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|v| !v.is_empty())
}

/// Validate and normalize one raw record for the given entry point.
pub fn validate(raw: &RawRecord, variant: SyncVariant) -> Result<RosterRecord, Rejection> {
    let (Some(first_name), Some(last_name)) = (present(&raw.first_name), present(&raw.last_name))
    else {
        return Err(Rejection::MissingName);
    };

    let type_name = present(&raw.user_type).ok_or(Rejection::MissingType)?;
    let user_type = if type_name == UserType::Player.as_str() {
        if present(&raw.year).is_none() || present(&raw.birthday).is_none() {
            return Err(Rejection::PlayerMissingYearOrBirthday);
        }
        UserType::Player
    } else {
        UserType::from_str(type_name)
            .filter(|t| variant.allows(*t))
            .ok_or(Rejection::InvalidType)?
    };

    let (Some(title), Some(email), Some(phone)) = (
        present(&raw.title),
        present(&raw.email),
        present(&raw.phone),
    ) else {
        return Err(Rejection::MissingContactFields);
    };

    let enable = if variant.requires_enable() {
        Some(raw.enable.ok_or(Rejection::MissingEnableFlag)?)
    } else {
        None
    };

    let groups = present(&raw.groups).map(|g| g.split(',').map(str::to_string).collect());

    Ok(RosterRecord {
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        user_type,
        title: title.to_string(),
        email: email.to_string(),
        phone: phone.to_string(),
        year: present(&raw.year).map(str::to_string),
        birthday: present(&raw.birthday).map(str::to_string),
        groups,
        enable,
    })
}
