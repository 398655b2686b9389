//! Obligation and trigger grammar validation.
//!
//! Obligations are optional data-handling hints, not access-control-critical
//! fields, so the grammar is enforced by dropping malformed units rather than
//! failing the request: an invalid trigger is dropped on its own, an invalid
//! action drops its obligation, and an obligation survives only with a valid
//! action and at least one valid trigger. Every drop is logged at debug
//! level; none is ever surfaced as an error.

use serde_json::Value;
use tracing::debug;

use crate::attributes::scalar_string;
use crate::purpose::validate_purpose_bits;

// Wire tags of the closed action/trigger grammar.
const ACTION_ID_TAG: &str = "actionID";
const TRIGGER_ID_TAG: &str = "triggerID";
const MEDIA_TAG: &str = "media";
const ADDRESS_TAG: &str = "address";
const START_TAG: &str = "start";
const MAX_DELAY_TAG: &str = "maxDelay";
const PURPOSE_TAG: &str = "purpose";
const URI_TAG: &str = "uri";

const ACTION_NOTIFY: &str = "ActionNotifyDataSubject";
const ACTION_DELETE: &str = "ActionDelete";
const ACTION_ANONYMIZE: &str = "ActionAnonymize";
const ACTION_LOG: &str = "ActionLog";
const ACTION_SECURE_LOG: &str = "ActionSecureLog";

const TRIGGER_AT_TIME: &str = "TriggerAtTime";
const TRIGGER_PERSONAL_DATA_ACCESSED: &str = "TriggerPersonalDataAccessedForPurpose";
const TRIGGER_PERSONAL_DATA_DELETED: &str = "TriggerPersonalDataDeleted";
const TRIGGER_DATA_SUBJECT_ACCESS: &str = "TriggerDataSubjectAccess";

/// A data-handling action the enforcing party commits to performing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Notify the data subject over the given medium at the given address.
    NotifyDataSubject {
        /// Notification medium (e.g. e-mail, SMS).
        media: String,
        /// Address to notify.
        address: String,
    },
    /// Delete the personal data.
    Delete,
    /// Anonymize the personal data.
    Anonymize,
    /// Log the data access.
    Log,
    /// Log the data access with integrity protection.
    SecureLog,
}

impl Action {
    /// Returns the wire identifier of this action kind.
    pub fn id(&self) -> &'static str {
        match self {
            Action::NotifyDataSubject { .. } => ACTION_NOTIFY,
            Action::Delete => ACTION_DELETE,
            Action::Anonymize => ACTION_ANONYMIZE,
            Action::Log => ACTION_LOG,
            Action::SecureLog => ACTION_SECURE_LOG,
        }
    }
}

/// A condition that activates an obligation's action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trigger {
    /// Fires at a point in time.
    AtTime {
        /// Start of the activation window.
        start: String,
        /// Maximum delay after `start`.
        max_delay: String,
    },
    /// Fires when personal data is accessed for one of the marked purposes.
    PersonalDataAccessedForPurpose {
        /// Purpose mask as a `'0'`/`'1'` string of ontology length.
        purposes: String,
        /// Maximum delay after the access.
        max_delay: String,
    },
    /// Fires when personal data is deleted.
    PersonalDataDeleted {
        /// Maximum delay after the deletion.
        max_delay: String,
    },
    /// Fires when the data subject requests access.
    DataSubjectAccess {
        /// Endpoint URI serving the access request.
        endpoint: String,
    },
}

impl Trigger {
    /// Returns the wire identifier of this trigger kind.
    pub fn id(&self) -> &'static str {
        match self {
            Trigger::AtTime { .. } => TRIGGER_AT_TIME,
            Trigger::PersonalDataAccessedForPurpose { .. } => TRIGGER_PERSONAL_DATA_ACCESSED,
            Trigger::PersonalDataDeleted { .. } => TRIGGER_PERSONAL_DATA_DELETED,
            Trigger::DataSubjectAccess { .. } => TRIGGER_DATA_SUBJECT_ACCESS,
        }
    }
}

/// One action paired with the triggers that activate it.
///
/// Only materialized when the action is valid and at least one trigger
/// validated; see [`validate_obligations`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Obligation {
    /// The committed action.
    pub action: Action,
    /// Valid triggers, input order.
    pub triggers: Vec<Trigger>,
}

/// Validates the optional top-level `obligations` field of a request input.
///
/// An absent field or a non-array value produces an empty list, not an
/// error. Each array element is validated independently; input order is
/// preserved for both obligations and their triggers.
pub fn validate_obligations(input: &Value) -> Vec<Obligation> {
    let Some(value) = input.get("obligations") else {
        return Vec::new();
    };
    let Some(elements) = value.as_array() else {
        debug!("invalid obligations parameter, it is not an array");
        return Vec::new();
    };
    debug!(count = elements.len(), "read obligations");
    elements
        .iter()
        .enumerate()
        .filter_map(|(i, element)| validate_obligation(i, element))
        .collect()
}

fn validate_obligation(index: usize, value: &Value) -> Option<Obligation> {
    let Some(action_value) = value.get("action") else {
        debug!(obligation = index, "action is missing");
        return None;
    };
    let action = validate_action(index, action_value)?;

    let Some(triggers_value) = value.get("triggers") else {
        debug!(obligation = index, "triggers are missing");
        return None;
    };
    let Some(trigger_elements) = triggers_value.as_array() else {
        debug!(obligation = index, "invalid triggers parameter, it is not an array");
        return None;
    };
    debug!(
        obligation = index,
        count = trigger_elements.len(),
        "triggers found"
    );

    // Each trigger stands or falls on its own; a bad one never takes its
    // siblings or the obligation down with it.
    let triggers: Vec<Trigger> = trigger_elements
        .iter()
        .enumerate()
        .filter_map(|(j, element)| validate_trigger(index, j, element))
        .collect();

    if triggers.is_empty() {
        debug!(obligation = index, "no valid trigger, dropping obligation");
        return None;
    }
    Some(Obligation { action, triggers })
}

fn scalar_field(value: &Value, tag: &str) -> Option<String> {
    value.get(tag).and_then(scalar_string)
}

fn validate_action(index: usize, value: &Value) -> Option<Action> {
    let Some(action_id) = scalar_field(value, ACTION_ID_TAG) else {
        debug!(obligation = index, "actionID is missing");
        return None;
    };
    debug!(obligation = index, action_id = %action_id, "validating action");
    match action_id.as_str() {
        ACTION_NOTIFY => {
            let Some(media) = scalar_field(value, MEDIA_TAG) else {
                debug!(obligation = index, "media is missing");
                return None;
            };
            let Some(address) = scalar_field(value, ADDRESS_TAG) else {
                debug!(obligation = index, "address is missing");
                return None;
            };
            Some(Action::NotifyDataSubject { media, address })
        }
        ACTION_DELETE => Some(Action::Delete),
        ACTION_ANONYMIZE => Some(Action::Anonymize),
        ACTION_LOG => Some(Action::Log),
        ACTION_SECURE_LOG => Some(Action::SecureLog),
        other => {
            debug!(obligation = index, action_id = %other, "unrecognized actionID");
            None
        }
    }
}

fn validate_trigger(ob_index: usize, index: usize, value: &Value) -> Option<Trigger> {
    let Some(trigger_id) = scalar_field(value, TRIGGER_ID_TAG) else {
        debug!(obligation = ob_index, trigger = index, "triggerID is missing");
        return None;
    };
    debug!(
        obligation = ob_index,
        trigger = index,
        trigger_id = %trigger_id,
        "validating trigger"
    );
    match trigger_id.as_str() {
        TRIGGER_AT_TIME => {
            let Some(start) = scalar_field(value, START_TAG) else {
                debug!(obligation = ob_index, trigger = index, "start is missing");
                return None;
            };
            let Some(max_delay) = scalar_field(value, MAX_DELAY_TAG) else {
                debug!(obligation = ob_index, trigger = index, "maxDelay is missing");
                return None;
            };
            Some(Trigger::AtTime { start, max_delay })
        }
        TRIGGER_PERSONAL_DATA_ACCESSED => {
            let Some(purpose_value) = value.get(PURPOSE_TAG) else {
                debug!(obligation = ob_index, trigger = index, "purpose is missing");
                return None;
            };
            let Some(purposes) = validate_purpose_bits(purpose_value) else {
                debug!(obligation = ob_index, trigger = index, "invalid purpose vector");
                return None;
            };
            let Some(max_delay) = scalar_field(value, MAX_DELAY_TAG) else {
                debug!(obligation = ob_index, trigger = index, "maxDelay is missing");
                return None;
            };
            Some(Trigger::PersonalDataAccessedForPurpose { purposes, max_delay })
        }
        TRIGGER_PERSONAL_DATA_DELETED => {
            let Some(max_delay) = scalar_field(value, MAX_DELAY_TAG) else {
                debug!(obligation = ob_index, trigger = index, "maxDelay is missing");
                return None;
            };
            Some(Trigger::PersonalDataDeleted { max_delay })
        }
        TRIGGER_DATA_SUBJECT_ACCESS => {
            let Some(endpoint) = scalar_field(value, URI_TAG) else {
                debug!(obligation = ob_index, trigger = index, "uri is missing");
                return None;
            };
            Some(Trigger::DataSubjectAccess { endpoint })
        }
        other => {
            debug!(
                obligation = ob_index,
                trigger = index,
                trigger_id = %other,
                "unrecognized triggerID"
            );
            None
        }
    }
}
