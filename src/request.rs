use serde_json::Value;

use crate::attributes::{
    extract_environment, extract_resource, extract_subject, AttributeSet, EnvironmentAttrs,
};
use crate::error::{Error, ErrorKind};
use crate::obligation::{validate_obligations, Obligation};
use crate::purpose::{validate_purpose, PurposeVector};

/// A strongly typed, internally consistent policy evaluation request.
///
/// Built fresh per call from the host's loosely typed input; every field has
/// already satisfied its kind-specific contract, so the decision engine can
/// trust the value as-is. Handed by value to the engine and not retained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyRequest {
    /// Subject attributes (user, widget and device identity material).
    pub subject: AttributeSet,
    /// Resource attributes (requested feature or capability).
    pub resource: AttributeSet,
    /// Declared data-use purposes.
    pub purpose: PurposeVector,
    /// Validated obligations, input order.
    pub obligations: Vec<Obligation>,
    /// Environment attributes, single value per category.
    pub environment: EnvironmentAttrs,
}

impl PolicyRequest {
    /// Builds a request from the host's input tree.
    ///
    /// Pure composition of the extraction and validation passes, which run
    /// independently over disjoint parts of the same input. Malformed
    /// content (purpose vector, obligations, triggers) is dropped by those
    /// passes and never fails the build.
    ///
    /// # Errors
    ///
    /// Returns a [`BadType`](ErrorKind::BadType) error if the input is not
    /// an object, and a [`MissingArgument`](ErrorKind::MissingArgument)
    /// error if it is null. These are the only structural failures at this
    /// layer.
    pub fn from_value(input: &Value) -> Result<Self, Error> {
        if input.is_null() {
            return Err(Error::new(ErrorKind::MissingArgument, "argument missing"));
        }
        if !input.is_object() {
            return Err(Error::new(
                ErrorKind::BadType,
                "request input must be an object",
            ));
        }
        Ok(Self {
            subject: extract_subject(input),
            resource: extract_resource(input),
            purpose: validate_purpose(input),
            obligations: validate_obligations(input),
            environment: extract_environment(input),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::purpose::ONTOLOGY_SIZE;
    use serde_json::json;

    #[test]
    fn null_input_is_missing_argument() {
        let err = PolicyRequest::from_value(&Value::Null).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingArgument);
    }

    #[test]
    fn non_object_input_is_bad_type() {
        let err = PolicyRequest::from_value(&json!([1, 2, 3])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BadType);
        let err = PolicyRequest::from_value(&json!("request")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BadType);
    }

    #[test]
    fn empty_object_builds_default_request() {
        let request = PolicyRequest::from_value(&json!({})).unwrap();
        assert!(request.subject.is_empty());
        assert!(request.resource.is_empty());
        assert!(request.environment.is_empty());
        assert!(request.obligations.is_empty());
        assert_eq!(request.purpose.len(), ONTOLOGY_SIZE);
        assert!(request.purpose.flags().iter().all(|&f| f));
    }

    #[test]
    fn all_obligations_invalid_builds_empty_list_not_error() {
        let input = json!({
            "subjectInfo": { "userId": "alice" },
            "obligations": [
                { "action": { "actionID": "ActionBogus" }, "triggers": [] },
                { "triggers": [] }
            ]
        });
        let request = PolicyRequest::from_value(&input).unwrap();
        assert!(request.obligations.is_empty());
        assert_eq!(request.subject.values("user-id"), ["alice"]);
    }

    #[test]
    fn building_twice_yields_identical_requests() {
        let input = json!({
            "subjectInfo": { "userId": "alice" },
            "resourceInfo": { "apiFeature": "geolocation" },
            "purpose": vec![true; ONTOLOGY_SIZE],
            "obligations": [{
                "action": { "actionID": "ActionDelete" },
                "triggers": [{ "triggerID": "TriggerPersonalDataDeleted", "maxDelay": "PT1H" }]
            }]
        });
        let first = PolicyRequest::from_value(&input).unwrap();
        let second = PolicyRequest::from_value(&input).unwrap();
        assert_eq!(first, second);
    }
}
