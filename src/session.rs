//! Session lifecycle around the decision engine.
//!
//! A session owns a policy-file reference and an identity-provider seed and
//! holds exactly one live decision-engine instance at a time. The instance
//! is issued through a caller-supplied factory on session start and is
//! destroyed and replaced on `reload_policy`. Sessions are intended for
//! single-threaded, call-by-call use; the host serializes `check_request`
//! against `reload_policy`.

use serde_json::Value;
use tracing::debug;

use crate::attributes::scalar_string;
use crate::effect::Effect;
use crate::engine::DecisionEngine;
use crate::error::{Error, ErrorKind};
use crate::request::PolicyRequest;

/// Wire key carrying the personal-zone owner identity in a seed object.
pub const OWNER_ID_KEY: &str = "http://webinos.org/subject/id/PZ-Owner";

/// Wire key carrying the list of known identities in a seed object.
pub const KNOWN_IDS_KEY: &str = "http://webinos.org/subject/id/known";

/// Identity-provider seed handed to the decision engine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentitySeed {
    /// The zone owner identity, if declared.
    pub owner_id: Option<String>,
    /// Known identities, input order.
    pub known_ids: Vec<String>,
}

impl IdentitySeed {
    /// Parses a seed from the loosely typed wire object.
    ///
    /// Both keys are optional; non-scalar entries in the known list are
    /// skipped. Only the shape of the top-level value is enforced.
    ///
    /// # Errors
    ///
    /// Returns a [`MissingArgument`](ErrorKind::MissingArgument) error for a
    /// null value and a [`BadType`](ErrorKind::BadType) error for anything
    /// that is not an object.
    pub fn from_value(value: &Value) -> Result<Self, Error> {
        if value.is_null() {
            return Err(Error::new(ErrorKind::MissingArgument, "argument missing"));
        }
        let Some(map) = value.as_object() else {
            return Err(Error::new(
                ErrorKind::BadType,
                "identity seed must be an object",
            ));
        };
        let owner_id = map.get(OWNER_ID_KEY).and_then(scalar_string);
        if let Some(id) = &owner_id {
            debug!(owner_id = %id, "seed owner identity");
        }
        let known_ids: Vec<String> = map
            .get(KNOWN_IDS_KEY)
            .and_then(Value::as_array)
            .map(|list| list.iter().filter_map(scalar_string).collect())
            .unwrap_or_default();
        for (i, id) in known_ids.iter().enumerate() {
            debug!(index = i, known_id = %id, "seed known identity");
        }
        Ok(Self { owner_id, known_ids })
    }
}

/// Factory issuing decision-engine instances for a policy file and seed.
///
/// Called once on session start and once per `reload_policy`.
pub type EngineFactory =
    Box<dyn Fn(&str, &IdentitySeed) -> Result<Box<dyn DecisionEngine>, Error>>;

/// A policy manager session: one policy file, one live decision engine.
pub struct PolicyManagerSession {
    policy_file: String,
    factory: EngineFactory,
    engine: Box<dyn DecisionEngine>,
}

impl core::fmt::Debug for PolicyManagerSession {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PolicyManagerSession")
            .field("policy_file", &self.policy_file)
            .finish_non_exhaustive()
    }
}

impl PolicyManagerSession {
    /// Starts a session for a policy file and identity seed.
    ///
    /// Argument shapes are validated before the engine is built.
    ///
    /// # Errors
    ///
    /// Returns a [`MissingArgument`](ErrorKind::MissingArgument) error if
    /// either argument is null, a [`BadType`](ErrorKind::BadType) error if
    /// the policy file path is not a string or the seed is not an object,
    /// and whatever the factory reports if the engine cannot be issued.
    pub fn new(policy_file: &Value, seed: &Value, factory: EngineFactory) -> Result<Self, Error> {
        if policy_file.is_null() {
            return Err(Error::new(ErrorKind::MissingArgument, "argument missing"));
        }
        let Some(path) = policy_file.as_str() else {
            return Err(Error::new(
                ErrorKind::BadType,
                "policy file path must be a string",
            ));
        };
        debug!(policy_file = %path, "starting policy manager session");
        let seed = IdentitySeed::from_value(seed)?;
        let engine = factory(path, &seed)?;
        Ok(Self {
            policy_file: path.to_string(),
            factory,
            engine,
        })
    }

    /// Normalizes, validates and evaluates one request.
    ///
    /// Content-level problems in the input never fail this call; they only
    /// reduce the data reaching the engine.
    ///
    /// # Errors
    ///
    /// Structural errors only: a null input yields
    /// [`MissingArgument`](ErrorKind::MissingArgument), a non-object input
    /// yields [`BadType`](ErrorKind::BadType).
    pub fn check_request(&self, input: &Value) -> Result<Effect, Error> {
        let request = PolicyRequest::from_value(input)?;
        Ok(self.engine.check_request(&request))
    }

    /// Like [`check_request`](Self::check_request), additionally returning
    /// the diagnostic policy path that produced the decision.
    ///
    /// # Errors
    ///
    /// Same structural errors as [`check_request`](Self::check_request).
    pub fn check_request_with_path(&self, input: &Value) -> Result<(Effect, String), Error> {
        let request = PolicyRequest::from_value(input)?;
        let (effect, path) = self.engine.check_request_with_path(&request);
        debug!(%effect, path = %path, "request evaluated");
        Ok((effect, path))
    }

    /// Replaces the live engine with a freshly issued instance.
    ///
    /// Returns `0` on success, matching the host boundary's status-code
    /// convention.
    ///
    /// # Errors
    ///
    /// Returns a structural error for a missing/malformed seed, or the
    /// factory's error if the policy source cannot be re-read. The previous
    /// engine stays live in that case.
    pub fn reload_policy(&mut self, seed: &Value) -> Result<i32, Error> {
        debug!(policy_file = %self.policy_file, "reloading policy");
        let seed = IdentitySeed::from_value(seed)?;
        self.engine = (self.factory)(&self.policy_file, &seed)?;
        Ok(0)
    }

    /// Returns the stored policy file path.
    pub fn policy_filename(&self) -> &str {
        &self.policy_file
    }

    /// Returns the live engine, for hosts that need direct port access.
    pub fn engine(&self) -> &dyn DecisionEngine {
        self.engine.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn seed_parses_owner_and_known_ids() {
        let value = json!({
            (OWNER_ID_KEY): "owner@pzh.example.org",
            (KNOWN_IDS_KEY): ["friend@pzh.example.org", "tv@pzh.example.org"]
        });
        let seed = IdentitySeed::from_value(&value).unwrap();
        assert_eq!(seed.owner_id.as_deref(), Some("owner@pzh.example.org"));
        assert_eq!(
            seed.known_ids,
            ["friend@pzh.example.org", "tv@pzh.example.org"]
        );
    }

    #[test]
    fn seed_keys_are_optional() {
        let seed = IdentitySeed::from_value(&json!({})).unwrap();
        assert!(seed.owner_id.is_none());
        assert!(seed.known_ids.is_empty());
    }

    #[test]
    fn seed_skips_non_scalar_known_entries() {
        let value = json!({ (KNOWN_IDS_KEY): ["one", { "two": 2 }, 3] });
        let seed = IdentitySeed::from_value(&value).unwrap();
        assert_eq!(seed.known_ids, ["one", "3"]);
    }

    #[test]
    fn seed_rejects_null_and_non_object() {
        let err = IdentitySeed::from_value(&Value::Null).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingArgument);
        let err = IdentitySeed::from_value(&json!("owner")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BadType);
    }
}
