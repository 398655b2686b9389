//! Port to the external policy decision engine.
//!
//! The engine's rule-matching algorithm is an opaque dependency: this crate
//! only shapes its input. `RecordingEngine` is an offline stand-in that
//! records every request it is asked to evaluate, keeping tests and demos
//! deterministic without a real policy store.

use std::cell::RefCell;
use std::rc::Rc;

use crate::effect::Effect;
use crate::error::{Error, ErrorKind};
use crate::request::PolicyRequest;
use crate::session::IdentitySeed;

/// The policy decision port.
///
/// Implementations evaluate a [`PolicyRequest`] against stored rules and
/// produce an [`Effect`]. Evaluation must not retain the request.
pub trait DecisionEngine {
    /// Evaluates a request.
    fn check_request(&self, request: &PolicyRequest) -> Effect;

    /// Evaluates a request and additionally reports the policy path that
    /// produced the decision, for audit and debugging.
    fn check_request_with_path(&self, request: &PolicyRequest) -> (Effect, String);

    /// Re-reads the policy source with a fresh identity seed.
    ///
    /// # Errors
    ///
    /// Fails if the underlying policy source cannot be re-read; the failure
    /// is fatal to the caller of the reload.
    fn reload(&mut self, seed: &IdentitySeed) -> Result<(), Error>;

    /// Returns the policy file backing this engine.
    fn policy_file_name(&self) -> &str;
}

/// An offline decision engine that records the requests it evaluates.
///
/// Returns a fixed effect and path. Clones share the recording buffers, so
/// a test can keep a probe handle while a session owns the engine itself.
#[derive(Debug, Clone)]
pub struct RecordingEngine {
    policy_file: String,
    effect: Effect,
    path: String,
    requests: Rc<RefCell<Vec<PolicyRequest>>>,
    reloads: Rc<RefCell<Vec<IdentitySeed>>>,
    fail_reload: bool,
}

impl RecordingEngine {
    /// Creates an engine that answers every request with `effect`.
    pub fn new(policy_file: impl Into<String>, effect: Effect) -> Self {
        Self {
            policy_file: policy_file.into(),
            effect,
            path: String::new(),
            requests: Rc::new(RefCell::new(Vec::new())),
            reloads: Rc::new(RefCell::new(Vec::new())),
            fail_reload: false,
        }
    }

    /// Sets the diagnostic path reported alongside decisions.
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Makes every subsequent `reload` fail, simulating an unreadable
    /// policy source.
    pub fn with_failing_reload(mut self) -> Self {
        self.fail_reload = true;
        self
    }

    /// Returns copies of the requests evaluated so far, in order.
    pub fn requests(&self) -> Vec<PolicyRequest> {
        self.requests.borrow().clone()
    }

    /// Returns the identity seeds passed to `reload` so far, in order.
    pub fn reloads(&self) -> Vec<IdentitySeed> {
        self.reloads.borrow().clone()
    }
}

impl DecisionEngine for RecordingEngine {
    fn check_request(&self, request: &PolicyRequest) -> Effect {
        self.requests.borrow_mut().push(request.clone());
        self.effect
    }

    fn check_request_with_path(&self, request: &PolicyRequest) -> (Effect, String) {
        self.requests.borrow_mut().push(request.clone());
        (self.effect, self.path.clone())
    }

    fn reload(&mut self, seed: &IdentitySeed) -> Result<(), Error> {
        if self.fail_reload {
            return Err(Error::new(
                ErrorKind::PolicyLoad,
                format!("cannot re-read policy source '{}'", self.policy_file),
            ));
        }
        self.reloads.borrow_mut().push(seed.clone());
        Ok(())
    }

    fn policy_file_name(&self) -> &str {
        &self.policy_file
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn recording_engine_records_requests_in_order() {
        let engine = RecordingEngine::new("policy.xml", Effect::Permit);
        let first = PolicyRequest::from_value(&json!({ "subjectInfo": { "userId": "a" } })).unwrap();
        let second = PolicyRequest::from_value(&json!({ "subjectInfo": { "userId": "b" } })).unwrap();

        assert_eq!(engine.check_request(&first), Effect::Permit);
        assert_eq!(engine.check_request(&second), Effect::Permit);

        let recorded = engine.requests();
        assert_eq!(recorded.len(), 2);
        assert_eq!(recorded[0].subject.values("user-id"), ["a"]);
        assert_eq!(recorded[1].subject.values("user-id"), ["b"]);
    }

    #[test]
    fn clones_share_the_recording_buffer() {
        let engine = RecordingEngine::new("policy.xml", Effect::Deny);
        let probe = engine.clone();
        let request = PolicyRequest::from_value(&json!({})).unwrap();
        engine.check_request(&request);
        assert_eq!(probe.requests().len(), 1);
    }

    #[test]
    fn recording_engine_reports_configured_path() {
        let engine = RecordingEngine::new("policy.xml", Effect::Deny).with_path("policy/rule[2]");
        let request = PolicyRequest::from_value(&json!({})).unwrap();
        let (effect, path) = engine.check_request_with_path(&request);
        assert_eq!(effect, Effect::Deny);
        assert_eq!(path, "policy/rule[2]");
    }

    #[test]
    fn reload_records_seed_or_fails_when_configured() {
        let seed = IdentitySeed {
            owner_id: Some("owner".to_string()),
            known_ids: vec!["peer".to_string()],
        };

        let mut ok_engine = RecordingEngine::new("policy.xml", Effect::Permit);
        ok_engine.reload(&seed).unwrap();
        assert_eq!(ok_engine.reloads(), [seed.clone()]);

        let mut bad_engine =
            RecordingEngine::new("policy.xml", Effect::Permit).with_failing_reload();
        let err = bad_engine.reload(&seed).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PolicyLoad);
    }

    #[test]
    fn policy_file_name_is_stored() {
        let engine = RecordingEngine::new("/etc/pep/policy.xml", Effect::Inapplicable);
        assert_eq!(engine.policy_file_name(), "/etc/pep/policy.xml");
    }
}
