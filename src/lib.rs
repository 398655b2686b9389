//! Request normalization and validation for an ABAC policy enforcement point.
//!
//! This crate is the layer between a host runtime and a policy decision
//! engine. It accepts loosely structured, externally supplied data about the
//! requesting subject, the resource being requested, the environment, and
//! optional data-handling preferences, and produces a strongly typed
//! [`PolicyRequest`] the engine can trust:
//!
//! - **Attribute extraction**: nested input groups are mapped onto fixed
//!   category catalogs; unknown fields are ignored, unpopulated categories
//!   stay present but empty.
//! - **Purpose vector validation**: an optional boolean vector is checked
//!   against the fixed purpose ontology; an absent vector defaults to
//!   all-`true`, a malformed one to empty.
//! - **Obligation/trigger grammar**: actions and triggers are validated
//!   against a closed grammar with per-kind required fields; malformed units
//!   are dropped with diagnostics, never raised as errors.
//!
//! # Example
//!
//! ```
//! use policy_pep::{Effect, PolicyManagerSession, RecordingEngine};
//! use serde_json::json;
//!
//! let session = PolicyManagerSession::new(
//!     &json!("/etc/pep/policy.xml"),
//!     &json!({ "http://webinos.org/subject/id/PZ-Owner": "owner@pzh.example.org" }),
//!     Box::new(|path, _seed| Ok(Box::new(RecordingEngine::new(path, Effect::Permit)))),
//! )
//! .expect("well-formed session arguments");
//!
//! let effect = session
//!     .check_request(&json!({
//!         "subjectInfo": { "userId": "alice" },
//!         "resourceInfo": { "apiFeature": "geolocation" }
//!     }))
//!     .expect("structurally valid request");
//!
//! assert_eq!(effect.code(), 0); // PERMIT
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod attributes;
mod effect;
mod engine;
mod error;
mod obligation;
mod purpose;
mod request;
mod session;

pub use attributes::{AttributeSet, EnvironmentAttrs};
pub use effect::Effect;
pub use engine::{DecisionEngine, RecordingEngine};
pub use error::{Error, ErrorKind};
pub use obligation::{validate_obligations, Action, Obligation, Trigger};
pub use purpose::{validate_purpose, PurposeVector, ONTOLOGY_SIZE, PURPOSE_ONTOLOGY};
pub use request::PolicyRequest;
pub use session::{
    EngineFactory, IdentitySeed, PolicyManagerSession, KNOWN_IDS_KEY, OWNER_ID_KEY,
};
