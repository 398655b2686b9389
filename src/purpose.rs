//! Purpose vector validation against the fixed purpose ontology.

use serde_json::Value;
use tracing::debug;

/// The fixed data-use purpose ontology.
///
/// The catalog order is the wire order: position `i` of a purpose vector
/// declares the purpose named at `PURPOSE_ONTOLOGY[i]`.
pub const PURPOSE_ONTOLOGY: [&str; 16] = [
    "http://www.w3.org/2002/01/P3Pv1/current",
    "http://www.w3.org/2002/01/P3Pv1/admin",
    "http://www.w3.org/2002/01/P3Pv1/develop",
    "http://www.w3.org/2002/01/P3Pv1/tailoring",
    "http://www.w3.org/2002/01/P3Pv1/pseudo-analysis",
    "http://www.w3.org/2002/01/P3Pv1/pseudo-decision",
    "http://www.w3.org/2002/01/P3Pv1/individual-analysis",
    "http://www.w3.org/2002/01/P3Pv1/individual-decision",
    "http://www.w3.org/2002/01/P3Pv1/contact",
    "http://www.w3.org/2002/01/P3Pv1/historical",
    "http://www.w3.org/2002/01/P3Pv1/telemarketing",
    "http://www.w3.org/2002/01/P3Pv1/other-purpose",
    "http://www.primelife.eu/purposes/account",
    "http://www.primelife.eu/purposes/delivery",
    "http://www.primelife.eu/purposes/marketing",
    "http://www.primelife.eu/purposes/payment",
];

/// Number of purposes in the ontology; the only admissible vector length.
pub const ONTOLOGY_SIZE: usize = PURPOSE_ONTOLOGY.len();

/// A validated declaration of data-use purposes.
///
/// Exactly two shapes exist:
/// - a declared vector of [`ONTOLOGY_SIZE`] booleans, and
/// - the empty vector, meaning no valid purpose declaration was supplied.
///
/// When the input omits the `purpose` field entirely, the default is the
/// all-`true` vector (every purpose declared). Any validation failure on a
/// *present* field deterministically yields the empty vector instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurposeVector {
    flags: Vec<bool>,
}

impl PurposeVector {
    /// The default vector: every purpose declared.
    pub fn all() -> Self {
        Self {
            flags: vec![true; ONTOLOGY_SIZE],
        }
    }

    /// The empty vector: no valid purpose declared.
    pub fn none() -> Self {
        Self { flags: Vec::new() }
    }

    /// Builds a vector from flags.
    ///
    /// The caller is responsible for length discipline; validation entry
    /// points only ever pass ontology-sized vectors here.
    pub fn from_flags(flags: Vec<bool>) -> Self {
        Self { flags }
    }

    /// Returns the declared flags, ontology order.
    pub fn flags(&self) -> &[bool] {
        &self.flags
    }

    /// Returns `true` when no valid purpose declaration exists.
    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    /// Returns the vector length (0 or [`ONTOLOGY_SIZE`]).
    pub fn len(&self) -> usize {
        self.flags.len()
    }
}

/// Validates the optional top-level `purpose` field of a request input.
///
/// - Field absent: default all-`true` vector.
/// - Field present but not an array, of the wrong length, or containing a
///   non-boolean element: the empty vector. The offending detail is logged
///   and never escalated to the caller.
pub fn validate_purpose(input: &Value) -> PurposeVector {
    let Some(value) = input.get("purpose") else {
        debug!("purpose parameter not found, defaulting to all purposes");
        return PurposeVector::all();
    };
    let Some(elements) = value.as_array() else {
        debug!("invalid purpose parameter, it is not an array");
        return PurposeVector::none();
    };
    debug!(count = elements.len(), "read purposes");
    if elements.len() != ONTOLOGY_SIZE {
        debug!("invalid purpose parameter, wrong vector length");
        return PurposeVector::none();
    }
    let mut flags = Vec::with_capacity(ONTOLOGY_SIZE);
    for (i, element) in elements.iter().enumerate() {
        match element.as_bool() {
            Some(flag) => flags.push(flag),
            None => {
                debug!(position = i, "purpose element is not a boolean");
                return PurposeVector::none();
            }
        }
    }
    PurposeVector::from_flags(flags)
}

/// Validates an embedded per-trigger purpose array into a `'0'`/`'1'`
/// bit string of ontology length.
///
/// Same length and boolean rules as [`validate_purpose`], but a failure
/// invalidates only the enclosing trigger, so the result is an `Option`.
pub(crate) fn validate_purpose_bits(value: &Value) -> Option<String> {
    let elements = value.as_array()?;
    if elements.len() != ONTOLOGY_SIZE {
        debug!("invalid trigger purpose parameter, wrong vector length");
        return None;
    }
    let mut bits = String::with_capacity(ONTOLOGY_SIZE);
    for (i, element) in elements.iter().enumerate() {
        match element.as_bool() {
            Some(true) => bits.push('1'),
            Some(false) => bits.push('0'),
            None => {
                debug!(position = i, "trigger purpose element is not a boolean");
                return None;
            }
        }
    }
    Some(bits)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn absent_purpose_defaults_to_all_true() {
        let vector = validate_purpose(&json!({}));
        assert_eq!(vector.len(), ONTOLOGY_SIZE);
        assert!(vector.flags().iter().all(|&f| f));
    }

    #[test]
    fn valid_purpose_is_copied_elementwise() {
        let mut flags = vec![false; ONTOLOGY_SIZE];
        flags[0] = true;
        flags[ONTOLOGY_SIZE - 1] = true;
        let input = json!({ "purpose": &flags });
        let vector = validate_purpose(&input);
        assert_eq!(vector.flags(), flags.as_slice());
    }

    #[test]
    fn non_array_purpose_yields_empty_vector() {
        let vector = validate_purpose(&json!({ "purpose": "everything" }));
        assert!(vector.is_empty());
    }

    #[test]
    fn wrong_length_purpose_yields_empty_vector() {
        let input = json!({ "purpose": vec![true; ONTOLOGY_SIZE - 1] });
        assert!(validate_purpose(&input).is_empty());
        let input = json!({ "purpose": vec![true; ONTOLOGY_SIZE + 1] });
        assert!(validate_purpose(&input).is_empty());
    }

    #[test]
    fn non_boolean_element_discards_whole_vector() {
        let mut elements: Vec<Value> = vec![json!(true); ONTOLOGY_SIZE];
        elements[ONTOLOGY_SIZE / 2] = json!("yes");
        let vector = validate_purpose(&json!({ "purpose": elements }));
        assert!(vector.is_empty());
    }

    #[test]
    fn purpose_bits_encode_zero_one() {
        let mut flags = vec![false; ONTOLOGY_SIZE];
        flags[1] = true;
        let bits = validate_purpose_bits(&json!(flags)).unwrap();
        assert_eq!(bits.len(), ONTOLOGY_SIZE);
        assert_eq!(&bits[0..3], "010");
    }

    #[test]
    fn purpose_bits_reject_wrong_length_and_non_bool() {
        assert!(validate_purpose_bits(&json!(vec![true; ONTOLOGY_SIZE - 1])).is_none());
        assert!(validate_purpose_bits(&json!("0101")).is_none());
        let mut elements: Vec<Value> = vec![json!(false); ONTOLOGY_SIZE];
        elements[0] = json!(1);
        assert!(validate_purpose_bits(&json!(elements)).is_none());
    }
}
