use std::fmt;

/// Decision outcome of policy evaluation.
///
/// Only the external decision engine produces effects; this crate never
/// computes one, it only supplies the engine's input. The integer codes
/// match the order used on the host boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Access is granted.
    Permit,
    /// Access is denied.
    Deny,
    /// The user must be prompted; the answer applies to this call only.
    PromptOneshot,
    /// The user must be prompted; the answer applies for the session.
    PromptSession,
    /// The user must be prompted; the answer applies until revoked.
    PromptBlanket,
    /// Evaluation could not reach a decision.
    Undetermined,
    /// No policy applied to the request.
    Inapplicable,
}

impl Effect {
    /// Returns the integer code used on the host boundary (0..=6).
    pub fn code(self) -> i32 {
        match self {
            Effect::Permit => 0,
            Effect::Deny => 1,
            Effect::PromptOneshot => 2,
            Effect::PromptSession => 3,
            Effect::PromptBlanket => 4,
            Effect::Undetermined => 5,
            Effect::Inapplicable => 6,
        }
    }

    /// Returns the effect for a boundary code, or `None` if out of range.
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(Effect::Permit),
            1 => Some(Effect::Deny),
            2 => Some(Effect::PromptOneshot),
            3 => Some(Effect::PromptSession),
            4 => Some(Effect::PromptBlanket),
            5 => Some(Effect::Undetermined),
            6 => Some(Effect::Inapplicable),
            _ => None,
        }
    }
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Effect::Permit => write!(f, "PERMIT"),
            Effect::Deny => write!(f, "DENY"),
            Effect::PromptOneshot => write!(f, "PROMPT_ONESHOT"),
            Effect::PromptSession => write!(f, "PROMPT_SESSION"),
            Effect::PromptBlanket => write!(f, "PROMPT_BLANKET"),
            Effect::Undetermined => write!(f, "UNDETERMINED"),
            Effect::Inapplicable => write!(f, "INAPPLICABLE"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Effect; 7] = [
        Effect::Permit,
        Effect::Deny,
        Effect::PromptOneshot,
        Effect::PromptSession,
        Effect::PromptBlanket,
        Effect::Undetermined,
        Effect::Inapplicable,
    ];

    #[test]
    fn codes_cover_zero_to_six_in_order() {
        for (expected, effect) in ALL.iter().enumerate() {
            assert_eq!(effect.code(), expected as i32);
        }
    }

    #[test]
    fn from_code_round_trips() {
        for effect in ALL {
            assert_eq!(Effect::from_code(effect.code()), Some(effect));
        }
        assert_eq!(Effect::from_code(7), None);
        assert_eq!(Effect::from_code(-1), None);
    }
}
