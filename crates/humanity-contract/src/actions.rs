// crates/humanity-contract/src/actions.rs
// ============================================================================
// Module: Action Names
// Description: Canonical identifiers for the advisory actions.
// Purpose: Bind each action to its skill and safety boundary in one place.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! These names are part of the external contract surface. Adding a variant
//! forces every exhaustive match (contract table, handler binding) to be
//! updated, so an action cannot be registered without a handler.

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

/// Canonical advisory action names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionName {
    /// WCAG 2.2 AAA accessibility checklist.
    #[serde(rename = "wcagaaa_check")]
    WcagAaaCheck,
    /// Rewrite or audit content for depression-sensitive readers.
    RewriteDepressionSensitiveContent,
    /// Non-clinical supportive reply with escalation cues.
    SupportiveReply,
    /// Cognitive accessibility audit of a content sample.
    CognitiveAccessibilityAudit,
    /// Cultural context adaptation notes.
    CulturalContextCheck,
    /// Conflict de-escalation plan.
    DeescalationPlan,
    /// Empathetic reframe of a message.
    EmpatheticReframe,
    /// Bereavement support response.
    GriefSupportResponse,
    /// Neurodiversity-aware design review.
    NeurodiversityDesignCheck,
    /// Age-inclusive design review.
    AgeInclusiveDesignCheck,
}

impl ActionName {
    /// Returns the canonical string name for the action.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::WcagAaaCheck => "wcagaaa_check",
            Self::RewriteDepressionSensitiveContent => "rewrite_depression_sensitive_content",
            Self::SupportiveReply => "supportive_reply",
            Self::CognitiveAccessibilityAudit => "cognitive_accessibility_audit",
            Self::CulturalContextCheck => "cultural_context_check",
            Self::DeescalationPlan => "deescalation_plan",
            Self::EmpatheticReframe => "empathetic_reframe",
            Self::GriefSupportResponse => "grief_support_response",
            Self::NeurodiversityDesignCheck => "neurodiversity_design_check",
            Self::AgeInclusiveDesignCheck => "age_inclusive_design_check",
        }
    }

    /// Returns the skill that owns the action.
    #[must_use]
    pub const fn skill(self) -> &'static str {
        match self {
            Self::WcagAaaCheck => "wcag-aaa-accessibility",
            Self::RewriteDepressionSensitiveContent => "depression-sensitive-content",
            Self::SupportiveReply => "supportive-conversation",
            Self::CognitiveAccessibilityAudit => "cognitive-accessibility",
            Self::CulturalContextCheck => "cultural-sensitivity",
            Self::DeescalationPlan => "conflict-de-escalation",
            Self::EmpatheticReframe => "empathetic-communication",
            Self::GriefSupportResponse => "grief-loss-support",
            Self::NeurodiversityDesignCheck => "neurodiversity-aware-design",
            Self::AgeInclusiveDesignCheck => "age-inclusive-design",
        }
    }

    /// Returns the safety boundary returned with every successful invocation.
    #[must_use]
    pub const fn safety_boundary(self) -> &'static str {
        match self {
            Self::WcagAaaCheck => "Compliance guidance only; does not replace legal review",
            Self::RewriteDepressionSensitiveContent => "Non-clinical UX/content guidance only",
            Self::SupportiveReply => {
                "Non-clinical support; must provide escalation cues when risk is elevated"
            }
            Self::CognitiveAccessibilityAudit => "Design guidance only",
            Self::CulturalContextCheck => {
                "Context-sensitive recommendations with uncertainty disclosure"
            }
            Self::DeescalationPlan => "No coercive tactics",
            Self::EmpatheticReframe => "No manipulation or deceptive empathy",
            Self::GriefSupportResponse => "Non-clinical bereavement support only",
            Self::NeurodiversityDesignCheck | Self::AgeInclusiveDesignCheck => {
                "Inclusive design guidance only"
            }
        }
    }

    /// Returns all actions in canonical registry order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::WcagAaaCheck,
            Self::RewriteDepressionSensitiveContent,
            Self::SupportiveReply,
            Self::CognitiveAccessibilityAudit,
            Self::CulturalContextCheck,
            Self::DeescalationPlan,
            Self::EmpatheticReframe,
            Self::GriefSupportResponse,
            Self::NeurodiversityDesignCheck,
            Self::AgeInclusiveDesignCheck,
        ]
    }

    /// Parses a canonical action name.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        Self::all().iter().copied().find(|action| action.as_str() == value)
    }
}

impl fmt::Display for ActionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    #![allow(
        clippy::panic,
        clippy::unwrap_used,
        clippy::expect_used,
        reason = "Test-only assertions."
    )]

    use super::ActionName;

    #[test]
    fn serde_names_match_canonical_strings() {
        for action in ActionName::all() {
            let encoded = serde_json::to_value(action).unwrap();
            assert_eq!(encoded, serde_json::Value::String(action.as_str().to_string()));
        }
    }

    #[test]
    fn parse_round_trips_every_name() {
        for action in ActionName::all() {
            assert_eq!(ActionName::parse(action.as_str()), Some(*action));
        }
        assert_eq!(ActionName::parse("WCAGAAA_CHECK"), None);
    }
}
