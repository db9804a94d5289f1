// crates/humanity-mcp/src/handlers/tests.rs
// ============================================================================
// Module: Action Handler Tests
// Description: Unit tests for the built-in advisory handlers.
// Purpose: Pin handler outputs, uncertainty levels, and escalation rules.
// Dependencies: humanity-mcp, humanity-contract, serde_json
// ============================================================================

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    reason = "Test-only assertions."
)]

use humanity_contract::ActionInput;
use humanity_contract::ActionName;
use humanity_contract::InvokeResponse;
use humanity_contract::Uncertainty;
use serde_json::Value;
use serde_json::json;

use super::ActionHandler;
use super::builtin_handlers;
use super::handler_for;

// ============================================================================
// SECTION: Helpers
// ============================================================================

const BOUNDARY: &str = "test boundary";

fn run(action: ActionName, input: Value) -> InvokeResponse {
    let fields: ActionInput = input.as_object().cloned().unwrap();
    handler_for(action).invoke(&fields, BOUNDARY)
}

fn strings(value: &Value) -> Vec<String> {
    value.as_array().unwrap().iter().map(|item| item.as_str().unwrap().to_string()).collect()
}

// ============================================================================
// SECTION: Binding
// ============================================================================

#[test]
fn builtin_table_binds_every_action() {
    let handlers = builtin_handlers();
    assert_eq!(handlers.len(), ActionName::all().len());
    for action in ActionName::all() {
        assert!(handlers.contains_key(action.as_str()), "{action} is unbound");
    }
}

#[test]
fn every_handler_echoes_boundary_and_names_itself() {
    for action in ActionName::all() {
        let response = run(*action, json!({}));
        assert_eq!(response.action, action.as_str());
        assert_eq!(response.boundary_notice, BOUNDARY);
        assert!(!response.assumptions.is_empty());
    }
}

#[test]
fn closures_act_as_handlers() {
    let handler = |_: &ActionInput, boundary: &str| InvokeResponse {
        action: "custom".to_string(),
        output: serde_json::Map::new(),
        assumptions: vec!["none".to_string()],
        uncertainty: Uncertainty::Low,
        boundary_notice: boundary.to_string(),
    };
    let response = handler.invoke(&ActionInput::new(), "b");
    assert_eq!(response.boundary_notice, "b");
}

// ============================================================================
// SECTION: Accessibility
// ============================================================================

#[test]
fn wcag_reports_five_findings_at_requested_level() {
    let response = run(ActionName::WcagAaaCheck, json!({ "target": "checkout", "level": "AA" }));
    assert_eq!(response.uncertainty, Uncertainty::Medium);
    assert_eq!(response.output["findings"].as_array().unwrap().len(), 5);
    assert_eq!(response.output["findings"][0]["severity"], "high");
    assert!(response.output["summary"].as_str().unwrap().contains("WCAG 2.2 AA compliance"));
    assert_eq!(response.assumptions[0], "Target: checkout");
    assert_eq!(response.assumptions[2], "No additional context provided");
}

#[test]
fn cognitive_audit_flags_long_sentences_and_jargon() {
    let long_sentence = vec!["word"; 25].join(" ");
    let content = format!("{long_sentence} pursuant herein.");
    let response = run(ActionName::CognitiveAccessibilityAudit, json!({ "content": content }));
    let findings = strings(&response.output["findings"]);
    assert!(findings.iter().any(|f| f.starts_with("Average sentence length is 27 words")));
    assert!(findings.iter().any(|f| f == "Legal/technical jargon detected: pursuant, herein"));
    assert_eq!(response.assumptions[1], "Word count: 27");
    assert_eq!(response.assumptions[2], "Estimated sentences: 1");
}

#[test]
fn cognitive_audit_rounds_average_half_up() {
    let content = format!("{}. {}.", vec!["a"; 20].join(" "), vec!["b"; 21].join(" "));
    let response = run(ActionName::CognitiveAccessibilityAudit, json!({ "content": content }));
    let findings = strings(&response.output["findings"]);
    assert_eq!(
        findings,
        vec!["Average sentence length is 21 words — may strain working memory".to_string()]
    );
}

#[test]
fn cognitive_audit_short_content_has_no_findings() {
    let response = run(
        ActionName::CognitiveAccessibilityAudit,
        json!({ "content": "one two three. four two." }),
    );
    assert_eq!(
        strings(&response.output["findings"]),
        vec!["No major cognitive accessibility issues detected in this content sample".to_string()]
    );
    assert_eq!(response.output["recommendations"].as_array().unwrap().len(), 2);
}

#[test]
fn cognitive_audit_suggests_numbering_for_long_unnumbered_content() {
    let content = vec!["step"; 60].join(" ");
    let response = run(ActionName::CognitiveAccessibilityAudit, json!({ "content": content }));
    let recommendations = strings(&response.output["recommendations"]);
    assert!(recommendations.iter().any(|r| r.starts_with("Consider numbering")));

    let numbered = format!("1. {}", vec!["step"; 60].join(" "));
    let response = run(ActionName::CognitiveAccessibilityAudit, json!({ "content": numbered }));
    let recommendations = strings(&response.output["recommendations"]);
    assert!(!recommendations.iter().any(|r| r.starts_with("Consider numbering")));
}

#[test]
fn neurodiversity_without_focus_covers_every_profile() {
    let response =
        run(ActionName::NeurodiversityDesignCheck, json!({ "ui_description": "dashboard" }));
    assert_eq!(response.output["recommendations"].as_array().unwrap().len(), 14);
    assert_eq!(response.output["tradeoffs"].as_array().unwrap().len(), 5);
    assert_eq!(response.assumptions[0], "Focus areas: all");
}

#[test]
fn neurodiversity_focus_narrows_recommendations() {
    let response = run(
        ActionName::NeurodiversityDesignCheck,
        json!({ "ui_description": "settings page", "focus": ["Dyslexia"] }),
    );
    let recommendations = strings(&response.output["recommendations"]);
    assert_eq!(recommendations.len(), 4);
    assert!(recommendations[0].contains("16px"));
    assert_eq!(response.assumptions[0], "Focus areas: Dyslexia");
}

#[test]
fn neurodiversity_falls_back_when_nothing_matches() {
    let response = run(
        ActionName::NeurodiversityDesignCheck,
        json!({ "ui_description": "map view", "focus": ["colour"] }),
    );
    let recommendations = strings(&response.output["recommendations"]);
    assert_eq!(recommendations.len(), 2);
    assert!(recommendations[0].contains("COGA"));
}

#[test]
fn age_inclusive_financial_flows_add_confirmation_steps() {
    let response = run(
        ActionName::AgeInclusiveDesignCheck,
        json!({ "flow_description": "Online banking transfer", "age_groups": ["teens"] }),
    );
    assert_eq!(response.uncertainty, Uncertainty::Low);
    let recommendations = strings(&response.output["recommendations"]);
    assert_eq!(recommendations.len(), 5);
    assert!(recommendations[3].starts_with("Add explicit confirmation steps"));
    let notes = strings(&response.output["access_notes"]);
    assert_eq!(notes.len(), 5);
}

#[test]
fn age_inclusive_unmatched_groups_get_baseline() {
    let response = run(
        ActionName::AgeInclusiveDesignCheck,
        json!({ "flow_description": "signup", "age_groups": ["adults"] }),
    );
    let recommendations = strings(&response.output["recommendations"]);
    assert_eq!(recommendations.len(), 4);
    assert!(recommendations[0].contains("WCAG 2.2 AA"));
}

// ============================================================================
// SECTION: Emotional Support
// ============================================================================

#[test]
fn depression_audit_counts_patterns() {
    let response = run(
        ActionName::RewriteDepressionSensitiveContent,
        json!({ "text": "Act now! You must finish. Last chance.", "mode": "audit" }),
    );
    assert_eq!(response.output["pattern_count"], 3);
    assert_eq!(response.output["review_recommended"], true);
    let flags = strings(&response.output["safety_flags"]);
    assert_eq!(flags[0], "Shame/blame language detected: \"you must\"");
    assert!(response.output["result"].as_str().unwrap().contains("Found 3 pattern(s)"));
}

#[test]
fn depression_rewrite_softens_language() {
    let response = run(
        ActionName::RewriteDepressionSensitiveContent,
        json!({ "text": "Act now: please complete all required steps." }),
    );
    assert_eq!(
        response.output["result"],
        "when you are ready: complete the following steps."
    );
    assert_eq!(response.assumptions[0], "Mode: rewrite");
    assert_eq!(response.assumptions[1], "Domain: general");
}

#[test]
fn depression_clean_text_is_unchanged() {
    let response = run(
        ActionName::RewriteDepressionSensitiveContent,
        json!({ "text": "Take your time." }),
    );
    assert_eq!(response.output["result"], "Take your time.");
    assert_eq!(response.output["review_recommended"], false);
}

#[test]
fn supportive_reply_scales_escalation_with_risk() {
    for (risk, expected) in [("high", 4), ("medium", 2), ("low", 1)] {
        let response = run(
            ActionName::SupportiveReply,
            json!({ "message": "I feel overwhelmed", "risk_level": risk }),
        );
        assert_eq!(response.output["escalation_guidance"].as_array().unwrap().len(), expected);
        assert_eq!(response.output["boundaries_notice"], BOUNDARY);
    }
}

#[test]
fn supportive_reply_never_echoes_message() {
    let message = "my very specific secret sentence";
    let response =
        run(ActionName::SupportiveReply, json!({ "message": message, "risk_level": "low" }));
    let rendered = serde_json::to_string(&response).unwrap();
    assert!(!rendered.contains(message));
}

#[test]
fn grief_modes_select_distinct_replies() {
    let mut replies = Vec::new();
    for mode in ["presence", "practical", "reflection"] {
        let response = run(
            ActionName::GriefSupportResponse,
            json!({ "message": "my father died", "support_mode": mode }),
        );
        assert_eq!(response.output["care_notes"].as_array().unwrap().len(), 5);
        assert_eq!(response.output["escalation_guidance"].as_array().unwrap().len(), 2);
        replies.push(response.output["reply"].as_str().unwrap().to_string());
    }
    replies.dedup();
    assert_eq!(replies.len(), 3);
}

#[test]
fn empathetic_warm_reframe_replaces_blame() {
    let response = run(
        ActionName::EmpatheticReframe,
        json!({ "message": "Unfortunately you failed and we don't refund. Your complaint is noted." }),
    );
    assert_eq!(response.uncertainty, Uncertainty::Low);
    assert_eq!(
        response.output["reframed_message"],
        "here is what I can tell you this did not work out this time and we are not currently able to refund. your concern is noted."
    );
    assert!(response.output["escalation_guidance"].as_array().unwrap().is_empty());
}

#[test]
fn empathetic_formal_reframe_raises_register() {
    let response = run(
        ActionName::EmpatheticReframe,
        json!({ "message": "hi, sorry and thanks", "tone": "formal" }),
    );
    assert_eq!(response.output["reframed_message"], "Dear, I apologise and thank you");
    assert_eq!(response.output["rationale"].as_array().unwrap().len(), 2);
}

#[test]
fn empathetic_crisis_indicators_route_to_humans() {
    let response = run(
        ActionName::EmpatheticReframe,
        json!({ "message": "There is no point anymore", "tone": "neutral" }),
    );
    assert_eq!(response.output["reframed_message"], "There is no point anymore");
    assert_eq!(response.output["escalation_guidance"].as_array().unwrap().len(), 3);
}

// ============================================================================
// SECTION: Communication
// ============================================================================

#[test]
fn cultural_check_applies_region_rules() {
    let response = run(
        ActionName::CulturalContextCheck,
        json!({ "message": "Hey team, launch is Monday", "audience": "Senior leaders", "region": "APAC" }),
    );
    assert_eq!(response.uncertainty, Uncertainty::High);
    assert_eq!(response.output["notes"].as_array().unwrap().len(), 6);
    assert_eq!(
        response.output["adapted_message"],
        "[Adapted for Senior leaders audience, APAC]: team, launch is Monday"
    );
}

#[test]
fn casual_terms_end_at_ascii_word_boundaries() {
    let response = run(
        ActionName::CulturalContextCheck,
        json!({ "message": "Heyé, they said dudeñ", "audience": "customers" }),
    );
    assert_eq!(
        response.output["adapted_message"],
        "[Adapted for customers audience, global]: é, they said ñ"
    );
}

#[test]
fn cultural_check_falls_back_to_neutral_guidance() {
    let response = run(
        ActionName::CulturalContextCheck,
        json!({ "message": "Welcome", "audience": "customers" }),
    );
    let notes = strings(&response.output["notes"]);
    assert_eq!(notes.len(), 3);
    assert!(notes[0].starts_with("No region-specific adaptation rules triggered"));
    assert_eq!(response.assumptions[1], "Region: global");
}

#[test]
fn deescalation_high_intensity_adds_break_and_alert() {
    let response = run(
        ActionName::DeescalationPlan,
        json!({ "situation": "Customer threatens legal action", "intensity": "high" }),
    );
    assert_eq!(response.output["plan"].as_array().unwrap().len(), 7);
    let notes = strings(&response.output["risk_notes"]);
    assert_eq!(notes.len(), 4);
    assert!(notes[3].starts_with("ALERT"));
}

#[test]
fn deescalation_defaults_to_medium() {
    let response = run(ActionName::DeescalationPlan, json!({ "situation": "late delivery" }));
    assert_eq!(response.output["plan"].as_array().unwrap().len(), 7);
    assert_eq!(response.output["risk_notes"].as_array().unwrap().len(), 1);
    assert_eq!(response.assumptions[0], "Intensity level: medium");
}

#[test]
fn repeated_invocations_are_identical() {
    let input = json!({ "message": "We cannot help", "tone": "warm" });
    let first = serde_json::to_string(&run(ActionName::EmpatheticReframe, input.clone())).unwrap();
    let second = serde_json::to_string(&run(ActionName::EmpatheticReframe, input)).unwrap();
    assert_eq!(first, second);
}
