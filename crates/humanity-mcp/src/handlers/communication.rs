// crates/humanity-mcp/src/handlers/communication.rs
// ============================================================================
// Module: Communication Handlers
// Description: Cultural context adaptation and conflict de-escalation plans.
// Purpose: Produce communication guidance from region and intensity cues.
// Dependencies: humanity-contract, regex, serde_json
// ============================================================================

//! Region and audience rules for message adaptation, and intensity-tiered
//! de-escalation steps.

use std::sync::OnceLock;

use humanity_contract::ActionInput;
use humanity_contract::ActionName;
use humanity_contract::InvokeResponse;
use humanity_contract::Uncertainty;
use serde_json::json;

use super::RewriteRule;
use super::apply_rules;
use super::compile_rules;
use super::owned;
use super::respond;
use super::text_field;

// ============================================================================
// SECTION: Cultural Context
// ============================================================================

/// Drops casual address terms from an adapted message.
fn casual_address_rules() -> &'static [RewriteRule] {
    static RULES: OnceLock<Vec<RewriteRule>> = OnceLock::new();
    RULES.get_or_init(|| compile_rules(&[(r"(?-u:\b)(guys|dude|hey)(?-u:\b)", "")]))
}

/// Handles `cultural_context_check`.
pub fn cultural_context(input: &ActionInput, boundary_notice: &str) -> InvokeResponse {
    let audience = text_field(input, "audience", "general");
    let region = text_field(input, "region", "global");
    let message = text_field(input, "message", "");

    let lower_region = region.to_lowercase();
    let lower_audience = audience.to_lowercase();
    let region_has = |terms: &[&str]| terms.iter().any(|term| lower_region.contains(term));

    let mut notes: Vec<String> = Vec::new();
    if region_has(&["china", "apac", "japan", "korea"]) {
        notes.extend(owned(&[
            "Hierarchy and collective framing are typically valued — address the group benefit before individual benefit",
            "Indirect communication is often preferred — soften direct refusals or negative framing",
            "Colours: red may be positive (luck) rather than negative (error) in East Asian contexts",
            "Formal titles and organisation names carry significant weight — use them",
        ]));
    }
    if region_has(&["middle east", "arabic", "gulf"]) {
        notes.extend(owned(&[
            "Right-to-left reading order affects layout — ensure UI supports RTL text direction",
            "Religious calendar events (Ramadan, Eid) affect availability — build scheduling flexibility",
            "Relationship and trust-building language before transactional content is culturally expected",
        ]));
    }
    if region_has(&["india"]) {
        notes.extend(owned(&[
            "Language diversity is significant — consider regional language support beyond English and Hindi",
            "Formal address and credentials carry weight — acknowledge expertise and qualifications",
            "Family and community framing often resonates — individual-first messaging may underperform",
        ]));
    }
    if ["elder", "senior", "older"].iter().any(|term| lower_audience.contains(term)) {
        notes.extend(owned(&[
            "Avoid generational jargon and digital-native shorthand",
            "Formal, respectful tone is preferred over casual or playful register",
        ]));
    }
    if notes.is_empty() {
        notes.extend(owned(&[
            "No region-specific adaptation rules triggered — review message for cultural neutrality",
            "Avoid idioms and metaphors that may not translate well across cultures",
            "Use concrete, action-oriented language that works in direct translation",
        ]));
    }

    let adapted_message = if message.is_empty() {
        "No message provided — please include a 'message' field in your input".to_string()
    } else {
        let cleaned = apply_rules(&message, casual_address_rules());
        format!("[Adapted for {audience} audience, {region}]: {}", cleaned.trim())
    };

    let assumptions = vec![
        format!("Audience: {audience}"),
        format!("Region: {region}"),
        "Cultural guidance is generalised — individual variation is significant within any group"
            .to_string(),
        "Human localisation review is strongly recommended for production content".to_string(),
    ];
    let output = json!({
        "adapted_message": adapted_message,
        "notes": notes,
        "uncertainty": "Cultural guidance represents tendencies, not rules — context always varies",
    });
    respond(ActionName::CulturalContextCheck, boundary_notice, Uncertainty::High, assumptions, output)
}

// ============================================================================
// SECTION: De-escalation
// ============================================================================

/// Handles `deescalation_plan`.
pub fn deescalation_plan(input: &ActionInput, boundary_notice: &str) -> InvokeResponse {
    let situation = text_field(input, "situation", "");
    let intensity = text_field(input, "intensity", "medium");

    let mut plan = owned(&[
        "Pause and allow a moment of silence before responding — rushing escalates tension",
        "Acknowledge the emotion without judgment: 'I can hear this is important to you'",
        "Ask one clarifying question to show genuine interest: 'Can you help me understand what you need most right now?'",
        "Validate the concern explicitly before moving to solutions: 'That sounds genuinely frustrating'",
    ]);
    let mut risk_notes = match intensity.as_str() {
        "high" => {
            plan.extend(owned(&[
                "Offer a structured break: 'Let us take 10 minutes and come back to this — what time works for you?'",
                "Narrow the scope: 'Let us focus on one issue at a time — what is the most urgent thing for you right now?'",
            ]));
            owned(&[
                "High intensity: avoid defending positions or escalating with counter-arguments",
                "High intensity: if safety is a concern, follow your organisation's safety escalation procedure immediately",
                "High intensity: consider involving a neutral third party or mediator",
            ])
        }
        "medium" => {
            plan.extend(owned(&[
                "Offer two concrete options for resolution to restore a sense of control",
                "Summarise what you heard before proposing next steps",
            ]));
            owned(&[
                "Medium intensity: watch for escalation triggers — avoid ultimatums and time pressure",
            ])
        }
        _ => {
            plan.push(
                "Confirm shared goals: 'We both want this to work — here is what I can do'"
                    .to_string(),
            );
            owned(&["Low intensity: maintain calm, collaborative tone throughout"])
        }
    };
    plan.push(
        "End with a clear, agreed next step and timeline — ambiguity sustains conflict".to_string(),
    );

    let lower = situation.to_lowercase();
    if ["threat", "harm", "legal"].iter().any(|term| lower.contains(term)) {
        risk_notes.push(
            "ALERT: Situation description contains potential safety/legal signals — involve qualified personnel immediately"
                .to_string(),
        );
    }

    let assumptions = vec![
        format!("Intensity level: {intensity}"),
        "Steps are general communication patterns — not a substitute for trained mediation"
            .to_string(),
        "Safety-critical situations require qualified personnel".to_string(),
    ];
    let output = json!({
        "plan": plan,
        "risk_notes": risk_notes,
    });
    respond(ActionName::DeescalationPlan, boundary_notice, Uncertainty::Medium, assumptions, output)
}
