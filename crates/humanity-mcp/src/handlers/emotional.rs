// crates/humanity-mcp/src/handlers/emotional.rs
// ============================================================================
// Module: Emotional Support Handlers
// Description: Depression-sensitive rewrites, supportive replies, grief, reframes.
// Purpose: Produce non-clinical supportive language with escalation cues.
// Dependencies: humanity-contract, regex, serde_json
// ============================================================================

//! ## Overview
//! Handlers for emotionally sensitive content. Rewrites are case-insensitive
//! phrase substitutions. `supportive_reply` and `grief_support_response`
//! answer with fixed text and never quote the caller's message.

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
// SECTION: Shared Text
// ============================================================================

/// Crisis line pointer shared by escalation lists.
const CRISIS_LINES: &str =
    "In the UK: Samaritans 116 123 | US: 988 Suicide & Crisis Lifeline | International: findahelpline.com";

// ============================================================================
// SECTION: Depression-Sensitive Content
// ============================================================================

/// Phrases that read as shame or blame.
const SHAME_PATTERNS: [&str; 5] =
    ["you failed", "you must", "you should have", "try harder", "your fault"];
/// Phrases that add urgency pressure.
const URGENCY_PATTERNS: [&str; 4] = ["last chance", "act now", "don't miss out", "limited time"];
/// Phrases that add cognitive load.
const COGNITIVE_LOAD_PATTERNS: [&str; 3] =
    ["please complete all", "required steps", "do not proceed unless"];

/// Substitutions applied in rewrite mode, in order.
fn depression_rules() -> &'static [RewriteRule] {
    static RULES: OnceLock<Vec<RewriteRule>> = OnceLock::new();
    RULES.get_or_init(|| {
        compile_rules(&[
            ("you (failed|must|should have)", "let's"),
            ("last chance|act now", "when you are ready"),
            ("limited time", "available for a period"),
            ("please complete all", "complete"),
            ("required steps", "the following steps"),
            ("do not proceed unless", "when you are ready, you can"),
            ("you must", "you can"),
            ("you need to", "when ready, you can"),
        ])
    })
}

/// Handles `rewrite_depression_sensitive_content`.
pub fn rewrite_depression_sensitive(input: &ActionInput, boundary_notice: &str) -> InvokeResponse {
    let text = text_field(input, "text", "");
    let mode = text_field(input, "mode", "rewrite");
    let domain = text_field(input, "domain", "general");

    let lowered = text.to_lowercase();
    let lower = lowered.as_str();
    let flag_groups: [(&str, &[&str]); 3] = [
        ("Shame/blame language detected", &SHAME_PATTERNS),
        ("Urgency pressure detected", &URGENCY_PATTERNS),
        ("High cognitive load pattern detected", &COGNITIVE_LOAD_PATTERNS),
    ];
    let safety_flags: Vec<String> = flag_groups
        .iter()
        .flat_map(|&(label, patterns)| {
            patterns
                .iter()
                .filter(move |pattern| lower.contains(**pattern))
                .map(move |pattern| format!("{label}: \"{pattern}\""))
        })
        .collect();

    let result = if mode == "audit" {
        if safety_flags.is_empty() {
            "Audit complete. No high-risk patterns detected. Content appears emotionally safe and cognitively accessible."
                .to_string()
        } else {
            format!(
                "Audit complete. Found {} pattern(s) that may cause emotional friction or cognitive overload for users experiencing depression. See safety_flags for details.",
                safety_flags.len()
            )
        }
    } else {
        apply_rules(&text, depression_rules())
    };

    let assumptions = vec![
        format!("Mode: {mode}"),
        format!("Domain: {domain}"),
        "Pattern matching is heuristic — human review recommended for production content"
            .to_string(),
        "Non-clinical tool — does not assess clinical risk of content".to_string(),
    ];
    let output = json!({
        "result": result,
        "pattern_count": safety_flags.len(),
        "review_recommended": !safety_flags.is_empty(),
        "safety_flags": safety_flags,
    });
    respond(
        ActionName::RewriteDepressionSensitiveContent,
        boundary_notice,
        Uncertainty::Medium,
        assumptions,
        output,
    )
}

// ============================================================================
// SECTION: Supportive Reply
// ============================================================================

/// Fixed supportive reply text.
const SUPPORTIVE_REPLY: &str = "I hear you, and I am glad you reached out. It makes sense that things feel heavy right now. You do not have to have it all figured out — let us focus on one small step at a time.";

/// Handles `supportive_reply`.
pub fn supportive_reply(input: &ActionInput, boundary_notice: &str) -> InvokeResponse {
    let risk_level = text_field(input, "risk_level", "low");
    let escalation = match risk_level.as_str() {
        "high" => owned(&[
            "If you or someone else may be in immediate danger, contact emergency services now",
            "Contact a local crisis line — trained counsellors are available 24/7",
            CRISIS_LINES,
            "Reach out to a trusted person nearby",
        ]),
        "medium" => owned(&[
            "If things feel harder over time, consider speaking with a mental health professional",
            "You can contact a support line any time, even just to talk",
        ]),
        _ => owned(&["Professional support is available any time you need it"]),
    };
    let assumptions = vec![
        format!("Risk level: {risk_level} (self-reported or system-assessed)"),
        "Non-clinical support only — not a substitute for professional mental health care"
            .to_string(),
    ];
    let output = json!({
        "reply": SUPPORTIVE_REPLY,
        "escalation_guidance": escalation,
        "boundaries_notice": boundary_notice,
    });
    respond(ActionName::SupportiveReply, boundary_notice, Uncertainty::Medium, assumptions, output)
}

// ============================================================================
// SECTION: Grief Support
// ============================================================================

/// Handles `grief_support_response`.
pub fn grief_support(input: &ActionInput, boundary_notice: &str) -> InvokeResponse {
    let support_mode = text_field(input, "support_mode", "presence");
    let (reply, mut care_notes) = match support_mode.as_str() {
        "presence" => (
            "I am here with you. There is no need to have the right words or to be okay right now. Grief has its own pace, and whatever you are feeling is valid.",
            owned(&[
                "Presence-first response — prioritises being heard over problem-solving",
                "Avoid offering silver linings or comparisons to others' experiences",
                "Hold space — short, warm responses often feel safer than long explanations",
            ]),
        ),
        "practical" => (
            "I am sorry for what you are going through. If it helps to think about one small thing, I am here to assist with whatever feels manageable right now — there is no pressure to do more than that.",
            owned(&[
                "Practical mode — offers help without imposing a to-do list",
                "Keep any suggested actions small, concrete, and optional",
                "Check in before offering advice — ask 'Would it help if I suggested some options?' first",
            ]),
        ),
        _ => (
            "Grief often does not follow a straight line. What you are feeling — even if it surprises you — is part of how we process loss. There is no right or wrong way to grieve.",
            owned(&[
                "Reflection mode — validates the non-linear nature of grief",
                "Avoid timelines or stages — grief does not follow a fixed sequence",
                "Normalising unexpected emotions (relief, anger, numbness) can reduce shame",
            ]),
        ),
    };
    care_notes.extend(owned(&[
        "Never use platitudes: 'they are in a better place', 'time heals all wounds', 'at least...'",
        "Cultural variation in grieving is significant — follow the person's lead on ritual and meaning",
    ]));
    let escalation = owned(&[
        "If the person expresses thoughts of self-harm, contact emergency services or a crisis line immediately",
        "This skill provides non-clinical support patterns only — do not use as a substitute for professional grief counselling",
    ]);
    let assumptions = vec![
        format!("Support mode: {support_mode}"),
        "Non-clinical tool — not a substitute for professional grief counselling".to_string(),
        "Cultural context of grief varies significantly — adapt to cues from the person"
            .to_string(),
    ];
    let output = json!({
        "reply": reply,
        "care_notes": care_notes,
        "escalation_guidance": escalation,
    });
    respond(
        ActionName::GriefSupportResponse,
        boundary_notice,
        Uncertainty::Medium,
        assumptions,
        output,
    )
}

// ============================================================================
// SECTION: Empathetic Reframe
// ============================================================================

/// Substitutions for the warm tone.
fn warm_rules() -> &'static [RewriteRule] {
    static RULES: OnceLock<Vec<RewriteRule>> = OnceLock::new();
    RULES.get_or_init(|| {
        compile_rules(&[
            (r"(?-u:\b)you failed(?-u:\b)", "this did not work out this time"),
            (r"(?-u:\b)you must(?-u:\b)", "it would really help if you could"),
            (r"(?-u:\b)unfortunately(?-u:\b)", "here is what I can tell you"),
            (r"(?-u:\b)we cannot(?-u:\b)", "what we are able to do is"),
            (r"(?-u:\b)we don'?t(?-u:\b)", "we are not currently able to"),
            (r"(?-u:\b)your (issue|problem|complaint)(?-u:\b)", "your concern"),
            (r"(?-u:\b)as per our policy(?-u:\b)", "to make sure things go smoothly for you"),
        ])
    })
}

/// Substitutions for the formal tone.
fn formal_rules() -> &'static [RewriteRule] {
    static RULES: OnceLock<Vec<RewriteRule>> = OnceLock::new();
    RULES.get_or_init(|| {
        compile_rules(&[
            (r"(?-u:\b)sorry(?-u:\b)", "I apologise"),
            (r"(?-u:\b)thanks(?-u:\b)", "thank you"),
            (r"(?-u:\b)hi(?-u:\b)", "Dear"),
            (r"(?-u:\b)you guys(?-u:\b)", "your team"),
        ])
    })
}

/// Phrases that indicate a possible crisis.
const CRISIS_INDICATORS: [&str; 4] = ["suicid", "self-harm", "end my life", "no point"];

/// Handles `empathetic_reframe`.
pub fn empathetic_reframe(input: &ActionInput, boundary_notice: &str) -> InvokeResponse {
    let tone = text_field(input, "tone", "warm");
    let message = text_field(input, "message", "");

    let (reframed, rationale) = match tone.as_str() {
        "warm" => (
            apply_rules(&message, warm_rules()),
            owned(&[
                "Replaced blame/failure language with neutral outcome language",
                "Converted restrictive 'we cannot' to possibility-focused 'what we can do'",
                "Softened formal policy references to user-benefit framing",
            ]),
        ),
        "formal" => (
            apply_rules(&message, formal_rules()),
            owned(&[
                "Elevated register to formal professional tone",
                "Standardised informal greetings and closings",
            ]),
        ),
        _ => (
            message.clone(),
            owned(&["Neutral tone applied — minimal reframing; content structure preserved"]),
        ),
    };

    let lower = message.to_lowercase();
    let escalation = if CRISIS_INDICATORS.iter().any(|indicator| lower.contains(indicator)) {
        owned(&[
            "Message contains potential crisis indicators — do not respond with automated content",
            "Route immediately to a trained human responder or crisis line",
            CRISIS_LINES,
        ])
    } else {
        Vec::new()
    };

    let assumptions = vec![
        format!("Tone: {tone}"),
        "Reframe applies pattern-based rules — human review recommended for high-stakes communications"
            .to_string(),
        "Does not modify factual content or commitments".to_string(),
    ];
    let output = json!({
        "reframed_message": reframed,
        "rationale": rationale,
        "escalation_guidance": escalation,
    });
    respond(ActionName::EmpatheticReframe, boundary_notice, Uncertainty::Low, assumptions, output)
}
