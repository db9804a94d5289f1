// crates/humanity-mcp/src/handlers/accessibility.rs
// ============================================================================
// Module: Accessibility Handlers
// Description: WCAG, cognitive, neurodiversity, and age-inclusive reviews.
// Purpose: Produce checklist-style design guidance from fixed rules.
// Dependencies: humanity-contract, regex, serde, serde_json
// ============================================================================

//! ## Overview
//! Design review handlers. Outputs are recommendation lists driven by keyword
//! matches on the described interface and the requested focus groups; none
//! of them quote the caller's content back.

use std::sync::OnceLock;

use humanity_contract::ActionInput;
use humanity_contract::ActionName;
use humanity_contract::InvokeResponse;
use humanity_contract::Uncertainty;
use regex::Regex;
use serde::Serialize;
use serde_json::json;

use super::owned;
use super::respond;
use super::string_list;
use super::text_field;

// ============================================================================
// SECTION: WCAG AAA
// ============================================================================

/// One checklist finding.
#[derive(Debug, Clone, Serialize)]
struct Finding {
    /// Severity label.
    severity: &'static str,
    /// Issue description.
    issue: &'static str,
    /// Suggested fix.
    fix: &'static str,
}

/// Baseline WCAG 2.2 findings reported for every target.
const WCAG_FINDINGS: [Finding; 5] = [
    Finding {
        severity: "high",
        issue: "Missing skip navigation link — keyboard users cannot bypass repeated navigation",
        fix: "Add <a href='#main-content' class='skip-link'>Skip to main content</a> as first focusable element",
    },
    Finding {
        severity: "high",
        issue: "Interactive elements may lack sufficient colour contrast for Level AAA (7:1 for normal text)",
        fix: "Verify all text/background combinations meet 7:1 contrast ratio using a colour contrast analyser",
    },
    Finding {
        severity: "medium",
        issue: "Form inputs should include visible labels associated via for/id or aria-labelledby",
        fix: "Add <label for='field-id'> or aria-labelledby pointing to visible label element",
    },
    Finding {
        severity: "medium",
        issue: "Images and icons require descriptive alt text; decorative images require alt=''",
        fix: "Audit all <img> elements — add meaningful alt text or alt='' for decorative usage",
    },
    Finding {
        severity: "low",
        issue: "External links should indicate they open in a new tab for Level AAA compliance",
        fix: "Add rel='noopener noreferrer' and a screen-reader announcement such as '(opens in new tab)'",
    },
];

/// Handles `wcagaaa_check`.
pub fn wcag_check(input: &ActionInput, boundary_notice: &str) -> InvokeResponse {
    let target = text_field(input, "target", "(no target provided)");
    let level = text_field(input, "level", "AAA");
    let context = text_field(input, "context", "");

    let context_note = if context.is_empty() {
        "No additional context provided".to_string()
    } else {
        format!("Context: {context}")
    };
    let assumptions = vec![
        format!("Target: {target}"),
        format!("Compliance level: WCAG 2.2 {level}"),
        context_note,
        "Automated checks cover ~40% of WCAG criteria — manual review required for full compliance"
            .to_string(),
    ];
    let output = json!({
        "summary": format!(
            "Found {} potential issues. Manual audit required for full WCAG 2.2 {level} compliance.",
            WCAG_FINDINGS.len()
        ),
        "findings": WCAG_FINDINGS,
        "next_step": "Run manual keyboard-only navigation and screen reader test against each finding",
    });
    respond(ActionName::WcagAaaCheck, boundary_notice, Uncertainty::Medium, assumptions, output)
}

// ============================================================================
// SECTION: Cognitive Accessibility
// ============================================================================

/// Terms flagged as legal or technical jargon.
const JARGON_TERMS: [&str; 6] =
    ["pursuant", "notwithstanding", "thereto", "heretofore", "aforementioned", "herein"];

/// Matches a numbered list marker such as `1. `.
fn numbered_step_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[0-9]+\.\s").ok()).as_ref()
}

/// Returns `numerator / denominator` rounded half up.
const fn rounded_ratio(numerator: usize, denominator: usize) -> usize {
    if denominator == 0 { 0 } else { (2 * numerator + denominator) / (2 * denominator) }
}

/// Handles `cognitive_accessibility_audit`.
pub fn cognitive_audit(input: &ActionInput, boundary_notice: &str) -> InvokeResponse {
    let content = text_field(input, "content", "");
    let target_context = text_field(input, "target_context", "general digital interface");

    let word_count = content.split_whitespace().count();
    let sentence_count = content.split(['.', '!', '?']).filter(|piece| !piece.is_empty()).count();
    let average = rounded_ratio(word_count, sentence_count);

    let mut findings = Vec::new();
    let mut recommendations = Vec::new();

    if average > 20 {
        findings.push(format!(
            "Average sentence length is {average} words — may strain working memory"
        ));
        recommendations
            .push("Break sentences longer than 20 words into two shorter sentences".to_string());
    }
    if word_count > 150 {
        findings.push(format!(
            "Content is {word_count} words — consider chunking into sections with clear headings"
        ));
        recommendations
            .push("Use headings and bullet points to reduce linear reading demand".to_string());
    }

    let lower = content.to_lowercase();
    let jargon: Vec<&str> =
        JARGON_TERMS.iter().copied().filter(|term| lower.contains(term)).collect();
    if !jargon.is_empty() {
        findings.push(format!("Legal/technical jargon detected: {}", jargon.join(", ")));
        recommendations.push("Replace jargon with plain language equivalents".to_string());
    }

    let numbered = numbered_step_pattern().is_some_and(|pattern| pattern.is_match(&content));
    if !numbered && word_count > 50 {
        recommendations.push(
            "Consider numbering sequential steps to reduce sequencing burden".to_string(),
        );
    }
    if findings.is_empty() {
        findings.push(
            "No major cognitive accessibility issues detected in this content sample".to_string(),
        );
    }
    recommendations.push("Test content with users who have varied cognitive profiles".to_string());
    recommendations.push(
        "Provide a summary at the top for users who cannot read the full content".to_string(),
    );

    let assumptions = vec![
        format!("Target context: {target_context}"),
        format!("Word count: {word_count}"),
        format!("Estimated sentences: {sentence_count}"),
        "Automated analysis — human review recommended for sensitive contexts".to_string(),
    ];
    let output = json!({
        "findings": findings,
        "recommendations": recommendations,
    });
    respond(
        ActionName::CognitiveAccessibilityAudit,
        boundary_notice,
        Uncertainty::Medium,
        assumptions,
        output,
    )
}

// ============================================================================
// SECTION: Neurodiversity
// ============================================================================

/// Handles `neurodiversity_design_check`.
pub fn neurodiversity_check(input: &ActionInput, boundary_notice: &str) -> InvokeResponse {
    let description = text_field(input, "ui_description", "").to_lowercase();
    let focus = string_list(input, "focus");
    let lowered: Vec<String> = focus.iter().map(|item| item.to_lowercase()).collect();
    let wants = |term: &str| lowered.is_empty() || lowered.iter().any(|item| item.contains(term));
    let mentions = |term: &str| description.contains(term);

    let mut recommendations: Vec<String> = Vec::new();
    let mut tradeoffs: Vec<String> = Vec::new();

    if wants("adhd") || wants("attention") || mentions("notification") || mentions("alert") {
        recommendations.extend(owned(&[
            "Batch notifications — avoid interrupting flow with real-time alerts for non-urgent events",
            "Provide a focus/do-not-disturb mode that suppresses non-critical UI elements",
            "Use progress indicators for multi-step tasks to maintain orientation and momentum",
        ]));
        tradeoffs.push(
            "Focus mode may hide useful ambient information — offer opt-in rather than opt-out"
                .to_string(),
        );
    }
    if wants("autism") || wants("sensory") || mentions("animation") || mentions("motion") {
        recommendations.extend(owned(&[
            "Respect prefers-reduced-motion media query — disable or reduce animations by default for users who set this",
            "Avoid auto-playing audio, video, or scrolling content — always provide user controls",
            "Use predictable layouts — avoid reorganising navigation or controls between sessions",
        ]));
        tradeoffs.push(
            "Removing animations may reduce perceived polish — consider a user-toggled motion preference setting"
                .to_string(),
        );
    }
    if wants("dyslexia") || wants("reading") || mentions("text") || mentions("font") {
        recommendations.extend(owned(&[
            "Use a minimum 16px body font size and 1.5× line height to improve readability",
            "Avoid fully justified text — ragged-right alignment is easier for dyslexic readers",
            "Sans-serif fonts (e.g. Open Sans, Atkinson Hyperlegible) are generally preferred over serif",
            "Offer a reading mode or high-contrast mode toggle",
        ]));
        tradeoffs.push(
            "Larger text and wider spacing increases scroll depth — test with real content volume"
                .to_string(),
        );
    }
    if wants("executive function") || wants("memory") || mentions("form") || mentions("step") {
        recommendations.extend(owned(&[
            "Show one task or decision at a time — avoid presenting all steps simultaneously",
            "Auto-save progress in multi-step forms — never lose data on accidental navigation",
            "Provide undo and recovery paths for all destructive actions",
            "Summarise what was completed at the end of each step to reduce memory burden",
        ]));
        tradeoffs.push(
            "Single-step-at-a-time flows increase page count — ensure navigation remains orientation-friendly"
                .to_string(),
        );
    }
    if recommendations.is_empty() {
        recommendations.extend(owned(&[
            "Review against WCAG 2.2 AAA and COGA (Cognitive Accessibility Guidance) for comprehensive coverage",
            "Conduct usability testing with neurodivergent participants — no substitute for real user feedback",
        ]));
    }
    tradeoffs.push(
        "Neurodiversity encompasses a wide spectrum — no single design choice works for all users; provide options and settings where possible"
            .to_string(),
    );

    let focus_label = if focus.is_empty() { "all".to_string() } else { focus.join(", ") };
    let assumptions = vec![
        format!("Focus areas: {focus_label}"),
        "Recommendations are general design patterns — individual needs vary significantly"
            .to_string(),
        "No diagnostic claims about users are made or implied".to_string(),
    ];
    let output = json!({
        "recommendations": recommendations,
        "tradeoffs": tradeoffs,
    });
    respond(
        ActionName::NeurodiversityDesignCheck,
        boundary_notice,
        Uncertainty::Medium,
        assumptions,
        output,
    )
}

// ============================================================================
// SECTION: Age-Inclusive Design
// ============================================================================

/// Handles `age_inclusive_design_check`.
pub fn age_inclusive_check(input: &ActionInput, boundary_notice: &str) -> InvokeResponse {
    let description = text_field(input, "flow_description", "").to_lowercase();
    let age_groups = string_list(input, "age_groups");
    let lowered: Vec<String> = age_groups.iter().map(|group| group.to_lowercase()).collect();
    let includes = |term: &str| lowered.is_empty() || lowered.iter().any(|group| group.contains(term));

    let mut recommendations: Vec<String> = Vec::new();
    let mut access_notes: Vec<String> = Vec::new();

    if includes("older") || includes("senior") || includes("elder") || includes("60") {
        recommendations.extend(owned(&[
            "Minimum touch target size of 44×44px — larger is better for reduced motor precision",
            "Avoid time-limited sessions or actions — older users may need more time to read and decide",
            "Provide large, high-contrast text options — default minimum 18px for body text",
            "Use plain language and avoid jargon, acronyms, and digital-native shorthand",
            "Offer telephone or in-person alternatives alongside digital flows — not everyone defaults to digital",
        ]));
        access_notes.extend(owned(&[
            "Motor, vision, and cognitive changes with age vary widely — do not assume impairment; provide options",
            "Trust signals matter more for older users — display security indicators, human support contacts, and clear data policies",
        ]));
    }
    if includes("young") || includes("child") || includes("teen") || includes("youth") {
        recommendations.extend(owned(&[
            "Use engaging, conversational language — avoid bureaucratic or overly formal tone",
            "Provide clear error recovery with specific, actionable correction guidance",
            "Consider parental controls and age-gating for sensitive content or transactions",
        ]));
        access_notes.extend(owned(&[
            "Younger users often prefer mobile-first flows with gesture navigation",
            "Attention span and task persistence vary — keep flows short and celebrate completion",
        ]));
    }
    if recommendations.is_empty() {
        recommendations.extend(owned(&[
            "Apply WCAG 2.2 AA as the baseline — it covers many age-related access needs",
            "Provide flexible text resizing without loss of content or functionality",
            "Avoid fixed viewport sizes — responsive layouts benefit all age groups",
            "Label all interactive elements clearly — never rely on icons alone",
        ]));
    }
    if ["payment", "banking", "financial"].iter().any(|term| description.contains(term)) {
        recommendations.extend(owned(&[
            "Add explicit confirmation steps before irreversible financial actions",
            "Display amounts clearly with currency and totals — avoid ambiguity",
        ]));
        access_notes.push(
            "Financial flows require the highest trust and clarity standards across all age groups"
                .to_string(),
        );
    }
    access_notes.extend(owned(&[
        "Age is not a homogeneous category — test with real users from each target group",
        "Avoid ageist assumptions in language and imagery — design for capability, not limitation",
    ]));

    let groups_label =
        if age_groups.is_empty() { "all ages".to_string() } else { age_groups.join(", ") };
    let assumptions = vec![
        format!("Age groups: {groups_label}"),
        "Recommendations are design patterns — individual ability varies within any age group"
            .to_string(),
        "No age stereotypes are intended — guidance is based on design research".to_string(),
    ];
    let output = json!({
        "recommendations": recommendations,
        "access_notes": access_notes,
    });
    respond(ActionName::AgeInclusiveDesignCheck, boundary_notice, Uncertainty::Low, assumptions, output)
}
