use crate::domain::PolicyDecision;

/// Prefix for every console report line.
pub const PREFIX: &str = "[txguard]";

/// Render the operator-facing lines for a decision.
///
/// Produces the action (upper-cased), the event ID and one advisory line
/// picked by the decision's classification.
pub fn render(decision: &PolicyDecision) -> Vec<String> {
    vec![
        format!(
            "{} Action: {}",
            PREFIX,
            decision.action_to_take.as_str().to_uppercase()
        ),
        format!("{} Event ID: {}", PREFIX, decision.event_id_or_na()),
        format!("{} {}", PREFIX, decision.classify().advisory()),
    ]
}
