//! Strategy planner (C7): a pure function from an analyzed query to a
//! retriever selection and budget.

use ragline_core::types::{Intent, Query, Strategy, StrategyMode};

const OBJECTIVE_MARKERS: &[&str] = &["where", "which file", "line", "parameter", "flag", "command"];
const DEFINITIONAL_MARKERS: &[&str] = &["what is", "define", "definition of"];
const PLANNING_MARKERS: &[&str] = &["pipeline", "flow", "steps", "decompose", "describe", "entire"];

/// Plan a [`Strategy`] for `query`, evaluating the spec's five ordered
/// rules. `project_specific_terms` lets a caller name tokens that make an
/// otherwise-generic definitional query ("what is X") project-specific
/// (rule 4 then does not degrade to `mode=none`).
#[must_use]
pub fn plan(query: &Query, project_specific_terms: &[String]) -> Strategy {
    let lower = query.text.to_lowercase();
    let mut strategy = Strategy::base_defaults(query.intent, query.temporal.present);

    apply_intent_adjustments(&mut strategy, query.intent);
    apply_objective_and_length_rules(&mut strategy, &lower);
    apply_definitional_override(&mut strategy, &lower, project_specific_terms);
    strategy.use_planning = is_planning_query(&lower);

    strategy
}

fn apply_intent_adjustments(strategy: &mut Strategy, intent: Intent) {
    match intent {
        Intent::Code => {
            strategy.top_k = 15;
            strategy.vector_n_results = 15;
            strategy.memory_limit = 10;
        }
        Intent::Status | Intent::Config => {
            strategy.top_k = 15;
            strategy.vector_n_results = 8;
            strategy.memory_limit = 15;
        }
        Intent::Explain => {
            strategy.top_k = strategy.top_k.max(50);
            strategy.vector_n_results = 15;
            strategy.memory_limit = 30;
        }
        Intent::General => {}
    }
}

fn apply_objective_and_length_rules(strategy: &mut Strategy, lower: &str) {
    let is_objective = OBJECTIVE_MARKERS.iter().any(|m| lower.contains(m));
    if is_objective {
        strategy.top_k = strategy.top_k.min(12);
        strategy.vector_n_results = strategy.vector_n_results.min(8);
        strategy.use_keywords = true;
        strategy.use_graph = false;
    } else if lower.len() > 120 {
        strategy.top_k = strategy.top_k.max(50);
        strategy.vector_n_results = strategy.vector_n_results.max(18);
    }
}

fn apply_definitional_override(strategy: &mut Strategy, lower: &str, project_specific_terms: &[String]) {
    let is_definitional = DEFINITIONAL_MARKERS.iter().any(|m| lower.contains(m));
    if !is_definitional {
        return;
    }
    let mentions_project = project_specific_terms
        .iter()
        .any(|term| lower.contains(term.to_lowercase().as_str()));
    if !mentions_project {
        *strategy = Strategy::skip_retrieval();
    }
}

fn is_planning_query(lower: &str) -> bool {
    lower.len() > 160 || PLANNING_MARKERS.iter().any(|m| lower.contains(m))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ragline_core::types::Temporal;

    fn query(text: &str, intent: Intent) -> Query {
        Query {
            text: text.to_string(),
            concepts: vec![],
            expansions: vec![],
            temporal: Temporal::default(),
            intent,
        }
    }

    #[test]
    fn base_defaults_apply_when_no_rule_fires() {
        let q = query("tell me about the pipeline internals briefly", Intent::General);
        let s = plan(&q, &[]);
        assert_eq!(s.top_k, 20);
    }

    #[test]
    fn code_intent_shrinks_top_k_and_widens_vector_results() {
        let q = query("show me the compress_context function", Intent::Code);
        let s = plan(&q, &[]);
        assert_eq!(s.top_k, 15);
        assert_eq!(s.vector_n_results, 15);
    }

    #[test]
    fn explain_intent_widens_top_k() {
        let q = query("explain the retrieval orchestrator", Intent::Explain);
        let s = plan(&q, &[]);
        assert_eq!(s.top_k, 50);
        assert_eq!(s.memory_limit, 30);
    }

    #[test]
    fn objective_question_caps_top_k_and_disables_graph() {
        let q = query("which file has the compress_context flag", Intent::General);
        let s = plan(&q, &[]);
        assert_eq!(s.top_k, 12);
        assert!(!s.use_graph);
        assert!(s.use_keywords);
    }

    #[test]
    fn long_open_ended_query_expands_budgets() {
        let long_text = "a".repeat(130);
        let q = query(&long_text, Intent::General);
        let s = plan(&q, &[]);
        assert_eq!(s.top_k, 50);
        assert_eq!(s.vector_n_results, 18);
    }

    #[test]
    fn generic_definitional_query_skips_retrieval() {
        let q = query("what is a cache", Intent::General);
        let s = plan(&q, &[]);
        assert_eq!(s.mode, StrategyMode::None);
    }

    #[test]
    fn definitional_query_with_project_term_keeps_hybrid_mode() {
        let q = query("what is ragline's cache ttl", Intent::General);
        let s = plan(&q, &["ragline".to_string()]);
        assert_eq!(s.mode, StrategyMode::Hybrid);
    }

    #[test]
    fn planning_trigger_fires_on_keyword() {
        let q = query("describe the entire retrieval pipeline flow", Intent::General);
        let s = plan(&q, &[]);
        assert!(s.use_planning);
    }

    #[test]
    fn planning_trigger_fires_on_length() {
        let long_text = "a".repeat(170);
        let q = query(&long_text, Intent::General);
        let s = plan(&q, &[]);
        assert!(s.use_planning);
    }
}
