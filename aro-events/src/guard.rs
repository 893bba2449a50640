use crate::Event;
use aro_value::Value;

/// A single `field:v1,v2,...` guard clause from `spec.md` §4.6: matches if
/// `field` (a dotted path into the event payload) equals *any* of the
/// listed values, case-insensitively when comparing strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateGuard {
    field: String,
    values: Vec<String>,
}

impl StateGuard {
    /// Parses one `field:v1,v2` clause. Returns `None` for specifiers with
    /// no `:` (e.g. a bare `<draft_to_placed>` transition name) — those are
    /// not guards at all, per `spec.md` §4.6.
    pub fn parse_one(clause: &str) -> Option<Self> {
        let (field, values) = clause.split_once(':')?;
        let field = field.trim();
        if field.is_empty() {
            return None;
        }
        let values = values.split(',').map(|v| v.trim().to_string()).filter(|v| !v.is_empty()).collect::<Vec<_>>();
        if values.is_empty() {
            return None;
        }
        Some(StateGuard { field: field.to_string(), values })
    }

    pub fn matches(&self, event: &Event) -> bool {
        let actual = match event.field(&self.field) {
            Some(v) => stringify(v),
            None => return false,
        };
        self.values.iter().any(|v| v.eq_ignore_ascii_case(&actual))
    }
}

fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.to_string(),
        other => other.to_string(),
    }
}

/// A `;`-separated set of [`StateGuard`] clauses. All guards must match
/// (AND across clauses, OR within a clause's value list). An empty set —
/// produced by a handler specifier with no `:` in it at all — always
/// matches, per `spec.md` §4.6.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StateGuardSet {
    guards: Vec<StateGuard>,
}

impl StateGuardSet {
    /// Parses a full specifier string, e.g. `"status:placed,shipped;region:us"`.
    /// Clauses without a `:` are silently dropped rather than rejected,
    /// since a specifier may legitimately mix a bare transition name with
    /// guard clauses.
    pub fn parse(spec: &str) -> Self {
        let guards = spec.split(';').filter_map(StateGuard::parse_one).collect();
        StateGuardSet { guards }
    }

    pub fn is_empty(&self) -> bool {
        self.guards.is_empty()
    }

    pub fn all_match(&self, event: &Event) -> bool {
        self.guards.iter().all(|g| g.matches(event))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aro_value::Value;

    fn event_with(field: &str, value: Value) -> Event {
        Event::new("state.transition").with_field(field, value)
    }

    #[test]
    fn single_clause_matches_any_listed_value() {
        let set = StateGuardSet::parse("status:placed,shipped");
        assert!(set.all_match(&event_with("status", Value::string("shipped"))));
        assert!(!set.all_match(&event_with("status", Value::string("cancelled"))));
    }

    #[test]
    fn comparison_is_case_insensitive() {
        let set = StateGuardSet::parse("status:Placed");
        assert!(set.all_match(&event_with("status", Value::string("PLACED"))));
    }

    #[test]
    fn multiple_clauses_are_anded() {
        let set = StateGuardSet::parse("status:placed;region:us");
        let ev = Event::new("state.transition")
            .with_field("status", Value::string("placed"))
            .with_field("region", Value::string("eu"));
        assert!(!set.all_match(&ev));
    }

    #[test]
    fn bare_transition_name_yields_empty_set_that_always_matches() {
        let set = StateGuardSet::parse("draft_to_placed");
        assert!(set.is_empty());
        assert!(set.all_match(&Event::new("state.transition")));
    }
}
