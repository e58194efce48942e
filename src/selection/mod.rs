// src/selection/mod.rs
use crate::status::ComponentStatus;
use anyhow::bail;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Key/value attributes a matcher is evaluated against.
pub type AttributeSet = BTreeMap<String, String>;

/// Answers "does this key/value set match?". The query model that produces
/// matchers lives outside this crate; everything here treats them as opaque.
pub trait Matcher: Send + Sync {
    fn matches(&self, attrs: &AttributeSet) -> bool;
}

/// Matches every attribute set. The default when no selector is supplied.
#[derive(Debug, Clone, Copy)]
pub struct Everything;

impl Matcher for Everything {
    fn matches(&self, _attrs: &AttributeSet) -> bool {
        true
    }
}

/// Equality-based requirements in the `k=v,k2=v2` query form.
#[derive(Debug, Clone, Default)]
pub struct Requirements(Vec<(String, String)>);

impl Requirements {
    pub fn parse(input: &str) -> anyhow::Result<Self> {
        let mut requirements = Vec::new();
        for term in input.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            let Some((key, value)) = term.split_once('=') else {
                bail!("invalid selector term: {term:?}");
            };
            requirements.push((key.trim().to_string(), value.trim().to_string()));
        }
        Ok(Self(requirements))
    }
}

impl Matcher for Requirements {
    fn matches(&self, attrs: &AttributeSet) -> bool {
        self.0
            .iter()
            .all(|(key, value)| attrs.get(key).map_or(false, |have| have == value))
    }
}

/// Optional selectors accompanying a list request.
#[derive(Clone, Default)]
pub struct ListOptions {
    pub label_selector: Option<Arc<dyn Matcher>>,
    pub field_selector: Option<Arc<dyn Matcher>>,
}

/// Combined label and field matcher applied to list results.
#[derive(Clone)]
pub struct SelectionPredicate {
    label: Arc<dyn Matcher>,
    field: Arc<dyn Matcher>,
}

impl SelectionPredicate {
    /// Builds the predicate for a request. Absent selectors fall back to
    /// matching everything; this never fails.
    pub fn from_options(options: Option<&ListOptions>) -> Self {
        let mut predicate = Self {
            label: Arc::new(Everything),
            field: Arc::new(Everything),
        };
        if let Some(options) = options {
            if let Some(label) = &options.label_selector {
                predicate.label = label.clone();
            }
            if let Some(field) = &options.field_selector {
                predicate.field = field.clone();
            }
        }
        predicate
    }

    /// Only generic metadata is indexable: the synthesized field set carries
    /// the record name, and the label matcher sees the record's labels. The
    /// resource is cluster-scoped, so no namespace field is synthesized.
    pub fn matches(&self, status: &ComponentStatus) -> bool {
        let mut fields = AttributeSet::new();
        fields.insert("metadata.name".to_string(), status.name.clone());
        self.label.matches(&status.labels) && self.field.matches(&fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::ComponentStatus;

    fn record(name: &str) -> ComponentStatus {
        ComponentStatus {
            name: name.to_string(),
            labels: BTreeMap::new(),
            conditions: Vec::new(),
        }
    }

    #[test]
    fn parse_accepts_equality_terms() {
        let requirements = Requirements::parse("a=b, c = d").unwrap();
        let mut attrs = AttributeSet::new();
        attrs.insert("a".to_string(), "b".to_string());
        attrs.insert("c".to_string(), "d".to_string());
        assert!(requirements.matches(&attrs));
    }

    #[test]
    fn parse_rejects_malformed_terms() {
        assert!(Requirements::parse("no-equals-sign").is_err());
    }

    #[test]
    fn no_options_matches_everything() {
        let predicate = SelectionPredicate::from_options(None);
        assert!(predicate.matches(&record("etcd-0")));
    }

    #[test]
    fn field_selector_can_match_on_name() {
        let options = ListOptions {
            label_selector: None,
            field_selector: Some(Arc::new(
                Requirements::parse("metadata.name=etcd-0").unwrap(),
            )),
        };
        let predicate = SelectionPredicate::from_options(Some(&options));
        assert!(predicate.matches(&record("etcd-0")));
        assert!(!predicate.matches(&record("scheduler")));
    }

    #[test]
    fn selector_over_unsupported_keys_matches_nothing() {
        let options = ListOptions {
            label_selector: Some(Arc::new(Requirements::parse("tier=control-plane").unwrap())),
            field_selector: None,
        };
        let predicate = SelectionPredicate::from_options(Some(&options));
        // Labels are always empty, so the filter is honest: it excludes
        // everything instead of being ignored.
        assert!(!predicate.matches(&record("etcd-0")));
    }
}
