//! Ordered fallback chains
//!
//! A chain is a list of rules evaluated in order; the first rule that
//! returns a value wins and its `ClassificationSource` is reported with it.
//! New fallback sources are added by pushing another rule, never by
//! editing the existing ones.

use crate::types::ClassificationSource;

/// One link of a fallback chain
pub trait ClassificationRule<I: ?Sized, T>: Send + Sync {
    fn name(&self) -> &str;

    /// Which source a value from this rule is attributed to
    fn source(&self) -> ClassificationSource;

    fn apply(&self, input: &I) -> Option<T>;
}

type RuleFn<I, T> = Box<dyn Fn(&I) -> Option<T> + Send + Sync>;

/// A rule backed by a closure
pub struct FnRule<I: ?Sized, T> {
    name: String,
    source: ClassificationSource,
    f: RuleFn<I, T>,
}

impl<I: ?Sized, T> FnRule<I, T> {
    pub fn new(
        name: impl Into<String>,
        source: ClassificationSource,
        f: impl Fn(&I) -> Option<T> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            source,
            f: Box::new(f),
        }
    }
}

impl<I: ?Sized, T> ClassificationRule<I, T> for FnRule<I, T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn source(&self) -> ClassificationSource {
        self.source
    }

    fn apply(&self, input: &I) -> Option<T> {
        (self.f)(input)
    }
}

/// A value together with the rule source that produced it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classified<T> {
    pub value: T,
    pub source: ClassificationSource,
}

pub struct FallbackChain<I: ?Sized, T> {
    rules: Vec<Box<dyn ClassificationRule<I, T>>>,
}

impl<I: ?Sized, T> Default for FallbackChain<I, T> {
    fn default() -> Self {
        Self { rules: Vec::new() }
    }
}

impl<I: ?Sized, T> FallbackChain<I, T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a rule; it runs after every rule already in the chain.
    pub fn with_rule(mut self, rule: impl ClassificationRule<I, T> + 'static) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    pub fn push(&mut self, rule: Box<dyn ClassificationRule<I, T>>) {
        self.rules.push(rule);
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rule names in evaluation order
    pub fn rule_names(&self) -> Vec<&str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    /// First value any rule produces, or `None` when every rule declines.
    pub fn evaluate(&self, input: &I) -> Option<Classified<T>> {
        self.rules.iter().find_map(|rule| {
            rule.apply(input).map(|value| Classified {
                value,
                source: rule.source(),
            })
        })
    }
}

impl<I: ?Sized, T> std::fmt::Debug for FallbackChain<I, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FallbackChain")
            .field("rules", &self.rule_names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain() -> FallbackChain<str, u32> {
        FallbackChain::new()
            .with_rule(FnRule::new("digits", ClassificationSource::AllocationCode, |s: &str| {
                s.parse().ok()
            }))
            .with_rule(FnRule::new("length", ClassificationSource::Remarks, |s: &str| {
                (!s.is_empty()).then_some(s.len() as u32)
            }))
    }

    #[test]
    fn test_first_rule_wins() {
        let hit = chain().evaluate("42").unwrap();
        assert_eq!(hit.value, 42);
        assert_eq!(hit.source, ClassificationSource::AllocationCode);
    }

    #[test]
    fn test_falls_through_to_later_rule() {
        let hit = chain().evaluate("abc").unwrap();
        assert_eq!(hit.value, 3);
        assert_eq!(hit.source, ClassificationSource::Remarks);
    }

    #[test]
    fn test_all_rules_decline() {
        assert!(chain().evaluate("").is_none());
        assert!(FallbackChain::<str, u32>::new().evaluate("1").is_none());
    }

    #[test]
    fn test_rule_names_in_order() {
        assert_eq!(chain().rule_names(), vec!["digits", "length"]);
    }
}
