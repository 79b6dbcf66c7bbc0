//! Geordnete Regeltabelle: die erste passende Regel gewinnt.
//!
//! Eine [`RuleTable`] besteht aus beliebig vielen [`Rule`]s und genau einer
//! Auffangregel ([`Fallback`]). Weil die Auffangregel beim Konstruieren
//! verpflichtend ist, liefert [`RuleTable::evaluate`] für jede Eingabe genau
//! eine [`Decision`].

use crate::Decision;

/// Eine Zeile der Regeltabelle.
///
/// `C` ist der Auswertungskontext (Percept plus abgeleitete Signale),
/// `A` die Aktionsmenge des Agenten.
pub struct Rule<C, A> {
    pub name: &'static str,
    pub when: fn(&C) -> bool,
    pub action: A,
    pub explain: fn(&C) -> String,
}

/// Auffangregel am Ende der Tabelle.
pub struct Fallback<C, A> {
    pub name: &'static str,
    pub action: A,
    pub explain: fn(&C) -> String,
}

pub struct RuleTable<C, A> {
    rules: Vec<Rule<C, A>>,
    fallback: Fallback<C, A>,
}

impl<C, A: std::fmt::Debug> std::fmt::Debug for RuleTable<C, A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleTable")
            .field(
                "rules",
                &self.rules.iter().map(|r| r.name).collect::<Vec<_>>(),
            )
            .field("fallback", &self.fallback.name)
            .field("fallback_action", &self.fallback.action)
            .finish()
    }
}

impl<C, A: Clone> RuleTable<C, A> {
    #[must_use]
    pub fn new(rules: Vec<Rule<C, A>>, fallback: Fallback<C, A>) -> Self {
        Self { rules, fallback }
    }

    /// Wertet die Regeln von oben nach unten aus.
    ///
    /// `signal` wird unverändert in die [`Decision`] übernommen.
    pub fn evaluate(&self, ctx: &C, signal: Option<f64>) -> Decision<A> {
        for rule in &self.rules {
            if (rule.when)(ctx) {
                return Decision {
                    action: rule.action.clone(),
                    rule: rule.name.to_string(),
                    why: (rule.explain)(ctx),
                    signal,
                };
            }
        }
        Decision {
            action: self.fallback.action.clone(),
            rule: self.fallback.name.to_string(),
            why: (self.fallback.explain)(ctx),
            signal,
        }
    }

    /// Regelnamen in Vorrangreihenfolge, Auffangregel zuletzt.
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        self.rules
            .iter()
            .map(|r| r.name)
            .chain(std::iter::once(self.fallback.name))
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len() + 1
    }

    /// Eine Tabelle hat immer mindestens ihre Auffangregel.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Act {
        Big,
        Small,
        Nothing,
    }

    fn table() -> RuleTable<i32, Act> {
        RuleTable::new(
            vec![
                Rule {
                    name: "Huge",
                    when: |n: &i32| *n > 100,
                    action: Act::Big,
                    explain: |n: &i32| format!("{n} > 100"),
                },
                Rule {
                    name: "Positive",
                    when: |n: &i32| *n > 0,
                    action: Act::Small,
                    explain: |n: &i32| format!("{n} > 0"),
                },
            ],
            Fallback {
                name: "Default",
                action: Act::Nothing,
                explain: |_: &i32| "nothing matched".into(),
            },
        )
    }

    #[test]
    fn first_match_wins() {
        let d = table().evaluate(&500, None);
        assert_eq!(d.action, Act::Big);
        assert_eq!(d.rule, "Huge");
        assert_eq!(d.why, "500 > 100");
    }

    #[test]
    fn later_rule_applies_when_earlier_does_not_match() {
        let d = table().evaluate(&7, Some(7.0));
        assert_eq!(d.action, Act::Small);
        assert_eq!(d.signal, Some(7.0));
    }

    #[test]
    fn fallback_catches_everything_else() {
        let d = table().evaluate(&-3, None);
        assert_eq!(d.action, Act::Nothing);
        assert_eq!(d.rule, "Default");
    }

    #[test]
    fn names_are_listed_in_precedence_order() {
        let t = table();
        assert_eq!(t.names(), vec!["Huge", "Positive", "Default"]);
        assert_eq!(t.len(), 3);
    }
}
