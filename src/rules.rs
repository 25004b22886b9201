//! Window placement rules.
//!
//! Rules are checked in order when a window is first managed. Every
//! matching rule is applied (later matches overwrite flags, tags
//! accumulate) unless a rule asks to be the last one via `match_once`.
use crate::pure::floatpos::FloatSpec;

/// Window properties a rule can match on.
///
/// String fields match as substrings; the window type matches exactly
/// against the resolved atom name. A `None` pattern matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WindowProps {
    /// WM_CLASS class (second field)
    pub class: String,
    /// WM_CLASS instance (first field)
    pub instance: String,
    /// WM_NAME / _NET_WM_NAME
    pub title: String,
    /// WM_WINDOW_ROLE
    pub role: String,
    /// _NET_WM_WINDOW_TYPE, as the atom's name
    pub win_type: Option<String>,
}

/// A single placement rule.
#[derive(Debug, Clone, Default)]
pub struct Rule {
    pub class: Option<String>,
    pub instance: Option<String>,
    pub title: Option<String>,
    pub role: Option<String>,
    pub win_type: Option<String>,
    /// Tags to add to the client (a bitmask, 0 adds nothing)
    pub tags: u32,
    pub is_floating: bool,
    /// Terminal windows are swallow candidates for their children
    pub is_terminal: bool,
    pub no_swallow: bool,
    /// Stop processing further rules after this one matches
    pub match_once: bool,
    /// Monitor to send the client to
    pub monitor: Option<usize>,
    /// Floating placement spec, implies `is_floating`
    pub float_pos: Option<FloatSpec>,
}

impl Rule {
    fn matches(&self, props: &WindowProps) -> bool {
        let sub = |pat: &Option<String>, hay: &str| match pat {
            Some(p) => hay.contains(p.as_str()),
            None => true,
        };

        sub(&self.class, &props.class)
            && sub(&self.instance, &props.instance)
            && sub(&self.title, &props.title)
            && sub(&self.role, &props.role)
            && match &self.win_type {
                Some(t) => props.win_type.as_deref() == Some(t.as_str()),
                None => true,
            }
    }
}

/// The combined effect of all matching rules on a new client.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleOutcome {
    pub tags: u32,
    pub is_floating: bool,
    pub is_terminal: bool,
    pub no_swallow: bool,
    pub monitor: Option<usize>,
    pub float_pos: Option<FloatSpec>,
}

/// Run `props` through the rule list and fold the matches together.
pub fn apply_rules(rules: &[Rule], props: &WindowProps) -> RuleOutcome {
    let mut out = RuleOutcome::default();

    for r in rules.iter().filter(|r| r.matches(props)) {
        out.is_floating = r.is_floating;
        out.is_terminal = r.is_terminal;
        out.no_swallow = r.no_swallow;
        out.tags |= r.tags;
        if let Some(fp) = r.float_pos {
            out.is_floating = true;
            out.float_pos = Some(fp);
        }
        if r.monitor.is_some() {
            out.monitor = r.monitor;
        }
        if r.match_once {
            break;
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use simple_test_case::test_case;

    fn props(class: &str, title: &str) -> WindowProps {
        WindowProps {
            class: class.to_string(),
            instance: class.to_lowercase(),
            title: title.to_string(),
            role: String::new(),
            win_type: None,
        }
    }

    fn rule(class: Option<&str>, tags: u32, is_floating: bool) -> Rule {
        Rule {
            class: class.map(String::from),
            tags,
            is_floating,
            ..Default::default()
        }
    }

    #[test_case(Some("fox"), true; "substring of class")]
    #[test_case(Some("Firefox"), true; "full class")]
    #[test_case(Some("Chrome"), false; "mismatch")]
    #[test_case(None, true; "wildcard")]
    #[test]
    fn class_matching(pat: Option<&str>, expected: bool) {
        let rules = [rule(pat, 1 << 2, false)];
        let out = apply_rules(&rules, &props("Firefox", "browsing"));

        assert_eq!(out.tags != 0, expected);
    }

    #[test]
    fn tags_accumulate_across_matches() {
        let rules = [
            rule(Some("term"), 1 << 1, false),
            rule(None, 1 << 3, true),
        ];
        let out = apply_rules(&rules, &props("xterm", ""));

        assert_eq!(out.tags, 1 << 1 | 1 << 3);
        assert!(out.is_floating);
    }

    #[test]
    fn later_matches_overwrite_flags() {
        let rules = [rule(None, 0, true), rule(Some("term"), 0, false)];
        let out = apply_rules(&rules, &props("xterm", ""));

        assert!(!out.is_floating);
    }

    #[test]
    fn match_once_stops_processing() {
        let first = Rule {
            class: Some("term".to_string()),
            tags: 1,
            match_once: true,
            ..Default::default()
        };
        let rules = [first, rule(None, 1 << 5, true)];
        let out = apply_rules(&rules, &props("xterm", ""));

        assert_eq!(out.tags, 1);
        assert!(!out.is_floating);
    }

    #[test]
    fn window_type_matches_exactly() {
        let r = Rule {
            win_type: Some("_NET_WM_WINDOW_TYPE_DIALOG".to_string()),
            is_floating: true,
            ..Default::default()
        };

        let mut p = props("App", "");
        assert!(!apply_rules(&[r.clone()], &p).is_floating);

        p.win_type = Some("_NET_WM_WINDOW_TYPE_DIALOG".to_string());
        assert!(apply_rules(&[r], &p).is_floating);
    }

    #[test]
    fn float_pos_implies_floating() {
        let r = Rule {
            class: Some("scratch".to_string()),
            float_pos: FloatSpec::parse("50% 50% 60% 60%"),
            ..Default::default()
        };
        let out = apply_rules(&[r], &props("scratchpad", ""));

        assert!(out.is_floating);
        assert!(out.float_pos.is_some());
    }

    #[test]
    fn monitor_assignment_sticks() {
        let rules = [
            Rule {
                class: Some("term".to_string()),
                monitor: Some(1),
                ..Default::default()
            },
            rule(None, 0, false),
        ];
        let out = apply_rules(&rules, &props("xterm", ""));

        assert_eq!(out.monitor, Some(1));
    }
}
