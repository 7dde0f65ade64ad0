//! Rule matching.
//!
//! A rule matches a window when it is enabled, its process name equals the
//! window's (case-insensitively), and its optional title pattern matches the
//! whole title.  Title patterns are wildcards: `*` is any run of characters,
//! `?` a single character, anything else is literal.  A pattern with an
//! unclosed `[` is rejected: it never matches and is reported once.

use crate::model::WindowRule;
use glob::{MatchOptions, Pattern};
use log::warn;
use std::collections::HashMap;
use std::sync::Mutex;

const TITLE_MATCH: MatchOptions = MatchOptions {
    case_sensitive: false,
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

/// Rule predicate with a cache of compiled title patterns.
///
/// Invalid patterns are cached as `None`, which is what limits the warning
/// to one per distinct pattern.
#[derive(Debug, Default)]
pub struct RuleMatcher {
    patterns: Mutex<HashMap<String, Option<Pattern>>>,
}

impl RuleMatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Does `(process_name, title)` satisfy `rule`?
    pub fn matches(&self, process_name: &str, title: &str, rule: &WindowRule) -> bool {
        if !rule.enabled {
            return false;
        }
        if !process_name.eq_ignore_ascii_case(&rule.process_name) {
            return false;
        }
        match rule.title_pattern.as_deref() {
            Some(pattern) if !pattern.is_empty() => self.title_matches(pattern, title),
            _ => true,
        }
    }

    /// The first enabled rule, by ascending `order`, that matches.  Rules
    /// with equal `order` keep their collection order.
    pub fn first_match<'a>(
        &self,
        process_name: &str,
        title: &str,
        rules: &'a [WindowRule],
    ) -> Option<&'a WindowRule> {
        let mut candidates: Vec<&WindowRule> = rules.iter().filter(|r| r.enabled).collect();
        candidates.sort_by_key(|r| r.order);
        candidates
            .into_iter()
            .find(|r| self.matches(process_name, title, r))
    }

    fn title_matches(&self, pattern: &str, title: &str) -> bool {
        let mut cache = self
            .patterns
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let compiled = cache
            .entry(pattern.to_string())
            .or_insert_with(|| compile(pattern));
        compiled
            .as_ref()
            .is_some_and(|p| p.matches_with(title, TITLE_MATCH))
    }

    #[cfg(test)]
    fn cached_patterns(&self) -> usize {
        self.patterns.lock().map(|c| c.len()).unwrap_or(0)
    }
}

fn compile(pattern: &str) -> Option<Pattern> {
    if has_unclosed_bracket(pattern) {
        warn!("invalid window title pattern {:?}: unclosed '['", pattern);
        return None;
    }
    // Only `*` and `?` are wildcards; everything else, brackets included, is
    // matched literally.  A run of stars is one star.
    let mut escaped = String::with_capacity(pattern.len() * 2);
    let mut after_star = false;
    for c in pattern.chars() {
        match c {
            '*' if after_star => continue,
            '*' | '?' => escaped.push(c),
            _ => escaped.push_str(&Pattern::escape(c.encode_utf8(&mut [0; 4]))),
        }
        after_star = c == '*';
    }
    match Pattern::new(&escaped) {
        Ok(p) => Some(p),
        Err(e) => {
            warn!("invalid window title pattern {:?}: {}", pattern, e);
            None
        }
    }
}

/// A `[` with no `]` after it.
fn has_unclosed_bracket(pattern: &str) -> bool {
    let mut open = false;
    for c in pattern.chars() {
        match c {
            '[' => open = true,
            ']' => open = false,
            _ => {}
        }
    }
    open
}

//  Tests
