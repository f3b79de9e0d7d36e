//! The ephemeral per-run execution context a chain workflow threads
//! through its steps.

use std::collections::HashMap;

use crate::error::GenaiError;

pub const USER_INPUT_KEY: &str = "USER_INPUT";

/// Per-run key/value store seeded with `USER_INPUT` and appended to once
/// per completed chain step. Never mutated by a router run.
#[derive(Debug, Clone, Default)]
pub struct ExecutionContext {
    values: HashMap<String, String>,
}

impl ExecutionContext {
    pub fn new(initial_input: impl Into<String>) -> Self {
        let mut values = HashMap::new();
        values.insert(USER_INPUT_KEY.to_string(), initial_input.into());
        Self { values }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(|s| s.as_str())
    }

    pub fn user_input(&self) -> &str {
        self.values
            .get(USER_INPUT_KEY)
            .map(|s| s.as_str())
            .unwrap_or_default()
    }

    /// Record a completed step's output. Rejects a `step_id` that's
    /// already present — a step id collision is a load-time rejection, so
    /// this should only ever fire on a config bug that slipped past
    /// validation.
    pub fn insert_once(&mut self, key: impl Into<String>, value: impl Into<String>) -> Result<(), GenaiError> {
        let key = key.into();
        if self.values.contains_key(&key) {
            return Err(GenaiError::config_invalid(format!(
                "duplicate execution context key: {key}"
            )));
        }
        self.values.insert(key, value.into());
        Ok(())
    }

    /// Resolve an `inputTemplate` by replacing every `{{key}}` with the
    /// corresponding context value. Unknown keys are left literal.
    pub fn render_template(&self, template: &str) -> String {
        let mut out = String::with_capacity(template.len());
        let mut rest = template;
        loop {
            match rest.find("{{") {
                None => {
                    out.push_str(rest);
                    break;
                }
                Some(start) => {
                    out.push_str(&rest[..start]);
                    let after_open = &rest[start + 2..];
                    match after_open.find("}}") {
                        None => {
                            out.push_str(&rest[start..]);
                            break;
                        }
                        Some(end) => {
                            let key = after_open[..end].trim();
                            match self.values.get(key) {
                                Some(value) => out.push_str(value),
                                None => {
                                    out.push_str("{{");
                                    out.push_str(key);
                                    out.push_str("}}");
                                }
                            }
                            rest = &after_open[end + 2..];
                        }
                    }
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeds_user_input() {
        let ctx = ExecutionContext::new("essay");
        assert_eq!(ctx.user_input(), "essay");
        assert_eq!(ctx.get("USER_INPUT"), Some("essay"));
    }

    #[test]
    fn insert_once_rejects_duplicate_key() {
        let mut ctx = ExecutionContext::new("x");
        ctx.insert_once("step1", "a").unwrap();
        assert!(ctx.insert_once("step1", "b").is_err());
    }

    #[test]
    fn render_template_substitutes_known_keys_and_leaves_unknown_literal() {
        let mut ctx = ExecutionContext::new("essay");
        ctx.insert_once("step1", "S1(essay)").unwrap();
        let rendered = ctx.render_template("score {{step1}} for {{USER_INPUT}} via {{unknown}}");
        assert_eq!(rendered, "score S1(essay) for essay via {{unknown}}");
    }
}
