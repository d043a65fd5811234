//! URL template substitution.
//!
//! Templates use `{name}` placeholders. `{{` and `}}` stand for literal
//! braces. Values are inserted verbatim; nothing is percent-encoded.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::error::Error;
use crate::http::{render_value, Args};

static TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{|\}\}|\{([^{}]*)\}|[{}]").expect("valid token pattern"));

/// Substitute every placeholder in `template` with its value from `vars`.
pub fn resolve(template: &str, vars: &Args) -> Result<String, Error> {
    let mut failure = None;
    let resolved = TOKEN.replace_all(template, |caps: &Captures<'_>| {
        match (&caps[0], caps.get(1)) {
            ("{{", _) => "{".to_string(),
            ("}}", _) => "}".to_string(),
            (_, Some(name)) => match vars.get(name.as_str()) {
                Some(value) => render_value(value),
                None => {
                    failure.get_or_insert_with(|| Error::UnresolvedPlaceholder {
                        name: name.as_str().to_string(),
                        template: template.to_string(),
                    });
                    String::new()
                }
            },
            _ => {
                failure.get_or_insert_with(|| Error::MalformedTemplate {
                    template: template.to_string(),
                });
                String::new()
            }
        }
    });
    match failure {
        Some(err) => Err(err),
        None => Ok(resolved.into_owned()),
    }
}

/// Placeholder names referenced by `template`, in order of appearance.
pub fn placeholders(template: &str) -> Vec<&str> {
    TOKEN
        .captures_iter(template)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn vars(value: serde_json::Value) -> Args {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn substitutes_all_placeholders() {
        let url = resolve(
            "http://api/users/{user}/repos/{repo}",
            &vars(json!({"user": "octo", "repo": "hello"})),
        )
        .unwrap();
        assert_eq!(url, "http://api/users/octo/repos/hello");
    }

    #[test]
    fn numbers_render_without_quotes() {
        let url = resolve("/users/{id}", &vars(json!({"id": 42}))).unwrap();
        assert_eq!(url, "/users/42");
    }

    #[test]
    fn repeated_placeholder_uses_same_value() {
        let url = resolve("/{a}/{a}", &vars(json!({"a": "x"}))).unwrap();
        assert_eq!(url, "/x/x");
    }

    #[test]
    fn missing_value_is_unresolved() {
        let err = resolve("/users/{id}", &Args::new()).unwrap_err();
        assert!(matches!(err, Error::UnresolvedPlaceholder { ref name, .. } if name == "id"));
    }

    #[test]
    fn first_missing_placeholder_is_reported() {
        let err = resolve("/{a}/{b}", &vars(json!({"c": 1}))).unwrap_err();
        assert!(matches!(err, Error::UnresolvedPlaceholder { ref name, .. } if name == "a"));
    }

    #[test]
    fn doubled_braces_are_literal() {
        let url = resolve("/raw/{{id}}/{id}", &vars(json!({"id": 7}))).unwrap();
        assert_eq!(url, "/raw/{id}/7");
    }

    #[test]
    fn lone_brace_is_malformed() {
        let err = resolve("/users/{id", &vars(json!({"id": 1}))).unwrap_err();
        assert!(matches!(err, Error::MalformedTemplate { .. }));
    }

    #[test]
    fn stray_closing_brace_is_malformed() {
        for template in ["/a}", "/{id}}"] {
            let err = resolve(template, &vars(json!({"id": 1}))).unwrap_err();
            assert!(
                matches!(err, Error::MalformedTemplate { template: ref t } if t == template),
                "{template}: {err:?}"
            );
        }
    }

    #[test]
    fn unused_vars_are_ignored() {
        let url = resolve("/plain", &vars(json!({"id": 1}))).unwrap();
        assert_eq!(url, "/plain");
    }

    #[test]
    fn lists_placeholders_in_order() {
        assert_eq!(placeholders("/{org}/{{skip}}/{repo}"), vec!["org", "repo"]);
    }
}
