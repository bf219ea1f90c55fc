// src/utils/template.rs

//! Placeholder substitution for tool argument templates.
//!
//! Templates use `{name}` placeholders, e.g. `-o {output}`. Unknown
//! placeholders are left untouched so a literal brace in an argument
//! survives rendering.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;

fn placeholder_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{([a-z_]+)\}").expect("placeholder pattern is valid"))
}

/// Substitute every known `{name}` in `template` with its value.
///
/// # Examples
/// ```
/// use std::collections::BTreeMap;
/// use sharder::utils::template::render;
///
/// let vars = BTreeMap::from([("input", "a.csv".to_string())]);
/// assert_eq!(render("--input={input} {other}", &vars), "--input=a.csv {other}");
/// ```
pub fn render(template: &str, vars: &BTreeMap<&str, String>) -> String {
    placeholder_re()
        .replace_all(template, |caps: &regex::Captures<'_>| {
            vars.get(&caps[1])
                .cloned()
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// Names of all placeholders referenced by a set of templates.
pub fn placeholders<'a>(templates: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut names: Vec<String> = templates
        .into_iter()
        .flat_map(|t| placeholder_re().captures_iter(t))
        .map(|caps| caps[1].to_string())
        .collect();
    names.sort();
    names.dedup();
    names
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars() -> BTreeMap<&'static str, String> {
        BTreeMap::from([
            ("input", "sorted/parts.aa".to_string()),
            ("key_column", "1".to_string()),
        ])
    }

    #[test]
    fn test_render_replaces_all_occurrences() {
        assert_eq!(render("{key_column},{key_column}", &vars()), "1,1");
        assert_eq!(render("{input}", &vars()), "sorted/parts.aa");
    }

    #[test]
    fn test_render_keeps_unknown_placeholders() {
        assert_eq!(render("{nope} {}", &vars()), "{nope} {}");
    }

    #[test]
    fn test_placeholders_are_deduplicated() {
        let names = placeholders(["-k", "{key_column},{key_column}", "{input}"]);
        assert_eq!(names, vec!["input".to_string(), "key_column".to_string()]);
    }
}
