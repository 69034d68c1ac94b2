//! Template Renderer — substitutes `<<name>>` scalar placeholders and expands
//! `[[name_start]]`…`[[name_end]]` repeatable blocks against a set of
//! generated field values.
//!
//! Pure function of (template, values); no side effects. Blocks may nest;
//! an inner block resolves against the element-level mapping produced by
//! iterating the outer block, never the top-level mapping.

use std::sync::OnceLock;

use anyhow::anyhow;
use regex::Regex;
use serde_json::{Map, Value};

use crate::errors::AppError;

fn block_start_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\[\[([A-Za-z0-9_]+)_start\]\]").unwrap())
}

fn placeholder_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<<([A-Za-z0-9_]+)>>").unwrap())
}

/// Renders a template against a field-value mapping.
///
/// Scalar values may be strings, numbers, or booleans. A repeatable-block key
/// must map to an ordered sequence of objects; an empty sequence renders the
/// block to empty text. Any referenced key absent from the mapping fails with
/// `MissingField`.
pub fn render(template: &str, values: &Map<String, Value>) -> Result<String, AppError> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(captures) = block_start_re().captures(rest) {
        let start_match = captures.get(0).expect("match 0 always present");
        let key = &captures[1];

        // Literal text (and scalars) before the block.
        out.push_str(&substitute_scalars(&rest[..start_match.start()], values)?);

        let end_tag = format!("[[{key}_end]]");
        let after_start = &rest[start_match.end()..];
        let end_pos = after_start.find(&end_tag).ok_or_else(|| {
            AppError::Internal(anyhow!("Template block '{key}' has no closing marker"))
        })?;
        let body = &after_start[..end_pos];

        let elements = values
            .get(key)
            .ok_or_else(|| AppError::MissingField(key.to_string()))?;
        let elements = elements.as_array().ok_or_else(|| {
            AppError::FieldType(key.to_string(), "expected a sequence of mappings".to_string())
        })?;

        for element in elements {
            let element = element.as_object().ok_or_else(|| {
                AppError::FieldType(key.to_string(), "sequence element is not a mapping".to_string())
            })?;
            out.push_str(&render(body, element)?);
        }

        rest = &after_start[end_pos + end_tag.len()..];
    }

    out.push_str(&substitute_scalars(rest, values)?);
    Ok(out)
}

fn substitute_scalars(text: &str, values: &Map<String, Value>) -> Result<String, AppError> {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;

    for captures in placeholder_re().captures_iter(text) {
        let placeholder = captures.get(0).expect("match 0 always present");
        let key = &captures[1];
        let value = values
            .get(key)
            .ok_or_else(|| AppError::MissingField(key.to_string()))?;
        let rendered = match value {
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            _ => {
                return Err(AppError::FieldType(
                    key.to_string(),
                    "expected a scalar value".to_string(),
                ))
            }
        };
        out.push_str(&text[last..placeholder.start()]);
        out.push_str(&rendered);
        last = placeholder.end();
    }

    out.push_str(&text[last..]);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn values(value: Value) -> Map<String, Value> {
        value.as_object().expect("test values must be an object").clone()
    }

    #[test]
    fn test_plain_text_renders_unchanged() {
        let values = Map::new();
        let text = "Just some literal text, no placeholders.";
        assert_eq!(render(text, &values).unwrap(), text);
    }

    #[test]
    fn test_scalar_placeholder_substitution() {
        let values = values(json!({"name": "Ada", "city": "London"}));
        let rendered = render("<<name>> of <<city>>, also <<name>>", &values).unwrap();
        assert_eq!(rendered, "Ada of London, also Ada");
    }

    #[test]
    fn test_missing_scalar_key_fails() {
        let values = Map::new();
        match render("Hello <<name>>", &values) {
            Err(AppError::MissingField(key)) => assert_eq!(key, "name"),
            other => panic!("expected MissingField, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_block_key_fails() {
        let values = Map::new();
        match render("[[item_start]]x[[item_end]]", &values) {
            Err(AppError::MissingField(key)) => assert_eq!(key, "item"),
            other => panic!("expected MissingField, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_sequence_renders_block_to_empty_text() {
        let values = values(json!({"item": []}));
        let rendered = render("before\n[[item_start]]- <<x>>\n[[item_end]]after", &values).unwrap();
        assert_eq!(rendered, "before\nafter");
    }

    #[test]
    fn test_block_renders_once_per_element_in_order() {
        let values = values(json!({
            "name": "Ada",
            "skill": [{"s": "C++"}, {"s": "Math"}]
        }));
        let rendered = render(
            "Name: <<name>>\n[[skill_start]]- <<s>>\n[[skill_end]]",
            &values,
        )
        .unwrap();
        assert_eq!(rendered, "Name: Ada\n- C++\n- Math\n");
    }

    #[test]
    fn test_nested_blocks_resolve_against_element_mapping() {
        let values = values(json!({
            "job": [
                {
                    "title": "Engineer",
                    "achievement": [{"a": "shipped"}, {"a": "scaled"}]
                },
                {
                    "title": "Intern",
                    "achievement": []
                }
            ]
        }));
        let template = "[[job_start]]<<title>>:\n[[achievement_start]]* <<a>>\n[[achievement_end]][[job_end]]";
        let rendered = render(template, &values).unwrap();
        assert_eq!(rendered, "Engineer:\n* shipped\n* scaled\nIntern:\n");
    }

    #[test]
    fn test_inner_block_does_not_see_top_level_mapping() {
        // `a` exists at the top level but not in the element mapping.
        let values = values(json!({
            "a": "top-level",
            "job": [{"title": "Engineer"}]
        }));
        let template = "[[job_start]]<<title>> <<a>>[[job_end]]";
        match render(template, &values) {
            Err(AppError::MissingField(key)) => assert_eq!(key, "a"),
            other => panic!("expected MissingField, got {other:?}"),
        }
    }

    #[test]
    fn test_rendered_output_is_stable_under_re_render() {
        let values = values(json!({
            "name": "Ada",
            "skill": [{"s": "C++"}, {"s": "Math"}]
        }));
        let rendered = render(
            "Name: <<name>>\n[[skill_start]]- <<s>>\n[[skill_end]]",
            &values,
        )
        .unwrap();
        let again = render(&rendered, &Map::new()).unwrap();
        assert_eq!(again, rendered);
    }

    #[test]
    fn test_unterminated_block_is_an_error() {
        let values = values(json!({"item": []}));
        assert!(render("[[item_start]]dangling", &values).is_err());
    }

    #[test]
    fn test_non_sequence_block_value_is_a_type_error() {
        let values = values(json!({"item": "scalar"}));
        assert!(matches!(
            render("[[item_start]]x[[item_end]]", &values),
            Err(AppError::FieldType(_, _))
        ));
    }

    #[test]
    fn test_numeric_scalar_renders_via_to_string() {
        let values = values(json!({"years": 7}));
        assert_eq!(render("<<years>> years", &values).unwrap(), "7 years");
    }
}
