//! Per-row template substitution
//!
//! Both syntaxes substitute in a single left-to-right pass over the template,
//! so a value that itself looks like a token (`{{name}}`, `{title}`) is copied
//! into the output verbatim and never expanded. Rendering is a pure function
//! of its inputs.

use regex::Captures;
use std::collections::HashSet;

use super::placeholder::{DOUBLE_BRACE_TOKEN, SINGLE_BRACE_TOKEN};
use crate::app::models::{PlaceholderSet, Row, TokenSyntax};

/// Fill `{key}` tokens for every column of the row
///
/// Keys match case-insensitively. Tokens that name no column are left as they
/// are, braces included.
pub fn render_single_brace(template: &str, row: &Row) -> String {
    SINGLE_BRACE_TOKEN
        .replace_all(template, |caps: &Captures| match row.get(&caps[1]) {
            Some(value) => value.to_string(),
            None => caps[0].to_string(),
        })
        .into_owned()
}

/// Fill `{{name}}` tokens for every name of the placeholder list
///
/// The token text must equal a listed name exactly; the row lookup is
/// case-insensitive and a missing column renders as an empty string.
pub fn render_double_brace(template: &str, placeholders: &[String], row: &Row) -> String {
    let names: HashSet<&str> = placeholders.iter().map(String::as_str).collect();

    DOUBLE_BRACE_TOKEN
        .replace_all(template, |caps: &Captures| {
            let name = &caps[1];
            if names.contains(name) {
                row.get(name).unwrap_or_default().to_string()
            } else {
                caps[0].to_string()
            }
        })
        .into_owned()
}

/// Template renderer bound to one template and syntax
#[derive(Debug, Clone)]
pub struct TemplateRenderer {
    template: String,
    syntax: TokenSyntax,
    placeholders: Vec<String>,
}

impl TemplateRenderer {
    /// Renderer for a single-brace template
    pub fn single_brace(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            syntax: TokenSyntax::SingleBrace,
            placeholders: Vec::new(),
        }
    }

    /// Renderer for a double-brace template and its extracted placeholders
    pub fn double_brace(template: impl Into<String>, placeholders: &PlaceholderSet) -> Self {
        Self {
            template: template.into(),
            syntax: TokenSyntax::DoubleBrace,
            placeholders: placeholders.names().to_vec(),
        }
    }

    pub fn syntax(&self) -> TokenSyntax {
        self.syntax
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn render(&self, row: &Row) -> String {
        match self.syntax {
            TokenSyntax::SingleBrace => render_single_brace(&self.template, row),
            TokenSyntax::DoubleBrace => {
                render_double_brace(&self.template, &self.placeholders, row)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::services::placeholder::extract_placeholders;

    fn row(fields: &[(&str, &str)]) -> Row {
        Row::new(
            2,
            fields
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn test_single_brace_case_insensitive() {
        let row = row(&[("Name", "Ann"), ("email", "ann@realdomain.com")]);
        let rendered = render_single_brace("{NAME} <{Email}> {name}", &row);
        assert_eq!(rendered, "Ann <ann@realdomain.com> Ann");
    }

    #[test]
    fn test_single_brace_unknown_tokens_untouched() {
        let row = row(&[("name", "Ann")]);
        let rendered = render_single_brace("<style>p { margin: 0 }</style>{phone}{name}", &row);
        assert_eq!(rendered, "<style>p { margin: 0 }</style>{phone}Ann");
    }

    #[test]
    fn test_single_brace_no_recursive_substitution() {
        let row = row(&[("name", "{title}"), ("title", "CEO")]);
        assert_eq!(render_single_brace("{name} / {title}", &row), "{title} / CEO");
    }

    #[test]
    fn test_double_brace_replaces_listed_tokens() {
        let template = "Hi {{name}}, email {{email}}";
        let placeholders = extract_placeholders(template);
        let renderer = TemplateRenderer::double_brace(template, &placeholders);

        let rendered = renderer.render(&row(&[("Name", "Ann"), ("EMAIL", "a@x.com")]));
        assert_eq!(rendered, "Hi Ann, email a@x.com");
    }

    #[test]
    fn test_double_brace_missing_column_renders_empty() {
        let template = "[{{phone}}]";
        let renderer = TemplateRenderer::double_brace(template, &extract_placeholders(template));
        assert_eq!(renderer.render(&row(&[("name", "Ann")])), "[]");
    }

    #[test]
    fn test_double_brace_unlisted_spelling_is_untouched() {
        let placeholders = vec!["name".to_string()];
        let rendered = render_double_brace("{{name}} {{ name }} {{other}}", &placeholders, &row(&[("name", "Ann")]));
        assert_eq!(rendered, "Ann {{ name }} {{other}}");
    }

    #[test]
    fn test_double_brace_no_recursive_substitution() {
        let template = "{{name}}|{{title}}";
        let renderer = TemplateRenderer::double_brace(template, &extract_placeholders(template));
        let rendered = renderer.render(&row(&[("name", "{{title}}"), ("title", "CEO")]));
        assert_eq!(rendered, "{{title}}|CEO");
    }

    #[test]
    fn test_rendered_output_has_no_residual_tokens() {
        let template = "<p>{{name}}</p>";
        let renderer = TemplateRenderer::double_brace(template, &extract_placeholders(template));
        let rendered = renderer.render(&row(&[("name", "Ann")]));

        assert_eq!(rendered, "<p>Ann</p>");
        assert!(extract_placeholders(&rendered).is_empty());
    }

    #[test]
    fn test_rendering_is_idempotent() {
        let renderer = TemplateRenderer::single_brace("{name} - {title}");
        let row = row(&[("name", "Ann"), ("title", "CEO")]);
        assert_eq!(renderer.render(&row), renderer.render(&row));
        assert_eq!(renderer.syntax(), TokenSyntax::SingleBrace);
    }
}
