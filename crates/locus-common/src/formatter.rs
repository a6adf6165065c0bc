use crate::error::DetachedNodeError;
use crate::tree::DocumentTree;

/// Field names whose values are masked in outlines.
const DEFAULT_SENSITIVE_FIELDS: &[&str] = &[
    "password",
    "secret",
    "token",
    "cvv",
    "ssn",
    "card_number",
    "credit_card",
];

/// Render a snapshot as an indented outline, one node per line.
///
/// ```text
/// @ https://example.test/login "Login"
/// [0] div#root
///   [1] form#login-form
///     [2] input[type="text"][placeholder="Username"]
/// ```
pub fn format_outline(
    tree: &DocumentTree,
    sensitive_fields: &[String],
) -> Result<String, DetachedNodeError> {
    let root = tree.root()?;
    let mut output = String::new();
    if !tree.url().is_empty() || !tree.title().is_empty() {
        output.push_str(&format!("@ {} {:?}\n", tree.url(), tree.title()));
    }

    for node in tree.subtree(root.id())? {
        let node = node?;
        let mut depth = 0;
        let mut current = node.parent()?;
        while let Some(parent) = current {
            depth += 1;
            current = parent.parent()?;
        }

        let mut line = format!("{}[{}] {}", "  ".repeat(depth), node.id(), node.describe());
        if let Some(value) = node.attribute("value") {
            let field = [node.attribute("type"), node.attribute("name"), node.attribute("id")]
                .into_iter()
                .flatten()
                .collect::<Vec<_>>()
                .join(" ");
            line.push_str(&format!(" = {:?}", mask_sensitive(value, &field, sensitive_fields)));
        }
        if let Some(text) = node.text().map(str::trim).filter(|t| !t.is_empty()) {
            line.push_str(&format!(" {:?}", text));
        }
        output.push_str(&line);
        output.push('\n');
    }

    Ok(output)
}

pub fn mask_sensitive(value: &str, field_name: &str, sensitive_fields: &[String]) -> String {
    let lower_field = field_name.to_lowercase();

    let is_sensitive = sensitive_fields
        .iter()
        .any(|f| lower_field.contains(&f.to_lowercase()))
        || DEFAULT_SENSITIVE_FIELDS
            .iter()
            .any(|f| lower_field.contains(*f));

    if is_sensitive {
        "••••••••".to_string()
    } else {
        value.to_string()
    }
}
