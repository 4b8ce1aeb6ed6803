use serde_json::{Map, Value};
use tera::{Context, Tera};

use crate::error::TemplateError;

/// Render a Tera template with the request context.
///
/// `template_name` decides auto-escaping: names ending in `.html` escape
/// substituted values. Undefined variables are a render error.
pub fn render_template(
    template_name: &str,
    template_content: &str,
    context: &Map<String, Value>,
) -> Result<String, TemplateError> {
    let mut tera = Tera::default();
    tera.add_raw_template(template_name, template_content)
        .map_err(|e| TemplateError::Parse(e.to_string()))?;

    let context = Context::from_serialize(context)?;
    let rendered = tera.render(template_name, &context)?;
    Ok(rendered)
}
