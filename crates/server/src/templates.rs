use breedmatch_common::{BreedMatchError, Result};
use minijinja::{context, Environment};
use serde::Serialize;
use tracing::debug;

/// Page templates compiled into the binary
const TEMPLATES: [(&str, &str); 8] = [
    ("base.html", include_str!("../templates/base.html")),
    ("index.html", include_str!("../templates/index.html")),
    ("dog_home.html", include_str!("../templates/dog_home.html")),
    ("dog_form.html", include_str!("../templates/dog_form.html")),
    ("dog_results.html", include_str!("../templates/dog_results.html")),
    ("dog_breeds.html", include_str!("../templates/dog_breeds.html")),
    ("analytics.html", include_str!("../templates/analytics.html")),
    ("error.html", include_str!("../templates/error.html")),
];

/// HTML renderer; `.html` templates are auto-escaped
pub struct Templates {
    env: Environment<'static>,
}

impl Templates {
    /// Parse every template, failing on the first syntax error
    pub fn new() -> Result<Self> {
        let mut env = Environment::new();
        for (name, source) in TEMPLATES {
            env.add_template(name, source)
                .map_err(|e| BreedMatchError::template(format!("{}: {}", name, e)))?;
        }
        debug!("{} templates loaded", TEMPLATES.len());
        Ok(Self { env })
    }

    pub fn render<S: Serialize>(&self, name: &str, ctx: S) -> Result<String> {
        self.env
            .get_template(name)
            .and_then(|template| template.render(ctx))
            .map_err(|e| BreedMatchError::template(format!("{}: {}", name, e)))
    }

    pub fn render_error(&self, status: u16, message: &str) -> Result<String> {
        self.render("error.html", context! { status, message })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_templates_parse() {
        assert!(Templates::new().is_ok());
    }

    #[test]
    fn test_error_page_escapes_message() {
        let templates = Templates::new().unwrap();
        let html = templates.render_error(400, "<b>size</b> must be between 1 and 5").unwrap();
        assert!(html.contains("400"));
        assert!(html.contains("&lt;b&gt;size"));
        assert!(!html.contains("<b>"));
    }

    #[test]
    fn test_unknown_template() {
        let templates = Templates::new().unwrap();
        assert!(templates.render("missing.html", context! {}).is_err());
    }
}
