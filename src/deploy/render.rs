//! Manifest template rendering.
//!
//! Templates carry `{{Key}}` placeholders. Unknown placeholders are left
//! intact: manifests are opaque to this crate and may contain their own
//! templating for downstream consumers.

use std::collections::HashMap;

/// Parameters substituted into a manifest template.
#[derive(Debug, Clone)]
pub struct RenderParams {
    values: HashMap<String, String>,
}

impl RenderParams {
    /// Parameter set for an application deployment. `AppName` is always
    /// present.
    #[must_use]
    pub fn for_application(app_name: &str) -> Self {
        let mut values = HashMap::new();
        values.insert("AppName".to_string(), app_name.to_string());
        Self { values }
    }

    #[must_use]
    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.values.insert(key.to_string(), value.to_string());
        self
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }
}

/// Substitute `{{Key}}` placeholders in `template` with the parameter set.
/// Surrounding whitespace inside the braces is tolerated.
#[must_use]
pub fn render(template: &str, params: &RenderParams) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find("{{") {
        let Some(close_rel) = rest[open + 2..].find("}}") else {
            break;
        };
        let close = open + 2 + close_rel;

        out.push_str(&rest[..open]);
        let key = rest[open + 2..close].trim();
        match params.get(key) {
            Some(value) => out.push_str(value),
            // unknown placeholder: keep verbatim
            None => out.push_str(&rest[open..close + 2]),
        }
        rest = &rest[close + 2..];
    }
    out.push_str(rest);

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substitutes_app_name() {
        let params = RenderParams::for_application("infer1");
        assert_eq!(
            render("name: {{AppName}}-db", &params),
            "name: infer1-db"
        );
    }

    #[test]
    fn tolerates_inner_whitespace() {
        let params = RenderParams::for_application("infer1");
        assert_eq!(render("{{ AppName }}", &params), "infer1");
    }

    #[test]
    fn leaves_unknown_placeholders_intact() {
        let params = RenderParams::for_application("infer1");
        assert_eq!(
            render("image: {{Registry}}/db:{{AppName}}", &params),
            "image: {{Registry}}/db:infer1"
        );
    }

    #[test]
    fn handles_multiple_occurrences() {
        let params = RenderParams::for_application("a");
        assert_eq!(render("{{AppName}}{{AppName}}", &params), "aa");
    }

    #[test]
    fn unterminated_braces_pass_through() {
        let params = RenderParams::for_application("a");
        assert_eq!(render("oops {{AppName", &params), "oops {{AppName");
    }

    #[test]
    fn extra_params_are_available() {
        let params = RenderParams::for_application("a").with("Tag", "v2");
        assert_eq!(render("{{Tag}}", &params), "v2");
    }
}
