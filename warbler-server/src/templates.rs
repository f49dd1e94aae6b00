use anyhow::{Context as _, Result};
use tera::{Context, Tera};

/// Page templates compiled into the binary, keyed by name
const TEMPLATES: &[(&str, &str)] = &[
    ("base.html", include_str!("../templates/base.html")),
    ("macros.html", include_str!("../templates/macros.html")),
    ("home_anon.html", include_str!("../templates/home_anon.html")),
    ("home.html", include_str!("../templates/home.html")),
    ("users/signup.html", include_str!("../templates/users/signup.html")),
    ("users/login.html", include_str!("../templates/users/login.html")),
    ("users/index.html", include_str!("../templates/users/index.html")),
    ("users/detail.html", include_str!("../templates/users/detail.html")),
    ("users/show.html", include_str!("../templates/users/show.html")),
    ("users/following.html", include_str!("../templates/users/following.html")),
    ("users/followers.html", include_str!("../templates/users/followers.html")),
    ("users/likes.html", include_str!("../templates/users/likes.html")),
    ("users/edit.html", include_str!("../templates/users/edit.html")),
    ("messages/new.html", include_str!("../templates/messages/new.html")),
    ("messages/show.html", include_str!("../templates/messages/show.html")),
];

/// Tera environment holding every page the server renders
pub struct Templates {
    tera: Tera,
}

impl Templates {
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();
        tera.add_raw_templates(TEMPLATES.iter().copied())
            .context("Failed to compile templates")?;
        Ok(Self { tera })
    }

    pub fn render(&self, name: &str, context: &Context) -> tera::Result<String> {
        self.tera.render(name, context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flash::Flashes;

    fn anon_context() -> Context {
        let mut ctx = Context::new();
        ctx.insert("current_user", &Option::<warbler_types::User>::None);
        ctx.insert("flashes", &Flashes::default());
        ctx
    }

    #[test]
    fn test_all_templates_compile() {
        let templates = Templates::new().expect("Templates should compile");
        for (name, _) in TEMPLATES {
            assert!(
                templates.tera.get_template_names().any(|n| n == *name),
                "{} missing",
                name
            );
        }
    }

    #[test]
    fn test_anonymous_pages_do_not_greet() {
        let templates = Templates::new().unwrap();
        for name in ["home_anon.html", "users/login.html", "users/signup.html"] {
            let mut ctx = anon_context();
            ctx.insert("form", &serde_json::json!({}));
            ctx.insert("errors", &serde_json::json!({}));
            let html = templates.render(name, &ctx).unwrap();
            assert!(!html.contains("Hello"), "{} greets", name);
            assert!(!html.contains("Followers"), "{} mentions followers", name);
            assert!(!html.contains("Following"), "{} mentions following", name);
        }
    }

    #[test]
    fn test_output_is_escaped() {
        let templates = Templates::new().unwrap();
        let mut ctx = anon_context();
        ctx.insert(
            "message",
            &serde_json::json!({
                "id": 1,
                "text": "<script>alert(1)</script>",
                "timestamp": "2024-01-01T12:00:00.000000+00:00",
                "user_id": 1,
                "author_username": "testuser",
                "author_image_url": warbler_types::DEFAULT_IMAGE_URL,
                "liked": false,
            }),
        );
        let html = templates.render("messages/show.html", &ctx).unwrap();
        assert!(!html.contains("<script>alert"));
        assert!(html.contains("&lt;script&gt;"));
    }
}
