use std::sync::OnceLock;
use tera::Tera;

static TERA: OnceLock<Tera> = OnceLock::new();

pub const APPROVE_PAGE: &str = "approve.html";
pub const MODERATION_EMAIL: &str = "moderation_email.html";

pub fn get_tera() -> &'static Tera {
    TERA.get_or_init(|| {
        let mut tera = Tera::default();
        if let Err(err) = tera.add_raw_templates(vec![
            (APPROVE_PAGE, include_str!("../templates/approve.html")),
            (MODERATION_EMAIL, include_str!("../templates/moderation_email.html")),
        ]) {
            tracing::error!(?err, "failed to register templates");
        }
        tera
    })
}
