use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use std::sync::Arc;
use tera::Context;

use crate::state::AppState;
use crate::templates::{get_tera, APPROVE_PAGE};

#[derive(Deserialize)]
pub struct ApprovePageQuery {
    #[serde(rename = "studentId")]
    student_id: Option<String>,
}

pub async fn approve_page(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ApprovePageQuery>,
) -> Response {
    let student_id = match query.student_id {
        Some(id) if !id.is_empty() => id,
        _ => {
            return Redirect::to(&with_marker(&state.config.review_page, "error=missing-id"))
                .into_response()
        }
    };

    let mut ctx = Context::new();
    ctx.insert("student_id", &student_id);
    ctx.insert("student_id_json", &script_literal(&student_id));
    ctx.insert("review_page_json", &script_literal(&state.config.review_page));

    render_template(APPROVE_PAGE, ctx)
}

pub fn with_marker(page: &str, marker: &str) -> String {
    let sep = if page.contains('?') { '&' } else { '?' };
    format!("{}{}{}", page, sep, marker)
}

fn script_literal(value: &str) -> String {
    serde_json::Value::String(value.to_string())
        .to_string()
        .replace('<', "\\u003c")
        .replace('>', "\\u003e")
}

fn render_template(name: &str, ctx: Context) -> Response {
    match get_tera().render(name, &ctx) {
        Ok(rendered) => Html(rendered).into_response(),
        Err(err) => {
            tracing::error!(?err, template = name, "failed to render template");
            (StatusCode::INTERNAL_SERVER_ERROR, "Template error").into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marker_is_appended_with_the_right_separator() {
        assert_eq!(with_marker("/", "approved=true"), "/?approved=true");
        assert_eq!(with_marker("/admin?tab=1", "error=true"), "/admin?tab=1&error=true");
    }

    #[test]
    fn script_literal_cannot_close_the_script_block() {
        let literal = script_literal("1</script><script>alert(1)");
        assert!(!literal.contains("</script>"));
        assert!(literal.starts_with('"'));
    }
}
