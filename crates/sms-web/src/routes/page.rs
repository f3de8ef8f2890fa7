//! Self-service opt-out page.

use askama::Template;
use axum::extract::State;

use crate::state::AppState;

/// Opt-out page template.
#[derive(Template)]
#[template(path = "opt_out.html")]
pub struct OptOutTemplate {
    pub site_url: String,
    pub terms_url: String,
    pub support_url: String,
}

/// Render the opt-out page.
pub async fn opt_out_page(State(state): State<AppState>) -> OptOutTemplate {
    let config = state.gate.config();
    OptOutTemplate {
        site_url: config.site_url.clone(),
        terms_url: config.terms_url(),
        support_url: config.support_url(),
    }
}
