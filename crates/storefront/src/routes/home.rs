//! Landing page.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Query, State},
    response::IntoResponse,
};
use tower_sessions::Session;

use crate::middleware::OptionalMember;
use crate::routes::{Flash, MessageQuery, Nav};
use crate::state::AppState;

/// Landing page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub nav: Nav,
    pub flash: Flash,
}

/// Display the landing page with register and login links.
pub async fn home(
    State(state): State<AppState>,
    session: Session,
    OptionalMember(member): OptionalMember,
    Query(query): Query<MessageQuery>,
) -> impl IntoResponse {
    HomeTemplate {
        nav: Nav::load(&state, &session, member.as_ref()).await,
        flash: query.flash(),
    }
}
