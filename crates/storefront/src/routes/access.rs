//! Access gate route handlers.
//!
//! The gate sells the daily pass: the visitor leaves a name and WhatsApp
//! number, the registration is reported to the backend, and the pass is
//! stamped with today's date. The session is the only place the pass
//! lives; logout wipes it wholesale along with the cart.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use cajonera_core::AccessPass;

use crate::error::AppError;
use crate::filters;
use crate::models::session::{access_pass, grant_access, take_notice};
use crate::services::whatsapp;
use crate::state::AppState;

/// Gate page template.
#[derive(Template, WebTemplate)]
#[template(path = "access/gate.html")]
pub struct GateTemplate {
    pub entry_fee: String,
    pub yape_number: String,
    pub notice: Option<String>,
}

/// Pass-granted page template.
#[derive(Template, WebTemplate)]
#[template(path = "access/granted.html")]
pub struct GrantedTemplate {
    pub name: String,
    pub whatsapp_url: String,
}

/// Registration form data.
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub name: String,
    pub phone: String,
}

/// Display the gate. Visitors already holding today's pass skip it.
#[instrument(skip_all)]
pub async fn gate(
    State(state): State<AppState>,
    session: Session,
) -> Result<Response, AppError> {
    if let Some(pass) = access_pass(&session).await
        && pass.is_valid_on(chrono::Local::now().date_naive())
    {
        return Ok(Redirect::to("/").into_response());
    }

    let notice = take_notice(&session).await;
    Ok(GateTemplate {
        entry_fee: state.config().entry_fee.to_string(),
        yape_number: state.config().yape_number.clone(),
        notice,
    }
    .into_response())
}

/// Register the visitor and grant today's pass.
///
/// The pass is granted only after the backend acknowledged the
/// registration; a connectivity failure re-renders the gate with a retry
/// prompt and grants nothing.
#[instrument(skip(state, session))]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<RegisterForm>,
) -> Result<Response, AppError> {
    let name = form.name.trim().to_string();
    let phone = form.phone.trim().to_string();

    if name.is_empty() || phone.is_empty() {
        return Ok(GateTemplate {
            entry_fee: state.config().entry_fee.to_string(),
            yape_number: state.config().yape_number.clone(),
            notice: Some("Completa tu nombre y tu WhatsApp.".to_string()),
        }
        .into_response());
    }

    match state.backend().register_entry(&name, &phone).await {
        Ok(()) => {
            let pass = AccessPass::new(name, phone, chrono::Local::now().date_naive());
            grant_access(&session, &pass).await?;

            let whatsapp_url = whatsapp::entry_link(
                &state.config().admin_phone,
                &pass.name,
                &pass.phone,
                &state.config().entry_fee,
            );

            Ok(GrantedTemplate {
                name: pass.name,
                whatsapp_url,
            }
            .into_response())
        }
        Err(e) => {
            tracing::warn!("entry registration failed: {e}");
            Ok(GateTemplate {
                entry_fee: state.config().entry_fee.to_string(),
                yape_number: state.config().yape_number.clone(),
                notice: Some(e.user_message()),
            }
            .into_response())
        }
    }
}

/// Log out: flush the whole session (pass, cart, checkout stage).
#[instrument(skip_all)]
pub async fn logout(session: Session) -> Result<Response, AppError> {
    session.flush().await?;
    Ok(Redirect::to("/access").into_response())
}
