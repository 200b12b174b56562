use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Form,
};
use serde::Deserialize;
use tracing::{error, info, warn};

use broadsheet_core::analytics::{ProgressSink, Tenant};
use broadsheet_core::collector::collect;
use broadsheet_report::artifacts::{CONTAINER, ERROR_PAGE};
use broadsheet_report::{ReportBuilder, ReportContext};

use crate::error::AppError;
use crate::links;
use crate::session::{
    LogSink, Session, STATUS_BROADSHEET_FAILED, STATUS_BROADSHEET_GENERATED,
    STATUS_INSIGHTS_ACQUIRED,
};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SubmitForm {
    #[serde(default)]
    pub organization: String,
    #[serde(default)]
    pub project: String,
}

/// `POST /submit` — build a broadsheet and redirect to it.
///
/// The build runs in its own task, so a client that disconnects does not
/// abort it or release the build lock early. Always answers `302 Found`,
/// pointing at the container page or at the error page.
#[tracing::instrument(skip_all, fields(organisation = %form.organization, project = %form.project))]
pub async fn submit(
    State(state): State<Arc<AppState>>,
    Form(form): Form<SubmitForm>,
) -> Result<Response, AppError> {
    let task = tokio::spawn(build(state, form));
    let location = task
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("build task failed: {e}")))??;
    Ok((StatusCode::FOUND, [(header::LOCATION, location)]).into_response())
}

/// Run one submission end to end and return the redirect target.
pub async fn build(state: Arc<AppState>, form: SubmitForm) -> Result<String, AppError> {
    let _guard = state.build_lock.lock().await;

    let session = state.start_session(&form.organization, &form.project);
    let dir = state.session_dir(&session);
    tokio::fs::create_dir_all(&dir)
        .await
        .map_err(|e| anyhow::anyhow!("cannot create {}: {e}", dir.display()))?;
    info!(session = %session.id, dir = %dir.display(), "Submission accepted");

    let builder = ReportBuilder::new(&dir, report_context(&state, &session));
    let sink = LogSink::new(Arc::clone(&state.log), session.clone());

    let tenant = match Tenant::new(&form.organization, &form.project) {
        Ok(tenant) => tenant,
        Err(err) => {
            sink.progress("", err.status()).await;
            let message = err.user_message(&session.organisation, &session.project);
            return write_error(&state, &session, builder, message).await;
        }
    };

    let bundle = match collect(
        state.source.as_ref(),
        &tenant,
        &state.config.insights,
        state.today(),
        &sink,
    )
    .await
    {
        Ok(bundle) => bundle,
        Err(err) => {
            if err.is_user_facing() {
                warn!(session = %session.id, error = %err, "Broadsheet not available");
            } else {
                error!(session = %session.id, error = %err, "Insights collection failed");
            }
            return write_error(&state, &session, builder, err.user_message_for(&tenant)).await;
        }
    };
    let analytics_id = bundle.collection.id.clone();
    sink.progress(&analytics_id, STATUS_INSIGHTS_ACQUIRED).await;

    let writer = builder.clone();
    let written = tokio::task::spawn_blocking(move || writer.write_bundle(&bundle))
        .await
        .map_err(|e| anyhow::anyhow!("report task failed: {e}"))?;
    match written {
        Ok(_) => {
            sink.progress(&analytics_id, STATUS_BROADSHEET_GENERATED).await;
            Ok(state.bundle_path(&session, CONTAINER))
        }
        Err(err) => {
            error!(session = %session.id, error = %err, "Report bundle could not be written");
            sink.progress(&analytics_id, STATUS_BROADSHEET_FAILED).await;
            let message = format!(
                "The broadsheet could not be generated. Please try again. ({}/{})",
                tenant.organisation, tenant.project
            );
            write_error(&state, &session, builder, message).await
        }
    }
}

fn report_context(state: &AppState, session: &Session) -> ReportContext {
    let config = &state.config;
    let bundle_dir = links::path_of(&[config.cache_mount().as_str(), session.dir_name().as_str()]);
    ReportContext {
        session_id: session.id.clone(),
        version: concat!("v", env!("CARGO_PKG_VERSION")).to_string(),
        generated_at: session.started_at,
        project_url: links::join(
            &config.app_url,
            &[session.organisation.as_str(), session.project.as_str()],
        ),
        bundle_url: config.public_url(&bundle_dir),
        home_url: config.public_url("/"),
        top_keywords: config.insights.top_keywords,
    }
}

async fn write_error(
    state: &AppState,
    session: &Session,
    builder: ReportBuilder,
    message: String,
) -> Result<String, AppError> {
    tokio::task::spawn_blocking(move || builder.write_error_page(&message))
        .await
        .map_err(|e| anyhow::anyhow!("report task failed: {e}"))?
        .map_err(anyhow::Error::from)?;
    Ok(state.bundle_path(session, ERROR_PAGE))
}
