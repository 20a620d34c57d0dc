use std::{net::SocketAddr, sync::Arc};

use axum::{
    Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::{get, post},
};
use azdo_hooks::{
    AzureDevOpsClient, Build, Config, Event, GitPush, QueueBuildOptions, Resource, WebhookError,
    format_ref,
    webhook::{self, WebhookCredentials},
};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

#[derive(Clone)]
struct AppState {
    credentials: Arc<WebhookCredentials>,
    azure_client: Arc<AzureDevOpsClient>,
    config: Config,
}

async fn healthz(State(_state): State<AppState>) -> &'static str {
    "ok"
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing with env filter, defaulting to debug levels if RUST_LOG is unset.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("debug,axum=info,reqwest=info,hyper_util=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .compact()
        .init();

    let config = Config::load()?;
    let state = AppState {
        credentials: Arc::new(config.webhook_credentials()),
        azure_client: Arc::new(config.azure_client()),
        config,
    };

    let addr: SocketAddr = state.config.bind_addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("listening on {}", addr);
    axum::serve(listener, app(state)).await?;

    Ok(())
}

fn app(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/events", post(receive_event))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

async fn receive_event(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, String) {
    let activity_id = webhook::activity_id(&headers);
    let subscription_id = webhook::subscription_id(&headers);

    let payload = match webhook::validate_payload(&headers, &body, &state.credentials) {
        Ok(payload) => payload,
        Err(e) => {
            tracing::warn!(activity_id, subscription_id, error = %e, "rejected webhook delivery");
            return (StatusCode::UNAUTHORIZED, "Authentication failed".to_string());
        }
    };

    let mut event = match Event::from_slice(payload) {
        Ok(event) => event,
        Err(e) => {
            tracing::warn!(activity_id, error = %e, "could not decode webhook envelope");
            return (e.status_code(), e.to_string());
        }
    };

    tracing::info!(
        activity_id,
        subscription_id,
        notification_id = ?event.notification_id,
        event_type = event.event_type().unwrap_or_default(),
        "received webhook"
    );

    match event.dispatch() {
        Ok(Resource::Push(push)) => {
            if let Err(e) = on_push(&state, push).await {
                tracing::error!(activity_id, error = %e, "failed to queue build for push");
            }
            (StatusCode::OK, "ok".to_string())
        }
        Ok(Resource::PullRequest(pr)) => {
            tracing::info!(
                pull_request_id = ?pr.pull_request_id,
                source = pr.source_branch().unwrap_or_default(),
                target = pr.target_branch().unwrap_or_default(),
                "pull request event"
            );
            (StatusCode::OK, "ok".to_string())
        }
        Ok(Resource::WorkItem(item)) => {
            tracing::info!(
                work_item_id = ?item.id,
                title = item.title().unwrap_or_default(),
                "work item commented"
            );
            (StatusCode::OK, "ok".to_string())
        }
        Ok(Resource::WorkItemUpdate(update)) => {
            tracing::info!(
                work_item_id = ?update.work_item_id,
                changed = update.fields.len(),
                "work item updated"
            );
            (StatusCode::OK, "ok".to_string())
        }
        Err(e @ WebhookError::UnknownEventType { .. }) => {
            tracing::warn!(activity_id, error = %e, "ignoring webhook");
            (e.status_code(), e.to_string())
        }
        Err(e) => {
            tracing::warn!(activity_id, error = %e, "could not dispatch webhook");
            (e.status_code(), e.to_string())
        }
    }
}

/// Queues the configured build for the pushed branch, if a definition is set.
async fn on_push(state: &AppState, push: &GitPush) -> Result<(), azdo_hooks::ClientError> {
    let Some(definition_id) = state.config.queue_build_definition_id else {
        return Ok(());
    };
    let branch = state
        .config
        .queue_build_source_branch
        .as_deref()
        .or_else(|| push.ref_updates.first().and_then(|u| u.name.as_deref()));
    let Some(branch) = branch else {
        tracing::debug!(push_id = ?push.push_id, "push carries no ref update; nothing to build");
        return Ok(());
    };

    let queued = state
        .azure_client
        .queue_build(
            &Build::queue_request(definition_id, format_ref(branch)),
            &QueueBuildOptions::default(),
        )
        .await?;
    tracing::info!(
        build_id = ?queued.id,
        build_number = queued.build_number.as_deref().unwrap_or_default(),
        url = queued.web_url().unwrap_or_default(),
        "queued build"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use axum::{body::Body, http::Request, http::header::AUTHORIZATION};
    use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
    use secrecy::SecretString;
    use tower::ServiceExt;

    use super::*;

    fn test_app() -> Router {
        let config = Config {
            webhook_username: "hook".to_string(),
            webhook_password: SecretString::from("s3cret".to_string()),
            azdo_org: "fabrikam".to_string(),
            azdo_project: "Fabrikam-Fiber-Git".to_string(),
            azdo_pat: SecretString::from("pat".to_string()),
            bind_addr: "127.0.0.1:0".to_string(),
            queue_build_definition_id: None,
            queue_build_source_branch: None,
        };
        app(AppState {
            credentials: Arc::new(config.webhook_credentials()),
            azure_client: Arc::new(config.azure_client()),
            config,
        })
    }

    fn delivery(auth: Option<(&str, &str)>, body: &str) -> Request<Body> {
        let mut req = Request::post("/events");
        if let Some((user, pass)) = auth {
            let value = format!("Basic {}", BASE64.encode(format!("{}:{}", user, pass)));
            req = req.header(AUTHORIZATION, value);
        }
        req.body(Body::from(body.to_string())).unwrap()
    }

    async fn status(req: Request<Body>) -> StatusCode {
        test_app().oneshot(req).await.unwrap().status()
    }

    #[tokio::test]
    async fn healthz_answers_ok() {
        let req = Request::get("/healthz").body(Body::empty()).unwrap();
        assert_eq!(status(req).await, StatusCode::OK);
    }

    #[tokio::test]
    async fn wrong_or_missing_credentials_are_unauthorized() {
        let body = r#"{"eventType":"git.push","resource":{}}"#;
        assert_eq!(status(delivery(None, body)).await, StatusCode::UNAUTHORIZED);
        assert_eq!(
            status(delivery(Some(("hook", "wrong")), body)).await,
            StatusCode::UNAUTHORIZED
        );
    }

    #[tokio::test]
    async fn known_events_are_accepted() {
        let body = r#"{"eventType":"git.pullrequest.created","resource":{"pullRequestId":22,"status":"active"}}"#;
        assert_eq!(
            status(delivery(Some(("hook", "s3cret")), body)).await,
            StatusCode::OK
        );

        let body = r#"{"eventType":"git.push","resource":{"pushId":14,"refUpdates":[{"name":"refs/heads/master"}]}}"#;
        assert_eq!(
            status(delivery(Some(("hook", "s3cret")), body)).await,
            StatusCode::OK
        );
    }

    #[tokio::test]
    async fn failures_map_to_status_codes() {
        let creds = Some(("hook", "s3cret"));
        assert_eq!(
            status(delivery(creds, "not json")).await,
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status(delivery(creds, r#"{"resource":{}}"#)).await,
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status(delivery(
                creds,
                r#"{"eventType":"release.deployment.completed","resource":{}}"#
            ))
            .await,
            StatusCode::ACCEPTED
        );
        assert_eq!(
            status(delivery(
                creds,
                r#"{"eventType":"git.push","resource":{"pushId":"fourteen"}}"#
            ))
            .await,
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }
}
