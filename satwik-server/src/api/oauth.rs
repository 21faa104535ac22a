//! OAuth2 authorization-code flow for connecting the gateway to Accu360.

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::get,
};
use satwik_core::entities::rfc3339;
use satwik_core::vendor::CredentialError;
use satwik_sdk::objects::OAuthConnected;
use serde::Deserialize;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/accu360/initiate", get(initiate))
        .route("/auth/accu360/callback", get(callback))
}

/// `GET /auth/accu360/initiate`: redirect to the Accu360 consent page.
async fn initiate(State(state): State<AppState>) -> Result<Redirect, OAuthApiError> {
    let config = state.config.vendor.read().await.clone();
    let url = state.credentials.authorize_url(&config)?;
    tracing::info!("Starting Accu360 OAuth authorization");
    Ok(Redirect::to(url.as_str()))
}

#[derive(Debug, Deserialize)]
struct CallbackParams {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

/// `GET /auth/accu360/callback`: exchange the code and store the credential.
async fn callback(
    State(state): State<AppState>,
    Query(params): Query<CallbackParams>,
) -> Result<Json<OAuthConnected>, OAuthApiError> {
    if let Some(error) = params.error {
        let detail = params.error_description.unwrap_or(error);
        return Err(OAuthApiError::Denied(detail));
    }
    let code = params
        .code
        .filter(|code| !code.is_empty())
        .ok_or(OAuthApiError::MissingParameter("code"))?;
    let oauth_state = params
        .state
        .filter(|s| !s.is_empty())
        .ok_or(OAuthApiError::MissingParameter("state"))?;

    let config = state.config.vendor.read().await.clone();
    let credential = state
        .credentials
        .complete_authorization(&config, &code, &oauth_state)
        .await?;

    Ok(Json(OAuthConnected {
        status: "connected".to_string(),
        expires_at: rfc3339(credential.expires_at),
    }))
}

#[derive(Debug)]
enum OAuthApiError {
    /// Accu360 reported an error instead of a code.
    Denied(String),
    MissingParameter(&'static str),
    Credential(CredentialError),
}

impl From<CredentialError> for OAuthApiError {
    fn from(e: CredentialError) -> Self {
        Self::Credential(e)
    }
}

impl IntoResponse for OAuthApiError {
    fn into_response(self) -> Response {
        match self {
            OAuthApiError::Denied(detail) => {
                tracing::warn!(detail = %detail, "Accu360 authorization denied");
                (
                    StatusCode::BAD_REQUEST,
                    format!("authorization failed: {detail}"),
                )
                    .into_response()
            }
            OAuthApiError::MissingParameter(name) => (
                StatusCode::BAD_REQUEST,
                format!("missing {name} parameter"),
            )
                .into_response(),
            OAuthApiError::Credential(e) => match e {
                CredentialError::OAuthNotConfigured => (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "Accu360 OAuth is not configured",
                )
                    .into_response(),
                CredentialError::InvalidState(e) => {
                    tracing::warn!(error = %e, "Rejected OAuth callback state");
                    (StatusCode::BAD_REQUEST, "invalid or expired state").into_response()
                }
                CredentialError::OAuth(e) => {
                    tracing::error!(error = %e, "Accu360 token exchange failed");
                    (StatusCode::BAD_GATEWAY, e.to_string()).into_response()
                }
                other => {
                    tracing::error!(error = %other, "OAuth credential error");
                    (StatusCode::INTERNAL_SERVER_ERROR, "internal server error").into_response()
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::testing::{TestApp, body_json};
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use satwik_core::entities::vendor_credentials::ACCU360;
    use satwik_core::store::CredentialStore;
    use tower::ServiceExt;
    use url::Url;

    async fn get(app: &TestApp, uri: &str) -> axum::response::Response {
        app.router()
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn initiate_then_callback_stores_credential() {
        let app = TestApp::with_oauth();
        let response = get(&app, "/auth/accu360/initiate").await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let location = response
            .headers()
            .get(header::LOCATION)
            .unwrap()
            .to_str()
            .unwrap();
        let location = Url::parse(location).unwrap();
        assert_eq!(location.host_str(), Some("erp.example.com"));
        let state = location
            .query_pairs()
            .find(|(k, _)| k == "state")
            .map(|(_, v)| v.into_owned())
            .unwrap();

        let mut callback = Url::parse("http://gateway/auth/accu360/callback").unwrap();
        callback
            .query_pairs_mut()
            .append_pair("code", "granted")
            .append_pair("state", &state);
        let uri = format!("{}?{}", callback.path(), callback.query().unwrap());
        let response = get(&app, &uri).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "connected");
        assert!(body["expires_at"].as_str().unwrap().ends_with('Z'));

        let stored = app.store.load_credential(ACCU360).await.unwrap().unwrap();
        assert_eq!(stored.access_token, "access-for-granted");
    }

    #[tokio::test]
    async fn callback_rejects_bad_state() {
        let app = TestApp::with_oauth();
        let response = get(&app, "/auth/accu360/callback?code=granted&state=123.abc.forged").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(app.store.load_credential(ACCU360).await.unwrap().is_none());

        let response = get(&app, "/auth/accu360/callback?state=123.abc.def").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn callback_surfaces_vendor_error() {
        let app = TestApp::with_oauth();
        let response = get(
            &app,
            "/auth/accu360/callback?error=access_denied&error_description=User%20declined",
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn oauth_endpoints_unavailable_without_client() {
        let app = TestApp::new();
        let response = get(&app, "/auth/accu360/initiate").await;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let response = get(&app, "/auth/accu360/callback?code=c&state=s").await;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
