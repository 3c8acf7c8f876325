//! Cognito user-pool client speaking the JSON 1.1 API directly.
//!
//! Only the unauthenticated public-client calls are used (`SignUp` and
//! `InitiateAuth` with `USER_PASSWORD_AUTH`), so requests need no signing.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use super::identity::{IdentityError, IdentityProvider, SignInOutcome, SignUpOutcome, SignUpRequest};
use crate::config::IdentityConfig;

const TARGET_PREFIX: &str = "AWSCognitoIdentityProviderService";
const CONTENT_TYPE: &str = "application/x-amz-json-1.1";

pub struct CognitoClient {
    http: reqwest::Client,
    endpoint: String,
    client_id: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(rename = "__type")]
    kind: Option<String>,
    #[serde(alias = "Message")]
    message: Option<String>,
}

impl CognitoClient {
    pub fn new(config: &IdentityConfig) -> Self {
        let endpoint = config
            .cognito_endpoint
            .clone()
            .unwrap_or_else(|| format!("https://cognito-idp.{}.amazonaws.com/", config.cognito_region));

        Self {
            http: reqwest::Client::new(),
            endpoint,
            client_id: config.cognito_client_id.clone(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn sign_up_body(&self, request: &SignUpRequest) -> Value {
        let mut body = json!({
            "ClientId": self.client_id,
            "Username": request.email,
            "Password": request.password,
            "UserAttributes": [
                { "Name": "email", "Value": request.email }
            ],
        });
        if let Some(ip) = &request.ip_address {
            body["UserContextData"] = json!({ "IpAddress": ip });
        }
        body
    }

    fn sign_in_body(&self, email: &str, password: &str) -> Value {
        json!({
            "AuthFlow": "USER_PASSWORD_AUTH",
            "ClientId": self.client_id,
            "AuthParameters": {
                "USERNAME": email,
                "PASSWORD": password,
            },
        })
    }

    async fn call(&self, action: &str, body: &Value) -> Result<Value, IdentityError> {
        let response = self
            .http
            .post(&self.endpoint)
            .header(reqwest::header::CONTENT_TYPE, CONTENT_TYPE)
            .header("X-Amz-Target", format!("{}.{}", TARGET_PREFIX, action))
            .body(body.to_string())
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if status.is_success() {
            if text.trim().is_empty() {
                return Ok(Value::Null);
            }
            return serde_json::from_str(&text)
                .map_err(|e| IdentityError::UnexpectedResponse(format!("{}: {}", action, e)));
        }

        Err(parse_error(status.as_u16(), &text))
    }
}

/// Turns an error response into `Rejected` for client faults (4xx) and
/// `UnexpectedResponse` for everything else.
fn parse_error(status: u16, text: &str) -> IdentityError {
    let parsed: Option<ErrorBody> = serde_json::from_str(text).ok();
    let kind = parsed
        .as_ref()
        .and_then(|b| b.kind.as_deref())
        .map(|k| k.rsplit('#').next().unwrap_or(k).to_string());
    let message = parsed.and_then(|b| b.message);

    match (status, kind, message) {
        (400..=499, Some(kind), message) => IdentityError::Rejected {
            message: message.unwrap_or_else(|| kind.clone()),
            kind,
        },
        (status, kind, _) => IdentityError::UnexpectedResponse(format!(
            "status {} ({})",
            status,
            kind.unwrap_or_else(|| "no error type".to_string())
        )),
    }
}

#[async_trait]
impl IdentityProvider for CognitoClient {
    async fn sign_up(&self, request: &SignUpRequest) -> Result<SignUpOutcome, IdentityError> {
        let response = self.call("SignUp", &self.sign_up_body(request)).await?;
        let user_confirmed = response
            .get("UserConfirmed")
            .and_then(Value::as_bool)
            .unwrap_or(false);
        tracing::info!(user_confirmed, "identity provider accepted registration");
        Ok(SignUpOutcome { user_confirmed })
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<SignInOutcome, IdentityError> {
        let response = self.call("InitiateAuth", &self.sign_in_body(email, password)).await?;

        if response.get("AuthenticationResult").is_some() {
            return Ok(SignInOutcome {
                email: email.to_string(),
            });
        }

        match response.get("ChallengeName").and_then(Value::as_str) {
            Some(challenge) => Err(IdentityError::Rejected {
                kind: challenge.to_string(),
                message: format!("additional verification required ({})", challenge),
            }),
            None => Err(IdentityError::UnexpectedResponse(
                "InitiateAuth returned neither a result nor a challenge".to_string(),
            )),
        }
    }
}
