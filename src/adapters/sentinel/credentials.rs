use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::debug;

use crate::adapters::http::{decode_json, read_body, transport};
use crate::core::errors::Result;

/// Scope for the Logs Ingestion API.
pub const INGESTION_SCOPE: &str = "https://monitor.azure.com/.default";

/// Scope for Azure Resource Manager (table management).
pub const MANAGEMENT_SCOPE: &str = "https://management.azure.com/.default";

const LOGIN_URL: &str = "https://login.microsoftonline.com";
const TOKEN_SERVICE: &str = "Microsoft Entra token endpoint";

/// App registration used to talk to Azure.
#[derive(Debug)]
pub struct AzureCredentials {
    pub tenant_id: String,
    pub client_id: String,
    pub client_secret: SecretString,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: u64,
}

impl AzureCredentials {
    /// OAuth2 v2.0 token endpoint for the tenant.
    pub fn token_url(&self) -> String {
        format!("{LOGIN_URL}/{}/oauth2/v2.0/token", self.tenant_id)
    }

    /// Obtain an access token for `scope` with the client-credentials grant.
    ///
    /// Tokens are requested per operation and never cached.
    pub async fn access_token(&self, http: &reqwest::Client, scope: &str) -> Result<SecretString> {
        let form = [
            ("grant_type", "client_credentials"),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.expose_secret()),
            ("scope", scope),
        ];

        let response = http
            .post(self.token_url())
            .form(&form)
            .send()
            .await
            .map_err(|e| transport(TOKEN_SERVICE, e))?;

        let body = read_body(TOKEN_SERVICE, response).await?;
        let token: TokenResponse = decode_json(TOKEN_SERVICE, &body)?;
        debug!(scope, expires_in = token.expires_in, "obtained Azure access token");

        Ok(SecretString::from(token.access_token))
    }
}
