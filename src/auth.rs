use serde::{Deserialize, Serialize};

use crate::errors::SlackError;

#[derive(Deserialize, Serialize, Debug, Clone)]
struct TestResponse {
    ok: bool,
    error: Option<String>,
}

pub async fn validate_token(
    client: &reqwest::Client,
    base_url: &str,
    token: &str,
) -> Result<(), SlackError> {
    let test_response = client
        .get(format!("{base_url}/auth.test"))
        .bearer_auth(token)
        .send()
        .await?
        .json::<TestResponse>()
        .await?;

    test_response.ok.then_some(()).ok_or_else(|| {
        SlackError::Api(test_response.error.map_or_else(
            || "Could not validate auth token".to_string(),
            |e| e.to_string(),
        ))
    })
}
