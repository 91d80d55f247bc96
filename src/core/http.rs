use std::time::Duration;

use reqwest::{
    header::USER_AGENT,
    Client,
    Response,
};

use crate::core::FlashcardError;

const REQUEST_TIMEOUT_SECS: u64 = 30;
const AGENT: &str = "baby-flashcard/0.5 (+reqwest)";

pub fn http_client() -> Result<Client, FlashcardError> {
    Client::builder()
        .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .build()
        .map_err(|e| FlashcardError::Custom(format!("HTTP client build failed: {e}")))
}

pub async fn get_text(client: &Client, url: &str) -> Result<String, FlashcardError> {
    let resp = client.get(url).header(USER_AGENT, AGENT).send().await?;
    ensure_success(&resp)?;
    Ok(resp.text().await?)
}

pub async fn get_bytes(client: &Client, url: &str) -> Result<Vec<u8>, FlashcardError> {
    let resp = client.get(url).header(USER_AGENT, AGENT).send().await?;
    ensure_success(&resp)?;
    Ok(resp.bytes().await?.to_vec())
}

fn ensure_success(resp: &Response) -> Result<(), FlashcardError> {
    if !resp.status().is_success() {
        return Err(FlashcardError::HttpStatus {
            status: resp.status().as_u16(),
            url: resp.url().to_string(),
        });
    }
    Ok(())
}
