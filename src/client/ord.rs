use async_trait::async_trait;

use super::html::extract_inscription_ids;
use super::types::InscriptionContent;
use super::InscriptionIndexer;
use crate::error::{Result, WalletError};

/// Ord explorer: scraped output pages and raw content
pub struct HttpOrdExplorer {
    client: reqwest::Client,
    base_url: String,
}

impl HttpOrdExplorer {
    pub fn new(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl InscriptionIndexer for HttpOrdExplorer {
    async fn output_inscriptions(&self, outpoint: &str) -> Result<Vec<String>> {
        let url = format!("{}/output/{}", self.base_url, outpoint);
        log::debug!("GET {}", url);

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(WalletError::Network(format!(
                "output {} returned HTTP {}",
                outpoint,
                response.status()
            )));
        }

        let html = response.text().await?;
        Ok(extract_inscription_ids(&html))
    }

    async fn content(&self, inscription_id: &str) -> Result<InscriptionContent> {
        let url = format!("{}/content/{}", self.base_url, inscription_id);
        log::debug!("GET {}", url);

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(WalletError::Network(format!(
                "content {} returned HTTP {}",
                inscription_id,
                response.status()
            )));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.bytes().await?.to_vec();

        Ok(InscriptionContent { content_type, body })
    }
}
