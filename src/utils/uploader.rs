use reqwest::multipart::{Form, Part};

#[derive(Debug, Clone)]
pub struct MediaUploader {
    client: reqwest::Client,
    upload_url: String,
    api_key: String,
    folder: String,
}

impl MediaUploader {
    pub fn new(upload_url: String, api_key: String, folder: String) -> Self {
        MediaUploader {
            client: reqwest::Client::new(),
            upload_url,
            api_key,
            folder,
        }
    }

    /// Sends one file to the media host. Returns the hosted URL, or None when
    /// the host answers without one.
    pub async fn upload(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<Option<String>, reqwest::Error> {
        let part = Part::bytes(bytes).file_name(file_name.to_string());
        let form = Form::new()
            .text("folder", self.folder.clone())
            .part("file", part);

        let response = self
            .client
            .post(&self.upload_url)
            .header("x-api-key", self.api_key.clone())
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            return Ok(None);
        }

        let body: serde_json::Value = response.json().await?;
        let url = body["url"]
            .as_str()
            .or_else(|| body["secure_url"].as_str())
            .map(|u| u.to_string());

        Ok(url)
    }
}
