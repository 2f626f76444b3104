//! Reqwest-backed image host adapter.
//!
//! This adapter owns transport details only: endpoint construction, the
//! multipart body, timeout and HTTP error mapping, and JSON decoding of the
//! returned URL.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode};
use url::Url;

use super::dto::{UploadErrorResponseDto, UploadResponseDto};
use crate::domain::ports::{AssetTransport, AssetTransportError, AssetUploadRequest};

/// Public API root; the account and resource path are appended per request.
pub const DEFAULT_UPLOAD_BASE_URL: &str = "https://api.cloudinary.com/v1_1/";

const GENERIC_REJECTION: &str = "Upload failed";

/// Image host adapter performing one multipart POST per upload.
pub struct CloudinaryHttpTransport {
    client: Client,
    base_url: Url,
}

impl CloudinaryHttpTransport {
    /// Build an adapter using a reqwest client with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base_url })
    }
}

#[async_trait]
impl AssetTransport for CloudinaryHttpTransport {
    async fn upload(&self, request: &AssetUploadRequest) -> Result<Url, AssetTransportError> {
        let endpoint = upload_endpoint(&self.base_url, &request.cloud_account)?;
        let form = build_form(request)?;

        let response = self
            .client
            .post(endpoint)
            .header(reqwest::header::ACCEPT, "application/json")
            .multipart(form)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }
        parse_secure_url(body.as_ref())
    }
}

fn upload_endpoint(base_url: &Url, cloud_account: &str) -> Result<Url, AssetTransportError> {
    let mut endpoint = base_url.clone();
    endpoint
        .path_segments_mut()
        .map_err(|()| {
            AssetTransportError::transport(format!("upload base URL {base_url} cannot hold a path"))
        })?
        .pop_if_empty()
        .extend([cloud_account, "image", "upload"]);
    Ok(endpoint)
}

fn build_form(request: &AssetUploadRequest) -> Result<Form, AssetTransportError> {
    let file = &request.file;
    let part = Part::bytes(file.bytes().to_vec())
        .file_name(file.file_name().to_owned())
        .mime_str(file.mime_type())
        .map_err(|error| {
            AssetTransportError::transport(format!("invalid media type {}: {error}", file.mime_type()))
        })?;

    let form = Form::new()
        .part("file", part)
        .text("upload_preset", request.upload_preset.clone());
    Ok(match &request.folder {
        Some(folder) => form.text("folder", folder.clone()),
        None => form,
    })
}

fn parse_secure_url(body: &[u8]) -> Result<Url, AssetTransportError> {
    let decoded: UploadResponseDto = serde_json::from_slice(body).map_err(|error| {
        AssetTransportError::decode(format!("invalid upload response: {error}"))
    })?;
    Url::parse(&decoded.secure_url).map_err(|error| {
        AssetTransportError::decode(format!("secure_url is not a URL: {error}"))
    })
}

fn map_transport_error(error: reqwest::Error) -> AssetTransportError {
    AssetTransportError::transport(error.to_string())
}

fn map_status_error(status: StatusCode, body: &[u8]) -> AssetTransportError {
    let message = serde_json::from_slice::<UploadErrorResponseDto>(body)
        .ok()
        .and_then(UploadErrorResponseDto::into_message)
        .unwrap_or_else(|| GENERIC_REJECTION.to_owned());
    tracing::debug!(status = status.as_u16(), message = %message, "image host refused upload");
    AssetTransportError::rejected(message)
}

#[cfg(test)]
mod tests {
    //! Regression coverage for non-network upload mapping helpers.

    use super::*;
    use crate::domain::asset_upload::CandidateFile;
    use rstest::rstest;

    fn base() -> Url {
        Url::parse(DEFAULT_UPLOAD_BASE_URL).expect("base url")
    }

    #[test]
    fn endpoint_appends_account_and_resource() {
        let endpoint = upload_endpoint(&base(), "eco-club").expect("endpoint");
        assert_eq!(
            endpoint.as_str(),
            "https://api.cloudinary.com/v1_1/eco-club/image/upload"
        );
    }

    #[test]
    fn endpoint_escapes_account_names() {
        let local = Url::parse("http://127.0.0.1:9000").expect("url");
        let endpoint = upload_endpoint(&local, "a/b").expect("endpoint");
        assert_eq!(endpoint.path(), "/a%2Fb/image/upload");
    }

    #[test]
    fn endpoint_rejects_opaque_base() {
        let opaque = Url::parse("mailto:ops@example.org").expect("url");
        assert!(matches!(
            upload_endpoint(&opaque, "club"),
            Err(AssetTransportError::Transport { .. })
        ));
    }

    #[test]
    fn form_rejects_malformed_media_types() {
        let request = AssetUploadRequest {
            cloud_account: "club".to_owned(),
            upload_preset: "unsigned".to_owned(),
            folder: None,
            file: CandidateFile::new("a.png", "image", vec![1, 2, 3]),
        };
        assert!(build_form(&request).is_err());
    }

    #[rstest]
    #[case::provider_message(
        br#"{"error":{"message":"Upload preset must be whitelisted"}}"#.as_slice(),
        "Upload preset must be whitelisted"
    )]
    #[case::missing_message(br#"{"error":{}}"#.as_slice(), GENERIC_REJECTION)]
    #[case::blank_message(br#"{"error":{"message":"  "}}"#.as_slice(), GENERIC_REJECTION)]
    #[case::not_json(b"<html>bad gateway</html>".as_slice(), GENERIC_REJECTION)]
    fn refusals_carry_provider_message_when_present(#[case] body: &[u8], #[case] expected: &str) {
        let error = map_status_error(StatusCode::BAD_REQUEST, body);
        assert_eq!(error, AssetTransportError::rejected(expected));
    }

    #[test]
    fn parses_secure_url() {
        let body = br#"{"public_id":"uploads/a","secure_url":"https://res.cloudinary.com/club/image/upload/v1/uploads/a.png"}"#;
        let url = parse_secure_url(body).expect("decode");
        assert_eq!(url.host_str(), Some("res.cloudinary.com"));
    }

    #[test]
    fn missing_secure_url_is_a_decode_error() {
        let error = parse_secure_url(br#"{"url":"http://x"}"#).expect_err("decode must fail");
        assert!(matches!(error, AssetTransportError::Decode { .. }));
    }
}
