//! Minimum-version gate against `/api/v3/meta`.

use semver::Version;
use serde::Deserialize;

use crate::client::EnterpriseClient;
use crate::error::VersionError;
use crate::progress::{ProgressCallback, ReportProgress, emit};

/// Oldest instance version whose GraphQL schema has the enterprise members
/// connection filtered by organization and role.
pub const MIN_SUPPORTED_VERSION: Version = Version::new(2, 19, 0);

/// Instance metadata from `GET /api/v3/meta`.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct InstanceMetadata {
    #[serde(rename = "installed_version", default)]
    pub version: String,
    #[serde(rename = "verifiable_password_authentication", default)]
    pub auth_mode: bool,
}

/// Parse a version string as reported by the instance.
///
/// Surrounding whitespace and a leading `v` are tolerated.
pub fn parse_version(raw: &str) -> Result<Version, VersionError> {
    let trimmed = raw.trim();
    let trimmed = trimmed.strip_prefix('v').unwrap_or(trimmed);
    Version::parse(trimmed).map_err(|source| VersionError::UnparsableVersion {
        raw: raw.to_string(),
        source,
    })
}

/// Compare an installed version string with the minimum.
///
/// Ordering is numeric per component, so `2.100.0` is newer than `2.21.0`.
pub fn ensure_supported(installed: &str, minimum: &Version) -> Result<Version, VersionError> {
    let installed = parse_version(installed)?;
    if installed < *minimum {
        return Err(VersionError::Unsupported {
            installed,
            minimum: minimum.clone(),
        });
    }
    Ok(installed)
}

impl EnterpriseClient {
    /// Fetch instance metadata.
    pub async fn instance_metadata(&self) -> Result<InstanceMetadata, VersionError> {
        let response = self.get("/meta").await?;

        if !response.is_success() {
            let message = String::from_utf8_lossy(&response.body).to_string();
            return Err(VersionError::Status {
                status: response.status,
                message,
            });
        }

        Ok(serde_json::from_slice(&response.body)?)
    }

    /// Fail unless the instance runs at least `minimum`.
    pub async fn check_minimum_version(
        &self,
        minimum: &Version,
        on_progress: Option<&ProgressCallback>,
    ) -> Result<InstanceMetadata, VersionError> {
        emit(
            on_progress,
            ReportProgress::CheckingVersion {
                host: self.host().to_string(),
                minimum: minimum.to_string(),
            },
        );

        let metadata = self.instance_metadata().await?;
        tracing::debug!(
            installed_version = %metadata.version,
            verifiable_password_authentication = metadata.auth_mode,
            "Fetched instance metadata"
        );

        let installed = ensure_supported(&metadata.version, minimum)?;

        emit(
            on_progress,
            ReportProgress::VersionAccepted {
                installed: installed.to_string(),
                minimum: minimum.to_string(),
            },
        );

        Ok(metadata)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::http::{HttpMethod, HttpResponse, MockTransport};

    const META_URL: &str = "https://ghe.example.com/api/v3/meta";

    fn minimum(raw: &str) -> Version {
        Version::parse(raw).expect("valid minimum")
    }

    fn client(transport: &MockTransport) -> EnterpriseClient {
        EnterpriseClient::new_with_transport("ghe.example.com", "t0ken", Arc::new(transport.clone()))
    }

    #[test]
    fn test_min_supported_version() {
        assert_eq!(MIN_SUPPORTED_VERSION.to_string(), "2.19.0");
        assert!(ensure_supported("2.19.0", &MIN_SUPPORTED_VERSION).is_ok());
        assert!(ensure_supported("2.18.22", &MIN_SUPPORTED_VERSION).is_err());
    }

    #[test]
    fn test_equal_version_is_supported() {
        assert!(ensure_supported("2.21.0", &minimum("2.21.0")).is_ok());
    }

    #[test]
    fn test_older_patch_is_rejected() {
        let err = ensure_supported("2.20.9", &minimum("2.21.0")).expect_err("older");
        assert!(matches!(err, VersionError::Unsupported { .. }));
    }

    #[test]
    fn test_comparison_is_numeric_not_lexicographic() {
        assert!(ensure_supported("2.100.0", &minimum("2.21.0")).is_ok());
        assert!(ensure_supported("3.0.0", &minimum("2.21.0")).is_ok());
        assert!(ensure_supported("2.9.0", &minimum("2.21.0")).is_err());
    }

    #[test]
    fn test_leading_v_and_whitespace_are_tolerated() {
        assert_eq!(
            parse_version(" v3.9.2 ").expect("parses"),
            Version::new(3, 9, 2)
        );
    }

    #[test]
    fn test_unparsable_version_is_a_distinct_error() {
        for raw in ["", "enterprise", "2.21"] {
            let err = ensure_supported(raw, &minimum("2.21.0")).expect_err("unparsable");
            match err {
                VersionError::UnparsableVersion { raw: got, .. } => assert_eq!(got, raw),
                other => panic!("unexpected error for {raw:?}: {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn test_check_minimum_version_accepts_new_enough_instance() {
        let transport = MockTransport::new();
        transport.push_json(
            HttpMethod::Get,
            META_URL,
            serde_json::json!({
                "verifiable_password_authentication": true,
                "installed_version": "2.21.3"
            }),
        );

        let metadata = client(&transport)
            .check_minimum_version(&minimum("2.21.0"), None)
            .await
            .expect("2.21.3 satisfies 2.21.0");
        assert_eq!(metadata.version, "2.21.3");
        assert!(metadata.auth_mode);
        assert_eq!(transport.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_check_minimum_version_rejects_old_instance() {
        let transport = MockTransport::new();
        transport.push_json(
            HttpMethod::Get,
            META_URL,
            serde_json::json!({
                "verifiable_password_authentication": false,
                "installed_version": "2.10.0"
            }),
        );

        let err = client(&transport)
            .check_minimum_version(&minimum("2.21.0"), None)
            .await
            .expect_err("2.10.0 is too old");
        match err {
            VersionError::Unsupported { installed, minimum } => {
                assert_eq!(installed, Version::new(2, 10, 0));
                assert_eq!(minimum, Version::new(2, 21, 0));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_missing_installed_version_is_unparsable() {
        let transport = MockTransport::new();
        transport.push_json(
            HttpMethod::Get,
            META_URL,
            serde_json::json!({"verifiable_password_authentication": true}),
        );

        let err = client(&transport)
            .check_minimum_version(&minimum("2.21.0"), None)
            .await
            .expect_err("no version");
        assert!(matches!(err, VersionError::UnparsableVersion { .. }));
    }

    #[tokio::test]
    async fn test_non_success_status_fails() {
        let transport = MockTransport::new();
        transport.push_response(
            HttpMethod::Get,
            META_URL,
            HttpResponse {
                status: 404,
                headers: Vec::new(),
                body: br#"{"message":"Not Found"}"#.to_vec(),
            },
        );

        let err = client(&transport)
            .check_minimum_version(&minimum("2.21.0"), None)
            .await
            .expect_err("404");
        assert!(matches!(err, VersionError::Status { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_malformed_body_fails() {
        let transport = MockTransport::new();
        transport.push_response(
            HttpMethod::Get,
            META_URL,
            HttpResponse {
                status: 200,
                headers: Vec::new(),
                body: b"<html>proxy login</html>".to_vec(),
            },
        );

        let err = client(&transport)
            .check_minimum_version(&minimum("2.21.0"), None)
            .await
            .expect_err("not JSON");
        assert!(matches!(err, VersionError::Json(_)));
    }

    #[tokio::test]
    async fn test_transport_error_fails() {
        let transport = MockTransport::new();
        let err = client(&transport)
            .check_minimum_version(&minimum("2.21.0"), None)
            .await
            .expect_err("no response scripted");
        assert!(matches!(err, VersionError::Http(_)));
    }
}
