// Object-storage (S3) backed repository

use crate::config::RepositoryEntry;
use crate::constants;
use crate::error::{FetchError, Result};
use crate::platform::PlatformSpec;
use crate::repository::template::render_location;
use crate::repository::{BinaryRepository, archive_name, ensure_edition_supported};
use crate::ui;
use crate::version::{Edition, VersionInfo};
use anyhow::Context;
use async_trait::async_trait;
use log::{debug, info};
use s3::bucket::Bucket;
use s3::creds::Credentials;
use s3::error::S3Error;
use s3::region::Region;
use std::io;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::task::{Context as TaskContext, Poll};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::OnceCell;

/// Progress callbacks per object, roughly.
///
/// The callback interval is `size / 1000` bytes, so a large object reports
/// about a thousand times whatever its size.
const PROGRESS_STEPS: u64 = 1000;

pub type ProgressCallback = Box<dyn FnMut(u64, u64) + Send>;

/// Repository whose archives live in an S3 bucket under templated keys
pub struct S3Repository {
    name: String,
    supported_editions: Vec<Edition>,
    url_template: String,
    bucket_name: String,
    access_key: String,
    secret_key: String,
    region: String,
    endpoint: Option<String>,
    bucket: OnceCell<Box<Bucket>>,
}

impl std::fmt::Debug for S3Repository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("S3Repository")
            .field("name", &self.name)
            .field("supported_editions", &self.supported_editions)
            .field("url_template", &self.url_template)
            .field("bucket_name", &self.bucket_name)
            .field("region", &self.region)
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

fn required(name: &str, value: &Option<String>, key: &str) -> Result<String> {
    value
        .clone()
        .filter(|v| !v.is_empty())
        .ok_or_else(|| FetchError::InvalidRepositoryConfig {
            name: name.to_string(),
            reason: format!("missing field `{}`", key),
        })
}

impl S3Repository {
    pub fn from_entry(name: &str, entry: &RepositoryEntry) -> Result<Self> {
        Ok(Self {
            name: name.to_string(),
            supported_editions: entry.supported_editions.clone(),
            url_template: entry.url_template.clone(),
            bucket_name: required(name, &entry.bucket_name, "bucketName")?,
            access_key: required(name, &entry.access_key, "accessKey")?,
            secret_key: required(name, &entry.secret_key, "secretKey")?,
            region: entry
                .region
                .clone()
                .unwrap_or_else(|| constants::DEFAULT_S3_REGION.to_string()),
            endpoint: entry.endpoint.clone(),
            bucket: OnceCell::new(),
        })
    }

    /// Bucket handle, created on first use and reused afterwards
    async fn bucket(&self) -> Result<&Bucket> {
        let bucket = self
            .bucket
            .get_or_try_init(|| async { self.connect() })
            .await?;
        Ok(bucket.as_ref())
    }

    fn connect(&self) -> Result<Box<Bucket>> {
        debug!(
            "Connecting to bucket '{}' for repository '{}'",
            self.bucket_name, self.name
        );
        let credentials = Credentials::new(
            Some(self.access_key.as_str()),
            Some(self.secret_key.as_str()),
            None,
            None,
            None,
        )
        .with_context(|| format!("Invalid credentials for repository '{}'", self.name))?;

        let region = match &self.endpoint {
            Some(endpoint) => Region::Custom {
                region: self.region.clone(),
                endpoint: endpoint.clone(),
            },
            None => self
                .region
                .parse::<Region>()
                .with_context(|| format!("Invalid region '{}'", self.region))?,
        };

        let bucket = Bucket::new(&self.bucket_name, region, credentials)
            .with_context(|| format!("Unable to open bucket '{}'", self.bucket_name))?;

        Ok(if self.endpoint.is_some() {
            bucket.with_path_style()
        } else {
            bucket
        })
    }

    fn not_found(&self, key: &str) -> FetchError {
        FetchError::NotFoundInRepository(format!(
            "No such file '{}' in bucket '{}'",
            key, self.bucket_name
        ))
    }

    fn transfer_error(&self, key: &str, err: S3Error) -> FetchError {
        match err {
            S3Error::HttpFailWithBody(404, _) => self.not_found(key),
            other => anyhow::Error::new(other)
                .context(format!(
                    "Failed to download '{}' from bucket '{}' (repository '{}')",
                    key, self.bucket_name, self.name
                ))
                .into(),
        }
    }

    async fn download_key(&self, key: &str, destination: &Path) -> Result<PathBuf> {
        ui::action(&format!(
            "Downloading '{}' from s3 bucket '{}'",
            key, self.bucket_name
        ));

        let bucket = self.bucket().await?;
        let size = match bucket.head_object(key).await {
            Ok((head, _)) => head.content_length.unwrap_or(0).max(0) as u64,
            Err(e) => return Err(self.transfer_error(key, e)),
        };

        let destination_path = destination.join(archive_name(key));
        let file = tokio::fs::File::create(&destination_path)
            .await
            .with_context(|| format!("Failed to create {}", destination_path.display()))?;

        let mut writer = ProgressWriter::new(file, size, Box::new(ui::download_progress));
        let status = match bucket.get_object_to_writer(key, &mut writer).await {
            Ok(status) => status,
            Err(e) => {
                drop(writer);
                if let Err(remove_err) = tokio::fs::remove_file(&destination_path).await {
                    debug!(
                        "Unable to remove partial download {}: {}",
                        destination_path.display(),
                        remove_err
                    );
                }
                return Err(self.transfer_error(key, e));
            }
        };
        writer
            .flush()
            .await
            .with_context(|| format!("Failed to write {}", destination_path.display()))?;
        writer.finish();
        ui::finish_progress();

        debug!("GET s3://{}/{} -> {}", self.bucket_name, key, status);
        info!("Downloaded {} to {}", key, destination_path.display());
        ui::success("Download completed successfully!!");

        Ok(destination_path)
    }
}

#[async_trait]
impl BinaryRepository for S3Repository {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &'static str {
        "s3"
    }

    fn supported_editions(&self) -> &[Edition] {
        &self.supported_editions
    }

    fn compute_download_location(
        &self,
        platform: &PlatformSpec,
        version: &VersionInfo,
    ) -> Result<String> {
        ensure_edition_supported(self, version.edition())?;
        render_location(&self.name, &self.url_template, platform, version)
    }

    async fn fetch(
        &self,
        platform: &PlatformSpec,
        version: &VersionInfo,
        destination: &Path,
    ) -> Result<PathBuf> {
        let key = self.compute_download_location(platform, version)?;
        self.download_key(&key, destination).await
    }
}

/// Writer that reports `(bytes_transferred, total_size)` roughly every
/// `total / 1000` bytes, and once more when finished.
pub struct ProgressWriter<W> {
    inner: W,
    transferred: u64,
    total: u64,
    interval: u64,
    next_report: u64,
    last_reported: Option<u64>,
    callback: ProgressCallback,
}

impl<W> ProgressWriter<W> {
    pub fn new(inner: W, total: u64, callback: ProgressCallback) -> Self {
        let interval = (total / PROGRESS_STEPS).max(1);
        Self {
            inner,
            transferred: 0,
            total,
            interval,
            next_report: interval,
            last_reported: None,
            callback,
        }
    }

    fn record(&mut self, written: u64) {
        self.transferred += written;
        if self.transferred >= self.next_report {
            self.report();
            while self.next_report <= self.transferred {
                self.next_report += self.interval;
            }
        }
    }

    fn report(&mut self) {
        (self.callback)(self.transferred, self.total);
        self.last_reported = Some(self.transferred);
    }

    /// Emit the final callback if the last write did not land on a step
    pub fn finish(&mut self) {
        if self.last_reported != Some(self.transferred) {
            self.report();
        }
    }
}

impl<W: AsyncWrite + Unpin> AsyncWrite for ProgressWriter<W> {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut TaskContext<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        let this = self.get_mut();
        let poll = Pin::new(&mut this.inner).poll_write(cx, buf);
        if let Poll::Ready(Ok(written)) = &poll {
            this.record(*written as u64);
        }
        poll
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut TaskContext<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().inner).poll_flush(cx)
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut TaskContext<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().inner).poll_shutdown(cx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::repository::template::tests::linux_platform;
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const ARCHIVE_PATH: &str = "/binaries/community/mongodb-linux-x86_64-3.0.0.tgz";

    fn local_repository(server: &MockServer) -> S3Repository {
        S3Repository::from_entry(
            "private",
            &entry(&format!(
                r#"{{"_type": "s3", "urlTemplate": "{{mongodb_edition}}/mongodb-{{platform_spec}}-{{mongodb_version}}.tgz", "supportedEditions": ["community"], "bucketName": "binaries", "accessKey": "a", "secretKey": "s", "endpoint": "{}"}}"#,
                server.uri()
            )),
        )
        .unwrap()
    }

    async fn fetch_3_0_0(repo: &S3Repository, destination: &Path) -> Result<PathBuf> {
        let version = VersionInfo::new("3.0.0", None).unwrap();
        repo.fetch(&linux_platform(), &version, destination).await
    }

    fn entry(json: &str) -> RepositoryEntry {
        let config = Config::from_json(&format!(
            r#"{{"customBinaryRepositories": {{"private": {}}}}}"#,
            json
        ))
        .unwrap();
        config
            .custom_binary_repositories()
            .unwrap()
            .remove(0)
            .1
    }

    fn recording_writer(total: u64) -> (ProgressWriter<Vec<u8>>, Arc<Mutex<Vec<(u64, u64)>>>) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&calls);
        let writer = ProgressWriter::new(
            Vec::new(),
            total,
            Box::new(move |done, total| sink.lock().unwrap().push((done, total))),
        );
        (writer, calls)
    }

    #[test]
    fn test_from_entry_requires_bucket_and_credentials() {
        let missing_secret = entry(
            r#"{"_type": "s3", "urlTemplate": "k", "supportedEditions": ["community"], "bucketName": "b", "accessKey": "a"}"#,
        );
        let err = S3Repository::from_entry("private", &missing_secret).unwrap_err();
        match err {
            FetchError::InvalidRepositoryConfig { name, reason } => {
                assert_eq!(name, "private");
                assert!(reason.contains("secretKey"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_location_is_rendered_key() {
        let repo = S3Repository::from_entry(
            "private",
            &entry(
                r#"{"_type": "s3", "urlTemplate": "{mongodb_edition}/{os_dist_name}{os_dist_version_no_dots}/mongodb-{platform_spec}-{mongodb_version}.tgz", "supportedEditions": ["enterprise"], "bucketName": "b", "accessKey": "a", "secretKey": "s"}"#,
            ),
        )
        .unwrap();
        assert_eq!(repo.bucket_name, "b");
        assert_eq!(repo.region, "us-east-1");

        let version = VersionInfo::new("3.0.1", Some(Edition::Enterprise)).unwrap();
        let key = repo
            .compute_download_location(&linux_platform(), &version)
            .unwrap();
        assert_eq!(key, "enterprise/ubuntu1404/mongodb-linux-x86_64-3.0.1.tgz");
        assert_eq!(archive_name(&key), "mongodb-linux-x86_64-3.0.1.tgz");

        let community = VersionInfo::new("3.0.1", None).unwrap();
        assert!(matches!(
            repo.compute_download_location(&linux_platform(), &community),
            Err(FetchError::UnsupportedEdition { .. })
        ));
    }

    #[tokio::test]
    async fn test_progress_reports_at_intervals() {
        let (mut writer, calls) = recording_writer(10_000);
        for _ in 0..10 {
            writer.write_all(&[0u8; 1000]).await.unwrap();
        }
        writer.finish();

        let calls = calls.lock().unwrap();
        assert_eq!(calls.len(), 10);
        assert_eq!(calls.first(), Some(&(1000, 10_000)));
        assert_eq!(calls.last(), Some(&(10_000, 10_000)));
        assert_eq!(writer.transferred, 10_000);
    }

    #[tokio::test]
    async fn test_progress_caps_callback_count() {
        let (mut writer, calls) = recording_writer(2_000_000);
        for _ in 0..2000 {
            writer.write_all(&[0u8; 1000]).await.unwrap();
        }
        writer.finish();

        let calls = calls.lock().unwrap();
        assert_eq!(calls.len(), 1000);
        assert_eq!(calls.last(), Some(&(2_000_000, 2_000_000)));
    }

    #[tokio::test]
    async fn test_small_object_still_reports_completion() {
        let (mut writer, calls) = recording_writer(0);
        writer.finish();
        assert_eq!(calls.lock().unwrap().as_slice(), &[(0, 0)]);

        let (mut writer, calls) = recording_writer(10);
        writer.write_all(b"0123456789").await.unwrap();
        writer.finish();
        assert_eq!(calls.lock().unwrap().last(), Some(&(10, 10)));
    }

    #[tokio::test]
    async fn test_fetch_missing_key_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path(ARCHIVE_PATH))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let temp_dir = TempDir::new().unwrap();
        let err = fetch_3_0_0(&local_repository(&server), temp_dir.path())
            .await
            .unwrap_err();

        assert!(err.is_not_found(), "unexpected error: {:?}", err);
        assert!(err.to_string().contains("bucket 'binaries'"));
    }

    #[tokio::test]
    async fn test_fetch_writes_object_under_key_basename() {
        let server = MockServer::start().await;
        let body: Vec<u8> = (0..5000u32).map(|i| (i % 251) as u8).collect();
        Mock::given(method("HEAD"))
            .and(path(ARCHIVE_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(body.clone()))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(ARCHIVE_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(body.clone()))
            .mount(&server)
            .await;

        let temp_dir = TempDir::new().unwrap();
        let repo = local_repository(&server);
        let written = fetch_3_0_0(&repo, temp_dir.path()).await.unwrap();

        assert_eq!(
            written,
            temp_dir.path().join("mongodb-linux-x86_64-3.0.0.tgz")
        );
        assert_eq!(std::fs::read(&written).unwrap(), body);

        // The bucket handle is reused by later fetches
        let first = repo.bucket().await.unwrap() as *const Bucket;
        let second = repo.bucket().await.unwrap() as *const Bucket;
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_fetch_server_error_is_fatal_and_cleans_up() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path(ARCHIVE_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0u8; 100]))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(ARCHIVE_PATH))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let temp_dir = TempDir::new().unwrap();
        let err = fetch_3_0_0(&local_repository(&server), temp_dir.path())
            .await
            .unwrap_err();

        assert!(!err.is_not_found(), "unexpected error: {:?}", err);
        assert!(
            !temp_dir
                .path()
                .join("mongodb-linux-x86_64-3.0.0.tgz")
                .exists()
        );
    }
}
