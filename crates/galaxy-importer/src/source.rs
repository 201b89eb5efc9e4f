//! Import source resolution and download

use crate::output;
use anyhow::{anyhow, Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use futures_util::StreamExt;
use std::fs::{self, File};
use std::io::Write;
use url::Url;

/// File name used when a URL does not end in an archive name
const DEFAULT_ARCHIVE_NAME: &str = "collection.tar.gz";

/// Where a collection comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportSource {
    /// Collection archive on disk
    Archive(Utf8PathBuf),
    /// Already extracted collection
    Directory(Utf8PathBuf),
    /// Archive served over http(s)
    Url(Url),
}

impl ImportSource {
    pub fn parse(source: &str) -> Result<Self> {
        if source.starts_with("http://") || source.starts_with("https://") {
            let url = Url::parse(source).with_context(|| format!("Invalid URL: {}", source))?;
            return Ok(Self::Url(url));
        }

        let path = Utf8PathBuf::from(source);
        if path.is_dir() {
            Ok(Self::Directory(path))
        } else if path.is_file() {
            Ok(Self::Archive(path))
        } else {
            Err(anyhow!("Source not found: {}", source))
        }
    }
}

/// Archive file name a URL points at, if its last segment looks like one
pub fn archive_name(url: &Url) -> Option<String> {
    url.path_segments()?
        .next_back()
        .filter(|name| name.ends_with(".tar.gz"))
        .map(str::to_string)
}

/// Download `url` into `dest_dir` and return the archive path
///
/// The body is streamed to disk; the download is aborted and the partial
/// file removed once it exceeds `max_bytes`.
pub async fn download(url: &Url, dest_dir: &Utf8Path, max_bytes: u64) -> Result<Utf8PathBuf> {
    let name = archive_name(url).unwrap_or_else(|| DEFAULT_ARCHIVE_NAME.to_string());
    let dest = dest_dir.join(&name);

    let pb = output::spinner(&format!("Downloading {}", url));
    tracing::info!("Downloading {}", url);

    let client = reqwest::Client::new();
    let response = client.get(url.clone()).send().await?;
    if !response.status().is_success() {
        pb.finish_and_clear();
        return Err(anyhow!("Failed to download {}: {}", url, response.status()));
    }
    if let Some(length) = response.content_length().filter(|&len| len > max_bytes) {
        pb.finish_and_clear();
        return Err(anyhow!(
            "Archive at {} is {} bytes, larger than the {} byte limit",
            url,
            length,
            max_bytes
        ));
    }

    let downloaded = match stream_to_file(response, &dest, max_bytes).await {
        Ok(downloaded) => downloaded,
        Err(e) => {
            pb.finish_and_clear();
            let _ = fs::remove_file(&dest);
            return Err(e.context(format!("Failed to download {}", url)));
        }
    };
    pb.finish_with_message(format!("Downloaded {} ({} bytes)", name, downloaded));

    Ok(dest)
}

async fn stream_to_file(response: reqwest::Response, dest: &Utf8Path, max_bytes: u64) -> Result<u64> {
    let mut file = File::create(dest).with_context(|| format!("Failed to create {}", dest))?;
    let mut downloaded: u64 = 0;
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.context("Failed to read download chunk")?;
        downloaded += chunk.len() as u64;
        if downloaded > max_bytes {
            return Err(anyhow!("Archive exceeds the {} byte download limit", max_bytes));
        }
        file.write_all(&chunk)
            .with_context(|| format!("Failed to write {}", dest))?;
    }

    Ok(downloaded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_url() {
        let source = ImportSource::parse("https://example.com/ns-name-1.0.0.tar.gz").unwrap();
        assert!(matches!(source, ImportSource::Url(_)));
    }

    #[test]
    fn test_parse_paths() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().to_str().unwrap();
        assert!(matches!(
            ImportSource::parse(dir).unwrap(),
            ImportSource::Directory(_)
        ));

        let archive = temp.path().join("ns-name-1.0.0.tar.gz");
        fs::write(&archive, b"").unwrap();
        assert!(matches!(
            ImportSource::parse(archive.to_str().unwrap()).unwrap(),
            ImportSource::Archive(_)
        ));
    }

    #[test]
    fn test_parse_missing() {
        let err = ImportSource::parse("/nonexistent/collection.tar.gz").unwrap_err();
        assert!(err.to_string().contains("Source not found"));
    }

    #[test]
    fn test_archive_name() {
        let url = Url::parse("https://example.com/download/ns-name-1.0.0.tar.gz?x=1").unwrap();
        assert_eq!(archive_name(&url).as_deref(), Some("ns-name-1.0.0.tar.gz"));

        let url = Url::parse("https://example.com/api/artifact").unwrap();
        assert_eq!(archive_name(&url), None);
    }

    async fn serve_once(body: Vec<u8>, with_length: bool) -> Url {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = [0u8; 4096];
            let _ = socket.read(&mut request).await;
            let mut head = String::from("HTTP/1.1 200 OK\r\nConnection: close\r\n");
            if with_length {
                head.push_str(&format!("Content-Length: {}\r\n", body.len()));
            }
            head.push_str("\r\n");
            let _ = socket.write_all(head.as_bytes()).await;
            let _ = socket.write_all(&body).await;
            let _ = socket.shutdown().await;
        });
        Url::parse(&format!("http://{}/ns-name-1.0.0.tar.gz", addr)).unwrap()
    }

    fn utf8_dir(temp: &TempDir) -> &Utf8Path {
        Utf8Path::from_path(temp.path()).unwrap()
    }

    #[tokio::test]
    async fn test_download_within_limit() {
        let temp = TempDir::new().unwrap();
        let url = serve_once(vec![7u8; 64], true).await;

        let path = download(&url, utf8_dir(&temp), 1024).await.unwrap();
        assert_eq!(path.file_name(), Some("ns-name-1.0.0.tar.gz"));
        assert_eq!(fs::read(&path).unwrap(), vec![7u8; 64]);
    }

    #[tokio::test]
    async fn test_download_declared_length_over_limit() {
        let temp = TempDir::new().unwrap();
        let url = serve_once(vec![0u8; 4096], true).await;

        let err = download(&url, utf8_dir(&temp), 1024).await.unwrap_err();
        assert!(err.to_string().contains("larger than the 1024 byte limit"));
        assert!(!temp.path().join("ns-name-1.0.0.tar.gz").exists());
    }

    #[tokio::test]
    async fn test_download_streamed_body_over_limit() {
        let temp = TempDir::new().unwrap();
        let url = serve_once(vec![0u8; 8192], false).await;

        let err = download(&url, utf8_dir(&temp), 1024).await.unwrap_err();
        assert!(format!("{:#}", err).contains("1024 byte download limit"));
        assert!(!temp.path().join("ns-name-1.0.0.tar.gz").exists());
    }
}
