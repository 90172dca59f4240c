//! Fetching and parsing the GeoJSON document of a zoning plan.

use geojson::FeatureCollection;
use log::debug;
use std::path::PathBuf;
use thiserror::Error;

use crate::CLIENT;

/// Errors that can occur while loading a GeoJSON document.
#[derive(Error, Debug)]
pub enum LoadError {
    /// No location was given.
    #[error("No GeoJSON location given")]
    EmptyLocation,

    /// The request could not be made or its body could not be read.
    #[error("Request to `{url}` failed")]
    Request {
        /// The requested URL.
        url: String,
        /// The underlying error.
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-success status.
    #[error("Request to `{url}` failed. HTTP Status: `{status}`")]
    Status {
        /// The requested URL.
        url: String,
        /// The status the server answered with.
        status: reqwest::StatusCode,
    },

    /// The local file could not be read.
    #[error("Unable to read `{}`", path.display())]
    Io {
        /// The path that was read.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The document is not a GeoJSON feature collection.
    #[error("Unable to parse the document as a GeoJSON feature collection")]
    Parse(#[from] serde_json::Error),
}

/// Parses a GeoJSON `FeatureCollection` from raw bytes.
pub fn parse_feature_collection(bytes: &[u8]) -> Result<FeatureCollection, LoadError> {
    Ok(serde_json::from_slice(bytes)?)
}

fn is_remote(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}

/// Loads the feature collection at `location`.
///
/// `location` is either an `http://`/`https://` URL, fetched with a single GET request, or a
/// path to a local file. The whole document must parse; there is no retry.
pub fn fetch_feature_collection(location: &str) -> Result<FeatureCollection, LoadError> {
    let location = location.trim();
    if location.is_empty() {
        return Err(LoadError::EmptyLocation);
    }

    let bytes = if is_remote(location) {
        debug!("Downloading GeoJSON from {}", location);
        let request_error = |source: reqwest::Error| LoadError::Request {
            url: location.to_string(),
            source,
        };

        let response = CLIENT.get(location).send().map_err(request_error)?;
        if !response.status().is_success() {
            return Err(LoadError::Status {
                url: location.to_string(),
                status: response.status(),
            });
        }
        response.bytes().map_err(request_error)?.to_vec()
    } else {
        debug!("Reading GeoJSON from {}", location);
        std::fs::read(location).map_err(|source| LoadError::Io {
            path: PathBuf::from(location),
            source,
        })?
    };

    parse_feature_collection(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;
    use std::io::{Read, Write};
    use std::net::TcpListener;

    /// Serves one canned HTTP response on a local port and returns its URL.
    fn serve_once(status_line: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut request = [0u8; 4096];
            let _ = stream.read(&mut request);
            let response = format!(
                "HTTP/1.1 {status_line}\r\nContent-Type: application/geo+json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(response.as_bytes()).unwrap();
        });
        format!("http://{addr}/output/75056.geojson")
    }

    fn temp_file(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "{}-{}-{}",
            env!("CARGO_PKG_NAME"),
            std::process::id(),
            name
        ));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn parse_valid_collection() {
        let collection = parse_feature_collection(
            br#"{
                "type": "FeatureCollection",
                "features": [
                    {
                        "type": "Feature",
                        "geometry": { "type": "Point", "coordinates": [2.3, 46.8] },
                        "properties": { "TYPEZONE": "A" }
                    }
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(collection.features.len(), 1);
    }

    #[test]
    fn parse_empty_collection() {
        let collection =
            parse_feature_collection(br#"{ "type": "FeatureCollection", "features": [] }"#)
                .unwrap();
        assert!(collection.features.is_empty());
    }

    #[test]
    fn parse_malformed_json() {
        let err = parse_feature_collection(b"{ \"type\": \"FeatureCollection\", ").unwrap_err();
        assert!(matches!(err, LoadError::Parse(_)));
        assert!(err.source().is_some());
    }

    #[test]
    fn parse_other_geojson_is_rejected() {
        let err = parse_feature_collection(
            br#"{ "type": "Point", "coordinates": [2.3, 46.8] }"#,
        )
        .unwrap_err();
        assert!(matches!(err, LoadError::Parse(_)));
    }

    #[test]
    fn empty_location_is_rejected() {
        assert!(matches!(
            fetch_feature_collection(""),
            Err(LoadError::EmptyLocation)
        ));
        assert!(matches!(
            fetch_feature_collection("   "),
            Err(LoadError::EmptyLocation)
        ));
    }

    #[test]
    fn fetch_local_file() {
        let path = temp_file(
            "zones.geojson",
            r#"{ "type": "FeatureCollection", "features": [] }"#,
        );
        let collection = fetch_feature_collection(path.to_str().unwrap()).unwrap();
        assert!(collection.features.is_empty());
        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn fetch_local_malformed_file() {
        let path = temp_file("broken.geojson", "not json");
        let err = fetch_feature_collection(path.to_str().unwrap()).unwrap_err();
        assert!(matches!(err, LoadError::Parse(_)));
        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn fetch_bundled_demo_data() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/demos/data/zoning.geojson");
        let collection = fetch_feature_collection(path).unwrap();
        assert_eq!(collection.features.len(), 5);
    }

    #[test]
    fn fetch_missing_file() {
        let err = fetch_feature_collection("/nonexistent/zones.geojson").unwrap_err();
        match err {
            LoadError::Io { path, .. } => {
                assert_eq!(path, PathBuf::from("/nonexistent/zones.geojson"))
            }
            other => panic!("Expected an I/O error, got {other:?}"),
        }
    }

    #[test]
    fn fetch_remote_collection() {
        let url = serve_once(
            "200 OK",
            r#"{ "type": "FeatureCollection", "features": [] }"#,
        );
        let collection = fetch_feature_collection(&url).unwrap();
        assert!(collection.features.is_empty());
    }

    #[test]
    fn fetch_remote_not_found() {
        let url = serve_once("404 Not Found", "not found");
        match fetch_feature_collection(&url).unwrap_err() {
            LoadError::Status { url: failed, status } => {
                assert_eq!(failed, url);
                assert_eq!(status, reqwest::StatusCode::NOT_FOUND);
            }
            other => panic!("Expected a status error, got {other:?}"),
        }
    }

    #[test]
    fn fetch_remote_malformed_body() {
        let url = serve_once("200 OK", "{ \"type\": \"FeatureCollection\", ");
        let err = fetch_feature_collection(&url).unwrap_err();
        assert!(matches!(err, LoadError::Parse(_)));
    }

    #[test]
    fn fetch_remote_unreachable() {
        let addr = TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap();
        let url = format!("http://{addr}/output/75056.geojson");
        let err = fetch_feature_collection(&url).unwrap_err();
        assert!(matches!(err, LoadError::Request { .. }));
        assert!(err.source().is_some());
    }

    #[test]
    fn remote_locations() {
        assert!(is_remote("https://example.org/output/75056.geojson"));
        assert!(is_remote("http://localhost:8000/output/75056.geojson"));
        assert!(!is_remote("output/75056.geojson"));
        assert!(!is_remote("/output/75056.geojson"));
    }
}
