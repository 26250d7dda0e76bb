//! Cookie jar that outlives the process.
//!
//! Wraps `reqwest`'s in-memory [`Jar`] and mirrors every `Set-Cookie` the
//! server sends into a JSON file next to the session snapshot, replaying
//! them on open. Cookie values are stored and replayed, never read.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use reqwest::Url;
use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::HeaderValue;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::ClientError;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SavedCookie {
    url: String,
    set_cookie: String,
}

/// [`CookieStore`] backed by a [`Jar`] and, optionally, a file.
#[derive(Debug, Default)]
pub struct CookieFile {
    jar: Jar,
    path: Option<PathBuf>,
    saved: Mutex<BTreeMap<String, SavedCookie>>,
}

impl CookieFile {
    /// A jar that is forgotten when the process exits.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Open a file-backed jar, replaying any cookies saved by an earlier run.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, ClientError> {
        let path = path.into();
        let jar = Jar::default();
        let mut saved = BTreeMap::new();

        if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            let cookies: Vec<SavedCookie> = serde_json::from_str(&contents)?;
            for cookie in cookies {
                let Ok(url) = Url::parse(&cookie.url) else {
                    warn!(url = %cookie.url, "Skipping saved cookie with bad URL");
                    continue;
                };
                jar.add_cookie_str(&cookie.set_cookie, &url);
                if let Some(key) = cookie_key(&url, &cookie.set_cookie) {
                    saved.insert(key, cookie);
                }
            }
            debug!(path = %path.display(), count = saved.len(), "Loaded cookies");
        }

        Ok(Self {
            jar,
            path: Some(path),
            saved: Mutex::new(saved),
        })
    }

    /// Backing file, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn record(&self, url: &Url, set_cookies: &[String]) -> Result<(), ClientError> {
        let Some(path) = self.path.as_deref() else {
            return Ok(());
        };
        let live = self
            .jar
            .cookies(url)
            .and_then(|value| value.to_str().map(str::to_string).ok())
            .unwrap_or_default();

        let mut saved = self.saved.lock().unwrap_or_else(PoisonError::into_inner);
        for raw in set_cookies {
            let Some(key) = cookie_key(url, raw) else {
                continue;
            };
            // A cookie the jar no longer sends was removed or has expired.
            if is_sent(&live, cookie_name(raw).unwrap_or_default()) {
                saved.insert(
                    key,
                    SavedCookie {
                        url: url.to_string(),
                        set_cookie: raw.clone(),
                    },
                );
            } else {
                saved.remove(&key);
            }
        }

        if saved.is_empty() {
            if path.exists() {
                std::fs::remove_file(path)?;
            }
            return Ok(());
        }
        let contents = serde_json::to_string_pretty(&saved.values().collect::<Vec<_>>())?;
        write_private(path, &contents)?;
        Ok(())
    }
}

impl CookieStore for CookieFile {
    fn set_cookies(&self, cookie_headers: &mut dyn Iterator<Item = &HeaderValue>, url: &Url) {
        let headers: Vec<HeaderValue> = cookie_headers.cloned().collect();
        self.jar.set_cookies(&mut headers.iter(), url);

        let raw: Vec<String> = headers
            .iter()
            .filter_map(|h| h.to_str().ok().map(str::to_string))
            .collect();
        if let Err(e) = self.record(url, &raw) {
            warn!(error = %e, "Failed to save cookies");
        }
    }

    fn cookies(&self, url: &Url) -> Option<HeaderValue> {
        self.jar.cookies(url)
    }
}

fn cookie_name(set_cookie: &str) -> Option<&str> {
    let pair = set_cookie.split(';').next()?;
    let (name, _) = pair.split_once('=')?;
    let name = name.trim();
    (!name.is_empty()).then_some(name)
}

fn cookie_key(url: &Url, set_cookie: &str) -> Option<String> {
    let name = cookie_name(set_cookie)?;
    Some(format!("{} {}", url.origin().ascii_serialization(), name))
}

fn is_sent(cookie_header: &str, name: &str) -> bool {
    cookie_header
        .split(';')
        .filter_map(|pair| pair.split_once('='))
        .any(|(n, _)| n.trim() == name)
}

/// Write `contents` readable by the owner only.
fn write_private(path: &Path, contents: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut options = std::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options.open(path)?;
    file.write_all(contents.as_bytes())
}
