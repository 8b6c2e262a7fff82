//! Session storage for persisting login state.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use wudder::{EndpointUrl, TokenPair};

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

/// On-disk session format.
#[derive(Serialize, Deserialize)]
struct StoredSession {
    endpoint: String,
    access_token: String,
    refresh_token: String,
}

/// A session read back from disk.
pub struct LoadedSession {
    pub endpoint: EndpointUrl,
    pub tokens: TokenPair,
}

/// Get the session file path.
fn session_path() -> Result<PathBuf> {
    let dirs =
        ProjectDirs::from("", "", "wudder").context("Could not determine data directory")?;

    let data_dir = dirs.data_dir();
    fs::create_dir_all(data_dir).context("Failed to create data directory")?;

    Ok(data_dir.join("session.json"))
}

/// Save a session to disk.
pub fn save_session(endpoint: &EndpointUrl, tokens: &TokenPair) -> Result<()> {
    let stored = StoredSession {
        endpoint: endpoint.to_string(),
        access_token: tokens.access.as_str().to_string(),
        refresh_token: tokens.refresh.as_str().to_string(),
    };

    let path = session_path()?;
    let json = serde_json::to_string_pretty(&stored)?;

    fs::write(&path, &json).context("Failed to write session file")?;

    // Tokens are bearer credentials
    #[cfg(unix)]
    {
        let mut perms = fs::metadata(&path)?.permissions();
        perms.set_mode(0o600);
        fs::set_permissions(&path, perms)?;
    }

    tracing::debug!(path = %path.display(), "session saved");
    Ok(())
}

/// Load a session from disk.
pub fn load_session() -> Result<Option<LoadedSession>> {
    let path = session_path()?;

    if !path.exists() {
        return Ok(None);
    }

    let json = fs::read_to_string(&path).context("Failed to read session file")?;
    let stored: StoredSession = serde_json::from_str(&json).context("Invalid session file")?;

    let endpoint = EndpointUrl::new(&stored.endpoint).context("Invalid endpoint in session")?;
    Ok(Some(LoadedSession {
        endpoint,
        tokens: TokenPair::new(stored.access_token, stored.refresh_token),
    }))
}
