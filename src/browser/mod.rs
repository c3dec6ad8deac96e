use anyhow::{Context, Result};

use crate::store::StoreLocation;

/// Open a URL in the user's default browser
///
/// # Errors
/// Returns error if browser cannot be opened (e.g., no browser available)
pub fn open_url(url: &str) -> Result<()> {
    webbrowser::open(url).with_context(|| format!("Failed to open browser for URL: {}", url))?;
    Ok(())
}

/// Web page for the data file, where its commit history can be browsed.
pub fn data_file_url(location: &StoreLocation) -> String {
    format!(
        "https://github.com/{}/{}/blob/{}/{}",
        location.owner, location.repo, location.branch, location.path
    )
}
