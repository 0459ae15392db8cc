use serde::Deserialize;
use std::collections::{HashSet, VecDeque};
use std::io::Read;
use std::time::Duration;
use tracing::{debug, info, trace};

use super::AssetProvider;
use crate::error::ListingError;
use crate::model::AssetRecord;

const FILES_URL: &str = "https://www.googleapis.com/drive/v3/files";
const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";
const LIST_FIELDS: &str =
    "nextPageToken,files(id,name,mimeType,createdTime,modifiedTime,webViewLink)";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
const MAX_DOWNLOAD_BYTES: u64 = 64 * 1024 * 1024;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileList {
    next_page_token: Option<String>,
    #[serde(default)]
    files: Vec<DriveFile>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DriveFile {
    id: String,
    name: String,
    #[serde(default)]
    mime_type: String,
    #[serde(default)]
    created_time: String,
    #[serde(default)]
    modified_time: String,
    web_view_link: Option<String>,
}

/// Google Drive v3 listing, authenticated with an API key. Folders are
/// walked breadth-first; `path` records the folder names from the root.
pub struct DriveProvider {
    agent: ureq::Agent,
    api_key: String,
    root_id: String,
    page_size: u32,
}

impl DriveProvider {
    pub fn new(api_key: impl Into<String>, root_id: impl Into<String>, page_size: u32) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(REQUEST_TIMEOUT).build();
        Self {
            agent,
            api_key: api_key.into(),
            root_id: root_id.into(),
            page_size,
        }
    }

    fn list_folder(&self, folder_id: &str) -> Result<Vec<DriveFile>, ListingError> {
        let query = format!("'{folder_id}' in parents and trashed=false");
        let page_size = self.page_size.to_string();

        collect_pages(|page_token| {
            let mut request = self
                .agent
                .get(FILES_URL)
                .query("q", &query)
                .query("fields", LIST_FIELDS)
                .query("orderBy", "folder,name")
                .query("pageSize", &page_size)
                .query("key", &self.api_key);
            if let Some(token) = page_token {
                request = request.query("pageToken", token);
            }

            let page: FileList = request
                .call()
                .map_err(listing_error)?
                .into_json()
                .map_err(|e| ListingError::invalid_response(e.to_string()))?;
            trace!(folder = folder_id, count = page.files.len(), "listed page");
            Ok(page)
        })
    }
}

/// Follows `nextPageToken` until the listing is exhausted. `fetch_page`
/// receives the token of the page to request, `None` for the first.
fn collect_pages<F>(mut fetch_page: F) -> Result<Vec<DriveFile>, ListingError>
where
    F: FnMut(Option<&str>) -> Result<FileList, ListingError>,
{
    let mut files = Vec::new();
    let mut page_token: Option<String> = None;

    loop {
        let page = fetch_page(page_token.as_deref())?;
        files.extend(page.files);

        match page.next_page_token {
            Some(token) if !token.is_empty() => page_token = Some(token),
            _ => break,
        }
    }

    Ok(files)
}

/// Reads at most `limit` bytes; a longer body is an error rather than a
/// truncated image.
fn read_capped<R: Read>(reader: R, limit: u64, asset_id: &str) -> Result<Vec<u8>, ListingError> {
    let mut bytes = Vec::new();
    reader.take(limit + 1).read_to_end(&mut bytes)?;
    if bytes.len() as u64 > limit {
        return Err(ListingError::download_too_large(asset_id, limit));
    }
    Ok(bytes)
}

impl AssetProvider for DriveProvider {
    fn list(&self) -> Result<Vec<AssetRecord>, ListingError> {
        info!(folder = %self.root_id, "querying Google Drive");

        let mut assets = Vec::new();
        let mut seen = HashSet::new();
        let mut queue = VecDeque::from([(self.root_id.clone(), String::new())]);

        while let Some((folder_id, path)) = queue.pop_front() {
            if !seen.insert(folder_id.clone()) {
                continue;
            }
            for file in self.list_folder(&folder_id)? {
                if file.mime_type == FOLDER_MIME_TYPE {
                    queue.push_back((file.id, join_path(&path, &file.name)));
                } else if let Some(asset) = into_asset(file, &path) {
                    assets.push(asset);
                }
            }
        }

        info!(count = assets.len(), folders = seen.len(), "found image files");
        Ok(assets)
    }

    fn fetch(&self, asset: &AssetRecord) -> Result<Vec<u8>, ListingError> {
        let url = format!("{FILES_URL}/{}", asset.id);
        debug!(id = %asset.id, "downloading image");

        let response = self
            .agent
            .get(&url)
            .query("alt", "media")
            .query("key", &self.api_key)
            .call()
            .map_err(listing_error)?;

        read_capped(response.into_reader(), MAX_DOWNLOAD_BYTES, &asset.id)
    }

    fn name(&self) -> &'static str {
        "google-drive"
    }
}

fn listing_error(error: ureq::Error) -> ListingError {
    match error {
        ureq::Error::Status(status, response) => {
            ListingError::status(strip_query(response.get_url()), status)
        }
        ureq::Error::Transport(transport) => ListingError::transport(
            transport.url().map(|u| strip_query(u.as_str())).unwrap_or_default(),
            transport.to_string(),
        ),
    }
}

/// Keeps the API key out of error messages.
fn strip_query(url: &str) -> String {
    url.split('?').next().unwrap_or(url).to_string()
}

fn join_path(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{parent}/{name}")
    }
}

fn into_asset(file: DriveFile, path: &str) -> Option<AssetRecord> {
    let asset = AssetRecord {
        src: format!("https://lh3.googleusercontent.com/d/{}=w800", file.id),
        id: file.id,
        name: file.name,
        mime_type: file.mime_type,
        created_time: file.created_time,
        modified_time: file.modified_time,
        path: path.to_string(),
        view: file.web_view_link,
    };
    asset.is_image().then_some(asset)
}
