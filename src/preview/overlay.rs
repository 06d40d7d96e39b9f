use std::ops::Range;

use base64::Engine;
use regex::Regex;

use crate::sync::paths;
use crate::sync::webdav::RemoteStore;

use super::cache::{CachePolicy, ImageCache};

/// Markdown image whose URL points into the WebDAV endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteImage {
    /// Byte range of the whole `![alt](url)` in the source text
    pub range: Range<usize>,
    pub alt: String,
    pub url: String,
    /// Decoded path relative to the endpoint, starting with `/`
    pub remote_path: String,
}

/// Image ready to be shown in place of its markdown source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineImage {
    pub range: Range<usize>,
    pub alt: String,
    pub data_uri: String,
}

/// Endpoint without scheme or trailing slash, e.g. `dav.example.com/files`
fn strip_scheme(url: &str) -> &str {
    url.strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .unwrap_or(url)
        .trim_end_matches('/')
}

/// Path under the endpoint for `url`, accepting either http or https
fn remote_path_for(url: &str, base: &str) -> Option<String> {
    if !url.starts_with("https://") && !url.starts_with("http://") {
        return None;
    }
    let rest = strip_scheme(url).strip_prefix(base)?;
    if !rest.is_empty() && !rest.starts_with('/') {
        return None;
    }
    let decoded = urlencoding::decode(rest).ok()?;
    Some(paths::ensure_leading_slash(&decoded))
}

/// Find `![alt](url)` images served from `base_url`
pub fn find_remote_images(text: &str, base_url: &str) -> Vec<RemoteImage> {
    let base = strip_scheme(base_url);
    if base.is_empty() {
        return Vec::new();
    }
    let re = match Regex::new(r"!\[([^\]]*)\]\(([^)\s]+)\)") {
        Ok(re) => re,
        Err(_) => return Vec::new(),
    };

    re.captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let url = caps.get(2)?.as_str();
            let remote_path = remote_path_for(url, base)?;
            Some(RemoteImage {
                range: whole.range(),
                alt: caps.get(1).map(|m| m.as_str().to_string()).unwrap_or_default(),
                url: url.to_string(),
                remote_path,
            })
        })
        .collect()
}

fn mime_type(path: &str) -> &'static str {
    let ext = paths::file_name(path)
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "bmp" => "image/bmp",
        "avif" => "image/avif",
        _ => "application/octet-stream",
    }
}

fn overlaps(a: &Range<usize>, b: &Range<usize>) -> bool {
    a.start <= b.end && b.start <= a.end
}

/// Live-preview helper replacing remote image syntax with inline data.
///
/// The cache lives exactly as long as the overlay: created by [`attach`],
/// emptied by [`detach`].
///
/// [`attach`]: ImageOverlay::attach
/// [`detach`]: ImageOverlay::detach
pub struct ImageOverlay<S: RemoteStore> {
    store: S,
    base_url: String,
    cache: ImageCache,
}

impl<S: RemoteStore> ImageOverlay<S> {
    pub fn attach(store: S, base_url: impl Into<String>, policy: CachePolicy) -> Self {
        log::debug!("preview: overlay attached");
        Self {
            store,
            base_url: base_url.into(),
            cache: ImageCache::new(policy),
        }
    }

    pub fn cached(&self) -> usize {
        self.cache.len()
    }

    /// Images inside `visible` and not touching `selection`, fetched or cached.
    /// Images that fail to load are left as source text.
    pub async fn render(
        &mut self,
        text: &str,
        visible: &[Range<usize>],
        selection: Range<usize>,
    ) -> Vec<InlineImage> {
        let mut rendered = Vec::new();

        for image in find_remote_images(text, &self.base_url) {
            let in_view = visible
                .iter()
                .any(|v| v.start <= image.range.start && image.range.end <= v.end);
            if !in_view || overlaps(&image.range, &selection) {
                continue;
            }

            if let Some(data_uri) = self.cache.get(&image.url) {
                rendered.push(InlineImage {
                    range: image.range,
                    alt: image.alt,
                    data_uri,
                });
                continue;
            }

            match self.store.get(&image.remote_path).await {
                Ok(data) => {
                    let encoded = base64::engine::general_purpose::STANDARD.encode(&data);
                    let data_uri = format!("data:{};base64,{}", mime_type(&image.remote_path), encoded);
                    self.cache.insert(image.url.clone(), data_uri.clone());
                    rendered.push(InlineImage {
                        range: image.range,
                        alt: image.alt,
                        data_uri,
                    });
                }
                Err(e) => {
                    log::warn!("preview: failed to load {}: {}", image.url, e);
                }
            }
        }

        rendered
    }

    pub fn detach(mut self) -> S {
        self.cache.clear();
        log::debug!("preview: overlay detached");
        self.store
    }
}
