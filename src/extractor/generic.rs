use crate::error::{CrawlError, Result};
use crate::filename::IMAGE_EXTENSIONS;
use regex::Regex;
use scraper::{Html, Selector};

/// 明顯不是內容圖片的特徵：圖示、標誌、頭像、縮圖、雪碧圖
const NON_CONTENT_MARKERS: &[&str] = &["icon", "logo", "avatar", "thumb", "sprite"];

/// 通用擷取（同時也是各來源策略落空後的兜底）
///
/// 第一輪走結構化解析：所有 img 元素的 src 與 lazy-load 屬性，
/// 相對路徑正規化回目標網站；一無所獲才用寬鬆的 URL 正則
/// 掃一次原始內容。兩輪都套同一份非內容特徵過濾。
pub struct GenericExtractor {
    image_selector: Selector,
    raw_pattern: Regex,
}

impl GenericExtractor {
    pub fn new() -> Result<Self> {
        Ok(Self {
            image_selector: Selector::parse("img")
                .map_err(|e| CrawlError::selector(format!("{:?}", e)))?,
            raw_pattern: Regex::new(r#"(?i)https?://[^"'<>\s]+?\.(?:jpg|jpeg|png|gif|webp|bmp)"#)
                .map_err(|e| CrawlError::selector(e.to_string()))?,
        })
    }

    pub fn extract(&self, html: &str, target_url: &str) -> Vec<String> {
        let mut urls = self.parse_image_elements(html, target_url);

        if urls.is_empty() {
            urls = self.scan_raw(html);
        }

        urls
    }

    fn parse_image_elements(&self, html: &str, target_url: &str) -> Vec<String> {
        let document = Html::parse_document(html);
        let mut urls = Vec::new();

        for image in document.select(&self.image_selector) {
            for attr in ["src", "data-src", "data-original"] {
                if let Some(raw) = image.value().attr(attr) {
                    if raw.trim().is_empty() {
                        continue;
                    }
                    let url = normalize_url(raw, target_url);
                    if is_content_image(&url) {
                        urls.push(url);
                    }
                }
            }
        }

        urls
    }

    fn scan_raw(&self, html: &str) -> Vec<String> {
        self.raw_pattern
            .find_iter(html)
            .map(|m| m.as_str().to_string())
            .filter(|url| is_content_image(url))
            .collect()
    }
}

/// 帶有允許的圖片副檔名、且不含非內容特徵
fn is_content_image(url: &str) -> bool {
    let lower = url.to_lowercase();

    let has_extension = IMAGE_EXTENSIONS
        .iter()
        .any(|ext| lower.ends_with(ext) || lower.contains(ext));
    if !has_extension {
        return false;
    }

    !NON_CONTENT_MARKERS.iter().any(|marker| lower.contains(marker))
}

/// 正規化 URL（處理協定相對與根相對路徑）
fn normalize_url(url: &str, target_url: &str) -> String {
    if url.starts_with("http://") || url.starts_with("https://") {
        url.to_string()
    } else if url.starts_with("//") {
        format!("https:{}", url)
    } else if url.starts_with('/') {
        format!("{}{}", site_root(target_url), url)
    } else {
        format!("{}/{}", site_root(target_url), url)
    }
}

/// 目標 URL 的網站根（scheme + host）
fn site_root(url: &str) -> String {
    match url.split_once("://") {
        Some((scheme, rest)) => {
            let host = rest.split(['/', '?', '#']).next().unwrap_or(rest);
            format!("{}://{}", scheme, host)
        }
        None => url.trim_end_matches('/').to_string(),
    }
}
