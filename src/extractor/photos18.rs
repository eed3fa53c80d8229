use crate::error::{CrawlError, Result};
use crate::fetcher::HttpFetcher;
use crate::origin::Origin;
use super::trait_def::ExtractStrategy;
use regex::Regex;
use scraper::{Html, Selector};

/// photos18 的圖片只認自家 CDN 上的新世代點陣格式
const CDN_HOST: &str = "cdn.photos18.com";
const CDN_EXTENSIONS: &[&str] = &[".webp", ".avif"];

/// photos18 系列的擷取策略
///
/// 先走結構化解析：相簿頁的每張圖包在 card 容器裡，
/// 容器類名改版時退到「類名含 img」的啟發式搜尋；
/// 兩者都落空才對原始內容做正則掃描。
pub struct Photos18Strategy {
    card_selector: Selector,
    img_like_selector: Selector,
    image_selector: Selector,
    anchor_selector: Selector,
    raw_pattern: Regex,
}

impl Photos18Strategy {
    pub fn new() -> Result<Self> {
        Ok(Self {
            card_selector: parse_selector("div.card")?,
            img_like_selector: parse_selector(r#"[class*="img"]"#)?,
            image_selector: parse_selector("img")?,
            anchor_selector: parse_selector("a")?,
            raw_pattern: Regex::new(
                r#"(?i)https?://cdn\.photos18\.com/[^"'<>\s]+?\.(?:webp|avif)"#,
            )
            .map_err(|e| CrawlError::selector(e.to_string()))?,
        })
    }

    fn parse_containers(&self, html: &str) -> Vec<String> {
        let document = Html::parse_document(html);
        let mut urls = Vec::new();

        let mut containers: Vec<_> = document.select(&self.card_selector).collect();
        if containers.is_empty() {
            containers = document.select(&self.img_like_selector).collect();
        }

        for container in containers {
            for image in container.select(&self.image_selector) {
                for attr in ["src", "data-src"] {
                    if let Some(url) = image.value().attr(attr) {
                        if accepts(url) {
                            urls.push(url.to_string());
                        }
                    }
                }
            }
            for anchor in container.select(&self.anchor_selector) {
                if let Some(url) = anchor.value().attr("href") {
                    if accepts(url) {
                        urls.push(url.to_string());
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
            .collect()
    }
}

/// 只收 CDN 網域上、副檔名符合的連結
fn accepts(url: &str) -> bool {
    let lower = url.to_lowercase();
    lower.contains(CDN_HOST) && CDN_EXTENSIONS.iter().any(|ext| lower.contains(ext))
}

fn parse_selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| CrawlError::selector(format!("{:?}", e)))
}

#[async_trait::async_trait]
impl ExtractStrategy for Photos18Strategy {
    fn name(&self) -> &str {
        "photos18 容器解析"
    }

    fn origin(&self) -> Origin {
        Origin::Photos18Like
    }

    async fn extract(
        &self,
        html: &str,
        _target_url: &str,
        _fetcher: &HttpFetcher,
    ) -> Result<Vec<String>> {
        let urls = self.parse_containers(html);
        if !urls.is_empty() {
            return Ok(urls);
        }

        Ok(self.scan_raw(html))
    }
}
