use crate::error::{CrawlError, Result};
use crate::fetcher::HttpFetcher;
use crate::origin::Origin;
use super::trait_def::ExtractStrategy;
use regex::Regex;
use scraper::{Html, Selector};

/// foamgirl 的圖床位在 image.acg.lol，檔名固定是相機編號風格
const CDN_HOST: &str = "image.acg.lol";
const CDN_EXTENSIONS: &[&str] = &[".jpg", ".jpeg", ".png"];

/// foamgirl 系列的擷取策略
///
/// 內文圖片包在 entry-content 容器內；容器找不到時
/// 退到「類名含 img」啟發式，再不行就正則掃原始內容。
pub struct FoamgirlStrategy {
    content_selector: Selector,
    img_like_selector: Selector,
    image_selector: Selector,
    raw_pattern: Regex,
}

impl FoamgirlStrategy {
    pub fn new() -> Result<Self> {
        Ok(Self {
            content_selector: parse_selector("div.entry-content")?,
            img_like_selector: parse_selector(r#"[class*="img"]"#)?,
            image_selector: parse_selector("img")?,
            raw_pattern: Regex::new(r#"(?i)https?://image\.acg\.lol/[^"'<>\s]+?\.(?:jpg|jpeg|png)"#)
                .map_err(|e| CrawlError::selector(e.to_string()))?,
        })
    }

    fn parse_containers(&self, html: &str) -> Vec<String> {
        let document = Html::parse_document(html);
        let mut urls = Vec::new();

        let mut containers: Vec<_> = document.select(&self.content_selector).collect();
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

fn accepts(url: &str) -> bool {
    let lower = url.to_lowercase();
    lower.contains(CDN_HOST) && CDN_EXTENSIONS.iter().any(|ext| lower.contains(ext))
}

fn parse_selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| CrawlError::selector(format!("{:?}", e)))
}

#[async_trait::async_trait]
impl ExtractStrategy for FoamgirlStrategy {
    fn name(&self) -> &str {
        "foamgirl 容器解析"
    }

    fn origin(&self) -> Origin {
        Origin::FoamgirlLike
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_from_entry_content() {
        let html = r#"
        <article>
            <div class="entry-content">
                <img src="https://image.acg.lol/file/2024/03/01/DSC06685.jpg">
                <img data-src="https://image.acg.lol/file/2024/03/01/DSC06686.jpg">
            </div>
            <div class="related">
                <img src="https://image.acg.lol/file/2024/03/02/DSC09999.jpg">
            </div>
        </article>
        "#;

        let strategy = FoamgirlStrategy::new().unwrap();
        assert_eq!(
            strategy.parse_containers(html),
            vec![
                "https://image.acg.lol/file/2024/03/01/DSC06685.jpg".to_string(),
                "https://image.acg.lol/file/2024/03/01/DSC06686.jpg".to_string(),
            ]
        );
    }

    #[test]
    fn test_rejects_other_hosts() {
        let html = r#"
        <div class="entry-content">
            <img src="https://cdn.elsewhere.net/DSC06685.jpg">
        </div>
        "#;

        let strategy = FoamgirlStrategy::new().unwrap();
        assert!(strategy.parse_containers(html).is_empty());
    }

    #[test]
    fn test_raw_scan_matches_cdn_pattern() {
        let body = r#"<script>var imgs = 'https://image.acg.lol/file/2024/03/01/DSC06687.jpg';</script>"#;

        let strategy = FoamgirlStrategy::new().unwrap();
        assert_eq!(
            strategy.scan_raw(body),
            vec!["https://image.acg.lol/file/2024/03/01/DSC06687.jpg".to_string()]
        );
    }
}
