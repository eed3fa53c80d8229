use crate::error::{CrawlError, Result};
use crate::fetcher::{Fetcher, HttpFetcher};
use crate::headers::Purpose;
use crate::origin::Origin;
use super::trait_def::ExtractStrategy;
use regex::Regex;
use serde::Deserialize;

const DEFAULT_API_BASE: &str = "https://www.pixiv.net";

/// pixiv 系列的擷取策略
///
/// 不解析作品頁 HTML，直接呼叫站內 metadata API 拿原圖位址。
/// 從 URL 認得兩種路徑文法：新版 `artworks/{id}` 與
/// 舊版 `illust_id={id}` 查詢參數。API 失敗或拿不到任何 URL 時
/// 回傳空清單，由調度器退回通用解析。
pub struct PixivStrategy {
    api_base: String,
    artworks_re: Regex,
    legacy_re: Regex,
}

/// `/ajax/illust/{id}/pages` 的回應格式
#[derive(Debug, Deserialize)]
struct PagesResponse {
    #[serde(default)]
    error: bool,
    #[serde(default)]
    body: Option<Vec<PageEntry>>,
}

#[derive(Debug, Deserialize)]
struct PageEntry {
    #[serde(default)]
    urls: PageUrls,
}

#[derive(Debug, Default, Deserialize)]
struct PageUrls {
    original: Option<String>,
    regular: Option<String>,
}

impl PixivStrategy {
    pub fn new() -> Result<Self> {
        Self::with_api_base(DEFAULT_API_BASE)
    }

    /// 指定 API 位址（測試時指向本機 mock 伺服器）
    pub fn with_api_base(api_base: &str) -> Result<Self> {
        Ok(Self {
            api_base: api_base.trim_end_matches('/').to_string(),
            artworks_re: Regex::new(r"artworks/(\d+)")
                .map_err(|e| CrawlError::selector(e.to_string()))?,
            legacy_re: Regex::new(r"illust_id=(\d+)")
                .map_err(|e| CrawlError::selector(e.to_string()))?,
        })
    }

    /// 從目標 URL 取出作品 ID，兩種文法都認
    pub fn parse_illust_id(&self, url: &str) -> Option<String> {
        self.artworks_re
            .captures(url)
            .or_else(|| self.legacy_re.captures(url))
            .map(|caps| caps[1].to_string())
    }

    /// 每一頁優先取原圖，沒有才退到中解析度
    fn pick_urls(response: PagesResponse) -> Vec<String> {
        if response.error {
            return Vec::new();
        }

        response
            .body
            .unwrap_or_default()
            .into_iter()
            .filter_map(|page| page.urls.original.or(page.urls.regular))
            .collect()
    }
}

#[async_trait::async_trait]
impl ExtractStrategy for PixivStrategy {
    fn name(&self) -> &str {
        "pixiv API"
    }

    fn origin(&self) -> Origin {
        Origin::PixivLike
    }

    async fn extract(
        &self,
        _html: &str,
        target_url: &str,
        fetcher: &HttpFetcher,
    ) -> Result<Vec<String>> {
        let Some(illust_id) = self.parse_illust_id(target_url) else {
            return Ok(Vec::new());
        };

        let api_url = format!("{}/ajax/illust/{}/pages?lang=zh", self.api_base, illust_id);
        let body = fetcher.fetch(&api_url, Purpose::Page).await?;
        let response: PagesResponse = serde_json::from_str(&body)?;

        Ok(Self::pick_urls(response))
    }
}
