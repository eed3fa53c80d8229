use crate::error::{CrawlError, Result};
use crate::headers::{HeaderPolicy, Purpose};
use crate::report::Reporter;
use rand::Rng;
use reqwest::Client;
use std::time::Duration;

/// HTTP Fetcher trait - 抽象介面（為未來擴充預留）
pub trait Fetcher {
    async fn fetch(&self, url: &str, purpose: Purpose) -> Result<String>;
}

/// 隨機延遲後再繼續，max_secs <= 0 時直接略過（測試把延遲歸零用）
pub async fn sleep_jittered(min_secs: f64, max_secs: f64) {
    if max_secs <= 0.0 {
        return;
    }
    let lo = min_secs.min(max_secs).max(0.0);
    let secs = {
        let mut rng = rand::rng();
        rng.random_range(lo..=max_secs)
    };
    tokio::time::sleep(Duration::from_secs_f64(secs)).await;
}

/// HTTP 實作
///
/// 頁面與 pixiv API 都走這裡：每次嘗試前先做禮貌性隨機延遲，
/// 失敗後以指數退避重試，總請求次數固定等於 max_attempts。
pub struct HttpFetcher {
    client: Client,
    headers: HeaderPolicy,
    max_attempts: u32,
    delay_range: (f64, f64),
    backoff_base: f64,
}

impl HttpFetcher {
    /// 建立新的 HTTP Fetcher
    pub fn new(headers: HeaderPolicy, timeout_secs: u64, max_attempts: u32) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .cookie_store(true)
            .build()?;

        Ok(Self {
            client,
            headers,
            max_attempts: max_attempts.max(1),
            delay_range: (0.5, 1.5),
            backoff_base: 2.0,
        })
    }

    /// 調整每次嘗試前的禮貌延遲範圍（秒）
    pub fn with_delay_range(mut self, min_secs: f64, max_secs: f64) -> Self {
        self.delay_range = (min_secs, max_secs);
        self
    }

    /// 調整重試退避的底數（秒），0 表示重試間不等待
    pub fn with_backoff_base(mut self, base_secs: f64) -> Self {
        self.backoff_base = base_secs;
        self
    }

    /// 帶重試的請求
    async fn fetch_with_retry(
        &self,
        url: &str,
        purpose: Purpose,
        reporter: &Reporter,
    ) -> Result<String> {
        let mut attempt = 0u32;

        loop {
            sleep_jittered(self.delay_range.0, self.delay_range.1).await;

            match self.try_once(url, purpose).await {
                Ok(body) => return Ok(body),
                Err(e) => {
                    attempt += 1;
                    reporter.log(&format!(
                        "  ⚠️ 取得失敗 (嘗試 {}/{}): {}",
                        attempt, self.max_attempts, e
                    ));

                    if attempt >= self.max_attempts {
                        return Err(e);
                    }
                    if self.backoff_base > 0.0 {
                        // 重試前等待（指數退避）
                        let wait = self.backoff_base.powi(attempt as i32 - 1);
                        tokio::time::sleep(Duration::from_secs_f64(wait)).await;
                    }
                }
            }
        }
    }

    async fn try_once(&self, url: &str, purpose: Purpose) -> Result<String> {
        let headers = self.headers.headers_for(url, purpose);
        let response = self.client.get(url).headers(headers).send().await?;

        if !response.status().is_success() {
            return Err(CrawlError::HttpStatus(response.status()));
        }

        Ok(response.text().await?)
    }

    /// 同 fetch，但把重試過程回報到指定的 Reporter
    pub async fn fetch_reported(
        &self,
        url: &str,
        purpose: Purpose,
        reporter: &Reporter,
    ) -> Result<String> {
        self.fetch_with_retry(url, purpose, reporter).await
    }
}

impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str, purpose: Purpose) -> Result<String> {
        self.fetch_with_retry(url, purpose, &Reporter::new()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quiet_fetcher(max_attempts: u32) -> HttpFetcher {
        HttpFetcher::new(HeaderPolicy::new(None), 5, max_attempts)
            .unwrap()
            .with_delay_range(0.0, 0.0)
            .with_backoff_base(0.0)
    }

    #[tokio::test]
    async fn test_fetch_success() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/page")
            .with_status(200)
            .with_body("<html>hi</html>")
            .create_async()
            .await;

        let fetcher = quiet_fetcher(3);
        let body = fetcher
            .fetch(&format!("{}/page", server.url()), Purpose::Page)
            .await
            .unwrap();

        assert_eq!(body, "<html>hi</html>");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_retry_ceiling_exactly_three_attempts() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/broken")
            .with_status(500)
            .expect(3)
            .create_async()
            .await;

        let fetcher = quiet_fetcher(3);
        let result = fetcher
            .fetch(&format!("{}/broken", server.url()), Purpose::Page)
            .await;

        assert!(matches!(result, Err(CrawlError::HttpStatus(code)) if code.as_u16() == 500));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_sends_user_agent_from_pool() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/ua")
            .match_header(
                "user-agent",
                mockito::Matcher::Regex("^Mozilla/5\\.0".to_string()),
            )
            .with_status(200)
            .with_body("ok")
            .create_async()
            .await;

        let fetcher = quiet_fetcher(1);
        fetcher
            .fetch(&format!("{}/ua", server.url()), Purpose::Page)
            .await
            .unwrap();

        mock.assert_async().await;
    }
}
