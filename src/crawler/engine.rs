use super::downloader::ImageDownloader;
use super::types::{CrawlerConfig, RunResult};
use crate::error::Result;
use crate::extractor::ImageExtractor;
use crate::fetcher::HttpFetcher;
use crate::filename::is_direct_image_url;
use crate::headers::{HeaderPolicy, Purpose};
use crate::report::Reporter;
use rand::Rng;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// 主爬蟲引擎
///
/// 串起整條流程：分類 → 抓頁（直接圖片連結跳過）→ 擷取 →
/// 逐張下載（每 10 張休息一次）。單一候選的任何錯誤都不會
/// 中斷整次爬取；只有頁面抓不到或一張都沒擷取到時提早收工，
/// 仍回傳統計而不是錯誤。
pub struct CrawlerEngine {
    dest: PathBuf,
    config: CrawlerConfig,
    reporter: Reporter,
    cancelled: Arc<AtomicBool>,
}

impl CrawlerEngine {
    pub fn new(dest: impl Into<PathBuf>, config: CrawlerConfig) -> Self {
        Self {
            dest: dest.into(),
            config,
            reporter: Reporter::new(),
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// 註冊文字日誌回呼
    pub fn on_log(mut self, sink: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.reporter = std::mem::take(&mut self.reporter).with_log(sink);
        self
    }

    /// 註冊數值進度回呼
    pub fn on_progress(mut self, sink: impl Fn(usize, usize) + Send + Sync + 'static) -> Self {
        self.reporter = std::mem::take(&mut self.reporter).with_progress(sink);
        self
    }

    /// 取得取消旗標；設為 true 後會在下一張下載前停止
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancelled)
    }

    /// 對單一目標跑完整條管線，回傳累計統計
    pub async fn run(&self, target_url: &str) -> Result<RunResult> {
        self.reporter.log(&format!("🚀 開始爬取: {}", target_url));
        self.reporter
            .log(&format!("📁 目錄: {}", self.dest.display()));

        let headers = HeaderPolicy::new(self.config.pixiv_session.clone());
        let fetcher = HttpFetcher::new(
            headers.clone(),
            self.config.page_timeout_secs,
            self.config.max_attempts,
        )?
        .with_delay_range(self.config.fetch_delay_range.0, self.config.fetch_delay_range.1)
        .with_backoff_base(self.config.backoff_base_secs);

        let mut downloader = ImageDownloader::new(
            &self.dest,
            headers,
            self.config.clone(),
            self.reporter.clone(),
        )?;
        self.reporter.log(&format!(
            "📂 發現 {} 個已下載的檔案，將自動跳過",
            downloader.existing_count()
        ));

        // 目標本身就是圖片連結：免抓頁、免擷取
        if is_direct_image_url(target_url) {
            self.reporter.log("🎯 檢測到直接圖片連結，開始下載...");
            self.reporter.progress(0, 1);
            downloader.download(target_url, 1).await;
            self.reporter.progress(1, 1);

            let result = downloader.stats();
            self.log_summary(&result);
            return Ok(result);
        }

        let html = match fetcher
            .fetch_reported(target_url, Purpose::Page, &self.reporter)
            .await
        {
            Ok(html) => html,
            Err(e) => {
                self.reporter.log(&format!("❌ 取得頁面失敗: {}", e));
                return Ok(RunResult::default());
            }
        };

        let extractor = ImageExtractor::new(self.reporter.clone())?;
        let images = extractor.extract(&html, target_url, &fetcher).await;

        if images.is_empty() {
            self.reporter.log("❌ 未找到任何圖片");
            return Ok(RunResult::default());
        }

        let total = images.len();
        self.reporter
            .log(&format!("🎯 共 {} 張圖片，開始下載...", total));
        self.reporter.progress(0, total);

        for (i, url) in images.iter().enumerate() {
            let sequence = i + 1;

            if self.cancelled.load(Ordering::Relaxed) {
                self.reporter.log("⏹️ 使用者取消下載");
                break;
            }

            downloader.download(url, sequence).await;
            self.reporter.progress(sequence, total);

            if self.config.rest_every > 0
                && sequence % self.config.rest_every == 0
                && sequence < total
            {
                self.rest().await;
            }
        }

        let result = downloader.stats();
        self.log_summary(&result);
        Ok(result)
    }

    /// 批次間的休息，時長也回報出去
    async fn rest(&self) {
        let (lo, hi) = self.config.rest_range;
        if hi <= 0.0 {
            return;
        }
        let secs = {
            let mut rng = rand::rng();
            rng.random_range(lo.min(hi).max(0.0)..=hi)
        };
        self.reporter.log(&format!("💤 休息 {:.1} 秒...", secs));
        tokio::time::sleep(Duration::from_secs_f64(secs)).await;
    }

    fn log_summary(&self, result: &RunResult) {
        self.reporter.log(&format!(
            "✅ 完成: 新下載 {}, 跳過 {}, 失敗 {}",
            result.downloaded, result.skipped, result.failed
        ));
    }
}
