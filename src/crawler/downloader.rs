use super::types::{CrawlerConfig, RunResult};
use crate::error::{CrawlError, Result};
use crate::fetcher::sleep_jittered;
use crate::file_index::ExistingIndex;
use crate::filename;
use crate::headers::{HeaderPolicy, Purpose};
use crate::report::Reporter;
use reqwest::Client;
use std::path::Path;
use std::time::Duration;
use tokio::io::AsyncWriteExt;

/// 單張下載的結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadOutcome {
    /// 成功寫入磁碟
    Downloaded { bytes: u64 },
    /// 主檔名已存在，未發出任何請求
    Skipped,
    /// 重試耗盡或檔案系統錯誤
    Failed,
}

/// 圖片下載器
///
/// 擁有本次爬取的計數器與已下載索引。逐張處理：
/// 已存在就跳過；否則以隨下載量緩慢成長的延遲自我節流，
/// 串流寫入磁碟並檢查最小尺寸，太小視為假圖刪檔重試。
pub struct ImageDownloader {
    client: Client,
    headers: HeaderPolicy,
    config: CrawlerConfig,
    index: ExistingIndex,
    stats: RunResult,
    reporter: Reporter,
}

impl ImageDownloader {
    pub fn new(
        dest: impl AsRef<Path>,
        headers: HeaderPolicy,
        config: CrawlerConfig,
        reporter: Reporter,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.image_timeout_secs))
            .cookie_store(true)
            .build()?;
        let index = ExistingIndex::new(dest)?;

        Ok(Self {
            client,
            headers,
            config,
            index,
            stats: RunResult::default(),
            reporter,
        })
    }

    /// 啟動時已存在的檔案數
    pub fn existing_count(&self) -> usize {
        self.index.len()
    }

    /// 目前累計的計數器
    pub fn stats(&self) -> RunResult {
        self.stats
    }

    /// 下載一張候選圖片，計數器在內部更新
    pub async fn download(&mut self, url: &str, index: usize) -> DownloadOutcome {
        let record = filename::resolve(url, index);

        if self.index.exists(&record.stem) {
            self.stats.skipped += 1;
            self.reporter
                .log(&format!("  ⏭️  [{}] {} (已存在)", index, record.file_name()));
            return DownloadOutcome::Skipped;
        }

        let path = self.index.dir().join(record.file_name());
        let max_attempts = self.config.max_attempts.max(1);
        let mut attempt = 0u32;

        loop {
            // 隨累計下載量緩慢增加的自我節流，到上限為止
            let base = (self.config.throttle_base_secs
                + self.stats.downloaded as f64 * self.config.throttle_step_secs)
                .min(self.config.throttle_cap_secs);
            sleep_jittered(base, base + self.config.throttle_jitter_secs).await;

            match self.try_stream(url, &path).await {
                Ok(bytes) => {
                    self.index.insert(&record.stem);
                    self.stats.downloaded += 1;
                    self.reporter.log(&format!(
                        "  ✓ [{}] {} ({:.1} KB)",
                        index,
                        record.file_name(),
                        bytes as f64 / 1024.0
                    ));
                    return DownloadOutcome::Downloaded { bytes };
                }
                Err(e) => {
                    attempt += 1;

                    if !e.is_retryable() || attempt >= max_attempts {
                        self.stats.failed += 1;
                        self.reporter
                            .log(&format!("  ❌ [{}] 失敗: {}", index, e));
                        return DownloadOutcome::Failed;
                    }

                    if self.config.backoff_base_secs > 0.0 {
                        let wait = self.config.backoff_base_secs.powi(attempt as i32 - 1);
                        sleep_jittered(wait, wait + 1.0).await;
                    }
                }
            }
        }
    }

    /// 單次嘗試：任何失敗都不留半成品檔案
    async fn try_stream(&self, url: &str, path: &Path) -> Result<u64> {
        match self.stream_to_file(url, path).await {
            Ok(total) if total < self.config.min_image_bytes => {
                let _ = tokio::fs::remove_file(path).await;
                Err(CrawlError::Undersized(total))
            }
            Ok(total) => Ok(total),
            Err(e) => {
                let _ = tokio::fs::remove_file(path).await;
                Err(e)
            }
        }
    }

    async fn stream_to_file(&self, url: &str, path: &Path) -> Result<u64> {
        let headers = self.headers.headers_for(url, Purpose::Image);
        let mut response = self.client.get(url).headers(headers).send().await?;

        if !response.status().is_success() {
            return Err(CrawlError::HttpStatus(response.status()));
        }

        let mut file = tokio::fs::File::create(path).await?;
        let mut total: u64 = 0;

        while let Some(chunk) = response.chunk().await? {
            file.write_all(&chunk).await?;
            total += chunk.len() as u64;
        }
        file.flush().await?;

        Ok(total)
    }
}
