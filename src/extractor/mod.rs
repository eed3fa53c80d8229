// 子模組
pub mod trait_def;
pub mod pixiv;
pub mod photos18;
pub mod foamgirl;
pub mod generic;

// 重新導出
pub use trait_def::ExtractStrategy;
pub use generic::GenericExtractor;

use crate::error::Result;
use crate::fetcher::HttpFetcher;
use crate::origin::classify;
use crate::report::Reporter;
use std::collections::HashSet;
use std::sync::Arc;

/// 擷取調度器
///
/// 策略表依固定順序排列：來源對得上的策略先試，
/// 失敗或一無所獲就往下落，最後一定輪到通用解析。
/// 所有出口都經過同一道保序去重。
pub struct ImageExtractor {
    strategies: Vec<Arc<dyn ExtractStrategy>>,
    generic: GenericExtractor,
    reporter: Reporter,
}

impl ImageExtractor {
    pub fn new(reporter: Reporter) -> Result<Self> {
        Ok(Self {
            strategies: vec![
                Arc::new(pixiv::PixivStrategy::new()?),
                Arc::new(photos18::Photos18Strategy::new()?),
                Arc::new(foamgirl::FoamgirlStrategy::new()?),
            ],
            generic: GenericExtractor::new()?,
            reporter,
        })
    }

    /// 對頁面內容做一輪擷取，回傳去重後的候選圖片 URL
    pub async fn extract(
        &self,
        html: &str,
        target_url: &str,
        fetcher: &HttpFetcher,
    ) -> Vec<String> {
        let origin = classify(target_url);

        for strategy in &self.strategies {
            if strategy.origin() != origin {
                continue;
            }

            self.reporter
                .log(&format!("⚙️ 使用 {} 擷取...", strategy.name()));

            match strategy.extract(html, target_url, fetcher).await {
                Ok(urls) if !urls.is_empty() => {
                    self.reporter.log(&format!(
                        "  ✓ {} 取得 {} 張圖片",
                        strategy.name(),
                        urls.len()
                    ));
                    return dedup_preserve_order(urls);
                }
                Ok(_) => {
                    self.reporter.log(&format!(
                        "  ⚠️ {} 未找到圖片，改用通用解析",
                        strategy.name()
                    ));
                }
                Err(e) => {
                    self.reporter.log(&format!(
                        "  ⚠️ {} 失敗（{}），改用通用解析",
                        strategy.name(),
                        e
                    ));
                }
            }
        }

        dedup_preserve_order(self.generic.extract(html, target_url))
    }
}

/// 完全相同的 URL 只留第一次出現，順序不變
pub fn dedup_preserve_order(urls: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    urls.into_iter().filter(|url| seen.insert(url.clone())).collect()
}
