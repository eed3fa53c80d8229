/// 爬蟲配置
///
/// 所有時間參數都是資料，測試用 `without_delays` 一口氣歸零。
#[derive(Debug, Clone)]
pub struct CrawlerConfig {
    /// 頁面 / API 請求超時（秒）
    pub page_timeout_secs: u64,
    /// 圖片請求超時（秒）
    pub image_timeout_secs: u64,
    /// 每個請求的最大嘗試次數
    pub max_attempts: u32,
    /// 小於這個位元組數的回應視為假圖，刪檔重試
    pub min_image_bytes: u64,
    /// 抓頁面前的禮貌延遲範圍（秒）
    pub fetch_delay_range: (f64, f64),
    /// 重試退避底數（秒）
    pub backoff_base_secs: f64,
    /// 下載延遲的起始值（秒）
    pub throttle_base_secs: f64,
    /// 每下載成功一張，延遲增加量（秒）
    pub throttle_step_secs: f64,
    /// 下載延遲上限（秒）
    pub throttle_cap_secs: f64,
    /// 下載延遲的隨機抖動上限（秒）
    pub throttle_jitter_secs: f64,
    /// 每下載幾張休息一次
    pub rest_every: usize,
    /// 休息時間範圍（秒）
    pub rest_range: (f64, f64),
    /// pixiv 的 session 憑證（PHPSESSID），沒有就匿名存取
    pub pixiv_session: Option<String>,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            page_timeout_secs: 15,
            image_timeout_secs: 20,
            max_attempts: 3,
            min_image_bytes: 1024,
            fetch_delay_range: (0.5, 1.5),
            backoff_base_secs: 2.0,
            throttle_base_secs: 1.5,
            throttle_step_secs: 0.03,
            throttle_cap_secs: 5.0,
            throttle_jitter_secs: 1.5,
            rest_every: 10,
            rest_range: (3.0, 6.0),
            pixiv_session: None,
        }
    }
}

impl CrawlerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn with_pixiv_session(mut self, session: Option<String>) -> Self {
        self.pixiv_session = session;
        self
    }

    /// 關掉所有延遲與休息（測試用）
    pub fn without_delays(mut self) -> Self {
        self.fetch_delay_range = (0.0, 0.0);
        self.backoff_base_secs = 0.0;
        self.throttle_base_secs = 0.0;
        self.throttle_step_secs = 0.0;
        self.throttle_cap_secs = 0.0;
        self.throttle_jitter_secs = 0.0;
        self.rest_range = (0.0, 0.0);
        self
    }
}

/// 一次爬取的結果統計，三個計數器只增不減
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunResult {
    /// 本次新下載的張數
    pub downloaded: usize,
    /// 因已存在而跳過的張數
    pub skipped: usize,
    /// 重試耗盡仍失敗的張數
    pub failed: usize,
}

impl RunResult {
    /// 處理過的候選總數
    pub fn total(&self) -> usize {
        self.downloaded + self.skipped + self.failed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_values() {
        let config = CrawlerConfig::default();
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.min_image_bytes, 1024);
        assert_eq!(config.rest_every, 10);
    }

    #[test]
    fn test_without_delays_zeroes_every_knob() {
        let config = CrawlerConfig::default().without_delays();
        assert_eq!(config.fetch_delay_range, (0.0, 0.0));
        assert_eq!(config.backoff_base_secs, 0.0);
        assert_eq!(config.throttle_cap_secs, 0.0);
        assert_eq!(config.rest_range, (0.0, 0.0));
    }

    #[test]
    fn test_run_result_total() {
        let result = RunResult {
            downloaded: 3,
            skipped: 2,
            failed: 1,
        };
        assert_eq!(result.total(), 6);
    }
}
