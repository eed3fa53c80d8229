// 子模組
pub mod types;
pub mod engine;
pub mod downloader;

// 重新導出
pub use types::{CrawlerConfig, RunResult};
pub use engine::CrawlerEngine;
pub use downloader::{DownloadOutcome, ImageDownloader};
