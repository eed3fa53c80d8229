mod crawler;
mod error;
mod extractor;
mod fetcher;
mod file_index;
mod filename;
mod headers;
mod origin;
mod report;

use anyhow::Result;
use crawler::{CrawlerConfig, CrawlerEngine, RunResult};
use indicatif::{ProgressBar, ProgressStyle};
use std::env;

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    match args.get(1).map(|s| s.as_str()) {
        Some("--help") | Some("-h") | None => print_help(),
        Some(url) => {
            let folder = args.get(2).map(|s| s.as_str()).unwrap_or("images");
            run_crawl(url, folder).await?;
        }
    }

    Ok(())
}

async fn run_crawl(url: &str, folder: &str) -> Result<()> {
    println!("=== Image Site Crawler ===\n");

    if !url.starts_with("http://") && !url.starts_with("https://") {
        println!("⚠️ 連結必須以 http:// 或 https:// 開頭");
        return Ok(());
    }

    // pixiv 的 session 憑證從環境變數帶入，不落地
    let config = CrawlerConfig::default().with_pixiv_session(env::var("PIXIV_SESSION").ok());

    let bar = ProgressBar::new(0);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} 張 ({percent}%)")
            .unwrap()
            .progress_chars("=>-"),
    );

    let log_bar = bar.clone();
    let progress_bar = bar.clone();
    let engine = CrawlerEngine::new(folder, config)
        .on_log(move |line| log_bar.println(line))
        .on_progress(move |current, total| {
            progress_bar.set_length(total as u64);
            progress_bar.set_position(current as u64);
        });

    let result = engine.run(url).await?;
    bar.finish_and_clear();

    print_statistics(&result);

    Ok(())
}

fn print_statistics(result: &RunResult) {
    println!("\n╔══════════════════════════════════╗");
    println!("║       📊 下載統計               ║");
    println!("╠══════════════════════════════════╣");
    println!("║ 新下載:   {:>20} ║", result.downloaded);
    println!("║ 已跳過:   {:>20} ║", result.skipped);
    println!("║ 失敗:     {:>20} ║", result.failed);
    println!("║ 處理總數: {:>20} ║", result.total());
    println!("╚══════════════════════════════════╝");
}

fn print_help() {
    println!("Image Site Crawler - 網頁圖片下載工具\n");
    println!("用法:");
    println!("  cargo run <url> [folder]         # 下載頁面上的圖片");
    println!("  cargo run --help                 # 顯示此幫助\n");
    println!("參數:");
    println!("  url      目標頁面或圖片連結（pixiv 作品頁可直接貼）");
    println!("  folder   儲存資料夾，預設 images\n");
    println!("環境變數:");
    println!("  PIXIV_SESSION   pixiv 的 PHPSESSID，登入限定作品需要\n");
    println!("範例:");
    println!("  cargo run https://www.pixiv.net/artworks/123456 pixiv_images");
    println!("  cargo run https://example.com/gallery");
    println!("  cargo run https://example.com/photo.png   # 直接圖片連結");
}
