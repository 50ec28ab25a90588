use std::sync::Arc;
use std::time::Instant;

use clap::Parser;

use review_radar::analysis::{self, LlmClassifier};
use review_radar::cli::Args;
use review_radar::config::Config;
use review_radar::models::AnalyzedReview;
use review_radar::notification::{email, Mailer};
use review_radar::report::{self, ReportStats};
use review_radar::scraper;
use review_radar::snapshot;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_max_level(if args.debug {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .init();

    let mut config = Config::new();
    config.update_from_args(&args);
    config.validate()?;
    if !args.dry_run {
        // 邮件凭证缺失要在抓取和分类之前就失败
        config.validate_mail()?;
    }

    // 1. 抓取
    let records = scraper::run_scraper(&config).await?;
    if records.is_empty() {
        tracing::warn!("未抓取到任何评论，跳过后续步骤");
        return Ok(());
    }
    snapshot::write_json(&config.raw_snapshot, &records)?;

    // 2. 分类
    tracing::info!(
        "开始 AI 分析，共 {} 条评论，并发上限 {}",
        records.len(),
        config.concurrency_limit
    );
    let classifier = Arc::new(LlmClassifier::new(&config));
    let start_time = Instant::now();
    let results =
        analysis::classify_all(classifier.clone(), &records, config.concurrency_limit).await;
    tracing::info!(
        "分析完成，耗时 {:.2?}，失败 {} 条",
        start_time.elapsed(),
        report::count_failures(&results)
    );

    let mut reviews = AnalyzedReview::merge(records, results);
    snapshot::write_json(&config.analyzed_snapshot, &reviews)?;

    // 3. 报告
    report::clean(&mut reviews);
    let stats = ReportStats::compute(&reviews);

    let overview = match classifier
        .generate_overview(&stats.stats_text(), &stats.issues_text())
        .await
    {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!("总摘要生成失败: {}", e);
            "无法生成摘要".to_string()
        }
    };

    let html = report::html::render_report(&stats, &overview, &reviews)?;

    if let Some(path) = &args.output {
        std::fs::write(path, &html)?;
        tracing::info!("报告已保存: {}", path);
    }

    if args.dry_run {
        tracing::info!("dry-run 模式，跳过邮件发送");
        return Ok(());
    }

    // 4. 投递
    let mailer = Mailer::new(&config)?;
    let subject = email::report_subject(chrono::Utc::now().date_naive());
    mailer.send_report(&subject, &html).await?;

    Ok(())
}
