use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use serde::Deserialize;

use crate::config::Config;
use crate::models::ReviewRecord;

/// Hellopeter 评论接口的单页响应
#[derive(Debug, Deserialize)]
struct ReviewPage {
    #[serde(default)]
    data: Vec<RawReview>,
}

#[derive(Debug, Deserialize)]
struct RawReview {
    id: u64,
    #[serde(default)]
    review_title: String,
    #[serde(default)]
    review_content: String,
    #[serde(default)]
    review_rating: f32,
    #[serde(default)]
    created_at: String,
}

/// 站点时间格式："2024-01-15 10:30:00"，无时区，按 UTC 处理；
/// 解析失败按当前时间算，宁可多抓一条也不在抓取阶段丢数据
fn parse_review_date(created_at: &str) -> DateTime<Utc> {
    NaiveDateTime::parse_from_str(created_at, "%Y-%m-%d %H:%M:%S")
        .map(|naive| naive.and_utc())
        .unwrap_or_else(|_| Utc::now())
}

fn review_url(operator: &str, id: u64) -> String {
    format!("https://www.hellopeter.com/{}/reviews/review-{}", operator, id)
}

/// 逐运营商翻页抓取，直到碰到截止日期之前的评论或空页
///
/// 单个运营商出错只记日志并跳到下一个，不中断整次抓取。
pub async fn run_scraper(config: &Config) -> anyhow::Result<Vec<ReviewRecord>> {
    let cutoff = Utc::now() - Duration::days(config.days_to_scrape);
    tracing::info!(
        "启动爬虫 | 目标: {:?} | 范围: 最近 {} 天",
        config.target_operators,
        config.days_to_scrape
    );

    let client = reqwest::Client::builder()
        .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36")
        .build()?;

    let mut all_records = Vec::new();

    for operator in &config.target_operators {
        tracing::info!("正在处理: {}", operator);
        let mut page_num = 1u32;
        let mut stop_operator = false;

        while !stop_operator {
            let url = format!(
                "{}/consumer/business/{}/reviews?page={}",
                config.hellopeter_base_url, operator, page_num
            );

            let page: ReviewPage = match fetch_page(&client, &url).await {
                Ok(page) => page,
                Err(e) => {
                    tracing::error!("{} 第 {} 页抓取失败: {}", operator, page_num, e);
                    break;
                }
            };

            if page.data.is_empty() {
                tracing::debug!("{} 无更多数据，停止该运营商", operator);
                break;
            }

            let mut valid_count = 0usize;
            for item in page.data {
                let review_date = parse_review_date(&item.created_at);
                if review_date < cutoff {
                    stop_operator = true;
                    continue;
                }

                all_records.push(ReviewRecord {
                    operator: operator.clone(),
                    date: review_date,
                    title: item.review_title,
                    content: item.review_content,
                    raw_rating: item.review_rating,
                    url: review_url(operator, item.id),
                });
                valid_count += 1;
            }

            if valid_count > 0 {
                tracing::debug!("{} 第 {} 页: 抓取 {} 条", operator, page_num, valid_count);
                page_num += 1;
                page_delay().await;
            } else {
                stop_operator = true;
            }
        }
    }

    tracing::info!("抓取完成，共 {} 条评论", all_records.len());
    Ok(all_records)
}

async fn fetch_page(client: &reqwest::Client, url: &str) -> anyhow::Result<ReviewPage> {
    let response = client.get(url).send().await?;
    if !response.status().is_success() {
        anyhow::bail!("unexpected status {}", response.status());
    }
    Ok(response.json().await?)
}

/// 页间随机延迟 0.5–1.5 秒，降低被限流的概率
async fn page_delay() {
    let millis = {
        use rand::Rng;
        rand::thread_rng().gen_range(500..1500)
    };
    tokio::time::sleep(std::time::Duration::from_millis(millis)).await;
}
