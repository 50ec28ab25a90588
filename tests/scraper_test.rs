use chrono::{Duration, Utc};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use review_radar::config::Config;
use review_radar::scraper;

fn scrape_config(base_url: String, operators: Vec<&str>) -> Config {
    let mut config = Config::new();
    config.hellopeter_base_url = base_url;
    config.target_operators = operators.into_iter().map(String::from).collect();
    config.days_to_scrape = 7;
    config
}

fn site_date(days_ago: i64) -> String {
    (Utc::now() - Duration::days(days_ago))
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}

#[tokio::test]
async fn test_scrape_stops_at_cutoff_date() {
    let mock_server = MockServer::start().await;

    // 第一页：一条最近的评论 + 一条超出时间窗的旧评论
    Mock::given(method("GET"))
        .and(path("/consumer/business/vodacom/reviews"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                {
                    "id": 101,
                    "review_title": "No signal",
                    "review_content": "Dead zone for 3 days",
                    "review_rating": 1.0,
                    "created_at": site_date(1)
                },
                {
                    "id": 102,
                    "review_title": "Old complaint",
                    "review_content": "From last month",
                    "review_rating": 2.0,
                    "created_at": site_date(30)
                }
            ]
        })))
        .mount(&mock_server)
        .await;

    let config = scrape_config(mock_server.uri(), vec!["vodacom"]);
    let records = scraper::run_scraper(&config).await.unwrap();

    // 旧评论触发停止，第二页不再请求
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].operator, "vodacom");
    assert_eq!(records[0].title, "No signal");
    assert_eq!(
        records[0].url,
        "https://www.hellopeter.com/vodacom/reviews/review-101"
    );

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
}

#[tokio::test]
async fn test_empty_page_ends_operator() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/consumer/business/mtn/reviews"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [] })))
        .mount(&mock_server)
        .await;

    let config = scrape_config(mock_server.uri(), vec!["mtn"]);
    let records = scraper::run_scraper(&config).await.unwrap();

    assert!(records.is_empty());
}

#[tokio::test]
async fn test_operator_error_does_not_abort_run() {
    let mock_server = MockServer::start().await;

    // vodacom 接口报错，mtn 正常返回
    Mock::given(method("GET"))
        .and(path("/consumer/business/vodacom/reviews"))
        .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/consumer/business/mtn/reviews"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{
                "id": 7,
                "review_title": "Double debit",
                "review_content": "Charged twice",
                "review_rating": 1.0,
                "created_at": site_date(2)
            }]
        })))
        .mount(&mock_server)
        .await;

    // mtn 第二页为空，结束翻页
    Mock::given(method("GET"))
        .and(path("/consumer/business/mtn/reviews"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [] })))
        .mount(&mock_server)
        .await;

    let config = scrape_config(mock_server.uri(), vec!["vodacom", "mtn"]);
    let records = scraper::run_scraper(&config).await.unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].operator, "mtn");
}
