pub mod html;

use std::collections::HashMap;

use serde::Serialize;

use crate::models::{AnalyzedReview, ClassificationResult, Sentiment};

/// 站点 slug 到品牌名的归一化
pub fn canonical_operator(slug: &str) -> &str {
    match slug {
        "vodacom" => "Vodacom",
        "mtn" => "MTN",
        "telkom" => "Telkom",
        "rain-internet-service-provider" => "Rain",
        other => other,
    }
}

/// 品牌配色，未知运营商用灰色
pub fn brand_color(operator: &str) -> &'static str {
    match operator {
        "Vodacom" => "#E60000",
        "MTN" => "#FFCB05",
        "Rain" => "#00C4B4",
        "Telkom" => "#0072CE",
        _ => "#999999",
    }
}

/// 报告前的数据清洗：运营商名归一化
pub fn clean(reviews: &mut [AnalyzedReview]) {
    for review in reviews.iter_mut() {
        review.record.operator = canonical_operator(&review.record.operator).to_string();
    }
}

/// 单个运营商的聚合指标
#[derive(Debug, Clone, Serialize)]
pub struct OperatorStat {
    pub name: String,
    pub color: String,
    pub total: usize,
    pub negative: usize,
    pub positive: usize,
    pub neutral: usize,
    /// 占全部评论的百分比，已取整供模板直接用作条宽
    pub share_pct: usize,
}

/// 整批评论的聚合统计，报告与总摘要的共同输入
#[derive(Debug, Clone, Serialize)]
pub struct ReportStats {
    pub total: usize,
    pub per_operator: Vec<OperatorStat>,
    /// 负面评论中最高频的 L2 问题，最多 5 个
    pub top_negative_issues: Vec<IssueCount>,
    /// 分类调用失败（哨兵结果）条数
    pub failed_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct IssueCount {
    pub issue: String,
    pub count: usize,
}

impl ReportStats {
    pub fn compute(reviews: &[AnalyzedReview]) -> Self {
        let total = reviews.len();

        let mut by_operator: HashMap<&str, (usize, usize, usize, usize)> = HashMap::new();
        let mut negative_issues: HashMap<&str, usize> = HashMap::new();
        let mut failed_count = 0usize;

        for review in reviews {
            let entry = by_operator
                .entry(review.record.operator.as_str())
                .or_default();
            entry.0 += 1;
            match review.analysis.sentiment {
                Sentiment::Negative => entry.1 += 1,
                Sentiment::Positive => entry.2 += 1,
                Sentiment::Neutral => entry.3 += 1,
            }

            if review.analysis.is_fallback() {
                failed_count += 1;
            } else if review.analysis.sentiment == Sentiment::Negative {
                *negative_issues
                    .entry(review.analysis.l2_issue.as_str())
                    .or_default() += 1;
            }
        }

        let mut per_operator: Vec<OperatorStat> = by_operator
            .into_iter()
            .map(|(name, (op_total, negative, positive, neutral))| OperatorStat {
                name: name.to_string(),
                color: brand_color(name).to_string(),
                total: op_total,
                negative,
                positive,
                neutral,
                share_pct: if total > 0 { op_total * 100 / total } else { 0 },
            })
            .collect();
        // 评论量大的排前面，量相同按名称保证输出稳定
        per_operator.sort_by(|a, b| b.total.cmp(&a.total).then(a.name.cmp(&b.name)));

        let mut top_negative_issues: Vec<IssueCount> = negative_issues
            .into_iter()
            .map(|(issue, count)| IssueCount {
                issue: issue.to_string(),
                count,
            })
            .collect();
        top_negative_issues.sort_by(|a, b| b.count.cmp(&a.count).then(a.issue.cmp(&b.issue)));
        top_negative_issues.truncate(5);

        Self {
            total,
            per_operator,
            top_negative_issues,
            failed_count,
        }
    }

    /// 分类失败率，供周报标注数据可信度
    pub fn failure_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.failed_count as f64 / self.total as f64
        }
    }

    /// 运营商评论量统计的文本形式，送入总摘要 prompt
    pub fn stats_text(&self) -> String {
        self.per_operator
            .iter()
            .map(|stat| format!("{}: {} 条（负面 {}）", stat.name, stat.total, stat.negative))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Top 负面问题的文本形式，送入总摘要 prompt
    pub fn issues_text(&self) -> String {
        self.top_negative_issues
            .iter()
            .map(|item| format!("{}: {} 次", item.issue, item.count))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// 统计哨兵结果条数（与 ReportStats 解耦，快照校验时单独可用）
pub fn count_failures(results: &[ClassificationResult]) -> usize {
    results.iter().filter(|r| r.is_fallback()).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, ReviewRecord, ServiceType};
    use chrono::Utc;

    fn review(operator: &str, sentiment: Sentiment, issue: &str) -> AnalyzedReview {
        AnalyzedReview {
            record: ReviewRecord {
                operator: operator.to_string(),
                date: Utc::now(),
                title: "t".to_string(),
                content: "c".to_string(),
                raw_rating: 1.0,
                url: String::new(),
            },
            analysis: ClassificationResult {
                l1_category: Category::Network,
                l2_issue: issue.to_string(),
                service_type: ServiceType::MBB,
                sentiment,
                summary: "s".to_string(),
            },
        }
    }

    fn failed_review(operator: &str) -> AnalyzedReview {
        let mut r = review(operator, Sentiment::Neutral, "x");
        r.analysis = ClassificationResult::fallback();
        r
    }

    #[test]
    fn test_canonical_operator() {
        assert_eq!(canonical_operator("vodacom"), "Vodacom");
        assert_eq!(canonical_operator("rain-internet-service-provider"), "Rain");
        assert_eq!(canonical_operator("some-new-isp"), "some-new-isp");
    }

    #[test]
    fn test_clean_rewrites_operators() {
        let mut reviews = vec![review("mtn", Sentiment::Negative, "No Signal/Dead Zone")];
        clean(&mut reviews);
        assert_eq!(reviews[0].record.operator, "MTN");
    }

    #[test]
    fn test_stats_aggregation() {
        let reviews = vec![
            review("Vodacom", Sentiment::Negative, "No Signal/Dead Zone"),
            review("Vodacom", Sentiment::Negative, "No Signal/Dead Zone"),
            review("Vodacom", Sentiment::Positive, "n/a"),
            review("MTN", Sentiment::Negative, "Double Debit"),
            failed_review("MTN"),
        ];

        let stats = ReportStats::compute(&reviews);
        assert_eq!(stats.total, 5);
        assert_eq!(stats.failed_count, 1);

        assert_eq!(stats.per_operator[0].name, "Vodacom");
        assert_eq!(stats.per_operator[0].total, 3);
        assert_eq!(stats.per_operator[0].negative, 2);
        assert_eq!(stats.per_operator[0].positive, 1);
        assert_eq!(stats.per_operator[1].name, "MTN");
        assert_eq!(stats.per_operator[1].neutral, 1);

        assert_eq!(stats.top_negative_issues[0].issue, "No Signal/Dead Zone");
        assert_eq!(stats.top_negative_issues[0].count, 2);
    }

    #[test]
    fn test_fallback_rows_excluded_from_issue_ranking() {
        // 哨兵行计入失败率，但不能污染真实问题榜
        let reviews = vec![failed_review("MTN"), failed_review("MTN")];
        let stats = ReportStats::compute(&reviews);

        assert!(stats.top_negative_issues.is_empty());
        assert_eq!(stats.failed_count, 2);
        assert_eq!(stats.failure_rate(), 1.0);
    }

    #[test]
    fn test_top_issues_capped_at_five() {
        let mut reviews = Vec::new();
        for i in 0..8 {
            reviews.push(review("MTN", Sentiment::Negative, &format!("issue-{}", i)));
        }
        let stats = ReportStats::compute(&reviews);
        assert_eq!(stats.top_negative_issues.len(), 5);
    }

    #[test]
    fn test_empty_input() {
        let stats = ReportStats::compute(&[]);
        assert_eq!(stats.total, 0);
        assert_eq!(stats.failure_rate(), 0.0);
        assert!(stats.per_operator.is_empty());
        assert_eq!(stats.stats_text(), "");
    }
}
