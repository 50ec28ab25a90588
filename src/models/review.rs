use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 一条原始评论，由爬虫产出，进入流水线后不再修改
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewRecord {
    /// 运营商标识（爬取阶段为站点 slug，报告阶段归一化为品牌名）
    pub operator: String,
    /// 评论发布时间
    pub date: DateTime<Utc>,
    /// 评论标题，可能为空字符串
    pub title: String,
    /// 评论正文，可能为空字符串
    pub content: String,
    /// 站点原始评分
    pub raw_rating: f32,
    /// 评论来源链接
    pub url: String,
}

/// 一级问题分类
///
/// 模型输出的标签带下划线（prompt 约定格式），通过 alias 兼容；
/// 未见过的标签统一落到 Other，不视为解析失败。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Network,
    Billing,
    #[serde(alias = "Customer_Service")]
    CustomerService,
    #[serde(alias = "Technical_Repair")]
    TechnicalRepair,
    #[serde(alias = "Sales_Admin")]
    Sales,
    #[serde(other)]
    Other,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Network => "Network",
            Category::Billing => "Billing",
            Category::CustomerService => "Customer Service",
            Category::TechnicalRepair => "Technical Repair",
            Category::Sales => "Sales",
            Category::Other => "Other",
        }
    }
}

/// 业务类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ServiceType {
    Fibre,
    FWA,
    MBB,
    #[serde(other)]
    Unknown,
}

impl ServiceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceType::Fibre => "Fibre",
            ServiceType::FWA => "FWA",
            ServiceType::MBB => "MBB",
            ServiceType::Unknown => "Unknown",
        }
    }
}

/// 情感倾向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sentiment {
    Positive,
    Negative,
    #[serde(other)]
    Neutral,
}

impl Sentiment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "Positive",
            Sentiment::Negative => "Negative",
            Sentiment::Neutral => "Neutral",
        }
    }
}

/// 单条评论的分类结果，五个字段始终有值
///
/// 字段名与模型约定的 JSON 输出保持一致，解析时缺任何一个字段都算失败。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    #[serde(rename = "L1_Category")]
    pub l1_category: Category,
    #[serde(rename = "L2_Issue")]
    pub l2_issue: String,
    #[serde(rename = "Service_Type")]
    pub service_type: ServiceType,
    #[serde(rename = "Sentiment")]
    pub sentiment: Sentiment,
    #[serde(rename = "Summary")]
    pub summary: String,
}

impl ClassificationResult {
    /// 调用失败时填入的哨兵文本，下游据此统计分类失败率
    pub const FAILED_SENTINEL: &'static str = "Analysis Failed";

    /// 分类调用失败时的固定兜底结果，保证每条评论都有输出
    pub fn fallback() -> Self {
        Self {
            l1_category: Category::Other,
            l2_issue: Self::FAILED_SENTINEL.to_string(),
            service_type: ServiceType::Unknown,
            sentiment: Sentiment::Neutral,
            summary: Self::FAILED_SENTINEL.to_string(),
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.l2_issue == Self::FAILED_SENTINEL && self.summary == Self::FAILED_SENTINEL
    }
}

/// 评论与其分类结果的合并视图，报告阶段的输入
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzedReview {
    #[serde(flatten)]
    pub record: ReviewRecord,
    #[serde(flatten)]
    pub analysis: ClassificationResult,
}

impl AnalyzedReview {
    /// 把等长且序号对齐的分类结果合并回原始评论
    pub fn merge(records: Vec<ReviewRecord>, results: Vec<ClassificationResult>) -> Vec<Self> {
        assert_eq!(
            records.len(),
            results.len(),
            "classification results must align with input records"
        );
        records
            .into_iter()
            .zip(results)
            .map(|(record, analysis)| Self { record, analysis })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> ReviewRecord {
        ReviewRecord {
            operator: "vodacom".to_string(),
            date: Utc::now(),
            title: "No signal".to_string(),
            content: "Dead zone for 3 days".to_string(),
            raw_rating: 1.0,
            url: "https://www.hellopeter.com/vodacom/reviews/review-1".to_string(),
        }
    }

    #[test]
    fn test_parse_model_output() {
        let json = r#"{
            "L1_Category": "Network",
            "L2_Issue": "No Signal/Dead Zone",
            "Service_Type": "MBB",
            "Sentiment": "Negative",
            "Summary": "User has had no signal for three days."
        }"#;

        let result: ClassificationResult = serde_json::from_str(json).unwrap();
        assert_eq!(result.l1_category, Category::Network);
        assert_eq!(result.l2_issue, "No Signal/Dead Zone");
        assert_eq!(result.service_type, ServiceType::MBB);
        assert_eq!(result.sentiment, Sentiment::Negative);
        assert!(!result.is_fallback());
    }

    #[test]
    fn test_parse_underscore_aliases() {
        let json = r#"{
            "L1_Category": "Customer_Service",
            "L2_Issue": "Call Center Unreachable",
            "Service_Type": "Fibre",
            "Sentiment": "Negative",
            "Summary": "Nobody answers the support line."
        }"#;

        let result: ClassificationResult = serde_json::from_str(json).unwrap();
        assert_eq!(result.l1_category, Category::CustomerService);
    }

    #[test]
    fn test_unknown_labels_fall_through() {
        // 模型偶尔发明新标签，归入 Other/Unknown/Neutral 而不是解析失败
        let json = r#"{
            "L1_Category": "App_Digital",
            "L2_Issue": "Chatbot Loop",
            "Service_Type": "5G",
            "Sentiment": "Mixed",
            "Summary": "The app chatbot keeps looping."
        }"#;

        let result: ClassificationResult = serde_json::from_str(json).unwrap();
        assert_eq!(result.l1_category, Category::Other);
        assert_eq!(result.service_type, ServiceType::Unknown);
        assert_eq!(result.sentiment, Sentiment::Neutral);
        assert!(!result.is_fallback());
    }

    #[test]
    fn test_missing_field_is_parse_error() {
        let json = r#"{
            "L1_Category": "Billing",
            "L2_Issue": "Double Debit",
            "Sentiment": "Negative",
            "Summary": "Charged twice this month."
        }"#;

        assert!(serde_json::from_str::<ClassificationResult>(json).is_err());
    }

    #[test]
    fn test_fallback_shape() {
        let fallback = ClassificationResult::fallback();
        assert_eq!(fallback.l1_category, Category::Other);
        assert_eq!(fallback.l2_issue, "Analysis Failed");
        assert_eq!(fallback.service_type, ServiceType::Unknown);
        assert_eq!(fallback.sentiment, Sentiment::Neutral);
        assert_eq!(fallback.summary, "Analysis Failed");
        assert!(fallback.is_fallback());
    }

    #[test]
    fn test_merge_alignment() {
        let records = vec![sample_record(), sample_record()];
        let results = vec![
            ClassificationResult::fallback(),
            ClassificationResult {
                l1_category: Category::Network,
                l2_issue: "No Signal/Dead Zone".to_string(),
                service_type: ServiceType::MBB,
                sentiment: Sentiment::Negative,
                summary: "No signal.".to_string(),
            },
        ];

        let merged = AnalyzedReview::merge(records, results);
        assert_eq!(merged.len(), 2);
        assert!(merged[0].analysis.is_fallback());
        assert_eq!(merged[1].analysis.l1_category, Category::Network);
    }

    #[test]
    #[should_panic]
    fn test_merge_rejects_misaligned_lengths() {
        AnalyzedReview::merge(vec![sample_record()], vec![]);
    }
}
