use std::time::Duration;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::analysis::prompt;
use crate::config::Config;
use crate::models::{ClassificationResult, ReviewRecord};

// 全局 HTTP 客户端复用
static HTTP_CLIENT: Lazy<Client> = Lazy::new(|| {
    Client::builder()
        .pool_max_idle_per_host(10)
        .pool_idle_timeout(Duration::from_secs(30))
        .build()
        .expect("Failed to create HTTP client")
});

/// 单次分类调用的失败类型
///
/// 两类失败都在单条评论的边界内消化成兜底结果，不会传播到批次调用方。
#[derive(Debug, Error)]
pub enum ClassifyError {
    /// 网络错误、超时、非 2xx 状态
    #[error("classification request failed: {0}")]
    Transient(String),
    /// 响应体不是期望的五字段 JSON
    #[error("malformed classification response: {0}")]
    Malformed(String),
}

/// 评论分类器，测试中用内存替身实现
#[async_trait]
pub trait ReviewClassifier: Send + Sync {
    async fn classify(&self, record: &ReviewRecord) -> Result<ClassificationResult, ClassifyError>;
}

/// 走 chat-completions 协议的 LLM 分类器
pub struct LlmClassifier {
    api_key: String,
    base_url: String,
    model: String,
    max_prompt_chars: usize,
    request_timeout: Duration,
}

/// chat-completions 请求结构
#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: String,
}

impl ResponseFormat {
    fn json_object() -> Self {
        Self {
            format_type: "json_object".to_string(),
        }
    }
}

/// chat-completions 响应结构
#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: String,
}

impl LlmClassifier {
    /// 调用方必须先通过 Config::validate，这里不再检查凭证
    pub fn new(config: &Config) -> Self {
        Self {
            api_key: config.llm_api_key.clone().unwrap_or_default(),
            base_url: config.llm_base_url.trim_end_matches('/').to_string(),
            model: config.llm_model.clone(),
            max_prompt_chars: config.max_prompt_chars,
            request_timeout: Duration::from_secs(config.request_timeout_secs),
        }
    }

    async fn send_chat(&self, request: &ChatRequest) -> Result<String, ClassifyError> {
        let url = format!("{}/chat/completions", self.base_url);

        let response = HTTP_CLIENT
            .post(&url)
            .bearer_auth(&self.api_key)
            .timeout(self.request_timeout)
            .json(request)
            .send()
            .await
            .map_err(|e| ClassifyError::Transient(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(ClassifyError::Transient(format!(
                "API error {}: {}",
                status, error_text
            )));
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| ClassifyError::Malformed(e.to_string()))?;

        let content = body
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| ClassifyError::Malformed("no choices in response".to_string()))?;

        Ok(content)
    }

    /// 生成周报总摘要，单次调用，失败由调用方用固定文案兜底
    pub async fn generate_overview(
        &self,
        operator_stats: &str,
        top_issues: &str,
    ) -> Result<String, ClassifyError> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt::overview_prompt(operator_stats, top_issues),
            }],
            // 摘要允许一点发挥空间
            temperature: 0.4,
            response_format: None,
        };

        let content = self.send_chat(&request).await?;
        Ok(content.trim().to_string())
    }
}

#[async_trait]
impl ReviewClassifier for LlmClassifier {
    async fn classify(&self, record: &ReviewRecord) -> Result<ClassificationResult, ClassifyError> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: prompt::SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: prompt::classification_prompt(record, self.max_prompt_chars),
                },
            ],
            // 低温保证标签输出稳定一致
            temperature: 0.1,
            response_format: Some(ResponseFormat::json_object()),
        };

        let content = self.send_chat(&request).await?;

        serde_json::from_str::<ClassificationResult>(&content)
            .map_err(|e| ClassifyError::Malformed(e.to_string()))
    }
}
