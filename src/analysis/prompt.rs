use crate::models::ReviewRecord;

/// 分类请求的 system 指令，约束模型只输出单个 JSON 对象
pub const SYSTEM_PROMPT: &str = "JSON generator. Telecom expert.";

/// 按字符数硬截断，不做句子边界处理
///
/// 按 char 计数而不是字节，避免切在 UTF-8 编码中间。
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((index, _)) => &text[..index],
        None => text,
    }
}

/// 标题与正文拼接成送审文本，截断前的原始拼接形式为 "{title}. {content}"
pub fn review_text(record: &ReviewRecord, max_chars: usize) -> String {
    let combined = format!("{}. {}", record.title, record.content);
    truncate_chars(&combined, max_chars).to_string()
}

/// 单条评论的双层分类 prompt
pub fn classification_prompt(record: &ReviewRecord, max_chars: usize) -> String {
    let text = review_text(record, max_chars);

    format!(
        r#"Role: Senior Telecom Analyst for South Africa.
Task: Analyze the customer review with a 2-level classification system.

Review: "{text}"

Classification Rules:
1. **Level_1_Category**: Choose ONE from [Network, Billing, Customer_Service, Technical_Repair, Sales_Admin, Other].
2. **Level_2_Issue**: Be specific based on Level 1.
   - If Network: "No Signal/Dead Zone", "Slow Internet/High Latency", "Intermittent Drop", "No Throughput", "Load Shedding Impact".
   - If Billing: "Double Debit", "Price Increase", "Cancellation Failure", "Refund Delay", "OOB Charges".
   - If Service: "Call Center Unreachable", "Rude Agent", "No Feedback", "Chatbot Loop".
   - If Repair: "Technician No-Show", "Router Faulty", "Fibre Break".

3. **Service_Type**: MBB (Mobile/Sim) or FWA (Wireless home broadband) or Fibre.
4. **Summary**: A concise 1-sentence summary of the specific incident (e.g. "User charged twice after cancelling contract").

Output JSON ONLY:
{{
    "L1_Category": "...",
    "L2_Issue": "...",
    "Service_Type": "...",
    "Sentiment": "Positive/Negative/Neutral",
    "Summary": "..."
}}"#
    )
}

/// 周报总摘要 prompt，输入为聚合统计而非单条评论
pub fn overview_prompt(operator_stats: &str, top_issues: &str) -> String {
    format!(
        "你是首席分析师。基于数据写一段简短的中文周报摘要（HTML格式）。\n\
         数据：\n{operator_stats}\n主要问题：\n{top_issues}\n\
         要求：包含市场总评、主要痛点、改进建议。"
    )
}
