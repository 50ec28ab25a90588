use std::sync::Arc;

use futures_util::future::join_all;
use tokio::sync::Semaphore;

use crate::models::{ClassificationResult, ReviewRecord};

use super::provider::ReviewClassifier;

/// 并发分类整批评论
///
/// 保证：
/// - 输出与输入等长且序号对齐，result[i] 对应 records[i]；
/// - 同时在途的分类调用不超过 concurrency_limit；
/// - 任一调用失败只把该条目替换为兜底结果，不取消兄弟任务，也不中断批次。
///
/// 空输入直接返回空结果，不发起任何调用。
pub async fn classify_all(
    classifier: Arc<dyn ReviewClassifier>,
    records: &[ReviewRecord],
    concurrency_limit: usize,
) -> Vec<ClassificationResult> {
    assert!(concurrency_limit > 0, "concurrency_limit must be positive");

    if records.is_empty() {
        return Vec::new();
    }

    let semaphore = Arc::new(Semaphore::new(concurrency_limit));

    // 每个任务携带自己的原始序号，完成后按序号落位，
    // 对齐由本函数显式保证，不依赖 join_all 的顺序行为。
    let tasks = records.iter().cloned().enumerate().map(|(index, record)| {
        let classifier = classifier.clone();
        let semaphore = semaphore.clone();

        async move {
            // 先占坑再发请求；permit 随作用域释放，成功失败都不例外
            let _permit = semaphore.acquire().await.unwrap();
            (index, classifier.classify(&record).await)
        }
    });

    let mut results = vec![ClassificationResult::fallback(); records.len()];
    for (index, outcome) in join_all(tasks).await {
        results[index] = match outcome {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!("review #{} classification failed: {}", index, e);
                ClassificationResult::fallback()
            }
        };
    }

    results
}
