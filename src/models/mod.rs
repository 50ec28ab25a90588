pub mod review;

pub use review::{
    AnalyzedReview, Category, ClassificationResult, ReviewRecord, Sentiment, ServiceType,
};
