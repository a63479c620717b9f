//! Wire models for the LabelCheck API

mod auth;
mod history;
mod scan;

pub use auth::SessionToken;
pub use history::HistoryPage;
pub use scan::{
    AnalysisOutcome, AnalysisResult, IngredientEntry, IngredientVerdict, ProductImage,
    ProductInfo, ScanRecord, UploadAck,
};
