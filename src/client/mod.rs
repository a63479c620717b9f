//! LabelCheck API client

pub mod api;
#[cfg(test)]
pub mod fixtures;
pub mod labelcheck;
#[cfg(test)]
pub mod mock;
pub mod models;
pub mod pagination;
pub mod parallel;

pub use api::{AuthApi, HistoryApi, ScanApi};
pub use labelcheck::LabelCheckClient;
#[cfg(test)]
#[allow(unused_imports)]
pub use mock::MockLabelCheckClient;
#[allow(unused_imports)]
pub use pagination::{DEFAULT_PAGE_SIZE, HistoryParams, MAX_PAGE_SIZE, remaining_offsets};
#[allow(unused_imports)]
pub use parallel::fetch_remaining_pages;

/// Full LabelCheck API surface
///
/// Blanket-implemented for anything that implements the three sub-traits, so
/// both the real client and the test mock qualify.
#[allow(dead_code)]
pub trait LabelCheckApi: AuthApi + ScanApi + HistoryApi {}

impl<T: AuthApi + ScanApi + HistoryApi> LabelCheckApi for T {}
