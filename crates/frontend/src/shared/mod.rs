pub mod api_utils;
pub mod export;
pub mod list_utils;
