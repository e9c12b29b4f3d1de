//! D400 Sales Dashboard: загрузка листа продаж, фильтры, KPI и графики.

pub mod aggregate;
pub mod cache;
pub mod charts;
pub mod error;
pub mod filter;
pub mod loader;
pub mod service;
pub mod table;

pub use error::{LoadError, RowError};
pub use service::SalesDashboardService;
pub use table::{SalesRow, SalesTable};
