//! krume-core: shared data model for the bakery sales reconciler

pub mod consolidated;
pub mod journal;
pub mod lookup;
pub mod orders;
pub mod shift_count;

pub use consolidated::{ConsolidatedProductData, MasterArticleData};
pub use journal::{LineItem, Transaction};
pub use lookup::ArticleLookupTable;
pub use orders::{Order, OrderItem};
pub use shift_count::{ShiftCountEntry, ShiftReport};
