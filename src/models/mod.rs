pub mod record;
pub mod role;
pub mod table;

pub use record::{Candidate, QualifyingRecord, ResultSet, FALLBACK_QUANTITY_COLUMN, FALLBACK_SOURCE_UNIT};
pub use role::{ColumnRole, ColumnRoles};
pub use table::{CellValue, Row, TabularUnit};
