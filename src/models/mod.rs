pub mod field;
pub mod index;
pub mod location;
pub mod province;

pub use field::{is_date_column, ColumnRole, FieldCategory, MetadataColumn};
pub use index::{LocationIndex, Manifest};
pub use location::{Coordinates, DateRange, LocationRecord};
pub use province::Province;
