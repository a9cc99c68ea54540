pub mod constants;
pub mod coordinates;
pub mod filename;
pub mod logging;
pub mod progress;

pub use constants::*;
pub use coordinates::{dms_to_decimal, is_within_atlantic_canada, parse_coordinate};
pub use filename::{display_label, is_csv_file_name, location_id_from_file_name, presentation_path};
pub use logging::init_logging;
pub use progress::ProgressReporter;
