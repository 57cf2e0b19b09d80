mod bounding_box;
pub use bounding_box::*;

mod content;
pub use content::*;

mod crs;
pub use crs::*;

mod crs_coordinate;
pub use crs_coordinate::*;

mod identifier;
pub use identifier::*;

mod spatial_reference_system;
pub use spatial_reference_system::*;

mod tile;
pub use tile::*;

mod tile_coordinates;
pub use tile_coordinates::*;

mod tile_data;
pub use tile_data::*;

mod tile_matrix;
pub use tile_matrix::*;

mod tile_set;
pub use tile_set::*;

mod timestamp;
pub use timestamp::*;
