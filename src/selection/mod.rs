pub mod geometry;
pub mod heightmap;
pub mod settings;

pub use geometry::{constrain_end, constrain_square, max_side_pixels, SelectionBounds, SkewQuad};
pub use heightmap::{encode_png, export_file_name, HeightmapExporter, HeightmapPng};
pub use settings::ExportSettings;
