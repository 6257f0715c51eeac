pub mod apply_mask;
pub mod batch;
pub mod box_blur;
pub mod codec;
pub mod color_distance;
pub mod flood_fill;
pub mod pipeline;
pub mod rasterize;
