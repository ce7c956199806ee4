pub mod canvas;
pub mod image_canvas;
pub mod renderer;
pub mod topology;
