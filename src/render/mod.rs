pub mod camera;
pub mod points;
pub mod renderer;

pub use camera::{effective_pixel_ratio, OrbitCamera, Perspective};
pub use points::{CameraUniform, GpuPointCloud, MaterialUniform};
pub use renderer::{GalaxyRenderer, SceneNodes, UiPaint};
