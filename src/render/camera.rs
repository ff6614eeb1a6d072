//! 透视相机与轨道控制
//!
//! 左键拖动绕目标点旋转，滚轮缩放；带阻尼时松开鼠标后继续减速滑动。

use crate::config::CameraConfig;
use crate::platform::{InputEvent, MouseButton};
use glam::{Mat4, Vec3};

/// 俯仰角限制，避免越过极点
const MAX_PITCH: f32 = std::f32::consts::FRAC_PI_2 - 0.01;

/// 透视投影参数
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Perspective {
    pub fov_y: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Perspective {
    pub fn matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect, self.near, self.far)
    }
}

/// 轨道相机
#[derive(Debug, Clone)]
pub struct OrbitCamera {
    target: Vec3,
    yaw: f32,
    pitch: f32,
    distance: f32,
    projection: Perspective,

    damping: f32,
    rotate_speed: f32,
    zoom_speed: f32,
    min_distance: f32,
    max_distance: f32,

    yaw_velocity: f32,
    pitch_velocity: f32,
    zoom_velocity: f32,
    dragging: bool,
    last_cursor: Option<(f32, f32)>,
}

impl OrbitCamera {
    pub fn new(config: &CameraConfig, aspect: f32) -> Self {
        let offset = Vec3::from_array(config.position);
        let distance = offset.length().max(config.min_distance);
        let yaw = offset.x.atan2(offset.z);
        let pitch = (offset.y / distance).clamp(-1.0, 1.0).asin();

        Self {
            target: Vec3::ZERO,
            yaw,
            pitch: pitch.clamp(-MAX_PITCH, MAX_PITCH),
            distance,
            projection: Perspective {
                fov_y: config.fov_degrees.to_radians(),
                aspect: sanitize_aspect(aspect),
                near: config.near,
                far: config.far,
            },
            damping: config.damping,
            rotate_speed: config.rotate_speed,
            zoom_speed: config.zoom_speed,
            min_distance: config.min_distance,
            max_distance: config.max_distance,
            yaw_velocity: 0.0,
            pitch_velocity: 0.0,
            zoom_velocity: 0.0,
            dragging: false,
            last_cursor: None,
        }
    }

    /// 相机世界坐标
    pub fn eye(&self) -> Vec3 {
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        let (sin_pitch, cos_pitch) = self.pitch.sin_cos();
        self.target
            + Vec3::new(
                self.distance * cos_pitch * sin_yaw,
                self.distance * sin_pitch,
                self.distance * cos_pitch * cos_yaw,
            )
    }

    pub fn distance(&self) -> f32 {
        self.distance
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye(), self.target, Vec3::Y)
    }

    pub fn projection(&self) -> Mat4 {
        self.projection.matrix()
    }

    pub fn aspect(&self) -> f32 {
        self.projection.aspect
    }

    /// 窗口尺寸变化时更新宽高比
    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.projection.aspect = width as f32 / height as f32;
        }
    }

    /// 处理输入；`ui_captured` 为真时忽略指针事件
    pub fn handle_input(&mut self, event: &InputEvent, ui_captured: bool) {
        match *event {
            InputEvent::MouseButtonPressed {
                button: MouseButton::Left,
            } if !ui_captured => {
                self.dragging = true;
            }
            InputEvent::MouseButtonReleased {
                button: MouseButton::Left,
            } => {
                self.dragging = false;
            }
            InputEvent::MouseMoved { x, y } => {
                if let (true, Some((lx, ly))) = (self.dragging, self.last_cursor) {
                    self.yaw_velocity -= (x - lx) * self.rotate_speed;
                    self.pitch_velocity += (y - ly) * self.rotate_speed;
                }
                self.last_cursor = Some((x, y));
            }
            InputEvent::MouseWheel { delta_y, .. } if !ui_captured => {
                self.zoom_velocity -= delta_y * self.zoom_speed;
            }
            InputEvent::WindowResized { width, height } => self.resize(width, height),
            _ => {}
        }
    }

    /// 每帧调用：应用累积的速度并按阻尼衰减
    pub fn update(&mut self) {
        let apply = if self.damping > 0.0 { self.damping } else { 1.0 };

        self.yaw += self.yaw_velocity * apply;
        self.pitch = (self.pitch + self.pitch_velocity * apply).clamp(-MAX_PITCH, MAX_PITCH);
        self.distance = (self.distance * (1.0 + self.zoom_velocity * apply))
            .clamp(self.min_distance, self.max_distance);

        let keep = 1.0 - apply;
        self.yaw_velocity *= keep;
        self.pitch_velocity *= keep;
        self.zoom_velocity *= keep;
    }
}

/// 像素比：设备像素比与上限取小
pub fn effective_pixel_ratio(scale_factor: f64, max_ratio: f32) -> f32 {
    let ratio = scale_factor as f32;
    if ratio.is_finite() && ratio > 0.0 {
        ratio.min(max_ratio)
    } else {
        1.0
    }
}

fn sanitize_aspect(aspect: f32) -> f32 {
    if aspect.is_finite() && aspect > 0.0 {
        aspect
    } else {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera() -> OrbitCamera {
        OrbitCamera::new(&CameraConfig::default(), 16.0 / 9.0)
    }

    #[test]
    fn test_initial_eye_matches_config() {
        let cam = camera();
        let eye = cam.eye();
        assert!((eye - Vec3::new(-4.0, 6.0, 4.0)).length() < 1e-4);
    }

    #[test]
    fn test_pixel_ratio_is_capped() {
        assert_eq!(effective_pixel_ratio(1.0, 2.0), 1.0);
        assert_eq!(effective_pixel_ratio(3.0, 2.0), 2.0);
        assert_eq!(effective_pixel_ratio(f64::NAN, 2.0), 1.0);
    }

    #[test]
    fn test_resize_updates_aspect() {
        let mut cam = camera();
        cam.handle_input(
            &InputEvent::WindowResized {
                width: 1000,
                height: 500,
            },
            false,
        );
        assert_eq!(cam.aspect(), 2.0);
        cam.resize(0, 0);
        assert_eq!(cam.aspect(), 2.0);
    }

    #[test]
    fn test_drag_rotates_and_damps() {
        let mut cam = camera();
        let before = cam.eye();
        cam.handle_input(&InputEvent::MouseMoved { x: 0.0, y: 0.0 }, false);
        cam.handle_input(
            &InputEvent::MouseButtonPressed {
                button: MouseButton::Left,
            },
            false,
        );
        cam.handle_input(&InputEvent::MouseMoved { x: 50.0, y: 0.0 }, false);
        cam.update();
        let after_one = cam.eye();
        assert!((after_one - before).length() > 1e-4);

        // 松开后仍在滑动，但速度衰减
        cam.handle_input(
            &InputEvent::MouseButtonReleased {
                button: MouseButton::Left,
            },
            false,
        );
        let v0 = cam.yaw_velocity.abs();
        cam.update();
        assert!(cam.yaw_velocity.abs() < v0);
        // 距离不受旋转影响
        assert!((cam.distance() - before.length()).abs() < 1e-4);
    }

    #[test]
    fn test_ui_capture_blocks_drag() {
        let mut cam = camera();
        cam.handle_input(
            &InputEvent::MouseButtonPressed {
                button: MouseButton::Left,
            },
            true,
        );
        cam.handle_input(&InputEvent::MouseMoved { x: 0.0, y: 0.0 }, false);
        cam.handle_input(&InputEvent::MouseMoved { x: 80.0, y: 40.0 }, false);
        assert_eq!(cam.yaw_velocity, 0.0);
    }

    #[test]
    fn test_zoom_is_clamped() {
        let mut cam = camera();
        for _ in 0..200 {
            cam.handle_input(
                &InputEvent::MouseWheel {
                    delta_x: 0.0,
                    delta_y: -10.0,
                },
                false,
            );
            cam.update();
        }
        assert!(cam.distance() <= CameraConfig::default().max_distance);
    }
}
