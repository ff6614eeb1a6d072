//! 平台抽象层
//!
//! 窗口与输入事件的最小抽象，渲染器和相机只依赖这里的类型。

pub mod winit;

pub use self::winit::WinitWindow;

// ============================================================================
// Platform Window Abstraction
// ============================================================================

/// 平台窗口抽象
pub trait Window {
    /// 物理像素尺寸
    fn size(&self) -> (u32, u32);
    fn scale_factor(&self) -> f64;
    fn request_redraw(&self);
    fn set_title(&self, title: &str);
}

// ============================================================================
// Input Abstraction
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    // Mouse
    MouseMoved { x: f32, y: f32 },
    MouseButtonPressed { button: MouseButton },
    MouseButtonReleased { button: MouseButton },
    MouseWheel { delta_x: f32, delta_y: f32 },

    // Window
    WindowResized { width: u32, height: u32 },
    WindowCloseRequested,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Other(u16),
}
