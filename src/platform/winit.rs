use super::{InputEvent, MouseButton};
use std::sync::Arc;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, MouseScrollDelta, WindowEvent};
use winit::event_loop::EventLoop;
use winit::window::{Window as WinitWindowRaw, WindowBuilder};

/// 行高换算为像素的滚轮步长
const LINE_HEIGHT_PX: f32 = 40.0;

/// winit 窗口包装
///
/// 以 `Arc` 共享，wgpu 表面需要 `'static` 的窗口引用。
#[derive(Clone)]
pub struct WinitWindow {
    window: Arc<WinitWindowRaw>,
}

impl WinitWindow {
    pub fn try_new(
        event_loop: &EventLoop<()>,
        title: &str,
        size: (u32, u32),
    ) -> Result<Self, winit::error::OsError> {
        let window = WindowBuilder::new()
            .with_title(title)
            .with_inner_size(LogicalSize::new(size.0, size.1))
            .build(event_loop)?;
        Ok(Self {
            window: Arc::new(window),
        })
    }

    pub fn raw(&self) -> &WinitWindowRaw {
        &self.window
    }

    /// 共享句柄（用于创建 `wgpu::Surface<'static>`）
    pub fn shared(&self) -> Arc<WinitWindowRaw> {
        self.window.clone()
    }
}

impl crate::platform::Window for WinitWindow {
    fn size(&self) -> (u32, u32) {
        let s = self.window.inner_size();
        (s.width, s.height)
    }
    fn scale_factor(&self) -> f64 {
        self.window.scale_factor()
    }
    fn request_redraw(&self) {
        self.window.request_redraw();
    }
    fn set_title(&self, title: &str) {
        self.window.set_title(title);
    }
}

/// 把 winit 窗口事件翻译为平台输入事件
pub fn translate_event(event: &WindowEvent) -> Option<InputEvent> {
    match event {
        WindowEvent::CloseRequested => Some(InputEvent::WindowCloseRequested),
        WindowEvent::Resized(size) => Some(InputEvent::WindowResized {
            width: size.width,
            height: size.height,
        }),
        WindowEvent::CursorMoved { position, .. } => Some(InputEvent::MouseMoved {
            x: position.x as f32,
            y: position.y as f32,
        }),
        WindowEvent::MouseWheel { delta, .. } => {
            let (dx, dy) = match delta {
                MouseScrollDelta::LineDelta(x, y) => (*x, *y),
                MouseScrollDelta::PixelDelta(p) => {
                    (p.x as f32 / LINE_HEIGHT_PX, p.y as f32 / LINE_HEIGHT_PX)
                }
            };
            Some(InputEvent::MouseWheel {
                delta_x: dx,
                delta_y: dy,
            })
        }
        WindowEvent::MouseInput { state, button, .. } => {
            let button = match button {
                winit::event::MouseButton::Left => MouseButton::Left,
                winit::event::MouseButton::Right => MouseButton::Right,
                winit::event::MouseButton::Middle => MouseButton::Middle,
                winit::event::MouseButton::Other(b) => MouseButton::Other(*b),
                winit::event::MouseButton::Back => MouseButton::Other(8),
                winit::event::MouseButton::Forward => MouseButton::Other(9),
            };
            Some(match state {
                ElementState::Pressed => InputEvent::MouseButtonPressed { button },
                ElementState::Released => InputEvent::MouseButtonReleased { button },
            })
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use winit::dpi::PhysicalSize;

    #[test]
    fn test_translate_resize() {
        let event = WindowEvent::Resized(PhysicalSize::new(800, 600));
        assert_eq!(
            translate_event(&event),
            Some(InputEvent::WindowResized {
                width: 800,
                height: 600
            })
        );
    }

    #[test]
    fn test_translate_ignores_focus() {
        assert_eq!(translate_event(&WindowEvent::Focused(true)), None);
    }
}
