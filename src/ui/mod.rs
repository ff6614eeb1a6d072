//! UI 系统模块
//!
//! egui 集成与星系参数面板。
//!
//! ## 帧流程
//!
//! 1. 窗口事件先交给 [`UiContext::handle_event`]，被 egui 消费的事件不再传给相机
//! 2. [`UiContext::begin_frame`] 后绘制 [`ParameterPanel`]
//! 3. [`UiContext::end_frame`] 产出的 [`UiFrame`] 交给渲染器

pub mod panel;

pub use panel::{CommitTracker, ParameterPanel, WidgetSignal, PANEL_TITLE, PANEL_WIDTH};

use crate::render::UiPaint;
use egui_wgpu::Renderer;
use egui_winit::State;
use winit::event::WindowEvent;
use winit::window::Window;

/// 一帧 egui 输出（已三角化）
pub struct UiFrame {
    pub primitives: Vec<egui::ClippedPrimitive>,
    pub textures_delta: egui::TexturesDelta,
    pub pixels_per_point: f32,
}

/// egui 上下文、winit 输入状态与 wgpu 渲染器
// egui-winit 的 State 不是 Send，只在主线程使用
pub struct UiContext {
    context: egui::Context,
    state: State,
    renderer: Renderer,
}

impl UiContext {
    pub fn new(window: &Window, device: &wgpu::Device, format: wgpu::TextureFormat) -> Self {
        let context = egui::Context::default();
        let viewport_id = context.viewport_id();
        let state = State::new(
            context.clone(),
            viewport_id,
            window,
            Some(window.scale_factor() as f32),
            None,
        );
        let renderer = Renderer::new(device, format, None, 1);
        Self {
            context,
            state,
            renderer,
        }
    }

    pub fn context(&self) -> &egui::Context {
        &self.context
    }

    /// 处理窗口事件；返回 true 表示事件已被 UI 消费
    pub fn handle_event(&mut self, window: &Window, event: &WindowEvent) -> bool {
        let response = self.state.on_window_event(window, event);
        response.consumed
    }

    /// 指针是否位于 UI 之上（此时相机不响应拖动与滚轮）
    pub fn wants_pointer(&self) -> bool {
        self.context.wants_pointer_input() || self.context.is_pointer_over_area()
    }

    pub fn begin_frame(&mut self, window: &Window) {
        let raw_input = self.state.take_egui_input(window);
        self.context.begin_frame(raw_input);
    }

    pub fn end_frame(&mut self, window: &Window) -> UiFrame {
        let output = self.context.end_frame();
        self.state
            .handle_platform_output(window, output.platform_output);
        let primitives = self
            .context
            .tessellate(output.shapes, output.pixels_per_point);
        UiFrame {
            primitives,
            textures_delta: output.textures_delta,
            pixels_per_point: output.pixels_per_point,
        }
    }

    /// 组装渲染器需要的绘制数据
    pub fn paint<'a>(&'a mut self, frame: &'a UiFrame) -> UiPaint<'a> {
        UiPaint {
            renderer: &mut self.renderer,
            primitives: &frame.primitives,
            textures_delta: &frame.textures_delta,
            pixels_per_point: frame.pixels_per_point,
        }
    }
}
