//! 应用主入口
//!
//! 定义Engine结构和主运行循环

use crate::config::{AppConfig, LoggingConfig};
use crate::galaxy::{GalaxyLifecycle, ParameterStore, RegenerationReport, SeedPolicy};
use crate::platform::winit::{translate_event, WinitWindow};
use crate::platform::Window;
use crate::render::{effective_pixel_ratio, CameraUniform, GalaxyRenderer, OrbitCamera};
use crate::ui::{ParameterPanel, UiContext};
use glam::Mat4;
use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;
use winit::event::{Event, WindowEvent};
use winit::event_loop::{EventLoop, EventLoopWindowTarget};

use super::error::{EngineError, EngineResult, RenderError};

/// 星系生成器主结构
///
/// `Engine` 负责：
/// - 加载配置、初始化日志
/// - 创建窗口、渲染器与参数面板
/// - 生成初始星系并运行事件循环
///
/// # 示例
///
/// ```no_run
/// use galaxy_generator::core::Engine;
///
/// fn main() -> Result<(), Box<dyn std::error::Error>> {
///     Engine::run()?;
///     Ok(())
/// }
/// ```
pub struct Engine;

impl Engine {
    /// 运行主循环，直到窗口关闭
    pub fn run() -> EngineResult<()> {
        let mut config = AppConfig::load_or_default();
        config.apply_env_overrides();
        Self::initialize_logging(&config.logging);
        config.validate()?;

        let event_loop = EventLoop::new()
            .map_err(|e| EngineError::EventLoop(format!("Failed to create event loop: {}", e)))?;
        let app = GalaxyApp::new(&event_loop, config)?;
        Self::run_event_loop(event_loop, app)?;

        tracing::info!(target: "engine", "Shutting down");
        Ok(())
    }

    /// 初始化日志系统
    ///
    /// `RUST_LOG` 优先，否则使用配置中的级别。
    pub fn initialize_logging(config: &LoggingConfig) {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(config.level.as_directive()));
        let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
        tracing::info!(target: "engine", "Galaxy generator starting");
    }

    fn run_event_loop(event_loop: EventLoop<()>, mut app: GalaxyApp) -> EngineResult<()> {
        let window_id = app.window.raw().id();
        event_loop
            .run(move |event, elwt| match event {
                Event::WindowEvent { event, window_id: id } if id == window_id => {
                    app.handle_window_event(&event, elwt);
                }
                Event::AboutToWait => app.window.request_redraw(),
                _ => {}
            })
            .map_err(|e| EngineError::EventLoop(format!("Event loop error: {}", e)))
    }
}

/// 运行时状态
struct GalaxyApp {
    config: AppConfig,
    window: WinitWindow,
    renderer: GalaxyRenderer,
    ui: UiContext,
    panel: ParameterPanel,
    store: ParameterStore,
    lifecycle: GalaxyLifecycle<GalaxyRenderer>,
    camera: OrbitCamera,
    regenerate_requested: Rc<Cell<bool>>,
    last_report: Option<RegenerationReport>,
    started: Instant,
}

impl GalaxyApp {
    fn new(event_loop: &EventLoop<()>, config: AppConfig) -> EngineResult<Self> {
        let window = WinitWindow::try_new(
            event_loop,
            &config.window.title,
            (config.window.width, config.window.height),
        )
        .map_err(|e| EngineError::Window(e.to_string()))?;

        let renderer = pollster::block_on(GalaxyRenderer::new(window.shared(), &config.window))?;
        let ui = UiContext::new(window.raw(), renderer.device(), renderer.surface_format());

        let (width, height) = renderer.size();
        let camera = OrbitCamera::new(&config.camera, width as f32 / height.max(1) as f32);

        let regenerate_requested = Rc::new(Cell::new(false));
        let mut store = ParameterStore::new();
        let requested = regenerate_requested.clone();
        store.on_commit(move |field, _| {
            tracing::debug!(target: "ui", field = field.name(), "Regeneration requested");
            requested.set(true);
        });

        let lifecycle = GalaxyLifecycle::new(SeedPolicy::from_seed(config.generation.seed));
        let mut app = Self {
            config,
            window,
            renderer,
            ui,
            panel: ParameterPanel::new(),
            store,
            lifecycle,
            camera,
            regenerate_requested,
            last_report: None,
            started: Instant::now(),
        };

        tracing::info!(target: "engine", "Seed policy: {:?}", app.lifecycle.seed_policy());

        // 启动时生成一次；失败直接返回
        let report = app
            .lifecycle
            .regenerate(app.store.parameters(), &mut app.renderer)?;
        app.on_regenerated(report);
        Ok(app)
    }

    fn handle_window_event(&mut self, event: &WindowEvent, elwt: &EventLoopWindowTarget<()>) {
        let consumed = self.ui.handle_event(self.window.raw(), event);

        match event {
            WindowEvent::CloseRequested => {
                tracing::info!(target: "engine", "Close requested");
                elwt.exit();
                return;
            }
            WindowEvent::Resized(size) => {
                self.renderer.resize(size.width, size.height);
            }
            WindowEvent::RedrawRequested => {
                if let Err(e) = self.redraw() {
                    tracing::error!(target: "engine", "Render failed: {}", e);
                    elwt.exit();
                }
                return;
            }
            _ => {}
        }

        if let Some(input) = translate_event(event) {
            let captured = consumed || self.ui.wants_pointer();
            self.camera.handle_input(&input, captured);
        }
    }

    fn redraw(&mut self) -> Result<(), RenderError> {
        let _span = tracing::info_span!(target: "engine", "frame").entered();
        self.ui.begin_frame(self.window.raw());
        self.panel
            .show(self.ui.context(), &mut self.store, self.last_report.as_ref());
        let frame = self.ui.end_frame(self.window.raw());

        if self.regenerate_requested.replace(false) {
            self.regenerate();
        }

        self.camera.update();
        let (width, height) = self.renderer.size();
        let rotation = self
            .config
            .animation
            .rotation_at(self.started.elapsed().as_secs_f32());
        let uniform = CameraUniform::new(
            self.camera.view(),
            self.camera.projection(),
            Mat4::from_rotation_y(rotation),
            [width as f32, height as f32],
            effective_pixel_ratio(self.window.scale_factor(), self.config.window.max_pixel_ratio),
        );

        let paint = self.ui.paint(&frame);
        self.renderer
            .render_frame(self.lifecycle.current(), &uniform, Some(paint))
    }

    /// 用当前参数重新生成；失败时保留旧星系
    fn regenerate(&mut self) {
        match self
            .lifecycle
            .regenerate(self.store.parameters(), &mut self.renderer)
        {
            Ok(report) => self.on_regenerated(report),
            Err(e) => {
                tracing::warn!(target: "engine", "Regeneration failed, keeping previous galaxy: {}", e);
            }
        }
    }

    fn on_regenerated(&mut self, report: RegenerationReport) {
        tracing::info!(
            target: "engine",
            "Generated {} stars in {:.1}ms",
            report.particle_count,
            report.elapsed_ms
        );
        self.window.set_title(&format!(
            "{} ({} stars)",
            self.config.window.title, report.particle_count
        ));
        self.last_report = Some(report);
    }
}
