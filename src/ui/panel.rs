//! 星系参数面板
//!
//! 每个参数一个控件：拖动过程中只写入参数存储，松开（或失去焦点）时才提交，
//! 提交会触发一次重新生成。

use crate::galaxy::{ParameterField, ParameterStore, RegenerationReport, Rgb};

/// 面板窗口标题
pub const PANEL_TITLE: &str = "Galaxy Controls";
/// 面板默认宽度
pub const PANEL_WIDTH: f32 = 400.0;

/// 控件在一帧内的交互信号
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WidgetSignal {
    /// 本帧值发生变化
    pub changed: bool,
    /// 用户仍在操作（拖动中、文本编辑中、指针按下）
    pub interacting: bool,
    /// 本帧结束操作（拖动结束、失去焦点、指针松开）
    pub finished: bool,
}

impl WidgetSignal {
    fn from_slider(response: &egui::Response) -> Self {
        Self {
            changed: response.changed(),
            interacting: response.dragged() || response.has_focus(),
            finished: response.drag_stopped() || response.lost_focus(),
        }
    }
}

/// 记录尚未提交的字段，决定何时提交
#[derive(Debug, Default, Clone)]
pub struct CommitTracker {
    pending: Vec<ParameterField>,
}

impl CommitTracker {
    /// 处理一个控件的信号；返回 true 表示该字段现在应当提交
    ///
    /// 变化会先标记为待提交；操作结束时，或者变化发生时并无持续操作
    /// （例如单击滑块轨道、键盘步进），才真正提交。
    pub fn observe(&mut self, field: ParameterField, signal: WidgetSignal) -> bool {
        if signal.changed && !self.pending.contains(&field) {
            self.pending.push(field);
        }
        let pending = self.pending.contains(&field);
        let done = signal.finished || !signal.interacting;
        if pending && done {
            self.pending.retain(|f| *f != field);
            true
        } else {
            false
        }
    }

    pub fn is_pending(&self, field: ParameterField) -> bool {
        self.pending.contains(&field)
    }
}

/// 参数面板
#[derive(Debug, Default)]
pub struct ParameterPanel {
    tracker: CommitTracker,
}

impl ParameterPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tracker(&self) -> &CommitTracker {
        &self.tracker
    }

    /// 绘制面板；返回本帧提交的字段
    pub fn show(
        &mut self,
        ctx: &egui::Context,
        store: &mut ParameterStore,
        last_report: Option<&RegenerationReport>,
    ) -> Vec<ParameterField> {
        let mut committed = Vec::new();
        egui::Window::new(PANEL_TITLE)
            .default_width(PANEL_WIDTH)
            .resizable(true)
            .show(ctx, |ui| {
                for field in ParameterField::ALL {
                    let commit = if field.is_color() {
                        self.color_row(ui, store, field)
                    } else {
                        self.slider_row(ui, store, field)
                    };
                    if commit {
                        committed.push(field);
                    }
                }

                if let Some(report) = last_report {
                    ui.separator();
                    ui.label(format!(
                        "{} stars generated in {:.1} ms",
                        report.particle_count, report.elapsed_ms
                    ));
                }
            });

        for field in &committed {
            store.commit(*field);
        }
        committed
    }

    fn slider_row(
        &mut self,
        ui: &mut egui::Ui,
        store: &mut ParameterStore,
        field: ParameterField,
    ) -> bool {
        let descriptor = store.descriptor(field);
        let (Some(mut value), Some(bounds)) = (descriptor.value, descriptor.bounds) else {
            return false;
        };

        let mut slider = egui::Slider::new(&mut value, bounds.min..=bounds.max)
            .step_by(bounds.step)
            .text(field.label());
        if bounds.step >= 1.0 {
            slider = slider.integer();
        } else {
            slider = slider.max_decimals(decimals_for_step(bounds.step));
        }
        let response = ui.add(slider);

        if response.changed() {
            if let Err(err) = store.set_numeric(field, value) {
                tracing::warn!(target: "ui", "Rejected {} = {}: {}", field, value, err);
            }
        }
        self.tracker.observe(field, WidgetSignal::from_slider(&response))
    }

    fn color_row(
        &mut self,
        ui: &mut egui::Ui,
        store: &mut ParameterStore,
        field: ParameterField,
    ) -> bool {
        let current = match field {
            ParameterField::InsideColor => store.inside_color(),
            _ => store.outside_color(),
        };
        let mut srgb = current.to_u8();
        let changed = ui
            .horizontal(|ui| {
                let response = ui.color_edit_button_srgb(&mut srgb);
                ui.label(field.label());
                response.changed()
            })
            .inner;

        if changed {
            let [r, g, b] = srgb;
            let color = Rgb::from_u8(r, g, b);
            let result = match field {
                ParameterField::InsideColor => store.set_inside_color(color),
                _ => store.set_outside_color(color),
            };
            if let Err(err) = result {
                tracing::warn!(target: "ui", "Rejected {} = {}: {}", field, color, err);
            }
        }

        let pointer_down = ui.input(|i| i.pointer.any_down());
        self.tracker.observe(
            field,
            WidgetSignal {
                changed,
                interacting: pointer_down,
                finished: !pointer_down,
            },
        )
    }
}

/// 根据步长确定显示的小数位数
pub fn decimals_for_step(step: f64) -> usize {
    let mut decimals = 0;
    let mut scaled = step;
    while decimals < 6 && (scaled - scaled.round()).abs() > 1e-9 {
        scaled *= 10.0;
        decimals += 1;
    }
    decimals
}
