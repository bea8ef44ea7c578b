//! 控制台进度条
//!
//! 一个总进度条和一个当前文件的步骤进度条，通过 `MultiProgress` 叠放显示。

use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};

const BAR_TEMPLATE: &str =
    "{msg:<28} {percent:>3}%|{wide_bar:.cyan/blue}| {pos}/{len} [{elapsed_precise}<{eta}]";

/// 批处理进度显示
pub struct BatchProgress {
    multi: MultiProgress,
    hidden: bool,
}

impl BatchProgress {
    /// 绘制到 stderr
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::with_draw_target(ProgressDrawTarget::stderr()),
            hidden: false,
        }
    }

    /// 不绘制任何内容，也不输出状态信息
    pub fn hidden() -> Self {
        Self {
            multi: MultiProgress::with_draw_target(ProgressDrawTarget::hidden()),
            hidden: true,
        }
    }

    /// 添加总进度条
    pub fn overall(&self, len: u64, description: &str) -> ProgressBar {
        self.add_bar(len, description)
    }

    /// 添加当前文件的步骤进度条（总是位于最下方）
    pub fn step(&self, len: u64, description: &str) -> ProgressBar {
        self.add_bar(len, description)
    }

    fn add_bar(&self, len: u64, description: &str) -> ProgressBar {
        let bar = self.multi.add(ProgressBar::new(len));
        bar.set_style(bar_style());
        bar.set_message(description.to_string());
        bar
    }

    /// 在进度条上方输出一行状态信息
    pub fn println(&self, message: impl AsRef<str>) {
        if self.hidden {
            return;
        }
        self.multi.suspend(|| println!("{}", message.as_ref()));
    }
}

impl Default for BatchProgress {
    fn default() -> Self {
        Self::new()
    }
}

fn bar_style() -> ProgressStyle {
    ProgressStyle::with_template(BAR_TEMPLATE)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("##-")
}
