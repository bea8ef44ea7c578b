//! 启动画面

use console::Term;
use std::io;

/// 标题区宽度（字符）
pub const BANNER_WIDTH: usize = 50;

/// 清空终端并将光标移到左上角；输出被重定向时不做任何事
pub fn clear_screen(term: &Term) -> io::Result<()> {
    if !term.is_term() {
        return Ok(());
    }
    term.clear_screen()
}

/// 居中标题加一行分隔线
pub fn title_lines(version: &str) -> String {
    let title = format!("CAD File Convert ver. {}", version);
    format!(
        "{:^width$}\n{}",
        title,
        "=".repeat(BANNER_WIDTH),
        width = BANNER_WIDTH
    )
}

pub fn print_title(version: &str) {
    println!("{}", title_lines(version));
}
