/// 日志工具模块
///
/// 提供日志格式化和输出的辅助函数
use tracing::info;

/// 记录程序启动信息
///
/// # 参数
/// - `inputs`: 输入路径数量
/// - `markers`: 标记配置文件（未指定时使用默认标记）
pub fn log_startup(inputs: usize, markers: Option<&str>) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 题目批量解析模式");
    info!("📂 输入路径数: {}", inputs);
    info!("🏷️ 标记配置: {}", markers.unwrap_or("默认"));
    info!("{}", "=".repeat(60));
}

/// 记录文件加载信息
pub fn log_files_loaded(total: usize, lines: usize) {
    info!("✓ 找到 {} 个待解析的文件，共 {} 行", total, lines);
}

/// 记录单个文件的解析结果
///
/// # 参数
/// - `file_index`: 文件编号（从1开始）
/// - `name`: 文件名
/// - `found`: 本文件解析出的题目数
pub fn log_file_parsed(file_index: usize, name: &str, found: usize) {
    info!("[文件 {}] {} - 解析出 {} 道题目", file_index, name, found);
}

/// 打印最终统计信息
///
/// # 参数
/// - `parsed`: 成功解析的文件数
/// - `failed`: 解析失败的文件数
/// - `questions`: 题目总数
/// - `warnings`: 属性校验警告数
pub fn print_final_stats(parsed: usize, failed: usize, questions: usize, warnings: usize) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 成功: {}/{}", parsed, parsed + failed);
    info!("❌ 失败: {}", failed);
    info!("📝 题目: {}", questions);
    info!("⚠️ 警告: {}", warnings);
    info!("{}", "=".repeat(60));
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度（字符数）
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}

/// 带前缀的截断，连续空白会被压缩成一个空格
///
/// 前缀也计入长度
pub fn truncate_with_prefix(prefix: &str, text: &str, max_len: usize) -> String {
    let squeezed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    truncate_text(&format!("{}{}", prefix, squeezed), max_len)
}
