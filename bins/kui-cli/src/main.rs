//! kui - 图像信息探测工具
//!
//! 从文件或 URL 嗅探图像头部, 输出格式、MIME 与像素尺寸, 不做解码.

use clap::Parser;
use serde::Serialize;
use std::process;

use kui_core::ImageInfo;

/// Kui 图像信息探测工具
#[derive(Parser, Debug)]
#[command(name = "kui", version, about = "纯 Rust 图像信息探测工具")]
struct Cli {
    /// 输入 (文件路径或 http/https URL, 可多个)
    inputs: Vec<String>,

    /// 输出 JSON 格式
    #[arg(long)]
    json: bool,

    /// 静默模式 (只输出探测结果)
    #[arg(short, long)]
    quiet: bool,
}

// ============================================================
// JSON 输出结构体
// ============================================================

/// 单个输入的探测结果
#[derive(Serialize)]
struct ProbeOutput {
    input: String,
    format: String,
    mime: String,
    width: u32,
    height: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    width_units: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    height_units: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    orientation: Option<u8>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    variants: Vec<VariantOutput>,
}

/// 图标容器的一个尺寸变体
#[derive(Serialize)]
struct VariantOutput {
    width: u32,
    height: u32,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if cli.inputs.is_empty() {
        print_banner();
        return;
    }

    if !cli.quiet {
        eprintln!(
            "kui 版本 {} -- 纯 Rust 图像信息探测工具",
            env!("CARGO_PKG_VERSION")
        );
    }

    let mut failed = false;
    let mut outputs = Vec::new();

    for input in &cli.inputs {
        match probe_input(input) {
            Ok(info) => {
                if cli.json {
                    outputs.push(build_output(input, &info));
                } else {
                    print_text(input, &info, cli.inputs.len() > 1);
                }
            }
            Err(e) => {
                eprintln!("错误: 无法探测 '{input}': {e}");
                failed = true;
            }
        }
    }

    if cli.json && !outputs.is_empty() {
        let json = serde_json::to_string_pretty(&outputs).unwrap();
        println!("{json}");
    }

    if failed {
        process::exit(1);
    }
}

/// 按输入形态选择数据源: URL 走 HTTP, 其余按本地文件处理
fn probe_input(input: &str) -> kui_core::KuiResult<ImageInfo> {
    let result = if input.starts_with("http://") || input.starts_with("https://") {
        kui_probe::probe_url(input)
    } else {
        kui_probe::probe_file(input)
    };
    if let Ok(info) = &result {
        log::debug!("{input}: {info}");
    }
    result
}

/// 从 ImageInfo 构建 JSON 输出
fn build_output(input: &str, info: &ImageInfo) -> ProbeOutput {
    let unit = |u: kui_core::Units| {
        if u == kui_core::Units::Px {
            None
        } else {
            Some(u.as_str().to_string())
        }
    };
    ProbeOutput {
        input: input.to_string(),
        format: info.format.to_string(),
        mime: info.mime.to_string(),
        width: info.width,
        height: info.height,
        width_units: unit(info.width_units),
        height_units: unit(info.height_units),
        orientation: info.orientation,
        variants: info
            .variants
            .iter()
            .map(|v| VariantOutput {
                width: v.width,
                height: v.height,
            })
            .collect(),
    }
}

/// 文本格式输出
fn print_text(input: &str, info: &ImageInfo, show_input: bool) {
    if show_input {
        println!("== {input} ==");
    }
    println!("格式:     {}", info.format);
    println!("MIME:     {}", info.mime);
    println!(
        "尺寸:     {}{} x {}{}",
        info.width,
        if info.width_units == kui_core::Units::Px {
            String::new()
        } else {
            info.width_units.to_string()
        },
        info.height,
        if info.height_units == kui_core::Units::Px {
            String::new()
        } else {
            info.height_units.to_string()
        },
    );
    if let Some(o) = info.orientation {
        println!("方向:     {o}");
    }
    if !info.variants.is_empty() {
        let list = info
            .variants
            .iter()
            .map(|v| format!("{}x{}", v.width, v.height))
            .collect::<Vec<_>>()
            .join(", ");
        println!("变体:     {list}");
    }
}

fn print_banner() {
    println!("kui {} -- 纯 Rust 图像信息探测工具", env!("CARGO_PKG_VERSION"));
    println!();
    println!("用法: kui [选项] <输入>...");
    println!();
    println!("输入可以是本地文件路径或 http/https URL.");
    println!("支持的格式: avif/heic/heif, bmp, dds, gif, icns, ico/cur,");
    println!("            jpeg, png, psd, svg, tiff, webp");
    println!();
    println!("运行 `kui --help` 查看全部选项.");
}
