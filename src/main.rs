//! # PNG 分辨率导出工具：命令行入口
//!
//! 本文件仅负责参数解析、配置装配与结果输出。
//! 业务逻辑分布在各子模块中，详见 `lib.rs` 架构文档。

use std::path::PathBuf;

use clap::Parser;
use png_dpi_export::error::AppError;
use png_dpi_export::png_export::{ExportReceipt, ExportSource, FileSink, PngExporter};
use png_dpi_export::{settings, storage};
use serde::Serialize;

/// 为 PNG 写入与设备像素比相符的 pHYs 分辨率信息并导出。
#[derive(Debug, Parser, PartialEq)]
#[command(name = "png-dpi-export", version)]
struct Cli {
    /// 输入文件：PNG，或内容为 `data:image/png;base64,...` 的文本文件。
    input: PathBuf,

    /// 设备像素比；缺省时使用设置文件中的值。
    #[arg(long, value_name = "RATIO", value_parser = parse_ratio)]
    dpr: Option<f64>,

    /// 导出目录，覆盖设置文件中的 `output_dir`。
    #[arg(long = "out", value_name = "DIR")]
    out_dir: Option<PathBuf>,

    /// JSON 设置文件。
    #[arg(long = "config", value_name = "PATH")]
    config_path: Option<PathBuf>,

    /// 未能写入分辨率时以失败退出，而不是导出原图。
    #[arg(long)]
    strict: bool,

    /// 把数据 URI 打印到标准输出，不写文件。
    #[arg(long)]
    stdout: bool,
}

#[derive(Serialize)]
struct CliReport {
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    receipt: Option<ExportReceipt>,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<AppError>,
}

fn parse_ratio(value: &str) -> Result<f64, String> {
    let dpr: f64 = value
        .parse()
        .map_err(|_| format!("无效的倍率: {}", value))?;
    if dpr.is_finite() && dpr > 0.0 {
        Ok(dpr)
    } else {
        Err(format!("倍率必须为正数: {}", value))
    }
}

fn run(cli: Cli) -> Result<Option<ExportReceipt>, AppError> {
    let mut config = match &cli.config_path {
        Some(path) => settings::load_export_config(path)?.unwrap_or_default(),
        None => Default::default(),
    };
    if cli.strict {
        config.strict = true;
    }
    if cli.out_dir.is_some() {
        config.output_dir = cli.out_dir.clone();
    }

    let exporter = PngExporter::new(config.clone())?;
    let source = ExportSource::FilePath(cli.input);

    if cli.stdout {
        let outcome = exporter.prepare(source, cli.dpr)?;
        println!("{}", outcome.data_uri);
        return Ok(None);
    }

    let dir = storage::get_export_dir(config.output_dir.as_deref())?;
    let sink = FileSink::new(dir);
    let receipt = exporter.export(source, cli.dpr, &sink)?;
    Ok(Some(receipt))
}

fn print_report(report: &CliReport) {
    match serde_json::to_string_pretty(report) {
        Ok(json) => println!("{}", json),
        Err(err) => log::error!("序列化报告失败: {}", err),
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(Some(receipt)) => print_report(&CliReport {
            ok: true,
            receipt: Some(receipt),
            code: None,
            error: None,
        }),
        Ok(None) => {}
        Err(err) => {
            log::error!("导出失败: {}", err);
            print_report(&CliReport {
                ok: false,
                receipt: None,
                code: Some(err.code()),
                error: Some(err),
            });
            std::process::exit(1);
        }
    }
}
