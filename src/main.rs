// ==========================================
// 清洁业务数据导入 - 命令行入口
// ==========================================
// 流程: .env → 日志 → 配置校验 → 打开工作簿 → 选择目标 → 流水线 → 报告
// 退出码: 0 运行结束（允许有跳过）/ 2 配置错误 / 1 工作簿或目标打开失败
// ==========================================

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use gleamops_import::config::{ConfigError, ImportConfig, TargetSpec};
use gleamops_import::domain::{ImportReport, Table};
use gleamops_import::engine::{ImportPipeline, PipelineOptions};
use gleamops_import::importer::open_workbook;
use gleamops_import::repository::{DataApi, RestDataApi, SqliteDataApi};
use gleamops_import::logging;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[command(name = "gleamops-import", version, about = "Excel 工作簿 → 多租户数据库 对账与批量装载")]
struct Cli {
    /// 仅重载指定表（逗号分隔，如 clients,sites）
    #[arg(long, value_delimiter = ',')]
    tables: Vec<String>,

    /// 写入本地 SQLite 文件而不是 REST 接口
    #[arg(long, value_name = "PATH")]
    sqlite: Option<PathBuf>,

    /// 演练: 写入内存 SQLite，不访问网络
    #[arg(long)]
    dry_run: bool,

    /// 运行报告 JSON 输出路径
    #[arg(long, value_name = "PATH")]
    report: Option<PathBuf>,

    /// 每批写入记录数（覆盖 IMPORT_BATCH_SIZE）
    #[arg(long)]
    batch_size: Option<usize>,

    /// 跳过装载前清理
    #[arg(long)]
    no_purge: bool,

    /// 工作簿路径（覆盖 EXCEL_PATH；目录表示 CSV 工作簿）
    #[arg(long, value_name = "PATH")]
    source: Option<PathBuf>,
}

fn main() -> ExitCode {
    // .env 可选
    let _ = dotenvy::dotenv();
    logging::init();

    let cli = Cli::parse();
    info!(version = gleamops_import::VERSION, "清洁业务数据导入启动");

    match run(cli) {
        Ok(report) => {
            print_summary(&report);
            ExitCode::SUCCESS
        }
        Err(err) => match err.downcast_ref::<ConfigError>() {
            Some(config_err) => {
                error!(error = %config_err, "配置错误");
                eprintln!("配置错误: {}", config_err);
                ExitCode::from(2)
            }
            None => {
                error!(error = %format!("{:#}", err), "导入失败");
                eprintln!("导入失败: {:#}", err);
                ExitCode::from(1)
            }
        },
    }
}

/// --tables 解析（未知表名视为配置错误）
fn parse_tables(raw: &[String]) -> Result<Option<Vec<Table>>, ConfigError> {
    if raw.is_empty() {
        return Ok(None);
    }
    raw.iter()
        .filter(|s| !s.trim().is_empty())
        .map(|s| {
            Table::parse(s).ok_or_else(|| ConfigError::InvalidValue {
                key: "--tables",
                value: s.clone(),
                reason: "未知表名".to_string(),
            })
        })
        .collect::<Result<Vec<_>, _>>()
        .map(Some)
}

fn run(cli: Cli) -> Result<ImportReport> {
    // ===== 配置校验（先于任何 I/O） =====
    let config = ImportConfig::from_env()?
        .with_source(cli.source.clone())
        .with_batch_size(cli.batch_size)?;
    let tables = parse_tables(&cli.tables)?;
    let target = config.target(cli.sqlite.as_deref(), cli.dry_run)?;
    let source = config.validate_source()?;

    info!(
        tenant = %config.tenant_id,
        source = %source.display(),
        batch_size = config.batch_size,
        "配置已加载"
    );

    // ===== 打开工作簿与目标 =====
    let mut workbook = open_workbook(source)
        .with_context(|| format!("无法打开工作簿 {}", source.display()))?;

    let api: Arc<dyn DataApi> = match &target {
        TargetSpec::Rest { url, service_key } => {
            Arc::new(RestDataApi::new(url, service_key).context("无法创建 REST 客户端")?)
        }
        TargetSpec::Sqlite(path) => {
            let path_str = path.to_string_lossy();
            Arc::new(
                SqliteDataApi::open(&path_str)
                    .with_context(|| format!("无法打开 SQLite 目标 {}", path.display()))?,
            )
        }
        TargetSpec::DryRun => {
            Arc::new(SqliteDataApi::in_memory().context("无法创建内存演练目标")?)
        }
    };
    info!(target = %api.describe(), "写入目标已就绪");

    let mut options = PipelineOptions::new(config.tenant_id, Local::now().date_naive());
    options.tables = tables;
    options.purge = !cli.no_purge;
    options.dry_run = cli.dry_run;

    // ===== 执行流水线 =====
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("无法创建异步运行时")?;

    let pipeline = ImportPipeline::new(api, config.batch_size, options);
    let report = runtime.block_on(pipeline.run(workbook.as_mut()))?;

    if let Some(path) = &cli.report {
        write_report(&report, path)?;
    }
    Ok(report)
}

fn write_report(report: &ImportReport, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(report).context("运行报告序列化失败")?;
    std::fs::write(path, json)
        .with_context(|| format!("无法写入运行报告 {}", path.display()))?;
    info!(path = %path.display(), "运行报告已写入");
    Ok(())
}

fn print_summary(report: &ImportReport) {
    println!("运行 {}（租户 {}）", report.run_id, report.tenant_id);
    for summary in &report.tables {
        println!(
            "  {:<26} 行 {:>5}  尝试 {:>5}  写入 {:>5}  跳过 {:>4}",
            summary.table.as_str(),
            summary.source_rows,
            summary.attempted,
            summary.inserted,
            summary.skipped.len()
        );
    }
    for seq in &report.sequences {
        println!("  序列 {} = {}{}", seq.prefix, seq.value, if seq.persisted { "" } else { "（未写入）" });
    }
    println!(
        "合计写入 {}，跳过 {}，告警 {}，耗时 {} ms",
        report.total_inserted(),
        report.total_skipped(),
        report.warnings.len(),
        report.elapsed_ms
    );
    if report.failed_purge_steps() > 0 {
        warn!(failed = report.failed_purge_steps(), "部分清理步骤失败");
    }
}
