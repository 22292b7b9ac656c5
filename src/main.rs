use std::path::PathBuf;
use std::process;
use std::str::FromStr;
use std::sync::Arc;
use clap::{Parser, Subcommand};
use log::LevelFilter;
use thiserror::Error;
use screenwright::api::{self, ExportError, ExportFormat};
use screenwright::models::{Conf, ScreenplayId, StateId};
use screenwright::store::{JsonFileStore, ScreenplayStore, StoreError};
use screenwright::workflow::{TransitionOutcome, WorkflowMachine};

/// 剧本工作流命令行
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// 项目文件（JSON）
    #[arg(short, long, default_value = "screenwright.json")]
    store: PathBuf,

    /// 导出配置（JSON）
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// 日志级别 (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 解析 Fountain 文件并输出段落
    Parse {
        file: PathBuf,
        /// 输出完整的 JSON
        #[arg(long)]
        json: bool,
    },
    /// 新建剧本
    Create { title: String },
    /// 查看剧本所处阶段和各阶段守卫
    Status { id: ScreenplayId },
    /// 切换阶段，默认进入下一阶段
    Advance {
        id: ScreenplayId,
        /// 目标阶段，如 S3 或 S3_TURNING_POINTS
        #[arg(long)]
        to: Option<String>,
    },
    /// 导出剧本
    Export {
        id: ScreenplayId,
        /// fountain, fdx, pdf, beats, characters；不指定时全部导出
        #[arg(short, long)]
        format: Option<String>,
        /// 输出目录
        #[arg(short, long, default_value = ".")]
        out: PathBuf,
        /// 打成一个 zip
        #[arg(long)]
        bundle: bool,
    },
}

#[derive(Error, Debug)]
enum CliError {
    #[error("{0}")]
    Store(#[from] StoreError),

    #[error("{0}")]
    Export(#[from] ExportError),

    #[error("IO错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("未知阶段: {0}")]
    UnknownState(String),

    #[error("未知导出格式: {0}")]
    UnknownFormat(String),

    #[error("{0} 已是最后阶段")]
    NoNextState(StateId),

    #[error("导出失败: {0}")]
    ExportFailed(String),
}

async fn run(args: Args) -> Result<(), CliError> {
    let conf = match &args.config {
        Some(path) => Conf::from_json_file(path)?,
        None => Conf::default(),
    };

    if let Command::Parse { file, json } = &args.command {
        let text = tokio::fs::read_to_string(file).await?;
        if *json {
            println!("{}", api::parse_fountain_json(&text)?);
        } else {
            for paragraph in api::parse_fountain_text(&text).paragraphs {
                println!("{:<16} {}", paragraph.kind().as_str(), paragraph.text().unwrap_or(""));
            }
        }
        return Ok(());
    }

    let store: Arc<dyn ScreenplayStore> = Arc::new(JsonFileStore::open(&args.store).await?);
    let machine = WorkflowMachine::new(store.clone());

    match args.command {
        Command::Parse { .. } => {}
        Command::Create { title } => {
            let sp = store.create(&title).await?;
            println!("{}\t{}", sp.id, sp.title);
        }
        Command::Status { id } => {
            let sp = store.get(id).await?;
            let snapshot = api::snapshot(&sp);
            println!("{} ({})", conf.display_title(&sp.title), sp.current_state);
            println!(
                "场景 {}，已起草 {}，关键场景 {}",
                snapshot.scenes, snapshot.drafted, snapshot.keys
            );
            for stage in machine.report(id).await? {
                let mark = if stage.stage == sp.current_state {
                    ">"
                } else if stage.reachable {
                    " "
                } else {
                    "x"
                };
                println!("{} {:<20} {}", mark, stage.stage.as_str(), stage.hint.unwrap_or_default());
            }
        }
        Command::Advance { id, to } => {
            let target = match to {
                Some(name) => StateId::parse(&name).ok_or(CliError::UnknownState(name))?,
                None => {
                    let current = machine.current_state(id).await?;
                    current.next().ok_or(CliError::NoNextState(current))?
                }
            };
            match machine.request_transition(id, target).await? {
                TransitionOutcome::Entered(state) => println!("进入 {}", state),
                TransitionOutcome::Rejected(failure) => {
                    println!("{}", failure);
                    process::exit(2);
                }
            }
        }
        Command::Export { id, format, out, bundle } => {
            let sp = store.get(id).await?;
            if bundle {
                let bytes = api::export_bundle(&sp, &conf).await?;
                tokio::fs::create_dir_all(&out).await?;
                let path = out.join(api::bundle_file_name(&sp, &conf));
                tokio::fs::write(&path, bytes).await?;
                println!("{}", path.display());
                return Ok(());
            }
            let formats = match format {
                Some(name) => vec![ExportFormat::parse(&name).ok_or(CliError::UnknownFormat(name))?],
                None => ExportFormat::ALL.to_vec(),
            };
            for format in formats {
                let report = api::export_to_dir(&sp, format, &out, &conf).await;
                if !report.success {
                    return Err(CliError::ExportFailed(report.message));
                }
                println!("{}", report.file_path.unwrap_or_default());
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let log_level = LevelFilter::from_str(&args.log_level).unwrap_or_else(|_| {
        eprintln!("无效的日志级别: {}，使用 warn", args.log_level);
        LevelFilter::Warn
    });
    env_logger::Builder::from_env(env_logger::Env::default())
        .filter_level(log_level)
        .init();
    log::debug!("参数: {:?}", args);

    if let Err(e) = run(args).await {
        log::error!("{}", e);
        eprintln!("错误: {}", e);
        process::exit(1);
    }
}
