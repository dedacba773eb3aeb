use std::io::{Read, Write};
use std::process;

use comm_adapters::PipelineKind;
use commflow_rust::{AppError, ChatRequest, ChatService, RevealSchedule, WorkerConfig};

const USAGE: &str = "Uso: commflow [--pipeline check-en|baseline] [--paced] [--describe] <mensaje...>";

#[derive(Debug, Default, PartialEq, Eq)]
struct CliArgs {
    pipeline: PipelineKind,
    paced: bool,
    describe: bool,
    message: Option<String>,
}

fn parse_args(args: &[String]) -> Result<CliArgs, AppError> {
    let mut cli = CliArgs::default();
    let mut words: Vec<&str> = Vec::new();
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--pipeline" => {
                i += 1;
                let name = args.get(i)
                               .ok_or_else(|| AppError::Usage("--pipeline requires a value".into()))?;
                cli.pipeline = name.parse().map_err(|e| AppError::Usage(format!("{e}")))?;
            }
            "--paced" => cli.paced = true,
            "--describe" => cli.describe = true,
            "-h" | "--help" => return Err(AppError::Usage("help requested".into())),
            flag if flag.starts_with("--") => return Err(AppError::Usage(format!("unknown flag {flag}"))),
            word => words.push(word),
        }
        i += 1;
    }
    if !words.is_empty() {
        cli.message = Some(words.join(" "));
    }
    Ok(cli)
}

fn init_logging() {
    // default level is warn; RUST_LOG lo sobreescribe
    env_logger::Builder::new().format(|buf, record| {
                                  writeln!(buf,
                                           "{} - {} - {}",
                                           chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                                           record.level(),
                                           record.args())
                              })
                              .filter(None, log::LevelFilter::Warn)
                              .parse_env("RUST_LOG")
                              .init();
}

async fn run() -> Result<i32, AppError> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let cli = parse_args(&args)?;
    let config = WorkerConfig::from_env()?;

    if cli.describe {
        let snapshot = cli.pipeline.build(config.strictness())?.describe();
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
        return Ok(0);
    }

    let message = match cli.message {
        Some(message) => message,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };
    if message.trim().is_empty() {
        return Err(AppError::Usage("empty message".into()));
    }

    let service = ChatService::from_config(cli.pipeline, &config)?;
    match service.respond(&ChatRequest::new(message.trim())).await {
        Ok(output) if cli.paced => {
            let schedule = match cli.pipeline {
                PipelineKind::CheckEn => RevealSchedule::check_en(),
                PipelineKind::Baseline => RevealSchedule::baseline(),
            };
            schedule.play(&output, |reveal| println!("[{}]\n{}\n", reveal.role, reveal.text))
                    .await;
            Ok(0)
        }
        Ok(output) => {
            println!("{}", serde_json::to_string_pretty(&output)?);
            Ok(0)
        }
        Err(failure) => {
            log::error!("[commflow] {} invocation failed: {}", service.pipeline().id(), failure.detail);
            println!("{}", serde_json::to_string_pretty(&failure)?);
            Ok(4)
        }
    }
}

#[tokio::main]
async fn main() {
    init_logging();
    match run().await {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("[commflow] {e}");
            if matches!(e, AppError::Usage(_)) {
                eprintln!("{USAGE}");
            }
            process::exit(e.exit_code());
        }
    }
}
