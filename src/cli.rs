use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde_json::Value;
use tracing::debug;

use ruflow::auth::{ApiKeyLocation, AuthConfig};
use ruflow::history::{self, HistorySink, HistoryStorage, NoHistory};
use ruflow::http::{Method, ReqwestTransport, RequestOptions};
use ruflow::model::{Collection, Workflow};
use ruflow::runner::{CollectionRunner, Reporter, RequestExecutor, ScopeInputs, WorkflowEngine};
use ruflow::variable::{ConfigLoader, VariableConfig, Variables};

pub type Result<T> = std::result::Result<T, anyhow::Error>;

#[derive(Parser, Debug)]
#[command(name = "ruflow", author, version, about, long_about = None)]
pub struct Cli {
    /// 输出调试日志与完整响应
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// 指定配置文件，默认查找 ruflow.toml
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// 不记录请求历史
    #[arg(long, global = true)]
    pub no_history: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// 运行集合中的所有请求
    Run {
        /// 集合 JSON 文件
        collection: PathBuf,

        #[command(flatten)]
        vars: VarArgs,
    },

    /// 工作流（带变量捕获的顺序请求）
    #[command(alias = "wf")]
    Workflow {
        #[command(subcommand)]
        command: WorkflowCommand,
    },

    /// 发送单个请求
    Request(RequestArgs),

    /// 请求历史，不带子命令时列出最近的记录
    History {
        /// 显示条数
        #[arg(short = 'n', long, default_value_t = 20)]
        limit: usize,

        #[command(subcommand)]
        command: Option<HistoryCommand>,
    },
}

#[derive(Subcommand, Debug)]
pub enum HistoryCommand {
    /// 列出最近的记录
    #[command(alias = "ls")]
    List {
        #[arg(short = 'n', long, default_value_t = 20)]
        limit: usize,
    },

    /// 查看记录详情，ID 可以是唯一前缀
    Show { id: String },

    /// 按 URL 或方法搜索
    Search { query: String },

    /// 删除单条记录
    #[command(alias = "rm")]
    Delete { id: String },

    /// 清空全部记录
    Clear,

    /// 重新发送历史中的请求
    #[command(alias = "rerun")]
    Replay { id: String },
}

#[derive(Subcommand, Debug)]
pub enum WorkflowCommand {
    /// 执行工作流文件
    #[command(alias = "execute")]
    Run {
        file: PathBuf,

        #[command(flatten)]
        vars: VarArgs,
    },

    /// 生成工作流模板
    Create {
        name: String,

        /// 输出文件，默认 `<name>.workflow.json`
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// 覆盖已存在的文件
        #[arg(long)]
        force: bool,
    },
}

#[derive(Args, Debug, Clone, Default)]
pub struct VarArgs {
    /// 使用的环境
    #[arg(short = 'e', long = "env")]
    pub env: Option<String>,

    /// 全局变量 key=value，可重复
    #[arg(long = "var", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub vars: Vec<(String, String)>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum ApiKeyIn {
    Header,
    Query,
}

#[derive(Args, Debug)]
pub struct RequestArgs {
    /// HTTP 方法
    pub method: String,

    pub url: String,

    /// 请求头 'Name: Value'，可重复
    #[arg(short = 'H', long = "header", value_name = "HEADER")]
    pub headers: Vec<String>,

    /// 查询参数 key=value，可重复
    #[arg(short = 'q', long = "query", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub query: Vec<(String, String)>,

    /// 请求体，合法 JSON 按 JSON 发送，否则按原始文本发送
    #[arg(short = 'd', long = "data")]
    pub data: Option<String>,

    #[command(flatten)]
    pub vars: VarArgs,

    /// 超时（毫秒）
    #[arg(long)]
    pub timeout: Option<u64>,

    /// 跳过 TLS 证书校验
    #[arg(long)]
    pub insecure: bool,

    /// 不跟随重定向
    #[arg(long)]
    pub no_follow: bool,

    #[arg(long)]
    pub max_redirects: Option<usize>,

    #[arg(long, group = "auth")]
    pub bearer: Option<String>,

    /// user:password
    #[arg(long, group = "auth", value_name = "USER:PASS")]
    pub basic: Option<String>,

    #[arg(long, group = "auth")]
    pub api_key: Option<String>,

    #[arg(long, default_value = "X-API-Key")]
    pub api_key_name: String,

    #[arg(long, value_enum, default_value_t = ApiKeyIn::Header)]
    pub api_key_in: ApiKeyIn,
}

fn parse_key_value(s: &str) -> std::result::Result<(String, String), String> {
    ConfigLoader::parse_cli_var(s).ok_or_else(|| format!("expected KEY=VALUE, got '{}'", s))
}

/// 命令行参数校验后的运行配置
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub environment: Option<String>,
    pub globals: Variables,
}

impl RunSettings {
    pub fn new(config: &VariableConfig, vars: &VarArgs) -> Self {
        Self {
            environment: vars.env.clone().filter(|e| !e.is_empty()),
            globals: ConfigLoader::build_globals(config, &vars.vars),
        }
    }
}

impl RequestArgs {
    /// 转换为请求描述
    pub fn to_options(&self) -> Result<RequestOptions> {
        let method: Method = self.method.parse()?;
        let mut options = RequestOptions::new(method, self.url.clone());

        for header in &self.headers {
            let (key, value) = header
                .split_once(':')
                .with_context(|| format!("Invalid header '{}', expected 'Name: Value'", header))?;
            let key = key.trim();
            if key.is_empty() {
                bail!("Invalid header '{}', name is empty", header);
            }
            options.headers.insert(key.to_string(), value.trim().to_string());
        }

        options.params.extend(self.query.iter().cloned());

        options.body = self.data.as_ref().map(|data| {
            serde_json::from_str::<Value>(data).unwrap_or_else(|_| Value::String(data.clone()))
        });
        options.timeout = self.timeout;
        options.follow_redirects = !self.no_follow;
        options.max_redirects = self.max_redirects;
        options.reject_unauthorized = !self.insecure;
        options.auth = self.auth()?;

        Ok(options)
    }

    fn auth(&self) -> Result<Option<AuthConfig>> {
        if let Some(token) = &self.bearer {
            return Ok(Some(AuthConfig::bearer(token.clone())));
        }
        if let Some(credentials) = &self.basic {
            let (user, pass) = credentials
                .split_once(':')
                .context("--basic expects USER:PASS")?;
            return Ok(Some(AuthConfig::basic(user, pass)));
        }
        if let Some(key) = &self.api_key {
            let location = match self.api_key_in {
                ApiKeyIn::Header => ApiKeyLocation::Header,
                ApiKeyIn::Query => ApiKeyLocation::Query,
            };
            return Ok(Some(AuthConfig::api_key(
                key.clone(),
                Some(self.api_key_name.clone()),
                location,
            )));
        }
        Ok(None)
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<VariableConfig> {
    match path {
        Some(path) => ConfigLoader::load_from_path(path)
            .with_context(|| format!("Failed to load config {}", path.display())),
        None => Ok(ConfigLoader::find_and_load().unwrap_or_default()),
    }
}

fn build_executor(cli: &Cli, config: VariableConfig) -> Result<RequestExecutor> {
    let history: Arc<dyn HistorySink> = if cli.no_history {
        Arc::new(NoHistory)
    } else {
        Arc::new(HistoryStorage::new())
    };
    let transport = ReqwestTransport::new()?;
    Ok(RequestExecutor::new(
        Arc::new(transport),
        Arc::new(config),
        history,
    ))
}

async fn run_history(
    cli: &Cli,
    reporter: &Reporter,
    limit: usize,
    command: Option<&HistoryCommand>,
) -> Result<ExitCode> {
    let storage = HistoryStorage::new();

    match command {
        None => history::list_history(&storage, limit)?,
        Some(HistoryCommand::List { limit }) => history::list_history(&storage, *limit)?,
        Some(HistoryCommand::Show { id }) => history::show_history(&storage, id)?,
        Some(HistoryCommand::Search { query }) => history::search_history(&storage, query)?,
        Some(HistoryCommand::Delete { id }) => {
            let entry = history::find_entry(&storage, id)?;
            storage.delete(&entry.id)?;
            println!("✓ Deleted history entry {}", entry.short_id());
        }
        Some(HistoryCommand::Clear) => {
            storage.clear()?;
            println!("✓ History cleared");
        }
        Some(HistoryCommand::Replay { id }) => {
            let entry = history::find_entry(&storage, id)?;
            let options = entry.request.to_options()?;
            println!("Replaying {} {}", entry.request.method, entry.request.url);
            println!(
                "  Original: {}",
                entry.timestamp.format("%Y-%m-%d %H:%M:%S")
            );

            // 快照已是解析后的请求，不再加载环境和全局变量
            let executor = build_executor(cli, VariableConfig::default())?;
            let outcome = executor
                .execute_request(&options, None, None, ScopeInputs::new())
                .await?;
            reporter.print_request(&outcome);
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn exit_code(success: bool) -> ExitCode {
    if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

pub async fn run(cli: Cli) -> Result<ExitCode> {
    let reporter = Reporter::new(cli.verbose);

    match &cli.command {
        Commands::History { limit, command } => run_history(&cli, &reporter, *limit, command.as_ref()).await,
        Commands::Workflow {
            command:
                WorkflowCommand::Create {
                    name,
                    output,
                    force,
                },
        } => {
            let path = output
                .clone()
                .unwrap_or_else(|| PathBuf::from(Workflow::template_file_name(name)));
            if path.exists() && !force {
                bail!("{} already exists, use --force to overwrite", path.display());
            }

            let template = Workflow::template(name);
            template.save_to_path(&path)?;
            println!("✓ Workflow template created");
            println!("  File: {}", path.display());
            println!("  Steps: {}", template.steps.len());
            println!("  Run it with: ruflow workflow run {}", path.display());
            Ok(ExitCode::SUCCESS)
        }
        Commands::Workflow {
            command: WorkflowCommand::Run { file, vars },
        } => {
            let workflow = Workflow::load_from_path(file)?;
            let config = load_config(cli.config.as_ref())?;
            let settings = RunSettings::new(&config, vars);
            debug!(?settings, "Workflow run settings");

            let engine = WorkflowEngine::new(build_executor(&cli, config)?);
            let result = engine
                .execute_workflow(
                    &workflow,
                    settings.environment.as_deref(),
                    Some(&settings.globals),
                )
                .await;
            reporter.print_workflow(&result);
            Ok(exit_code(result.success))
        }
        Commands::Run { collection, vars } => {
            let collection = Collection::load_from_path(collection)?;
            let config = load_config(cli.config.as_ref())?;
            let settings = RunSettings::new(&config, vars);
            debug!(?settings, "Collection run settings");

            let runner = CollectionRunner::new(build_executor(&cli, config)?);
            let result = runner
                .run_collection(
                    &collection,
                    settings.environment.as_deref(),
                    Some(&settings.globals),
                )
                .await;
            reporter.print_collection(&result);
            Ok(exit_code(result.success()))
        }
        Commands::Request(args) => {
            let options = args.to_options()?;
            let config = load_config(cli.config.as_ref())?;
            let settings = RunSettings::new(&config, &args.vars);

            let executor = build_executor(&cli, config)?;
            let outcome = executor
                .execute_request(
                    &options,
                    settings.environment.as_deref(),
                    None,
                    ScopeInputs::new().global(&settings.globals),
                )
                .await?;
            reporter.print_request(&outcome);
            Ok(ExitCode::SUCCESS)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    fn request_args(args: &[&str]) -> RequestArgs {
        let mut full = vec!["ruflow", "request"];
        full.extend_from_slice(args);
        match parse(&full).command {
            Commands::Request(args) => args,
            other => panic!("Expected request command, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_run() {
        let cli = parse(&["ruflow", "run", "api.json", "-e", "dev", "--var", "a=1", "--var", "b=x=y", "-v"]);
        assert!(cli.verbose);
        match cli.command {
            Commands::Run { collection, vars } => {
                assert_eq!(collection, PathBuf::from("api.json"));
                assert_eq!(vars.env.as_deref(), Some("dev"));
                assert_eq!(
                    vars.vars,
                    vec![
                        ("a".to_string(), "1".to_string()),
                        ("b".to_string(), "x=y".to_string())
                    ]
                );
            }
            other => panic!("Unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_invalid_var_rejected() {
        assert!(Cli::try_parse_from(["ruflow", "run", "a.json", "--var", "novalue"]).is_err());
        assert!(Cli::try_parse_from(["ruflow", "run", "a.json", "--var", "=v"]).is_err());
    }

    #[test]
    fn test_parse_workflow_alias() {
        let cli = parse(&["ruflow", "wf", "run", "flow.json", "--no-history"]);
        assert!(cli.no_history);
        assert!(matches!(
            cli.command,
            Commands::Workflow {
                command: WorkflowCommand::Run { .. }
            }
        ));

        let cli = parse(&["ruflow", "workflow", "create", "My Flow", "-o", "x.json"]);
        match cli.command {
            Commands::Workflow {
                command: WorkflowCommand::Create { name, output, force },
            } => {
                assert_eq!(name, "My Flow");
                assert_eq!(output, Some(PathBuf::from("x.json")));
                assert!(!force);
            }
            other => panic!("Unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_history_default_limit() {
        match parse(&["ruflow", "history"]).command {
            Commands::History { limit, command } => {
                assert_eq!(limit, 20);
                assert!(command.is_none());
            }
            other => panic!("Unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_history_subcommands() {
        let history_command = |args: &[&str]| -> HistoryCommand {
            let mut full = vec!["ruflow", "history"];
            full.extend_from_slice(args);
            match parse(&full).command {
                Commands::History {
                    command: Some(command),
                    ..
                } => command,
                other => panic!("Unexpected command {:?}", other),
            }
        };

        assert!(matches!(history_command(&["ls", "-n", "5"]), HistoryCommand::List { limit: 5 }));
        assert!(matches!(history_command(&["show", "abc123"]), HistoryCommand::Show { id } if id == "abc123"));
        assert!(matches!(history_command(&["search", "users"]), HistoryCommand::Search { query } if query == "users"));
        assert!(matches!(history_command(&["rm", "abc"]), HistoryCommand::Delete { .. }));
        assert!(matches!(history_command(&["clear"]), HistoryCommand::Clear));
        assert!(matches!(history_command(&["rerun", "abc"]), HistoryCommand::Replay { id } if id == "abc"));
        assert!(Cli::try_parse_from(["ruflow", "history", "show"]).is_err());
    }

    #[test]
    fn test_request_to_options() {
        let args = request_args(&[
            "post",
            "https://api.test/users",
            "-H",
            "X-Trace: a:b",
            "-q",
            "page=2",
            "-d",
            r#"{"name": "{{name}}"}"#,
            "--timeout",
            "1000",
            "--insecure",
            "--no-follow",
        ]);
        let options = args.to_options().unwrap();

        assert_eq!(options.method, Method::Post);
        assert_eq!(options.headers.get("X-Trace"), Some(&"a:b".to_string()));
        assert_eq!(options.params.get("page"), Some(&"2".to_string()));
        assert_eq!(options.body, Some(json!({"name": "{{name}}"})));
        assert_eq!(options.timeout, Some(1000));
        assert!(!options.reject_unauthorized);
        assert!(!options.follow_redirects);
        assert!(options.auth.is_none());
    }

    #[test]
    fn test_request_text_body_and_bad_header() {
        let options = request_args(&["PUT", "http://x", "-d", "plain text"])
            .to_options()
            .unwrap();
        assert_eq!(options.body, Some(json!("plain text")));

        assert!(request_args(&["GET", "http://x", "-H", "NoColon"]).to_options().is_err());
        assert!(request_args(&["FETCH", "http://x"]).to_options().is_err());
    }

    #[test]
    fn test_request_auth_flags() {
        let bearer = request_args(&["GET", "http://x", "--bearer", "t"]).to_options().unwrap();
        assert_eq!(bearer.auth, Some(AuthConfig::bearer("t")));

        let basic = request_args(&["GET", "http://x", "--basic", "u:p:w"]).to_options().unwrap();
        assert_eq!(basic.auth, Some(AuthConfig::basic("u", "p:w")));

        let api_key = request_args(&[
            "GET",
            "http://x",
            "--api-key",
            "k",
            "--api-key-name",
            "key",
            "--api-key-in",
            "query",
        ])
        .to_options()
        .unwrap();
        assert_eq!(
            api_key.auth,
            Some(AuthConfig::api_key("k", Some("key".to_string()), ApiKeyLocation::Query))
        );

        assert!(
            Cli::try_parse_from(["ruflow", "request", "GET", "http://x", "--bearer", "t", "--basic", "u:p"])
                .is_err()
        );
        assert!(request_args(&["GET", "http://x", "--basic", "nopass"]).to_options().is_err());
    }

    #[test]
    fn test_run_settings_layering() {
        let config = ConfigLoader::parse(
            r#"
[globals]
a = "config"
b = "config"
"#,
        )
        .unwrap();
        let vars = VarArgs {
            env: Some("dev".to_string()),
            vars: vec![("b".to_string(), "cli".to_string())],
        };

        let settings = RunSettings::new(&config, &vars);
        assert_eq!(settings.environment.as_deref(), Some("dev"));
        assert_eq!(settings.globals.get("a"), Some(&"config".to_string()));
        assert_eq!(settings.globals.get("b"), Some(&"cli".to_string()));
    }
}
