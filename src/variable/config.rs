use crate::Result;
use crate::variable::resolver::VariableResolver;
use crate::variable::types::{VariableConfig, Variables};
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// 配置文件加载器
pub struct ConfigLoader;

impl ConfigLoader {
    /// 配置文件名
    const CONFIG_FILE: &'static str = "ruflow.toml";

    /// 从指定路径加载配置文件
    ///
    /// 变量值中的 `${VAR}` 会在加载时替换为系统环境变量。
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<VariableConfig> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::parse(&content)
    }

    /// 解析配置文件内容
    pub fn parse(content: &str) -> Result<VariableConfig> {
        let mut config: VariableConfig = toml::from_str(content)?;
        config.assign_names();

        for value in config.globals.values_mut() {
            *value = VariableResolver::resolve_env_vars(value);
        }
        for env in config.environments.values_mut() {
            for value in env.variables.values_mut() {
                *value = VariableResolver::resolve_env_vars(value);
            }
        }

        Ok(config)
    }

    /// 查找并加载配置文件
    /// 查找顺序：
    /// 1. 当前目录，逐级向上查找父目录
    /// 2. 用户配置目录 ~/.config/ruflow/
    pub fn find_and_load() -> Option<VariableConfig> {
        // 1. 当前目录及父目录
        if let Some(config) = Self::try_load_from_current_dir() {
            return Some(config);
        }

        // 2. 用户配置目录
        if let Some(config) = Self::try_load_from_user_dir() {
            return Some(config);
        }

        None
    }

    /// 尝试从当前目录及其父目录加载
    fn try_load_from_current_dir() -> Option<VariableConfig> {
        let mut current = std::env::current_dir().ok()?;

        loop {
            let config_path = current.join(Self::CONFIG_FILE);
            if config_path.exists() {
                return Self::load_logged(&config_path);
            }

            // 尝试父目录
            if !current.pop() {
                break;
            }
        }

        None
    }

    /// 尝试从用户配置目录加载
    fn try_load_from_user_dir() -> Option<VariableConfig> {
        let home = dirs::home_dir()?;
        let config_path = home.join(".config").join("ruflow").join(Self::CONFIG_FILE);

        if config_path.exists() {
            Self::load_logged(&config_path)
        } else {
            None
        }
    }

    fn load_logged(path: &Path) -> Option<VariableConfig> {
        match Self::load_from_path(path) {
            Ok(config) => {
                debug!(path = %path.display(), "Loaded config file");
                Some(config)
            }
            Err(e) => {
                warn!(path = %path.display(), "Ignoring unreadable config file: {}", e);
                None
            }
        }
    }

    /// 构建全局变量
    /// 配置文件中的 [globals] 在前，CLI 传入的 --var key=value 覆盖同名变量
    pub fn build_globals(config: &VariableConfig, cli_vars: &[(String, String)]) -> Variables {
        let mut globals = config.globals.clone();
        for (key, value) in cli_vars {
            globals.insert(key.clone(), value.clone());
        }
        globals
    }

    /// 解析 CLI 变量参数 "key=value"
    pub fn parse_cli_var(s: &str) -> Option<(String, String)> {
        s.split_once('=')
            .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
            .filter(|(k, _)| !k.is_empty())
    }
}
