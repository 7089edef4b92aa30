use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;

use super::model::HistoryEntry;
use crate::{Result, RuflowError};

const HISTORY_DIR: &str = ".ruflow";
const HISTORY_FILE: &str = "history.jsonl";
const HISTORY_DIR_ENV: &str = "RUFLOW_HISTORY_DIR";
// 超过 20 MB 时在读取前压缩
const COMPACTION_THRESHOLD_BYTES: u64 = 20 * 1024 * 1024;
const MAX_ENTRIES: usize = 10_000;

/// JSON Lines 格式的历史记录存储
#[derive(Debug, Clone)]
pub struct HistoryStorage {
    file_path: PathBuf,
}

impl Default for HistoryStorage {
    fn default() -> Self {
        let dir = std::env::var(HISTORY_DIR_ENV).unwrap_or_else(|_| HISTORY_DIR.to_string());
        Self {
            file_path: Path::new(&dir).join(HISTORY_FILE),
        }
    }
}

impl HistoryStorage {
    /// 项目本地存储，目录可由 `RUFLOW_HISTORY_DIR` 覆盖
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            file_path: path.into(),
        }
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    fn ensure_dir(&self) -> Result<()> {
        if let Some(parent) = self.file_path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            fs::create_dir_all(parent)?;
        }
        Ok(())
    }

    /// 追加一条记录
    ///
    /// 写入期间持有排他锁，多个进程同时运行时每行保持完整。
    pub fn append(&self, entry: &HistoryEntry) -> Result<()> {
        self.ensure_dir()?;
        let line = serde_json::to_string(entry)?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.file_path)?;
        file.lock_exclusive()?;
        writeln!(file, "{}", line)?;

        Ok(())
    }

    /// 读取全部记录（按时间先后）
    pub fn list(&self) -> Result<Vec<HistoryEntry>> {
        if !self.file_path.exists() {
            return Ok(Vec::new());
        }

        self.compact_if_needed()?;
        self.read_all()
    }

    /// 最近的 n 条记录，旧的在前
    pub fn tail(&self, n: usize) -> Result<Vec<HistoryEntry>> {
        let entries = self.list()?;
        let skip = entries.len().saturating_sub(n);
        Ok(entries.into_iter().skip(skip).collect())
    }

    /// 按 ID 查找记录，支持唯一前缀（如列表中显示的短 ID）
    ///
    /// 完整 ID 优先匹配；前缀匹配到多条记录时返回错误。
    pub fn find(&self, id: &str) -> Result<Option<HistoryEntry>> {
        let id = id.trim();
        if id.is_empty() {
            return Ok(None);
        }

        let entries = self.list()?;
        if let Some(entry) = entries.iter().find(|e| e.id == id) {
            return Ok(Some(entry.clone()));
        }

        let mut matches = entries.into_iter().filter(|e| e.id.starts_with(id));
        match (matches.next(), matches.next()) {
            (Some(entry), None) => Ok(Some(entry)),
            (None, _) => Ok(None),
            (Some(_), Some(_)) => Err(RuflowError::Other(format!(
                "History ID '{}' is ambiguous, use a longer prefix",
                id
            ))),
        }
    }

    /// 按 URL 或方法搜索（不区分大小写），旧的在前
    pub fn search(&self, query: &str) -> Result<Vec<HistoryEntry>> {
        let query = query.to_lowercase();
        Ok(self
            .list()?
            .into_iter()
            .filter(|e| {
                e.request.url.to_lowercase().contains(&query)
                    || e.request.method.to_lowercase().contains(&query)
            })
            .collect())
    }

    /// 清空全部记录
    pub fn clear(&self) -> Result<()> {
        if !self.file_path.exists() {
            return Ok(());
        }

        let file = OpenOptions::new().write(true).open(&self.file_path)?;
        file.lock_exclusive()?;
        file.set_len(0)?;
        Ok(())
    }

    /// 删除指定 ID 的记录，返回是否有记录被删除
    pub fn delete(&self, id: &str) -> Result<bool> {
        if !self.file_path.exists() {
            return Ok(false);
        }

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&self.file_path)?;
        file.lock_exclusive()?;

        let entries = parse_lines(BufReader::new(&file));
        let before = entries.len();
        let kept: Vec<HistoryEntry> = entries.into_iter().filter(|e| e.id != id).collect();
        if kept.len() == before {
            return Ok(false);
        }

        rewrite_locked(file, &kept)?;
        Ok(true)
    }

    fn read_all(&self) -> Result<Vec<HistoryEntry>> {
        let file = fs::File::open(&self.file_path)?;
        file.lock_shared()?;

        Ok(parse_lines(BufReader::new(&file)))
    }

    fn compact_if_needed(&self) -> Result<()> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&self.file_path)?;

        if file.metadata()?.len() < COMPACTION_THRESHOLD_BYTES {
            return Ok(());
        }

        file.lock_exclusive()?;

        // 拿到锁后再检查一次，其他进程可能已经压缩过
        if file.metadata()?.len() < COMPACTION_THRESHOLD_BYTES {
            return Ok(());
        }

        let entries = parse_lines(BufReader::new(&file));
        if entries.len() <= MAX_ENTRIES {
            return Ok(());
        }

        let skip = entries.len() - MAX_ENTRIES;
        tracing::debug!(dropped = skip, "Compacting history file");

        rewrite_locked(file, &entries[skip..])
    }
}

/// 在已持有排他锁的文件上原地截断重写，保持锁有效
fn rewrite_locked(mut file: fs::File, entries: &[HistoryEntry]) -> Result<()> {
    file.set_len(0)?;
    file.seek(SeekFrom::Start(0))?;

    let mut writer = BufWriter::new(file);
    for entry in entries {
        writeln!(writer, "{}", serde_json::to_string(entry)?)?;
    }
    writer.flush()?;

    Ok(())
}

/// 跳过空行和无法解析的行
fn parse_lines<R: BufRead>(reader: R) -> Vec<HistoryEntry> {
    reader
        .lines()
        .map_while(|line| line.ok())
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| serde_json::from_str::<HistoryEntry>(&line).ok())
        .collect()
}
