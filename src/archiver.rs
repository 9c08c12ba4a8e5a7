//! 아카이브 생성 모듈
//!
//! 디렉토리를 이름순 깊이 우선으로 탐색하며 대상 파일을 레코드로 만들고,
//! 레코드 크기 합이 제한을 넘기 직전에 번호가 붙은 JSON 아카이브로 저장합니다.

use indicatif::ProgressBar;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use serde_json::ser::PrettyFormatter;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

use crate::error::{CodePackError, Result};
use crate::filter::FileFilter;
use crate::record::{read_record, ReadOptions, Record};
use crate::stats::{format_bytes, ArchiveInfo, Statistics};

/// 아카이브 파일 이름의 고정 접미부
pub const ARCHIVE_BASE_NAME: &str = "repository_code.json";

/// 기본 아카이브 최대 크기 (MB)
pub const DEFAULT_MAX_ARCHIVE_MB: f64 = 10.0;

/// 기본 제외 파일 크기 (MB)
pub const DEFAULT_EXCLUDE_FILE_MB: f64 = 5.0;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// 디스크에 저장되는 아카이브 형식
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Archive {
    pub files: Vec<Record>,
}

/// 아카이브 작업 옵션
#[derive(Debug, Clone)]
pub struct ArchiveOptions {
    /// 아카이브 하나의 레코드 크기 합 상한 (바이트)
    pub max_archive_bytes: u64,
    /// 이 크기를 초과하는 파일은 읽지 않고 제외 (바이트)
    pub exclude_file_bytes: u64,
    /// 허용할 파일 이름 접미사 (None이면 전체)
    pub extensions: Option<Vec<String>>,
    /// 파일 이름 glob 패턴
    pub pattern: Option<String>,
    /// 최대 폴더 탐색 깊이
    pub max_depth: Option<usize>,
    /// 아카이브를 쓰지 않고 분할 결과만 계산
    pub dry_run: bool,
    /// 파일 읽기 옵션
    pub read: ReadOptions,
}

impl Default for ArchiveOptions {
    fn default() -> Self {
        Self {
            max_archive_bytes: (DEFAULT_MAX_ARCHIVE_MB * BYTES_PER_MB) as u64,
            exclude_file_bytes: (DEFAULT_EXCLUDE_FILE_MB * BYTES_PER_MB) as u64,
            extensions: None,
            pattern: None,
            max_depth: None,
            dry_run: false,
            read: ReadOptions::default(),
        }
    }
}

impl ArchiveOptions {
    /// 기본 옵션 생성 (10MB 아카이브, 5MB 초과 파일 제외)
    pub fn new() -> Self {
        Self::default()
    }

    /// 아카이브 최대 크기를 MB 단위로 설정
    pub fn with_max_archive_mb(mut self, mb: f64) -> Result<Self> {
        self.max_archive_bytes = mb_to_bytes("max_archive_mb", mb)?;
        Ok(self)
    }

    /// 제외 파일 크기를 MB 단위로 설정
    pub fn with_exclude_file_mb(mut self, mb: f64) -> Result<Self> {
        self.exclude_file_bytes = mb_to_bytes("exclude_file_mb", mb)?;
        Ok(self)
    }

    /// 아카이브 최대 크기를 바이트 단위로 설정 (0은 거부)
    pub fn with_max_archive_bytes(mut self, bytes: u64) -> Result<Self> {
        self.max_archive_bytes = positive_bytes("max_archive_bytes", bytes)?;
        Ok(self)
    }

    /// 제외 파일 크기를 바이트 단위로 설정 (0은 거부)
    pub fn with_exclude_file_bytes(mut self, bytes: u64) -> Result<Self> {
        self.exclude_file_bytes = positive_bytes("exclude_file_bytes", bytes)?;
        Ok(self)
    }

    /// 접미사 필터 설정
    pub fn with_extensions(mut self, extensions: Option<Vec<String>>) -> Self {
        self.extensions = extensions;
        self
    }

    /// 파일 이름 패턴 설정
    pub fn with_pattern(mut self, pattern: Option<String>) -> Self {
        self.pattern = pattern;
        self
    }

    /// 최대 탐색 깊이 설정
    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// 드라이런 설정
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// 메모리 매핑 임계값 설정
    pub fn with_mmap_threshold(mut self, bytes: u64) -> Self {
        self.read.mmap_threshold = bytes;
        self
    }
}

/// MB 값을 바이트로 변환
///
/// 소수점 이하는 버립니다. 비교가 항상 `>` 이므로 소수 바이트 값과 비교하는 것과 같습니다.
fn mb_to_bytes(name: &'static str, mb: f64) -> Result<u64> {
    if !mb.is_finite() || mb <= 0.0 {
        return Err(CodePackError::InvalidLimit { name, value: mb });
    }
    Ok((mb * BYTES_PER_MB).floor() as u64)
}

fn positive_bytes(name: &'static str, bytes: u64) -> Result<u64> {
    if bytes == 0 {
        return Err(CodePackError::InvalidLimit { name, value: 0.0 });
    }
    Ok(bytes)
}

/// 아직 저장되지 않은 레코드 묶음
#[derive(Debug, Default)]
pub struct Batch {
    records: Vec<Record>,
    size: u64,
}

impl Batch {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// 레코드 단독 직렬화 크기의 누적 합
    pub fn size(&self) -> u64 {
        self.size
    }

    /// 레코드를 추가하면 상한을 넘는지 확인
    ///
    /// 빈 묶음은 절대 넘치지 않으므로 상한보다 큰 레코드도 혼자 들어갑니다.
    pub fn would_overflow(&self, record_size: u64, max_bytes: u64) -> bool {
        !self.is_empty() && self.size + record_size > max_bytes
    }

    pub fn push(&mut self, record: Record, record_size: u64) {
        self.records.push(record);
        self.size += record_size;
    }

    /// 레코드와 누적 크기를 꺼내고 비움
    pub fn take(&mut self) -> (Vec<Record>, u64) {
        let size = std::mem::take(&mut self.size);
        (std::mem::take(&mut self.records), size)
    }
}

/// 소스 트리를 JSON 아카이브로 분할 저장하는 작업자
pub struct Archiver {
    output_dir: PathBuf,
    options: ArchiveOptions,
    filter: FileFilter,
    batch: Batch,
    stats: Statistics,
    progress: Option<ProgressBar>,
}

impl Archiver {
    /// 새 작업자 생성
    ///
    /// # Arguments
    /// * `output_dir` - 아카이브를 저장할 폴더 (없으면 생성)
    /// * `options` - 작업 옵션
    pub fn new(output_dir: impl Into<PathBuf>, options: ArchiveOptions) -> Result<Self> {
        let filter = FileFilter::new(options.extensions.clone(), options.pattern.clone())?;

        Ok(Self {
            output_dir: output_dir.into(),
            options,
            filter,
            batch: Batch::default(),
            stats: Statistics::new(),
            progress: None,
        })
    }

    /// 진행률 표시 연결
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = Some(progress);
        self
    }

    /// 루트 폴더를 탐색하여 아카이브 생성
    ///
    /// 파일 읽기 실패는 에러 레코드로 기록되고, 디렉토리 탐색이나
    /// 아카이브 쓰기 실패만 작업을 중단시킵니다. 중단 전에 저장된 아카이브는 남습니다.
    pub fn run(mut self, root: &Path) -> Result<Statistics> {
        validate_root(root)?;

        if !self.options.dry_run {
            fs::create_dir_all(&self.output_dir).map_err(|source| CodePackError::OutputDir {
                path: self.output_dir.clone(),
                source,
            })?;
        }

        let mut walker = WalkDir::new(root).follow_links(false).sort_by_file_name();
        if let Some(depth) = self.options.max_depth {
            walker = walker.max_depth(depth);
        }

        for entry in walker {
            let entry = entry?;
            // 디렉토리는 walkdir가 내려가고, 심볼릭 링크와 특수 파일은 무시
            if !entry.file_type().is_file() {
                continue;
            }
            if self.filter.matches(&entry.file_name().to_string_lossy()) {
                self.emit(root, &entry)?;
            }
        }

        if !self.batch.is_empty() {
            self.flush()?;
        }

        Ok(self.stats)
    }

    fn emit(&mut self, root: &Path, entry: &DirEntry) -> Result<()> {
        let relative = relative_path(root, entry.path());
        let file_size = entry
            .metadata()
            .map(|meta| meta.len())
            .map_err(|e| e.to_string());

        self.emit_sized(entry.path(), relative, file_size)
    }

    /// 크기 확인 후 레코드 추가
    ///
    /// 메타데이터를 읽지 못하면 크기 검사를 할 수 없으므로 크기 0의 에러 레코드가 됩니다.
    fn emit_sized(
        &mut self,
        path: &Path,
        relative: String,
        file_size: std::result::Result<u64, String>,
    ) -> Result<()> {
        let (record, file_size) = match file_size {
            Ok(size) if size > self.options.exclude_file_bytes => {
                self.notify(|| {
                    debug!("크기 제한 초과로 건너뜀: {} ({})", relative, format_bytes(size))
                });
                self.stats.add_skipped(&relative, size);
                return Ok(());
            }
            Ok(size) => (
                read_record(path, relative, size, &self.options.read),
                size,
            ),
            Err(reason) => (Record::unreadable(relative, reason), 0),
        };

        if let Record::Error { path, error } = &record {
            self.notify(|| debug!("{}: {}", path, error));
        }
        if let Some(pb) = &self.progress {
            pb.inc(1);
            pb.set_message(record.path().to_string());
        }

        self.push(record, file_size)
    }

    fn push(&mut self, record: Record, file_size: u64) -> Result<()> {
        let size = record.serialized_size()?;

        if self
            .batch
            .would_overflow(size, self.options.max_archive_bytes)
        {
            self.flush()?;
        }

        match &record {
            Record::Content { .. } => self.stats.add_content(file_size, size),
            Record::Error { path, error } => self.stats.add_failure(path, error, size),
        }
        self.notify(|| debug!("레코드 추가: {} ({} B)", record.path(), size));

        self.batch.push(record, size);
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        let index = self.stats.archive_count() + 1;
        let path = self.output_dir.join(archive_file_name(index));
        let (files, measured_bytes) = self.batch.take();
        let records = files.len();

        if !self.options.dry_run {
            write_archive(&path, &Archive { files })?;
        }
        self.notify(|| {
            info!(
                "{}: {} ({}개 레코드)",
                if self.options.dry_run { "저장 예정" } else { "아카이브 저장" },
                path.display(),
                records
            )
        });

        self.stats.add_archive(ArchiveInfo {
            path,
            records,
            measured_bytes,
        });
        Ok(())
    }

    /// 스피너가 있으면 잠시 멈추고 로그 출력
    fn notify(&self, log_line: impl FnOnce()) {
        match &self.progress {
            Some(pb) => pb.suspend(log_line),
            None => log_line(),
        }
    }
}

/// 루트 폴더를 아카이브로 저장하고 생성된 아카이브 수를 반환
///
/// 대상 파일이 없으면 0을 반환하며 아카이브는 만들어지지 않습니다.
pub fn run(root: &Path, output_dir: &Path, options: ArchiveOptions) -> Result<usize> {
    let stats = Archiver::new(output_dir, options)?.run(root)?;
    Ok(stats.archive_count())
}

/// 입력 경로 유효성 검사
fn validate_root(root: &Path) -> Result<()> {
    if !root.exists() {
        return Err(CodePackError::InputNotFound {
            path: root.to_path_buf(),
        });
    }
    if !root.is_dir() {
        return Err(CodePackError::NotADirectory {
            path: root.to_path_buf(),
        });
    }
    Ok(())
}

/// 루트 기준 상대 경로 (호스트 구분자 유지)
fn relative_path(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .into_owned()
}

/// N번째 아카이브 파일 이름 (1부터 시작)
pub fn archive_file_name(index: usize) -> String {
    format!("{}_{}", index, ARCHIVE_BASE_NAME)
}

/// `<N>_repository_code.json` 형식인지 확인
pub fn is_archive_file_name(name: &str) -> bool {
    name.strip_suffix(ARCHIVE_BASE_NAME)
        .and_then(|rest| rest.strip_suffix('_'))
        .map(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()))
        .unwrap_or(false)
}

/// 출력 폴더에 이미 있는 아카이브 목록 (이름순)
pub fn existing_archives(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let dir_err = |source: std::io::Error| CodePackError::OutputDir {
        path: dir.to_path_buf(),
        source,
    };

    let mut found = Vec::new();
    for entry in fs::read_dir(dir).map_err(dir_err)? {
        let entry = entry.map_err(dir_err)?;
        let is_file = entry.file_type().map(|t| t.is_file()).unwrap_or(false);
        if is_file && is_archive_file_name(&entry.file_name().to_string_lossy()) {
            found.push(entry.path());
        }
    }
    found.sort();

    Ok(found)
}

/// 출력 폴더에 아카이브가 하나라도 있으면 `OutputExists` 에러
pub fn ensure_no_archives(dir: &Path) -> Result<()> {
    match existing_archives(dir)?.into_iter().next() {
        Some(path) => Err(CodePackError::OutputExists { path }),
        None => Ok(()),
    }
}

/// 출력 폴더의 기존 아카이브 삭제, 삭제한 수 반환
pub fn remove_archives(dir: &Path) -> Result<usize> {
    let archives = existing_archives(dir)?;
    for path in &archives {
        fs::remove_file(path).map_err(|source| CodePackError::OutputDir {
            path: path.clone(),
            source,
        })?;
    }
    Ok(archives.len())
}

/// 아카이브를 4칸 들여쓰기 JSON으로 저장 (비 ASCII 문자는 그대로)
pub fn write_archive(path: &Path, archive: &Archive) -> Result<()> {
    let write_err = |source: std::io::Error| CodePackError::Write {
        file: path.to_path_buf(),
        source,
    };

    let file = File::create(path).map_err(write_err)?;
    let mut writer = BufWriter::new(file);

    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut writer, formatter);
    archive.serialize(&mut ser).map_err(|e| {
        if e.is_io() {
            write_err(e.into())
        } else {
            CodePackError::Serialize(e)
        }
    })?;

    writer.flush().map_err(write_err)?;
    Ok(())
}
