//! CLI 인자 파싱 모듈
//!
//! clap을 사용한 명령줄 인자 정의 및 작업 옵션 변환을 담당합니다.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::archiver::{ArchiveOptions, DEFAULT_EXCLUDE_FILE_MB, DEFAULT_MAX_ARCHIVE_MB};
use crate::error::Result;
use crate::filter::parse_extensions;

/// 출력 폴더 모드
#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq)]
pub enum WriteMode {
    /// 같은 이름의 아카이브가 있으면 덮어쓰기
    #[default]
    Overwrite,
    /// 기존 아카이브를 모두 지우고 시작
    Clean,
    /// 기존 아카이브가 있으면 에러
    Error,
}

impl std::fmt::Display for WriteMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WriteMode::Overwrite => write!(f, "Overwrite"),
            WriteMode::Clean => write!(f, "Clean"),
            WriteMode::Error => write!(f, "Error"),
        }
    }
}

/// codepack CLI 인자 구조체
#[derive(Parser, Debug)]
#[command(
    name = "codepack",
    author = "YourName <your@email.com>",
    version,
    about = "SOURCE TREE TO JSON ARCHIVE SPLITTER - 폴더 내 소스 파일들을 크기 제한이 있는 JSON 아카이브로 분할 저장하는 CLI 도구",
    long_about = r#"
SOURCE TREE TO JSON ARCHIVE SPLITTER
====================================

지정된 폴더를 이름순으로 탐색하여 대상 파일의 내용을
{"files": [{"path", "content"}, ...]} 형식의 JSON 아카이브로 저장합니다.
아카이브가 최대 크기를 넘기 직전에 다음 번호의 파일로 넘어갑니다.

특징:
  • 결정적 순서 (같은 트리는 항상 같은 분할)
  • 접미사 필터 및 glob 패턴 필터
  • 큰 파일 자동 제외
  • 읽을 수 없는 파일은 에러 레코드로 기록

예제:
  codepack -i ./repo -o ./json_output
  codepack -i ./repo -o ./json_output -e ".py,.ts,.tsx" --max-size-mb 5 --exclude-size-mb 0.3
  codepack -i ./repo --dry-run --verbose
  codepack -i ./repo -o ./json_output --mode clean --log report.txt
"#
)]
pub struct Args {
    /// 아카이브할 저장소(루트 폴더) 경로
    #[arg(short, long)]
    pub input: PathBuf,

    /// 아카이브를 저장할 폴더 (없으면 생성)
    #[arg(short, long, default_value = "json_output")]
    pub output: PathBuf,

    /// 아카이브 하나의 최대 크기 (MB)
    #[arg(long, default_value_t = DEFAULT_MAX_ARCHIVE_MB)]
    pub max_size_mb: f64,

    /// 이 크기(MB)를 초과하는 파일은 제외
    #[arg(long, default_value_t = DEFAULT_EXCLUDE_FILE_MB)]
    pub exclude_size_mb: f64,

    /// 대상 파일 접미사 (쉼표로 구분, 예: ".py,.rs,.toml"). 생략하면 모든 파일
    #[arg(short, long)]
    pub extensions: Option<String>,

    /// 파일 이름 패턴 필터 (glob 형식, 예: "test_*")
    #[arg(short, long)]
    pub pattern: Option<String>,

    /// 출력 폴더 모드
    #[arg(short, long, value_enum, default_value_t = WriteMode::Overwrite)]
    pub mode: WriteMode,

    /// 최대 폴더 탐색 깊이
    #[arg(long)]
    pub max_depth: Option<usize>,

    /// 실제 저장 없이 분할 결과만 표시
    #[arg(long)]
    pub dry_run: bool,

    /// 에러/제외 파일 보고서 경로
    #[arg(long)]
    pub log: Option<PathBuf>,

    /// 상세 출력 모드
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// 접미사 목록을 파싱하여 벡터로 반환
    ///
    /// 비어 있는 목록은 필터 없음으로 취급합니다.
    pub fn get_extensions(&self) -> Option<Vec<String>> {
        self.extensions
            .as_deref()
            .map(parse_extensions)
            .filter(|exts| !exts.is_empty())
    }

    /// 작업 옵션으로 변환
    pub fn to_options(&self) -> Result<ArchiveOptions> {
        Ok(ArchiveOptions::new()
            .with_max_archive_mb(self.max_size_mb)?
            .with_exclude_file_mb(self.exclude_size_mb)?
            .with_extensions(self.get_extensions())
            .with_pattern(self.pattern.clone())
            .with_max_depth(self.max_depth)
            .with_dry_run(self.dry_run))
    }
}
