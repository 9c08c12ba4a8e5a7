//! 에러 타입 정의 모듈
//!
//! codepack에서 실행을 중단시키는 구조적 에러 타입을 정의합니다.
//! 개별 파일 읽기 실패는 여기에 속하지 않으며, 아카이브 안의 에러 레코드로 기록됩니다.

use std::path::PathBuf;
use thiserror::Error;

/// codepack에서 발생할 수 있는 에러 타입
#[derive(Error, Debug)]
pub enum CodePackError {
    /// 입력 폴더가 존재하지 않음
    #[error("입력 폴더를 찾을 수 없습니다: {path}")]
    InputNotFound { path: PathBuf },

    /// 입력이 폴더가 아님
    #[error("입력 경로가 폴더가 아닙니다: {path}")]
    NotADirectory { path: PathBuf },

    /// 출력 폴더에 아카이브가 이미 존재 (Error 모드에서)
    #[error("출력 아카이브가 이미 존재합니다: {path}")]
    OutputExists { path: PathBuf },

    /// 출력 폴더 생성/정리 실패
    #[error("출력 폴더를 준비할 수 없습니다 ({path}): {source}")]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// 디렉토리 탐색 실패
    #[error("디렉토리 탐색 실패: {0}")]
    Walk(#[from] walkdir::Error),

    /// 아카이브 파일 쓰기 실패
    #[error("아카이브 쓰기 실패 ({file}): {source}")]
    Write {
        file: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON 직렬화 실패
    #[error("JSON 직렬화 실패: {0}")]
    Serialize(#[from] serde_json::Error),

    /// 유효하지 않은 패턴
    #[error("유효하지 않은 패턴: {pattern}")]
    InvalidPattern { pattern: String },

    /// 0 이하이거나 유한하지 않은 크기 제한
    #[error("유효하지 않은 크기 제한 ({name}): {value}")]
    InvalidLimit { name: &'static str, value: f64 },
}

/// codepack 결과 타입 별칭
pub type Result<T> = std::result::Result<T, CodePackError>;
