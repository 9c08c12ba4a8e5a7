//! codepack - SOURCE TREE TO JSON ARCHIVE SPLITTER
//!
//! 소스 트리의 파일 내용을 크기 제한이 있는 여러 개의 JSON 아카이브로 나누어 저장하는 CLI 도구입니다.
//!
//! # 주요 기능
//!
//! - 🔁 **결정적 순서**: 이름순 깊이 우선 탐색으로 같은 트리는 항상 같은 아카이브 분할
//! - 📦 **크기 기반 분할**: 레코드 크기 합이 최대치를 넘기 직전에 다음 아카이브로 전환
//! - 🔍 **파일 필터링**: 접미사 목록과 glob 패턴
//! - ⏭️ **큰 파일 제외**: 제외 임계값을 넘는 파일은 읽지 않음
//! - 📝 **에러 레코드**: 읽을 수 없는 파일은 아카이브 안에 에러로 기록
//! - 🧪 **드라이런 모드**: 실제 저장 없이 분할 결과만 확인
//!
//! # 예제
//!
//! ```bash
//! # 기본 사용법
//! codepack -i ./repo -o ./json_output
//!
//! # 특정 확장자만, 5MB 아카이브, 300KB 초과 파일 제외
//! codepack -i ./repo -o ./json_output -e ".py,.ts" --max-size-mb 5 --exclude-size-mb 0.3
//! ```

pub mod archiver;
pub mod cli;
pub mod error;
pub mod filter;
pub mod logger;
pub mod record;
pub mod stats;

// Re-exports for convenient access
pub use archiver::{run, Archive, ArchiveOptions, Archiver, Batch};
pub use cli::{Args, WriteMode};
pub use error::{CodePackError, Result};
pub use filter::FileFilter;
pub use record::{read_record, ReadOptions, Record};
pub use stats::{format_bytes, Statistics};
