use crate::error::{EngineError, Result};
use flate2::Compression;
use flate2::write::GzEncoder;
use std::path::{Path, PathBuf};
use tar::Builder;

/// アーカイブ内の Dockerfile 名
pub const DOCKERFILE_NAME: &str = "Dockerfile";

const MAX_CONTEXT_SIZE: usize = 500 * 1024 * 1024; // 500MB

/// ビルドコンテキストと Dockerfile の組
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildContext {
    pub context_dir: PathBuf,
    pub dockerfile: PathBuf,
}

impl BuildContext {
    /// パスからビルドコンテキストを解決
    ///
    /// - ディレクトリ: そのディレクトリをコンテキストとし、直下の Dockerfile を使う
    /// - ファイル: 親ディレクトリをコンテキストとし、そのファイルを Dockerfile として使う
    pub fn resolve(path: &Path) -> Result<Self> {
        if path.is_dir() {
            let dockerfile = path.join(DOCKERFILE_NAME);
            if !dockerfile.is_file() {
                return Err(EngineError::DockerfileNotFound(dockerfile));
            }
            return Ok(Self {
                context_dir: path.to_path_buf(),
                dockerfile,
            });
        }

        if path.is_file() {
            let context_dir = match path.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
                _ => PathBuf::from("."),
            };
            return Ok(Self {
                context_dir,
                dockerfile: path.to_path_buf(),
            });
        }

        Err(EngineError::ContextNotFound(path.to_path_buf()))
    }

    /// Dockerfile がコンテキスト直下の "Dockerfile" かどうか
    fn dockerfile_at_root(&self) -> bool {
        self.dockerfile.parent() == Some(self.context_dir.as_path())
            && self.dockerfile.file_name().is_some_and(|n| n == DOCKERFILE_NAME)
    }
}

pub struct ContextBuilder;

impl ContextBuilder {
    /// ビルドコンテキストをtar.gzアーカイブとして作成
    pub fn create_context(context: &BuildContext) -> Result<Vec<u8>> {
        tracing::debug!(
            "Creating build context from: {}",
            context.context_dir.display()
        );

        let mut archive_data = Vec::new();
        {
            let encoder = GzEncoder::new(&mut archive_data, Compression::default());
            let mut tar = Builder::new(encoder);

            tar.append_dir_all(".", &context.context_dir)?;

            // コンテキスト外や別名の Dockerfile は "Dockerfile" として追加
            if !context.dockerfile_at_root() {
                let content = std::fs::read(&context.dockerfile)?;

                let mut header = tar::Header::new_gnu();
                header.set_path(DOCKERFILE_NAME)?;
                header.set_size(content.len() as u64);
                header.set_mode(0o644);
                header.set_cksum();

                tar.append(&header, &content[..])?;
            }

            tar.into_inner()?.finish()?;
        }

        tracing::debug!("Build context created: {} bytes", archive_data.len());

        Self::check_context_size(archive_data.len());

        Ok(archive_data)
    }

    fn check_context_size(size: usize) {
        if size > MAX_CONTEXT_SIZE {
            tracing::warn!(
                "Build context is large ({}MB); consider excluding files with .dockerignore",
                size / 1024 / 1024
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn unpack(archive: Vec<u8>) -> tempfile::TempDir {
        let extract_dir = tempdir().unwrap();
        let decoder = flate2::read::GzDecoder::new(std::io::Cursor::new(archive));
        let mut tar = tar::Archive::new(decoder);
        tar.unpack(extract_dir.path()).unwrap();
        extract_dir
    }

    #[test]
    fn test_resolve_directory() {
        let temp_dir = tempdir().unwrap();
        fs::write(temp_dir.path().join("Dockerfile"), "FROM alpine").unwrap();

        let context = BuildContext::resolve(temp_dir.path()).unwrap();
        assert_eq!(context.context_dir, temp_dir.path());
        assert_eq!(context.dockerfile, temp_dir.path().join("Dockerfile"));
    }

    #[test]
    fn test_resolve_directory_without_dockerfile() {
        let temp_dir = tempdir().unwrap();
        let result = BuildContext::resolve(temp_dir.path());
        assert!(matches!(result, Err(EngineError::DockerfileNotFound(_))));
    }

    #[test]
    fn test_resolve_file() {
        let temp_dir = tempdir().unwrap();
        let dockerfile = temp_dir.path().join("Dockerfile.prod");
        fs::write(&dockerfile, "FROM alpine").unwrap();

        let context = BuildContext::resolve(&dockerfile).unwrap();
        assert_eq!(context.context_dir, temp_dir.path());
        assert_eq!(context.dockerfile, dockerfile);
    }

    #[test]
    fn test_resolve_missing() {
        let temp_dir = tempdir().unwrap();
        let result = BuildContext::resolve(&temp_dir.path().join("nope"));
        assert!(matches!(result, Err(EngineError::ContextNotFound(_))));
    }

    #[test]
    fn test_create_context() {
        let temp_dir = tempdir().unwrap();
        fs::write(temp_dir.path().join("app.txt"), "content").unwrap();
        let subdir = temp_dir.path().join("subdir");
        fs::create_dir(&subdir).unwrap();
        fs::write(subdir.join("nested.txt"), "nested").unwrap();
        fs::write(temp_dir.path().join("Dockerfile"), "FROM alpine\nCOPY . /app").unwrap();

        let context = BuildContext::resolve(temp_dir.path()).unwrap();
        let archive = ContextBuilder::create_context(&context).unwrap();
        assert!(!archive.is_empty());

        let extracted = unpack(archive);
        assert!(extracted.path().join("Dockerfile").exists());
        assert!(extracted.path().join("app.txt").exists());
        assert!(extracted.path().join("subdir/nested.txt").exists());
    }

    #[test]
    fn test_create_context_renames_custom_dockerfile() {
        let temp_dir = tempdir().unwrap();
        let dockerfile = temp_dir.path().join("Dockerfile.release");
        fs::write(&dockerfile, "FROM busybox").unwrap();

        let context = BuildContext::resolve(&dockerfile).unwrap();
        let extracted = unpack(ContextBuilder::create_context(&context).unwrap());

        let content = fs::read_to_string(extracted.path().join("Dockerfile")).unwrap();
        assert_eq!(content, "FROM busybox");
    }
}
