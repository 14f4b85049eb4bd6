use futures::future::join_all;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::{
    batcher::{Pacer, make_batches},
    config::RunConfig,
    error::{Error, Result},
    explorer::resolve_target,
    llm::DocGenerator,
    summarizer::{build_prompt, file_section},
};

/// Outcome of a completed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub output_path: PathBuf,
    pub files: usize,
    pub batches: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub waits: usize,
    /// False when no batch produced text and nothing was written.
    pub written: bool,
}

/// Documents `config.target` batch by batch and writes the result.
///
/// Resolution and write failures are returned. A batch whose generation
/// fails is logged and contributes nothing.
pub async fn run<G: DocGenerator + ?Sized>(config: &RunConfig, generator: &G) -> Result<RunReport> {
    let target = resolve_target(&config.target)?;
    let single_file = target.is_single_file();
    let batches = make_batches(&target.files, config.batch_size)?;
    info!(
        "Documenting {} file(s) from {} in {} batch(es)",
        target.files.len(),
        config.target.display(),
        batches.len()
    );

    let mut pacer = Pacer::new(config.wait);
    let mut documentation = String::new();
    let mut succeeded = 0;

    for (index, batch) in batches.iter().enumerate() {
        info!("Processing batch {}/{} ({} file(s))", index + 1, batches.len(), batch.len());

        match document_batch(batch, single_file, generator).await {
            Ok(text) => {
                documentation.push_str(&text);
                succeeded += 1;
            }
            Err(e) => warn!("Skipping batch {}: {}", index + 1, e),
        }

        if index + 1 < batches.len() {
            pacer.pause().await;
        }
    }

    let written = !documentation.is_empty();
    if written {
        tokio::fs::write(&target.output_path, &documentation)
            .await
            .map_err(|e| Error::Write {
                path: target.output_path.clone(),
                message: e.to_string(),
            })?;
    }

    Ok(RunReport {
        output_path: target.output_path,
        files: target.files.len(),
        batches: batches.len(),
        succeeded,
        failed: batches.len() - succeeded,
        waits: pacer.pauses(),
        written,
    })
}

async fn document_batch<G: DocGenerator + ?Sized>(
    batch: &[PathBuf],
    single_file: bool,
    generator: &G,
) -> Result<String> {
    let sections: Vec<String> = join_all(batch.iter().map(|path| read_section(path)))
        .await
        .into_iter()
        .flatten()
        .collect();

    if sections.is_empty() {
        return Err(Error::Io {
            path: batch.first().cloned().unwrap_or_default(),
            message: "no file in the batch could be read".to_string(),
        });
    }

    let prompt = build_prompt(&sections, single_file);
    Ok(generator.generate(&prompt).await?)
}

async fn read_section(path: &Path) -> Option<String> {
    match tokio::fs::read(path).await {
        Ok(bytes) => Some(file_section(path, &String::from_utf8_lossy(&bytes))),
        Err(e) => {
            warn!("{}", Error::io(path, e));
            None
        }
    }
}
