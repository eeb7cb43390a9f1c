use std::path::Path;
use tracing::{info, warn};

use crate::error::{Result, SetmError};
use crate::subtitle::{compact_text, read_srt, write_srt, SubtitleCue};
use super::TextTranslator;

/// Outcome of translating a subtitle file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TranslationReport {
    pub total: usize,
    pub translated: usize,
    /// Cues that kept their source text because the request failed
    pub failed: usize,
}

/// Translate every cue, keeping index and timing. A cue whose request fails
/// keeps its original text. If no cue could be translated at all the whole
/// call fails, since the API is evidently unusable.
pub async fn translate_cues(
    translator: &dyn TextTranslator,
    cues: &[SubtitleCue],
) -> Result<(Vec<SubtitleCue>, TranslationReport)> {
    let mut report = TranslationReport {
        total: cues.len(),
        ..TranslationReport::default()
    };
    let mut last_error = None;
    let mut translated = Vec::with_capacity(cues.len());

    for (idx, cue) in cues.iter().enumerate() {
        let source = cue.flattened_text();
        if source.is_empty() {
            translated.push(cue.clone());
            continue;
        }

        info!("┌─ Translating cue {}/{} ────────", idx + 1, cues.len());
        info!("│ Source: {}", source);

        match translator.translate_text(&source).await.map(|t| compact_text(&t)) {
            Ok(text) if text.is_empty() => {
                warn!("│ Empty translation, keeping source text");
                warn!("└─────────────────────────────────────");
                report.failed += 1;
                translated.push(cue.clone());
            }
            Ok(text) => {
                info!("│ Target: {}", text);
                info!("└─────────────────────────────────────");
                report.translated += 1;
                translated.push(SubtitleCue {
                    text,
                    ..cue.clone()
                });
            }
            Err(e) => {
                warn!("│ Failed: {}", e);
                warn!("└─────────────────────────────────────");
                report.failed += 1;
                last_error = Some(e);
                translated.push(cue.clone());
            }
        }
    }

    if report.translated == 0 {
        if let Some(e) = last_error {
            return Err(SetmError::Translation(format!(
                "all {} cues failed to translate; last error: {}",
                report.failed, e
            )));
        }
    }

    Ok((translated, report))
}

/// Read an SRT file, translate it and write the result to `output_path`.
pub async fn translate_srt_file(
    translator: &dyn TextTranslator,
    input_path: &Path,
    output_path: &Path,
) -> Result<TranslationReport> {
    let cues = read_srt(input_path).await?;
    info!("Translating {} cues from {}", cues.len(), input_path.display());

    let (translated, report) = translate_cues(translator, &cues).await?;
    write_srt(&translated, output_path).await?;

    if report.failed > 0 {
        warn!(
            "{} of {} cues kept their original text after translation errors",
            report.failed, report.total
        );
    }
    info!("Subtitles translated successfully");
    Ok(report)
}
