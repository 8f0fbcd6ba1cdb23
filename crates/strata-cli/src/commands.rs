//! Subcommand handlers. Each one works on the already-resolved active session.

use anyhow::{Context, Result, anyhow, bail};
use colored::Colorize;
use std::path::{Path, PathBuf};

use strata_application::{Autosave, IntakeNotice, StrategyWorkbench, Upload, WorkbenchError};
use strata_core::i18n::{Language, TextCatalog, TextKey};
use strata_core::session::Alternative;

use crate::Command;

pub async fn run(bench: &StrategyWorkbench, lang: Language, command: Command) -> Result<()> {
    match command {
        Command::New => {
            let session = bench.new_session().await.map_err(|e| failure(bench, lang, e))?;
            println!("{}", text_with(bench, lang, TextKey::SessionCreated, &[("id", session.id.as_str())]).green());
        }
        Command::History => history(bench, lang).await?,
        Command::Show => show(bench, lang).await,
        Command::Resume { id } => {
            let session = bench.load_session(&id).await.map_err(|e| failure(bench, lang, e))?;
            println!("{}", text_with(bench, lang, TextKey::SessionLoaded, &[("id", session.id.as_str())]).green());
        }
        Command::Delete { id } => {
            bench.delete_session(&id).await.map_err(|e| failure(bench, lang, e))?;
            println!("{}", text_with(bench, lang, TextKey::SessionDeleted, &[("id", id.as_str())]).green());
        }
        Command::Set { field, value } => {
            let autosave = bench
                .set_field(&field, &value)
                .await
                .map_err(|e| failure(bench, lang, e))?;
            report_autosave(bench, lang, &autosave);
        }
        Command::Attach { file } => {
            let upload = read_upload(&file).await?;
            println!("{}", text(bench, lang, TextKey::FileParsing).dimmed());
            let outcome = bench
                .attach_briefing(upload)
                .await
                .map_err(|e| failure(bench, lang, e))?;
            report_notices(bench, lang, &outcome.notices);
            report_autosave(bench, lang, &outcome.autosave);
        }
        Command::Detach => {
            let autosave = bench.detach_briefing().await.map_err(|e| failure(bench, lang, e))?;
            report_autosave(bench, lang, &autosave);
        }
        Command::AddImage { files } => {
            let mut uploads = Vec::with_capacity(files.len());
            for file in &files {
                uploads.push(read_upload(file).await?);
            }
            let outcome = bench.add_images(uploads).await.map_err(|e| failure(bench, lang, e))?;
            report_notices(bench, lang, &outcome.notices);
            report_autosave(bench, lang, &outcome.autosave);
        }
        Command::RemoveImage { index } => {
            let removed = match index.checked_sub(1) {
                Some(position) => bench
                    .remove_image(position)
                    .await
                    .map_err(|e| failure(bench, lang, e))?,
                None => None,
            };
            match removed {
                Some(autosave) => report_autosave(bench, lang, &autosave),
                None => bail!("No screenshot at position {}", index),
            }
        }
        Command::Analyze => {
            println!("{}", text(bench, lang, TextKey::MessageAnalyzingBriefing).dimmed());
            let autosave = bench.analyze_briefing().await.map_err(|e| failure(bench, lang, e))?;
            let session = bench.session().await;
            println!("{}", text(bench, lang, TextKey::HeaderBusinessMarketContext).bold());
            let diagnosis = &session.diagnosis;
            print_field(bench, lang, TextKey::LabelCustomerType, &diagnosis.customer_type);
            print_field(bench, lang, TextKey::LabelMarketCategory, &diagnosis.market);
            print_field(bench, lang, TextKey::LabelSectorIndustry, &diagnosis.sector);
            print_field(bench, lang, TextKey::LabelProductService, &diagnosis.product_or_service);
            print_field(bench, lang, TextKey::LabelBusinessChallenge, &diagnosis.business_challenge);
            print_field(bench, lang, TextKey::LabelCustomerChallenge, &diagnosis.customer_challenge);
            report_autosave(bench, lang, &autosave);
        }
        Command::Formulate => {
            println!("{}", text(bench, lang, TextKey::MessageFormulatingChallenge).dimmed());
            let autosave = bench
                .formulate_challenge()
                .await
                .map_err(|e| failure(bench, lang, e))?;
            let challenge = bench.session().await.challenge;
            print_field(bench, lang, TextKey::HeaderRumeltDiagnosis, &challenge.rumelt_diagnosis);
            print_field(bench, lang, TextKey::HeaderRumeltGuidingPolicy, &challenge.rumelt_guiding_policy);
            print_field(bench, lang, TextKey::LabelOptionA, &challenge.strategic_alternative_a);
            print_field(bench, lang, TextKey::LabelOptionB, &challenge.strategic_alternative_b);
            print_field(bench, lang, TextKey::LabelOptionC, &challenge.strategic_alternative_c);

            let sources = bench.sources().await;
            if !sources.is_empty() {
                println!("{}", text(bench, lang, TextKey::HeaderInformationSources).bold());
                for source in &sources {
                    let title = if source.title.is_empty() { &source.uri } else { &source.title };
                    println!("  - {} {}", title, format!("<{}>", source.uri).dimmed());
                }
            }
            report_autosave(bench, lang, &autosave);
        }
        Command::Select { alternative } => {
            if alternative == Alternative::Unset {
                bail!("Choose A, B or C");
            }
            let autosave = bench
                .select_alternative(alternative)
                .await
                .map_err(|e| failure(bench, lang, e))?;
            report_autosave(bench, lang, &autosave);
        }
        Command::Avenues => {
            println!("{}", text(bench, lang, TextKey::MessageGeneratingPrompts).dimmed());
            let autosave = bench.generate_avenues().await.map_err(|e| failure(bench, lang, e))?;
            println!("{}", text(bench, lang, TextKey::HeaderGeneratedIdeationPrompts).bold());
            for (i, avenue) in bench.session().await.generated_prompts.iter().enumerate() {
                println!("{} {}", format!("{}.", i + 1).bright_magenta().bold(), avenue);
            }
            report_autosave(bench, lang, &autosave);
        }
        Command::Suggest { field } => {
            let suggestions = bench.suggest(&field).await.map_err(|e| failure(bench, lang, e))?;
            if suggestions.is_empty() {
                println!("{}", text(bench, lang, TextKey::TextNotGenerated).dimmed());
            }
            for (i, suggestion) in suggestions.iter().enumerate() {
                println!("{} {}", format!("{}.", i + 1).bright_magenta().bold(), suggestion);
            }
        }
        Command::Export { out } => {
            let (file_name, markdown) = bench.export_markdown().await;
            let path = out.unwrap_or_else(|| PathBuf::from(file_name));
            tokio::fs::write(&path, markdown)
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("{}", path.display().to_string().green());
        }
        Command::HelpTopics => {
            println!("{}", text(bench, lang, TextKey::HelpModalTitle).bold());
            println!("{}\n", text(bench, lang, TextKey::HelpModalIntro));
            for topic in bench.catalog().help_topics() {
                println!("{}", text(bench, lang, topic.question).bright_magenta().bold());
                println!("{}\n", text(bench, lang, topic.answer));
            }
        }
    }
    Ok(())
}

/// Turns a workbench error into the localized message the user sees.
pub fn failure(bench: &StrategyWorkbench, lang: Language, error: WorkbenchError) -> anyhow::Error {
    tracing::debug!("Command failed: {:?}", error);
    anyhow!(error.localized(bench.catalog(), lang))
}

async fn history(bench: &StrategyWorkbench, lang: Language) -> Result<()> {
    let records = bench.history().await.map_err(|e| failure(bench, lang, e))?;
    println!("{}", text(bench, lang, TextKey::HistoryTitle).bold());
    if records.is_empty() {
        println!("{}", text(bench, lang, TextKey::HistoryEmpty).dimmed());
        return Ok(());
    }

    let not_set = text(bench, lang, TextKey::TextNotSet);
    for record in records {
        let modified = chrono::DateTime::from_timestamp_millis(record.last_modified)
            .map(|at| at.with_timezone(&chrono::Local).format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default();
        let client = if record.client_name.is_empty() { &not_set } else { &record.client_name };
        println!(
            "{}  {}  {}  {}",
            record.id.dimmed(),
            client.green(),
            modified,
            preview(&record.business_challenge, 60)
        );
    }
    Ok(())
}

async fn show(bench: &StrategyWorkbench, lang: Language) {
    let session = bench.session().await;
    println!("{}", session.id.dimmed());

    let screenshots = &session.diagnosis.screenshots;
    if !screenshots.is_empty() {
        println!("{}", text(bench, lang, TextKey::LabelUploadImages).bold());
        for (i, screenshot) in screenshots.iter().enumerate() {
            println!("  {}. {} ({})", i + 1, screenshot.name, screenshot.mime_type);
        }
        println!();
    }

    let (_, markdown) = bench.export_markdown().await;
    println!("{}", markdown);
}

async fn read_upload(path: &Path) -> Result<Upload> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    Ok(Upload::new(name, bytes))
}

fn report_notices(bench: &StrategyWorkbench, lang: Language, notices: &[IntakeNotice]) {
    for notice in notices {
        eprintln!("{}", notice.localized(bench.catalog(), lang).yellow());
    }
}

fn report_autosave(bench: &StrategyWorkbench, lang: Language, autosave: &Autosave) {
    if let Some(notice) = autosave_notice(bench.catalog(), lang, autosave) {
        eprintln!("{}", notice.yellow());
    }
}

/// Message for a change that did not reach storage and is lost on exit.
fn autosave_notice(catalog: &TextCatalog, lang: Language, autosave: &Autosave) -> Option<String> {
    match autosave {
        Autosave::Saved => None,
        Autosave::Skipped => Some(catalog.get(lang, TextKey::NoticeAutosaveSkipped)),
        Autosave::Failed(reason) => Some(catalog.format(
            lang,
            TextKey::NoticeAutosaveFailed,
            &[("reason", reason.as_str())],
        )),
    }
}

fn print_field(bench: &StrategyWorkbench, lang: Language, label: TextKey, value: &str) {
    let value = if value.is_empty() {
        text(bench, lang, TextKey::TextNotGenerated).dimmed().to_string()
    } else {
        value.to_string()
    };
    println!("{} {}", format!("{}:", text(bench, lang, label)).bold(), value);
}

fn text(bench: &StrategyWorkbench, lang: Language, key: TextKey) -> String {
    bench.catalog().get(lang, key)
}

fn text_with(bench: &StrategyWorkbench, lang: Language, key: TextKey, values: &[(&str, &str)]) -> String {
    bench.catalog().format(lang, key, values)
}

fn preview(value: &str, max_chars: usize) -> String {
    let mut chars = value.chars();
    let head: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_truncates_on_char_boundary() {
        assert_eq!(preview("short", 10), "short");
        assert_eq!(preview("ñandú ñandú", 5), "ñandú...");
    }

    #[test]
    fn test_unsaved_changes_are_reported() {
        let catalog = TextCatalog::new();
        assert_eq!(autosave_notice(&catalog, Language::En, &Autosave::Saved), None);

        let skipped = autosave_notice(&catalog, Language::En, &Autosave::Skipped).unwrap();
        assert!(skipped.contains("client name"));

        let failed =
            autosave_notice(&catalog, Language::Es, &Autosave::Failed("disk full".to_string()))
                .unwrap();
        assert_eq!(failed, "No se pudo guardar la sesión: disk full");
    }
}
