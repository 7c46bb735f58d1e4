use crate::infra::build_report_service;
use chrono::NaiveDate;
use clap::Args;
use epi_sms::config::{parse_utc_offset, AppConfig};
use epi_sms::error::AppError;
use epi_sms::workflows::report::{
    FixedClock, IntervalResolver, PhoneNumber, ReportCommand, ReportDirectory, ReportOutcome,
    ReportReply, SurveyId,
};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct ReportArgs {
    /// Sender phone number, exactly as the SMS gateway delivers it
    #[arg(long)]
    pub(crate) phone: String,
    /// Survey the message answers
    #[arg(long)]
    pub(crate) survey: String,
    /// Directory export (surveys and reporters) in JSON
    #[arg(long)]
    pub(crate) fixtures: PathBuf,
    /// Reporting date (YYYY-MM-DD); defaults to today in the reporting timezone
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) date: Option<NaiveDate>,
    /// Override the reporting UTC offset (e.g. +01:00)
    #[arg(long, value_parser = parse_offset_arg)]
    pub(crate) utc_offset: Option<chrono::FixedOffset>,
    /// Print the stored draft as JSON after the reply
    #[arg(long)]
    pub(crate) show_draft: bool,
    /// Raw SMS body, e.g. "5, all clear"
    pub(crate) message: String,
}

fn parse_offset_arg(raw: &str) -> Result<chrono::FixedOffset, String> {
    parse_utc_offset(raw).map_err(|err| err.to_string())
}

pub(crate) fn run_report(args: ReportArgs) -> Result<(), AppError> {
    let ReportArgs {
        phone,
        survey,
        fixtures,
        date,
        utc_offset,
        show_draft,
        message,
    } = args;

    let config = AppConfig::load()?;
    let offset = utc_offset.unwrap_or(config.reporting.utc_offset);
    let intervals = match date {
        Some(date) => IntervalResolver::new(Arc::new(FixedClock::on(date)), offset),
        None => IntervalResolver::system(offset),
    };

    let directory = ReportDirectory::from_path(fixtures)?;
    let messages = config.reporting.message_catalog()?;
    let service = build_report_service(directory, messages, intervals);

    let reply = service.handle(&ReportCommand {
        phone_number: PhoneNumber(phone),
        message,
        survey_id: SurveyId(survey),
    });
    render_reply(&reply, show_draft);

    Ok(())
}

fn render_reply(reply: &ReportReply, show_draft: bool) {
    println!("Outcome: {}", reply.outcome.label());
    println!("Reply SMS:\n{}", reply.message);

    if let ReportOutcome::StorageFailure { reason } = &reply.outcome {
        eprintln!("Draft store error: {reason}");
    }

    if let ReportOutcome::DraftSaved { draft } = &reply.outcome {
        println!(
            "\nDraft for {} / {} / {}: {} answers",
            draft.key.reporter_id.0,
            draft.key.place_id.0,
            draft.key.interval.label(),
            draft.answers.len()
        );
        if show_draft {
            match serde_json::to_string_pretty(draft) {
                Ok(json) => println!("{json}"),
                Err(err) => println!("Draft payload unavailable: {err}"),
            }
        }
    }
}
