use std::io::IsTerminal;

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use flbout::decode::{Event, EventTime, Record};
use serde::Serialize;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct EventOutput<'a> {
    index: usize,
    seconds: i64,
    nanoseconds: u32,
    shape: &'static str,
    record: &'a Record,
}

#[derive(Serialize)]
pub struct StatsOutput {
    pub path: String,
    pub events: usize,
    pub plain: usize,
    pub with_metadata: usize,
    pub bytes_consumed: usize,
    pub bytes_total: usize,
}

pub fn print_events(events: &[Event], format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            for (index, event) in events.iter().enumerate() {
                let out = EventOutput {
                    index,
                    seconds: event.timestamp.seconds(),
                    nanoseconds: event.timestamp.nanoseconds(),
                    shape: event.shape.as_str(),
                    record: &event.record,
                };
                println!(
                    "{}",
                    serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
                );
            }
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["#", "TIME", "SHAPE", "RECORD"]);
            for (index, event) in events.iter().enumerate() {
                table.add_row(vec![
                    index.to_string(),
                    format_time(&event.timestamp),
                    event.shape.as_str().to_string(),
                    record_preview(&event.record),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            for (index, event) in events.iter().enumerate() {
                println!(
                    "#{index} time={} shape={}",
                    format_time(&event.timestamp),
                    event.shape.as_str()
                );
                println!(
                    "{}",
                    serde_json::to_string_pretty(&event.record)
                        .unwrap_or_else(|_| "{}".to_string())
                );
            }
        }
    }
}

pub fn print_stats(stats: &StatsOutput, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string(stats).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["EVENTS", "PLAIN", "WITH METADATA", "BYTES"])
                .add_row(vec![
                    stats.events.to_string(),
                    stats.plain.to_string(),
                    stats.with_metadata.to_string(),
                    format!("{}/{}", stats.bytes_consumed, stats.bytes_total),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "path={} events={} plain={} with_metadata={} bytes={}/{}",
                stats.path,
                stats.events,
                stats.plain,
                stats.with_metadata,
                stats.bytes_consumed,
                stats.bytes_total
            );
        }
    }
}

fn format_time(time: &EventTime) -> String {
    format!("{}.{:09}", time.seconds(), time.nanoseconds())
}

fn record_preview(record: &Record) -> String {
    serde_json::to_string(record).unwrap_or_else(|_| "{}".to_string())
}
