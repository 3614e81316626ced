use std::io::{IsTerminal, Write};
use std::time::{SystemTime, UNIX_EPOCH};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use fifoglue_frame::Msg;
use serde::Serialize;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
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
struct MsgOutput<'a> {
    endpoint: &'a str,
    header: &'a str,
    payload: &'a str,
    payload_size: usize,
    timestamp: String,
}

#[derive(Serialize)]
struct EndpointOutput<'a> {
    name: &'a str,
    namespace: &'a str,
}

pub fn print_msg(msg: &Msg, endpoint: &str, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = MsgOutput {
                endpoint,
                header: msg.header(),
                payload: msg.payload(),
                payload_size: msg.payload().len(),
                timestamp: now_unix_seconds(),
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["ENDPOINT", "HEADER", "SIZE", "PAYLOAD"])
                .add_row(vec![
                    endpoint.to_string(),
                    msg.header().to_string(),
                    msg.payload().len().to_string(),
                    msg.payload().to_string(),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!("{endpoint}: {msg}");
        }
        OutputFormat::Raw => {
            print_raw(msg.payload().as_bytes());
        }
    }
}

pub fn print_endpoints(names: &[String], namespace: &str, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            for name in names {
                let out = EndpointOutput { name, namespace };
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
                .set_header(vec!["ENDPOINT", "NAMESPACE"]);
            for name in names {
                table.add_row(vec![name.as_str(), namespace]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty | OutputFormat::Raw => {
            for name in names {
                println!("{name}");
            }
        }
    }
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.write_all(b"\n");
    let _ = out.flush();
}

fn now_unix_seconds() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs().to_string())
        .unwrap_or_else(|_| "0".to_string())
}
