use anyhow::Result;
use serde::Serialize;
use std::path::PathBuf;

use RplRelink::codec::Base64View;
use RplRelink::fragment::split_fragments;
use RplRelink::outer::decode_outer;
use RplRelink::RplDocument;

use super::util::print_json;

#[derive(Serialize)]
struct BlockInfo {
    /// 1-based, как в текстовом редакторе
    first_line: usize,
    last_line: usize,
    decoded: bool,
    decoded_len: usize,
    containers: Vec<String>,
}

#[derive(Serialize)]
struct PresetInfo {
    name: String,
    first_line: usize,
    closed: bool,
    blocks: Vec<BlockInfo>,
}

pub fn exec(input: PathBuf, json: bool) -> Result<()> {
    let doc = RplDocument::read(&input)?;
    let lines = doc.lines();
    let codec = Base64View::new();

    let presets: Vec<PresetInfo> = doc
        .presets()
        .iter()
        .map(|span| PresetInfo {
            name: span.name.clone(),
            first_line: span.header + 1,
            closed: span.closed,
            blocks: span
                .blocks
                .iter()
                .map(|b| {
                    let decoded = decode_outer(&codec, &lines[b.clone()]);
                    let (decoded, decoded_len, containers) = match decoded {
                        Ok(d) => {
                            let names = split_fragments(&d.text)
                                .iter()
                                .skip(1)
                                .map(|f| f.container.clone())
                                .collect();
                            (true, d.text.chars().count(), names)
                        }
                        Err(_) => (false, 0, Vec::new()),
                    };
                    BlockInfo {
                        first_line: b.start + 1,
                        last_line: b.end,
                        decoded,
                        decoded_len,
                        containers,
                    }
                })
                .collect(),
        })
        .collect();

    if json {
        return print_json(&presets);
    }

    for p in &presets {
        println!(
            "PRESET `{}` (line {}{})",
            p.name,
            p.first_line,
            if p.closed { "" } else { ", unterminated" }
        );
        for b in &p.blocks {
            if !b.decoded {
                println!("  lines {}-{}: not base64, skipped", b.first_line, b.last_line);
                continue;
            }
            println!(
                "  lines {}-{}: {} B decoded, {} container(s)",
                b.first_line,
                b.last_line,
                b.decoded_len,
                b.containers.len()
            );
            for c in &b.containers {
                println!("    - {}", if c.is_empty() { "(unnamed)" } else { c });
            }
        }
    }
    Ok(())
}
