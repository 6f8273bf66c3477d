use anyhow::Result;
use env_logger::{Builder, Env};

mod cli;
mod util;
mod cmd_extract;
mod cmd_diff;
mod cmd_inject;
mod cmd_blocks;

fn init_logger() {
    // Уровень берём из RUST_LOG, иначе дефолт: warn (stdout занят таблицами/отчётами).
    // Пример: RUST_LOG=debug rplrelink extract --input kit.RPL
    Builder::from_env(Env::default().default_filter_or("warn"))
        .format_timestamp_millis()
        .init();
}

fn main() {
    init_logger();

    if let Err(e) = run() {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = cli::Cli::parse();
    match cli.cmd {
        cli::Cmd::Extract { input, out, all_matches, json } =>
            cmd_extract::exec(input, out, all_matches, json),

        cli::Cmd::Diff { original, revised, out, report, keep_last, json } =>
            cmd_diff::exec(original, revised, out, report, keep_last, json),

        cli::Cmd::Inject {
            input,
            replacements,
            revised,
            original,
            dry_run,
            strict_container,
            line_width,
            keep_last,
            json,
        } => cmd_inject::exec(cmd_inject::InjectArgs {
            input,
            replacements,
            revised,
            original,
            dry_run,
            strict_container,
            line_width,
            keep_last,
            json,
        }),

        cli::Cmd::Blocks { input, json } =>
            cmd_blocks::exec(input, json),
    }
}
