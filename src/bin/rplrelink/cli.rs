use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Извлечение и перелинковка путей к сэмплам в бэкапах пресетов (.RPL)
#[derive(Parser, Debug)]
#[command(
    name = "rplrelink",
    version,
    about = "Extract and relink sample paths inside .RPL preset backups",
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Cmd,
}

#[derive(Subcommand, Debug)]
pub enum Cmd {
    /// Extract embedded sample paths into a CSV table (preset,container,note,path)
    Extract {
        #[arg(long)]
        input: PathBuf,
        /// Output CSV (stdout if omitted)
        #[arg(long)]
        out: Option<PathBuf>,
        /// Keep every path in a container fragment, not only the first one
        #[arg(long, default_value_t = false)]
        all_matches: bool,
        /// Print a JSON summary (records + counters) instead of CSV on stdout
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Build a replacements table from two extraction tables
    ///
    /// Ключ сопоставления: (preset, container, note). Правило пишется только
    /// для ключей, которые есть в обеих таблицах с разными путями.
    Diff {
        #[arg(long)]
        original: PathBuf,
        #[arg(long)]
        revised: PathBuf,
        /// Output CSV (preset,container,old_path,new_path)
        #[arg(long)]
        out: PathBuf,
        /// Also print the path-identity report (changed / only-original / only-revised)
        #[arg(long, default_value_t = false)]
        report: bool,
        /// On a repeated (preset, container, note) key keep the last row, not the first
        #[arg(long, default_value_t = false)]
        keep_last: bool,
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Rewrite paths in place (original kept as <name>.bak)
    ///
    /// Источник правил (нужен хотя бы один):
    ///   --replacements repl.csv
    ///   --revised paths_new.csv [--original paths_old.csv]
    /// Без --original (или если он ни по одному ключу не совпал с ревизией)
    /// исходные пути извлекаются из самого --input.
    Inject {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        replacements: Option<PathBuf>,
        #[arg(long)]
        revised: Option<PathBuf>,
        #[arg(long)]
        original: Option<PathBuf>,
        /// Compute and report, but do not touch the file
        #[arg(long, default_value_t = false)]
        dry_run: bool,
        /// Rules with a container only apply inside that container
        #[arg(long, default_value_t = false)]
        strict_container: bool,
        /// Width of re-encoded base64 lines (0 = keep the original block width)
        #[arg(long)]
        line_width: Option<usize>,
        /// On a repeated (preset, container, note) key keep the last row, not the first
        #[arg(long, default_value_t = false)]
        keep_last: bool,
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// List presets, outer blocks and container fragments (debugging aid)
    Blocks {
        #[arg(long)]
        input: PathBuf,
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }
}
