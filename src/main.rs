use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cmd_add;
mod cmd_cat_file;
mod cmd_commit;
mod cmd_commit_tree;
mod cmd_hash_object;
mod cmd_init;
mod cmd_log;
mod cmd_ls_files;
mod cmd_ls_tree;
mod cmd_status;
mod cmd_write_tree;

#[derive(Parser, Debug)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    Init,
    CatFile {
        #[clap(short = 'p')]
        pretty_print: bool,
        digest: String,
    },
    HashObject {
        #[clap(short = 'w')]
        write: bool,
        file: PathBuf,
    },
    LsTree {
        #[clap(long)]
        name_only: bool,
        tree_digest: String,
    },
    WriteTree,
    CommitTree {
        #[clap(short = 'm')]
        message: String,
        #[clap(short = 'p')]
        parent: Option<String>,
        tree_digest: String,
    },
    Commit {
        #[clap(short = 'm')]
        message: String,
    },
    Add {
        paths: Vec<PathBuf>,
    },
    LsFiles {
        #[clap(long)]
        stage: bool,
    },
    Status,
    Log,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    if let Err(err) = run(args.command) {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn run(command: Command) -> Result<()> {
    match command {
        Command::Init => cmd_init::run(),
        Command::CatFile { pretty_print, digest } => cmd_cat_file::run(pretty_print, &digest),
        Command::HashObject { write, file } => cmd_hash_object::run(&file, write),
        Command::LsTree { name_only, tree_digest } => cmd_ls_tree::run(name_only, &tree_digest),
        Command::WriteTree => cmd_write_tree::run(),
        Command::CommitTree { message, parent, tree_digest } => {
            cmd_commit_tree::run(&message, parent.as_deref(), &tree_digest)
        }
        Command::Commit { message } => cmd_commit::run(&message),
        Command::Add { paths } => cmd_add::run(&paths),
        Command::LsFiles { stage } => cmd_ls_files::run(stage),
        Command::Status => cmd_status::run(),
        Command::Log => cmd_log::run(),
    }
}
